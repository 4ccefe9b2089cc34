//! Template execution against a settings document.

use std::borrow::Cow;

use stencil_settings::Document;

use crate::parse::{Expr, Node, TemplateSet};

/// Nested `{{template}}` calls allowed before execution gives up.
pub(crate) const MAX_DEPTH: usize = 1000;

impl TemplateSet {
    /// Execute the template called `name` with `data` as its dot.
    pub(crate) fn execute(&self, name: &str, data: &Document) -> Result<Vec<u8>, String> {
        let mut out = Vec::new();
        self.execute_named(name, data, &mut out, 0)?;
        Ok(out)
    }

    fn execute_named(
        &self,
        name: &str,
        data: &Document,
        out: &mut Vec<u8>,
        depth: usize,
    ) -> Result<(), String> {
        if depth > MAX_DEPTH {
            return Err(format!("exceeded maximum template depth ({})", MAX_DEPTH));
        }
        let nodes = self
            .templates
            .get(name)
            .ok_or_else(|| format!("no such template {:?}", name))?;

        for node in nodes {
            match node {
                Node::Text(text) => out.extend_from_slice(text),
                Node::Print { expr, line } => {
                    let value = evaluate(expr, data).map_err(|e| format!("line {}: {}", line, e))?;
                    print(&value, out).map_err(|e| format!("line {}: {}", line, e))?;
                }
                Node::Invoke {
                    name: callee,
                    data: arg,
                    line,
                } => {
                    let null = Document::Null;
                    let value = match arg {
                        Some(expr) => {
                            evaluate(expr, data).map_err(|e| format!("line {}: {}", line, e))?
                        }
                        None => Cow::Borrowed(&null),
                    };
                    self.execute_named(callee, &value, out, depth + 1)
                        .map_err(|e| format!("in template {:?} called at line {}: {}", callee, line, e))?;
                }
            }
        }
        Ok(())
    }
}

fn evaluate<'a>(expr: &Expr, dot: &'a Document) -> Result<Cow<'a, Document>, String> {
    match expr {
        Expr::Dot => Ok(Cow::Borrowed(dot)),
        Expr::Str(text) => Ok(Cow::Owned(Document::String(text.clone()))),
        Expr::Field(chain) => {
            let mut node = dot;
            for (i, key) in chain.iter().enumerate() {
                node = match node {
                    Document::Object(map) => map.get(key).ok_or_else(|| {
                        format!(
                            "map has no entry for key {:?} in .{}",
                            key,
                            chain[..=i].join(".")
                        )
                    })?,
                    Document::Null => {
                        return Err(format!("nil data; no entry for key {:?}", key));
                    }
                    other => {
                        return Err(format!(
                            "can't evaluate field {} in type {}",
                            key,
                            other.type_name()
                        ));
                    }
                };
            }
            Ok(Cow::Borrowed(node))
        }
    }
}

fn print(value: &Document, out: &mut Vec<u8>) -> Result<(), String> {
    match value {
        Document::String(text) => out.extend_from_slice(text.as_bytes()),
        Document::Number(number) => out.extend_from_slice(number.to_string().as_bytes()),
        Document::Bool(flag) => {
            out.extend_from_slice(if *flag { "true" } else { "false" }.as_bytes())
        }
        Document::Null => {}
        other => {
            return Err(format!(
                "can't print {} value; reference one of its fields",
                other.type_name()
            ))
        }
    }
    Ok(())
}
