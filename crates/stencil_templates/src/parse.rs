//! Template lexing and parsing.
//!
//! The syntax is a small subset of Go's `text/template`: `{{.Field.Sub}}`,
//! `{{.}}`, string literals, `{{/* comments */}}`, `{{define "x"}}...{{end}}`
//! and `{{template "x" .Data}}`, with `{{-` / `-}}` whitespace trimming.

use std::collections::HashMap;
use std::sync::OnceLock;

use regex::Regex;

/// An operand of an action.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Expr {
    /// `.`
    Dot,
    /// `.A.B`
    Field(Vec<String>),
    /// `"text"`
    Str(String),
}

/// A parsed template node.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Node {
    Text(Vec<u8>),
    Print { expr: Expr, line: usize },
    Invoke {
        name: String,
        data: Option<Expr>,
        line: usize,
    },
}

/// Named templates parsed from one source.
#[derive(Debug, Clone, Default)]
pub(crate) struct TemplateSet {
    pub(crate) templates: HashMap<String, Vec<Node>>,
}

/// A parse failure with the line it happened on.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct ParseFailure {
    pub(crate) line: usize,
    pub(crate) message: String,
}

impl std::fmt::Display for ParseFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "line {}: {}", self.line, self.message)
    }
}

type ParseOutcome<T> = Result<T, ParseFailure>;

fn fail<T>(line: usize, message: impl Into<String>) -> ParseOutcome<T> {
    Err(ParseFailure {
        line,
        message: message.into(),
    })
}

fn identifier_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^[\p{L}_][\p{L}\p{N}_]*$").expect("identifier regex"))
}

#[derive(Debug)]
enum Token {
    Text(Vec<u8>),
    Action { body: String, line: usize },
    Comment,
}

const LEFT: &[u8] = b"{{";
const RIGHT: &[u8] = b"}}";

/// Whitespace removed by trim markers.
fn is_space(b: u8) -> bool {
    matches!(b, b' ' | b'\t' | b'\r' | b'\n')
}

fn trim_start(mut bytes: &[u8]) -> &[u8] {
    while let [first, rest @ ..] = bytes {
        if !is_space(*first) {
            break;
        }
        bytes = rest;
    }
    bytes
}

fn trim_end(mut bytes: &[u8]) -> &[u8] {
    while let [rest @ .., last] = bytes {
        if !is_space(*last) {
            break;
        }
        bytes = rest;
    }
    bytes
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack
        .windows(needle.len())
        .position(|window| window == needle)
}

fn line_at(source: &[u8], offset: usize) -> usize {
    source[..offset].iter().filter(|b| **b == b'\n').count() + 1
}

/// Length of a left trim marker (`-` plus one space) at the start of `s`.
fn trim_marker_len(s: &[u8]) -> Option<usize> {
    match s {
        [b'-', next, ..] if is_space(*next) => Some(2),
        _ => None,
    }
}

/// Split source into literal bytes and raw action bodies.
///
/// Text outside actions is passed through untouched, so it does not need to
/// be UTF-8.
fn lex(source: &[u8]) -> ParseOutcome<Vec<Token>> {
    let mut tokens = Vec::new();
    let mut pos = 0;
    let mut trim_next = false;

    loop {
        let rest = &source[pos..];
        let Some(start) = find(rest, LEFT) else {
            let text = if trim_next { trim_start(rest) } else { rest };
            if !text.is_empty() {
                tokens.push(Token::Text(text.to_vec()));
            }
            return Ok(tokens);
        };

        let action_start = pos + start;
        let line = line_at(source, action_start);
        let mut body_start = action_start + LEFT.len();
        let trim_left = trim_marker_len(&source[body_start..]);

        let mut text = &rest[..start];
        if trim_next {
            text = trim_start(text);
        }
        if let Some(marker) = trim_left {
            text = trim_end(text);
            body_start += marker;
        }
        if !text.is_empty() {
            tokens.push(Token::Text(text.to_vec()));
        }

        let (token, end, trim_right) = scan_action(source, body_start, line)?;
        tokens.push(token);
        pos = end;
        trim_next = trim_right;
    }
}

/// Scan one action starting after its left delimiter.
///
/// Returns the token, the offset just past the right delimiter and whether
/// the action ended with a trim marker.
fn scan_action(source: &[u8], start: usize, line: usize) -> ParseOutcome<(Token, usize, bool)> {
    let body = &source[start..];

    if let Some(comment) = body.strip_prefix(b"/*") {
        let Some(close) = find(comment, b"*/") else {
            return fail(line, "unclosed comment");
        };
        let after = &comment[close + 2..];
        let trimmed = trim_start(after);
        let (trim_right, tail) = match trimmed.strip_prefix(b"-") {
            Some(tail) if trimmed.len() < after.len() => (true, tail),
            _ => (false, after),
        };
        if !tail.starts_with(RIGHT) {
            return fail(line, "comment ends before closing delimiter");
        }
        let end = source.len() - tail.len() + RIGHT.len();
        return Ok((Token::Comment, end, trim_right));
    }

    let mut in_quote = false;
    let mut escaped = false;
    for (i, &b) in body.iter().enumerate() {
        if in_quote {
            match b {
                _ if escaped => escaped = false,
                b'\\' => escaped = true,
                b'"' => in_quote = false,
                b'\n' => return fail(line, "unterminated quoted string"),
                _ => {}
            }
            continue;
        }
        if b == b'"' {
            in_quote = true;
            continue;
        }
        if body[i..].starts_with(RIGHT) {
            let inner = &body[..i];
            let trim_right = match inner {
                [.., before, b'-'] => is_space(*before),
                _ => false,
            };
            let inner = if trim_right {
                &inner[..inner.len() - 1]
            } else {
                inner
            };
            let body = std::str::from_utf8(inner)
                .map_err(|_| ParseFailure {
                    line,
                    message: "action is not valid UTF-8".to_string(),
                })?
                .to_string();
            let token = Token::Action { body, line };
            return Ok((token, start + i + RIGHT.len(), trim_right));
        }
    }

    if in_quote {
        fail(line, "unterminated quoted string")
    } else {
        fail(line, "unclosed action")
    }
}

#[derive(Debug, PartialEq)]
enum Word {
    Bare(String),
    Quoted(String),
}

fn split_words(body: &str, line: usize) -> ParseOutcome<Vec<Word>> {
    let mut words = Vec::new();
    let mut chars = body.chars().peekable();

    while let Some(&c) = chars.peek() {
        if matches!(c, ' ' | '\t' | '\r' | '\n') {
            chars.next();
        } else if c == '"' {
            chars.next();
            let mut value = String::new();
            loop {
                match chars.next() {
                    Some('"') => break,
                    Some('\\') => match chars.next() {
                        Some('n') => value.push('\n'),
                        Some('t') => value.push('\t'),
                        Some('\\') => value.push('\\'),
                        Some('"') => value.push('"'),
                        Some(other) => {
                            return fail(line, format!("unknown escape sequence \\{}", other))
                        }
                        None => return fail(line, "unterminated quoted string"),
                    },
                    Some(other) => value.push(other),
                    None => return fail(line, "unterminated quoted string"),
                }
            }
            words.push(Word::Quoted(value));
        } else {
            let mut value = String::new();
            while let Some(&c) = chars.peek() {
                if matches!(c, ' ' | '\t' | '\r' | '\n' | '"') {
                    break;
                }
                value.push(c);
                chars.next();
            }
            words.push(Word::Bare(value));
        }
    }

    Ok(words)
}

fn parse_field(word: &str, line: usize) -> ParseOutcome<Expr> {
    if word == "." {
        return Ok(Expr::Dot);
    }

    let mut chain = Vec::new();
    for segment in word[1..].split('.') {
        if segment.is_empty() {
            return fail(line, format!("bad field {:?}", word));
        }
        if !identifier_pattern().is_match(segment) {
            let bad = segment
                .chars()
                .enumerate()
                .find(|(i, c)| !(c.is_alphabetic() || *c == '_' || (*i > 0 && c.is_numeric())))
                .map(|(_, c)| c)
                .unwrap_or('?');
            return fail(line, format!("bad character {:?} in field {}", bad, word));
        }
        chain.push(segment.to_string());
    }
    Ok(Expr::Field(chain))
}

fn parse_operand(word: &Word, line: usize) -> ParseOutcome<Expr> {
    match word {
        Word::Quoted(text) => Ok(Expr::Str(text.clone())),
        Word::Bare(text) if text.starts_with('.') => parse_field(text, line),
        Word::Bare(text) if text.starts_with('$') => {
            fail(line, format!("undefined variable {:?}", text))
        }
        Word::Bare(text) => fail(line, format!("function {:?} not defined", text)),
    }
}

enum Action {
    Node(Node),
    Define(String),
    End,
}

fn parse_action(body: &str, line: usize) -> ParseOutcome<Action> {
    let words = split_words(body, line)?;
    let Some((first, rest)) = words.split_first() else {
        return fail(line, "missing value for command");
    };

    let keyword = match first {
        Word::Bare(word) if !word.starts_with('.') && !word.starts_with('$') => word.as_str(),
        operand => {
            let expr = parse_operand(operand, line)?;
            if let Some(extra) = rest.first() {
                return fail(line, format!("unexpected {:?} after operand", extra));
            }
            return Ok(Action::Node(Node::Print { expr, line }));
        }
    };

    match (keyword, rest) {
        ("end", []) => Ok(Action::End),
        ("define", [Word::Quoted(name)]) => Ok(Action::Define(name.clone())),
        ("define", _) => fail(line, "define expects a single quoted template name"),
        ("template", [Word::Quoted(name)]) => Ok(Action::Node(Node::Invoke {
            name: name.clone(),
            data: None,
            line,
        })),
        ("template", [Word::Quoted(name), data]) => Ok(Action::Node(Node::Invoke {
            name: name.clone(),
            data: Some(parse_operand(data, line)?),
            line,
        })),
        ("template", _) => fail(line, "template expects a quoted name and at most one operand"),
        ("end", _) => fail(line, "unexpected arguments to end"),
        ("if" | "else" | "range" | "with" | "block" | "break" | "continue", _) => {
            fail(line, format!("unsupported action {{{{{}}}}}", keyword))
        }
        _ => fail(line, format!("function {:?} not defined", keyword)),
    }
}

/// A template body with nothing but whitespace may be replaced by a define.
fn is_empty_tree(nodes: &[Node]) -> bool {
    nodes.iter().all(|node| match node {
        Node::Text(text) => text.iter().all(|b| is_space(*b)),
        _ => false,
    })
}

impl TemplateSet {
    fn add(&mut self, name: String, nodes: Vec<Node>, line: usize) -> ParseOutcome<()> {
        match self.templates.get(&name) {
            Some(existing) if !is_empty_tree(existing) && !is_empty_tree(&nodes) => {
                fail(line, format!("multiple definition of template {:?}", name))
            }
            Some(_) if is_empty_tree(&nodes) => Ok(()),
            _ => {
                self.templates.insert(name, nodes);
                Ok(())
            }
        }
    }

    pub(crate) fn contains(&self, name: &str) -> bool {
        self.templates.contains_key(name)
    }
}

/// Parse `source` into a set whose top-level template is called `name`.
pub(crate) fn parse(name: &str, source: impl AsRef<[u8]>) -> ParseOutcome<TemplateSet> {
    let mut set = TemplateSet::default();
    let mut top = Vec::new();
    let mut defines: Vec<(String, Vec<Node>, usize)> = Vec::new();
    let mut open: Option<(String, Vec<Node>, usize)> = None;

    for token in lex(source.as_ref())? {
        let node = match token {
            Token::Text(text) => Node::Text(text),
            Token::Comment => continue,
            Token::Action { body, line } => match parse_action(&body, line)? {
                Action::Node(node) => node,
                Action::Define(define_name) => {
                    if open.is_some() {
                        return fail(line, "unexpected {{define}} inside a definition");
                    }
                    open = Some((define_name, Vec::new(), line));
                    continue;
                }
                Action::End => {
                    let Some(finished) = open.take() else {
                        return fail(line, "unexpected {{end}}");
                    };
                    defines.push(finished);
                    continue;
                }
            },
        };

        match open.as_mut() {
            Some((_, body, _)) => body.push(node),
            None => top.push(node),
        }
    }

    if let Some((define_name, _, line)) = open {
        return fail(line, format!("unexpected EOF in definition of {:?}", define_name));
    }

    set.add(name.to_string(), top, 1)?;
    for (define_name, body, line) in defines {
        set.add(define_name, body, line)?;
    }
    Ok(set)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn top(source: &str) -> Vec<Node> {
        parse("t", source).unwrap().templates.remove("t").unwrap()
    }

    fn text(s: &str) -> Node {
        Node::Text(s.as_bytes().to_vec())
    }

    fn field(chain: &[&str]) -> Node {
        Node::Print {
            expr: Expr::Field(chain.iter().map(|s| s.to_string()).collect()),
            line: 1,
        }
    }

    #[test]
    fn test_parse_text_and_fields() {
        assert_eq!(
            top("Hello {{.User.Name}}!"),
            vec![text("Hello "), field(&["User", "Name"]), text("!")]
        );
    }

    #[test]
    fn test_parse_dot_and_literal() {
        assert_eq!(
            top(r#"{{ . }}{{ "a \"b\"" }}"#),
            vec![
                Node::Print { expr: Expr::Dot, line: 1 },
                Node::Print {
                    expr: Expr::Str("a \"b\"".to_string()),
                    line: 1
                },
            ]
        );
    }

    #[test]
    fn test_trim_markers() {
        assert_eq!(top("a  {{- .X -}}  \n b"), vec![text("a"), field(&["X"]), text("b")]);
        assert_eq!(top("a {{.X -}}\n\tb"), vec![text("a "), field(&["X"]), text("b")]);
    }

    #[test]
    fn test_dash_without_space_is_not_a_trim_marker() {
        let err = parse("t", "a {{-.X}}").unwrap_err();
        assert!(err.message.contains("not defined"), "{}", err);
    }

    #[test]
    fn test_comments_are_dropped() {
        assert_eq!(top("a{{/* note */}}b"), vec![text("a"), text("b")]);
        assert_eq!(top("a {{- /* note */ -}} b"), vec![text("a"), text("b")]);
    }

    #[test]
    fn test_closing_braces_inside_string_literal() {
        assert_eq!(
            top(r#"{{"}}"}}"#),
            vec![Node::Print {
                expr: Expr::Str("}}".to_string()),
                line: 1
            }]
        );
    }

    #[test]
    fn test_unclosed_action() {
        let err = parse("t", "line one\n{{ .Name").unwrap_err();
        assert_eq!(err.line, 2);
        assert_eq!(err.message, "unclosed action");
    }

    #[test]
    fn test_illegal_field_character() {
        let err = parse("t", "{{.Project-Name}}").unwrap_err();
        assert!(err.message.contains("bad character '-'"), "{}", err);
    }

    #[test]
    fn test_empty_action() {
        let err = parse("t", "{{ }}").unwrap_err();
        assert_eq!(err.message, "missing value for command");
    }

    #[test]
    fn test_unsupported_keyword() {
        let err = parse("t", "{{if .A}}x{{end}}").unwrap_err();
        assert!(err.message.contains("unsupported action"));
    }

    #[test]
    fn test_define_and_template() {
        let set = parse("main", r#"{{define "greet"}}Hi {{.}}{{end}}{{template "greet" .Name}}"#)
            .unwrap();
        assert!(set.contains("greet"));
        assert_eq!(
            set.templates["main"],
            vec![Node::Invoke {
                name: "greet".to_string(),
                data: Some(Expr::Field(vec!["Name".to_string()])),
                line: 1
            }]
        );
    }

    #[test]
    fn test_define_replaces_empty_top_level() {
        let set = parse("main", "\n{{define \"main\"}}body{{end}}\n").unwrap();
        assert_eq!(set.templates["main"], vec![text("body")]);
    }

    #[test]
    fn test_duplicate_definition() {
        let err = parse("main", "top{{define \"main\"}}body{{end}}").unwrap_err();
        assert!(err.message.contains("multiple definition"));
    }

    #[test]
    fn test_unbalanced_end_and_define() {
        assert!(parse("t", "{{end}}").is_err());
        assert!(parse("t", "{{define \"a\"}}x").is_err());
        assert!(parse("t", "{{define \"a\"}}{{define \"b\"}}{{end}}{{end}}").is_err());
    }

    #[test]
    fn test_trim_only_removes_ascii_space() {
        assert_eq!(
            top("a\u{a0} {{- .X -}} \u{a0}b"),
            vec![text("a\u{a0}"), field(&["X"]), text("\u{a0}b")]
        );
    }

    #[test]
    fn test_binary_text_passes_through() {
        let mut source = vec![0x89, b'P', b'N', b'G', 0xff, 0x00];
        source.extend_from_slice(b"{{.X}}");
        source.push(0xfe);
        let nodes = parse("t", &source).unwrap().templates.remove("t").unwrap();
        assert_eq!(
            nodes,
            vec![
                Node::Text(vec![0x89, b'P', b'N', b'G', 0xff, 0x00]),
                field(&["X"]),
                Node::Text(vec![0xfe]),
            ]
        );
    }

    #[test]
    fn test_invalid_utf8_inside_action() {
        let err = parse("t", [b'{', b'{', 0xff, b'}', b'}']).unwrap_err();
        assert_eq!(err.message, "action is not valid UTF-8");
    }
}
