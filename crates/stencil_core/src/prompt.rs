//! Terminal prompt for setting overrides.

use std::io;

use dialoguer::Input;

use crate::negotiator::InputCollaborator;

/// Asks for each override on the terminal.
///
/// Requires an interactive terminal; without one every offer fails.
#[derive(Debug, Clone, Copy, Default)]
pub struct TerminalInput;

impl TerminalInput {
    pub fn new() -> Self {
        Self
    }
}

fn prompt_text(name: &str, current: &str) -> String {
    format!("Conf Override: \"{}\" [{}]", name, current)
}

impl InputCollaborator for TerminalInput {
    fn offer(&mut self, name: &str, current: &str) -> io::Result<String> {
        let answer = Input::<String>::new()
            .with_prompt(prompt_text(name, current))
            .allow_empty(true)
            .interact_text()
            .map_err(|e| match e {
                dialoguer::Error::IO(err) => err,
            })?;
        Ok(answer.trim().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_names_setting_and_current_value() {
        assert_eq!(
            prompt_text("Project.Name", "demo"),
            "Conf Override: \"Project.Name\" [demo]"
        );
        assert_eq!(prompt_text("Empty", ""), "Conf Override: \"Empty\" []");
    }
}
