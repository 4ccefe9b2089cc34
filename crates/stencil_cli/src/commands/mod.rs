//! CLI command definitions.
//!
//! Each subcommand maps to one workflow over a template source.

use clap::{Parser, Subcommand};

pub mod settings;
pub mod use_template;

/// stencil - generate projects from templates
#[derive(Parser, Debug)]
#[command(name = "stencil")]
#[command(version, about = "stencil - generate projects from templates")]
#[command(long_about = r#"
stencil renders a template directory (or git repository) into a new project.
Every file name, directory name and file body is a template, filled in from
the settings found in <template>/.stencil/.stencil.{json,yaml,yml}.

WORKFLOWS:
  use       → Generate a project from a template
  settings  → List the settings a template accepts

EXIT CODES:
  0 - Success
  1 - General error
  2 - Invalid arguments or template not found
  3 - Configuration error
  4 - Template error
  5 - Output file system error
"#)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    pub verbose: bool,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Generate a project from a template
    Use(use_template::UseArgs),

    /// Print the flattened settings of a template
    Settings(settings::SettingsArgs),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_parse_use_command() {
        let cli = Cli::try_parse_from([
            "stencil",
            "use",
            "./template",
            "-o",
            "out",
            "--set",
            "Project.Name=demo",
            "--set",
            "Author=Ada=Lovelace",
            "--no-prompt",
        ])
        .unwrap();

        let Commands::Use(args) = cli.command else {
            panic!("expected use command");
        };
        assert_eq!(args.source, "./template");
        assert_eq!(args.output, Some(PathBuf::from("out")));
        assert!(args.no_prompt);
        assert_eq!(
            args.set,
            vec![
                ("Project.Name".to_string(), "demo".to_string()),
                ("Author".to_string(), "Ada=Lovelace".to_string()),
            ]
        );
    }

    #[test]
    fn test_parse_settings_command_with_global_flag() {
        let cli = Cli::try_parse_from(["stencil", "settings", "./template", "-v"]).unwrap();
        assert!(cli.verbose);
        assert!(matches!(cli.command, Commands::Settings(_)));
    }

    #[test]
    fn test_rejects_malformed_override() {
        let err = Cli::try_parse_from(["stencil", "use", "./template", "--set", "NoEquals"]);
        assert!(err.is_err());
    }

    #[test]
    fn test_verbose_conflicts_with_quiet() {
        let err = Cli::try_parse_from(["stencil", "-v", "-q", "settings", "./template"]);
        assert!(err.is_err());
    }
}
