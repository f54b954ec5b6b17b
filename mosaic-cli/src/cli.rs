//! Command-line definitions. No behavior; clap types only.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use uuid::Uuid;

use crate::logging::LogFormat;

/// Mosaic CLI - scope checks and runtime context assembly
#[derive(Debug, Parser)]
#[command(name = "mosaic", version)]
#[command(about = "Evaluate AI feature scopes and assemble runtime context")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Log level or filter directive (overridden by MOSAIC_LOG)
    #[arg(long, global = true, default_value = "warn")]
    pub log_level: String,

    /// Log format
    #[arg(long, global = true, value_enum, default_value_t = LogFormat::Text)]
    pub log_format: LogFormat,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Decide whether a scope is available in a context
    Check(CheckArgs),
    /// Run a scope conformance fixture table
    Conformance {
        /// Fixture file (JSON array of cases)
        file: PathBuf,
    },
    /// Assemble the runtime context for a request against a world file
    Assemble(AssembleArgs),
}

#[derive(Debug, Args)]
pub struct CheckArgs {
    /// Scope as inline JSON (`null` for none) or a path to a JSON file
    #[arg(long)]
    pub scope: String,

    /// Availability context as inline JSON or a path to a JSON file
    #[arg(long, default_value = "{}")]
    pub context: String,

    /// Surface whose relevant dimensions apply (default: copilot)
    #[arg(long, conflicts_with = "dimensions")]
    pub surface: Option<String>,

    /// Comma-separated relevant dimensions, instead of a surface
    #[arg(long)]
    pub dimensions: Option<String>,

    /// Surface configuration file adding or overriding surfaces
    #[arg(long)]
    pub surfaces: Option<PathBuf>,
}

#[derive(Debug, Args)]
pub struct AssembleArgs {
    /// World file with nodes, contexts and profiles
    #[arg(long)]
    pub world: PathBuf,

    /// Request context items as inline JSON array or a path to a JSON file
    #[arg(long)]
    pub items: Option<String>,

    /// Current entity id
    #[arg(long)]
    pub entity: Option<Uuid>,

    /// Parent entity id for an entity that does not exist yet
    #[arg(long)]
    pub parent: Option<Uuid>,

    /// AI profile id
    #[arg(long)]
    pub profile: Option<Uuid>,

    /// Current user as inline JSON or a path to a JSON file
    #[arg(long)]
    pub identity: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_surface_conflicts_with_dimensions() {
        let result = Cli::try_parse_from([
            "mosaic",
            "check",
            "--scope",
            "null",
            "--surface",
            "copilot",
            "--dimensions",
            "section",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_parse_assemble() {
        let id = Uuid::new_v4();
        let cli = Cli::try_parse_from([
            "mosaic",
            "--log-format",
            "json",
            "assemble",
            "--world",
            "world.json",
            "--entity",
            &id.to_string(),
        ])
        .unwrap();

        assert_eq!(cli.log_format, LogFormat::Json);
        match cli.command {
            Commands::Assemble(args) => {
                assert_eq!(args.entity, Some(id));
                assert_eq!(args.world, PathBuf::from("world.json"));
                assert!(args.items.is_none());
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }
}
