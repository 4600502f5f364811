use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

/// Turn interactive PDF forms into UI-ready JSON field schemas.
#[derive(Debug, Parser)]
#[command(name = "formschema", about, version)]
pub struct Cli {
    /// Log per-field detail to stderr (RUST_LOG overrides)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Build the full JSON schema: extract, enrich, and group fields
    Schema(SchemaArgs),

    /// List the raw form fields without enrichment
    Fields {
        /// Path to the PDF file
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Page range (e.g. '1,3-5'). Default: all pages
        #[arg(long)]
        pages: Option<String>,

        /// Output format
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },

    /// Show each field's heuristic type and ranked nearby label candidates
    Labels {
        /// Path to the PDF file
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Page range (e.g. '1,3-5'). Default: all pages
        #[arg(long)]
        pages: Option<String>,

        /// Ignore text farther than this from a field (default: 150)
        #[arg(long, default_value_t = 150.0)]
        max_distance: f64,

        /// Number of candidates per field (default: 5)
        #[arg(long, default_value_t = 5)]
        top_k: usize,
    },
}

#[derive(Debug, Args)]
pub struct SchemaArgs {
    /// Path to the PDF file
    #[arg(value_name = "FILE")]
    pub file: PathBuf,

    /// Output path, or '-' for stdout. Default: output.json beside the PDF
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Label fields from nearby text instead of calling the Anthropic API
    #[arg(long)]
    pub offline: bool,

    /// Anthropic model used for enrichment
    #[arg(long)]
    pub model: Option<String>,

    /// Retryable failures tolerated per field before it is skipped (default: 3)
    #[arg(long, default_value_t = 3)]
    pub max_retries: u32,

    /// Ignore text farther than this from a field (default: 150)
    #[arg(long, default_value_t = 150.0)]
    pub max_distance: f64,

    /// Number of nearby text candidates per field (default: 5)
    #[arg(long, default_value_t = 5)]
    pub top_k: usize,

    /// Pretty-print JSON written to stdout
    #[arg(long)]
    pub pretty: bool,
}

/// Output format for listing subcommands.
#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    /// Tab-separated text
    Text,
    /// JSON array
    Json,
    /// Comma-separated values
    Csv,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn verify_cli() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parse_schema_defaults() {
        let cli = Cli::try_parse_from(["formschema", "schema", "form.pdf"]).unwrap();
        match cli.command {
            Commands::Schema(args) => {
                assert_eq!(args.file, PathBuf::from("form.pdf"));
                assert!(args.output.is_none());
                assert!(!args.offline);
                assert_eq!(args.max_retries, 3);
                assert_eq!(args.max_distance, 150.0);
                assert_eq!(args.top_k, 5);
            }
            other => panic!("expected schema, got {other:?}"),
        }
    }

    #[test]
    fn parse_fields_with_format_and_global_verbose() {
        let cli = Cli::try_parse_from([
            "formschema", "fields", "form.pdf", "--format", "csv", "--pages", "1-2", "-v",
        ])
        .unwrap();
        assert!(cli.verbose);
        match cli.command {
            Commands::Fields { format, pages, .. } => {
                assert!(matches!(format, OutputFormat::Csv));
                assert_eq!(pages.as_deref(), Some("1-2"));
            }
            other => panic!("expected fields, got {other:?}"),
        }
    }

    #[test]
    fn rejects_unknown_format() {
        assert!(Cli::try_parse_from(["formschema", "fields", "f.pdf", "--format", "xml"]).is_err());
    }
}
