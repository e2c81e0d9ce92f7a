use clap::{Subcommand, ValueEnum};

#[derive(Subcommand)]
pub enum Commands {
    /// Translate a JSON-encoded filter into another representation
    Translate {
        #[arg(long, help = "Filter file path (JSON)")]
        input: String,

        #[arg(long, value_enum, default_value_t = Format::Text)]
        format: Format,

        #[arg(
            long,
            help = "Deepest filter tree to accept; overrides FILTER_MAX_DEPTH"
        )]
        max_depth: Option<usize>,
    },
    /// Evaluate a filter against a single JSON record
    Eval {
        #[arg(long, help = "Filter file path (JSON)")]
        input: String,

        #[arg(long, help = "Record file path (JSON object)")]
        record: String,

        #[arg(
            long,
            help = "Deepest filter tree to accept; overrides FILTER_MAX_DEPTH"
        )]
        max_depth: Option<usize>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Format {
    /// Canonical `TAG(arg, ...)` text
    Text,
    Json,
    /// OGC Filter Encoding document
    Xml,
}
