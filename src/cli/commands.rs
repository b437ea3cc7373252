use clap::{Parser, Subcommand, ValueEnum};

use crate::{review::StatsSource, storage::Decision};

#[derive(Parser)]
#[command(name = "upload-review")]
#[command(about = "Review identity documents uploaded in a batch against the verification service")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Path to configuration file (extension optional)
    #[arg(short, long, global = true, default_value = "config/default")]
    pub config: String,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Launch the interactive review screen for a batch
    Tui {
        /// Batch (upload) identifier
        batch_id: String,
    },

    /// List the documents of a batch with their risk tier
    List {
        /// Batch (upload) identifier
        batch_id: String,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Table)]
        format: OutputFormat,
    },

    /// Show full verification detail for one document
    Show {
        /// Document identifier
        document_id: String,

        #[arg(short, long, value_enum, default_value_t = OutputFormat::Table)]
        format: OutputFormat,
    },

    /// Show tier counts, overall status and consistency for a batch
    Stats {
        /// Batch (upload) identifier
        batch_id: String,

        /// Where statistics come from (defaults to ui.default_stats_source)
        #[arg(short, long, value_enum)]
        source: Option<StatsSource>,

        #[arg(short, long, value_enum, default_value_t = OutputFormat::Table)]
        format: OutputFormat,
    },

    /// Check whether name and address agree across every document in a batch
    Consistency {
        /// Batch (upload) identifier
        batch_id: String,

        #[arg(short, long, value_enum, default_value_t = OutputFormat::Table)]
        format: OutputFormat,
    },

    /// Record an approve/decline decision for a document
    Decide {
        /// Document identifier
        document_id: String,

        /// Batch the document belongs to
        #[arg(short, long)]
        batch: String,

        #[arg(value_enum)]
        decision: DecisionArg,

        /// Free-form note stored with the decision
        #[arg(short, long)]
        note: Option<String>,

        /// Skip confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },

    /// Show recorded decisions
    History {
        /// Only decisions for this batch
        #[arg(short, long)]
        batch: Option<String>,

        /// Maximum number of decisions to show
        #[arg(short, long, default_value = "20")]
        limit: usize,

        #[arg(short, long, value_enum, default_value_t = OutputFormat::Table)]
        format: OutputFormat,
    },

    /// Initialize the decision database and print the configuration
    Init,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Table,
    Json,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum DecisionArg {
    Approve,
    Decline,
}

impl From<DecisionArg> for Decision {
    fn from(arg: DecisionArg) -> Self {
        match arg {
            DecisionArg::Approve => Decision::Approved,
            DecisionArg::Decline => Decision::Declined,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_decide() {
        let cli = Cli::try_parse_from([
            "upload-review",
            "decide",
            "doc-1",
            "--batch",
            "u1",
            "decline",
            "--note",
            "address mismatch",
        ])
        .unwrap();

        match cli.command {
            Commands::Decide { document_id, batch, decision, note, yes } => {
                assert_eq!(document_id, "doc-1");
                assert_eq!(batch, "u1");
                assert_eq!(Decision::from(decision), Decision::Declined);
                assert_eq!(note.as_deref(), Some("address mismatch"));
                assert!(!yes);
            }
            _ => panic!("expected decide"),
        }
        assert_eq!(cli.config, "config/default");
    }

    #[test]
    fn test_parse_stats_source() {
        let cli = Cli::try_parse_from([
            "upload-review",
            "stats",
            "u1",
            "--source",
            "local",
            "--format",
            "json",
            "--config",
            "other.toml",
        ])
        .unwrap();

        match cli.command {
            Commands::Stats { batch_id, source, format } => {
                assert_eq!(batch_id, "u1");
                assert_eq!(source, Some(StatsSource::Local));
                assert_eq!(format, OutputFormat::Json);
            }
            _ => panic!("expected stats"),
        }
        assert_eq!(cli.config, "other.toml");
    }
}
