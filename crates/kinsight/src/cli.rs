use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use kinsight_records::YearMonth;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "kinsight")]
#[command(version)]
#[command(about = "Daily and monthly insights from a child's companion conversations")]
pub struct Cli {
    /// SQLite database to use instead of the one in the data directory
    #[arg(long, global = true)]
    pub db: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create the data directory and write the default config
    Init,

    /// Ingest annotated conversations from a JSON or JSONL file, or a directory of them
    Ingest {
        /// Path to a JSON array or JSON Lines file
        #[arg(short, long, conflicts_with = "dir", required_unless_present = "dir")]
        file: Option<PathBuf>,

        /// Directory searched recursively for *.json and *.jsonl files
        #[arg(long)]
        dir: Option<PathBuf>,

        /// Child id for records that do not carry one
        #[arg(long)]
        child: Option<String>,
    },

    /// Print the daily summary for a date
    Summary {
        #[command(flatten)]
        child: ChildArg,
        #[arg(long)]
        date: NaiveDate,
    },

    /// Print a topic's mention history and trend
    Trajectory {
        #[command(flatten)]
        child: ChildArg,
        #[arg(long)]
        topic: String,
    },

    /// Print growth scores for a month (YYYY-MM)
    Growth {
        #[command(flatten)]
        child: ChildArg,
        #[arg(long)]
        month: YearMonth,
    },

    /// List conversations, newest first
    Conversations {
        #[command(flatten)]
        child: ChildArg,
        /// Only this day
        #[arg(long, conflicts_with_all = ["from", "to"])]
        date: Option<NaiveDate>,
        /// Start of an inclusive range
        #[arg(long, requires = "to")]
        from: Option<NaiveDate>,
        /// End of an inclusive range
        #[arg(long, requires = "from")]
        to: Option<NaiveDate>,
    },

    /// Print minutes and sessions for a date
    Usage {
        #[command(flatten)]
        child: ChildArg,
        #[arg(long)]
        date: NaiveDate,
    },

    /// Plain-text report for a month
    Report {
        #[command(flatten)]
        child: ChildArg,
        #[arg(long)]
        month: YearMonth,
    },

    /// Delete every conversation and insight stored for a child
    Forget {
        #[command(flatten)]
        child: ChildArg,
    },

    /// Print version information
    Version,
}

#[derive(Args)]
pub struct ChildArg {
    /// Child id
    #[arg(long = "child")]
    pub id: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parse_version() {
        let cli = Cli::try_parse_from(["kinsight", "version"]);
        assert!(cli.is_ok());
        assert!(matches!(cli.unwrap().command, Commands::Version));
    }

    #[test]
    fn test_cli_parse_ingest() {
        let cli = Cli::try_parse_from(["kinsight", "ingest", "--file", "day.jsonl", "--child", "c1"]).unwrap();
        if let Commands::Ingest { file, dir, child } = cli.command {
            assert_eq!(file, Some(PathBuf::from("day.jsonl")));
            assert!(dir.is_none());
            assert_eq!(child.as_deref(), Some("c1"));
        } else {
            panic!("Expected Ingest command");
        }
    }

    #[test]
    fn test_cli_parse_ingest_dir() {
        let cli = Cli::try_parse_from(["kinsight", "ingest", "--dir", "exports"]).unwrap();
        if let Commands::Ingest { file, dir, .. } = cli.command {
            assert!(file.is_none());
            assert_eq!(dir, Some(PathBuf::from("exports")));
        } else {
            panic!("Expected Ingest command");
        }

        assert!(Cli::try_parse_from(["kinsight", "ingest"]).is_err());
        assert!(Cli::try_parse_from(["kinsight", "ingest", "--file", "a.json", "--dir", "b"]).is_err());
    }

    #[test]
    fn test_cli_parse_summary_date() {
        let cli = Cli::try_parse_from(["kinsight", "summary", "--child", "c1", "--date", "2025-01-10"]).unwrap();
        if let Commands::Summary { child, date } = cli.command {
            assert_eq!(child.id, "c1");
            assert_eq!(date, NaiveDate::from_ymd_opt(2025, 1, 10).unwrap());
        } else {
            panic!("Expected Summary command");
        }
    }

    #[test]
    fn test_cli_rejects_bad_month() {
        assert!(Cli::try_parse_from(["kinsight", "growth", "--child", "c1", "--month", "2025-13"]).is_err());
        assert!(Cli::try_parse_from(["kinsight", "growth", "--child", "c1", "--month", "2025-01"]).is_ok());
    }

    #[test]
    fn test_cli_conversation_range_needs_both_ends() {
        assert!(Cli::try_parse_from(["kinsight", "conversations", "--child", "c1", "--from", "2025-01-01"]).is_err());
        assert!(Cli::try_parse_from([
            "kinsight", "conversations", "--child", "c1", "--date", "2025-01-01", "--from", "2025-01-01",
            "--to", "2025-01-02",
        ])
        .is_err());
        assert!(Cli::try_parse_from([
            "kinsight", "conversations", "--child", "c1", "--from", "2025-01-01", "--to", "2025-01-02",
        ])
        .is_ok());
    }

    #[test]
    fn test_cli_global_db_flag() {
        let cli = Cli::try_parse_from(["kinsight", "forget", "--child", "c1", "--db", "/tmp/k.db"]).unwrap();
        assert_eq!(cli.db, Some(PathBuf::from("/tmp/k.db")));
    }
}
