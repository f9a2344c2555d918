//! Command-line arguments.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(name = "cloudput")]
#[command(version)]
#[command(about = "Upload local files to cloud storage")]
pub struct Cli {
    /// Log protocol calls and per-file results.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Config file (default: <config dir>/cloudput/config.json).
    #[arg(long, value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Upload one or more files.
    Put(PutArgs),
}

#[derive(Debug, Args)]
pub struct PutArgs {
    /// Remote directory to upload into (default: root).
    #[arg(short, long, value_name = "PATH")]
    pub destination: Option<String>,

    /// Overwrite existing files. Uploads always overwrite; kept for compatibility.
    #[arg(short, long)]
    pub force: bool,

    /// Local files to upload.
    #[arg(value_name = "SOURCE")]
    pub sources: Vec<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn put_args(args: &[&str]) -> PutArgs {
        let cli = Cli::try_parse_from(args).unwrap();
        match cli.command {
            Command::Put(put) => put,
        }
    }

    #[test]
    fn parses_sources_and_destination() {
        let put = put_args(&["cloudput", "put", "-d", "/backup", "a.txt", "b.txt"]);
        assert_eq!(put.destination.as_deref(), Some("/backup"));
        assert_eq!(put.sources, vec![PathBuf::from("a.txt"), PathBuf::from("b.txt")]);
        assert!(!put.force);
    }

    #[test]
    fn long_flags() {
        let put = put_args(&["cloudput", "put", "--destination", "/x/", "--force", "a.txt"]);
        assert_eq!(put.destination.as_deref(), Some("/x/"));
        assert!(put.force);
    }

    #[test]
    fn no_sources_is_accepted_by_parser() {
        let put = put_args(&["cloudput", "put"]);
        assert!(put.sources.is_empty());
        assert!(put.destination.is_none());
    }

    #[test]
    fn global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["cloudput", "put", "a.txt", "-v", "--config", "/tmp/c.json"])
            .unwrap();
        assert!(cli.verbose);
        assert_eq!(cli.config, Some(PathBuf::from("/tmp/c.json")));
    }

    #[test]
    fn subcommand_is_required() {
        assert!(Cli::try_parse_from(["cloudput"]).is_err());
        assert!(Cli::try_parse_from(["cloudput", "get", "a.txt"]).is_err());
    }
}
