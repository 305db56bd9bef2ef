// src/cli.rs

//! Command line surface.

use clap::Parser;
use std::path::PathBuf;

/// Back up survey tables for one dataset, vintage, and variable group into a
/// geography-partitioned tree of CSV files.
#[derive(Debug, Parser)]
#[command(name = "census-backup")]
#[command(about = "Back up Census survey tables to partitioned CSV files", long_about = None)]
pub struct Cli {
    /// The data set, e.g. "acs/acs5".
    #[arg(short, long)]
    pub dataset: String,

    /// The vintage year, e.g. 2020.
    #[arg(short, long)]
    pub vintage: u32,

    /// The group of variables, e.g. "B02001".
    #[arg(short, long)]
    pub group: String,

    /// Output directory under which to store the backups. Defaults to the
    /// current working directory.
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Optional API key. Alternatively, store your key in api_key.txt under
    /// the census-backup config directory. Without one you may get throttled
    /// or blocked; sign up at https://api.census.gov/data/key_signup.html
    #[arg(long)]
    pub api_key: Option<String>,

    /// Plan and log every output file without downloading data or touching
    /// the filesystem.
    #[arg(long)]
    pub dry_run: bool,

    /// Back up to N states concurrently (default 1, fully sequential). The
    /// pool also caps concurrent API requests.
    #[arg(long, default_value = "1", value_name = "N")]
    pub jobs: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_required_flags_and_defaults() {
        let cli = Cli::parse_from([
            "census-backup",
            "-d",
            "acs/acs5",
            "-v",
            "2020",
            "-g",
            "B02001",
        ]);
        assert_eq!(cli.dataset, "acs/acs5");
        assert_eq!(cli.vintage, 2020);
        assert_eq!(cli.group, "B02001");
        assert!(cli.output.is_none());
        assert!(cli.api_key.is_none());
        assert!(!cli.dry_run);
        assert_eq!(cli.jobs, 1);
    }

    #[test]
    fn parses_long_flags() {
        let cli = Cli::parse_from([
            "census-backup",
            "--dataset",
            "dec/pl",
            "--vintage",
            "2010",
            "--group",
            "P1",
            "--output",
            "/tmp/backups",
            "--api-key",
            "secret",
            "--dry-run",
            "--jobs",
            "4",
        ]);
        assert_eq!(cli.output.as_deref(), Some(std::path::Path::new("/tmp/backups")));
        assert_eq!(cli.api_key.as_deref(), Some("secret"));
        assert!(cli.dry_run);
        assert_eq!(cli.jobs, 4);
    }

    #[test]
    fn missing_required_flag_is_an_error() {
        assert!(Cli::try_parse_from(["census-backup", "-d", "acs/acs5", "-v", "2020"]).is_err());
    }
}
