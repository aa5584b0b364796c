//! CLI argument parsing using clap.

use clap::Parser;
use std::path::PathBuf;
use tarhl_core::ExtractConfig;
use tarhl_core::MissingBasePolicy;
use tarhl_core::config::DEFAULT_QUEUE_CAPACITY;

#[derive(Parser)]
#[command(name = "tarhl")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Input tar file, or `-` to read from standard input
    #[arg(short, long, value_name = "PATH")]
    pub file: PathBuf,

    /// Destination directory (created if missing)
    #[arg(short, long, value_name = "DIR")]
    pub dest: PathBuf,

    /// Base directory to hard-link unchanged files from (empty disables
    /// linking)
    #[arg(short, long, value_name = "DIR", value_parser = parse_base)]
    pub base: Option<PathBuf>,

    /// Number of files buffered between the archive reader and the writer
    #[arg(long, value_name = "N", default_value_t = DEFAULT_QUEUE_CAPACITY, value_parser = parse_capacity)]
    pub queue_capacity: usize,

    /// Write files that have no counterpart in the base directory instead
    /// of failing
    #[arg(long, requires = "base")]
    pub write_missing: bool,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Output results in JSON format
    #[arg(short, long)]
    pub json: bool,
}

impl Cli {
    /// Builds the extraction configuration from the parsed flags.
    pub fn extract_config(&self) -> ExtractConfig {
        let mut config = ExtractConfig::new(&self.dest).with_queue_capacity(self.queue_capacity);
        if let Some(base) = &self.base {
            config = config.with_base(base);
        }
        if self.write_missing {
            config = config.with_missing_base(MissingBasePolicy::WriteFresh);
        }
        config
    }
}

/// Parse a base directory, accepting an empty value
#[allow(clippy::unnecessary_wraps)]
fn parse_base(s: &str) -> Result<PathBuf, String> {
    Ok(PathBuf::from(s))
}

/// Parse a queue capacity, which must be at least 1
fn parse_capacity(s: &str) -> Result<usize, String> {
    match s.trim().parse::<usize>() {
        Ok(0) => Err("queue capacity must be at least 1".to_string()),
        Ok(n) => Ok(n),
        Err(_) => Err(format!("invalid queue capacity: {s}")),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use std::path::Path;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_capacity() {
        assert_eq!(parse_capacity("100").unwrap(), 100);
        assert_eq!(parse_capacity(" 7 ").unwrap(), 7);
        assert!(parse_capacity("0").is_err());
        assert!(parse_capacity("-1").is_err());
        assert!(parse_capacity("many").is_err());
    }

    #[test]
    fn test_required_flags() {
        assert!(Cli::try_parse_from(["tarhl", "--dest", "out"]).is_err());
        assert!(Cli::try_parse_from(["tarhl", "--file", "a.tar"]).is_err());
        assert!(Cli::try_parse_from(["tarhl", "--file", "a.tar", "--dest", "out"]).is_ok());
    }

    #[test]
    fn test_extract_config_defaults() {
        let cli = Cli::try_parse_from(["tarhl", "-f", "-", "-d", "out"]).unwrap();
        let config = cli.extract_config();
        assert_eq!(cli.file, PathBuf::from("-"));
        assert_eq!(config.dest, PathBuf::from("out"));
        assert!(config.base().is_none());
        assert_eq!(config.queue_capacity, DEFAULT_QUEUE_CAPACITY);
        assert_eq!(config.missing_base, MissingBasePolicy::Fail);
    }

    #[test]
    fn test_extract_config_with_base() {
        let cli = Cli::try_parse_from([
            "tarhl",
            "--file",
            "snap.tar",
            "--dest",
            "today",
            "--base",
            "yesterday",
            "--queue-capacity",
            "8",
            "--write-missing",
        ])
        .unwrap();
        let config = cli.extract_config();
        assert_eq!(config.base(), Some(Path::new("yesterday")));
        assert_eq!(config.queue_capacity, 8);
        assert_eq!(config.missing_base, MissingBasePolicy::WriteFresh);
    }

    #[test]
    fn test_empty_base_disables_dedup() {
        let cli = Cli::try_parse_from(["tarhl", "-f", "a.tar", "-d", "out", "--base", ""]).unwrap();
        assert!(cli.extract_config().base().is_none());
    }

    #[test]
    fn test_write_missing_requires_base() {
        assert!(
            Cli::try_parse_from(["tarhl", "-f", "a.tar", "-d", "out", "--write-missing"]).is_err()
        );
    }

    #[test]
    fn test_quiet_conflicts_with_verbose() {
        assert!(Cli::try_parse_from(["tarhl", "-f", "a.tar", "-d", "out", "-q", "-v"]).is_err());
    }
}
