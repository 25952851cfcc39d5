//! Log setup shared by every `bitext` subcommand.
//!
//! The library reports progress through the `log` facade (shard tags,
//! every 100,000 records, vocab repairs); this routes it to stderr so
//! stdout stays free for `dump-shard` and `check-vocab` output.

use stderrlog::Timestamp;

/// Info: shard and shuffle progress is shown by default.
pub const DEFAULT_VERBOSITY: u8 = 3;

/// Stderr logging flags, flattened into each subcommand.
#[derive(clap::Args, Debug)]
pub struct LogArgs {
    /// Silence progress and warnings.
    #[clap(short, long)]
    pub quiet: bool,

    /// Set verbosity by count: -v error, -vv warn, -vvv info, -vvvv debug, more for trace.
    #[arg(short, long, action = clap::ArgAction::Count, default_value = None)]
    verbose: Option<u8>,

    /// Prefix log lines with timestamps.
    #[clap(short, long)]
    pub ts: bool,
}

impl LogArgs {
    /// Initialize ``stderrlog`` at `default` unless `-v` was given.
    pub fn setup_logging(
        &self,
        default: u8,
    ) -> Result<(), Box<dyn std::error::Error>> {
        stderrlog::new()
            .quiet(self.quiet)
            .verbosity(self.log_level(default))
            .timestamp(if self.ts {
                Timestamp::Second
            } else {
                Timestamp::Off
            })
            .init()?;

        Ok(())
    }

    fn log_level(
        &self,
        default: u8,
    ) -> stderrlog::LogLevelNum {
        let level = match self.verbose {
            Some(verbose) if verbose > 0 => verbose,
            _ => default,
        };

        match level {
            0 => stderrlog::LogLevelNum::Off,
            1 => stderrlog::LogLevelNum::Error,
            2 => stderrlog::LogLevelNum::Warn,
            3 => stderrlog::LogLevelNum::Info,
            4 => stderrlog::LogLevelNum::Debug,
            _ => stderrlog::LogLevelNum::Trace,
        }
    }
}

#[cfg(test)]
mod tests {
    use clap::Parser;
    use stderrlog::LogLevelNum;

    use super::*;

    #[derive(clap::Parser, Debug)]
    struct Cli {
        #[clap(flatten)]
        logging: LogArgs,
    }

    fn level(args: &[&str]) -> LogLevelNum {
        let cli = Cli::try_parse_from(std::iter::once("bitext").chain(args.iter().copied())).unwrap();
        cli.logging.log_level(DEFAULT_VERBOSITY)
    }

    #[test]
    fn test_default_is_info() {
        assert!(matches!(level(&[]), LogLevelNum::Info));
    }

    #[test]
    fn test_verbose_count_overrides_default() {
        assert!(matches!(level(&["-v"]), LogLevelNum::Error));
        assert!(matches!(level(&["-vv"]), LogLevelNum::Warn));
        assert!(matches!(level(&["-vvvv"]), LogLevelNum::Debug));
        assert!(matches!(level(&["-vvvvvv"]), LogLevelNum::Trace));
    }

    #[test]
    fn test_flags() {
        let cli = Cli::try_parse_from(["bitext", "--quiet", "--ts"]).unwrap();
        assert!(cli.logging.quiet);
        assert!(cli.logging.ts);
    }
}
