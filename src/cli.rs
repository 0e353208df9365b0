//! CLI argument definitions using clap derive macros.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use clowds_core::providers::DEFAULT_MAX_RESULTS;

/// Query music providers through rotating API key pools.
///
/// Keys are read from `CLOWDS_YOUTUBE_API_KEYS` and `CLOWDS_GENIUS_API_KEYS`
/// as comma-separated lists. Results are printed as JSON.
#[derive(Parser, Debug)]
#[command(name = "clowds")]
#[command(author, version, about)]
pub struct Args {
    /// Increase output verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Settings file (default: $XDG_CONFIG_HOME/clowds/config.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Seconds before failed keys become usable again (1-86400)
    #[arg(long, global = true, value_parser = clap::value_parser!(u64).range(1..=86_400))]
    pub cooldown_secs: Option<u64>,

    /// Attempts per request across the key pool (1-10)
    #[arg(long, global = true, value_parser = clap::value_parser!(u32).range(1..=10))]
    pub max_attempts: Option<u32>,

    #[command(subcommand)]
    pub command: Command,
}

/// Provider operations.
#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Command {
    /// Search videos
    Search {
        /// Search terms
        query: String,

        /// Maximum number of results (1-50)
        #[arg(short = 'n', long, default_value_t = DEFAULT_MAX_RESULTS, value_parser = clap::value_parser!(u32).range(1..=50))]
        max_results: u32,
    },

    /// List trending music videos
    Trending {
        /// Maximum number of results (1-50)
        #[arg(short = 'n', long, default_value_t = DEFAULT_MAX_RESULTS, value_parser = clap::value_parser!(u32).range(1..=50))]
        max_results: u32,
    },

    /// Show one video by id or URL
    Video {
        /// Video id or watch/share URL
        video: String,
    },

    /// Look up lyrics for a track
    Lyrics {
        /// Track title
        title: String,
        /// Track artist
        artist: String,
    },

    /// Find the best-matching song for a track
    Match {
        /// Track title
        title: String,
        /// Track artist
        artist: String,
    },
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_search_parses_query() {
        let args = Args::try_parse_from(["clowds", "search", "lofi beats"]).unwrap();
        assert_eq!(args.verbose, 0);
        assert!(!args.quiet);
        assert_eq!(
            args.command,
            Command::Search {
                query: "lofi beats".to_string(),
                max_results: 25
            }
        );
    }

    #[test]
    fn test_cli_verbose_flag_increments_count() {
        let args = Args::try_parse_from(["clowds", "-v", "trending"]).unwrap();
        assert_eq!(args.verbose, 1);

        let args = Args::try_parse_from(["clowds", "trending", "-vv"]).unwrap();
        assert_eq!(args.verbose, 2);
    }

    #[test]
    fn test_cli_quiet_flag_sets_quiet() {
        let args = Args::try_parse_from(["clowds", "--quiet", "trending"]).unwrap();
        assert!(args.quiet);
    }

    #[test]
    fn test_cli_help_flag_shows_usage() {
        let err = Args::try_parse_from(["clowds", "--help"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::DisplayHelp);
    }

    #[test]
    fn test_cli_version_flag_shows_version() {
        let err = Args::try_parse_from(["clowds", "--version"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::DisplayVersion);
    }

    #[test]
    fn test_cli_missing_subcommand_rejected() {
        assert!(Args::try_parse_from(["clowds"]).is_err());
    }

    #[test]
    fn test_cli_invalid_flag_returns_error() {
        let err = Args::try_parse_from(["clowds", "--invalid-flag", "trending"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::UnknownArgument);
    }

    // ==================== Resilience Flag Tests ====================

    #[test]
    fn test_cli_resilience_flags() {
        let args = Args::try_parse_from([
            "clowds",
            "--cooldown-secs",
            "60",
            "--max-attempts",
            "5",
            "--config",
            "/tmp/clowds.toml",
            "video",
            "abc",
        ])
        .unwrap();
        assert_eq!(args.cooldown_secs, Some(60));
        assert_eq!(args.max_attempts, Some(5));
        assert_eq!(args.config, Some(PathBuf::from("/tmp/clowds.toml")));
    }

    #[test]
    fn test_cli_max_attempts_zero_rejected() {
        let err = Args::try_parse_from(["clowds", "--max-attempts", "0", "trending"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::ValueValidation);
    }

    #[test]
    fn test_cli_max_attempts_over_max_rejected() {
        let err = Args::try_parse_from(["clowds", "--max-attempts", "11", "trending"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::ValueValidation);
    }

    #[test]
    fn test_cli_cooldown_zero_rejected() {
        let err = Args::try_parse_from(["clowds", "--cooldown-secs", "0", "trending"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::ValueValidation);
    }

    // ==================== Subcommand Tests ====================

    #[test]
    fn test_cli_trending_max_results() {
        let args = Args::try_parse_from(["clowds", "trending", "-n", "10"]).unwrap();
        assert_eq!(args.command, Command::Trending { max_results: 10 });
    }

    #[test]
    fn test_cli_max_results_over_max_rejected() {
        let err = Args::try_parse_from(["clowds", "search", "x", "-n", "51"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::ValueValidation);
    }

    #[test]
    fn test_cli_lyrics_and_match_take_title_artist() {
        let args = Args::try_parse_from(["clowds", "lyrics", "Hello", "Adele"]).unwrap();
        assert_eq!(
            args.command,
            Command::Lyrics {
                title: "Hello".to_string(),
                artist: "Adele".to_string()
            }
        );

        let args = Args::try_parse_from(["clowds", "match", "Hello", "Adele"]).unwrap();
        assert!(matches!(args.command, Command::Match { .. }));
    }

    #[test]
    fn test_cli_lyrics_requires_artist() {
        let err = Args::try_parse_from(["clowds", "lyrics", "Hello"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::MissingRequiredArgument);
    }
}
