//! All the CLI arguments for Hanabi

/// The name of the config file that is created on first run.
pub const DEFAULT_CONFIG_FILE_NAME: &str = "hanabi.toml";

/// Fireworks in your terminal
#[derive(clap::Parser, Debug, Clone)]
#[command(version, about, long_about = None)]
#[non_exhaustive]
pub struct CliArgs {
    /// Use a custom config directory. Defaults to the standard config location for your OS.
    #[arg(long)]
    pub config_dir: Option<std::path::PathBuf>,

    /// The name of the main config file, relative to the config directory.
    #[arg(long, default_value = DEFAULT_CONFIG_FILE_NAME)]
    pub main_config: std::path::PathBuf,

    /// Override the log level from the config file.
    #[arg(long, value_enum)]
    pub log_level: Option<crate::config::LogLevel>,

    /// Override where the log file is written.
    #[arg(long)]
    pub log_path: Option<std::path::PathBuf>,

    /// Seed every random choice so that the same show can be watched again.
    #[arg(long)]
    pub seed: Option<u64>,

    /// The number of fireworks in the show.
    #[arg(short = 'n', long)]
    pub count: Option<usize>,

    /// Use this pattern for every firework, rather than picking one at random.
    #[arg(short, long, value_parser = parse_pattern)]
    pub pattern: Option<hanabi_core::Pattern>,

    /// Print the generated show as JSON instead of displaying it.
    #[arg(long)]
    pub print_show: bool,
}

/// Patterns are named the same on the CLI as in config files.
fn parse_pattern(name: &str) -> Result<hanabi_core::Pattern, String> {
    serde_json::from_value(serde_json::Value::String(name.to_owned())).map_err(|_error| {
        format!("unknown pattern '{name}', expected one of: chrysanthemum, willow, peony, star, palm")
    })
}

#[cfg(test)]
#[expect(clippy::unwrap_used, reason = "Tests aren't so strict")]
mod test {
    use clap::Parser as _;

    use super::*;

    #[test]
    fn defaults() {
        let args = CliArgs::try_parse_from(["hanabi"]).unwrap();
        assert_eq!(
            args.main_config,
            std::path::PathBuf::from(DEFAULT_CONFIG_FILE_NAME)
        );
        assert!(!args.print_show);
        assert!(args.pattern.is_none());
    }

    #[test]
    fn pattern_and_count() {
        let args =
            CliArgs::try_parse_from(["hanabi", "--pattern", "willow", "-n", "3", "--seed", "7"])
                .unwrap();
        assert_eq!(args.pattern, Some(hanabi_core::Pattern::Willow));
        assert_eq!(args.count, Some(3));
        assert_eq!(args.seed, Some(7));
    }

    #[test]
    fn unknown_pattern() {
        assert!(CliArgs::try_parse_from(["hanabi", "--pattern", "sparkler"]).is_err());
    }
}
