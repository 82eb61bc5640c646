//! All of the user config for Hanabi.

use color_eyre::eyre::ContextCompat as _;
use color_eyre::eyre::Result;

/// A copy of the default config file. It gets copied to the user's config folder the first time
/// they start Hanabi.
static DEFAULT_CONFIG: &str = include_str!("../default_config.toml");

/// The valid log levels. Based on our `tracing` crate.
#[derive(serde::Serialize, serde::Deserialize, clap::ValueEnum, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum LogLevel {
    /// Error
    Error,
    /// Warnings
    Warn,
    /// Info
    Info,
    /// Debug
    Debug,
    /// Trace
    Trace,
    /// No logging
    Off,
}

/// Managing user config.
#[derive(serde::Deserialize, Debug, Clone)]
#[serde(default)]
pub struct Config {
    /// The maximum log level
    pub log_level: LogLevel,
    /// The location of the log file.
    pub log_path: std::path::PathBuf,
    /// Target frame rate
    pub frame_rate: u32,
    /// Seed for every random choice. A new show every time when not set.
    pub seed: Option<u64>,
    /// Trails and the final fade to black.
    pub scene: hanabi_core::SceneConfig,
    /// How the show is generated.
    pub show: crate::show::ShowConfig,
}

impl Default for Config {
    fn default() -> Self {
        let log_directory = match dirs::state_dir() {
            Some(directory) => directory,
            None => std::path::PathBuf::new().join("./"),
        };
        let log_path = log_directory.join("hanabi").join("hanabi.log");

        Self {
            log_level: LogLevel::Off,
            log_path,
            frame_rate: 60,
            seed: None,
            scene: hanabi_core::SceneConfig::default(),
            show: crate::show::ShowConfig::default(),
        }
    }
}

impl Config {
    /// Get the stable location of Hanabi's config directory on the user's system.
    pub fn default_directory() -> Result<std::path::PathBuf> {
        Ok(dirs::config_dir()
            .context("Couldn't get standard config directory")?
            .join("hanabi"))
    }

    /// Figure out where our config is being stored, and create the directory if needed.
    pub fn setup_directory(
        maybe_custom_path: Option<std::path::PathBuf>,
    ) -> Result<std::path::PathBuf> {
        let path = match maybe_custom_path {
            None => Self::default_directory()?,
            Some(path_string) => std::path::PathBuf::new().join(path_string),
        };

        std::fs::create_dir_all(path.clone())?;
        Ok(path)
    }

    /// Load the main config, writing the default one first if this is the first run.
    pub fn load(directory: &std::path::Path, file_name: &std::path::Path) -> Result<Self> {
        let config_path = directory.join(file_name);
        let is_default_config = file_name.as_os_str() == crate::cli_args::DEFAULT_CONFIG_FILE_NAME;
        if is_default_config && !config_path.exists() {
            tracing::info!("Writing default config to: {config_path:?}");
            std::fs::write(config_path.clone(), DEFAULT_CONFIG)?;
        }

        let result = std::fs::read_to_string(config_path.clone());
        match result {
            Ok(data) => {
                tracing::trace!("Using config file:\n{data}");
                Self::parse(&data)
            }
            Err(err) => {
                tracing::error!("Loading config: {err:?}");
                color_eyre::eyre::bail!(
                    "Couldn't load config at {config_path:?}: {}",
                    err.to_string()
                );
            }
        }
    }

    /// Parse config from a TOML string.
    pub fn parse(data: &str) -> Result<Self> {
        Ok(toml::from_str::<Self>(data)?)
    }
}

#[cfg(test)]
#[expect(
    clippy::unwrap_used,
    clippy::float_cmp,
    reason = "Tests aren't so strict"
)]
mod test {
    use super::*;

    #[test]
    fn shipped_default_config_matches_defaults() {
        let shipped = Config::parse(DEFAULT_CONFIG).unwrap();
        let defaults = Config::default();
        assert_eq!(shipped.log_level, defaults.log_level);
        assert_eq!(shipped.frame_rate, defaults.frame_rate);
        assert_eq!(shipped.seed, defaults.seed);
        assert_eq!(shipped.scene, defaults.scene);
        assert_eq!(shipped.show, defaults.show);
    }

    #[test]
    fn writes_default_config_on_first_run() {
        let directory = tempfile::tempdir().unwrap();
        let file_name = std::path::Path::new(crate::cli_args::DEFAULT_CONFIG_FILE_NAME);

        let config = Config::load(directory.path(), file_name).unwrap();

        assert!(directory.path().join(file_name).exists());
        assert_eq!(config.frame_rate, 60);
    }

    #[test]
    fn partial_config() {
        let config = Config::parse(
            r##"
                frame_rate = 24
                seed = 42

                [scene]
                fadeout_steps = 10

                [show]
                count = 3
                pattern = "peony"

                [show.firework]
                colour = "#00ff00"
            "##,
        )
        .unwrap();

        assert_eq!(config.frame_rate, 24);
        assert_eq!(config.seed, Some(42));
        assert_eq!(config.scene.fadeout_steps, 10);
        assert_eq!(config.scene.trail_alpha, hanabi_core::scene::CANVAS_FILL_OPACITY);
        assert_eq!(config.show.count, 3);
        assert_eq!(config.show.pattern, Some(hanabi_core::Pattern::Peony));
        assert_eq!(config.show.firework.colour.as_deref(), Some("#00ff00"));
        assert_eq!(config.show.spacing, 1500.0);
    }

    #[test]
    fn custom_config_file_must_exist() {
        let directory = tempfile::tempdir().unwrap();
        let result = Config::load(directory.path(), std::path::Path::new("custom.toml"));
        assert!(result.is_err());
    }

    #[test]
    fn bad_config_is_an_error() {
        assert!(Config::parse("frame_rate = \"fast\"").is_err());
    }
}
