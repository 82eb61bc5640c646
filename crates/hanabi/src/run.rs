//! Main entrypoint for running Hanabi

use clap::Parser as _;
use color_eyre::eyre::{ContextCompat as _, Result};
use rand::{Rng as _, SeedableRng as _};
use tracing_subscriber::{layer::SubscriberExt as _, util::SubscriberInitExt as _, Layer as _};

use hanabi_core::{CancellationHandle, Scene};

use crate::canvas::Canvas;
use crate::cli_args::CliArgs;
use crate::config::{Config, LogLevel};
use crate::input::Input;
use crate::renderer::Renderer;

/// Commands to control the various tasks/threads
#[non_exhaustive]
#[derive(Clone, Debug)]
pub(crate) enum Protocol {
    /// The entire application is exiting.
    End,
}

/// Everything worked out before the show starts.
#[derive(Debug)]
pub(crate) struct Settings {
    /// Arguments from the command line.
    pub cli_args: CliArgs,
    /// The config file, with any CLI overrides applied.
    pub config: Config,
    /// Whether a log file is being written.
    pub is_logging: bool,
}

/// Main entrypoint
pub(crate) async fn run(settings: &Settings) -> Result<()> {
    let config = &settings.config;
    let mut rng = match config.seed {
        Some(seed) => rand::rngs::StdRng::seed_from_u64(seed),
        None => rand::rngs::StdRng::from_entropy(),
    };

    if settings.cli_args.print_show {
        return print_show(config, &mut rng);
    }

    let tty_size = Renderer::get_users_tty_size()?;
    let canvas = Canvas::for_terminal(tty_size.cols, tty_size.rows);
    let plan = crate::show::plan(&config.show, pixel_height(tty_size.rows), &mut rng);
    let fireworks = crate::show::build(&plan)?;

    let mut scene = Scene::new(canvas, config.scene.clone()).with_seed(rng.gen());
    for firework in fireworks {
        scene.add(firework);
    }

    let cancel = CancellationHandle::new();
    let (protocol_tx, _) = tokio::sync::broadcast::channel(16);
    let interrupt_handle = watch_for_interrupt(protocol_tx.clone(), cancel.clone());
    let input_thread_handle = Input::start(protocol_tx.clone(), cancel.clone());
    let renderer = Renderer::start(scene, config.frame_rate, cancel, protocol_tx.clone());

    let render_result = renderer.await;
    broadcast_protocol_end(&protocol_tx);
    render_result??;
    interrupt_handle.await??;

    if input_thread_handle.is_finished() {
        // The STDIN loop blocks on reading, so it can't exit its loop until the user presses a
        // key. Therefore we should only join it if it finished due of its own error.
        input_thread_handle
            .join()
            .map_err(|err| color_eyre::eyre::eyre!("STDIN handle: {err:?}"))??;
    }

    tracing::trace!("Leaving Hanabi's main `run()` function");
    Ok(())
}

/// The height, in canvas pixels, of a terminal with the given number of rows.
#[expect(
    clippy::as_conversions,
    clippy::cast_precision_loss,
    reason = "Terminals are nowhere near f32's precision limit"
)]
fn pixel_height(rows: usize) -> f32 {
    (rows * 2) as f32
}

/// Print the show plan as JSON rather than displaying it.
#[expect(
    clippy::print_stdout,
    reason = "It's our central place for communicating with the user on CLI"
)]
fn print_show(config: &Config, rng: &mut rand::rngs::StdRng) -> Result<()> {
    let height = match Renderer::get_users_tty_size() {
        Ok(size) => pixel_height(size.rows),
        Err(error) => {
            tracing::debug!("No TTY size ({error:?}), planning for the reference height");
            config.show.reference_height
        }
    };
    let plan = crate::show::plan(&config.show, height, rng);
    println!("{}", serde_json::to_string_pretty(&plan)?);
    Ok(())
}

/// Stop the show when the process is interrupted.
fn watch_for_interrupt(
    protocol_tx: tokio::sync::broadcast::Sender<Protocol>,
    cancel: CancellationHandle,
) -> tokio::task::JoinHandle<Result<()>> {
    let mut protocol_rx = protocol_tx.subscribe();
    tokio::spawn(async move {
        #[expect(
            clippy::integer_division_remainder_used,
            reason = "This is caused by the `tokio::select!`"
        )]
        loop {
            tokio::select! {
                result = tokio::signal::ctrl_c() => {
                    result?;
                    tracing::debug!("Caught interrupt signal");
                    cancel.cancel();
                    broadcast_protocol_end(&protocol_tx);
                    break;
                }
                Ok(message) = protocol_rx.recv() => {
                    if matches!(message, Protocol::End) {
                        break;
                    }
                }
            }
        }

        tracing::debug!("Leaving interrupt watcher");
        Ok(())
    })
}

/// Signal all task/thread loops to exit.
///
/// We keep it in its own function because we need to handle the error separately. If the error
/// were to be bubbled with `?` as usual, there's a chance it would never be logged, because the
/// protocol end signal is itself what allows the central error handler to even be reached.
pub(crate) fn broadcast_protocol_end(protocol_tx: &tokio::sync::broadcast::Sender<Protocol>) {
    tracing::debug!("Broadcasting the protocol `End` message to all listeners");
    let result = protocol_tx.send(Protocol::End);
    if let Err(error) = result {
        tracing::trace!("No one left to hear `End`: {error:?}");
    }
}

/// Prepare the application to start.
pub(crate) fn setup() -> Result<Settings> {
    let cli_args = CliArgs::parse();

    let directory_result = Config::setup_directory(cli_args.config_dir.clone());
    let directory = match directory_result {
        Ok(directory) => directory,
        Err(directory_error) => {
            color_eyre::eyre::bail!("Error setting up config directory: {directory_error:?}");
        }
    };

    let config_result = Config::load(&directory, &cli_args.main_config);
    let mut config = match config_result {
        Ok(config) => config,
        Err(config_error) => {
            let path = directory.join(&cli_args.main_config);
            color_eyre::eyre::bail!(
                "Bad config file: {config_error:?}\n\nConfig path: {}",
                path.display()
            );
        }
    };

    apply_cli_overrides(&cli_args, &mut config);
    let is_logging = setup_logging(&cli_args, &mut config)?;

    tracing::info!("Starting Hanabi");
    tracing::debug!("Loaded config: {config:?}");

    Ok(Settings {
        cli_args,
        config,
        is_logging,
    })
}

/// Anything given on the command line wins over the config file.
fn apply_cli_overrides(cli_args: &CliArgs, config: &mut Config) {
    if let Some(seed) = cli_args.seed {
        config.seed = Some(seed);
    }
    if let Some(count) = cli_args.count {
        config.show.count = count;
    }
    if let Some(pattern) = cli_args.pattern {
        config.show.pattern = Some(pattern);
    }
}

/// Setup logging. Returns whether a log file is being written.
fn setup_logging(cli_args: &CliArgs, config: &mut Config) -> Result<bool> {
    let are_log_filters_manually_set = std::env::var("HANABI_LOG").is_ok();

    if let Some(cli_override_path) = cli_args.log_path.clone() {
        config.log_path = cli_override_path;
    }
    if let Some(cli_override_level) = cli_args.log_level.clone() {
        config.log_level = cli_override_level;
    }
    let level_as_string = format!("{:?}", config.log_level).to_lowercase();

    let is_loggable = !matches!(config.log_level, LogLevel::Off) || are_log_filters_manually_set;
    if !is_loggable {
        return Ok(false);
    }

    let directory = config
        .log_path
        .parent()
        .context("Couldn't get log path's parent")?;
    std::fs::create_dir_all(directory)?;
    let file = std::fs::File::create(&config.log_path)?;

    let filters = if are_log_filters_manually_set {
        tracing_subscriber::EnvFilter::builder()
            .with_default_directive("error".parse()?)
            .with_env_var("HANABI_LOG")
            .from_env_lossy()
    } else {
        tracing_subscriber::EnvFilter::builder()
            .with_default_directive("off".parse()?)
            .from_env_lossy()
            .add_directive(format!("hanabi={level_as_string}").parse()?)
            .add_directive(format!("hanabi_core={level_as_string}").parse()?)
    };

    let logfile_layer = tracing_subscriber::fmt::layer()
        .with_writer(file)
        .with_ansi(false)
        .with_filter(filters);

    tracing_subscriber::registry().with(logfile_layer).init();

    Ok(true)
}

#[cfg(test)]
#[expect(clippy::unwrap_used, reason = "Tests aren't so strict")]
mod test {
    use clap::Parser as _;

    use super::*;

    #[test]
    fn cli_overrides_config() {
        let cli_args = CliArgs::try_parse_from([
            "hanabi", "--seed", "9", "--count", "2", "--pattern", "palm",
        ])
        .unwrap();
        let mut config = Config::default();

        apply_cli_overrides(&cli_args, &mut config);

        assert_eq!(config.seed, Some(9));
        assert_eq!(config.show.count, 2);
        assert_eq!(config.show.pattern, Some(hanabi_core::Pattern::Palm));
    }

    #[test]
    fn no_cli_overrides_keeps_config() {
        let cli_args = CliArgs::try_parse_from(["hanabi"]).unwrap();
        let mut config = Config::default();
        config.seed = Some(3);

        apply_cli_overrides(&cli_args, &mut config);

        assert_eq!(config.seed, Some(3));
        assert_eq!(config.show.count, 30);
        assert_eq!(config.show.pattern, None);
    }

    #[test]
    fn terminal_rows_are_2_pixels_high() {
        assert!((pixel_height(24) - 48.0).abs() < f32::EPSILON);
    }
}
