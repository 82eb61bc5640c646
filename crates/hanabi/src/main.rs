//! Just `main()`. Keep as small as possible.

pub mod canvas;
pub mod cli_args;
pub mod config;
pub mod input;
pub mod renderer;
pub mod run;
pub mod show;

use color_eyre::eyre::Result;

#[expect(
    clippy::print_stdout,
    clippy::print_stderr,
    reason = "It's our central place for communicating with the user on CLI"
)]
#[tokio::main(flavor = "multi_thread")]
async fn main() -> Result<()> {
    color_eyre::install()?;
    let settings = run::setup()?;
    let result = run::run(&settings).await;

    let logpath = settings.config.log_path.display();
    tracing::debug!("Hanabi is exiting");

    match result {
        Ok(()) => {
            if settings.is_logging && !settings.cli_args.print_show {
                println!("Logs saved to {logpath}");
            }
        }
        Err(error) => {
            tracing::error!("{error:?}");
            eprintln!("Error: {error}");
            if settings.is_logging {
                eprintln!("See {logpath} for more details");
            }
        }
    }

    Ok(())
}
