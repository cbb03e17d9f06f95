use std::process::ExitCode;
use std::sync::Arc;

use clap::{ArgAction, Parser};
use shotgrab::{
    Config, GrabDependencies, GrabError, GrabRequest, Location, Platform, perform_grab,
};

/// Nothing was found on the clipboard or on disk.
const EXIT_NOT_FOUND: u8 = 1;
/// Usage error (clap exits with 2 itself) or operational failure.
const EXIT_FAILURE: u8 = 2;

#[derive(Parser, Debug)]
#[command(name = "shotgrab")]
#[command(
    version,
    about = "Grab the latest screenshot from the clipboard or Desktop into a temp file",
    after_help = "Prints two lines on success: the source (\"clipboard\" or the original \
                  file path) and the temp file path.\n\
                  Exit status: 0 found, 1 nothing found, 2 error."
)]
struct Cli {
    /// Only read the clipboard, never touch files on disk
    #[arg(long, short = 'c', action = ArgAction::SetTrue)]
    clipboard: bool,

    /// Look in Downloads instead of Desktop (the file is moved, not trashed)
    #[arg(long, short = 'd', action = ArgAction::SetTrue)]
    downloads: bool,

    /// Log diagnostics to stderr
    #[arg(long, short = 'v', action = ArgAction::SetTrue)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let default_filter = if cli.verbose { "debug" } else { "off" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();

    let config = Config::load().unwrap_or_else(|e| {
        log::warn!("Failed to load config: {}. Using defaults.", e);
        Config::default()
    });

    let platform = Platform::detect();
    log::debug!("Platform: {:?}", platform);

    let request = GrabRequest {
        clipboard_only: cli.clipboard,
        location: if cli.downloads {
            Location::Downloads
        } else {
            Location::Desktop
        },
        window: config.window(),
    };

    let result = match GrabDependencies::for_platform(platform, &config) {
        Ok(dependencies) => perform_grab(request, Arc::new(dependencies)).await,
        Err(e) => Err(e),
    };

    match result {
        Ok(outcome) => {
            println!("{}", outcome.source);
            println!("{}", outcome.temp_path.display());
            ExitCode::SUCCESS
        }
        Err(GrabError::NotFound) => {
            log::info!("No image found");
            ExitCode::from(EXIT_NOT_FOUND)
        }
        Err(e) => {
            eprintln!("shotgrab: {}", e);
            ExitCode::from(EXIT_FAILURE)
        }
    }
}
