mod app;
mod commands;
mod output;

use clap::Parser;

use crate::app::{Cli, Command};

fn main() -> anyhow::Result<()> {
    ctrlc::set_handler(|| {
        eprintln!("\nCancelled.");
        std::process::exit(130);
    })?;

    let cli = Cli::parse();

    // Show sdkscope warnings on stderr unless --json; --verbose enables debug; RUST_LOG overrides
    if !cli.global.json {
        let level = if cli.global.verbose {
            log::LevelFilter::Debug
        } else {
            log::LevelFilter::Warn
        };
        env_logger::Builder::new()
            .filter_module("sdkscope", level)
            .parse_default_env()
            .target(env_logger::Target::Stderr)
            .format_timestamp(None)
            .format_module_path(false)
            .format_target(false)
            .init();
    }

    match &cli.command {
        Command::Check { sdks, manifest } => commands::check::run(sdks, manifest, &cli.global),
        Command::Methods { sdks, sdk, class } => {
            commands::methods::run(sdks, *sdk, class, &cli.global)
        }
        Command::Versions { sdks, min, max } => {
            commands::versions::run(sdks, *min, *max, &cli.global)
        }
    }
}
