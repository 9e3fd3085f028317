use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// sdkscope - check declared methods against versioned platform reference archives
#[derive(Debug, Parser)]
#[command(name = "sdkscope", version, about, long_about = None)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOptions,

    #[command(subcommand)]
    pub command: Command,
}

/// Options shared across all subcommands.
#[derive(Debug, Parser)]
pub struct GlobalOptions {
    /// Emit output as JSON instead of human-readable text.
    #[arg(long, global = true)]
    pub json: bool,

    /// Enable verbose (debug-level) logging output.
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Validate the methods of a declaration manifest against every applicable SDK.
    Check {
        /// Properties file mapping SDK versions to reference archives.
        #[arg(long, value_name = "FILE")]
        sdks: PathBuf,

        /// JSON manifest of declared methods.
        #[arg(value_name = "MANIFEST")]
        manifest: PathBuf,
    },

    /// List the method table of a class in one SDK's reference archive.
    Methods {
        /// Properties file mapping SDK versions to reference archives.
        #[arg(long, value_name = "FILE")]
        sdks: PathBuf,

        /// SDK version to read from.
        #[arg(long, value_name = "N")]
        sdk: u32,

        /// Fully qualified class name, e.g. android.view.View.
        #[arg(value_name = "CLASS")]
        class: String,
    },

    /// List configured SDK versions, optionally restricted to a range.
    Versions {
        /// Properties file mapping SDK versions to reference archives.
        #[arg(long, value_name = "FILE")]
        sdks: PathBuf,

        /// Lowest version to include.
        #[arg(long, value_name = "N")]
        min: Option<u32>,

        /// Highest version to include.
        #[arg(long, value_name = "N")]
        max: Option<u32>,
    },
}
