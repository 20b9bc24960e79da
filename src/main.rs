//! avprobe
//!
//! Prints container and stream details for media files, URIs and pipes.
//!
//! # Usage
//!
//! ```bash
//! avprobe movie.mkv
//! avprobe --output text -r ~/Videos
//! cat clip.ts | avprobe -
//! ```

use std::process::ExitCode;

use clap::Parser;

use avprobe::cli::{commands, Cli};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    match commands::run(cli).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::from(2)
        }
    }
}
