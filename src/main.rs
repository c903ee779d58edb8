// SPDX-License-Identifier: GPL-3.0-only

//! ResolutionMaster command-line host
//!
//! Loads the preset store, runs one command, and saves the store back when
//! the command changed it. Logs go to stderr so exported JSON on stdout stays
//! clean; set `RUST_LOG` to adjust verbosity.

use clap::Parser;
use resolution_master::cli::{self, CliArgs};

fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("resolution_master=info".parse()?),
        )
        .init();

    cli::run(CliArgs::parse())
}
