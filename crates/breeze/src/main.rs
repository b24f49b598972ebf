// SPDX-FileCopyrightText: 2026 Breeze Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Breeze control plane binary entry point.

use clap::{Parser, Subcommand};

mod serve;
mod shutdown;

/// Breeze remote-session signaling and transfer-relay control plane.
#[derive(Parser, Debug)]
#[command(name = "breeze", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Start the control plane server.
    Serve,
    /// Print the resolved configuration.
    Config,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match breeze_config::load_and_validate() {
        Ok(config) => config,
        Err(errors) => {
            breeze_config::render_errors(&errors);
            std::process::exit(1);
        }
    };

    match cli.command {
        Some(Commands::Serve) => {
            if let Err(err) = serve::run_serve(config).await {
                eprintln!("breeze serve: {err}");
                std::process::exit(1);
            }
        }
        Some(Commands::Config) => match toml::to_string_pretty(&config) {
            Ok(rendered) => println!("{rendered}"),
            Err(err) => {
                eprintln!("breeze config: {err}");
                std::process::exit(1);
            }
        },
        None => {
            println!("breeze: use --help for available commands");
        }
    }
}
