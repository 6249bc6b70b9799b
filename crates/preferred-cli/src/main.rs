//! Preferred CLI - build signed choose URLs from the command line.

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod args;
mod commands;
mod output;

use args::{ClientArgs, RequestArgs};
use commands::{canonicalize, choose};

#[derive(Parser)]
#[command(name = "preferred")]
#[command(about = "Build signed Preferred Pictures choose URLs")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print a signed choose URL
    Choose {
        #[command(flatten)]
        client: ClientArgs,
        #[command(flatten)]
        request: RequestArgs,
        /// Output URL, uid, expiration and signature as JSON
        #[arg(long)]
        json: bool,
    },
    /// Print the canonical string that would be signed
    Canonicalize {
        #[command(flatten)]
        client: ClientArgs,
        #[command(flatten)]
        request: RequestArgs,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Choose {
            client,
            request,
            json,
        } => choose::run(client, request, json),
        Commands::Canonicalize { client, request } => canonicalize::run(client, request),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
