//! `classroomd` — standalone binary for the classroom messaging hub.

#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]

use anyhow::Result;
use clap::Parser;

/// The classroom messaging hub daemon.
#[derive(Parser)]
#[command(name = "classroomd")]
#[command(author, version, about = "Classroom messaging hub daemon")]
struct Args {
    /// Path to a configuration file, overriding the default discovery chain.
    #[arg(long, env = "CLASSROOM_CONFIG_FILE")]
    config: Option<std::path::PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let server = classroom_server::run(args.config.as_deref()).await?;
    println!("classroomd listening on {}", server.local_addr);

    server.wait_for_shutdown().await?;
    println!("classroomd stopped");
    Ok(())
}
