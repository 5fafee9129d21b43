use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use ledgerly::cli::Cli;
use tokio::sync::Notify;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    cli.init_logging()?;

    let interrupt = Arc::new(Notify::new());
    let mut session = std::pin::pin!(cli.run(interrupt.clone()));

    tokio::select! {
        result = &mut session => return result,
        _ = tokio::signal::ctrl_c() => {}
    }

    // First Ctrl-C: let the session save pending changes and wind down.
    // A second one leaves immediately.
    interrupt.notify_one();
    let code = tokio::select! {
        result = &mut session => match result {
            Ok(()) => 0,
            Err(err) => {
                eprintln!("Error: {:#}", err);
                1
            }
        },
        _ = tokio::signal::ctrl_c() => {
            println!("\nExiting the application. Goodbye!");
            0
        }
    };
    // The abandoned console read would otherwise hold up runtime shutdown
    std::process::exit(code);
}
