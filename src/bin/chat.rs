//! Chat front-end
//!
//! Line-based chat over one in-memory banking service. Every line goes
//! through the shared chat interpreter; /exit leaves.

use std::io::{self, Write};

use anyhow::Result;

use corebank::chat;
use corebank::service::Bank;
use corebank::Config;

fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .init();

    let config = Config::from_env()?;
    let mut bank = Bank::with_policy(config.policy());

    println!("\nBanking assistant started. Type messages to talk.");
    println!("Use commands starting with '/' to act. Type /help for the options.\n");

    loop {
        print!("you> ");
        io::stdout().flush()?;

        let mut line = String::new();
        if io::stdin().read_line(&mut line)? == 0 {
            break;
        }
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if line.eq_ignore_ascii_case("/exit") {
            break;
        }

        println!("{}\n", chat::interpret(&mut bank, line));
    }

    println!("Chat ended. Goodbye!");
    Ok(())
}
