//! # prompt-booster
//!
//! Improve prompts with a hosted LLM, run the improved prompt, and keep a
//! short local history of the sessions.

mod cli;
mod core;
mod run;

use clap::Parser;
use dotenv::dotenv;

use crate::cli::Args;

#[tokio::main]
async fn main() {
    // Load environment variables from .env file
    dotenv().ok();

    let args = Args::parse();
    run::init_logger(&args);

    if let Err(e) = run::dispatch(args).await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
