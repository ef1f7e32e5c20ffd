//! `pourover`: run a scripted demo brew, or drive a brew over stdin/stdout
//! with `--agent`.
//!
//! ```text
//! pourover [--seed N] [--grams G] [--grind S] [--temp C] [--config PATH]
//!          [--realtime] [--report]
//! pourover --agent [--config PATH]
//! ```

mod agent_mode;
mod cli;
mod demo;

use std::process::ExitCode;

use clap::Parser;

fn main() -> ExitCode {
    let options = cli::Options::parse();

    let config = match options.load_config() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("pourover: {e}");
            return ExitCode::FAILURE;
        }
    };

    if options.agent {
        agent_mode::run_agent_mode(config);
        ExitCode::SUCCESS
    } else {
        demo::run_demo(&options, config)
    }
}
