pub mod config;
pub mod test_key;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "codeshade")]
#[command(author, version, about = "Configuration tooling for the codeshade desktop overlay")]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Configuration management
    Config(config::ConfigArgs),

    /// Check an API key against its provider
    TestKey(test_key::TestKeyArgs),
}
