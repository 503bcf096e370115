// Copyright 2026 Pagetext Contributors
// SPDX-License-Identifier: Apache-2.0

use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use pagetext_runtime::cli::{self, ConfigArgs};
use std::net::SocketAddr;

#[derive(Parser)]
#[command(
    name = "pagetext",
    about = "pagetext: plain text from rendered web pages and YouTube captions",
    version,
    after_help = "Run 'pagetext <command> --help' for details on each command."
)]
struct Cli {
    /// Log level filter when RUST_LOG is unset (trace, debug, info, warn, error)
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP service
    Serve {
        /// Listen address (host:port)
        #[arg(long)]
        bind: Option<SocketAddr>,

        #[command(flatten)]
        config: ConfigArgs,
    },
    /// Render one page and print its text
    Extract {
        /// Page URL
        url: String,

        /// Print the JSON response body instead of bare text
        #[arg(long)]
        json: bool,

        #[command(flatten)]
        config: ConfigArgs,
    },
    /// Fetch and print the captions of one YouTube video
    Transcript {
        /// Video URL (watch, embed, or youtu.be)
        url: String,

        /// Print the JSON response body instead of bare text
        #[arg(long)]
        json: bool,

        #[command(flatten)]
        config: ConfigArgs,
    },
    /// Check environment and show the effective configuration
    Doctor {
        #[command(flatten)]
        config: ConfigArgs,
    },
    /// Generate shell completion scripts
    Completions {
        /// Shell type (bash, zsh, fish, powershell)
        shell: Shell,
    },
}

fn init_tracing(log_level: &str, json: bool) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        tracing_subscriber::EnvFilter::new(format!(
            "pagetext={log_level},pagetext_runtime={log_level},tower_http={log_level}"
        ))
    });

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

async fn dispatch(command: Commands) -> Result<()> {
    match command {
        Commands::Serve { bind, config } => cli::serve::run(config.resolve(bind)?).await,
        Commands::Extract { url, json, config } => {
            cli::extract_cmd::run(&url, config.resolve(None)?, json).await
        }
        Commands::Transcript { url, json, config } => {
            cli::transcript_cmd::run(&url, config.resolve(None)?, json).await
        }
        Commands::Doctor { config } => cli::doctor::run(&config.resolve(None)?).await,
        Commands::Completions { shell } => {
            let mut cmd = Cli::command();
            clap_complete::generate(shell, &mut cmd, "pagetext", &mut std::io::stdout());
            Ok(())
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(&cli.log_level, cli.log_json);

    let result = dispatch(cli.command).await;

    // Consistent exit codes: 0=success, 1=error
    if let Err(e) = &result {
        eprintln!("  Error: {e:#}");
        std::process::exit(1);
    }

    result
}
