use anyhow::Result;
use clap::{Parser, Subcommand};

use prism::cli;
use prism::config;
use prism::web;

#[derive(Debug, Parser)]
#[command(name = "prism")]
#[command(about = "Payload Rendering and Inspection of Streamed Messages")]
struct App {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Inspect a captured request body
    Request {
        /// Payload source: file path, `-` for stdin, or an http(s) URL
        input: String,
        /// Output format: table (default), json, csv
        #[arg(long, default_value = "table")]
        format: String,
        /// Write the rendered HTML inspection document to this path
        #[arg(long, short)]
        output: Option<String>,
    },
    /// Inspect a captured response body or SSE stream
    Response {
        /// Payload source: file path, `-` for stdin, or an http(s) URL
        input: String,
        /// Treat the input as a streamed SSE capture (skips detection)
        #[arg(long)]
        streaming: bool,
        /// Output format: table (default), json, csv
        #[arg(long, default_value = "table")]
        format: String,
        /// Write the rendered HTML inspection document to this path
        #[arg(long, short)]
        output: Option<String>,
    },
    /// Show tool usage and message statistics for a request payload
    Stats {
        /// Payload source: file path, `-` for stdin, or an http(s) URL
        input: String,
        /// Output format: table (default), json, csv
        #[arg(long, default_value = "table")]
        format: String,
    },
    /// Write the analysis document for a payload
    Export {
        /// Payload source: file path, `-` for stdin, or an http(s) URL
        input: String,
        /// Write to this path instead of stdout
        #[arg(long, short)]
        output: Option<String>,
    },
    /// Report the sniffed shape of a payload
    Detect {
        /// Payload source: file path, `-` for stdin, or an http(s) URL
        input: String,
    },
    /// Serve the web inspector dashboard
    Web {
        /// Listen address (default from config: 127.0.0.1:9747)
        #[arg(long)]
        addr: Option<String>,
    },
}

fn main() -> Result<()> {
    let app = App::parse();
    let config = config::load();

    match app.command {
        Commands::Request {
            input,
            format,
            output,
        } => {
            let fmt = cli::OutputFormat::from_str_opt(Some(&format));
            cli::run_request(&input, fmt, output.as_deref(), &config)
        }
        Commands::Response {
            input,
            streaming,
            format,
            output,
        } => {
            let fmt = cli::OutputFormat::from_str_opt(Some(&format));
            cli::run_response(&input, streaming, fmt, output.as_deref(), &config)
        }
        Commands::Stats { input, format } => {
            let fmt = cli::OutputFormat::from_str_opt(Some(&format));
            cli::run_stats(&input, fmt, &config)
        }
        Commands::Export { input, output } => cli::run_export(&input, output.as_deref(), &config),
        Commands::Detect { input } => cli::run_detect(&input, &config),
        Commands::Web { addr } => {
            let addr = addr.unwrap_or_else(|| config.web.addr.clone());
            web::serve(&addr, config.web.open_browser)
        }
    }
}
