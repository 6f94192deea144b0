//! Terminal host for the adventure engine.
//!
//! Reads commands from stdin and prints replies, standing in for a chat
//! transport:
//!
//! ```text
//! start            begin a playthrough
//! choose A         pick an option (also `/choose A` or just `A`)
//! quit             leave
//! ```

use adventure_core::{AdventureConfig, AdventureEngine, DailyQuota, Response};
use clap::Parser;
use std::io::BufRead;
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "adventure", about = "Play a branching story in the terminal")]
struct Cli {
    /// Defaults config file (TOML).
    #[arg(long)]
    config: Option<PathBuf>,

    /// Optional user config layered over the defaults.
    #[arg(long, requires = "config")]
    user_config: Option<PathBuf>,

    /// Directory holding the story data and images.
    #[arg(long, default_value = "demos")]
    resources: PathBuf,

    /// Player identifier.
    #[arg(long, default_value = "player")]
    user: String,

    /// Print replies as JSON.
    #[arg(long)]
    json: bool,
}

enum Command {
    Start,
    Choose(String),
    Quit,
}

fn parse_command(line: &str, choose_command: &str) -> Command {
    let line = line.trim();
    let lowered = line.to_lowercase();
    match lowered.as_str() {
        "start" | "/start" | "/adventure" => return Command::Start,
        "quit" | "exit" | "/quit" => return Command::Quit,
        _ => {}
    }

    let rest = line
        .strip_prefix(choose_command)
        .or_else(|| line.strip_prefix("/choose"))
        .or_else(|| line.strip_prefix("choose"))
        .unwrap_or(line);
    Command::Choose(rest.to_string())
}

fn print_response(response: &Response, json: bool) -> Result<(), serde_json::Error> {
    if json {
        println!("{}", serde_json::to_string_pretty(response)?);
        return Ok(());
    }

    println!("{}", response.text);
    for media in &response.media {
        println!("[image: {}]", media.path.display());
    }
    for row in &response.choices {
        let labels: Vec<String> = row
            .iter()
            .map(|b| format!("[{}] ({})", b.label, b.action))
            .collect();
        println!("{}", labels.join("  "));
    }
    println!();
    Ok(())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let config = match (&cli.config, &cli.user_config) {
        (Some(defaults), Some(user)) => AdventureConfig::load_layered(defaults, user)?,
        (Some(defaults), None) => AdventureConfig::load(defaults)?,
        _ => AdventureConfig::default(),
    };

    let quota = DailyQuota::new(config.daily_limit);
    let engine = AdventureEngine::from_config(&config, &cli.resources, quota)?;
    tracing::info!(nodes = engine.graph().len(), user = %cli.user, "Adventure ready");

    for line in std::io::stdin().lock().lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }

        let result = match parse_command(&line, &config.choose_command) {
            Command::Quit => break,
            Command::Start => engine.start(cli.user.as_str()),
            Command::Choose(input) => engine.choose(cli.user.as_str(), &input),
        };

        match result {
            Ok(response) => print_response(&response, cli.json)?,
            Err(error) => {
                if error.is_content_defect() {
                    tracing::error!(error = %error, "Story content defect");
                }
                println!("{}\n", error.user_message(engine.messages()));
            }
        }
    }

    Ok(())
}
