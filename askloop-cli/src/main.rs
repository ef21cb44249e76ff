use askloop_core::utils::*;
use clap::Parser;
use eyre::{Context, Result};
use log::info;
use std::fs;
use std::io;
use std::path::PathBuf;

/// Asks for a customer's last name and age, re-prompting until both are valid.
#[derive(Debug, Parser)]
#[command(name = "askloop", version, about)]
struct Cli {
    /// JSON file with read settings (flags below override it)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Maximum attempts per question (unlimited if omitted)
    #[arg(short, long)]
    retries: Option<u32>,

    /// Report only the first failing rule per attempt
    #[arg(long)]
    single_diagnostic: bool,

    /// Keep the rest of the line after a failed attempt
    #[arg(long)]
    no_flush: bool,

    /// Message shown when the input cannot be parsed
    #[arg(long)]
    format_error: Option<String>,
}

impl Cli {
    fn read_config(&self) -> Result<ReadConfig> {
        let mut config = match &self.config {
            Some(path) => {
                let text = fs::read_to_string(path)
                    .with_context(|| format!("Failed to read config {}", path.display()))?;
                serde_json::from_str(&text)
                    .with_context(|| format!("Failed to parse config {}", path.display()))?
            }
            None => ReadConfig::default(),
        };

        if let Some(n) = self.retries {
            config.retries = Retries::Limited(n);
        }
        if self.single_diagnostic {
            config.diagnostics = DiagnosticMode::Single;
        }
        if self.no_flush {
            config.flush_on_error = false;
        }
        if let Some(msg) = &self.format_error {
            config.format_error = msg.clone();
        }
        Ok(config)
    }
}

fn setup_logging() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"))
        .target(env_logger::Target::Stderr)
        .init();
}

fn main() -> Result<()> {
    setup_logging();
    let cli = Cli::parse();
    let config = cli.read_config()?;
    info!("Read settings: {config:?}");

    println!("------------------------------------------------------------");
    println!("                  ASKLOOP  v{}", env!("CARGO_PKG_VERSION"));
    println!("------------------------------------------------------------");

    let mut stdin = Input::new(io::stdin().lock());

    // read_line consumes the whole line itself, so the line read never flushes
    let mut lname = String::new();
    read_line("Input customer's lastname: ", &mut lname)
        .configure(&config)
        .flush_on_error(false)
        .validate(
            |s: &String| s.chars().all(|c| c.is_ascii_alphabetic()),
            "You can only input alpha here!",
        )
        .validate(|s: &String| !s.is_empty(), "Last name can not be empty")
        .rule(Rule::NoDoubleSpace)
        .execute(&mut stdin)
        .wrap_err("No valid last name given")?;

    let mut age = 0u8;
    prompt("Input customer's age: ", &mut age)
        .configure(&config)
        .validate_with(between(1u8, 150))
        .execute(&mut stdin)
        .wrap_err("No valid age given")?;

    println!("Success: {lname}, {age}");
    Ok(())
}
