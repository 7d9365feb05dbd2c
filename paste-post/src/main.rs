//! paste-post - Publish text to no-login paste hosts

use std::io::{IsTerminal, Read};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use libpastecast::logging::LoggingConfig;
use libpastecast::{
    Config, PastecastError, PlatformDescriptor, PublishOutcome, PublishRequest, PublishService,
};
use tracing::debug;

#[derive(Parser, Debug)]
#[command(name = "paste-post")]
#[command(version)]
#[command(about = "Publish text to no-login paste hosts", long_about = None)]
#[command(after_help = "\
EXIT CODES:
    0 - Published to at least one platform
    1 - Every platform failed, or a configuration error
    3 - Invalid input (empty content, unknown platform)")]
struct Cli {
    /// Content to publish (reads from stdin if not provided)
    content: Option<String>,

    /// Target platform(s), by key or alias (repeatable, comma-separated)
    #[arg(short, long, value_delimiter = ',')]
    platform: Vec<String>,

    /// Title, for hosts that support one
    #[arg(long)]
    title: Option<String>,

    /// Author name, for hosts that support one
    #[arg(long)]
    author: Option<String>,

    /// Filename for file hosts
    #[arg(long)]
    filename: Option<String>,

    /// Requested URL slug, for hosts that support one
    #[arg(long)]
    custom_url: Option<String>,

    /// List available platforms and exit
    #[arg(long)]
    list: bool,

    /// Per-platform deadline, e.g. "10s" (overrides config)
    #[arg(long, value_name = "DURATION")]
    timeout: Option<String>,

    /// Configuration file (default: ~/.config/pastecast/config.toml)
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    LoggingConfig::from_env(cli.verbose).init();

    let format = cli.format;
    match run(cli).await {
        Ok(code) => std::process::exit(code),
        Err(e) => std::process::exit(report_error(&e, format)),
    }
}

/// Print `error` and return the process exit code
fn report_error(error: &anyhow::Error, format: OutputFormat) -> i32 {
    let Some(pastecast_error) = error.downcast_ref::<PastecastError>() else {
        eprintln!("Error: {:#}", error);
        return 1;
    };

    if format == OutputFormat::Json {
        let body = match pastecast_error {
            PastecastError::UnknownPlatform(unknown) => serde_json::to_value(unknown).ok(),
            PastecastError::InvalidInput(message) => Some(serde_json::json!({
                "success": false,
                "error": message,
            })),
            _ => None,
        };
        if let Some(body) = body {
            println!("{}", body);
        }
    }

    eprintln!("Error: {}", pastecast_error);
    if let PastecastError::UnknownPlatform(unknown) = pastecast_error {
        eprintln!("Available platforms: {}", unknown.available.join(", "));
    }
    pastecast_error.exit_code()
}

async fn run(cli: Cli) -> Result<i32> {
    let config = load_config(&cli)?;
    let service = PublishService::from_config(&config)?;

    if cli.list {
        print_platforms(&service.platforms(), cli.format)?;
        return Ok(0);
    }

    let request = build_request(&cli)?;
    let platforms: Vec<String> = cli
        .platform
        .iter()
        .map(|p| p.trim().to_string())
        .filter(|p| !p.is_empty())
        .collect();
    if !cli.platform.is_empty() && platforms.is_empty() {
        return Err(PastecastError::InvalidInput(
            "--platform was given but names no platform".to_string(),
        )
        .into());
    }
    debug!("Selected platforms: {:?}", platforms);

    if let [name] = platforms.as_slice() {
        let outcome = service.publish(name, &request).await?;
        print_outcome(&outcome, cli.format)?;
        return Ok(if outcome.success { 0 } else { 1 });
    }

    let selection = (!platforms.is_empty()).then_some(platforms.as_slice());
    let response = service.publish_all(&request, selection).await?.into_response();

    match cli.format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&response)?),
        OutputFormat::Text => {
            for outcome in response.summary.results() {
                print_outcome(outcome, OutputFormat::Text)?;
            }
            eprintln!("{}", response.message);
        }
    }

    Ok(if response.success { 0 } else { 1 })
}

fn load_config(cli: &Cli) -> Result<Config> {
    let mut config = match &cli.config {
        Some(path) => Config::load_from_path(path)?,
        None => Config::load()?,
    };

    if let Some(timeout) = &cli.timeout {
        config.publish.timeout = timeout.clone();
        config.validate()?;
    }

    Ok(config)
}

fn build_request(cli: &Cli) -> Result<PublishRequest> {
    let content = match &cli.content {
        Some(content) => content.clone(),
        None => read_stdin()?,
    };

    let mut request = PublishRequest::new(content);
    if let Some(title) = &cli.title {
        request = request.with_title(title);
    }
    if let Some(author) = &cli.author {
        request = request.with_author(author);
    }
    if let Some(filename) = &cli.filename {
        request = request.with_filename(filename);
    }
    if let Some(custom_url) = &cli.custom_url {
        request = request.with_custom_url(custom_url);
    }

    Ok(request)
}

fn read_stdin() -> Result<String> {
    let mut stdin = std::io::stdin();
    if stdin.is_terminal() {
        return Err(PastecastError::InvalidInput(
            "No content provided. Pass it as an argument or pipe it on stdin".to_string(),
        )
        .into());
    }

    let mut content = String::new();
    stdin
        .read_to_string(&mut content)
        .context("Failed to read content from stdin")?;
    Ok(content)
}

fn print_outcome(outcome: &PublishOutcome, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(outcome)?),
        OutputFormat::Text => match (&outcome.url, &outcome.error) {
            (Some(url), _) if outcome.success => println!("{}: {}", outcome.platform, url),
            (_, error) => eprintln!(
                "{}: failed: {}",
                outcome.platform,
                error.as_deref().unwrap_or("unknown error")
            ),
        },
    }
    Ok(())
}

fn print_platforms(descriptors: &[PlatformDescriptor], format: OutputFormat) -> Result<()> {
    if format == OutputFormat::Json {
        println!("{}", serde_json::to_string_pretty(descriptors)?);
        return Ok(());
    }

    for descriptor in descriptors {
        let mut features = Vec::new();
        if descriptor.supports_title {
            features.push("title");
        }
        if descriptor.supports_custom_url {
            features.push("custom-url");
        }
        if descriptor.is_file_host {
            features.push("file-host");
        }

        println!(
            "{:<10} {:<10} aliases: {:<24} {}",
            descriptor.key,
            descriptor.display_name,
            descriptor.aliases.join(", "),
            features.join(", ")
        );
    }
    Ok(())
}
