use anyhow::{Context, Result};
use clap::Parser;
use retry_post::http::{DEFAULT_MAX_ATTEMPTS, ReqwestTransport, RetryConfig, RetryingClient};
use retry_post::report::{render_json, render_text};

const DEFAULT_PAYLOAD: &str = r#"{"key":"value"}"#;

/// retry-post - resilient HTTP POST
///
/// Sends a POST request and retries server errors and network failures with
/// quartic backoff and jitter. Client errors (4xx) are never retried.
///
/// Examples:
///   retry-post http://localhost:5512/              # Post the default payload
///   retry-post -n 3 -d '{"a":1}' http://host/api   # Custom payload, 3 attempts
#[derive(Parser, Debug)]
#[command(author, version = env!("RETRY_POST_VERSION"), about)]
struct Cli {
    /// Target endpoint
    #[arg(value_name = "URL", env = "RETRY_POST_URL")]
    url: String,

    /// Request payload
    #[arg(short = 'd', long = "data", value_name = "DATA", default_value = DEFAULT_PAYLOAD)]
    data: String,

    /// Maximum number of attempts, including the first one
    #[arg(
        short = 'n',
        long = "max-attempts",
        env = "RETRY_POST_MAX_ATTEMPTS",
        value_name = "N",
        default_value_t = DEFAULT_MAX_ATTEMPTS,
        value_parser = clap::value_parser!(u32).range(1..)
    )]
    max_attempts: u32,

    /// Log response status, errors and backoff timing
    #[arg(short, long, env = "RETRY_POST_VERBOSE")]
    verbose: bool,

    /// Print the response as JSON
    #[arg(long)]
    json: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_filter = if cli.verbose { "info" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();

    let transport = ReqwestTransport::new().context("Failed to create HTTP client")?;
    let client = RetryingClient::new(
        transport,
        RetryConfig {
            max_attempts: cli.max_attempts,
            verbose: cli.verbose,
        },
    );

    let response = client
        .post(&cli.url, cli.data.as_bytes(), cli.max_attempts)
        .await
        .context("Unable to post message")?;

    if cli.json {
        println!("{}", render_json(&response)?);
    } else {
        println!("{}", render_text(&response));
    }

    Ok(())
}
