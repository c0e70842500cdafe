//! Fetch a JSON or XML resource and print the outcome.
//!
//! Run with: cargo run --example fetch -- https://ci.example.com/api/json -p tree=jobs[name]

use anyhow::{bail, Result};
use clap::Parser;
use courier::{Params, RequestClient, RequestConfig};
use futures::StreamExt;
use std::time::Duration;
use tracing::{error, info, Level};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser, Debug)]
#[command(name = "fetch")]
#[command(about = "Fetch a resource through the courier request pipeline")]
struct Args {
    /// Resource URL
    url: String,

    /// Expect an XML document instead of JSON
    #[arg(long)]
    xml: bool,

    /// Query parameter as key=value (repeatable)
    #[arg(short, long = "param")]
    params: Vec<String>,

    /// Client-side timeout in milliseconds
    #[arg(short, long, default_value = "20000")]
    timeout: u64,

    /// Session cookie to clear when the server answers 401
    #[arg(long)]
    auth_cookie: Option<String>,

    #[arg(short, long)]
    username: Option<String>,

    #[arg(long)]
    password: Option<String>,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,
}

fn parse_params(raw: &[String]) -> Result<Params> {
    let mut params = Params::new();
    for pair in raw {
        let Some((key, value)) = pair.split_once('=') else {
            bail!("Invalid parameter '{}', expected key=value", pair);
        };
        params.insert(key, value);
    }
    Ok(params)
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let log_level = if args.debug { Level::DEBUG } else { Level::INFO };
    FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .with_thread_ids(false)
        .compact()
        .init();

    let mut config = RequestConfig::new(&args.url)
        .with_timeout(Duration::from_millis(args.timeout));
    if !args.params.is_empty() {
        config = config.with_data(parse_params(&args.params)?);
    }
    if let Some(name) = args.auth_cookie {
        config = config.with_auth_cookie(name);
    }
    if let Some(username) = args.username {
        config = config.with_username(username);
    }
    if let Some(password) = args.password {
        config = config.with_password(password);
    }

    let client = RequestClient::new()?;
    let request = if args.xml {
        client.xml(config)
    } else {
        client.json(config)
    };

    info!("Fetching {}", args.url);
    let mut outcomes = request.stream();
    while let Some(outcome) = outcomes.next().await {
        match outcome {
            Ok(raw) => println!("{}", serde_json::to_string_pretty(&raw)?),
            Err(e) => {
                error!("{}", e);
                println!("{}", serde_json::to_string_pretty(&e)?);
                // 2 when the server was never reached, 1 when it answered badly.
                std::process::exit(if e.is_connectivity() { 2 } else { 1 });
            }
        }
    }

    Ok(())
}
