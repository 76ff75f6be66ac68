use anyhow::{Context, Result};
use bytes::Bytes;
use clap::Parser;
use dynamo_http::config::{HttpConfig, parse_millis};
use dynamo_http::http::{Headers, Http, HttpClient};
use std::io::Write;
use std::path::PathBuf;
use std::time::Duration;
use url::Url;

/// dynamo-http - DynamoDB HTTP transport
///
/// Sends a single request through the same transport the DynamoDB client uses
/// and prints the result. Useful for checking endpoints, proxies and timeouts.
///
/// Examples:
///   dynamo-http get http://169.254.169.254/latest/meta-data/
///   dynamo-http post http://localhost:8000 -H x-amz-target:DynamoDB_20120810.ListTables --body '{}'
#[derive(Parser, Debug)]
#[command(author, version = env!("DYNAMO_HTTP_VERSION"), about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[command(flatten)]
    config: HttpConfig,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Fetch a URL and write the raw body to stdout
    Get(GetArgs),

    /// Post a body and print the JSON object returned
    Post(PostArgs),
}

#[derive(clap::Args, Debug)]
struct GetArgs {
    #[arg(value_name = "URL")]
    url: Url,

    /// Request header, may be repeated
    #[arg(short = 'H', long = "header", value_name = "NAME:VALUE", value_parser = parse_header)]
    headers: Vec<(String, String)>,

    /// Timeout for this request in milliseconds
    #[arg(long = "timeout-ms", value_name = "MS", default_value = "10000", value_parser = parse_millis)]
    timeout: Duration,
}

#[derive(clap::Args, Debug)]
#[command(group = clap::ArgGroup::new("payload").required(true))]
struct PostArgs {
    #[arg(value_name = "URL")]
    url: Url,

    /// Request header, may be repeated
    #[arg(short = 'H', long = "header", value_name = "NAME:VALUE", value_parser = parse_header)]
    headers: Vec<(String, String)>,

    /// Request body
    #[arg(long, group = "payload")]
    body: Option<String>,

    /// Read the request body from a file
    #[arg(long = "body-file", value_name = "PATH", group = "payload")]
    body_file: Option<PathBuf>,
}

impl PostArgs {
    fn payload(&self) -> Result<Bytes> {
        match (&self.body, &self.body_file) {
            (Some(body), _) => Ok(Bytes::from(body.clone())),
            (None, Some(path)) => std::fs::read(path)
                .map(Bytes::from)
                .with_context(|| format!("Failed to read body from {:?}", path)),
            (None, None) => anyhow::bail!("Either --body or --body-file is required"),
        }
    }
}

fn parse_header(s: &str) -> Result<(String, String), String> {
    let (name, value) = s
        .split_once(':')
        .ok_or_else(|| format!("Invalid header '{}'. Expected NAME:VALUE.", s))?;
    let name = name.trim();
    if name.is_empty() {
        return Err(format!("Invalid header '{}'. Header name is empty.", s));
    }
    Ok((name.to_string(), value.trim().to_string()))
}

fn to_headers(pairs: Vec<(String, String)>) -> Option<Headers> {
    if pairs.is_empty() {
        None
    } else {
        Some(pairs.into_iter().collect())
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let cli = Cli::parse();

    let client = HttpClient::new(cli.config.build_client()?);

    match cli.command {
        Commands::Get(args) => {
            let headers = to_headers(args.headers);
            let body = client.get(&args.url, headers.as_ref(), args.timeout).await?;
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(&body)?;
            stdout.flush()?;
        }
        Commands::Post(args) => {
            let payload = args.payload()?;
            let headers = to_headers(args.headers);
            let object = client.post(&args.url, payload, headers.as_ref()).await?;
            println!("{}", serde_json::to_string_pretty(&object)?);
        }
    }
    Ok(())
}
