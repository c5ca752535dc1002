use anyhow::{Context, Result};
use clap::Parser;
use httpcall::http::{Headers, JsonObject, RequestConfig, RequestExecutor, Verb};
use std::path::PathBuf;
use std::time::Duration;

/// httpcall - send one HTTP request and print the JSON object it returns
///
/// Request and response details are logged to stderr; use --release to
/// silence them. The response payload goes to stdout.
///
/// Examples:
///   httpcall get /users/1 --base-url https://api.example.com
///   httpcall post /users --data '{"name":"a"}' --base-url https://api.example.com
///   httpcall multipart /upload --field title=report --file doc=./report.pdf
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Cli {
    /// get, post, put, patch, delete or multipart
    #[arg(value_name = "VERB")]
    verb: Verb,

    /// Endpoint path appended to the base URL
    #[arg(value_name = "PATH")]
    path: String,

    /// Base URL of the service
    #[arg(long = "base-url", short = 'b', env = "HTTPCALL_BASE_URL", value_name = "URL")]
    base_url: String,

    /// Request body: a JSON object for post, sent verbatim for put and patch
    #[arg(long, short = 'd', value_name = "BODY")]
    data: Option<String>,

    /// Send the post body form-urlencoded instead of as JSON
    #[arg(long)]
    form: bool,

    /// Multipart text field
    #[arg(long = "field", value_name = "KEY=VALUE", value_parser = parse_key_value)]
    fields: Vec<(String, String)>,

    /// Multipart file part, streamed from PATH
    #[arg(long = "file", value_name = "KEY=PATH", value_parser = parse_key_value)]
    files: Vec<(String, String)>,

    /// Extra header merged over the defaults (repeatable)
    #[arg(long = "header", short = 'H', value_name = "NAME=VALUE", value_parser = parse_key_value)]
    headers: Vec<(String, String)>,

    /// Send exactly these headers and nothing else (repeatable)
    #[arg(long = "only-header", value_name = "NAME=VALUE", value_parser = parse_key_value)]
    only_headers: Vec<(String, String)>,

    /// Timeout in seconds
    #[arg(long, short = 't', env = "HTTPCALL_TIMEOUT", default_value_t = 30.0)]
    timeout: f64,

    /// Check network reachability before sending
    #[arg(long = "check-network")]
    check_network: bool,

    /// Suppress all request and response logging
    #[arg(long, env = "HTTPCALL_RELEASE")]
    release: bool,

    /// Name used to tag log lines
    #[arg(long, value_name = "NAME")]
    service: Option<String>,
}

impl Cli {
    fn request_config(&self) -> Result<RequestConfig> {
        let timeout = Duration::try_from_secs_f64(self.timeout)
            .with_context(|| format!("Invalid timeout: {}", self.timeout))?;

        let mut builder = RequestConfig::builder(&self.base_url, &self.path)
            .check_network(self.check_network)
            .release_mode(self.release)
            .timeout(timeout);

        if !self.headers.is_empty() {
            builder = builder.additional_headers(to_headers(&self.headers));
        }
        if !self.only_headers.is_empty() {
            builder = builder.use_only_these_headers(to_headers(&self.only_headers));
        }
        if let Some(service) = &self.service {
            builder = builder.service_name(service);
        }
        Ok(builder.build())
    }
}

fn parse_key_value(s: &str) -> Result<(String, String), String> {
    match s.split_once('=') {
        Some((key, value)) if !key.is_empty() => Ok((key.to_string(), value.to_string())),
        _ => Err(format!("expected KEY=VALUE, got '{}'", s)),
    }
}

fn to_headers(pairs: &[(String, String)]) -> Headers {
    pairs.iter().cloned().collect()
}

fn parse_object(data: Option<&str>) -> Result<JsonObject> {
    match data {
        Some(text) => serde_json::from_str(text).context("--data must be a JSON object"),
        None => Ok(JsonObject::new()),
    }
}

async fn run(cli: &Cli) -> Result<JsonObject> {
    let executor = RequestExecutor::new(cli.request_config()?)?;

    let outcome = match cli.verb {
        Verb::Get => executor.get().await,
        Verb::Delete => executor.delete().await,
        Verb::Post => {
            let body = parse_object(cli.data.as_deref())?;
            executor.post(&body, cli.form).await
        }
        Verb::Put => executor.put(cli.data.clone().unwrap_or_default()).await,
        Verb::Patch => executor.patch(cli.data.clone().unwrap_or_default()).await,
        Verb::MultipartPost => {
            let fields = cli.fields.iter().cloned().collect();
            let files = cli
                .files
                .iter()
                .map(|(k, v)| (k.clone(), PathBuf::from(v)))
                .collect();
            executor.post_multipart(fields, files).await
        }
    };

    Ok(outcome?)
}

/// Default log filter, or `None` when no logger should be installed at all.
/// Release mode wins over `RUST_LOG`.
fn default_log_filter(release: bool) -> Option<&'static str> {
    if release {
        None
    } else {
        Some("warn,httpcall=info")
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    if let Some(filter) = default_log_filter(cli.release) {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(filter)).init();
    }

    let payload = run(&cli).await?;
    println!("{}", serde_json::to_string_pretty(&payload)?);
    Ok(())
}
