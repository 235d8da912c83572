//! Route dispatch CLI.
//!
//! # Commands
//!
//! ```text
//! match   --config routes.toml URL [--method GET]   resolve one request
//! compile PATTERN [-r name=regex]... [--path P]     show the compiled expression
//! check   --config routes.toml                      validate a route file
//! watch   --config routes.toml                      resolve `METHOD URL` lines from
//!                                                   stdin, reloading on file change
//! ```
//!
//! A miss exits with status 2.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use serde_json::json;
use tokio::io::{AsyncBufReadExt, BufReader};
use url::Url;

use route_dispatch::config::watcher::ConfigWatcher;
use route_dispatch::config::{load_config, ObservabilityConfig, RouterConfig};
use route_dispatch::observability::{logging, metrics};
use route_dispatch::routing::{compile, MatchResult, RequestContext, Requirements, Router};

/// Port assumed when a URL names none, whatever its scheme.
const DEFAULT_PORT: u16 = 80;

const NOT_FOUND: u8 = 2;

#[derive(Parser)]
#[command(name = "route-dispatch")]
#[command(about = "Compile route patterns and dispatch request paths", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve one URL against a route file
    Match {
        #[arg(short, long)]
        config: PathBuf,

        url: String,

        #[arg(short, long)]
        method: Option<String>,
    },
    /// Compile a pattern and optionally match a path against it
    Compile {
        pattern: String,

        /// Requirement as name=regex
        #[arg(short = 'r', long = "requirement", value_parser = parse_requirement)]
        requirements: Vec<(String, String)>,

        #[arg(short, long)]
        path: Option<String>,
    },
    /// Validate a route file
    Check {
        #[arg(short, long)]
        config: PathBuf,
    },
    /// Dispatch `METHOD URL` lines from stdin, reloading the route file on change
    Watch {
        #[arg(short, long)]
        config: PathBuf,
    },
}

fn parse_requirement(raw: &str) -> Result<(String, String), String> {
    raw.split_once('=')
        .map(|(name, expression)| (name.to_string(), expression.to_string()))
        .ok_or_else(|| format!("expected name=regex, got '{raw}'"))
}

fn main() -> Result<ExitCode, Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Match {
            config,
            url,
            method,
        } => {
            let config = load(&config)?;
            let router = Router::from_config(&config)?;
            let (path, context) = split_url(&url)?;
            match router.dispatch(&path, method.as_deref(), &context) {
                Ok(found) => {
                    println!("{}", serde_json::to_string_pretty(&render(&found))?);
                    Ok(ExitCode::SUCCESS)
                }
                Err(e) => {
                    eprintln!("{e}");
                    Ok(ExitCode::from(NOT_FOUND))
                }
            }
        }
        Commands::Compile {
            pattern,
            requirements,
            path,
        } => {
            let requirements: Requirements = requirements.into_iter().collect();
            let expression = compile(&pattern, &requirements)?;
            let mut output = json!({
                "expression": expression.as_str(),
                "captures": expression.captures(),
            });
            let mut code = ExitCode::SUCCESS;
            if let Some(path) = path {
                let variables = expression.match_path(&path);
                if variables.is_none() {
                    code = ExitCode::from(NOT_FOUND);
                }
                output["variables"] = json!(variables);
            }
            println!("{}", serde_json::to_string_pretty(&output)?);
            Ok(code)
        }
        Commands::Check { config } => {
            let config = load_config(&config)?;
            println!("{} routes OK", config.routes.len());
            Ok(ExitCode::SUCCESS)
        }
        Commands::Watch { config } => {
            let runtime = tokio::runtime::Runtime::new()?;
            runtime.block_on(watch(config))?;
            Ok(ExitCode::SUCCESS)
        }
    }
}

/// Load the route file and bring up logging.
fn load(path: &Path) -> Result<RouterConfig, Box<dyn std::error::Error>> {
    let config = load_config(path)?;
    logging::init_logging(&config.observability)?;
    Ok(config)
}

async fn watch(path: PathBuf) -> Result<(), Box<dyn std::error::Error>> {
    let config = match load_config(&path) {
        Ok(config) => config,
        Err(e) => {
            let _ = logging::init_logging(&ObservabilityConfig::default());
            tracing::error!(error = %e, "Failed to load route file");
            return Err(e.into());
        }
    };
    logging::init_logging(&config.observability)?;

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr)?,
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let router = Router::from_config(&config)?;
    tracing::info!(
        routes = config.routes.len(),
        generation = router.generation(),
        "route-dispatch v0.1.0 ready"
    );

    let (watcher, mut updates) = ConfigWatcher::new(&path);
    let _watcher = watcher.run()?;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("Shutdown signal received");
                break;
            }
            Some(config) = updates.recv() => {
                if let Err(e) = router.reload_config(&config) {
                    tracing::warn!(error = %e, "Reload rejected");
                }
            }
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }
                let (method, url) = match line.split_once(char::is_whitespace) {
                    Some((method, url)) => (Some(method), url.trim()),
                    None => (None, line),
                };
                let output = match split_url(url) {
                    Ok((path, context)) => match router.dispatch(&path, method, &context) {
                        Ok(found) => render(&found),
                        Err(e) => json!({ "error": e.to_string() }),
                    },
                    Err(e) => json!({ "error": e.to_string() }),
                };
                println!("{output}");
            }
        }
    }

    tracing::info!("Shutdown complete");
    Ok(())
}

/// Split a URL into its path and request context. Bare paths get an empty context.
fn split_url(raw: &str) -> Result<(String, RequestContext), url::ParseError> {
    if raw.starts_with('/') {
        return Ok((raw.to_string(), RequestContext::new()));
    }

    let url = Url::parse(raw)?;
    let mut context = RequestContext::new()
        .with_scheme(url.scheme())
        .with_port(url.port().unwrap_or(DEFAULT_PORT));
    if let Some(host) = url.host_str() {
        context = context.with_host(host);
    }
    Ok((url.path().to_string(), context))
}

fn render(found: &MatchResult) -> serde_json::Value {
    let route = found.route();
    json!({
        "route": route.name(),
        "pattern": route.pattern().as_str(),
        "variables": found.variables(),
        "extra": route.extra(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_url_defaults_port_to_80() {
        let (path, context) = split_url("https://windwalker.com/flower/5").unwrap();
        assert_eq!(path, "/flower/5");
        assert_eq!(context.scheme.as_deref(), Some("https"));
        assert_eq!(context.port, Some(80));

        let (_, context) = split_url("https://windwalker.com:443/flower/5").unwrap();
        assert_eq!(context.port, Some(443));

        let (_, context) = split_url("http://windwalker.com:8080/").unwrap();
        assert_eq!(context.port, Some(8080));
    }

    #[test]
    fn test_split_url_bare_path() {
        let (path, context) = split_url("/flower/5").unwrap();
        assert_eq!(path, "/flower/5");
        assert!(context.port.is_none());
    }
}
