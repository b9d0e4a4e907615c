// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! trev-proxy CLI
//!
//! Runs the proxy server, or shows what a page would do with a request.

use std::env;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Context;
use trev_proxy::config::{load_dotenv, DOTENV_FILE};
use trev_proxy::{
    rewrite_locator, FetchEventSource, HttpClient, HttpClientConfig, InterceptedRequest,
    Interceptor, PageLocation, ProxyConfig, TransportFlags,
};

#[tokio::main]
async fn main() -> ExitCode {
    // Before logging, so RUST_LOG may come from .env
    let dotenv = load_dotenv(DOTENV_FILE);

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("trev_proxy=info,tower_http=info")),
        )
        .init();

    if let Err(e) = dotenv {
        tracing::warn!("{}", e);
    }

    let args: Vec<String> = env::args().collect();

    if args.len() < 2 {
        print_usage();
        return ExitCode::from(1);
    }

    let result = match args[1].as_str() {
        "serve" => serve().await,
        "rewrite" => {
            if args.len() < 4 {
                eprintln!("Usage: trev-proxy rewrite <page-url> <locator>");
                return ExitCode::from(1);
            }
            rewrite(&args[2], &args[3])
        }
        "fetch" => {
            if args.len() < 4 {
                eprintln!("Usage: trev-proxy fetch <page-url> <locator> [request-init-json]");
                return ExitCode::from(1);
            }
            fetch(&args[2], &args[3], args.get(4).map(String::as_str)).await
        }
        "--help" | "-h" | "help" => {
            print_usage();
            return ExitCode::SUCCESS;
        }
        "--version" | "-v" | "version" => {
            println!("trev-proxy {}", trev_proxy::VERSION);
            return ExitCode::SUCCESS;
        }
        cmd => {
            eprintln!("Unknown command: {}", cmd);
            print_usage();
            return ExitCode::from(1);
        }
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::from(1)
        }
    }
}

fn print_usage() {
    println!(
        r#"trev-proxy - Request interceptor and forwarding proxy

USAGE:
    trev-proxy <COMMAND> [ARGS]

COMMANDS:
    serve                         Run the proxy server
    rewrite <page-url> <locator>  Show where a request from the page is sent
    fetch <page-url> <locator> [init]
                                  Send a request the way the page would;
                                  init is a RequestInit-style JSON object
    help                          Show this help message
    version                       Show version information

ENVIRONMENT:
    PROXY_PORT           Listening port (default 8888)
    PROXY_TIMEOUT_SECS   Per-request timeout (default 10)
    PROXY_BODY_LIMIT     Largest request body without content-length
    PROXY_REWRITE_HTML   Rewrite links in proxied HTML (true/false)
    PROXY_FORWARD_HEADERS
                         Extra request headers to forward (comma-separated)
    RUST_LOG             Log filter (default trev_proxy=info)

    Variables may also be set in a .env file in the working directory.

EXAMPLES:
    trev-proxy serve
    trev-proxy rewrite https://example.com/app /api/data
    trev-proxy fetch http://localhost:8888/ https://example.org/
    trev-proxy fetch http://localhost:8888/ /api '{{"cache":"no-store","credentials":"omit"}}'
"#
    );
}

async fn serve() -> anyhow::Result<()> {
    let config = ProxyConfig::from_env().context("invalid proxy configuration")?;
    trev_proxy::server::serve(config).await?;
    Ok(())
}

fn rewrite(page_url: &str, locator: &str) -> anyhow::Result<()> {
    let page = PageLocation::try_from(page_url)
        .with_context(|| format!("invalid page url: {}", page_url))?;
    println!("{}", rewrite_locator(locator, &page));
    Ok(())
}

async fn fetch(page_url: &str, locator: &str, init: Option<&str>) -> anyhow::Result<()> {
    let page = PageLocation::try_from(page_url)
        .with_context(|| format!("invalid page url: {}", page_url))?;

    let config = HttpClientConfig::new().default_scheme(page.scheme());
    let client = Arc::new(HttpClient::with_config(config)?);

    let source = FetchEventSource::new(client.clone());
    source.add_listener(Arc::new(Interceptor::new(page, client)));
    tracing::debug!(listeners = source.listener_count(), "interception facility ready");

    let mut request = InterceptedRequest::get(locator);
    if let Some(init) = init {
        let flags = TransportFlags::from_json(init).context("invalid request init")?;
        request = request.flags(flags);
    }

    let response = source.dispatch(request).await?;

    println!("Status: {}", response.status_code());
    println!("URL: {}", response.url);
    if let Some(content_type) = response.content_type() {
        println!("Content-Type: {}", content_type);
    }
    println!("Size: {} bytes", response.body_len());
    println!("Time: {}ms", response.response_time_ms);

    Ok(())
}
