// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Pinch CLI - certificate-pinned HTTPS requests from the command line

use std::env;
use std::process::ExitCode;
use std::time::Duration;

use pinch::{PinSpec, PinchClient, PinchConfig, RequestDescriptor};

#[tokio::main]
async fn main() -> ExitCode {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("pinch=info")),
        )
        .init();

    let args: Vec<String> = env::args().collect();

    if args.len() < 2 {
        print_usage();
        return ExitCode::from(1);
    }

    match args[1].as_str() {
        "fetch" => match FetchArgs::parse(&args[2..]) {
            Ok(fetch) => run_fetch(fetch).await,
            Err(e) => {
                eprintln!("{}", e);
                eprintln!("Usage: pinch fetch <url> [OPTIONS]");
                ExitCode::from(1)
            }
        },
        "--help" | "-h" | "help" => {
            print_usage();
            ExitCode::SUCCESS
        }
        "--version" | "-v" | "version" => {
            println!("pinch {}", pinch::VERSION);
            ExitCode::SUCCESS
        }
        cmd => {
            eprintln!("Unknown command: {}", cmd);
            print_usage();
            ExitCode::from(1)
        }
    }
}

fn print_usage() {
    println!(
        r#"Pinch - Certificate-pinned HTTPS requests

USAGE:
    pinch <COMMAND> [OPTIONS]

COMMANDS:
    fetch <url>     Fetch a URL and print the response as JSON
    help            Show this help message
    version         Show version information

FETCH OPTIONS:
    --assets <DIR>          Directory holding bundled certificates (default: .)
    --cert <NAME>           Pin to a bundled certificate; repeat to allow several
    -X, --method <METHOD>   Request method (default: GET)
    -H, --header <K: V>     Add a request header; may be repeated
    -d, --data <BODY>       Request body
    --timeout <MS>          Connect and read timeout in milliseconds
    --cookies               Print the cookie jar after the request

EXAMPLES:
    pinch fetch https://example.com
    pinch fetch https://api.example.com/me --assets ./certs --cert api
    pinch fetch https://api.example.com/items -X POST -H 'Content-Type: application/json' -d '{{}}'

Set RUST_LOG=pinch=debug for handshake and cookie details.
"#
    );
}

/// Parsed `fetch` arguments
#[derive(Debug, Default, PartialEq)]
struct FetchArgs {
    url: String,
    assets: Option<String>,
    certs: Vec<String>,
    method: Option<String>,
    headers: Vec<(String, String)>,
    body: Option<String>,
    timeout_ms: Option<u64>,
    show_cookies: bool,
}

impl FetchArgs {
    fn parse(args: &[String]) -> Result<Self, String> {
        let mut parsed = FetchArgs::default();
        let mut iter = args.iter();

        while let Some(arg) = iter.next() {
            let mut value = |flag: &str| {
                iter.next()
                    .cloned()
                    .ok_or_else(|| format!("Missing value for {}", flag))
            };
            match arg.as_str() {
                "--assets" => parsed.assets = Some(value(arg)?),
                "--cert" => parsed.certs.push(value(arg)?),
                "-X" | "--method" => parsed.method = Some(value(arg)?),
                "-H" | "--header" => {
                    let header = value(arg)?;
                    let (name, val) = header
                        .split_once(':')
                        .ok_or_else(|| format!("Header must look like 'Name: value': {}", header))?;
                    parsed
                        .headers
                        .push((name.trim().to_string(), val.trim().to_string()));
                }
                "-d" | "--data" => parsed.body = Some(value(arg)?),
                "--timeout" => {
                    let raw = value(arg)?;
                    parsed.timeout_ms =
                        Some(raw.parse().map_err(|_| format!("Invalid timeout: {}", raw))?);
                }
                "--cookies" => parsed.show_cookies = true,
                other if other.starts_with('-') => return Err(format!("Unknown option: {}", other)),
                other if parsed.url.is_empty() => parsed.url = other.to_string(),
                other => return Err(format!("Unexpected argument: {}", other)),
            }
        }

        if parsed.url.is_empty() {
            return Err("Missing URL".to_string());
        }
        Ok(parsed)
    }

    fn descriptor(&self) -> RequestDescriptor {
        let mut descriptor = RequestDescriptor::new(self.url.clone())
            .headers(self.headers.iter().cloned());
        if let Some(method) = &self.method {
            descriptor = descriptor.method(method.clone());
        }
        if let Some(body) = &self.body {
            descriptor = descriptor.body(body.clone());
        }
        if let Some(ms) = self.timeout_ms {
            descriptor = descriptor.timeout(Duration::from_millis(ms));
        }
        match self.certs.len() {
            0 => descriptor,
            1 => descriptor.pin(PinSpec::single(self.certs[0].clone())),
            _ => descriptor.pin(PinSpec::multi(self.certs.iter().cloned())),
        }
    }
}

async fn run_fetch(args: FetchArgs) -> ExitCode {
    let assets = args.assets.clone().unwrap_or_else(|| ".".to_string());
    let client = PinchClient::with_asset_dir(assets, PinchConfig::default());

    match client.fetch(args.descriptor()).await {
        Ok(response) => {
            match serde_json::to_string_pretty(&response) {
                Ok(json) => println!("{}", json),
                Err(e) => {
                    eprintln!("Failed to serialize response: {}", e);
                    return ExitCode::from(1);
                }
            }
            if args.show_cookies {
                let mut cookies: Vec<_> = client.get_cookies().into_iter().collect();
                cookies.sort();
                println!("\n=== Cookies ({}) ===", cookies.len());
                for (name, value) in cookies {
                    println!("  {} = {}", name, value);
                }
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Request failed: {}", e);
            if e.is_tls_validation_failure() {
                eprintln!("The server certificate does not match any pinned certificate.");
            }
            ExitCode::from(1)
        }
    }
}
