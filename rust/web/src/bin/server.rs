//! Standalone hand ledger server
//!
//! Usage: handledger-web-server [--host HOST] [--port PORT] [--log-format text|json]

use handledger_web::{init_logging, LogFormat, ServerConfig, WebServer};

struct Args {
    config: ServerConfig,
    log_format: LogFormat,
}

fn parse_args(mut args: impl Iterator<Item = String>) -> Result<Option<Args>, String> {
    let mut host = "127.0.0.1".to_string();
    let mut port = 8080u16;
    let mut log_format = LogFormat::Text;

    while let Some(arg) = args.next() {
        let mut value = |flag: &str| args.next().ok_or(format!("{flag} requires a value"));
        match arg.as_str() {
            "--host" | "-h" => host = value("--host")?,
            "--port" | "-p" => {
                let raw = value("--port")?;
                port = raw
                    .parse()
                    .map_err(|_| format!("invalid port number `{raw}`"))?;
            }
            "--log-format" => {
                log_format = match value("--log-format")?.as_str() {
                    "text" => LogFormat::Text,
                    "json" => LogFormat::Json,
                    other => return Err(format!("unknown log format `{other}`")),
                }
            }
            "--help" => return Ok(None),
            other => return Err(format!("unknown argument `{other}`")),
        }
    }

    Ok(Some(Args {
        config: ServerConfig::new(host, port),
        log_format,
    }))
}

fn print_help() {
    println!("Hand ledger web server");
    println!();
    println!("Usage: handledger-web-server [OPTIONS]");
    println!();
    println!("Options:");
    println!("  --host, -h <HOST>        Host to bind to (default: 127.0.0.1)");
    println!("  --port, -p <PORT>        Port to bind to (default: 8080)");
    println!("  --log-format <FORMAT>    text or json (default: text)");
    println!("  --help                   Show this help message");
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = match parse_args(std::env::args().skip(1)) {
        Ok(Some(args)) => args,
        Ok(None) => {
            print_help();
            return Ok(());
        }
        Err(message) => {
            eprintln!("Error: {message}");
            print_help();
            std::process::exit(2);
        }
    };

    init_logging(args.log_format)?;
    tracing::info!(host = args.config.host(), port = args.config.port(), "starting hand ledger");

    let handle = WebServer::new(args.config).start().await?;
    tracing::info!(address = %handle.address(), "press Ctrl+C to stop");

    tokio::signal::ctrl_c().await?;
    tracing::info!("shutting down");
    handle.shutdown().await?;
    Ok(())
}
