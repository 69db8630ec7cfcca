use std::time::Duration;

use clap::{Parser, Subcommand};
use serde_json::{json, Value};

use storefront_guard::client::{sign_request, HttpMethod, SecureClient};
use storefront_guard::signing::{now_millis, SharedSecret, SIGNATURE_HEADER, TIMESTAMP_HEADER};

#[derive(Parser)]
#[command(name = "guard-cli")]
#[command(about = "Signed client for the storefront API", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:8080")]
    url: String,

    /// Shared HMAC secret.
    #[arg(short, long, env = "GUARD_HMAC_SECRET", hide_env_values = true)]
    secret: String,

    #[arg(short, long, default_value_t = 12_000)]
    timeout_ms: u64,

    /// Session cookie to send along, e.g. `session=abc`.
    #[arg(long)]
    cookie: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show reseller balance
    Balance,
    /// Place an order
    Order {
        #[arg(long)]
        product_id: String,
        /// Target (username, link, ...)
        #[arg(long)]
        data: String,
        #[arg(long)]
        quantity: u64,
    },
    /// Show the status of an order
    OrderDetail {
        #[arg(long)]
        trx: String,
    },
    /// Look up a service by code, or list all services
    Resolve {
        #[arg(long)]
        code: Option<String>,
    },
    /// Print the signature headers for a request without sending it
    Sign {
        #[arg(long, default_value = "POST")]
        method: HttpMethod,
        #[arg(long)]
        path: String,
        /// JSON body
        #[arg(long)]
        body: Option<String>,
        /// Unix time in milliseconds (defaults to now)
        #[arg(long)]
        timestamp: Option<u64>,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let secret = SharedSecret::new(&cli.secret);

    let client = SecureClient::new(&cli.url, secret.clone(), Duration::from_millis(cli.timeout_ms))?;
    if let Some(cookie) = &cli.cookie {
        client.add_cookie(cookie);
    }

    let result = match cli.command {
        Commands::Balance => client.get_json("/api/balance").await,
        Commands::Order {
            product_id,
            data,
            quantity,
        } => {
            client
                .post_json(
                    "/api/order",
                    &json!({ "product_id": product_id, "data": data, "quantity": quantity }),
                )
                .await
        }
        Commands::OrderDetail { trx } => {
            client.post_json("/api/order/detail", &json!({ "trx": trx })).await
        }
        Commands::Resolve { code } => {
            let body = match code {
                Some(code) => json!({ "code": code }),
                None => json!({}),
            };
            client.post_json("/api/layanan/resolve", &body).await
        }
        Commands::Sign {
            method,
            path,
            body,
            timestamp,
        } => {
            let body: Option<Value> = body.as_deref().map(serde_json::from_str).transpose()?;
            let now = timestamp.unwrap_or_else(now_millis);
            let signed = sign_request(&secret, method, &path, body.as_ref(), now);
            println!("{}: {}", SIGNATURE_HEADER, signed.signature);
            println!("{}: {}", TIMESTAMP_HEADER, signed.timestamp);
            if let Some(body) = signed.body {
                println!("\n{}", body);
            }
            return Ok(());
        }
    };

    match result {
        Ok(json) => println!("{}", serde_json::to_string_pretty(&json)?),
        Err(e) if e.is_timeout() => {
            eprintln!("Error: {}", e);
            std::process::exit(2);
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
    Ok(())
}
