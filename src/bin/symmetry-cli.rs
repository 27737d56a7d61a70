use clap::{Parser, Subcommand};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use serde_json::{json, Value};

#[derive(Parser)]
#[command(name = "symmetry-cli")]
#[command(about = "Management CLI for the price symmetry service", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:8080")]
    url: String,

    /// Admin API key (required for status and self-test).
    #[arg(short, long, env = "SYMMETRY_ADMIN_KEY", default_value = "")]
    key: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check service status
    Status,
    /// Show the price policy in force
    Policy,
    /// Check a price against the global rate
    Validate {
        price: f64,
        /// Fetch the policy with up to N attempts
        #[arg(short, long)]
        retries: Option<u32>,
    },
    /// Convert a UBX amount into a display currency
    Convert {
        amount: f64,
        #[arg(default_value = "USD")]
        currency: String,
    },
    /// Run the pricing self-test
    SelfTest,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();
    let base = cli.url.trim_end_matches('/');

    let mut headers = HeaderMap::new();
    if !cli.key.is_empty() {
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", cli.key))?,
        );
    }

    let res = match cli.command {
        Commands::Status => {
            client
                .get(format!("{}/admin/status", base))
                .headers(headers)
                .send()
                .await?
        }
        Commands::Policy => client.get(format!("{}/api/v1/policy", base)).send().await?,
        Commands::Validate { price, retries } => match retries {
            Some(n) => {
                client
                    .post(format!("{}/api/v1/validate/retry", base))
                    .json(&json!({ "price": price, "max_attempts": n }))
                    .send()
                    .await?
            }
            None => {
                client
                    .post(format!("{}/api/v1/validate", base))
                    .json(&json!({ "price": price }))
                    .send()
                    .await?
            }
        },
        Commands::Convert { amount, currency } => {
            client
                .get(format!("{}/api/v1/convert", base))
                .query(&[("amount", amount.to_string()), ("currency", currency)])
                .send()
                .await?
        }
        Commands::SelfTest => {
            client
                .post(format!("{}/admin/self-test", base))
                .headers(headers)
                .send()
                .await?
        }
    };

    print_response(res).await
}

async fn print_response(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    if !status.is_success() {
        eprintln!("Error: service returned status {}", status);
        if let Ok(text) = res.text().await {
            eprintln!("Response: {}", text);
        }
        std::process::exit(1);
    }

    let json: Value = res.json().await?;
    println!("{}", serde_json::to_string_pretty(&json)?);
    Ok(())
}
