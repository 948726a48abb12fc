//! Drives the brokerage client against a running backend from the
//! command line: health probe, login/status, quotes, today's orders and
//! the normalized account snapshot.

use anyhow::{bail, Result};
use broker_api::{Credentials, Environment};
use broker_client::Brokerage;
use clap::{Parser, Subcommand};
use log::info;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Environment to target ("simulation" or "production")
    #[arg(short, long, default_value = "simulation")]
    environment: String,

    /// Override the environment's base endpoint
    #[arg(long)]
    endpoint: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Probe backend liveness
    Health,
    /// Log in and report the session outcome
    Login {
        #[arg(long)]
        user_id: String,
        #[arg(long)]
        password: String,
        #[arg(long)]
        cert_password: String,
        /// Server-side certificate path (or a locator from an upload)
        #[arg(long)]
        cert_path: String,
        #[arg(long)]
        person_id: Option<String>,
    },
    /// Check whether a session is still valid
    Status,
    /// Fetch quotes for one or more stock codes
    Quote {
        #[arg(required = true)]
        stock_codes: Vec<String>,
    },
    /// List today's orders
    TodayOrders,
    /// Print the normalized account snapshot
    Snapshot,
}

fn build_client(args: &Args) -> Result<Brokerage> {
    let mut environment = Environment::resolve(&args.environment)?;
    if let Some(endpoint) = &args.endpoint {
        environment = environment.with_base_endpoint(endpoint.clone());
    }
    Ok(Brokerage::with_environment(environment)?)
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();
    let brokerage = build_client(&args)?;

    match &args.command {
        Command::Health => {
            let status = brokerage.health().await?;
            println!("backend status: {status}");
        }
        Command::Login {
            user_id,
            password,
            cert_password,
            cert_path,
            person_id,
        } => {
            let mut credentials = Credentials::new(user_id, password, cert_password, cert_path);
            if let Some(person_id) = person_id {
                credentials = credentials.with_person_id(person_id);
            }
            let result = brokerage.session().login(&credentials).await?;
            info!(
                "session open for {} on {}",
                result.user_id.as_deref().unwrap_or("<unknown>"),
                result.environment_id
            );
            if let Some(message) = result.message {
                println!("{message}");
            }
        }
        Command::Status => {
            let status = brokerage.session().check_status().await?;
            if status.logged_in {
                println!(
                    "logged in as {} on {}",
                    status.user_id.as_deref().unwrap_or("<unknown>"),
                    status.environment_id
                );
            } else {
                println!("not logged in");
            }
        }
        Command::Quote { stock_codes } => {
            let quotes = brokerage.market().get_quote(stock_codes).await?;
            if quotes.is_empty() {
                bail!("no quotes returned");
            }
            for quote in quotes {
                println!(
                    "{:<8} {:>10.2} {:>+8.2} ({:>+6.2}%)  vol {}",
                    quote.code, quote.price, quote.change, quote.change_percent, quote.volume
                );
            }
        }
        Command::TodayOrders => {
            let orders = brokerage.orders().query_today_orders().await?;
            if orders.is_empty() {
                println!("no orders today");
            }
            for order in orders {
                println!(
                    "{} {:<8} {:?} @ {} x{} filled {} -> {:?}",
                    order.order_id,
                    order.stock_code,
                    order.action,
                    order
                        .price
                        .map(|p| p.to_string())
                        .unwrap_or_else(|| "market".to_string()),
                    order.quantity,
                    order.filled_quantity,
                    order.status
                );
            }
        }
        Command::Snapshot => {
            let snapshot = brokerage.account().snapshot().await?;
            println!("{}", serde_json::to_string_pretty(&snapshot)?);
        }
    }

    Ok(())
}
