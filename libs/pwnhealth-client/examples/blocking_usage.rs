//! Blocking usage example for the PWNHealth client
//!
//! Walks through the catalog lookups, an order listing and a report download
//! against the staging environment.
//!
//! To run this example:
//! ```bash
//! export PWNHEALTH_USERNAME="your-api-user"
//! export PWNHEALTH_PASSWORD="your-api-password"
//! export PWNHEALTH_ENVIRONMENT="staging"  # Optional, staging is the default
//! cargo run --example blocking_usage -- 88123
//! ```

use anyhow::Context;
use pwnhealth_client::{ClientConfig, LabOrderClient, OrderListQuery};
use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = ClientConfig::from_env().context("loading client configuration")?;
    let client = LabOrderClient::from_config(config)?;
    println!("Using {} ({})\n", client.base_url(), client.environment());

    println!("=== Example 1: Registered Labs ===\n");
    let labs = client.list_registered_labs()?;
    println!("{labs:#}\n");

    println!("=== Example 2: Test Types ===\n");
    let test_types = client.get_test_types(None)?;
    println!("{test_types:#}\n");

    println!("=== Example 3: Nearest Service Centers ===\n");
    let centers = client.find_nearest_service_center("02134", None, Some(3))?;
    println!("{centers:#}\n");

    println!("=== Example 4: Orders This Month ===\n");
    let orders = client.list_orders(&OrderListQuery::between("2024-01-01", "2024-01-31"))?;
    println!("{orders:#}\n");

    if let Some(order_id) = std::env::args().nth(1) {
        println!("=== Example 5: Results Report ===\n");
        let results = client.get_results(&order_id)?;
        match results["customer"]["results_pdf"].as_str() {
            Some(payload) => {
                let pdf = LabOrderClient::decode_report(payload)?;
                let path = format!("results-{order_id}.pdf");
                std::fs::write(&path, &pdf).with_context(|| format!("writing {path}"))?;
                println!("Wrote {} bytes to {path}\n", pdf.len());
            }
            None => println!("No report yet:\n{results:#}\n"),
        }
    }

    println!("=== All examples completed successfully! ===");
    Ok(())
}
