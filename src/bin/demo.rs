//! Demonstration client for the rate limit API.
//!
//! Drives a running gatekeeper instance through the full surface: exhausting
//! a quota, querying status, resetting, and showing per-user independence.

use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use reqwest::StatusCode;
use serde_json::Value;

#[derive(Parser, Debug)]
#[command(name = "gatekeeper-demo")]
#[command(about = "Demonstration client for the gatekeeper rate limit API")]
struct Args {
    /// Base URL of a running gatekeeper instance
    #[arg(long, default_value = "http://localhost:3001")]
    base_url: String,

    /// User identifier to exercise
    #[arg(long, default_value = "example-user")]
    user: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let client = reqwest::Client::new();

    println!("Rate Limiter Demo");
    println!("{}", "=".repeat(50));

    println!("\nExample 1: making 6 requests (default limit is 5 per 60s)\n");
    for i in 1..=6 {
        make_request(&client, &args.base_url, &args.user, i).await?;
        tokio::time::sleep(Duration::from_millis(200)).await;
    }
    check_status(&client, &args.base_url, &args.user).await?;

    println!("Example 2: resetting the limit and retrying\n");
    reset_limit(&client, &args.base_url, &args.user).await?;
    for i in 1..=3 {
        make_request(&client, &args.base_url, &args.user, i).await?;
        tokio::time::sleep(Duration::from_millis(200)).await;
    }
    check_status(&client, &args.base_url, &args.user).await?;

    println!("Example 3: multiple users, each with a separate quota\n");
    for user in ["user-a", "user-b", "user-c"] {
        println!("Making requests as {user}:");
        for i in 1..=3 {
            make_request(&client, &args.base_url, user, i).await?;
            tokio::time::sleep(Duration::from_millis(100)).await;
        }
        println!();
    }

    println!("{}", "=".repeat(50));
    println!("Demo completed");
    Ok(())
}

/// Hit the protected endpoint once and report the outcome.
async fn make_request(
    client: &reqwest::Client,
    base_url: &str,
    user: &str,
    number: u32,
) -> Result<bool> {
    let response = client
        .get(format!("{base_url}/api/data"))
        .header("X-User-ID", user)
        .send()
        .await
        .context("request to /api/data failed")?;

    let status = response.status();
    let body: Value = response.json().await.context("invalid JSON response")?;

    match status {
        StatusCode::OK => {
            println!(
                "  Request {number} ({user}): success, {} requests remaining",
                body["rateLimitInfo"]["remaining"]
            );
            Ok(true)
        }
        StatusCode::TOO_MANY_REQUESTS => {
            println!("  Request {number} ({user}): rate limited, {}", body["message"]);
            println!("    Retry after: {} seconds", body["retryAfter"]);
            Ok(false)
        }
        other => {
            println!("  Request {number} ({user}): unexpected status {other}");
            Ok(false)
        }
    }
}

/// Query and print the user's quota status.
async fn check_status(client: &reqwest::Client, base_url: &str, user: &str) -> Result<()> {
    let body: Value = client
        .get(format!("{base_url}/api/rate-limit-status"))
        .query(&[("userId", user)])
        .send()
        .await
        .context("request to /api/rate-limit-status failed")?
        .json()
        .await?;

    println!("\nRate limit status for {user}:");
    println!("  Remaining: {}/{}", body["remaining"], body["limit"]);
    println!("  Reset in: {} seconds", body["resetInSeconds"]);
    println!("  Reset time: {}\n", body["resetTime"]);
    Ok(())
}

/// Reset the user's quota.
async fn reset_limit(client: &reqwest::Client, base_url: &str, user: &str) -> Result<()> {
    let body: Value = client
        .post(format!("{base_url}/api/reset-rate-limit"))
        .json(&serde_json::json!({ "userId": user }))
        .send()
        .await
        .context("request to /api/reset-rate-limit failed")?
        .json()
        .await?;

    println!("{}\n", body["message"]);
    Ok(())
}
