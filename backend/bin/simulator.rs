use anyhow::Result;
use clap::{Arg, Command};
use proximity::utils::init_logging;
use rand::Rng;
use serde_json::{Value, json};
use std::time::Duration;
use tokio::time;
use tracing::{error, info};
use uuid::Uuid;

/// Demo client harness: registers synthetic users around a center point,
/// pulls discovery feeds, sends interests, and plays the counterpart by
/// resolving pending requests after a 2-5 s delay with ~70 % acceptance.
/// The auto-resolution lives here on purpose; the core only resolves on an
/// explicit call.

const CENTER_LAT: f64 = 40.7484;
const CENTER_LON: f64 = -73.9857;

const BIOS: &[&str] = &[
    "Music lover. Coffee enthusiast. Always down for spontaneous adventures.",
    "Photographer by day, DJ by night.",
    "Yoga instructor. Plant mom. Sunset chaser.",
    "Aspiring chef. Netflix connoisseur. Dog person.",
    "Writer. Coffee addict. Looking for my next adventure.",
    "Finance by day, stand-up comedy by night.",
    "Fashion designer. Vintage collector. Brunch enthusiast.",
    "Music producer. Vinyl collector. Night owl.",
];

struct SimUser {
    id: Uuid,
    name: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    init_logging();

    let matches = Command::new("simulator")
        .about("Drive the proximity API with synthetic users")
        .arg(
            Arg::new("base-url")
                .long("base-url")
                .help("Server base URL")
                .default_value("http://127.0.0.1:3001"),
        )
        .arg(
            Arg::new("users")
                .long("users")
                .help("Number of synthetic users")
                .value_parser(clap::value_parser!(usize))
                .default_value("8"),
        )
        .arg(
            Arg::new("rounds")
                .long("rounds")
                .help("Discovery rounds to run")
                .value_parser(clap::value_parser!(usize))
                .default_value("5"),
        )
        .get_matches();

    let base_url = matches.get_one::<String>("base-url").unwrap().clone();
    let user_count = *matches.get_one::<usize>("users").unwrap();
    let rounds = *matches.get_one::<usize>("rounds").unwrap();

    let client = reqwest::Client::new();

    info!("Registering {} synthetic users around Chelsea...", user_count);
    let users = register_users(&client, &base_url, user_count).await?;

    for round in 1..=rounds {
        info!("Round {} of {}", round, rounds);
        run_round(&client, &base_url, &users).await?;
        time::sleep(Duration::from_secs(1)).await;
    }

    Ok(())
}

async fn register_users(
    client: &reqwest::Client,
    base_url: &str,
    count: usize,
) -> Result<Vec<SimUser>> {
    let mut users = Vec::new();
    let mut rng = rand::rng();

    for i in 0..count {
        let user = SimUser {
            id: Uuid::new_v4(),
            name: format!("sim-user-{}", i + 1),
        };

        client
            .put(format!("{}/api/profiles", base_url))
            .json(&json!({
                "user_id": user.id,
                "name": user.name,
                "age": rng.random_range(21..35),
                "bio": BIOS[i % BIOS.len()],
            }))
            .send()
            .await?
            .error_for_status()?;

        // Scatter within a few hundred meters of the center.
        let lat = CENTER_LAT + rng.random_range(-0.002..0.002);
        let lon = CENTER_LON + rng.random_range(-0.002..0.002);
        client
            .post(format!("{}/api/positions", base_url))
            .json(&json!({
                "user_id": user.id,
                "latitude": lat,
                "longitude": lon,
                "venue": "The Rooftop Bar",
                "neighborhood": "Chelsea",
                "city": "New York City",
            }))
            .send()
            .await?
            .error_for_status()?;

        users.push(user);
    }

    Ok(users)
}

async fn run_round(client: &reqwest::Client, base_url: &str, users: &[SimUser]) -> Result<()> {
    for user in users {
        let feed: Value = client
            .post(format!("{}/api/discover", base_url))
            .json(&json!({
                "user_id": user.id,
                "latitude": CENTER_LAT,
                "longitude": CENTER_LON,
                "level": "neighborhood",
                "limit": 5,
            }))
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        let Some(top) = feed["candidates"].get(0) else {
            continue;
        };
        let send_it = rand::rng().random_bool(0.5);
        if !send_it {
            continue;
        }

        let response = client
            .post(format!("{}/api/interests", base_url))
            .json(&json!({
                "from_user_id": user.id,
                "to_user_id": top["user_id"],
            }))
            .send()
            .await?;

        if !response.status().is_success() {
            let body: Value = response.json().await.unwrap_or_default();
            info!("{} interest rejected: {}", user.name, body["code"]);
            continue;
        }

        let connection: Value = response.json().await?;
        info!(
            "{} -> {} ({})",
            user.name, top["user_id"], connection["status"]
        );

        if connection["status"] == "pending" {
            let connection_id = connection["id"].clone();
            let client = client.clone();
            let base_url = base_url.to_string();
            tokio::spawn(async move {
                // The original demo answered after 2-5 seconds, accepting 70 %.
                let (delay_ms, accept) = {
                    let mut rng = rand::rng();
                    (rng.random_range(2000..5000), rng.random_bool(0.7))
                };
                time::sleep(Duration::from_millis(delay_ms)).await;
                let outcome = if accept { "accepted" } else { "declined" };
                let result = client
                    .post(format!("{}/api/connections/{}/resolve", base_url, connection_id.as_str().unwrap_or_default()))
                    .json(&json!({ "outcome": outcome }))
                    .send()
                    .await;
                match result {
                    Ok(resp) if resp.status().is_success() => {
                        info!("connection {} {}", connection_id, outcome);
                    }
                    Ok(resp) => {
                        info!("resolve for {} returned {}", connection_id, resp.status());
                    }
                    Err(e) => error!("resolve for {} failed: {}", connection_id, e),
                }
            });
        }
    }

    Ok(())
}
