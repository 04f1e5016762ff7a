//! # Tour Guide
//!
//! Runs the tracking engine against simulated GPS and reward services.
//!
//! 1. Loads [`Config`] from `--config` (default `config/dev.toml`).
//! 2. Starts the [`TourGuideSystem`] and seeds the configured demo users.
//! 3. Samples one user interactively, then keeps sweeping until Ctrl-C.

use clap::Parser;
use tour_guide::lifecycle::{setup_tracing, Collaborators, Config, TourGuideSystem};
use tracing::{info, warn, Instrument};

/// Location tracking and reward engine
#[derive(Parser, Debug)]
#[command(name = "tour-guide", version, about)]
struct Args {
    /// Path to TOML configuration file
    #[arg(short, long, default_value = "config/dev.toml")]
    config: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Setup tracing once for the entire application
    setup_tracing();

    let args = Args::parse();
    let config = Config::load_from_path(&args.config);
    info!(
        config_file = config.config_file(),
        seed_users = config.seed_users(),
        tracker_enabled = config.tracker_enabled(),
        "tour-guide starting"
    );

    let system = TourGuideSystem::start(&config, Collaborators::simulated(&config)).await?;

    // One interactive lookup so the demo shows something before the first sweep
    if let Ok(user) = system.tracking.user("internalUser0") {
        let span = tracing::info_span!("demo", user = %user.name());
        async {
            match system.tracking.nearby_attractions_info(&user).await {
                Ok(nearby) => {
                    for attraction in &nearby {
                        info!(
                            attraction = %attraction.attraction_name,
                            distance_miles = %format!("{:.1}", attraction.distance_miles),
                            reward_points = attraction.reward_points,
                            "Nearby attraction"
                        );
                    }
                }
                Err(e) => warn!(error = %e, "Demo lookup failed"),
            }
        }
        .instrument(span)
        .await;
    }

    tokio::signal::ctrl_c().await?;
    info!("Ctrl-C received");

    system.shutdown().await;
    Ok(())
}
