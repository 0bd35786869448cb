//! # zawamis-console
//!
//! Headless admin console: opens the local store and logs a summary every
//! time registrations, applications, messages or job views change.

use tracing::info;

use zawamis_client::{ConsoleSnapshot, Portal, PortalConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    zawamis_client::init_tracing();

    info!("Starting Zawamis console v{}", env!("CARGO_PKG_VERSION"));

    let config = PortalConfig::from_env();
    info!(?config, "Loaded configuration");

    let portal = Portal::open(&config)?;
    let mut console = portal.watch_console();
    summarize(&console.current());

    loop {
        tokio::select! {
            changed = console.changed() => {
                if !changed {
                    tracing::warn!("Refresh task stopped");
                    break;
                }
                summarize(&console.current());
            }
            _ = tokio::signal::ctrl_c() => {
                info!("Received Ctrl+C, shutting down");
                break;
            }
        }
    }

    Ok(())
}

fn summarize(snapshot: &ConsoleSnapshot) {
    let replied = snapshot
        .messages
        .iter()
        .filter(|m| m.reply.is_some())
        .count();
    let views: usize = snapshot.job_views.values().sum();

    info!(
        registrations = snapshot.registrations.len(),
        applications = snapshot.applications.len(),
        messages = snapshot.messages.len(),
        awaiting_reply = snapshot.messages.len() - replied,
        job_views = views,
        "Console updated"
    );

    for (job, count) in &snapshot.job_views {
        tracing::debug!(job = %job, views = count, "Job views");
    }
}
