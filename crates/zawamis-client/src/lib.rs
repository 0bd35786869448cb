//! # zawamis-client
//!
//! The portal's client layer: configuration, the REST backend client,
//! polling refresh and the view snapshots behind each screen, all reached
//! through [`Portal`].

pub mod api;
pub mod config;
pub mod console;
pub mod error;
pub mod portal;
pub mod refresh;

use tracing_subscriber::{fmt, EnvFilter};

pub use api::{ApiClient, ApiResponse, RemoteUser};
pub use config::PortalConfig;
pub use console::{AdminConsole, ConsoleSnapshot, Dashboard, DashboardSnapshot, Inbox};
pub use error::{ApiError, PortalError, Result};
pub use portal::Portal;
pub use refresh::{ChangeFeed, PollingFeed, SnapshotSource, SourceFn, Subscription};

/// Install the global subscriber. `RUST_LOG` overrides the default filter.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,zawamis_client=debug,zawamis_store=info"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .init();
}
