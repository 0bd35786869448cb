//! # zawamis-store
//!
//! Client-side persistence for the Zawamis job portal.
//!
//! Everything sits on a [`Storage`] port: a flat map of named slots, each
//! holding a JSON array of records. [`KeyedRecordStore`] gives read/modify/
//! write access to one slot; the ledgers, the support [`MessageThread`],
//! accounts, sessions and job views are built on it. Persistence across
//! processes comes from [`SqliteStorage`].

pub mod accounts;
pub mod database;
pub mod job_views;
pub mod ledger;
pub mod messages;
pub mod migrations;
pub mod models;
pub mod projection;
pub mod records;
pub mod session;
pub mod storage;

mod error;

pub use accounts::{AccountBook, AdminRegistrationForm, UserRegistrationForm};
pub use database::SqliteStorage;
pub use error::{Result, StoreError};
pub use job_views::JobViewTracker;
pub use ledger::{ApplicationLedger, Ledger, NewApplication, RegistrationLedger};
pub use messages::MessageThread;
pub use models::*;
pub use projection::Viewer;
pub use records::{KeyedRecordStore, Record};
pub use session::SessionStore;
pub use storage::{MemoryStorage, Storage};
