//! Core types for gamecal.
//!
//! This crate holds everything the CLI and providers share:
//! - `Event`, its identity key and the store record codec
//! - the rejection ledger (negative cache of declined additions)
//! - the reconciliation engine and the traits it drives
//! - the provider protocol used to reach calendar stores

pub mod config;
pub mod confirm;
pub mod constants;
pub mod error;
pub mod event;
pub mod ledger;
pub mod normalize;
pub mod notify;
pub mod reconcile;
pub mod record;
pub mod remote;
pub mod source;
pub mod store;

pub use event::{Code, Event, EventKey};
pub use record::{StoreRecord, StoredEvent};
