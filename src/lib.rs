pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

pub use adapters::storage::FileDocumentStore;
pub use config::catalogue::Catalogue;
pub use core::{
    market::MarketStateStore, pending::PendingSigningRegistry, roster::RosterStore,
    workflow::SigningWorkflow,
};
pub use utils::error::{MarketError, Result};
