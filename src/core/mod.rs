pub mod market;
pub mod pending;
pub mod roster;
pub mod workflow;

pub use crate::domain::ports::{AuthorizationOracle, DocumentStore, NotificationSink};
pub use crate::utils::error::Result;

use crate::utils::error::MarketError;
use serde::{de::DeserializeOwned, Serialize};

/// Document names follow the files the league has always shipped with.
pub const LEAGUE_DOCUMENT: &str = "liga_data.json";
pub const MARKET_DOCUMENT: &str = "market_state.json";
pub const PENDING_DOCUMENT: &str = "pending_signings.json";

/// Reads and decodes a whole document; an absent document is `None`, a
/// corrupt one an error the caller treats as fatal at startup.
pub(crate) async fn load_document<D: DocumentStore, T: DeserializeOwned>(
    store: &D,
    name: &str,
) -> Result<Option<T>> {
    match store.load(name).await? {
        Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
        None => Ok(None),
    }
}

/// Serializes and durably rewrites a whole document. Failures surface as
/// `PersistenceFailed`; the caller's in-memory mutation is kept either way.
pub(crate) async fn persist_document<D: DocumentStore, T: Serialize>(
    store: &D,
    name: &str,
    doc: &T,
) -> Result<()> {
    let write = async {
        let bytes = serde_json::to_vec_pretty(doc)?;
        store.save(name, &bytes).await
    };
    write.await.map_err(|e| MarketError::PersistenceFailed {
        document: name.to_string(),
        source: Box::new(e),
    })
}
