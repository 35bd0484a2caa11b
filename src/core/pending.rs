use crate::core::{load_document, persist_document, DocumentStore, PENDING_DOCUMENT};
use crate::domain::model::{ActorId, MessageRef, PendingSigningRequest, RequestId, RequestState};
use crate::utils::error::{MarketError, Result};
use std::collections::BTreeMap;

/// Durable map of in-flight signing requests. Every mutation rewrites the
/// whole document before reporting success, so a restart can never observe
/// an acknowledged mutation that was not persisted.
pub struct PendingSigningRegistry<D: DocumentStore> {
    store: D,
    requests: BTreeMap<String, PendingSigningRequest>,
}

impl<D: DocumentStore> PendingSigningRegistry<D> {
    pub async fn load(store: D) -> Result<Self> {
        let requests: BTreeMap<String, PendingSigningRequest> =
            load_document(&store, PENDING_DOCUMENT)
                .await?
                .unwrap_or_default();
        if !requests.is_empty() {
            tracing::info!("loaded {} pending signing requests", requests.len());
        }
        Ok(Self { store, requests })
    }

    async fn persist(&self) -> Result<()> {
        persist_document(&self.store, PENDING_DOCUMENT, &self.requests).await
    }

    pub fn len(&self) -> usize {
        self.requests.len()
    }

    pub fn is_empty(&self) -> bool {
        self.requests.is_empty()
    }

    pub fn get(&self, id: &RequestId) -> Option<&PendingSigningRequest> {
        self.requests.get(id.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = &PendingSigningRequest> {
        self.requests.values()
    }

    /// Live request for the same `(target, team)` pair, used to reject
    /// duplicate creations.
    pub fn find_live(
        &self,
        target: &ActorId,
        modality: &str,
        team: &str,
    ) -> Option<&PendingSigningRequest> {
        self.requests.values().find(|r| {
            &r.target_id == target
                && r.modality.eq_ignore_ascii_case(modality)
                && r.team.eq_ignore_ascii_case(team)
        })
    }

    pub async fn create(&mut self, request: PendingSigningRequest) -> Result<()> {
        self.requests.insert(request.id.as_str().to_string(), request);
        self.persist().await
    }

    /// Guarded state transition; replayed events fail deterministically
    /// instead of re-entering the workflow.
    pub async fn transition(
        &mut self,
        id: &RequestId,
        from: RequestState,
        to: RequestState,
    ) -> Result<PendingSigningRequest> {
        let request = self
            .requests
            .get_mut(id.as_str())
            .ok_or_else(|| MarketError::RequestNotFound(id.to_string()))?;
        if request.state != from {
            return Err(MarketError::UnexpectedRequestState {
                id: id.to_string(),
                expected: from,
                actual: request.state,
            });
        }
        request.state = to;
        let updated = request.clone();
        self.persist().await?;
        Ok(updated)
    }

    /// Attaches the message correlation reference, the only other mutation a
    /// live request ever sees.
    pub async fn attach_message(&mut self, id: &RequestId, message: MessageRef) -> Result<()> {
        let request = self
            .requests
            .get_mut(id.as_str())
            .ok_or_else(|| MarketError::RequestNotFound(id.to_string()))?;
        request.message_ref = Some(message);
        self.persist().await
    }

    /// Removes a request; `Ok(false)` when it was already gone.
    pub async fn remove(&mut self, id: &RequestId) -> Result<bool> {
        if self.requests.remove(id.as_str()).is_some() {
            self.persist().await?;
            Ok(true)
        } else {
            Ok(false)
        }
    }
}
