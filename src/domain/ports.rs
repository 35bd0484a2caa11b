use crate::domain::events::WorkflowEvent;
use crate::domain::model::ActorId;
use crate::utils::error::Result;
use async_trait::async_trait;

/// Durable whole-document persistence. `save` fully overwrites, last write
/// wins; `load` of an absent document is `None`, never an error.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn load(&self, name: &str) -> Result<Option<Vec<u8>>>;
    async fn save(&self, name: &str, bytes: &[u8]) -> Result<()>;
}

/// Capability checks resolved by the surrounding venue. The core only calls
/// these predicates and never learns how roles are assigned.
pub trait AuthorizationOracle: Send + Sync {
    fn is_official(&self, actor: &ActorId) -> bool;
    fn is_captain_of(&self, actor: &ActorId, modality: &str, team: &str) -> bool;
}

/// Fire-and-forget outbound messaging. Implementations log delivery
/// failures instead of surfacing them.
#[async_trait]
pub trait NotificationSink: Send + Sync {
    async fn notify(&self, event: &WorkflowEvent);
}

#[async_trait]
impl NotificationSink for Box<dyn NotificationSink> {
    async fn notify(&self, event: &WorkflowEvent) {
        (**self).notify(event).await;
    }
}
