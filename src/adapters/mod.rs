// Adapters layer: concrete implementations for external systems
// (filesystem persistence, webhook notifications, authorization data).

pub mod oracle;
pub mod storage;
pub mod webhook;
