//! Service layer: composes repository calls into response payloads.

pub mod sync_service;

pub use sync_service::SyncService;
