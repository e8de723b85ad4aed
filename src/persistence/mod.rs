//! Persistence layer: device registry and sync event storage.
//!
//! Two related tables (`devices`, `sync_events`) maintained by the
//! embedded migration log and accessed through stateless repository
//! structs over a shared `sqlx::PgPool`. Repositories log failure
//! context and propagate errors unchanged.

pub mod device_repository;
pub mod models;
pub mod sync_event_repository;

pub use device_repository::DeviceRepository;
pub use sync_event_repository::SyncEventRepository;
