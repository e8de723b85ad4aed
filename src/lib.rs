//! # sync-gateway
//!
//! REST API for ingesting and aggregating device synchronization reports.
//!
//! Remote devices periodically POST the outcome of a sync attempt (files
//! synced, errors, link speed). The gateway persists each report alongside
//! a lazily-maintained device registry and exposes aggregate endpoints:
//! per-device history, repeated-failure detection, and system-wide totals.
//! The service is a stateless request/response cycle — all state lives in
//! PostgreSQL.
//!
//! ## Architecture
//!
//! ```text
//! Clients (HTTP)
//!     │
//!     ├── REST Handlers (api/)
//!     ├── Input Validation (validation)
//!     │
//!     ├── SyncService (service/)
//!     │
//!     ├── DeviceRepository / SyncEventRepository (persistence/)
//!     │
//!     └── PostgreSQL (sqlx::PgPool)
//! ```

pub mod api;
pub mod app_state;
pub mod config;
pub mod error;
pub mod persistence;
pub mod service;
pub mod validation;
