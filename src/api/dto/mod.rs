//! Data Transfer Objects for REST response serialization.
//!
//! Request inputs live in [`crate::validation`]; this module holds the
//! success envelope and the composed response payloads the service builds.

pub mod common_dto;
pub mod stats_dto;
pub mod sync_dto;

pub use common_dto::*;
pub use stats_dto::*;
pub use sync_dto::*;
