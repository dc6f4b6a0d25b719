//! Data Transfer Objects for REST request/response serialization.

pub mod search_dto;
pub mod system_dto;
pub mod webhook_dto;

pub use search_dto::*;
pub use system_dto::*;
pub use webhook_dto::*;
