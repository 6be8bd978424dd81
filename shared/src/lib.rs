//! Shared types for the Restaurant Back-Office
//!
//! Models, the stock adjustment rule and the tabular report engine used by
//! both the backend and the browser (via WASM).

pub mod models;
pub mod report;
pub mod types;

pub use models::*;
pub use report::*;
pub use types::*;
