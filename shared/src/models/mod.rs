//! Domain models for the Restaurant Back-Office

mod inventory;
mod sales;

pub use inventory::*;
pub use sales::*;
