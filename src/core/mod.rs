pub mod error;
pub mod memory;
pub mod provider;
pub mod types;
