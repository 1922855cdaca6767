pub mod api;
pub mod chains;
pub mod cli;
pub mod config;
pub mod core;
pub mod explorer;
pub mod utils;
