pub mod client;
pub mod config;
pub mod runner;
pub mod suites;

// Re-export common items
pub use client::ApiClient;
pub use runner::run_suites;
