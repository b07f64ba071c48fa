pub mod api;
pub mod builder;
pub mod config;
pub mod core;
pub mod credentials;
pub mod error;
pub mod exporter;
pub mod http_client;
pub mod models;
pub mod retry;
pub mod sink;

#[cfg(test)]
pub mod mock;
