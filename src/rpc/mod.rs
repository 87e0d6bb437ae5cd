//! RPC client for communicating with a remote match service.

pub mod client;
pub mod types;

// Re-export main types
pub use client::RpcClient;
