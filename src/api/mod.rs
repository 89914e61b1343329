//! Contracts with the remote pricing backend and the client that speaks them.

pub mod client;
pub mod types;
