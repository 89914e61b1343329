//! Option payoff diagrams and a typed gateway to a remote option-pricing
//! backend (prices, Greeks, Heston calibration, listed-contract data) plus
//! Treasury risk-free rates from FRED.
//!
//! The payoff generator is the only numerics in this crate; all pricing is
//! done by the backend.

pub mod api;
pub mod catalogue;
pub mod config;
pub mod errors;
pub mod feeds;
pub mod payoff;
pub mod server;
pub mod session;
