//! Lending Protocol Client
//!
//! Transaction builders for the lending protocol on Sui.
//!
//! # Protocol Overview
//!
//! Nine mainnet markets, each a shared pool object with a reserve index in
//! storage:
//! - SUI, wUSDC, USDT, WETH, CETUS, vSUI, haSUI, NAVX, USDC
//!
//! # Architecture
//!
//! Builders append calls to a caller-owned batch and hand back linear coin
//! handles. The package id is resolved from the open API through a
//! single-flight TTL cache.

pub mod client;
pub mod constants;
pub mod package;
pub mod state;
pub mod tx_builder;

// Re-exports
pub use client::LendingClient;
pub use package::{OpenApiPackageSource, PackageIdCache, PackageSource};
pub use state::*;
pub use tx_builder::{LendingObjects, LendingTxBuilder};
