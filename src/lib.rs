//! Library exports for cluster-api-state-metrics, shared between the binary
//! and tests.

pub mod builder;
pub mod config;
pub mod error;
pub mod filter;
pub mod generator;
pub mod handler;
pub mod models;
pub mod resources;
pub mod routes;
pub mod startup;
pub mod state;
pub mod store;
pub mod telemetry;
pub mod utils;
