//! HTTP host for the Markov text generator.
//!
//! Loads models once, shares them read-only between workers, and serves
//! generation plus the corpus chapters the models were built from.

pub mod config;
pub mod error;
pub mod routes;
pub mod state;
