//! Top-level module for the Markov text generator.
//!
//! This module provides:
//! - Successor sets with frequency ranking (`SuccessorSet`)
//! - The word-phrase Markov model and its loader (`MarkovModel`)
//! - Injectable rank selection (`IndexSelector`)
//! - Generation parameters (`GenerationInput`)
//! - The walking interface (`Generator`)

/// Walks the chain: single runs, batches, and their rendering.
pub mod generator;

/// Phrase → successor-set model, with JSON loading, binary caching
/// and merging.
pub mod markov_model;

/// Successors of one state, ranked by count for top-k sampling.
pub mod state;

/// Strategies drawing the uniform rank used at each step.
pub mod selector;

/// Generation parameters: start state, step budget, candidate pool,
/// dead-end policy.
pub mod generation_input;
