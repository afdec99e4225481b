//! Markov-chain text generation library.
//!
//! This crate walks a precomputed first-order Markov chain over word
//! phrases:
//! - Models mapping each phrase to its observed successors and counts
//! - Top-k sampling with a uniform draw over the most frequent successors
//! - Explicit, recoverable dead ends
//! - Loading from JSON with a compact binary cache
//! - A small reader for the corpus the model was built from

/// Markov models and generation logic.
pub mod model;

/// Error types shared by the whole crate.
pub mod error;

/// Corpus chapter lister and reader.
pub mod corpus;

/// I/O utilities (file loading, path helpers).
pub mod io;

pub use error::{CorpusError, GenerationError, ModelError};
pub use model::generation_input::{DeadEndPolicy, GenerationInput, normalize_start};
pub use model::generator::{DeadEnd, Generator, Walk, generate, generate_with, render_batch};
pub use model::markov_model::MarkovModel;
pub use model::selector::{FixedSelector, IndexSelector, RandomSelector, SequenceSelector};
pub use model::state::SuccessorSet;
