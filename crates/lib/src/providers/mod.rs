//! # Providers
//!
//! Seams to the external capabilities the pipeline depends on: chat completion
//! and embeddings (`ai`), and similarity search over stored vectors (`vector`).

pub mod ai;
pub mod vector;
