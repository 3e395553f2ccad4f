//! Lanzar — Rust-native flow deployment builder.
//!
//! Composable deployment annotations, deterministic merge, BLAKE3
//! fingerprints. Builds a deployment specification from independently
//! authored configuration fragments and submits it to an external
//! orchestration platform.

pub mod builders;
pub mod cli;
pub mod core;
pub mod history;
pub mod platform;
