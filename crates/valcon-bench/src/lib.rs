//! Consolidation workload generator and benchmark utilities.
//!
//! This crate provides deterministic generation of consolidation requests of
//! varying size for benchmarking and property-based testing of `valcon-core`.

pub mod generator;

pub use generator::{GeneratorConfig, SizeTier, generate_request};
