//! Type inference for delimited sources.
//!
//! # Architecture
//!
//! - `classify.rs` - per-value classification (date/time, number, boolean, string)
//! - `strategy.rs` - Strategy pattern for aggregating observations per column
//! - `schema.rs` - table construction from a header and a bounded sample

pub mod classify;
pub mod schema;
pub mod strategy;

pub use classify::{classify_value, parse_datetime, parse_float};
pub use schema::{SampledSchema, assign_types, build_schema, sample_schema};
pub use strategy::{
    AnalysisMethod, BestMatchStrategy, MostFrequentStrategy, TypeFrequencies,
    TypeResolutionStrategy, infer_column_type, widen,
};
