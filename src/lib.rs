//! Saga Engine — procedural space-opera prose.
//!
//! A plot is grown from a seed by production rules, normalized, turned
//! into narrative events, annotated by a chain of lowering passes, and
//! finally rendered through anti-repetition templates.

pub mod core;
pub mod schema;

pub use crate::core::pipeline::{Chapter, EngineConfig, NarrativeEngine, OutputMode, PipelineError};
pub use crate::schema::world::World;
