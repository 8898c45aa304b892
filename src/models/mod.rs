//! Core data models for the rivalry tracker.

mod ids;
mod match_record;
mod rival;
mod stats;
mod tag;

pub use ids::*;
pub use match_record::*;
pub use rival::*;
pub use stats::*;
pub use tag::*;
