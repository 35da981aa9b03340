//! Daily report lifecycle: model, tracker, and the review HTTP API.

pub mod model;
pub mod routes;
pub mod tracker;

pub use model::Report;
pub use tracker::{MarkOutcome, ReportTracker};
