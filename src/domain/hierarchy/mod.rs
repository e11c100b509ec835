//! Hierarchy domain - outcomes, reports and context assembly

mod outcome;

pub use outcome::{ClearReport, HierarchyHealth, QueryOutcome, build_context};
