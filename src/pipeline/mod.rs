//! Pipeline entry points for crawler operations.
//!
//! - `WorkProcessor`: drive one raw unit through extraction, acquisition,
//!   relocation, and emission
//! - `run_site` / `run_sites`: drain whole sources through the processor

pub mod process;
pub mod run;

pub use process::{Outcome, SkipReason, WorkProcessor};
pub use run::{run_site, run_sites, RunContext, RunSummary, SiteSummary};
