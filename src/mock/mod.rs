//! Test doubles for the provisioning seams
//!
//! In-process stand-ins for the network and process boundaries, with call
//! recording and failure injection:
//!
//! - `MockVersionSource`: canned channel declarations and catalog
//! - `MockArchiveTool`: fake downloads and a fake distribution layout on extract
//! - `MockCommandRunner`: queued process results, recorded invocations
//!
//! The job-state, cache, and output seams have in-memory implementations in
//! `job_runtime`.

mod archive;
mod runner;
mod versions;

pub use archive::MockArchiveTool;
pub use runner::{Invocation, MockCommandRunner};
pub use versions::MockVersionSource;
