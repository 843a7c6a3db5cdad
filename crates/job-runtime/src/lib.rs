//! Job runtime primitives
//!
//! The pieces of a CI job that live outside the provisioning logic itself:
//! - `state`: job-scoped key/value store surviving across step invocations
//! - `cache`: content-addressed save/restore of file sets by key
//! - `outputs`: step outputs and PATH export
//! - `group`: collapsible log groups

pub mod cache;
pub mod group;
pub mod outputs;
pub mod state;

pub use cache::{CacheError, CacheGateway, CacheResult, DirectoryCacheGateway, MemoryCacheGateway};
pub use group::LogGroup;
pub use outputs::{GithubCommandFiles, MemoryOutputs, OutputError, ProcessOutputs, StepOutputs};
pub use state::{FileStateStore, GithubStateStore, JobStateStore, MemoryStateStore, StateError};

/// Returns true when running inside a GitHub Actions job.
pub fn in_github_actions() -> bool {
    std::env::var("GITHUB_ACTIONS").map(|v| v == "true").unwrap_or(false)
}

/// Heredoc record used by the GitHub command files:
/// `name<<DELIM\nvalue\nDELIM\n`.
pub(crate) fn heredoc_record(name: &str, value: &str) -> String {
    let delimiter = format!("ghadelimiter_{}", uuid::Uuid::new_v4());
    format!("{name}<<{delimiter}\n{value}\n{delimiter}\n")
}
