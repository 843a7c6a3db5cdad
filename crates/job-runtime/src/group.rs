//! Collapsible log groups.

use std::io::{self, Write};

use tracing::span::EnteredSpan;

use crate::in_github_actions;

type MarkerSink = Box<dyn Write + Send>;

/// RAII log group.
///
/// Under GitHub Actions, emits `::group::` / `::endgroup::` markers on stderr,
/// alongside the logs, so the runner folds the enclosed output and stdout
/// stays free for machine-readable results. A tracing span named after the
/// group is entered for the guard's lifetime in every environment.
#[must_use = "the group ends when the guard is dropped"]
pub struct LogGroup {
    sink: Option<MarkerSink>,
    _span: EnteredSpan,
}

impl LogGroup {
    pub fn start(name: impl AsRef<str>) -> Self {
        let sink = in_github_actions().then(|| Box::new(io::stderr()) as MarkerSink);
        Self::with_sink(name.as_ref(), sink)
    }

    fn with_sink(name: &str, mut sink: Option<MarkerSink>) -> Self {
        if let Some(out) = sink.as_mut() {
            let _ = writeln!(out, "::group::{name}");
        }
        Self {
            sink,
            _span: tracing::info_span!("group", group = name).entered(),
        }
    }
}

impl Drop for LogGroup {
    fn drop(&mut self) {
        if let Some(out) = self.sink.as_mut() {
            let _ = writeln!(out, "::endgroup::");
            let _ = out.flush();
        }
    }
}
