//! Mock versions service.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use crate::versions::{Channel, VersionDeclaration, VersionError, VersionSource};

const MOCK_BASE_URL: &str = "mock://versions";

/// Version source answering from canned declarations.
///
/// A channel without a canned declaration answers like a 404.
#[derive(Default)]
pub struct MockVersionSource {
    channels: HashMap<Channel, VersionDeclaration>,
    catalog: Vec<VersionDeclaration>,
    failing: bool,
    declaration_calls: Arc<Mutex<HashMap<Channel, usize>>>,
    catalog_calls: Arc<Mutex<usize>>,
}

impl MockVersionSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_channel(mut self, channel: Channel, declaration: VersionDeclaration) -> Self {
        self.channels.insert(channel, declaration);
        self
    }

    pub fn with_catalog(mut self, catalog: Vec<VersionDeclaration>) -> Self {
        self.catalog = catalog;
        self
    }

    /// Fail every request as a network error.
    pub fn failing(mut self) -> Self {
        self.failing = true;
        self
    }

    pub fn declaration_count(&self, channel: Channel) -> usize {
        self.declaration_calls
            .lock()
            .unwrap()
            .get(&channel)
            .copied()
            .unwrap_or(0)
    }

    pub fn total_declaration_count(&self) -> usize {
        self.declaration_calls.lock().unwrap().values().sum()
    }

    pub fn catalog_count(&self) -> usize {
        *self.catalog_calls.lock().unwrap()
    }

    fn network_error(&self, endpoint: &str) -> VersionError {
        VersionError::Http {
            url: format!("{MOCK_BASE_URL}/{endpoint}"),
            message: "connection refused".to_string(),
        }
    }
}

impl VersionSource for MockVersionSource {
    fn declaration(&self, channel: Channel) -> Result<VersionDeclaration, VersionError> {
        *self
            .declaration_calls
            .lock()
            .unwrap()
            .entry(channel)
            .or_insert(0) += 1;

        if self.failing {
            return Err(self.network_error(channel.as_str()));
        }
        self.channels
            .get(&channel)
            .cloned()
            .ok_or_else(|| VersionError::Http {
                url: self.describe(channel),
                message: "HTTP status client error (404 Not Found)".to_string(),
            })
    }

    fn catalog(&self) -> Result<Vec<VersionDeclaration>, VersionError> {
        *self.catalog_calls.lock().unwrap() += 1;

        if self.failing {
            return Err(self.network_error("all"));
        }
        Ok(self.catalog.clone())
    }

    fn describe(&self, channel: Channel) -> String {
        format!("{MOCK_BASE_URL}/{}", channel.as_str())
    }
}
