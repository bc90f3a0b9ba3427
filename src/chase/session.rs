//! Working state of one chase.

use std::time::Duration;

use reqwest::cookie::Jar;
use tokio::time::Instant;

use crate::error_handling::ChaseError;
use crate::page::Page;

use super::ChaseReport;

/// Pages recorded so far, the overall deadline and the cookie jar.
///
/// Created when a chase starts and consumed into a [`ChaseReport`] when it
/// ends. Pages are only ever appended. The jar starts empty and is dropped
/// with the session, so cookies never carry over into another chase.
#[derive(Debug)]
pub(crate) struct ChaseSession {
    pages: Vec<Page>,
    deadline: Option<(Instant, Duration)>,
    jar: Jar,
}

impl ChaseSession {
    /// Starts a session whose deadline, if any, is `timeout` from now.
    pub(crate) fn start(timeout: Option<Duration>) -> Self {
        Self {
            pages: Vec::new(),
            deadline: timeout.map(|timeout| (Instant::now() + timeout, timeout)),
            jar: Jar::default(),
        }
    }

    /// When the whole chase must be done, and the configured timeout.
    pub(crate) fn deadline(&self) -> Option<(Instant, Duration)> {
        self.deadline
    }

    /// Cookies collected by this chase.
    pub(crate) fn jar(&self) -> &Jar {
        &self.jar
    }

    /// Appends a page and returns it.
    ///
    /// The page becomes part of the trace as soon as it is appended; nothing
    /// removes or changes it afterwards.
    pub(crate) fn append(&mut self, page: Page) -> &Page {
        self.pages.push(page);
        &self.pages[self.pages.len() - 1]
    }

    /// Number of pages recorded.
    pub(crate) fn hop_count(&self) -> usize {
        self.pages.len()
    }

    /// Ends the session.
    pub(crate) fn finish(self, error: Option<ChaseError>) -> ChaseReport {
        ChaseReport {
            pages: self.pages,
            error,
        }
    }
}
