//! The chase engine.
//!
//! A chase issues one hop at a time, records it, reports it to the progress
//! sink, checks the hop limit, then asks the resolver where to go next. It
//! ends when:
//! - the progress sink returns an error (`ChaseError::Aborted`)
//! - the hop limit is reached (`ChaseError::TooManyRedirects`)
//! - the overall deadline passes mid-hop (`ChaseError::Timeout`)
//! - a hop fails in transport (no error; see the last page)
//! - the resolver finds no next hop (no error)

mod progress;
mod session;

use std::time::Instant;

use chrono::Utc;
use log::{debug, info, warn};
use reqwest::cookie::Jar;
use reqwest::header::{HeaderValue, USER_AGENT};

use crate::config::ChaseConfig;
use crate::error_handling::ChaseError;
use crate::page::{HopOutcome, HopRecorder, Page, RequestSnapshot};
use crate::redirect::{RedirectResolver, Resolution};
use crate::transport::{jar_cookie_header, DnsObserver, HopRequest, Transport};

pub use progress::ProgressSink;
use session::ChaseSession;

/// Everything a chase produced.
#[derive(Debug)]
pub struct ChaseReport {
    /// Every recorded hop, in order.
    pub pages: Vec<Page>,
    /// Why the chase failed, if it did.
    ///
    /// `None` means it either reached a terminal page or stopped on a
    /// transport failure recorded on the last page.
    pub error: Option<ChaseError>,
}

impl ChaseReport {
    /// The last recorded page.
    pub fn final_page(&self) -> Option<&Page> {
        self.pages.last()
    }

    /// True when there is no top-level failure and the last hop got a response.
    pub fn is_clean(&self) -> bool {
        self.error.is_none() && self.final_page().is_some_and(|page| page.response().is_some())
    }

    /// The pages, or the top-level failure.
    pub fn into_result(self) -> Result<Vec<Page>, ChaseError> {
        match self.error {
            Some(error) => Err(error),
            None => Ok(self.pages),
        }
    }
}

/// Follows redirects through a [`Transport`].
///
/// The engine holds configuration only. Every call to [`ChaseEngine::chase`]
/// starts from an empty trace and an empty cookie jar.
pub struct ChaseEngine<T: Transport> {
    transport: T,
    config: ChaseConfig,
    user_agent: Option<HeaderValue>,
    recorder: HopRecorder,
    progress: Option<Box<dyn ProgressSink>>,
}

impl<T: Transport> ChaseEngine<T> {
    /// Creates an engine. A user agent that is not a valid header value is
    /// ignored with a warning.
    pub fn new(transport: T, config: ChaseConfig) -> Self {
        let user_agent = config
            .user_agent
            .as_deref()
            .and_then(|ua| match HeaderValue::from_str(ua) {
                Ok(value) => Some(value),
                Err(e) => {
                    warn!("Ignoring invalid user agent {ua:?}: {e}");
                    None
                }
            });
        Self {
            transport,
            config,
            user_agent,
            recorder: HopRecorder::new(),
            progress: None,
        }
    }

    /// Reports every recorded page to `sink`.
    pub fn with_progress(mut self, sink: impl ProgressSink + 'static) -> Self {
        self.progress = Some(Box::new(sink));
        self
    }

    /// Uses `recorder` to build pages.
    pub fn with_recorder(mut self, recorder: HopRecorder) -> Self {
        self.recorder = recorder;
        self
    }

    /// The transport hops are sent through.
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Chases `initial` until a terminal hop, a failure or the hop limit.
    pub async fn chase(&mut self, initial: HopRequest) -> ChaseReport {
        let mut session = ChaseSession::start(self.config.timeout);
        let mut request = initial;

        loop {
            if let Some(user_agent) = &self.user_agent {
                request.headers.insert(USER_AGENT, user_agent.clone());
            }
            let hop_number = session.hop_count() + 1;
            debug!("Hop {hop_number}: {} {}", request.method, request.url);

            let page = match session.deadline() {
                Some((deadline, timeout)) => {
                    let hop = record_hop(&self.transport, &self.recorder, session.jar(), request);
                    let finished = tokio::time::timeout_at(deadline, hop).await;
                    match finished {
                        Ok(page) => page,
                        Err(_) => {
                            warn!("Chase timed out after {timeout:?} during hop {hop_number}");
                            return session.finish(Some(ChaseError::Timeout(timeout)));
                        }
                    }
                }
                None => {
                    record_hop(&self.transport, &self.recorder, session.jar(), request).await
                }
            };

            let page = session.append(page);
            match &page.outcome {
                HopOutcome::Response(response) => info!(
                    "Hop {hop_number}: {} -> {}",
                    page.request_url, response.status_message
                ),
                HopOutcome::Error(error) => {
                    info!("Hop {hop_number}: {} failed: {error}", page.request_url)
                }
            }

            if let Some(progress) = self.progress.as_mut() {
                if let Err(e) = progress.on_page(page) {
                    warn!("Chase aborted by progress sink: {e:#}");
                    return session.finish(Some(ChaseError::Aborted(e)));
                }
            }

            if self.config.limit != 0 && hop_number >= self.config.limit {
                warn!("Hop limit of {} reached", self.config.limit);
                return session.finish(Some(ChaseError::TooManyRedirects(hop_number)));
            }

            if page.error().is_some() {
                debug!("Chase ends at hop {hop_number} on a transport failure");
                return session.finish(None);
            }

            let next = match RedirectResolver::resolve(page) {
                Resolution::Follow { request, via } => {
                    debug!("Next hop via {via:?}: {}", request.url);
                    request
                }
                Resolution::Terminal(reason) => {
                    debug!("Chase ends at hop {hop_number}: {reason}");
                    return session.finish(None);
                }
            };
            request = next;
        }
    }
}

/// Sends one request and records whatever comes back.
async fn record_hop<T: Transport>(
    transport: &T,
    recorder: &HopRecorder,
    jar: &Jar,
    request: HopRequest,
) -> Page {
    let jar_cookies = jar_cookie_header(jar, &request);
    let snapshot = RequestSnapshot::capture(&request, jar_cookies.as_ref());
    let dns = DnsObserver::new();
    let started_at = Utc::now();
    let start = Instant::now();

    let outcome = transport.send(request, dns.clone(), jar).await;
    recorder
        .record(snapshot, outcome, &dns, started_at, start)
        .await
}
