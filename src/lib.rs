//! chaselink library: redirect chain tracing
//!
//! This library follows a URL through its HTTP redirects (3xx `Location`) and
//! HTML meta refreshes, and records every hop as a [`Page`]: request and
//! response headers, cookies, TLS session parameters, peer certificates,
//! resolved addresses and timing.
//!
//! # Example
//!
//! ```no_run
//! use chaselink::{ChaseConfig, ChaseEngine, ClientOptions, HopRequest, HttpTransport};
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! chaselink::initialization::init_crypto_provider();
//! let transport = HttpTransport::new(&ClientOptions::default())?;
//! let mut engine = ChaseEngine::new(transport, ChaseConfig::default().with_limit(5));
//!
//! let report = engine.chase(HopRequest::parse_get("http://example.com/")?).await;
//! for page in &report.pages {
//!     println!("{} -> {:?}", page.request_url, page.status_code());
//! }
//! if let Some(error) = report.error {
//!     eprintln!("chase failed: {error}");
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # Requirements
//!
//! This library requires a Tokio runtime. Use `#[tokio::main]` in your application
//! or ensure you're calling library functions within an async context.

#![warn(missing_docs)]

pub mod app;
pub mod chase;
pub mod config;
mod error_handling;
pub mod export;
pub mod initialization;
pub mod page;
pub mod redirect;
pub mod tls;
pub mod transport;

// Re-export public API
pub use chase::{ChaseEngine, ChaseReport, ProgressSink};
pub use config::{ChaseConfig, ClientOptions, LogFormat, LogLevel};
pub use error_handling::{
    ChaseError, ExportError, InitializationError, TargetError, TransportError,
    TransportErrorKind,
};
pub use page::{HopRecorder, Page};
pub use redirect::{MetaRefreshScanner, RedirectResolver};
pub use transport::{DnsObserver, HopRequest, HopResponse, HttpTransport, Transport};
