//! Per-hop progress output.

use std::io::{self, Write};

use colored::{ColoredString, Colorize};

use crate::chase::ProgressSink;
use crate::page::{HopOutcome, Page};

/// Prints a short colored summary of every hop.
///
/// ```text
/// https://example.com/
/// Sent to 93.184.216.34:443 (using TLS version TLS 1.3)
/// 301 Moved Permanently
/// Cookies set: session, theme
/// ```
pub struct ProgressPrinter<W: Write + Send> {
    out: W,
}

impl ProgressPrinter<io::Stderr> {
    /// Prints to stderr.
    pub fn stderr() -> Self {
        Self::new(io::stderr())
    }
}

impl<W: Write + Send> ProgressPrinter<W> {
    /// Prints to `out`.
    pub fn new(out: W) -> Self {
        Self { out }
    }

    /// Consumes the printer and returns its writer.
    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write + Send> ProgressSink for ProgressPrinter<W> {
    fn on_page(&mut self, page: &Page) -> anyhow::Result<()> {
        // Progress output is best effort; a closed stderr must not stop the chase.
        let _ = self.out.write_all(render(page).as_bytes());
        let _ = self.out.flush();
        Ok(())
    }
}

fn render(page: &Page) -> String {
    let mut text = format!("{}\n", page.request_url);

    let remote = page
        .remote_addr
        .map(|addr| addr.to_string())
        .unwrap_or_default();
    let mut sent = format!("Sent to {remote}");
    if let Some(tls) = &page.tls {
        sent.push_str(&format!(" (using TLS version {})", tls.version));
    }
    text.push_str(&format!("{}\n", sent.cyan()));

    match &page.outcome {
        HopOutcome::Response(response) => {
            text.push_str(&format!(
                "{}\n",
                status_color(response.status_code, &response.status_message)
            ));
            if !response.cookies.is_empty() {
                let names: Vec<&str> = response.cookies.iter().map(|c| c.name.as_str()).collect();
                let cookies = format!("Cookies set: {}", names.join(", "));
                text.push_str(&format!("{}\n", cookies.cyan()));
            }
        }
        HopOutcome::Error(error) => text.push_str(&format!("{}\n", error.message.red())),
    }

    text.push('\n');
    text
}

fn status_color(code: u16, message: &str) -> ColoredString {
    match code {
        200..=299 => message.green(),
        300..=399 => message.yellow(),
        400..=499 => message.red(),
        _ => message.cyan(),
    }
}
