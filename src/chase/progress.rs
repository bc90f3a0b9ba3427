//! Progress reporting between hops.

use crate::page::Page;

/// Receives every page right after it is recorded.
///
/// The sink runs inline on the chase: the next hop is not issued until it
/// returns. Returning an error aborts the chase, and that error becomes the
/// chase's failure unchanged.
pub trait ProgressSink: Send {
    /// Called once per recorded page, in hop order.
    fn on_page(&mut self, page: &Page) -> anyhow::Result<()>;
}

impl<F> ProgressSink for F
where
    F: FnMut(&Page) -> anyhow::Result<()> + Send,
{
    fn on_page(&mut self, page: &Page) -> anyhow::Result<()> {
        self(page)
    }
}
