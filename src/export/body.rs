//! Final body output.

use std::io::Write;

use log::debug;

use crate::error_handling::ExportError;
use crate::page::Page;

/// Writes the response body of the last page.
///
/// A last page that failed in transport has no body and writes nothing.
///
/// # Errors
///
/// Returns `ExportError::NoPages` when `pages` is empty, or the write error.
pub fn write_final_body<W: Write>(pages: &[Page], mut writer: W) -> Result<(), ExportError> {
    let last = pages.last().ok_or(ExportError::NoPages)?;
    match last.response() {
        Some(response) => writer.write_all(&response.body)?,
        None => debug!("Last page of {} has no response body", last.request_url),
    }
    writer.flush()?;
    Ok(())
}
