//! JSON trace output.

use std::io::Write;

use crate::error_handling::ExportError;
use crate::page::Page;

/// Writes `pages` as a pretty-printed JSON array followed by a newline.
///
/// Bodies are base64, addresses are strings and hop durations are in
/// milliseconds. The originating request objects are not included.
///
/// # Errors
///
/// Returns `ExportError` if serialization or the write fails.
pub fn write_details<W: Write>(pages: &[Page], mut writer: W) -> Result<(), ExportError> {
    serde_json::to_writer_pretty(&mut writer, pages)?;
    writer.write_all(b"\n")?;
    writer.flush()?;
    Ok(())
}
