//! Clipboard helper for the copy-reply action
//!
//! Uses `arboard` for cross-platform support. The clipboard handle is
//! created fresh per copy so no display-server resources are held between
//! keypresses.

use anyhow::{Context, Result};
use arboard::Clipboard;

/// Copy text to the system clipboard
///
/// Fails on headless systems (no display server) or when access is denied;
/// the caller surfaces that as a toast, not an error.
pub fn copy_to_clipboard(text: &str) -> Result<()> {
    let mut clipboard = Clipboard::new().context("Failed to access clipboard")?;
    clipboard
        .set_text(text)
        .context("Failed to set clipboard text")?;
    Ok(())
}
