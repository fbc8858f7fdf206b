//! Clipboard support.
//!
//! Best-effort: a headless terminal without a display server simply reports
//! failure and the caller falls back to a toast with the text inline.

use copypasta::{ClipboardContext, ClipboardProvider};

pub fn copy_to_clipboard(s: &str) -> bool {
    match ClipboardContext::new() {
        Ok(mut ctx) => ctx.set_contents(s.to_string()).is_ok(),
        Err(_) => false,
    }
}
