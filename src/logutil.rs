//! Single-line rendering of gateway message bodies for the log.
//!
//! Bodies arrive from arbitrary stations over the air and may carry newlines,
//! tabs or stray control bytes; logged raw they would split or garble lines.

/// Longest body preview written to the log, in characters.
pub const BODY_PREVIEW_CHARS: usize = 120;

/// Preview of a message body on one log line.
///
/// Backslashes and control characters use Rust escape syntax (`\n`, `\u{7}`),
/// and bodies longer than [`BODY_PREVIEW_CHARS`] end in `…`.
pub fn escape_log(body: &str) -> String {
    let mut chars = body.chars();
    let mut out = String::with_capacity(body.len().min(BODY_PREVIEW_CHARS) + 8);
    for c in chars.by_ref().take(BODY_PREVIEW_CHARS) {
        if c == '\\' || c.is_control() {
            out.extend(c.escape_default());
        } else {
            out.push(c);
        }
    }
    if chars.next().is_some() {
        out.push('…');
    }
    out
}
