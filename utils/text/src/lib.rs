//! Display-safe text helpers.
//!
//! Captured subprocess output and model responses pass through here on the
//! way to the display pipeline: ANSI escape sequences are stripped, fence
//! delimiters are neutralized when text has to sit inside an existing fenced
//! block, and the slicing helpers keep cut points on character boundaries.

use std::borrow::Cow;
use std::sync::OnceLock;

use regex_lite::Regex;

/// CSI sequences in both their 7-bit (`ESC [`) and 8-bit (`0x9B`) spellings.
const ANSI_PATTERN: &str = r"(\x9b|\x1b\[)[0-?]*[ -/]*[@-~]";

fn ansi_regex() -> &'static Regex {
    static ANSI_RE: OnceLock<Regex> = OnceLock::new();
    // The pattern is a compile-time constant; failure here is unreachable.
    #[allow(clippy::expect_used)]
    ANSI_RE.get_or_init(|| Regex::new(ANSI_PATTERN).expect("ANSI pattern compiles"))
}

/// Remove ANSI escape sequences from terminal output.
///
/// Borrows when the input contains no escapes, which is the common case for
/// model-generated text.
///
/// # Examples
///
/// ```
/// use cria_utils_text::strip_ansi_codes;
///
/// assert_eq!(strip_ansi_codes("\x1b[31mred\x1b[0m"), "red");
/// assert_eq!(strip_ansi_codes("plain"), "plain");
/// ```
pub fn strip_ansi_codes(s: &str) -> Cow<'_, str> {
    ansi_regex().replace_all(s, "")
}

/// Fence delimiter with zero-width spaces between the backticks: renders the
/// same, no longer parses as a delimiter.
const NEUTRALIZED_FENCE: &str = "`\u{200b}`\u{200b}`";

/// Make text safe to embed inside an existing fenced block.
///
/// Every triple-backtick run is rewritten with zero-width spaces between the
/// backticks, so the embedded text can no longer terminate the surrounding
/// fence while still looking identical to the reader.
///
/// # Examples
///
/// ```
/// use cria_utils_text::neutralize_fences;
///
/// let safe = neutralize_fences("a ```sh block``` here");
/// assert!(!safe.contains("```"));
/// ```
pub fn neutralize_fences(s: &str) -> Cow<'_, str> {
    if !s.contains("```") {
        return Cow::Borrowed(s);
    }
    Cow::Owned(s.replace("```", NEUTRALIZED_FENCE))
}

/// True for text with nothing visible in it: empty, or whitespace only.
///
/// Callers collapse such output to a placeholder instead of delivering a
/// blank message.
#[inline]
pub fn is_blank(s: &str) -> bool {
    s.chars().all(char::is_whitespace)
}

/// Split at the byte offset of the `n`-th character.
///
/// Returns the first `n` characters and the rest. Strings shorter than `n`
/// characters come back whole, paired with an empty remainder.
///
/// # Examples
///
/// ```
/// use cria_utils_text::split_at_char_index;
///
/// assert_eq!(split_at_char_index("hello world", 5), ("hello", " world"));
/// assert_eq!(split_at_char_index("héllo", 2), ("hé", "llo"));
/// assert_eq!(split_at_char_index("hi", 10), ("hi", ""));
/// ```
#[inline]
pub fn split_at_char_index(s: &str, n: usize) -> (&str, &str) {
    match s.char_indices().nth(n) {
        Some((byte_idx, _)) => s.split_at(byte_idx),
        None => (s, ""),
    }
}

/// Character count, as distinct from `str::len`'s byte count.
///
/// Display capacities are denominated in characters, so sizing decisions go
/// through this rather than `len()`.
#[inline]
pub fn char_len(s: &str) -> usize {
    s.chars().count()
}
