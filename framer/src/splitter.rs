//! Splitting long text into capacity-bounded frames.
//!
//! The walk is a fixed stride of `effective()` characters. At every cut the
//! cumulative fence state decides the repair: an open fence is closed on the
//! outgoing frame and reopened (with its language tag) at the top of the
//! next one; failing that, an open inline span is closed and reopened with a
//! single backtick. Fence repair wins when both look open. The final frame
//! is never repaired, so an unterminated fence in the input is delivered
//! exactly as the author left it.

use std::borrow::Cow;

use cria_utils_text::char_len;
use cria_utils_text::split_at_char_index;
use tracing::debug;
use tracing::trace;

use crate::budget::ConfigError;
use crate::budget::FrameBudget;
use crate::fence::FenceScanner;
use crate::frame::Frame;

/// Body delivered when there is nothing to show.
pub const EMPTY_PLACEHOLDER: &str = "no output";

/// What the cut at the end of the previous frame left open.
enum Reopen {
    Fence(String),
    Inline,
}

/// Split `text` into ordered frames that each fit `budget`.
///
/// Text that fits a single frame is passed through untouched. Longer text is
/// cut every `budget.effective()` characters with fence-safe repairs at each
/// cut; re-joining the bodies minus those repairs reproduces `text` exactly.
/// Empty input still yields one frame, carrying [`EMPTY_PLACEHOLDER`].
///
/// The only error is a budget whose reservation swallows its capacity.
pub fn split(text: &str, budget: FrameBudget) -> Result<Vec<Frame>, ConfigError> {
    split_with_overlay(text, None, budget)
}

/// [`split`] with a commentary overlay prepended to the text.
///
/// The overlay (model "thinking", progress notes) is sliced together with
/// the primary text; every frame overlapping the overlay's original length
/// is flagged [`Frame::is_overlay_region`] so the delivery layer can render
/// it apart. The flag never changes where cuts land. An empty overlay
/// behaves exactly like no overlay.
pub fn split_with_overlay(
    text: &str,
    overlay: Option<&str>,
    budget: FrameBudget,
) -> Result<Vec<Frame>, ConfigError> {
    budget.validate()?;
    let effective = budget.effective();

    let overlay = overlay.unwrap_or("");
    let overlay_chars = char_len(overlay);

    let source: Cow<'_, str> = if overlay.is_empty() {
        Cow::Borrowed(text)
    } else {
        Cow::Owned(format!("{overlay}{text}"))
    };

    if source.is_empty() {
        return Ok(vec![Frame::single(EMPTY_PLACEHOLDER.to_string())]);
    }

    let total_chars = char_len(&source);
    if overlay_chars == 0 && total_chars <= effective {
        // Common case: one frame, no fence bookkeeping at all.
        return Ok(vec![Frame::single(source.into_owned())]);
    }

    // Fixed stride: every frame except the last carries exactly `effective`
    // characters of source text.
    let mut raw_slices: Vec<&str> = Vec::new();
    let mut rest: &str = &source;
    let mut remaining = total_chars;
    while remaining > effective {
        let (head, tail) = split_at_char_index(rest, effective);
        raw_slices.push(head);
        rest = tail;
        remaining -= effective;
    }
    raw_slices.push(rest);

    let count = raw_slices.len();
    let mut frames = Vec::with_capacity(count);
    let mut scanner = FenceScanner::new();
    let mut reopen: Option<Reopen> = None;

    for (index, raw) in raw_slices.into_iter().enumerate() {
        let mut body = String::with_capacity(raw.len() + budget.reserved_markup);
        match reopen.take() {
            Some(Reopen::Fence(tag)) => {
                body.push_str("```");
                body.push_str(&tag);
                body.push('\n');
            }
            Some(Reopen::Inline) => body.push('`'),
            None => {}
        }
        body.push_str(raw);

        scanner.feed(raw);
        if index + 1 < count {
            let state = scanner.state();
            if state.in_fenced_block {
                body.push_str("```");
                reopen = Some(Reopen::Fence(state.language_tag));
                trace!(frame = index + 1, "closed open fence at cut");
            } else if state.in_inline_span {
                body.push('`');
                reopen = Some(Reopen::Inline);
                trace!(frame = index + 1, "closed open inline span at cut");
            }
        }

        frames.push(Frame {
            sequence_index: index + 1,
            sequence_count: count,
            body,
            is_overlay_region: index * effective < overlay_chars,
        });
    }

    debug!(
        frames = count,
        capacity = budget.capacity,
        reserved = budget.reserved_markup,
        overlay = overlay_chars > 0,
        "split text into frames"
    );

    Ok(frames)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn empty_input_yields_placeholder_frame() {
        let frames = split("", FrameBudget::COMPACT);
        assert_eq!(
            frames,
            Ok(vec![Frame {
                sequence_index: 1,
                sequence_count: 1,
                body: EMPTY_PLACEHOLDER.to_string(),
                is_overlay_region: false,
            }])
        );
    }

    #[test]
    fn invalid_budget_is_rejected_before_any_work() {
        let bogus = FrameBudget {
            capacity: 24,
            reserved_markup: 24,
        };
        assert_eq!(
            split("text", bogus),
            Err(ConfigError {
                capacity: 24,
                reserved_markup: 24,
            })
        );
    }

    #[test]
    fn short_text_with_overlay_still_gets_marked() {
        let frames = split_with_overlay("hi", Some("note: "), FrameBudget::RICH);
        let frames = frames.unwrap_or_default();
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].body, "note: hi");
        assert!(frames[0].is_overlay_region);
    }

    #[test]
    fn empty_overlay_is_no_overlay() {
        let frames = split_with_overlay("hi", Some(""), FrameBudget::RICH);
        let frames = frames.unwrap_or_default();
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].body, "hi");
        assert!(!frames[0].is_overlay_region);
    }

    #[test]
    fn multibyte_text_cuts_on_character_boundaries() {
        // 10 characters per frame, 25 two-byte characters in the text.
        let budget = FrameBudget {
            capacity: 10,
            reserved_markup: 0,
        };
        let text = "é".repeat(25);
        let frames = split(&text, budget).unwrap_or_default();
        assert_eq!(frames.len(), 3);
        assert_eq!(char_len(&frames[0].body), 10);
        assert_eq!(char_len(&frames[1].body), 10);
        assert_eq!(char_len(&frames[2].body), 5);
        let joined: String = frames.iter().map(|f| f.body.as_str()).collect();
        assert_eq!(joined, text);
    }
}
