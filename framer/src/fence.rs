//! Backtick parity tracking for cut-point repair.
//!
//! This is counting, not Markdown parsing. Triple fences are tallied the way
//! non-overlapping substring search would tally them; inline spans are
//! inferred from the parity of the single backticks left over after triples
//! are accounted for. Runs of four or more backticks can therefore
//! misclassify an inline span, a long-standing accepted imprecision of
//! this heuristic, good enough for generated prose and code samples.

/// Most characters of language tag ever captured or re-emitted. Keeps the
/// reopening markup inside the budget reservation.
pub const LANGUAGE_TAG_BUFFER: usize = 16;

/// Lexical state at a position in the text being split.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FenceState {
    /// An opened triple-backtick fence has not been closed yet.
    pub in_fenced_block: bool,
    /// Language tag the open fence started with; empty for a bare fence.
    /// Meaningful only while `in_fenced_block` is set.
    pub language_tag: String,
    /// A single-backtick span appears to be open.
    pub in_inline_span: bool,
}

/// Walk `text` once and report the state at its end.
///
/// # Examples
///
/// ```
/// use cria_framer::fence::scan;
///
/// let state = scan("intro\n```rust\nfn main() {}\n");
/// assert!(state.in_fenced_block);
/// assert_eq!(state.language_tag, "rust");
///
/// assert!(scan("a `span").in_inline_span);
/// assert!(!scan("a `span`").in_inline_span);
/// ```
pub fn scan(text: &str) -> FenceState {
    let mut scanner = FenceScanner::new();
    scanner.feed(text);
    scanner.state()
}

/// Resumable form of [`scan`].
///
/// The splitter feeds one slice per frame and snapshots the state at every
/// cut, which keeps the cumulative bookkeeping linear in the input. A
/// backtick run still open when a slice ends stays pending, so a snapshot at
/// that point reads exactly like [`scan`] of everything fed so far, while a
/// run that continues into the next slice is re-grouped as one run.
#[derive(Debug, Clone, Default)]
pub(crate) struct FenceScanner {
    fence_open: bool,
    inline_open: bool,
    language_tag: String,
    /// Trailing backticks not yet attributed to triples/singles.
    pending_run: usize,
    /// Collecting the language tag of a fence that just opened.
    capturing_tag: bool,
}

impl FenceScanner {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn feed(&mut self, slice: &str) {
        for ch in slice.chars() {
            if ch == '`' {
                self.pending_run += 1;
                continue;
            }
            self.settle_run();
            if self.capturing_tag {
                if ch == '\n' {
                    self.capturing_tag = false;
                } else if self.language_tag.chars().count() < LANGUAGE_TAG_BUFFER {
                    self.language_tag.push(ch);
                }
            }
        }
    }

    /// State as [`scan`] of everything fed so far would report it.
    pub(crate) fn state(&self) -> FenceState {
        let mut probe = self.clone();
        probe.settle_run();
        FenceState {
            in_fenced_block: probe.fence_open,
            language_tag: if probe.fence_open {
                probe.language_tag
            } else {
                String::new()
            },
            in_inline_span: probe.inline_open,
        }
    }

    /// Attribute a finished backtick run: groups of three flip the fence,
    /// the remainder flips the inline span.
    fn settle_run(&mut self) {
        if self.pending_run == 0 {
            return;
        }
        let triples = self.pending_run / 3;
        let singles = self.pending_run % 3;
        self.pending_run = 0;

        if triples % 2 == 1 {
            self.fence_open = !self.fence_open;
            self.language_tag.clear();
            self.capturing_tag = self.fence_open;
        }
        if singles % 2 == 1 {
            self.inline_open = !self.inline_open;
        }
    }
}
