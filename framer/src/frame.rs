//! The unit of delivery produced by a split.

/// One capacity-bounded unit of text, sized for a single delivery action.
///
/// Frames come out of [`crate::splitter::split`] in delivery order and are
/// never re-split. `body` already carries any fence-repair markup the cut
/// called for, so each frame renders cleanly on its own.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    /// 1-based position within the split.
    pub sequence_index: usize,
    /// Total number of frames the split produced.
    pub sequence_count: usize,
    /// Text to deliver, within the configured capacity.
    pub body: String,
    /// The frame starts inside the commentary overlay rather than the
    /// primary text; delivery may render it in a muted style.
    pub is_overlay_region: bool,
}

impl Frame {
    /// The lone frame of a split that needed no cutting.
    pub(crate) fn single(body: String) -> Self {
        Self {
            sequence_index: 1,
            sequence_count: 1,
            body,
            is_overlay_region: false,
        }
    }

    /// Position label for delivery titles (e.g. "Response 2/5").
    pub fn position_label(&self) -> String {
        format!("{}/{}", self.sequence_index, self.sequence_count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn position_label_is_one_based() {
        let frame = Frame {
            sequence_index: 2,
            sequence_count: 5,
            body: "middle".to_string(),
            is_overlay_region: false,
        };
        assert_eq!(frame.position_label(), "2/5");
    }

    #[test]
    fn single_frame_labels_one_of_one() {
        let frame = Frame::single("whole".to_string());
        assert_eq!(frame.position_label(), "1/1");
        assert!(!frame.is_overlay_region);
    }
}
