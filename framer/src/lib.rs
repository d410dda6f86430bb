//! Capacity-bounded display frames for chat-platform delivery.
//!
//! Model responses and captured command output routinely outgrow a
//! platform's per-message limit. [`splitter::split_with_overlay`] turns one
//! long text into an ordered run of [`Frame`]s, each within the configured
//! [`FrameBudget`], closing any fenced code block or inline code span that a
//! cut would otherwise leave dangling and reopening it on the next frame so
//! every frame renders cleanly on its own. [`fence::scan`] is the parity
//! bookkeeping behind those repairs.
//!
//! Delivery itself is someone else's job: this crate only consumes text and
//! produces frames.

pub mod budget;
pub mod fence;
pub mod frame;
pub mod splitter;

pub use budget::ConfigError;
pub use budget::FrameBudget;
pub use fence::FenceState;
pub use frame::Frame;
pub use splitter::EMPTY_PLACEHOLDER;
pub use splitter::split;
pub use splitter::split_with_overlay;
