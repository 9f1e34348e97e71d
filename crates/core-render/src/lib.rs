//! Viewport and visual mapping.
//!
//! Maps byte offsets to screen rows without ever building a line list:
//! [`viewport`] owns the scroll window and its wrap-aware row walking,
//! [`frame`] turns the window into a grid of styled cells for a terminal
//! front end.
//!
//! Invariants:
//! - `Viewport::start_offset` sits on a visual row boundary after any
//!   viewport operation.
//! - After `ensure_visible(p)`, `start <= p < end`, or `p == end == len`.
//! - Highlights handed to the frame are clipped to `[start, end)`.
//!
//! Telemetry: window movement traces under `render.viewport`.

use bitflags::bitflags;
use core_state::Session;

pub mod frame;
pub mod viewport;

pub use frame::{Cell, Frame, layout};
pub use viewport::{Viewport, visual_line_end, visual_line_start};

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct HighlightFlags: u8 {
        const SELECTION = 0b0000_0001; // the dot
        const MATCH     = 0b0000_0010; // search / pattern hits
        const CURSOR    = 0b0000_0100;
        const EOF       = 0b0000_1000; // filler past the end of the document
    }
}

/// Styled byte range `[start, end)` of the document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Highlight {
    pub start: usize,
    pub end: usize,
    pub flags: HighlightFlags,
}

impl Highlight {
    pub fn new(start: usize, end: usize, flags: HighlightFlags) -> Self {
        Self { start, end, flags }
    }
}

/// Scroll `viewport` to the session's cursor, starting from the window start
/// the session has kept translated across edits, and store the result back.
/// Returns whether the window moved.
pub fn follow_point(session: &mut Session, viewport: &mut Viewport) -> bool {
    viewport.start_offset = session.viewport_start();
    let moved = viewport.ensure_visible(session.bytes(), session.cursor().off);
    session.set_viewport_start(viewport.start_offset);
    moved
}

/// Lay out the session's window with its dot highlighted.
pub fn render_session(session: &mut Session, viewport: &mut Viewport) -> Frame {
    follow_point(session, viewport);
    let dot = session.dot();
    let selection = [Highlight::new(dot.start, dot.end, HighlightFlags::SELECTION)];
    layout(session.bytes(), viewport, session.cursor().off, &selection)
}
