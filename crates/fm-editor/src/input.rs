//! Input abstraction layer.
//!
//! Normalizes mouse, touch, and window events into a unified `InputEvent`
//! consumed by the session. Coordinates are pointer client coordinates.

use fm_core::Point;
use smallvec::SmallVec;

/// Active touch points; the first one drives dragging.
pub type Touches = SmallVec<[Point; 2]>;

/// A raw input event from the host.
#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    /// Mouse button pressed.
    PointerDown { x: f64, y: f64 },

    /// Mouse moved.
    PointerMove { x: f64, y: f64 },

    /// Mouse button released.
    PointerUp { x: f64, y: f64 },

    TouchStart { touches: Touches },
    TouchMove { touches: Touches },
    TouchEnd,

    /// The window lost focus; any gesture in flight will never see its
    /// release event.
    Blur,
}

/// What an input event means for a drag gesture.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerAction {
    Press(Point),
    Move(Point),
    Release,
    Cancel,
}

impl InputEvent {
    pub fn touch_start(points: &[(f64, f64)]) -> Self {
        Self::TouchStart {
            touches: points.iter().map(|&(x, y)| Point::new(x, y)).collect(),
        }
    }

    pub fn touch_move(points: &[(f64, f64)]) -> Self {
        Self::TouchMove {
            touches: points.iter().map(|&(x, y)| Point::new(x, y)).collect(),
        }
    }

    /// Pointer position, using the first touch point for touch events.
    pub fn position(&self) -> Option<Point> {
        match self {
            Self::PointerDown { x, y } | Self::PointerMove { x, y } | Self::PointerUp { x, y } => {
                Some(Point::new(*x, *y))
            }
            Self::TouchStart { touches } | Self::TouchMove { touches } => touches.first().copied(),
            Self::TouchEnd | Self::Blur => None,
        }
    }

    /// Classify for the drag state machine. Touch events without any touch
    /// point carry no position and map to `None`.
    pub fn action(&self) -> Option<PointerAction> {
        match self {
            Self::PointerDown { .. } | Self::TouchStart { .. } => {
                self.position().map(PointerAction::Press)
            }
            Self::PointerMove { .. } | Self::TouchMove { .. } => {
                self.position().map(PointerAction::Move)
            }
            Self::PointerUp { .. } | Self::TouchEnd => Some(PointerAction::Release),
            Self::Blur => Some(PointerAction::Cancel),
        }
    }
}
