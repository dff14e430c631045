//! Drag controller.
//!
//! A small state machine for moving one element with the pointer. On press
//! it records the pointer's offset inside the element; every move places
//! the element at `pointer - offset`, optionally snapped to a grid and
//! clamped inside a parent frame. The controller never touches the
//! document: the caller commits the final position when the drag ends.
//!
//! All inputs share one frame (the session uses canvas pixels). Emitted
//! positions are relative to the parent's top-left when a parent is given.

use fm_core::{Point, Rect};

/// Snapping and clamping behaviour.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DragOptions {
    /// Grid pitch; values ≤ 1 disable snapping.
    pub grid_size: u32,
    /// Clamp the element inside its parent.
    pub constrain_to_parent: bool,
}

impl Default for DragOptions {
    fn default() -> Self {
        Self {
            grid_size: 1,
            constrain_to_parent: false,
        }
    }
}

/// Notifications produced by the controller.
#[derive(Debug, Clone, PartialEq)]
pub enum DragEvent<P> {
    Started(P),
    Moved { x: f64, y: f64 },
    Ended { x: f64, y: f64, payload: P },
}

#[derive(Debug, Clone)]
struct Gesture<P> {
    /// Pointer position minus element top-left at press time.
    offset: Point,
    element: Rect,
    parent: Option<Rect>,
    /// Last emitted position.
    current: Point,
    payload: P,
}

#[derive(Debug, Clone)]
pub struct DragController<P> {
    options: DragOptions,
    gesture: Option<Gesture<P>>,
}

impl<P: Clone> DragController<P> {
    pub fn new(options: DragOptions) -> Self {
        Self {
            options,
            gesture: None,
        }
    }

    pub fn options(&self) -> DragOptions {
        self.options
    }

    /// Takes effect from the next pointer move.
    pub fn set_options(&mut self, options: DragOptions) {
        self.options = options;
    }

    pub fn is_dragging(&self) -> bool {
        self.gesture.is_some()
    }

    pub fn payload(&self) -> Option<&P> {
        self.gesture.as_ref().map(|g| &g.payload)
    }

    /// Last emitted position, if dragging.
    pub fn position(&self) -> Option<Point> {
        self.gesture.as_ref().map(|g| g.current)
    }

    /// Start dragging `element` from `pointer`. A gesture already in flight
    /// is dropped without an `Ended` event.
    pub fn begin(
        &mut self,
        pointer: Point,
        element: Rect,
        parent: Option<Rect>,
        payload: P,
    ) -> DragEvent<P> {
        if self.gesture.take().is_some() {
            log::debug!("drag restarted before release; previous gesture dropped");
        }
        let frame = parent.map(|p| p.origin()).unwrap_or(Point::ORIGIN);
        self.gesture = Some(Gesture {
            offset: Point::new(pointer.x - element.x, pointer.y - element.y),
            element,
            parent,
            current: Point::new(element.x - frame.x, element.y - frame.y),
            payload: payload.clone(),
        });
        DragEvent::Started(payload)
    }

    /// Move to a new pointer position. `None` when idle.
    pub fn update(&mut self, pointer: Point) -> Option<DragEvent<P>> {
        let options = self.options;
        let gesture = self.gesture.as_mut()?;
        let frame = gesture.parent.map(|p| p.origin()).unwrap_or(Point::ORIGIN);

        let mut x = snap_to_grid(pointer.x - gesture.offset.x - frame.x, options.grid_size);
        let mut y = snap_to_grid(pointer.y - gesture.offset.y - frame.y, options.grid_size);

        if options.constrain_to_parent
            && let Some(parent) = gesture.parent
        {
            x = clamp_axis(x, parent.width, gesture.element.width);
            y = clamp_axis(y, parent.height, gesture.element.height);
        }

        gesture.current = Point::new(x, y);
        log::trace!("drag → ({x}, {y})");
        Some(DragEvent::Moved { x, y })
    }

    /// Release. Reports the last position; no further moves are reported.
    pub fn end(&mut self) -> Option<DragEvent<P>> {
        let gesture = self.gesture.take()?;
        Some(DragEvent::Ended {
            x: gesture.current.x,
            y: gesture.current.y,
            payload: gesture.payload,
        })
    }

    /// Abandon the gesture without reporting an end. Returns whether a
    /// gesture was in flight.
    pub fn cancel(&mut self) -> bool {
        self.gesture.take().is_some()
    }

    /// Cancel only if the current payload matches.
    pub fn cancel_if(&mut self, pred: impl FnOnce(&P) -> bool) -> bool {
        match &self.gesture {
            Some(g) if pred(&g.payload) => self.cancel(),
            _ => false,
        }
    }
}

impl<P: Clone> Default for DragController<P> {
    fn default() -> Self {
        Self::new(DragOptions::default())
    }
}

/// Round to the nearest multiple of `grid`; grids of 0 or 1 pass through.
pub fn snap_to_grid(v: f64, grid: u32) -> f64 {
    if grid <= 1 {
        return v;
    }
    let g = f64::from(grid);
    (v / g).round() * g
}

/// Keep `[v, v + element]` inside `[0, parent]`. An element larger than its
/// parent pins to 0.
pub fn clamp_axis(v: f64, parent: f64, element: f64) -> f64 {
    v.min(parent - element).max(0.0)
}
