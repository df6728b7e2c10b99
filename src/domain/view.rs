//! Pan/zoom interaction state.
//!
//! The transform is a presentation-only affine map applied after layout.
//! Every change is the direct accumulation of discrete event deltas.

use serde::Serialize;
use tracing::trace;

use crate::domain::layout::Point;

pub const MIN_SCALE: f64 = 0.2;
pub const MAX_SCALE: f64 = 3.0;
/// Scale change per unit of wheel delta.
pub const WHEEL_SENSITIVITY: f64 = 0.001;

/// Translate followed by uniform scale.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ViewTransform {
    pub x: f64,
    pub y: f64,
    pub scale: f64,
}

impl Default for ViewTransform {
    fn default() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            scale: 1.0,
        }
    }
}

impl ViewTransform {
    /// Map a layout-space point to screen space.
    pub fn apply(&self, p: Point) -> Point {
        Point::new(p.x * self.scale + self.x, p.y * self.scale + self.y)
    }

    /// SVG `transform` attribute value.
    pub fn svg_attr(&self) -> String {
        format!("translate({},{}) scale({})", self.x, self.y, self.scale)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Interaction {
    Idle,
    Dragging { last: Point },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerEvent {
    Down(Point),
    Move(Point),
    Up,
    /// Pointer left the canvas
    Leave,
    Wheel { delta_y: f64 },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PanZoom {
    state: Interaction,
    transform: ViewTransform,
}

impl Default for PanZoom {
    fn default() -> Self {
        Self::new()
    }
}

impl PanZoom {
    pub fn new() -> Self {
        Self {
            state: Interaction::Idle,
            transform: ViewTransform::default(),
        }
    }

    pub fn transform(&self) -> ViewTransform {
        self.transform
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.state, Interaction::Dragging { .. })
    }

    /// Feed one event; returns the transform after it.
    pub fn handle(&mut self, event: PointerEvent) -> ViewTransform {
        match (event, self.state) {
            (PointerEvent::Down(p), _) => {
                self.state = Interaction::Dragging { last: p };
            }
            (PointerEvent::Move(p), Interaction::Dragging { last }) => {
                self.transform.x += p.x - last.x;
                self.transform.y += p.y - last.y;
                self.state = Interaction::Dragging { last: p };
            }
            (PointerEvent::Move(_), Interaction::Idle) => {}
            (PointerEvent::Up | PointerEvent::Leave, _) => {
                self.state = Interaction::Idle;
            }
            (PointerEvent::Wheel { delta_y }, _) => {
                self.zoom(delta_y);
            }
        }
        trace!(?event, transform = ?self.transform, "pan/zoom");
        self.transform
    }

    fn zoom(&mut self, delta_y: f64) {
        let scale = self.transform.scale - delta_y * WHEEL_SENSITIVITY;
        self.transform.scale = scale.clamp(MIN_SCALE, MAX_SCALE);
    }
}
