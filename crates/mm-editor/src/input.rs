//! Input abstraction layer.
//!
//! The host converts its native mouse/touch events into `InputEvent`s in
//! scene coordinates and forwards them to the editor.

use mm_core::geometry::{Corner, Point};
use mm_core::id::{ConnectionId, NodeId};
use mm_core::model::{ConnectionEnd, PortRef};

/// A normalized pointer event.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    /// Pointer pressed.
    PointerDown {
        x: f32,
        y: f32,
        /// What the host's own item picking found under the pointer, if it
        /// has one. `None` lets the editor hit-test the scene itself.
        target: Option<PointerTarget>,
    },

    /// Pointer moved, pressed or not.
    PointerMove { x: f32, y: f32 },

    /// Pointer released.
    PointerUp { x: f32, y: f32 },
}

/// The thing a pointer-down landed on.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerTarget {
    /// A resize handle of a node.
    Corner(NodeId, Corner),
    Port(PortRef),
    /// A rendered endpoint of a connection.
    ConnectionEnd(ConnectionId, ConnectionEnd),
    /// A node body.
    Node(NodeId),
    /// Empty canvas.
    Canvas,
}

impl InputEvent {
    pub fn down(x: f32, y: f32) -> Self {
        Self::PointerDown { x, y, target: None }
    }

    pub fn down_on(x: f32, y: f32, target: PointerTarget) -> Self {
        Self::PointerDown {
            x,
            y,
            target: Some(target),
        }
    }

    pub fn moved(x: f32, y: f32) -> Self {
        Self::PointerMove { x, y }
    }

    pub fn up(x: f32, y: f32) -> Self {
        Self::PointerUp { x, y }
    }

    pub fn position(&self) -> Point {
        match *self {
            Self::PointerDown { x, y, .. } | Self::PointerMove { x, y } | Self::PointerUp { x, y } => {
                Point::new(x, y)
            }
        }
    }
}
