//! Committed scene edits produced by drag sessions.
//!
//! Sessions never touch the scene directly; they emit `SceneMutation`s that
//! the editor applies, so a host can log, replay, or forward them.

use mm_core::error::SceneError;
use mm_core::geometry::{Point, Size};
use mm_core::id::{ConnectionId, NodeId};
use mm_core::model::{ConnectionEnd, PortRef};
use mm_core::scene::Scene;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SceneMutation {
    /// Move a node's top-left toward `(x, y)`; the scene snaps it.
    MoveNode { id: NodeId, x: f32, y: f32 },
    /// Set a node's size, clamped and center anchored.
    ResizeNode { id: NodeId, width: f32, height: f32 },
    /// Create a connection between two ports.
    Connect { start: PortRef, end: PortRef },
    /// Move one end of an existing connection.
    Retarget {
        id: ConnectionId,
        end: ConnectionEnd,
        to: PortRef,
    },
}

impl SceneMutation {
    /// Apply to `scene`. On error the scene is unchanged.
    pub fn apply(&self, scene: &mut Scene) -> Result<(), SceneError> {
        match *self {
            SceneMutation::MoveNode { id, x, y } => {
                scene.move_node(id, Point::new(x, y))?;
            }
            SceneMutation::ResizeNode { id, width, height } => {
                scene.set_node_size(id, Size::new(width, height))?;
            }
            SceneMutation::Connect { start, end } => {
                scene.add_connection(start, end)?;
            }
            SceneMutation::Retarget { id, end, to } => {
                scene.retarget_connection(id, end, to)?;
            }
        }
        Ok(())
    }
}
