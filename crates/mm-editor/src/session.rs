//! Drag sessions: one state machine per kind of pointer interaction.
//!
//! A session is started by a pointer-down, fed every pointer-move, and
//! consumed by the pointer-up. Sessions read the scene for hit testing but
//! only change it through the [`SceneMutation`]s they return.
//!
//! | Session  | Starts on               | Commits                      |
//! |----------|-------------------------|------------------------------|
//! | Resize   | corner handle           | every move and on release    |
//! | Link     | port                    | on release over another port |
//! | Retarget | connection endpoint     | on release over a port       |
//! | Move     | node body               | every move (snapped)         |

use crate::mutation::SceneMutation;
use mm_core::geometry::{Corner, Point, Size};
use mm_core::id::{ConnectionId, NodeId};
use mm_core::model::{ConnectionEnd, PortRef};
use mm_core::scene::Scene;

// ─── Resize ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResizeSession {
    pub node: NodeId,
    pub corner: Corner,
    original: Size,
    start: Point,
}

impl ResizeSession {
    pub fn begin(scene: &Scene, node: NodeId, corner: Corner, pointer: Point) -> Option<Self> {
        let original = scene.node(node)?.size();
        Some(Self {
            node,
            corner,
            original,
            start: pointer,
        })
    }

    /// Size for the pointer at `pointer`, always measured from the size the
    /// node had when the drag began.
    pub fn update(&self, pointer: Point) -> SceneMutation {
        let size = self.corner.apply(self.original, pointer - self.start);
        SceneMutation::ResizeNode {
            id: self.node,
            width: size.width,
            height: size.height,
        }
    }

    pub fn finish(self, pointer: Point) -> SceneMutation {
        self.update(pointer)
    }
}

// ─── Create-Link ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinkSession {
    pub source: PortRef,
    /// Loose end of the preview line.
    pub pointer: Point,
    /// Port the line would attach to if released now.
    pub target: Option<PortRef>,
}

impl LinkSession {
    pub fn begin(source: PortRef, pointer: Point) -> Self {
        Self {
            source,
            pointer,
            target: None,
        }
    }

    pub fn update(&mut self, scene: &Scene, pointer: Point) {
        self.pointer = pointer;
        self.target =
            scene.hit_test_port_excluding(pointer, scene.config().port_radius, self.source.node);
    }

    /// Connect to the port under the release point, if it belongs to a
    /// different node. Anything else discards the link.
    pub fn finish(mut self, scene: &Scene, pointer: Point) -> Option<SceneMutation> {
        self.update(scene, pointer);
        let target = self.target?;
        Some(SceneMutation::Connect {
            start: self.source,
            end: target,
        })
    }

    pub fn highlighted(&self) -> Option<NodeId> {
        self.target.map(|p| p.node)
    }
}

// ─── Retarget-Link ───────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RetargetSession {
    pub connection: ConnectionId,
    /// The end being dragged.
    pub end: ConnectionEnd,
    /// The end that stays put.
    pub fixed: PortRef,
    /// Where the dragged end was attached before the drag.
    pub original: PortRef,
    pub pointer: Point,
    pub target: Option<PortRef>,
}

impl RetargetSession {
    pub fn begin(
        scene: &Scene,
        connection: ConnectionId,
        end: ConnectionEnd,
        pointer: Point,
    ) -> Option<Self> {
        let conn = scene.connection(connection)?;
        Some(Self {
            connection,
            end,
            fixed: conn.endpoint(end.opposite()),
            original: conn.endpoint(end),
            pointer,
            target: None,
        })
    }

    pub fn update(&mut self, scene: &Scene, pointer: Point) {
        self.pointer = pointer;
        self.target =
            scene.hit_test_port_excluding(pointer, scene.config().port_radius, self.fixed.node);
    }

    /// Reattach the dragged end to the port under the release point. With
    /// no port there the connection keeps its original endpoints.
    pub fn finish(mut self, scene: &Scene, pointer: Point) -> Option<SceneMutation> {
        self.update(scene, pointer);
        let to = self.target?;
        if to == self.original {
            return None;
        }
        Some(SceneMutation::Retarget {
            id: self.connection,
            end: self.end,
            to,
        })
    }

    pub fn highlighted(&self) -> Option<NodeId> {
        self.target.map(|p| p.node)
    }
}

// ─── Move ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MoveSession {
    pub node: NodeId,
    /// Pointer position relative to the node's top-left at grab time.
    grab_offset: Point,
}

impl MoveSession {
    pub fn begin(scene: &Scene, node: NodeId, pointer: Point) -> Option<Self> {
        let position = scene.node(node)?.position();
        Some(Self {
            node,
            grab_offset: pointer - position,
        })
    }

    pub fn update(&self, pointer: Point) -> SceneMutation {
        let proposed = pointer - self.grab_offset;
        SceneMutation::MoveNode {
            id: self.node,
            x: proposed.x,
            y: proposed.y,
        }
    }

    pub fn finish(self, pointer: Point) -> SceneMutation {
        self.update(pointer)
    }
}

// ─── Dispatch ────────────────────────────────────────────────────────────

/// The single active interaction.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum DragSession {
    #[default]
    Idle,
    Resize(ResizeSession),
    Link(LinkSession),
    Retarget(RetargetSession),
    Move(MoveSession),
}

impl DragSession {
    pub fn is_idle(&self) -> bool {
        matches!(self, DragSession::Idle)
    }

    pub fn name(&self) -> &'static str {
        match self {
            DragSession::Idle => "idle",
            DragSession::Resize(_) => "resize",
            DragSession::Link(_) => "link",
            DragSession::Retarget(_) => "retarget",
            DragSession::Move(_) => "move",
        }
    }

    /// Feed a pointer-move. Returns the mutations to commit now.
    pub fn update(&mut self, scene: &Scene, pointer: Point) -> Vec<SceneMutation> {
        match self {
            DragSession::Idle => Vec::new(),
            DragSession::Resize(s) => vec![s.update(pointer)],
            DragSession::Link(s) => {
                s.update(scene, pointer);
                Vec::new()
            }
            DragSession::Retarget(s) => {
                s.update(scene, pointer);
                Vec::new()
            }
            DragSession::Move(s) => vec![s.update(pointer)],
        }
    }

    /// Feed the pointer-up, leaving the session idle. Returns the final
    /// mutations to commit.
    pub fn finish(&mut self, scene: &Scene, pointer: Point) -> Vec<SceneMutation> {
        match std::mem::take(self) {
            DragSession::Idle => Vec::new(),
            DragSession::Resize(s) => vec![s.finish(pointer)],
            DragSession::Link(s) => s.finish(scene, pointer).into_iter().collect(),
            DragSession::Retarget(s) => s.finish(scene, pointer).into_iter().collect(),
            DragSession::Move(s) => vec![s.finish(pointer)],
        }
    }

    /// Node the current session would attach to on release.
    pub fn highlighted(&self) -> Option<NodeId> {
        match self {
            DragSession::Link(s) => s.highlighted(),
            DragSession::Retarget(s) => s.highlighted(),
            _ => None,
        }
    }

    /// Whether the session refers to `node` in any way.
    pub fn involves(&self, scene: &Scene, node: NodeId) -> bool {
        match self {
            DragSession::Idle => false,
            DragSession::Resize(s) => s.node == node,
            DragSession::Move(s) => s.node == node,
            DragSession::Link(s) => s.source.node == node,
            DragSession::Retarget(s) => scene
                .connection(s.connection)
                .is_none_or(|c| c.touches(node)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mm_core::config::EngineConfig;
    use mm_core::geometry::Side;
    use mm_core::model::Node;
    use pretty_assertions::assert_eq;

    fn place(scene: &mut Scene, name: &str, x: f32, y: f32) -> NodeId {
        let node = Node::from_parts(
            NodeId::intern(name),
            Point::new(x, y),
            Size::new(120.0, 80.0),
            name,
            &EngineConfig::default(),
        );
        scene.add_node(node).unwrap()
    }

    #[test]
    fn resize_measures_from_original() {
        let mut scene = Scene::default();
        let a = place(&mut scene, "sess_resize", 0.0, 0.0);
        let s = ResizeSession::begin(&scene, a, Corner::BottomRight, Point::new(120.0, 80.0))
            .unwrap();
        assert_eq!(
            s.update(Point::new(140.0, 90.0)),
            SceneMutation::ResizeNode {
                id: a,
                width: 140.0,
                height: 90.0
            }
        );
        // Not cumulative: a second update starts from the same original.
        assert_eq!(
            s.finish(Point::new(160.0, 100.0)),
            SceneMutation::ResizeNode {
                id: a,
                width: 160.0,
                height: 100.0
            }
        );
    }

    #[test]
    fn link_tracks_target_and_ignores_own_ports() {
        let mut scene = Scene::default();
        let a = place(&mut scene, "sess_link_a", 0.0, 0.0);
        let b = place(&mut scene, "sess_link_b", 300.0, 0.0);
        let mut s = LinkSession::begin(PortRef::new(a, Side::Right), Point::new(120.0, 40.0));

        s.update(&scene, Point::new(60.0, 80.0)); // A's bottom port
        assert_eq!(s.target, None);

        s.update(&scene, Point::new(302.0, 41.0));
        assert_eq!(s.highlighted(), Some(b));

        assert_eq!(
            s.finish(&scene, Point::new(300.0, 40.0)),
            Some(SceneMutation::Connect {
                start: PortRef::new(a, Side::Right),
                end: PortRef::new(b, Side::Left),
            })
        );
    }

    #[test]
    fn link_released_on_empty_space_is_discarded() {
        let mut scene = Scene::default();
        let a = place(&mut scene, "sess_link_void", 0.0, 0.0);
        let s = LinkSession::begin(PortRef::new(a, Side::Right), Point::new(120.0, 40.0));
        assert_eq!(s.finish(&scene, Point::new(700.0, 700.0)), None);
    }

    #[test]
    fn retarget_release_on_original_port_is_a_no_op() {
        let mut scene = Scene::default();
        let a = place(&mut scene, "sess_rt_a", 0.0, 0.0);
        let b = place(&mut scene, "sess_rt_b", 300.0, 0.0);
        let c = scene
            .add_connection(PortRef::new(a, Side::Right), PortRef::new(b, Side::Left))
            .unwrap();
        let s = RetargetSession::begin(&scene, c, ConnectionEnd::End, Point::new(300.0, 40.0))
            .unwrap();
        assert_eq!(s.fixed, PortRef::new(a, Side::Right));
        assert_eq!(s.finish(&scene, Point::new(300.0, 40.0)), None);
    }

    #[test]
    fn move_keeps_grab_offset() {
        let mut scene = Scene::default();
        let a = place(&mut scene, "sess_move", 0.0, 0.0);
        let s = MoveSession::begin(&scene, a, Point::new(60.0, 40.0)).unwrap();
        assert_eq!(
            s.update(Point::new(110.0, 90.0)),
            SceneMutation::MoveNode {
                id: a,
                x: 50.0,
                y: 50.0
            }
        );
    }

    #[test]
    fn finish_leaves_idle() {
        let mut scene = Scene::default();
        let a = place(&mut scene, "sess_idle", 0.0, 0.0);
        let mut session =
            DragSession::Move(MoveSession::begin(&scene, a, Point::new(10.0, 10.0)).unwrap());
        assert_eq!(session.finish(&scene, Point::new(20.0, 20.0)).len(), 1);
        assert!(session.is_idle());
        assert!(session.finish(&scene, Point::new(20.0, 20.0)).is_empty());
    }
}
