//! The mindmap editor: owns the scene and routes pointer events.
//!
//! ```text
//!  InputEvent ──► MindmapEditor::handle ──► DragSession ──► SceneMutation ──► Scene
//!                      │                                                       │
//!                      └──────────────── overlay() ◄──── hit testing ◄─────────┘
//! ```
//!
//! Pointer-down resolves what was hit and starts at most one session;
//! every other pointer-down until release is ignored.

use crate::input::{InputEvent, PointerTarget};
use crate::mutation::SceneMutation;
use crate::session::{DragSession, LinkSession, MoveSession, ResizeSession, RetargetSession};
use mm_core::codec::{self, SceneRecord};
use mm_core::config::EngineConfig;
use mm_core::error::SceneError;
use mm_core::geometry::{Point, Size};
use mm_core::id::{ConnectionId, NodeId};
use mm_core::model::Node;
use mm_core::scene::Scene;

/// Transient visuals for the host to draw on top of the scene.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Overlay {
    pub selected: Option<NodeId>,
    pub hovered: Option<NodeId>,
    /// Node a pending link or retarget would attach to.
    pub highlighted: Option<NodeId>,
    /// Create-Link preview line, from the source port to the pointer.
    pub link_preview: Option<(Point, Point)>,
    pub retarget_preview: Option<RetargetPreview>,
}

/// A connection being re-pointed: drawn from the fixed port to the pointer
/// instead of its committed route.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RetargetPreview {
    pub connection: ConnectionId,
    pub fixed: Point,
    pub moving: Point,
}

pub struct MindmapEditor {
    scene: Scene,
    session: DragSession,
    selected: Option<NodeId>,
    hovered: Option<NodeId>,
}

impl MindmapEditor {
    pub fn new(config: EngineConfig) -> Self {
        Self::with_scene(Scene::new(config))
    }

    pub fn with_scene(scene: Scene) -> Self {
        Self {
            scene,
            session: DragSession::Idle,
            selected: None,
            hovered: None,
        }
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn session(&self) -> &DragSession {
        &self.session
    }

    pub fn selected(&self) -> Option<NodeId> {
        self.selected
    }

    pub fn select(&mut self, node: Option<NodeId>) {
        self.selected = node.filter(|id| self.scene.contains_node(*id));
    }

    // ─── Actions ─────────────────────────────────────────────────────────

    /// "Add Node": a default-sized node at the origin, selected.
    pub fn add_node(&mut self) -> NodeId {
        let label = self.scene.config().new_node_label.clone();
        let id = self.scene.create_node(Point::ORIGIN, label, None);
        self.selected = Some(id);
        id
    }

    /// Delete the selected node and its connections.
    pub fn delete_selected(&mut self) -> Option<Node> {
        let id = self.selected.take()?;
        if self.session.involves(&self.scene, id) {
            log::debug!("{} session cancelled by delete", self.session.name());
            self.session = DragSession::Idle;
        }
        if self.hovered == Some(id) {
            self.hovered = None;
        }
        self.scene.remove_node(id)
    }

    pub fn set_label(
        &mut self,
        id: NodeId,
        label: impl Into<String>,
        measured_text: Option<Size>,
    ) -> Result<(), SceneError> {
        self.scene.set_label(id, label, measured_text)
    }

    /// Empty the scene and drop any selection or session.
    pub fn clear(&mut self) {
        self.scene.clear();
        self.session = DragSession::Idle;
        self.selected = None;
        self.hovered = None;
    }

    /// Replace the scene with `record`'s content.
    pub fn load(&mut self, record: &SceneRecord) {
        self.session = DragSession::Idle;
        self.selected = None;
        self.hovered = None;
        codec::load_into(&mut self.scene, record);
    }

    pub fn snapshot(&self) -> SceneRecord {
        codec::serialize_scene(&self.scene)
    }

    // ─── Event routing ───────────────────────────────────────────────────

    /// Route one pointer event. Returns the mutations that were committed.
    pub fn handle(&mut self, event: &InputEvent) -> Vec<SceneMutation> {
        let p = event.position();
        match *event {
            InputEvent::PointerDown { target, .. } => {
                if !self.session.is_idle() {
                    log::debug!("pointer-down ignored during {} session", self.session.name());
                    return Vec::new();
                }
                let target = target.unwrap_or_else(|| self.resolve_target(p));
                self.begin(target, p);
                Vec::new()
            }
            InputEvent::PointerMove { .. } => {
                self.hovered = self.scene.hit_test_node(p);
                let mutations = self.session.update(&self.scene, p);
                self.commit(mutations)
            }
            InputEvent::PointerUp { .. } => {
                let active = (!self.session.is_idle()).then(|| self.session.name());
                let mutations = self.session.finish(&self.scene, p);
                let committed = self.commit(mutations);
                if let Some(name) = active {
                    log::debug!("{name} session ended, {} mutations", committed.len());
                }
                committed
            }
        }
    }

    /// Decide what a pointer-down at `p` landed on when the host gave no
    /// hint. First match wins: resize handle of the selected node, port of
    /// the hovered or selected node, connection endpoint, node body, empty
    /// canvas.
    ///
    /// Ports win over endpoints so a connected port can still start another
    /// link. An endpoint is grabbed in the ring between `port_radius` and
    /// `endpoint_grab_threshold` around it.
    fn resolve_target(&self, p: Point) -> PointerTarget {
        let config = self.scene.config();

        if let Some(sel) = self.selected
            && let Some(corner) = self.scene.hit_test_corner(sel, p, config.handle_size / 2.0)
        {
            return PointerTarget::Corner(sel, corner);
        }
        let under = self.scene.hit_test_node(p);
        let port = [self.hovered, self.selected, under]
            .into_iter()
            .flatten()
            .find_map(|node| self.scene.hit_test_port_on(node, p, config.port_radius));
        if let Some(port) = port {
            return PointerTarget::Port(port);
        }
        if let Some((id, end)) = self
            .scene
            .hit_test_connection_end(p, config.endpoint_grab_threshold)
        {
            return PointerTarget::ConnectionEnd(id, end);
        }
        match under {
            Some(node) => PointerTarget::Node(node),
            None => PointerTarget::Canvas,
        }
    }

    fn begin(&mut self, target: PointerTarget, p: Point) {
        let session = match target {
            PointerTarget::Corner(node, corner) => {
                // A handle drag selects its node.
                self.select(Some(node));
                ResizeSession::begin(&self.scene, node, corner, p).map(DragSession::Resize)
            }
            PointerTarget::Port(port) if self.scene.contains_node(port.node) => {
                Some(DragSession::Link(LinkSession::begin(port, p)))
            }
            PointerTarget::Port(_) => None,
            PointerTarget::ConnectionEnd(id, end) => {
                RetargetSession::begin(&self.scene, id, end, p).map(DragSession::Retarget)
            }
            PointerTarget::Node(node) => {
                self.select(Some(node));
                MoveSession::begin(&self.scene, node, p).map(DragSession::Move)
            }
            PointerTarget::Canvas => {
                self.selected = None;
                None
            }
        };
        if let Some(session) = session {
            log::debug!("{} session started at ({}, {})", session.name(), p.x, p.y);
            self.session = session;
        }
    }

    fn commit(&mut self, mutations: Vec<SceneMutation>) -> Vec<SceneMutation> {
        mutations
            .into_iter()
            .filter(|m| match m.apply(&mut self.scene) {
                Ok(()) => true,
                Err(err) => {
                    log::warn!("dropped {m:?}: {err}");
                    false
                }
            })
            .collect()
    }

    // ─── Overlay ─────────────────────────────────────────────────────────

    pub fn overlay(&self) -> Overlay {
        let mut overlay = Overlay {
            selected: self.selected,
            hovered: self.hovered,
            highlighted: self.session.highlighted(),
            ..Overlay::default()
        };
        match &self.session {
            DragSession::Link(s) => {
                overlay.link_preview = self
                    .scene
                    .port_position(s.source)
                    .map(|from| (from, s.pointer));
            }
            DragSession::Retarget(s) => {
                overlay.retarget_preview =
                    self.scene
                        .port_position(s.fixed)
                        .map(|fixed| RetargetPreview {
                            connection: s.connection,
                            fixed,
                            moving: s.pointer,
                        });
            }
            _ => {}
        }
        overlay
    }
}

impl Default for MindmapEditor {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}
