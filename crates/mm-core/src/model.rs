//! Mindmap data model: nodes, ports, and connections.
//!
//! Nodes are ellipses inscribed in a rect whose center always sits on a
//! grid intersection after a committed move. Ports are not stored; they are
//! `(node, side)` pairs whose position is derived from the node's current
//! rect. Connections reference ports by id only and never cache geometry.

use crate::config::EngineConfig;
use crate::geometry::{Corner, Grid, Point, Rect, Side, Size};
use crate::id::{ConnectionId, NodeId};
use smallvec::SmallVec;

// ─── Node ────────────────────────────────────────────────────────────────

/// Geometry constraints a node carries with it so that every mutation can
/// enforce them without outside help.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NodeLimits {
    pub grid: Grid,
    pub min: Size,
}

impl NodeLimits {
    pub fn from_config(config: &EngineConfig) -> Self {
        Self {
            grid: config.grid(),
            min: config.min_size(),
        }
    }
}

impl Default for NodeLimits {
    fn default() -> Self {
        Self::from_config(&EngineConfig::default())
    }
}

/// A positioned, sized, labeled box on the canvas.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    id: NodeId,
    /// Top-left of the bounding rect.
    position: Point,
    size: Size,
    label: String,
    /// Connections touching this node on any side. Maintained by the scene.
    connection_ids: SmallVec<[ConnectionId; 4]>,
    limits: NodeLimits,
}

impl Node {
    /// Create a node for the "Add Node" action.
    ///
    /// The size is clamped to the minimums and grown to fit `measured_text`
    /// (if the host measured the label), then the position is snapped.
    pub fn create(
        position: Point,
        size: Size,
        label: impl Into<String>,
        measured_text: Option<Size>,
        config: &EngineConfig,
    ) -> Self {
        let mut node = Self::from_parts(NodeId::generate(), position, size, label, config);
        if let Some(measured) = measured_text {
            node.grow_size_for_text(measured, config.text_padding);
        }
        node.position = node.limits.grid.snap(position, node.size);
        node
    }

    /// Rebuild a node from stored fields. The size is clamped to the
    /// minimums; the position is kept as given.
    pub fn from_parts(
        id: NodeId,
        position: Point,
        size: Size,
        label: impl Into<String>,
        config: &EngineConfig,
    ) -> Self {
        let limits = NodeLimits::from_config(config);
        Self {
            id,
            position,
            size: size.at_least(limits.min),
            label: label.into(),
            connection_ids: SmallVec::new(),
            limits,
        }
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn position(&self) -> Point {
        self.position
    }

    pub fn size(&self) -> Size {
        self.size
    }

    pub fn width(&self) -> f32 {
        self.size.width
    }

    pub fn height(&self) -> f32 {
        self.size.height
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn connection_ids(&self) -> &[ConnectionId] {
        &self.connection_ids
    }

    pub fn limits(&self) -> NodeLimits {
        self.limits
    }

    pub fn rect(&self) -> Rect {
        Rect::from_origin_size(self.position, self.size)
    }

    pub fn center(&self) -> Point {
        self.position + self.size.half()
    }

    /// Whether `p` is inside the node's ellipse.
    pub fn contains(&self, p: Point) -> bool {
        self.rect().ellipse_contains(p)
    }

    /// Scene-space position of the port on `side` (edge midpoint).
    pub fn port_position(&self, side: Side) -> Point {
        self.rect().side_midpoint(side)
    }

    pub fn corner_position(&self, corner: Corner) -> Point {
        self.rect().corner(corner)
    }

    /// Move to `proposed`, snapped so the center lands on the grid.
    /// Returns the committed position.
    pub fn move_to(&mut self, proposed: Point) -> Point {
        self.position = self.limits.grid.snap(proposed, self.size);
        self.position
    }

    /// Resize by dragging `corner` by `delta`, clamped to the minimums and
    /// anchored on the current center.
    pub fn resize(&mut self, corner: Corner, delta: Point) {
        self.resize_keep_center(corner.apply(self.size, delta));
    }

    /// Set the size (clamped) while keeping the scene-space center fixed.
    pub fn resize_keep_center(&mut self, size: Size) {
        let center = self.center();
        self.size = size.at_least(self.limits.min);
        self.position = center - self.size.half();
    }

    /// Grow to `measured + padding` on each axis where the measured text box
    /// exceeds the node. Never shrinks. Returns whether the size changed.
    pub fn grow_to_fit_text(&mut self, measured: Size, padding: f32) -> bool {
        let center = self.center();
        let grew = self.grow_size_for_text(measured, padding);
        if grew {
            self.position = center - self.size.half();
        }
        grew
    }

    fn grow_size_for_text(&mut self, measured: Size, padding: f32) -> bool {
        let mut grew = false;
        if measured.width > self.size.width {
            self.size.width = measured.width + padding;
            grew = true;
        }
        if measured.height > self.size.height {
            self.size.height = measured.height + padding;
            grew = true;
        }
        grew
    }

    pub fn set_label(&mut self, label: impl Into<String>) {
        self.label = label.into();
    }

    pub(crate) fn attach(&mut self, connection: ConnectionId) {
        if !self.connection_ids.contains(&connection) {
            self.connection_ids.push(connection);
        }
    }

    pub(crate) fn detach(&mut self, connection: ConnectionId) {
        self.connection_ids.retain(|c| *c != connection);
    }

    pub(crate) fn clear_connections(&mut self) {
        self.connection_ids.clear();
    }
}

// ─── Ports & connections ─────────────────────────────────────────────────

/// A port: one side of one node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PortRef {
    pub node: NodeId,
    pub side: Side,
}

impl PortRef {
    pub fn new(node: NodeId, side: Side) -> Self {
        Self { node, side }
    }
}

/// Which end of a connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConnectionEnd {
    Start,
    End,
}

impl ConnectionEnd {
    pub fn opposite(self) -> Self {
        match self {
            ConnectionEnd::Start => ConnectionEnd::End,
            ConnectionEnd::End => ConnectionEnd::Start,
        }
    }
}

/// An edge between two ports. Stores logical endpoints only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Connection {
    pub id: ConnectionId,
    pub start: PortRef,
    pub end: PortRef,
}

impl Connection {
    pub fn new(id: ConnectionId, start: PortRef, end: PortRef) -> Self {
        Self { id, start, end }
    }

    pub fn endpoint(&self, end: ConnectionEnd) -> PortRef {
        match end {
            ConnectionEnd::Start => self.start,
            ConnectionEnd::End => self.end,
        }
    }

    pub fn set_endpoint(&mut self, end: ConnectionEnd, port: PortRef) {
        match end {
            ConnectionEnd::Start => self.start = port,
            ConnectionEnd::End => self.end = port,
        }
    }

    pub fn touches(&self, node: NodeId) -> bool {
        self.start.node == node || self.end.node == node
    }
}

/// Rendered endpoints of a connection, recomputed on demand from the
/// current port positions.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConnectionRoute {
    pub id: ConnectionId,
    pub start: Point,
    pub end: Point,
}

impl ConnectionRoute {
    pub fn point(&self, end: ConnectionEnd) -> Point {
        match end {
            ConnectionEnd::Start => self.start,
            ConnectionEnd::End => self.end,
        }
    }
}
