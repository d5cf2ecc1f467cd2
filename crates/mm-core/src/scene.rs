//! The scene: arena owner of all nodes and connections.
//!
//! Nodes are stored as vertices and connections as edges of a
//! `StableDiGraph`, indexed by id. Renderers and drag sessions hold ids,
//! never references, so deleting a node cannot leave a dangling handle.
//! Paint order (last = topmost) and connection order are tracked separately
//! because stable-graph indices are reused after removals.

use crate::config::EngineConfig;
use crate::error::{SceneError, SceneWarning};
use crate::geometry::{Corner, Point, Size};
use crate::id::{ConnectionId, NodeId};
use crate::model::{Connection, ConnectionEnd, ConnectionRoute, Node, PortRef};
use crate::observer::{LogObserver, SceneChange, SceneObserver};
use petgraph::Direction;
use petgraph::stable_graph::{EdgeIndex, NodeIndex, StableDiGraph};
use std::collections::HashMap;
use std::fmt;

pub struct Scene {
    graph: StableDiGraph<Node, Connection>,
    node_index: HashMap<NodeId, NodeIndex>,
    edge_index: HashMap<ConnectionId, EdgeIndex>,
    /// Nodes in paint order; the last entry is drawn on top.
    paint_order: Vec<NodeId>,
    /// Connections in insertion order.
    link_order: Vec<ConnectionId>,
    config: EngineConfig,
    observer: Box<dyn SceneObserver>,
}

impl Scene {
    /// Create an empty scene that reports through the `log` facade.
    #[must_use]
    pub fn new(config: EngineConfig) -> Self {
        Self::with_observer(config, Box::new(LogObserver))
    }

    /// Create an empty scene reporting to `observer`.
    #[must_use]
    pub fn with_observer(config: EngineConfig, observer: Box<dyn SceneObserver>) -> Self {
        Self {
            graph: StableDiGraph::new(),
            node_index: HashMap::new(),
            edge_index: HashMap::new(),
            paint_order: Vec::new(),
            link_order: Vec::new(),
            config,
            observer,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn set_observer(&mut self, observer: Box<dyn SceneObserver>) {
        self.observer = observer;
    }

    pub(crate) fn warn(&self, warning: SceneWarning) {
        self.observer.warn(&warning);
    }

    fn changed(&self, change: SceneChange) {
        self.observer.changed(change);
    }

    // ─── Queries ─────────────────────────────────────────────────────────

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.node_index.get(&id).map(|idx| &self.graph[*idx])
    }

    fn node_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.node_index
            .get(&id)
            .copied()
            .map(|idx| &mut self.graph[idx])
    }

    pub fn contains_node(&self, id: NodeId) -> bool {
        self.node_index.contains_key(&id)
    }

    /// Nodes in paint order (bottom to top).
    pub fn nodes(&self) -> impl DoubleEndedIterator<Item = &Node> + '_ {
        self.paint_order.iter().filter_map(|id| self.node(*id))
    }

    pub fn node_count(&self) -> usize {
        self.node_index.len()
    }

    pub fn connection(&self, id: ConnectionId) -> Option<&Connection> {
        self.edge_index.get(&id).and_then(|e| self.graph.edge_weight(*e))
    }

    /// Connections in insertion order.
    pub fn connections(&self) -> impl Iterator<Item = &Connection> + '_ {
        self.link_order.iter().filter_map(|id| self.connection(*id))
    }

    pub fn connection_count(&self) -> usize {
        self.edge_index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.node_index.is_empty()
    }

    /// Nodes directly linked to `id` by a connection in either direction.
    pub fn neighbors(&self, id: NodeId) -> Vec<NodeId> {
        let Some(&idx) = self.node_index.get(&id) else {
            return Vec::new();
        };
        let mut out: Vec<NodeId> = self
            .graph
            .neighbors_directed(idx, Direction::Outgoing)
            .chain(self.graph.neighbors_directed(idx, Direction::Incoming))
            .map(|n| self.graph[n].id())
            .collect();
        out.sort_by(|a, b| a.as_str().cmp(b.as_str()));
        out.dedup();
        out
    }

    /// Current rendered endpoints of a connection.
    pub fn connection_route(&self, id: ConnectionId) -> Option<ConnectionRoute> {
        let conn = self.connection(id)?;
        let start = self.port_position(conn.start)?;
        let end = self.port_position(conn.end)?;
        Some(ConnectionRoute { id, start, end })
    }

    /// Routes for every connection, in insertion order.
    pub fn routes(&self) -> Vec<ConnectionRoute> {
        self.link_order
            .iter()
            .filter_map(|id| self.connection_route(*id))
            .collect()
    }

    pub fn port_position(&self, port: PortRef) -> Option<Point> {
        self.node(port.node).map(|n| n.port_position(port.side))
    }

    // ─── Nodes ───────────────────────────────────────────────────────────

    /// Add a node on top of the paint order.
    ///
    /// Any connection ids the node carries are discarded; connections are
    /// registered by `add_connection` only.
    pub fn add_node(&mut self, mut node: Node) -> Result<NodeId, SceneError> {
        let id = node.id();
        if self.node_index.contains_key(&id) {
            return Err(SceneError::DuplicateNode(id));
        }
        node.clear_connections();
        Ok(self.push_node(node))
    }

    fn push_node(&mut self, node: Node) -> NodeId {
        let id = node.id();
        let idx = self.graph.add_node(node);
        self.node_index.insert(id, idx);
        self.paint_order.push(id);
        self.changed(SceneChange::NodeAdded(id));
        id
    }

    /// Create a default-sized node with a fresh id and add it.
    pub fn create_node(
        &mut self,
        position: Point,
        label: impl Into<String>,
        measured_text: Option<Size>,
    ) -> NodeId {
        let node = Node::create(
            position,
            self.config.default_size(),
            label,
            measured_text,
            &self.config,
        );
        self.push_node(node)
    }

    /// Remove a node and every connection touching it.
    pub fn remove_node(&mut self, id: NodeId) -> Option<Node> {
        let idx = *self.node_index.get(&id)?;
        let touching: Vec<ConnectionId> = self.graph[idx].connection_ids().to_vec();
        for conn in touching {
            self.remove_connection(conn);
        }
        let removed = self.graph.remove_node(idx)?;
        self.node_index.remove(&id);
        self.paint_order.retain(|n| *n != id);
        self.changed(SceneChange::NodeRemoved(id));
        Some(removed)
    }

    /// Move a node to `proposed` (snapped). Returns the committed position.
    pub fn move_node(&mut self, id: NodeId, proposed: Point) -> Result<Point, SceneError> {
        let node = self.node_mut(id).ok_or(SceneError::UnknownNode(id))?;
        let before = node.position();
        let committed = node.move_to(proposed);
        if committed != before {
            self.notify_moved(id);
        }
        Ok(committed)
    }

    /// Resize a node by dragging `corner` by `delta` (center anchored).
    pub fn resize_node(
        &mut self,
        id: NodeId,
        corner: Corner,
        delta: Point,
    ) -> Result<Size, SceneError> {
        let node = self.node(id).ok_or(SceneError::UnknownNode(id))?;
        let size = corner.apply(node.size(), delta);
        self.set_node_size(id, size)
    }

    /// Set a node's size (clamped, center anchored).
    pub fn set_node_size(&mut self, id: NodeId, size: Size) -> Result<Size, SceneError> {
        let node = self.node_mut(id).ok_or(SceneError::UnknownNode(id))?;
        let before = node.size();
        node.resize_keep_center(size);
        let after = node.size();
        if after != before {
            self.notify_moved(id);
        }
        Ok(after)
    }

    /// Change a node's label and grow it if the measured text no longer fits.
    pub fn set_label(
        &mut self,
        id: NodeId,
        label: impl Into<String>,
        measured_text: Option<Size>,
    ) -> Result<(), SceneError> {
        let padding = self.config.text_padding;
        let node = self.node_mut(id).ok_or(SceneError::UnknownNode(id))?;
        node.set_label(label);
        let grew = measured_text.is_some_and(|m| node.grow_to_fit_text(m, padding));
        self.changed(SceneChange::LabelChanged(id));
        if grew {
            self.notify_moved(id);
        }
        Ok(())
    }

    /// Recompute the rendered endpoints of every connection touching `id`.
    ///
    /// Connections store logical endpoints only, so this is a pure read;
    /// the observer is told the node moved so renderers can redraw.
    pub fn notify_moved(&mut self, id: NodeId) -> Vec<ConnectionRoute> {
        let Some(node) = self.node(id) else {
            return Vec::new();
        };
        let routes: Vec<ConnectionRoute> = node
            .connection_ids()
            .iter()
            .filter_map(|c| self.connection_route(*c))
            .collect();
        log::trace!("node {id} moved, {} routes refreshed", routes.len());
        self.changed(SceneChange::NodeMoved(id));
        routes
    }

    // ─── Connections ─────────────────────────────────────────────────────

    /// Connect two ports under a fresh id.
    pub fn add_connection(
        &mut self,
        start: PortRef,
        end: PortRef,
    ) -> Result<ConnectionId, SceneError> {
        self.insert_connection(Connection::new(ConnectionId::generate(), start, end))
    }

    /// Insert a connection keeping its id. Both endpoint nodes must exist.
    pub fn insert_connection(&mut self, conn: Connection) -> Result<ConnectionId, SceneError> {
        if self.edge_index.contains_key(&conn.id) {
            return Err(SceneError::DuplicateConnection(conn.id));
        }
        let from = self.index_of_endpoint(conn.start)?;
        let to = self.index_of_endpoint(conn.end)?;
        let id = conn.id;
        let edge = self.graph.add_edge(from, to, conn);
        self.edge_index.insert(id, edge);
        self.link_order.push(id);
        self.graph[from].attach(id);
        self.graph[to].attach(id);
        self.changed(SceneChange::ConnectionAdded(id));
        Ok(id)
    }

    fn index_of_endpoint(&self, port: PortRef) -> Result<NodeIndex, SceneError> {
        self.node_index
            .get(&port.node)
            .copied()
            .ok_or(SceneError::InvalidEndpoint(port.node))
    }

    /// Remove a connection and unregister it from both endpoint nodes.
    pub fn remove_connection(&mut self, id: ConnectionId) -> Option<Connection> {
        let edge = self.edge_index.remove(&id)?;
        let conn = self.graph.remove_edge(edge)?;
        for port in [conn.start, conn.end] {
            if let Some(node) = self.node_mut(port.node) {
                node.detach(id);
            }
        }
        self.link_order.retain(|c| *c != id);
        self.changed(SceneChange::ConnectionRemoved(id));
        Some(conn)
    }

    /// Move one end of a connection to `port`.
    ///
    /// Fails without touching the scene if `port`'s node does not exist.
    pub fn retarget_connection(
        &mut self,
        id: ConnectionId,
        end: ConnectionEnd,
        port: PortRef,
    ) -> Result<(), SceneError> {
        let &edge = self
            .edge_index
            .get(&id)
            .ok_or(SceneError::UnknownConnection(id))?;
        let mut conn = *self
            .graph
            .edge_weight(edge)
            .ok_or(SceneError::UnknownConnection(id))?;
        let old = conn.endpoint(end);
        conn.set_endpoint(end, port);
        let from = self.index_of_endpoint(conn.start)?;
        let to = self.index_of_endpoint(conn.end)?;

        // The old node keeps the id only if the fixed end still touches it.
        if old.node != conn.endpoint(end.opposite()).node
            && let Some(node) = self.node_mut(old.node)
        {
            node.detach(id);
        }

        self.graph.remove_edge(edge);
        let new_edge = self.graph.add_edge(from, to, conn);
        self.edge_index.insert(id, new_edge);
        if let Some(node) = self.node_mut(port.node) {
            node.attach(id);
        }
        self.changed(SceneChange::ConnectionRetargeted(id));
        Ok(())
    }

    /// Remove every node and connection.
    pub fn clear(&mut self) {
        self.graph.clear();
        self.node_index.clear();
        self.edge_index.clear();
        self.paint_order.clear();
        self.link_order.clear();
        self.changed(SceneChange::Cleared);
    }
}

impl Default for Scene {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}

impl fmt::Debug for Scene {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scene")
            .field("nodes", &self.paint_order)
            .field("connections", &self.link_order)
            .finish_non_exhaustive()
    }
}
