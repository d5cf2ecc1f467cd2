//! Hit testing: point → node / port / resize handle / connection endpoint.
//!
//! Nodes are walked in reverse paint order (last painted = topmost), so when
//! shapes overlap the most recently inserted node wins.

use crate::geometry::{Corner, Point, Side};
use crate::id::{ConnectionId, NodeId};
use crate::model::{ConnectionEnd, PortRef};
use crate::scene::Scene;

impl Scene {
    /// Find the topmost node whose ellipse contains `p`.
    pub fn hit_test_node(&self, p: Point) -> Option<NodeId> {
        self.nodes().rev().find(|n| n.contains(p)).map(|n| n.id())
    }

    /// Find the nearest port within `radius` of `p` across all nodes.
    pub fn hit_test_port(&self, p: Point, radius: f32) -> Option<PortRef> {
        self.nearest_port(p, radius, None)
    }

    /// Like [`Scene::hit_test_port`] but ignores the ports of `exclude`.
    pub fn hit_test_port_excluding(
        &self,
        p: Point,
        radius: f32,
        exclude: NodeId,
    ) -> Option<PortRef> {
        self.nearest_port(p, radius, Some(exclude))
    }

    /// Nearest port of one node within `radius` of `p`.
    pub fn hit_test_port_on(&self, node: NodeId, p: Point, radius: f32) -> Option<PortRef> {
        let node = self.node(node)?;
        let radius_sq = radius * radius;
        Side::ALL
            .into_iter()
            .map(|side| (node.port_position(side).distance_sq(p), side))
            .filter(|(d, _)| *d <= radius_sq)
            .min_by(|a, b| a.0.total_cmp(&b.0))
            .map(|(_, side)| PortRef::new(node.id(), side))
    }

    fn nearest_port(&self, p: Point, radius: f32, exclude: Option<NodeId>) -> Option<PortRef> {
        let radius_sq = radius * radius;
        let mut best: Option<(f32, PortRef)> = None;

        // Topmost first; a later (lower) node only wins when strictly closer.
        for node in self.nodes().rev() {
            if Some(node.id()) == exclude {
                continue;
            }
            for side in Side::ALL {
                let d = node.port_position(side).distance_sq(p);
                if d <= radius_sq && best.is_none_or(|(bd, _)| d < bd) {
                    best = Some((d, PortRef::new(node.id(), side)));
                }
            }
        }
        best.map(|(_, port)| port)
    }

    /// Find the resize handle of `node` under `p`. Handles are squares of
    /// side `2 * half_extent` centered on the rect corners.
    pub fn hit_test_corner(&self, node: NodeId, p: Point, half_extent: f32) -> Option<Corner> {
        let node = self.node(node)?;
        Corner::ALL.into_iter().find(|&corner| {
            let c = node.corner_position(corner);
            (p.x - c.x).abs() <= half_extent && (p.y - c.y).abs() <= half_extent
        })
    }

    /// Find the rendered connection endpoint nearest to `p` within
    /// `threshold`. Later connections win ties.
    pub fn hit_test_connection_end(
        &self,
        p: Point,
        threshold: f32,
    ) -> Option<(ConnectionId, ConnectionEnd)> {
        let threshold_sq = threshold * threshold;
        let mut best: Option<(f32, ConnectionId, ConnectionEnd)> = None;

        for route in self.routes().into_iter().rev() {
            for end in [ConnectionEnd::End, ConnectionEnd::Start] {
                let d = route.point(end).distance_sq(p);
                if d <= threshold_sq && best.is_none_or(|(bd, _, _)| d < bd) {
                    best = Some((d, route.id, end));
                }
            }
        }
        best.map(|(_, id, end)| (id, end))
    }
}
