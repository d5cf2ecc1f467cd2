//! Codec: scene ⇄ plain records for the persistence collaborator.
//!
//! Decoding never fails on content. Missing or mistyped fields fall back to
//! defaults and connections that cannot be attached are dropped; both are
//! reported to the scene observer as warnings.
//!
//! Wire shape (JSON):
//!
//! ```json
//! {
//!   "nodes": [{ "id": "…", "text": "Idea", "width": 120, "height": 80,
//!               "position": { "x": -10, "y": 10 } }],
//!   "connections": [{ "id": "…", "startNodeId": "…", "startSide": "right",
//!                     "endNodeId": "…", "endSide": "left" }]
//! }
//! ```

use crate::config::EngineConfig;
use crate::error::{SceneError, SceneWarning, SnapshotError};
use crate::geometry::{Point, Side, Size};
use crate::id::{ConnectionId, NodeId};
use crate::model::{Connection, Node, PortRef};
use crate::observer::SceneObserver;
use crate::scene::Scene;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};

// ─── Records ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PositionRecord {
    pub x: f32,
    pub y: f32,
}

/// A persisted node. Every field may be absent on input.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct NodeRecord {
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub width: Option<f32>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub height: Option<f32>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub position: Option<PositionRecord>,
}

/// A persisted connection. Sides are lowercase strings
/// (`top`, `bottom`, `left`, `right`).
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionRecord {
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub start_node_id: Option<String>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub start_side: Option<String>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub end_node_id: Option<String>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub end_side: Option<String>,
}

/// The `nodes` / `connections` arrays of a persisted mindmap.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneRecord {
    pub nodes: Vec<NodeRecord>,
    pub connections: Vec<ConnectionRecord>,
}

/// Treat a present-but-mistyped field the same as a missing one.
fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(value.and_then(|v| T::deserialize(v).ok()))
}

impl SceneRecord {
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Compact binary snapshot, for handing a scene to a background
    /// autosave path without sharing the live scene.
    pub fn to_msgpack(&self) -> Result<Vec<u8>, SnapshotError> {
        Ok(rmp_serde::to_vec_named(self)?)
    }

    pub fn from_msgpack(bytes: &[u8]) -> Result<Self, SnapshotError> {
        Ok(rmp_serde::from_slice(bytes)?)
    }
}

// ─── Nodes ───────────────────────────────────────────────────────────────

pub fn serialize_node(node: &Node) -> NodeRecord {
    let pos = node.position();
    NodeRecord {
        id: Some(node.id().as_str().to_string()),
        text: Some(node.label().to_string()),
        width: Some(node.width()),
        height: Some(node.height()),
        position: Some(PositionRecord { x: pos.x, y: pos.y }),
    }
}

/// Rebuild a node from a record, substituting defaults for anything missing.
///
/// A missing id is regenerated, a missing size falls back to the configured
/// default (then clamped), a missing position is the origin. The stored
/// position is restored as-is, without re-snapping.
pub fn deserialize_node(record: &NodeRecord, config: &EngineConfig) -> Node {
    decode_node(record, config).0
}

/// Decode a node and list the required fields that had to be defaulted.
fn decode_node(record: &NodeRecord, config: &EngineConfig) -> (Node, Vec<&'static str>) {
    let mut missing = Vec::new();

    let id = match record.id.as_deref().filter(|s| !s.is_empty()) {
        Some(id) => NodeId::intern(id),
        None => {
            missing.push("id");
            NodeId::generate()
        }
    };
    let mut dimension = |value: Option<f32>, default: f32, name: &'static str| {
        value.filter(|v| v.is_finite()).unwrap_or_else(|| {
            missing.push(name);
            default
        })
    };
    let width = dimension(record.width, config.default_width, "width");
    let height = dimension(record.height, config.default_height, "height");
    let position = match record.position.filter(|p| p.x.is_finite() && p.y.is_finite()) {
        Some(p) => Point::new(p.x, p.y),
        None => {
            missing.push("position");
            Point::ORIGIN
        }
    };
    let label = record.text.clone().unwrap_or_default();

    let node = Node::from_parts(id, position, Size::new(width, height), label, config);
    (node, missing)
}

// ─── Connections ─────────────────────────────────────────────────────────

pub fn serialize_connection(conn: &Connection) -> ConnectionRecord {
    ConnectionRecord {
        id: Some(conn.id.as_str().to_string()),
        start_node_id: Some(conn.start.node.as_str().to_string()),
        start_side: Some(conn.start.side.as_str().to_string()),
        end_node_id: Some(conn.end.node.as_str().to_string()),
        end_side: Some(conn.end.side.as_str().to_string()),
    }
}

/// Decode the endpoints of a connection record. `Err` carries the reason
/// the record cannot be used at all.
fn decode_connection(record: &ConnectionRecord) -> Result<(Option<ConnectionId>, PortRef, PortRef), String> {
    let port = |node: &Option<String>, side: &Option<String>, which: &str| -> Result<PortRef, String> {
        let node = node
            .as_deref()
            .filter(|s| !s.is_empty())
            .ok_or_else(|| format!("missing {which} node id"))?;
        let side_str = side
            .as_deref()
            .ok_or_else(|| format!("missing {which} side"))?;
        let side = Side::parse(side_str).ok_or_else(|| format!("unknown {which} side {side_str:?}"))?;
        Ok(PortRef::new(NodeId::intern(node), side))
    };
    let start = port(&record.start_node_id, &record.start_side, "start")?;
    let end = port(&record.end_node_id, &record.end_side, "end")?;
    let id = record
        .id
        .as_deref()
        .filter(|s| !s.is_empty())
        .map(ConnectionId::intern);
    Ok((id, start, end))
}

// ─── Scenes ──────────────────────────────────────────────────────────────

/// Nodes in paint order, connections in insertion order.
pub fn serialize_scene(scene: &Scene) -> SceneRecord {
    SceneRecord {
        nodes: scene.nodes().map(serialize_node).collect(),
        connections: scene.connections().map(serialize_connection).collect(),
    }
}

/// Build a scene from a record. Never fails: all nodes are added first,
/// then each connection; problems are reported to `observer` and the
/// offending record is skipped.
pub fn deserialize_scene(
    record: &SceneRecord,
    config: EngineConfig,
    observer: Box<dyn SceneObserver>,
) -> Scene {
    let mut scene = Scene::with_observer(config, observer);
    load_into(&mut scene, record);
    scene
}

/// Replace the contents of `scene` with `record`.
pub fn load_into(scene: &mut Scene, record: &SceneRecord) {
    scene.clear();

    for (i, node_record) in record.nodes.iter().enumerate() {
        let (node, missing) = decode_node(node_record, scene.config());
        let id = node.id();
        if !missing.is_empty() {
            scene.warn(SceneWarning::MalformedRecord {
                what: "node",
                detail: format!("node #{i} ({id}): defaulted {}", missing.join(", ")),
            });
        }
        if let Err(err) = scene.add_node(node) {
            scene.warn(SceneWarning::MalformedRecord {
                what: "node",
                detail: format!("node #{i} skipped: {err}"),
            });
        }
    }

    for (i, conn_record) in record.connections.iter().enumerate() {
        let (id, start, end) = match decode_connection(conn_record) {
            Ok(parts) => parts,
            Err(reason) => {
                scene.warn(SceneWarning::MalformedRecord {
                    what: "connection",
                    detail: format!("connection #{i} skipped: {reason}"),
                });
                continue;
            }
        };
        let id = match id {
            Some(id) if scene.connection(id).is_none() => id,
            Some(dup) => {
                scene.warn(SceneWarning::MalformedRecord {
                    what: "connection",
                    detail: format!("connection #{i}: duplicate id {dup}, regenerated"),
                });
                ConnectionId::generate()
            }
            None => {
                scene.warn(SceneWarning::MalformedRecord {
                    what: "connection",
                    detail: format!("connection #{i}: missing id, regenerated"),
                });
                ConnectionId::generate()
            }
        };
        match scene.insert_connection(Connection::new(id, start, end)) {
            Ok(_) => {}
            Err(SceneError::InvalidEndpoint(node)) => {
                scene.warn(SceneWarning::DanglingReference {
                    connection: id,
                    node,
                });
            }
            Err(err) => {
                scene.warn(SceneWarning::MalformedRecord {
                    what: "connection",
                    detail: format!("connection #{i} skipped: {err}"),
                });
            }
        }
    }

    log::debug!(
        "loaded scene: {} nodes, {} connections",
        scene.node_count(),
        scene.connection_count()
    );
}
