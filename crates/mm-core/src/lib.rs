pub mod codec;
pub mod config;
pub mod document;
pub mod error;
pub mod geometry;
pub mod hit;
pub mod id;
pub mod model;
pub mod observer;
pub mod scene;

pub use codec::{
    ConnectionRecord, NodeRecord, PositionRecord, SceneRecord, deserialize_node,
    deserialize_scene, serialize_node, serialize_scene,
};
pub use config::EngineConfig;
pub use document::{MemoryStore, MindmapRecord, MindmapStore, load_scene};
pub use error::{LoadError, SceneError, SceneWarning, SnapshotError};
pub use geometry::{Corner, Grid, Point, Rect, Side, Size, snap};
pub use id::{ConnectionId, NodeId};
pub use model::*;
pub use observer::{LogObserver, NullObserver, SceneChange, SceneObserver};
pub use scene::Scene;
