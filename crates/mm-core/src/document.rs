//! Mindmap documents and the persistence collaborator.
//!
//! A [`MindmapRecord`] wraps a scene's nodes and connections with the
//! metadata a file browser needs (title, description, dates, optional
//! project link). Storage itself lives behind [`MindmapStore`]; the engine
//! never touches the filesystem.

use crate::codec::{self, ConnectionRecord, NodeRecord, SceneRecord};
use crate::config::EngineConfig;
use crate::error::{LoadError, SceneWarning};
use crate::observer::SceneObserver;
use crate::scene::Scene;
use chrono::{DateTime, Local, NaiveDateTime};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashMap;

/// A persisted mindmap.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MindmapRecord {
    #[serde(default = "fresh_id")]
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub nodes: Vec<NodeRecord>,
    #[serde(default)]
    pub connections: Vec<ConnectionRecord>,
    /// Opaque link to an owning project. Not interpreted here.
    #[serde(default, alias = "projectId", skip_serializing_if = "Option::is_none")]
    pub project_id: Option<String>,
    #[serde(default = "now", alias = "createdAt", deserialize_with = "date_or_now")]
    pub creation_date: NaiveDateTime,
    #[serde(default = "now", alias = "modifiedAt", deserialize_with = "date_or_now")]
    pub modified_date: NaiveDateTime,
}

fn fresh_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

fn now() -> NaiveDateTime {
    Local::now().naive_local()
}

/// Accept ISO-8601 with or without an offset; anything else is "now".
fn date_or_now<'de, D>(deserializer: D) -> Result<NaiveDateTime, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    let parsed = value.as_ref().and_then(|v| v.as_str()).and_then(|s| {
        s.parse::<NaiveDateTime>()
            .ok()
            .or_else(|| DateTime::parse_from_rfc3339(s).ok().map(|d| d.naive_local()))
    });
    if parsed.is_none() {
        log::debug!("unreadable mindmap date {value:?}, using now");
    }
    Ok(parsed.unwrap_or_else(now))
}

impl MindmapRecord {
    /// An empty mindmap with a fresh id, created and modified now.
    pub fn new(title: impl Into<String>) -> Self {
        let stamp = now();
        Self {
            id: fresh_id(),
            title: title.into(),
            description: String::new(),
            nodes: Vec::new(),
            connections: Vec::new(),
            project_id: None,
            creation_date: stamp,
            modified_date: stamp,
        }
    }

    pub fn from_json(json: &str) -> Result<Self, LoadError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> Result<String, LoadError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Replace the stored content with the scene's and bump the modified
    /// date.
    pub fn update_content(&mut self, scene: &Scene) {
        let SceneRecord { nodes, connections } = codec::serialize_scene(scene);
        self.nodes = nodes;
        self.connections = connections;
        self.modified_date = now();
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn connection_count(&self) -> usize {
        self.connections.len()
    }

    pub fn set_project_id(&mut self, project_id: impl Into<String>) {
        self.project_id = Some(project_id.into());
        self.modified_date = now();
    }

    pub fn clear_project_id(&mut self) {
        self.project_id = None;
        self.modified_date = now();
    }

    pub fn scene_record(&self) -> SceneRecord {
        SceneRecord {
            nodes: self.nodes.clone(),
            connections: self.connections.clone(),
        }
    }

    /// Build a live scene from the stored content.
    pub fn to_scene(&self, config: EngineConfig, observer: Box<dyn SceneObserver>) -> Scene {
        codec::deserialize_scene(&self.scene_record(), config, observer)
    }
}

// ─── Persistence collaborator ────────────────────────────────────────────

pub trait MindmapStore {
    fn load_mindmap(&self, id: &str) -> Result<MindmapRecord, LoadError>;
    fn save_mindmap(&mut self, record: &MindmapRecord) -> Result<(), LoadError>;
}

/// In-memory store keeping each mindmap as its JSON text.
#[derive(Debug, Default)]
pub struct MemoryStore {
    documents: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store raw JSON under `id` without validating it.
    pub fn insert_raw(&mut self, id: impl Into<String>, json: impl Into<String>) {
        self.documents.insert(id.into(), json.into());
    }

    pub fn remove(&mut self, id: &str) -> bool {
        self.documents.remove(id).is_some()
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }
}

impl MindmapStore for MemoryStore {
    fn load_mindmap(&self, id: &str) -> Result<MindmapRecord, LoadError> {
        let json = self
            .documents
            .get(id)
            .ok_or_else(|| LoadError::NotFound(id.to_string()))?;
        let record = MindmapRecord::from_json(json)?;
        if record.id != id {
            return Err(LoadError::Corrupt(format!(
                "stored under {id} but carries id {}",
                record.id
            )));
        }
        Ok(record)
    }

    fn save_mindmap(&mut self, record: &MindmapRecord) -> Result<(), LoadError> {
        let json = record.to_json()?;
        self.documents.insert(record.id.clone(), json);
        Ok(())
    }
}

/// Load mindmap `id` into a scene. When the store cannot produce it the
/// result is an empty scene and a `LoadFailure` warning.
pub fn load_scene(
    store: &dyn MindmapStore,
    id: &str,
    config: EngineConfig,
    observer: Box<dyn SceneObserver>,
) -> Scene {
    match store.load_mindmap(id) {
        Ok(record) => record.to_scene(config, observer),
        Err(err) => {
            let scene = Scene::with_observer(config, observer);
            scene.warn(SceneWarning::LoadFailure {
                mindmap: id.to_string(),
                reason: err.to_string(),
            });
            scene
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{Point, Side};
    use crate::model::PortRef;
    use crate::observer::NullObserver;
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;

    #[test]
    fn update_content_counts() {
        let mut scene = Scene::default();
        let a = scene.create_node(Point::ORIGIN, "A", None);
        let b = scene.create_node(Point::new(300.0, 0.0), "B", None);
        scene
            .add_connection(PortRef::new(a, Side::Right), PortRef::new(b, Side::Left))
            .unwrap();

        let mut record = MindmapRecord::new("Plans");
        let created = record.creation_date;
        record.update_content(&scene);
        assert_eq!(record.node_count(), 2);
        assert_eq!(record.connection_count(), 1);
        assert_eq!(record.creation_date, created);
        assert!(record.modified_date >= created);
    }

    #[test]
    fn project_link_is_passthrough() {
        let mut record = MindmapRecord::new("Linked");
        record.set_project_id("proj-1");
        let json = record.to_json().unwrap();
        assert!(json.contains("\"project_id\": \"proj-1\""));
        record.clear_project_id();
        assert!(!record.to_json().unwrap().contains("project_id"));
    }

    #[test]
    fn reads_camel_case_aliases_and_bad_dates() {
        let record = MindmapRecord::from_json(
            r#"{
                "id": "m1",
                "title": "Old",
                "projectId": "p",
                "createdAt": "2023-04-05T06:07:08",
                "modifiedAt": "not a date"
            }"#,
        )
        .unwrap();
        assert_eq!(record.project_id.as_deref(), Some("p"));
        let expected = NaiveDate::from_ymd_opt(2023, 4, 5)
            .and_then(|d| d.and_hms_opt(6, 7, 8))
            .unwrap();
        assert_eq!(record.creation_date, expected);
        assert!(record.modified_date > expected);
        assert!(record.nodes.is_empty());
    }

    #[test]
    fn memory_store_roundtrip() {
        let mut store = MemoryStore::new();
        let record = MindmapRecord::new("Stored");
        store.save_mindmap(&record).unwrap();
        assert_eq!(store.load_mindmap(&record.id).unwrap(), record);
        assert!(matches!(
            store.load_mindmap("missing"),
            Err(LoadError::NotFound(_))
        ));
    }

    #[test]
    fn corrupt_document_is_a_load_error() {
        let mut store = MemoryStore::new();
        store.insert_raw("bad", "{ nope");
        assert!(matches!(store.load_mindmap("bad"), Err(LoadError::Json(_))));
        store.insert_raw("moved", r#"{ "id": "elsewhere" }"#);
        assert!(matches!(
            store.load_mindmap("moved"),
            Err(LoadError::Corrupt(_))
        ));
    }

    #[test]
    fn load_failure_gives_empty_scene() {
        let store = MemoryStore::new();
        let scene = load_scene(&store, "absent", EngineConfig::default(), Box::new(NullObserver));
        assert!(scene.is_empty());
    }
}
