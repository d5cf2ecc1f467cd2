//! Engine configuration.

use crate::geometry::{Grid, Size};
use serde::{Deserialize, Serialize};

/// Tunable constants of the diagram engine.
///
/// Every field has a default, so a host config file only needs to list
/// the values it overrides.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Grid spacing that node centers snap to. Default: **25**.
    pub grid_size: f32,

    /// Smallest allowed node width. Default: **50**.
    pub min_width: f32,
    /// Smallest allowed node height. Default: **40**.
    pub min_height: f32,

    /// Size used for new nodes and for records missing `width`/`height`.
    /// Default: **120 × 80**.
    pub default_width: f32,
    pub default_height: f32,

    /// Margin added around measured label text when a node grows to fit it.
    pub text_padding: f32,

    /// Radius within which a pointer counts as over a port.
    pub port_radius: f32,

    /// Edge length of the square resize handles at node corners.
    pub handle_size: f32,

    /// Distance within which a pointer grabs a connection endpoint.
    pub endpoint_grab_threshold: f32,

    /// Label given to nodes created by the "Add Node" action.
    pub new_node_label: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            grid_size: 25.0,
            min_width: 50.0,
            min_height: 40.0,
            default_width: 120.0,
            default_height: 80.0,
            text_padding: 10.0,
            port_radius: 6.0,
            handle_size: 10.0,
            endpoint_grab_threshold: 8.0,
            new_node_label: "New Node".to_string(),
        }
    }
}

impl EngineConfig {
    /// Parse a (possibly partial) JSON config.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn grid(&self) -> Grid {
        Grid::new(self.grid_size)
    }

    pub fn min_size(&self) -> Size {
        Size::new(self.min_width, self.min_height)
    }

    pub fn default_size(&self) -> Size {
        Size::new(self.default_width, self.default_height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_keeps_defaults() {
        let cfg = EngineConfig::from_json(r#"{ "grid_size": 10 }"#).unwrap();
        assert_eq!(cfg.grid_size, 10.0);
        assert_eq!(cfg.min_size(), Size::new(50.0, 40.0));
        assert_eq!(cfg.new_node_label, "New Node");
    }

    #[test]
    fn rejects_mistyped_field() {
        assert!(EngineConfig::from_json(r#"{ "grid_size": "wide" }"#).is_err());
    }
}
