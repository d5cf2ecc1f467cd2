//! Scene change and warning notifications.
//!
//! The scene never reaches for a global logger: whoever builds a `Scene`
//! hands it a [`SceneObserver`]. Renderers use `changed` as their redraw
//! hook; hosts use `warn` to show load problems to the user.

use crate::error::SceneWarning;
use crate::id::{ConnectionId, NodeId};

/// A committed change to the scene.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SceneChange {
    NodeAdded(NodeId),
    NodeRemoved(NodeId),
    /// Position or size changed; connection routes touching it are stale.
    NodeMoved(NodeId),
    LabelChanged(NodeId),
    ConnectionAdded(ConnectionId),
    ConnectionRemoved(ConnectionId),
    ConnectionRetargeted(ConnectionId),
    Cleared,
}

/// Receives scene notifications. Both methods default to no-ops.
pub trait SceneObserver {
    fn changed(&self, _change: SceneChange) {}

    fn warn(&self, _warning: &SceneWarning) {}
}

/// Default observer: forwards everything to the `log` facade.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogObserver;

impl SceneObserver for LogObserver {
    fn changed(&self, change: SceneChange) {
        log::trace!("scene change: {change:?}");
    }

    fn warn(&self, warning: &SceneWarning) {
        log::warn!("{warning}");
    }
}

/// Observer that drops everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullObserver;

impl SceneObserver for NullObserver {}
