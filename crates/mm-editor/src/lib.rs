pub mod editor;
pub mod input;
pub mod mutation;
pub mod session;

pub use editor::{MindmapEditor, Overlay, RetargetPreview};
pub use input::{InputEvent, PointerTarget};
pub use mutation::SceneMutation;
pub use session::DragSession;
