pub mod backend;
pub mod config;
pub mod drag;
pub mod error;
pub mod history;
pub mod input;
pub mod session;
pub mod tools;

pub use backend::{BackendError, ExportedPdf, LoadGate, LoadTicket, LoadedPdf, PdfBackend, RenderedPage};
pub use config::EditorConfig;
pub use drag::{DragController, DragEvent, DragOptions};
pub use error::EditError;
pub use history::{HistoryManager, SaveOutcome};
pub use input::{InputEvent, PointerAction};
pub use session::{EditorSession, Placement, SessionEvent};
pub use tools::{TextProperties, ToolInput, ToolKind};
