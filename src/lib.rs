//! upload-form - client side of the dental X-ray upload page
//!
//! Drives the upload form of the analysis web app: click and drag/drop file
//! selection, image validation and preview, the submit button's busy state,
//! flash message dismissal and the result page's probability bar animation.
//!
//! The [`UploadController`] is independent of any UI toolkit. It operates on a
//! [`Document`] and is fed [`UiEvent`]s; in the browser the `wasm` module
//! binds it to the real DOM, elsewhere [`MemoryDocument`] stands in.

pub mod config;
pub mod constants;
pub mod controller;
pub mod dom;
pub mod error;
pub mod event;
pub mod file;
pub mod timeline;

pub use config::{ConfigError, UploadConfig};
pub use controller::{Action, Selection, UiMode, UploadController};
pub use dom::memory::{MemoryDocument, MemoryFile};
pub use dom::{Binding, Document, EventKind, EventSource, ReadTicket};
pub use error::UploadError;
pub use event::{EventResponse, UiEvent};
pub use file::SelectedFile;
pub use timeline::{Sequence, Timeline};

// WASM entry point
#[cfg(target_arch = "wasm32")]
mod wasm;

#[cfg(target_arch = "wasm32")]
pub use wasm::*;
