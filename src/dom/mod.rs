//! Page abstraction the controller drives.
//!
//! The controller never touches a browser API directly. Everything it does to
//! the page goes through [`Document`], and every listener it needs is
//! requested through [`EventSource`]. The browser implementation lives in
//! `web` (wasm32 only); [`memory::MemoryDocument`] backs tests and the native
//! dry-run binary.

pub mod memory;
#[cfg(target_arch = "wasm32")]
pub mod web;

use std::fmt;

use crate::file::SelectedFile;

/// Identifies one asynchronous file read.
///
/// A later selection or a reset supersedes earlier tickets, so late
/// completions of abandoned reads can be recognized and dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ReadTicket(pub u64);

impl fmt::Display for ReadTicket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "read#{}", self.0)
    }
}

/// The page the upload controller operates on.
pub trait Document {
    /// Handle to one element of the page
    type Node: Clone + PartialEq + fmt::Debug;
    /// Native list of files from a picker or a drop
    type Files;

    /// Look up an element by id.
    fn element_by_id(&self, id: &str) -> Option<Self::Node>;

    /// All elements matching a CSS selector, in document order.
    fn query_selector_all(&self, selector: &str) -> Vec<Self::Node>;

    fn add_class(&mut self, node: &Self::Node, class: &str);
    fn remove_class(&mut self, node: &Self::Node, class: &str);

    /// Inline style property value, empty if unset.
    fn style(&self, node: &Self::Node, property: &str) -> String;
    fn set_style(&mut self, node: &Self::Node, property: &str, value: &str);

    fn set_disabled(&mut self, node: &Self::Node, disabled: bool);
    fn set_inner_html(&mut self, node: &Self::Node, html: &str);
    fn set_image_source(&mut self, node: &Self::Node, src: &str);

    /// Clear the value (and selected files) of an input element.
    fn clear_value(&mut self, node: &Self::Node);

    /// Open the native file picker dialog.
    fn open_file_picker(&mut self, picker: &Self::Node);

    /// Make a file list the picker's selection so the form submits it.
    fn assign_files(&mut self, picker: &Self::Node, files: &Self::Files);

    /// Metadata of the first file of a list.
    fn first_file(&self, files: &Self::Files) -> Option<SelectedFile>;

    /// Start reading the first file of a list.
    ///
    /// The host reports the outcome later through
    /// `UploadController::on_read_complete` with the same ticket.
    fn begin_read(&mut self, files: &Self::Files, ticket: ReadTicket);

    /// Show a blocking message to the user.
    fn alert(&mut self, message: &str);
}

/// Events the controller listens for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    /// `click` on the upload area
    AreaClick,
    /// `change` on the file picker
    PickerChange,
    /// `dragover` on the upload area
    DragOver,
    /// `dragleave` on the upload area
    DragLeave,
    /// `drop` on the upload area
    Drop,
    /// `submit` on the upload form
    Submit,
}

impl EventKind {
    /// DOM event type name.
    pub fn dom_name(&self) -> &'static str {
        match self {
            EventKind::AreaClick => "click",
            EventKind::PickerChange => "change",
            EventKind::DragOver => "dragover",
            EventKind::DragLeave => "dragleave",
            EventKind::Drop => "drop",
            EventKind::Submit => "submit",
        }
    }
}

/// A listener the controller wants attached.
#[derive(Debug, Clone, PartialEq)]
pub struct Binding<N> {
    /// Element to listen on
    pub target: N,
    /// Event to listen for
    pub kind: EventKind,
}

/// Something listeners can be attached to.
pub trait EventSource<N> {
    fn subscribe(&mut self, binding: Binding<N>);
}

/// Collects bindings without attaching them anywhere.
impl<N> EventSource<N> for Vec<Binding<N>> {
    fn subscribe(&mut self, binding: Binding<N>) {
        self.push(binding);
    }
}
