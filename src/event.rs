//! Events delivered to the upload controller.

/// A user interaction, already stripped of toolkit-specific event objects.
///
/// `N` is the document's node handle, `F` its native file list.
#[derive(Debug, Clone)]
pub enum UiEvent<N, F> {
    /// Click somewhere inside the upload area.
    AreaClick {
        /// Element the click originated from
        target: N,
    },
    /// The file picker's selection changed.
    PickerChange { files: F },
    /// A drag hovers the upload area.
    DragOver,
    /// A drag left the upload area.
    DragLeave,
    /// Something was dropped on the upload area.
    Drop {
        /// Dropped files, if the drop carried any
        files: Option<F>,
    },
    /// The upload form is being submitted.
    Submit,
}

/// What the host should do with the original event after handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EventResponse {
    /// Suppress the browser's default action
    pub prevent_default: bool,
    /// Stop the event from bubbling further
    pub stop_propagation: bool,
}

impl EventResponse {
    /// Let the event continue untouched.
    pub const PASS: Self = Self {
        prevent_default: false,
        stop_propagation: false,
    };

    /// Swallow the event completely.
    pub const CONSUME: Self = Self {
        prevent_default: true,
        stop_propagation: true,
    };
}
