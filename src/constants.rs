//! Global constants for the upload form.

/// Element ids the controller binds to.
pub mod ids {
    /// Clickable/droppable region inviting a file selection
    pub const UPLOAD_AREA: &str = "uploadArea";
    /// Native file picker (`<input type="file">`)
    pub const FILE_INPUT: &str = "fileInput";
    /// Region shown after a valid file was selected
    pub const PREVIEW: &str = "preview";
    /// `<img>` inside the preview region
    pub const PREVIEW_IMAGE: &str = "previewImage";
    /// The upload `<form>`
    pub const UPLOAD_FORM: &str = "uploadForm";
    /// Submit button of the upload form
    pub const SUBMIT_BUTTON: &str = "submitBtn";
}

/// CSS classes toggled by the controller.
pub mod classes {
    pub const DRAG_OVER: &str = "drag-over";
    pub const PULSE_ANIMATION: &str = "pulse-animation";
}

/// CSS selectors read on initialization.
pub mod selectors {
    pub const ALERT: &str = ".alert";
    pub const PROBABILITY_BAR: &str = ".prob-bar";
}

/// Media types accepted by default.
pub const ACCEPTED_MIME_TYPES: [&str; 3] = ["image/png", "image/jpeg", "image/jpg"];

/// Default upload size limit (16 MiB).
pub const MAX_UPLOAD_BYTES: u64 = 16 * 1024 * 1024;

/// Default animation timings in milliseconds.
pub mod timing {
    /// Delay before an alert starts fading out
    pub const ALERT_FADE_DELAY_MS: u64 = 5000;
    /// Delay between fade-out and removal from layout
    pub const ALERT_HIDE_DELAY_MS: u64 = 500;
    /// Delay before probability bars are collapsed
    pub const BAR_COLLAPSE_DELAY_MS: u64 = 300;
    /// Delay between collapse and expansion back to the target width
    pub const BAR_EXPAND_DELAY_MS: u64 = 100;
    /// Delay so the initial preview opacity is painted before the transition starts
    pub const PREVIEW_FADE_DELAY_MS: u64 = 10;
    /// Duration of the preview fade-in transition
    pub const PREVIEW_FADE_DURATION_MS: u64 = 300;
}

/// Opacity of the submit button while the form is being submitted.
pub const SUBMITTING_OPACITY: &str = "0.7";
