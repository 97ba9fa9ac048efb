//! Upload form controller.
//!
//! Owns the whole client-side state of the upload page and reacts to
//! [`UiEvent`]s. The display follows a small state machine:
//!
//! ```text
//! UploadPrompt --valid file read--> Preview --submit--> Submitting
//!      ^                               |
//!      +------- invalid file ----------+
//! ```
//!
//! `Submitting` is terminal; the page is replaced by the server response.
//!
//! Delayed effects are not timers owned by the controller but steps on a
//! [`Timeline`] the host advances with [`UploadController::tick`].

#[cfg(test)]
mod tests;

use std::time::Duration;

use crate::config::UploadConfig;
use crate::dom::{Binding, Document, EventKind, EventSource, ReadTicket};
use crate::error::UploadError;
use crate::event::{EventResponse, UiEvent};
use crate::file::{self, SelectedFile};
use crate::timeline::{Sequence, Timeline};

/// Which part of the upload page is active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UiMode {
    /// Upload area visible, waiting for a file
    #[default]
    UploadPrompt,
    /// A valid file is previewed and can be submitted
    Preview,
    /// The form was submitted; nothing changes anymore
    Submitting,
}

/// Timed step applied by the controller when it becomes due.
#[derive(Debug, Clone, PartialEq)]
pub enum Action<N> {
    /// Fade a flash message to transparent
    FadeOutAlert(N),
    /// Remove a flash message from layout
    HideAlert(N),
    /// Capture the bars' target widths and shrink them to zero
    CollapseBars(Vec<N>),
    /// Grow the collapsed bars back to their captured widths
    ExpandBars,
    /// Start the preview opacity transition
    FadeInPreview,
}

/// Outcome of [`UploadController::handle_file_select`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    /// The list held no file
    Empty,
    /// The form is already being submitted
    Ignored,
    /// The file passed validation and is being read for the preview
    Reading(ReadTicket),
    /// The file was refused; the user was alerted and the form reset
    Rejected(UploadError),
}

/// Elements of the upload page, looked up once at startup.
#[derive(Debug, Clone)]
struct Elements<N> {
    upload_area: Option<N>,
    file_input: Option<N>,
    preview: Option<N>,
    preview_image: Option<N>,
    upload_form: Option<N>,
    submit_button: Option<N>,
}

/// Client-side controller of the upload page.
pub struct UploadController<D: Document> {
    document: D,
    config: UploadConfig,
    elements: Elements<D::Node>,
    mode: UiMode,
    selected: Option<SelectedFile>,
    /// Ticket and file of the read whose result may still update the preview
    active_read: Option<(ReadTicket, SelectedFile)>,
    next_ticket: u64,
    timeline: Timeline<Action<D::Node>>,
    /// Bar widths captured by `CollapseBars`, restored by `ExpandBars`
    bar_widths: Vec<(D::Node, String)>,
}

impl<D: Document> UploadController<D> {
    /// Set up the controller for a freshly loaded page.
    ///
    /// Looks up the page elements, puts the submit button into its disabled
    /// state and schedules alert dismissal and the probability bar animation
    /// relative to time zero.
    pub fn initialize(document: D, config: UploadConfig) -> Self {
        let names = &config.elements;
        let elements = Elements {
            upload_area: document.element_by_id(&names.upload_area),
            file_input: document.element_by_id(&names.file_input),
            preview: document.element_by_id(&names.preview),
            preview_image: document.element_by_id(&names.preview_image),
            upload_form: document.element_by_id(&names.upload_form),
            submit_button: document.element_by_id(&names.submit_button),
        };

        let mut controller = Self {
            document,
            config,
            elements,
            mode: UiMode::UploadPrompt,
            selected: None,
            active_read: None,
            next_ticket: 0,
            timeline: Timeline::new(),
            bar_widths: Vec::new(),
        };

        controller.set_submit_enabled(false);
        controller.schedule_alert_dismissal();
        controller.schedule_bar_animation();

        log::debug!(
            "Upload controller initialized ({} timed steps pending)",
            controller.timeline.len()
        );
        controller
    }

    /// Subscribe the listeners this page needs.
    ///
    /// Upload listeners are only requested when both the upload area and the
    /// file picker exist; the submit listener only when both the form and the
    /// submit button exist.
    pub fn register_handlers(&self, source: &mut impl EventSource<D::Node>) {
        if let (Some(area), Some(input)) = (&self.elements.upload_area, &self.elements.file_input)
        {
            for kind in [
                EventKind::AreaClick,
                EventKind::DragOver,
                EventKind::DragLeave,
                EventKind::Drop,
            ] {
                source.subscribe(Binding {
                    target: area.clone(),
                    kind,
                });
            }
            source.subscribe(Binding {
                target: input.clone(),
                kind: EventKind::PickerChange,
            });
        }

        if let (Some(form), Some(_)) = (&self.elements.upload_form, &self.elements.submit_button) {
            source.subscribe(Binding {
                target: form.clone(),
                kind: EventKind::Submit,
            });
        }
    }

    /// Dispatch one event to its handler.
    pub fn handle(&mut self, event: UiEvent<D::Node, D::Files>) -> EventResponse {
        match event {
            UiEvent::AreaClick { target } => {
                self.on_area_click(&target);
                EventResponse::PASS
            }
            UiEvent::PickerChange { files } => {
                self.on_picker_change(&files);
                EventResponse::PASS
            }
            UiEvent::DragOver => self.on_drag_over(),
            UiEvent::DragLeave => self.on_drag_leave(),
            UiEvent::Drop { files } => self.on_drop(files.as_ref()),
            UiEvent::Submit => self.on_submit(),
        }
    }

    /// Open the picker for clicks anywhere in the upload area except on the
    /// picker itself, which would open it twice.
    pub fn on_area_click(&mut self, target: &D::Node) {
        let Some(input) = &self.elements.file_input else {
            return;
        };
        if target != input {
            self.document.open_file_picker(input);
        }
    }

    pub fn on_picker_change(&mut self, files: &D::Files) {
        if self.document.first_file(files).is_some() {
            let _ = self.handle_file_select(files);
        }
    }

    pub fn on_drag_over(&mut self) -> EventResponse {
        if let Some(area) = &self.elements.upload_area {
            self.document
                .add_class(area, &self.config.elements.drag_over_class);
        }
        EventResponse::CONSUME
    }

    pub fn on_drag_leave(&mut self) -> EventResponse {
        self.clear_drag_over();
        EventResponse::CONSUME
    }

    /// Take over a drop: the files become the picker's selection so the form
    /// submits them, and the first one goes through validation.
    pub fn on_drop(&mut self, files: Option<&D::Files>) -> EventResponse {
        self.clear_drag_over();

        let Some(files) = files else {
            return EventResponse::CONSUME;
        };
        if self.document.first_file(files).is_none() {
            return EventResponse::CONSUME;
        }
        if self.mode == UiMode::Submitting {
            log::debug!("Ignoring drop while submitting");
            return EventResponse::CONSUME;
        }

        if let Some(input) = &self.elements.file_input {
            self.document.assign_files(input, files);
        }
        let _ = self.handle_file_select(files);
        EventResponse::CONSUME
    }

    /// Validate the first file of a list and start reading it for the preview.
    ///
    /// Refused files trigger an alert with the localized reason followed by
    /// [`reset_form`](Self::reset_form).
    pub fn handle_file_select(&mut self, files: &D::Files) -> Selection {
        let Some(file) = self.document.first_file(files) else {
            return Selection::Empty;
        };
        if self.mode == UiMode::Submitting {
            log::debug!("Ignoring selection of {} while submitting", file.name);
            return Selection::Ignored;
        }

        if let Err(err) = file::validate(&file, &self.config.policy) {
            self.reject(&file.name, &err);
            return Selection::Rejected(err);
        }

        let ticket = ReadTicket(self.next_ticket);
        self.next_ticket += 1;
        log::info!(
            "Accepted {} ({}, {} bytes), reading as {}",
            file.name,
            file.mime_type,
            file.size_bytes,
            ticket
        );

        self.selected = Some(file.clone());
        self.active_read = Some((ticket, file));
        self.document.begin_read(files, ticket);
        Selection::Reading(ticket)
    }

    /// Completion of a read started by [`handle_file_select`](Self::handle_file_select).
    ///
    /// `now` is the time the result arrived. Time is advanced to it first so
    /// the preview fade-in lands on a later tick than the one that shows the
    /// preview.
    ///
    /// Returns true if the result was applied. Results for superseded tickets
    /// are dropped. A failed read is handled like a refused file.
    pub fn on_read_complete(
        &mut self,
        now: Duration,
        ticket: ReadTicket,
        result: Result<Vec<u8>, String>,
    ) -> bool {
        self.tick(now);
        let file = match self.active_read.take() {
            Some((active, file)) if active == ticket => file,
            other => {
                log::debug!("Dropping stale result of {}", ticket);
                self.active_read = other;
                return false;
            }
        };

        match result {
            Ok(bytes) => {
                let url = file::to_data_url(&file.mime_type, &bytes);
                self.show_preview(&url);
                log::debug!("Preview of {} ready ({} byte data URL)", file.name, url.len());
            }
            Err(reason) => {
                self.reject(&file.name, &UploadError::read_failed(reason));
            }
        }
        true
    }

    /// Lock the submit button for the rest of the page's life.
    ///
    /// The form submission itself is never prevented.
    pub fn on_submit(&mut self) -> EventResponse {
        let Some(button) = &self.elements.submit_button else {
            return EventResponse::PASS;
        };

        self.document.set_disabled(button, true);
        self.document
            .set_inner_html(button, &self.config.messages.analyzing_label);
        self.document
            .set_style(button, "opacity", crate::constants::SUBMITTING_OPACITY);

        self.mode = UiMode::Submitting;
        self.active_read = None;
        log::info!("Upload form submitted");
        EventResponse::PASS
    }

    /// Return to the upload prompt. Safe to call in any state.
    pub fn reset_form(&mut self) {
        if let Some(input) = &self.elements.file_input {
            self.document.clear_value(input);
        }
        if let Some(area) = &self.elements.upload_area {
            self.document.set_style(area, "display", "block");
        }
        if let Some(preview) = &self.elements.preview {
            self.document.set_style(preview, "display", "none");
        }

        self.selected = None;
        self.active_read = None;
        if self.mode != UiMode::Submitting {
            self.set_submit_enabled(false);
            self.mode = UiMode::UploadPrompt;
        }
    }

    /// Advance time to `now` (elapsed since startup) and apply every timed
    /// step that became due.
    pub fn tick(&mut self, now: Duration) {
        for action in self.timeline.advance_to(now) {
            self.apply(action);
        }
    }

    /// When the next timed step is due, if any.
    pub fn next_deadline(&self) -> Option<Duration> {
        self.timeline.next_deadline()
    }

    pub fn mode(&self) -> UiMode {
        self.mode
    }

    /// The last accepted file, until the next reset.
    pub fn selected_file(&self) -> Option<&SelectedFile> {
        self.selected.as_ref()
    }

    pub fn config(&self) -> &UploadConfig {
        &self.config
    }

    pub fn document(&self) -> &D {
        &self.document
    }

    pub fn document_mut(&mut self) -> &mut D {
        &mut self.document
    }

    fn reject(&mut self, name: &str, err: &UploadError) {
        log::warn!("Rejected {}: {}", name, err);
        let message = err.user_message(&self.config.messages).to_string();
        self.document.alert(&message);
        self.reset_form();
    }

    fn show_preview(&mut self, url: &str) {
        if let Some(image) = &self.elements.preview_image {
            self.document.set_image_source(image, url);
        }
        if let Some(area) = &self.elements.upload_area {
            self.document.set_style(area, "display", "none");
        }
        if let Some(preview) = &self.elements.preview {
            self.document.set_style(preview, "display", "block");
            self.document.set_style(preview, "opacity", "0");
            let delay = self.config.timings.preview_fade_delay();
            self.timeline
                .schedule(Sequence::new().then(delay, Action::FadeInPreview));
        }

        self.mode = UiMode::Preview;
        self.set_submit_enabled(true);
    }

    fn set_submit_enabled(&mut self, enabled: bool) {
        let Some(button) = &self.elements.submit_button else {
            return;
        };
        let pulse = &self.config.elements.pulse_class;
        self.document.set_disabled(button, !enabled);
        if enabled {
            self.document.add_class(button, pulse);
        } else {
            self.document.remove_class(button, pulse);
        }
    }

    fn clear_drag_over(&mut self) {
        if let Some(area) = &self.elements.upload_area {
            self.document
                .remove_class(area, &self.config.elements.drag_over_class);
        }
    }

    fn schedule_alert_dismissal(&mut self) {
        let timings = self.config.timings;
        for alert in self
            .document
            .query_selector_all(&self.config.elements.alert_selector)
        {
            self.timeline.schedule(
                Sequence::new()
                    .then(timings.alert_fade_delay(), Action::FadeOutAlert(alert.clone()))
                    .then(timings.alert_hide_delay(), Action::HideAlert(alert)),
            );
        }
    }

    fn schedule_bar_animation(&mut self) {
        let bars = self
            .document
            .query_selector_all(&self.config.elements.bar_selector);
        if bars.is_empty() {
            return;
        }
        let timings = self.config.timings;
        self.timeline.schedule(
            Sequence::new()
                .then(timings.bar_collapse_delay(), Action::CollapseBars(bars))
                .then(timings.bar_expand_delay(), Action::ExpandBars),
        );
    }

    fn apply(&mut self, action: Action<D::Node>) {
        match action {
            Action::FadeOutAlert(alert) => self.document.set_style(&alert, "opacity", "0"),
            Action::HideAlert(alert) => self.document.set_style(&alert, "display", "none"),
            Action::CollapseBars(bars) => {
                self.bar_widths = bars
                    .into_iter()
                    .map(|bar| {
                        let width = self.document.style(&bar, "width");
                        (bar, width)
                    })
                    .collect();
                for (bar, _) in &self.bar_widths {
                    self.document.set_style(bar, "width", "0");
                }
            }
            Action::ExpandBars => {
                for (bar, width) in std::mem::take(&mut self.bar_widths) {
                    self.document.set_style(&bar, "width", &width);
                }
            }
            Action::FadeInPreview => {
                if let Some(preview) = &self.elements.preview {
                    let transition = self.config.timings.preview_transition();
                    self.document.set_style(preview, "transition", &transition);
                    self.document.set_style(preview, "opacity", "1");
                }
            }
        }
    }
}
