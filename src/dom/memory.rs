//! In-memory page used by tests and the native dry-run.
//!
//! Elements are plain records addressed by index. Only what the upload
//! controller touches is modeled: ids, classes, inline styles, the disabled
//! flag, inner HTML, image sources and input values. Selectors are limited to
//! single class selectors (`.alert`), which is all the upload page needs.
//!
//! File reads never complete on their own. They queue up until the test (or
//! the dry-run) calls [`UploadController::complete_pending_reads`], which
//! mirrors how a browser delivers `FileReader` results on a later turn of the
//! event loop.

use std::collections::BTreeMap;
use std::time::Duration;

use super::{Document, ReadTicket};
use crate::config::ElementNames;
use crate::controller::UploadController;
use crate::file::SelectedFile;

/// Index of an element in a [`MemoryDocument`].
pub type NodeId = usize;

/// A file held in memory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemoryFile {
    pub name: String,
    pub mime_type: String,
    pub size_bytes: u64,
    /// File contents; `None` makes every read of this file fail
    pub contents: Option<Vec<u8>>,
}

impl MemoryFile {
    /// A readable file whose size is the length of its contents.
    pub fn new(name: impl Into<String>, mime_type: impl Into<String>, contents: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            mime_type: mime_type.into(),
            size_bytes: contents.len() as u64,
            contents: Some(contents),
        }
    }

    /// A file that only reports a size. Reading it fails.
    pub fn sized(name: impl Into<String>, mime_type: impl Into<String>, size_bytes: u64) -> Self {
        Self {
            name: name.into(),
            mime_type: mime_type.into(),
            size_bytes,
            contents: None,
        }
    }

    fn metadata(&self) -> SelectedFile {
        SelectedFile::new(self.name.clone(), self.mime_type.clone(), self.size_bytes)
    }
}

/// One element of a [`MemoryDocument`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MemoryElement {
    pub id: Option<String>,
    pub classes: Vec<String>,
    pub styles: BTreeMap<String, String>,
    pub disabled: bool,
    pub inner_html: String,
    pub src: Option<String>,
    /// Input value (file inputs show the selected file name)
    pub value: String,
    /// Files selected in a file input
    pub files: Vec<MemoryFile>,
}

impl MemoryElement {
    pub fn has_class(&self, class: &str) -> bool {
        self.classes.iter().any(|c| c == class)
    }

    pub fn style(&self, property: &str) -> &str {
        self.styles.get(property).map(String::as_str).unwrap_or("")
    }

    /// False only when `display: none` is set inline.
    pub fn is_displayed(&self) -> bool {
        self.style("display") != "none"
    }
}

/// In-memory [`Document`].
#[derive(Debug, Default)]
pub struct MemoryDocument {
    elements: Vec<MemoryElement>,
    alerts: Vec<String>,
    picker_opens: usize,
    pending_reads: Vec<(ReadTicket, MemoryFile)>,
}

impl MemoryDocument {
    /// An empty page.
    pub fn new() -> Self {
        Self::default()
    }

    /// The stock upload page: upload area with a nested file picker, a hidden
    /// preview with its image, and a form with a disabled submit button.
    pub fn upload_page(names: &ElementNames) -> Self {
        let mut doc = Self::new();
        doc.add_element(Some(&names.upload_area), &[]);
        doc.add_element(Some(&names.file_input), &[]);
        let preview = doc.add_element(Some(&names.preview), &[]);
        doc.elements[preview]
            .styles
            .insert("display".to_string(), "none".to_string());
        doc.add_element(Some(&names.preview_image), &[]);
        doc.add_element(Some(&names.upload_form), &[]);
        let submit = doc.add_element(Some(&names.submit_button), &[]);
        doc.elements[submit].disabled = true;
        doc
    }

    /// Append an element and return its handle.
    pub fn add_element(&mut self, id: Option<&str>, classes: &[&str]) -> NodeId {
        self.elements.push(MemoryElement {
            id: id.map(str::to_string),
            classes: classes.iter().map(|c| c.to_string()).collect(),
            ..Default::default()
        });
        self.elements.len() - 1
    }

    /// Append a flash message element.
    pub fn add_alert(&mut self) -> NodeId {
        self.add_element(None, &["alert"])
    }

    /// Append a result probability bar with a server-rendered width.
    pub fn add_probability_bar(&mut self, width: &str) -> NodeId {
        let node = self.add_element(None, &["prob-bar"]);
        self.elements[node]
            .styles
            .insert("width".to_string(), width.to_string());
        node
    }

    pub fn element(&self, node: NodeId) -> &MemoryElement {
        &self.elements[node]
    }

    /// Element with the given id.
    ///
    /// # Panics
    ///
    /// Panics if no element has that id.
    pub fn by_id(&self, id: &str) -> &MemoryElement {
        match self.element_by_id(id) {
            Some(node) => &self.elements[node],
            None => panic!("no element with id '{}'", id),
        }
    }

    /// Messages passed to `alert`, oldest first.
    pub fn alerts(&self) -> &[String] {
        &self.alerts
    }

    /// How often the file picker dialog was opened.
    pub fn picker_opens(&self) -> usize {
        self.picker_opens
    }

    /// Put files into a picker the way the browser does before `change`
    /// fires, and return the list to deliver with the event.
    pub fn choose_files(&mut self, picker: NodeId, files: Vec<MemoryFile>) -> Vec<MemoryFile> {
        self.assign_files(&picker, &files);
        files
    }

    /// Number of reads still waiting for completion.
    pub fn pending_reads(&self) -> usize {
        self.pending_reads.len()
    }

    /// Remove the queued reads and produce their outcomes.
    pub fn take_read_results(&mut self) -> Vec<(ReadTicket, Result<Vec<u8>, String>)> {
        self.pending_reads
            .drain(..)
            .map(|(ticket, file)| {
                let result = file
                    .contents
                    .ok_or_else(|| format!("{} has no readable contents", file.name));
                (ticket, result)
            })
            .collect()
    }
}

impl Document for MemoryDocument {
    type Node = NodeId;
    type Files = Vec<MemoryFile>;

    fn element_by_id(&self, id: &str) -> Option<NodeId> {
        self.elements
            .iter()
            .position(|e| e.id.as_deref() == Some(id))
    }

    fn query_selector_all(&self, selector: &str) -> Vec<NodeId> {
        let Some(class) = selector.strip_prefix('.') else {
            log::warn!("Unsupported selector in memory document: {}", selector);
            return Vec::new();
        };
        self.elements
            .iter()
            .enumerate()
            .filter(|(_, e)| e.has_class(class))
            .map(|(i, _)| i)
            .collect()
    }

    fn add_class(&mut self, node: &NodeId, class: &str) {
        let element = &mut self.elements[*node];
        if !element.has_class(class) {
            element.classes.push(class.to_string());
        }
    }

    fn remove_class(&mut self, node: &NodeId, class: &str) {
        self.elements[*node].classes.retain(|c| c != class);
    }

    fn style(&self, node: &NodeId, property: &str) -> String {
        self.elements[*node].style(property).to_string()
    }

    fn set_style(&mut self, node: &NodeId, property: &str, value: &str) {
        self.elements[*node]
            .styles
            .insert(property.to_string(), value.to_string());
    }

    fn set_disabled(&mut self, node: &NodeId, disabled: bool) {
        self.elements[*node].disabled = disabled;
    }

    fn set_inner_html(&mut self, node: &NodeId, html: &str) {
        self.elements[*node].inner_html = html.to_string();
    }

    fn set_image_source(&mut self, node: &NodeId, src: &str) {
        self.elements[*node].src = Some(src.to_string());
    }

    fn clear_value(&mut self, node: &NodeId) {
        let element = &mut self.elements[*node];
        element.value.clear();
        element.files.clear();
    }

    fn open_file_picker(&mut self, _picker: &NodeId) {
        self.picker_opens += 1;
    }

    fn assign_files(&mut self, picker: &NodeId, files: &Vec<MemoryFile>) {
        let element = &mut self.elements[*picker];
        element.value = files.first().map(|f| f.name.clone()).unwrap_or_default();
        element.files = files.clone();
    }

    fn first_file(&self, files: &Vec<MemoryFile>) -> Option<SelectedFile> {
        files.first().map(MemoryFile::metadata)
    }

    fn begin_read(&mut self, files: &Vec<MemoryFile>, ticket: ReadTicket) {
        if let Some(file) = files.first() {
            self.pending_reads.push((ticket, file.clone()));
        }
    }

    fn alert(&mut self, message: &str) {
        self.alerts.push(message.to_string());
    }
}

impl UploadController<MemoryDocument> {
    /// Deliver every queued read result to the controller, as arriving at
    /// `now`.
    pub fn complete_pending_reads(&mut self, now: Duration) {
        for (ticket, result) in self.document_mut().take_read_results() {
            self.on_read_complete(now, ticket, result);
        }
    }
}
