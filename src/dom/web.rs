//! Browser implementation of [`Document`] on top of `web_sys`.
//!
//! Failures of individual DOM calls are logged and skipped; the page keeps
//! working with whatever succeeded.

use std::rc::Rc;

use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{
    Element, Event, FileList, FileReader, HtmlElement, HtmlImageElement, HtmlInputElement,
};

use super::{Document, ReadTicket};
use crate::file::SelectedFile;

/// Receives the outcome of a file read started by `begin_read`.
pub type ReadCallback = Rc<dyn Fn(ReadTicket, Result<Vec<u8>, String>)>;

/// The live browser page.
pub struct WebDocument {
    document: web_sys::Document,
    window: web_sys::Window,
    on_read: ReadCallback,
}

impl WebDocument {
    pub fn new(
        window: web_sys::Window,
        document: web_sys::Document,
        on_read: ReadCallback,
    ) -> Self {
        Self {
            document,
            window,
            on_read,
        }
    }

    fn html(node: &Element) -> Option<&HtmlElement> {
        node.dyn_ref::<HtmlElement>()
    }
}

impl Document for WebDocument {
    type Node = Element;
    type Files = FileList;

    fn element_by_id(&self, id: &str) -> Option<Element> {
        self.document.get_element_by_id(id)
    }

    fn query_selector_all(&self, selector: &str) -> Vec<Element> {
        let list = match self.document.query_selector_all(selector) {
            Ok(list) => list,
            Err(e) => {
                log::warn!("Invalid selector {}: {:?}", selector, e);
                return Vec::new();
            }
        };
        (0..list.length())
            .filter_map(|i| list.get(i))
            .filter_map(|node| node.dyn_into::<Element>().ok())
            .collect()
    }

    fn add_class(&mut self, node: &Element, class: &str) {
        if let Err(e) = node.class_list().add_1(class) {
            log::warn!("Failed to add class {}: {:?}", class, e);
        }
    }

    fn remove_class(&mut self, node: &Element, class: &str) {
        if let Err(e) = node.class_list().remove_1(class) {
            log::warn!("Failed to remove class {}: {:?}", class, e);
        }
    }

    fn style(&self, node: &Element, property: &str) -> String {
        Self::html(node)
            .and_then(|el| el.style().get_property_value(property).ok())
            .unwrap_or_default()
    }

    fn set_style(&mut self, node: &Element, property: &str, value: &str) {
        let Some(el) = Self::html(node) else {
            return;
        };
        if let Err(e) = el.style().set_property(property, value) {
            log::warn!("Failed to set {}: {:?}", property, e);
        }
    }

    fn set_disabled(&mut self, node: &Element, disabled: bool) {
        let result = if disabled {
            node.set_attribute("disabled", "")
        } else {
            node.remove_attribute("disabled")
        };
        if let Err(e) = result {
            log::warn!("Failed to toggle disabled: {:?}", e);
        }
    }

    fn set_inner_html(&mut self, node: &Element, html: &str) {
        node.set_inner_html(html);
    }

    fn set_image_source(&mut self, node: &Element, src: &str) {
        match node.dyn_ref::<HtmlImageElement>() {
            Some(img) => img.set_src(src),
            None => {
                if let Err(e) = node.set_attribute("src", src) {
                    log::warn!("Failed to set image source: {:?}", e);
                }
            }
        }
    }

    fn clear_value(&mut self, node: &Element) {
        if let Some(input) = node.dyn_ref::<HtmlInputElement>() {
            input.set_value("");
        }
    }

    fn open_file_picker(&mut self, picker: &Element) {
        if let Some(el) = Self::html(picker) {
            el.click();
        }
    }

    fn assign_files(&mut self, picker: &Element, files: &FileList) {
        if let Some(input) = picker.dyn_ref::<HtmlInputElement>() {
            input.set_files(Some(files));
        }
    }

    fn first_file(&self, files: &FileList) -> Option<SelectedFile> {
        let file = files.get(0)?;
        Some(SelectedFile::new(file.name(), file.type_(), file.size() as u64))
    }

    fn begin_read(&mut self, files: &FileList, ticket: ReadTicket) {
        let Some(file) = files.get(0) else {
            return;
        };
        let reader = match FileReader::new() {
            Ok(reader) => reader,
            Err(e) => {
                (self.on_read)(ticket, Err(format!("FileReader unavailable: {:?}", e)));
                return;
            }
        };

        let on_read = self.on_read.clone();
        let onload = Closure::wrap(Box::new(move |event: Event| {
            let result = event
                .target()
                .and_then(|target| target.dyn_into::<FileReader>().ok())
                .and_then(|reader| reader.result().ok())
                .map(|buffer| js_sys::Uint8Array::new(&buffer).to_vec())
                .ok_or_else(|| "reader produced no data".to_string());
            on_read(ticket, result);
        }) as Box<dyn FnMut(Event)>);

        let on_read = self.on_read.clone();
        let onerror = Closure::wrap(Box::new(move |_event: Event| {
            on_read(ticket, Err("read error".to_string()));
        }) as Box<dyn FnMut(Event)>);

        reader.set_onload(Some(onload.as_ref().unchecked_ref()));
        reader.set_onerror(Some(onerror.as_ref().unchecked_ref()));
        // Keep the closures alive until the reader fires
        onload.forget();
        onerror.forget();

        if let Err(e) = reader.read_as_array_buffer(&file) {
            (self.on_read)(ticket, Err(format!("failed to start read: {:?}", e)));
        }
    }

    fn alert(&mut self, message: &str) {
        if let Err(e) = self.window.alert_with_message(message) {
            log::warn!("Failed to show alert: {:?}", e);
        }
    }
}
