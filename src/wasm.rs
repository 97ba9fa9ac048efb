//! Browser entry point.
//!
//! Wires an [`UploadController`] over the live page: listeners dispatch
//! [`UiEvent`]s, file read results are queued and delivered on the next turn
//! of the event loop, and a single `setTimeout` is kept armed for the
//! controller's next timed step.

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};
use std::time::Duration;

use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{DragEvent, Element, Event, HtmlInputElement};
use web_time::Instant;

use crate::config::UploadConfig;
use crate::controller::UploadController;
use crate::dom::web::{ReadCallback, WebDocument};
use crate::dom::{Binding, EventKind, EventSource, ReadTicket};
use crate::event::UiEvent;

type ReadResult = (ReadTicket, Result<Vec<u8>, String>);

/// Everything that lives for the lifetime of the page.
struct Host {
    window: web_sys::Window,
    controller: RefCell<UploadController<WebDocument>>,
    started: Instant,
    /// Deadline the pending timeout was armed for
    armed: Cell<Option<Duration>>,
    /// Read results waiting to be delivered
    reads: RefCell<Vec<ReadResult>>,
}

impl Host {
    fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    /// Deliver an event, unless the controller is busy.
    ///
    /// Opening the file picker synchronously re-dispatches a click on the
    /// nested input, which arrives here while the outer click still holds
    /// the controller. That inner click targets the picker and would be
    /// ignored anyway.
    fn dispatch(self: &Rc<Self>, event: &Event, ui_event: UiEvent<Element, web_sys::FileList>) {
        let response = {
            let Ok(mut controller) = self.controller.try_borrow_mut() else {
                log::debug!("Skipping re-entrant {}", event.type_());
                return;
            };
            controller.tick(self.elapsed());
            controller.handle(ui_event)
        };

        if response.prevent_default {
            event.prevent_default();
        }
        if response.stop_propagation {
            event.stop_propagation();
        }
        self.pump();
    }

    /// Deliver queued read results, run due steps and re-arm the timer.
    fn pump(self: &Rc<Self>) {
        let Ok(mut controller) = self.controller.try_borrow_mut() else {
            return;
        };
        let now = self.elapsed();
        controller.tick(now);
        let reads: Vec<ReadResult> = self.reads.borrow_mut().drain(..).collect();
        for (ticket, result) in reads {
            controller.on_read_complete(now, ticket, result);
        }
        let next = controller.next_deadline();
        drop(controller);

        if let Some(deadline) = next {
            self.arm(deadline);
        }
    }

    fn arm(self: &Rc<Self>, deadline: Duration) {
        if matches!(self.armed.get(), Some(armed) if armed <= deadline) {
            return;
        }
        self.armed.set(Some(deadline));

        let delay_ms = deadline.saturating_sub(self.elapsed()).as_millis();
        self.schedule_pump(i32::try_from(delay_ms).unwrap_or(i32::MAX), true);
    }

    /// Run `pump` after `delay_ms` on a fresh turn of the event loop.
    fn schedule_pump(self: &Rc<Self>, delay_ms: i32, clears_armed: bool) {
        let host = Rc::clone(self);
        let callback = Closure::once_into_js(move || {
            if clears_armed {
                host.armed.set(None);
            }
            host.pump();
        });
        let result = self
            .window
            .set_timeout_with_callback_and_timeout_and_arguments_0(
                callback.unchecked_ref(),
                delay_ms,
            );
        if let Err(e) = result {
            log::warn!("Failed to schedule timer: {:?}", e);
        }
    }
}

/// Attaches DOM listeners that forward into the host.
struct ListenerSource {
    host: Rc<Host>,
}

impl EventSource<Element> for ListenerSource {
    fn subscribe(&mut self, binding: Binding<Element>) {
        let host = Rc::clone(&self.host);
        let kind = binding.kind;
        let listener = Closure::wrap(Box::new(move |event: Event| {
            if let Some(ui_event) = to_ui_event(kind, &event) {
                host.dispatch(&event, ui_event);
            }
        }) as Box<dyn FnMut(Event)>);

        if let Err(e) = binding
            .target
            .add_event_listener_with_callback(kind.dom_name(), listener.as_ref().unchecked_ref())
        {
            log::warn!("Failed to attach {} listener: {:?}", kind.dom_name(), e);
        }
        // Listeners stay for the lifetime of the page
        listener.forget();
    }
}

fn to_ui_event(kind: EventKind, event: &Event) -> Option<UiEvent<Element, web_sys::FileList>> {
    Some(match kind {
        EventKind::AreaClick => UiEvent::AreaClick {
            target: event.target()?.dyn_into::<Element>().ok()?,
        },
        EventKind::PickerChange => UiEvent::PickerChange {
            files: event
                .target()?
                .dyn_into::<HtmlInputElement>()
                .ok()?
                .files()?,
        },
        EventKind::DragOver => UiEvent::DragOver,
        EventKind::DragLeave => UiEvent::DragLeave,
        EventKind::Drop => UiEvent::Drop {
            files: event
                .dyn_ref::<DragEvent>()
                .and_then(|e| e.data_transfer())
                .and_then(|dt| dt.files()),
        },
        EventKind::Submit => UiEvent::Submit,
    })
}

fn read_callback(host: Weak<Host>) -> ReadCallback {
    Rc::new(move |ticket, result| {
        let Some(host) = host.upgrade() else {
            return;
        };
        host.reads.borrow_mut().push((ticket, result));
        // May be called from inside the controller; deliver on a later turn
        host.schedule_pump(0, false);
    })
}

/// Create the controller for the current page and attach its listeners.
pub fn initialize(window: web_sys::Window, document: web_sys::Document, config: UploadConfig) {
    let host = Rc::new_cyclic(|weak: &Weak<Host>| {
        let page = WebDocument::new(window.clone(), document, read_callback(weak.clone()));
        Host {
            window,
            controller: RefCell::new(UploadController::initialize(page, config)),
            started: Instant::now(),
            armed: Cell::new(None),
            reads: RefCell::new(Vec::new()),
        }
    });

    let mut source = ListenerSource {
        host: Rc::clone(&host),
    };
    host.controller.borrow().register_handlers(&mut source);
    host.pump();
    log::info!("Upload form ready");
}

#[wasm_bindgen(start)]
pub fn start() {
    console_error_panic_hook::set_once();

    let config = UploadConfig::load_from_local_storage().unwrap_or_default();
    // A logger may already be installed by the embedding page
    let _ = console_log::init_with_level(config.log_level.to_level());

    let Some(window) = web_sys::window() else {
        return;
    };
    let Some(document) = window.document() else {
        log::error!("No document available");
        return;
    };

    if document.ready_state() == "loading" {
        let ready_window = window.clone();
        let ready_document = document.clone();
        let on_ready = Closure::once_into_js(move || {
            initialize(ready_window, ready_document, config);
        });
        if let Err(e) = document
            .add_event_listener_with_callback("DOMContentLoaded", on_ready.unchecked_ref())
        {
            log::error!("Failed to wait for DOMContentLoaded: {:?}", e);
        }
    } else {
        initialize(window, document, config);
    }
}
