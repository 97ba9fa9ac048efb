//! Upload page scenarios against the in-memory document.

use std::time::Duration;

use super::*;
use crate::dom::memory::{MemoryDocument, MemoryFile, NodeId};
use crate::file::from_data_url;

const MB: usize = 1024 * 1024;

fn ms(value: u64) -> Duration {
    Duration::from_millis(value)
}

fn controller() -> UploadController<MemoryDocument> {
    controller_with(|_| ()).0
}

/// Upload page with extra elements added by `build`, whose result is passed through.
fn controller_with<T>(
    build: impl FnOnce(&mut MemoryDocument) -> T,
) -> (UploadController<MemoryDocument>, T) {
    let config = UploadConfig::default();
    let mut doc = MemoryDocument::upload_page(&config.elements);
    let extra = build(&mut doc);
    (UploadController::initialize(doc, config), extra)
}

fn node(ctrl: &UploadController<MemoryDocument>, id: &str) -> NodeId {
    ctrl.document().element_by_id(id).unwrap()
}

fn pick(ctrl: &mut UploadController<MemoryDocument>, file: MemoryFile) -> Selection {
    let input = node(ctrl, "fileInput");
    let files = ctrl.document_mut().choose_files(input, vec![file]);
    ctrl.handle_file_select(&files)
}

fn assert_prompt_state(ctrl: &UploadController<MemoryDocument>) {
    let doc = ctrl.document();
    assert!(doc.by_id("uploadArea").is_displayed());
    assert!(!doc.by_id("preview").is_displayed());
    assert_eq!(doc.by_id("fileInput").value, "");
    assert!(doc.by_id("fileInput").files.is_empty());
    assert!(doc.by_id("submitBtn").disabled);
    assert_eq!(ctrl.mode(), UiMode::UploadPrompt);
}

// ============================================================================
// Handler registration
// ============================================================================

#[test]
fn test_registers_all_handlers_on_full_page() {
    let ctrl = controller();
    let mut bindings: Vec<Binding<NodeId>> = Vec::new();
    ctrl.register_handlers(&mut bindings);

    let area = node(&ctrl, "uploadArea");
    let input = node(&ctrl, "fileInput");
    let form = node(&ctrl, "uploadForm");
    let kinds: Vec<_> = bindings.iter().map(|b| (b.target, b.kind)).collect();
    assert_eq!(
        kinds,
        vec![
            (area, EventKind::AreaClick),
            (area, EventKind::DragOver),
            (area, EventKind::DragLeave),
            (area, EventKind::Drop),
            (input, EventKind::PickerChange),
            (form, EventKind::Submit),
        ]
    );
}

#[test]
fn test_results_page_registers_nothing() {
    let mut doc = MemoryDocument::new();
    doc.add_probability_bar("40%");
    let ctrl = UploadController::initialize(doc, UploadConfig::default());

    let mut bindings: Vec<Binding<NodeId>> = Vec::new();
    ctrl.register_handlers(&mut bindings);
    assert!(bindings.is_empty());
}

#[test]
fn test_upload_handlers_need_picker() {
    let mut doc = MemoryDocument::new();
    doc.add_element(Some("uploadArea"), &[]);
    doc.add_element(Some("uploadForm"), &[]);
    doc.add_element(Some("submitBtn"), &[]);
    let ctrl = UploadController::initialize(doc, UploadConfig::default());

    let mut bindings: Vec<Binding<NodeId>> = Vec::new();
    ctrl.register_handlers(&mut bindings);
    assert_eq!(bindings.len(), 1);
    assert_eq!(bindings[0].kind, EventKind::Submit);
}

// ============================================================================
// Input binding
// ============================================================================

#[test]
fn test_area_click_opens_picker() {
    let mut ctrl = controller();
    let area = node(&ctrl, "uploadArea");

    let response = ctrl.handle(UiEvent::AreaClick { target: area });
    assert_eq!(response, EventResponse::PASS);
    assert_eq!(ctrl.document().picker_opens(), 1);
}

#[test]
fn test_click_on_picker_does_not_reopen_it() {
    let mut ctrl = controller();
    let input = node(&ctrl, "fileInput");

    ctrl.handle(UiEvent::AreaClick { target: input });
    assert_eq!(ctrl.document().picker_opens(), 0);
}

#[test]
fn test_drag_indicator_toggles() {
    let mut ctrl = controller();

    assert_eq!(ctrl.handle(UiEvent::DragOver), EventResponse::CONSUME);
    assert_eq!(ctrl.handle(UiEvent::DragOver), EventResponse::CONSUME);
    assert_eq!(
        ctrl.document().by_id("uploadArea").classes,
        vec!["drag-over"]
    );

    assert_eq!(ctrl.handle(UiEvent::DragLeave), EventResponse::CONSUME);
    assert!(!ctrl.document().by_id("uploadArea").has_class("drag-over"));
}

#[test]
fn test_empty_picker_change_is_ignored() {
    let mut ctrl = controller();
    ctrl.handle(UiEvent::PickerChange { files: Vec::new() });
    assert!(ctrl.document().alerts().is_empty());
    assert_eq!(ctrl.document().pending_reads(), 0);
    assert_eq!(ctrl.mode(), UiMode::UploadPrompt);
}

#[test]
fn test_drop_without_files_only_clears_indicator() {
    let mut ctrl = controller();
    ctrl.handle(UiEvent::DragOver);

    let response = ctrl.handle(UiEvent::Drop { files: None });
    assert_eq!(response, EventResponse::CONSUME);
    assert!(!ctrl.document().by_id("uploadArea").has_class("drag-over"));
    assert_eq!(ctrl.document().pending_reads(), 0);
}

// ============================================================================
// Validation and preview
// ============================================================================

#[test]
fn test_drop_valid_jpeg_shows_preview() {
    let mut ctrl = controller();
    let bytes = vec![0xAB; 2 * MB];
    let file = MemoryFile::new("scan.jpg", "image/jpeg", bytes.clone());

    ctrl.handle(UiEvent::DragOver);
    let response = ctrl.handle(UiEvent::Drop {
        files: Some(vec![file]),
    });
    assert_eq!(response, EventResponse::CONSUME);

    // Dropped files become the picker's selection
    assert_eq!(ctrl.document().by_id("fileInput").value, "scan.jpg");
    assert!(!ctrl.document().by_id("uploadArea").has_class("drag-over"));

    ctrl.complete_pending_reads(Duration::ZERO);

    let doc = ctrl.document();
    assert!(doc.alerts().is_empty());
    assert!(!doc.by_id("uploadArea").is_displayed());
    assert!(doc.by_id("preview").is_displayed());
    assert!(!doc.by_id("submitBtn").disabled);
    assert!(doc.by_id("submitBtn").has_class("pulse-animation"));

    let src = doc.by_id("previewImage").src.clone().unwrap();
    assert_eq!(
        from_data_url(&src),
        Some(("image/jpeg".to_string(), bytes))
    );
    assert_eq!(ctrl.mode(), UiMode::Preview);
}

#[test]
fn test_preview_fades_in_after_first_paint() {
    let mut ctrl = controller();
    pick(&mut ctrl, MemoryFile::new("a.png", "image/png", vec![1, 2, 3]));
    ctrl.complete_pending_reads(Duration::ZERO);

    assert_eq!(ctrl.document().by_id("preview").style("opacity"), "0");
    assert_eq!(ctrl.next_deadline(), Some(ms(10)));

    ctrl.tick(ms(9));
    assert_eq!(ctrl.document().by_id("preview").style("opacity"), "0");

    ctrl.tick(ms(10));
    let preview = ctrl.document().by_id("preview");
    assert_eq!(preview.style("opacity"), "1");
    assert_eq!(preview.style("transition"), "opacity 0.3s");
}

#[test]
fn test_fade_in_waits_when_read_completes_later() {
    let mut ctrl = controller();
    ctrl.tick(ms(1000));
    pick(&mut ctrl, MemoryFile::new("a.png", "image/png", vec![1, 2, 3]));

    // The read lands well after the last event; the host ticks to the same time
    ctrl.complete_pending_reads(ms(1500));
    ctrl.tick(ms(1500));

    assert_eq!(ctrl.next_deadline(), Some(ms(1510)));
    assert_eq!(ctrl.document().by_id("preview").style("opacity"), "0");

    ctrl.tick(ms(1510));
    assert_eq!(ctrl.document().by_id("preview").style("opacity"), "1");
}

#[test]
fn test_preview_waits_for_read() {
    let mut ctrl = controller();
    let selection = pick(&mut ctrl, MemoryFile::new("a.png", "image/png", vec![7]));

    assert_eq!(selection, Selection::Reading(ReadTicket(0)));
    assert_eq!(ctrl.mode(), UiMode::UploadPrompt);
    assert!(ctrl.document().by_id("submitBtn").disabled);
    assert_eq!(ctrl.selected_file().unwrap().name, "a.png");
}

#[test]
fn test_oversized_png_is_rejected() {
    let mut ctrl = controller();
    let input = node(&ctrl, "fileInput");
    let files = ctrl.document_mut().choose_files(
        input,
        vec![MemoryFile::sized("huge.png", "image/png", 20 * MB as u64)],
    );

    ctrl.handle(UiEvent::PickerChange { files });

    assert_eq!(
        ctrl.document().alerts(),
        ["Kích thước file không được vượt quá 16MB"]
    );
    assert_prompt_state(&ctrl);
    assert_eq!(ctrl.document().pending_reads(), 0);
}

#[test]
fn test_gif_is_rejected() {
    let mut ctrl = controller();
    let input = node(&ctrl, "fileInput");
    let files = ctrl.document_mut().choose_files(
        input,
        vec![MemoryFile::new("anim.gif", "image/gif", vec![0; 1024])],
    );

    ctrl.handle(UiEvent::PickerChange { files });

    assert_eq!(
        ctrl.document().alerts(),
        ["Vui lòng chọn file ảnh (PNG, JPG, JPEG)"]
    );
    assert_prompt_state(&ctrl);
}

#[test]
fn test_invalid_file_replaces_existing_preview() {
    let mut ctrl = controller();
    pick(&mut ctrl, MemoryFile::new("ok.png", "image/png", vec![1]));
    ctrl.complete_pending_reads(Duration::ZERO);
    assert_eq!(ctrl.mode(), UiMode::Preview);

    let selection = pick(&mut ctrl, MemoryFile::new("bad.bmp", "image/bmp", vec![1]));

    assert!(matches!(
        selection,
        Selection::Rejected(UploadError::UnsupportedType { .. })
    ));
    assert_prompt_state(&ctrl);
    assert!(!ctrl.document().by_id("submitBtn").has_class("pulse-animation"));
    assert!(ctrl.selected_file().is_none());
}

#[test]
fn test_limit_is_inclusive() {
    let mut ctrl = controller();
    let limit = ctrl.config().policy.max_size_bytes;
    let selection = pick(&mut ctrl, MemoryFile::sized("edge.jpg", "image/jpg", limit));
    assert!(matches!(selection, Selection::Reading(_)));
    assert!(ctrl.document().alerts().is_empty());
}

#[test]
fn test_failed_read_is_rejected() {
    let mut ctrl = controller();
    // Sized files have no contents, so the read fails
    pick(&mut ctrl, MemoryFile::sized("broken.png", "image/png", 10));
    ctrl.complete_pending_reads(Duration::ZERO);

    assert_eq!(
        ctrl.document().alerts(),
        ["Không thể đọc file ảnh, vui lòng thử lại"]
    );
    assert_prompt_state(&ctrl);
}

#[test]
fn test_stale_read_is_dropped() {
    let mut ctrl = controller();
    let first = pick(&mut ctrl, MemoryFile::new("first.png", "image/png", vec![1]));
    let second = pick(&mut ctrl, MemoryFile::new("second.png", "image/png", vec![2]));
    let (Selection::Reading(first), Selection::Reading(second)) = (first, second) else {
        panic!("both selections should be reading");
    };

    assert!(ctrl.on_read_complete(Duration::ZERO, second, Ok(vec![2])));
    assert!(!ctrl.on_read_complete(Duration::ZERO, first, Ok(vec![1])));

    let src = ctrl.document().by_id("previewImage").src.clone().unwrap();
    assert_eq!(from_data_url(&src).unwrap().1, vec![2]);
}

#[test]
fn test_reset_abandons_pending_read() {
    let mut ctrl = controller();
    let Selection::Reading(ticket) = pick(&mut ctrl, MemoryFile::new("a.png", "image/png", vec![1]))
    else {
        panic!("selection should be reading");
    };

    ctrl.reset_form();
    assert!(!ctrl.on_read_complete(Duration::ZERO, ticket, Ok(vec![1])));
    assert_prompt_state(&ctrl);
}

// ============================================================================
// Reset
// ============================================================================

#[test]
fn test_reset_is_idempotent() {
    let mut ctrl = controller();
    pick(&mut ctrl, MemoryFile::new("a.png", "image/png", vec![1]));
    ctrl.complete_pending_reads(Duration::ZERO);

    ctrl.reset_form();
    let once = ctrl.document().by_id("preview").clone();
    let area_once = ctrl.document().by_id("uploadArea").clone();
    let input_once = ctrl.document().by_id("fileInput").clone();

    ctrl.reset_form();
    assert_eq!(ctrl.document().by_id("preview"), &once);
    assert_eq!(ctrl.document().by_id("uploadArea"), &area_once);
    assert_eq!(ctrl.document().by_id("fileInput"), &input_once);
    assert_prompt_state(&ctrl);
}

#[test]
fn test_reset_on_fresh_page() {
    let mut ctrl = controller();
    ctrl.reset_form();
    assert_prompt_state(&ctrl);
    assert!(ctrl.document().alerts().is_empty());
}

// ============================================================================
// Submit
// ============================================================================

#[test]
fn test_submit_locks_button() {
    let mut ctrl = controller();
    pick(&mut ctrl, MemoryFile::new("a.png", "image/png", vec![1]));
    ctrl.complete_pending_reads(Duration::ZERO);

    let response = ctrl.handle(UiEvent::Submit);

    // Native submission must go ahead
    assert_eq!(response, EventResponse::PASS);
    let button = ctrl.document().by_id("submitBtn");
    assert!(button.disabled);
    assert_eq!(
        button.inner_html,
        "<span class=\"btn-icon\">⏳</span> Đang phân tích..."
    );
    assert_eq!(button.style("opacity"), "0.7");
    assert_eq!(ctrl.mode(), UiMode::Submitting);
}

#[test]
fn test_no_selection_after_submit() {
    let mut ctrl = controller();
    pick(&mut ctrl, MemoryFile::new("a.png", "image/png", vec![1]));
    ctrl.complete_pending_reads(Duration::ZERO);
    ctrl.handle(UiEvent::Submit);

    let selection = pick(&mut ctrl, MemoryFile::new("b.gif", "image/gif", vec![1]));
    assert_eq!(selection, Selection::Ignored);
    assert!(ctrl.document().alerts().is_empty());

    let response = ctrl.handle(UiEvent::Drop {
        files: Some(vec![MemoryFile::new("c.png", "image/png", vec![1])]),
    });
    assert_eq!(response, EventResponse::CONSUME);
    assert_eq!(ctrl.document().pending_reads(), 0);
    assert_eq!(ctrl.mode(), UiMode::Submitting);
}

// ============================================================================
// Timed effects
// ============================================================================

#[test]
fn test_alerts_dismiss_independently() {
    let (mut ctrl, (first, second)) = controller_with(|doc| (doc.add_alert(), doc.add_alert()));

    ctrl.tick(ms(4999));
    assert_eq!(ctrl.document().element(first).style("opacity"), "");

    ctrl.tick(ms(5000));
    for alert in [first, second] {
        let element = ctrl.document().element(alert);
        assert_eq!(element.style("opacity"), "0");
        assert!(element.is_displayed());
    }

    ctrl.tick(ms(5499));
    assert!(ctrl.document().element(second).is_displayed());

    ctrl.tick(ms(5500));
    for alert in [first, second] {
        assert!(!ctrl.document().element(alert).is_displayed());
    }
    assert_eq!(ctrl.next_deadline(), None);
}

#[test]
fn test_alert_survives_user_activity() {
    let (mut ctrl, alert) = controller_with(|doc| doc.add_alert());

    ctrl.tick(ms(1000));
    pick(&mut ctrl, MemoryFile::new("x.gif", "image/gif", vec![1]));
    ctrl.tick(ms(5500));

    assert!(!ctrl.document().element(alert).is_displayed());
}

#[test]
fn test_probability_bars_grow_back() {
    let (mut ctrl, bars) = controller_with(|doc| {
        vec![
            doc.add_probability_bar("72.5%"),
            doc.add_probability_bar("12%"),
        ]
    });

    ctrl.tick(ms(299));
    assert_eq!(ctrl.document().element(bars[0]).style("width"), "72.5%");

    ctrl.tick(ms(300));
    for bar in &bars {
        assert_eq!(ctrl.document().element(*bar).style("width"), "0");
    }

    ctrl.tick(ms(400));
    assert_eq!(ctrl.document().element(bars[0]).style("width"), "72.5%");
    assert_eq!(ctrl.document().element(bars[1]).style("width"), "12%");
}

#[test]
fn test_no_bars_no_animation() {
    let ctrl = controller();
    assert_eq!(ctrl.next_deadline(), None);
}

#[test]
fn test_custom_timings() {
    let mut config = UploadConfig::default();
    config.timings.alert_fade_delay_ms = 100;
    config.timings.alert_hide_delay_ms = 50;
    let mut doc = MemoryDocument::new();
    let alert = doc.add_alert();
    let mut ctrl = UploadController::initialize(doc, config);

    ctrl.tick(ms(150));
    assert!(!ctrl.document().element(alert).is_displayed());
}
