/// Native dry-run of the upload flow.
///
/// Runs each file given on the command line through the upload controller on
/// an in-memory copy of the upload page and reports whether the browser would
/// accept it. The media type is guessed from the file extension, the way
/// browsers fill in `File.type`.
#[cfg(not(target_arch = "wasm32"))]
fn main() -> std::process::ExitCode {
    use std::path::Path;
    use std::process::ExitCode;

    use upload_form::{UiMode, UploadConfig};

    let config = UploadConfig::load_from_default_path().unwrap_or_default();
    env_logger::Builder::new()
        .filter_level(config.log_level.to_level_filter())
        .parse_default_env()
        .init();

    let paths: Vec<String> = std::env::args().skip(1).collect();
    if paths.is_empty() {
        eprintln!("Usage: upload-form-native <image>...");
        return ExitCode::from(2);
    }

    let mut rejected = 0;
    for path in &paths {
        let path = Path::new(path);
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let mime_type = image::ImageFormat::from_path(path)
            .map(|format| format.to_mime_type())
            .unwrap_or("");

        let contents = match std::fs::read(path) {
            Ok(contents) => contents,
            Err(e) => {
                eprintln!("{}: {}", path.display(), e);
                rejected += 1;
                continue;
            }
        };

        let controller = dry_run(&config, name, mime_type, contents);

        let doc = controller.document();
        if let Some(alert) = doc.alerts().first() {
            println!("{}: rejected ({})", path.display(), alert);
            rejected += 1;
        } else if controller.mode() == UiMode::Submitting {
            let src_len = doc
                .by_id(&config.elements.preview_image)
                .src
                .as_ref()
                .map_or(0, String::len);
            println!(
                "{}: accepted as {} ({} byte preview)",
                path.display(),
                mime_type,
                src_len
            );
        }
    }

    if rejected == 0 {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

/// Run one file through a fresh upload page, submitting the form only when
/// the browser would let the user do so.
#[cfg(not(target_arch = "wasm32"))]
fn dry_run(
    config: &upload_form::UploadConfig,
    name: String,
    mime_type: &str,
    contents: Vec<u8>,
) -> upload_form::UploadController<upload_form::MemoryDocument> {
    use std::time::Duration;

    use upload_form::{
        Document, MemoryDocument, MemoryFile, Selection, UiEvent, UiMode, UploadController,
    };

    let mut controller = UploadController::initialize(
        MemoryDocument::upload_page(&config.elements),
        config.clone(),
    );
    let Some(input) = controller
        .document()
        .element_by_id(&config.elements.file_input)
    else {
        return controller;
    };
    let files = controller
        .document_mut()
        .choose_files(input, vec![MemoryFile::new(name, mime_type, contents)]);

    match controller.handle_file_select(&files) {
        Selection::Reading(_) => {
            controller.complete_pending_reads(Duration::ZERO);
            // The submit button is only enabled while a preview is shown
            if controller.mode() == UiMode::Preview {
                controller.handle(UiEvent::Submit);
            }
        }
        // The controller already logged and alerted the rejection
        Selection::Empty | Selection::Ignored | Selection::Rejected(_) => {}
    }
    controller
}

// WASM doesn't use main(), it uses wasm_bindgen's start function
#[cfg(target_arch = "wasm32")]
fn main() {}
