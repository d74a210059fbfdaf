//! PNG export of documents.
//!
//! Documents are rendered at 100% zoom into an offscreen Cairo surface of
//! `canvas * pixel_ratio` device pixels. The selection decoration and any
//! in-progress gesture are never part of an export.

use crate::config::ExportConfig;
use crate::document::{Document, Workspace};
use crate::draw::{FontDescriptor, ImageCache, PrimitiveKind, Scene, ViewTransform, render_scene};
use crate::util::expand_tilde;
use chrono::{
    Local,
    format::{Item, StrftimeItems},
};
use log::{debug, info, warn};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("nothing to export: '{0}' is empty")]
    EmptyDocument(String),

    #[error("failed to create export surface: {0}")]
    Surface(#[from] cairo::Error),

    #[error("failed to encode PNG: {0}")]
    Encode(#[from] cairo::IoError),

    #[error("failed to write export: {0}")]
    Io(#[from] std::io::Error),
}

/// Renders `doc` to PNG bytes.
///
/// Every image the document references is decoded first so the export never
/// contains placeholders.
pub fn render_document_png(
    doc: &Document,
    cache: &mut ImageCache,
    font: &FontDescriptor,
    pixel_ratio: f64,
) -> Result<Vec<u8>, ExportError> {
    let view = ViewTransform::new(1.0, pixel_ratio);
    let (canvas_width, canvas_height) = doc.canvas_size();
    let (width, height) = view.device_size(canvas_width, canvas_height);

    cache.preload(doc.background().into_iter().chain(
        doc.primitives().iter().filter_map(|p| match &p.kind {
            PrimitiveKind::Image { payload, .. } => Some(payload),
            _ => None,
        }),
    ));

    let surface = cairo::ImageSurface::create(cairo::Format::ARgb32, width, height)?;
    {
        let ctx = cairo::Context::new(&surface)?;
        let scene = Scene {
            background: doc.background(),
            canvas_width,
            canvas_height,
            primitives: doc.primitives(),
            active: None,
            selected: None,
            font,
        };
        render_scene(&ctx, &scene, &view, cache);
    }
    surface.flush();

    let mut bytes = Vec::new();
    surface.write_to_png(&mut bytes)?;
    debug!(
        "Rendered '{}' at {}x{} ({} bytes)",
        doc.title(),
        width,
        height,
        bytes.len()
    );
    Ok(bytes)
}

/// Builds a `.png` file name from `template`.
///
/// `{title}` expands to the document title with path separators replaced;
/// the rest goes through chrono formatting. An invalid format string is used
/// literally.
pub fn generate_filename(template: &str, title: &str) -> String {
    let safe_title: String = title
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '\0' => '_',
            '%' => '_',
            c => c,
        })
        .collect();
    let expanded = template.replace("{title}", &safe_title);

    let items: Vec<Item<'_>> = StrftimeItems::new(&expanded).collect();
    let stem = if items.iter().any(|item| matches!(item, Item::Error)) {
        warn!("Invalid filename template '{}', using it verbatim", template);
        expanded.clone()
    } else {
        Local::now().format_with_items(items.into_iter()).to_string()
    };
    format!("{}.png", stem)
}

/// Ensure the save directory exists, creating it if necessary.
pub fn ensure_directory_exists(directory: &Path) -> Result<PathBuf, ExportError> {
    if !directory.exists() {
        info!("Creating export directory: {}", directory.display());
        fs::create_dir_all(directory)?;
    }
    Ok(directory.to_path_buf())
}

/// Renders `doc` and writes it into the configured directory.
///
/// Returns the written path.
pub fn save_document(
    doc: &Document,
    cache: &mut ImageCache,
    font: &FontDescriptor,
    config: &ExportConfig,
) -> Result<PathBuf, ExportError> {
    if doc.is_empty() {
        return Err(ExportError::EmptyDocument(doc.title().to_string()));
    }

    let directory = ensure_directory_exists(&expand_tilde(&config.save_directory))?;
    let bytes = render_document_png(doc, cache, font, config.pixel_ratio)?;
    let path = unique_path(&directory, &generate_filename(&config.filename_template, doc.title()));

    fs::write(&path, &bytes)?;
    info!("Exported '{}' to {}", doc.title(), path.display());
    Ok(path)
}

/// Saves every non-empty document, one after another.
///
/// Documents are rendered sequentially with `batch_delay_ms` between
/// saves. A failing document is reported in its slot and does not stop the
/// batch.
pub async fn save_all(
    workspace: &Workspace,
    cache: &mut ImageCache,
    font: &FontDescriptor,
    config: &ExportConfig,
) -> Vec<Result<PathBuf, ExportError>> {
    let delay = Duration::from_millis(config.batch_delay_ms);
    let mut results = Vec::new();

    for doc in workspace.documents().iter().filter(|doc| !doc.is_empty()) {
        if !results.is_empty() && !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        let result = save_document(doc, cache, font, config);
        if let Err(err) = &result {
            warn!("Export of '{}' failed: {}", doc.title(), err);
        }
        results.push(result);
    }

    info!(
        "Batch export finished: {} of {} document(s) saved",
        results.iter().filter(|r| r.is_ok()).count(),
        results.len()
    );
    results
}

/// `dir/name`, or `dir/stem-N.png` when that file already exists.
fn unique_path(directory: &Path, file_name: &str) -> PathBuf {
    let candidate = directory.join(file_name);
    if !candidate.exists() {
        return candidate;
    }
    let stem = file_name.strip_suffix(".png").unwrap_or(file_name);
    let mut counter = 1u32;
    loop {
        let candidate = directory.join(format!("{}-{}.png", stem, counter));
        if !candidate.exists() {
            return candidate;
        }
        counter += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::Edit;
    use crate::draw::raster::tests::solid_png;
    use crate::draw::{ImagePayload, Primitive, RED};
    use crate::util::Rect;

    fn filled_rect_doc() -> Document {
        let mut doc = Document::new("Image_001", 40, 30);
        doc.apply_and_commit(Edit::Insert(Primitive::new(
            PrimitiveKind::Pixelate {
                bounds: Rect::new(0.0, 0.0, 10.0, 10.0),
                style: Default::default(),
            },
            RED,
            4.0,
        )));
        doc
    }

    fn export_config(dir: &Path) -> ExportConfig {
        ExportConfig {
            save_directory: dir.to_string_lossy().into_owned(),
            filename_template: "{title}".into(),
            batch_delay_ms: 5,
            pixel_ratio: 1.0,
        }
    }

    #[test]
    fn filename_expands_title_and_date() {
        let name = generate_filename("{title}_%Y", "Image_001");
        assert!(name.starts_with("Image_001_"));
        assert!(name.ends_with(".png"));
        assert_eq!(name.len(), "Image_001_2026.png".len());

        assert_eq!(generate_filename("{title}", "a/b"), "a_b.png");
        assert_eq!(generate_filename("shot_%Q", "x"), "shot_%Q.png");
    }

    #[test]
    fn png_has_device_size() {
        let mut doc = Document::new("bg", 10, 10);
        doc.set_background(ImagePayload::new(solid_png(30, 20, [0, 0, 255, 255])), 30, 20);
        let mut cache = ImageCache::new();

        let bytes =
            render_document_png(&doc, &mut cache, &FontDescriptor::default(), 2.0).unwrap();
        let decoded = image::load_from_memory(&bytes).unwrap().to_rgba8();
        assert_eq!(decoded.dimensions(), (60, 40));
        assert_eq!(decoded.get_pixel(30, 20).0, [0, 0, 255, 255]);
    }

    #[test]
    fn empty_documents_are_not_saved() {
        let temp = tempfile::tempdir().unwrap();
        let doc = Document::new("Image_001", 40, 30);
        let result = save_document(
            &doc,
            &mut ImageCache::new(),
            &FontDescriptor::default(),
            &export_config(temp.path()),
        );
        assert!(matches!(result, Err(ExportError::EmptyDocument(_))));
    }

    #[tokio::test]
    async fn save_all_writes_each_document() {
        let temp = tempfile::tempdir().unwrap();
        let config = export_config(temp.path());

        let mut workspace = Workspace::new(40, 30);
        workspace
            .active_mut()
            .apply_and_commit(Edit::Insert(filled_rect_doc().primitives()[0].clone()));
        workspace.new_document();
        workspace.new_document();
        workspace
            .active_mut()
            .apply_and_commit(Edit::Insert(filled_rect_doc().primitives()[0].clone()));

        let mut cache = ImageCache::new();
        let results = save_all(&workspace, &mut cache, &FontDescriptor::default(), &config).await;

        // The blank middle tab is skipped.
        assert_eq!(results.len(), 2);
        let paths: Vec<_> = results.into_iter().map(|r| r.unwrap()).collect();
        assert_eq!(paths[0], temp.path().join("Image_001.png"));
        assert_eq!(paths[1], temp.path().join("Image_003.png"));
        assert!(paths.iter().all(|p| p.exists()));
    }

    #[test]
    fn existing_files_are_not_overwritten() {
        let temp = tempfile::tempdir().unwrap();
        let config = export_config(temp.path());
        let doc = filled_rect_doc();
        let mut cache = ImageCache::new();
        let font = FontDescriptor::default();

        let first = save_document(&doc, &mut cache, &font, &config).unwrap();
        let second = save_document(&doc, &mut cache, &font, &config).unwrap();
        assert_ne!(first, second);
        assert_eq!(second, temp.path().join("Image_001-1.png"));
    }
}
