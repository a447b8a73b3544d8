//! Result assembly: name the PNG, register its object URL, build the result.

use crate::object_url::ObjectUrlStore;
use crate::output::{BinaryArtifact, ConversionResult, ImageFile};
use crate::surface::PNG_MIME;
use tracing::debug;

/// Message reported when the surface produced no encodable artifact.
pub const BLOB_FAILURE: &str = "Failed to create image blob";

const PDF_SUFFIX: &str = ".pdf";

/// `report.PDF` → `report.png`; names without a trailing `.pdf` just gain
/// `.png`. Only a single, final extension is replaced.
pub fn png_file_name(pdf_name: &str) -> String {
    let stem = strip_pdf_suffix(pdf_name);
    format!("{stem}.png")
}

fn strip_pdf_suffix(name: &str) -> &str {
    let Some(split) = name.len().checked_sub(PDF_SUFFIX.len()) else {
        return name;
    };
    if !name.is_char_boundary(split) {
        return name;
    }
    let (stem, ext) = name.split_at(split);
    if ext.eq_ignore_ascii_case(PDF_SUFFIX) {
        stem
    } else {
        name
    }
}

/// Build the final result for `pdf_name` from an encoded artifact.
///
/// `None` means encoding failed and becomes a [`BLOB_FAILURE`] result.
pub fn assemble(
    pdf_name: &str,
    artifact: Option<BinaryArtifact>,
    urls: &ObjectUrlStore,
) -> ConversionResult {
    let Some(artifact) = artifact else {
        return ConversionResult::failure(BLOB_FAILURE);
    };

    let file = ImageFile::new(png_file_name(pdf_name), PNG_MIME, artifact.clone());
    let image_url = urls.create(artifact);
    debug!("Assembled {} ({} bytes) at {}", file.name, file.size(), image_url);
    ConversionResult::success(image_url, file)
}
