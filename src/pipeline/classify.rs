//! Failure classification: any pipeline error → one user-facing message.
//!
//! Every message starts with `Failed to convert PDF: `. Errors whose text
//! names both an API version and a Worker version are engine/library
//! mismatches and get a dedicated diagnostic after that prefix; everything
//! else keeps its own message.

use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt::Display;

static RE_API_VERSION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"API version\s+"?([^"\s]+)"?"#).unwrap());
static RE_WORKER_VERSION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"Worker version\s+"?([^"\s]+)"?"#).unwrap());

/// True when `message` reports an engine API/Worker version mismatch.
pub fn is_version_mismatch(message: &str) -> bool {
    message.contains("API version") && message.contains("Worker version")
}

/// The user-facing message for a failed conversion.
pub fn classify(error: &impl Display) -> String {
    let message = error.to_string();
    if is_version_mismatch(&message) {
        mismatch_message(&message)
    } else {
        format!("Failed to convert PDF: {message}")
    }
}

fn mismatch_message(message: &str) -> String {
    let api = capture(&RE_API_VERSION, message);
    let worker = capture(&RE_WORKER_VERSION, message);
    let detail = match (api, worker) {
        (Some(api), Some(worker)) => {
            format!(" The bindings expect PDFium {api} but the loaded library is {worker}.")
        }
        _ => String::new(),
    };
    format!(
        "Failed to convert PDF: PDF engine version mismatch.{detail} Align the versions \
         (point PDFIUM_LIB_PATH at a matching release) or unset PDF2IMG_ENGINE_VERSION so \
         the pinned engine can load, then try again."
    )
}

fn capture<'a>(re: &Regex, message: &'a str) -> Option<&'a str> {
    re.captures(message)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().trim_end_matches(['.', ',']))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Pdf2ImgError;

    #[test]
    fn version_mismatch_gets_dedicated_diagnostic() {
        let e = Pdf2ImgError::VersionMismatch {
            api: "7690".into(),
            worker: "6996".into(),
        };
        let msg = classify(&e);
        assert!(
            msg.starts_with("Failed to convert PDF: PDF engine version mismatch."),
            "got: {msg}"
        );
        assert!(msg.contains("7690") && msg.contains("6996"), "got: {msg}");
        assert!(!msg.contains("API version"), "raw error leaked: {msg}");
    }

    #[test]
    fn mismatch_is_recognised_from_foreign_text() {
        let msg = classify(&"The API version 3.11.174 does not match the Worker version 4.0.379.");
        assert!(msg.starts_with("Failed to convert PDF: PDF engine version mismatch."));
        assert!(msg.contains("3.11.174"), "got: {msg}");
        assert!(msg.contains("4.0.379"), "got: {msg}");
    }

    #[test]
    fn one_token_alone_is_generic() {
        let msg = classify(&"API version unavailable");
        assert_eq!(msg, "Failed to convert PDF: API version unavailable");
    }

    #[test]
    fn other_errors_are_prefixed() {
        let e = Pdf2ImgError::CorruptPdf("bad xref".into());
        assert_eq!(
            classify(&e),
            "Failed to convert PDF: Invalid PDF structure: bad xref"
        );
    }
}
