//! Text extraction from uploaded files.
//!
//! Only plain-text formats are handled here; rich formats (PDF, Word)
//! belong to external extractors. Crucially, a format this module cannot
//! handle is a typed [`ExtractionError::UnsupportedFormat`], never a
//! human-readable placeholder string: placeholder prose would flow into
//! retrieval and generation as if it were real document content.

use thiserror::Error;
use tracing::debug;

/// File extensions accepted as plain text.
const TEXT_EXTENSIONS: [&str; 2] = ["txt", "md"];

/// Errors raised while extracting text from uploaded bytes.
#[derive(Debug, Error)]
pub enum ExtractionError {
    /// The file extension names a format this core cannot parse.
    #[error("unsupported file type '.{extension}': upload .txt or .md, or convert the file")]
    UnsupportedFormat {
        /// The offending extension (lowercased, without the dot).
        extension: String,
    },

    /// The filename carries no extension to dispatch on.
    #[error("cannot determine file type of '{filename}' (no extension)")]
    MissingExtension {
        /// The filename as uploaded.
        filename: String,
    },

    /// The bytes decoded to nothing usable.
    #[error("document '{filename}' contains no usable text")]
    EmptyContent {
        /// The filename as uploaded.
        filename: String,
    },
}

/// Extract text content from uploaded bytes, dispatching on the file
/// extension.
///
/// `.txt`/`.md` decode as UTF-8, falling back to lossy decoding for
/// legacy encodings (replacement characters beat rejecting the upload).
/// Everything else is an [`ExtractionError::UnsupportedFormat`].
pub fn extract_text(raw: &[u8], filename: &str) -> Result<String, ExtractionError> {
    let extension = filename
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .ok_or_else(|| ExtractionError::MissingExtension {
            filename: filename.to_string(),
        })?;

    if !TEXT_EXTENSIONS.contains(&extension.as_str()) {
        return Err(ExtractionError::UnsupportedFormat { extension });
    }

    let content = match std::str::from_utf8(raw) {
        Ok(text) => text.to_string(),
        Err(_) => {
            debug!(filename, "file is not valid UTF-8; decoding lossily");
            String::from_utf8_lossy(raw).into_owned()
        }
    };

    if content.trim().is_empty() {
        return Err(ExtractionError::EmptyContent {
            filename: filename.to_string(),
        });
    }
    Ok(content)
}
