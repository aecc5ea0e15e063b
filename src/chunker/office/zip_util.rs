//! Shared ZIP-entry reading helper for the office container chunkers

use std::io::Read;

use crate::error::ChunkError;

/// Read one named entry from a ZIP archive as a UTF-8 string.
///
/// Returns `ChunkError::ContainerInvalid` if the buffer isn't a valid ZIP
/// archive or the named entry is absent.
pub(crate) fn read_entry(content: &[u8], entry_name: &str) -> Result<String, ChunkError> {
    let reader = std::io::Cursor::new(content);
    let mut archive = zip::ZipArchive::new(reader)
        .map_err(|e| ChunkError::ContainerInvalid(format!("not a valid ZIP archive: {e}")))?;
    let mut file = archive
        .by_name(entry_name)
        .map_err(|_| ChunkError::ContainerInvalid(format!("missing required part: {entry_name}")))?;
    let mut buf = String::new();
    file.read_to_string(&mut buf)
        .map_err(|e| ChunkError::ContainerInvalid(format!("{entry_name} is not valid UTF-8: {e}")))?;
    Ok(buf)
}

/// Read a named entry if present, returning `None` rather than an error
/// when it's missing (used for optional parts like `word/styles.xml`).
pub(crate) fn read_entry_optional(content: &[u8], entry_name: &str) -> Option<String> {
    read_entry(content, entry_name).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_non_zip_input() {
        let err = read_entry(b"not a zip file", "word/document.xml").unwrap_err();
        assert!(matches!(err, ChunkError::ContainerInvalid(_)));
    }
}
