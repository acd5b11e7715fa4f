use tracing::warn;

/// Extracts plain text from PDF bytes. Best effort: a document the parser
/// cannot handle yields an empty string, never an error. Callers treat empty
/// text the same as a missing document.
pub fn extract_text(bytes: &[u8]) -> String {
    match pdf_extract::extract_text_from_mem(bytes) {
        Ok(text) => text,
        Err(e) => {
            warn!("PDF text extraction failed: {e}");
            String::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_garbage_bytes_yield_empty_text() {
        assert_eq!(extract_text(b"not a pdf at all"), "");
        assert_eq!(extract_text(&[]), "");
    }
}
