use std::path::Path;

use crate::domain::DomainError;

/// File types accepted by the upload endpoint.
pub fn is_supported(filename: &str) -> bool {
    matches!(extension_of(filename).as_deref(), Some("pdf") | Some("txt"))
}

pub fn content_type_of(filename: &str) -> &'static str {
    match extension_of(filename).as_deref() {
        Some("pdf") => "application/pdf",
        _ => "text/plain",
    }
}

fn extension_of(filename: &str) -> Option<String> {
    Path::new(filename)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
}

/// Extracts plain text from an uploaded file on disk. PDF extraction is
/// CPU-bound and runs on the blocking pool.
pub async fn extract_text(path: &Path) -> Result<String, DomainError> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());

    match extension.as_deref() {
        Some("pdf") => {
            let path = path.to_owned();
            tokio::task::spawn_blocking(move || pdf_extract::extract_text(&path))
                .await
                .map_err(|e| DomainError::internal(e.to_string()))?
                .map_err(|e| DomainError::validation(format!("could not extract PDF text: {e}")))
        }
        _ => tokio::fs::read_to_string(path)
            .await
            .map_err(|e| DomainError::validation(format!("could not read file as UTF-8: {e}"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_supported_extensions() {
        assert!(is_supported("manual.pdf"));
        assert!(is_supported("NOTES.TXT"));
        assert!(!is_supported("slides.pptx"));
        assert!(!is_supported("no_extension"));
    }

    #[test]
    fn test_content_type_mapping() {
        assert_eq!(content_type_of("a.pdf"), "application/pdf");
        assert_eq!(content_type_of("a.txt"), "text/plain");
    }

    #[tokio::test]
    async fn test_extract_plain_text_file() {
        let path = std::env::temp_dir().join(format!("{}.txt", uuid::Uuid::new_v4()));
        std::fs::write(&path, "plain contents").unwrap();

        let text = extract_text(&path).await.unwrap();
        assert_eq!(text, "plain contents");

        std::fs::remove_file(&path).ok();
    }

    #[tokio::test]
    async fn test_extract_missing_file_is_validation_error() {
        let path = std::env::temp_dir().join(format!("{}.txt", uuid::Uuid::new_v4()));
        let err = extract_text(&path).await.unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }
}
