use anyhow::{Result, anyhow};
use std::path::Path;

/// The only MIME type the upload endpoint accepts
pub const PDF_MIME_TYPE: &str = "application/pdf";

/// Longest stored name component, leaving room for the timestamp prefix
const MAX_FILENAME_BYTES: usize = 240;

#[derive(Debug, Clone)]
pub struct ValidationError {
    pub code: &'static str,
    pub message: String,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}

impl std::error::Error for ValidationError {}

/// Returns true when the content type is `application/pdf`,
/// ignoring parameters and letter case.
pub fn is_pdf_mime_type(content_type: &str) -> bool {
    content_type
        .trim()
        .parse::<mime::Mime>()
        .is_ok_and(|m| m.essence_str().eq_ignore_ascii_case(mime::APPLICATION_PDF.essence_str()))
}

/// Validates a declared content type against the PDF-only rule.
/// A missing content type is rejected the same way as a wrong one.
pub fn validate_pdf_mime_type(content_type: Option<&str>) -> Result<()> {
    match content_type {
        Some(ct) if is_pdf_mime_type(ct) => Ok(()),
        other => Err(anyhow!(ValidationError {
            code: "INVALID_MIME_TYPE",
            message: format!(
                "MIME type '{}' is not allowed. Only PDF files are permitted.",
                other.unwrap_or("<none>")
            ),
        })),
    }
}

/// Checks a local path the way the drop zone filters dropped files:
/// the extension must be `.pdf` in any case.
pub fn has_pdf_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("pdf"))
}

/// Name used when the client sends no usable file name
pub const FALLBACK_FILENAME: &str = "unnamed";

/// Sanitizes filename to prevent path traversal and injection attacks.
/// Never fails: a name with nothing left after stripping becomes [`FALLBACK_FILENAME`].
pub fn sanitize_filename(filename: &str) -> String {
    // Browsers on Windows may send the full client path
    let last = filename.rsplit(['/', '\\']).next().unwrap_or("");
    let name = Path::new(last)
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("");

    if filename.contains("..") || filename.contains('/') || filename.contains('\\') {
        tracing::warn!("Path components stripped from upload name: {}", filename);
    }

    if name.is_empty() {
        return FALLBACK_FILENAME.to_string();
    }

    let sanitized: String = name
        .chars()
        .map(|c| {
            if c.is_control()
                || c == ':'
                || c == '*'
                || c == '?'
                || c == '"'
                || c == '<'
                || c == '>'
                || c == '|'
                || c == ';'
            {
                '_'
            } else {
                c
            }
        })
        .collect();

    shorten_keeping_extension(sanitized)
}

fn truncate_on_char_boundary(s: &str, max: usize) -> &str {
    if s.len() <= max {
        return s;
    }
    let mut end = max;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    &s[..end]
}

/// Cuts the stem so the whole name fits in [`MAX_FILENAME_BYTES`] and the extension survives
fn shorten_keeping_extension(name: String) -> String {
    if name.len() <= MAX_FILENAME_BYTES {
        return name;
    }
    match name.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() && ext.len() + 1 < MAX_FILENAME_BYTES => {
            let stem = truncate_on_char_boundary(stem, MAX_FILENAME_BYTES - ext.len() - 1);
            format!("{}.{}", stem, ext)
        }
        _ => truncate_on_char_boundary(&name, MAX_FILENAME_BYTES).to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pdf_mime_type() {
        assert!(is_pdf_mime_type("application/pdf"));
        assert!(is_pdf_mime_type("Application/PDF"));
        assert!(is_pdf_mime_type("application/pdf; charset=binary"));
        assert!(!is_pdf_mime_type("application/octet-stream"));
        assert!(!is_pdf_mime_type("text/plain"));
        assert!(!is_pdf_mime_type(""));
    }

    #[test]
    fn test_validate_pdf_mime_type_rejects_missing() {
        assert!(validate_pdf_mime_type(Some("application/pdf")).is_ok());
        let err = validate_pdf_mime_type(None).unwrap_err();
        let validation = err.downcast_ref::<ValidationError>().unwrap();
        assert_eq!(validation.code, "INVALID_MIME_TYPE");
    }

    #[test]
    fn test_pdf_extension() {
        assert!(has_pdf_extension(Path::new("statement.pdf")));
        assert!(has_pdf_extension(Path::new("/tmp/MARCH.PDF")));
        assert!(!has_pdf_extension(Path::new("statement.pdf.exe")));
        assert!(!has_pdf_extension(Path::new("statement")));
    }

    #[test]
    fn test_sanitize_filename() {
        assert_eq!(sanitize_filename("statement.pdf"), "statement.pdf");
        assert_eq!(sanitize_filename("../../etc/statement.pdf"), "statement.pdf");
        assert_eq!(sanitize_filename("C:\\Users\\me\\jan.pdf"), "jan.pdf");
        assert_eq!(sanitize_filename("a|b?.pdf"), "a_b_.pdf");
        assert_eq!(
            sanitize_filename("March 2024 statement.pdf"),
            "March 2024 statement.pdf"
        );
    }

    #[test]
    fn test_sanitize_filename_keeps_leading_dot() {
        assert_eq!(sanitize_filename(".statement.pdf"), ".statement.pdf");
        assert_eq!(sanitize_filename("..pdf"), "..pdf");
    }

    #[test]
    fn test_sanitize_filename_falls_back_when_nothing_is_left() {
        assert_eq!(sanitize_filename(""), FALLBACK_FILENAME);
        assert_eq!(sanitize_filename("uploads/"), FALLBACK_FILENAME);
        assert_eq!(sanitize_filename(".."), FALLBACK_FILENAME);
    }

    #[test]
    fn test_sanitize_filename_truncates_on_char_boundary() {
        let long = format!("{}.pdf", "é".repeat(200));
        let sanitized = sanitize_filename(&long);
        assert!(sanitized.len() <= MAX_FILENAME_BYTES);
        assert!(sanitized.ends_with(".pdf"));
        assert!(sanitized.starts_with("éé"));
    }

    #[test]
    fn test_long_name_keeps_pdf_extension() {
        let long = format!("{}.pdf", "a".repeat(300));
        let sanitized = sanitize_filename(&long);
        assert_eq!(sanitized.len(), MAX_FILENAME_BYTES);
        assert_eq!(sanitized, format!("{}.pdf", "a".repeat(MAX_FILENAME_BYTES - 4)));
    }

    #[test]
    fn test_long_name_without_extension_is_cut() {
        let long = "b".repeat(300);
        assert_eq!(sanitize_filename(&long).len(), MAX_FILENAME_BYTES);
    }
}
