//! Input resolution: turn a user-supplied path or URL into image bytes.
//!
//! Each input is resolved inside its own pipeline iteration and dropped once
//! the page is committed. URL downloads land in a `TempDir` owned by the
//! returned [`ResolvedInput`], so the temporary file is removed at the end of
//! that iteration rather than accumulating across the batch.

use crate::error::Img2PdfError;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use tracing::{debug, info};

/// One image to place on its own page.
#[derive(Debug, Clone)]
pub struct InputImage {
    /// Display name (file name, path or URL). Used in errors and logs.
    pub name: String,
    /// Declared MIME type, e.g. `image/png`. Used when the bytes alone do
    /// not identify the format.
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

impl InputImage {
    pub fn new(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            content_type: None,
            bytes,
        }
    }

    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }
}

/// The resolved input — either a local path or a downloaded temp file.
pub enum ResolvedInput {
    /// Input was already a local file.
    Local(PathBuf),
    /// Input was a URL; bytes downloaded to a temp directory.
    /// The `TempDir` is kept alive until the iteration drops this value.
    Downloaded {
        path: PathBuf,
        content_type: Option<String>,
        _temp_dir: TempDir,
    },
}

impl ResolvedInput {
    /// Get the path to the image file regardless of how it was resolved.
    pub fn path(&self) -> &Path {
        match self {
            ResolvedInput::Local(p) => p,
            ResolvedInput::Downloaded { path, .. } => path,
        }
    }

    /// Read the file into an [`InputImage`] labelled with `name`.
    pub async fn load(&self, name: &str) -> Result<InputImage, Img2PdfError> {
        let path = self.path();
        let bytes = tokio::fs::read(path)
            .await
            .map_err(|e| Img2PdfError::from_read_error(path, &e))?;

        let content_type = match self {
            ResolvedInput::Downloaded { content_type, .. } => content_type.clone(),
            ResolvedInput::Local(p) => mime_from_extension(p).map(str::to_string),
        };

        Ok(InputImage {
            name: name.to_string(),
            content_type,
            bytes,
        })
    }
}

/// Check if the input string looks like a URL.
pub fn is_url(input: &str) -> bool {
    input.starts_with("http://") || input.starts_with("https://")
}

/// Resolve the input string to a local image file.
///
/// If the input is a URL, download it to a temporary directory.
/// If the input is a local file, validate it exists and is readable.
pub async fn resolve_input(input: &str, timeout_secs: u64) -> Result<ResolvedInput, Img2PdfError> {
    if input.trim().is_empty() {
        return Err(Img2PdfError::InvalidInput {
            input: input.to_string(),
        });
    }
    if is_url(input) {
        download_url(input, timeout_secs).await
    } else {
        resolve_local(input)
    }
}

/// Resolve a local file path, validating existence and read access.
fn resolve_local(path_str: &str) -> Result<ResolvedInput, Img2PdfError> {
    let path = PathBuf::from(path_str);

    if !path.exists() {
        return Err(Img2PdfError::FileNotFound { path });
    }
    if path.is_dir() {
        return Err(Img2PdfError::InvalidInput {
            input: path_str.to_string(),
        });
    }

    if let Err(e) = std::fs::File::open(&path) {
        return Err(Img2PdfError::from_read_error(&path, &e));
    }

    debug!("Resolved local image: {}", path.display());
    Ok(ResolvedInput::Local(path))
}

/// Download a URL to a temporary directory and return the path.
async fn download_url(url: &str, timeout_secs: u64) -> Result<ResolvedInput, Img2PdfError> {
    info!("Downloading image from: {}", url);

    let client = reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(timeout_secs))
        .build()
        .map_err(|e| Img2PdfError::DownloadFailed {
            url: url.to_string(),
            reason: e.to_string(),
        })?;

    let response = client.get(url).send().await.map_err(|e| {
        if e.is_timeout() {
            Img2PdfError::DownloadTimeout {
                url: url.to_string(),
                secs: timeout_secs,
            }
        } else {
            Img2PdfError::DownloadFailed {
                url: url.to_string(),
                reason: e.to_string(),
            }
        }
    })?;

    if !response.status().is_success() {
        return Err(Img2PdfError::DownloadFailed {
            url: url.to_string(),
            reason: format!("HTTP {}", response.status()),
        });
    }

    let content_type = response
        .headers()
        .get(reqwest::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.split(';').next().unwrap_or(v).trim().to_string());

    let filename = extract_filename(url);

    let temp_dir = TempDir::new().map_err(|e| Img2PdfError::Internal(e.to_string()))?;
    let file_path = temp_dir.path().join(&filename);

    let bytes = response
        .bytes()
        .await
        .map_err(|e| Img2PdfError::DownloadFailed {
            url: url.to_string(),
            reason: e.to_string(),
        })?;

    tokio::fs::write(&file_path, &bytes)
        .await
        .map_err(|e| Img2PdfError::Internal(format!("Failed to write temp file: {}", e)))?;

    info!("Downloaded {} bytes to: {}", bytes.len(), file_path.display());

    Ok(ResolvedInput::Downloaded {
        path: file_path,
        content_type,
        _temp_dir: temp_dir,
    })
}

/// Extract a reasonable filename from the URL path.
fn extract_filename(url: &str) -> String {
    if let Ok(parsed) = reqwest::Url::parse(url) {
        if let Some(mut segments) = parsed.path_segments() {
            if let Some(last) = segments.next_back() {
                if !last.is_empty() && last.contains('.') {
                    return last.to_string();
                }
            }
        }
    }

    "downloaded.img".to_string()
}

/// MIME type implied by a file extension, for the formats we decode.
pub fn mime_from_extension(path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    match ext.as_str() {
        "png" => Some("image/png"),
        "jpg" | "jpeg" | "jfif" => Some("image/jpeg"),
        "gif" => Some("image/gif"),
        "bmp" => Some("image/bmp"),
        "webp" => Some("image/webp"),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_url() {
        assert!(is_url("https://example.com/cat.png"));
        assert!(is_url("http://example.com/cat.png"));
        assert!(!is_url("/tmp/cat.png"));
        assert!(!is_url("cat.png"));
        assert!(!is_url(""));
    }

    #[test]
    fn filename_from_url_path() {
        assert_eq!(extract_filename("https://example.com/a/b/cat.png"), "cat.png");
        assert_eq!(extract_filename("https://example.com/a/b/"), "downloaded.img");
        assert_eq!(extract_filename("not a url"), "downloaded.img");
    }

    #[test]
    fn mime_guessing_is_case_insensitive() {
        assert_eq!(mime_from_extension(Path::new("x.PNG")), Some("image/png"));
        assert_eq!(mime_from_extension(Path::new("x.jpeg")), Some("image/jpeg"));
        assert_eq!(mime_from_extension(Path::new("x.tiff")), None);
        assert_eq!(mime_from_extension(Path::new("noext")), None);
    }

    #[tokio::test]
    async fn missing_file_is_reported() {
        let err = resolve_input("/definitely/not/here.png", 5)
            .await
            .err()
            .expect("should fail");
        assert!(matches!(err, Img2PdfError::FileNotFound { .. }));
    }

    #[tokio::test]
    async fn empty_input_is_invalid() {
        let err = resolve_input("  ", 5).await.err().expect("should fail");
        assert!(matches!(err, Img2PdfError::InvalidInput { .. }));
    }

    #[tokio::test]
    async fn local_file_loads_with_guessed_type() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pixel.png");
        std::fs::write(&path, b"not really a png").unwrap();

        let resolved = resolve_input(path.to_str().unwrap(), 5).await.unwrap();
        let input = resolved.load("pixel.png").await.unwrap();
        assert_eq!(input.content_type.as_deref(), Some("image/png"));
        assert_eq!(input.bytes, b"not really a png");
    }
}
