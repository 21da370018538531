// src/image.rs
//! Photos are embedded in entries as `data:` URLs so a record never points at
//! a file that might move or vanish.

use std::fs;
use std::path::Path;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use log;

use crate::error::{ImageError, ImageResult};

const DATA_URL_PREFIX: &str = "data:";
const BASE64_MARKER: &str = ";base64,";

pub fn mime_for_path(path: &Path) -> &'static str {
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase());
    match extension.as_deref() {
        Some("png") => "image/png",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        _ => "application/octet-stream",
    }
}

pub fn encode_data_url(mime: &str, bytes: &[u8]) -> String {
    format!("{}{}{}{}", DATA_URL_PREFIX, mime, BASE64_MARKER, STANDARD.encode(bytes))
}

/// Reads an image file into a self-contained data URL.
pub fn embed_image(path: &Path) -> ImageResult<String> {
    let bytes = fs::read(path).map_err(|e| {
        log::error!("Failed to read image {:?}: {}", path, e);
        ImageError::Io(e)
    })?;
    log::debug!("Embedding {} bytes from {:?}", bytes.len(), path);
    Ok(encode_data_url(mime_for_path(path), &bytes))
}

/// Splits a data URL back into its MIME type and raw bytes.
pub fn decode_image(data_url: &str) -> ImageResult<(String, Vec<u8>)> {
    let rest = data_url
        .strip_prefix(DATA_URL_PREFIX)
        .ok_or_else(|| ImageError::Malformed("missing 'data:' prefix".to_string()))?;
    let (mime, payload) = rest
        .split_once(BASE64_MARKER)
        .ok_or_else(|| ImageError::Malformed("payload is not base64-encoded".to_string()))?;
    let bytes = STANDARD
        .decode(payload.trim())
        .map_err(|e| ImageError::Malformed(format!("bad base64 payload: {}", e)))?;
    Ok((mime.to_string(), bytes))
}

/// Writes an embedded image out to `out`.
pub fn export_image(data_url: &str, out: &Path) -> ImageResult<usize> {
    let (mime, bytes) = decode_image(data_url)?;
    fs::write(out, &bytes).map_err(|e| {
        log::error!("Failed to write image to {:?}: {}", out, e);
        ImageError::Io(e)
    })?;
    log::info!("Exported {} image ({} bytes) to {:?}", mime, bytes.len(), out);
    Ok(bytes.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_mime_from_extension() {
        assert_eq!(mime_for_path(Path::new("a.PNG")), "image/png");
        assert_eq!(mime_for_path(Path::new("a.jpeg")), "image/jpeg");
        assert_eq!(mime_for_path(Path::new("noext")), "application/octet-stream");
    }

    #[test]
    fn test_embed_then_export() {
        let dir = tempdir().unwrap();
        let source = dir.path().join("pizza.jpg");
        fs::write(&source, [0xFF, 0xD8, 0xFF, 0x00, 0x42]).unwrap();

        let data_url = embed_image(&source).unwrap();
        assert!(data_url.starts_with("data:image/jpeg;base64,"));

        let out = dir.path().join("copy.jpg");
        assert_eq!(export_image(&data_url, &out).unwrap(), 5);
        assert_eq!(fs::read(&out).unwrap(), vec![0xFF, 0xD8, 0xFF, 0x00, 0x42]);
    }

    #[test]
    fn test_decode_rejects_malformed_payloads() {
        assert!(matches!(decode_image("http://x/y.png"), Err(ImageError::Malformed(_))));
        assert!(matches!(decode_image("data:image/png,abc"), Err(ImageError::Malformed(_))));
        assert!(matches!(
            decode_image("data:image/png;base64,!!!"),
            Err(ImageError::Malformed(_))
        ));
    }

    #[test]
    fn test_embed_missing_file() {
        assert!(matches!(
            embed_image(Path::new("definitely/not/here.png")),
            Err(ImageError::Io(_))
        ));
    }
}
