use base64::{engine::general_purpose, Engine as _};
use image::ImageFormat;
use serde::Serialize;

pub const OCTET_STREAM: &str = "application/octet-stream";

/// The image the user picked. Only the name and type are exposed in state dumps.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SelectedFile {
    pub name: String,
    pub mime: String,
    #[serde(skip)]
    pub bytes: Vec<u8>,
}

impl SelectedFile {
    /// Falls back to sniffing the bytes when the browser sent no useful type.
    pub fn new(name: impl Into<String>, bytes: Vec<u8>, declared_mime: Option<&str>) -> Self {
        let mime = match declared_mime {
            Some(mime) if !mime.is_empty() && mime != OCTET_STREAM => mime.to_string(),
            _ => sniff_mime(&bytes).unwrap_or(OCTET_STREAM).to_string(),
        };
        Self {
            name: name.into(),
            mime,
            bytes,
        }
    }
}

pub fn sniff_mime(bytes: &[u8]) -> Option<&'static str> {
    let mime = match image::guess_format(bytes).ok()? {
        ImageFormat::Png => "image/png",
        ImageFormat::Jpeg => "image/jpeg",
        ImageFormat::Gif => "image/gif",
        ImageFormat::WebP => "image/webp",
        ImageFormat::Bmp => "image/bmp",
        ImageFormat::Tiff => "image/tiff",
        ImageFormat::Ico => "image/x-icon",
        _ => return None,
    };
    Some(mime)
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Preview {
    pub file_name: String,
    #[serde(skip)]
    pub data_uri: String,
}

impl Preview {
    pub fn from_file(file: &SelectedFile) -> Self {
        let payload = general_purpose::STANDARD.encode(&file.bytes);
        Self {
            file_name: file.name.clone(),
            data_uri: format!("data:{};base64,{}", file.mime, payload),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PNG_MAGIC: &[u8] = &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 0, 0, 0, 0];

    #[test]
    fn test_declared_mime_is_kept() {
        let file = SelectedFile::new("a.jpg", vec![1, 2, 3], Some("image/jpeg"));
        assert_eq!(file.mime, "image/jpeg");
    }

    #[test]
    fn test_mime_is_sniffed_when_missing() {
        let file = SelectedFile::new("upload", PNG_MAGIC.to_vec(), None);
        assert_eq!(file.mime, "image/png");

        let file = SelectedFile::new("upload", PNG_MAGIC.to_vec(), Some(OCTET_STREAM));
        assert_eq!(file.mime, "image/png");
    }

    #[test]
    fn test_unknown_bytes_fall_back_to_octet_stream() {
        let file = SelectedFile::new("notes.txt", b"hello".to_vec(), None);
        assert_eq!(file.mime, OCTET_STREAM);
    }

    #[test]
    fn test_preview_is_data_uri_of_file_bytes() {
        let file = SelectedFile::new("cat.png", b"meow".to_vec(), Some("image/png"));
        let preview = Preview::from_file(&file);
        assert_eq!(preview.data_uri, "data:image/png;base64,bWVvdw==");
        assert_eq!(preview.file_name, "cat.png");
    }
}
