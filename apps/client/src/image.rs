use std::path::Path;

use base64::{engine::general_purpose::STANDARD, Engine as _};

use crate::error::{ClientError, Result};

/// A file picked by the user, held in memory until it is uploaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageFile {
    pub name: String,
    pub media_type: String,
    pub bytes: Vec<u8>,
}

impl ImageFile {
    pub fn new(name: impl Into<String>, media_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            media_type: media_type.into(),
            bytes,
        }
    }

    /// Read a file from disk, inferring its media type from the extension.
    pub async fn load(path: &Path) -> Result<Self> {
        let bytes = tokio::fs::read(path).await.map_err(|source| ClientError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "upload".to_string());

        Ok(Self::new(name, media_type_for(path), bytes))
    }

    pub fn is_image(&self) -> bool {
        self.media_type.starts_with("image/")
    }

    /// Base64 of the raw bytes, the form images are stored in.
    pub fn encoded(&self) -> String {
        STANDARD.encode(&self.bytes)
    }

    /// `data:` URL for showing the file before upload.
    pub fn preview(&self) -> String {
        format!("data:{};base64,{}", self.media_type, self.encoded())
    }
}

fn media_type_for(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .map(|ext| ext.to_string_lossy().to_lowercase())
        .unwrap_or_default();

    match ext.as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "bmp" => "image/bmp",
        "txt" => "text/plain",
        "json" => "application/json",
        _ => "application/octet-stream",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn media_type_from_extension() {
        assert_eq!(media_type_for(Path::new("look.JPG")), "image/jpeg");
        assert_eq!(media_type_for(Path::new("notes.txt")), "text/plain");
        assert_eq!(media_type_for(Path::new("noext")), "application/octet-stream");
    }

    #[test]
    fn image_detection_uses_media_type() {
        assert!(ImageFile::new("a.png", "image/png", vec![]).is_image());
        assert!(!ImageFile::new("a.txt", "text/plain", vec![]).is_image());
    }

    #[test]
    fn preview_is_a_data_url() {
        let file = ImageFile::new("a.png", "image/png", b"hi".to_vec());
        assert_eq!(file.encoded(), "aGk=");
        assert_eq!(file.preview(), "data:image/png;base64,aGk=");
    }

    #[tokio::test]
    async fn missing_file_reports_path() {
        let err = ImageFile::load(Path::new("/definitely/not/here.png"))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("/definitely/not/here.png"));
    }
}
