//! Upload bundle module
//!
//! The four files posted downstream, read from disk once per request.

use std::path::Path;

use reqwest::multipart::{Form, Part};
use tokio::fs;

use super::ForwardError;
use crate::http::mime;

/// One named part of the outbound multipart body
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UploadPart {
    /// Form field name
    pub field: &'static str,
    /// File name on disk and in the part's `Content-Disposition`
    pub file_name: &'static str,
    pub content_type: &'static str,
}

/// Parts in the order they are read and sent
pub const UPLOAD_PARTS: [UploadPart; 4] = [
    UploadPart {
        field: "audio",
        file_name: "audio.mp3",
        content_type: mime::AUDIO_MPEG,
    },
    UploadPart {
        field: "image1",
        file_name: "image1.jpg",
        content_type: mime::IMAGE_JPEG,
    },
    UploadPart {
        field: "image2",
        file_name: "image2.jpg",
        content_type: mime::IMAGE_JPEG,
    },
    UploadPart {
        field: "image3",
        file_name: "image3.jpg",
        content_type: mime::IMAGE_JPEG,
    },
];

/// All four parts with their contents loaded
#[derive(Debug)]
pub struct UploadBundle {
    parts: Vec<(UploadPart, Vec<u8>)>,
}

impl UploadBundle {
    /// Read every part from `files_dir`
    ///
    /// Stops at the first file that cannot be read; nothing read so far is kept.
    pub async fn load(files_dir: &Path) -> Result<Self, ForwardError> {
        let mut parts = Vec::with_capacity(UPLOAD_PARTS.len());

        for part in UPLOAD_PARTS {
            let path = files_dir.join(part.file_name);
            let content = fs::read(&path)
                .await
                .map_err(|source| ForwardError::ReadFile { path, source })?;
            parts.push((part, content));
        }

        Ok(Self { parts })
    }

    /// Total payload size, excluding multipart framing
    pub fn total_bytes(&self) -> usize {
        self.parts.iter().map(|(_, content)| content.len()).sum()
    }

    /// Consume the bundle into a `multipart/form-data` body
    pub fn into_form(self) -> Result<Form, ForwardError> {
        self.parts
            .into_iter()
            .try_fold(Form::new(), |form, (part, content)| {
                let body = Part::bytes(content)
                    .file_name(part.file_name)
                    .mime_str(part.content_type)
                    .map_err(|source| ForwardError::InvalidPart {
                        field: part.field,
                        source,
                    })?;
                Ok(form.part(part.field, body))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_files(dir: &Path, skip: Option<&str>) {
        for part in UPLOAD_PARTS {
            if Some(part.file_name) == skip {
                continue;
            }
            std::fs::write(dir.join(part.file_name), part.field.as_bytes()).unwrap();
        }
    }

    #[test]
    fn test_part_layout() {
        let fields: Vec<_> = UPLOAD_PARTS.iter().map(|p| p.field).collect();
        assert_eq!(fields, ["audio", "image1", "image2", "image3"]);
        assert_eq!(UPLOAD_PARTS[0].content_type, "audio/mpeg");
        assert!(UPLOAD_PARTS[1..]
            .iter()
            .all(|p| p.content_type == "image/jpeg"));
    }

    #[tokio::test]
    async fn test_load_all_parts() {
        let dir = tempfile::tempdir().unwrap();
        write_files(dir.path(), None);

        let bundle = UploadBundle::load(dir.path()).await.unwrap();
        // "audio" + "image1" + "image2" + "image3"
        assert_eq!(bundle.total_bytes(), 5 + 6 * 3);
        assert!(bundle.into_form().is_ok());
    }

    #[tokio::test]
    async fn test_missing_file_names_path() {
        let dir = tempfile::tempdir().unwrap();
        write_files(dir.path(), Some("image2.jpg"));

        let err = UploadBundle::load(dir.path()).await.unwrap_err();
        let expected = dir.path().join("image2.jpg");
        assert!(matches!(&err, ForwardError::ReadFile { path, .. } if *path == expected));
        assert!(err.to_string().contains(&expected.display().to_string()));
    }
}
