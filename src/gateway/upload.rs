//! Multipart upload form

use axum::extract::Multipart;
use bytes::Bytes;

use crate::errors::{GatewayError, Result};

/// Contents of an `operate=upload` form
#[derive(Debug, Default)]
pub struct UploadForm {
    /// Directory prefix, concatenated verbatim with the file name
    pub path: String,
    pub file: Option<UploadedFile>,
}

#[derive(Debug)]
pub struct UploadedFile {
    /// Client supplied file name, directory components removed
    pub file_name: String,
    pub content: Bytes,
}

impl UploadForm {
    /// Read the `file` and `path` fields; other fields are skipped.
    pub async fn read(mut multipart: Multipart) -> Result<Self> {
        let mut form = UploadForm::default();

        while let Some(field) = multipart.next_field().await? {
            let name = field.name().map(str::to_string);
            match name.as_deref() {
                Some("file") => {
                    let file_name = base_name(field.file_name().unwrap_or_default()).to_string();
                    let content = field.bytes().await?;
                    form.file = Some(UploadedFile { file_name, content });
                }
                Some("path") => form.path = field.text().await?,
                _ => {}
            }
        }

        Ok(form)
    }

    /// The uploaded file, or an error naming what is missing
    pub fn into_file(self) -> Result<(String, UploadedFile)> {
        let file = self.file.ok_or_else(|| {
            GatewayError::InvalidRequest("multipart form has no file field".to_string())
        })?;
        if file.file_name.is_empty() {
            return Err(GatewayError::InvalidRequest(
                "uploaded file has no file name".to_string(),
            ));
        }
        Ok((self.path, file))
    }
}

/// Last component of a client path, e.g. `C:\tmp\a.png` becomes `a.png`
fn base_name(file_name: &str) -> &str {
    file_name
        .rsplit(|c| c == '/' || c == '\\')
        .next()
        .unwrap_or_default()
}
