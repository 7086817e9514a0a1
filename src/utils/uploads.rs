use actix_multipart::Multipart;
use futures_util::StreamExt;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::utils::error::CustomError;
use crate::utils::helpers::unique_millis;

/// A file received in a multipart request.
#[derive(Debug, Clone)]
pub struct FileUpload {
    pub file_name: String,
    pub data: Vec<u8>,
    pub content_type: Option<String>,
}

impl FileUpload {
    pub fn new(file_name: String, data: Vec<u8>, content_type: Option<String>) -> Self {
        Self {
            file_name,
            data,
            content_type,
        }
    }

    pub fn size(&self) -> usize {
        self.data.len()
    }

    /// Extension of the original name, reduced to lower-case ASCII alphanumerics, with its dot.
    pub fn extension(&self) -> String {
        let name = Path::new(&self.file_name)
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("");
        let ext: String = match name.rsplit_once('.') {
            Some((stem, ext)) if !stem.is_empty() => ext
                .chars()
                .filter(char::is_ascii_alphanumeric)
                .map(|c| c.to_ascii_lowercase())
                .collect(),
            _ => String::new(),
        };
        if ext.is_empty() {
            ext
        } else {
            format!(".{}", ext)
        }
    }
}

/// Text fields and file parts of a multipart form.
#[derive(Debug, Default)]
pub struct MultipartForm {
    pub fields: HashMap<String, String>,
    pub files: Vec<FileUpload>,
}

impl MultipartForm {
    pub fn field(&self, name: &str) -> Option<String> {
        self.fields.get(name).cloned()
    }
}

/// Drain a multipart payload of at most `max_bytes` across all parts.
///
/// File parts named `files` become uploads in arrival order; parts named `file`
/// are used only when no `files` part carried a file. Other parts become text fields.
pub async fn read_multipart(
    mut payload: Multipart,
    max_bytes: usize,
) -> Result<MultipartForm, CustomError> {
    let mut form = MultipartForm::default();
    let mut single_files = Vec::new();
    let mut total = 0usize;

    while let Some(item) = payload.next().await {
        let mut field = item.map_err(|e| {
            CustomError::BadRequestError(format!("Error reading multipart field: {}", e))
        })?;

        let (field_name, file_name) = match field.content_disposition() {
            Some(cd) => (
                cd.get_name().unwrap_or("").to_string(),
                cd.get_filename().map(|f| f.to_string()),
            ),
            None => continue,
        };
        let content_type = field.content_type().map(|ct| ct.to_string());

        let mut data = Vec::new();
        while let Some(chunk) = field.next().await {
            let chunk = chunk.map_err(|e| {
                CustomError::BadRequestError(format!("Error reading multipart chunk: {}", e))
            })?;
            total += chunk.len();
            if total > max_bytes {
                return Err(CustomError::BadRequestError(format!(
                    "Payload too large (limit {} bytes)",
                    max_bytes
                )));
            }
            data.extend_from_slice(&chunk);
        }

        let is_file_part = field_name == "files" || field_name == "file";
        match file_name {
            Some(file_name) if is_file_part => {
                if file_name.is_empty() || data.is_empty() {
                    continue;
                }
                let upload = FileUpload::new(file_name, data, content_type);
                if field_name == "files" {
                    form.files.push(upload);
                } else {
                    single_files.push(upload);
                }
            }
            _ => {
                form.fields
                    .insert(field_name, String::from_utf8_lossy(&data).into_owned());
            }
        }
    }

    if form.files.is_empty() {
        form.files = single_files;
    }
    Ok(form)
}

/// Stores uploads under the static upload directory.
#[derive(Debug, Clone)]
pub struct UploadService {
    dir: PathBuf,
    url_prefix: String,
}

impl UploadService {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            url_prefix: "/static/uploads".to_string(),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Write one file as `upload-<millis>[-<index>]<ext>` and return its public URL.
    pub fn save(&self, file: &FileUpload, index: Option<usize>) -> Result<String, CustomError> {
        let stamp = unique_millis();
        let file_name = match index {
            Some(i) => format!("upload-{}-{}{}", stamp, i, file.extension()),
            None => format!("upload-{}{}", stamp, file.extension()),
        };

        fs::create_dir_all(&self.dir).map_err(|e| {
            CustomError::InternalServerError(format!("Failed to create upload dir: {}", e))
        })?;
        fs::write(self.dir.join(&file_name), &file.data).map_err(|e| {
            CustomError::InternalServerError(format!("Failed to save upload: {}", e))
        })?;

        log::info!("stored upload {} ({} bytes)", file_name, file.size());
        Ok(format!("{}/{}", self.url_prefix, file_name))
    }

    /// Save every file in order, returning their URLs in the same order.
    pub fn save_all(&self, files: &[FileUpload]) -> Result<Vec<String>, CustomError> {
        files
            .iter()
            .enumerate()
            .map(|(i, file)| self.save(file, Some(i)))
            .collect()
    }
}
