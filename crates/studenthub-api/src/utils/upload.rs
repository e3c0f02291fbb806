//! Common utilities for file upload handlers

use axum::extract::multipart::{Field, Multipart};
use bytes::Bytes;
use std::collections::HashMap;
use std::str::FromStr;
use studenthub_core::AppError;

/// Longest accepted value for a non-file form field
const MAX_FIELD_LENGTH: usize = 1024;

/// A tool upload: exactly one `file` field plus the operation's text fields
#[derive(Debug)]
pub struct MultipartUpload {
    pub data: Bytes,
    pub filename: String,
    pub content_type: String,
    pub fields: HashMap<String, String>,
}

impl MultipartUpload {
    /// Parse an optional form field
    pub fn field<T: FromStr>(&self, name: &str) -> Result<Option<T>, AppError> {
        parse_field(&self.fields, name)
    }

    /// Parse a form field that must be present
    pub fn required_field<T: FromStr>(&self, name: &str) -> Result<T, AppError> {
        self.field(name)?
            .ok_or_else(|| AppError::InvalidInput(format!("Missing form field '{}'", name)))
    }

    /// Parse a boolean form field, accepting `true/false`, `1/0`, `yes/no` and `on/off`
    pub fn bool_field(&self, name: &str) -> Result<Option<bool>, AppError> {
        self.fields
            .get(name)
            .map(|raw| parse_bool(name, raw))
            .transpose()
    }
}

/// One file of a multi-file upload
#[derive(Debug)]
pub struct UploadedFile {
    pub data: Bytes,
    pub filename: String,
    pub content_type: String,
}

/// A multi-file tool upload: the `files` fields in the order they were sent
#[derive(Debug)]
pub struct MultipartFiles {
    pub files: Vec<UploadedFile>,
    pub fields: HashMap<String, String>,
}

/// Extract every `files` field, in order, plus the other text fields.
/// Reading stops with an error as soon as more than `max_files` files arrive.
pub async fn extract_multipart_files(
    mut multipart: Multipart,
    max_files: usize,
) -> Result<MultipartFiles, AppError> {
    let mut files = Vec::new();
    let mut fields = HashMap::new();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::InvalidInput(format!("Failed to read multipart: {}", e)))?
    {
        let field_name = field.name().map(|s| s.to_string()).unwrap_or_default();

        if field_name == "files" {
            if files.len() == max_files {
                return Err(AppError::InvalidInput(format!(
                    "Too many files; at most {} can be sent at once",
                    max_files
                )));
            }
            let filename = sanitize_filename(field.file_name().unwrap_or("unknown"))?;
            let content_type = field
                .content_type()
                .unwrap_or("application/octet-stream")
                .to_string();
            let data = field
                .bytes()
                .await
                .map_err(|e| AppError::InvalidInput(format!("Failed to read file data: {}", e)))?;

            files.push(UploadedFile {
                data,
                filename,
                content_type,
            });
        } else if !field_name.is_empty() {
            let value = read_text_field(field, &field_name).await?;
            fields.insert(field_name, value);
        }
    }

    Ok(MultipartFiles { files, fields })
}

/// Extract the `file` field and every other text field from a multipart form.
/// Only one field named "file" is accepted; multiple file fields are rejected.
pub async fn extract_multipart_upload(mut multipart: Multipart) -> Result<MultipartUpload, AppError> {
    let mut file_data: Option<Bytes> = None;
    let mut filename: Option<String> = None;
    let mut content_type: Option<String> = None;
    let mut fields = HashMap::new();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::InvalidInput(format!("Failed to read multipart: {}", e)))?
    {
        let field_name = field.name().map(|s| s.to_string()).unwrap_or_default();

        if field_name == "file" {
            if file_data.is_some() {
                return Err(AppError::InvalidInput(
                    "Multiple file fields are not allowed; send exactly one field named 'file'"
                        .to_string(),
                ));
            }
            filename = field.file_name().map(|s: &str| s.to_string());
            content_type = field.content_type().map(|s: &str| s.to_string());

            let data = field
                .bytes()
                .await
                .map_err(|e| AppError::InvalidInput(format!("Failed to read file data: {}", e)))?;

            file_data = Some(data);
        } else if !field_name.is_empty() {
            let value = read_text_field(field, &field_name).await?;
            fields.insert(field_name, value);
        }
    }

    let data = file_data.ok_or_else(|| AppError::InvalidInput("No file provided".to_string()))?;
    let filename = sanitize_filename(filename.as_deref().unwrap_or("unknown"))?;
    let content_type = content_type.unwrap_or_else(|| "application/octet-stream".to_string());

    Ok(MultipartUpload {
        data,
        filename,
        content_type,
        fields,
    })
}

/// Sanitize filename to prevent path traversal and other attacks
pub fn sanitize_filename(filename: &str) -> Result<String, AppError> {
    const MAX_FILENAME_LENGTH: usize = 255;

    let path = std::path::Path::new(filename);
    let filename_only = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or(filename);

    if filename_only.contains("..") {
        return Err(AppError::InvalidInput(
            "Filename contains invalid path traversal".to_string(),
        ));
    }

    let sanitized: String = filename_only
        .chars()
        .take(MAX_FILENAME_LENGTH)
        .map(|c| {
            if c.is_alphanumeric() || c == '.' || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();

    if sanitized.trim().is_empty() || sanitized.len() < 3 {
        return Ok("file".to_string());
    }

    Ok(sanitized)
}

async fn read_text_field(field: Field<'_>, name: &str) -> Result<String, AppError> {
    let value = field
        .text()
        .await
        .map_err(|e| AppError::InvalidInput(format!("Failed to read field '{}': {}", name, e)))?;
    if value.len() > MAX_FIELD_LENGTH {
        return Err(AppError::InvalidInput(format!("Field '{}' is too long", name)));
    }
    Ok(value)
}

fn parse_field<T: FromStr>(
    fields: &HashMap<String, String>,
    name: &str,
) -> Result<Option<T>, AppError> {
    match fields.get(name).map(|v| v.trim()) {
        None | Some("") => Ok(None),
        Some(raw) => raw
            .parse::<T>()
            .map(Some)
            .map_err(|_| AppError::InvalidInput(format!("Invalid value for '{}': {}", name, raw))),
    }
}

fn parse_bool(name: &str, raw: &str) -> Result<bool, AppError> {
    match raw.trim().to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(true),
        "false" | "0" | "no" | "off" => Ok(false),
        _ => Err(AppError::InvalidInput(format!(
            "Invalid value for '{}': expected true or false",
            name
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn upload(fields: &[(&str, &str)]) -> MultipartUpload {
        MultipartUpload {
            data: Bytes::from_static(b"data"),
            filename: "photo.png".to_string(),
            content_type: "image/png".to_string(),
            fields: fields
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        }
    }

    #[test]
    fn test_sanitize_filename() {
        assert_eq!(sanitize_filename("report.pdf").unwrap(), "report.pdf");
        assert_eq!(sanitize_filename("/etc/passwd").unwrap(), "passwd");
        assert_eq!(sanitize_filename("my notes (1).pdf").unwrap(), "my_notes__1_.pdf");
        assert_eq!(sanitize_filename("a").unwrap(), "file");
        assert!(sanitize_filename("..").is_err());
    }

    #[test]
    fn test_numeric_fields() {
        let up = upload(&[("width", " 800 "), ("height", "abc"), ("quality", "")]);
        assert_eq!(up.field::<u32>("width").unwrap(), Some(800));
        assert!(up.field::<u32>("height").is_err());
        assert_eq!(up.field::<u8>("quality").unwrap(), None);
        assert!(up.required_field::<u32>("missing").is_err());
    }

    #[test]
    fn test_bool_fields() {
        let up = upload(&[("a", "true"), ("b", "0"), ("c", "On"), ("d", "maybe")]);
        assert_eq!(up.bool_field("a").unwrap(), Some(true));
        assert_eq!(up.bool_field("b").unwrap(), Some(false));
        assert_eq!(up.bool_field("c").unwrap(), Some(true));
        assert!(up.bool_field("d").is_err());
        assert_eq!(up.bool_field("e").unwrap(), None);
    }
}
