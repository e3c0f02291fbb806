//! Shared key generation for the temp root.
//!
//! Key format: `uploads/{file_id}.{ext}` for inputs and `outputs/{file_id}.{ext}`
//! for produced artifacts.

use uuid::Uuid;

pub const UPLOADS_DIR: &str = "uploads";
pub const OUTPUTS_DIR: &str = "outputs";

/// Generate a fresh key for an uploaded input
pub fn upload_key(extension: &str) -> String {
    generate_key(UPLOADS_DIR, extension)
}

/// Generate a fresh key for a produced output
pub fn output_key(extension: &str) -> String {
    generate_key(OUTPUTS_DIR, extension)
}

fn generate_key(dir: &str, extension: &str) -> String {
    let extension: String = extension
        .trim_start_matches('.')
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .take(10)
        .collect::<String>()
        .to_lowercase();
    let file_id = Uuid::new_v4().simple();

    if extension.is_empty() {
        format!("{}/{}", dir, file_id)
    } else {
        format!("{}/{}.{}", dir, file_id, extension)
    }
}
