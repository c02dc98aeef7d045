//! Upload handling: multipart form draining and durable image storage.
//!
//! Files land under the upload root with a receipt-timestamp name that
//! preserves the original extension, and are served back from the fixed
//! `/uploads` static prefix.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use axum::extract::Multipart;
use tokio::fs;

use crate::error::AppResult;
use crate::models::Image;

/// Restaurant create/update accepts at most this many image files.
pub const MAX_RESTAURANT_IMAGES: usize = 5;
/// A review carries at most one image.
pub const MAX_REVIEW_IMAGES: usize = 1;

pub const URL_PREFIX: &str = "/uploads";

#[derive(Clone, Debug)]
pub struct UploadStore {
    root: PathBuf,
}

impl UploadStore {
    pub fn new(root: PathBuf) -> UploadStore {
        UploadStore { root }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Persists one uploaded file and returns its (url, filename) reference.
    pub async fn save(&self, original_name: &str, data: &[u8]) -> AppResult<Image> {
        fs::create_dir_all(&self.root).await?;
        let filename = stamped_name(original_name);
        fs::write(self.root.join(&filename), data).await?;
        Ok(Image { url: format!("{URL_PREFIX}/{filename}"), filename })
    }
}

/// Collision-resistant name: receipt timestamp in nanoseconds, original
/// extension kept so the browser still gets a sensible content type.
fn stamped_name(original: &str) -> String {
    let ext = Path::new(original)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| format!(".{e}"))
        .unwrap_or_default();
    let stamp = time::OffsetDateTime::now_utc().unix_timestamp_nanos();
    format!("{stamp}{ext}")
}

/// Drains a multipart form into its text fields and stored images. File
/// parts beyond `max_files` are ignored, matching the upload caps above.
pub async fn collect_form(
    store: &UploadStore,
    mut multipart: Multipart,
    max_files: usize,
) -> AppResult<(HashMap<String, String>, Vec<Image>)> {
    let mut fields = HashMap::new();
    let mut images = Vec::new();

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().unwrap_or_default().to_owned();
        match field.file_name().map(str::to_owned) {
            Some(file_name) if !file_name.is_empty() => {
                let data = field.bytes().await?;
                if !data.is_empty() && images.len() < max_files {
                    images.push(store.save(&file_name, &data).await?);
                }
            }
            // A file input left empty still submits a nameless file part.
            Some(_) => {}
            None => {
                fields.insert(name, field.text().await?);
            }
        }
    }

    Ok((fields, images))
}

/// A trimmed, non-empty text field from a drained form.
pub fn text_field<'a>(fields: &'a HashMap<String, String>, key: &str) -> Option<&'a str> {
    fields.get(key).map(|s| s.trim()).filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn scratch_store() -> UploadStore {
        let root = std::env::temp_dir().join(format!("tastetable-test-{}", Uuid::now_v7()));
        UploadStore::new(root)
    }

    #[test]
    fn stamped_name_preserves_extension() {
        assert!(stamped_name("photo.PNG").ends_with(".PNG"));
        assert!(stamped_name("dinner.jpeg").ends_with(".jpeg"));
        let bare = stamped_name("noext");
        assert!(bare.chars().all(|c| c.is_ascii_digit()));
    }

    #[tokio::test]
    async fn saved_file_round_trips() {
        let store = scratch_store();
        let image = store.save("dish.jpg", b"not really a jpeg").await.unwrap();

        assert!(image.url.starts_with("/uploads/"));
        assert!(image.filename.ends_with(".jpg"));
        assert_eq!(image.url, format!("/uploads/{}", image.filename));

        let bytes = tokio::fs::read(store.root().join(&image.filename)).await.unwrap();
        assert_eq!(bytes, b"not really a jpeg");

        tokio::fs::remove_dir_all(store.root()).await.unwrap();
    }

    #[tokio::test]
    async fn two_saves_get_distinct_names() {
        let store = scratch_store();
        let a = store.save("a.png", b"a").await.unwrap();
        let b = store.save("a.png", b"b").await.unwrap();
        assert_ne!(a.filename, b.filename);
        tokio::fs::remove_dir_all(store.root()).await.unwrap();
    }
}
