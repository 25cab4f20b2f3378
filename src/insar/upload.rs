//! Product upload to object storage
//!
//! The store client is constructed by the caller and passed in; nothing
//! here holds a global connection.

use crate::types::{InsarError, InsarResult};
use std::path::Path;

/// Minimal object store surface needed to publish products
pub trait ObjectStore {
    fn upload_file(&self, path: &Path, bucket: &str, key: &str, content_type: &str) -> InsarResult<()>;

    fn put_object_tagging(&self, bucket: &str, key: &str, tags: &[(String, String)]) -> InsarResult<()>;
}

/// MIME type from a file extension, `application/octet-stream` when unknown
pub fn content_type(file_name: &str) -> &'static str {
    let extension = Path::new(file_name)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());
    match extension.as_deref() {
        Some("zip") => "application/zip",
        Some("png") => "image/png",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("tif") | Some("tiff") => "image/tiff",
        Some("xml") => "application/xml",
        Some("txt") | Some("md") => "text/plain",
        Some("json") | Some("geojson") => "application/json",
        Some("kml") => "application/vnd.google-earth.kml+xml",
        _ => "application/octet-stream",
    }
}

/// Object key for a file: `prefix/basename`, or just the basename without prefix
pub fn object_key(path: &Path, prefix: &str) -> InsarResult<String> {
    let name = path
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| InsarError::Upload(format!("no file name in {}", path.display())))?;
    let prefix = prefix.trim_end_matches('/');
    if prefix.is_empty() {
        Ok(name.to_string())
    } else {
        Ok(format!("{}/{}", prefix, name))
    }
}

/// Upload `path` to `bucket` under `prefix` and tag it with its `file_type`
pub fn upload_file<S: ObjectStore + ?Sized>(
    store: &S,
    path: &Path,
    file_type: &str,
    bucket: &str,
    prefix: &str,
) -> InsarResult<String> {
    let key = object_key(path, prefix)?;
    log::info!("Uploading s3://{}/{}", bucket, key);
    store.upload_file(path, bucket, &key, content_type(&key))?;
    store.put_object_tagging(bucket, &key, &[("file_type".to_string(), file_type.to_string())])?;
    Ok(key)
}
