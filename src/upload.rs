//! `multipart/form-data` handling shared by the photo, logo and CIE-10
//! upload endpoints.

use actix_multipart::Multipart;
use actix_web::web;
use anyhow::{anyhow, bail, Context};
use futures::{StreamExt, TryStreamExt};
use std::{collections::HashMap, path::Path};

pub const UPLOAD_SUBDIR: &str = "uploads";
pub const IMAGE_EXTENSIONS: [&str; 4] = ["png", "jpg", "jpeg", "gif"];
pub const FAVICON_EXTENSIONS: [&str; 5] = ["png", "jpg", "jpeg", "gif", "ico"];
/// Sanitised names are cut to this length, keeping the extension.
pub const MAX_FILENAME_LEN: usize = 100;
const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

pub struct UploadedFile {
    pub filename: String,
    pub bytes: Vec<u8>,
}

#[derive(Default)]
pub struct MultipartForm {
    fields: HashMap<String, String>,
    files: HashMap<String, UploadedFile>,
}

impl MultipartForm {
    /// Reads the whole payload; parts with a filename are files, the rest text.
    pub async fn read(mut payload: Multipart) -> anyhow::Result<Self> {
        let mut form = Self::default();

        while let Some(mut field) = payload
            .try_next()
            .await
            .map_err(|e| anyhow!("Invalid form data: {}", e))?
        {
            let disposition = field
                .content_disposition()
                .ok_or_else(|| anyhow!("Invalid form data"))?;
            let name = match disposition.get_name() {
                Some(name) => name.to_string(),
                None => continue,
            };
            let filename = disposition.get_filename().map(|s| s.to_string());

            let mut bytes = Vec::new();
            while let Some(chunk) = field.next().await {
                let chunk = chunk.map_err(|e| anyhow!("Invalid form data: {}", e))?;
                if bytes.len() + chunk.len() > MAX_UPLOAD_BYTES {
                    bail!("Uploaded file is too large");
                }
                bytes.extend_from_slice(&chunk);
            }

            match filename {
                Some(filename) => {
                    form.files.insert(name, UploadedFile { filename, bytes });
                }
                None => {
                    let value = String::from_utf8(bytes).context("Invalid form data")?;
                    form.fields.insert(name, value);
                }
            }
        }

        Ok(form)
    }

    pub fn field(&self, name: &str) -> Option<String> {
        crate::utils::non_blank(self.fields.get(name).cloned())
    }

    /// File inputs left empty by the browser are treated as absent.
    pub fn take_file(&mut self, name: &str) -> Option<UploadedFile> {
        self.files
            .remove(name)
            .filter(|f| !f.filename.trim().is_empty() && !f.bytes.is_empty())
    }
}

/// Lower-cased extension with its dot, if it is one of `allowed`.
pub fn checked_extension(filename: &str, allowed: &[&str]) -> anyhow::Result<String> {
    let ext = Path::new(filename)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase());
    match ext {
        Some(ext) if allowed.contains(&ext.as_str()) => Ok(format!(".{}", ext)),
        _ => bail!("File type not allowed, use {}", allowed.join(", ")),
    }
}

pub fn image_extension(filename: &str) -> anyhow::Result<String> {
    checked_extension(filename, &IMAGE_EXTENSIONS)
}

/// Keeps only the final path component and characters safe in a URL.
pub fn secure_filename(filename: &str) -> String {
    let base = filename.rsplit(|c| c == '/' || c == '\\').next().unwrap_or("");
    let cleaned: String = base
        .trim()
        .chars()
        .map(|c| if c.is_whitespace() { '_' } else { c })
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'))
        .collect();
    let cleaned = cleaned.trim_start_matches('.');
    if cleaned.len() <= MAX_FILENAME_LEN {
        return cleaned.to_string();
    }
    // only ASCII is left, so byte offsets are char boundaries
    match cleaned.rfind('.') {
        Some(dot) if cleaned.len() - dot <= 10 => {
            let ext = &cleaned[dot..];
            format!("{}{}", &cleaned[..MAX_FILENAME_LEN - ext.len()], ext)
        }
        _ => cleaned[..MAX_FILENAME_LEN].to_string(),
    }
}

/// Writes `bytes` to `<static_dir>/uploads/<name>` and returns the path
/// relative to the static root.
pub async fn save_upload(static_dir: &str, name: String, bytes: Vec<u8>) -> anyhow::Result<String> {
    let dir = Path::new(static_dir).join(UPLOAD_SUBDIR);
    let relative = format!("{}/{}", UPLOAD_SUBDIR, name);
    let path = dir.join(&name);

    web::block(move || {
        std::fs::create_dir_all(&dir)?;
        std::fs::write(&path, bytes)
    })
    .await
    .map_err(|e| anyhow!("Could not store upload: {}", e))?;

    log::info!("stored upload {}", relative);
    Ok(relative)
}

/// Removes a file stored by `save_upload`; failures are only logged.
pub async fn remove_upload(static_dir: &str, relative: &str) {
    let path = Path::new(static_dir).join(relative);
    let shown = relative.to_string();
    if let Err(e) = web::block(move || std::fs::remove_file(path)).await {
        log::warn!("could not remove upload {}: {}", shown, e);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepted_image_extensions() {
        assert_eq!(image_extension("me.PNG").unwrap(), ".png");
        assert_eq!(image_extension("photo.jpeg").unwrap(), ".jpeg");
        assert!(image_extension("notes.pdf").is_err());
        assert!(image_extension("no_extension").is_err());
        assert!(image_extension("icon.ico").is_err());
        assert_eq!(checked_extension("icon.ICO", &FAVICON_EXTENSIONS).unwrap(), ".ico");
        assert!(checked_extension("page.html", &FAVICON_EXTENSIONS).is_err());
        assert!(checked_extension("drawing.svg", &FAVICON_EXTENSIONS).is_err());
    }

    #[test]
    fn long_names_are_cut_keeping_extension() {
        let long = format!("{}.png", "a".repeat(300));
        let name = secure_filename(&long);
        assert_eq!(name.len(), MAX_FILENAME_LEN);
        assert!(name.ends_with(".png"));

        let no_ext = "b".repeat(150);
        assert_eq!(secure_filename(&no_ext).len(), MAX_FILENAME_LEN);
    }

    #[test]
    fn filenames_are_sanitized() {
        assert_eq!(secure_filename("../../etc/passwd"), "passwd");
        assert_eq!(secure_filename("C:\\logo final.png"), "logo_final.png");
        assert_eq!(secure_filename(".hidden"), "hidden");
        assert_eq!(secure_filename("logó.png"), "log.png");
    }
}
