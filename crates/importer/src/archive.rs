use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tokio::fs;
use tracing::debug;

use crate::class::GpClass;
use crate::traits::ArchiveStore;
use crate::{ImporterError, Result};

pub const HTML_PREFIX: &str = "html_responses";
pub const MANIFEST: &str = "manifest.json";

/// `html_responses/MOTO2/2024-05-06/`
pub fn class_prefix(class: GpClass, date: NaiveDate) -> String {
    format!("{HTML_PREFIX}/{}/{}/", class.as_str(), date.format("%Y-%m-%d"))
}

/// Key of the `index`-th rider page fetched for a class on `date`.
pub fn rider_page_key(class: GpClass, date: NaiveDate, index: usize) -> String {
    format!("{}rider_{index}.html", class_prefix(class, date))
}

pub fn manifest_key(class: GpClass, date: NaiveDate) -> String {
    format!("{}{MANIFEST}", class_prefix(class, date))
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArchivedPage {
    pub key: String,
    pub url: String,
}

/// Index of one class's archived pages, written last by an extract run.
/// A load run reads it to know which pages exist and which were missed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Manifest {
    pub class: GpClass,
    pub date: NaiveDate,
    pub run_id: String,
    pub pages: Vec<ArchivedPage>,
    pub missing_urls: Vec<String>,
}

/// Archive backed by a local directory; keys map to relative paths.
#[derive(Debug, Clone)]
pub struct FsArchive {
    root: PathBuf,
}

impl FsArchive {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, key: &str) -> Result<PathBuf> {
        let trimmed = key.trim_matches('/');
        if trimmed.is_empty() || trimmed.split('/').any(|part| part.is_empty() || part == "..") {
            return Err(ImporterError::ImportError(format!(
                "Invalid archive key: '{key}'"
            )));
        }
        Ok(self.root.join(trimmed))
    }
}

#[async_trait::async_trait]
impl ArchiveStore for FsArchive {
    async fn put(&self, key: &str, bytes: &[u8]) -> Result<()> {
        let path = self.path_for(key)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }
        fs::write(&path, bytes).await?;
        debug!(key, bytes = bytes.len(), "archived");
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Vec<u8>> {
        let path = self.path_for(key)?;
        Ok(fs::read(&path).await?)
    }

    async fn list(&self, prefix: &str) -> Result<Vec<String>> {
        let prefix = prefix.trim_start_matches('/');
        let dir = match prefix.rsplit_once('/') {
            Some((dir, _)) if !dir.is_empty() => self.path_for(dir)?,
            _ => self.root.clone(),
        };

        let mut keys = Vec::new();
        let mut pending = vec![dir];
        while let Some(dir) = pending.pop() {
            let mut entries = match fs::read_dir(&dir).await {
                Ok(entries) => entries,
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => continue,
                Err(e) => return Err(e.into()),
            };
            while let Some(entry) = entries.next_entry().await? {
                let path = entry.path();
                if entry.file_type().await?.is_dir() {
                    pending.push(path);
                    continue;
                }
                let Ok(relative) = path.strip_prefix(&self.root) else {
                    continue;
                };
                let key = relative
                    .components()
                    .map(|c| c.as_os_str().to_string_lossy())
                    .collect::<Vec<_>>()
                    .join("/");
                if key.starts_with(prefix) {
                    keys.push(key);
                }
            }
        }

        keys.sort();
        Ok(keys)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, 6).unwrap()
    }

    #[test]
    fn test_key_layout() {
        assert_eq!(
            rider_page_key(GpClass::Moto2, date(), 3),
            "html_responses/MOTO2/2024-05-06/rider_3.html"
        );
        assert_eq!(
            manifest_key(GpClass::MotoGp, date()),
            "html_responses/MOTOGP/2024-05-06/manifest.json"
        );
    }

    #[tokio::test]
    async fn test_put_get_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let archive = FsArchive::new(dir.path());
        let key = rider_page_key(GpClass::Moto3, date(), 0);

        archive.put(&key, b"<html>rider</html>").await.unwrap();
        assert_eq!(archive.get(&key).await.unwrap(), b"<html>rider</html>");

        archive.put(&key, b"<html>again</html>").await.unwrap();
        assert_eq!(archive.get(&key).await.unwrap(), b"<html>again</html>");
    }

    #[tokio::test]
    async fn test_list_by_prefix_is_sorted_and_scoped() {
        let dir = tempfile::tempdir().unwrap();
        let archive = FsArchive::new(dir.path());
        for i in [2, 0, 1] {
            archive
                .put(&rider_page_key(GpClass::MotoE, date(), i), b"x")
                .await
                .unwrap();
        }
        archive
            .put(&rider_page_key(GpClass::MotoGp, date(), 0), b"x")
            .await
            .unwrap();

        let keys = archive.list(&class_prefix(GpClass::MotoE, date())).await.unwrap();
        assert_eq!(
            keys,
            vec![
                "html_responses/MOTOE/2024-05-06/rider_0.html",
                "html_responses/MOTOE/2024-05-06/rider_1.html",
                "html_responses/MOTOE/2024-05-06/rider_2.html",
            ]
        );

        let all = archive.list(HTML_PREFIX).await.unwrap();
        assert_eq!(all.len(), 4);
    }

    #[tokio::test]
    async fn test_list_missing_prefix_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let archive = FsArchive::new(dir.path());
        assert!(archive.list("html_responses/MOTO2/").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_rejects_escaping_keys() {
        let dir = tempfile::tempdir().unwrap();
        let archive = FsArchive::new(dir.path());
        assert!(archive.put("../outside.html", b"x").await.is_err());
        assert!(archive.put("a//b", b"x").await.is_err());
        assert!(archive.get("").await.is_err());
    }

    #[tokio::test]
    async fn test_get_missing_key_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let archive = FsArchive::new(dir.path());
        let err = archive.get("html_responses/none.html").await.unwrap_err();
        assert!(matches!(err, ImporterError::IoError(_)));
    }
}
