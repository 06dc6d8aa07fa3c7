//! 광고 이미지 파일 저장소
//!
//! 저장 시 고유 키를 만들어 반환하고, 응답에서는 `public_url` 로 접근 URL 을 만든다.

// region:    --- Imports
use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use std::path::{Component, Path, PathBuf};
use tokio::fs;
use tracing::debug;

// endregion: --- Imports

// region:    --- File Storage Trait
#[async_trait]
pub trait FileStorage: Send + Sync {
    /// 바이트를 저장하고 저장 키를 반환
    async fn save(&self, filename: &str, data: &[u8]) -> Result<String>;

    /// 저장된 파일 삭제. 이미 없으면 성공으로 취급
    async fn delete(&self, key: &str) -> Result<()>;

    /// 저장 키의 공개 URL
    fn public_url(&self, key: &str) -> String;
}

// endregion: --- File Storage Trait

// region:    --- Local File Storage
pub struct LocalFileStorage {
    root: PathBuf,
    base_url: String,
}

impl LocalFileStorage {
    pub fn new(root: impl Into<PathBuf>, base_url: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// ads/2024/05/1a2b3c4d_photo.jpg 형태의 키 생성
    fn generate_key(filename: &str) -> String {
        let now = Utc::now();
        let unique = uuid::Uuid::new_v4().simple().to_string();
        format!(
            "ads/{}/{}_{}",
            now.format("%Y/%m"),
            &unique[..8],
            sanitize_filename(filename)
        )
    }

    fn resolve(&self, key: &str) -> Result<PathBuf> {
        let path = Path::new(key);
        for component in path.components() {
            if !matches!(component, Component::Normal(_)) {
                bail!("invalid storage key: {key}");
            }
        }
        Ok(self.root.join(path))
    }
}

#[async_trait]
impl FileStorage for LocalFileStorage {
    async fn save(&self, filename: &str, data: &[u8]) -> Result<String> {
        let key = Self::generate_key(filename);
        let path = self.resolve(&key)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .await
                .context("failed to create media directories")?;
        }
        fs::write(&path, data)
            .await
            .context("failed to write media file")?;
        debug!("{:<12} --> 파일 저장: {} ({} bytes)", "Media", key, data.len());
        Ok(key)
    }

    async fn delete(&self, key: &str) -> Result<()> {
        let path = self.resolve(key)?;
        match fs::remove_file(&path).await {
            Ok(()) => {
                debug!("{:<12} --> 파일 삭제: {}", "Media", key);
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e).context("failed to delete media file"),
        }
    }

    fn public_url(&self, key: &str) -> String {
        format!("{}/{}", self.base_url, key)
    }
}

/// 파일명에서 경로 구분자와 특수문자 제거
pub fn sanitize_filename(filename: &str) -> String {
    let name = filename
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or_default();
    let cleaned: String = name
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '.' || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();
    let cleaned = cleaned.trim_start_matches('.').to_string();
    if cleaned.is_empty() {
        "upload".to_string()
    } else {
        cleaned
    }
}

// endregion: --- Local File Storage

// region:    --- Tests
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sanitize_strips_paths_and_odd_characters() {
        assert_eq!(sanitize_filename("../../etc/passwd"), "passwd");
        assert_eq!(sanitize_filename("C:\\photos\\my bike.jpg"), "my_bike.jpg");
        assert_eq!(sanitize_filename(".hidden"), "hidden");
        assert_eq!(sanitize_filename(""), "upload");
    }

    #[test]
    fn public_url_joins_prefix_and_key() {
        let storage = LocalFileStorage::new("/tmp/x", "/media/");
        assert_eq!(
            storage.public_url("ads/2024/01/abc_bike.jpg"),
            "/media/ads/2024/01/abc_bike.jpg"
        );
    }

    #[tokio::test]
    async fn save_then_delete_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let storage = LocalFileStorage::new(dir.path(), "/media");

        let key = storage.save("bike.jpg", b"jpeg-bytes").await.unwrap();
        assert!(key.starts_with("ads/"));
        assert!(key.ends_with("_bike.jpg"));

        let on_disk = std::fs::read(dir.path().join(&key)).unwrap();
        assert_eq!(on_disk, b"jpeg-bytes");

        storage.delete(&key).await.unwrap();
        assert!(!dir.path().join(&key).exists());
        // 두 번째 삭제도 성공
        storage.delete(&key).await.unwrap();
    }

    #[tokio::test]
    async fn traversal_keys_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let storage = LocalFileStorage::new(dir.path(), "/media");
        assert!(storage.delete("../outside.jpg").await.is_err());
        assert!(storage.delete("/etc/passwd").await.is_err());
    }
}
// endregion: --- Tests
