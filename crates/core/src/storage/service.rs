//! Report image storage implementation using Apache OpenDAL.

use chrono::Utc;
use opendal::{Operator, services};
use rand::Rng;
use rand::distr::Alphanumeric;

use super::config::{StorageConfig, StorageProvider};
use super::error::StorageError;

/// Key prefix for report images.
const KEY_PREFIX: &str = "reports";

/// Length of the random part of a key.
const KEY_RANDOM_LEN: usize = 12;

/// A stored report image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredImage {
    /// Storage key.
    pub key: String,
    /// Public URL to reference from the handover.
    pub url: String,
    /// Size in bytes.
    pub size: u64,
}

/// Object storage for handover report images.
pub struct ReportImageStore {
    operator: Operator,
    config: StorageConfig,
}

impl ReportImageStore {
    /// Create a new store from configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage provider cannot be initialized.
    pub fn from_config(config: StorageConfig) -> Result<Self, StorageError> {
        let operator = Self::create_operator(&config.provider)?;
        Ok(Self { operator, config })
    }

    /// Create OpenDAL operator from provider config.
    fn create_operator(provider: &StorageProvider) -> Result<Operator, StorageError> {
        let operator = match provider {
            StorageProvider::S3 {
                endpoint,
                bucket,
                access_key_id,
                secret_access_key,
                region,
            } => {
                let builder = services::S3::default()
                    .endpoint(endpoint)
                    .bucket(bucket)
                    .access_key_id(access_key_id)
                    .secret_access_key(secret_access_key)
                    .region(region);
                Operator::new(builder).map(|b| b.finish())
            }
            StorageProvider::LocalFs { root } => {
                let root = root
                    .to_str()
                    .ok_or_else(|| StorageError::Configuration("invalid path".to_string()))?;
                Operator::new(services::Fs::default().root(root)).map(|b| b.finish())
            }
        };

        operator.map_err(|e| StorageError::Configuration(e.to_string()))
    }

    /// Validate an upload against the configured limits.
    ///
    /// # Errors
    ///
    /// Returns an error if the file is empty, too large, or not an image.
    pub fn validate_upload(&self, content_type: &str, size: u64) -> Result<(), StorageError> {
        if size == 0 {
            return Err(StorageError::EmptyFile);
        }

        if size > self.config.max_file_size {
            return Err(StorageError::FileTooLarge {
                size,
                max: self.config.max_file_size,
            });
        }

        if !self.config.is_mime_type_allowed(content_type) {
            return Err(StorageError::InvalidMimeType {
                mime_type: content_type.to_string(),
            });
        }

        Ok(())
    }

    /// Upload a report image and return its public URL.
    ///
    /// # Errors
    ///
    /// Returns a validation error, or `StorageError::Operation` if the write
    /// fails.
    pub async fn upload(
        &self,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<StoredImage, StorageError> {
        let size = bytes.len() as u64;
        self.validate_upload(content_type, size)?;

        let key = generate_key(content_type, &mut rand::rng());
        self.operator
            .write_with(&key, bytes)
            .content_type(content_type)
            .await?;

        Ok(StoredImage {
            url: self.public_url(&key),
            key,
            size,
        })
    }

    /// Public URL of a stored key.
    #[must_use]
    pub fn public_url(&self, key: &str) -> String {
        format!("{}/{key}", self.config.public_base_url.trim_end_matches('/'))
    }

    /// Get the storage provider name.
    #[must_use]
    pub const fn provider_name(&self) -> &'static str {
        self.config.provider.name()
    }
}

/// Builds `reports/<random>_<timestamp>.<ext>`, the extension following the
/// validated content type.
fn generate_key<R: Rng + ?Sized>(content_type: &str, rng: &mut R) -> String {
    let random: String = (0..KEY_RANDOM_LEN)
        .map(|_| char::from(rng.sample(Alphanumeric)).to_ascii_lowercase())
        .collect();
    let timestamp = Utc::now().timestamp_millis();
    let extension = extension_for(content_type);

    format!("{KEY_PREFIX}/{random}_{timestamp}.{extension}")
}

fn extension_for(content_type: &str) -> &'static str {
    match content_type {
        "image/png" => "png",
        "image/gif" => "gif",
        "image/webp" => "webp",
        "image/heic" => "heic",
        _ => "jpg",
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use rstest::rstest;

    use super::*;

    fn local_store(max: u64) -> (ReportImageStore, std::path::PathBuf) {
        let root = std::env::temp_dir().join(format!("kafala-store-{}", uuid::Uuid::new_v4()));
        let config = StorageConfig::new(
            StorageProvider::LocalFs { root: root.clone() },
            "http://localhost:8080/files/",
        )
        .with_max_file_size(max);
        (ReportImageStore::from_config(config).unwrap(), root)
    }

    #[rstest]
    #[case("image/png", "png")]
    #[case("image/jpeg", "jpg")]
    #[case("image/heic", "heic")]
    #[case("image/webp", "webp")]
    fn test_key_extension_follows_content_type(#[case] content_type: &str, #[case] ext: &str) {
        let mut rng = StdRng::seed_from_u64(1);
        let key = generate_key(content_type, &mut rng);
        assert_eq!(key.rsplit_once('.').map(|(_, e)| e), Some(ext));
    }

    #[test]
    fn test_generate_key_format() {
        let mut rng = StdRng::seed_from_u64(42);
        let key = generate_key("image/webp", &mut rng);

        let rest = key.strip_prefix("reports/").unwrap();
        let (name, ext) = rest.rsplit_once('.').unwrap();
        let (random, timestamp) = name.split_once('_').unwrap();
        assert_eq!(ext, "webp");
        assert_eq!(random.len(), KEY_RANDOM_LEN);
        assert!(random.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit()));
        assert!(timestamp.parse::<i64>().is_ok());
    }

    #[test]
    fn test_validate_upload() {
        let (store, _) = local_store(1024);
        assert!(store.validate_upload("image/png", 512).is_ok());
        assert!(matches!(
            store.validate_upload("image/png", 2048),
            Err(StorageError::FileTooLarge { size: 2048, max: 1024 })
        ));
        assert!(matches!(
            store.validate_upload("application/pdf", 10),
            Err(StorageError::InvalidMimeType { .. })
        ));
        assert!(matches!(
            store.validate_upload("image/png", 0),
            Err(StorageError::EmptyFile)
        ));
    }

    #[tokio::test]
    async fn test_upload_to_local_fs() {
        let (store, root) = local_store(1024);

        let stored = store
            .upload(vec![0x89, b'P', b'N', b'G'], "image/png")
            .await
            .unwrap();

        assert!(stored.key.starts_with("reports/"));
        assert!(stored.key.ends_with(".png"));
        assert_eq!(stored.size, 4);
        assert_eq!(
            stored.url,
            format!("http://localhost:8080/files/{}", stored.key)
        );
        let written = std::fs::read(root.join(&stored.key)).unwrap();
        assert_eq!(written, vec![0x89, b'P', b'N', b'G']);

        let _ = std::fs::remove_dir_all(root);
    }
}
