//! Application configuration management.

use std::path::PathBuf;

use serde::Deserialize;

/// Application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Server configuration.
    #[serde(default)]
    pub server: ServerConfig,
    /// Database configuration.
    #[serde(default)]
    pub database: DatabaseConfig,
    /// Upload pipeline configuration.
    #[serde(default)]
    pub upload: UploadConfig,
    /// Remote blob store configuration.
    pub storage: StorageSettings,
}

/// Server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host to bind to.
    #[serde(default = "default_host")]
    pub host: String,
    /// Port to listen on.
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8000
}

/// Database configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// Database connection URL.
    #[serde(default = "default_database_url")]
    pub url: String,
    /// Maximum number of connections in the pool.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    /// Minimum number of connections in the pool.
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
    /// Apply pending migrations when the server starts.
    #[serde(default = "default_run_migrations")]
    pub run_migrations: bool,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: default_database_url(),
            max_connections: default_max_connections(),
            min_connections: default_min_connections(),
            run_migrations: default_run_migrations(),
        }
    }
}

fn default_database_url() -> String {
    "sqlite://snapfeed.db?mode=rwc".to_string()
}

fn default_max_connections() -> u32 {
    10
}

fn default_min_connections() -> u32 {
    1
}

fn default_run_migrations() -> bool {
    true
}

/// Upload pipeline configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct UploadConfig {
    /// Destination folder on the blob store.
    #[serde(default = "default_folder")]
    pub folder: String,
    /// Classification tags attached to every upload.
    #[serde(default = "default_tags")]
    pub tags: Vec<String>,
    /// Directory for request-scoped staging files. System temp dir when unset.
    #[serde(default)]
    pub staging_dir: Option<PathBuf>,
    /// Largest accepted request body in bytes.
    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: usize,
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            folder: default_folder(),
            tags: default_tags(),
            staging_dir: None,
            max_body_bytes: default_max_body_bytes(),
        }
    }
}

impl UploadConfig {
    /// Resolved staging directory.
    #[must_use]
    pub fn staging_dir(&self) -> PathBuf {
        self.staging_dir.clone().unwrap_or_else(std::env::temp_dir)
    }
}

fn default_folder() -> String {
    "/backend-upload".to_string()
}

fn default_tags() -> Vec<String> {
    vec!["backend-upload".to_string()]
}

fn default_max_body_bytes() -> usize {
    100 * 1024 * 1024
}

/// Remote blob store settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "provider", rename_all = "snake_case")]
pub enum StorageSettings {
    /// Hosted image CDN with a multipart upload API (ImageKit compatible).
    Imagekit {
        /// Private API key, sent as the basic-auth user name.
        private_key: String,
        /// Upload endpoint.
        #[serde(default = "default_imagekit_endpoint")]
        upload_endpoint: String,
        /// Request timeout for a single upload call, in seconds.
        #[serde(default = "default_upload_timeout")]
        timeout_secs: u64,
    },
    /// S3-compatible storage: Cloudflare R2, Supabase, AWS S3, DigitalOcean Spaces
    S3 {
        /// S3 endpoint URL.
        endpoint: String,
        /// S3 bucket name.
        bucket: String,
        /// AWS access key ID.
        access_key_id: String,
        /// AWS secret access key.
        secret_access_key: String,
        /// AWS region.
        region: String,
        /// Base URL objects are publicly served from.
        public_base_url: String,
    },
    /// Azure Blob Storage
    AzureBlob {
        /// Azure storage account name.
        account: String,
        /// Azure storage access key.
        access_key: String,
        /// Azure container name.
        container: String,
        /// Base URL objects are publicly served from.
        public_base_url: String,
    },
    /// Local filesystem (development only)
    LocalFs {
        /// Root directory path.
        root: PathBuf,
        /// Base URL objects are publicly served from.
        #[serde(default = "default_local_base_url")]
        public_base_url: String,
    },
}

fn default_imagekit_endpoint() -> String {
    "https://upload.imagekit.io/api/v1/files/upload".to_string()
}

fn default_upload_timeout() -> u64 {
    120
}

fn default_local_base_url() -> String {
    "http://localhost:8000/media".to_string()
}

impl AppConfig {
    /// Loads configuration from environment and config files.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be loaded.
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{run_mode}")).required(false))
            .add_source(
                config::Environment::with_prefix("SNAPFEED")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("upload.tags")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_local_fs_from_env() {
        temp_env::with_vars(
            [
                ("SNAPFEED__STORAGE__PROVIDER", Some("local_fs")),
                ("SNAPFEED__STORAGE__ROOT", Some("/tmp/snapfeed-media")),
                ("SNAPFEED__SERVER__PORT", Some("9100")),
            ],
            || {
                let config = AppConfig::load().expect("config should load");
                assert_eq!(config.server.port, 9100);
                assert_eq!(config.server.host, "0.0.0.0");
                assert_eq!(config.upload.folder, "/backend-upload");
                assert_eq!(config.upload.tags, vec!["backend-upload".to_string()]);
                assert!(matches!(
                    config.storage,
                    StorageSettings::LocalFs { ref root, .. } if root == &PathBuf::from("/tmp/snapfeed-media")
                ));
            },
        );
    }

    #[test]
    fn test_load_imagekit_defaults() {
        temp_env::with_vars(
            [
                ("SNAPFEED__STORAGE__PROVIDER", Some("imagekit")),
                ("SNAPFEED__STORAGE__PRIVATE_KEY", Some("private_test")),
                ("SNAPFEED__UPLOAD__TAGS", Some("feed,mobile")),
            ],
            || {
                let config = AppConfig::load().expect("config should load");
                assert_eq!(config.upload.tags, vec!["feed", "mobile"]);
                match config.storage {
                    StorageSettings::Imagekit {
                        private_key,
                        upload_endpoint,
                        timeout_secs,
                    } => {
                        assert_eq!(private_key, "private_test");
                        assert_eq!(
                            upload_endpoint,
                            "https://upload.imagekit.io/api/v1/files/upload"
                        );
                        assert_eq!(timeout_secs, 120);
                    }
                    other => panic!("unexpected provider: {other:?}"),
                }
            },
        );
    }

    #[test]
    fn test_missing_storage_is_an_error() {
        temp_env::with_vars_unset(
            ["SNAPFEED__STORAGE__PROVIDER", "SNAPFEED__STORAGE__ROOT"],
            || {
                assert!(AppConfig::load().is_err());
            },
        );
    }

    #[test]
    fn test_staging_dir_defaults_to_temp_dir() {
        let upload = UploadConfig::default();
        assert_eq!(upload.staging_dir(), std::env::temp_dir());
        assert_eq!(upload.max_body_bytes, 100 * 1024 * 1024);
    }
}
