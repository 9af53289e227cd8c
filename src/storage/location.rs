//! Storage locations (S3, GCS, Azure, local)

use super::glob::GlobPattern;
use crate::config::Credentials;
use crate::error::{Error, Result};
use bytes::Bytes;
use futures::TryStreamExt;
use object_store::aws::AmazonS3Builder;
use object_store::azure::MicrosoftAzureBuilder;
use object_store::gcp::GoogleCloudStorageBuilder;
use object_store::local::LocalFileSystem;
use object_store::path::Path as ObjectPath;
use object_store::{ObjectMeta, ObjectStore};
use std::fmt;
use std::sync::Arc;
use url::Url;

/// Storage backend behind a location
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scheme {
    S3,
    Gcs,
    Azure,
    Local,
}

impl Scheme {
    fn as_str(self) -> &'static str {
        match self {
            Scheme::S3 => "s3",
            Scheme::Gcs => "gs",
            Scheme::Azure => "az",
            Scheme::Local => "file",
        }
    }
}

/// Options handed to object store clients when a location is opened
///
/// Credentials travel with the options instead of the process environment,
/// so two sessions with different keys never interfere.
#[derive(Debug, Clone, Default)]
pub struct StorageOptions {
    credentials: Option<Credentials>,
}

impl StorageOptions {
    /// Options without explicit credentials (provider defaults apply)
    pub fn new() -> Self {
        Self::default()
    }

    /// Options carrying S3 credentials
    pub fn with_credentials(credentials: Credentials) -> Self {
        Self {
            credentials: Some(credentials),
        }
    }

    /// Credentials, if any
    pub fn credentials(&self) -> Option<&Credentials> {
        self.credentials.as_ref()
    }
}

/// A directory-like place in an object store
#[derive(Debug, Clone)]
pub struct Location {
    /// The object store implementation
    store: Arc<dyn ObjectStore>,
    /// Path prefix within the bucket/container/directory
    prefix: ObjectPath,
    /// Backend kind
    scheme: Scheme,
    /// Bucket or local root, used for display
    root: String,
}

impl Location {
    /// Parse a location URL and create the matching object store
    ///
    /// Supported formats:
    /// - `s3://bucket/path/`, `s3a://...`, `s3n://...` - AWS S3 or S3-compatible
    /// - `gs://bucket/path/` - Google Cloud Storage
    /// - `az://container/path/` - Azure Blob Storage
    /// - `file:///local/path/`, `/local/path/` or `./path/` - Local filesystem
    pub fn parse(location: &str, options: &StorageOptions) -> Result<Self> {
        let trimmed = location.trim();
        if trimmed.is_empty() {
            return Err(Error::location(location, "location is empty"));
        }

        match Url::parse(trimmed) {
            // Single-letter schemes are Windows drive letters
            Ok(url) if url.scheme().len() > 1 => match url.scheme() {
                "s3" | "s3a" | "s3n" => Self::parse_s3(&url, options),
                "gs" | "gcs" => Self::parse_gcs(&url),
                "az" | "azure" => Self::parse_azure(&url),
                "file" => {
                    let path = url
                        .to_file_path()
                        .map_err(|()| Error::location(location, "not a valid file URL"))?;
                    Self::parse_local(&path)
                }
                other => Err(Error::location(
                    location,
                    format!("unsupported scheme '{other}'"),
                )),
            },
            _ => Self::parse_local(std::path::Path::new(trimmed)),
        }
    }

    /// Split a URL into bucket and prefix
    fn bucket_and_prefix(url: &Url) -> Result<(String, ObjectPath)> {
        let bucket = url
            .host_str()
            .filter(|h| !h.is_empty())
            .ok_or_else(|| Error::location(url.as_str(), "missing bucket name"))?;
        let prefix = ObjectPath::from(url.path().trim_matches('/'));
        Ok((bucket.to_string(), prefix))
    }

    /// Parse an S3 URL
    fn parse_s3(url: &Url, options: &StorageOptions) -> Result<Self> {
        let (bucket, prefix) = Self::bucket_and_prefix(url)?;

        let mut builder = AmazonS3Builder::from_env().with_bucket_name(&bucket);

        // Explicit credentials take precedence over anything in the environment
        if let Some(credentials) = options.credentials() {
            builder = builder
                .with_access_key_id(&credentials.access_key_id)
                .with_secret_access_key(&credentials.secret_access_key);

            if let Some(region) = &credentials.region {
                builder = builder.with_region(region);
            }

            if let Some(endpoint) = &credentials.endpoint {
                builder = builder
                    .with_endpoint(endpoint)
                    .with_allow_http(endpoint.starts_with("http://"));
            }
        }

        let store = builder
            .build()
            .map_err(|e| Error::location(url.as_str(), format!("failed to create S3 client: {e}")))?;

        Ok(Self {
            store: Arc::new(store),
            prefix,
            scheme: Scheme::S3,
            root: bucket,
        })
    }

    /// Parse a GCS URL
    fn parse_gcs(url: &Url) -> Result<Self> {
        let (bucket, prefix) = Self::bucket_and_prefix(url)?;

        let store = GoogleCloudStorageBuilder::from_env()
            .with_bucket_name(&bucket)
            .build()
            .map_err(|e| {
                Error::location(url.as_str(), format!("failed to create GCS client: {e}"))
            })?;

        Ok(Self {
            store: Arc::new(store),
            prefix,
            scheme: Scheme::Gcs,
            root: bucket,
        })
    }

    /// Parse an Azure Blob URL
    fn parse_azure(url: &Url) -> Result<Self> {
        let (container, prefix) = Self::bucket_and_prefix(url)?;

        let store = MicrosoftAzureBuilder::from_env()
            .with_container_name(&container)
            .build()
            .map_err(|e| {
                Error::location(url.as_str(), format!("failed to create Azure client: {e}"))
            })?;

        Ok(Self {
            store: Arc::new(store),
            prefix,
            scheme: Scheme::Azure,
            root: container,
        })
    }

    /// Parse a local filesystem path
    fn parse_local(path: &std::path::Path) -> Result<Self> {
        // Create directory if it doesn't exist
        std::fs::create_dir_all(path).map_err(|e| {
            Error::location(
                path.display().to_string(),
                format!("failed to create directory: {e}"),
            )
        })?;

        let absolute = path.canonicalize()?;
        let store = LocalFileSystem::new_with_prefix(&absolute).map_err(|e| {
            Error::location(
                absolute.display().to_string(),
                format!("failed to create local store: {e}"),
            )
        })?;

        Ok(Self {
            store: Arc::new(store),
            prefix: ObjectPath::default(),
            scheme: Scheme::Local,
            root: absolute.display().to_string(),
        })
    }

    /// Check if this is a cloud location (not local)
    pub fn is_cloud(&self) -> bool {
        self.scheme != Scheme::Local
    }

    /// Backend kind
    pub fn scheme(&self) -> Scheme {
        self.scheme
    }

    /// A location nested below this one, sharing the same store client
    #[must_use]
    pub fn child(&self, relative: &str) -> Self {
        Self {
            store: Arc::clone(&self.store),
            prefix: self.path_for(relative),
            scheme: self.scheme,
            root: self.root.clone(),
        }
    }

    /// Object path for a file relative to this location
    pub fn path_for(&self, relative: &str) -> ObjectPath {
        let relative = relative.trim_matches('/');
        if self.prefix.as_ref().is_empty() {
            ObjectPath::from(relative)
        } else {
            ObjectPath::from(format!("{}/{relative}", self.prefix))
        }
    }

    /// Full URL of an object, for logs and reports
    pub fn display_path(&self, path: &ObjectPath) -> String {
        match self.scheme {
            Scheme::Local if path.as_ref().is_empty() => format!("file://{}", self.root),
            Scheme::Local => format!("file://{}/{path}", self.root.trim_end_matches('/')),
            scheme if path.as_ref().is_empty() => format!("{}://{}", scheme.as_str(), self.root),
            scheme => format!("{}://{}/{path}", scheme.as_str(), self.root),
        }
    }

    /// Path segments of `path` below this location, or None if it lies elsewhere
    pub fn relative_parts(&self, path: &ObjectPath) -> Option<Vec<String>> {
        path.prefix_match(&self.prefix)
            .map(|parts| parts.map(|p| p.as_ref().to_string()).collect())
    }

    /// List every object below `prefix`; a missing prefix lists as empty
    async fn list_under(&self, prefix: &ObjectPath) -> Result<Vec<ObjectMeta>> {
        match self.store.list(Some(prefix)).try_collect::<Vec<_>>().await {
            Ok(objects) => Ok(objects),
            Err(object_store::Error::NotFound { .. }) => Ok(Vec::new()),
            Err(e) => Err(e.into()),
        }
    }

    /// List objects below this location that match a glob pattern, sorted by path
    pub async fn list_matching(&self, pattern: &GlobPattern) -> Result<Vec<ObjectPath>> {
        let base = self.path_for(&pattern.literal_prefix());
        let objects = self.list_under(&base).await?;

        let mut matched: Vec<ObjectPath> = objects
            .into_iter()
            .map(|meta| meta.location)
            .filter(|path| {
                self.relative_parts(path)
                    .is_some_and(|parts| pattern.matches(&parts[..]))
            })
            .collect();
        matched.sort_by(|a, b| a.as_ref().cmp(b.as_ref()));

        tracing::debug!(
            pattern = pattern.as_str(),
            base = %self.display_path(&base),
            files = matched.len(),
            "Listed input files"
        );

        Ok(matched)
    }

    /// Read a whole object
    pub async fn read(&self, path: &ObjectPath) -> Result<Bytes> {
        let result = self.store.get(path).await?;
        Ok(result.bytes().await?)
    }

    /// Write bytes to a file relative to this location, returning its full path
    pub async fn write(&self, relative: &str, data: Bytes) -> Result<String> {
        let path = self.path_for(relative);

        self.store
            .put(&path, data.into())
            .await
            .map_err(|e| Error::output(format!("Failed to write {path}: {e}")))?;

        Ok(self.display_path(&path))
    }

    /// Delete every object below this location, returning how many were removed
    pub async fn clear(&self) -> Result<usize> {
        if self.prefix.as_ref().is_empty() {
            return Err(Error::output(format!(
                "refusing to clear the root of {}",
                self.display_path(&self.prefix)
            )));
        }

        let objects = self.list_under(&self.prefix).await?;
        for meta in &objects {
            self.store.delete(&meta.location).await?;
        }
        Ok(objects.len())
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display_path(&self.prefix))
    }
}
