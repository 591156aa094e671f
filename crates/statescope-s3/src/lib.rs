//! S3 object-storage backend.
//!
//! Exposes a bucket as a browsable directory tree: `/`-delimited listings
//! become directories, objects become files. Read-only, like every state
//! backend.

use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_config::sts::AssumeRoleProvider;
use aws_sdk_s3::Client;
use serde::Deserialize;
use std::path::{Component, Path};
use tracing::debug;

use statescope_vfs::{DirEntry, StateFs, VfsError, VfsResult};

/// Connection settings for one S3 backend.
#[derive(Debug, Clone, Deserialize)]
pub struct S3ConnectionInfo {
    /// Bucket to browse.
    pub bucket_name: String,
    /// Role to assume before talking to the bucket. Empty means the
    /// ambient credentials are used directly.
    #[serde(default)]
    pub role_arn: String,
}

/// S3 bucket exposed as a state filesystem.
#[derive(Debug, Clone)]
pub struct S3Backend {
    client: Client,
    bucket: String,
}

impl S3Backend {
    /// Connect using the ambient AWS configuration, assuming
    /// `info.role_arn` first when one is given.
    pub async fn connect(info: &S3ConnectionInfo) -> Self {
        let base = aws_config::defaults(BehaviorVersion::latest()).load().await;

        let config = if info.role_arn.is_empty() {
            base
        } else {
            debug!(role_arn = %info.role_arn, "assuming role for S3 backend");
            let provider = AssumeRoleProvider::builder(&info.role_arn)
                .session_name("statescope")
                .configure(&base)
                .build()
                .await;
            aws_config::defaults(BehaviorVersion::latest())
                .credentials_provider(provider)
                .load()
                .await
        };

        Self::from_client(Client::new(&config), &info.bucket_name)
    }

    /// Build a backend from an existing client (custom endpoints, tests).
    pub fn from_client(client: Client, bucket: impl Into<String>) -> Self {
        Self {
            client,
            bucket: bucket.into(),
        }
    }

    /// The bucket this backend browses.
    pub fn bucket(&self) -> &str {
        &self.bucket
    }
}

/// Normalize a logical path into an S3 key: strip the leading `/`,
/// resolve `.` and `..`. The root becomes the empty string.
fn normalize_key(path: &Path) -> VfsResult<String> {
    let mut parts: Vec<&str> = Vec::new();
    for component in path.components() {
        match component {
            Component::RootDir | Component::CurDir | Component::Prefix(_) => {}
            Component::ParentDir => {
                parts.pop();
            }
            Component::Normal(s) => {
                let s = s
                    .to_str()
                    .ok_or_else(|| VfsError::invalid_path(path.display().to_string()))?;
                parts.push(s);
            }
        }
    }
    Ok(parts.join("/"))
}

#[async_trait]
impl StateFs for S3Backend {
    async fn readdir(&self, path: &Path) -> VfsResult<Vec<DirEntry>> {
        let prefix = normalize_key(path)?;
        let list_prefix = if prefix.is_empty() {
            String::new()
        } else {
            format!("{prefix}/")
        };

        let mut entries = Vec::new();
        let mut continuation: Option<String> = None;

        loop {
            let mut request = self
                .client
                .list_objects_v2()
                .bucket(&self.bucket)
                .delimiter("/");
            if !list_prefix.is_empty() {
                request = request.prefix(&list_prefix);
            }
            if let Some(token) = continuation.take() {
                request = request.continuation_token(token);
            }

            let response = request
                .send()
                .await
                .map_err(|e| VfsError::backend(e.to_string()))?;

            for common in response.common_prefixes() {
                if let Some(full) = common.prefix() {
                    let name = full
                        .strip_prefix(&list_prefix)
                        .unwrap_or(full)
                        .trim_end_matches('/');
                    if !name.is_empty() {
                        entries.push(DirEntry::directory(name));
                    }
                }
            }

            for object in response.contents() {
                if let Some(key) = object.key() {
                    let name = key.strip_prefix(&list_prefix).unwrap_or(key);
                    // The prefix itself can appear as a zero-byte
                    // placeholder object; it is not a child.
                    if !name.is_empty() {
                        entries.push(DirEntry::file(name));
                    }
                }
            }

            match response.next_continuation_token() {
                Some(token) if response.is_truncated() == Some(true) => {
                    continuation = Some(token.to_string());
                }
                _ => break,
            }
        }

        // An empty listing under a non-root prefix means the directory
        // does not exist in the bucket's implied tree.
        if entries.is_empty() && !prefix.is_empty() {
            return Err(VfsError::not_found(path.display().to_string()));
        }

        entries.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(entries)
    }

    async fn read_all(&self, path: &Path) -> VfsResult<Vec<u8>> {
        let key = normalize_key(path)?;
        if key.is_empty() {
            return Err(VfsError::invalid_path("empty object key"));
        }

        let response = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(&key)
            .send()
            .await
            .map_err(|e| {
                if e.as_service_error().is_some_and(|se| se.is_no_such_key()) {
                    VfsError::not_found(path.display().to_string())
                } else {
                    VfsError::backend(e.to_string())
                }
            })?;

        let data = response
            .body
            .collect()
            .await
            .map_err(|e| VfsError::backend(e.to_string()))?;

        Ok(data.into_bytes().to_vec())
    }
}
