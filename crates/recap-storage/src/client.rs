//! Object store client: a thin typed facade over an S3-compatible bucket.
//!
//! Exposes exactly the operations the rest of the pipeline needs --
//! `put`/`get`/`head`/`delete`/`list` -- and nothing else. The adapter never
//! silently retries; callers own their own retry policy (see `recap-auth::retry`).

use std::collections::HashMap;
use std::time::Duration;

use aws_config::BehaviorVersion;
use aws_credential_types::Credentials;
use aws_sdk_s3::config::{Builder, Region};
use aws_sdk_s3::presigning::PresigningConfig;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client;
use tracing::debug;

use crate::error::{StorageError, StorageResult};

/// Configuration for the S3-compatible object store client.
#[derive(Debug, Clone)]
pub struct ObjectStoreConfig {
    pub endpoint_url: String,
    pub access_key_id: String,
    pub secret_access_key: String,
    pub bucket_name: String,
    pub region: String,
}

impl ObjectStoreConfig {
    pub fn from_env() -> StorageResult<Self> {
        Ok(Self {
            endpoint_url: std::env::var("OBJECT_STORE_ENDPOINT_URL")
                .map_err(|_| StorageError::config_error("OBJECT_STORE_ENDPOINT_URL not set"))?,
            access_key_id: std::env::var("OBJECT_STORE_ACCESS_KEY_ID")
                .map_err(|_| StorageError::config_error("OBJECT_STORE_ACCESS_KEY_ID not set"))?,
            secret_access_key: std::env::var("OBJECT_STORE_SECRET_ACCESS_KEY").map_err(|_| {
                StorageError::config_error("OBJECT_STORE_SECRET_ACCESS_KEY not set")
            })?,
            bucket_name: std::env::var("OBJECT_STORE_BUCKET_NAME")
                .map_err(|_| StorageError::config_error("OBJECT_STORE_BUCKET_NAME not set"))?,
            region: std::env::var("OBJECT_STORE_REGION").unwrap_or_else(|_| "auto".to_string()),
        })
    }
}

/// An object's bytes plus whatever headers/metadata the caller asked for.
#[derive(Debug, Clone)]
pub struct StoredObject {
    pub body: Vec<u8>,
    pub content_type: String,
    pub custom_metadata: HashMap<String, String>,
}

/// Result of a `head` call: existence plus metadata, no body transferred.
#[derive(Debug, Clone)]
pub struct ObjectHead {
    pub size: u64,
    pub custom_metadata: HashMap<String, String>,
}

/// One entry in a `list` result.
#[derive(Debug, Clone)]
pub struct ObjectSummary {
    pub key: String,
    pub size: u64,
    pub custom_metadata: HashMap<String, String>,
}

/// Options for `put`.
#[derive(Debug, Clone, Default)]
pub struct PutOptions {
    pub content_type: Option<String>,
    pub custom_metadata: HashMap<String, String>,
}

/// Parameters for `list`. `cursor` is the opaque continuation token returned
/// by a previous call; `limit` bounds the page size (the S3 API's own cap
/// applies if unset). `include_metadata` controls whether per-key
/// `customMetadata` is fetched as part of the listing (the S3 list API
/// returns it for free; this flag exists for adapter symmetry with stores
/// that would need a separate head call).
#[derive(Debug, Clone, Default)]
pub struct ListQuery {
    pub prefix: String,
    pub cursor: Option<String>,
    pub limit: Option<i32>,
    pub include_metadata: bool,
}

/// Result of `list`: a page of keys in lexicographic order, whether more
/// remain, and the cursor to fetch the next page.
#[derive(Debug, Clone)]
pub struct ListResult {
    pub objects: Vec<ObjectSummary>,
    pub truncated: bool,
    pub cursor: Option<String>,
}

/// Thin facade over an S3-compatible bucket (Cloudflare R2 or equivalent).
#[derive(Clone)]
pub struct ObjectStore {
    client: Client,
    bucket: String,
}

impl ObjectStore {
    pub async fn new(config: ObjectStoreConfig) -> StorageResult<Self> {
        let credentials = Credentials::new(
            &config.access_key_id,
            &config.secret_access_key,
            None,
            None,
            "object-store",
        );

        let sdk_config = Builder::new()
            .behavior_version(BehaviorVersion::latest())
            .endpoint_url(&config.endpoint_url)
            .region(Region::new(config.region))
            .credentials_provider(credentials)
            .force_path_style(true)
            .build();

        Ok(Self {
            client: Client::from_conf(sdk_config),
            bucket: config.bucket_name,
        })
    }

    pub async fn from_env() -> StorageResult<Self> {
        Self::new(ObjectStoreConfig::from_env()?).await
    }

    /// `put(key, bytes, {contentType, customMetadata})`.
    pub async fn put(&self, key: &str, bytes: Vec<u8>, options: PutOptions) -> StorageResult<()> {
        debug!("putting {} bytes at {}", bytes.len(), key);

        let mut request = self
            .client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .body(ByteStream::from(bytes));

        if let Some(content_type) = options.content_type {
            request = request.content_type(content_type);
        }
        for (k, v) in options.custom_metadata {
            request = request.metadata(k, v);
        }

        request
            .send()
            .await
            .map_err(|e| StorageError::upload_failed(e.to_string()))?;
        Ok(())
    }

    /// `get(key) -> {headers, body} | null`. Returns `Ok(None)` on a clean
    /// not-found response; any other failure is returned as `Err`.
    pub async fn get(&self, key: &str) -> StorageResult<Option<StoredObject>> {
        let response = match self.client.get_object().bucket(&self.bucket).key(key).send().await {
            Ok(resp) => resp,
            Err(e) => {
                return if is_not_found(&e.to_string()) {
                    Ok(None)
                } else {
                    Err(StorageError::DownloadFailed(e.to_string()))
                }
            }
        };

        let content_type = response
            .content_type()
            .unwrap_or("application/octet-stream")
            .to_string();
        let custom_metadata = response.metadata().cloned().unwrap_or_default();
        let body = response
            .body
            .collect()
            .await
            .map_err(|e| StorageError::DownloadFailed(e.to_string()))?
            .into_bytes()
            .to_vec();

        Ok(Some(StoredObject {
            body,
            content_type,
            custom_metadata,
        }))
    }

    /// `head(key)`. Returns `Ok(None)` when the object does not exist.
    pub async fn head(&self, key: &str) -> StorageResult<Option<ObjectHead>> {
        match self.client.head_object().bucket(&self.bucket).key(key).send().await {
            Ok(resp) => Ok(Some(ObjectHead {
                size: resp.content_length().unwrap_or(0) as u64,
                custom_metadata: resp.metadata().cloned().unwrap_or_default(),
            })),
            Err(e) if is_not_found(&e.to_string()) => Ok(None),
            Err(e) => Err(StorageError::HeadFailed(e.to_string())),
        }
    }

    /// `exists(key)`: convenience wrapper over `head` for callers that only
    /// need a boolean (e.g. the deduplicator's audio-presence check).
    pub async fn exists(&self, key: &str) -> StorageResult<bool> {
        Ok(self.head(key).await?.is_some())
    }

    /// `delete(key)`.
    pub async fn delete(&self, key: &str) -> StorageResult<()> {
        self.client
            .delete_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| StorageError::delete_failed(e.to_string()))?;
        Ok(())
    }

    /// `list({prefix, cursor, limit, include})`. A single page; the caller
    /// drives further pages by re-invoking with the returned cursor. Keys
    /// come back in lexicographic order, matching the S3 API's own
    /// guarantee, which is what makes time-partitioned keys double as range
    /// listings (see the key-layout contract in `crate::keys`).
    pub async fn list(&self, query: ListQuery) -> StorageResult<ListResult> {
        let mut request = self
            .client
            .list_objects_v2()
            .bucket(&self.bucket)
            .prefix(&query.prefix);

        if let Some(cursor) = query.cursor {
            request = request.continuation_token(cursor);
        }
        if let Some(limit) = query.limit {
            request = request.max_keys(limit);
        }

        let response = request
            .send()
            .await
            .map_err(|e| StorageError::ListFailed(e.to_string()))?;

        let mut objects = Vec::new();
        if let Some(contents) = response.contents {
            for obj in contents {
                let key = obj.key.clone().unwrap_or_default();
                let custom_metadata = if query.include_metadata {
                    self.head(&key).await?.map(|h| h.custom_metadata).unwrap_or_default()
                } else {
                    HashMap::new()
                };
                objects.push(ObjectSummary {
                    key,
                    size: obj.size.unwrap_or(0) as u64,
                    custom_metadata,
                });
            }
        }

        let truncated = response.is_truncated().unwrap_or(false);
        let cursor = if truncated {
            response.next_continuation_token
        } else {
            None
        };

        Ok(ListResult {
            objects,
            truncated,
            cursor,
        })
    }

    /// Generates a presigned GET URL, used by the SCM publisher when
    /// attaching large artifacts (not otherwise exercised by the core
    /// pipeline, which passes object keys rather than URLs between stages).
    pub async fn presign_get(&self, key: &str, expires_in: Duration) -> StorageResult<String> {
        let presign_config =
            PresigningConfig::expires_in(expires_in).map_err(|e| StorageError::PresignFailed(e.to_string()))?;

        let presigned = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(key)
            .presigned(presign_config)
            .await
            .map_err(|e| StorageError::PresignFailed(e.to_string()))?;

        Ok(presigned.uri().to_string())
    }

    /// Used by the `/health` route to verify the bucket is reachable.
    pub async fn check_connectivity(&self) -> StorageResult<()> {
        self.client
            .head_bucket()
            .bucket(&self.bucket)
            .send()
            .await
            .map_err(|e| StorageError::AwsSdk(format!("object store connectivity check failed: {e}")))?;
        Ok(())
    }
}

fn is_not_found(message: &str) -> bool {
    message.contains("NotFound") || message.contains("NoSuchKey")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn list_query_defaults_have_no_cursor() {
        let q = ListQuery {
            prefix: "clips/".to_string(),
            ..Default::default()
        };
        assert!(q.cursor.is_none());
        assert!(!q.include_metadata);
    }
}
