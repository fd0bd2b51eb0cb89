//! In-memory object store shared by the integration tests.

#![allow(dead_code)]

use async_trait::async_trait;
use bucketsync::{
    Credentials, ListEntry, ListPage, ObjectBody, ObjectStore, SyncConfig, SyncError,
};
use bytes::Bytes;
use futures_util::stream::{self, StreamExt};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::path::Path;
use std::sync::Mutex;
use std::time::Duration;

/// Bucket contents held in memory, with knobs for paging and failures.
#[derive(Default)]
pub struct MemoryStore {
    objects: BTreeMap<String, Vec<u8>>,
    /// Keys listed without a size.
    unsized_keys: HashSet<String>,
    page_size: usize,
    /// Remaining transient failures per key.
    failures: Mutex<HashMap<String, u32>>,
    /// Keys answered without a body.
    bodiless: HashSet<String>,
    /// Keys whose body stream breaks halfway.
    broken_streams: HashSet<String>,
    fail_listing: bool,
    get_calls: Mutex<HashMap<String, u32>>,
    list_calls: Mutex<u32>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            page_size: 1000,
            ..Self::default()
        }
    }

    pub fn with_object(mut self, key: &str, content: &[u8]) -> Self {
        self.objects.insert(key.to_string(), content.to_vec());
        self
    }

    pub fn with_unsized_object(mut self, key: &str, content: &[u8]) -> Self {
        self.unsized_keys.insert(key.to_string());
        self.with_object(key, content)
    }

    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size;
        self
    }

    pub fn with_failures(self, key: &str, count: u32) -> Self {
        self.failures
            .lock()
            .unwrap()
            .insert(key.to_string(), count);
        self
    }

    pub fn with_missing_body(mut self, key: &str) -> Self {
        self.bodiless.insert(key.to_string());
        self
    }

    pub fn with_broken_stream(mut self, key: &str) -> Self {
        self.broken_streams.insert(key.to_string());
        self
    }

    pub fn with_failing_listing(mut self) -> Self {
        self.fail_listing = true;
        self
    }

    pub fn get_calls(&self, key: &str) -> u32 {
        self.get_calls
            .lock()
            .unwrap()
            .get(key)
            .copied()
            .unwrap_or(0)
    }

    pub fn total_get_calls(&self) -> u32 {
        self.get_calls.lock().unwrap().values().sum()
    }

    pub fn list_calls(&self) -> u32 {
        *self.list_calls.lock().unwrap()
    }
}

#[async_trait]
impl ObjectStore for MemoryStore {
    async fn list_page(
        &self,
        _bucket: &str,
        prefix: &str,
        continuation_token: Option<&str>,
    ) -> Result<ListPage, SyncError> {
        *self.list_calls.lock().unwrap() += 1;
        if self.fail_listing {
            return Err(SyncError::Store("listing unavailable".to_string()));
        }

        let start = match continuation_token {
            Some(token) => token
                .parse::<usize>()
                .map_err(|_| SyncError::Store(format!("bad token {token}")))?,
            None => 0,
        };

        let matching: Vec<_> = self
            .objects
            .iter()
            .filter(|(key, _)| key.starts_with(prefix))
            .collect();
        let end = (start + self.page_size).min(matching.len());

        let entries = matching[start..end]
            .iter()
            .map(|(key, content)| ListEntry {
                key: Some(key.to_string()),
                size: if self.unsized_keys.contains(*key) {
                    None
                } else {
                    Some(content.len() as u64)
                },
            })
            .collect();

        let is_truncated = end < matching.len();
        Ok(ListPage {
            entries,
            is_truncated,
            next_continuation_token: is_truncated.then(|| end.to_string()),
        })
    }

    async fn get_object(&self, _bucket: &str, key: &str) -> Result<Option<ObjectBody>, SyncError> {
        *self
            .get_calls
            .lock()
            .unwrap()
            .entry(key.to_string())
            .or_insert(0) += 1;

        {
            let mut failures = self.failures.lock().unwrap();
            if let Some(remaining) = failures.get_mut(key) {
                if *remaining > 0 {
                    *remaining -= 1;
                    return Err(SyncError::Store(format!("transient failure for {key}")));
                }
            }
        }

        if self.bodiless.contains(key) {
            return Ok(None);
        }

        let content = self
            .objects
            .get(key)
            .cloned()
            .ok_or_else(|| SyncError::Store(format!("NoSuchKey: {key}")))?;

        let (head, tail) = content.split_at(content.len() / 2);
        let mut chunks = vec![Ok(Bytes::copy_from_slice(head))];
        if self.broken_streams.contains(key) {
            chunks.push(Err(SyncError::Store("connection reset".to_string())));
        } else {
            chunks.push(Ok(Bytes::copy_from_slice(tail)));
        }

        Ok(Some(stream::iter(chunks).boxed()))
    }
}

/// Config pointing at `root` with millisecond retry delays.
pub fn test_config(root: &Path) -> SyncConfig {
    SyncConfig {
        bucket: "test-bucket".to_string(),
        local_root: root.to_path_buf(),
        concurrency: 4,
        max_retries: 3,
        retry_delay: Duration::from_millis(1),
        prefix: String::new(),
        credentials: Credentials {
            account_id: "account".to_string(),
            access_key_id: "key".to_string(),
            secret_access_key: "secret".to_string(),
        },
        endpoint_url: None,
    }
}
