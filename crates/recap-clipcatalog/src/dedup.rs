//! Deduplication: classify clip ids by whether audio already exists.

use recap_storage::ObjectStore;

use crate::error::ClipCatalogResult;

pub struct ClassifyResult {
    pub have_audio: Vec<String>,
    pub need_download: Vec<String>,
}

pub struct Deduplicator<'a> {
    store: &'a ObjectStore,
    concurrency: usize,
}

impl<'a> Deduplicator<'a> {
    pub fn new(store: &'a ObjectStore, concurrency: usize) -> Self {
        Self { store, concurrency }
    }

    /// Partitions `clip_ids` into those that already have an audio artifact
    /// and those that still need one, checking presence via `head` rather
    /// than a body fetch.
    pub async fn classify(&self, clip_ids: &[String]) -> ClipCatalogResult<ClassifyResult> {
        use futures::stream::{self, StreamExt};

        let results: Vec<(String, recap_storage::StorageResult<bool>)> =
            stream::iter(clip_ids.iter().cloned())
                .map(|id| async move {
                    let key = recap_storage::keys::audio_key(&id);
                    let exists = self.store.exists(&key).await;
                    (id, exists)
                })
                .buffer_unordered(self.concurrency.max(1))
                .collect()
                .await;

        let mut have_audio = Vec::new();
        let mut need_download = Vec::new();

        for (id, exists) in results {
            if exists? {
                have_audio.push(id);
            } else {
                need_download.push(id);
            }
        }

        have_audio.sort();
        need_download.sort();

        Ok(ClassifyResult {
            have_audio,
            need_download,
        })
    }
}
