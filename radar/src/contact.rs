use retainer::Cache;
use serde::Deserialize;
use std::{sync::Arc, time::Duration};

/// Owner details a device was provisioned with.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ContactInfo {
    pub name: String,
    #[serde(rename = "org", alias = "affiliation")]
    pub affiliation: String,
    pub role: String,
    pub email: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Contact {
    pub device_uid: String,
    pub serial_number: String,
    pub time: i64,
    pub info: ContactInfo,
}

const CACHE_EVICTION_FREQUENCY: Duration = Duration::from_secs(60);

/// Remembers the last contact written per device so that the store only
/// sees a write when something changed. Every scan and track carries the
/// contact, so without this there would be one write per ingested note.
/// Entries expire after `ttl`, after which the contact is written again.
pub struct ContactCache {
    cache: Arc<Cache<String, (String, ContactInfo)>>,
    ttl: Duration,
}

impl ContactCache {
    /// Must be called from within a tokio runtime; expired entries are
    /// evicted by a background task.
    pub fn new(ttl: Duration) -> Self {
        let cache = Arc::new(Cache::new());
        let cloned_cache = cache.clone();
        tokio::spawn(async move {
            cloned_cache
                .monitor(4, 0.25, CACHE_EVICTION_FREQUENCY)
                .await
        });
        Self { cache, ttl }
    }

    /// Records `contact` and returns true when it differs from the last one
    /// seen for the same device.
    pub async fn update(&self, contact: &Contact) -> bool {
        let value = (contact.serial_number.clone(), contact.info.clone());
        if let Some(previous) = self.cache.get(&contact.device_uid).await {
            if *previous.value() == value {
                return false;
            }
        }
        self.cache
            .insert(contact.device_uid.clone(), value, self.ttl)
            .await;
        true
    }

    /// Forget a device, e.g. after its contact failed to be written.
    pub async fn forget(&self, device_uid: &str) {
        self.cache.remove(&device_uid.to_string()).await;
    }
}
