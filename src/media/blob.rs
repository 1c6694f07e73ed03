// SPDX-License-Identifier: MPL-2.0

//! Fragments, blobs and object URLs

use crate::constants::OBJECT_URL_PREFIX;
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex};
use tracing::{debug, warn};

/// One chunk of encoded media delivered by a recorder
#[derive(Debug, Clone, PartialEq)]
pub struct Fragment {
    pub data: Arc<[u8]>,
    /// Container type reported by the recorder (may be empty)
    pub mime_type: String,
}

impl Fragment {
    pub fn new(data: impl Into<Arc<[u8]>>, mime_type: impl Into<String>) -> Self {
        Self {
            data: data.into(),
            mime_type: mime_type.into(),
        }
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

/// Immutable binary object with a content type
#[derive(Debug, Clone, PartialEq)]
pub struct Blob {
    pub data: Arc<[u8]>,
    pub mime_type: String,
}

impl Blob {
    /// Concatenate fragments in order
    pub fn from_fragments(fragments: &[Fragment], mime_type: impl Into<String>) -> Self {
        let total: usize = fragments.iter().map(Fragment::len).sum();
        let mut data = Vec::with_capacity(total);
        for fragment in fragments {
            data.extend_from_slice(&fragment.data);
        }
        Self {
            data: Arc::from(data),
            mime_type: mime_type.into(),
        }
    }

    pub fn size(&self) -> usize {
        self.data.len()
    }
}

/// Opaque reference to a registered blob
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ObjectUrl(String);

impl ObjectUrl {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ObjectUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Registry of live object URLs
///
/// Cloning shares the registry.
#[derive(Debug, Clone, Default)]
pub struct ObjectUrlRegistry {
    entries: Arc<Mutex<HashMap<ObjectUrl, Blob>>>,
}

impl ObjectUrlRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a blob and hand out a fresh URL for it
    pub fn create(&self, blob: Blob) -> ObjectUrl {
        let url = ObjectUrl(format!("{}{}", OBJECT_URL_PREFIX, uuid::Uuid::new_v4()));
        debug!(url = %url, size = blob.size(), "Created object URL");
        self.entries.lock().unwrap().insert(url.clone(), blob);
        url
    }

    pub fn resolve(&self, url: &ObjectUrl) -> Option<Blob> {
        self.entries.lock().unwrap().get(url).cloned()
    }

    /// Release a URL. Returns false if it was not live.
    pub fn revoke(&self, url: &ObjectUrl) -> bool {
        let removed = self.entries.lock().unwrap().remove(url).is_some();
        if removed {
            debug!(url = %url, "Revoked object URL");
        } else {
            warn!(url = %url, "Revoking unknown object URL");
        }
        removed
    }

    /// Number of URLs not yet revoked
    pub fn live_count(&self) -> usize {
        self.entries.lock().unwrap().len()
    }
}
