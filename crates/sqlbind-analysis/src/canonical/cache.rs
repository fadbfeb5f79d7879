//! Build-once shape cache: at most one artifact per canonical shape for the
//! whole run.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, OnceLock};

use sqlbind_core::errors::AnalysisError;
use sqlbind_core::types::collections::FxHashMap;
use sqlbind_core::ArtifactId;

use super::key::{CanonicalShape, ShapeKey};
use crate::synth::GeneratedArtifact;

struct Slot {
    canonical: CanonicalShape,
    /// Initialized by the first caller; concurrent callers wait on it.
    artifact: OnceLock<Arc<GeneratedArtifact>>,
}

/// No eviction: artifacts live as long as the analysis run.
pub struct ShapeCache {
    slots: Mutex<FxHashMap<ShapeKey, Arc<Slot>>>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl ShapeCache {
    pub fn new() -> Self {
        Self {
            slots: Mutex::new(FxHashMap::default()),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    /// Return the artifact for `canonical`, running `synthesize` only if no
    /// caller has done so yet. The flag is `true` for the caller that built it.
    pub fn get_or_synthesize<F>(
        &self,
        canonical: CanonicalShape,
        synthesize: F,
    ) -> Result<(Arc<GeneratedArtifact>, bool), AnalysisError>
    where
        F: FnOnce(&CanonicalShape, ArtifactId) -> GeneratedArtifact,
    {
        let key = canonical.key()?;
        let slot = {
            let mut slots = self.slots.lock().map_err(|_| AnalysisError::InvariantViolation {
                message: "shape cache lock poisoned".to_string(),
            })?;
            match slots.get(&key) {
                Some(existing) => {
                    if existing.canonical != canonical {
                        return Err(AnalysisError::CacheCorruption {
                            key: key.0,
                            details: "two distinct shapes share one key".to_string(),
                        });
                    }
                    self.hits.fetch_add(1, Ordering::Relaxed);
                    Arc::clone(existing)
                }
                None => {
                    self.misses.fetch_add(1, Ordering::Relaxed);
                    let slot = Arc::new(Slot {
                        canonical,
                        artifact: OnceLock::new(),
                    });
                    slots.insert(key, Arc::clone(&slot));
                    slot
                }
            }
        };

        let mut fresh = false;
        let artifact = slot.artifact.get_or_init(|| {
            fresh = true;
            Arc::new(synthesize(&slot.canonical, key.artifact_id()))
        });
        if artifact.id != key.artifact_id() {
            return Err(AnalysisError::CacheCorruption {
                key: key.0,
                details: format!("slot holds artifact {}", artifact.id),
            });
        }
        if fresh {
            tracing::debug!(key = %key, "synthesized artifact");
        }
        Ok((Arc::clone(artifact), fresh))
    }

    /// Every synthesized artifact, ordered by id.
    pub fn artifacts(&self) -> Vec<Arc<GeneratedArtifact>> {
        let Ok(slots) = self.slots.lock() else {
            return Vec::new();
        };
        let mut out: Vec<_> = slots.values().filter_map(|s| s.artifact.get().cloned()).collect();
        out.sort_by_key(|a| a.id);
        out
    }

    pub fn len(&self) -> usize {
        self.slots.lock().map(|s| s.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn hit_count(&self) -> u64 {
        self.hits.load(Ordering::Relaxed)
    }

    pub fn miss_count(&self) -> u64 {
        self.misses.load(Ordering::Relaxed)
    }
}

impl Default for ShapeCache {
    fn default() -> Self {
        Self::new()
    }
}
