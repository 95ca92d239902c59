use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};

use armor_vision_core::ParamError;
use log::{info, warn};

use crate::params::{ParamValue, PipelineParams};

/// Shared, versioned parameter snapshots.
///
/// Readers take an `Arc` once per frame; writers validate a full copy and
/// swap it in. Readers hold the lock only to clone the `Arc`.
#[derive(Debug)]
pub struct ParamStore {
    current: RwLock<Arc<PipelineParams>>,
    version: AtomicU64,
}

impl ParamStore {
    pub fn new(params: PipelineParams) -> Result<Self, ParamError> {
        params.validate()?;
        Ok(Self {
            current: RwLock::new(Arc::new(params)),
            version: AtomicU64::new(0),
        })
    }

    /// Current parameters; later updates do not affect the returned value.
    pub fn snapshot(&self) -> Arc<PipelineParams> {
        self.current
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    /// Number of accepted updates so far.
    pub fn version(&self) -> u64 {
        self.version.load(Ordering::Acquire)
    }

    /// Publish a whole new parameter set. Returns the new version.
    pub fn replace(&self, params: PipelineParams) -> Result<u64, ParamError> {
        self.commit("parameter set", |p| {
            *p = params;
            Ok(())
        })
    }

    /// Edit a copy of the current parameters and publish it if valid.
    pub fn update<F>(&self, edit: F) -> Result<u64, ParamError>
    where
        F: FnOnce(&mut PipelineParams),
    {
        self.commit("parameter update", |p| {
            edit(p);
            Ok(())
        })
    }

    /// Set one parameter by name, see [`PipelineParams::set_named`].
    pub fn set_named(&self, name: &str, value: ParamValue) -> Result<u64, ParamError> {
        let version = self.commit(name, |p| p.set_named(name, value))?;
        info!("parameter `{name}` updated (version {version})");
        Ok(version)
    }

    // Writers are serialized so concurrent edits never overwrite each other.
    fn commit<F>(&self, what: &str, edit: F) -> Result<u64, ParamError>
    where
        F: FnOnce(&mut PipelineParams) -> Result<(), ParamError>,
    {
        let mut guard = self.current.write().unwrap_or_else(|e| e.into_inner());
        let mut next = PipelineParams::clone(&guard);
        if let Err(e) = edit(&mut next).and_then(|()| next.validate()) {
            warn!("rejected {what}: {e}");
            return Err(e);
        }
        *guard = Arc::new(next);
        Ok(self.version.fetch_add(1, Ordering::AcqRel) + 1)
    }
}

impl Default for ParamStore {
    fn default() -> Self {
        Self {
            current: RwLock::new(Arc::new(PipelineParams::default())),
            version: AtomicU64::new(0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn snapshots_are_isolated_from_later_updates() {
        let store = ParamStore::default();
        let before = store.snapshot();
        store.set_named("min_lightness", 90.into()).unwrap();
        assert_eq!(before.detector.preprocess.min_lightness, 160);
        assert_eq!(store.snapshot().detector.preprocess.min_lightness, 90);
    }

    #[test]
    fn versions_count_accepted_updates_only() {
        let store = ParamStore::default();
        assert_eq!(store.version(), 0);
        assert_eq!(store.set_named("debug", true.into()).unwrap(), 1);
        assert!(store.set_named("detect_color", 7.into()).is_err());
        assert!(store.update(|p| p.classifier.threshold = 2.0).is_err());
        assert_eq!(store.version(), 1);
        assert_eq!(store.update(|p| p.classifier.threshold = 0.5).unwrap(), 2);
        assert_eq!(store.snapshot().classifier.threshold, 0.5);
        assert!(store.snapshot().debug);
    }

    #[test]
    fn invalid_initial_params_are_rejected() {
        let mut p = PipelineParams::default();
        p.detector.light.max_angle = -1.0;
        assert!(ParamStore::new(p.clone()).is_err());
        assert!(ParamStore::default().replace(p).is_err());
    }

    #[test]
    fn concurrent_readers_always_see_a_valid_snapshot() {
        let store = Arc::new(ParamStore::default());
        let writer = {
            let store = Arc::clone(&store);
            thread::spawn(move || {
                for i in 0..200 {
                    let t = (i % 10) as f64 / 10.0;
                    store.set_named("classifier.threshold", t.into()).unwrap();
                }
            })
        };
        let readers: Vec<_> = (0..4)
            .map(|_| {
                let store = Arc::clone(&store);
                thread::spawn(move || {
                    for _ in 0..200 {
                        assert!(store.snapshot().validate().is_ok());
                    }
                })
            })
            .collect();
        writer.join().unwrap();
        for r in readers {
            r.join().unwrap();
        }
        assert_eq!(store.version(), 200);
    }
}
