//! Dependency tracking and invalidation
//!
//! A [`ComputeContext`] records every input a computation reads. The
//! [`InvalidationHub`] fans change notifications out to the contexts that
//! observed the changed key; an invalidated context also acts as the
//! cancellation signal for any work still running under it.

use crate::renderer::RendererId;
use meshmask_algorithms::Cancellation;
use meshmask_core::AssetRef;
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, Weak};

/// An input a preview computation can depend on
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum DependencyKey {
    /// The remove-by-mask settings attached to a renderer
    Settings(RendererId),
    /// The mesh currently assigned to a renderer
    Mesh(RendererId),
    /// Pixel content of a committed mask asset
    Mask(AssetRef),
    /// The live edit slot of one renderer submesh
    LiveMask { renderer: RendererId, submesh: usize },
}

type InvalidationCallback = Box<dyn FnOnce() + Send>;

/// Shared flag flipped once when any observed dependency changes
#[derive(Default)]
pub struct InvalidationToken {
    invalidated: AtomicBool,
    callbacks: Mutex<Vec<InvalidationCallback>>,
}

impl InvalidationToken {
    pub fn is_invalidated(&self) -> bool {
        self.invalidated.load(Ordering::Acquire)
    }

    /// Mark as invalidated; callbacks run on the first call only
    pub fn invalidate(&self) {
        if self.invalidated.swap(true, Ordering::AcqRel) {
            return;
        }
        let callbacks = std::mem::take(
            &mut *self
                .callbacks
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner()),
        );
        for callback in callbacks {
            callback();
        }
    }

    fn on_invalidate(&self, callback: InvalidationCallback) {
        let mut callbacks = self
            .callbacks
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        if !self.is_invalidated() {
            callbacks.push(callback);
            return;
        }
        drop(callbacks);
        callback();
    }
}

impl fmt::Debug for InvalidationToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InvalidationToken")
            .field("invalidated", &self.is_invalidated())
            .finish_non_exhaustive()
    }
}

impl Cancellation for InvalidationToken {
    fn is_cancelled(&self) -> bool {
        self.is_invalidated()
    }
}

/// Publish/subscribe registry keyed by [`DependencyKey`]
#[derive(Debug, Default)]
pub struct InvalidationHub {
    subscribers: Mutex<HashMap<DependencyKey, Vec<Weak<InvalidationToken>>>>,
}

impl InvalidationHub {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Add `token` under `key`, dropping entries of contexts that are gone or
    /// already invalidated
    fn subscribe(&self, key: DependencyKey, token: &Arc<InvalidationToken>) {
        let mut subscribers = self
            .subscribers
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        let tokens = subscribers.entry(key).or_default();
        tokens.retain(|t| t.upgrade().is_some_and(|t| !t.is_invalidated()));
        tokens.push(Arc::downgrade(token));
    }

    /// Report that `key` changed. Every live context that observed it is
    /// invalidated; returns how many were.
    pub fn notify(&self, key: &DependencyKey) -> usize {
        let subscribers = self
            .subscribers
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .remove(key)
            .unwrap_or_default();

        let mut invalidated = 0;
        for token in subscribers.iter().filter_map(Weak::upgrade) {
            if !token.is_invalidated() {
                invalidated += 1;
            }
            token.invalidate();
        }
        log::trace!("{:?} changed, {} computations invalidated", key, invalidated);
        invalidated
    }

    /// Live subscriptions for `key`
    pub fn subscriber_count(&self, key: &DependencyKey) -> usize {
        self.subscribers
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .get(key)
            .map_or(0, |tokens| {
                tokens
                    .iter()
                    .filter(|t| t.upgrade().is_some_and(|t| !t.is_invalidated()))
                    .count()
            })
    }
}

/// Dependency-recording context for one computation
#[derive(Debug)]
pub struct ComputeContext {
    hub: Arc<InvalidationHub>,
    token: Arc<InvalidationToken>,
    observed: Mutex<HashSet<DependencyKey>>,
}

impl ComputeContext {
    pub fn new(hub: Arc<InvalidationHub>) -> Self {
        Self {
            hub,
            token: Arc::new(InvalidationToken::default()),
            observed: Mutex::new(HashSet::new()),
        }
    }

    pub fn hub(&self) -> &Arc<InvalidationHub> {
        &self.hub
    }

    /// Register a read dependency on `key`
    pub fn observe(&self, key: DependencyKey) {
        let newly_observed = self
            .observed
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .insert(key.clone());
        if newly_observed {
            self.hub.subscribe(key, &self.token);
        }
    }

    /// Register `key` and hand `value` back, for use inline
    pub fn observe_value<T>(&self, key: DependencyKey, value: T) -> T {
        self.observe(key);
        value
    }

    /// Every key observed so far
    pub fn observed(&self) -> HashSet<DependencyKey> {
        self.observed
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    pub fn is_invalidated(&self) -> bool {
        self.token.is_invalidated()
    }

    pub fn invalidate(&self) {
        self.token.invalidate();
    }

    /// Run `callback` once when this context is invalidated (immediately if it already is)
    pub fn on_invalidate<F>(&self, callback: F)
    where
        F: FnOnce() + Send + 'static,
    {
        self.token.on_invalidate(Box::new(callback));
    }

    /// Cancellation handle usable from worker threads
    pub fn token(&self) -> Arc<InvalidationToken> {
        self.token.clone()
    }
}

impl Cancellation for ComputeContext {
    fn is_cancelled(&self) -> bool {
        self.is_invalidated()
    }
}
