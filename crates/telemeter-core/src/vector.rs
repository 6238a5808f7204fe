//! Label vector: one lazily built metric per distinct label combination.
//!
//! Children are keyed by the 64-bit hash of their canonical label string.
//! A miss builds the child outside any lock and installs it with an
//! insert-if-absent; when two callers race on the same key the first install
//! wins and the other instance is dropped. Constructors must therefore be
//! free of side effects.

use std::sync::Arc;

use dashmap::DashMap;

use crate::collector::{DescriptionSink, Metric, MetricSink};
use crate::label::Labels;

type Creator<M> = Box<dyn Fn(&[String]) -> M + Send + Sync>;

pub struct Vector<M> {
    declared: Labels,
    children: DashMap<u64, M>,
    creator: Creator<M>,
}

impl<M: Clone> Vector<M> {
    /// `creator` receives the full token list (declared followed by dynamic)
    /// and must return a fresh metric built from it.
    pub fn new<F>(declared: Labels, creator: F) -> Self
    where
        F: Fn(&[String]) -> M + Send + Sync + 'static,
    {
        Self {
            declared,
            children: DashMap::new(),
            creator: Box::new(creator),
        }
    }

    /// Child for `declared ∪ labels`, created on first request.
    pub fn with<S: AsRef<str>>(&self, labels: &[S]) -> M {
        let mut tokens = self.declared.to_tokens();
        tokens.extend(labels.iter().map(|s| s.as_ref().to_string()));

        let hash = Labels::new().with(tokens.iter().cloned()).hash64();
        if let Some(hit) = self.children.get(&hash) {
            return hit.value().clone();
        }

        let fresh = (self.creator)(&tokens);
        let winner = self.children.entry(hash).or_insert(fresh);
        if tracing::enabled!(tracing::Level::TRACE) {
            tracing::trace!(hash, labels = %Labels::new().with(tokens), "label vector child ready");
        }
        winner.value().clone()
    }

    pub fn len(&self) -> usize {
        self.children.len()
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    /// Snapshot of the current children (no map guards held afterwards).
    pub fn children(&self) -> Vec<M> {
        self.children.iter().map(|e| e.value().clone()).collect()
    }
}

impl<M: Metric + Clone + 'static> Vector<M> {
    /// Only the root shape is advertised.
    pub fn describe_root(&self, root: &M, sink: &mut dyn DescriptionSink) {
        sink.send(Arc::clone(root.description()));
    }

    /// Every child, or `root` itself while no child exists.
    pub fn collect_with_root(&self, root: &M, sink: &mut dyn MetricSink) {
        let children = self.children();
        if children.is_empty() {
            sink.send(Arc::new(root.clone()));
            return;
        }
        for child in children {
            sink.send(Arc::new(child));
        }
    }
}
