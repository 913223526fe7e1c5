//! Classifier trait and concurrency wrappers

use crate::preprocess::ImageTensor;
use async_trait::async_trait;
use std::sync::Arc;
use summitlens_core::{Error, ProbabilityVector, Result};
use tokio::sync::Mutex;

/// Trait for all image classifiers
///
/// Implementations must return one score per catalog class, in catalog order.
#[async_trait]
pub trait ImageClassifier: Send + Sync {
    /// Score the given input tensor
    async fn infer(&self, tensor: &ImageTensor) -> Result<ProbabilityVector>;

    /// Get the classifier name
    fn name(&self) -> &str;

    /// Number of classes the classifier scores
    fn num_classes(&self) -> usize;
}

#[async_trait]
impl<T: ImageClassifier + ?Sized> ImageClassifier for Arc<T> {
    async fn infer(&self, tensor: &ImageTensor) -> Result<ProbabilityVector> {
        (**self).infer(tensor).await
    }

    fn name(&self) -> &str {
        (**self).name()
    }

    fn num_classes(&self) -> usize {
        (**self).num_classes()
    }
}

/// Runs at most one inference at a time on a non-reentrant backend.
pub struct SerializedClassifier<C> {
    inner: Arc<C>,
    gate: Arc<Mutex<()>>,
}

impl<C: ImageClassifier + 'static> SerializedClassifier<C> {
    /// Wrap a classifier so concurrent requests queue for it
    pub fn new(inner: C) -> Self {
        Self {
            inner: Arc::new(inner),
            gate: Arc::new(Mutex::new(())),
        }
    }

    /// Access the wrapped classifier
    pub fn inner(&self) -> &C {
        &self.inner
    }
}

#[async_trait]
impl<C: ImageClassifier + 'static> ImageClassifier for SerializedClassifier<C> {
    async fn infer(&self, tensor: &ImageTensor) -> Result<ProbabilityVector> {
        let guard = Arc::clone(&self.gate).lock_owned().await;
        let inner = Arc::clone(&self.inner);
        let tensor = tensor.clone();

        // The spawned task owns the guard, so a caller that times out cannot
        // release the gate while the backend is still running.
        tokio::spawn(async move {
            let _guard = guard;
            inner.infer(&tensor).await
        })
        .await
        .map_err(|e| Error::inference(format!("classifier task failed: {}", e)))?
    }

    fn name(&self) -> &str {
        self.inner.name()
    }

    fn num_classes(&self) -> usize {
        self.inner.num_classes()
    }
}
