//! Sanity checks for the mock classifiers used across the test suite

mod common;

use common::{sample_tensor, ExclusiveClassifier, FailingClassifier, FixedClassifier};
use std::time::Duration;
use summitlens_classifiers::ImageClassifier;

#[tokio::test]
async fn test_fixed_classifier_basic() {
    let classifier = FixedClassifier::one_hot(2, 0.8);

    let probs = classifier.infer(&sample_tensor()).await.unwrap();
    assert_eq!(probs.len(), 10);
    assert_eq!(probs.argmax(), Some((2, 0.8)));
    assert_eq!(classifier.call_count(), 1);
}

#[tokio::test]
async fn test_failing_classifier() {
    let classifier = FailingClassifier::new();

    let result = classifier.infer(&sample_tensor()).await;
    assert!(result.is_err());
}

#[tokio::test]
async fn test_fixed_classifier_latency() {
    let classifier = FixedClassifier::one_hot(0, 0.5).with_latency(Duration::from_millis(10));

    let start = std::time::Instant::now();
    let _ = classifier.infer(&sample_tensor()).await;
    let elapsed = start.elapsed();

    assert!(elapsed >= Duration::from_millis(10));
}

#[tokio::test]
async fn test_exclusive_classifier_sequential_calls() {
    let classifier = ExclusiveClassifier::new(Duration::from_millis(1));
    let tensor = sample_tensor();

    classifier.infer(&tensor).await.unwrap();
    classifier.infer(&tensor).await.unwrap();

    assert_eq!(classifier.calls(), 2);
    assert_eq!(classifier.overlaps(), 0);
}
