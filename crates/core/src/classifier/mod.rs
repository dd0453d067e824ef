//! Contract for the post-curation classification service.
//!
//! The curation loop never calls a classifier. Callers take a finished
//! [`CurationRun`](crate::orchestrator::CurationRun), build requests with
//! `classification_requests`, and hand them to any [`Classifier`], usually
//! wrapped in a [`RetryingClassifier`].

mod retry;
mod types;

pub use retry::{RetryPolicy, RetryingClassifier};
pub use types::{
    ClassificationOutcome, ClassificationRequest, ClassificationResult, Classifier,
    ClassifierError,
};
