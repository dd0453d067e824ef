pub mod classifier;
pub mod config;
pub mod filter;
pub mod metrics;
pub mod orchestrator;
pub mod pagination;
pub mod searcher;
pub mod testing;

pub use classifier::{
    ClassificationRequest, ClassificationResult, Classifier, ClassifierError, RetryPolicy,
    RetryingClassifier,
};
pub use config::{
    load_config, load_config_from_str, validate_config, Config, ConfigError, SanitizedConfig,
};
pub use filter::{
    FilterCriteria, FilterError, QualifiedVideo, QualityDistribution, QualityFilter, QualityGrade,
    SortBy,
};
pub use orchestrator::{
    CostLedger, CurationError, CurationReport, CurationRun, Curator, OrchestratorConfig,
};
pub use pagination::{
    decide, PaginationConfig, PaginationDecision, PaginationState, RecommendedAction, StopReason,
};
pub use searcher::{
    CandidateReference, MetadataError, MetadataFetcher, SearchError, SearchPage, SearchResponse,
    Searcher, VideoDetails, YouTubeClient,
};
