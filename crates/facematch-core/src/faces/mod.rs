pub mod comparer;
pub mod embedding;
pub mod geometry;
pub mod observation;
pub mod scorer;
pub mod weights;

pub use comparer::{
    run_face_comparison, FaceComparisonConfig, FaceComparisonOutcome, FaceComparisonReport,
};

pub use embedding::{cosine_similarity, feature_vector, FEATURE_LEN};

pub use geometry::{geometric_score, normalized_distance, GeometricScore, CANONICAL_PAIRS};

pub use observation::{BoundingBox, FaceObservation, LandmarkKind, Landmarks, Point};

pub use scorer::{
    compare, ComparisonOutcome, FaceScorer, Locale, ScoreBreakdown, SimilarityResult,
};

pub use weights::ScoringWeights;
