//! Applicant intake, feature encoding, and classifier scoring.
//!
//! Raw answers are validated into typed attributes, encoded into the fixed
//! 11-column vector the model was trained on, and scored by a
//! [`RiskClassifier`]. Index 1 of every probability pair is the high-risk
//! class.

pub mod domain;
pub mod draft;
pub mod encoder;
pub mod import;
pub mod model;
pub mod router;
pub mod service;

#[cfg(test)]
mod tests;

pub use domain::{
    ApplicantAttributes, ApplicantSubmission, Feature, FeatureVector, HomeOwnership, LoanGrade,
    LoanIntent, NamedFeature, PriorDefault, RiskLabel, FEATURE_COUNT, FEATURE_NAMES,
};
pub use draft::{ApplicantDraft, CreditHistory, IntakeStep, LoanDetails, PersonalDetails};
pub use encoder::{loan_to_income, EncodingError, FeatureEncoder};
pub use import::{ApplicantCsvImporter, ApplicantImportError, ImportedRow};
pub use model::{
    ClassProbabilities, ClassifierError, Explanation, FeatureAttribution, FeatureExplainer,
    LoadedModel, ModelArtifact, ModelLoadError, RiskClassifier,
};
pub use router::assessment_router;
pub use service::{
    AssessmentError, ExplainedAssessment, ExplainedAssessmentView, RiskAssessment,
    RiskAssessmentService, RiskAssessmentView,
};
