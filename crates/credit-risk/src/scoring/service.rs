use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, info, warn};

use super::domain::{ApplicantSubmission, FeatureVector, NamedFeature, RiskLabel};
use super::encoder::{EncodingError, FeatureEncoder};
use super::model::{
    ClassProbabilities, ClassifierError, Explanation, FeatureExplainer, RiskClassifier,
};

/// Service composing the feature encoder with a pre-trained classifier.
pub struct RiskAssessmentService<M> {
    encoder: FeatureEncoder,
    model: Arc<M>,
}

impl<M> RiskAssessmentService<M>
where
    M: RiskClassifier + 'static,
{
    pub fn new(model: Arc<M>) -> Self {
        Self {
            encoder: FeatureEncoder::new(),
            model,
        }
    }

    pub fn encoder(&self) -> &FeatureEncoder {
        &self.encoder
    }

    pub fn model(&self) -> &Arc<M> {
        &self.model
    }

    /// Encode a submission and run it through the classifier.
    pub fn assess(
        &self,
        submission: &ApplicantSubmission,
    ) -> Result<RiskAssessment, AssessmentError> {
        let features = self.encode(submission)?;
        self.score(features)
    }

    fn encode(&self, submission: &ApplicantSubmission) -> Result<FeatureVector, AssessmentError> {
        self.encoder.encode_submission(submission).map_err(|err| {
            warn!(field = err.field(), "rejected applicant submission");
            AssessmentError::from(err)
        })
    }

    fn score(&self, features: FeatureVector) -> Result<RiskAssessment, AssessmentError> {
        let probabilities = self.model.predict_proba(&features)?;
        let label = probabilities.label_at(self.model.decision_threshold());

        info!(
            verdict = label.label(),
            high_risk_probability = probabilities.high_risk(),
            "credit risk assessed"
        );

        Ok(RiskAssessment {
            label,
            probabilities,
            features,
            assessed_at: Utc::now(),
        })
    }
}

impl<M> RiskAssessmentService<M>
where
    M: RiskClassifier + FeatureExplainer + 'static,
{
    /// Assess a submission and attach per-feature attributions.
    pub fn explain(
        &self,
        submission: &ApplicantSubmission,
    ) -> Result<ExplainedAssessment, AssessmentError> {
        let features = self.encode(submission)?;
        let explanation = self.model.explain(&features)?;
        debug!(base_value = explanation.base_value, "attributions computed");
        let assessment = self.score(features)?;

        Ok(ExplainedAssessment {
            assessment,
            explanation,
        })
    }
}

/// Outcome of a single scoring request.
#[derive(Debug, Clone, PartialEq)]
pub struct RiskAssessment {
    pub label: RiskLabel,
    pub probabilities: ClassProbabilities,
    pub features: FeatureVector,
    pub assessed_at: DateTime<Utc>,
}

impl RiskAssessment {
    pub fn high_risk_probability(&self) -> f64 {
        self.probabilities.high_risk()
    }

    pub fn loan_to_income(&self) -> f64 {
        self.features.loan_to_income()
    }

    pub fn summary(&self) -> String {
        format!(
            "{} ({:.2}% probability of high risk, loan-to-income {:.2}%)",
            self.label,
            self.high_risk_probability() * 100.0,
            self.loan_to_income() * 100.0
        )
    }

    pub fn view(&self) -> RiskAssessmentView {
        RiskAssessmentView {
            verdict: self.label,
            verdict_label: self.label.label(),
            high_risk_probability: self.probabilities.high_risk(),
            low_risk_probability: self.probabilities.low_risk(),
            loan_to_income: self.loan_to_income(),
            features: self.features.named(),
            assessed_at: self.assessed_at,
        }
    }
}

/// Assessment paired with the attribution breakdown for the same vector.
#[derive(Debug, Clone, PartialEq)]
pub struct ExplainedAssessment {
    pub assessment: RiskAssessment,
    pub explanation: Explanation,
}

impl ExplainedAssessment {
    pub fn view(&self) -> ExplainedAssessmentView {
        ExplainedAssessmentView {
            assessment: self.assessment.view(),
            explanation: self.explanation.clone(),
        }
    }
}

/// Serialized shape of an assessment for API responses.
#[derive(Debug, Clone, Serialize)]
pub struct RiskAssessmentView {
    pub verdict: RiskLabel,
    pub verdict_label: &'static str,
    pub high_risk_probability: f64,
    pub low_risk_probability: f64,
    pub loan_to_income: f64,
    pub features: Vec<NamedFeature>,
    pub assessed_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ExplainedAssessmentView {
    #[serde(flatten)]
    pub assessment: RiskAssessmentView,
    pub explanation: Explanation,
}

/// Error raised by the assessment service.
#[derive(Debug, thiserror::Error)]
pub enum AssessmentError {
    #[error(transparent)]
    Encoding(#[from] EncodingError),
    #[error(transparent)]
    Classifier(#[from] ClassifierError),
}
