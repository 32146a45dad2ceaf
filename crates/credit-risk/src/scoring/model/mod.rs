//! Classifier seam plus the serialized model formats the service can load.

mod artifact;
mod linear;
mod trees;

pub use artifact::{LoadedModel, ModelArtifact, ModelLoadError, ModelSpec};
pub use linear::LogisticRegressionModel;
pub use trees::{DecisionTree, TreeEnsembleModel, TreeNode};

use serde::Serialize;

use super::domain::{Feature, FeatureVector, RiskLabel};

pub const DEFAULT_DECISION_THRESHOLD: f64 = 0.5;

/// Pre-trained binary classifier consuming an encoded applicant.
pub trait RiskClassifier: Send + Sync {
    fn predict_proba(&self, features: &FeatureVector)
        -> Result<ClassProbabilities, ClassifierError>;

    /// High-risk probability at or above which `predict` reports high risk.
    fn decision_threshold(&self) -> f64 {
        DEFAULT_DECISION_THRESHOLD
    }

    fn predict(&self, features: &FeatureVector) -> Result<RiskLabel, ClassifierError> {
        Ok(self
            .predict_proba(features)?
            .label_at(self.decision_threshold()))
    }
}

/// Per-feature attribution of a single prediction, relative to a baseline.
pub trait FeatureExplainer: Send + Sync {
    fn explain(&self, features: &FeatureVector) -> Result<Explanation, ClassifierError>;
}

/// Failure raised by a classifier while scoring an already encoded vector.
#[derive(Debug, thiserror::Error)]
pub enum ClassifierError {
    #[error("classifier produced a non-finite output")]
    NonFinite,
    #[error("classifier unavailable: {0}")]
    Unavailable(String),
}

/// Class probabilities; index 0 is low risk, index 1 is high risk.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ClassProbabilities {
    low_risk: f64,
    high_risk: f64,
}

impl ClassProbabilities {
    pub fn from_high_risk(high_risk: f64) -> Result<Self, ClassifierError> {
        if !high_risk.is_finite() {
            return Err(ClassifierError::NonFinite);
        }
        let high_risk = high_risk.clamp(0.0, 1.0);
        Ok(Self {
            low_risk: 1.0 - high_risk,
            high_risk,
        })
    }

    pub fn from_margin(margin: f64) -> Result<Self, ClassifierError> {
        if margin.is_nan() {
            return Err(ClassifierError::NonFinite);
        }
        Self::from_high_risk(sigmoid(margin))
    }

    pub fn low_risk(&self) -> f64 {
        self.low_risk
    }

    pub fn high_risk(&self) -> f64 {
        self.high_risk
    }

    pub fn as_array(&self) -> [f64; 2] {
        [self.low_risk, self.high_risk]
    }

    pub fn label_at(&self, threshold: f64) -> RiskLabel {
        if self.high_risk >= threshold {
            RiskLabel::HighRisk
        } else {
            RiskLabel::LowRisk
        }
    }
}

/// Attribution output: `base_value` plus the contributions equals the raw margin.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Explanation {
    pub base_value: f64,
    pub attributions: Vec<FeatureAttribution>,
}

impl Explanation {
    pub(crate) fn from_contributions(
        base_value: f64,
        features: &FeatureVector,
        contributions: [f64; super::domain::FEATURE_COUNT],
    ) -> Self {
        let attributions = Feature::ALL
            .iter()
            .map(|feature| FeatureAttribution {
                feature: feature.name(),
                value: features.get(*feature),
                contribution: contributions[feature.index()],
            })
            .collect();

        Self {
            base_value,
            attributions,
        }
    }

    pub fn margin(&self) -> f64 {
        self.base_value
            + self
                .attributions
                .iter()
                .map(|attribution| attribution.contribution)
                .sum::<f64>()
    }

    /// Attributions ordered by absolute contribution, largest first.
    pub fn ranked(&self) -> Vec<&FeatureAttribution> {
        let mut ranked: Vec<&FeatureAttribution> = self.attributions.iter().collect();
        ranked.sort_by(|a, b| b.contribution.abs().total_cmp(&a.contribution.abs()));
        ranked
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeatureAttribution {
    pub feature: &'static str,
    pub value: f64,
    pub contribution: f64,
}

pub(crate) fn sigmoid(margin: f64) -> f64 {
    if margin >= 0.0 {
        1.0 / (1.0 + (-margin).exp())
    } else {
        let e = margin.exp();
        e / (1.0 + e)
    }
}
