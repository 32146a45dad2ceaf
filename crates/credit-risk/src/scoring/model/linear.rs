use serde::{Deserialize, Serialize};

use super::{ClassProbabilities, ClassifierError, Explanation, ModelLoadError};
use crate::scoring::domain::{FeatureVector, FEATURE_COUNT};

/// Logistic regression over the raw feature vector.
///
/// Only a validated model can score, so fields stay private and construction
/// goes through [`LogisticRegressionModel::new`] or the artifact loader.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogisticRegressionModel {
    intercept: f64,
    coefficients: Vec<f64>,
    /// Training-set column means used as the explanation baseline.
    #[serde(default)]
    feature_means: Option<Vec<f64>>,
}

impl LogisticRegressionModel {
    pub fn new(
        intercept: f64,
        coefficients: Vec<f64>,
        feature_means: Option<Vec<f64>>,
    ) -> Result<Self, ModelLoadError> {
        let model = Self {
            intercept,
            coefficients,
            feature_means,
        };
        model.validate().map_err(ModelLoadError::Invalid)?;
        Ok(model)
    }

    pub fn intercept(&self) -> f64 {
        self.intercept
    }

    pub fn coefficients(&self) -> &[f64] {
        &self.coefficients
    }

    pub(crate) fn validate(&self) -> Result<(), String> {
        if self.coefficients.len() != FEATURE_COUNT {
            return Err(format!(
                "expected {FEATURE_COUNT} coefficients, found {}",
                self.coefficients.len()
            ));
        }
        if let Some(means) = &self.feature_means {
            if means.len() != FEATURE_COUNT {
                return Err(format!(
                    "expected {FEATURE_COUNT} feature means, found {}",
                    means.len()
                ));
            }
            if means.iter().any(|mean| !mean.is_finite()) {
                return Err("feature means must be finite".to_string());
            }
        }
        if !self.intercept.is_finite() || self.coefficients.iter().any(|c| !c.is_finite()) {
            return Err("coefficients must be finite".to_string());
        }
        Ok(())
    }

    pub(crate) fn margin(&self, features: &FeatureVector) -> f64 {
        self.intercept
            + self
                .coefficients
                .iter()
                .zip(features.values())
                .map(|(weight, value)| weight * value)
                .sum::<f64>()
    }

    pub(crate) fn predict_proba(
        &self,
        features: &FeatureVector,
    ) -> Result<ClassProbabilities, ClassifierError> {
        ClassProbabilities::from_margin(self.margin(features))
    }

    pub(crate) fn explain(&self, features: &FeatureVector) -> Explanation {
        let zeros = [0.0; FEATURE_COUNT];
        let means = self.feature_means.as_deref().unwrap_or(&zeros);

        let mut contributions = [0.0; FEATURE_COUNT];
        let mut base_value = self.intercept;
        for (index, contribution) in contributions.iter_mut().enumerate() {
            let weight = self.coefficients[index];
            *contribution = weight * (features.values()[index] - means[index]);
            base_value += weight * means[index];
        }

        Explanation::from_contributions(base_value, features, contributions)
    }
}
