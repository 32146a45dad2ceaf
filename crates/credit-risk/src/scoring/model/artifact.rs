use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::info;

use super::linear::LogisticRegressionModel;
use super::trees::TreeEnsembleModel;
use super::{
    ClassProbabilities, ClassifierError, Explanation, FeatureExplainer, RiskClassifier,
    DEFAULT_DECISION_THRESHOLD,
};
use crate::scoring::domain::{FeatureVector, FEATURE_NAMES};

/// Errors raised while loading the serialized classifier at startup.
#[derive(Debug, thiserror::Error)]
pub enum ModelLoadError {
    #[error("model file not found at {}", .path.display())]
    NotFound { path: PathBuf },
    #[error("failed to read model file {}: {source}", .path.display())]
    Io { path: PathBuf, source: io::Error },
    #[error("model artifact is corrupt: {0}")]
    Corrupt(#[from] serde_json::Error),
    #[error("model was trained on features {found:?}, expected {expected:?}")]
    FeatureMismatch {
        expected: Vec<String>,
        found: Vec<String>,
    },
    #[error("model artifact is invalid: {0}")]
    Invalid(String),
}

/// On-disk representation of a trained classifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelArtifact {
    pub feature_names: Vec<String>,
    pub model: ModelSpec,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ModelSpec {
    LogisticRegression(LogisticRegressionModel),
    TreeEnsemble(TreeEnsembleModel),
}

impl ModelSpec {
    pub fn kind(&self) -> &'static str {
        match self {
            ModelSpec::LogisticRegression(_) => "logistic_regression",
            ModelSpec::TreeEnsemble(_) => "tree_ensemble",
        }
    }
}

impl ModelArtifact {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<LoadedModel, ModelLoadError> {
        let path = path.as_ref();
        let file = fs::File::open(path).map_err(|source| match source.kind() {
            io::ErrorKind::NotFound => ModelLoadError::NotFound {
                path: path.to_path_buf(),
            },
            _ => ModelLoadError::Io {
                path: path.to_path_buf(),
                source,
            },
        })?;

        let model = Self::from_reader(io::BufReader::new(file))?;
        info!(path = %path.display(), kind = model.kind(), "credit risk model loaded");
        Ok(model)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<LoadedModel, ModelLoadError> {
        let artifact: ModelArtifact = serde_json::from_reader(reader)?;
        artifact.into_model()
    }

    pub fn from_json_str(raw: &str) -> Result<LoadedModel, ModelLoadError> {
        let artifact: ModelArtifact = serde_json::from_str(raw)?;
        artifact.into_model()
    }

    /// Check the artifact against the encoder's schema and build a classifier.
    pub fn into_model(self) -> Result<LoadedModel, ModelLoadError> {
        if self.feature_names.iter().map(String::as_str).ne(FEATURE_NAMES) {
            return Err(ModelLoadError::FeatureMismatch {
                expected: FEATURE_NAMES.iter().map(|name| name.to_string()).collect(),
                found: self.feature_names,
            });
        }

        match &self.model {
            ModelSpec::LogisticRegression(model) => model.validate(),
            ModelSpec::TreeEnsemble(model) => model.validate(),
        }
        .map_err(ModelLoadError::Invalid)?;

        Ok(LoadedModel {
            spec: self.model,
            decision_threshold: DEFAULT_DECISION_THRESHOLD,
        })
    }
}

/// A validated classifier ready to score encoded applicants.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadedModel {
    spec: ModelSpec,
    decision_threshold: f64,
}

impl LoadedModel {
    pub fn with_decision_threshold(mut self, threshold: f64) -> Self {
        self.decision_threshold = threshold;
        self
    }

    pub fn decision_threshold(&self) -> f64 {
        self.decision_threshold
    }

    pub fn kind(&self) -> &'static str {
        self.spec.kind()
    }

    pub fn spec(&self) -> &ModelSpec {
        &self.spec
    }

    pub fn margin(&self, features: &FeatureVector) -> f64 {
        match &self.spec {
            ModelSpec::LogisticRegression(model) => model.margin(features),
            ModelSpec::TreeEnsemble(model) => model.margin(features),
        }
    }
}

impl RiskClassifier for LoadedModel {
    fn predict_proba(
        &self,
        features: &FeatureVector,
    ) -> Result<ClassProbabilities, ClassifierError> {
        match &self.spec {
            ModelSpec::LogisticRegression(model) => model.predict_proba(features),
            ModelSpec::TreeEnsemble(model) => model.predict_proba(features),
        }
    }

    fn decision_threshold(&self) -> f64 {
        self.decision_threshold
    }
}

impl FeatureExplainer for LoadedModel {
    fn explain(&self, features: &FeatureVector) -> Result<Explanation, ClassifierError> {
        let explanation = match &self.spec {
            ModelSpec::LogisticRegression(model) => model.explain(features),
            ModelSpec::TreeEnsemble(model) => model.explain(features),
        };
        if explanation.base_value.is_finite()
            && explanation
                .attributions
                .iter()
                .all(|attribution| attribution.contribution.is_finite())
        {
            Ok(explanation)
        } else {
            Err(ClassifierError::NonFinite)
        }
    }
}
