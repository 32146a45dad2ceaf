use std::sync::Arc;

use axum::response::Response;
use serde_json::Value;

use crate::scoring::domain::{ApplicantSubmission, FeatureVector, FEATURE_COUNT, FEATURE_NAMES};
use crate::scoring::model::{
    ClassProbabilities, ClassifierError, Explanation, FeatureExplainer, LoadedModel,
    ModelArtifact, RiskClassifier,
};
use crate::scoring::{assessment_router, FeatureEncoder, RiskAssessmentService};

pub(super) fn encoder() -> FeatureEncoder {
    FeatureEncoder::new()
}

/// Applicant from the reference walkthrough.
pub(super) fn submission() -> ApplicantSubmission {
    ApplicantSubmission {
        age: 30,
        income: 50_000,
        home_ownership: "MORTGAGE".to_string(),
        employment_length: 5,
        loan_intent: "PERSONAL".to_string(),
        loan_grade: "B".to_string(),
        loan_amount: 10_000,
        interest_rate: 10.0,
        prior_default: "No".to_string(),
        credit_history_length: 8,
    }
}

pub(super) fn risky_submission() -> ApplicantSubmission {
    ApplicantSubmission {
        age: 23,
        income: 18_000,
        home_ownership: "RENT".to_string(),
        employment_length: 0,
        loan_intent: "VENTURE".to_string(),
        loan_grade: "F".to_string(),
        loan_amount: 12_000,
        interest_rate: 21.5,
        prior_default: "Yes".to_string(),
        credit_history_length: 2,
    }
}

pub(super) fn unknown_home_submission() -> ApplicantSubmission {
    let mut submission = submission();
    submission.home_ownership = "UNKNOWN".to_string();
    submission
}

fn feature_names_json() -> String {
    serde_json::to_string(&FEATURE_NAMES).expect("names serialize")
}

/// Logistic model weighting loan-to-income, grade, and prior default.
pub(super) fn logistic_model() -> LoadedModel {
    let raw = format!(
        r#"{{
            "feature_names": {names},
            "model": {{
                "kind": "logistic_regression",
                "intercept": -4.0,
                "coefficients": [0.0, 0.0, 0.2, -0.05, 0.0, 0.45, 0.0, 0.08, 6.0, 0.9, -0.02],
                "feature_means": [28.0, 66000.0, 2.0, 4.8, 2.5, 1.2, 9600.0, 11.0, 0.17, 0.18, 5.8]
            }}
        }}"#,
        names = feature_names_json()
    );
    ModelArtifact::from_json_str(&raw).expect("logistic artifact loads")
}

/// Two shallow trees splitting on loan-to-income and loan grade.
pub(super) fn tree_model() -> LoadedModel {
    let raw = format!(
        r#"{{
            "feature_names": {names},
            "model": {{
                "kind": "tree_ensemble",
                "base_score": -1.2,
                "trees": [
                    {{ "nodes": [
                        {{ "feature": 8, "threshold": 0.3, "left": 1, "right": 2, "value": -0.1 }},
                        {{ "leaf": -0.4 }},
                        {{ "feature": 5, "threshold": 3.0, "left": 3, "right": 4, "value": 0.9 }},
                        {{ "leaf": 0.5 }},
                        {{ "leaf": 1.6 }}
                    ] }},
                    {{ "nodes": [
                        {{ "feature": 9, "threshold": 0.5, "left": 1, "right": 2, "value": 0.05 }},
                        {{ "leaf": -0.2 }},
                        {{ "leaf": 0.8 }}
                    ] }}
                ]
            }}
        }}"#,
        names = feature_names_json()
    );
    ModelArtifact::from_json_str(&raw).expect("tree artifact loads")
}

/// Classifier returning a fixed high-risk probability.
pub(super) struct FixedClassifier(pub(super) f64);

impl RiskClassifier for FixedClassifier {
    fn predict_proba(
        &self,
        _features: &FeatureVector,
    ) -> Result<ClassProbabilities, ClassifierError> {
        ClassProbabilities::from_high_risk(self.0)
    }
}

impl FeatureExplainer for FixedClassifier {
    fn explain(&self, features: &FeatureVector) -> Result<Explanation, ClassifierError> {
        Ok(Explanation::from_contributions(
            0.0,
            features,
            [0.0; FEATURE_COUNT],
        ))
    }
}

/// Classifier whose backing runtime has gone away.
pub(super) struct BrokenClassifier;

impl RiskClassifier for BrokenClassifier {
    fn predict_proba(
        &self,
        _features: &FeatureVector,
    ) -> Result<ClassProbabilities, ClassifierError> {
        Err(ClassifierError::Unavailable("runtime offline".to_string()))
    }
}

impl FeatureExplainer for BrokenClassifier {
    fn explain(&self, _features: &FeatureVector) -> Result<Explanation, ClassifierError> {
        Err(ClassifierError::Unavailable("runtime offline".to_string()))
    }
}

pub(super) fn build_service() -> RiskAssessmentService<LoadedModel> {
    RiskAssessmentService::new(Arc::new(logistic_model()))
}

pub(super) fn router_with_service<M>(service: RiskAssessmentService<M>) -> axum::Router
where
    M: RiskClassifier + FeatureExplainer + 'static,
{
    assessment_router(Arc::new(service))
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}

pub(super) fn assert_close(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() < 1e-9,
        "expected {expected}, got {actual}"
    );
}
