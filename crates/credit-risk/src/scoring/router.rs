use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::json;

use super::domain::{
    ApplicantSubmission, HomeOwnership, LoanGrade, LoanIntent, PriorDefault, FEATURE_NAMES,
};
use super::model::{FeatureExplainer, RiskClassifier};
use super::service::{AssessmentError, RiskAssessmentService};

/// Router builder exposing HTTP endpoints for scoring and explanation.
pub fn assessment_router<M>(service: Arc<RiskAssessmentService<M>>) -> Router
where
    M: RiskClassifier + FeatureExplainer + 'static,
{
    Router::new()
        .route("/api/v1/risk/assessments", post(assess_handler::<M>))
        .route("/api/v1/risk/explanations", post(explain_handler::<M>))
        .route("/api/v1/risk/schema", get(schema_handler))
        .with_state(service)
}

pub(crate) async fn assess_handler<M>(
    State(service): State<Arc<RiskAssessmentService<M>>>,
    payload: Result<Json<ApplicantSubmission>, JsonRejection>,
) -> Response
where
    M: RiskClassifier + FeatureExplainer + 'static,
{
    let Json(submission) = match payload {
        Ok(payload) => payload,
        Err(rejection) => return rejection_response(rejection),
    };

    match service.assess(&submission) {
        Ok(assessment) => (StatusCode::OK, Json(assessment.view())).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn explain_handler<M>(
    State(service): State<Arc<RiskAssessmentService<M>>>,
    payload: Result<Json<ApplicantSubmission>, JsonRejection>,
) -> Response
where
    M: RiskClassifier + FeatureExplainer + 'static,
{
    let Json(submission) = match payload {
        Ok(payload) => payload,
        Err(rejection) => return rejection_response(rejection),
    };

    match service.explain(&submission) {
        Ok(explained) => (StatusCode::OK, Json(explained.view())).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn schema_handler() -> Json<serde_json::Value> {
    Json(json!({
        "feature_names": FEATURE_NAMES,
        "categories": {
            "home_ownership": HomeOwnership::LABELS,
            "loan_intent": LoanIntent::LABELS,
            "loan_grade": LoanGrade::LABELS,
            "prior_default": PriorDefault::ALL.map(PriorDefault::label),
        },
    }))
}

/// Malformed bodies keep axum's status but get the same JSON error shape.
fn rejection_response(rejection: JsonRejection) -> Response {
    let payload = json!({
        "error": rejection.body_text(),
    });
    (rejection.status(), Json(payload)).into_response()
}

fn error_response(err: AssessmentError) -> Response {
    let status = match &err {
        AssessmentError::Encoding(_) => StatusCode::UNPROCESSABLE_ENTITY,
        AssessmentError::Classifier(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    let payload = json!({
        "error": err.to_string(),
    });
    (status, Json(payload)).into_response()
}
