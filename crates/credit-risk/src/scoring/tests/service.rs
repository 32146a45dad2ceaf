use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use super::common::*;
use crate::scoring::domain::{FeatureVector, RiskLabel};
use crate::scoring::encoder::EncodingError;
use crate::scoring::model::{ClassProbabilities, ClassifierError, RiskClassifier};
use crate::scoring::service::{AssessmentError, RiskAssessmentService};

#[test]
fn assess_reports_verdict_probability_and_ratio() {
    let service = build_service();

    let assessment = service.assess(&submission()).expect("assessment succeeds");

    assert_eq!(assessment.label, RiskLabel::LowRisk);
    assert!(assessment.high_risk_probability() < 0.5);
    assert_close(
        assessment.probabilities.low_risk() + assessment.probabilities.high_risk(),
        1.0,
    );
    assert_close(assessment.loan_to_income(), 0.2);
    assert!(assessment.summary().starts_with("LOW RISK"));
    assert!(assessment.summary().contains("loan-to-income 20.00%"));
}

#[test]
fn assess_flags_risky_applicants() {
    let service = build_service();

    let assessment = service
        .assess(&risky_submission())
        .expect("assessment succeeds");

    assert_eq!(assessment.label, RiskLabel::HighRisk);
    assert_eq!(assessment.view().verdict_label, "HIGH RISK");
}

#[test]
fn assess_surfaces_encoding_failures() {
    let service = build_service();

    match service.assess(&unknown_home_submission()) {
        Err(AssessmentError::Encoding(EncodingError::UnknownCategory { field, .. })) => {
            assert_eq!(field, "home_ownership")
        }
        other => panic!("expected encoding failure, got {other:?}"),
    }
}

#[test]
fn assess_surfaces_classifier_failures() {
    let service = RiskAssessmentService::new(Arc::new(BrokenClassifier));

    match service.assess(&submission()) {
        Err(AssessmentError::Classifier(ClassifierError::Unavailable(reason))) => {
            assert_eq!(reason, "runtime offline")
        }
        other => panic!("expected classifier failure, got {other:?}"),
    }
}

#[test]
fn fixed_classifier_uses_default_threshold() {
    let service = RiskAssessmentService::new(Arc::new(FixedClassifier(0.5)));

    let assessment = service.assess(&submission()).expect("assessment succeeds");

    assert_eq!(assessment.label, RiskLabel::HighRisk);
    assert_close(assessment.probabilities.as_array()[0], 0.5);
}

#[test]
fn explain_pairs_attributions_with_the_assessment() {
    let service = RiskAssessmentService::new(Arc::new(tree_model()));

    let explained = service
        .explain(&risky_submission())
        .expect("explanation succeeds");

    assert_eq!(explained.assessment.label, RiskLabel::HighRisk);
    assert_close(explained.explanation.margin(), 1.2);
    let view = explained.view();
    assert_eq!(view.explanation.attributions.len(), 11);
    assert_eq!(view.assessment.features[5].name, "loan_grade");
}

/// Classifier that counts calls and uses a non-default threshold.
struct CountingClassifier {
    calls: AtomicUsize,
}

impl RiskClassifier for CountingClassifier {
    fn predict_proba(
        &self,
        _features: &FeatureVector,
    ) -> Result<ClassProbabilities, ClassifierError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        ClassProbabilities::from_high_risk(0.3)
    }

    fn decision_threshold(&self) -> f64 {
        0.25
    }
}

#[test]
fn assess_runs_the_classifier_once_per_request() {
    let classifier = Arc::new(CountingClassifier {
        calls: AtomicUsize::new(0),
    });
    let service = RiskAssessmentService::new(Arc::clone(&classifier));

    let assessment = service.assess(&submission()).expect("assessment succeeds");

    assert_eq!(classifier.calls.load(Ordering::SeqCst), 1);
    assert_eq!(assessment.label, RiskLabel::HighRisk);
    assert_close(assessment.high_risk_probability(), 0.3);
}

#[test]
fn assess_labels_with_the_configured_threshold() {
    let model = logistic_model().with_decision_threshold(0.1);
    let service = RiskAssessmentService::new(Arc::new(model));

    let assessment = service.assess(&submission()).expect("assessment succeeds");

    assert!(assessment.high_risk_probability() < 0.5);
    assert_eq!(assessment.label, RiskLabel::HighRisk);
}
