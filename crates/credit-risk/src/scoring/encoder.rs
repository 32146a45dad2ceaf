use std::ops::RangeInclusive;

use super::domain::{
    ApplicantAttributes, ApplicantSubmission, FeatureVector, HomeOwnership, LoanGrade, LoanIntent,
    PriorDefault,
};

pub const AGE_RANGE: RangeInclusive<u32> = 18..=100;
pub const EMPLOYMENT_LENGTH_RANGE: RangeInclusive<u32> = 0..=40;
pub const INTEREST_RATE_RANGE: RangeInclusive<f64> = 5.0..=40.0;
pub const CREDIT_HISTORY_RANGE: RangeInclusive<u32> = 1..=50;

/// Validation errors raised while turning raw answers into a feature vector.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EncodingError {
    #[error("unrecognized {field} value '{value}' (expected one of: {})", .expected.join(", "))]
    UnknownCategory {
        field: &'static str,
        value: String,
        expected: &'static [&'static str],
    },
    #[error("{field} value {value} outside permitted range {min}..={max}")]
    OutOfRange {
        field: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },
    #[error("{field} must be greater than zero")]
    NotPositive { field: &'static str },
    #[error("missing required field: {field}")]
    MissingField { field: &'static str },
}

impl EncodingError {
    pub(crate) fn unknown(
        field: &'static str,
        value: &str,
        expected: &'static [&'static str],
    ) -> Self {
        Self::UnknownCategory {
            field,
            value: value.to_string(),
            expected,
        }
    }

    pub fn field(&self) -> &'static str {
        match self {
            EncodingError::UnknownCategory { field, .. }
            | EncodingError::OutOfRange { field, .. }
            | EncodingError::NotPositive { field }
            | EncodingError::MissingField { field } => field,
        }
    }
}

/// Maps applicant answers onto the classifier's input schema.
///
/// The column order and lookup tables must match the ones the model was
/// trained with; the model loader checks the column names, the tables live on
/// the categorical enums in [`super::domain`].
#[derive(Debug, Clone, Copy, Default)]
pub struct FeatureEncoder;

impl FeatureEncoder {
    pub fn new() -> Self {
        Self
    }

    /// Resolve every categorical answer and check numeric answers against their domains.
    pub fn validate(
        &self,
        submission: &ApplicantSubmission,
    ) -> Result<ApplicantAttributes, EncodingError> {
        check_range("age", submission.age, &AGE_RANGE)?;
        let home_ownership: HomeOwnership = submission.home_ownership.parse()?;
        check_range(
            "employment_length",
            submission.employment_length,
            &EMPLOYMENT_LENGTH_RANGE,
        )?;
        let loan_intent: LoanIntent = submission.loan_intent.parse()?;
        let loan_grade: LoanGrade = submission.loan_grade.parse()?;
        if submission.loan_amount == 0 {
            return Err(EncodingError::NotPositive {
                field: "loan_amount",
            });
        }
        if !INTEREST_RATE_RANGE.contains(&submission.interest_rate) {
            return Err(EncodingError::OutOfRange {
                field: "interest_rate",
                value: submission.interest_rate,
                min: *INTEREST_RATE_RANGE.start(),
                max: *INTEREST_RATE_RANGE.end(),
            });
        }
        let prior_default: PriorDefault = submission.prior_default.parse()?;
        check_range(
            "credit_history_length",
            submission.credit_history_length,
            &CREDIT_HISTORY_RANGE,
        )?;

        Ok(ApplicantAttributes {
            age: submission.age,
            income: submission.income,
            home_ownership,
            employment_length: submission.employment_length,
            loan_intent,
            loan_grade,
            loan_amount: submission.loan_amount,
            interest_rate: submission.interest_rate,
            prior_default,
            credit_history_length: submission.credit_history_length,
        })
    }

    pub fn encode(&self, attributes: &ApplicantAttributes) -> FeatureVector {
        FeatureVector::new([
            f64::from(attributes.age),
            attributes.income as f64,
            f64::from(attributes.home_ownership.code()),
            f64::from(attributes.employment_length),
            f64::from(attributes.loan_intent.code()),
            f64::from(attributes.loan_grade.code()),
            attributes.loan_amount as f64,
            attributes.interest_rate,
            loan_to_income(attributes.loan_amount, attributes.income),
            f64::from(attributes.prior_default.code()),
            f64::from(attributes.credit_history_length),
        ])
    }

    pub fn encode_submission(
        &self,
        submission: &ApplicantSubmission,
    ) -> Result<FeatureVector, EncodingError> {
        let attributes = self.validate(submission)?;
        Ok(self.encode(&attributes))
    }
}

/// Loan amount as a share of annual income; zero income yields `0.0`.
pub fn loan_to_income(loan_amount: u64, income: u64) -> f64 {
    if income == 0 {
        0.0
    } else {
        loan_amount as f64 / income as f64
    }
}

fn check_range(
    field: &'static str,
    value: u32,
    range: &RangeInclusive<u32>,
) -> Result<(), EncodingError> {
    if range.contains(&value) {
        Ok(())
    } else {
        Err(EncodingError::OutOfRange {
            field,
            value: f64::from(value),
            min: f64::from(*range.start()),
            max: f64::from(*range.end()),
        })
    }
}
