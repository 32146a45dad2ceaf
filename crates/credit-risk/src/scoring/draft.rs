use serde::{Deserialize, Serialize};

use super::domain::ApplicantSubmission;
use super::encoder::EncodingError;

/// Steps of the multi-page intake form, in presentation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IntakeStep {
    PersonalDetails,
    LoanDetails,
    CreditHistory,
}

impl IntakeStep {
    pub const ALL: [IntakeStep; 3] = [
        IntakeStep::PersonalDetails,
        IntakeStep::LoanDetails,
        IntakeStep::CreditHistory,
    ];

    pub const fn label(self) -> &'static str {
        match self {
            IntakeStep::PersonalDetails => "personal_details",
            IntakeStep::LoanDetails => "loan_details",
            IntakeStep::CreditHistory => "credit_history",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersonalDetails {
    pub age: u32,
    pub income: u64,
    pub home_ownership: String,
    pub employment_length: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoanDetails {
    pub loan_intent: String,
    pub loan_grade: String,
    pub loan_amount: u64,
    pub interest_rate: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreditHistory {
    pub prior_default: String,
    pub credit_history_length: u32,
}

/// Answers gathered so far by a step-by-step intake.
///
/// Each step replaces the draft rather than mutating shared state; a
/// submission only exists once [`ApplicantDraft::complete`] has seen every
/// step.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ApplicantDraft {
    personal: Option<PersonalDetails>,
    loan: Option<LoanDetails>,
    credit: Option<CreditHistory>,
}

impl ApplicantDraft {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_personal_details(self, personal: PersonalDetails) -> Self {
        Self {
            personal: Some(personal),
            ..self
        }
    }

    pub fn with_loan_details(self, loan: LoanDetails) -> Self {
        Self {
            loan: Some(loan),
            ..self
        }
    }

    pub fn with_credit_history(self, credit: CreditHistory) -> Self {
        Self {
            credit: Some(credit),
            ..self
        }
    }

    pub fn is_step_complete(&self, step: IntakeStep) -> bool {
        match step {
            IntakeStep::PersonalDetails => self.personal.is_some(),
            IntakeStep::LoanDetails => self.loan.is_some(),
            IntakeStep::CreditHistory => self.credit.is_some(),
        }
    }

    /// First step still waiting for answers, or `None` once the draft is complete.
    pub fn next_step(&self) -> Option<IntakeStep> {
        IntakeStep::ALL
            .into_iter()
            .find(|step| !self.is_step_complete(*step))
    }

    pub fn complete(self) -> Result<ApplicantSubmission, EncodingError> {
        let (personal, loan, credit) = match (self.personal, self.loan, self.credit) {
            (Some(personal), Some(loan), Some(credit)) => (personal, loan, credit),
            (None, _, _) => return Err(missing(IntakeStep::PersonalDetails)),
            (_, None, _) => return Err(missing(IntakeStep::LoanDetails)),
            (_, _, None) => return Err(missing(IntakeStep::CreditHistory)),
        };

        Ok(ApplicantSubmission {
            age: personal.age,
            income: personal.income,
            home_ownership: personal.home_ownership,
            employment_length: personal.employment_length,
            loan_intent: loan.loan_intent,
            loan_grade: loan.loan_grade,
            loan_amount: loan.loan_amount,
            interest_rate: loan.interest_rate,
            prior_default: credit.prior_default,
            credit_history_length: credit.credit_history_length,
        })
    }
}

fn missing(step: IntakeStep) -> EncodingError {
    EncodingError::MissingField {
        field: step.label(),
    }
}
