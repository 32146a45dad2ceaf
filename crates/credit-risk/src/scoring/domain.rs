use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::encoder::EncodingError;

/// Number of columns in the classifier's input schema.
pub const FEATURE_COUNT: usize = 11;

/// Column names in the exact order the classifier was trained with.
pub const FEATURE_NAMES: [&str; FEATURE_COUNT] = [
    "person_age",
    "person_income",
    "person_home_ownership",
    "person_emp_length",
    "loan_intent",
    "loan_grade",
    "loan_amnt",
    "loan_int_rate",
    "loan_percent_income",
    "cb_person_default_on_file",
    "cb_person_cred_hist_length",
];

/// Position of each column inside a [`FeatureVector`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Feature {
    Age,
    Income,
    HomeOwnership,
    EmploymentLength,
    LoanIntent,
    LoanGrade,
    LoanAmount,
    InterestRate,
    LoanPercentIncome,
    PriorDefault,
    CreditHistoryLength,
}

impl Feature {
    pub const ALL: [Feature; FEATURE_COUNT] = [
        Feature::Age,
        Feature::Income,
        Feature::HomeOwnership,
        Feature::EmploymentLength,
        Feature::LoanIntent,
        Feature::LoanGrade,
        Feature::LoanAmount,
        Feature::InterestRate,
        Feature::LoanPercentIncome,
        Feature::PriorDefault,
        Feature::CreditHistoryLength,
    ];

    pub const fn index(self) -> usize {
        self as usize
    }

    pub const fn name(self) -> &'static str {
        FEATURE_NAMES[self as usize]
    }
}

/// Raw applicant answers as collected by a form, CSV row, or API payload.
///
/// Categorical answers are kept as strings until the encoder validates them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApplicantSubmission {
    pub age: u32,
    pub income: u64,
    pub home_ownership: String,
    pub employment_length: u32,
    pub loan_intent: String,
    pub loan_grade: String,
    pub loan_amount: u64,
    pub interest_rate: f64,
    pub prior_default: String,
    pub credit_history_length: u32,
}

/// Validated applicant attributes with every categorical resolved.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ApplicantAttributes {
    pub age: u32,
    pub income: u64,
    pub home_ownership: HomeOwnership,
    pub employment_length: u32,
    pub loan_intent: LoanIntent,
    pub loan_grade: LoanGrade,
    pub loan_amount: u64,
    pub interest_rate: f64,
    pub prior_default: PriorDefault,
    pub credit_history_length: u32,
}

/// Housing status reported by the applicant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HomeOwnership {
    Mortgage,
    Rent,
    Own,
    Other,
}

impl HomeOwnership {
    pub const FIELD: &'static str = "home_ownership";
    pub const ALL: [HomeOwnership; 4] = [
        HomeOwnership::Mortgage,
        HomeOwnership::Rent,
        HomeOwnership::Own,
        HomeOwnership::Other,
    ];
    pub const LABELS: [&'static str; 4] = ["MORTGAGE", "RENT", "OWN", "OTHER"];

    pub const fn code(self) -> u8 {
        match self {
            HomeOwnership::Rent => 3,
            HomeOwnership::Own => 2,
            HomeOwnership::Mortgage => 1,
            HomeOwnership::Other => 0,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            HomeOwnership::Mortgage => "MORTGAGE",
            HomeOwnership::Rent => "RENT",
            HomeOwnership::Own => "OWN",
            HomeOwnership::Other => "OTHER",
        }
    }
}

impl FromStr for HomeOwnership {
    type Err = EncodingError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        lookup(value, &Self::ALL, Self::label)
            .ok_or_else(|| EncodingError::unknown(Self::FIELD, value, &Self::LABELS))
    }
}

/// Stated purpose of the requested loan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum LoanIntent {
    DebtConsolidation,
    Medical,
    Venture,
    Personal,
    Education,
    HomeImprovement,
}

impl LoanIntent {
    pub const FIELD: &'static str = "loan_intent";
    pub const ALL: [LoanIntent; 6] = [
        LoanIntent::DebtConsolidation,
        LoanIntent::Medical,
        LoanIntent::Venture,
        LoanIntent::Personal,
        LoanIntent::Education,
        LoanIntent::HomeImprovement,
    ];
    pub const LABELS: [&'static str; 6] = [
        "DEBTCONSOLIDATION",
        "MEDICAL",
        "VENTURE",
        "PERSONAL",
        "EDUCATION",
        "HOMEIMPROVEMENT",
    ];

    pub const fn code(self) -> u8 {
        match self {
            LoanIntent::Education => 0,
            LoanIntent::Medical => 1,
            LoanIntent::Venture => 2,
            LoanIntent::Personal => 3,
            LoanIntent::DebtConsolidation => 4,
            LoanIntent::HomeImprovement => 5,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            LoanIntent::DebtConsolidation => "DEBTCONSOLIDATION",
            LoanIntent::Medical => "MEDICAL",
            LoanIntent::Venture => "VENTURE",
            LoanIntent::Personal => "PERSONAL",
            LoanIntent::Education => "EDUCATION",
            LoanIntent::HomeImprovement => "HOMEIMPROVEMENT",
        }
    }
}

impl FromStr for LoanIntent {
    type Err = EncodingError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        lookup(value, &Self::ALL, Self::label)
            .ok_or_else(|| EncodingError::unknown(Self::FIELD, value, &Self::LABELS))
    }
}

/// Lender-assigned grade, `A` (best) through `G`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum LoanGrade {
    A,
    B,
    C,
    D,
    E,
    F,
    G,
}

impl LoanGrade {
    pub const FIELD: &'static str = "loan_grade";
    pub const ALL: [LoanGrade; 7] = [
        LoanGrade::A,
        LoanGrade::B,
        LoanGrade::C,
        LoanGrade::D,
        LoanGrade::E,
        LoanGrade::F,
        LoanGrade::G,
    ];
    pub const LABELS: [&'static str; 7] = ["A", "B", "C", "D", "E", "F", "G"];

    pub const fn code(self) -> u8 {
        self as u8
    }

    pub const fn label(self) -> &'static str {
        Self::LABELS[self as usize]
    }
}

impl FromStr for LoanGrade {
    type Err = EncodingError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        lookup(value, &Self::ALL, Self::label)
            .ok_or_else(|| EncodingError::unknown(Self::FIELD, value, &Self::LABELS))
    }
}

/// Whether the credit bureau has a prior default on file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PriorDefault {
    No,
    Yes,
}

impl PriorDefault {
    pub const FIELD: &'static str = "prior_default";
    pub const ALL: [PriorDefault; 2] = [PriorDefault::No, PriorDefault::Yes];
    pub const LABELS: [&'static str; 4] = ["No", "Yes", "N", "Y"];

    pub const fn code(self) -> u8 {
        match self {
            PriorDefault::No => 0,
            PriorDefault::Yes => 1,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            PriorDefault::No => "No",
            PriorDefault::Yes => "Yes",
        }
    }
}

impl FromStr for PriorDefault {
    type Err = EncodingError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_uppercase().as_str() {
            "NO" | "N" => Ok(PriorDefault::No),
            "YES" | "Y" => Ok(PriorDefault::Yes),
            _ => Err(EncodingError::unknown(Self::FIELD, value, &Self::LABELS)),
        }
    }
}

fn lookup<T: Copy>(value: &str, options: &[T], label: fn(T) -> &'static str) -> Option<T> {
    let needle = value.trim();
    options
        .iter()
        .copied()
        .find(|option| label(*option).eq_ignore_ascii_case(needle))
}

/// The ordered numeric encoding handed to the classifier.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeatureVector([f64; FEATURE_COUNT]);

impl FeatureVector {
    pub fn new(values: [f64; FEATURE_COUNT]) -> Self {
        Self(values)
    }

    pub fn values(&self) -> &[f64; FEATURE_COUNT] {
        &self.0
    }

    pub fn get(&self, feature: Feature) -> f64 {
        self.0[feature.index()]
    }

    pub fn loan_to_income(&self) -> f64 {
        self.get(Feature::LoanPercentIncome)
    }

    pub fn named(&self) -> Vec<NamedFeature> {
        Feature::ALL
            .iter()
            .map(|feature| NamedFeature {
                name: feature.name(),
                value: self.get(*feature),
            })
            .collect()
    }
}

impl From<FeatureVector> for [f64; FEATURE_COUNT] {
    fn from(vector: FeatureVector) -> Self {
        vector.0
    }
}

/// A single column of the feature vector paired with its schema name.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct NamedFeature {
    pub name: &'static str,
    pub value: f64,
}

/// Binary verdict returned by the classifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskLabel {
    LowRisk,
    HighRisk,
}

impl RiskLabel {
    pub const fn class_index(self) -> usize {
        match self {
            RiskLabel::LowRisk => 0,
            RiskLabel::HighRisk => 1,
        }
    }

    pub const fn from_class_index(index: usize) -> Option<Self> {
        match index {
            0 => Some(RiskLabel::LowRisk),
            1 => Some(RiskLabel::HighRisk),
            _ => None,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            RiskLabel::LowRisk => "LOW RISK",
            RiskLabel::HighRisk => "HIGH RISK",
        }
    }
}

impl fmt::Display for RiskLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
