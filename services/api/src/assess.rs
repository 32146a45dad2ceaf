use crate::infra::load_model;
use clap::Args;
use credit_risk::config::AppConfig;
use credit_risk::error::AppError;
use credit_risk::scoring::{
    ApplicantCsvImporter, ApplicantSubmission, Explanation, HomeOwnership,
    LoadedModel, LoanGrade, LoanIntent, PriorDefault, RiskAssessment, RiskAssessmentService,
    RiskLabel, FEATURE_NAMES,
};
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Args, Debug)]
pub(crate) struct AssessArgs {
    /// Applicant age in years
    #[arg(long, default_value_t = 30)]
    pub(crate) age: u32,
    /// Annual income in dollars
    #[arg(long, default_value_t = 50_000)]
    pub(crate) income: u64,
    /// RENT, OWN, MORTGAGE, or OTHER
    #[arg(long, default_value = "MORTGAGE")]
    pub(crate) home_ownership: String,
    /// Years of employment
    #[arg(long, default_value_t = 5)]
    pub(crate) employment_length: u32,
    /// Purpose of the loan
    #[arg(long, default_value = "DEBTCONSOLIDATION")]
    pub(crate) loan_intent: String,
    /// Loan grade A through G
    #[arg(long, default_value = "A")]
    pub(crate) loan_grade: String,
    /// Requested loan amount in dollars
    #[arg(long, default_value_t = 10_000)]
    pub(crate) loan_amount: u64,
    /// Interest rate in percent
    #[arg(long, default_value_t = 10.0)]
    pub(crate) interest_rate: f64,
    /// Previous default on file (Yes/No)
    #[arg(long, default_value = "No")]
    pub(crate) prior_default: String,
    /// Credit history length in years
    #[arg(long, default_value_t = 8)]
    pub(crate) credit_history_length: u32,
    /// Print per-feature attributions alongside the verdict
    #[arg(long)]
    pub(crate) explain: bool,
    /// Model artifact to use instead of the configured one
    #[arg(long)]
    pub(crate) model: Option<PathBuf>,
}

impl AssessArgs {
    fn submission(&self) -> ApplicantSubmission {
        ApplicantSubmission {
            age: self.age,
            income: self.income,
            home_ownership: self.home_ownership.clone(),
            employment_length: self.employment_length,
            loan_intent: self.loan_intent.clone(),
            loan_grade: self.loan_grade.clone(),
            loan_amount: self.loan_amount,
            interest_rate: self.interest_rate,
            prior_default: self.prior_default.clone(),
            credit_history_length: self.credit_history_length,
        }
    }
}

#[derive(Args, Debug)]
pub(crate) struct BatchArgs {
    /// CSV file with one applicant per row
    #[arg(long)]
    pub(crate) input: PathBuf,
    /// Model artifact to use instead of the configured one
    #[arg(long)]
    pub(crate) model: Option<PathBuf>,
}

pub(crate) fn run_assess(args: AssessArgs) -> Result<(), AppError> {
    let service = build_service(args.model.clone())?;
    let submission = args.submission();

    if args.explain {
        let explained = service.explain(&submission)?;
        for line in render_assessment(&explained.assessment) {
            println!("{line}");
        }
        for line in render_explanation(&explained.explanation) {
            println!("{line}");
        }
    } else {
        let assessment = service.assess(&submission)?;
        for line in render_assessment(&assessment) {
            println!("{line}");
        }
    }

    Ok(())
}

pub(crate) fn run_batch(args: BatchArgs) -> Result<(), AppError> {
    let BatchArgs { input, model } = args;
    let service = build_service(model)?;
    let rows = ApplicantCsvImporter::rows_from_path(&input)?;

    println!(
        "Credit risk batch: {} applicants from {}",
        rows.len(),
        input.display()
    );

    let outcomes: Vec<Result<RiskAssessment, AppError>> = rows
        .into_iter()
        .map(|row| Ok(service.assess(&row?)?))
        .collect();
    for line in render_batch(&outcomes) {
        println!("{line}");
    }

    Ok(())
}

pub(crate) fn run_schema() -> Result<(), AppError> {
    for line in render_schema() {
        println!("{line}");
    }
    Ok(())
}

fn build_service(
    model_override: Option<PathBuf>,
) -> Result<RiskAssessmentService<LoadedModel>, AppError> {
    let config = AppConfig::load()?;
    let model = load_model(&config.model, model_override)?;
    Ok(RiskAssessmentService::new(Arc::new(model)))
}

fn render_assessment(assessment: &RiskAssessment) -> Vec<String> {
    vec![
        format!("Verdict: {}", assessment.label),
        format!(
            "- Probability of high risk: {:.2}%",
            assessment.high_risk_probability() * 100.0
        ),
        format!(
            "- Loan-to-income ratio: {:.2}%",
            assessment.loan_to_income() * 100.0
        ),
    ]
}

fn render_explanation(explanation: &Explanation) -> Vec<String> {
    let mut lines = vec![format!(
        "Attributions (log-odds, base {:+.3}):",
        explanation.base_value
    )];
    lines.extend(explanation.ranked().into_iter().map(|attribution| {
        format!(
            "  - {}: {:+.3} (value {})",
            attribution.feature, attribution.contribution, attribution.value
        )
    }));
    lines
}

fn render_batch(outcomes: &[Result<RiskAssessment, AppError>]) -> Vec<String> {
    let mut lines = Vec::with_capacity(outcomes.len() + 1);
    let mut high_risk = 0usize;
    let mut rejected = 0usize;

    for (index, outcome) in outcomes.iter().enumerate() {
        let row = index + 1;
        match outcome {
            Ok(assessment) => {
                if assessment.label == RiskLabel::HighRisk {
                    high_risk += 1;
                }
                lines.push(format!("  row {row}: {}", assessment.summary()));
            }
            Err(err) => {
                rejected += 1;
                lines.push(format!("  row {row}: rejected ({err})"));
            }
        }
    }

    lines.push(format!(
        "Scored {} | high risk {} | rejected {}",
        outcomes.len() - rejected,
        high_risk,
        rejected
    ));
    lines
}

fn render_schema() -> Vec<String> {
    let mut lines = vec!["Feature order:".to_string()];
    lines.extend(
        FEATURE_NAMES
            .iter()
            .enumerate()
            .map(|(index, name)| format!("  {index:>2}. {name}")),
    );
    lines.push("Accepted categories:".to_string());
    lines.push(format!(
        "  {}: {}",
        HomeOwnership::FIELD,
        HomeOwnership::LABELS.join(", ")
    ));
    lines.push(format!(
        "  {}: {}",
        LoanIntent::FIELD,
        LoanIntent::LABELS.join(", ")
    ));
    lines.push(format!(
        "  {}: {}",
        LoanGrade::FIELD,
        LoanGrade::LABELS.join(", ")
    ));
    lines.push(format!(
        "  {}: {}",
        PriorDefault::FIELD,
        PriorDefault::LABELS.join(", ")
    ));
    lines
}
