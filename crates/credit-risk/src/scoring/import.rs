use std::io::Read;
use std::path::Path;

use super::domain::ApplicantSubmission;

#[derive(Debug)]
pub enum ApplicantImportError {
    Io(std::io::Error),
    Csv(csv::Error),
}

impl std::fmt::Display for ApplicantImportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ApplicantImportError::Io(err) => write!(f, "failed to read applicant file: {}", err),
            ApplicantImportError::Csv(err) => write!(f, "invalid applicant CSV data: {}", err),
        }
    }
}

impl std::error::Error for ApplicantImportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ApplicantImportError::Io(err) => Some(err),
            ApplicantImportError::Csv(err) => Some(err),
        }
    }
}

impl From<std::io::Error> for ApplicantImportError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<csv::Error> for ApplicantImportError {
    fn from(err: csv::Error) -> Self {
        Self::Csv(err)
    }
}

/// A single CSV row: the submission, or the reason that row could not be read.
pub type ImportedRow = Result<ApplicantSubmission, ApplicantImportError>;

/// Reads applicant submissions from a CSV export whose headers match the
/// submission field names.
pub struct ApplicantCsvImporter;

impl ApplicantCsvImporter {
    pub fn from_path<P: AsRef<Path>>(
        path: P,
    ) -> Result<Vec<ApplicantSubmission>, ApplicantImportError> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(file)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Vec<ApplicantSubmission>, ApplicantImportError> {
        Self::rows_from_reader(reader)?.into_iter().collect()
    }

    pub fn rows_from_path<P: AsRef<Path>>(
        path: P,
    ) -> Result<Vec<ImportedRow>, ApplicantImportError> {
        let file = std::fs::File::open(path)?;
        Self::rows_from_reader(file)
    }

    /// Keeps going past malformed rows; only an unreadable header fails the whole file.
    pub fn rows_from_reader<R: Read>(reader: R) -> Result<Vec<ImportedRow>, ApplicantImportError> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);
        csv_reader.headers()?;

        Ok(csv_reader
            .deserialize::<ApplicantSubmission>()
            .map(|record| record.map_err(ApplicantImportError::from))
            .collect())
    }
}
