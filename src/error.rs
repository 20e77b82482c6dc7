use chrono::NaiveDate;

/// Every way a run can fail.
///
/// None of these are recovered locally: the run aborts and `main` exits with
/// [`AppError::exit_code`].
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Failed to fetch CO2 feed: {0}")]
    Fetch(String),

    #[error("Failed to parse CO2 feed: {0}")]
    Parse(String),

    #[error("Display window {start}..={end} contains no records.")]
    EmptyWindow { start: NaiveDate, end: NaiveDate },

    #[error(
        "Display window holds {available} records; the year-ago anchor needs at least {required}."
    )]
    InsufficientHistory { required: usize, available: usize },

    #[error("No record on or before {target} for the year-ago anchor; the window starts at {earliest}.")]
    MissingAnniversary { target: NaiveDate, earliest: NaiveDate },

    #[error("Failed to render chart: {0}")]
    Render(String),

    #[error("Failed to write chart: {0}")]
    Output(String),
}

impl AppError {
    pub fn exit_code(&self) -> u8 {
        match self {
            AppError::Config(_) => 2,
            AppError::Fetch(_) => 3,
            AppError::Parse(_) => 4,
            AppError::EmptyWindow { .. }
            | AppError::InsufficientHistory { .. }
            | AppError::MissingAnniversary { .. } => 5,
            AppError::Render(_) => 6,
            AppError::Output(_) => 7,
        }
    }
}
