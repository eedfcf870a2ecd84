use thiserror::Error;

#[derive(Error, Debug)]
pub enum AnalyticsError {
    #[error("Error in calculation: {0}")]
    Calculation(String),
}
