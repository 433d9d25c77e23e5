use thiserror::Error;

/// Failures talking to the prediction service. None of these reach the page
/// verbatim; the controller shows a generic message and logs the detail.
#[derive(Debug, Error)]
pub enum PredictError {
    #[error("request to prediction service failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("prediction service answered {status}: {body}")]
    Status {
        status: reqwest::StatusCode,
        body: String,
    },

    #[error("malformed prediction response: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("prediction response carried neither predictions nor an error")]
    MissingPredictions,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ControllerError {
    #[error("no file selected")]
    NoFileSelected,

    #[error("unknown food label: {0}")]
    UnknownFood(String),

    #[error("no food selected")]
    NoFoodSelected,
}
