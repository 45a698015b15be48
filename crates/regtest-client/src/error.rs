use reqwest::StatusCode;

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("HTTP error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The node answered with a non-2xx status. Display starts with the
    /// canonical reason phrase so callers can match on e.g. `Bad Request`.
    #[error("{}", status_message(.status, .body))]
    Status { status: StatusCode, body: String },

    #[error("invalid response: {0}")]
    InvalidResponse(String),

    #[error("Missing Inputs")]
    MissingInputs { attempts: u32 },
}

fn status_message(status: &StatusCode, body: &str) -> String {
    let reason = status.canonical_reason().unwrap_or(status.as_str());
    if body.is_empty() {
        reason.to_owned()
    } else {
        format!("{reason}: {body}")
    }
}

impl ClientError {
    /// True when the node rejected the request with `400 Bad Request`.
    pub fn is_bad_request(&self) -> bool {
        matches!(self, Self::Status { status, .. } if *status == StatusCode::BAD_REQUEST)
    }

    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Self::Status { status, .. } => Some(*status),
            Self::Transport(err) => err.status(),
            _ => None,
        }
    }
}
