//! Error and result types shared by every data-access operation.
use serde::Serialize;
use thiserror::Error;

/// Failure of a data-access call. Transport failures, errors reported by the
/// backend, and `success: false` answers from a stored procedure all land here.
#[derive(Debug, Error)]
pub enum DataError {
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("backend error {code}: {message}")]
    Backend {
        status: u16,
        code: String,
        message: String,
        details: Option<String>,
        hint: Option<String>,
    },
    #[error("{0}")]
    Procedure(String),
    #[error("invalid request: {0}")]
    Request(String),
    #[error("unexpected response shape in {operation}: {message}")]
    Decode {
        operation: &'static str,
        message: String,
    },
}

pub type DataResult<T> = Result<T, DataError>;

impl DataError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            DataError::Transport(_) => ErrorKind::Transport,
            DataError::Backend { .. } => ErrorKind::Backend,
            DataError::Procedure(_) => ErrorKind::Procedure,
            DataError::Request(_) => ErrorKind::Request,
            DataError::Decode { .. } => ErrorKind::Decode,
        }
    }

    /// A single-row read that matched nothing: PostgREST answers `406` with
    /// code `PGRST116`.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            DataError::Backend { status, code, .. } if *status == 406 || code == "PGRST116"
        )
    }
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Transport,
    Backend,
    Procedure,
    Request,
    Decode,
}

/// Serializable error payload carried by [`Envelope`].
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ErrorBody {
    pub kind: ErrorKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    pub message: String,
}

impl From<&DataError> for ErrorBody {
    fn from(err: &DataError) -> Self {
        let (code, message) = match err {
            DataError::Backend { code, message, .. } => (Some(code.clone()), message.clone()),
            DataError::Procedure(message) => (None, message.clone()),
            other => (None, other.to_string()),
        };
        Self {
            kind: err.kind(),
            code,
            message,
        }
    }
}

/// Two-field `{data, error}` shape for callers that cross a serialization
/// boundary. Exactly one side is populated; `error` decides success.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Envelope<T> {
    pub data: Option<T>,
    pub error: Option<ErrorBody>,
}

impl<T> Envelope<T> {
    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }
}

impl<T> From<DataResult<T>> for Envelope<T> {
    fn from(result: DataResult<T>) -> Self {
        match result {
            Ok(data) => Envelope {
                data: Some(data),
                error: None,
            },
            Err(err) => Envelope {
                data: None,
                error: Some(ErrorBody::from(&err)),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_list_is_a_successful_envelope() {
        let env: Envelope<Vec<i32>> = Ok(Vec::new()).into();
        assert!(env.is_success());
        assert_eq!(env.data, Some(vec![]));
    }

    #[test]
    fn failure_envelope_has_no_data() {
        let env: Envelope<Vec<i32>> = Err(DataError::Procedure("Session is full".into())).into();
        assert!(!env.is_success());
        assert!(env.data.is_none());
        let body = env.error.unwrap();
        assert_eq!(body.kind, ErrorKind::Procedure);
        assert_eq!(body.message, "Session is full");
    }

    fn backend(status: u16, code: &str) -> DataError {
        DataError::Backend {
            status,
            code: code.into(),
            message: "x".into(),
            details: None,
            hint: None,
        }
    }

    #[test]
    fn only_missing_single_row_counts_as_not_found() {
        assert!(backend(406, "PGRST116").is_not_found());
        assert!(backend(400, "PGRST116").is_not_found());
        assert!(!backend(503, "503").is_not_found());
        assert!(!backend(401, "PGRST301").is_not_found());
        assert!(!DataError::Procedure("gone".into()).is_not_found());
    }

    #[test]
    fn backend_error_keeps_code() {
        let err = DataError::Backend {
            status: 409,
            code: "23505".into(),
            message: "duplicate key value".into(),
            details: None,
            hint: None,
        };
        let json = serde_json::to_value(Envelope::<()>::from(Err(err))).unwrap();
        assert_eq!(json["data"], serde_json::Value::Null);
        assert_eq!(json["error"]["code"], "23505");
        assert_eq!(json["error"]["kind"], "backend");
    }
}
