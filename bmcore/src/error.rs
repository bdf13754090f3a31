use thiserror::Error;

/// Failure of a single REST or feed operation, as reported by the server.
///
/// `status == 0` means the request never produced an HTTP response
/// (connection refused, timeout, malformed body).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message} (status {status})")]
pub struct TransportError {
    pub status: u16,
    pub message: String,
}

impl TransportError {
    pub fn new(status: u16, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    /// A failure with no HTTP status, e.g. the request never reached the server.
    pub fn network(message: impl Into<String>) -> Self {
        Self::new(0, message)
    }

    pub fn kind(&self) -> ErrorKind {
        match self.status {
            401 => ErrorKind::AuthRequired,
            403 => ErrorKind::Forbidden,
            404 => ErrorKind::NotFound,
            _ => ErrorKind::Server,
        }
    }
}

/// Failure taxonomy driving how an error is surfaced.
///
/// `AuthRequired` is recoverable (redirect to login, suppressed from error
/// display); everything else is surfaced and requires a manual retry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    AuthRequired,
    Forbidden,
    NotFound,
    Server,
}

/// Payload of an error-navigation event: what the error view shows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorRedirect {
    pub title: String,
    pub description: String,
    pub code: u16,
}

impl From<&TransportError> for ErrorRedirect {
    fn from(err: &TransportError) -> Self {
        let title = match err.kind() {
            ErrorKind::AuthRequired => "Login required",
            ErrorKind::Forbidden => "Access denied",
            ErrorKind::NotFound => "Not found",
            ErrorKind::Server => "Something went wrong",
        };
        Self {
            title: title.to_string(),
            description: err.message.clone(),
            code: err.status,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_classification() {
        assert_eq!(TransportError::new(401, "x").kind(), ErrorKind::AuthRequired);
        assert_eq!(TransportError::new(403, "x").kind(), ErrorKind::Forbidden);
        assert_eq!(TransportError::new(404, "x").kind(), ErrorKind::NotFound);
        assert_eq!(TransportError::new(500, "x").kind(), ErrorKind::Server);
        assert_eq!(TransportError::network("refused").kind(), ErrorKind::Server);
    }

    #[test]
    fn test_redirect_carries_code_and_message() {
        let err = TransportError::new(404, "conversation not found");
        let redirect = ErrorRedirect::from(&err);
        assert_eq!(redirect.code, 404);
        assert_eq!(redirect.title, "Not found");
        assert_eq!(redirect.description, "conversation not found");
    }
}
