use crate::http::TransportError;

/// Why a fetch produced no payload.
#[derive(Debug)]
pub enum FetchError {
    /// Every attempt in the budget answered with a non-200 status
    RetryExhausted { attempts: u32 },
    /// The network layer failed; remaining attempts were not used
    Transport(TransportError),
    /// A 200 response carried a body that is not the expected JSON
    Decode(serde_json::Error),
    /// The caller's cancellation signal fired before the fetch finished
    Cancelled,
}

impl FetchError {
    /// Whether a caller might reasonably try the whole fetch again later.
    pub fn is_transient(&self) -> bool {
        matches!(self, FetchError::RetryExhausted { .. } | FetchError::Transport(_))
    }
}

impl std::fmt::Display for FetchError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FetchError::RetryExhausted { attempts } => {
                write!(f, "Max retries exceeded: no successful response after {} attempts", attempts)
            }
            FetchError::Transport(e) => write!(f, "Data collection failed: {}", e),
            FetchError::Decode(e) => write!(f, "Failed to parse JSON response: {}", e),
            FetchError::Cancelled => write!(f, "Data collection cancelled"),
        }
    }
}

impl std::error::Error for FetchError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            FetchError::Transport(e) => Some(e),
            FetchError::Decode(e) => Some(e),
            _ => None,
        }
    }
}

impl From<TransportError> for FetchError {
    fn from(error: TransportError) -> Self {
        FetchError::Transport(error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn test_fetch_error_display() {
        let err = FetchError::RetryExhausted { attempts: 3 };
        assert!(err.to_string().contains("Max retries exceeded"));
        assert!(err.to_string().contains("3 attempts"));

        let err = FetchError::Transport(TransportError::Connect("refused".to_string()));
        assert!(err.to_string().contains("refused"));

        assert!(FetchError::Cancelled.to_string().contains("cancelled"));
    }

    #[test]
    fn test_fetch_error_source() {
        let err = FetchError::Transport(TransportError::Timeout("slow".to_string()));
        assert!(err.source().is_some());

        let decode = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err = FetchError::Decode(decode);
        assert!(err.source().is_some());

        assert!(FetchError::RetryExhausted { attempts: 1 }.source().is_none());
    }

    #[test]
    fn test_is_transient() {
        assert!(FetchError::RetryExhausted { attempts: 2 }.is_transient());
        assert!(FetchError::Transport(TransportError::Other("x".to_string())).is_transient());

        let decode = serde_json::from_str::<serde_json::Value>("nope").unwrap_err();
        assert!(!FetchError::Decode(decode).is_transient());
        assert!(!FetchError::Cancelled.is_transient());
    }
}
