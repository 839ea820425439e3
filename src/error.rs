//! Error types for the weather retrieval pipeline
//!
//! Only `WeatherFetcher::fetch` surfaces errors to the caller; every other
//! component absorbs its own faults and degrades to a documented default.

use thiserror::Error;

/// Failure of a forecast fetch
#[derive(Error, Debug)]
pub enum WeatherError {
    /// Transport-level failure reaching the forecast provider
    #[error("network error reaching forecast provider: {source}")]
    Network {
        #[from]
        source: reqwest_middleware::Error,
    },

    /// Provider was reachable but answered with a non-success status
    #[error("forecast provider returned {status}")]
    Upstream { status: reqwest::StatusCode },

    /// Provider body could not be decoded
    #[error("invalid forecast response: {source}")]
    Decode {
        #[from]
        source: reqwest::Error,
    },

    /// Provider answered successfully but a required block was absent
    #[error("forecast response missing or malformed {field} data")]
    MissingData { field: &'static str },
}

impl WeatherError {
    /// Whether retrying the same coordinates can plausibly succeed
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        // A structurally incomplete payload for the same query tends to
        // repeat; everything else is transient.
        !matches!(self, WeatherError::MissingData { .. })
    }

    /// Get a user-friendly error message
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            WeatherError::Network { .. } => {
                "Не удалось загрузить данные о погоде. Проверьте подключение к интернету."
                    .to_string()
            }
            WeatherError::Upstream { .. }
            | WeatherError::Decode { .. }
            | WeatherError::MissingData { .. } => {
                "Сервис погоды временно недоступен. Попробуйте ещё раз.".to_string()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_data_is_not_retryable() {
        let err = WeatherError::MissingData { field: "current" };
        assert!(!err.is_retryable());

        let err = WeatherError::Upstream {
            status: reqwest::StatusCode::BAD_GATEWAY,
        };
        assert!(err.is_retryable());
    }

    #[test]
    fn test_user_messages() {
        let err = WeatherError::Upstream {
            status: reqwest::StatusCode::INTERNAL_SERVER_ERROR,
        };
        assert!(err.user_message().contains("Сервис погоды"));

        let err = WeatherError::MissingData { field: "hourly" };
        assert!(err.to_string().contains("hourly"));
    }
}
