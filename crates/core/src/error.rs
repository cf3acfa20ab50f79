use thiserror::Error;

pub type PlannerResult<T> = Result<T, PlannerError>;

#[derive(Error, Debug)]
pub enum PlannerError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Unknown segment template: {0}")]
    UnknownTemplate(String),
}

impl PlannerError {
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidInput(message.into())
    }

    /// True for errors caused by the caller's request rather than the service.
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::InvalidInput(_) | Self::UnknownTemplate(_))
    }
}

impl From<config::ConfigError> for PlannerError {
    fn from(err: config::ConfigError) -> Self {
        Self::Config(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_error_classification() {
        assert!(PlannerError::invalid("budget must be non-negative").is_client_error());
        assert!(PlannerError::UnknownTemplate("viral".into()).is_client_error());
        assert!(!PlannerError::Config("catalog has no platforms".into()).is_client_error());
    }

    #[test]
    fn test_config_error_maps_to_config_variant() {
        let err: PlannerError = config::ConfigError::Message("bad source".into()).into();
        assert!(matches!(err, PlannerError::Config(ref msg) if msg.contains("bad source")));
    }
}
