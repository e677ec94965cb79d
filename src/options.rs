use crate::{Result, StorageError};

/// Configures HTTP timeout and retry behavior.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ClientOptions {
    /// Per-request timeout in milliseconds.
    pub timeout_ms: u64,
    /// Maximum number of retries after the initial attempt.
    pub max_retries: usize,
    /// Backoff factor in milliseconds. The wait before retry `n` is
    /// `backoff_factor_ms * n` (linear strategy).
    pub backoff_factor_ms: u64,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            timeout_ms: 10_000,
            max_retries: 3,
            backoff_factor_ms: 300,
        }
    }
}

impl ClientOptions {
    /// Checks the invariants the executor relies on.
    pub fn validate(&self) -> Result<()> {
        if self.timeout_ms == 0 {
            return Err(StorageError::Config(
                "timeout_ms must be greater than zero".to_owned(),
            ));
        }
        if self.backoff_factor_ms == 0 {
            return Err(StorageError::Config(
                "backoff_factor_ms must be greater than zero".to_owned(),
            ));
        }
        Ok(())
    }

    /// Delay before the retry following failed attempt number `attempt`
    /// (1-based).
    pub(crate) fn backoff_delay_ms(&self, attempt: usize) -> u64 {
        let attempt = u64::try_from(attempt).unwrap_or(u64::MAX);
        self.backoff_factor_ms.saturating_mul(attempt)
    }
}

#[cfg(test)]
mod tests {
    use super::ClientOptions;

    #[test]
    fn defaults_are_valid() {
        let opts = ClientOptions::default();
        assert_eq!(opts.timeout_ms, 10_000);
        assert_eq!(opts.max_retries, 3);
        assert_eq!(opts.backoff_factor_ms, 300);
        assert!(opts.validate().is_ok());
    }

    #[test]
    fn backoff_grows_linearly() {
        let opts = ClientOptions {
            backoff_factor_ms: 100,
            ..ClientOptions::default()
        };
        assert_eq!(opts.backoff_delay_ms(1), 100);
        assert_eq!(opts.backoff_delay_ms(2), 200);
        assert_eq!(opts.backoff_delay_ms(3), 300);
    }

    #[test]
    fn zero_backoff_factor_is_rejected() {
        let opts = ClientOptions {
            backoff_factor_ms: 0,
            ..ClientOptions::default()
        };
        assert!(opts.validate().is_err());
    }

    #[test]
    fn zero_timeout_is_rejected() {
        let opts = ClientOptions {
            timeout_ms: 0,
            ..ClientOptions::default()
        };
        assert!(opts.validate().is_err());
    }
}
