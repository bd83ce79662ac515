use std::time::Duration;

/// Minimum spacing between two remote calls on one message.
pub const DEFAULT_MIN_EDIT_INTERVAL: Duration = Duration::from_millis(250);

/// Tuning for a [`crate::MessageHandle`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditConfig {
    /// An edit settles no sooner than this after it was issued.
    pub min_interval: Duration,
    /// Extra attempts for a failed edit before it is assumed applied. 0 = never retry.
    pub edit_retries: u32,
}

impl Default for EditConfig {
    fn default() -> Self {
        Self {
            min_interval: DEFAULT_MIN_EDIT_INTERVAL,
            edit_retries: 0,
        }
    }
}

impl EditConfig {
    pub fn with_min_interval(mut self, min_interval: Duration) -> Self {
        self.min_interval = min_interval;
        self
    }

    pub fn with_edit_retries(mut self, edit_retries: u32) -> Self {
        self.edit_retries = edit_retries;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = EditConfig::default();
        assert_eq!(config.min_interval, Duration::from_millis(250));
        assert_eq!(config.edit_retries, 0);
    }

    #[test]
    fn test_builders() {
        let config = EditConfig::default()
            .with_min_interval(Duration::from_secs(1))
            .with_edit_retries(3);
        assert_eq!(config.min_interval, Duration::from_secs(1));
        assert_eq!(config.edit_retries, 3);
    }
}
