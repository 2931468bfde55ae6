//! Configuration validation with range checks.

use crate::error::ConfigError;

use super::Config;

impl Config {
    /// Validate configuration values are within acceptable ranges.
    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        if self.limits.max_file_size_mb == 0 {
            return Err(ConfigError::ValidationError(
                "limits.max_file_size_mb must be > 0".into(),
            ));
        }
        if self.limits.max_image_dimension == 0 {
            return Err(ConfigError::ValidationError(
                "limits.max_image_dimension must be > 0".into(),
            ));
        }
        if self.limits.decode_timeout_ms == 0 {
            return Err(ConfigError::ValidationError(
                "limits.decode_timeout_ms must be > 0".into(),
            ));
        }
        if self.vision.image_size == 0 {
            return Err(ConfigError::ValidationError(
                "vision.image_size must be > 0".into(),
            ));
        }
        if self.tagging.max_tags == 0 {
            return Err(ConfigError::ValidationError(
                "tagging.max_tags must be > 0".into(),
            ));
        }
        if self.tagging.logit_scale <= 0.0 {
            return Err(ConfigError::ValidationError(
                "tagging.logit_scale must be > 0".into(),
            ));
        }
        if self.caption.max_length == 0 {
            return Err(ConfigError::ValidationError(
                "caption.max_length must be > 0".into(),
            ));
        }
        if self.search.top_k == 0 {
            return Err(ConfigError::ValidationError(
                "search.top_k must be > 0".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_passes_validation() {
        let config = Config::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_zero_max_tags() {
        let mut config = Config::default();
        config.tagging.max_tags = 0;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("max_tags"));
    }

    #[test]
    fn test_validate_rejects_zero_timeout() {
        let mut config = Config::default();
        config.limits.decode_timeout_ms = 0;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("decode_timeout_ms"));
    }

    #[test]
    fn test_validate_rejects_negative_logit_scale() {
        let mut config = Config::default();
        config.tagging.logit_scale = -1.0;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("logit_scale"));
    }
}
