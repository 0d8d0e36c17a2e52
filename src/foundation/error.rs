/// Result alias used across the crate.
pub type WaterboxResult<T> = Result<T, WaterboxError>;

/// Every failure the library can raise.
///
/// Validation failures are split by kind so callers can tell a malformed object
/// (`Shape`) from an out-of-bounds number (`Range`) or a wrong primitive (`Type`).
/// Failures attributed to a specific option are wrapped in [`WaterboxError::InvalidOption`].
#[derive(thiserror::Error, Debug)]
pub enum WaterboxError {
    /// A composite option has missing, extra, or malformed keys.
    #[error("{0}")]
    Shape(String),

    /// A numeric value lies outside its allowed bounds.
    #[error("{0}")]
    Range(String),

    /// A value has the wrong primitive kind.
    #[error("{0}")]
    Type(String),

    /// Attempt to clear a mandatory option.
    #[error("invalid {key}: required option cannot be cleared")]
    Required {
        /// Option name.
        key: String,
    },

    /// A validator rejected the value proposed for `key`.
    #[error("invalid {key}: {source}")]
    InvalidOption {
        /// Option name.
        key: String,
        /// The underlying validation failure.
        #[source]
        source: Box<WaterboxError>,
    },

    /// A drawing surface or pattern handle could not be acquired.
    #[error("drawing context error: {0}")]
    Context(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl WaterboxError {
    pub fn shape(msg: impl Into<String>) -> Self {
        Self::Shape(msg.into())
    }

    pub fn range(msg: impl Into<String>) -> Self {
        Self::Range(msg.into())
    }

    pub fn type_error(msg: impl Into<String>) -> Self {
        Self::Type(msg.into())
    }

    pub fn context(msg: impl Into<String>) -> Self {
        Self::Context(msg.into())
    }

    pub fn required(key: impl Into<String>) -> Self {
        Self::Required { key: key.into() }
    }

    /// Attribute `self` to option `key`.
    pub fn for_option(self, key: impl Into<String>) -> Self {
        Self::InvalidOption {
            key: key.into(),
            source: Box::new(self),
        }
    }

    /// Strip option prefixes and return the underlying failure.
    pub fn root(&self) -> &WaterboxError {
        match self {
            Self::InvalidOption { source, .. } => source.root(),
            other => other,
        }
    }

    /// Name of the option this error is attributed to, if any.
    pub fn option_key(&self) -> Option<&str> {
        match self {
            Self::InvalidOption { key, .. } | Self::Required { key } => Some(key),
            _ => None,
        }
    }

    pub fn is_shape(&self) -> bool {
        matches!(self.root(), Self::Shape(_))
    }

    pub fn is_range(&self) -> bool {
        matches!(self.root(), Self::Range(_))
    }

    pub fn is_type(&self) -> bool {
        matches!(self.root(), Self::Type(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn option_prefix_names_the_field() {
        let err = WaterboxError::range("Invalid number: -1. Number must be positive.")
            .for_option("waterPattern");
        assert_eq!(
            err.to_string(),
            "invalid waterPattern: Invalid number: -1. Number must be positive."
        );
        assert_eq!(err.option_key(), Some("waterPattern"));
        assert!(err.is_range());
    }

    #[test]
    fn required_display_is_stable() {
        let err = WaterboxError::required("width");
        assert_eq!(
            err.to_string(),
            "invalid width: required option cannot be cleared"
        );
        assert!(!err.is_shape());
    }

    #[test]
    fn other_preserves_source() {
        let base = std::io::Error::other("boom");
        let err = WaterboxError::Other(anyhow::Error::new(base));
        assert!(err.to_string().contains("boom"));
    }
}
