//! Errors for this library

/// All the known errors returned by this crate.
#[derive(Debug, snafu::Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum HanabiError {
    #[snafu(display("Invalid firework config"))]
    /// A firework was configured with values that would make it degenerate or invisible.
    Config {
        /// The parent error type
        source: ConfigError,
    },

    /// General errors that don't need to be matched on
    #[snafu(whatever, display("{message}"))]
    Whatever {
        /// A helpful message acompanying the error
        message: String,
        #[snafu(source(from(Box<dyn std::error::Error + Send + Sync>, Some)))]
        /// The parent error type
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },
}

/// Problems found when validating a firework's config.
#[derive(Debug, snafu::Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum ConfigError {
    /// A value that must be above zero wasn't.
    #[snafu(display("`{field}` must be greater than 0, got: {value}"))]
    NotPositive {
        /// The name of the offending config field
        field: &'static str,
        /// The value it was given
        value: f32,
    },

    /// A value was infinite or NaN.
    #[snafu(display("`{field}` must be a finite number, got: {value}"))]
    NotFinite {
        /// The name of the offending config field
        field: &'static str,
        /// The value it was given
        value: f32,
    },

    /// A value that is a fraction of the surface's dimensions was outside `0.0..=1.0`.
    #[snafu(display("`{field}` must be between 0.0 and 1.0, got: {value}"))]
    NotNormalised {
        /// The name of the offending config field
        field: &'static str,
        /// The value it was given
        value: f32,
    },

    /// A duration in milliseconds that can't be represented, usually because it's negative.
    #[snafu(display("`{field}` isn't a valid duration: {value}ms"))]
    InvalidDuration {
        /// The name of the offending config field
        field: &'static str,
        /// The value it was given
        value: f32,
    },

    /// A colour string that we don't know how to parse.
    #[snafu(display("Couldn't parse colour: '{input}'"))]
    Colour {
        /// The original colour string
        input: String,
    },
}

impl From<ConfigError> for HanabiError {
    fn from(source: ConfigError) -> Self {
        Self::Config { source }
    }
}
