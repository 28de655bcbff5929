use derive_more::{Display, From};

/// Payload and parameter validation failures
#[derive(Debug, Clone, PartialEq, Display)]
pub enum ValidationError {
    #[display(fmt = "missing field `{}`", _0)]
    MissingField(String),
    #[display(fmt = "field `{}` has the wrong type, expected {}", _0, _1)]
    WrongType(String, &'static str),
    #[display(fmt = "field `{}` has {} entries but `dates` has {}", _0, _2, _1)]
    LengthMismatch(String, usize, usize),
    #[display(fmt = "unsupported indicator `{}`", _0)]
    UnsupportedIndicator(String),
    #[display(fmt = "`{}` must be within [{}, {}], got {}", field, min, max, actual)]
    OutOfRange { field: &'static str, min: i64, max: i64, actual: i64 },
}

impl ValidationError {
    /// Name of the offending field or parameter.
    pub fn field(&self) -> &str {
        match self {
            ValidationError::MissingField(name)
            | ValidationError::WrongType(name, _)
            | ValidationError::LengthMismatch(name, _, _)
            | ValidationError::UnsupportedIndicator(name) => name.as_str(),
            ValidationError::OutOfRange { field, .. } => *field,
        }
    }
}

/// Transport failures surfaced by the data source
#[derive(Debug, Clone, PartialEq, Display)]
pub enum FetchError {
    #[display(fmt = "request failed: {}", _0)]
    Transport(String),
    #[display(fmt = "server answered {}: {}", status, message)]
    Status { status: u16, message: String },
    #[display(fmt = "response is not valid JSON: {}", _0)]
    Decode(String),
}

/// Rendering surface failures
#[derive(Debug, Clone, PartialEq, Display)]
pub enum RenderError {
    #[display(fmt = "rendering surface unavailable: {}", _0)]
    SurfaceUnavailable(String),
    #[display(fmt = "drawing failed: {}", _0)]
    DrawFailed(String),
}

#[derive(Debug, Clone, PartialEq, Display)]
pub enum ConfigurationError {
    #[display(fmt = "configuration is not valid JSON: {}", _0)]
    Parse(String),
    #[display(fmt = "invalid configuration parameter: {}", _0)]
    InvalidParameter(String),
}

/// Root error type
#[derive(Debug, Clone, PartialEq, Display, From)]
pub enum AppError {
    #[display(fmt = "Validation Error: {}", _0)]
    Validation(ValidationError),
    #[display(fmt = "Network Error: {}", _0)]
    Fetch(FetchError),
    #[display(fmt = "Rendering Error: {}", _0)]
    Rendering(RenderError),
    #[display(fmt = "Configuration Error: {}", _0)]
    Configuration(ConfigurationError),
}

impl std::error::Error for ValidationError {}
impl std::error::Error for FetchError {}
impl std::error::Error for RenderError {}
impl std::error::Error for ConfigurationError {}
impl std::error::Error for AppError {}

pub type ValidationResult<T> = Result<T, ValidationError>;
pub type RenderingResult<T> = Result<T, RenderError>;
