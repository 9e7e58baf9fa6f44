use std::fmt;

/// Message reported for codes missing from the gateway's table.
pub const UNKNOWN_ERROR_MESSAGE: &str = "Unknown error code";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
/// Error codes documented by SMS Manager for the XML API.
///
/// Unknown codes are preserved in [`GatewayError::code`] and return `None` from
/// [`KnownGatewayError::from_code`].
pub enum KnownGatewayError {
    MissingXmlData,
    InvalidFormat,
    InvalidCredentials,
    InvalidGateway,
    LowCredit,
    MissingRequiredData,
    NoValidPhoneNumbers,
    MessageMissingOrTooLong,
    InvalidSender,
    SystemError,
    ServiceUnavailable,
}

impl KnownGatewayError {
    /// Convert a raw gateway code into a known variant.
    pub fn from_code(code: i32) -> Option<Self> {
        Some(match code {
            101 => Self::MissingXmlData,
            102 => Self::InvalidFormat,
            103 => Self::InvalidCredentials,
            104 => Self::InvalidGateway,
            105 => Self::LowCredit,
            109 => Self::MissingRequiredData,
            201 => Self::NoValidPhoneNumbers,
            202 => Self::MessageMissingOrTooLong,
            203 => Self::InvalidSender,
            500 => Self::SystemError,
            503 => Self::ServiceUnavailable,
            _ => return None,
        })
    }

    /// Message documented for this code.
    pub fn message(self) -> &'static str {
        match self {
            Self::MissingXmlData => "Bad request (missing XMLDATA)",
            Self::InvalidFormat => "Invalid format",
            Self::InvalidCredentials => "Invalid username or password",
            Self::InvalidGateway => "Invalid parameter gateway",
            Self::LowCredit => "Low credit",
            Self::MissingRequiredData => "The requirement does not contain required data",
            Self::NoValidPhoneNumbers => "No valid phone numbers",
            Self::MessageMissingOrTooLong => "Text message does not exist or is too long",
            Self::InvalidSender => "Invalid parameter sender",
            Self::SystemError | Self::ServiceUnavailable => "System error",
        }
    }

    /// Whether the gateway failed on its side and the same request may succeed later.
    pub fn is_retryable(self) -> bool {
        matches!(self, Self::SystemError | Self::ServiceUnavailable)
    }

    /// Whether the credentials were rejected.
    pub fn is_auth_error(self) -> bool {
        matches!(self, Self::InvalidCredentials)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
/// Error reported by the gateway in a `Response Type="ERROR"` envelope.
pub struct GatewayError {
    pub code: i32,
    pub message: &'static str,
}

impl GatewayError {
    /// Look `code` up in the gateway's error table.
    pub fn from_code(code: i32) -> Self {
        let message = KnownGatewayError::from_code(code)
            .map(KnownGatewayError::message)
            .unwrap_or(UNKNOWN_ERROR_MESSAGE);
        Self { code, message }
    }

    /// Map this code to a known variant, if one exists.
    pub fn known(&self) -> Option<KnownGatewayError> {
        KnownGatewayError::from_code(self.code)
    }
}

impl fmt::Display for GatewayError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.message, self.code)
    }
}

impl std::error::Error for GatewayError {}
