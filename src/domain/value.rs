use std::fmt;
use std::str::FromStr;

use phonenumber::country;
use sha1::{Digest, Sha1};
use time::macros::format_description;
use time::{OffsetDateTime, PrimitiveDateTime};

use crate::domain::validation::ValidationError;

fn is_digits(value: &str) -> bool {
    !value.is_empty() && value.bytes().all(|b| b.is_ascii_digit())
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
/// SMS Manager account name (`RequestHeader/Username`).
///
/// Invariant: non-empty after trimming.
pub struct Username(String);

impl Username {
    /// XML element name used by SMS Manager (`Username`).
    pub const FIELD: &'static str = "Username";

    /// Create a validated [`Username`].
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        let value = value.into();
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::Empty { field: Self::FIELD });
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Borrow the validated username.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[derive(Clone, PartialEq, Eq, Hash)]
/// SHA-1 digest of the account password (`RequestHeader/Password`).
///
/// Invariant: 40 lowercase hexadecimal characters. The plain password is never stored.
pub struct PasswordHash(String);

impl PasswordHash {
    /// XML element name used by SMS Manager (`Password`).
    pub const FIELD: &'static str = "Password";

    /// Hash a plain-text password with SHA-1.
    pub fn from_plain(password: &str) -> Self {
        Self(hex::encode(Sha1::digest(password.as_bytes())))
    }

    /// Accept an already hashed password (hex-encoded SHA-1, any letter case).
    pub fn new(hash: impl Into<String>) -> Result<Self, ValidationError> {
        let hash = hash.into();
        let trimmed = hash.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::Empty { field: Self::FIELD });
        }
        if trimmed.len() != 40 || !trimmed.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(ValidationError::InvalidPasswordHash);
        }
        Ok(Self(trimmed.to_ascii_lowercase()))
    }

    /// Borrow the hex digest.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for PasswordHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PasswordHash(..)")
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
/// Displayed originator of the message (`Request/@Sender`).
///
/// Invariant: numeric senders have 1..=10 digits, any other sender has 1..=11 characters.
pub struct SenderId(String);

impl SenderId {
    /// XML attribute name used by SMS Manager (`Sender`).
    pub const FIELD: &'static str = "Sender";

    /// Maximum number of digits in a numeric sender.
    pub const MAX_DIGITS: usize = 10;
    /// Maximum number of characters in a text sender.
    pub const MAX_CHARS: usize = 11;

    /// Create a validated [`SenderId`].
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        let value = value.into();
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::Empty { field: Self::FIELD });
        }

        if is_digits(trimmed) {
            if trimmed.len() > Self::MAX_DIGITS {
                return Err(ValidationError::InvalidSenderNumber {
                    input: trimmed.to_owned(),
                });
            }
        } else if trimmed.chars().count() > Self::MAX_CHARS {
            return Err(ValidationError::InvalidSenderText {
                input: trimmed.to_owned(),
            });
        }

        Ok(Self(trimmed.to_owned()))
    }

    /// Returns `true` for a numeric sender id.
    pub fn is_numeric(&self) -> bool {
        is_digits(&self.0)
    }

    /// Borrow the validated sender id.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
/// Recipient phone number as sent to SMS Manager (`NumbersList/Number`).
///
/// Invariant: 9..=18 digits, optionally prefixed with a single `+`. The value is kept as
/// given (after trimming) because the gateway echoes it back in the response.
pub struct RecipientNumber(String);

impl RecipientNumber {
    /// XML element name used by SMS Manager (`Number`).
    pub const FIELD: &'static str = "Number";
    /// XML element name of the list holding the numbers (`NumbersList`).
    pub const LIST_FIELD: &'static str = "NumbersList";

    /// Minimum number of digits.
    pub const MIN_DIGITS: usize = 9;
    /// Maximum number of digits.
    pub const MAX_DIGITS: usize = 18;

    /// Create a validated recipient number.
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        let value = value.into();
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::Empty { field: Self::FIELD });
        }

        if is_digits(trimmed) {
            if !(Self::MIN_DIGITS..=Self::MAX_DIGITS).contains(&trimmed.len()) {
                return Err(ValidationError::InvalidRecipientNumber {
                    input: trimmed.to_owned(),
                });
            }
        } else if !trimmed.strip_prefix('+').is_some_and(is_digits) {
            return Err(ValidationError::InvalidRecipientFormat {
                input: trimmed.to_owned(),
            });
        }

        Ok(Self(trimmed.to_owned()))
    }

    /// Parse a free-form phone number and normalize it to E.164 before validating.
    ///
    /// `default_region` is used when the input does not contain an explicit country prefix.
    pub fn parse(
        default_region: Option<country::Id>,
        input: impl Into<String>,
    ) -> Result<Self, ValidationError> {
        let input = input.into();
        let raw = input.trim();
        if raw.is_empty() {
            return Err(ValidationError::Empty { field: Self::FIELD });
        }

        let parsed = phonenumber::parse(default_region, raw).map_err(|_| {
            ValidationError::InvalidPhoneNumber {
                input: raw.to_owned(),
            }
        })?;
        let e164 = phonenumber::format(&parsed)
            .mode(phonenumber::Mode::E164)
            .to_string();

        Self::new(e164)
    }

    /// Number as sent to SMS Manager.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
/// Delivery class of a request (`Request/@Type`).
pub enum RequestType {
    Lowcost,
    #[default]
    High,
    Direct,
}

impl RequestType {
    /// XML attribute name used by SMS Manager (`Type`).
    pub const FIELD: &'static str = "Type";

    /// Every request type supported by the gateway.
    pub const ALL: [RequestType; 3] = [Self::Lowcost, Self::High, Self::Direct];

    /// Wire value.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Lowcost => "lowcost",
            Self::High => "high",
            Self::Direct => "direct",
        }
    }

    /// Human-readable name, suitable for a selection list.
    pub fn label(self) -> &'static str {
        match self {
            Self::Lowcost => "Lowcost SMS",
            Self::High => "High Quality SMS",
            Self::Direct => "Direct SMS",
        }
    }
}

impl FromStr for RequestType {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| ValidationError::InvalidRequestType {
                input: s.to_owned(),
            })
    }
}

impl fmt::Display for RequestType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
/// Caller-supplied correlation id echoed back by the gateway (`CustomID`).
///
/// Invariant: at most 10 decimal digits.
pub struct CustomId(u64);

impl CustomId {
    /// XML name used by SMS Manager (`CustomID`).
    pub const FIELD: &'static str = "CustomID";

    /// Largest value that fits in 10 digits.
    pub const MAX: u64 = 9_999_999_999;

    /// Create a validated custom id.
    pub fn new(value: u64) -> Result<Self, ValidationError> {
        if value > Self::MAX {
            return Err(ValidationError::InvalidCustomId {
                input: value.to_string(),
            });
        }
        Ok(Self(value))
    }

    /// Get the underlying id.
    pub fn value(self) -> u64 {
        self.0
    }
}

impl FromStr for CustomId {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ValidationError::InvalidCustomId {
            input: s.to_owned(),
        };
        if !is_digits(s) || s.len() > 10 {
            return Err(invalid());
        }
        s.parse::<u64>().map(Self).map_err(|_| invalid())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
/// Scheduled send time or expiration time (`Request/@Time`, `Request/@Expiration`).
///
/// Holds either a caller-provided `YYYY-MM-DDTHH:MM:SS` string or a rendered
/// `YYYY-MM-DDTHH:MM:SS+HH:MM` value.
pub struct Timestamp(String);

impl Timestamp {
    /// XML attribute name for the scheduled send time (`Time`).
    pub const TIME_FIELD: &'static str = "Time";
    /// XML attribute name for the expiration time (`Expiration`).
    pub const EXPIRATION_FIELD: &'static str = "Expiration";

    /// Validate a `YYYY-MM-DDTHH:MM:SS` string. `field` names the attribute in errors.
    pub fn parse(field: &'static str, value: impl Into<String>) -> Result<Self, ValidationError> {
        let value = value.into();
        let format = format_description!("[year]-[month]-[day]T[hour]:[minute]:[second]");
        if value.len() != 19 || PrimitiveDateTime::parse(&value, format).is_err() {
            return Err(ValidationError::InvalidTimestamp {
                field,
                input: value,
            });
        }
        Ok(Self(value))
    }

    /// Render a date/time with its UTC offset.
    pub fn from_datetime(
        field: &'static str,
        value: OffsetDateTime,
    ) -> Result<Self, ValidationError> {
        let format = format_description!(
            "[year]-[month]-[day]T[hour]:[minute]:[second][offset_hour sign:mandatory]:[offset_minute]"
        );
        value
            .format(format)
            .map(Self)
            .map_err(|_| ValidationError::InvalidTimestamp {
                field,
                input: value.to_string(),
            })
    }

    /// Borrow the rendered timestamp.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
/// SMS message text (`Request/Message`).
///
/// Invariant: non-empty. The text is kept exactly as given, whitespace included.
pub struct MessageText(String);

impl MessageText {
    /// XML element name used by SMS Manager (`Message`).
    pub const FIELD: &'static str = "Message";

    /// Create validated message text.
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        let value = value.into();
        if value.is_empty() {
            return Err(ValidationError::Empty { field: Self::FIELD });
        }
        Ok(Self(value))
    }

    /// Transliterate to the closest ASCII text (diacritics stripped), then validate.
    pub fn ascii(value: impl AsRef<str>) -> Result<Self, ValidationError> {
        Self::new(deunicode::deunicode(value.as_ref()))
    }

    /// Borrow the message text.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}
