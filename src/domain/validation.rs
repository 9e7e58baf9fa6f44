use std::fmt;

use crate::domain::value::{
    CustomId, MessageText, PasswordHash, RecipientNumber, RequestType, SenderId,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    Empty { field: &'static str },
    InvalidSenderNumber { input: String },
    InvalidSenderText { input: String },
    InvalidRecipientNumber { input: String },
    InvalidRecipientFormat { input: String },
    InvalidPhoneNumber { input: String },
    InvalidRequestType { input: String },
    InvalidCustomId { input: String },
    InvalidTimestamp { field: &'static str, input: String },
    InvalidPasswordHash,
    NoRecipients,
    EmptyMessage,
}

impl ValidationError {
    /// XML name of the field that rejected the value.
    pub fn field(&self) -> &'static str {
        match self {
            Self::Empty { field } | Self::InvalidTimestamp { field, .. } => *field,
            Self::InvalidSenderNumber { .. } | Self::InvalidSenderText { .. } => SenderId::FIELD,
            Self::InvalidRecipientNumber { .. }
            | Self::InvalidRecipientFormat { .. }
            | Self::InvalidPhoneNumber { .. } => RecipientNumber::FIELD,
            Self::NoRecipients => RecipientNumber::LIST_FIELD,
            Self::InvalidRequestType { .. } => RequestType::FIELD,
            Self::InvalidCustomId { .. } => CustomId::FIELD,
            Self::InvalidPasswordHash => PasswordHash::FIELD,
            Self::EmptyMessage => MessageText::FIELD,
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty { field } => write!(f, "{field} must not be empty"),
            Self::InvalidSenderNumber { input } => {
                write!(f, "invalid sender number: {input} (expected 1..=10 digits)")
            }
            Self::InvalidSenderText { input } => {
                write!(f, "invalid sender text: {input} (expected 1..=11 characters)")
            }
            Self::InvalidRecipientNumber { input } => {
                write!(
                    f,
                    "invalid recipient number: {input} (expected 9..=18 digits)"
                )
            }
            Self::InvalidRecipientFormat { input } => {
                write!(f, "invalid recipient number format: {input}")
            }
            Self::InvalidPhoneNumber { input } => write!(f, "invalid phone number: {input}"),
            Self::InvalidRequestType { input } => {
                write!(
                    f,
                    "invalid request type: {input} (expected lowcost, high or direct)"
                )
            }
            Self::InvalidCustomId { input } => {
                write!(f, "invalid custom ID: {input} (expected 1..=10 digits)")
            }
            Self::InvalidTimestamp { field, input } => {
                write!(
                    f,
                    "invalid {field} format: {input} (expected YYYY-MM-DDTHH:MM:SS)"
                )
            }
            Self::InvalidPasswordHash => {
                write!(f, "password hash must be 40 hexadecimal characters")
            }
            Self::NoRecipients => write!(f, "Recipient numbers is empty"),
            Self::EmptyMessage => write!(f, "Message is empty"),
        }
    }
}

impl std::error::Error for ValidationError {}
