//! Transport layer: XML envelope details (serialization/deserialization).

mod envelope;
mod send;

pub use send::{decode_error_code, decode_send_response, encode_send_form};

#[derive(Debug, thiserror::Error)]
pub enum EnvelopeError {
    #[error("invalid XML response: {0}")]
    Xml(#[from] quick_xml::de::DeError),

    #[error("failed to render XML request: {0}")]
    Write(String),

    #[error("response is missing {element}")]
    MissingElement { element: &'static str },

    #[error("response contains invalid number in {element}: {value}")]
    InvalidNumber { element: &'static str, value: String },
}
