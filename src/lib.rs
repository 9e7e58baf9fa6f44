//! Typed Rust client for the SMS Manager XML API.
//!
//! The crate is split into a domain layer of validated types and the request builder,
//! a transport layer for the XML envelope, and a small client layer posting batches
//! to the gateway.
//!
//! ```rust,no_run
//! use smsmanager::{Credentials, RequestBuilder, SmsManagerClient};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), smsmanager::SmsManagerError> {
//!     let client = SmsManagerClient::new(Credentials::with_password("user", "secret")?)?;
//!
//!     let mut batch = RequestBuilder::new();
//!     batch
//!         .set_sender("Shop")?
//!         .set_message("Your order has shipped")?
//!         .add_recipient("+420123456789")?;
//!     batch.finalize_request()?;
//!
//!     let response = client.send_and_clear(&mut batch).await?;
//!     for (request_id, record) in &response.requests {
//!         println!("{request_id}: {} SMS, {:.2}", record.sms_count, record.sms_price);
//!     }
//!     Ok(())
//! }
//! ```
#![forbid(unsafe_code)]

pub mod client;
pub mod domain;
mod transport;

pub use client::{Credentials, SmsManagerClient, SmsManagerClientBuilder, SmsManagerError};
pub use domain::{
    CustomId, GatewayError, KnownGatewayError, MessageText, PasswordHash, PendingRequest,
    QueuedRequest, RecipientNumber, RequestBuilder, RequestType, ResponseRecord, SendResponse,
    SenderId, Timestamp, Username, ValidationError,
};
