//! Domain layer: strong types with validation and invariants (no I/O).

mod error_code;
mod request;
mod response;
mod validation;
mod value;

pub use error_code::{GatewayError, KnownGatewayError, UNKNOWN_ERROR_MESSAGE};
pub use request::{PendingRequest, QueuedRequest, RequestBuilder};
pub use response::{ResponseRecord, SendResponse};
pub use validation::ValidationError;
pub use value::{
    CustomId, MessageText, PasswordHash, RecipientNumber, RequestType, SenderId, Timestamp,
    Username,
};
