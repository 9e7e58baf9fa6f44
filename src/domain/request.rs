use time::OffsetDateTime;

use crate::domain::validation::ValidationError;
use crate::domain::value::{
    CustomId, MessageText, RecipientNumber, RequestType, SenderId, Timestamp,
};

/// Request under construction in a [`RequestBuilder`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PendingRequest {
    sender: Option<SenderId>,
    recipients: Vec<RecipientNumber>,
    request_type: RequestType,
    message: Option<MessageText>,
    custom_id: Option<CustomId>,
    time: Option<Timestamp>,
    expiration: Option<Timestamp>,
}

impl PendingRequest {
    pub fn sender(&self) -> Option<&SenderId> {
        self.sender.as_ref()
    }

    pub fn recipients(&self) -> &[RecipientNumber] {
        &self.recipients
    }

    pub fn request_type(&self) -> RequestType {
        self.request_type
    }

    pub fn message(&self) -> Option<&MessageText> {
        self.message.as_ref()
    }

    pub fn custom_id(&self) -> Option<CustomId> {
        self.custom_id
    }

    pub fn time(&self) -> Option<&Timestamp> {
        self.time.as_ref()
    }

    pub fn expiration(&self) -> Option<&Timestamp> {
        self.expiration.as_ref()
    }
}

/// Finalized request waiting in the queue of a [`RequestBuilder`].
///
/// Invariant: at least one recipient and a message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueuedRequest {
    sender: Option<SenderId>,
    recipients: Vec<RecipientNumber>,
    request_type: RequestType,
    message: MessageText,
    custom_id: Option<CustomId>,
    time: Option<Timestamp>,
    expiration: Option<Timestamp>,
}

impl QueuedRequest {
    pub fn sender(&self) -> Option<&SenderId> {
        self.sender.as_ref()
    }

    pub fn recipients(&self) -> &[RecipientNumber] {
        &self.recipients
    }

    pub fn request_type(&self) -> RequestType {
        self.request_type
    }

    pub fn message(&self) -> &MessageText {
        &self.message
    }

    pub fn custom_id(&self) -> Option<CustomId> {
        self.custom_id
    }

    pub fn time(&self) -> Option<&Timestamp> {
        self.time.as_ref()
    }

    pub fn expiration(&self) -> Option<&Timestamp> {
        self.expiration.as_ref()
    }
}

/// Accumulates requests for a single batch send.
///
/// Setters validate immediately and leave the pending request untouched on error.
/// [`RequestBuilder::finalize_request`] moves the pending request into the queue.
/// The queue is not cleared by sending; use [`RequestBuilder::take_queue`] or
/// [`RequestBuilder::clear_queue`] once a batch has been delivered.
///
/// ```rust
/// use smsmanager::RequestBuilder;
///
/// let mut builder = RequestBuilder::new();
/// builder
///     .set_sender("Shop")?
///     .set_message("Your order has shipped")?
///     .add_recipients(["+420123456789", "420987654321"])?;
/// builder.finalize_request()?;
/// assert_eq!(builder.len(), 1);
/// # Ok::<(), smsmanager::ValidationError>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct RequestBuilder {
    pending: PendingRequest,
    queue: Vec<QueuedRequest>,
}

impl RequestBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_sender(&mut self, value: impl Into<String>) -> Result<&mut Self, ValidationError> {
        self.pending.sender = Some(SenderId::new(value)?);
        Ok(self)
    }

    /// Set the message text as given.
    pub fn set_message(&mut self, value: impl Into<String>) -> Result<&mut Self, ValidationError> {
        self.pending.message = Some(MessageText::new(value)?);
        Ok(self)
    }

    /// Set the message text transliterated to ASCII.
    pub fn set_message_ascii(
        &mut self,
        value: impl AsRef<str>,
    ) -> Result<&mut Self, ValidationError> {
        self.pending.message = Some(MessageText::ascii(value)?);
        Ok(self)
    }

    pub fn set_type(&mut self, value: RequestType) -> &mut Self {
        self.pending.request_type = value;
        self
    }

    pub fn set_custom_id(&mut self, value: u64) -> Result<&mut Self, ValidationError> {
        self.pending.custom_id = Some(CustomId::new(value)?);
        Ok(self)
    }

    /// Schedule the send time from a `YYYY-MM-DDTHH:MM:SS` string.
    pub fn set_time(&mut self, value: impl Into<String>) -> Result<&mut Self, ValidationError> {
        self.pending.time = Some(Timestamp::parse(Timestamp::TIME_FIELD, value)?);
        Ok(self)
    }

    pub fn set_time_at(&mut self, value: OffsetDateTime) -> Result<&mut Self, ValidationError> {
        self.pending.time = Some(Timestamp::from_datetime(Timestamp::TIME_FIELD, value)?);
        Ok(self)
    }

    /// Set the expiration time from a `YYYY-MM-DDTHH:MM:SS` string.
    pub fn set_expiration(
        &mut self,
        value: impl Into<String>,
    ) -> Result<&mut Self, ValidationError> {
        self.pending.expiration = Some(Timestamp::parse(Timestamp::EXPIRATION_FIELD, value)?);
        Ok(self)
    }

    pub fn set_expiration_at(
        &mut self,
        value: OffsetDateTime,
    ) -> Result<&mut Self, ValidationError> {
        self.pending.expiration = Some(Timestamp::from_datetime(
            Timestamp::EXPIRATION_FIELD,
            value,
        )?);
        Ok(self)
    }

    pub fn add_recipient(
        &mut self,
        number: impl Into<String>,
    ) -> Result<&mut Self, ValidationError> {
        self.pending.recipients.push(RecipientNumber::new(number)?);
        Ok(self)
    }

    /// Add numbers in order. Stops at the first invalid number; numbers before it stay added.
    pub fn add_recipients<I>(&mut self, numbers: I) -> Result<&mut Self, ValidationError>
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        for number in numbers {
            self.add_recipient(number)?;
        }
        Ok(self)
    }

    /// Move the pending request into the queue and reset it for the next one.
    pub fn finalize_request(&mut self) -> Result<(), ValidationError> {
        let pending = &self.pending;
        if pending.recipients.is_empty() {
            return Err(ValidationError::NoRecipients);
        }
        let Some(message) = pending.message.clone() else {
            return Err(ValidationError::EmptyMessage);
        };

        let PendingRequest {
            sender,
            recipients,
            request_type,
            custom_id,
            time,
            expiration,
            ..
        } = std::mem::take(&mut self.pending);

        self.queue.push(QueuedRequest {
            sender,
            recipients,
            request_type,
            message,
            custom_id,
            time,
            expiration,
        });
        Ok(())
    }

    pub fn pending(&self) -> &PendingRequest {
        &self.pending
    }

    pub fn queue(&self) -> &[QueuedRequest] {
        &self.queue
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Take every queued request, leaving the queue empty.
    pub fn take_queue(&mut self) -> Vec<QueuedRequest> {
        std::mem::take(&mut self.queue)
    }

    pub fn clear_queue(&mut self) {
        self.queue.clear();
    }
}
