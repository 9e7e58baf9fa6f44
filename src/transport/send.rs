use std::collections::BTreeMap;
use std::str::FromStr;

use serde::Deserialize;

use crate::domain::{
    CustomId, MessageText, PasswordHash, QueuedRequest, RecipientNumber, RequestType,
    ResponseRecord, SendResponse, SenderId, Timestamp, Username,
};
use crate::transport::EnvelopeError;
use crate::transport::envelope::XmlElement;

/// Form field carrying the request document.
pub const XML_FORM_FIELD: &str = "XMLDATA";

const ERROR_RESPONSE_TYPE: &str = "ERROR";

#[derive(Debug, Deserialize)]
struct ResponseDocument {
    #[serde(rename = "Response", default)]
    response: Option<ResponseHeader>,
    #[serde(rename = "ResponseRequestList", default)]
    request_list: Option<ResponseRequestList>,
}

#[derive(Debug, Deserialize)]
struct ResponseHeader {
    #[serde(rename = "@ID", default)]
    id: Option<String>,
    #[serde(rename = "@Type", default)]
    kind: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct ResponseRequestList {
    #[serde(rename = "ResponseRequest", default)]
    requests: Vec<ResponseRequest>,
}

#[derive(Debug, Deserialize)]
struct ResponseRequest {
    #[serde(rename = "@SmsCount", default)]
    sms_count: Option<String>,
    #[serde(rename = "@SmsPrice", default)]
    sms_price: Option<String>,
    #[serde(rename = "RequestID", default)]
    request_id: Option<String>,
    #[serde(rename = "CustomID", default)]
    custom_id: Option<String>,
    #[serde(rename = "ResponseNumbersList", default)]
    numbers: Option<ResponseNumbersList>,
}

#[derive(Debug, Default, Deserialize)]
struct ResponseNumbersList {
    #[serde(rename = "Number", default)]
    numbers: Vec<String>,
}

/// Build the `RequestDocument` tree for a batch of queued requests.
pub fn encode_send_document(
    username: &Username,
    password: &PasswordHash,
    requests: &[QueuedRequest],
) -> XmlElement {
    let header = XmlElement::new("RequestHeader")
        .child(XmlElement::with_text(Username::FIELD, username.as_str()))
        .child(XmlElement::with_text(PasswordHash::FIELD, password.as_str()));

    let request_list =
        XmlElement::new("RequestList").children(requests.iter().map(encode_request));

    XmlElement::new("RequestDocument")
        .child(header)
        .child(request_list)
}

fn encode_request(request: &QueuedRequest) -> XmlElement {
    let numbers = XmlElement::new(RecipientNumber::LIST_FIELD).children(
        request
            .recipients()
            .iter()
            .map(|number| XmlElement::with_text(RecipientNumber::FIELD, number.as_str())),
    );

    XmlElement::new("Request")
        .attribute(RequestType::FIELD, request.request_type().as_str())
        .optional_attribute(
            CustomId::FIELD,
            request.custom_id().map(|id| id.value().to_string()),
        )
        .optional_attribute(SenderId::FIELD, request.sender().map(SenderId::as_str))
        .optional_attribute(Timestamp::TIME_FIELD, request.time().map(Timestamp::as_str))
        .optional_attribute(
            Timestamp::EXPIRATION_FIELD,
            request.expiration().map(Timestamp::as_str),
        )
        .child(XmlElement::with_text(
            MessageText::FIELD,
            request.message().as_str(),
        ))
        .child(numbers)
}

/// Render the batch as the form parameters posted to the gateway.
pub fn encode_send_form(
    username: &Username,
    password: &PasswordHash,
    requests: &[QueuedRequest],
) -> Result<Vec<(String, String)>, EnvelopeError> {
    let xml = encode_send_document(username, password, requests).render()?;
    Ok(vec![(XML_FORM_FIELD.to_owned(), xml)])
}

/// Extract the gateway error code from a `Response Type="ERROR"` envelope.
///
/// Returns `None` when the body is not XML, has no `Response/@ID`, or is not an error
/// envelope.
pub fn decode_error_code(xml: &str) -> Option<i32> {
    let document: ResponseDocument = quick_xml::de::from_str(xml).ok()?;
    let header = document.response?;
    let id = header.id?;
    if header.kind.as_deref() != Some(ERROR_RESPONSE_TYPE) {
        return None;
    }
    id.trim().parse().ok()
}

/// Decode a successful reply into records keyed by request id.
pub fn decode_send_response(xml: &str) -> Result<SendResponse, EnvelopeError> {
    let document: ResponseDocument = quick_xml::de::from_str(xml)?;
    let header = document
        .response
        .ok_or(EnvelopeError::MissingElement { element: "Response" })?;
    let status_code: i32 = parse_required("Response/@ID", header.id)?;

    let mut requests = BTreeMap::<u64, ResponseRecord>::new();
    for request in document.request_list.unwrap_or_default().requests {
        let record = ResponseRecord {
            request_id: parse_required("RequestID", request.request_id)?,
            sms_count: parse_required("ResponseRequest/@SmsCount", request.sms_count)?,
            sms_price: parse_required("ResponseRequest/@SmsPrice", request.sms_price)?,
            custom_id: parse_custom_id(request.custom_id)?,
            status_code,
            numbers: request
                .numbers
                .unwrap_or_default()
                .numbers
                .into_iter()
                .map(|number| number.trim().to_owned())
                .collect(),
        };

        if requests.contains_key(&record.request_id) {
            tracing::warn!(
                request_id = record.request_id,
                "duplicate RequestID in gateway response; keeping the last record"
            );
        }
        requests.insert(record.request_id, record);
    }

    Ok(SendResponse {
        status_code,
        requests,
    })
}

fn parse_required<T: FromStr>(
    element: &'static str,
    value: Option<String>,
) -> Result<T, EnvelopeError> {
    let value = value.ok_or(EnvelopeError::MissingElement { element })?;
    value
        .trim()
        .parse()
        .map_err(|_| EnvelopeError::InvalidNumber { element, value })
}

fn parse_custom_id(value: Option<String>) -> Result<Option<CustomId>, EnvelopeError> {
    match value {
        Some(value) if !value.trim().is_empty() => value
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| EnvelopeError::InvalidNumber {
                element: CustomId::FIELD,
                value,
            }),
        _ => Ok(None),
    }
}
