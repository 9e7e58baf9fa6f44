//! Client layer: orchestrates transport calls and maps transport ↔ domain.

use std::error::Error as StdError;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use crate::domain::{
    GatewayError, PasswordHash, QueuedRequest, RequestBuilder, SendResponse, Username,
    ValidationError,
};

const DEFAULT_HOST_PATH: &str = "xml-api.smsmanager.cz/Send";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(60);
const DEFAULT_MAX_REDIRECTS: usize = 4;
const DEFAULT_USER_AGENT: &str = concat!("smsmanager/", env!("CARGO_PKG_VERSION"));

type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

#[derive(Debug, Clone)]
struct HttpResponse {
    status: u16,
    body: String,
}

trait HttpTransport: Send + Sync {
    fn post_form<'a>(
        &'a self,
        url: &'a str,
        params: Vec<(String, String)>,
    ) -> BoxFuture<'a, Result<HttpResponse, Box<dyn StdError + Send + Sync>>>;
}

#[derive(Debug, Clone)]
struct ReqwestTransport {
    client: reqwest::Client,
}

impl HttpTransport for ReqwestTransport {
    fn post_form<'a>(
        &'a self,
        url: &'a str,
        params: Vec<(String, String)>,
    ) -> BoxFuture<'a, Result<HttpResponse, Box<dyn StdError + Send + Sync>>> {
        Box::pin(async move {
            let response = self.client.post(url).form(&params).send().await?;
            let status = response.status().as_u16();
            let body = response.text().await?;
            Ok(HttpResponse { status, body })
        })
    }
}

#[derive(Debug, Clone)]
/// Account credentials for SMS Manager.
///
/// The password is kept only as its SHA-1 digest. Requests go over HTTPS unless
/// [`Credentials::use_tls`] turns it off.
pub struct Credentials {
    username: Username,
    password: PasswordHash,
    use_tls: bool,
}

impl Credentials {
    /// Create credentials from a plain-text password, hashing it with SHA-1.
    pub fn with_password(
        username: impl Into<String>,
        password: impl AsRef<str>,
    ) -> Result<Self, ValidationError> {
        Ok(Self {
            username: Username::new(username)?,
            password: PasswordHash::from_plain(password.as_ref()),
            use_tls: true,
        })
    }

    /// Create credentials from an already hashed (hex SHA-1) password.
    pub fn with_password_hash(
        username: impl Into<String>,
        hash: impl Into<String>,
    ) -> Result<Self, ValidationError> {
        Ok(Self {
            username: Username::new(username)?,
            password: PasswordHash::new(hash)?,
            use_tls: true,
        })
    }

    /// Choose between `https://` (`true`) and `http://` (`false`).
    pub fn use_tls(mut self, use_tls: bool) -> Self {
        self.use_tls = use_tls;
        self
    }

    pub fn username(&self) -> &Username {
        &self.username
    }

    pub fn password_hash(&self) -> &PasswordHash {
        &self.password
    }

    pub fn uses_tls(&self) -> bool {
        self.use_tls
    }

    fn scheme(&self) -> &'static str {
        if self.use_tls { "https" } else { "http" }
    }
}

#[derive(Debug, thiserror::Error)]
/// Errors returned by [`SmsManagerClient`].
///
/// This error preserves:
/// - HTTP-level failures (transport failures, non-200 replies without a gateway error),
/// - gateway errors (`Response Type="ERROR"`),
/// - validation/encode/parse failures.
pub enum SmsManagerError {
    /// HTTP client / transport failure (DNS, TLS, timeouts, etc).
    #[error("transport error: {0}")]
    Transport(#[source] Box<dyn StdError + Send + Sync>),

    /// Non-200 HTTP status whose body is not a gateway error envelope.
    #[error("unexpected HTTP status: {status}")]
    HttpStatus { status: u16, body: Option<String> },

    /// SMS Manager reported an error code.
    #[error("gateway error: {0}")]
    Gateway(#[from] GatewayError),

    /// Send was called without any finalized request.
    #[error("there are no requests to send")]
    EmptyQueue,

    /// The request document could not be rendered.
    #[error("encode error: {0}")]
    Encode(#[source] Box<dyn StdError + Send + Sync>),

    /// Response body could not be parsed as the expected format.
    #[error("parse error: {0}")]
    Parse(#[source] Box<dyn StdError + Send + Sync>),

    /// The configured endpoint is not a valid URL.
    #[error("invalid endpoint: {0}")]
    Endpoint(#[from] url::ParseError),

    /// One of the domain constructors rejected an invalid value.
    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),
}

#[derive(Debug, Clone)]
/// Builder for [`SmsManagerClient`].
///
/// Defaults: 30 s request timeout, 60 s connect timeout, up to 4 redirects, gzip
/// decompression on.
pub struct SmsManagerClientBuilder {
    credentials: Credentials,
    host_path: String,
    endpoint: Option<String>,
    timeout: Duration,
    connect_timeout: Duration,
    max_redirects: usize,
    gzip: bool,
    user_agent: String,
}

impl SmsManagerClientBuilder {
    /// Create a builder with the default endpoint and transport settings.
    pub fn new(credentials: Credentials) -> Self {
        Self {
            credentials,
            host_path: DEFAULT_HOST_PATH.to_owned(),
            endpoint: None,
            timeout: DEFAULT_TIMEOUT,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            max_redirects: DEFAULT_MAX_REDIRECTS,
            gzip: true,
            user_agent: DEFAULT_USER_AGENT.to_owned(),
        }
    }

    /// Override the host and path; the scheme still follows the credentials' TLS flag.
    pub fn host_path(mut self, host_path: impl Into<String>) -> Self {
        self.host_path = host_path.into();
        self
    }

    /// Override the full endpoint URL, ignoring the TLS flag.
    pub fn endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    /// Set the timeout applied to the entire request.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the timeout for establishing the connection.
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Set how many redirects are followed; `0` disables redirects.
    pub fn max_redirects(mut self, max_redirects: usize) -> Self {
        self.max_redirects = max_redirects;
        self
    }

    /// Advertise and transparently decode gzip-compressed replies.
    pub fn gzip(mut self, enabled: bool) -> Self {
        self.gzip = enabled;
        self
    }

    /// Override the HTTP `User-Agent` header.
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    fn resolve_endpoint(&self) -> Result<String, SmsManagerError> {
        let raw = match self.endpoint.as_deref() {
            Some(endpoint) => endpoint.to_owned(),
            None => format!(
                "{}://{}",
                self.credentials.scheme(),
                self.host_path.trim_start_matches('/')
            ),
        };
        Ok(url::Url::parse(&raw)?.into())
    }

    /// Build a [`SmsManagerClient`].
    pub fn build(self) -> Result<SmsManagerClient, SmsManagerError> {
        let endpoint = self.resolve_endpoint()?;

        let redirect = if self.max_redirects == 0 {
            reqwest::redirect::Policy::none()
        } else {
            reqwest::redirect::Policy::limited(self.max_redirects)
        };

        let client = reqwest::Client::builder()
            .timeout(self.timeout)
            .connect_timeout(self.connect_timeout)
            .redirect(redirect)
            .gzip(self.gzip)
            .user_agent(self.user_agent)
            .build()
            .map_err(|err| SmsManagerError::Transport(Box::new(err)))?;

        Ok(SmsManagerClient {
            credentials: self.credentials,
            endpoint,
            http: Arc::new(ReqwestTransport { client }),
        })
    }
}

#[derive(Clone)]
/// High-level SMS Manager client.
///
/// This type encodes queued requests into the XML envelope, posts it as the `XMLDATA`
/// form field and decodes the reply. By default it posts to
/// `https://xml-api.smsmanager.cz/Send` (`http://` when TLS is turned off).
pub struct SmsManagerClient {
    credentials: Credentials,
    endpoint: String,
    http: Arc<dyn HttpTransport>,
}

impl SmsManagerClient {
    /// Create a client with the default endpoint and transport settings.
    ///
    /// For more customization, use [`SmsManagerClient::builder`].
    pub fn new(credentials: Credentials) -> Result<Self, SmsManagerError> {
        SmsManagerClientBuilder::new(credentials).build()
    }

    /// Start building a client with custom settings.
    pub fn builder(credentials: Credentials) -> SmsManagerClientBuilder {
        SmsManagerClientBuilder::new(credentials)
    }

    /// Endpoint the client posts to.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Send a batch of finalized requests in one call.
    ///
    /// The requests are only borrowed; clearing the caller's queue is up to the caller
    /// (see [`SmsManagerClient::send_and_clear`]).
    ///
    /// Errors:
    /// - Returns [`SmsManagerError::EmptyQueue`] when `requests` is empty,
    /// - [`SmsManagerError::Gateway`] when SMS Manager returns an error envelope,
    /// - [`SmsManagerError::HttpStatus`] for other non-200 HTTP responses,
    /// - [`SmsManagerError::Transport`] when the HTTP call itself fails.
    pub async fn send(&self, requests: &[QueuedRequest]) -> Result<SendResponse, SmsManagerError> {
        if requests.is_empty() {
            return Err(SmsManagerError::EmptyQueue);
        }

        let params = crate::transport::encode_send_form(
            self.credentials.username(),
            self.credentials.password_hash(),
            requests,
        )
        .map_err(|err| SmsManagerError::Encode(Box::new(err)))?;

        tracing::debug!(
            endpoint = %self.endpoint,
            requests = requests.len(),
            "sending SMS batch"
        );

        let response = self
            .http
            .post_form(&self.endpoint, params)
            .await
            .map_err(SmsManagerError::Transport)?;

        tracing::debug!(status = response.status, "gateway replied");

        if let Some(code) = crate::transport::decode_error_code(&response.body) {
            let err = GatewayError::from_code(code);
            tracing::warn!(
                status = response.status,
                code = err.code,
                reason = err.message,
                "gateway rejected SMS batch"
            );
            return Err(SmsManagerError::Gateway(err));
        }

        if response.status != 200 {
            tracing::warn!(
                status = response.status,
                "gateway replied without a recognizable error code"
            );
            let body = if response.body.trim().is_empty() {
                None
            } else {
                Some(response.body)
            };
            return Err(SmsManagerError::HttpStatus {
                status: response.status,
                body,
            });
        }

        crate::transport::decode_send_response(&response.body)
            .map_err(|err| SmsManagerError::Parse(Box::new(err)))
    }

    /// Send everything queued in `builder` and clear the queue once the gateway accepted it.
    ///
    /// On error the queue is left intact so the batch can be inspected or sent again.
    pub async fn send_and_clear(
        &self,
        builder: &mut RequestBuilder,
    ) -> Result<SendResponse, SmsManagerError> {
        let response = self.send(builder.queue()).await?;
        builder.clear_queue();
        Ok(response)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use crate::domain::{KnownGatewayError, RequestBuilder};

    use super::*;

    const OK_REPLY: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
        <XmlDocument>
          <Response ID="0" Type="OK">OK</Response>
          <ResponseRequestList>
            <ResponseRequest SmsCount="1" SmsPrice="0.9">
              <RequestID>1001</RequestID>
              <CustomID>7</CustomID>
              <ResponseNumbersList>
                <Number>+420123456789</Number>
                <Number>420987654321</Number>
              </ResponseNumbersList>
            </ResponseRequest>
            <ResponseRequest SmsCount="2" SmsPrice="1.8">
              <RequestID>1002</RequestID>
              <CustomID>8</CustomID>
              <ResponseNumbersList>
                <Number>420111222333</Number>
              </ResponseNumbersList>
            </ResponseRequest>
          </ResponseRequestList>
        </XmlDocument>"#;

    #[derive(Debug, Clone)]
    struct FakeTransport {
        state: Arc<Mutex<FakeTransportState>>,
    }

    #[derive(Debug)]
    struct FakeTransportState {
        calls: usize,
        last_url: Option<String>,
        last_params: Vec<(String, String)>,
        response: Option<(u16, String)>,
    }

    impl FakeTransport {
        fn new(response_status: u16, response_body: impl Into<String>) -> Self {
            Self::with_response(Some((response_status, response_body.into())))
        }

        fn failing() -> Self {
            Self::with_response(None)
        }

        fn with_response(response: Option<(u16, String)>) -> Self {
            Self {
                state: Arc::new(Mutex::new(FakeTransportState {
                    calls: 0,
                    last_url: None,
                    last_params: Vec::new(),
                    response,
                })),
            }
        }

        fn last_request(&self) -> (Option<String>, Vec<(String, String)>) {
            let state = self.state.lock().unwrap();
            (state.last_url.clone(), state.last_params.clone())
        }

        fn calls(&self) -> usize {
            self.state.lock().unwrap().calls
        }
    }

    impl HttpTransport for FakeTransport {
        fn post_form<'a>(
            &'a self,
            url: &'a str,
            params: Vec<(String, String)>,
        ) -> BoxFuture<'a, Result<HttpResponse, Box<dyn StdError + Send + Sync>>> {
            Box::pin(async move {
                let response = {
                    let mut state = self.state.lock().unwrap();
                    state.calls += 1;
                    state.last_url = Some(url.to_owned());
                    state.last_params = params;
                    state.response.clone()
                };
                match response {
                    Some((status, body)) => Ok(HttpResponse { status, body }),
                    None => Err(std::io::Error::other("connection reset").into()),
                }
            })
        }
    }

    fn make_client(transport: FakeTransport) -> SmsManagerClient {
        SmsManagerClient {
            credentials: Credentials::with_password("user", "password").unwrap(),
            endpoint: "https://example.invalid/Send".to_owned(),
            http: Arc::new(transport),
        }
    }

    fn two_requests() -> RequestBuilder {
        let mut builder = RequestBuilder::new();
        builder
            .set_message("hello")
            .unwrap()
            .set_custom_id(7)
            .unwrap()
            .add_recipients(["+420123456789", "420987654321"])
            .unwrap();
        builder.finalize_request().unwrap();
        builder
            .set_message("second")
            .unwrap()
            .set_custom_id(8)
            .unwrap()
            .add_recipient("420111222333")
            .unwrap();
        builder.finalize_request().unwrap();
        builder
    }

    #[tokio::test]
    async fn send_posts_xmldata_and_parses_ok_response() {
        let transport = FakeTransport::new(200, OK_REPLY);
        let client = make_client(transport.clone());
        let builder = two_requests();

        let response = client.send(builder.queue()).await.unwrap();
        assert_eq!(response.status_code, 0);
        assert_eq!(response.requests.len(), 2);
        assert_eq!(
            response.requests[&1001_u64].numbers,
            vec!["+420123456789", "420987654321"]
        );
        assert_eq!(response.requests[&1002_u64].sms_count, 2);

        let (url, params) = transport.last_request();
        assert_eq!(url.as_deref(), Some("https://example.invalid/Send"));
        assert_eq!(params.len(), 1);
        assert_eq!(params[0].0, "XMLDATA");
        assert!(params[0].1.contains("<Username>user</Username>"));
        assert!(
            params[0]
                .1
                .contains("<Password>5baa61e4c9b93f3f0682250b6cf8331b7ee68fd8</Password>")
        );
        assert!(params[0].1.contains(r#"<Request Type="high" CustomID="8">"#));

        assert_eq!(builder.len(), 2);
    }

    #[tokio::test]
    async fn send_rejects_empty_queue_without_calling_transport() {
        let transport = FakeTransport::new(200, OK_REPLY);
        let client = make_client(transport.clone());

        let err = client.send(&[]).await.unwrap_err();
        assert!(matches!(err, SmsManagerError::EmptyQueue));
        assert_eq!(transport.calls(), 0);
    }

    #[tokio::test]
    async fn send_maps_error_envelope_to_gateway_error() {
        let body = r#"<XmlDocument><Response ID="105" Type="ERROR">Low credit</Response></XmlDocument>"#;
        let client = make_client(FakeTransport::new(400, body));

        let err = client.send(two_requests().queue()).await.unwrap_err();
        match err {
            SmsManagerError::Gateway(gateway) => {
                assert_eq!(gateway.code, 105);
                assert_eq!(gateway.message, "Low credit");
                assert_eq!(gateway.known(), Some(KnownGatewayError::LowCredit));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn send_keeps_unknown_gateway_code() {
        let body = r#"<XmlDocument><Response ID="999" Type="ERROR">?</Response></XmlDocument>"#;
        let client = make_client(FakeTransport::new(500, body));

        let err = client.send(two_requests().queue()).await.unwrap_err();
        match err {
            SmsManagerError::Gateway(gateway) => {
                assert_eq!(gateway.code, 999);
                assert_eq!(gateway.message, "Unknown error code");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn send_maps_error_envelope_on_200_to_gateway_error() {
        let body = r#"<XmlDocument><Response ID="103" Type="ERROR">Bad login</Response></XmlDocument>"#;
        let client = make_client(FakeTransport::new(200, body));

        let err = client.send(two_requests().queue()).await.unwrap_err();
        assert!(matches!(
            err,
            SmsManagerError::Gateway(GatewayError { code: 103, .. })
        ));
    }

    #[tokio::test]
    async fn send_maps_non_200_without_response_to_http_status() {
        let client = make_client(FakeTransport::new(
            502,
            "<html><body>Bad Gateway</body></html>",
        ));

        let err = client.send(two_requests().queue()).await.unwrap_err();
        assert!(matches!(
            err,
            SmsManagerError::HttpStatus {
                status: 502,
                body: Some(_)
            }
        ));
    }

    #[tokio::test]
    async fn send_maps_non_200_ok_envelope_to_http_status() {
        let body = r#"<XmlDocument><Response ID="0" Type="OK">OK</Response></XmlDocument>"#;
        let client = make_client(FakeTransport::new(503, body));

        let err = client.send(two_requests().queue()).await.unwrap_err();
        assert!(matches!(
            err,
            SmsManagerError::HttpStatus { status: 503, .. }
        ));
    }

    #[tokio::test]
    async fn send_maps_empty_http_body_to_none() {
        let client = make_client(FakeTransport::new(503, "   "));

        let err = client.send(two_requests().queue()).await.unwrap_err();
        assert!(matches!(
            err,
            SmsManagerError::HttpStatus {
                status: 503,
                body: None
            }
        ));
    }

    #[tokio::test]
    async fn send_maps_transport_failure() {
        let client = make_client(FakeTransport::failing());

        let err = client.send(two_requests().queue()).await.unwrap_err();
        assert!(matches!(err, SmsManagerError::Transport(_)));
    }

    #[tokio::test]
    async fn send_maps_malformed_reply_to_parse_error() {
        let client = make_client(FakeTransport::new(200, "<XmlDocument></XmlDocument>"));

        let err = client.send(two_requests().queue()).await.unwrap_err();
        assert!(matches!(err, SmsManagerError::Parse(_)));
    }

    #[tokio::test]
    async fn send_and_clear_empties_queue_only_on_success() {
        let client = make_client(FakeTransport::new(503, ""));
        let mut builder = two_requests();
        assert!(client.send_and_clear(&mut builder).await.is_err());
        assert_eq!(builder.len(), 2);

        let client = make_client(FakeTransport::new(200, OK_REPLY));
        client.send_and_clear(&mut builder).await.unwrap();
        assert!(builder.is_empty());
    }

    #[test]
    fn credentials_hash_plain_password_or_keep_hash() {
        let plain = Credentials::with_password("user", "password").unwrap();
        let hashed =
            Credentials::with_password_hash("user", "5baa61e4c9b93f3f0682250b6cf8331b7ee68fd8")
                .unwrap();
        assert_eq!(plain.password_hash(), hashed.password_hash());
        assert_eq!(plain.username().as_str(), "user");
        assert!(plain.uses_tls());

        assert!(Credentials::with_password("", "password").is_err());
        assert!(Credentials::with_password("user", "").is_ok());
        assert!(Credentials::with_password_hash("user", "abc").is_err());
    }

    #[test]
    fn endpoint_scheme_follows_tls_flag() {
        let credentials = Credentials::with_password("user", "password").unwrap();

        let client = SmsManagerClient::new(credentials.clone()).unwrap();
        assert_eq!(client.endpoint(), "https://xml-api.smsmanager.cz/Send");

        let client = SmsManagerClient::new(credentials.clone().use_tls(false)).unwrap();
        assert_eq!(client.endpoint(), "http://xml-api.smsmanager.cz/Send");

        let client = SmsManagerClient::builder(credentials.clone())
            .host_path("example.invalid/xml/Send")
            .build()
            .unwrap();
        assert_eq!(client.endpoint(), "https://example.invalid/xml/Send");

        let client = SmsManagerClient::builder(credentials.clone())
            .endpoint("http://127.0.0.1:8080/Send")
            .timeout(Duration::from_secs(5))
            .connect_timeout(Duration::from_secs(5))
            .max_redirects(0)
            .user_agent("test-agent")
            .build()
            .unwrap();
        assert_eq!(client.endpoint(), "http://127.0.0.1:8080/Send");

        let err = SmsManagerClient::builder(credentials)
            .endpoint("not a url")
            .build()
            .err()
            .unwrap();
        assert!(matches!(err, SmsManagerError::Endpoint(_)));
    }

    #[test]
    fn builder_decompresses_replies_unless_disabled() {
        let credentials = Credentials::with_password("user", "password").unwrap();

        let builder = SmsManagerClient::builder(credentials.clone());
        assert!(builder.gzip);
        assert!(builder.build().is_ok());

        let builder = SmsManagerClient::builder(credentials).gzip(false);
        assert!(!builder.gzip);
        assert!(builder.build().is_ok());
    }
}
