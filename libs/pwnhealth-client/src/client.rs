use std::time::Duration;

use http::header::{CONTENT_TYPE, HeaderValue};
use reqwest::blocking::{Client, RequestBuilder};
use secrecy::ExposeSecret;
use tracing::{debug, info, warn};
use url::Url;

use crate::config::{ClientConfig, Credentials};
use crate::environment::Environment;
use crate::error::{ClientError, ClientResult, TransportFailure};
use crate::order::CustomerOrderRequest;
use crate::query::{INCLUDE_EVERYTHING, INCLUDE_REQUISITION, OrderListQuery};
use crate::report;
use crate::routes::Route;
use crate::xml::{self, RemoteResponse};

const APPLICATION_XML: &str = "application/xml";
const DEFAULT_PSC_LIMIT: u32 = 10;
const ERROR_EXCERPT_LEN: usize = 256;

/// Blocking client for the PWNHealth lab ordering API.
///
/// Every operation performs exactly one HTTP round trip with Basic
/// authentication and returns the normalized XML reply. Nothing is retried.
///
/// The client holds no per-call state: share it across threads behind an
/// `Arc` if needed. Do not call it from inside an async runtime; use
/// `spawn_blocking` there.
pub struct LabOrderClient {
    http: Client,
    base_url: Url,
    environment: Environment,
    timeout: Duration,
    credentials: Credentials,
}

impl std::fmt::Debug for LabOrderClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LabOrderClient")
            .field("base_url", &self.base_url.as_str())
            .field("environment", &self.environment)
            .field("timeout", &self.timeout)
            .field("username", &self.credentials.username)
            .finish_non_exhaustive()
    }
}

impl LabOrderClient {
    /// Create client from configuration
    ///
    /// # Errors
    /// Returns `ClientError::Configuration` if the endpoint is not a usable
    /// http(s) URL or the HTTP client cannot be built.
    pub fn from_config(config: ClientConfig) -> ClientResult<Self> {
        let base_url = parse_base_url(config.resolved_base_url())?;

        let http = Client::builder()
            .timeout(config.timeout)
            .user_agent(format!("pwnhealth-client/{}", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| {
                ClientError::configuration(format!("Failed to create HTTP client: {e}"))
            })?;

        info!(
            base_url = %base_url,
            environment = %config.environment,
            timeout_ms = config.timeout.as_millis(),
            "Created LabOrderClient"
        );

        Ok(Self {
            http,
            base_url,
            environment: config.environment,
            timeout: config.timeout,
            credentials: config.credentials,
        })
    }

    /// Endpoint all requests are resolved against.
    #[must_use]
    pub fn base_url(&self) -> &str {
        self.base_url.as_str()
    }

    #[must_use]
    pub fn environment(&self) -> Environment {
        self.environment
    }

    #[must_use]
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Submit a new order (`POST /customers`).
    ///
    /// The date of birth goes out as `YYYYMMDD`; see
    /// [`CustomerOrderRequest::to_xml`] for the document layout.
    ///
    /// # Errors
    /// `Validation` when required fields are missing (nothing is sent),
    /// `Transport` when the call cannot complete, `ResponseParse` when a
    /// successful reply is not XML.
    pub fn create_order(&self, order: &CustomerOrderRequest) -> ClientResult<RemoteResponse> {
        let body = order.to_xml()?;
        debug!(bytes = body.len(), "Serialized customer order");

        let url = Route::CreateOrder.url(&self.base_url)?;
        let request = self
            .http
            .post(url.clone())
            .header(CONTENT_TYPE, HeaderValue::from_static(APPLICATION_XML))
            .body(body);
        self.execute(&Route::CreateOrder, &url, request)
    }

    /// List orders (`GET /customers`).
    ///
    /// # Errors
    /// `Transport` or `ResponseParse`, see [`LabOrderClient::create_order`].
    pub fn list_orders(&self, query: &OrderListQuery) -> ClientResult<RemoteResponse> {
        self.get(&Route::ListOrders(query))
    }

    /// Fetch one order (`GET /customers/{order_id}?include=`).
    ///
    /// # Errors
    /// `Validation` for an empty `order_id`, otherwise as
    /// [`LabOrderClient::create_order`].
    pub fn get_order_details(&self, order_id: &str, include: &str) -> ClientResult<RemoteResponse> {
        self.get(&Route::OrderDetails { order_id, include })
    }

    /// Order details with the requisition bundle.
    ///
    /// # Errors
    /// See [`LabOrderClient::get_order_details`].
    pub fn get_requisition(&self, requisition_id: &str) -> ClientResult<RemoteResponse> {
        self.get_order_details(requisition_id, INCLUDE_REQUISITION)
    }

    /// Order details including results.
    ///
    /// # Errors
    /// See [`LabOrderClient::get_order_details`].
    pub fn get_results(&self, requisition_id: &str) -> ClientResult<RemoteResponse> {
        self.get_order_details(requisition_id, INCLUDE_EVERYTHING)
    }

    /// One registered lab (`GET /registered_labs?lab_id=`).
    ///
    /// # Errors
    /// `Transport` or `ResponseParse`.
    pub fn get_registered_labs(&self, lab_id: u64) -> ClientResult<RemoteResponse> {
        self.get(&Route::RegisteredLabs {
            lab_id: Some(lab_id),
        })
    }

    /// All registered labs (`GET /registered_labs`).
    ///
    /// # Errors
    /// `Transport` or `ResponseParse`.
    pub fn list_registered_labs(&self) -> ClientResult<RemoteResponse> {
        self.get(&Route::RegisteredLabs { lab_id: None })
    }

    /// Test type catalog (`GET /test_types`), filtered by lab when given.
    ///
    /// # Errors
    /// `Transport` or `ResponseParse`.
    pub fn get_test_types(&self, lab_id: Option<u64>) -> ClientResult<RemoteResponse> {
        self.get(&Route::TestTypes { lab_id })
    }

    /// Test groups (`GET /test_groups?lab_id=&account_number=&name=`).
    ///
    /// # Errors
    /// `Transport` or `ResponseParse`.
    pub fn get_test_groups(
        &self,
        lab_id: u64,
        account_number: &str,
        name: &str,
    ) -> ClientResult<RemoteResponse> {
        self.get(&Route::TestGroups {
            lab_id,
            account_number,
            name,
        })
    }

    /// Patient service centers near a zip code (`GET /find_psc/{zip}`).
    ///
    /// `limit` defaults to 10. The `lab` parameter is left out when no lab is given.
    ///
    /// # Errors
    /// `Validation` for an empty zip, otherwise `Transport` or `ResponseParse`.
    pub fn find_nearest_service_center(
        &self,
        zip: &str,
        lab_id: Option<u64>,
        limit: Option<u32>,
    ) -> ClientResult<RemoteResponse> {
        self.get(&Route::NearestServiceCenter {
            zip,
            lab_id,
            limit: limit.unwrap_or(DEFAULT_PSC_LIMIT),
        })
    }

    /// Decode a Base64 report payload. Local only.
    ///
    /// # Errors
    /// `Decode` on malformed Base64.
    pub fn decode_report(payload: &str) -> ClientResult<Vec<u8>> {
        report::decode_report(payload)
    }

    fn get(&self, route: &Route<'_>) -> ClientResult<RemoteResponse> {
        let url = route.url(&self.base_url)?;
        let request = self.http.get(url.clone());
        self.execute(route, &url, request)
    }

    fn execute(
        &self,
        route: &Route<'_>,
        url: &Url,
        request: RequestBuilder,
    ) -> ClientResult<RemoteResponse> {
        let method = route.method();
        debug!(
            %method,
            path = url.path(),
            query = url.query().unwrap_or_default(),
            "Sending request"
        );

        let response = request
            .basic_auth(
                &self.credentials.username,
                Some(self.credentials.password().expose_secret()),
            )
            .send()
            .inspect_err(|e| warn!(%method, path = url.path(), error = %e, "Request failed"))?;

        let status = response.status();
        let body = response.text()?;
        debug!(%status, bytes = body.len(), "Received response");

        match xml::normalize(&body) {
            Ok(value) => {
                if !status.is_success() {
                    warn!(%status, path = url.path(), "Remote API returned an error document");
                }
                Ok(value)
            }
            Err(err) if status.is_success() => {
                warn!(%status, path = url.path(), error = %err, "Response body is not XML");
                Err(err)
            }
            Err(_) => {
                warn!(%status, path = url.path(), "Request failed without an XML body");
                Err(ClientError::transport(
                    TransportFailure::Status(status),
                    excerpt(&body),
                ))
            }
        }
    }
}

fn parse_base_url(raw: &str) -> ClientResult<Url> {
    let url = Url::parse(raw)
        .map_err(|e| ClientError::configuration(format!("Invalid base URL '{raw}': {e}")))?;
    if !matches!(url.scheme(), "http" | "https") || url.cannot_be_a_base() {
        return Err(ClientError::configuration(format!(
            "Base URL '{raw}' must be an http(s) URL"
        )));
    }
    Ok(url)
}

fn excerpt(body: &str) -> String {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return "empty response body".to_owned();
    }
    match trimmed.char_indices().nth(ERROR_EXCERPT_LEN) {
        Some((cut, _)) => format!("{}...", &trimmed[..cut]),
        None => trimmed.to_owned(),
    }
}
