//! PWNHealth Lab Ordering Client
//!
//! Blocking client for the PWNHealth lab ordering API. Each method performs a
//! single authenticated HTTP round trip and returns the XML reply converted
//! into a generic [`RemoteResponse`] tree:
//!
//! - create orders and list or fetch them (requisitions, results)
//! - registered labs, test type and test group catalogs
//! - nearest patient service center lookup
//! - local Base64 decoding of PDF reports
//!
//! Remote error documents are returned as data, not as errors. Only failures
//! to complete the exchange surface as [`ClientError`].
//!
//! # Examples
//!
//! ## Creating an Order
//!
//! ```no_run
//! use pwnhealth_client::{ClientConfig, Credentials, CustomerOrderRequest, LabOrderClient};
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = ClientConfig::staging(Credentials::new("api-user", "api-password"));
//! let client = LabOrderClient::from_config(config)?;
//!
//! let order = CustomerOrderRequest::builder()
//!     .first_name("Jane")
//!     .last_name("Doe")
//!     .date_of_birth_text("1985-03-07")
//!     .address("1 Main St")
//!     .city("Springfield")
//!     .state("IL")
//!     .zip("62701")
//!     .test_type(1234)
//!     .build()?;
//!
//! let reply = client.create_order(&order)?;
//! println!("{reply}");
//! # Ok(())
//! # }
//! ```
//!
//! ## Fetching Results
//!
//! ```no_run
//! use pwnhealth_client::{ClientConfig, LabOrderClient};
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = LabOrderClient::from_config(ClientConfig::from_env()?)?;
//!
//! let results = client.get_results("88123")?;
//! if let Some(pdf) = results["customer"]["results_pdf"].as_str() {
//!     let bytes = LabOrderClient::decode_report(pdf)?;
//!     std::fs::write("results.pdf", bytes)?;
//! }
//! # Ok(())
//! # }
//! ```
//!
//! The client is blocking. From async code, run it on `spawn_blocking`.

mod client;
mod config;
mod environment;
mod error;
mod order;
mod query;
mod report;
mod routes;
mod xml;

// Re-export public API
pub use client::LabOrderClient;
pub use config::{
    ClientConfig, Credentials, ENVIRONMENT_VAR, PASSWORD_VAR, TIMEOUT_SECS_VAR, USERNAME_VAR,
};
pub use environment::{Environment, PRODUCTION_BASE_URL, STAGING_BASE_URL};
pub use error::{ClientError, ClientResult, TransportFailure};
pub use order::{CustomerOrderRequest, CustomerOrderRequestBuilder, format_dob, parse_dob};
pub use query::{INCLUDE_EVERYTHING, INCLUDE_REQUISITION, OrderListQuery};
pub use report::decode_report;
pub use xml::{ATTRIBUTES_KEY, RemoteResponse, TEXT_KEY, normalize};

// Re-export commonly used types from dependencies
pub use http::StatusCode;
