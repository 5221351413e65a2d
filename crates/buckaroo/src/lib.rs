//! Client for the Buckaroo payment processor's JSON API.
//!
//! Supports the purchase, data, refund, reservation-cancellation and status
//! calls, with request signing (HMAC SHA-256 authorization tokens), response
//! status normalization and push notification decoding.
//!
//! ```no_run
//! use buckaroo::{Buckaroo, BuckarooAuthType, PaymentMethod, PurchaseRequest, StringMajorUnit};
//!
//! # async fn run() -> buckaroo::CustomResult<(), buckaroo::GatewayError> {
//! let gateway = Buckaroo::new(BuckarooAuthType::new("website_key", "secret_key"))
//!     .with_test_mode(true);
//!
//! let response = gateway
//!     .purchase(&PurchaseRequest {
//!         payment_method: Some(PaymentMethod::Ideal),
//!         amount: Some(StringMajorUnit::new("10.00")),
//!         currency: Some("EUR".to_string()),
//!         return_url: Some("https://shop.example/return".to_string()),
//!         client_ip: Some("203.0.113.7".to_string()),
//!         issuer: Some("ABNANL2A".to_string()),
//!         ..Default::default()
//!     })
//!     .await?;
//!
//! if let Some(redirect_url) = response.redirect_url_with(None) {
//!     println!("send the consumer to {redirect_url}");
//! }
//! # Ok(())
//! # }
//! ```

pub mod auth;
pub mod client;
pub mod consts;
pub mod crypto;
pub mod errors;
pub mod gateway;
pub mod request;
pub mod requests;
pub mod responses;
pub mod services;
pub mod types;
pub mod webhooks;

pub use self::{
    errors::{CustomResult, GatewayError, HttpClientError},
    gateway::Buckaroo,
    request::{Method, Request, RequestBuilder},
    requests::{
        CancelReservationRequest, DataRequest, PurchaseRequest, RefundRequest, StatusRequest,
    },
    responses::{classify_status, RedirectResolver, TransactionResponse},
    types::{
        Address, BuckarooAuthType, Customer, OrderLine, PaymentMethod, StringMajorUnit,
        TransactionState,
    },
    webhooks::{NotificationStatus, PushNotification},
};
