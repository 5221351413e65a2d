//! The gateway client: builds signed requests for each processor call and
//! optionally executes them.
//!
//! Every `build_*` method returns the exact [`Request`] that would go on the
//! wire, so callers that bring their own transport can still use the payload
//! construction and signing. The async methods send through the embedded
//! [`reqwest::Client`] and decode the reply.

use error_stack::ResultExt;
use masking::Mask;

use crate::{
    auth, client, consts,
    errors::{CustomResult, GatewayError},
    request::{Method, Request, RequestBuilder},
    requests::{
        self, CancelReservationPayload, CancelReservationRequest, DataPayload, DataRequest,
        PurchaseRequest, RefundPayload, RefundRequest, StatusRequest, TransactionPayload,
    },
    responses::TransactionResponse,
    types::BuckarooAuthType,
};

pub struct Buckaroo {
    auth: BuckarooAuthType,
    test_mode: bool,
    culture: String,
    client: reqwest::Client,
}

impl Buckaroo {
    pub fn new(auth: BuckarooAuthType) -> Self {
        Self {
            auth,
            test_mode: false,
            culture: consts::DEFAULT_CULTURE.to_string(),
            client: reqwest::Client::new(),
        }
    }

    /// Routes calls to the sandbox environment.
    pub fn with_test_mode(mut self, test_mode: bool) -> Self {
        self.test_mode = test_mode;
        self
    }

    /// Locale sent in the `Culture` header, `nl-NL` unless overridden.
    pub fn with_culture(mut self, culture: impl Into<String>) -> Self {
        self.culture = culture.into();
        self
    }

    fn endpoint(&self, path: &str) -> String {
        let base = if self.test_mode {
            consts::TEST_BASE_URL
        } else {
            consts::LIVE_BASE_URL
        };
        format!("{base}{path}")
    }

    fn signed_request(&self, method: Method, endpoint: &str, body: Option<Vec<u8>>) -> Request {
        let token = auth::generate_authorization_token(&self.auth, body.as_deref(), endpoint);
        let mut builder = RequestBuilder::new()
            .method(method)
            .url(endpoint)
            .headers(vec![
                (
                    consts::headers::AUTHORIZATION.to_string(),
                    format!("{} {token}", consts::AUTH_SCHEME).into_masked(),
                ),
                (
                    consts::headers::CONTENT_TYPE.to_string(),
                    "application/json".to_string().into(),
                ),
                (
                    consts::headers::CULTURE.to_string(),
                    self.culture.clone().into(),
                ),
            ]);
        if let Some(body) = body {
            builder = builder.body(body);
        }
        builder.build()
    }

    pub fn build_purchase(&self, request: &PurchaseRequest) -> CustomResult<Request, GatewayError> {
        let payload = TransactionPayload::try_from(request)?;
        let body = requests::canonical_json_bytes(&payload)?;
        let endpoint = self.endpoint(consts::TRANSACTION_PATH);
        Ok(self.signed_request(Method::Post, &endpoint, Some(body)))
    }

    pub fn build_data(&self, request: &DataRequest) -> CustomResult<Request, GatewayError> {
        let today = time::OffsetDateTime::now_utc().date();
        self.build_data_at(request, today)
    }

    /// Same as [`Self::build_data`] with an explicit date driving the QR
    /// expiry.
    pub fn build_data_at(
        &self,
        request: &DataRequest,
        today: time::Date,
    ) -> CustomResult<Request, GatewayError> {
        let payload = DataPayload::try_from((request, today))?;
        let body = requests::canonical_json_bytes(&payload)?;
        let endpoint = self.endpoint(consts::DATA_REQUEST_PATH);
        Ok(self.signed_request(Method::Post, &endpoint, Some(body)))
    }

    pub fn build_refund(&self, request: &RefundRequest) -> CustomResult<Request, GatewayError> {
        let payload = RefundPayload::try_from(request)?;
        let body = requests::canonical_json_bytes(&payload)?;
        let endpoint = self.endpoint(consts::TRANSACTION_PATH);
        Ok(self.signed_request(Method::Post, &endpoint, Some(body)))
    }

    pub fn build_cancel_reservation(
        &self,
        request: &CancelReservationRequest,
    ) -> CustomResult<Request, GatewayError> {
        let payload = CancelReservationPayload::try_from(request)?;
        let body = requests::canonical_json_bytes(&payload)?;
        let endpoint = self.endpoint(consts::DATA_REQUEST_PATH);
        Ok(self.signed_request(Method::Post, &endpoint, Some(body)))
    }

    pub fn build_status(&self, request: &StatusRequest) -> CustomResult<Request, GatewayError> {
        let reference = request.get_transaction_reference()?;
        let endpoint = format!(
            "{}{reference}",
            self.endpoint(consts::TRANSACTION_STATUS_PATH)
        );
        Ok(self.signed_request(Method::Get, &endpoint, None))
    }

    pub async fn purchase(
        &self,
        request: &PurchaseRequest,
    ) -> CustomResult<TransactionResponse, GatewayError> {
        let request = self.build_purchase(request)?;
        self.execute(request).await
    }

    pub async fn data(
        &self,
        request: &DataRequest,
    ) -> CustomResult<TransactionResponse, GatewayError> {
        let request = self.build_data(request)?;
        self.execute(request).await
    }

    pub async fn refund(
        &self,
        request: &RefundRequest,
    ) -> CustomResult<TransactionResponse, GatewayError> {
        let request = self.build_refund(request)?;
        self.execute(request).await
    }

    pub async fn cancel_reservation(
        &self,
        request: &CancelReservationRequest,
    ) -> CustomResult<TransactionResponse, GatewayError> {
        let request = self.build_cancel_reservation(request)?;
        self.execute(request).await
    }

    pub async fn status(
        &self,
        request: &StatusRequest,
    ) -> CustomResult<TransactionResponse, GatewayError> {
        let request = self.build_status(request)?;
        self.execute(request).await
    }

    /// The body is decoded regardless of the HTTP status; the processor
    /// reports failures inside the document.
    async fn execute(&self, request: Request) -> CustomResult<TransactionResponse, GatewayError> {
        let response = client::send_request(&self.client, request, None)
            .await
            .change_context(GatewayError::ProcessingStepFailed(None))?;
        TransactionResponse::parse(&response.response).attach_printable_lazy(|| {
            format!("processor replied with http status {}", response.status_code)
        })
    }
}
