//! Decoded processor responses and status normalization.
//!
//! The processor reports numeric status codes as JSON numbers in some fields
//! and strings in others; everything is coerced to a string here so callers
//! compare against one representation.

use error_stack::ResultExt;
use serde::{Deserialize, Deserializer};

use crate::{
    errors::{CustomResult, GatewayError},
    types::TransactionState,
};

pub mod status_codes {
    //! Processor status codes.

    pub const SUCCESS: &str = "190";
    pub const FAILED_TRANSACTION: &str = "490";
    pub const FAILED_VALIDATION: &str = "491";
    pub const FAILED_TECH_ERROR: &str = "492";
    /// Denied by the (third party) payment provider
    pub const FAILED_DENIED: &str = "690";
    pub const PENDING_INPUT: &str = "790";
    pub const PENDING_PROCESSING: &str = "791";
    pub const PENDING_CUSTOMER_ACTION: &str = "792";
    pub const PENDING_ON_HOLD: &str = "793";
    pub const PENDING_APPROVAL: &str = "794";
    pub const CANCELLED_BY_USER: &str = "890";
    pub const CANCELLED_BY_MERCHANT: &str = "891";

    /// SubCode announcing a consumer redirect
    pub const REDIRECT_SUB_CODE: &str = "S002";
}

const PENDING_CODES: [&str; 5] = [
    status_codes::PENDING_INPUT,
    status_codes::PENDING_PROCESSING,
    status_codes::PENDING_CUSTOMER_ACTION,
    status_codes::PENDING_ON_HOLD,
    status_codes::PENDING_APPROVAL,
];

const CANCELLED_CODES: [&str; 2] = [
    status_codes::CANCELLED_BY_USER,
    status_codes::CANCELLED_BY_MERCHANT,
];

/// Maps a processor status code onto the four-way transaction state. Total:
/// codes outside the documented set land on `Failed`.
pub fn classify_status(code: &str) -> TransactionState {
    if code == status_codes::SUCCESS {
        TransactionState::Successful
    } else if PENDING_CODES.contains(&code) {
        TransactionState::Pending
    } else if CANCELLED_CODES.contains(&code) {
        TransactionState::Cancelled
    } else {
        TransactionState::Failed
    }
}

fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Number(i64),
        Text(String),
    }

    Ok(match Raw::deserialize(deserializer)? {
        Raw::Number(number) => number.to_string(),
        Raw::Text(text) => text,
    })
}

fn opt_string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Number(f64),
        Text(String),
    }

    Ok(Option::<Raw>::deserialize(deserializer)?.map(|raw| match raw {
        Raw::Number(number) => number.to_string(),
        Raw::Text(text) => text,
    }))
}

#[derive(Clone, Debug, Deserialize)]
pub struct TransactionResponse {
    #[serde(rename = "Status")]
    pub status: ResponseStatus,
    #[serde(rename = "Key", default)]
    pub key: Option<String>,
    #[serde(rename = "RequiredAction", default)]
    pub required_action: Option<RequiredAction>,
    #[serde(rename = "Services", default)]
    pub services: Vec<ResponseService>,
    #[serde(rename = "ServiceCode", default)]
    pub service_code: Option<String>,
    #[serde(rename = "AmountDebit", default, deserialize_with = "opt_string_or_number")]
    pub amount_debit: Option<String>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct ResponseStatus {
    #[serde(rename = "Code")]
    pub code: StatusCode,
    #[serde(rename = "SubCode", default)]
    pub sub_code: Option<StatusCode>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct StatusCode {
    #[serde(rename = "Code", deserialize_with = "string_or_number")]
    pub code: String,
    #[serde(rename = "Description", default)]
    pub description: Option<String>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct RequiredAction {
    #[serde(rename = "RedirectURL", default)]
    pub redirect_url: Option<String>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct ResponseService {
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "Parameters", default)]
    pub parameters: Vec<ResponseServiceParameter>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct ResponseServiceParameter {
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "Value", deserialize_with = "string_or_number")]
    pub value: String,
}

/// Caller-supplied override for redirect URL resolution. When it returns a
/// URL, that URL wins over the processor's `RequiredAction.RedirectURL`.
pub type RedirectResolver = dyn Fn(&TransactionResponse) -> Option<String>;

/// The service name the processor reports for a generated QR code.
const IDEAL_QR_SERVICE: &str = "IdealQr";
const QR_IMAGE_URL_PARAMETER: &str = "QrImageUrl";

impl TransactionResponse {
    pub fn parse(body: &[u8]) -> CustomResult<Self, GatewayError> {
        serde_json::from_slice(body)
            .change_context(GatewayError::ResponseDeserializationFailed)
    }

    pub fn status_code(&self) -> &str {
        &self.status.code.code
    }

    /// Pure classification of the status code; ignores redirect signals.
    pub fn state(&self) -> TransactionState {
        classify_status(self.status_code())
    }

    /// A successful response that still redirects the consumer is not final,
    /// so a pending redirect forces this to `false`.
    pub fn is_successful(&self) -> bool {
        !self.is_redirect() && self.state() == TransactionState::Successful
    }

    pub fn is_pending(&self) -> bool {
        self.state() == TransactionState::Pending
    }

    pub fn is_cancelled(&self) -> bool {
        self.state() == TransactionState::Cancelled
    }

    pub fn is_redirect(&self) -> bool {
        if self
            .redirect_url()
            .is_some_and(|redirect_url| !redirect_url.is_empty())
        {
            return true;
        }
        if self
            .status
            .sub_code
            .as_ref()
            .is_some_and(|sub_code| sub_code.code == status_codes::REDIRECT_SUB_CODE)
        {
            return true;
        }
        self.service_code.as_deref() == Some(IDEAL_QR_SERVICE)
    }

    pub fn redirect_url(&self) -> Option<&str> {
        self.required_action
            .as_ref()
            .and_then(|action| action.redirect_url.as_deref())
    }

    pub fn redirect_url_with(&self, resolver: Option<&RedirectResolver>) -> Option<String> {
        if let Some(resolver) = resolver {
            if let Some(redirect_url) = resolver(self) {
                return Some(redirect_url);
            }
        }
        self.redirect_url().map(ToString::to_string)
    }

    /// The processor key identifying this transaction, empty when absent.
    pub fn transaction_reference(&self) -> &str {
        self.key.as_deref().unwrap_or("")
    }

    pub fn message(&self) -> Option<&str> {
        self.status.code.description.as_deref()
    }

    /// Parameters for a named payment service in the response, empty when
    /// the service is not present.
    pub fn parameters_for_service(&self, service_name: &str) -> &[ResponseServiceParameter] {
        self.services
            .iter()
            .find(|service| service.name == service_name)
            .map(|service| service.parameters.as_slice())
            .unwrap_or(&[])
    }

    pub fn qr_image_url(&self) -> Option<&str> {
        self.parameters_for_service(IDEAL_QR_SERVICE)
            .iter()
            .find(|parameter| parameter.name == QR_IMAGE_URL_PARAMETER)
            .map(|parameter| parameter.value.as_str())
    }

    pub fn amount_debit(&self) -> Option<&str> {
        self.amount_debit.as_deref()
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use serde_json::json;

    use super::*;

    fn response(body: serde_json::Value) -> TransactionResponse {
        TransactionResponse::parse(&serde_json::to_vec(&body).unwrap()).unwrap()
    }

    #[test]
    fn numeric_and_string_codes_normalize_alike() {
        let numeric = response(json!({"Status": {"Code": {"Code": 190}}}));
        let text = response(json!({"Status": {"Code": {"Code": "190"}}}));
        assert_eq!(numeric.status_code(), "190");
        assert_eq!(text.status_code(), "190");
        assert!(numeric.is_successful());
        assert!(text.is_successful());
    }

    #[test]
    fn classification_is_total() {
        assert_eq!(classify_status("190"), TransactionState::Successful);
        for code in ["790", "791", "792", "793", "794"] {
            assert_eq!(classify_status(code), TransactionState::Pending);
        }
        for code in ["890", "891"] {
            assert_eq!(classify_status(code), TransactionState::Cancelled);
        }
        for code in ["490", "491", "492", "690", "123", ""] {
            assert_eq!(classify_status(code), TransactionState::Failed);
        }
    }

    #[test]
    fn redirect_forces_not_successful() {
        let redirected = response(json!({
            "Status": {
                "Code": {"Code": 190},
                "SubCode": {"Code": "S002", "Description": "An additional action is required"},
            },
            "RequiredAction": {"RedirectURL": "https://testcheckout.buckaroo.nl/html/redirect.ashx?r=abc"},
            "Key": "4E8BD922192746C3918BF4077CXXXXXX",
        }));

        assert_eq!(redirected.state(), TransactionState::Successful);
        assert!(redirected.is_redirect());
        assert!(!redirected.is_successful());
        assert_eq!(
            redirected.redirect_url(),
            Some("https://testcheckout.buckaroo.nl/html/redirect.ashx?r=abc"),
        );
    }

    #[test]
    fn empty_redirect_url_is_not_a_redirect() {
        let settled = response(json!({
            "Status": {"Code": {"Code": 190}},
            "RequiredAction": {"RedirectURL": ""},
        }));
        assert!(!settled.is_redirect());
        assert!(settled.is_successful());
    }

    #[test]
    fn qr_service_code_signals_redirect() {
        let qr = response(json!({
            "Status": {"Code": {"Code": 190}},
            "ServiceCode": "IdealQr",
            "Key": "DATAKEY",
            "Services": [{
                "Name": "IdealQr",
                "Parameters": [
                    {"Name": "QrImageUrl", "Value": "https://example.com/qr.png"},
                ],
            }],
        }));
        assert!(qr.is_redirect());
        assert!(!qr.is_successful());
        assert_eq!(qr.qr_image_url(), Some("https://example.com/qr.png"));
    }

    #[test]
    fn resolver_takes_precedence_over_processor_url() {
        let body = response(json!({
            "Status": {"Code": {"Code": 790}},
            "RequiredAction": {"RedirectURL": "https://processor.example/redirect"},
        }));

        let resolver = |_: &TransactionResponse| Some("https://shop.example/pay".to_string());
        assert_eq!(
            body.redirect_url_with(Some(&resolver)),
            Some("https://shop.example/pay".to_string()),
        );

        let declining = |_: &TransactionResponse| None;
        assert_eq!(
            body.redirect_url_with(Some(&declining)),
            Some("https://processor.example/redirect".to_string()),
        );

        assert_eq!(
            body.redirect_url_with(None),
            Some("https://processor.example/redirect".to_string()),
        );
    }

    #[test]
    fn missing_key_yields_empty_reference() {
        let body = response(json!({"Status": {"Code": {"Code": 490, "Description": "Failed"}}}));
        assert_eq!(body.transaction_reference(), "");
        assert_eq!(body.message(), Some("Failed"));
    }

    #[test]
    fn amount_debit_accepts_number_or_string() {
        let number = response(json!({
            "Status": {"Code": {"Code": 190}},
            "AmountDebit": 10.5,
        }));
        assert_eq!(number.amount_debit(), Some("10.5"));

        let text = response(json!({
            "Status": {"Code": {"Code": 190}},
            "AmountDebit": "10.50",
        }));
        assert_eq!(text.amount_debit(), Some("10.50"));
    }

    #[test]
    fn unknown_service_has_no_parameters() {
        let body = response(json!({"Status": {"Code": {"Code": 190}}}));
        assert!(body.parameters_for_service("ideal").is_empty());
    }
}
