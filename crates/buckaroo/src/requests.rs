//! Caller-facing request parameters and the wire payloads built from them.
//!
//! The caller structs hold everything optional; each payload's `TryFrom`
//! checks the fields its call requires, in a fixed order, so the first
//! missing field is the one reported.

use error_stack::{report, ResultExt};
use masking::Secret;
use serde::Serialize;

use crate::{
    errors::{CustomResult, GatewayError},
    services::{self, Services},
    types::{ClientIp, Customer, OrderLine, PaymentMethod, StringMajorUnit},
};

#[derive(Clone, Debug, Default)]
pub struct PurchaseRequest {
    pub payment_method: Option<PaymentMethod>,
    pub amount: Option<StringMajorUnit>,
    pub currency: Option<String>,
    pub return_url: Option<String>,
    /// Feeds both `ReturnURLCancel` and `ReturnURLError`
    pub cancel_url: Option<String>,
    pub reject_url: Option<String>,
    pub push_url: Option<String>,
    pub client_ip: Option<String>,
    /// Forwarded as the processor-side `Invoice` identifier
    pub transaction_id: Option<String>,
    pub description: Option<String>,
    /// Bank (ideal), card brand (creditcard) or sub-method selector
    pub issuer: Option<String>,
    /// Client-side tokenization session, card flows only
    pub session_id: Option<Secret<String>>,
    /// Encrypted card data for the Bancontact encrypted flow
    pub encrypted_key: Option<Secret<String>>,
    pub site_id: Option<i64>,
    /// Comma-separated method list for payment invitations
    pub available_payment_methods: Option<String>,
    pub delivery_method: Option<String>,
    pub reservation_number: Option<String>,
    pub customer: Option<Customer>,
    pub order_lines: Vec<OrderLine>,
}

impl PurchaseRequest {
    fn get_payment_method(&self) -> CustomResult<PaymentMethod, GatewayError> {
        self.payment_method.ok_or_else(|| {
            report!(GatewayError::MissingRequiredField {
                field_name: "payment_method",
            })
        })
    }

    fn get_amount(&self) -> CustomResult<&StringMajorUnit, GatewayError> {
        self.amount.as_ref().ok_or_else(|| {
            report!(GatewayError::MissingRequiredField {
                field_name: "amount",
            })
        })
    }

    fn get_return_url(&self) -> CustomResult<&String, GatewayError> {
        self.return_url.as_ref().ok_or_else(|| {
            report!(GatewayError::MissingRequiredField {
                field_name: "return_url",
            })
        })
    }

    fn get_client_ip(&self) -> CustomResult<&String, GatewayError> {
        self.client_ip.as_ref().ok_or_else(|| {
            report!(GatewayError::MissingRequiredField {
                field_name: "client_ip",
            })
        })
    }

    pub(crate) fn get_customer(&self) -> CustomResult<&Customer, GatewayError> {
        self.customer.as_ref().ok_or_else(|| {
            report!(GatewayError::MissingRequiredField {
                field_name: "customer",
            })
        })
    }
}

/// Payload for `POST /Transaction`.
#[derive(Clone, Debug, Serialize)]
pub struct TransactionPayload {
    #[serde(rename = "AmountDebit")]
    pub amount_debit: StringMajorUnit,
    #[serde(rename = "ClientIP")]
    pub client_ip: ClientIp,
    #[serde(rename = "ContinueOnIncomplete", skip_serializing_if = "Option::is_none")]
    pub continue_on_incomplete: Option<u8>,
    #[serde(rename = "Currency")]
    pub currency: Option<String>,
    #[serde(rename = "Description")]
    pub description: Option<String>,
    #[serde(rename = "Invoice")]
    pub invoice: Option<String>,
    #[serde(rename = "PushUrl")]
    pub push_url: Option<String>,
    #[serde(rename = "ReturnURLCancel")]
    pub return_url_cancel: Option<String>,
    #[serde(rename = "ReturnURLError")]
    pub return_url_error: Option<String>,
    #[serde(rename = "ReturnURLReject")]
    pub return_url_reject: Option<String>,
    #[serde(rename = "ReturnUrl")]
    pub return_url: String,
    #[serde(rename = "Services")]
    pub services: Services,
    #[serde(
        rename = "ServicesSelectableByClient",
        skip_serializing_if = "Option::is_none"
    )]
    pub services_selectable_by_client: Option<String>,
}

impl TryFrom<&PurchaseRequest> for TransactionPayload {
    type Error = error_stack::Report<GatewayError>;

    fn try_from(request: &PurchaseRequest) -> Result<Self, Self::Error> {
        let payment_method = request.get_payment_method()?;
        let amount = request.get_amount()?.clone();
        let return_url = request.get_return_url()?.clone();
        let client_ip = ClientIp::new(request.get_client_ip()?.clone());
        let plan = services::purchase_services(request, payment_method)?;

        Ok(Self {
            amount_debit: amount,
            client_ip,
            continue_on_incomplete: plan.continue_on_incomplete,
            currency: request.currency.clone(),
            description: request.description.clone(),
            invoice: request.transaction_id.clone(),
            push_url: request.push_url.clone(),
            return_url_cancel: request.cancel_url.clone(),
            return_url_error: request.cancel_url.clone(),
            return_url_reject: request.reject_url.clone(),
            return_url,
            services: plan.services,
            services_selectable_by_client: plan.services_selectable_by_client,
        })
    }
}

#[derive(Clone, Debug)]
pub struct DataRequest {
    pub payment_method: Option<PaymentMethod>,
    pub amount: Option<StringMajorUnit>,
    pub currency: Option<String>,
    pub return_url: Option<String>,
    /// Feeds both `ReturnURLCancel` and `ReturnURLError`
    pub cancel_url: Option<String>,
    pub reject_url: Option<String>,
    pub push_url: Option<String>,
    pub push_url_failure: Option<String>,
    pub client_ip: Option<String>,
    pub transaction_id: Option<String>,
    pub description: Option<String>,
    /// `"idealqr"` selects QR generation
    pub issuer: Option<String>,
    pub operating_country: String,
    /// Switches the Klarna flow from `Reserve` to `UpdateReservation`
    pub update_reservation: bool,
    pub reservation_number: Option<String>,
    pub customer: Option<Customer>,
    pub order_lines: Vec<OrderLine>,
}

impl Default for DataRequest {
    fn default() -> Self {
        Self {
            payment_method: None,
            amount: None,
            currency: None,
            return_url: None,
            cancel_url: None,
            reject_url: None,
            push_url: None,
            push_url_failure: None,
            client_ip: None,
            transaction_id: None,
            description: None,
            issuer: None,
            operating_country: crate::consts::DEFAULT_OPERATING_COUNTRY.to_string(),
            update_reservation: false,
            reservation_number: None,
            customer: None,
            order_lines: Vec::new(),
        }
    }
}

impl DataRequest {
    fn get_payment_method(&self) -> CustomResult<PaymentMethod, GatewayError> {
        self.payment_method.ok_or_else(|| {
            report!(GatewayError::MissingRequiredField {
                field_name: "payment_method",
            })
        })
    }

    pub(crate) fn get_amount(&self) -> CustomResult<&StringMajorUnit, GatewayError> {
        self.amount.as_ref().ok_or_else(|| {
            report!(GatewayError::MissingRequiredField {
                field_name: "amount",
            })
        })
    }

    fn get_client_ip(&self) -> CustomResult<&String, GatewayError> {
        self.client_ip.as_ref().ok_or_else(|| {
            report!(GatewayError::MissingRequiredField {
                field_name: "client_ip",
            })
        })
    }

    fn get_return_url(&self) -> CustomResult<&String, GatewayError> {
        self.return_url.as_ref().ok_or_else(|| {
            report!(GatewayError::MissingRequiredField {
                field_name: "return_url",
            })
        })
    }

    pub(crate) fn get_customer(&self) -> CustomResult<&Customer, GatewayError> {
        self.customer.as_ref().ok_or_else(|| {
            report!(GatewayError::MissingRequiredField {
                field_name: "customer",
            })
        })
    }
}

/// Payload for `POST /DataRequest`.
#[derive(Clone, Debug, Serialize)]
pub struct DataPayload {
    #[serde(rename = "AmountDebit")]
    pub amount_debit: StringMajorUnit,
    #[serde(rename = "ClientIP")]
    pub client_ip: ClientIp,
    #[serde(rename = "Currency")]
    pub currency: Option<String>,
    #[serde(rename = "Invoice")]
    pub invoice: Option<String>,
    #[serde(rename = "PushUrl")]
    pub push_url: Option<String>,
    #[serde(rename = "PushURLFailure")]
    pub push_url_failure: Option<String>,
    #[serde(rename = "ReturnURLCancel")]
    pub return_url_cancel: Option<String>,
    #[serde(rename = "ReturnURLError")]
    pub return_url_error: Option<String>,
    #[serde(rename = "ReturnURLReject")]
    pub return_url_reject: Option<String>,
    #[serde(rename = "ReturnUrl")]
    pub return_url: String,
    #[serde(rename = "Services", skip_serializing_if = "Option::is_none")]
    pub services: Option<Services>,
}

impl TryFrom<(&DataRequest, time::Date)> for DataPayload {
    type Error = error_stack::Report<GatewayError>;

    fn try_from((request, today): (&DataRequest, time::Date)) -> Result<Self, Self::Error> {
        request.get_payment_method()?;
        let amount = request.get_amount()?.clone();
        let return_url = request.get_return_url()?.clone();
        let client_ip = ClientIp::new(request.get_client_ip()?.clone());
        let services = services::data_services(request, today)?;

        Ok(Self {
            amount_debit: amount,
            client_ip,
            currency: request.currency.clone(),
            invoice: request.transaction_id.clone(),
            push_url: request.push_url.clone(),
            push_url_failure: request.push_url_failure.clone(),
            return_url_cancel: request.cancel_url.clone(),
            return_url_error: request.cancel_url.clone(),
            return_url_reject: request.reject_url.clone(),
            return_url,
            services,
        })
    }
}

#[derive(Clone, Debug, Default)]
pub struct RefundRequest {
    pub payment_method: Option<PaymentMethod>,
    pub amount: Option<StringMajorUnit>,
    pub currency: Option<String>,
    /// Invoice identifier of the payment being refunded
    pub transaction_id: Option<String>,
    /// Processor key of the original transaction
    pub original_transaction_key: Option<String>,
    pub push_url: Option<String>,
}

impl RefundRequest {
    fn get_amount(&self) -> CustomResult<&StringMajorUnit, GatewayError> {
        self.amount.as_ref().ok_or_else(|| {
            report!(GatewayError::MissingRequiredField {
                field_name: "amount",
            })
        })
    }

    fn get_transaction_id(&self) -> CustomResult<&String, GatewayError> {
        self.transaction_id.as_ref().ok_or_else(|| {
            report!(GatewayError::MissingRequiredField {
                field_name: "transaction_id",
            })
        })
    }

    fn get_original_transaction_key(&self) -> CustomResult<&String, GatewayError> {
        self.original_transaction_key.as_ref().ok_or_else(|| {
            report!(GatewayError::MissingRequiredField {
                field_name: "original_transaction_key",
            })
        })
    }

    fn get_payment_method(&self) -> CustomResult<PaymentMethod, GatewayError> {
        self.payment_method.ok_or_else(|| {
            report!(GatewayError::MissingRequiredField {
                field_name: "payment_method",
            })
        })
    }
}

/// Payload for `POST /Transaction` carrying a refund service.
#[derive(Clone, Debug, Serialize)]
pub struct RefundPayload {
    #[serde(rename = "AmountCredit")]
    pub amount_credit: StringMajorUnit,
    #[serde(rename = "Currency")]
    pub currency: Option<String>,
    #[serde(rename = "Invoice")]
    pub invoice: String,
    #[serde(rename = "OriginalTransactionKey")]
    pub original_transaction_key: String,
    #[serde(rename = "PushURL", skip_serializing_if = "Option::is_none")]
    pub push_url: Option<String>,
    #[serde(rename = "Services")]
    pub services: Services,
}

impl TryFrom<&RefundRequest> for RefundPayload {
    type Error = error_stack::Report<GatewayError>;

    fn try_from(request: &RefundRequest) -> Result<Self, Self::Error> {
        let amount_credit = request.get_amount()?.clone();
        let invoice = request.get_transaction_id()?.clone();
        let original_transaction_key = request.get_original_transaction_key()?.clone();
        let payment_method = request.get_payment_method()?;

        Ok(Self {
            amount_credit,
            currency: request.currency.clone(),
            invoice,
            original_transaction_key,
            push_url: request.push_url.clone(),
            services: services::refund_services(payment_method),
        })
    }
}

#[derive(Clone, Debug, Default)]
pub struct CancelReservationRequest {
    pub payment_method: Option<PaymentMethod>,
    /// Validated but never transmitted; cancellation always voids the full
    /// reservation
    pub amount: Option<StringMajorUnit>,
    pub currency: Option<String>,
    pub transaction_id: Option<String>,
    pub description: Option<String>,
    pub push_url: Option<String>,
    pub reservation_number: Option<String>,
}

impl CancelReservationRequest {
    fn get_amount(&self) -> CustomResult<&StringMajorUnit, GatewayError> {
        self.amount.as_ref().ok_or_else(|| {
            report!(GatewayError::MissingRequiredField {
                field_name: "amount",
            })
        })
    }

    fn get_transaction_id(&self) -> CustomResult<&String, GatewayError> {
        self.transaction_id.as_ref().ok_or_else(|| {
            report!(GatewayError::MissingRequiredField {
                field_name: "transaction_id",
            })
        })
    }

    fn get_payment_method(&self) -> CustomResult<PaymentMethod, GatewayError> {
        self.payment_method.ok_or_else(|| {
            report!(GatewayError::MissingRequiredField {
                field_name: "payment_method",
            })
        })
    }
}

/// Payload for `POST /DataRequest` cancelling a Klarna reservation.
#[derive(Clone, Debug, Serialize)]
pub struct CancelReservationPayload {
    #[serde(rename = "Currency")]
    pub currency: Option<String>,
    #[serde(rename = "Description", skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(rename = "Invoice")]
    pub invoice: String,
    #[serde(rename = "PushURL", skip_serializing_if = "Option::is_none")]
    pub push_url: Option<String>,
    #[serde(rename = "Services", skip_serializing_if = "Option::is_none")]
    pub services: Option<Services>,
}

impl TryFrom<&CancelReservationRequest> for CancelReservationPayload {
    type Error = error_stack::Report<GatewayError>;

    fn try_from(request: &CancelReservationRequest) -> Result<Self, Self::Error> {
        request.get_amount()?;
        let invoice = request.get_transaction_id()?.clone();
        let payment_method = request.get_payment_method()?;

        Ok(Self {
            currency: request.currency.clone(),
            description: request.description.clone(),
            invoice,
            push_url: request.push_url.clone(),
            services: services::cancel_reservation_services(
                payment_method,
                request.reservation_number.as_ref(),
            ),
        })
    }
}

#[derive(Clone, Debug, Default)]
pub struct StatusRequest {
    pub transaction_reference: Option<String>,
}

impl StatusRequest {
    pub(crate) fn get_transaction_reference(&self) -> CustomResult<&String, GatewayError> {
        self.transaction_reference.as_ref().ok_or_else(|| {
            report!(GatewayError::MissingRequiredField {
                field_name: "transaction_reference",
            })
        })
    }
}

/// Serializes a payload into the exact bytes that go on the wire.
///
/// Going through [`serde_json::Value`] first puts object keys in
/// lexicographic order, so repeated serialization of the same payload yields
/// identical bytes. The authorization token is computed over these bytes and
/// they are transmitted as-is, never re-serialized.
pub(crate) fn canonical_json_bytes<T: Serialize>(
    payload: &T,
) -> CustomResult<Vec<u8>, GatewayError> {
    let value =
        serde_json::to_value(payload).change_context(GatewayError::RequestEncodingFailed)?;
    serde_json::to_vec(&value).change_context(GatewayError::RequestEncodingFailed)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    fn ideal_request() -> PurchaseRequest {
        PurchaseRequest {
            payment_method: Some(PaymentMethod::Ideal),
            amount: Some(StringMajorUnit::new("10.00")),
            currency: Some("EUR".to_string()),
            return_url: Some("https://shop.example/return".to_string()),
            client_ip: Some("203.0.113.7".to_string()),
            transaction_id: Some("order-1001".to_string()),
            issuer: Some("ABNANL2A".to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn purchase_validates_fields_in_order() {
        let request = PurchaseRequest::default();
        let error = TransactionPayload::try_from(&request).unwrap_err();
        assert_eq!(
            error.current_context(),
            &GatewayError::MissingRequiredField {
                field_name: "payment_method",
            }
        );

        let request = PurchaseRequest {
            payment_method: Some(PaymentMethod::Ideal),
            ..Default::default()
        };
        let error = TransactionPayload::try_from(&request).unwrap_err();
        assert_eq!(
            error.current_context(),
            &GatewayError::MissingRequiredField {
                field_name: "amount",
            }
        );

        let request = PurchaseRequest {
            payment_method: Some(PaymentMethod::Ideal),
            amount: Some(StringMajorUnit::new("10.00")),
            return_url: Some("https://shop.example/return".to_string()),
            ..Default::default()
        };
        let error = TransactionPayload::try_from(&request).unwrap_err();
        assert_eq!(
            error.current_context(),
            &GatewayError::MissingRequiredField {
                field_name: "client_ip",
            }
        );
    }

    #[test]
    fn ideal_purchase_payload_shape() {
        let payload = TransactionPayload::try_from(&ideal_request()).unwrap();
        let value = serde_json::to_value(&payload).unwrap();

        assert_eq!(value["AmountDebit"], "10.00");
        assert_eq!(value["ClientIP"]["Type"], 0);
        assert_eq!(value["ClientIP"]["Address"], "203.0.113.7");
        assert_eq!(value["Invoice"], "order-1001");
        assert_eq!(value["Services"]["ServiceList"][0]["Name"], "ideal");
        assert_eq!(value["Services"]["ServiceList"][0]["Action"], "Pay");
        assert_eq!(
            value["Services"]["ServiceList"][0]["Parameters"][0]["Name"],
            "issuer"
        );
        assert_eq!(
            value["Services"]["ServiceList"][0]["Parameters"][0]["Value"],
            "ABNANL2A"
        );
        assert!(value.get("ContinueOnIncomplete").is_none());
    }

    #[test]
    fn ideal_without_issuer_continues_on_incomplete() {
        let mut request = ideal_request();
        request.issuer = None;
        let payload = TransactionPayload::try_from(&request).unwrap();
        let value = serde_json::to_value(&payload).unwrap();

        assert_eq!(value["ContinueOnIncomplete"], 1);
        assert!(value["Services"]["ServiceList"][0].get("Parameters").is_none());
    }

    #[test]
    fn creditcard_redirect_flow_offers_brand_selection() {
        let request = PurchaseRequest {
            payment_method: Some(PaymentMethod::CreditCard),
            amount: Some(StringMajorUnit::new("25.00")),
            return_url: Some("https://shop.example/return".to_string()),
            client_ip: Some("203.0.113.7".to_string()),
            ..Default::default()
        };
        let payload = TransactionPayload::try_from(&request).unwrap();
        let value = serde_json::to_value(&payload).unwrap();

        assert_eq!(value["ContinueOnIncomplete"], 1);
        assert_eq!(value["ServicesSelectableByClient"], "visa, mastercard");
        // the service entry is an empty object in this flow
        assert_eq!(value["Services"]["ServiceList"][0], serde_json::json!({}));
    }

    #[test]
    fn creditcard_extended_brands_for_site_seven() {
        let request = PurchaseRequest {
            payment_method: Some(PaymentMethod::CreditCard),
            amount: Some(StringMajorUnit::new("25.00")),
            return_url: Some("https://shop.example/return".to_string()),
            client_ip: Some("203.0.113.7".to_string()),
            site_id: Some(7),
            ..Default::default()
        };
        let payload = TransactionPayload::try_from(&request).unwrap();
        assert_eq!(
            payload.services_selectable_by_client.as_deref(),
            Some("visa, mastercard, maestro, cartebleuevisa, cartebancaire"),
        );
    }

    #[test]
    fn transfer_without_customer_details_is_incomplete() {
        let request = PurchaseRequest {
            payment_method: Some(PaymentMethod::Transfer),
            amount: Some(StringMajorUnit::new("15.00")),
            return_url: Some("https://shop.example/return".to_string()),
            client_ip: Some("203.0.113.7".to_string()),
            customer: Some(Customer {
                first_name: Some("J.".to_string()),
                ..Default::default()
            }),
            ..Default::default()
        };
        let error = TransactionPayload::try_from(&request).unwrap_err();
        assert_eq!(
            error.current_context(),
            &GatewayError::IncompleteBillingAddress
        );
    }

    #[test]
    fn refund_payload_names_original_transaction() {
        let request = RefundRequest {
            payment_method: Some(PaymentMethod::Ideal),
            amount: Some(StringMajorUnit::new("10.00")),
            currency: Some("EUR".to_string()),
            transaction_id: Some("order-1001".to_string()),
            original_transaction_key: Some("4E8BD922192746C3918BF4077CXXXXXX".to_string()),
            ..Default::default()
        };
        let payload = RefundPayload::try_from(&request).unwrap();
        let value = serde_json::to_value(&payload).unwrap();

        assert_eq!(value["AmountCredit"], "10.00");
        assert_eq!(
            value["OriginalTransactionKey"],
            "4E8BD922192746C3918BF4077CXXXXXX"
        );
        assert_eq!(value["Services"]["ServiceList"][0]["Action"], "Refund");
        assert!(value.get("AmountDebit").is_none());
    }

    #[test]
    fn cancel_reservation_validates_amount_but_never_sends_it() {
        let request = CancelReservationRequest {
            payment_method: Some(PaymentMethod::KlarnaKp),
            currency: Some("EUR".to_string()),
            transaction_id: Some("order-1001".to_string()),
            reservation_number: Some("1125986543".to_string()),
            ..Default::default()
        };
        let error = CancelReservationPayload::try_from(&request).unwrap_err();
        assert_eq!(
            error.current_context(),
            &GatewayError::MissingRequiredField {
                field_name: "amount",
            }
        );

        let request = CancelReservationRequest {
            amount: Some(StringMajorUnit::new("50.00")),
            ..request
        };
        let payload = CancelReservationPayload::try_from(&request).unwrap();
        let value = serde_json::to_value(&payload).unwrap();
        assert!(value.get("AmountCredit").is_none());
        assert!(value.get("AmountDebit").is_none());
        assert_eq!(
            value["Services"]["ServiceList"][0]["Action"],
            "CancelReservation"
        );
        assert_eq!(
            value["Services"]["ServiceList"][0]["Parameters"][0]["Value"],
            "1125986543"
        );
    }

    #[test]
    fn cancel_reservation_without_klarna_sends_no_services() {
        let request = CancelReservationRequest {
            payment_method: Some(PaymentMethod::Ideal),
            amount: Some(StringMajorUnit::new("50.00")),
            transaction_id: Some("order-1001".to_string()),
            ..Default::default()
        };
        let payload = CancelReservationPayload::try_from(&request).unwrap();
        let value = serde_json::to_value(&payload).unwrap();
        assert!(value.get("Services").is_none());
    }

    #[test]
    fn canonical_bytes_sort_keys_and_are_stable() {
        let payload = TransactionPayload::try_from(&ideal_request()).unwrap();
        let first = canonical_json_bytes(&payload).unwrap();
        let second = canonical_json_bytes(&payload).unwrap();
        assert_eq!(first, second);

        let text = String::from_utf8(first).unwrap();
        let amount_at = text.find("\"AmountDebit\"").unwrap();
        let client_ip_at = text.find("\"ClientIP\"").unwrap();
        let services_at = text.find("\"Services\"").unwrap();
        assert!(amount_at < client_ip_at);
        assert!(client_ip_at < services_at);
    }

    #[test]
    fn klarna_data_payload_reserves_with_customer_blocks() {
        let request = DataRequest {
            payment_method: Some(PaymentMethod::KlarnaKp),
            amount: Some(StringMajorUnit::new("120.00")),
            currency: Some("EUR".to_string()),
            return_url: Some("https://shop.example/return".to_string()),
            client_ip: Some("203.0.113.7".to_string()),
            transaction_id: Some("order-1001".to_string()),
            operating_country: "NL".to_string(),
            customer: Some(Customer {
                first_name: Some("Jan".to_string()),
                last_name: Some("Jansen".to_string()),
                gender: Some("1".to_string()),
                billing_address: Some(address()),
                shipping_address: Some(address()),
                ..Default::default()
            }),
            order_lines: vec![OrderLine {
                identifier: "SKU-1".to_string(),
                description: "Wireless headphones".to_string(),
                article_type: Some("PhysicalArticle".to_string()),
                quantity: "1".to_string(),
                unit_price: StringMajorUnit::new("120.00"),
                vat: Some("21".to_string()),
            }],
            ..Default::default()
        };
        let today = time::macros::date!(2024 - 03 - 01);
        let payload = DataPayload::try_from((&request, today)).unwrap();
        let value = serde_json::to_value(&payload).unwrap();

        let service = &value["Services"]["ServiceList"][0];
        assert_eq!(service["Name"], "klarnakp");
        assert_eq!(service["Action"], "Reserve");

        let parameters = service["Parameters"].as_array().unwrap();
        let find = |name: &str| {
            parameters
                .iter()
                .find(|parameter| parameter["Name"] == name)
                .unwrap()
        };
        assert_eq!(find("ShippingSameAsBilling")["Value"], "true");
        assert_eq!(find("OperatingCountry")["Value"], "NL");
        assert_eq!(find("ArticleNumber")["GroupId"], "0");
        assert!(parameters
            .iter()
            .all(|parameter| parameter["Name"] != "ReservationNumber"));
    }

    #[test]
    fn ideal_qr_data_payload_expires_in_three_weeks() {
        let request = DataRequest {
            payment_method: Some(PaymentMethod::IdealQr),
            amount: Some(StringMajorUnit::new("9.95")),
            return_url: Some("https://shop.example/return".to_string()),
            client_ip: Some("203.0.113.7".to_string()),
            transaction_id: Some("order-1001".to_string()),
            description: Some("Table order".to_string()),
            issuer: Some("idealqr".to_string()),
            operating_country: "NL".to_string(),
            ..Default::default()
        };
        let today = time::macros::date!(2024 - 03 - 01);
        let payload = DataPayload::try_from((&request, today)).unwrap();
        let value = serde_json::to_value(&payload).unwrap();

        let service = &value["Services"]["ServiceList"][0];
        assert_eq!(service["Name"], "idealqr");
        assert_eq!(service["Action"], "Generate");

        let parameters = service["Parameters"].as_array().unwrap();
        let find = |name: &str| {
            parameters
                .iter()
                .find(|parameter| parameter["Name"] == name)
                .unwrap()
        };
        assert_eq!(find("Expiration")["Value"], "2024-03-22");
        assert_eq!(find("ImageSize")["Value"], 2000);
        assert_eq!(find("IsOneOff")["Value"], "false");
        assert_eq!(find("PurchaseId")["Value"], "order-1001");
    }

    fn address() -> crate::types::Address {
        crate::types::Address {
            street: "Hoofdstraat".to_string(),
            house_number: "90".to_string(),
            house_number_extension: "A".to_string(),
            postal_code: "1234AB".to_string(),
            city: "Heerenveen".to_string(),
            country: "NL".to_string(),
            phone_number: "0612345678".to_string(),
            email: "shopper@example.com".to_string(),
        }
    }

    #[test]
    fn in3_article_parameters_mix_group_id_casings() {
        let request = PurchaseRequest {
            payment_method: Some(PaymentMethod::In3),
            amount: Some(StringMajorUnit::new("120.00")),
            return_url: Some("https://shop.example/return".to_string()),
            client_ip: Some("203.0.113.7".to_string()),
            transaction_id: Some("order-1001".to_string()),
            customer: Some(Customer {
                last_name: Some("Jansen".to_string()),
                customer_number: Some("C-77".to_string()),
                category: Some("B2C".to_string()),
                billing_address: Some(address()),
                shipping_address: Some(address()),
                ..Default::default()
            }),
            order_lines: vec![OrderLine {
                identifier: "SKU-1".to_string(),
                description: "Wireless headphones".to_string(),
                article_type: Some("PhysicalArticle".to_string()),
                quantity: "1".to_string(),
                unit_price: StringMajorUnit::new("120.00"),
                vat: Some("21".to_string()),
            }],
            ..Default::default()
        };
        let payload = TransactionPayload::try_from(&request).unwrap();
        let value = serde_json::to_value(&payload).unwrap();

        let parameters = value["Services"]["ServiceList"][0]["Parameters"]
            .as_array()
            .unwrap();

        // the first two article parameters spell the group key `GroupId`,
        // the rest spell it `GroupID`; each entry carries exactly one spelling
        assert_eq!(parameters[0]["Name"], "Identifier");
        assert_eq!(parameters[0]["GroupId"], "0");
        assert!(parameters[0].get("GroupID").is_none());
        assert_eq!(parameters[1]["Name"], "Type");
        assert_eq!(parameters[1]["GroupId"], "0");
        assert!(parameters[1].get("GroupID").is_none());
        assert_eq!(parameters[2]["Name"], "Description");
        assert_eq!(parameters[2]["GroupID"], "0");
        assert!(parameters[2].get("GroupId").is_none());

        for parameter in &parameters[2..] {
            assert_eq!(parameter["GroupID"], "0");
            assert!(parameter.get("GroupId").is_none());
        }

        let find = |name: &str, group: &str| {
            parameters
                .iter()
                .find(|parameter| {
                    parameter["Name"] == name && parameter["GroupType"] == group
                })
                .unwrap()
        };
        assert_eq!(find("CustomerNumber", "BillingCustomer")["Value"], "C-77");
        assert_eq!(find("Street", "ShippingCustomer")["Value"], "Hoofdstraat");
    }

    #[test]
    fn bancontact_encrypted_purchase_carries_empty_group_keys() {
        let request = PurchaseRequest {
            payment_method: Some(PaymentMethod::Bancontact),
            amount: Some(StringMajorUnit::new("25.00")),
            return_url: Some("https://shop.example/return".to_string()),
            client_ip: Some("203.0.113.7".to_string()),
            transaction_id: Some("order-1001".to_string()),
            encrypted_key: Some(Secret::new("AABBCC==".to_string())),
            ..Default::default()
        };
        let payload = TransactionPayload::try_from(&request).unwrap();
        let value = serde_json::to_value(&payload).unwrap();

        let service = &value["Services"]["ServiceList"][0];
        assert_eq!(service["Name"], "bancontactmrcash");
        assert_eq!(service["Action"], "PayEncrypted");
        assert_eq!(service["Version"], 0);

        let parameter = &service["Parameters"][0];
        assert_eq!(parameter["Name"], "EncryptedCardData");
        assert_eq!(parameter["Value"], "AABBCC==");
        assert_eq!(parameter["GroupType"], "");
        assert_eq!(parameter["GroupID"], "");
        assert!(parameter.get("GroupId").is_none());
    }

    #[test]
    fn pay_per_email_builds_a_payment_invitation() {
        let request = PurchaseRequest {
            payment_method: Some(PaymentMethod::PayPerEmail),
            amount: Some(StringMajorUnit::new("40.00")),
            return_url: Some("https://shop.example/return".to_string()),
            client_ip: Some("203.0.113.7".to_string()),
            transaction_id: Some("order-1001".to_string()),
            available_payment_methods: Some("ideal,creditcard".to_string()),
            customer: Some(Customer {
                first_name: Some("Jan".to_string()),
                last_name: Some("Jansen".to_string()),
                email: Some("shopper@example.com".to_string()),
                due_date: Some(time::macros::date!(2024 - 04 - 01)),
                ..Default::default()
            }),
            ..Default::default()
        };
        let payload = TransactionPayload::try_from(&request).unwrap();
        let value = serde_json::to_value(&payload).unwrap();

        let service = &value["Services"]["ServiceList"][0];
        assert_eq!(service["Name"], "payperemail");
        assert_eq!(service["Action"], "PaymentInvitation");

        let names: Vec<&str> = service["Parameters"]
            .as_array()
            .unwrap()
            .iter()
            .map(|parameter| parameter["Name"].as_str().unwrap())
            .collect();
        assert_eq!(
            names,
            [
                "customergender",
                "MerchantSendsEmail",
                "ExpirationDate",
                "PaymentMethodsAllowed",
                "Attachment",
                "CustomerEmail",
                "CustomerFirstName",
                "CustomerLastName",
            ]
        );

        let parameters = service["Parameters"].as_array().unwrap();
        // no gender on the customer falls back to "1"
        assert_eq!(parameters[0]["Value"], "1");
        assert_eq!(parameters[2]["Value"], "2024-04-01");
        assert_eq!(parameters[3]["Value"], "ideal,creditcard");
    }
}
