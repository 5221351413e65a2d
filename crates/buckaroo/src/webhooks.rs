//! Push notification decoding.
//!
//! The processor posts notifications as flat form-urlencoded bodies whose
//! keys carry a `brq_` prefix. Field presence varies per payment method;
//! everything beyond the status code is optional.

use error_stack::ResultExt;
use serde::Deserialize;

use crate::{
    errors::{CustomResult, GatewayError},
    responses::status_codes,
};

/// Detail codes announcing that completion will be confirmed later.
const COMPLETION_DELAYED_DETAIL_CODES: [&str; 2] = ["P917", "P918"];

const KLARNA_PRIMARY_SERVICE: &str = "KlarnaKp";
/// Transaction type of a Klarna pay notification
const KLARNA_PAY_TRANSACTION_TYPE: &str = "V610";

#[derive(Clone, Copy, Debug, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "snake_case")]
pub enum NotificationStatus {
    Completed,
    Pending,
    Failed,
}

#[derive(Clone, Debug, Deserialize)]
pub struct PushNotification {
    #[serde(rename = "brq_transactions", default)]
    pub transactions: Option<String>,
    #[serde(rename = "brq_statuscode")]
    pub status_code: String,
    #[serde(rename = "brq_statuscode_detail", default)]
    pub status_code_detail: Option<String>,
    #[serde(rename = "brq_statusmessage", default)]
    pub status_message: Option<String>,
    #[serde(rename = "brq_amount", default)]
    pub amount: Option<String>,
    #[serde(rename = "brq_invoicenumber", default)]
    pub invoice_number: Option<String>,
    #[serde(rename = "brq_transaction_method", default)]
    pub transaction_method: Option<String>,
    #[serde(rename = "brq_transaction_type", default)]
    pub transaction_type: Option<String>,
    #[serde(rename = "brq_primary_service", default)]
    pub primary_service: Option<String>,
    #[serde(rename = "brq_SERVICE_klarnakp_ReservationNumber", default)]
    pub klarna_reservation_number: Option<String>,
    #[serde(rename = "brq_datarequest", default)]
    pub data_request: Option<String>,
}

impl PushNotification {
    pub fn parse(body: &[u8]) -> CustomResult<Self, GatewayError> {
        serde_urlencoded::from_bytes(body)
            .change_context(GatewayError::NotificationBodyDecodingFailed)
    }

    /// Three-way status: only a settled 190 completes and only a processing
    /// 791 stays pending; every other code is reported as failed.
    pub fn transaction_status(&self) -> NotificationStatus {
        if self.status_code == status_codes::SUCCESS {
            NotificationStatus::Completed
        } else if self.status_code == status_codes::PENDING_PROCESSING {
            NotificationStatus::Pending
        } else {
            NotificationStatus::Failed
        }
    }

    pub fn is_rejected(&self) -> bool {
        self.status_code == status_codes::FAILED_DENIED
    }

    pub fn is_cancelled(&self) -> bool {
        self.status_code == status_codes::FAILED_TRANSACTION
    }

    /// The processor confirms the final state of these notifications through
    /// a later push.
    pub fn is_completion_delayed(&self) -> bool {
        self.status_code_detail
            .as_deref()
            .is_some_and(|detail| COMPLETION_DELAYED_DETAIL_CODES.contains(&detail))
    }

    pub fn transaction_reference(&self) -> &str {
        self.transactions.as_deref().unwrap_or("")
    }

    pub fn is_klarna(&self) -> bool {
        self.primary_service.as_deref() == Some(KLARNA_PRIMARY_SERVICE)
    }

    /// Whether this notification reports a Klarna pay call rather than a
    /// reservation update.
    pub fn is_klarna_pay(&self) -> bool {
        self.transaction_type.as_deref() == Some(KLARNA_PAY_TRANSACTION_TYPE)
    }

    pub fn klarna_reservation_number(&self) -> Option<&str> {
        self.klarna_reservation_number.as_deref()
    }

    /// Reference of the data request that created a Klarna reservation.
    pub fn klarna_transaction_reference(&self) -> Option<&str> {
        self.data_request.as_deref()
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    #[test]
    fn decodes_a_settled_ideal_push() {
        let body = b"brq_amount=10.00&brq_currency=EUR&brq_invoicenumber=order-1001\
            &brq_payment=ABCDEF&brq_statuscode=190&brq_statusmessage=Transaction+successfully+processed\
            &brq_timestamp=2024-03-01+12%3A00%3A00&brq_transaction_method=ideal\
            &brq_transaction_type=C021&brq_transactions=4E8BD922192746C3918BF4077CXXXXXX";

        let notification = PushNotification::parse(body).unwrap();
        assert_eq!(notification.transaction_status(), NotificationStatus::Completed);
        assert_eq!(
            notification.transaction_reference(),
            "4E8BD922192746C3918BF4077CXXXXXX",
        );
        assert_eq!(notification.amount.as_deref(), Some("10.00"));
        assert_eq!(notification.invoice_number.as_deref(), Some("order-1001"));
        assert_eq!(
            notification.status_message.as_deref(),
            Some("Transaction successfully processed"),
        );
        assert!(!notification.is_rejected());
        assert!(!notification.is_cancelled());
    }

    #[test]
    fn only_791_is_pending() {
        for (code, status) in [
            ("190", NotificationStatus::Completed),
            ("791", NotificationStatus::Pending),
            ("790", NotificationStatus::Failed),
            ("890", NotificationStatus::Failed),
            ("690", NotificationStatus::Failed),
        ] {
            let body = format!("brq_statuscode={code}");
            let notification = PushNotification::parse(body.as_bytes()).unwrap();
            assert_eq!(notification.transaction_status(), status, "code {code}");
        }
    }

    #[test]
    fn rejection_and_cancellation_flags() {
        let rejected = PushNotification::parse(b"brq_statuscode=690").unwrap();
        assert!(rejected.is_rejected());
        assert!(!rejected.is_cancelled());

        let cancelled = PushNotification::parse(b"brq_statuscode=490").unwrap();
        assert!(cancelled.is_cancelled());
        assert!(!cancelled.is_rejected());
    }

    #[test]
    fn delayed_completion_detail_codes() {
        let delayed =
            PushNotification::parse(b"brq_statuscode=791&brq_statuscode_detail=P917").unwrap();
        assert!(delayed.is_completion_delayed());

        let ordinary =
            PushNotification::parse(b"brq_statuscode=791&brq_statuscode_detail=P190").unwrap();
        assert!(!ordinary.is_completion_delayed());
    }

    #[test]
    fn klarna_reservation_push() {
        let body = b"brq_statuscode=190&brq_primary_service=KlarnaKp\
            &brq_SERVICE_klarnakp_ReservationNumber=1125986543\
            &brq_datarequest=DATA4E8BD922192746C3918BF4077C&brq_transaction_type=I038";

        let notification = PushNotification::parse(body).unwrap();
        assert!(notification.is_klarna());
        assert!(!notification.is_klarna_pay());
        assert_eq!(notification.klarna_reservation_number(), Some("1125986543"));
        assert_eq!(
            notification.klarna_transaction_reference(),
            Some("DATA4E8BD922192746C3918BF4077C"),
        );
    }

    #[test]
    fn klarna_pay_transaction_type() {
        let notification =
            PushNotification::parse(b"brq_statuscode=190&brq_transaction_type=V610").unwrap();
        assert!(notification.is_klarna_pay());
    }

    #[test]
    fn missing_status_code_is_an_error() {
        let error = PushNotification::parse(b"brq_amount=10.00").unwrap_err();
        assert_eq!(
            error.current_context(),
            &GatewayError::NotificationBodyDecodingFailed,
        );
    }
}
