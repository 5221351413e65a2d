//! Domain types shared between request building and response handling.

use std::{net::IpAddr, str::FromStr};

use masking::Secret;
use serde::{Deserialize, Serialize};

/// Amount in major denomination units, kept as the exact decimal string the
/// processor expects (e.g. `"10.00"`).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StringMajorUnit(String);

impl StringMajorUnit {
    pub fn new(amount: impl Into<String>) -> Self {
        Self(amount.into())
    }

    /// Forms the amount into its wire representation
    pub fn get_amount_as_string(&self) -> String {
        self.0.clone()
    }
}

/// The payer's IP address in the shape the processor expects: a type
/// discriminant (0 = IPv4, 1 = IPv6) next to the textual address.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ClientIp {
    #[serde(rename = "Type")]
    pub kind: u8,
    #[serde(rename = "Address")]
    pub address: String,
}

impl ClientIp {
    /// An address that does not parse as IPv6 is reported as IPv4, matching
    /// how the processor interprets the discriminant.
    pub fn new(address: impl Into<String>) -> Self {
        let address = address.into();
        let is_ipv6 = matches!(IpAddr::from_str(&address), Ok(IpAddr::V6(_)));
        Self {
            kind: is_ipv6.into(),
            address,
        }
    }
}

/// The closed set of payment methods this integration supports.
///
/// The serialized form is the processor's service name. Adding support for a
/// new method means adding a variant here and a branch in the service table.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, strum::Display, strum::EnumString,
)]
pub enum PaymentMethod {
    #[serde(rename = "ideal")]
    #[strum(serialize = "ideal")]
    Ideal,
    #[serde(rename = "idealqr")]
    #[strum(serialize = "idealqr")]
    IdealQr,
    #[serde(rename = "creditcard")]
    #[strum(serialize = "creditcard")]
    CreditCard,
    #[serde(rename = "paypal")]
    #[strum(serialize = "paypal")]
    Paypal,
    #[serde(rename = "bancontactmrcash")]
    #[strum(serialize = "bancontactmrcash")]
    Bancontact,
    #[serde(rename = "transfer")]
    #[strum(serialize = "transfer")]
    Transfer,
    #[serde(rename = "klarnakp")]
    #[strum(serialize = "klarnakp")]
    KlarnaKp,
    #[serde(rename = "giropay")]
    #[strum(serialize = "giropay")]
    Giropay,
    #[serde(rename = "Sofortueberweisung")]
    #[strum(serialize = "Sofortueberweisung")]
    Sofort,
    #[serde(rename = "in3")]
    #[strum(serialize = "in3")]
    In3,
    #[serde(rename = "idealin3")]
    #[strum(serialize = "idealin3")]
    IdealIn3,
    #[serde(rename = "Tinka")]
    #[strum(serialize = "Tinka")]
    Tinka,
    #[serde(rename = "payperemail")]
    #[strum(serialize = "payperemail")]
    PayPerEmail,
}

impl PaymentMethod {
    /// The `Name` value carried in the service list.
    pub fn service_name(&self) -> String {
        self.to_string()
    }
}

/// Primary state of a transaction, derived from the processor status code.
/// Exactly one state holds for any code; codes outside the documented
/// taxonomy classify as failed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TransactionState {
    Successful,
    Pending,
    Cancelled,
    Failed,
}

/// Customer identity and address data required by the invoice-style payment
/// methods (bank transfer, Klarna, installment financing, pay-per-mail).
#[derive(Clone, Debug, Default)]
pub struct Customer {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    /// Processor-defined gender code, carried verbatim
    pub gender: Option<String>,
    pub email: Option<String>,
    pub country: Option<String>,
    /// Whether the processor should mail the payer, as the literal `"true"`
    /// or `"false"` the wire format expects
    pub send_mail: Option<String>,
    pub due_date: Option<time::Date>,
    pub date_of_birth: Option<time::Date>,
    /// Merchant-side customer number
    pub customer_number: Option<String>,
    /// Customer category (consumer or business)
    pub category: Option<String>,
    pub billing_address: Option<Address>,
    pub shipping_address: Option<Address>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Address {
    pub street: String,
    pub house_number: String,
    pub house_number_extension: String,
    pub postal_code: String,
    pub city: String,
    pub country: String,
    pub phone_number: String,
    pub email: String,
}

/// A single order line; contributes one `Article` parameter group per line to
/// the installment and reservation flows.
#[derive(Clone, Debug)]
pub struct OrderLine {
    /// Article number or unit code
    pub identifier: String,
    /// Human readable title, truncated to the processor limit when emitted
    pub description: String,
    pub article_type: Option<String>,
    pub quantity: String,
    pub unit_price: StringMajorUnit,
    pub vat: Option<String>,
}

/// Internal representation of the gateway credentials.
#[derive(Clone, Debug)]
pub struct BuckarooAuthType {
    pub website_key: Secret<String>,
    pub secret_key: Secret<String>,
}

impl BuckarooAuthType {
    pub fn new(website_key: impl Into<String>, secret_key: impl Into<String>) -> Self {
        Self {
            website_key: Secret::new(website_key.into()),
            secret_key: Secret::new(secret_key.into()),
        }
    }
}
