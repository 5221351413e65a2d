//! Construction of the `Services.ServiceList` block, one branch per payment
//! method.
//!
//! Each branch is a pure function from the caller's parameters to the nested
//! service document. The `GroupId` / `GroupID` key casing differs between
//! methods and even between parameters of one method; the processor-side
//! schema is not uniform here, so the exact per-parameter casing is kept.

use error_stack::{report, ResultExt};
use serde::Serialize;

use crate::{
    consts,
    errors::{CustomResult, GatewayError},
    requests::{DataRequest, PurchaseRequest},
    types::{Address, Customer, PaymentMethod},
};

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Services {
    #[serde(rename = "ServiceList")]
    pub service_list: Vec<Service>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct Service {
    #[serde(rename = "Name", skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(rename = "Action", skip_serializing_if = "Option::is_none")]
    pub action: Option<ServiceAction>,
    #[serde(rename = "Version", skip_serializing_if = "Option::is_none")]
    pub version: Option<u32>,
    #[serde(rename = "Parameters", skip_serializing_if = "Option::is_none")]
    pub parameters: Option<Vec<ServiceParameter>>,
}

impl Service {
    fn new(name: String, action: ServiceAction) -> Self {
        Self {
            name: Some(name),
            action: Some(action),
            version: None,
            parameters: None,
        }
    }

    fn with_parameters(mut self, parameters: Vec<ServiceParameter>) -> Self {
        self.parameters = Some(parameters);
        self
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum ServiceAction {
    Pay,
    PayWithToken,
    PayEncrypted,
    PaymentInvitation,
    Generate,
    Refund,
    Reserve,
    UpdateReservation,
    CancelReservation,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ServiceParameter {
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "GroupType", skip_serializing_if = "Option::is_none")]
    pub group_type: Option<String>,
    #[serde(rename = "GroupId", skip_serializing_if = "Option::is_none")]
    pub group_id: Option<String>,
    /// Same concept as `group_id`, but some methods spell the wire key with a
    /// capital D
    #[serde(rename = "GroupID", skip_serializing_if = "Option::is_none")]
    pub group_id_upper: Option<String>,
    #[serde(rename = "Value")]
    pub value: serde_json::Value,
}

impl ServiceParameter {
    fn new(name: &str, value: impl Into<serde_json::Value>) -> Self {
        Self {
            name: name.to_string(),
            group_type: None,
            group_id: None,
            group_id_upper: None,
            value: value.into(),
        }
    }

    fn with_group_type(mut self, group_type: &str) -> Self {
        self.group_type = Some(group_type.to_string());
        self
    }

    /// Attach a `GroupType` and a `GroupId` key
    fn with_group(mut self, group_type: &str, group_id: &str) -> Self {
        self.group_type = Some(group_type.to_string());
        self.group_id = Some(group_id.to_string());
        self
    }

    /// Attach a `GroupType` and a `GroupID` key
    fn with_group_upper(mut self, group_type: &str, group_id: &str) -> Self {
        self.group_type = Some(group_type.to_string());
        self.group_id_upper = Some(group_id.to_string());
        self
    }
}

/// A service block plus the top-level flags some branches switch on.
#[derive(Clone, Debug, PartialEq)]
pub struct ServicePlan {
    pub services: Services,
    pub continue_on_incomplete: Option<u8>,
    pub services_selectable_by_client: Option<String>,
}

impl ServicePlan {
    fn plain(service: Service) -> Self {
        Self {
            services: Services {
                service_list: vec![service],
            },
            continue_on_incomplete: None,
            services_selectable_by_client: None,
        }
    }
}

const GROUP_ARTICLE: &str = "Article";
const GROUP_BILLING_CUSTOMER: &str = "BillingCustomer";
const GROUP_SHIPPING_CUSTOMER: &str = "ShippingCustomer";

const YMD_FORMAT: &[time::format_description::FormatItem<'static>] =
    time::macros::format_description!("[year]-[month]-[day]");
const DMY_FORMAT: &[time::format_description::FormatItem<'static>] =
    time::macros::format_description!("[day][month][year]");

fn format_ymd(date: time::Date) -> CustomResult<String, GatewayError> {
    date.format(&YMD_FORMAT)
        .change_context(GatewayError::DateFormattingFailed)
}

fn format_dmy(date: time::Date) -> CustomResult<String, GatewayError> {
    date.format(&DMY_FORMAT)
        .change_context(GatewayError::DateFormattingFailed)
}

fn truncate(value: &str, max_len: usize) -> String {
    value.chars().take(max_len).collect()
}

fn incomplete(field: Option<&String>) -> CustomResult<String, GatewayError> {
    field
        .cloned()
        .ok_or_else(|| report!(GatewayError::IncompleteBillingAddress))
}

fn billing_address(customer: &Customer) -> CustomResult<&Address, GatewayError> {
    customer
        .billing_address
        .as_ref()
        .ok_or_else(|| report!(GatewayError::IncompleteBillingAddress))
}

fn shipping_address(customer: &Customer) -> CustomResult<&Address, GatewayError> {
    customer
        .shipping_address
        .as_ref()
        .ok_or_else(|| report!(GatewayError::IncompleteBillingAddress))
}

/// Service construction for the purchase call.
pub(crate) fn purchase_services(
    request: &PurchaseRequest,
    method: PaymentMethod,
) -> CustomResult<ServicePlan, GatewayError> {
    match method {
        PaymentMethod::Ideal => Ok(ideal(request, method)),
        PaymentMethod::CreditCard => Ok(creditcard(request, method)),
        PaymentMethod::Giropay => Ok(ServicePlan::plain(
            Service::new(method.service_name(), ServiceAction::Pay)
                .with_parameters(Vec::new()),
        )),
        PaymentMethod::Paypal | PaymentMethod::Sofort => Ok(ServicePlan::plain(Service::new(
            method.service_name(),
            ServiceAction::Pay,
        ))),
        PaymentMethod::Bancontact => Ok(bancontact(request, method)),
        PaymentMethod::Transfer => transfer(request, method),
        PaymentMethod::Tinka => tinka(request, method),
        PaymentMethod::KlarnaKp => Ok(klarna_pay(request, method)),
        PaymentMethod::In3 | PaymentMethod::IdealIn3 => in3(request, method),
        PaymentMethod::PayPerEmail => pay_per_email(request, method),
        PaymentMethod::IdealQr => Err(report!(GatewayError::NotSupported {
            message: "idealqr is generated through the data call".to_string(),
        })),
    }
}

fn ideal(request: &PurchaseRequest, method: PaymentMethod) -> ServicePlan {
    match request.issuer.as_ref() {
        Some(issuer) => ServicePlan::plain(
            Service::new(method.service_name(), ServiceAction::Pay)
                .with_parameters(vec![ServiceParameter::new("issuer", issuer.clone())]),
        ),
        // without an issuer the processor asks the payer to pick a bank
        None => ServicePlan {
            services: Services {
                service_list: vec![Service::new(method.service_name(), ServiceAction::Pay)],
            },
            continue_on_incomplete: Some(1),
            services_selectable_by_client: None,
        },
    }
}

fn creditcard(request: &PurchaseRequest, _method: PaymentMethod) -> ServicePlan {
    use masking::PeekInterface;

    match (request.issuer.as_ref(), request.session_id.as_ref()) {
        (Some(brand), Some(session_id)) => ServicePlan::plain(
            Service::new(brand.clone(), ServiceAction::PayWithToken).with_parameters(vec![
                ServiceParameter::new("SessionId", session_id.peek().clone()),
            ]),
        ),
        _ => {
            let selectable = if request.site_id == Some(consts::EXTENDED_CARD_BRANDS_SITE_ID) {
                "visa, mastercard, maestro, cartebleuevisa, cartebancaire"
            } else {
                "visa, mastercard"
            };
            ServicePlan {
                services: Services {
                    service_list: vec![Service::default()],
                },
                continue_on_incomplete: Some(1),
                services_selectable_by_client: Some(selectable.to_string()),
            }
        }
    }
}

fn bancontact(request: &PurchaseRequest, method: PaymentMethod) -> ServicePlan {
    use masking::PeekInterface;

    match request.encrypted_key.as_ref() {
        Some(encrypted_key) => {
            let mut parameter =
                ServiceParameter::new("EncryptedCardData", encrypted_key.peek().clone());
            // the processor expects these keys present but empty here
            parameter.group_type = Some(String::new());
            parameter.group_id_upper = Some(String::new());
            let mut service = Service::new(method.service_name(), ServiceAction::PayEncrypted)
                .with_parameters(vec![parameter]);
            service.version = Some(0);
            ServicePlan::plain(service)
        }
        None => ServicePlan::plain(Service::new(method.service_name(), ServiceAction::Pay)),
    }
}

fn transfer(
    request: &PurchaseRequest,
    method: PaymentMethod,
) -> CustomResult<ServicePlan, GatewayError> {
    // transfer treats any missing customer detail as an address problem
    let customer = request
        .customer
        .as_ref()
        .ok_or_else(|| report!(GatewayError::IncompleteBillingAddress))?;
    let due_date = customer
        .due_date
        .ok_or_else(|| report!(GatewayError::IncompleteBillingAddress))?;

    let parameters = vec![
        ServiceParameter::new("CustomerFirstName", incomplete(customer.first_name.as_ref())?),
        ServiceParameter::new("CustomerLastName", incomplete(customer.last_name.as_ref())?),
        ServiceParameter::new("CustomerGender", incomplete(customer.gender.as_ref())?),
        ServiceParameter::new("CustomerCountry", incomplete(customer.country.as_ref())?),
        ServiceParameter::new("SendMail", incomplete(customer.send_mail.as_ref())?),
        ServiceParameter::new("CustomerEmail", incomplete(customer.email.as_ref())?),
        ServiceParameter::new("DateDue", format_ymd(due_date)?),
    ];

    Ok(ServicePlan::plain(
        Service::new(method.service_name(), ServiceAction::Pay).with_parameters(parameters),
    ))
}

fn klarna_pay(request: &PurchaseRequest, method: PaymentMethod) -> ServicePlan {
    ServicePlan::plain(
        Service::new(method.service_name(), ServiceAction::Pay).with_parameters(vec![
            ServiceParameter::new(
                "ReservationNumber",
                request.reservation_number.clone().unwrap_or_default(),
            ),
        ]),
    )
}

fn tinka(
    request: &PurchaseRequest,
    method: PaymentMethod,
) -> CustomResult<ServicePlan, GatewayError> {
    let customer = request.get_customer()?;
    let billing = billing_address(customer)?;
    let shipping = shipping_address(customer)?;
    let email = incomplete(customer.email.as_ref())?;

    let mut parameters = vec![
        ServiceParameter::new("PaymentMethod", "Credit"),
        ServiceParameter::new(
            "DeliveryMethod",
            request.delivery_method.clone().unwrap_or_default(),
        ),
        ServiceParameter::new("LastName", incomplete(customer.last_name.as_ref())?),
        ServiceParameter::new("Gender", incomplete(customer.gender.as_ref())?),
    ];
    parameters.extend(tinka_address_block(GROUP_BILLING_CUSTOMER, &email, billing));
    parameters.extend(tinka_address_block(GROUP_SHIPPING_CUSTOMER, &email, shipping));

    for (id, line) in request.order_lines.iter().enumerate() {
        let group_id = id.to_string();
        parameters.extend([
            ServiceParameter::new("UnitCode", line.identifier.clone())
                .with_group(GROUP_ARTICLE, &group_id),
            ServiceParameter::new("UnitGrossPrice", line.unit_price.get_amount_as_string())
                .with_group(GROUP_ARTICLE, &group_id),
            ServiceParameter::new("Quantity", line.quantity.clone())
                .with_group(GROUP_ARTICLE, &group_id),
            ServiceParameter::new(
                "Description",
                truncate(&line.description, consts::DESCRIPTION_MAX_LEN),
            )
            .with_group(GROUP_ARTICLE, &group_id),
        ]);
    }

    Ok(ServicePlan::plain(
        Service::new(method.service_name(), ServiceAction::Pay).with_parameters(parameters),
    ))
}

fn tinka_address_block(group: &str, email: &str, address: &Address) -> Vec<ServiceParameter> {
    vec![
        ServiceParameter::new("Email", email.to_string()).with_group_type(group),
        ServiceParameter::new("Street", address.street.clone()).with_group_type(group),
        ServiceParameter::new("StreetNumber", address.house_number.clone())
            .with_group_type(group),
        ServiceParameter::new(
            "StreetNumberAdditional",
            address.house_number_extension.clone(),
        )
        .with_group_type(group),
        ServiceParameter::new("PostalCode", address.postal_code.clone()).with_group_type(group),
        ServiceParameter::new("City", address.city.clone()).with_group_type(group),
    ]
}

fn in3(
    request: &PurchaseRequest,
    method: PaymentMethod,
) -> CustomResult<ServicePlan, GatewayError> {
    let customer = request.get_customer()?;
    let billing = billing_address(customer)?;
    let shipping = shipping_address(customer)?;
    let last_name = incomplete(customer.last_name.as_ref())?;
    let customer_number = incomplete(customer.customer_number.as_ref())?;
    let category = incomplete(customer.category.as_ref())?;

    let mut parameters = Vec::new();
    for (id, line) in request.order_lines.iter().enumerate() {
        let group_id = id.to_string();
        parameters.extend([
            ServiceParameter::new("Identifier", line.identifier.clone())
                .with_group(GROUP_ARTICLE, &group_id),
            ServiceParameter::new("Type", line.article_type.clone().unwrap_or_default())
                .with_group(GROUP_ARTICLE, &group_id),
            ServiceParameter::new(
                "Description",
                truncate(&line.description, consts::DESCRIPTION_MAX_LEN),
            )
            .with_group_upper(GROUP_ARTICLE, &group_id),
            ServiceParameter::new("Quantity", line.quantity.clone())
                .with_group_upper(GROUP_ARTICLE, &group_id),
            ServiceParameter::new("GrossUnitPrice", line.unit_price.get_amount_as_string())
                .with_group_upper(GROUP_ARTICLE, &group_id),
            ServiceParameter::new("CustomerNumber", customer_number.clone())
                .with_group_upper(GROUP_BILLING_CUSTOMER, &group_id),
            ServiceParameter::new("LastName", last_name.clone())
                .with_group_upper(GROUP_BILLING_CUSTOMER, &group_id),
            ServiceParameter::new("Phone", billing.phone_number.clone())
                .with_group_upper(GROUP_BILLING_CUSTOMER, &group_id),
            ServiceParameter::new("Email", billing.email.clone())
                .with_group_upper(GROUP_BILLING_CUSTOMER, &group_id),
            ServiceParameter::new("Category", category.clone())
                .with_group_upper(GROUP_BILLING_CUSTOMER, &group_id),
            ServiceParameter::new("Street", billing.street.clone())
                .with_group_upper(GROUP_BILLING_CUSTOMER, &group_id),
            ServiceParameter::new("StreetNumber", billing.house_number.clone())
                .with_group_upper(GROUP_BILLING_CUSTOMER, &group_id),
            ServiceParameter::new("StreetNumberSuffix", billing.house_number_extension.clone())
                .with_group_upper(GROUP_BILLING_CUSTOMER, &group_id),
            ServiceParameter::new("PostalCode", billing.postal_code.clone())
                .with_group_upper(GROUP_BILLING_CUSTOMER, &group_id),
            ServiceParameter::new("City", billing.city.clone())
                .with_group_upper(GROUP_BILLING_CUSTOMER, &group_id),
            ServiceParameter::new("CountryCode", billing.country.clone())
                .with_group_upper(GROUP_BILLING_CUSTOMER, &group_id),
            ServiceParameter::new("Street", shipping.street.clone())
                .with_group_upper(GROUP_SHIPPING_CUSTOMER, &group_id),
            ServiceParameter::new("StreetNumber", shipping.house_number.clone())
                .with_group_upper(GROUP_SHIPPING_CUSTOMER, &group_id),
            ServiceParameter::new(
                "StreetNumberSuffix",
                shipping.house_number_extension.clone(),
            )
            .with_group_upper(GROUP_SHIPPING_CUSTOMER, &group_id),
            ServiceParameter::new("City", shipping.city.clone())
                .with_group_upper(GROUP_SHIPPING_CUSTOMER, &group_id),
            ServiceParameter::new("PostalCode", shipping.postal_code.clone())
                .with_group_upper(GROUP_SHIPPING_CUSTOMER, &group_id),
            ServiceParameter::new("CountryCode", shipping.country.clone())
                .with_group_upper(GROUP_SHIPPING_CUSTOMER, &group_id),
        ]);
    }

    Ok(ServicePlan::plain(
        Service::new(method.service_name(), ServiceAction::Pay).with_parameters(parameters),
    ))
}

fn pay_per_email(
    request: &PurchaseRequest,
    method: PaymentMethod,
) -> CustomResult<ServicePlan, GatewayError> {
    let customer = request.get_customer()?;
    let due_date = customer
        .due_date
        .ok_or_else(|| report!(GatewayError::IncompleteBillingAddress))?;

    let parameters = vec![
        ServiceParameter::new(
            "customergender",
            customer.gender.clone().unwrap_or_else(|| "1".to_string()),
        ),
        ServiceParameter::new("MerchantSendsEmail", "false"),
        ServiceParameter::new("ExpirationDate", format_ymd(due_date)?),
        ServiceParameter::new(
            "PaymentMethodsAllowed",
            request.available_payment_methods.clone().unwrap_or_default(),
        ),
        ServiceParameter::new("Attachment", ""),
        ServiceParameter::new("CustomerEmail", incomplete(customer.email.as_ref())?),
        ServiceParameter::new("CustomerFirstName", incomplete(customer.first_name.as_ref())?),
        ServiceParameter::new("CustomerLastName", incomplete(customer.last_name.as_ref())?),
    ];

    Ok(ServicePlan::plain(
        Service::new(method.service_name(), ServiceAction::PaymentInvitation)
            .with_parameters(parameters),
    ))
}

/// Service construction for the data call. Only the QR generation and the
/// Klarna reservation flows carry a service block here; other methods send
/// the transactional fields alone.
pub(crate) fn data_services(
    request: &DataRequest,
    today: time::Date,
) -> CustomResult<Option<Services>, GatewayError> {
    if request.issuer.as_deref() == Some("idealqr") {
        return ideal_qr(request, today).map(Some);
    }
    if request.payment_method == Some(PaymentMethod::KlarnaKp) {
        return klarna_reservation(request).map(Some);
    }
    Ok(None)
}

fn ideal_qr(request: &DataRequest, today: time::Date) -> CustomResult<Services, GatewayError> {
    let amount = request.get_amount()?;
    let expiration = today
        .checked_add(time::Duration::days(consts::QR_EXPIRY_DAYS))
        .ok_or_else(|| report!(GatewayError::DateFormattingFailed))?;

    let parameters = vec![
        ServiceParameter::new("Description", request.description.clone().unwrap_or_default()),
        ServiceParameter::new("PurchaseId", request.transaction_id.clone().unwrap_or_default()),
        ServiceParameter::new("IsOneOff", "false"),
        ServiceParameter::new("Amount", amount.get_amount_as_string()),
        ServiceParameter::new("ImageSize", consts::QR_IMAGE_SIZE),
        ServiceParameter::new("AmountIsChangeable", "false"),
        ServiceParameter::new("Expiration", format_ymd(expiration)?),
    ];

    Ok(Services {
        service_list: vec![
            Service::new("idealqr".to_string(), ServiceAction::Generate)
                .with_parameters(parameters),
        ],
    })
}

fn klarna_reservation(request: &DataRequest) -> CustomResult<Services, GatewayError> {
    let customer = request.get_customer()?;
    let billing = billing_address(customer)?;
    let shipping = shipping_address(customer)?;
    let first_name = incomplete(customer.first_name.as_ref())?;
    let last_name = incomplete(customer.last_name.as_ref())?;
    let shipping_same_as_billing = billing == shipping;

    let action = if request.update_reservation {
        ServiceAction::UpdateReservation
    } else {
        ServiceAction::Reserve
    };

    let mut parameters = vec![
        ServiceParameter::new("BillingFirstName", first_name.clone()),
        ServiceParameter::new("BillingLastName", last_name.clone()),
        ServiceParameter::new("BillingStreet", billing.street.clone()),
        ServiceParameter::new("BillingHouseNumber", billing.house_number.clone()),
        ServiceParameter::new(
            "BillingHouseNumberSuffix",
            billing.house_number_extension.clone(),
        ),
        ServiceParameter::new("BillingPostalCode", billing.postal_code.clone()),
        ServiceParameter::new("BillingCity", billing.city.clone()),
        ServiceParameter::new("BillingCountry", billing.country.clone()),
        ServiceParameter::new("BillingCellPhoneNumber", billing.phone_number.clone()),
        ServiceParameter::new("BillingEmail", billing.email.clone()),
        ServiceParameter::new("ShippingFirstName", first_name),
        ServiceParameter::new("ShippingLastName", last_name),
        ServiceParameter::new("ShippingStreet", shipping.street.clone()),
        ServiceParameter::new("ShippingHouseNumber", shipping.house_number.clone()),
        ServiceParameter::new(
            "ShippingHouseNumberSuffix",
            shipping.house_number_extension.clone(),
        ),
        ServiceParameter::new("ShippingPostalCode", shipping.postal_code.clone()),
        ServiceParameter::new("ShippingCity", shipping.city.clone()),
        ServiceParameter::new("ShippingCountry", shipping.country.clone()),
        ServiceParameter::new("ShippingPhoneNumber", shipping.phone_number.clone()),
        ServiceParameter::new("ShippingEmail", shipping.email.clone()),
        ServiceParameter::new("Gender", incomplete(customer.gender.as_ref())?),
        ServiceParameter::new("OperatingCountry", request.operating_country.clone()),
        ServiceParameter::new(
            "Pno",
            match customer.date_of_birth {
                Some(date_of_birth) => format_dmy(date_of_birth)?,
                None => String::new(),
            },
        ),
        ServiceParameter::new(
            "ShippingSameAsBilling",
            if shipping_same_as_billing { "true" } else { "false" },
        ),
    ];

    if request.update_reservation {
        parameters.push(ServiceParameter::new(
            "ReservationNumber",
            request.reservation_number.clone().unwrap_or_default(),
        ));
    }

    for (id, line) in request.order_lines.iter().enumerate() {
        let group_id = id.to_string();
        parameters.extend([
            ServiceParameter::new("ArticleNumber", line.identifier.clone())
                .with_group(GROUP_ARTICLE, &group_id),
            ServiceParameter::new("ArticlePrice", line.unit_price.get_amount_as_string())
                .with_group(GROUP_ARTICLE, &group_id),
            ServiceParameter::new("ArticleQuantity", line.quantity.clone())
                .with_group(GROUP_ARTICLE, &group_id),
            ServiceParameter::new(
                "ArticleTitle",
                truncate(&line.description, consts::DESCRIPTION_MAX_LEN),
            )
            .with_group(GROUP_ARTICLE, &group_id),
            ServiceParameter::new("ArticleVat", line.vat.clone().unwrap_or_default())
                .with_group(GROUP_ARTICLE, &group_id),
            ServiceParameter::new("ArticleType", line.article_type.clone().unwrap_or_default())
                .with_group(GROUP_ARTICLE, &group_id),
        ]);
    }

    Ok(Services {
        service_list: vec![
            Service::new(PaymentMethod::KlarnaKp.service_name(), action)
                .with_parameters(parameters),
        ],
    })
}

/// The refund call names the original payment method with a `Refund` action
/// and no parameters.
pub(crate) fn refund_services(method: PaymentMethod) -> Services {
    Services {
        service_list: vec![Service::new(method.service_name(), ServiceAction::Refund)],
    }
}

/// Reservation cancellation only exists for the Klarna flow; other methods
/// emit no service block.
pub(crate) fn cancel_reservation_services(
    method: PaymentMethod,
    reservation_number: Option<&String>,
) -> Option<Services> {
    if method != PaymentMethod::KlarnaKp {
        return None;
    }

    Some(Services {
        service_list: vec![
            Service::new(method.service_name(), ServiceAction::CancelReservation)
                .with_parameters(vec![ServiceParameter::new(
                    "ReservationNumber",
                    reservation_number.cloned().unwrap_or_default(),
                )]),
        ],
    })
}
