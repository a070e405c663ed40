//! Checkout form input and its validation.
//!
//! Forms hold raw text as typed by the user. Validation turns them into typed
//! values ([`ShippingInfo`], [`PaymentSelection`]) or a [`ValidationError`]
//! whose `Display` is the message shown to the user.

use std::fmt;

use mangaverse_core::{
    CardDetails, CardExpiry, Cvv, MpesaPhone, PaymentFieldError, PaymentMethod,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Checkout validation failures.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Please fill in all required shipping fields (Name, Address, City, Country, Phone).")]
    MissingShippingFields { missing: Vec<&'static str> },

    #[error("Please select a payment method.")]
    NoPaymentMethod,

    #[error("Please fill in all credit card details.")]
    IncompleteCard,

    #[error("Please enter your M-Pesa phone number.")]
    MissingMpesaPhone,

    #[error(transparent)]
    Field(#[from] PaymentFieldError),
}

/// Shipping form as typed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ShippingForm {
    pub full_name: String,
    pub address_line1: String,
    pub address_line2: String,
    pub city: String,
    pub state: String,
    pub postal_code: String,
    pub country: String,
    pub phone: String,
}

/// A validated shipping address, sent as the order's `shippingAddress`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShippingInfo {
    pub full_name: String,
    pub address_line1: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address_line2: Option<String>,
    pub city: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub postal_code: Option<String>,
    pub country: String,
    pub phone: String,
}

/// Validate the shipping step.
///
/// Fields are trimmed. Name, first address line, city, country and phone are
/// required; blank optional fields become `None`.
///
/// # Errors
///
/// Returns [`ValidationError::MissingShippingFields`] listing every blank
/// required field.
pub fn validate_shipping(form: &ShippingForm) -> Result<ShippingInfo, ValidationError> {
    let required = [
        ("fullName", &form.full_name),
        ("addressLine1", &form.address_line1),
        ("city", &form.city),
        ("country", &form.country),
        ("phone", &form.phone),
    ];
    let missing: Vec<&'static str> = required
        .iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(name, _)| *name)
        .collect();
    if !missing.is_empty() {
        return Err(ValidationError::MissingShippingFields { missing });
    }

    Ok(ShippingInfo {
        full_name: form.full_name.trim().to_owned(),
        address_line1: form.address_line1.trim().to_owned(),
        address_line2: optional(&form.address_line2),
        city: form.city.trim().to_owned(),
        state: optional(&form.state),
        postal_code: optional(&form.postal_code),
        country: form.country.trim().to_owned(),
        phone: form.phone.trim().to_owned(),
    })
}

fn optional(value: &str) -> Option<String> {
    let value = value.trim();
    (!value.is_empty()).then(|| value.to_owned())
}

/// Payment form as typed. Only the fields of the chosen method are read.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct PaymentForm {
    pub method: Option<PaymentMethod>,
    pub card_number: String,
    pub expiry_date: String,
    pub cvv: String,
    pub mpesa_phone: String,
}

impl fmt::Debug for PaymentForm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PaymentForm")
            .field("method", &self.method)
            .field("card_number", &"[REDACTED]")
            .field("expiry_date", &self.expiry_date)
            .field("cvv", &"[REDACTED]")
            .field("mpesa_phone", &self.mpesa_phone)
            .finish()
    }
}

/// A validated payment choice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PaymentSelection {
    CreditCard(CardDetails),
    PayPal,
    Mpesa(MpesaPhone),
    CashOnDelivery,
}

impl PaymentSelection {
    #[must_use]
    pub const fn method(&self) -> PaymentMethod {
        match self {
            Self::CreditCard(_) => PaymentMethod::CreditCard,
            Self::PayPal => PaymentMethod::PayPal,
            Self::Mpesa(_) => PaymentMethod::Mpesa,
            Self::CashOnDelivery => PaymentMethod::CashOnDelivery,
        }
    }

    /// Card fields to send with the order, for card payments only.
    #[must_use]
    pub fn card_details(&self) -> Option<&CardDetails> {
        match self {
            Self::CreditCard(card) => Some(card),
            _ => None,
        }
    }
}

/// Validate the payment step.
///
/// Card fields are checked in order (presence, expiry, CVV) and the first
/// failure is reported.
///
/// # Errors
///
/// Returns the first [`ValidationError`] for the chosen method.
pub fn validate_payment(form: &PaymentForm) -> Result<PaymentSelection, ValidationError> {
    match form.method {
        None => Err(ValidationError::NoPaymentMethod),
        Some(PaymentMethod::CreditCard) => {
            let card_number = form.card_number.trim();
            let expiry = form.expiry_date.trim();
            let cvv = form.cvv.trim();
            if card_number.is_empty() || expiry.is_empty() || cvv.is_empty() {
                return Err(ValidationError::IncompleteCard);
            }
            Ok(PaymentSelection::CreditCard(CardDetails {
                card_number: card_number.to_owned(),
                expiry: CardExpiry::parse(expiry)?,
                cvv: Cvv::parse(cvv)?,
            }))
        }
        Some(PaymentMethod::Mpesa) => {
            let phone = form.mpesa_phone.trim();
            if phone.is_empty() {
                return Err(ValidationError::MissingMpesaPhone);
            }
            Ok(PaymentSelection::Mpesa(MpesaPhone::parse(phone)?))
        }
        Some(PaymentMethod::PayPal) => Ok(PaymentSelection::PayPal),
        Some(PaymentMethod::CashOnDelivery) => Ok(PaymentSelection::CashOnDelivery),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn shipping() -> ShippingForm {
        ShippingForm {
            full_name: "Tanjiro Kamado".into(),
            address_line1: "12 Mountain Path".into(),
            city: "Okutama".into(),
            country: "Japan".into(),
            phone: "+81 80 1234 5678".into(),
            ..ShippingForm::default()
        }
    }

    fn card(expiry: &str, cvv: &str) -> PaymentForm {
        PaymentForm {
            method: Some(PaymentMethod::CreditCard),
            card_number: "4242424242424242".into(),
            expiry_date: expiry.into(),
            cvv: cvv.into(),
            ..PaymentForm::default()
        }
    }

    fn mpesa(phone: &str) -> PaymentForm {
        PaymentForm {
            method: Some(PaymentMethod::Mpesa),
            mpesa_phone: phone.into(),
            ..PaymentForm::default()
        }
    }

    #[test]
    fn shipping_requires_core_fields() {
        let info = validate_shipping(&shipping()).unwrap();
        assert_eq!(info.full_name, "Tanjiro Kamado");
        assert_eq!(info.address_line2, None);

        let mut form = shipping();
        form.city = "   ".into();
        form.phone.clear();
        let err = validate_shipping(&form).unwrap_err();
        assert_eq!(
            err,
            ValidationError::MissingShippingFields {
                missing: vec!["city", "phone"]
            }
        );
        assert_eq!(
            err.to_string(),
            "Please fill in all required shipping fields (Name, Address, City, Country, Phone)."
        );
    }

    #[test]
    fn shipping_serializes_in_api_shape() {
        let mut form = shipping();
        form.postal_code = "198-0000".into();
        let json = serde_json::to_value(validate_shipping(&form).unwrap()).unwrap();
        assert_eq!(json["addressLine1"], "12 Mountain Path");
        assert_eq!(json["postalCode"], "198-0000");
        assert!(json.get("state").is_none());
    }

    #[test]
    fn no_method_selected() {
        assert_eq!(
            validate_payment(&PaymentForm::default()),
            Err(ValidationError::NoPaymentMethod)
        );
    }

    #[test]
    fn card_rules_in_order() {
        assert_eq!(
            validate_payment(&card("", "123")),
            Err(ValidationError::IncompleteCard)
        );
        assert_eq!(
            validate_payment(&card("13/25", "123")),
            Err(PaymentFieldError::InvalidExpiry.into())
        );
        assert_eq!(
            validate_payment(&card("09/26", "12")),
            Err(PaymentFieldError::InvalidCvv.into())
        );

        let selection = validate_payment(&card("09/26", "123")).unwrap();
        assert_eq!(selection.method(), PaymentMethod::CreditCard);
        assert_eq!(selection.card_details().unwrap().last_four(), "4242");
    }

    #[test]
    fn mpesa_rules() {
        assert_eq!(
            validate_payment(&mpesa("")),
            Err(ValidationError::MissingMpesaPhone)
        );
        assert_eq!(
            validate_payment(&mpesa("254712345")),
            Err(PaymentFieldError::InvalidMpesaPhone.into())
        );
        assert!(matches!(
            validate_payment(&mpesa("254712345678")),
            Ok(PaymentSelection::Mpesa(_))
        ));
    }

    #[test]
    fn paypal_and_cod_need_no_fields() {
        for (method, expected) in [
            (PaymentMethod::PayPal, PaymentSelection::PayPal),
            (PaymentMethod::CashOnDelivery, PaymentSelection::CashOnDelivery),
        ] {
            let form = PaymentForm {
                method: Some(method),
                ..PaymentForm::default()
            };
            assert_eq!(validate_payment(&form).unwrap(), expected);
        }
    }

    #[test]
    fn debug_hides_card_fields() {
        let debug = format!("{:?}", card("09/26", "123"));
        assert!(!debug.contains("4242"));
        assert!(!debug.contains("123"));
    }
}
