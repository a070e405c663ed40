//! Status and role enums shared with the external API.
//!
//! The API is the source of truth for these values. Unknown strings are kept
//! as `Other` rather than failing deserialization, so a new status on the
//! server never breaks order history.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Order lifecycle status as reported by the order service.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    #[default]
    Pending,
    Processing,
    Shipped,
    Delivered,
    Cancelled,
    #[serde(other)]
    Other,
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Pending => "Pending",
            Self::Processing => "Processing",
            Self::Shipped => "Shipped",
            Self::Delivered => "Delivered",
            Self::Cancelled => "Cancelled",
            Self::Other => "Unknown",
        };
        f.write_str(label)
    }
}

/// Role attached to a storefront user account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    #[default]
    User,
    Admin,
    #[serde(other)]
    Other,
}

/// Payment method identifier as it appears on orders.
///
/// This is the wire-level tag only; the checkout flow's `PaymentSelection`
/// carries the method-specific fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PaymentMethod {
    #[serde(rename = "creditCard")]
    CreditCard,
    #[serde(rename = "paypal")]
    PayPal,
    #[serde(rename = "mpesa")]
    Mpesa,
    #[serde(rename = "cod")]
    CashOnDelivery,
}

impl PaymentMethod {
    /// Every method, in the order the payment step lists them.
    pub const ALL: [Self; 4] = [
        Self::CreditCard,
        Self::PayPal,
        Self::Mpesa,
        Self::CashOnDelivery,
    ];

    /// The identifier used by the order service.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::CreditCard => "creditCard",
            Self::PayPal => "paypal",
            Self::Mpesa => "mpesa",
            Self::CashOnDelivery => "cod",
        }
    }

    /// Human readable label.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::CreditCard => "Credit Card",
            Self::PayPal => "PayPal",
            Self::Mpesa => "M-Pesa",
            Self::CashOnDelivery => "Cash on Delivery",
        }
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl std::str::FromStr for PaymentMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|method| method.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| {
                format!("unknown payment method '{s}' (expected creditCard, paypal, mpesa or cod)")
            })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn unknown_statuses_are_preserved_as_other() {
        let status: OrderStatus = serde_json::from_str("\"awaiting-courier\"").unwrap();
        assert_eq!(status, OrderStatus::Other);
        let shipped: OrderStatus = serde_json::from_str("\"shipped\"").unwrap();
        assert_eq!(shipped, OrderStatus::Shipped);
    }

    #[test]
    fn roles_deserialize() {
        let admin: UserRole = serde_json::from_str("\"admin\"").unwrap();
        assert_eq!(admin, UserRole::Admin);
        let odd: UserRole = serde_json::from_str("\"editor\"").unwrap();
        assert_eq!(odd, UserRole::Other);
    }

    #[test]
    fn payment_method_wire_names() {
        for method in PaymentMethod::ALL {
            let json = serde_json::to_string(&method).unwrap();
            assert_eq!(json, format!("\"{}\"", method.as_str()));
            assert_eq!(method.as_str().parse::<PaymentMethod>().unwrap(), method);
        }
        assert!("bitcoin".parse::<PaymentMethod>().is_err());
        assert_eq!("COD".parse::<PaymentMethod>().unwrap(), PaymentMethod::CashOnDelivery);
    }
}
