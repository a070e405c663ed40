//! Request and response bodies of the external API.
//!
//! Field names follow the API's JSON (camelCase, `_id` for identifiers).

use chrono::{DateTime, Utc};
use mangaverse_core::{
    CardDetails, MpesaPhone, OrderId, OrderStatus, PaymentMethod, Price, ProductId, UserId,
    UserRole,
};
use serde::{Deserialize, Serialize};

use crate::checkout::ShippingInfo;

// =============================================================================
// Catalog
// =============================================================================

/// A catalog product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    #[serde(rename = "_id")]
    pub id: ProductId,
    pub title: String,
    pub author: String,
    pub price: Price,
    #[serde(default)]
    pub cover_image: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub isbn: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub sub_category: Option<String>,
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default)]
    pub publisher: Option<String>,
    #[serde(default)]
    pub publication_date: Option<String>,
    #[serde(default)]
    pub pages: Option<u32>,
    #[serde(default)]
    pub stock: Option<u32>,
    #[serde(default)]
    pub average_rating: Option<f64>,
    #[serde(default)]
    pub number_of_reviews: Option<u32>,
}

impl Product {
    /// Products without a stock figure are treated as available.
    #[must_use]
    pub fn in_stock(&self) -> bool {
        self.stock.is_none_or(|stock| stock > 0)
    }
}

// =============================================================================
// Orders
// =============================================================================

/// One line of an order request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderLine {
    pub product_id: ProductId,
    pub name: String,
    pub quantity: u32,
    pub price: Price,
}

/// Payment confirmation returned by the PayPal widget after capture.
///
/// Serialized with the widget's own snake_case field names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaypalCapture {
    pub id: String,
    pub status: String,
    pub update_time: String,
    #[serde(default)]
    pub email_address: Option<String>,
}

/// `POST /orders` body.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderRequest {
    pub order_items: Vec<OrderLine>,
    pub shipping_address: ShippingInfo,
    pub payment_method: PaymentMethod,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_details: Option<CardDetails>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_result: Option<PaypalCapture>,
    pub total_amount: Price,
}

/// Identifier block of a freshly created order.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CreatedOrder {
    #[serde(rename = "_id")]
    pub id: OrderId,
}

/// `POST /orders` response.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateOrderResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub order: Option<CreatedOrder>,
    #[serde(default)]
    pub message: Option<String>,
}

/// A past order as listed by `GET /orders/myorders`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderSummary {
    #[serde(rename = "_id")]
    pub id: OrderId,
    pub created_at: DateTime<Utc>,
    pub total_amount: Price,
    /// `None` when the server reports a method this client does not know.
    #[serde(default, deserialize_with = "known_payment_method")]
    pub payment_method: Option<PaymentMethod>,
    #[serde(default)]
    pub status: OrderStatus,
    #[serde(default)]
    pub order_items: Vec<OrderSummaryLine>,
}

fn known_payment_method<'de, D>(deserializer: D) -> Result<Option<PaymentMethod>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let raw = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(raw.and_then(|value| serde_json::from_value(value).ok()))
}

/// A line of a past order.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct OrderSummaryLine {
    pub name: String,
    pub quantity: u32,
    pub price: Price,
}

// =============================================================================
// Users
// =============================================================================

#[derive(Debug, Serialize)]
pub(crate) struct LoginRequest<'a> {
    pub email: &'a str,
    pub password: &'a str,
}

/// `POST /users/login` response.
#[derive(Debug, Clone, Deserialize)]
pub struct LoginResponse {
    pub token: String,
    #[serde(alias = "_id")]
    pub id: UserId,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub role: UserRole,
}

#[derive(Debug, Serialize)]
pub(crate) struct RegisterRequest<'a> {
    pub name: &'a str,
    pub email: &'a str,
    pub password: &'a str,
}

/// `POST /users/register` response. The user id is only carried inside the token.
#[derive(Debug, Clone, Deserialize)]
pub struct RegisterResponse {
    pub token: String,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub role: UserRole,
}

#[derive(Debug, Serialize)]
pub(crate) struct ForgotPasswordRequest<'a> {
    pub email: &'a str,
}

#[derive(Debug, Serialize)]
pub(crate) struct ResetPasswordRequest<'a> {
    pub password: &'a str,
}

/// Bodies that only carry a human readable message.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MessageResponse {
    #[serde(default)]
    pub message: Option<String>,
}

// =============================================================================
// Payments
// =============================================================================

/// `POST /mpesa/stk-push` body.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StkPushRequest {
    pub phone_number: MpesaPhone,
    pub amount: Price,
    pub order_id: OrderId,
    pub description: String,
}

/// `POST /mpesa/stk-push` response.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StkPushResponse {
    #[serde(default)]
    pub response: Option<StkPushResult>,
}

/// The provider's verdict on a push request.
#[derive(Debug, Clone, Deserialize)]
pub struct StkPushResult {
    #[serde(rename = "ResponseCode")]
    pub response_code: String,
    #[serde(rename = "CustomerMessage", default)]
    pub customer_message: Option<String>,
}

impl StkPushResponse {
    /// `ResponseCode == "0"`: the prompt reached the phone. Payment itself is
    /// confirmed later, out of band.
    #[must_use]
    pub fn accepted(&self) -> bool {
        self.response
            .as_ref()
            .is_some_and(|r| r.response_code == "0")
    }

    #[must_use]
    pub fn customer_message(&self) -> Option<&str> {
        self.response
            .as_ref()
            .and_then(|r| r.customer_message.as_deref())
    }
}

// =============================================================================
// Email
// =============================================================================

/// `POST /send-welcome-email` body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WelcomeEmailRequest {
    pub recipient_email: String,
    pub recipient_name: String,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn product_parses_catalog_record() {
        let json = r#"{
            "_id": "665f1c2e9b1e8a0012345678",
            "title": "One Piece, Vol. 1",
            "author": "Eiichiro Oda",
            "price": 9.99,
            "coverImage": "https://img.example.com/op1.jpg",
            "category": "Manga",
            "subCategory": "Shonen",
            "pages": 216,
            "stock": 0,
            "averageRating": 4.8,
            "numberOfReviews": 120
        }"#;
        let product: Product = serde_json::from_str(json).unwrap();
        assert_eq!(product.id.as_str(), "665f1c2e9b1e8a0012345678");
        assert_eq!(product.price, Price::from_cents(999).unwrap());
        assert_eq!(product.sub_category.as_deref(), Some("Shonen"));
        assert!(!product.in_stock());
    }

    #[test]
    fn order_summary_parses() {
        let json = r#"{
            "_id": "o1",
            "createdAt": "2025-03-01T10:15:00.000Z",
            "totalAmount": 25,
            "paymentMethod": "mpesa",
            "status": "processing",
            "orderItems": [{"name": "Akira", "quantity": 1, "price": 25}]
        }"#;
        let order: OrderSummary = serde_json::from_str(json).unwrap();
        assert_eq!(order.payment_method, Some(PaymentMethod::Mpesa));
        assert_eq!(order.status, OrderStatus::Processing);
        assert_eq!(order.order_items.len(), 1);
    }

    #[test]
    fn order_history_survives_unknown_payment_method() {
        let json = r#"[
            {"_id": "o1", "createdAt": "2025-03-01T10:15:00Z", "totalAmount": 10, "paymentMethod": "giftCard"},
            {"_id": "o2", "createdAt": "2025-03-02T10:15:00Z", "totalAmount": 12, "paymentMethod": "cod"}
        ]"#;
        let orders: Vec<OrderSummary> = serde_json::from_str(json).unwrap();
        assert_eq!(orders[0].payment_method, None);
        assert_eq!(orders[1].payment_method, Some(PaymentMethod::CashOnDelivery));
    }

    #[test]
    fn stk_push_acceptance() {
        let ok: StkPushResponse = serde_json::from_str(
            r#"{"response":{"ResponseCode":"0","CustomerMessage":"Success. Request accepted"}}"#,
        )
        .unwrap();
        assert!(ok.accepted());

        let rejected: StkPushResponse = serde_json::from_str(
            r#"{"response":{"ResponseCode":"1","CustomerMessage":"Insufficient balance"}}"#,
        )
        .unwrap();
        assert!(!rejected.accepted());
        assert_eq!(rejected.customer_message(), Some("Insufficient balance"));

        let empty: StkPushResponse = serde_json::from_str("{}").unwrap();
        assert!(!empty.accepted());
    }
}
