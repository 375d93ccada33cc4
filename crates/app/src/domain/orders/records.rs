//! Order Records

use std::{fmt, str::FromStr};

use jiff::Timestamp;

use crate::{
    auth::UserUuid,
    domain::{
        orders::{errors::OrdersServiceError, status::OrderStatus},
        products::records::ProductUuid,
    },
    uuids::TypedUuid,
};

/// Order UUID
pub type OrderUuid = TypedUuid<OrderRecord>;

/// Accepted ways to pay for an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PaymentMethod {
    CreditCard,
    Paypal,
    Stripe,
    CashOnDelivery,
}

impl PaymentMethod {
    pub const ALL: [Self; 4] = [
        Self::CreditCard,
        Self::Paypal,
        Self::Stripe,
        Self::CashOnDelivery,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::CreditCard => "credit_card",
            Self::Paypal => "paypal",
            Self::Stripe => "stripe",
            Self::CashOnDelivery => "cash_on_delivery",
        }
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PaymentMethod {
    type Err = OrdersServiceError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|method| method.as_str() == value)
            .ok_or_else(|| OrdersServiceError::invalid("Invalid payment method"))
    }
}

/// Where an order ships to. Every field is non-empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShippingAddress {
    pub first_name: String,
    pub last_name: String,
    pub street: String,
    pub city: String,
    pub state: String,
    pub zip_code: String,
    pub country: String,
    pub phone: String,
}

/// Order Item Record
///
/// `price` is the discounted unit price at checkout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderItemRecord {
    pub product_uuid: ProductUuid,
    pub title: String,
    pub price: u64,
    pub quantity: u32,
    pub image: String,
}

impl OrderItemRecord {
    #[must_use]
    pub fn line_total(&self) -> Option<u64> {
        self.price.checked_mul(u64::from(self.quantity))
    }
}

/// Payment confirmation recorded when an order is marked paid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentResult {
    pub id: String,
    pub status: String,
    pub update_time: Timestamp,
    pub email_address: Option<String>,
}

/// Order Record
#[derive(Debug, Clone, PartialEq)]
pub struct OrderRecord {
    pub uuid: OrderUuid,
    pub owner: UserUuid,
    pub items: Vec<OrderItemRecord>,
    pub shipping_address: ShippingAddress,
    pub payment_method: PaymentMethod,
    pub notes: Option<String>,
    pub items_price: u64,
    pub tax_price: u64,
    pub shipping_price: u64,
    pub total_price: u64,
    pub status: OrderStatus,
    pub is_paid: bool,
    pub paid_at: Option<Timestamp>,
    pub payment_result: Option<PaymentResult>,
    pub is_delivered: bool,
    pub delivered_at: Option<Timestamp>,
    pub tracking_number: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl OrderRecord {
    /// Record payment. An already paid order keeps its first payment.
    pub(crate) fn mark_paid(
        &mut self,
        payment: PaymentResult,
        now: Timestamp,
    ) -> Result<(), OrdersServiceError> {
        if self.status == OrderStatus::Cancelled {
            return Err(OrdersServiceError::PaymentOnCancelled);
        }

        if self.is_paid {
            return Ok(());
        }

        self.is_paid = true;
        self.paid_at = Some(now);
        self.payment_result = Some(payment);
        self.updated_at = now;

        Ok(())
    }

    /// Move to `status`, optionally recording a tracking number.
    pub(crate) fn apply_status(
        &mut self,
        status: OrderStatus,
        tracking_number: Option<String>,
        now: Timestamp,
    ) -> Result<(), OrdersServiceError> {
        if !self.status.can_transition_to(status) {
            return Err(OrdersServiceError::InvalidTransition {
                from: self.status,
                to: status,
            });
        }

        if status == OrderStatus::Delivered && !self.is_delivered {
            self.is_delivered = true;
            self.delivered_at = Some(now);
        }

        if let Some(tracking_number) = tracking_number {
            self.tracking_number = Some(tracking_number);
        }

        self.status = status;
        self.updated_at = now;

        Ok(())
    }
}
