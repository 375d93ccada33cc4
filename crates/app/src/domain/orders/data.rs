//! Orders Data

use jiff::Timestamp;

use crate::{
    auth::UserUuid,
    domain::{
        orders::{
            pricing::OrderPricing,
            records::{
                OrderItemRecord, OrderRecord, OrderUuid, PaymentMethod, PaymentResult,
                ShippingAddress,
            },
            status::OrderStatus,
        },
        products::records::ProductUuid,
    },
};

/// A priced order ready to be committed.
#[derive(Debug, Clone, PartialEq)]
pub struct NewOrder {
    pub uuid: OrderUuid,
    pub owner: UserUuid,
    pub items: Vec<OrderItemRecord>,
    pub shipping_address: ShippingAddress,
    pub payment_method: PaymentMethod,
    pub notes: Option<String>,
    pub pricing: OrderPricing,
}

/// Stock to take from one product when an order is committed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StockReservation {
    pub product_uuid: ProductUuid,
    pub quantity: u32,
}

impl NewOrder {
    /// Quantities per product, ordered by product UUID.
    #[must_use]
    pub fn reservations(&self) -> Vec<StockReservation> {
        let mut reservations: Vec<StockReservation> = Vec::with_capacity(self.items.len());

        for item in &self.items {
            match reservations
                .iter_mut()
                .find(|reservation| reservation.product_uuid == item.product_uuid)
            {
                Some(reservation) => {
                    reservation.quantity = reservation.quantity.saturating_add(item.quantity);
                }
                None => reservations.push(StockReservation {
                    product_uuid: item.product_uuid,
                    quantity: item.quantity,
                }),
            }
        }

        reservations.sort_unstable_by_key(|reservation| reservation.product_uuid);

        reservations
    }

    /// Title of the first line for `product`, used in stock errors.
    #[must_use]
    pub fn title_of(&self, product: ProductUuid) -> String {
        self.items
            .iter()
            .find(|item| item.product_uuid == product)
            .map_or_else(|| product.to_string(), |item| item.title.clone())
    }

    #[must_use]
    pub fn into_record(self, now: Timestamp) -> OrderRecord {
        OrderRecord {
            uuid: self.uuid,
            owner: self.owner,
            items: self.items,
            shipping_address: self.shipping_address,
            payment_method: self.payment_method,
            notes: self.notes,
            items_price: self.pricing.items_price,
            tax_price: self.pricing.tax_price,
            shipping_price: self.pricing.shipping_price,
            total_price: self.pricing.total_price,
            status: OrderStatus::Pending,
            is_paid: false,
            paid_at: None,
            payment_result: None,
            is_delivered: false,
            delivered_at: None,
            tracking_number: None,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Payment details supplied when marking an order paid.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PaymentUpdate {
    pub id: Option<String>,
    pub status: Option<String>,
    pub email_address: Option<String>,
}

impl PaymentUpdate {
    #[must_use]
    pub fn has_email(&self) -> bool {
        self.email_address
            .as_deref()
            .is_some_and(|email| !email.trim().is_empty())
    }

    /// Fill in `manual`/`completed` for missing or blank fields.
    #[must_use]
    pub fn into_result(self, now: Timestamp) -> PaymentResult {
        let non_blank = |value: Option<String>| {
            value
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        PaymentResult {
            id: non_blank(self.id).unwrap_or_else(|| "manual".to_string()),
            status: non_blank(self.status).unwrap_or_else(|| "completed".to_string()),
            update_time: now,
            email_address: non_blank(self.email_address),
        }
    }
}

/// Administrative status change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusUpdate {
    pub status: String,
    pub tracking_number: Option<String>,
}
