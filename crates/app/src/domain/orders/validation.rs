//! Checkout input validation

use crate::domain::{
    orders::{
        errors::OrdersServiceError,
        records::{PaymentMethod, ShippingAddress},
    },
    products::records::ProductUuid,
};

/// A requested order line as submitted by a client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProposedOrderItem {
    pub product: String,
    pub quantity: i64,
}

/// A shipping address as submitted by a client.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProposedShippingAddress {
    pub first_name: String,
    pub last_name: String,
    pub street: String,
    pub city: String,
    pub state: String,
    pub zip_code: String,
    pub country: String,
    pub phone: String,
}

/// An order as submitted by a client, before any checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProposedOrder {
    pub items: Vec<ProposedOrderItem>,
    pub shipping_address: ProposedShippingAddress,
    pub payment_method: String,
    pub notes: Option<String>,
}

/// A line that passed input validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestedItem {
    pub product_uuid: ProductUuid,
    pub quantity: u32,
}

/// An order whose input is well formed. Catalog checks come later.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedOrder {
    pub items: Vec<RequestedItem>,
    pub shipping_address: ShippingAddress,
    pub payment_method: PaymentMethod,
    pub notes: Option<String>,
}

impl ProposedOrder {
    /// Check items, then the address, then the payment method.
    ///
    /// # Errors
    ///
    /// Returns [`OrdersServiceError::Invalid`] describing the first problem.
    pub fn validate(self) -> Result<ValidatedOrder, OrdersServiceError> {
        let items = validate_items(&self.items)?;
        let shipping_address = self.shipping_address.validate()?;
        let payment_method = self.payment_method.trim().parse()?;

        let notes = self
            .notes
            .map(|notes| notes.trim().to_string())
            .filter(|notes| !notes.is_empty());

        Ok(ValidatedOrder {
            items,
            shipping_address,
            payment_method,
            notes,
        })
    }
}

fn validate_items(items: &[ProposedOrderItem]) -> Result<Vec<RequestedItem>, OrdersServiceError> {
    if items.is_empty() {
        return Err(OrdersServiceError::invalid(
            "Order must contain at least one item",
        ));
    }

    items
        .iter()
        .map(|item| {
            if item.quantity < 1 {
                return Err(OrdersServiceError::invalid("Quantity must be at least 1"));
            }

            let quantity = u32::try_from(item.quantity)
                .map_err(|_| OrdersServiceError::invalid("Quantity is too large"))?;

            let product_uuid = item
                .product
                .parse()
                .map_err(|_| OrdersServiceError::invalid("Invalid product ID"))?;

            Ok(RequestedItem {
                product_uuid,
                quantity,
            })
        })
        .collect()
}

fn required(value: String, message: &str) -> Result<String, OrdersServiceError> {
    let trimmed = value.trim();

    if trimmed.is_empty() {
        return Err(OrdersServiceError::invalid(message));
    }

    Ok(trimmed.to_string())
}

impl ProposedShippingAddress {
    fn validate(self) -> Result<ShippingAddress, OrdersServiceError> {
        Ok(ShippingAddress {
            first_name: required(self.first_name, "First name is required")?,
            last_name: required(self.last_name, "Last name is required")?,
            street: required(self.street, "Street address is required")?,
            city: required(self.city, "City is required")?,
            state: required(self.state, "State is required")?,
            zip_code: required(self.zip_code, "Zip code is required")?,
            country: required(self.country, "Country is required")?,
            phone: required(self.phone, "Phone number is required")?,
        })
    }
}
