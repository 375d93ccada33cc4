//! Test Helpers

use jiff::Timestamp;

use crate::{
    auth::UserUuid,
    domain::{
        orders::{
            data::NewOrder,
            pricing::PricingPolicy,
            records::{OrderItemRecord, OrderRecord, OrderUuid, PaymentMethod, ShippingAddress},
            validation::{ProposedOrder, ProposedOrderItem, ProposedShippingAddress},
        },
        products::{
            data::NewProduct,
            records::{Category, ProductRecord, ProductUuid},
        },
    },
};

/// An active, undiscounted electronics product.
pub(crate) fn product_record(title: &str, price: u64, stock: u32) -> ProductRecord {
    new_product(title, price, stock).into_record(Timestamp::now())
}

pub(crate) fn new_product(title: &str, price: u64, stock: u32) -> NewProduct {
    NewProduct {
        uuid: ProductUuid::new(),
        title: title.to_string(),
        description: format!("{title} description"),
        price,
        category: Category::Electronics,
        image: format!("https://img.example.com/{}.png", title.to_lowercase()),
        stock,
        discount: 0,
        is_active: true,
        featured: false,
    }
}

pub(crate) fn shipping_address() -> ProposedShippingAddress {
    ProposedShippingAddress {
        first_name: "Ada".to_string(),
        last_name: "Lovelace".to_string(),
        street: "12 Analytical Row".to_string(),
        city: "London".to_string(),
        state: "Greater London".to_string(),
        zip_code: "N1 9GU".to_string(),
        country: "GB".to_string(),
        phone: "+44 20 7946 0000".to_string(),
    }
}

pub(crate) fn proposed_order(lines: &[(ProductUuid, i64)]) -> ProposedOrder {
    ProposedOrder {
        items: lines
            .iter()
            .map(|(product, quantity)| ProposedOrderItem {
                product: product.to_string(),
                quantity: *quantity,
            })
            .collect(),
        shipping_address: shipping_address(),
        payment_method: "credit_card".to_string(),
        notes: None,
    }
}

/// A priced order with `(product, quantity, unit price)` lines.
pub(crate) fn new_order(owner: UserUuid, lines: &[(ProductUuid, u32, u64)]) -> NewOrder {
    let items: Vec<OrderItemRecord> = lines
        .iter()
        .map(|&(product_uuid, quantity, price)| OrderItemRecord {
            product_uuid,
            title: format!("Product {product_uuid}"),
            price,
            quantity,
            image: String::new(),
        })
        .collect();

    let items_price = items
        .iter()
        .filter_map(OrderItemRecord::line_total)
        .sum();

    let address = shipping_address();

    NewOrder {
        uuid: OrderUuid::new(),
        owner,
        items,
        shipping_address: ShippingAddress {
            first_name: address.first_name,
            last_name: address.last_name,
            street: address.street,
            city: address.city,
            state: address.state,
            zip_code: address.zip_code,
            country: address.country,
            phone: address.phone,
        },
        payment_method: PaymentMethod::CreditCard,
        notes: None,
        pricing: PricingPolicy::default()
            .price(items_price)
            .expect("test order prices fit in u64"),
    }
}

/// A pending, unpaid order with a single line.
pub(crate) fn order_record(owner: UserUuid) -> OrderRecord {
    new_order(owner, &[(ProductUuid::new(), 1, 1_000)]).into_record(Timestamp::now())
}
