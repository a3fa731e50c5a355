//! Shared test data for repository tests.

use std::collections::BTreeMap;
use std::sync::Arc;

use shoehub_core::{
    Category, Clock, Customer, CustomerStatus, FixedClock, Money, NewCategory, NewCustomer,
    NewOrder, NewProduct, NewSale, OrderItemInput, PaymentMethod, Product,
};

use crate::pool::{Database, DbConfig};

/// The date every repository test runs on.
pub fn clock() -> FixedClock {
    FixedClock::on(2026, 10, 19).unwrap()
}

/// Fresh in-memory database pinned to [`clock`].
pub async fn db() -> Database {
    Database::new(DbConfig::in_memory())
        .await
        .unwrap()
        .with_clock(Arc::new(clock()))
}

pub fn new_customer(email: &str) -> NewCustomer {
    NewCustomer {
        name: "Budi Santoso".to_string(),
        email: email.to_string(),
        phone: Some("081234567890".to_string()),
        address: Some("Jl. Merdeka 10".to_string()),
        city: Some("Bandung".to_string()),
        postal_code: Some("40111".to_string()),
        status: CustomerStatus::Active,
    }
}

/// A plain, non-customizable product offered in size 40/41, black.
pub fn new_product(category_id: i64, name: &str, price: i64) -> NewProduct {
    NewProduct {
        category_id,
        name: name.to_string(),
        description: None,
        base_price: Money::from_major(price),
        available_sizes: vec!["40".to_string(), "41".to_string()],
        available_colors: vec!["black".to_string()],
        customization_options: None,
        image_url: None,
        is_customizable: false,
        active: true,
    }
}

fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
}

pub struct Seeded {
    pub customer: Customer,
    pub category: Category,
    /// Customizable, 250000.00, sizes 36..=45.
    pub sneaker: Product,
    /// Not customizable, 100000.00.
    pub oxford: Product,
    /// Customizable, 400000.00.
    pub boots: Product,
}

/// One customer and three products, all offered in size "40" and "black".
pub async fn seed_catalog(db: &Database) -> Seeded {
    let customer = db
        .customers()
        .create(&new_customer("budi@example.com"))
        .await
        .unwrap();

    let category = db
        .categories()
        .create(&NewCategory {
            name: "Sneakers".to_string(),
            description: None,
            active: true,
        })
        .await
        .unwrap();

    let mut options = BTreeMap::new();
    options.insert("sole".to_string(), strings(&["rubber", "eva"]));
    options.insert("upper".to_string(), strings(&["canvas", "leather"]));

    let sneaker = db
        .products()
        .create(&NewProduct {
            description: Some("Canvas sneakers made to order".to_string()),
            available_sizes: strings(&["36", "37", "38", "39", "40", "41", "42", "43", "44", "45"]),
            available_colors: strings(&["black", "white", "navy"]),
            customization_options: Some(options),
            is_customizable: true,
            ..new_product(category.id, "Custom Canvas Sneakers", 250_000)
        })
        .await
        .unwrap();

    let oxford = db
        .products()
        .create(&NewProduct {
            description: Some("Formal leather shoes".to_string()),
            available_sizes: strings(&["39", "40", "41", "42", "43"]),
            available_colors: strings(&["black", "brown"]),
            ..new_product(category.id, "Leather Oxford", 100_000)
        })
        .await
        .unwrap();

    let mut boot_options = BTreeMap::new();
    boot_options.insert("lining".to_string(), strings(&["wool", "cotton"]));

    let boots = db
        .products()
        .create(&NewProduct {
            customization_options: Some(boot_options),
            is_customizable: true,
            ..new_product(category.id, "Work Boots", 400_000)
        })
        .await
        .unwrap();

    Seeded {
        customer,
        category,
        sneaker,
        oxford,
        boots,
    }
}

pub fn item(product_id: i64, quantity: i64) -> OrderItemInput {
    OrderItemInput {
        product_id,
        quantity,
        size: "40".to_string(),
        color: "black".to_string(),
        customizations: None,
        special_notes: None,
    }
}

pub fn order_for(customer_id: i64, product_id: i64, quantity: i64) -> NewOrder {
    NewOrder {
        customer_id,
        items: vec![item(product_id, quantity)],
        discount_amount: Money::zero(),
        notes: None,
        expected_delivery: None,
    }
}

/// A cash payment dated at the test clock.
pub fn sale_for(order_id: i64, amount: Money) -> NewSale {
    NewSale {
        order_id,
        amount,
        payment_method: PaymentMethod::Cash,
        payment_date: clock().now(),
        payment_notes: None,
    }
}
