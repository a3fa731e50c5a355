//! # Seed Data Generator
//!
//! Populates the database with a demo workshop for development.
//!
//! ## Usage
//! ```bash
//! # 20 customers (default), database from SHOEHUB_DATABASE_PATH or ./shoehub.db
//! cargo run -p shoehub-db --bin seed
//!
//! # Custom amount and path
//! cargo run -p shoehub-db --bin seed -- --customers 50 --db ./data/shoehub.db
//! ```
//!
//! ## Generated Data
//! - Five categories: Sneakers, Formal Shoes, Boots, Sandals, Athletic Shoes
//! - Three customizable flagship products plus fifteen plain ones
//! - Customers with one or two orders each (first ten customers), created
//!   through the regular order path so numbers and totals are real
//! - A sale for every third order, which is then marked shipped and paid
//!
//! Values are derived from loop indexes, so two runs produce the same data.

use chrono::Duration;
use std::collections::BTreeMap;
use std::env;
use tracing_subscriber::EnvFilter;

use shoehub_core::{
    Clock, CustomerStatus, CustomizationOptions, Customizations, Money, NewCategory, NewCustomer,
    NewOrder, NewProduct, NewSale, OrderItemInput, OrderStatus, OrderUpdate, PaymentMethod,
    PaymentStatus, Product,
};
use shoehub_db::{Database, Settings};

const CATEGORIES: &[(&str, &str)] = &[
    ("Sneakers", "Casual and athletic sneakers"),
    ("Formal Shoes", "Business and formal footwear"),
    ("Boots", "Work and fashion boots"),
    ("Sandals", "Summer and casual sandals"),
    ("Athletic Shoes", "Sports and running shoes"),
];

/// (category, name, description, price, sizes, colors, options)
type Flagship = (
    &'static str,
    &'static str,
    &'static str,
    i64,
    &'static [&'static str],
    &'static [&'static str],
    &'static [(&'static str, &'static [&'static str])],
);

const FLAGSHIPS: &[Flagship] = &[
    (
        "Sneakers",
        "Custom Canvas Sneakers",
        "Comfortable canvas sneakers with full customization options",
        250_000,
        &["36", "37", "38", "39", "40", "41", "42", "43", "44"],
        &["black", "white", "red", "blue", "navy"],
        &[
            ("upper", &["canvas", "leather", "synthetic"]),
            ("sole", &["rubber", "eva"]),
            ("laces", &["standard", "rope", "elastic"]),
            ("patterns", &["solid", "striped", "dotted", "custom"]),
        ],
    ),
    (
        "Formal Shoes",
        "Executive Oxford Shoes",
        "Professional leather oxford shoes for business",
        450_000,
        &["38", "39", "40", "41", "42", "43", "44"],
        &["black", "brown", "mahogany"],
        &[
            ("upper", &["leather", "patent_leather"]),
            ("sole", &["leather", "rubber"]),
        ],
    ),
    (
        "Boots",
        "Adventure Hiking Boots",
        "Durable hiking boots for outdoor adventures",
        380_000,
        &["36", "37", "38", "39", "40", "41", "42", "43", "44", "45"],
        &["brown", "black", "tan"],
        &[
            ("upper", &["leather", "synthetic", "nubuck"]),
            ("sole", &["rubber", "vibram"]),
            ("laces", &["rope", "paracord"]),
        ],
    ),
];

const MODELS: &[&str] = &[
    "Classic", "Urban", "Trail", "Breeze", "Summit", "Metro", "Harbor", "Sprint", "Canyon",
    "Velvet", "Nomad", "Pioneer", "Coastal", "Ridge", "Aurora",
];

const FIRST_NAMES: &[&str] = &[
    "Budi", "Siti", "Agus", "Dewi", "Rina", "Andi", "Putri", "Joko", "Maya", "Rudi",
];

const LAST_NAMES: &[&str] = &["Santoso", "Rahma", "Wijaya", "Lestari", "Pratama", "Hidayat"];

const CITIES: &[&str] = &["Jakarta", "Bandung", "Surabaya", "Yogyakarta", "Medan"];

fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
}

fn pick<T: Copy>(values: &[T], seed: usize) -> T {
    values[seed % values.len()]
}

fn pick_owned(values: &[String], seed: usize) -> String {
    values[seed % values.len()].clone()
}

/// One valid choice per customizable part.
fn customizations_for(product: &Product, seed: usize) -> Option<Customizations> {
    if !product.is_customizable {
        return None;
    }
    let options = product.customization_options.as_ref()?;
    let chosen: Customizations = options
        .iter()
        .enumerate()
        .filter_map(|(i, (part, values))| {
            (!values.is_empty()).then(|| (part.clone(), values[(seed + i) % values.len()].clone()))
        })
        .collect();
    (!chosen.is_empty()).then_some(chosen)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args: Vec<String> = env::args().collect();

    let mut settings = Settings::from_env()?;
    let mut customer_count: usize = 20;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--customers" | "-c" => {
                if i + 1 < args.len() {
                    customer_count = args[i + 1].parse().unwrap_or(20);
                    i += 1;
                }
            }
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    settings.database_path = args[i + 1].clone().into();
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("ShoeHub Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -c, --customers <N>  Number of customers to generate (default: 20)");
                println!("  -d, --db <PATH>      Database file path (default: SHOEHUB_DATABASE_PATH or ./shoehub.db)");
                println!("  -h, --help           Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("ShoeHub Seed Data Generator");
    println!("===========================");
    println!("Database:  {}", settings.database_path.display());
    println!("Customers: {}", customer_count);
    println!();

    let db = Database::new(settings.db_config()).await?;
    println!("✓ Connected to database, migrations applied");

    let existing = db.products().count().await?;
    if existing > 0 {
        println!("⚠ Database already has {} products", existing);
        println!("  Skipping seed to avoid duplicates.");
        println!("  Delete the database file to regenerate.");
        return Ok(());
    }

    let start = std::time::Instant::now();

    // Categories
    let mut category_ids = BTreeMap::new();
    for (name, description) in CATEGORIES {
        let category = db
            .categories()
            .create(&NewCategory {
                name: name.to_string(),
                description: Some(description.to_string()),
                active: true,
            })
            .await?;
        category_ids.insert(*name, category.id);
    }
    println!("✓ {} categories", category_ids.len());

    // Products
    let mut products: Vec<Product> = Vec::new();
    for (category, name, description, price, sizes, colors, options) in FLAGSHIPS {
        let options: CustomizationOptions = options
            .iter()
            .map(|(part, values)| (part.to_string(), strings(values)))
            .collect();
        let product = db
            .products()
            .create(&NewProduct {
                category_id: category_ids.get(category).copied().unwrap_or_default(),
                name: name.to_string(),
                description: Some(description.to_string()),
                base_price: Money::from_major(*price),
                available_sizes: strings(sizes),
                available_colors: strings(colors),
                customization_options: Some(options),
                image_url: None,
                is_customizable: true,
                active: true,
            })
            .await?;
        products.push(product);
    }

    for (n, model) in MODELS.iter().enumerate() {
        let (category, _) = pick(CATEGORIES, n);
        let product = db
            .products()
            .create(&NewProduct {
                category_id: category_ids.get(category).copied().unwrap_or_default(),
                name: format!("{} {}", model, category.trim_end_matches('s')),
                description: Some(format!("{} line, ready to wear", model)),
                base_price: Money::from_major(150_000 + (n as i64 * 37_000) % 400_000),
                available_sizes: strings(&["38", "39", "40", "41", "42", "43"]),
                available_colors: strings(&[pick(&["black", "white", "grey"], n), "brown"]),
                customization_options: None,
                image_url: None,
                is_customizable: false,
                active: true,
            })
            .await?;
        products.push(product);
    }
    println!("✓ {} products", products.len());

    // Customers
    let mut customer_ids = Vec::with_capacity(customer_count);
    for n in 0..customer_count {
        let first = pick(FIRST_NAMES, n);
        let last = pick(LAST_NAMES, n / FIRST_NAMES.len() + n);
        let customer = db
            .customers()
            .create(&NewCustomer {
                name: format!("{} {}", first, last),
                email: format!("{}.{}{}@example.com", first, last, n).to_lowercase(),
                phone: Some(format!("0812{:08}", 1_000_000 + n * 7_919)),
                address: Some(format!("Jl. Merdeka No. {}", n + 1)),
                city: Some(pick(CITIES, n).to_string()),
                postal_code: Some(format!("{:05}", 40_000 + n * 13)),
                status: if n % 9 == 8 {
                    CustomerStatus::Inactive
                } else {
                    CustomerStatus::Active
                },
            })
            .await?;
        customer_ids.push(customer.id);
    }
    println!("✓ {} customers", customer_ids.len());

    // Orders and sales
    let today = db.clock().today();
    let now = db.clock().now();
    let ordering = &products[..products.len().min(5)];
    let mut orders = 0;
    let mut sales = 0;

    for (c, customer_id) in customer_ids.iter().take(10).enumerate() {
        for o in 0..(1 + c % 2) {
            let seed = c * 7 + o * 3;
            let items: Vec<OrderItemInput> = (0..(1 + seed % 3))
                .map(|k| {
                    let product = &ordering[(seed + k) % ordering.len()];
                    OrderItemInput {
                        product_id: product.id,
                        quantity: 1 + ((seed + k) % 2) as i64,
                        size: pick_owned(&product.available_sizes, seed + k),
                        color: pick_owned(&product.available_colors, seed + k),
                        customizations: customizations_for(product, seed + k),
                        special_notes: None,
                    }
                })
                .collect();

            let order = db
                .orders()
                .create(&NewOrder {
                    customer_id: *customer_id,
                    items,
                    discount_amount: Money::zero(),
                    notes: None,
                    expected_delivery: today.checked_add_signed(Duration::days(14 + seed as i64)),
                })
                .await?;
            orders += 1;

            if orders % 3 == 0 {
                db.sales()
                    .record(&NewSale {
                        order_id: order.id,
                        amount: order.total_amount,
                        payment_method: pick(&PaymentMethod::ALL, seed),
                        payment_date: now - Duration::days((seed % 60) as i64),
                        payment_notes: None,
                    })
                    .await?;
                db.orders()
                    .update(
                        order.id,
                        &OrderUpdate {
                            status: OrderStatus::Shipped,
                            payment_status: PaymentStatus::Paid,
                            notes: None,
                            expected_delivery: None,
                        },
                    )
                    .await?;
                sales += 1;
            }
        }
    }
    println!("✓ {} orders, {} sales", orders, sales);

    println!();
    println!("Seed complete in {:?}", start.elapsed());

    Ok(())
}
