//! # Validation Module
//!
//! Input validation for ShoeHub forms and order requests.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Shape (THIS MODULE, no catalog needed)                       │
//! │  ├── required text, lengths, email format                              │
//! │  ├── quantities, non-empty item list, delivery date after today        │
//! │  └── non-negative discount                                             │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: Against the catalog (THIS MODULE, product passed in)         │
//! │  ├── size / color offered by the product                               │
//! │  └── customizations match the product's declared options               │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Database (SQLite)                                            │
//! │  ├── NOT NULL / UNIQUE constraints                                     │
//! │  └── Foreign key constraints                                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Errors name the offending field. Item-level checks report bare names
//! (`quantity`) and callers prefix them with [`ValidationError::within`].
//!
//! ## Usage
//! ```rust
//! use shoehub_core::validation::{validate_email, validate_quantity};
//!
//! validate_email("email", "ana@example.com").unwrap();
//! assert!(validate_quantity(0).is_err());
//! ```

use chrono::NaiveDate;

use crate::error::ValidationError;
use crate::types::{
    Customizations, NewCategory, NewCustomer, NewOrder, NewProduct, NewSale, OrderItemInput,
    OrderUpdate, Product,
};
use crate::{MAX_ITEM_QUANTITY, MAX_NAME_LENGTH};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// String Validators
// =============================================================================

/// Validates a required text field: non-blank and at most `max` characters.
///
/// ```rust
/// use shoehub_core::validation::validate_required;
///
/// assert!(validate_required("name", "Boots", 255).is_ok());
/// assert!(validate_required("name", "   ", 255).is_err());
/// ```
pub fn validate_required(field: &str, value: &str, max: usize) -> ValidationResult<()> {
    let value = value.trim();

    if value.is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    if value.chars().count() > max {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max,
        });
    }

    Ok(())
}

/// Validates an optional text field's length.
pub fn validate_optional(field: &str, value: Option<&str>, max: usize) -> ValidationResult<()> {
    match value {
        Some(v) if v.chars().count() > max => Err(ValidationError::TooLong {
            field: field.to_string(),
            max,
        }),
        _ => Ok(()),
    }
}

/// Validates an email address.
///
/// ## Rules
/// - Exactly one `@` with a non-empty local part
/// - Domain contains a dot, not at either end
/// - No whitespace
pub fn validate_email(field: &str, email: &str) -> ValidationResult<()> {
    let email = email.trim();
    validate_required(field, email, MAX_NAME_LENGTH)?;

    let invalid = |reason: &str| ValidationError::InvalidFormat {
        field: field.to_string(),
        reason: reason.to_string(),
    };

    if email.chars().any(char::is_whitespace) {
        return Err(invalid("must not contain spaces"));
    }

    let (local, domain) = match email.split_once('@') {
        Some(parts) => parts,
        None => return Err(invalid("missing '@'")),
    };

    if local.is_empty() || domain.contains('@') {
        return Err(invalid("must look like name@domain"));
    }

    if !domain.contains('.') || domain.starts_with('.') || domain.ends_with('.') {
        return Err(invalid("domain must contain a dot"));
    }

    Ok(())
}

// =============================================================================
// Numeric / Date Validators
// =============================================================================

/// Validates an item quantity.
///
/// ## Rules
/// - Must be positive (> 0)
/// - Must not exceed MAX_ITEM_QUANTITY (999)
pub fn validate_quantity(qty: i64) -> ValidationResult<()> {
    if qty <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        });
    }

    if qty > MAX_ITEM_QUANTITY {
        return Err(ValidationError::OutOfRange {
            field: "quantity".to_string(),
            min: 1,
            max: MAX_ITEM_QUANTITY,
        });
    }

    Ok(())
}

/// Validates an expected delivery date: when present it must be strictly
/// after `reference`.
pub fn validate_delivery_date(
    date: Option<NaiveDate>,
    reference: NaiveDate,
) -> ValidationResult<()> {
    match date {
        Some(d) if d <= reference => Err(ValidationError::NotAfter {
            field: "expected_delivery".to_string(),
            reference: reference.to_string(),
        }),
        _ => Ok(()),
    }
}

// =============================================================================
// Order Validators
// =============================================================================

/// Shape checks for one requested item (no catalog lookup).
pub fn validate_item_shape(item: &OrderItemInput) -> ValidationResult<()> {
    validate_quantity(item.quantity)?;
    validate_required("size", &item.size, 20)?;
    validate_required("color", &item.color, 50)?;
    validate_optional("special_notes", item.special_notes.as_deref(), 1000)?;
    Ok(())
}

/// Checks a requested item against the product it references.
///
/// ## Rules
/// - The product must be active
/// - Size and color, trimmed, must be among the product's offered values
/// - Customizations are only accepted for customizable products, and every
///   `part → value` must appear in the product's `customization_options`
pub fn validate_item_against_product(
    item: &OrderItemInput,
    product: &Product,
) -> ValidationResult<()> {
    if !product.active {
        return Err(ValidationError::InvalidFormat {
            field: "product_id".to_string(),
            reason: format!("product {} is not available", product.id),
        });
    }

    if !product.offers_size(item.size.trim()) {
        return Err(ValidationError::NotAllowed {
            field: "size".to_string(),
            value: item.size.clone(),
            allowed: product.available_sizes.clone(),
        });
    }

    if !product.offers_color(item.color.trim()) {
        return Err(ValidationError::NotAllowed {
            field: "color".to_string(),
            value: item.color.clone(),
            allowed: product.available_colors.clone(),
        });
    }

    if let Some(customizations) = &item.customizations {
        validate_customizations(customizations, product)?;
    }

    Ok(())
}

/// Validates a customization mapping against the product's options.
///
/// An empty mapping is treated the same as no customization.
pub fn validate_customizations(
    customizations: &Customizations,
    product: &Product,
) -> ValidationResult<()> {
    if customizations.is_empty() {
        return Ok(());
    }

    if !product.is_customizable {
        return Err(ValidationError::InvalidFormat {
            field: "customizations".to_string(),
            reason: format!("product {} is not customizable", product.id),
        });
    }

    let options = product.customization_options.as_ref();
    for (part, value) in customizations {
        let field = format!("customizations.{}", part);
        let allowed = match options.and_then(|o| o.get(part)) {
            Some(allowed) => allowed,
            None => {
                return Err(ValidationError::NotAllowed {
                    field,
                    value: part.clone(),
                    allowed: options
                        .map(|o| o.keys().cloned().collect())
                        .unwrap_or_default(),
                })
            }
        };
        if !allowed.iter().any(|a| a == value) {
            return Err(ValidationError::NotAllowed {
                field,
                value: value.clone(),
                allowed: allowed.clone(),
            });
        }
    }

    Ok(())
}

/// Shape checks for an order request.
///
/// Item errors come back with an `items[i].` prefix.
pub fn validate_new_order(order: &NewOrder, today: NaiveDate) -> ValidationResult<()> {
    if order.customer_id <= 0 {
        return Err(ValidationError::Required {
            field: "customer_id".to_string(),
        });
    }

    if order.items.is_empty() {
        return Err(ValidationError::Empty {
            field: "items".to_string(),
        });
    }

    for (i, item) in order.items.iter().enumerate() {
        validate_item_shape(item).map_err(|e| e.within(&format!("items[{}]", i)))?;
    }

    if order.discount_amount.is_negative() {
        return Err(ValidationError::Negative {
            field: "discount_amount".to_string(),
        });
    }

    validate_optional("notes", order.notes.as_deref(), 2000)?;
    validate_delivery_date(order.expected_delivery, today)
}

/// Checks for an order update. Status values are already typed.
///
/// A supplied delivery date must fall strictly after the day the order was
/// created, so a late order can still be updated with its stored date.
pub fn validate_order_update(update: &OrderUpdate, created_on: NaiveDate) -> ValidationResult<()> {
    validate_optional("notes", update.notes.as_deref(), 2000)?;
    validate_delivery_date(update.expected_delivery, created_on)
}

// =============================================================================
// Catalog / Customer / Sale Validators
// =============================================================================

pub fn validate_customer(customer: &NewCustomer) -> ValidationResult<()> {
    validate_required("name", &customer.name, MAX_NAME_LENGTH)?;
    validate_email("email", &customer.email)?;
    validate_optional("phone", customer.phone.as_deref(), 20)?;
    validate_optional("city", customer.city.as_deref(), 100)?;
    validate_optional("postal_code", customer.postal_code.as_deref(), 10)?;
    Ok(())
}

pub fn validate_category(category: &NewCategory) -> ValidationResult<()> {
    validate_required("name", &category.name, MAX_NAME_LENGTH)
}

/// Validates a product form.
///
/// ## Rules
/// - `name` required, at most 255 characters
/// - `base_price` ≥ 0
/// - at least one size and one color, none blank
pub fn validate_product(product: &NewProduct) -> ValidationResult<()> {
    validate_required("name", &product.name, MAX_NAME_LENGTH)?;

    if product.category_id <= 0 {
        return Err(ValidationError::Required {
            field: "category_id".to_string(),
        });
    }

    if product.base_price.is_negative() {
        return Err(ValidationError::Negative {
            field: "base_price".to_string(),
        });
    }

    for (field, values) in [
        ("available_sizes", &product.available_sizes),
        ("available_colors", &product.available_colors),
    ] {
        if values.is_empty() {
            return Err(ValidationError::Empty {
                field: field.to_string(),
            });
        }
        for (i, value) in values.iter().enumerate() {
            validate_required(&format!("{}[{}]", field, i), value, 50)?;
        }
    }

    validate_optional("image_url", product.image_url.as_deref(), MAX_NAME_LENGTH)
}

pub fn validate_sale(sale: &NewSale) -> ValidationResult<()> {
    if !sale.amount.is_positive() {
        return Err(ValidationError::MustBePositive {
            field: "amount".to_string(),
        });
    }
    validate_optional("payment_notes", sale.payment_notes.as_deref(), 1000)
}

// =============================================================================
// Unit Tests
// =============================================================================
