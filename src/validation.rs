//! Form checks that run before any I/O.

use rust_decimal::Decimal;

use crate::{
    error::{AppError, AppResult, FieldError},
    models::{Category, Product, UserProfile},
};

const MAX_PRICE: i64 = 1_000_000_000;

fn finish(errors: Vec<FieldError>) -> AppResult<()> {
    if errors.is_empty() {
        Ok(())
    } else {
        Err(AppError::Validation(errors))
    }
}

/// New products must arrive with stock; edits may bring quantity down to zero.
pub fn validate_product(product: &Product, creating: bool) -> AppResult<()> {
    let mut errors = Vec::new();
    if product.name.trim().is_empty() {
        errors.push(FieldError::new("name", "Product name is required"));
    }
    if product.category_id.trim().is_empty() {
        errors.push(FieldError::new("category_id", "Select a category"));
    }
    if product.price <= Decimal::ZERO {
        errors.push(FieldError::new("price", "Price must be greater than zero"));
    } else if product.price > Decimal::from(MAX_PRICE) {
        errors.push(FieldError::new("price", "Price is too large"));
    }
    if creating && product.quantity <= 0 {
        errors.push(FieldError::new("quantity", "Quantity must be greater than zero"));
    } else if product.quantity < 0 {
        errors.push(FieldError::new("quantity", "Quantity cannot be negative"));
    }
    if product.low_stock_threshold < 0 {
        errors.push(FieldError::new(
            "low_stock_threshold",
            "Low-stock threshold cannot be negative",
        ));
    }
    finish(errors)
}

pub fn validate_category(category: &Category) -> AppResult<()> {
    let mut errors = Vec::new();
    if category.name.trim().is_empty() {
        errors.push(FieldError::new("name", "Category name is required"));
    }
    finish(errors)
}

pub fn validate_profile(profile: &UserProfile) -> AppResult<()> {
    let mut errors = Vec::new();
    if profile.full_name.trim().is_empty() {
        errors.push(FieldError::new("full_name", "Full name is required"));
    }
    if !is_email(&profile.email) {
        errors.push(FieldError::new("email", "Enter a valid email address"));
    }
    finish(errors)
}

pub fn is_email(email: &str) -> bool {
    let email = email.trim();
    match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.contains('@')
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
                && !email.contains(char::is_whitespace)
        }
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ring() -> Product {
        Product {
            id: String::new(),
            name: "Ring A".into(),
            description: None,
            category_id: "cat-rings".into(),
            quantity: 3,
            price: Decimal::new(12000, 2),
            image_path: None,
            is_available: true,
            low_stock_threshold: 5,
        }
    }

    fn fields(err: AppError) -> Vec<String> {
        match err {
            AppError::Validation(errors) => errors.into_iter().map(|e| e.field).collect(),
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn accepts_valid_product() {
        assert!(validate_product(&ring(), true).is_ok());
    }

    #[test]
    fn reports_every_bad_field() {
        let product = Product {
            name: "  ".into(),
            price: Decimal::ZERO,
            quantity: 0,
            ..ring()
        };
        let err = validate_product(&product, true).unwrap_err();
        assert_eq!(fields(err), vec!["name", "price", "quantity"]);
    }

    #[test]
    fn zero_quantity_allowed_on_edit_only() {
        let product = Product {
            quantity: 0,
            ..ring()
        };
        assert!(validate_product(&product, true).is_err());
        assert!(validate_product(&product, false).is_ok());

        let negative = Product {
            quantity: -1,
            ..ring()
        };
        assert_eq!(fields(validate_product(&negative, false).unwrap_err()), vec!["quantity"]);
    }

    #[test]
    fn email_shape() {
        assert!(is_email("owner@shop.example"));
        assert!(!is_email("owner@"));
        assert!(!is_email("owner.shop.example"));
        assert!(!is_email("a b@shop.example"));
    }
}
