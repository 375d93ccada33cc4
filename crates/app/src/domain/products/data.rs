//! Products Data

use jiff::Timestamp;

use crate::domain::products::{
    errors::ProductsServiceError,
    records::{Category, ProductRecord, ProductUuid},
};

const MAX_TITLE_CHARS: usize = 100;
const MAX_DESCRIPTION_CHARS: usize = 500;
const MAX_DISCOUNT: u8 = 100;

/// New Product Data
#[derive(Debug, Clone, PartialEq)]
pub struct NewProduct {
    pub uuid: ProductUuid,
    pub title: String,
    pub description: String,
    pub price: u64,
    pub category: Category,
    pub image: String,
    pub stock: u32,
    pub discount: u8,
    pub is_active: bool,
    pub featured: bool,
}

impl NewProduct {
    /// Check field limits before anything is written.
    ///
    /// # Errors
    ///
    /// Returns [`ProductsServiceError::Invalid`] naming the first bad field.
    pub fn validate(&self) -> Result<(), ProductsServiceError> {
        validate_title(&self.title)?;
        validate_description(&self.description)?;
        validate_image(&self.image)?;
        validate_discount(self.discount)
    }

    #[must_use]
    pub fn into_record(self, now: Timestamp) -> ProductRecord {
        ProductRecord {
            uuid: self.uuid,
            title: self.title.trim().to_string(),
            description: self.description.trim().to_string(),
            price: self.price,
            category: self.category,
            image: self.image.trim().to_string(),
            stock: self.stock,
            discount: self.discount,
            is_active: self.is_active,
            featured: self.featured,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Product Update Data
///
/// Every field an administrator may change. `None` leaves the field as is.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProductUpdate {
    pub title: Option<String>,
    pub description: Option<String>,
    pub price: Option<u64>,
    pub category: Option<Category>,
    pub image: Option<String>,
    pub stock: Option<u32>,
    pub discount: Option<u8>,
    pub is_active: Option<bool>,
    pub featured: Option<bool>,
}

impl ProductUpdate {
    /// Check the fields that are present.
    ///
    /// # Errors
    ///
    /// Returns [`ProductsServiceError::Invalid`] naming the first bad field.
    pub fn validate(&self) -> Result<(), ProductsServiceError> {
        if let Some(title) = &self.title {
            validate_title(title)?;
        }

        if let Some(description) = &self.description {
            validate_description(description)?;
        }

        if let Some(image) = &self.image {
            validate_image(image)?;
        }

        if let Some(discount) = self.discount {
            validate_discount(discount)?;
        }

        Ok(())
    }

    /// Overwrite the fields that are present.
    pub fn apply(self, product: &mut ProductRecord, now: Timestamp) {
        if let Some(title) = self.title {
            product.title = title.trim().to_string();
        }

        if let Some(description) = self.description {
            product.description = description.trim().to_string();
        }

        if let Some(price) = self.price {
            product.price = price;
        }

        if let Some(category) = self.category {
            product.category = category;
        }

        if let Some(image) = self.image {
            product.image = image.trim().to_string();
        }

        if let Some(stock) = self.stock {
            product.stock = stock;
        }

        if let Some(discount) = self.discount {
            product.discount = discount;
        }

        if let Some(is_active) = self.is_active {
            product.is_active = is_active;
        }

        if let Some(featured) = self.featured {
            product.featured = featured;
        }

        product.updated_at = now;
    }
}

/// Catalog listing filter
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProductFilter {
    pub category: Option<Category>,
    pub featured: Option<bool>,
    pub min_price: Option<u64>,
    pub max_price: Option<u64>,
}

impl ProductFilter {
    /// Whether an active product belongs in the listing.
    #[must_use]
    pub fn matches(&self, product: &ProductRecord) -> bool {
        product.is_active
            && self.category.is_none_or(|category| product.category == category)
            && self.featured.is_none_or(|featured| product.featured == featured)
            && self.min_price.is_none_or(|min| product.price >= min)
            && self.max_price.is_none_or(|max| product.price <= max)
    }
}

fn validate_title(title: &str) -> Result<(), ProductsServiceError> {
    let length = title.trim().chars().count();

    if length == 0 || length > MAX_TITLE_CHARS {
        return Err(ProductsServiceError::Invalid(
            "title must be between 1 and 100 characters",
        ));
    }

    Ok(())
}

fn validate_description(description: &str) -> Result<(), ProductsServiceError> {
    if description.trim().chars().count() > MAX_DESCRIPTION_CHARS {
        return Err(ProductsServiceError::Invalid(
            "description cannot exceed 500 characters",
        ));
    }

    Ok(())
}

fn validate_image(image: &str) -> Result<(), ProductsServiceError> {
    if image.trim().is_empty() {
        return Err(ProductsServiceError::Invalid("image is required"));
    }

    Ok(())
}

fn validate_discount(discount: u8) -> Result<(), ProductsServiceError> {
    if discount > MAX_DISCOUNT {
        return Err(ProductsServiceError::Invalid(
            "discount must be between 0 and 100",
        ));
    }

    Ok(())
}
