use chrono::{DateTime, Utc};
use database::mongodb::ids::uuid_as_string;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use strum::{Display, EnumString};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::error::SpectacleError;

/// Upper bound used for an open-ended `"min-+"` price range (2^53 - 1)
pub const OPEN_PRICE_MAX: i64 = 9_007_199_254_740_991;

/// Who a frame is made for
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, ToSchema,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
    Kids,
}

/// Product line
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, ToSchema,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Category {
    Sunglasses,
    Eyeglasses,
    ContactLenses,
}

/// Catalog entry, stored in the `spectacles` collection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Spectacle {
    #[serde(rename = "_id", alias = "id", with = "uuid_as_string")]
    pub id: Uuid,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub gender: Gender,
    /// Whole currency units
    pub price: i64,
    pub category: Category,
    /// URL or path of the product image
    pub image: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub stock: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Body of `POST /spectacles`.
///
/// The four required fields are optional here so that every missing one
/// can be reported in a single response.
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateSpectacle {
    pub name: Option<String>,
    pub gender: Option<Gender>,
    #[validate(range(min = 1, message = "Price must be a positive integer"))]
    pub price: Option<i64>,
    pub category: Option<Category>,
    pub image: Option<String>,
    pub description: Option<String>,
    #[validate(range(min = 0, message = "Stock cannot be negative"))]
    pub stock: Option<i64>,
}

impl CreateSpectacle {
    /// Names of the required fields that are absent or blank
    pub fn missing_fields(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.gender.is_none() {
            missing.push("gender");
        }
        if self.price.is_none() {
            missing.push("price");
        }
        if self.category.is_none() {
            missing.push("category");
        }
        if self.image.as_deref().is_none_or(|image| image.trim().is_empty()) {
            missing.push("image");
        }
        missing
    }
}

impl TryFrom<CreateSpectacle> for Spectacle {
    type Error = SpectacleError;

    fn try_from(input: CreateSpectacle) -> Result<Self, Self::Error> {
        let missing = input.missing_fields();
        let (Some(gender), Some(price), Some(category), Some(image), true) = (
            input.gender,
            input.price,
            input.category,
            input.image,
            missing.is_empty(),
        ) else {
            return Err(SpectacleError::MissingFields(missing));
        };

        let now = Utc::now();
        Ok(Self {
            id: Uuid::now_v7(),
            name: input.name,
            gender,
            price,
            category,
            image,
            description: input.description,
            stock: input.stock.unwrap_or(0),
            created_at: now,
            updated_at: now,
        })
    }
}

/// Body of `PUT /spectacles/{id}`; only the fields present are changed
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateSpectacle {
    pub name: Option<String>,
    pub gender: Option<Gender>,
    #[validate(range(min = 1, message = "Price must be a positive integer"))]
    pub price: Option<i64>,
    pub category: Option<Category>,
    #[validate(length(min = 1, message = "Image cannot be empty"))]
    pub image: Option<String>,
    pub description: Option<String>,
    #[validate(range(min = 0, message = "Stock cannot be negative"))]
    pub stock: Option<i64>,
}

impl Spectacle {
    /// Merge the provided fields into this record
    pub fn apply_update(&mut self, update: UpdateSpectacle) {
        if let Some(name) = update.name {
            self.name = Some(name);
        }
        if let Some(gender) = update.gender {
            self.gender = gender;
        }
        if let Some(price) = update.price {
            self.price = price;
        }
        if let Some(category) = update.category {
            self.category = category;
        }
        if let Some(image) = update.image {
            self.image = image;
        }
        if let Some(description) = update.description {
            self.description = Some(description);
        }
        if let Some(stock) = update.stock {
            self.stock = stock;
        }
        self.updated_at = Utc::now();
    }
}

/// Raw query string of `GET /spectacles`
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct SpectacleQuery {
    /// `male`, `female` or `kids`
    pub gender: Option<String>,
    /// `sunglasses`, `eyeglasses` or `contactlenses`
    pub category: Option<String>,
    /// `"min-max"`, or `"min-+"` for no upper bound
    pub price: Option<String>,
}

/// Inclusive price bounds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PriceRange {
    pub min: i64,
    pub max: i64,
}

impl PriceRange {
    pub fn contains(&self, price: i64) -> bool {
        (self.min..=self.max).contains(&price)
    }
}

impl FromStr for PriceRange {
    type Err = SpectacleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || SpectacleError::InvalidPriceRange(s.to_string());

        let (min, max) = s.split_once('-').ok_or_else(invalid)?;
        let min = min.trim().parse::<i64>().map_err(|_| invalid())?;
        // An unescaped `+` arrives as a space once the query string is form-decoded
        let max = match max {
            "+" | " " => OPEN_PRICE_MAX,
            bound => bound.trim().parse::<i64>().map_err(|_| invalid())?,
        };

        Ok(Self { min, max })
    }
}

/// Parsed catalog filter; every present criterion must match
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SpectacleFilter {
    pub gender: Option<Gender>,
    pub category: Option<Category>,
    pub price: Option<PriceRange>,
}

impl SpectacleFilter {
    pub fn matches(&self, spectacle: &Spectacle) -> bool {
        self.gender.is_none_or(|g| g == spectacle.gender)
            && self.category.is_none_or(|c| c == spectacle.category)
            && self.price.is_none_or(|range| range.contains(spectacle.price))
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

impl TryFrom<SpectacleQuery> for SpectacleFilter {
    type Error = SpectacleError;

    fn try_from(query: SpectacleQuery) -> Result<Self, Self::Error> {
        let gender = non_empty(query.gender)
            .map(|value| {
                value
                    .parse::<Gender>()
                    .map_err(|_| SpectacleError::InvalidFilter { field: "gender", value })
            })
            .transpose()?;
        let category = non_empty(query.category)
            .map(|value| {
                value
                    .parse::<Category>()
                    .map_err(|_| SpectacleError::InvalidFilter { field: "category", value })
            })
            .transpose()?;
        let price = non_empty(query.price)
            .map(|value| value.parse::<PriceRange>())
            .transpose()?;

        Ok(Self {
            gender,
            category,
            price,
        })
    }
}

/// Body of a successful delete
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct DeleteResponse {
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use validator::Validate;

    fn sample() -> Spectacle {
        Spectacle::try_from(CreateSpectacle {
            name: Some("Aviator".into()),
            gender: Some(Gender::Male),
            price: Some(1500),
            category: Some(Category::Sunglasses),
            image: Some("/img/aviator.png".into()),
            ..Default::default()
        })
        .unwrap()
    }

    #[test]
    fn test_enum_wire_names() {
        assert_eq!(serde_json::to_value(Gender::Kids).unwrap(), "kids");
        assert_eq!(
            serde_json::to_value(Category::ContactLenses).unwrap(),
            "contactlenses"
        );
        assert_eq!("eyeglasses".parse::<Category>().unwrap(), Category::Eyeglasses);
        assert_eq!(Gender::Female.to_string(), "female");
        assert!("Unisex".parse::<Gender>().is_err());
    }

    #[test]
    fn test_price_range_parsing() {
        assert_eq!(
            "100-500".parse::<PriceRange>().unwrap(),
            PriceRange { min: 100, max: 500 }
        );
        assert_eq!(
            "200-+".parse::<PriceRange>().unwrap(),
            PriceRange {
                min: 200,
                max: OPEN_PRICE_MAX
            }
        );

        assert_eq!("50- ".parse::<PriceRange>().unwrap().max, OPEN_PRICE_MAX);

        for bad in ["", "100", "100-", "abc-200", "100-abc", "-100", "100-+-", "+-100"] {
            assert!(
                matches!(
                    bad.parse::<PriceRange>(),
                    Err(SpectacleError::InvalidPriceRange(_))
                ),
                "{bad:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_price_range_is_inclusive() {
        let range = PriceRange { min: 100, max: 500 };
        assert!(range.contains(100));
        assert!(range.contains(500));
        assert!(!range.contains(99));
        assert!(!range.contains(501));
    }

    #[test]
    fn test_missing_fields_lists_every_gap() {
        let input = CreateSpectacle {
            price: Some(10),
            image: Some("   ".into()),
            ..Default::default()
        };
        assert_eq!(input.missing_fields(), vec!["gender", "category", "image"]);

        match Spectacle::try_from(input) {
            Err(SpectacleError::MissingFields(missing)) => {
                assert_eq!(missing, vec!["gender", "category", "image"])
            }
            other => panic!("expected MissingFields, got {other:?}"),
        }
    }

    #[test]
    fn test_create_defaults_stock_to_zero() {
        let spectacle = sample();
        assert_eq!(spectacle.stock, 0);
        assert_eq!(spectacle.created_at, spectacle.updated_at);
        assert!(spectacle.description.is_none());
    }

    #[test]
    fn test_create_price_must_be_positive() {
        let input = CreateSpectacle {
            price: Some(0),
            ..Default::default()
        };
        let errors = input.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("price"));
    }

    #[test]
    fn test_apply_update_merges_only_present_fields() {
        let mut spectacle = sample();
        let before = spectacle.clone();

        spectacle.apply_update(UpdateSpectacle {
            price: Some(1200),
            stock: Some(4),
            ..Default::default()
        });

        assert_eq!(spectacle.price, 1200);
        assert_eq!(spectacle.stock, 4);
        assert_eq!(spectacle.name, before.name);
        assert_eq!(spectacle.image, before.image);
        assert_eq!(spectacle.gender, before.gender);
        assert!(spectacle.updated_at >= before.updated_at);
    }

    #[test]
    fn test_filter_from_query() {
        let filter = SpectacleFilter::try_from(SpectacleQuery {
            gender: Some("female".into()),
            category: Some(String::new()),
            price: Some("0-+".into()),
        })
        .unwrap();
        assert_eq!(filter.gender, Some(Gender::Female));
        assert_eq!(filter.category, None);
        assert_eq!(filter.price.unwrap().max, OPEN_PRICE_MAX);

        let err = SpectacleFilter::try_from(SpectacleQuery {
            category: Some("monocles".into()),
            ..Default::default()
        })
        .unwrap_err();
        assert!(matches!(err, SpectacleError::InvalidFilter { field: "category", .. }));
    }

    #[test]
    fn test_filter_matches_conjunctively() {
        let spectacle = sample();
        let mut filter = SpectacleFilter::default();
        assert!(filter.matches(&spectacle));

        filter.gender = Some(Gender::Male);
        filter.price = Some(PriceRange { min: 1000, max: 2000 });
        assert!(filter.matches(&spectacle));

        filter.category = Some(Category::Eyeglasses);
        assert!(!filter.matches(&spectacle));
    }

    #[test]
    fn test_spectacle_wire_shape() {
        let value = serde_json::to_value(sample()).unwrap();
        assert!(value.get("_id").is_some());
        assert!(value.get("createdAt").is_some());
        assert_eq!(value["category"], "sunglasses");
        assert!(value.get("description").is_none());
    }
}
