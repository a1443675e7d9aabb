// Filtered property search
// Turns optional search criteria into one parameterized SELECT
//
// Filters are collected as clause descriptors first, then rendered in a single
// pass which numbers the placeholders and picks WHERE for the first clause and
// AND for the rest.

use super::ParameterizedQuery;
use crate::error::{DataError, Result};
use crate::storage::Value;
use serde::{Deserialize, Serialize};

/// Row cap used when the caller does not give one
pub const DEFAULT_LIMIT: i64 = 10;

/// Properties joined with their reviews; every search starts from here
const BASE_QUERY: &str = "SELECT properties.*, avg(property_reviews.rating) AS average_rating\n\
FROM properties\n\
JOIN property_reviews ON properties.id = property_reviews.property_id";

const GROUP_BY: &str = "GROUP BY properties.id";
const ORDER_BY: &str = "ORDER BY cost_per_night";

/// Typed search criteria; `None` means "no constraint"
///
/// Prices are in whole currency units (dollars), the rating is an average
/// review score.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchCriteria {
    pub city: Option<String>,
    pub owner_id: Option<i64>,
    pub minimum_price_per_night: Option<f64>,
    pub maximum_price_per_night: Option<f64>,
    pub minimum_rating: Option<f64>,
}

impl SearchCriteria {
    pub fn city(mut self, city: impl Into<String>) -> Self {
        self.city = Some(city.into());
        self
    }

    pub fn owner(mut self, owner_id: i64) -> Self {
        self.owner_id = Some(owner_id);
        self
    }

    pub fn minimum_price(mut self, price: f64) -> Self {
        self.minimum_price_per_night = Some(price);
        self
    }

    pub fn maximum_price(mut self, price: f64) -> Self {
        self.maximum_price_per_night = Some(price);
        self
    }

    pub fn minimum_rating(mut self, rating: f64) -> Self {
        self.minimum_rating = Some(rating);
        self
    }

    /// True when no filter is set
    pub fn is_empty(&self) -> bool {
        *self == SearchCriteria::default()
    }
}

/// Search input exactly as it arrives from a form or query string
///
/// Every field is text; blank fields are treated as absent.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct SearchForm {
    pub city: Option<String>,
    pub owner_id: Option<String>,
    pub minimum_price_per_night: Option<String>,
    pub maximum_price_per_night: Option<String>,
    pub minimum_rating: Option<String>,
}

impl TryFrom<SearchForm> for SearchCriteria {
    type Error = DataError;

    fn try_from(form: SearchForm) -> Result<Self> {
        Ok(SearchCriteria {
            city: non_blank(form.city),
            owner_id: parse_field("owner_id", form.owner_id)?,
            minimum_price_per_night: parse_field(
                "minimum_price_per_night",
                form.minimum_price_per_night,
            )?,
            maximum_price_per_night: parse_field(
                "maximum_price_per_night",
                form.maximum_price_per_night,
            )?,
            minimum_rating: parse_field("minimum_rating", form.minimum_rating)?,
        })
    }
}

fn non_blank(raw: Option<String>) -> Option<String> {
    raw.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
}

fn parse_field<T: std::str::FromStr>(field: &'static str, raw: Option<String>) -> Result<Option<T>> {
    match non_blank(raw) {
        None => Ok(None),
        Some(text) => text
            .parse::<T>()
            .map(Some)
            .map_err(|_| DataError::invalid_filter(field, &text, "not a number")),
    }
}

/// One value-bearing condition of the WHERE clause
#[derive(Debug, Clone, PartialEq)]
enum Filter {
    City(String),
    Owner(i64),
    MinimumCost(i64),
    MaximumCost(i64),
}

impl Filter {
    fn condition(&self, ordinal: usize) -> String {
        match self {
            Filter::City(_) => format!("city LIKE ${}", ordinal),
            Filter::Owner(_) => format!("owner_id = ${}", ordinal),
            Filter::MinimumCost(_) => format!("cost_per_night >= ${}", ordinal),
            Filter::MaximumCost(_) => format!("cost_per_night <= ${}", ordinal),
        }
    }

    fn into_value(self) -> Value {
        match self {
            Filter::City(city) => Value::Text(format!("%{}%", city)),
            Filter::Owner(id) => Value::Integer(id),
            Filter::MinimumCost(cents) | Filter::MaximumCost(cents) => Value::Integer(cents),
        }
    }
}

/// A validated property search, ready to render
#[derive(Debug, Clone, PartialEq)]
pub struct PropertySearch {
    filters: Vec<Filter>,
    minimum_rating: Option<f64>,
    limit: i64,
}

impl PropertySearch {
    /// Validate the criteria and limit and lay out the clauses
    /// Filters are kept in a fixed order: city, owner, min price, max price
    pub fn new(criteria: &SearchCriteria, limit: i64) -> Result<Self> {
        if limit <= 0 {
            return Err(DataError::InvalidLimit(limit));
        }

        let mut filters = Vec::new();

        if let Some(city) = criteria.city.as_deref().map(str::trim).filter(|c| !c.is_empty()) {
            filters.push(Filter::City(city.to_string()));
        }
        if let Some(owner_id) = criteria.owner_id {
            filters.push(Filter::Owner(owner_id));
        }
        if let Some(price) = criteria.minimum_price_per_night {
            filters.push(Filter::MinimumCost(to_minor_units("minimum_price_per_night", price)?));
        }
        if let Some(price) = criteria.maximum_price_per_night {
            filters.push(Filter::MaximumCost(to_minor_units("maximum_price_per_night", price)?));
        }

        let minimum_rating = match criteria.minimum_rating {
            Some(rating) if !rating.is_finite() || rating < 0.0 => {
                return Err(DataError::invalid_filter(
                    "minimum_rating",
                    rating,
                    "must be a finite, non-negative number",
                ));
            }
            other => other,
        };

        Ok(Self {
            filters,
            minimum_rating,
            limit,
        })
    }

    /// Number of WHERE conditions this search will render
    pub fn condition_count(&self) -> usize {
        self.filters.len()
    }

    /// Render the query text and bind list
    pub fn build(self) -> ParameterizedQuery {
        let mut sql = String::from(BASE_QUERY);
        let mut params = Vec::with_capacity(self.filters.len() + 2);

        for (position, filter) in self.filters.into_iter().enumerate() {
            let keyword = if position == 0 { "WHERE" } else { "AND" };
            sql.push('\n');
            sql.push_str(keyword);
            sql.push(' ');
            sql.push_str(&filter.condition(params.len() + 1));
            params.push(filter.into_value());
        }

        sql.push('\n');
        sql.push_str(GROUP_BY);

        // The rating filters on the aggregate, so it can only go after grouping
        if let Some(rating) = self.minimum_rating {
            params.push(Value::Real(rating));
            sql.push_str(&format!("\nHAVING avg(property_reviews.rating) >= ${}", params.len()));
        }

        sql.push('\n');
        sql.push_str(ORDER_BY);

        params.push(Value::Integer(self.limit));
        sql.push_str(&format!("\nLIMIT ${}", params.len()));

        ParameterizedQuery { sql, params }
    }
}

/// Validate and render a property search in one step
pub fn build_search_query(criteria: &SearchCriteria, limit: i64) -> Result<ParameterizedQuery> {
    Ok(PropertySearch::new(criteria, limit)?.build())
}

/// Convert a price in currency units to integer cents, rounding to the nearest cent
pub fn to_minor_units(field: &'static str, price: f64) -> Result<i64> {
    if !price.is_finite() || price < 0.0 {
        return Err(DataError::invalid_filter(
            field,
            price,
            "must be a finite, non-negative number",
        ));
    }

    let cents = (price * 100.0).round();
    if cents >= i64::MAX as f64 {
        return Err(DataError::invalid_filter(field, price, "too large"));
    }

    Ok(cents as i64)
}
