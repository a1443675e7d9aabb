// Records exchanged with the data access layer
// Each record knows how to decode itself from a result row

use crate::error::Result;
use crate::query::Record;
use serde::{Deserialize, Serialize};

/// A registered user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub name: String,
    pub email: String,
    /// Stored password hash; never written to output
    #[serde(skip_serializing, default)]
    pub password: String,
}

impl User {
    pub fn from_record(record: &Record<'_>) -> Result<Self> {
        Ok(Self {
            id: record.i64("id")?,
            name: record.text("name")?,
            email: record.text("email")?,
            password: record.text("password")?,
        })
    }
}

/// A user that has not been stored yet
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password: String,
}

/// A property listing, with its average review score when the query computed one
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Property {
    pub id: i64,
    pub owner_id: i64,
    pub title: String,
    pub description: Option<String>,
    pub thumbnail_photo_url: Option<String>,
    pub cover_photo_url: Option<String>,
    /// Nightly price in cents
    pub cost_per_night: i64,
    pub parking_spaces: i64,
    pub number_of_bathrooms: i64,
    pub number_of_bedrooms: i64,
    pub country: String,
    pub street: String,
    pub city: String,
    pub province: String,
    pub post_code: String,
    pub active: bool,
    pub average_rating: Option<f64>,
}

impl Property {
    pub fn from_record(record: &Record<'_>) -> Result<Self> {
        // average_rating only exists on queries that join the reviews
        let average_rating = match record.get("average_rating") {
            Ok(_) => record.opt_f64("average_rating")?,
            Err(_) => None,
        };

        Ok(Self {
            id: record.i64("id")?,
            owner_id: record.i64("owner_id")?,
            title: record.text("title")?,
            description: record.opt_text("description")?,
            thumbnail_photo_url: record.opt_text("thumbnail_photo_url")?,
            cover_photo_url: record.opt_text("cover_photo_url")?,
            cost_per_night: record.i64("cost_per_night")?,
            parking_spaces: record.opt_i64("parking_spaces")?.unwrap_or(0),
            number_of_bathrooms: record.opt_i64("number_of_bathrooms")?.unwrap_or(0),
            number_of_bedrooms: record.opt_i64("number_of_bedrooms")?.unwrap_or(0),
            country: record.text("country")?,
            street: record.text("street")?,
            city: record.text("city")?,
            province: record.text("province")?,
            post_code: record.text("post_code")?,
            active: record.bool("active")?,
            average_rating,
        })
    }

    /// Nightly price in currency units, for display
    pub fn price_per_night(&self) -> f64 {
        self.cost_per_night as f64 / 100.0
    }
}

/// A listing that has not been stored yet
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct NewProperty {
    pub owner_id: i64,
    pub title: String,
    pub description: Option<String>,
    pub thumbnail_photo_url: Option<String>,
    pub cover_photo_url: Option<String>,
    /// Nightly price in cents
    pub cost_per_night: i64,
    pub parking_spaces: i64,
    pub number_of_bathrooms: i64,
    pub number_of_bedrooms: i64,
    pub country: String,
    pub street: String,
    pub city: String,
    pub province: String,
    pub post_code: String,
}

/// A reservation made by a guest, with the property it is for
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GuestReservation {
    pub id: i64,
    pub start_date: String,
    pub end_date: String,
    pub property: Property,
}

impl GuestReservation {
    pub fn from_record(record: &Record<'_>) -> Result<Self> {
        Ok(Self {
            id: record.i64("reservation_id")?,
            start_date: record.text("start_date")?,
            end_date: record.text("end_date")?,
            property: Property::from_record(record)?,
        })
    }
}
