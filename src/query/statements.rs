// Fixed-shape statements
// Queries whose text never changes; only their bind values do

use super::ParameterizedQuery;
use crate::error::{DataError, Result};
use crate::models::{NewProperty, NewUser};
use crate::storage::Value;

/// Columns written when a listing is added, in bind order
const PROPERTY_INSERT_COLUMNS: [&str; 14] = [
    "owner_id",
    "title",
    "description",
    "thumbnail_photo_url",
    "cover_photo_url",
    "cost_per_night",
    "parking_spaces",
    "number_of_bathrooms",
    "number_of_bedrooms",
    "country",
    "street",
    "city",
    "province",
    "post_code",
];

pub fn user_with_email(email: &str) -> ParameterizedQuery {
    ParameterizedQuery::new("SELECT * FROM users WHERE email = $1", vec![Value::from(email)])
}

pub fn user_with_id(id: i64) -> ParameterizedQuery {
    ParameterizedQuery::new("SELECT * FROM users WHERE id = $1", vec![Value::Integer(id)])
}

pub fn add_user(user: &NewUser) -> ParameterizedQuery {
    ParameterizedQuery::new(
        "INSERT INTO users (name, email, password) VALUES ($1, $2, $3) RETURNING *",
        vec![
            Value::from(user.name.as_str()),
            Value::from(user.email.as_str()),
            Value::from(user.password.as_str()),
        ],
    )
}

/// Reservations of one guest, each with its property and that property's average rating
pub fn reservations_for_guest(guest_id: i64, limit: i64) -> Result<ParameterizedQuery> {
    if limit <= 0 {
        return Err(DataError::InvalidLimit(limit));
    }

    Ok(ParameterizedQuery::new(
        "SELECT reservations.id AS reservation_id, reservations.start_date, reservations.end_date,\n\
         properties.*, avg(property_reviews.rating) AS average_rating\n\
         FROM reservations\n\
         JOIN properties ON reservations.property_id = properties.id\n\
         JOIN property_reviews ON properties.id = property_reviews.property_id\n\
         WHERE reservations.guest_id = $1\n\
         GROUP BY properties.id, reservations.id\n\
         ORDER BY reservations.start_date\n\
         LIMIT $2",
        vec![Value::Integer(guest_id), Value::Integer(limit)],
    ))
}

pub fn add_property(property: &NewProperty) -> ParameterizedQuery {
    let placeholders: Vec<String> = (1..=PROPERTY_INSERT_COLUMNS.len())
        .map(|ordinal| format!("${}", ordinal))
        .collect();

    let sql = format!(
        "INSERT INTO properties ({}) VALUES ({}) RETURNING *",
        PROPERTY_INSERT_COLUMNS.join(", "),
        placeholders.join(", ")
    );

    let params = vec![
        Value::Integer(property.owner_id),
        Value::from(property.title.as_str()),
        Value::from(property.description.clone()),
        Value::from(property.thumbnail_photo_url.clone()),
        Value::from(property.cover_photo_url.clone()),
        Value::Integer(property.cost_per_night),
        Value::Integer(property.parking_spaces),
        Value::Integer(property.number_of_bathrooms),
        Value::Integer(property.number_of_bedrooms),
        Value::from(property.country.as_str()),
        Value::from(property.street.as_str()),
        Value::from(property.city.as_str()),
        Value::from(property.province.as_str()),
        Value::from(property.post_code.as_str()),
    ];

    ParameterizedQuery::new(sql, params)
}
