// Data access layer
// Builds each query, hands it to the runner and decodes the rows into records
//
// "Nothing found" and "the query failed" are distinct outcomes here: lookups
// return Ok(None) or an empty Vec when nothing matches, and failures are logged
// and returned as Err.

use crate::config::SearchConfig;
use crate::error::{DataError, Result};
use crate::models::{GuestReservation, NewProperty, NewUser, Property, User};
use crate::query::{statements, ParameterizedQuery, PropertySearch, QueryRunner, RowSet, SearchCriteria};

/// Typed access to users, reservations and listings over any query runner
pub struct Database<R> {
    runner: R,
    search: SearchConfig,
}

impl<R: QueryRunner> Database<R> {
    pub fn new(runner: R) -> Self {
        Self::with_search_config(runner, SearchConfig::default())
    }

    pub fn with_search_config(runner: R, search: SearchConfig) -> Self {
        Self { runner, search }
    }

    pub fn runner(&self) -> &R {
        &self.runner
    }

    /// Row cap used when callers pass no limit of their own
    pub fn default_limit(&self) -> i64 {
        self.search.default_limit
    }

    pub fn user_with_email(&self, email: &str) -> Result<Option<User>> {
        let rows = self.fetch("user_with_email", &statements::user_with_email(email))?;
        rows.first().map(|record| User::from_record(&record)).transpose()
    }

    pub fn user_with_id(&self, id: i64) -> Result<Option<User>> {
        let rows = self.fetch("user_with_id", &statements::user_with_id(id))?;
        rows.first().map(|record| User::from_record(&record)).transpose()
    }

    pub fn add_user(&self, user: &NewUser) -> Result<User> {
        let rows = self.fetch("add_user", &statements::add_user(user))?;
        let record = rows.first().ok_or(DataError::MissingRow("add_user"))?;
        let user = User::from_record(&record)?;
        tracing::info!(user_id = user.id, "user added");
        Ok(user)
    }

    pub fn reservations_for_guest(&self, guest_id: i64, limit: i64) -> Result<Vec<GuestReservation>> {
        let query = statements::reservations_for_guest(guest_id, self.clamp_limit(limit))?;
        let rows = self.fetch("reservations_for_guest", &query)?;
        rows.records()
            .map(|record| GuestReservation::from_record(&record))
            .collect()
    }

    /// Filtered listing search; see `PropertySearch` for how criteria map to SQL
    pub fn search_properties(&self, criteria: &SearchCriteria, limit: i64) -> Result<Vec<Property>> {
        let query = PropertySearch::new(criteria, self.clamp_limit(limit))
            .inspect_err(|e| tracing::debug!(error = %e, "search criteria rejected"))?
            .build();

        let rows = self.fetch("search_properties", &query)?;
        rows.records()
            .map(|record| Property::from_record(&record))
            .collect()
    }

    pub fn add_property(&self, property: &NewProperty) -> Result<Property> {
        let rows = self.fetch("add_property", &statements::add_property(property))?;
        let record = rows.first().ok_or(DataError::MissingRow("add_property"))?;
        let property = Property::from_record(&record)?;
        tracing::info!(property_id = property.id, owner_id = property.owner_id, "property added");
        Ok(property)
    }

    /// Caps a requested limit at the configured maximum; non-positive limits
    /// are left alone so the query builders reject them
    fn clamp_limit(&self, limit: i64) -> i64 {
        if limit > self.search.max_limit {
            tracing::debug!(requested = limit, max = self.search.max_limit, "limit clamped");
            self.search.max_limit
        } else {
            limit
        }
    }

    fn fetch(&self, operation: &'static str, query: &ParameterizedQuery) -> Result<RowSet> {
        tracing::debug!(operation, sql = %query.sql, params = query.params.len(), "running query");

        match self.runner.run(query) {
            Ok(rows) => {
                tracing::debug!(operation, rows = rows.len(), "query returned");
                Ok(rows)
            }
            Err(e) => {
                tracing::error!(operation, error = %e, "query error");
                Err(e)
            }
        }
    }
}
