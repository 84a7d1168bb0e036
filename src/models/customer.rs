use diesel::prelude::*;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::schema::customer;

/// A stored customer row, as returned to clients.
#[derive(Debug, Clone, PartialEq, Eq, Queryable, QueryableByName, Selectable, Serialize)]
#[diesel(table_name = customer)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct Customer {
    pub id: i32,
    pub name: String,
    pub surname: String,
    pub email: String,
    pub birthdate: String,
}

/// Column values for an insert or a full-row update.
///
/// `None` is written as SQL `NULL`, leaving the table's `NOT NULL`
/// constraints to reject it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CustomerFields {
    pub name: Option<String>,
    pub surname: Option<String>,
    pub email: Option<String>,
    pub birthdate: Option<String>,
}

impl CustomerFields {
    /// Takes every column from `payload`. Absent, `null` and non-string values
    /// all become `None`.
    pub fn from_payload(payload: &Map<String, Value>) -> Self {
        Self {
            name: text(payload, "name"),
            surname: text(payload, "surname"),
            email: text(payload, "email"),
            birthdate: text(payload, "birthdate"),
        }
    }

    /// Applies a partial payload on top of a stored row. Absent keys keep the
    /// stored value; keys present with `null` clear it.
    pub fn merged_onto(existing: &Customer, payload: &Map<String, Value>) -> Self {
        Self {
            name: merged(payload, "name", &existing.name),
            surname: merged(payload, "surname", &existing.surname),
            email: merged(payload, "email", &existing.email),
            birthdate: merged(payload, "birthdate", &existing.birthdate),
        }
    }

    /// The values about to be written, keyed by column name.
    pub fn to_payload(&self) -> Map<String, Value> {
        [
            ("name", &self.name),
            ("surname", &self.surname),
            ("email", &self.email),
            ("birthdate", &self.birthdate),
        ]
        .into_iter()
        .map(|(column, value)| {
            let value = value.clone().map_or(Value::Null, Value::String);
            (column.to_owned(), value)
        })
        .collect()
    }
}

impl From<&Customer> for CustomerFields {
    fn from(customer: &Customer) -> Self {
        Self {
            name: Some(customer.name.clone()),
            surname: Some(customer.surname.clone()),
            email: Some(customer.email.clone()),
            birthdate: Some(customer.birthdate.clone()),
        }
    }
}

fn text(payload: &Map<String, Value>, key: &str) -> Option<String> {
    payload.get(key).and_then(Value::as_str).map(str::to_owned)
}

fn merged(payload: &Map<String, Value>, key: &str, current: &str) -> Option<String> {
    match payload.get(key) {
        None => Some(current.to_owned()),
        Some(value) => value.as_str().map(str::to_owned),
    }
}
