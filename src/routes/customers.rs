use axum::{Extension, Json, Router, http::StatusCode, routing::get};
use serde_json::{Map, Value};

use crate::db::DbPool;
use crate::error_mapping::{FULL_WRITE_HANDLERS, PARTIAL_WRITE_HANDLERS, intercept};
use crate::errors::{AppError, AppResult};
use crate::extract::{CustomerId, JsonObject};
use crate::logging::{CustomerEvent, SanitizedEmail};
use crate::models::{Customer, CustomerFields};
use crate::persistence::customers as store;
use crate::validation::{self, Presence, messages, schema::CUSTOMER_RULES};

/// Customer routes, each also served with a trailing slash.
pub fn router() -> Router {
    let collection = get(list_customers).post(create_customer);
    let member = get(get_customer)
        .put(replace_customer)
        .patch(update_customer)
        .delete(delete_customer);

    Router::new()
        .route("/customers", collection.clone())
        .route("/customers/", collection)
        .route("/customers/:id", member.clone())
        .route("/customers/:id/", member)
}

/// Runs the customer rules over `payload`, failing with one message per
/// broken field.
fn validate_payload(payload: &Map<String, Value>, presence: Presence) -> AppResult<()> {
    let failures = validation::validate(payload, CUSTOMER_RULES, presence);
    if failures.is_empty() {
        return Ok(());
    }

    tracing::debug!(
        fields = ?failures.iter().map(|failure| failure.field).collect::<Vec<_>>(),
        "Customer payload failed validation"
    );
    Err(AppError::Validation(messages::aggregate(&failures)))
}

#[tracing::instrument(name = "list_customers", skip(pool))]
pub async fn list_customers(
    Extension(pool): Extension<DbPool>,
) -> AppResult<Json<Vec<Customer>>> {
    let customers = store::find_all(&pool).await?;
    Ok(Json(customers))
}

#[tracing::instrument(name = "create_customer", skip(pool, payload), fields(customer_id))]
pub async fn create_customer(
    Extension(pool): Extension<DbPool>,
    JsonObject(payload): JsonObject,
) -> AppResult<(StatusCode, Json<Customer>)> {
    validate_payload(&payload, Presence::Required)?;

    let fields = CustomerFields::from_payload(&payload);
    let result = store::create(&pool, &fields).await.map_err(AppError::from);
    let customer = intercept(result, FULL_WRITE_HANDLERS)?;

    tracing::Span::current().record("customer_id", customer.id);
    crate::log_customer_event!(
        CustomerEvent::Created,
        customer_id = customer.id,
        email = %SanitizedEmail::new(&customer.email),
        "Customer created"
    );

    Ok((StatusCode::CREATED, Json(customer)))
}

#[tracing::instrument(name = "get_customer", skip(pool))]
pub async fn get_customer(
    Extension(pool): Extension<DbPool>,
    CustomerId(id): CustomerId,
) -> AppResult<Json<Customer>> {
    let customer = store::find_by_id(&pool, id).await?;
    Ok(Json(customer))
}

#[tracing::instrument(name = "replace_customer", skip(pool, payload))]
pub async fn replace_customer(
    Extension(pool): Extension<DbPool>,
    CustomerId(id): CustomerId,
    JsonObject(payload): JsonObject,
) -> AppResult<Json<Customer>> {
    validate_payload(&payload, Presence::Required)?;

    let fields = CustomerFields::from_payload(&payload);
    let result = store::replace(&pool, id, &fields)
        .await
        .map_err(AppError::from);
    let customer = intercept(result, FULL_WRITE_HANDLERS)?;

    crate::log_customer_event!(
        CustomerEvent::Replaced,
        customer_id = customer.id,
        "Customer replaced"
    );

    Ok(Json(customer))
}

#[tracing::instrument(name = "update_customer", skip(pool, payload))]
pub async fn update_customer(
    Extension(pool): Extension<DbPool>,
    CustomerId(id): CustomerId,
    JsonObject(payload): JsonObject,
) -> AppResult<Json<Customer>> {
    validate_payload(&payload, Presence::Partial)?;

    let existing = store::find_by_id(&pool, id).await?;
    let fields = CustomerFields::merged_onto(&existing, &payload);
    if fields == CustomerFields::from(&existing) {
        tracing::debug!(customer_id = id, "Patch leaves customer unchanged");
        return Ok(Json(existing));
    }

    let result = store::replace(&pool, id, &fields)
        .await
        .map_err(AppError::from);
    let customer = intercept(result, PARTIAL_WRITE_HANDLERS)?;

    crate::log_customer_event!(
        CustomerEvent::Updated,
        customer_id = customer.id,
        changed = ?payload.keys().collect::<Vec<_>>(),
        "Customer updated"
    );

    Ok(Json(customer))
}

#[tracing::instrument(name = "delete_customer", skip(pool))]
pub async fn delete_customer(
    Extension(pool): Extension<DbPool>,
    CustomerId(id): CustomerId,
) -> AppResult<StatusCode> {
    store::delete(&pool, id).await?;

    crate::log_customer_event!(CustomerEvent::Deleted, customer_id = id, "Customer deleted");

    Ok(StatusCode::NO_CONTENT)
}
