use diesel::prelude::*;
use diesel::result::Error as DieselError;
use diesel::sql_query;
use diesel::sql_types::{Integer, Nullable, Text};
use diesel_async::RunQueryDsl;
use diesel_async::pooled_connection::bb8::PooledConnection;

use super::StoreError;
use super::constraint::translate_write_error;
use crate::db::{DbPool, SqliteConn};
use crate::models::{Customer, CustomerFields};
use crate::schema::customer;

// Writes go through raw SQL so that missing values reach SQLite as NULL and
// are rejected by the table's NOT NULL constraints.
const INSERT_SQL: &str = "INSERT INTO customer (name, surname, email, birthdate) \
     VALUES (?, ?, ?, ?) \
     RETURNING id, name, surname, email, birthdate";

const UPDATE_SQL: &str = "UPDATE customer \
     SET name = ?, surname = ?, email = ?, birthdate = ? \
     WHERE id = ? \
     RETURNING id, name, surname, email, birthdate";

async fn checkout(pool: &DbPool) -> Result<PooledConnection<'_, SqliteConn>, StoreError> {
    pool.get()
        .await
        .map_err(|err| StoreError::Pool(err.to_string()))
}

#[tracing::instrument(name = "customer_store_create", skip_all)]
pub async fn create(pool: &DbPool, fields: &CustomerFields) -> Result<Customer, StoreError> {
    let mut conn = checkout(pool).await?;

    sql_query(INSERT_SQL)
        .bind::<Nullable<Text>, _>(fields.name.as_deref())
        .bind::<Nullable<Text>, _>(fields.surname.as_deref())
        .bind::<Nullable<Text>, _>(fields.email.as_deref())
        .bind::<Nullable<Text>, _>(fields.birthdate.as_deref())
        .get_result::<Customer>(&mut conn)
        .await
        .map_err(|err| translate_write_error(err, &fields.to_payload()))
}

#[tracing::instrument(name = "customer_store_find_all", skip_all)]
pub async fn find_all(pool: &DbPool) -> Result<Vec<Customer>, StoreError> {
    let mut conn = checkout(pool).await?;

    customer::table
        .order(customer::id.asc())
        .select(Customer::as_select())
        .load(&mut conn)
        .await
        .map_err(StoreError::Query)
}

#[tracing::instrument(name = "customer_store_find_by_id", skip(pool))]
pub async fn find_by_id(pool: &DbPool, id: i32) -> Result<Customer, StoreError> {
    let mut conn = checkout(pool).await?;

    customer::table
        .find(id)
        .select(Customer::as_select())
        .first(&mut conn)
        .await
        .optional()
        .map_err(StoreError::Query)?
        .ok_or(StoreError::NotFound(id))
}

/// Overwrites every column of an existing row.
#[tracing::instrument(name = "customer_store_replace", skip(pool, fields))]
pub async fn replace(
    pool: &DbPool,
    id: i32,
    fields: &CustomerFields,
) -> Result<Customer, StoreError> {
    let mut conn = checkout(pool).await?;

    sql_query(UPDATE_SQL)
        .bind::<Nullable<Text>, _>(fields.name.as_deref())
        .bind::<Nullable<Text>, _>(fields.surname.as_deref())
        .bind::<Nullable<Text>, _>(fields.email.as_deref())
        .bind::<Nullable<Text>, _>(fields.birthdate.as_deref())
        .bind::<Integer, _>(id)
        .get_result::<Customer>(&mut conn)
        .await
        .map_err(|err| match err {
            DieselError::NotFound => StoreError::NotFound(id),
            other => translate_write_error(other, &fields.to_payload()),
        })
}

#[tracing::instrument(name = "customer_store_delete", skip(pool))]
pub async fn delete(pool: &DbPool, id: i32) -> Result<(), StoreError> {
    let mut conn = checkout(pool).await?;

    let affected = diesel::delete(customer::table.find(id))
        .execute(&mut conn)
        .await
        .map_err(StoreError::Query)?;

    if affected == 0 {
        return Err(StoreError::NotFound(id));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_support::temp_pool;
    use crate::persistence::DomainError;

    fn fields(email: &str) -> CustomerFields {
        CustomerFields {
            name: Some("Ada".to_string()),
            surname: Some("Lovelace".to_string()),
            email: Some(email.to_string()),
            birthdate: Some("1815-12-10".to_string()),
        }
    }

    #[tokio::test]
    async fn test_create_assigns_increasing_ids() {
        let (pool, _dir) = temp_pool().await;

        let first = create(&pool, &fields("a@example.com")).await.unwrap();
        let second = create(&pool, &fields("b@example.com")).await.unwrap();

        assert!(first.id > 0);
        assert!(second.id > first.id);
        assert_eq!(first.email, "a@example.com");
    }

    #[tokio::test]
    async fn test_duplicate_email_is_a_unique_violation() {
        let (pool, _dir) = temp_pool().await;
        create(&pool, &fields("ada@example.com")).await.unwrap();

        let err = create(&pool, &fields("ada@example.com")).await.unwrap_err();
        match err {
            StoreError::Constraint(DomainError::UniqueViolation {
                entity,
                field,
                value,
            }) => {
                assert_eq!(entity, "customer");
                assert_eq!(field, "email");
                assert_eq!(value, "ada@example.com");
            }
            other => panic!("expected unique violation, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_null_column_is_a_not_null_violation() {
        let (pool, _dir) = temp_pool().await;
        let mut missing_name = fields("ada@example.com");
        missing_name.name = None;

        let err = create(&pool, &missing_name).await.unwrap_err();
        match err {
            StoreError::Constraint(DomainError::NotNullViolation { field }) => {
                assert_eq!(field, "name");
            }
            other => panic!("expected not-null violation, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_find_by_id_round_trip() {
        let (pool, _dir) = temp_pool().await;
        let created = create(&pool, &fields("ada@example.com")).await.unwrap();

        let found = find_by_id(&pool, created.id).await.unwrap();
        assert_eq!(found, created);
    }

    #[tokio::test]
    async fn test_find_by_id_missing() {
        let (pool, _dir) = temp_pool().await;
        assert!(matches!(
            find_by_id(&pool, 41).await,
            Err(StoreError::NotFound(41))
        ));
    }

    #[tokio::test]
    async fn test_find_all_orders_by_id() {
        let (pool, _dir) = temp_pool().await;
        let first = create(&pool, &fields("a@example.com")).await.unwrap();
        let second = create(&pool, &fields("b@example.com")).await.unwrap();

        assert_eq!(find_all(&pool).await.unwrap(), vec![first, second]);
    }

    #[tokio::test]
    async fn test_replace_overwrites_row() {
        let (pool, _dir) = temp_pool().await;
        let created = create(&pool, &fields("ada@example.com")).await.unwrap();

        let mut changes = fields("countess@example.com");
        changes.name = Some("Augusta".to_string());
        let replaced = replace(&pool, created.id, &changes).await.unwrap();

        assert_eq!(replaced.id, created.id);
        assert_eq!(replaced.name, "Augusta");
        assert_eq!(replaced.email, "countess@example.com");
        assert_eq!(find_by_id(&pool, created.id).await.unwrap(), replaced);
    }

    #[tokio::test]
    async fn test_replace_missing_row() {
        let (pool, _dir) = temp_pool().await;
        assert!(matches!(
            replace(&pool, 9, &fields("ada@example.com")).await,
            Err(StoreError::NotFound(9))
        ));
    }

    #[tokio::test]
    async fn test_replace_into_taken_email() {
        let (pool, _dir) = temp_pool().await;
        create(&pool, &fields("a@example.com")).await.unwrap();
        let second = create(&pool, &fields("b@example.com")).await.unwrap();

        let err = replace(&pool, second.id, &fields("a@example.com"))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            StoreError::Constraint(DomainError::UniqueViolation { .. })
        ));
    }

    #[tokio::test]
    async fn test_delete() {
        let (pool, _dir) = temp_pool().await;
        let created = create(&pool, &fields("ada@example.com")).await.unwrap();

        delete(&pool, created.id).await.unwrap();
        assert!(matches!(
            find_by_id(&pool, created.id).await,
            Err(StoreError::NotFound(_))
        ));
        assert!(matches!(
            delete(&pool, created.id).await,
            Err(StoreError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_concurrent_duplicate_creates_have_one_winner() {
        let (pool, _dir) = temp_pool().await;
        let payload = fields("race@example.com");

        let (first, second) = tokio::join!(create(&pool, &payload), create(&pool, &payload));
        let outcomes = [first, second];

        assert_eq!(outcomes.iter().filter(|outcome| outcome.is_ok()).count(), 1);
        assert!(outcomes.iter().any(|outcome| matches!(
            outcome,
            Err(StoreError::Constraint(DomainError::UniqueViolation { .. }))
        )));
    }
}
