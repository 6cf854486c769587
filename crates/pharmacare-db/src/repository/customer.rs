//! # Customer Repository
//!
//! Database operations for customer records.
//!
//! Phone and email are unique when present. Blank values are stored as NULL,
//! so any number of customers may leave their email empty.
//!
//! ## Delete Semantics
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  DELETE customer c-1                                                    │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  sales.customer_id = 'c-1'  →  NULL    (ON DELETE SET NULL)            │
//! │  sales.customer_name/phone/email       untouched (snapshots)           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use crate::repository::like_pattern;
use pharmacare_core::validation::{validate_new_customer, validate_search_query};
use pharmacare_core::{Customer, NewCustomer};

const CUSTOMER_COLUMNS: &str = "id, name, phone, email, address, created_at";

/// Repository for customer database operations.
#[derive(Debug, Clone)]
pub struct CustomerRepository {
    pool: SqlitePool,
}

impl CustomerRepository {
    /// Creates a new CustomerRepository.
    pub fn new(pool: SqlitePool) -> Self {
        CustomerRepository { pool }
    }

    /// Adds a customer.
    ///
    /// ## Errors
    /// * `DbError::Validation` - missing name or phone, malformed email
    /// * `DbError::UniqueViolation` - phone or email already on file;
    ///   `field` names which one
    pub async fn insert(&self, customer: &NewCustomer) -> DbResult<Customer> {
        let customer = customer.normalized();
        validate_new_customer(&customer)?;

        let id = Uuid::new_v4().to_string();
        let now = Utc::now();

        debug!(id = %id, name = %customer.name, "Inserting customer");

        let sql = format!(
            "INSERT INTO customers ({CUSTOMER_COLUMNS}) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6) \
             RETURNING {CUSTOMER_COLUMNS}"
        );

        sqlx::query_as::<_, Customer>(&sql)
            .bind(&id)
            .bind(&customer.name)
            .bind(&customer.phone)
            .bind(&customer.email)
            .bind(&customer.address)
            .bind(now)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| duplicate_with_value(e.into(), &customer))
    }

    /// Replaces every editable field of a customer.
    ///
    /// ## Errors
    /// * `DbError::NotFound` - no customer with this id
    /// * `DbError::UniqueViolation` - phone or email belongs to another customer
    pub async fn update(&self, id: &str, customer: &NewCustomer) -> DbResult<Customer> {
        let customer = customer.normalized();
        validate_new_customer(&customer)?;

        debug!(id = %id, name = %customer.name, "Updating customer");

        let sql = format!(
            "UPDATE customers SET name = ?2, phone = ?3, email = ?4, address = ?5 \
             WHERE id = ?1 \
             RETURNING {CUSTOMER_COLUMNS}"
        );

        let updated = sqlx::query_as::<_, Customer>(&sql)
            .bind(id)
            .bind(&customer.name)
            .bind(&customer.phone)
            .bind(&customer.email)
            .bind(&customer.address)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| duplicate_with_value(e.into(), &customer))?;

        updated.ok_or_else(|| DbError::not_found("Customer", id))
    }

    /// Deletes a customer. Their past sales lose the link but keep the
    /// recorded name, phone and email.
    pub async fn delete(&self, id: &str) -> DbResult<()> {
        debug!(id = %id, "Deleting customer");

        let result = sqlx::query("DELETE FROM customers WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Customer", id));
        }

        Ok(())
    }

    /// Gets a customer by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Customer>> {
        let sql = format!("SELECT {CUSTOMER_COLUMNS} FROM customers WHERE id = ?1");

        let customer = sqlx::query_as::<_, Customer>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(customer)
    }

    /// All customers ordered by name.
    pub async fn list_all(&self) -> DbResult<Vec<Customer>> {
        let sql = format!("SELECT {CUSTOMER_COLUMNS} FROM customers ORDER BY name, created_at");

        let customers = sqlx::query_as::<_, Customer>(&sql)
            .fetch_all(&self.pool)
            .await?;

        debug!(count = customers.len(), "Listed customers");
        Ok(customers)
    }

    /// Case-insensitive substring search over name and phone.
    pub async fn search(&self, query: &str) -> DbResult<Vec<Customer>> {
        let query = validate_search_query(query)?;

        debug!(query = %query, "Searching customers");

        if query.is_empty() {
            return self.list_all().await;
        }

        let sql = format!(
            "SELECT {CUSTOMER_COLUMNS} FROM customers \
             WHERE name LIKE ?1 ESCAPE '\\' OR phone LIKE ?1 ESCAPE '\\' \
             ORDER BY name, created_at"
        );

        let customers = sqlx::query_as::<_, Customer>(&sql)
            .bind(like_pattern(&query))
            .fetch_all(&self.pool)
            .await?;

        Ok(customers)
    }

    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM customers")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

fn duplicate_with_value(err: DbError, customer: &NewCustomer) -> DbError {
    err.with_duplicate_value(|field| match field {
        "phone" => customer.phone.clone(),
        "email" => customer.email.clone(),
        _ => None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{jane_smith, john_doe, test_db};
    use pharmacare_core::ValidationError;

    #[tokio::test]
    async fn test_insert_then_get_returns_same_fields() {
        let db = test_db().await;
        let repo = db.customers();

        let stored = repo.insert(&john_doe()).await.unwrap();
        let fetched = repo.get_by_id(&stored.id).await.unwrap().unwrap();

        assert_eq!(fetched, stored);
        assert_eq!(fetched.to_new(), john_doe());
    }

    #[tokio::test]
    async fn test_name_and_phone_required() {
        let db = test_db().await;
        let repo = db.customers();

        let mut no_phone = john_doe();
        no_phone.phone = Some("   ".to_string());
        assert!(matches!(
            repo.insert(&no_phone).await,
            Err(DbError::Validation(ValidationError::Required { ref field })) if field == "phone"
        ));

        let mut no_name = john_doe();
        no_name.name = String::new();
        assert!(matches!(repo.insert(&no_name).await, Err(DbError::Validation(_))));
    }

    #[tokio::test]
    async fn test_duplicate_phone_names_the_field() {
        let db = test_db().await;
        let repo = db.customers();
        repo.insert(&john_doe()).await.unwrap();

        let clash = NewCustomer::new("Johnny", "123-456-7890");
        match repo.insert(&clash).await {
            Err(DbError::UniqueViolation { field, value }) => {
                assert_eq!(field, "phone");
                assert_eq!(value, "123-456-7890");
            }
            other => panic!("expected UniqueViolation, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_duplicate_email_names_the_field() {
        let db = test_db().await;
        let repo = db.customers();
        repo.insert(&john_doe()).await.unwrap();

        let clash = NewCustomer::new("Other John", "555-0000").email("john@email.com");
        assert!(matches!(
            repo.insert(&clash).await,
            Err(DbError::UniqueViolation { ref field, .. }) if field == "email"
        ));
    }

    #[tokio::test]
    async fn test_blank_emails_never_collide() {
        let db = test_db().await;
        let repo = db.customers();

        let a = NewCustomer::new("A", "111").email("");
        let b = NewCustomer::new("B", "222").email("  ");
        let stored_a = repo.insert(&a).await.unwrap();
        repo.insert(&b).await.unwrap();

        assert_eq!(stored_a.email, None);
        assert_eq!(repo.count().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_update() {
        let db = test_db().await;
        let repo = db.customers();
        let john = repo.insert(&john_doe()).await.unwrap();
        let jane = repo.insert(&jane_smith()).await.unwrap();

        let moved = john_doe().address("456 Oak Ave");
        let updated = repo.update(&john.id, &moved).await.unwrap();
        assert_eq!(updated.address.as_deref(), Some("456 Oak Ave"));

        // taking Jane's phone fails and leaves John unchanged
        let stolen = NewCustomer::new("John Doe", "987-654-3210");
        assert!(matches!(
            repo.update(&john.id, &stolen).await,
            Err(DbError::UniqueViolation { ref field, .. }) if field == "phone"
        ));
        assert_eq!(
            repo.get_by_id(&john.id).await.unwrap().unwrap().phone,
            Some("123-456-7890".to_string())
        );
        assert!(repo.get_by_id(&jane.id).await.unwrap().is_some());

        assert!(matches!(
            repo.update("missing", &jane_smith()).await,
            Err(DbError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_delete_and_search() {
        let db = test_db().await;
        let repo = db.customers();
        let john = repo.insert(&john_doe()).await.unwrap();
        repo.insert(&jane_smith()).await.unwrap();

        assert_eq!(repo.search("jane").await.unwrap().len(), 1);
        assert_eq!(repo.search("456-78").await.unwrap().len(), 1);
        assert_eq!(repo.search("").await.unwrap().len(), 2);

        repo.delete(&john.id).await.unwrap();
        assert!(matches!(
            repo.delete(&john.id).await,
            Err(DbError::NotFound { .. })
        ));

        let names: Vec<String> = repo
            .list_all()
            .await
            .unwrap()
            .into_iter()
            .map(|c| c.name)
            .collect();
        assert_eq!(names, vec!["Jane Smith"]);
    }
}
