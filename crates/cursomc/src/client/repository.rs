//! Client repository for database operations.

use anyhow::{Context, Result};
use async_trait::async_trait;
use sqlx::SqlitePool;
use std::collections::BTreeSet;
use tracing::{debug, instrument};

use super::models::{AddressRow, Client, ClientRow, ClientSummary, NewClient, PageSpec};
use crate::auth::{Account, AccountStore, Role};

/// Repository for client database operations.
#[derive(Debug, Clone)]
pub struct ClientRepository {
    pool: SqlitePool,
}

impl ClientRepository {
    /// Create a new client repository.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Insert a client with its phones, the `Customer` role and its first
    /// address in one transaction. Returns the new client ID.
    #[instrument(skip(self, client), fields(email = %client.email))]
    pub async fn insert(&self, client: &NewClient) -> Result<i64> {
        let mut tx = self.pool.begin().await.context("Failed to begin transaction")?;

        let id = sqlx::query(
            r#"
            INSERT INTO clients (name, email, document, kind, password_hash)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(&client.name)
        .bind(&client.email)
        .bind(&client.document)
        .bind(client.kind.code())
        .bind(&client.password_hash)
        .execute(&mut *tx)
        .await
        .context("Failed to insert client")?
        .last_insert_rowid();

        sqlx::query("INSERT INTO client_roles (client_id, role) VALUES (?, ?)")
            .bind(id)
            .bind(Role::Customer)
            .execute(&mut *tx)
            .await
            .context("Failed to insert client role")?;

        for phone in &client.phones {
            sqlx::query("INSERT INTO client_phones (client_id, phone) VALUES (?, ?)")
                .bind(id)
                .bind(phone)
                .execute(&mut *tx)
                .await
                .context("Failed to insert client phone")?;
        }

        let address = &client.address;
        sqlx::query(
            r#"
            INSERT INTO addresses (street, number, complement, district, zip_code, client_id, city_id)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&address.street)
        .bind(&address.number)
        .bind(&address.complement)
        .bind(&address.district)
        .bind(&address.zip_code)
        .bind(id)
        .bind(address.city_id)
        .execute(&mut *tx)
        .await
        .context("Failed to insert address")?;

        tx.commit().await.context("Failed to commit client")?;
        debug!("Inserted client {}", id);

        Ok(id)
    }

    /// Get a client with addresses, phones and roles by ID.
    #[instrument(skip(self))]
    pub async fn get(&self, id: i64) -> Result<Option<Client>> {
        let row = sqlx::query_as::<_, ClientRow>(
            "SELECT id, name, email, document, kind FROM clients WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to fetch client")?;

        match row {
            Some(row) => Ok(Some(self.load(row).await?)),
            None => Ok(None),
        }
    }

    /// Get a client with addresses, phones and roles by email.
    #[instrument(skip(self))]
    pub async fn get_by_email(&self, email: &str) -> Result<Option<Client>> {
        let row = sqlx::query_as::<_, ClientRow>(
            "SELECT id, name, email, document, kind FROM clients WHERE email = ?",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to fetch client by email")?;

        match row {
            Some(row) => Ok(Some(self.load(row).await?)),
            None => Ok(None),
        }
    }

    /// ID of the client registered under `email`, if any.
    #[instrument(skip(self))]
    pub async fn id_by_email(&self, email: &str) -> Result<Option<i64>> {
        sqlx::query_scalar("SELECT id FROM clients WHERE email = ?")
            .bind(email)
            .fetch_optional(&self.pool)
            .await
            .context("Failed to look up email")
    }

    async fn load(&self, row: ClientRow) -> Result<Client> {
        let phones: Vec<String> =
            sqlx::query_scalar("SELECT phone FROM client_phones WHERE client_id = ?")
                .bind(row.id)
                .fetch_all(&self.pool)
                .await
                .context("Failed to fetch client phones")?;

        let roles = self.roles(row.id).await?;

        let addresses = sqlx::query_as::<_, AddressRow>(
            r#"
            SELECT a.id, a.street, a.number, a.complement, a.district, a.zip_code,
                   c.id AS city_id, c.name AS city_name,
                   s.id AS state_id, s.name AS state_name
            FROM addresses a
            JOIN cities c ON c.id = a.city_id
            JOIN states s ON s.id = c.state_id
            WHERE a.client_id = ?
            ORDER BY a.id
            "#,
        )
        .bind(row.id)
        .fetch_all(&self.pool)
        .await
        .context("Failed to fetch client addresses")?;

        Ok(Client {
            id: row.id,
            name: row.name,
            email: row.email,
            document: row.document,
            kind: row.kind,
            phones: phones.into_iter().collect(),
            roles,
            addresses: addresses.into_iter().map(Into::into).collect(),
        })
    }

    async fn roles(&self, client_id: i64) -> Result<BTreeSet<Role>> {
        let roles: Vec<Role> =
            sqlx::query_scalar("SELECT role FROM client_roles WHERE client_id = ?")
                .bind(client_id)
                .fetch_all(&self.pool)
                .await
                .context("Failed to fetch client roles")?;
        Ok(roles.into_iter().collect())
    }

    /// List all clients.
    #[instrument(skip(self))]
    pub async fn list(&self) -> Result<Vec<ClientSummary>> {
        sqlx::query_as::<_, ClientSummary>("SELECT id, name, email FROM clients ORDER BY id")
            .fetch_all(&self.pool)
            .await
            .context("Failed to list clients")
    }

    /// One page of clients and the total client count.
    #[instrument(skip(self))]
    pub async fn page(&self, spec: &PageSpec) -> Result<(Vec<ClientSummary>, i64)> {
        // Column and direction come from closed enums, never from raw input.
        let sql = format!(
            "SELECT id, name, email FROM clients ORDER BY {} {}, id ASC LIMIT ? OFFSET ?",
            spec.order_by.column(),
            spec.direction.keyword()
        );

        let content = sqlx::query_as::<_, ClientSummary>(&sql)
            .bind(spec.size)
            .bind(spec.offset())
            .fetch_all(&self.pool)
            .await
            .context("Failed to fetch client page")?;

        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM clients")
            .fetch_one(&self.pool)
            .await
            .context("Failed to count clients")?;

        Ok((content, total))
    }

    /// Change a client's name and email. Returns false if the client does not exist.
    #[instrument(skip(self))]
    pub async fn update(&self, id: i64, name: &str, email: &str) -> Result<bool> {
        let result = sqlx::query(
            r#"
            UPDATE clients
            SET name = ?, email = ?, updated_at = datetime('now')
            WHERE id = ?
            "#,
        )
        .bind(name)
        .bind(email)
        .bind(id)
        .execute(&self.pool)
        .await
        .context("Failed to update client")?;

        Ok(result.rows_affected() > 0)
    }

    /// Delete a client. Returns false if the client does not exist.
    #[instrument(skip(self))]
    pub async fn delete(&self, id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM clients WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .context("Failed to delete client")?;

        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl AccountStore for ClientRepository {
    #[instrument(skip(self))]
    async fn find_account(&self, email: &str) -> Result<Option<Account>> {
        let row: Option<(i64, String, String)> =
            sqlx::query_as("SELECT id, email, password_hash FROM clients WHERE email = ?")
                .bind(email)
                .fetch_optional(&self.pool)
                .await
                .context("Failed to fetch account")?;

        let Some((id, email, password_hash)) = row else {
            return Ok(None);
        };

        Ok(Some(Account {
            id,
            email,
            password_hash,
            roles: self.roles(id).await?,
        }))
    }
}
