//! Sample data for development and the `test` profile.

use anyhow::{Context, Result};
use sqlx::{Sqlite, SqlitePool, Transaction};
use tracing::info;

use crate::auth::{Role, hash_password};

const CATEGORIES: &[&str] = &[
    "Informática",
    "Escritório",
    "Cama mesa e banho",
    "Eletrônicos",
    "Jardinagem",
    "Decoração",
    "Perfumaria",
];

/// Password of every seeded client.
pub const SEED_PASSWORD: &str = "123";

struct SeedAddress {
    street: &'static str,
    number: &'static str,
    complement: Option<&'static str>,
    district: &'static str,
    zip_code: &'static str,
    city: &'static str,
}

struct SeedClient {
    name: &'static str,
    email: &'static str,
    document: &'static str,
    roles: &'static [Role],
    phones: &'static [&'static str],
    addresses: &'static [SeedAddress],
}

const CLIENTS: &[SeedClient] = &[
    SeedClient {
        name: "Maria Silva",
        email: "maria@example.com",
        document: "36378912394",
        roles: &[Role::Customer],
        phones: &["27363323", "93838393"],
        addresses: &[
            SeedAddress {
                street: "Rua Flores",
                number: "300",
                complement: Some("Apto 303"),
                district: "Jardim",
                zip_code: "38220834",
                city: "Uberlândia",
            },
            SeedAddress {
                street: "Avenida Matos",
                number: "105",
                complement: Some("Sala 800"),
                district: "Centro",
                zip_code: "38777012",
                city: "São Paulo",
            },
        ],
    },
    SeedClient {
        name: "Ana Costa",
        email: "ana@example.com",
        document: "31628382740",
        roles: &[Role::Customer, Role::Admin],
        phones: &["93883321", "34252625"],
        addresses: &[SeedAddress {
            street: "Avenida Floriano",
            number: "2106",
            complement: None,
            district: "Centro",
            zip_code: "281777012",
            city: "São Paulo",
        }],
    },
];

/// Insert sample categories, locations and clients.
///
/// Does nothing and returns `false` when the database already holds categories.
pub async fn instantiate_test_database(pool: &SqlitePool) -> Result<bool> {
    let existing: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM categories")
        .fetch_one(pool)
        .await
        .context("Failed to count categories")?;
    if existing > 0 {
        info!("Database already contains data, skipping seed");
        return Ok(false);
    }

    let mut tx = pool.begin().await.context("Failed to begin seed transaction")?;

    for name in CATEGORIES {
        sqlx::query("INSERT INTO categories (name) VALUES (?)")
            .bind(*name)
            .execute(&mut *tx)
            .await
            .context("Failed to insert category")?;
    }

    let minas = insert_state(&mut tx, "Minas Gerais").await?;
    let sao_paulo = insert_state(&mut tx, "São Paulo").await?;
    insert_city(&mut tx, "Uberlândia", minas).await?;
    insert_city(&mut tx, "São Paulo", sao_paulo).await?;
    insert_city(&mut tx, "Campinas", sao_paulo).await?;

    let password_hash = hash_password(SEED_PASSWORD)?;
    for client in CLIENTS {
        insert_client(&mut tx, client, &password_hash).await?;
    }

    tx.commit().await.context("Failed to commit seed data")?;
    info!(
        categories = CATEGORIES.len(),
        clients = CLIENTS.len(),
        "Seeded sample data"
    );
    Ok(true)
}

async fn insert_state(tx: &mut Transaction<'_, Sqlite>, name: &str) -> Result<i64> {
    let result = sqlx::query("INSERT INTO states (name) VALUES (?)")
        .bind(name)
        .execute(&mut **tx)
        .await
        .context("Failed to insert state")?;
    Ok(result.last_insert_rowid())
}

async fn insert_city(tx: &mut Transaction<'_, Sqlite>, name: &str, state_id: i64) -> Result<i64> {
    let result = sqlx::query("INSERT INTO cities (name, state_id) VALUES (?, ?)")
        .bind(name)
        .bind(state_id)
        .execute(&mut **tx)
        .await
        .context("Failed to insert city")?;
    Ok(result.last_insert_rowid())
}

async fn insert_client(
    tx: &mut Transaction<'_, Sqlite>,
    client: &SeedClient,
    password_hash: &str,
) -> Result<()> {
    let client_id = sqlx::query(
        r#"
        INSERT INTO clients (name, email, document, kind, password_hash)
        VALUES (?, ?, ?, 1, ?)
        "#,
    )
    .bind(client.name)
    .bind(client.email)
    .bind(client.document)
    .bind(password_hash)
    .execute(&mut **tx)
    .await
    .context("Failed to insert client")?
    .last_insert_rowid();

    for role in client.roles {
        sqlx::query("INSERT INTO client_roles (client_id, role) VALUES (?, ?)")
            .bind(client_id)
            .bind(*role)
            .execute(&mut **tx)
            .await
            .context("Failed to insert client role")?;
    }

    for phone in client.phones {
        sqlx::query("INSERT INTO client_phones (client_id, phone) VALUES (?, ?)")
            .bind(client_id)
            .bind(*phone)
            .execute(&mut **tx)
            .await
            .context("Failed to insert client phone")?;
    }

    for address in client.addresses {
        sqlx::query(
            r#"
            INSERT INTO addresses (street, number, complement, district, zip_code, client_id, city_id)
            SELECT ?, ?, ?, ?, ?, ?, id FROM cities WHERE name = ? LIMIT 1
            "#,
        )
        .bind(address.street)
        .bind(address.number)
        .bind(address.complement)
        .bind(address.district)
        .bind(address.zip_code)
        .bind(client_id)
        .bind(address.city)
        .execute(&mut **tx)
        .await
        .context("Failed to insert address")?;
    }

    Ok(())
}
