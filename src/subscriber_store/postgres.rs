use anyhow::Context;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use super::{StoreError, SubscriberStore};
use crate::domain::{ConsentState, PhoneNumber, Subscriber, SubscriberName, SubscriberUpdate};

/// Name of the partial unique index over active phone numbers.
const ACTIVE_PHONE_INDEX: &str = "subscribers_active_phone_number_idx";

pub struct PostgresSubscriberStore {
    pg_pool: PgPool,
}

#[derive(sqlx::FromRow)]
struct SubscriberRow {
    id: Uuid,
    phone_number: String,
    full_name: String,
    opt_in_completed: bool,
    unsubscribed: bool,
    created_at: DateTime<Utc>,
}

impl TryFrom<SubscriberRow> for Subscriber {
    type Error = StoreError;

    fn try_from(row: SubscriberRow) -> Result<Self, Self::Error> {
        let phone_number = PhoneNumber::parse(&row.phone_number).map_err(StoreError::Corrupt)?;
        let full_name = SubscriberName::parse(&row.full_name).map_err(StoreError::Corrupt)?;
        let state = ConsentState::from_flags(row.opt_in_completed, row.unsubscribed)
            .map_err(StoreError::Corrupt)?;
        Ok(Subscriber {
            id: row.id,
            phone_number,
            full_name,
            state,
            created_at: row.created_at,
        })
    }
}

impl PostgresSubscriberStore {
    pub fn new(pg_pool: PgPool) -> Self {
        Self { pg_pool }
    }

    #[tracing::instrument(name = "Run subscriber migrations", skip(self))]
    pub async fn migrate(&self) -> anyhow::Result<()> {
        sqlx::migrate!("./migrations")
            .run(&self.pg_pool)
            .await
            .context("Failed to migrate the database.")
    }
}

fn is_active_phone_violation(e: &sqlx::Error) -> bool {
    match e {
        sqlx::Error::Database(db) => db.constraint() == Some(ACTIVE_PHONE_INDEX),
        _ => false,
    }
}

#[async_trait]
impl SubscriberStore for PostgresSubscriberStore {
    #[tracing::instrument(name = "Look up subscriber by phone number", skip(self))]
    async fn find_by_phone(&self, phone: &PhoneNumber) -> Result<Option<Subscriber>, StoreError> {
        let row = sqlx::query_as::<_, SubscriberRow>(
            r#"
            SELECT id, phone_number, full_name, opt_in_completed, unsubscribed, created_at
            FROM subscribers
            WHERE phone_number = $1
            ORDER BY created_at DESC
            LIMIT 1
            "#,
        )
        .bind(phone.as_ref())
        .fetch_optional(&self.pg_pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to execute query: {e:?}");
            e
        })
        .context("Failed to look up a subscriber by phone number.")?;
        row.map(Subscriber::try_from).transpose()
    }

    #[tracing::instrument(
        name = "Saving new subscriber details in the database",
        skip(self, subscriber),
        fields(phone_number = %subscriber.phone_number)
    )]
    async fn insert(&self, subscriber: &Subscriber) -> Result<(), StoreError> {
        let outcome = sqlx::query(
            r#"
            INSERT INTO subscribers
                (id, phone_number, full_name, opt_in_completed, unsubscribed, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(subscriber.id)
        .bind(subscriber.phone_number.as_ref())
        .bind(subscriber.full_name.as_ref())
        .bind(subscriber.opt_in_completed())
        .bind(subscriber.unsubscribed())
        .bind(subscriber.created_at)
        .execute(&self.pg_pool)
        .await;

        match outcome {
            Ok(_) => Ok(()),
            Err(e) if is_active_phone_violation(&e) => {
                Err(StoreError::Conflict(subscriber.phone_number.clone()))
            }
            Err(e) => {
                tracing::error!("Failed to execute query: {e:?}");
                Err(anyhow::Error::new(e)
                    .context("Failed to insert a new subscriber.")
                    .into())
            }
        }
    }

    #[tracing::instrument(name = "Update subscriber in the database", skip(self, update))]
    async fn update(
        &self,
        phone: &PhoneNumber,
        update: &SubscriberUpdate,
    ) -> Result<Subscriber, StoreError> {
        let full_name = update.full_name.as_ref().map(|n| n.as_ref().to_string());
        let opt_in_completed = update.state.map(ConsentState::opt_in_completed);
        let unsubscribed = update.state.map(ConsentState::unsubscribed);

        let row = sqlx::query_as::<_, SubscriberRow>(
            r#"
            UPDATE subscribers
            SET
                full_name = COALESCE($2, full_name),
                opt_in_completed = COALESCE($3, opt_in_completed),
                unsubscribed = COALESCE($4, unsubscribed)
            WHERE id = (
                SELECT id FROM subscribers
                WHERE phone_number = $1
                ORDER BY created_at DESC
                LIMIT 1
            )
            RETURNING id, phone_number, full_name, opt_in_completed, unsubscribed, created_at
            "#,
        )
        .bind(phone.as_ref())
        .bind(full_name)
        .bind(opt_in_completed)
        .bind(unsubscribed)
        .fetch_optional(&self.pg_pool)
        .await;

        match row {
            Ok(Some(row)) => Subscriber::try_from(row),
            Ok(None) => Err(StoreError::NotFound(phone.clone())),
            Err(e) if is_active_phone_violation(&e) => Err(StoreError::Conflict(phone.clone())),
            Err(e) => {
                tracing::error!("Failed to execute query: {e:?}");
                Err(anyhow::Error::new(e)
                    .context("Failed to update a subscriber.")
                    .into())
            }
        }
    }
}
