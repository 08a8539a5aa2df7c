//! Drink persistence
//!
//! Every write runs in its own transaction that is rolled back on failure, so a
//! failed insert, update or delete leaves no partial change behind.

use std::str::FromStr;

use async_trait::async_trait;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};

use super::model::{Drink, DrinkChanges, Ingredient, NewDrink};

#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("drink {0} not found")]
    NotFound(i64),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("stored recipe is not valid JSON: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type RepositoryResult<T> = std::result::Result<T, RepositoryError>;

#[async_trait]
pub trait DrinkRepository: Send + Sync {
    async fn list(&self) -> RepositoryResult<Vec<Drink>>;
    async fn find(&self, id: i64) -> RepositoryResult<Option<Drink>>;
    async fn insert(&self, drink: &NewDrink) -> RepositoryResult<Drink>;
    async fn update(&self, id: i64, changes: &DrinkChanges) -> RepositoryResult<Drink>;
    async fn delete(&self, id: i64) -> RepositoryResult<()>;
}

#[derive(sqlx::FromRow)]
struct DrinkRow {
    id: i64,
    title: String,
    recipe: String,
}

impl TryFrom<DrinkRow> for Drink {
    type Error = RepositoryError;

    fn try_from(row: DrinkRow) -> RepositoryResult<Self> {
        let recipe: Vec<Ingredient> = serde_json::from_str(&row.recipe)?;
        Ok(Drink {
            id: row.id,
            title: row.title,
            recipe,
        })
    }
}

const CREATE_TABLE: &str = r#"
    CREATE TABLE IF NOT EXISTS drink (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        title VARCHAR(80) NOT NULL UNIQUE,
        recipe VARCHAR(180) NOT NULL
    )
"#;

/// SQLite implementation of [`DrinkRepository`]
#[derive(Debug, Clone)]
pub struct SqliteDrinkRepository {
    pool: SqlitePool,
}

impl SqliteDrinkRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Open a pool for `url`, creating the database file if needed
    pub async fn connect(url: &str, max_connections: u32) -> RepositoryResult<Self> {
        let options = SqliteConnectOptions::from_str(url)?.create_if_missing(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect_with(options)
            .await?;
        Ok(Self::new(pool))
    }

    /// Private in-memory database, kept alive on a single connection
    pub async fn in_memory() -> RepositoryResult<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect("sqlite::memory:")
            .await?;
        let repo = Self::new(pool);
        repo.init_schema().await?;
        Ok(repo)
    }

    pub async fn init_schema(&self) -> RepositoryResult<()> {
        sqlx::query(CREATE_TABLE).execute(&self.pool).await?;
        Ok(())
    }

    /// Drop and recreate the drink table
    pub async fn reset_schema(&self) -> RepositoryResult<()> {
        let mut tx = self.pool.begin().await?;
        sqlx::query("DROP TABLE IF EXISTS drink").execute(&mut *tx).await?;
        sqlx::query(CREATE_TABLE).execute(&mut *tx).await?;
        tx.commit().await?;
        tracing::info!("drink table recreated");
        Ok(())
    }

    async fn find_in<'e, E>(executor: E, id: i64) -> RepositoryResult<Option<Drink>>
    where
        E: sqlx::SqliteExecutor<'e>,
    {
        let row = sqlx::query_as::<_, DrinkRow>("SELECT id, title, recipe FROM drink WHERE id = ?")
            .bind(id)
            .fetch_optional(executor)
            .await?;
        row.map(Drink::try_from).transpose()
    }
}

#[async_trait]
impl DrinkRepository for SqliteDrinkRepository {
    async fn list(&self) -> RepositoryResult<Vec<Drink>> {
        let rows = sqlx::query_as::<_, DrinkRow>("SELECT id, title, recipe FROM drink ORDER BY id")
            .fetch_all(&self.pool)
            .await?;
        rows.into_iter().map(Drink::try_from).collect()
    }

    async fn find(&self, id: i64) -> RepositoryResult<Option<Drink>> {
        Self::find_in(&self.pool, id).await
    }

    async fn insert(&self, drink: &NewDrink) -> RepositoryResult<Drink> {
        let recipe = serde_json::to_string(&drink.recipe)?;
        let mut tx = self.pool.begin().await?;

        let inserted = sqlx::query("INSERT INTO drink (title, recipe) VALUES (?, ?)")
            .bind(&drink.title)
            .bind(&recipe)
            .execute(&mut *tx)
            .await;

        match inserted {
            Ok(result) => {
                tx.commit().await?;
                Ok(Drink {
                    id: result.last_insert_rowid(),
                    title: drink.title.clone(),
                    recipe: drink.recipe.clone(),
                })
            }
            Err(e) => {
                tx.rollback().await?;
                Err(e.into())
            }
        }
    }

    async fn update(&self, id: i64, changes: &DrinkChanges) -> RepositoryResult<Drink> {
        let mut tx = self.pool.begin().await?;

        let Some(mut drink) = Self::find_in(&mut *tx, id).await? else {
            tx.rollback().await?;
            return Err(RepositoryError::NotFound(id));
        };

        if let Some(title) = &changes.title {
            drink.title = title.clone();
        }
        if let Some(recipe) = &changes.recipe {
            drink.recipe = recipe.clone();
        }
        let recipe = serde_json::to_string(&drink.recipe)?;

        let updated = sqlx::query("UPDATE drink SET title = ?, recipe = ? WHERE id = ?")
            .bind(&drink.title)
            .bind(&recipe)
            .bind(id)
            .execute(&mut *tx)
            .await;

        match updated {
            Ok(_) => {
                tx.commit().await?;
                Ok(drink)
            }
            Err(e) => {
                tx.rollback().await?;
                Err(e.into())
            }
        }
    }

    async fn delete(&self, id: i64) -> RepositoryResult<()> {
        let mut tx = self.pool.begin().await?;

        let deleted = sqlx::query("DELETE FROM drink WHERE id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await;

        match deleted {
            Ok(result) if result.rows_affected() == 0 => {
                tx.rollback().await?;
                Err(RepositoryError::NotFound(id))
            }
            Ok(_) => {
                tx.commit().await?;
                Ok(())
            }
            Err(e) => {
                tx.rollback().await?;
                Err(e.into())
            }
        }
    }
}
