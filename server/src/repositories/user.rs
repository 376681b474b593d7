//! UserRepository - Repository per la gestione degli utenti

use super::{Create, Read, Update, contains_pattern};
use crate::dtos::{CreateUserDTO, PaginationDTO, UpdateUserDTO, UserSortKey, SortOrder};
use crate::entities::{AccountStatus, SubscriptionTier, User, UserStats};
use sqlx::{Error, QueryBuilder, Sqlite, SqlitePool};

const USER_COLUMNS: &str =
    "user_id, name, email, tier, status, role, warnings_count, created_at";

/// Filtri della lista admin, già normalizzati dal service
#[derive(Debug, Clone, Default)]
pub struct UserFilter {
    pub search: Option<String>,
    pub tier: Option<SubscriptionTier>,
    pub status: Option<AccountStatus>,
    pub sort_by: UserSortKey,
    pub sort_order: SortOrder,
    pub page: i64,
    pub limit: i64,
}

impl UserFilter {
    fn push_where<'a>(&self, qb: &mut QueryBuilder<'a, Sqlite>) {
        qb.push(" WHERE 1 = 1");
        if let Some(tier) = self.tier {
            qb.push(" AND tier = ").push_bind(tier);
        }
        if let Some(status) = self.status {
            qb.push(" AND status = ").push_bind(status);
        }
        if let Some(search) = &self.search {
            let pattern = contains_pattern(search);
            qb.push(" AND (LOWER(name) LIKE ")
                .push_bind(pattern.clone())
                .push(" ESCAPE '\\' OR LOWER(email) LIKE ")
                .push_bind(pattern)
                .push(" ESCAPE '\\')");
        }
    }
}

// USER REPO
pub struct UserRepository {
    connection_pool: SqlitePool,
}

impl UserRepository {
    pub fn new(connection_pool: SqlitePool) -> UserRepository {
        Self { connection_pool }
    }

    /// Pagina filtrata e ordinata di utenti, con il conteggio totale dei risultati filtrati
    pub async fn find_page(&self, filter: &UserFilter) -> Result<(Vec<User>, i64), Error> {
        let mut count_qb = QueryBuilder::<Sqlite>::new("SELECT COUNT(*) FROM users");
        filter.push_where(&mut count_qb);
        let total = count_qb
            .build_query_scalar::<i64>()
            .fetch_one(&self.connection_pool)
            .await?;

        let mut qb = QueryBuilder::<Sqlite>::new(format!("SELECT {USER_COLUMNS} FROM users"));
        filter.push_where(&mut qb);
        let order = filter.sort_order.keyword();
        qb.push(format!(
            " ORDER BY {} {order}, user_id {order}",
            filter.sort_by.column()
        ));
        qb.push(" LIMIT ")
            .push_bind(filter.limit)
            .push(" OFFSET ")
            .push_bind(PaginationDTO::offset(filter.page, filter.limit));

        let users = qb
            .build_query_as::<User>()
            .fetch_all(&self.connection_pool)
            .await?;

        Ok((users, total))
    }

    /// Incrementa atomicamente il numero di ammonimenti ricevuti dall'utente
    pub async fn increment_warnings(&self, id: &i32) -> Result<User, Error> {
        let result =
            sqlx::query("UPDATE users SET warnings_count = warnings_count + 1 WHERE user_id = ?")
                .bind(id)
                .execute(&self.connection_pool)
                .await?;

        if result.rows_affected() == 0 {
            return Err(Error::RowNotFound);
        }

        self.read(id).await?.ok_or(Error::RowNotFound)
    }

    /// Contatori sull'intera base utenti, indipendenti dai filtri
    pub async fn stats(&self) -> Result<UserStats, Error> {
        sqlx::query_as::<_, UserStats>(
            r#"
            SELECT
                COUNT(*) AS total_users,
                COALESCE(SUM(CASE WHEN status = 'ACTIVE' THEN 1 ELSE 0 END), 0) AS active_users,
                COALESCE(SUM(CASE WHEN status = 'SUSPENDED' THEN 1 ELSE 0 END), 0) AS suspended_users,
                COALESCE(SUM(CASE WHEN status = 'LOCKED' THEN 1 ELSE 0 END), 0) AS locked_users,
                COALESCE(SUM(CASE WHEN tier = 'PRO' THEN 1 ELSE 0 END), 0) AS pro_users,
                COALESCE(SUM(CASE WHEN tier = 'ELITE' THEN 1 ELSE 0 END), 0) AS elite_users
            FROM users
            "#,
        )
        .fetch_one(&self.connection_pool)
        .await
    }
}

impl Create<User, CreateUserDTO> for UserRepository {
    async fn create(&self, data: &CreateUserDTO) -> Result<User, Error> {
        let result = sqlx::query(
            r#"
            INSERT INTO users (name, email, tier, status, role, warnings_count, created_at)
            VALUES (?, ?, ?, ?, ?, 0, ?)
            "#,
        )
        .bind(&data.name)
        .bind(&data.email)
        .bind(data.tier)
        .bind(data.status)
        .bind(data.role)
        .bind(data.created_at)
        .execute(&self.connection_pool)
        .await?;

        let new_id = result.last_insert_rowid() as i32;

        Ok(User {
            user_id: new_id,
            name: data.name.clone(),
            email: data.email.clone(),
            tier: data.tier,
            status: data.status,
            role: data.role,
            warnings_count: 0,
            created_at: data.created_at,
        })
    }
}

impl Read<User, i32> for UserRepository {
    async fn read(&self, id: &i32) -> Result<Option<User>, Error> {
        sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE user_id = ?"
        ))
        .bind(id)
        .fetch_optional(&self.connection_pool)
        .await
    }
}

impl Update<User, UpdateUserDTO, i32> for UserRepository {
    async fn update(&self, id: &i32, data: &UpdateUserDTO) -> Result<User, Error> {
        let current = self.read(id).await?.ok_or(Error::RowNotFound)?;

        let Some(status) = data.status else {
            return Ok(current);
        };

        sqlx::query("UPDATE users SET status = ? WHERE user_id = ?")
            .bind(status)
            .bind(id)
            .execute(&self.connection_pool)
            .await?;

        self.read(id).await?.ok_or(Error::RowNotFound)
    }
}
