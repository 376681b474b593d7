//! ModerationRepository - Repository per gli elementi da moderare

use super::{Create, Read, Update, contains_pattern};
use crate::dtos::{CreateModerationItemDTO, PaginationDTO, ReviewModerationDTO};
use crate::entities::{ModerationItem, ModerationKind, ModerationStatus};
use sqlx::{Error, QueryBuilder, Sqlite, SqlitePool};

const ITEM_COLUMNS: &str = "item_id, kind, status, subject, target_user_id, message_id, \
    admin_notes, reviewed_by, created_at, updated_at";

#[derive(Debug, Clone, Default)]
pub struct ModerationFilter {
    pub status: Option<ModerationStatus>,
    pub kind: Option<ModerationKind>,
    pub search: Option<String>,
    pub page: i64,
    pub limit: i64,
}

impl ModerationFilter {
    fn push_where<'a>(&self, qb: &mut QueryBuilder<'a, Sqlite>) {
        qb.push(" WHERE 1 = 1");
        if let Some(status) = self.status {
            qb.push(" AND status = ").push_bind(status);
        }
        if let Some(kind) = self.kind {
            qb.push(" AND kind = ").push_bind(kind);
        }
        if let Some(search) = &self.search {
            qb.push(" AND LOWER(subject) LIKE ")
                .push_bind(contains_pattern(search))
                .push(" ESCAPE '\\'");
        }
    }
}

pub struct ModerationRepository {
    connection_pool: SqlitePool,
}

impl ModerationRepository {
    pub fn new(connection_pool: SqlitePool) -> Self {
        Self { connection_pool }
    }

    /// Pagina di elementi, dal più recente, con il conteggio totale dei risultati filtrati
    pub async fn find_page(
        &self,
        filter: &ModerationFilter,
    ) -> Result<(Vec<ModerationItem>, i64), Error> {
        let mut count_qb = QueryBuilder::<Sqlite>::new("SELECT COUNT(*) FROM moderation_items");
        filter.push_where(&mut count_qb);
        let total = count_qb
            .build_query_scalar::<i64>()
            .fetch_one(&self.connection_pool)
            .await?;

        let mut qb =
            QueryBuilder::<Sqlite>::new(format!("SELECT {ITEM_COLUMNS} FROM moderation_items"));
        filter.push_where(&mut qb);
        qb.push(" ORDER BY created_at DESC, item_id DESC LIMIT ")
            .push_bind(filter.limit)
            .push(" OFFSET ")
            .push_bind(PaginationDTO::offset(filter.page, filter.limit));

        let items = qb
            .build_query_as::<ModerationItem>()
            .fetch_all(&self.connection_pool)
            .await?;

        Ok((items, total))
    }
}

impl Create<ModerationItem, CreateModerationItemDTO> for ModerationRepository {
    async fn create(&self, data: &CreateModerationItemDTO) -> Result<ModerationItem, Error> {
        sqlx::query(
            r#"
            INSERT INTO moderation_items
                (item_id, kind, status, subject, target_user_id, message_id, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&data.item_id)
        .bind(data.kind)
        .bind(ModerationStatus::Pending)
        .bind(&data.subject)
        .bind(data.target_user_id)
        .bind(data.message_id)
        .bind(data.created_at)
        .bind(data.created_at)
        .execute(&self.connection_pool)
        .await?;

        Ok(ModerationItem {
            item_id: data.item_id.clone(),
            kind: data.kind,
            status: ModerationStatus::Pending,
            subject: data.subject.clone(),
            target_user_id: data.target_user_id,
            message_id: data.message_id,
            admin_notes: None,
            reviewed_by: None,
            created_at: data.created_at,
            updated_at: data.created_at,
        })
    }
}

impl Read<ModerationItem, String> for ModerationRepository {
    async fn read(&self, id: &String) -> Result<Option<ModerationItem>, Error> {
        sqlx::query_as::<_, ModerationItem>(&format!(
            "SELECT {ITEM_COLUMNS} FROM moderation_items WHERE item_id = ?"
        ))
        .bind(id)
        .fetch_optional(&self.connection_pool)
        .await
    }
}

impl Update<ModerationItem, ReviewModerationDTO, String> for ModerationRepository {
    /// Registra la decisione solo se lo stato è ancora quello atteso.
    ///
    /// Se un altro amministratore ha cambiato lo stato nel frattempo, ritorna
    /// `RowNotFound` e nessun campo viene modificato.
    async fn update(
        &self,
        id: &String,
        data: &ReviewModerationDTO,
    ) -> Result<ModerationItem, Error> {
        let result = sqlx::query(
            r#"
            UPDATE moderation_items
            SET status = ?, admin_notes = ?, reviewed_by = ?, updated_at = ?
            WHERE item_id = ? AND status = ?
            "#,
        )
        .bind(data.status)
        .bind(&data.admin_notes)
        .bind(data.reviewed_by)
        .bind(data.reviewed_at)
        .bind(id)
        .bind(data.expected_status)
        .execute(&self.connection_pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(Error::RowNotFound);
        }

        self.read(id).await?.ok_or(Error::RowNotFound)
    }
}
