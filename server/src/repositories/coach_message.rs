//! CoachMessageRepository - Repository per la conversazione con il coach

use super::{Create, Read};
use crate::dtos::CreateCoachMessageDTO;
use crate::entities::CoachMessage;
use sqlx::{Error, SqlitePool};

pub struct CoachMessageRepository {
    connection_pool: SqlitePool,
}

impl CoachMessageRepository {
    pub fn new(connection_pool: SqlitePool) -> Self {
        Self { connection_pool }
    }

    /// Ultimi `limit` messaggi dell'utente, in ordine cronologico (dal più vecchio)
    pub async fn find_recent_by_user(
        &self,
        user_id: &i32,
        limit: i64,
    ) -> Result<Vec<CoachMessage>, Error> {
        let mut messages = sqlx::query_as::<_, CoachMessage>(
            r#"
            SELECT message_id, user_id, role, content, created_at
            FROM coach_messages
            WHERE user_id = ?
            ORDER BY created_at DESC, message_id DESC
            LIMIT ?
            "#,
        )
        .bind(user_id)
        .bind(limit)
        .fetch_all(&self.connection_pool)
        .await?;

        messages.reverse();
        Ok(messages)
    }
}

impl Create<CoachMessage, CreateCoachMessageDTO> for CoachMessageRepository {
    async fn create(&self, data: &CreateCoachMessageDTO) -> Result<CoachMessage, Error> {
        let result = sqlx::query(
            r#"
            INSERT INTO coach_messages (user_id, role, content, created_at)
            VALUES (?, ?, ?, ?)
            "#,
        )
        .bind(data.user_id)
        .bind(data.role)
        .bind(&data.content)
        .bind(data.created_at)
        .execute(&self.connection_pool)
        .await?;

        Ok(CoachMessage {
            message_id: result.last_insert_rowid() as i32,
            user_id: data.user_id,
            role: data.role,
            content: data.content.clone(),
            created_at: data.created_at,
        })
    }
}

impl Read<CoachMessage, i32> for CoachMessageRepository {
    async fn read(&self, id: &i32) -> Result<Option<CoachMessage>, Error> {
        sqlx::query_as::<_, CoachMessage>(
            r#"
            SELECT message_id, user_id, role, content, created_at
            FROM coach_messages
            WHERE message_id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(&self.connection_pool)
        .await
    }
}
