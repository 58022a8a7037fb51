use deadpool_redis::{redis::AsyncCommands, Pool};
use uuid::Uuid;

use crate::domain::{Conversation, DomainError};
use crate::infrastructure::queue::keys;

/// TTL-bounded conversation history in Redis. Deleting an entry is the
/// "clear chat" operation; absent entries just mean a fresh conversation.
#[derive(Clone)]
pub struct ConversationStore {
    pool: Pool,
    ttl_seconds: u64,
}

impl ConversationStore {
    pub fn new(pool: Pool, ttl_seconds: u64) -> Self {
        Self { pool, ttl_seconds }
    }

    async fn conn(&self) -> Result<deadpool_redis::Connection, DomainError> {
        self.pool
            .get()
            .await
            .map_err(|e| DomainError::external(e.to_string()))
    }

    pub async fn get(&self, id: Uuid) -> Result<Option<Conversation>, DomainError> {
        let mut conn = self.conn().await?;
        let raw: Option<String> = conn
            .get(keys::conversation(&id))
            .await
            .map_err(|e| DomainError::external(e.to_string()))?;

        raw.map(|json| {
            serde_json::from_str(&json).map_err(|e| DomainError::internal(e.to_string()))
        })
        .transpose()
    }

    pub async fn save(&self, conversation: &Conversation) -> Result<(), DomainError> {
        let json = serde_json::to_string(conversation)
            .map_err(|e| DomainError::internal(e.to_string()))?;

        let mut conn = self.conn().await?;
        conn.set_ex::<_, _, ()>(
            keys::conversation(&conversation.id),
            json,
            self.ttl_seconds,
        )
        .await
        .map_err(|e| DomainError::external(e.to_string()))
    }

    pub async fn delete(&self, id: Uuid) -> Result<(), DomainError> {
        let mut conn = self.conn().await?;
        conn.del::<_, ()>(keys::conversation(&id))
            .await
            .map_err(|e| DomainError::external(e.to_string()))
    }
}
