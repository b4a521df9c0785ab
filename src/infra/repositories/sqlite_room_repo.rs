use crate::domain::{models::room::Room, ports::RoomRepository};
use crate::error::AppError;
use async_trait::async_trait;
use sqlx::SqlitePool;

pub struct SqliteRoomRepo {
    pool: SqlitePool,
}

impl SqliteRoomRepo {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RoomRepository for SqliteRoomRepo {
    async fn create(&self, room: &Room) -> Result<Room, AppError> {
        sqlx::query_as::<_, Room>(
            "INSERT INTO rooms (id, gym_id, name, capacity, layout_json, created_at) VALUES (?, ?, ?, ?, ?, ?) RETURNING *"
        )
            .bind(&room.id)
            .bind(&room.gym_id)
            .bind(&room.name)
            .bind(room.capacity)
            .bind(&room.layout_json)
            .bind(room.created_at)
            .fetch_one(&self.pool).await.map_err(AppError::Database)
    }

    async fn find_by_id(&self, gym_id: &str, id: &str) -> Result<Option<Room>, AppError> {
        sqlx::query_as::<_, Room>("SELECT * FROM rooms WHERE gym_id = ? AND id = ?")
            .bind(gym_id).bind(id)
            .fetch_optional(&self.pool).await.map_err(AppError::Database)
    }

    async fn list(&self, gym_id: &str) -> Result<Vec<Room>, AppError> {
        sqlx::query_as::<_, Room>("SELECT * FROM rooms WHERE gym_id = ? ORDER BY name ASC")
            .bind(gym_id)
            .fetch_all(&self.pool).await.map_err(AppError::Database)
    }
}
