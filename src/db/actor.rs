use crate::config::StoreConfig;
use crate::db::models::DbLocalRecord;
use crate::db::patch::{DbPatchable, RecordCreate, RecordPatch};
use crate::db::schema::sqlite_init;
use crate::error::CrossDbError;
use chrono::Utc;
use crossdb_core::{UuidStorage, codec};
use ractor::{Actor, ActorProcessingErr, ActorRef, RpcReplyPort};
use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use std::{str::FromStr, time::Duration};
use tracing::info;

#[derive(Debug)]
pub enum DbActorMessage {
    /// Insert a record and return its id.
    Create(RecordCreate, RpcReplyPort<Result<i64, CrossDbError>>),

    /// Patch a record by id.
    Patch(RecordPatch, RpcReplyPort<Result<(), CrossDbError>>),

    /// Get a record by id.
    Get(i64, RpcReplyPort<Result<Option<DbLocalRecord>, CrossDbError>>),

    /// List all records ordered by id.
    List(RpcReplyPort<Result<Vec<DbLocalRecord>, CrossDbError>>),

    /// Delete a record by id; replies whether a row was removed.
    Delete(i64, RpcReplyPort<Result<bool, CrossDbError>>),
}

#[derive(Clone)]
pub struct DbActorHandle {
    actor: ActorRef<DbActorMessage>,
    uuid_storage: UuidStorage,
}

impl DbActorHandle {
    /// How this store persists reference columns.
    pub fn uuid_storage(&self) -> UuidStorage {
        self.uuid_storage
    }

    pub async fn create(&self, create: RecordCreate) -> Result<i64, CrossDbError> {
        ractor::call!(self.actor, DbActorMessage::Create, create)
            .map_err(|e| CrossDbError::RactorError(format!("DbActor Create RPC failed: {e}")))?
    }

    pub async fn patch(&self, patch: RecordPatch) -> Result<(), CrossDbError> {
        ractor::call!(self.actor, DbActorMessage::Patch, patch)
            .map_err(|e| CrossDbError::RactorError(format!("DbActor Patch RPC failed: {e}")))?
    }

    pub async fn get(&self, id: i64) -> Result<Option<DbLocalRecord>, CrossDbError> {
        ractor::call!(self.actor, DbActorMessage::Get, id)
            .map_err(|e| CrossDbError::RactorError(format!("DbActor Get RPC failed: {e}")))?
    }

    pub async fn list(&self) -> Result<Vec<DbLocalRecord>, CrossDbError> {
        ractor::call!(self.actor, DbActorMessage::List)
            .map_err(|e| CrossDbError::RactorError(format!("DbActor List RPC failed: {e}")))?
    }

    pub async fn delete(&self, id: i64) -> Result<bool, CrossDbError> {
        ractor::call!(self.actor, DbActorMessage::Delete, id)
            .map_err(|e| CrossDbError::RactorError(format!("DbActor Delete RPC failed: {e}")))?
    }
}

struct DbActorState {
    pool: SqlitePool,
    uuid_storage: UuidStorage,
}

struct DbActor;

#[ractor::async_trait]
impl Actor for DbActor {
    type Msg = DbActorMessage;
    type State = DbActorState;
    type Arguments = StoreConfig;

    async fn pre_start(
        &self,
        _myself: ActorRef<Self::Msg>,
        cfg: Self::Arguments,
    ) -> Result<Self::State, ActorProcessingErr> {
        let connect_opts = SqliteConnectOptions::from_str(cfg.database_url.as_str())
            .map_err(|e| ActorProcessingErr::from(format!("invalid database url: {e}")))?
            .create_if_missing(true)
            .busy_timeout(Duration::from_secs(5))
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal);

        let pool = SqlitePoolOptions::new()
            .max_connections(cfg.max_connections)
            .connect_with(connect_opts)
            .await
            .map_err(|e| ActorProcessingErr::from(format!("db connect failed: {e}")))?;

        apply_schema(&pool, cfg.uuid_storage)
            .await
            .map_err(|e| ActorProcessingErr::from(format!("db schema init failed: {e}")))?;

        info!(uuid_storage = ?cfg.uuid_storage, "DbActor initialized");
        Ok(DbActorState {
            pool,
            uuid_storage: cfg.uuid_storage,
        })
    }

    async fn handle(
        &self,
        _myself: ActorRef<Self::Msg>,
        message: Self::Msg,
        state: &mut Self::State,
    ) -> Result<(), ActorProcessingErr> {
        match message {
            DbActorMessage::Create(create, reply) => {
                let res = self.create_record(state, create).await;
                let _ = reply.send(res);
            }
            DbActorMessage::Patch(patch, reply) => {
                let res = patch.apply_patch(&state.pool, state.uuid_storage).await;
                let _ = reply.send(res);
            }
            DbActorMessage::Get(id, reply) => {
                let res = self.get_record(&state.pool, id).await;
                let _ = reply.send(res);
            }
            DbActorMessage::List(reply) => {
                let res = self.list_records(&state.pool).await;
                let _ = reply.send(res);
            }
            DbActorMessage::Delete(id, reply) => {
                let res = self.delete_record(&state.pool, id).await;
                let _ = reply.send(res);
            }
        }
        Ok(())
    }
}

impl DbActor {
    async fn create_record(
        &self,
        state: &DbActorState,
        create: RecordCreate,
    ) -> Result<i64, CrossDbError> {
        let now = Utc::now();
        let id: i64 = sqlx::query_scalar(
            r#"
        INSERT INTO local_records (label, reference, created_at, updated_at)
        VALUES (?, ?, ?, ?)
        RETURNING id
        "#,
        )
        .bind(create.label)
        .bind(codec::encode(create.reference, state.uuid_storage))
        .bind(now)
        .bind(now)
        .fetch_one(&state.pool)
        .await?;

        Ok(id)
    }

    async fn get_record(
        &self,
        pool: &SqlitePool,
        id: i64,
    ) -> Result<Option<DbLocalRecord>, CrossDbError> {
        let row = sqlx::query_as::<_, DbLocalRecord>(
            r#"
        SELECT id, label, reference, created_at, updated_at
        FROM local_records
        WHERE id = ?
        "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(row)
    }

    async fn list_records(&self, pool: &SqlitePool) -> Result<Vec<DbLocalRecord>, CrossDbError> {
        let rows = sqlx::query_as::<_, DbLocalRecord>(
            r#"
        SELECT id, label, reference, created_at, updated_at
        FROM local_records
        ORDER BY id
        "#,
        )
        .fetch_all(pool)
        .await?;

        Ok(rows)
    }

    async fn delete_record(&self, pool: &SqlitePool, id: i64) -> Result<bool, CrossDbError> {
        let res = sqlx::query("DELETE FROM local_records WHERE id = ?")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(res.rows_affected() > 0)
    }
}

/// Spawn the database actor and return a cloneable handle.
pub async fn spawn(cfg: &StoreConfig) -> DbActorHandle {
    let (actor, _jh) = ractor::Actor::spawn(None, DbActor, cfg.clone())
        .await
        .expect("failed to spawn DbActor");

    DbActorHandle {
        actor,
        uuid_storage: cfg.uuid_storage,
    }
}

async fn apply_schema(pool: &SqlitePool, storage: UuidStorage) -> Result<(), CrossDbError> {
    for stmt in sqlite_init(storage).split(';') {
        let s = stmt.trim();
        if s.is_empty() {
            continue;
        }
        sqlx::query(s).execute(pool).await?;
    }
    Ok(())
}
