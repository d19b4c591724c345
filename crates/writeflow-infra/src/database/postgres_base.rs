use std::marker::PhantomData;

use async_trait::async_trait;
use sea_orm::{
    ActiveModelBehavior, ActiveModelTrait, DbConn, DbErr, EntityTrait, IntoActiveModel,
    PrimaryKeyTrait, SqlErr,
};

use writeflow_core::error::RepoError;
use writeflow_core::ports::BaseRepository;

/// Translate a SeaORM failure into a [`RepoError`].
///
/// Key violations become `Conflict` so handlers can answer 404/409 instead of 500.
pub(crate) fn map_db_err(err: DbErr) -> RepoError {
    match (err.sql_err(), err) {
        (Some(SqlErr::UniqueConstraintViolation(detail)), _) => {
            RepoError::Conflict(format!("duplicate key: {detail}"))
        }
        (Some(SqlErr::ForeignKeyConstraintViolation(detail)), _) => {
            RepoError::Conflict(format!("missing reference: {detail}"))
        }
        (_, DbErr::Conn(e)) => RepoError::Connection(e.to_string()),
        (_, DbErr::ConnectionAcquire(e)) => RepoError::Connection(e.to_string()),
        (_, other) => RepoError::Query(other.to_string()),
    }
}

/// `find_by_id`/`save`/`delete` for any entity whose model converts to and from a domain type.
pub struct PostgresBaseRepository<E>
where
    E: EntityTrait,
{
    pub(crate) db: DbConn,
    _entity: PhantomData<E>,
}

impl<E> PostgresBaseRepository<E>
where
    E: EntityTrait,
{
    pub fn new(db: DbConn) -> Self {
        Self {
            db,
            _entity: PhantomData,
        }
    }
}

#[async_trait]
impl<E, T, ID> BaseRepository<T, ID> for PostgresBaseRepository<E>
where
    E: EntityTrait,
    E::Model: IntoActiveModel<E::ActiveModel> + Sync + Send,
    E::ActiveModel: ActiveModelTrait<Entity = E> + ActiveModelBehavior + Clone + Send + Sync,
    E::PrimaryKey: PrimaryKeyTrait<ValueType = ID>,
    ID: Send + Sync + Into<sea_orm::Value> + Clone + Copy + 'static,
    T: From<E::Model> + Into<E::ActiveModel> + Send + Sync + 'static,
{
    async fn find_by_id(&self, id: ID) -> Result<Option<T>, RepoError> {
        let row = E::find_by_id(id).one(&self.db).await.map_err(map_db_err)?;
        Ok(row.map(T::from))
    }

    async fn save(&self, entity: T) -> Result<T, RepoError> {
        // ids are minted by the domain, so a missed update means a new row
        let row: E::ActiveModel = entity.into();
        let stored = match row.clone().update(&self.db).await {
            Err(DbErr::RecordNotUpdated) => row.insert(&self.db).await,
            updated => updated,
        }
        .map_err(map_db_err)?;

        Ok(T::from(stored))
    }

    async fn delete(&self, id: ID) -> Result<(), RepoError> {
        let deleted = E::delete_by_id(id).exec(&self.db).await.map_err(map_db_err)?;
        match deleted.rows_affected {
            0 => Err(RepoError::NotFound),
            _ => Ok(()),
        }
    }
}
