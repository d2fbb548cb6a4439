use crate::domain::entities::actor::Actor;
use crate::domain::value_objects::ids::ActorId;
use crate::infrastructure::db::dto::actor::ActorRow;
use crate::infrastructure::db::stores::actor_store::{ActorRepositoryError, ActorStore};
use std::sync::Arc;

pub struct ActorRepository {
    store: Arc<dyn ActorStore>,
}

impl ActorRepository {
    pub fn new(store: Arc<dyn ActorStore>) -> Self {
        Self { store }
    }

    pub async fn get(&self, id: ActorId) -> Result<Option<Actor>, ActorRepositoryError> {
        let row = self.store.get(id.0).await?;
        Ok(row.map(ActorRow::into_actor))
    }

    pub async fn insert_tx(
        &self,
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        actor: &Actor,
    ) -> Result<(), ActorRepositoryError> {
        self.store.insert_tx(tx, ActorRow::from_actor(actor)).await
    }
}
