use crate::domain::entities::contract::Contract;
use crate::domain::value_objects::ids::ContractId;
use crate::infrastructure::db::dto::contract::ContractRow;
use crate::infrastructure::db::stores::contract_store::{ContractRepositoryError, ContractStore};
use std::sync::Arc;

pub struct ContractRepository {
    store: Arc<dyn ContractStore>,
}

impl ContractRepository {
    pub fn new(store: Arc<dyn ContractStore>) -> Self {
        Self { store }
    }

    pub async fn get(&self, id: ContractId) -> Result<Option<Contract>, ContractRepositoryError> {
        let row = self.store.get(id.0).await?;
        Ok(row.map(ContractRow::into_contract))
    }

    pub async fn get_tx(
        &self,
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        id: ContractId,
    ) -> Result<Option<Contract>, ContractRepositoryError> {
        let row = self.store.get_tx(tx, id.0).await?;
        Ok(row.map(ContractRow::into_contract))
    }

    pub async fn insert_tx(
        &self,
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        contract: &Contract,
    ) -> Result<(), ContractRepositoryError> {
        self.store
            .insert_tx(tx, ContractRow::from_contract(contract))
            .await
    }
}
