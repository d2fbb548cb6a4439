use crate::domain::entities::contract::{Contract, ContractStatus};
use crate::domain::value_objects::ids::{ActorId, ContractId};
use crate::domain::value_objects::money::Currency;
use crate::domain::value_objects::timestamps::Timestamp;
use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

#[derive(Debug, Clone, FromRow)]
pub struct ContractRow {
    pub id: Uuid,
    pub business_id: Uuid,
    pub contractor_id: Uuid,
    pub title: String,
    pub currency: String,
    pub status: String,
    pub created_at: OffsetDateTime,
}

impl ContractRow {
    pub fn from_contract(contract: &Contract) -> Self {
        Self {
            id: contract.id.0,
            business_id: contract.business_id.0,
            contractor_id: contract.contractor_id.0,
            title: contract.title.clone(),
            currency: contract.currency.as_str().to_string(),
            status: contract.status.as_str().to_string(),
            created_at: contract.created_at.into_inner(),
        }
    }

    pub fn into_contract(self) -> Contract {
        Contract {
            id: ContractId(self.id),
            business_id: ActorId(self.business_id),
            contractor_id: ActorId(self.contractor_id),
            title: self.title,
            currency: Currency::parse(&self.currency).unwrap_or(Currency::Usd),
            status: ContractStatus::parse(&self.status).unwrap_or(ContractStatus::Active),
            created_at: Timestamp::from(self.created_at),
        }
    }
}
