use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Join table between `contracts` and `song_requests`.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "contract_song_requests")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub contract_id: Uuid,
    #[sea_orm(primary_key, auto_increment = false)]
    pub song_request_id: Uuid,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::contracts::Entity",
        from = "Column::ContractId",
        to = "super::contracts::Column::Id"
    )]
    Contract,
    #[sea_orm(
        belongs_to = "super::song_requests::Entity",
        from = "Column::SongRequestId",
        to = "super::song_requests::Column::Id"
    )]
    SongRequest,
}

impl Related<super::contracts::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Contract.def()
    }
}

impl Related<super::song_requests::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::SongRequest.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
