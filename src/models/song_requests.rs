use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// SeaORM entity for the `song_requests` table (client song-request intake).
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "song_requests")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub title: String,
    pub artist: Option<String>,
    pub is_active: bool,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::contract_song_requests::Entity")]
    ContractLinks,
}

impl Related<super::contract_song_requests::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ContractLinks.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
