use sea_orm::entity::prelude::*;

/// Per-prefix counter row backing contract number generation.
///
/// Rows are only read under `SELECT ... FOR UPDATE` inside the transaction that
/// inserts the contract, so two creators never observe the same `last_value`.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "contract_sequences")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub prefix: String,
    pub last_value: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
