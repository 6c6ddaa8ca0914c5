pub use sea_orm_migration::prelude::*;

mod m20250801_000001_create_reference_tables;
mod m20250801_000002_create_contracts_table;
mod m20250801_000003_create_contract_song_requests_table;
mod m20250801_000004_create_contract_sequences_table;
mod m20250801_000005_add_contract_indexes;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250801_000001_create_reference_tables::Migration),
            Box::new(m20250801_000002_create_contracts_table::Migration),
            Box::new(m20250801_000003_create_contract_song_requests_table::Migration),
            Box::new(m20250801_000004_create_contract_sequences_table::Migration),
            Box::new(m20250801_000005_add_contract_indexes::Migration),
        ]
    }
}
