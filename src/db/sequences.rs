use sea_orm::sea_query::{Expr, OnConflict};
use sea_orm::*;

use crate::engine::numbering;
use crate::models::{contract_sequences, contracts};

/// Reserve the next number for `prefix` inside `txn`.
///
/// The counter row is locked `FOR UPDATE` so concurrent creators queue behind
/// each other until their transactions finish. Issued numbers are only scanned
/// when the row is created, or when `reseed` is set after a number collided
/// with one written outside the counter.
pub async fn next_value(
    txn: &DatabaseTransaction,
    prefix: &str,
    reseed: bool,
) -> Result<u32, DbErr> {
    let last = match locked_counter(txn, prefix).await? {
        Some(counter) if !reseed => to_sequence(prefix, counter.last_value)?,
        Some(counter) => {
            let issued = highest_issued(txn, prefix).await?;
            Ord::max(to_sequence(prefix, counter.last_value)?, issued)
        }
        None => {
            let seed = highest_issued(txn, prefix).await?;
            let row = contract_sequences::ActiveModel {
                prefix: Set(prefix.to_string()),
                last_value: Set(to_column(seed)?),
            };
            contract_sequences::Entity::insert(row)
                .on_conflict(
                    OnConflict::column(contract_sequences::Column::Prefix)
                        .do_nothing()
                        .to_owned(),
                )
                .exec_without_returning(txn)
                .await?;

            // Another creator may have inserted the row first.
            let counter = locked_counter(txn, prefix)
                .await?
                .ok_or_else(|| DbErr::RecordNotFound(format!("Sequence {prefix} not found")))?;
            Ord::max(to_sequence(prefix, counter.last_value)?, seed)
        }
    };

    let next = last
        .checked_add(1)
        .ok_or_else(|| DbErr::Custom(format!("Sequence {prefix} is exhausted")))?;

    contract_sequences::Entity::update_many()
        .col_expr(
            contract_sequences::Column::LastValue,
            Expr::value(to_column(next)?),
        )
        .filter(contract_sequences::Column::Prefix.eq(prefix))
        .exec(txn)
        .await?;

    Ok(next)
}

async fn locked_counter(
    txn: &DatabaseTransaction,
    prefix: &str,
) -> Result<Option<contract_sequences::Model>, DbErr> {
    contract_sequences::Entity::find_by_id(prefix.to_string())
        .lock_exclusive()
        .one(txn)
        .await
}

/// Highest suffix ever issued under `prefix`, soft-deleted contracts included.
async fn highest_issued(txn: &DatabaseTransaction, prefix: &str) -> Result<u32, DbErr> {
    let issued: Vec<String> = contracts::Entity::find()
        .select_only()
        .column(contracts::Column::ContractNumber)
        .filter(contracts::Column::ContractNumber.starts_with(format!("{prefix}-")))
        .into_tuple()
        .all(txn)
        .await?;
    Ok(numbering::highest_sequence(prefix, issued.iter().map(String::as_str)))
}

fn to_sequence(prefix: &str, value: i32) -> Result<u32, DbErr> {
    u32::try_from(value).map_err(|_| DbErr::Custom(format!("Sequence {prefix} is negative")))
}

fn to_column(value: u32) -> Result<i32, DbErr> {
    i32::try_from(value).map_err(|_| DbErr::Custom(format!("Sequence value {value} overflows")))
}
