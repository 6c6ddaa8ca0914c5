use std::future::Future;

use chrono::NaiveDate;
use uuid::Uuid;

use crate::error::AppError;
use crate::models::contracts;

/// Storage operations the contract pipeline needs.
///
/// Implementations only ever return active (not soft-deleted) contracts unless
/// a method says otherwise, so callers never filter on `is_active` themselves.
/// All calls made for one operation must share a single transaction.
pub trait ContractStore: Send {
    /// Serialise every writer booking on `date` until the transaction ends.
    fn lock_schedule(
        &mut self,
        date: NaiveDate,
    ) -> impl Future<Output = Result<(), AppError>> + Send;

    /// Active contract by id, locked for update.
    fn find_contract(
        &mut self,
        id: Uuid,
    ) -> impl Future<Output = Result<Option<contracts::Model>, AppError>> + Send;

    /// Soft-deleted contract by id, locked for update.
    fn find_deleted_contract(
        &mut self,
        id: Uuid,
    ) -> impl Future<Output = Result<Option<contracts::Model>, AppError>> + Send;

    /// Active contracts on `date` whose status occupies the time slot,
    /// excluding `exclude`.
    fn blocking_contracts_on(
        &mut self,
        date: NaiveDate,
        exclude: Option<Uuid>,
    ) -> impl Future<Output = Result<Vec<contracts::Model>, AppError>> + Send;

    /// Active, non-terminal contracts dated on or before `today`, locked for update.
    fn contracts_due_for_refresh(
        &mut self,
        today: NaiveDate,
    ) -> impl Future<Output = Result<Vec<contracts::Model>, AppError>> + Send;

    /// Next value of the counter for `prefix`, starting at 1.
    fn next_sequence(
        &mut self,
        prefix: &str,
    ) -> impl Future<Output = Result<u32, AppError>> + Send;

    fn client_is_active(
        &mut self,
        id: Uuid,
    ) -> impl Future<Output = Result<bool, AppError>> + Send;

    fn audio_equipment_exists(
        &mut self,
        id: Uuid,
    ) -> impl Future<Output = Result<bool, AppError>> + Send;

    fn catering_exists(
        &mut self,
        id: Uuid,
    ) -> impl Future<Output = Result<bool, AppError>> + Send;

    /// Ids from `ids` that do not name an active song request.
    fn missing_song_requests(
        &mut self,
        ids: &[Uuid],
    ) -> impl Future<Output = Result<Vec<Uuid>, AppError>> + Send;

    fn insert_contract(
        &mut self,
        contract: contracts::Model,
    ) -> impl Future<Output = Result<contracts::Model, AppError>> + Send;

    fn update_contract(
        &mut self,
        contract: contracts::Model,
    ) -> impl Future<Output = Result<contracts::Model, AppError>> + Send;

    fn song_request_ids(
        &mut self,
        contract_id: Uuid,
    ) -> impl Future<Output = Result<Vec<Uuid>, AppError>> + Send;

    fn replace_song_requests(
        &mut self,
        contract_id: Uuid,
        ids: &[Uuid],
    ) -> impl Future<Output = Result<(), AppError>> + Send;
}
