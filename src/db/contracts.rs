use std::collections::{HashMap, HashSet};

use chrono::{Datelike, NaiveDate, NaiveTime};
use sea_orm::sea_query::{OnConflict, Order};
use sea_orm::*;
use uuid::Uuid;

use super::sequences;
use crate::config::ScheduleConfig;
use crate::error::AppError;
use crate::models::contracts::{
    self, CancelContract, CompleteContract, ConfirmContract, ContractListQuery, ContractPage,
    ContractResponse, CreateContract, Status, UpdateContract,
};
use crate::models::{audio_equipment, catering, clients, contract_song_requests, song_requests};
use crate::service::ContractStore;
use crate::service::contracts::{self as pipeline, ScheduleReport};
use crate::service::statistics::ContractStatistics;

/// First key of the advisory lock pair; the second is the event date.
const SCHEDULE_LOCK_NAMESPACE: i32 = 0x4741_4744;

/// [`ContractStore`] backed by an open PostgreSQL transaction.
pub struct PgContractStore<'a> {
    txn: &'a DatabaseTransaction,
    reseed_sequences: bool,
}

impl<'a> PgContractStore<'a> {
    pub fn new(txn: &'a DatabaseTransaction) -> Self {
        Self {
            txn,
            reseed_sequences: false,
        }
    }

    /// Rescan issued numbers before reserving the next one.
    pub fn reseeding_sequences(mut self, reseed: bool) -> Self {
        self.reseed_sequences = reseed;
        self
    }
}

#[derive(Debug, FromQueryResult)]
struct AdvisoryLock {
    #[allow(dead_code)]
    held: i32,
}

impl ContractStore for PgContractStore<'_> {
    async fn lock_schedule(&mut self, date: NaiveDate) -> Result<(), AppError> {
        let stmt = Statement::from_sql_and_values(
            DbBackend::Postgres,
            "SELECT 1 AS held FROM (SELECT pg_advisory_xact_lock($1, $2)) AS l",
            [SCHEDULE_LOCK_NAMESPACE.into(), date.num_days_from_ce().into()],
        );
        AdvisoryLock::find_by_statement(stmt).one(self.txn).await?;
        Ok(())
    }

    async fn find_contract(&mut self, id: Uuid) -> Result<Option<contracts::Model>, AppError> {
        Ok(contracts::Entity::find_by_id(id)
            .filter(contracts::Column::IsActive.eq(true))
            .lock_exclusive()
            .one(self.txn)
            .await?)
    }

    async fn find_deleted_contract(
        &mut self,
        id: Uuid,
    ) -> Result<Option<contracts::Model>, AppError> {
        Ok(contracts::Entity::find_by_id(id)
            .filter(contracts::Column::IsActive.eq(false))
            .lock_exclusive()
            .one(self.txn)
            .await?)
    }

    async fn blocking_contracts_on(
        &mut self,
        date: NaiveDate,
        exclude: Option<Uuid>,
    ) -> Result<Vec<contracts::Model>, AppError> {
        let mut query = contracts::Entity::find()
            .filter(contracts::Column::EventDate.eq(date))
            .filter(contracts::Column::IsActive.eq(true))
            .filter(contracts::Column::Status.is_in(Status::blocking()));

        if let Some(id) = exclude {
            query = query.filter(contracts::Column::Id.ne(id));
        }

        Ok(query
            .order_by_asc(contracts::Column::StartTime)
            .all(self.txn)
            .await?)
    }

    async fn contracts_due_for_refresh(
        &mut self,
        today: NaiveDate,
    ) -> Result<Vec<contracts::Model>, AppError> {
        Ok(contracts::Entity::find()
            .filter(contracts::Column::IsActive.eq(true))
            .filter(contracts::Column::EventDate.lte(today))
            .filter(contracts::Column::Status.is_in(Status::blocking()))
            .lock_exclusive()
            .all(self.txn)
            .await?)
    }

    async fn next_sequence(&mut self, prefix: &str) -> Result<u32, AppError> {
        Ok(sequences::next_value(self.txn, prefix, self.reseed_sequences).await?)
    }

    async fn client_is_active(&mut self, id: Uuid) -> Result<bool, AppError> {
        let count = clients::Entity::find_by_id(id)
            .filter(clients::Column::IsActive.eq(true))
            .count(self.txn)
            .await?;
        Ok(count > 0)
    }

    async fn audio_equipment_exists(&mut self, id: Uuid) -> Result<bool, AppError> {
        let count = audio_equipment::Entity::find_by_id(id)
            .filter(audio_equipment::Column::IsActive.eq(true))
            .count(self.txn)
            .await?;
        Ok(count > 0)
    }

    async fn catering_exists(&mut self, id: Uuid) -> Result<bool, AppError> {
        let count = catering::Entity::find_by_id(id)
            .filter(catering::Column::IsActive.eq(true))
            .count(self.txn)
            .await?;
        Ok(count > 0)
    }

    async fn missing_song_requests(&mut self, ids: &[Uuid]) -> Result<Vec<Uuid>, AppError> {
        let found: HashSet<Uuid> = song_requests::Entity::find()
            .select_only()
            .column(song_requests::Column::Id)
            .filter(song_requests::Column::Id.is_in(ids.iter().copied()))
            .filter(song_requests::Column::IsActive.eq(true))
            .into_tuple::<Uuid>()
            .all(self.txn)
            .await?
            .into_iter()
            .collect();

        Ok(ids.iter().copied().filter(|id| !found.contains(id)).collect())
    }

    /// A taken contract number is reported as [`AppError::UniquenessRace`]
    /// without aborting the transaction.
    async fn insert_contract(
        &mut self,
        contract: contracts::Model,
    ) -> Result<contracts::Model, AppError> {
        let inserted = contracts::Entity::insert(to_active(contract.clone()))
            .on_conflict(
                OnConflict::column(contracts::Column::ContractNumber)
                    .do_nothing()
                    .to_owned(),
            )
            .exec_without_returning(self.txn)
            .await?;

        if inserted == 0 {
            return Err(AppError::UniquenessRace(format!(
                "contract number {} is already taken",
                contract.contract_number
            )));
        }
        Ok(contract)
    }

    async fn update_contract(
        &mut self,
        contract: contracts::Model,
    ) -> Result<contracts::Model, AppError> {
        Ok(to_active(contract).update(self.txn).await?)
    }

    async fn song_request_ids(&mut self, contract_id: Uuid) -> Result<Vec<Uuid>, AppError> {
        Ok(contract_song_requests::Entity::find()
            .select_only()
            .column(contract_song_requests::Column::SongRequestId)
            .filter(contract_song_requests::Column::ContractId.eq(contract_id))
            .into_tuple::<Uuid>()
            .all(self.txn)
            .await?)
    }

    async fn replace_song_requests(
        &mut self,
        contract_id: Uuid,
        ids: &[Uuid],
    ) -> Result<(), AppError> {
        contract_song_requests::Entity::delete_many()
            .filter(contract_song_requests::Column::ContractId.eq(contract_id))
            .exec(self.txn)
            .await?;

        if ids.is_empty() {
            return Ok(());
        }

        let links = ids
            .iter()
            .map(|&song_request_id| contract_song_requests::ActiveModel {
                contract_id: Set(contract_id),
                song_request_id: Set(song_request_id),
            });
        contract_song_requests::Entity::insert_many(links)
            .exec_without_returning(self.txn)
            .await?;
        Ok(())
    }
}

/// Every column marked `Set` so inserts and full-row updates write all of them.
fn to_active(model: contracts::Model) -> contracts::ActiveModel {
    contracts::ActiveModel {
        id: Set(model.id),
        contract_number: Set(model.contract_number),
        status: Set(model.status),
        title: Set(model.title),
        event_type: Set(model.event_type),
        celebrant_name: Set(model.celebrant_name),
        notes: Set(model.notes),
        event_date: Set(model.event_date),
        start_time: Set(model.start_time),
        end_time: Set(model.end_time),
        total_minutes: Set(model.total_minutes),
        break_count: Set(model.break_count),
        break_minutes: Set(model.break_minutes),
        break_description: Set(model.break_description),
        venue_name: Set(model.venue_name),
        venue_description: Set(model.venue_description),
        google_maps_url: Set(model.google_maps_url),
        hourly_rate: Set(model.hourly_rate),
        advance_payment: Set(model.advance_payment),
        extra_cost: Set(model.extra_cost),
        total_payment: Set(model.total_payment),
        remaining_payment: Set(model.remaining_payment),
        percentage_paid: Set(model.percentage_paid),
        client_id: Set(model.client_id),
        audience_size: Set(model.audience_size),
        audio_equipment_id: Set(model.audio_equipment_id),
        catering_id: Set(model.catering_id),
        is_active: Set(model.is_active),
        deleted_at: Set(model.deleted_at),
        created_at: Set(model.created_at),
        updated_at: Set(model.updated_at),
    }
}

// ── transactional entry points ──

/// Create a contract in its own transaction.
///
/// A taken contract number means another writer slipped past the counter
/// (e.g. a number issued outside this service). The whole operation is
/// retried once with the counter reseeded from the issued numbers before
/// giving up with a 409.
pub async fn create_contract(
    db: &DatabaseConnection,
    input: CreateContract,
    config: ScheduleConfig,
) -> Result<ContractResponse, AppError> {
    let mut attempt = 0;
    loop {
        attempt += 1;
        let input = input.clone();
        let now = config.local_now();
        let reseed = attempt > 1;

        let result = db
            .transaction::<_, ContractResponse, AppError>(move |txn| {
                Box::pin(async move {
                    let mut store = PgContractStore::new(txn).reseeding_sequences(reseed);
                    pipeline::create_contract(&mut store, input, &config, now).await
                })
            })
            .await
            .map_err(AppError::from);

        match result {
            Err(e) if e.is_retryable() && attempt < 2 => {
                tracing::warn!("Retrying contract creation after concurrent write: {e}");
            }
            other => return other,
        }
    }
}

pub async fn update_contract(
    db: &DatabaseConnection,
    id: Uuid,
    input: UpdateContract,
    config: ScheduleConfig,
) -> Result<ContractResponse, AppError> {
    let now = config.local_now();
    db.transaction::<_, ContractResponse, AppError>(move |txn| {
        Box::pin(async move {
            let mut store = PgContractStore::new(txn);
            pipeline::update_contract(&mut store, id, input, &config, now).await
        })
    })
    .await
    .map_err(AppError::from)
}

pub async fn confirm_contract(
    db: &DatabaseConnection,
    id: Uuid,
    input: ConfirmContract,
    config: ScheduleConfig,
) -> Result<ContractResponse, AppError> {
    let now = config.local_now();
    db.transaction::<_, ContractResponse, AppError>(move |txn| {
        Box::pin(async move {
            let mut store = PgContractStore::new(txn);
            pipeline::confirm_contract(&mut store, id, input, now).await
        })
    })
    .await
    .map_err(AppError::from)
}

pub async fn cancel_contract(
    db: &DatabaseConnection,
    id: Uuid,
    input: CancelContract,
    config: ScheduleConfig,
) -> Result<ContractResponse, AppError> {
    let now = config.local_now();
    db.transaction::<_, ContractResponse, AppError>(move |txn| {
        Box::pin(async move {
            let mut store = PgContractStore::new(txn);
            pipeline::cancel_contract(&mut store, id, input, now).await
        })
    })
    .await
    .map_err(AppError::from)
}

pub async fn start_contract(
    db: &DatabaseConnection,
    id: Uuid,
    config: ScheduleConfig,
) -> Result<ContractResponse, AppError> {
    let now = config.local_now();
    db.transaction::<_, ContractResponse, AppError>(move |txn| {
        Box::pin(async move {
            let mut store = PgContractStore::new(txn);
            pipeline::start_contract(&mut store, id, now).await
        })
    })
    .await
    .map_err(AppError::from)
}

pub async fn complete_contract(
    db: &DatabaseConnection,
    id: Uuid,
    input: CompleteContract,
    config: ScheduleConfig,
) -> Result<ContractResponse, AppError> {
    let now = config.local_now();
    db.transaction::<_, ContractResponse, AppError>(move |txn| {
        Box::pin(async move {
            let mut store = PgContractStore::new(txn);
            pipeline::complete_contract(&mut store, id, input, now).await
        })
    })
    .await
    .map_err(AppError::from)
}

pub async fn delete_contract(db: &DatabaseConnection, id: Uuid) -> Result<(), AppError> {
    db.transaction::<_, (), AppError>(move |txn| {
        Box::pin(async move {
            let mut store = PgContractStore::new(txn);
            pipeline::delete_contract(&mut store, id).await
        })
    })
    .await
    .map_err(AppError::from)
}

pub async fn restore_contract(
    db: &DatabaseConnection,
    id: Uuid,
    config: ScheduleConfig,
) -> Result<ContractResponse, AppError> {
    let now = config.local_now();
    db.transaction::<_, ContractResponse, AppError>(move |txn| {
        Box::pin(async move {
            let mut store = PgContractStore::new(txn);
            pipeline::restore_contract(&mut store, id, &config, now).await
        })
    })
    .await
    .map_err(AppError::from)
}

/// Advance overdue statuses; used by the background sweeper.
pub async fn refresh_statuses(
    db: &DatabaseConnection,
    config: ScheduleConfig,
) -> Result<usize, AppError> {
    let now = config.local_now();
    db.transaction::<_, usize, AppError>(move |txn| {
        Box::pin(async move {
            let mut store = PgContractStore::new(txn);
            pipeline::refresh_statuses(&mut store, now).await
        })
    })
    .await
    .map_err(AppError::from)
}

pub async fn get_contract(
    db: &DatabaseConnection,
    id: Uuid,
    config: ScheduleConfig,
) -> Result<ContractResponse, AppError> {
    let today = config.local_now().date();
    db.transaction::<_, ContractResponse, AppError>(move |txn| {
        Box::pin(async move {
            let mut store = PgContractStore::new(txn);
            pipeline::get_contract(&mut store, id, today).await
        })
    })
    .await
    .map_err(AppError::from)
}

/// Dry-run conflict check for an arbitrary window.
pub async fn validate_schedule(
    db: &DatabaseConnection,
    event_date: NaiveDate,
    start_time: NaiveTime,
    end_time: NaiveTime,
    exclude: Option<Uuid>,
    config: ScheduleConfig,
) -> Result<ScheduleReport, AppError> {
    db.transaction::<_, ScheduleReport, AppError>(move |txn| {
        Box::pin(async move {
            let mut store = PgContractStore::new(txn);
            pipeline::validate_schedule(
                &mut store, event_date, start_time, end_time, exclude, &config,
            )
            .await
        })
    })
    .await
    .map_err(AppError::from)
}

pub async fn validate_contract_schedule(
    db: &DatabaseConnection,
    id: Uuid,
    config: ScheduleConfig,
) -> Result<ScheduleReport, AppError> {
    db.transaction::<_, ScheduleReport, AppError>(move |txn| {
        Box::pin(async move {
            let mut store = PgContractStore::new(txn);
            pipeline::validate_contract_schedule(&mut store, id, &config).await
        })
    })
    .await
    .map_err(AppError::from)
}

// ── read models ──

/// Filtered, ordered, paginated listing of active contracts.
pub async fn list_contracts(
    db: &DatabaseConnection,
    query: &ContractListQuery,
    today: NaiveDate,
) -> Result<ContractPage, AppError> {
    let statuses = query.statuses().map_err(|name| {
        AppError::validation("status", format!("Unknown status: {name}"))
    })?;

    let mut select = contracts::Entity::find().filter(contracts::Column::IsActive.eq(true));

    if !statuses.is_empty() {
        select = select.filter(contracts::Column::Status.is_in(statuses));
    }
    if let Some(event_type) = query.event_type {
        select = select.filter(contracts::Column::EventType.eq(event_type));
    }
    if let Some(client_id) = query.client_id {
        select = select.filter(contracts::Column::ClientId.eq(client_id));
    }
    if let Some(from) = query.date_from {
        select = select.filter(contracts::Column::EventDate.gte(from));
    }
    if let Some(to) = query.date_to {
        select = select.filter(contracts::Column::EventDate.lte(to));
    }
    if let Some(term) = query.search.as_deref().map(str::trim).filter(|t| !t.is_empty()) {
        select = select.filter(
            Condition::any()
                .add(contracts::Column::ContractNumber.contains(term))
                .add(contracts::Column::Title.contains(term))
                .add(contracts::Column::CelebrantName.contains(term))
                .add(contracts::Column::VenueName.contains(term)),
        );
    }

    select = apply_ordering(select, query.ordering.as_deref())?;

    let limit = query.limit();
    let page = query.page();
    let paginator = select.paginate(db, limit);
    let totals = paginator.num_items_and_pages().await?;
    let rows = paginator.fetch_page(page - 1).await?;

    let items = with_song_requests(db, rows, today).await?;

    Ok(ContractPage {
        items,
        page,
        limit,
        total_items: totals.number_of_items,
        total_pages: totals.number_of_pages,
    })
}

/// Contracts still to be played from `today` on, soonest first.
pub async fn upcoming_contracts(
    db: &DatabaseConnection,
    today: NaiveDate,
) -> Result<Vec<ContractResponse>, AppError> {
    let rows = contracts::Entity::find()
        .filter(contracts::Column::IsActive.eq(true))
        .filter(contracts::Column::Status.is_in(Status::blocking()))
        .filter(contracts::Column::EventDate.gte(today))
        .order_by_asc(contracts::Column::EventDate)
        .order_by_asc(contracts::Column::StartTime)
        .all(db)
        .await?;

    with_song_requests(db, rows, today).await
}

pub async fn contract_statistics(
    db: &DatabaseConnection,
    today: NaiveDate,
) -> Result<ContractStatistics, AppError> {
    let rows = contracts::Entity::find()
        .filter(contracts::Column::IsActive.eq(true))
        .all(db)
        .await?;

    Ok(ContractStatistics::from_contracts(&rows, today))
}

/// `ordering` accepts a column name, prefixed with `-` for descending.
fn apply_ordering(
    select: Select<contracts::Entity>,
    ordering: Option<&str>,
) -> Result<Select<contracts::Entity>, AppError> {
    let Some(raw) = ordering.map(str::trim).filter(|o| !o.is_empty()) else {
        return Ok(select
            .order_by_asc(contracts::Column::EventDate)
            .order_by_asc(contracts::Column::StartTime));
    };

    let (name, order) = match raw.strip_prefix('-') {
        Some(name) => (name, Order::Desc),
        None => (raw, Order::Asc),
    };

    let column = match name {
        "event_date" => contracts::Column::EventDate,
        "start_time" => contracts::Column::StartTime,
        "created_at" => contracts::Column::CreatedAt,
        "contract_number" => contracts::Column::ContractNumber,
        "total_payment" => contracts::Column::TotalPayment,
        "status" => contracts::Column::Status,
        "title" => contracts::Column::Title,
        _ => {
            return Err(AppError::validation(
                "ordering",
                format!("Cannot order by {name}"),
            ));
        }
    };

    Ok(select
        .order_by(column, order)
        .order_by_asc(contracts::Column::Id))
}

/// Attach song request ids with a single query for the whole batch.
async fn with_song_requests(
    db: &DatabaseConnection,
    rows: Vec<contracts::Model>,
    today: NaiveDate,
) -> Result<Vec<ContractResponse>, AppError> {
    if rows.is_empty() {
        return Ok(Vec::new());
    }

    let ids: Vec<Uuid> = rows.iter().map(|c| c.id).collect();
    let links = contract_song_requests::Entity::find()
        .filter(contract_song_requests::Column::ContractId.is_in(ids))
        .all(db)
        .await?;

    let mut by_contract: HashMap<Uuid, Vec<Uuid>> = HashMap::new();
    for link in links {
        by_contract
            .entry(link.contract_id)
            .or_default()
            .push(link.song_request_id);
    }

    Ok(rows
        .into_iter()
        .map(|contract| {
            let songs = by_contract.remove(&contract.id).unwrap_or_default();
            ContractResponse::new(contract, songs, today)
        })
        .collect())
}
