use chrono::{NaiveDate, NaiveDateTime, NaiveTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use uuid::Uuid;

use super::ContractStore;
use crate::config::ScheduleConfig;
use crate::engine::conflict::{self, BookedSlot, ScheduleConflict};
use crate::engine::duration::EventWindow;
use crate::engine::finance::PaymentTerms;
use crate::engine::numbering;
use crate::engine::status::Transition;
use crate::error::AppError;
use crate::models::contracts::{
    self, CancelContract, CompleteContract, ConfirmContract, ContractResponse, CreateContract,
    Status, UpdateContract,
};

const MAX_BREAKS: i32 = 10;
const MAX_BREAK_MINUTES: i32 = 120;

/// Result of a dry-run schedule check.
#[derive(Debug, Clone, Serialize)]
pub struct ScheduleReport {
    pub has_conflicts: bool,
    pub total_minutes: i32,
    pub conflicts: Vec<ScheduleConflict>,
}

/// Create a contract: validate, derive every computed field, number it, persist.
pub async fn create_contract<S: ContractStore>(
    store: &mut S,
    input: CreateContract,
    config: &ScheduleConfig,
    now: NaiveDateTime,
) -> Result<ContractResponse, AppError> {
    let song_request_ids = dedup(input.song_request_ids.clone());
    let stamp = Utc::now();

    let mut draft = contracts::Model {
        id: Uuid::new_v4(),
        contract_number: String::new(),
        status: Status::Pending,
        title: input.title.trim().to_string(),
        event_type: input.event_type,
        celebrant_name: input.celebrant_name,
        notes: input.notes,
        event_date: input.event_date,
        start_time: input.start_time,
        end_time: input.end_time,
        total_minutes: 0,
        break_count: input.break_count,
        break_minutes: input.break_minutes,
        break_description: input.break_description,
        venue_name: input.venue_name.trim().to_string(),
        venue_description: input.venue_description,
        google_maps_url: input.google_maps_url,
        hourly_rate: input.hourly_rate,
        advance_payment: input.advance_payment,
        extra_cost: input.extra_cost,
        total_payment: Decimal::ZERO,
        remaining_payment: Decimal::ZERO,
        percentage_paid: Decimal::ZERO,
        client_id: input.client_id,
        audience_size: input.audience_size,
        audio_equipment_id: input.audio_equipment_id,
        catering_id: input.catering_id,
        is_active: true,
        deleted_at: None,
        created_at: stamp,
        updated_at: stamp,
    };

    validate_fields(&draft)?;
    if draft.event_date < now.date() {
        return Err(AppError::validation(
            "event_date",
            "The event date cannot be in the past",
        ));
    }
    check_client(store, draft.client_id).await?;
    check_optional_references(store, draft.audio_equipment_id, draft.catering_id).await?;
    check_song_requests(store, &song_request_ids).await?;

    settle(store, &mut draft, None, config, now).await?;

    let prefix = numbering::sequence_prefix(now.date());
    let sequence = store.next_sequence(&prefix).await?;
    draft.contract_number = numbering::format_contract_number(&prefix, sequence);

    let saved = store.insert_contract(draft).await?;
    store
        .replace_song_requests(saved.id, &song_request_ids)
        .await?;

    tracing::info!(
        contract_number = %saved.contract_number,
        event_date = %saved.event_date,
        status = %saved.status,
        "Contract created"
    );

    Ok(ContractResponse::new(saved, song_request_ids, now.date()))
}

/// Apply a partial update and rerun the full pipeline, excluding the contract
/// itself from the conflict check.
pub async fn update_contract<S: ContractStore>(
    store: &mut S,
    id: Uuid,
    input: UpdateContract,
    config: &ScheduleConfig,
    now: NaiveDateTime,
) -> Result<ContractResponse, AppError> {
    let existing = load(store, id).await?;
    ensure_open(&existing)?;

    let mut draft = existing.clone();

    if let Some(title) = input.title {
        draft.title = title.trim().to_string();
    }
    if let Some(event_type) = input.event_type {
        draft.event_type = event_type;
    }
    if let Some(celebrant_name) = input.celebrant_name {
        draft.celebrant_name = celebrant_name;
    }
    if let Some(notes) = input.notes {
        draft.notes = notes;
    }
    if let Some(event_date) = input.event_date {
        draft.event_date = event_date;
    }
    if let Some(start_time) = input.start_time {
        draft.start_time = start_time;
    }
    if let Some(end_time) = input.end_time {
        draft.end_time = end_time;
    }
    if let Some(break_count) = input.break_count {
        draft.break_count = break_count;
    }
    if let Some(break_minutes) = input.break_minutes {
        draft.break_minutes = break_minutes;
    }
    if let Some(break_description) = input.break_description {
        draft.break_description = break_description;
    }
    if let Some(venue_name) = input.venue_name {
        draft.venue_name = venue_name.trim().to_string();
    }
    if let Some(venue_description) = input.venue_description {
        draft.venue_description = venue_description;
    }
    if let Some(google_maps_url) = input.google_maps_url {
        draft.google_maps_url = google_maps_url;
    }
    if let Some(hourly_rate) = input.hourly_rate {
        draft.hourly_rate = hourly_rate;
    }
    if let Some(advance_payment) = input.advance_payment {
        draft.advance_payment = advance_payment;
    }
    if let Some(extra_cost) = input.extra_cost {
        draft.extra_cost = extra_cost;
    }
    if let Some(client_id) = input.client_id {
        draft.client_id = client_id;
    }
    if let Some(audience_size) = input.audience_size {
        draft.audience_size = audience_size;
    }
    if let Some(audio_equipment_id) = input.audio_equipment_id {
        draft.audio_equipment_id = audio_equipment_id;
    }
    if let Some(catering_id) = input.catering_id {
        draft.catering_id = catering_id;
    }

    validate_fields(&draft)?;
    if draft.client_id != existing.client_id {
        check_client(store, draft.client_id).await?;
    }
    check_optional_references(
        store,
        draft
            .audio_equipment_id
            .filter(|_| draft.audio_equipment_id != existing.audio_equipment_id),
        draft
            .catering_id
            .filter(|_| draft.catering_id != existing.catering_id),
    )
    .await?;

    let song_request_ids = match input.song_request_ids {
        Some(ids) => {
            let ids = dedup(ids);
            check_song_requests(store, &ids).await?;
            Some(ids)
        }
        None => None,
    };

    settle(store, &mut draft, Some(id), config, now).await?;
    draft.updated_at = Utc::now();

    let saved = store.update_contract(draft).await?;
    let song_request_ids = match song_request_ids {
        Some(ids) => {
            store.replace_song_requests(saved.id, &ids).await?;
            ids
        }
        None => store.song_request_ids(saved.id).await?,
    };

    tracing::info!(
        contract_number = %saved.contract_number,
        status = %saved.status,
        "Contract updated"
    );

    Ok(ContractResponse::new(saved, song_request_ids, now.date()))
}

/// Record an advance payment and move a pending contract to confirmed.
pub async fn confirm_contract<S: ContractStore>(
    store: &mut S,
    id: Uuid,
    input: ConfirmContract,
    now: NaiveDateTime,
) -> Result<ContractResponse, AppError> {
    if input.advance <= Decimal::ZERO {
        return Err(AppError::validation(
            "advance",
            "Advance payment must be greater than zero",
        ));
    }

    let mut contract = load(store, id).await?;
    let next = contract.status.apply(Transition::Confirm)?;

    contract.advance_payment = input.advance;
    apply_payment(&mut contract)?;
    contract.status = next;
    if let Some(notes) = input.notes.as_deref() {
        append_note(&mut contract, "Confirmed", notes);
    }

    finish_transition(store, contract, Transition::Confirm, now).await
}

/// Cancel a pending or confirmed contract. The reason is kept in the notes.
pub async fn cancel_contract<S: ContractStore>(
    store: &mut S,
    id: Uuid,
    input: CancelContract,
    now: NaiveDateTime,
) -> Result<ContractResponse, AppError> {
    let reason = input.reason.trim();
    if reason.is_empty() {
        return Err(AppError::validation(
            "reason",
            "A cancellation reason is required",
        ));
    }

    let mut contract = load(store, id).await?;
    contract.status = contract.status.apply(Transition::Cancel)?;
    append_note(&mut contract, "Cancelled", reason);

    finish_transition(store, contract, Transition::Cancel, now).await
}

/// Mark a confirmed contract as in progress.
pub async fn start_contract<S: ContractStore>(
    store: &mut S,
    id: Uuid,
    now: NaiveDateTime,
) -> Result<ContractResponse, AppError> {
    let mut contract = load(store, id).await?;
    contract.status = contract.status.apply(Transition::Start)?;

    finish_transition(store, contract, Transition::Start, now).await
}

/// Mark an in-progress contract as completed.
pub async fn complete_contract<S: ContractStore>(
    store: &mut S,
    id: Uuid,
    input: CompleteContract,
    now: NaiveDateTime,
) -> Result<ContractResponse, AppError> {
    let mut contract = load(store, id).await?;
    contract.status = contract.status.apply(Transition::Complete)?;
    if let Some(notes) = input.notes.as_deref() {
        append_note(&mut contract, "Completed", notes);
    }

    finish_transition(store, contract, Transition::Complete, now).await
}

/// Soft delete: the row stays, flagged inactive with a deletion timestamp.
pub async fn delete_contract<S: ContractStore>(store: &mut S, id: Uuid) -> Result<(), AppError> {
    let mut contract = load(store, id).await?;
    let stamp = Utc::now();
    contract.is_active = false;
    contract.deleted_at = Some(stamp);
    contract.updated_at = stamp;

    let saved = store.update_contract(contract).await?;
    tracing::info!(contract_number = %saved.contract_number, "Contract soft-deleted");
    Ok(())
}

/// Bring a soft-deleted contract back, provided its slot is still free.
pub async fn restore_contract<S: ContractStore>(
    store: &mut S,
    id: Uuid,
    config: &ScheduleConfig,
    now: NaiveDateTime,
) -> Result<ContractResponse, AppError> {
    let mut contract = store
        .find_deleted_contract(id)
        .await?
        .ok_or_else(|| AppError::not_found("Deleted contract", id))?;

    settle(store, &mut contract, Some(id), config, now).await?;
    let stamp = Utc::now();
    contract.is_active = true;
    contract.deleted_at = None;
    contract.updated_at = stamp;

    let saved = store.update_contract(contract).await?;
    let song_request_ids = store.song_request_ids(saved.id).await?;
    tracing::info!(contract_number = %saved.contract_number, "Contract restored");

    Ok(ContractResponse::new(saved, song_request_ids, now.date()))
}

/// Fetch one active contract with its song requests.
pub async fn get_contract<S: ContractStore>(
    store: &mut S,
    id: Uuid,
    today: NaiveDate,
) -> Result<ContractResponse, AppError> {
    let contract = load(store, id).await?;
    let song_request_ids = store.song_request_ids(id).await?;
    Ok(ContractResponse::new(contract, song_request_ids, today))
}

/// Check a window against the bookings on its date without writing anything.
pub async fn validate_schedule<S: ContractStore>(
    store: &mut S,
    event_date: NaiveDate,
    start_time: NaiveTime,
    end_time: NaiveTime,
    exclude: Option<Uuid>,
    config: &ScheduleConfig,
) -> Result<ScheduleReport, AppError> {
    let window = EventWindow::new(event_date, start_time, end_time)?;
    let slots = booked_slots(store, event_date, exclude).await?;
    let conflicts = conflict::find_conflicts(&window, &slots, config.min_gap);

    Ok(ScheduleReport {
        has_conflicts: !conflicts.is_empty(),
        total_minutes: window.total_minutes(),
        conflicts,
    })
}

/// Re-check a stored contract's own window against its siblings.
pub async fn validate_contract_schedule<S: ContractStore>(
    store: &mut S,
    id: Uuid,
    config: &ScheduleConfig,
) -> Result<ScheduleReport, AppError> {
    let contract = load(store, id).await?;
    validate_schedule(
        store,
        contract.event_date,
        contract.start_time,
        contract.end_time,
        Some(id),
        config,
    )
    .await
}

/// Advance stored statuses that the clock has overtaken.
///
/// Only forward moves are written, so a contract started by hand ahead of
/// schedule is not pushed back to confirmed. Returns how many rows changed.
pub async fn refresh_statuses<S: ContractStore>(
    store: &mut S,
    now: NaiveDateTime,
) -> Result<usize, AppError> {
    let mut changed = 0;

    for mut contract in store.contracts_due_for_refresh(now.date()).await? {
        let Ok(window) =
            EventWindow::new(contract.event_date, contract.start_time, contract.end_time)
        else {
            continue;
        };

        let derived = contract
            .status
            .derive(&window, now, contract.advance_payment);
        let moves_forward = match (contract.status.progress_rank(), derived.progress_rank()) {
            (Some(current), Some(next)) => next > current,
            _ => false,
        };
        if !moves_forward {
            continue;
        }

        tracing::debug!(
            contract_number = %contract.contract_number,
            from = %contract.status,
            to = %derived,
            "Refreshing contract status"
        );
        contract.status = derived;
        contract.updated_at = Utc::now();
        store.update_contract(contract).await?;
        changed += 1;
    }

    Ok(changed)
}

// ── pipeline steps ──

/// Steps shared by every save: window, conflicts, money, derived status.
async fn settle<S: ContractStore>(
    store: &mut S,
    draft: &mut contracts::Model,
    exclude: Option<Uuid>,
    config: &ScheduleConfig,
    now: NaiveDateTime,
) -> Result<(), AppError> {
    let window = EventWindow::new(draft.event_date, draft.start_time, draft.end_time)?;
    draft.total_minutes = window.total_minutes();

    if draft.status.blocks_schedule() {
        store.lock_schedule(draft.event_date).await?;
        let slots = booked_slots(store, draft.event_date, exclude).await?;
        conflict::check(&window, &slots, config.min_gap)?;
    }

    apply_payment(draft)?;
    draft.status = draft.status.derive(&window, now, draft.advance_payment);
    Ok(())
}

fn apply_payment(contract: &mut contracts::Model) -> Result<(), AppError> {
    let summary = PaymentTerms {
        hourly_rate: contract.hourly_rate,
        advance_payment: contract.advance_payment,
        extra_cost: contract.extra_cost,
    }
    .summarize(contract.total_minutes)?;

    contract.total_payment = summary.total_payment;
    contract.remaining_payment = summary.remaining_payment;
    contract.percentage_paid = summary.percentage_paid;
    Ok(())
}

async fn booked_slots<S: ContractStore>(
    store: &mut S,
    date: NaiveDate,
    exclude: Option<Uuid>,
) -> Result<Vec<BookedSlot>, AppError> {
    let siblings = store.blocking_contracts_on(date, exclude).await?;
    Ok(siblings.iter().filter_map(BookedSlot::from_contract).collect())
}

async fn finish_transition<S: ContractStore>(
    store: &mut S,
    mut contract: contracts::Model,
    transition: Transition,
    now: NaiveDateTime,
) -> Result<ContractResponse, AppError> {
    contract.updated_at = Utc::now();
    let saved = store.update_contract(contract).await?;
    let song_request_ids = store.song_request_ids(saved.id).await?;

    tracing::info!(
        contract_number = %saved.contract_number,
        %transition,
        status = %saved.status,
        "Contract transitioned"
    );

    Ok(ContractResponse::new(saved, song_request_ids, now.date()))
}

async fn load<S: ContractStore>(store: &mut S, id: Uuid) -> Result<contracts::Model, AppError> {
    store
        .find_contract(id)
        .await?
        .ok_or_else(|| AppError::not_found("Contract", id))
}

fn ensure_open(contract: &contracts::Model) -> Result<(), AppError> {
    if contract.status.is_terminal() {
        return Err(AppError::ContractClosed {
            contract_number: contract.contract_number.clone(),
            status: contract.status,
        });
    }
    Ok(())
}

fn validate_fields(contract: &contracts::Model) -> Result<(), AppError> {
    if contract.title.is_empty() {
        return Err(AppError::validation("title", "Title is required"));
    }
    if contract.venue_name.is_empty() {
        return Err(AppError::validation("venue_name", "Venue name is required"));
    }
    if contract.audience_size < 1 {
        return Err(AppError::validation(
            "audience_size",
            "Audience must be at least 1 person",
        ));
    }
    if let Some(count) = contract.break_count
        && !(0..=MAX_BREAKS).contains(&count)
    {
        return Err(AppError::validation(
            "break_count",
            format!("Between 0 and {MAX_BREAKS} breaks can be scheduled"),
        ));
    }
    if let Some(minutes) = contract.break_minutes
        && !(0..=MAX_BREAK_MINUTES).contains(&minutes)
    {
        return Err(AppError::validation(
            "break_minutes",
            format!("A break lasts between 0 and {MAX_BREAK_MINUTES} minutes"),
        ));
    }
    if let Some(url) = contract.google_maps_url.as_deref()
        && !(url.starts_with("https://") || url.starts_with("http://"))
    {
        return Err(AppError::validation(
            "google_maps_url",
            "Enter a valid http(s) URL",
        ));
    }
    PaymentTerms {
        hourly_rate: contract.hourly_rate,
        advance_payment: contract.advance_payment,
        extra_cost: contract.extra_cost,
    }
    .validate()?;
    Ok(())
}

async fn check_client<S: ContractStore>(store: &mut S, client_id: Uuid) -> Result<(), AppError> {
    if store.client_is_active(client_id).await? {
        Ok(())
    } else {
        Err(AppError::not_found("Client", client_id))
    }
}

async fn check_optional_references<S: ContractStore>(
    store: &mut S,
    audio_equipment_id: Option<Uuid>,
    catering_id: Option<Uuid>,
) -> Result<(), AppError> {
    if let Some(id) = audio_equipment_id
        && !store.audio_equipment_exists(id).await?
    {
        return Err(AppError::not_found("Audio equipment", id));
    }
    if let Some(id) = catering_id
        && !store.catering_exists(id).await?
    {
        return Err(AppError::not_found("Catering", id));
    }
    Ok(())
}

async fn check_song_requests<S: ContractStore>(
    store: &mut S,
    ids: &[Uuid],
) -> Result<(), AppError> {
    if ids.is_empty() {
        return Ok(());
    }
    match store.missing_song_requests(ids).await?.first() {
        Some(&missing) => Err(AppError::not_found("Song request", missing)),
        None => Ok(()),
    }
}

fn append_note(contract: &mut contracts::Model, label: &str, text: &str) {
    let text = text.trim();
    if text.is_empty() {
        return;
    }
    if contract.notes.trim().is_empty() {
        contract.notes = format!("{label}: {text}");
    } else {
        contract.notes = format!("{}\n\n{label}: {text}", contract.notes);
    }
}

fn dedup(mut ids: Vec<Uuid>) -> Vec<Uuid> {
    let mut seen = std::collections::HashSet::new();
    ids.retain(|id| seen.insert(*id));
    ids
}
