//! In-memory `ContractStore` for exercising the contract pipeline without a
//! database.
//!
//! A transaction holds the whole state behind an owned mutex guard, which
//! serialises writers the way the advisory and row locks do in PostgreSQL.
//! Dropping a transaction without committing restores the snapshot taken at
//! `begin`.
#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use rust_decimal::Decimal;
use tokio::sync::{Mutex, OwnedMutexGuard};
use uuid::Uuid;

use gig_agenda::error::AppError;
use gig_agenda::models::contracts::{self, CreateContract, EventType};
use gig_agenda::service::ContractStore;

#[derive(Debug, Clone, Default)]
pub struct State {
    pub contracts: HashMap<Uuid, contracts::Model>,
    pub sequences: HashMap<String, u32>,
    pub clients: HashSet<Uuid>,
    pub audio_equipment: HashSet<Uuid>,
    pub catering: HashSet<Uuid>,
    pub song_requests: HashSet<Uuid>,
    pub links: HashMap<Uuid, Vec<Uuid>>,
    pub locked_dates: Vec<NaiveDate>,
}

#[derive(Clone, Default)]
pub struct MemoryDb(Arc<Mutex<State>>);

impl MemoryDb {
    pub async fn begin(&self) -> MemoryTxn {
        let state = self.0.clone().lock_owned().await;
        let snapshot = state.clone();
        MemoryTxn {
            state,
            snapshot: Some(snapshot),
        }
    }

    /// Run `f` against the state outside any transaction.
    pub async fn with<R>(&self, f: impl FnOnce(&mut State) -> R) -> R {
        let mut state = self.0.lock().await;
        f(&mut state)
    }

    pub async fn add_client(&self) -> Uuid {
        let id = Uuid::new_v4();
        self.with(|s| s.clients.insert(id)).await;
        id
    }

    pub async fn add_song_request(&self) -> Uuid {
        let id = Uuid::new_v4();
        self.with(|s| s.song_requests.insert(id)).await;
        id
    }

    pub async fn contract(&self, id: Uuid) -> Option<contracts::Model> {
        self.with(|s| s.contracts.get(&id).cloned()).await
    }
}

pub struct MemoryTxn {
    state: OwnedMutexGuard<State>,
    snapshot: Option<State>,
}

impl MemoryTxn {
    /// Keep the writes when `result` is `Ok`, roll back otherwise.
    pub fn finish<T>(mut self, result: Result<T, AppError>) -> Result<T, AppError> {
        if result.is_ok() {
            self.snapshot = None;
        }
        result
    }
}

impl Drop for MemoryTxn {
    fn drop(&mut self) {
        if let Some(snapshot) = self.snapshot.take() {
            *self.state = snapshot;
        }
    }
}

impl ContractStore for MemoryTxn {
    async fn lock_schedule(&mut self, date: NaiveDate) -> Result<(), AppError> {
        self.state.locked_dates.push(date);
        Ok(())
    }

    async fn find_contract(&mut self, id: Uuid) -> Result<Option<contracts::Model>, AppError> {
        Ok(self.state.contracts.get(&id).filter(|c| c.is_active).cloned())
    }

    async fn find_deleted_contract(
        &mut self,
        id: Uuid,
    ) -> Result<Option<contracts::Model>, AppError> {
        Ok(self.state.contracts.get(&id).filter(|c| !c.is_active).cloned())
    }

    async fn blocking_contracts_on(
        &mut self,
        date: NaiveDate,
        exclude: Option<Uuid>,
    ) -> Result<Vec<contracts::Model>, AppError> {
        let mut found: Vec<_> = self
            .state
            .contracts
            .values()
            .filter(|c| c.is_active && c.event_date == date && c.status.blocks_schedule())
            .filter(|c| Some(c.id) != exclude)
            .cloned()
            .collect();
        found.sort_by_key(|c| c.start_time);
        Ok(found)
    }

    async fn contracts_due_for_refresh(
        &mut self,
        today: NaiveDate,
    ) -> Result<Vec<contracts::Model>, AppError> {
        Ok(self
            .state
            .contracts
            .values()
            .filter(|c| c.is_active && c.event_date <= today && c.status.blocks_schedule())
            .cloned()
            .collect())
    }

    async fn next_sequence(&mut self, prefix: &str) -> Result<u32, AppError> {
        let counter = self.state.sequences.entry(prefix.to_string()).or_insert(0);
        *counter += 1;
        Ok(*counter)
    }

    async fn client_is_active(&mut self, id: Uuid) -> Result<bool, AppError> {
        Ok(self.state.clients.contains(&id))
    }

    async fn audio_equipment_exists(&mut self, id: Uuid) -> Result<bool, AppError> {
        Ok(self.state.audio_equipment.contains(&id))
    }

    async fn catering_exists(&mut self, id: Uuid) -> Result<bool, AppError> {
        Ok(self.state.catering.contains(&id))
    }

    async fn missing_song_requests(&mut self, ids: &[Uuid]) -> Result<Vec<Uuid>, AppError> {
        Ok(ids
            .iter()
            .copied()
            .filter(|id| !self.state.song_requests.contains(id))
            .collect())
    }

    async fn insert_contract(
        &mut self,
        contract: contracts::Model,
    ) -> Result<contracts::Model, AppError> {
        if self
            .state
            .contracts
            .values()
            .any(|c| c.contract_number == contract.contract_number)
        {
            return Err(AppError::UniquenessRace(contract.contract_number));
        }
        self.state.contracts.insert(contract.id, contract.clone());
        Ok(contract)
    }

    async fn update_contract(
        &mut self,
        contract: contracts::Model,
    ) -> Result<contracts::Model, AppError> {
        self.state.contracts.insert(contract.id, contract.clone());
        Ok(contract)
    }

    async fn song_request_ids(&mut self, contract_id: Uuid) -> Result<Vec<Uuid>, AppError> {
        Ok(self.state.links.get(&contract_id).cloned().unwrap_or_default())
    }

    async fn replace_song_requests(
        &mut self,
        contract_id: Uuid,
        ids: &[Uuid],
    ) -> Result<(), AppError> {
        self.state.links.insert(contract_id, ids.to_vec());
        Ok(())
    }
}

pub fn d(value: &str) -> Decimal {
    value.parse().unwrap()
}

pub fn date(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

pub fn time(h: u32, m: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(h, m, 0).unwrap()
}

pub fn at(day: NaiveDate, h: u32, m: u32) -> NaiveDateTime {
    day.and_time(time(h, m))
}

/// Event date used throughout the scenarios.
pub fn event_day() -> NaiveDate {
    date(2025, 8, 21)
}

/// Three weeks before the event, mid-morning.
pub fn booking_time() -> NaiveDateTime {
    at(date(2025, 8, 1), 10, 0)
}

pub fn booking(client_id: Uuid, start: NaiveTime, end: NaiveTime) -> CreateContract {
    CreateContract {
        title: "Boda Pérez".to_string(),
        event_type: EventType::Wedding,
        celebrant_name: "Ana Pérez".to_string(),
        notes: String::new(),
        event_date: event_day(),
        start_time: start,
        end_time: end,
        break_count: Some(2),
        break_minutes: Some(15),
        break_description: String::new(),
        venue_name: "Salón Jardín".to_string(),
        venue_description: String::new(),
        google_maps_url: None,
        hourly_rate: d("1000"),
        advance_payment: Decimal::ZERO,
        extra_cost: Decimal::ZERO,
        client_id,
        audience_size: 150,
        audio_equipment_id: None,
        catering_id: None,
        song_request_ids: Vec::new(),
    }
}
