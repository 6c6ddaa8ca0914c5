use chrono::{NaiveDate, NaiveTime};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Contract lifecycle status stored as a lowercase string in the database.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, EnumIter, DeriveActiveEnum,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::None)")]
#[serde(rename_all = "snake_case")]
pub enum Status {
    #[sea_orm(string_value = "pending")]
    Pending,
    #[sea_orm(string_value = "confirmed")]
    Confirmed,
    #[sea_orm(string_value = "in_progress")]
    InProgress,
    #[sea_orm(string_value = "completed")]
    Completed,
    #[sea_orm(string_value = "cancelled")]
    Cancelled,
}

/// Kind of celebration a contract is booked for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, EnumIter, DeriveActiveEnum)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::None)")]
#[serde(rename_all = "snake_case")]
pub enum EventType {
    #[sea_orm(string_value = "birthday")]
    Birthday,
    #[sea_orm(string_value = "wedding")]
    Wedding,
    #[sea_orm(string_value = "quinceañera")]
    #[serde(rename = "quinceañera")]
    Quinceanera,
    #[sea_orm(string_value = "baptism")]
    Baptism,
    #[sea_orm(string_value = "communion")]
    Communion,
    #[sea_orm(string_value = "graduation")]
    Graduation,
    #[sea_orm(string_value = "anniversary")]
    Anniversary,
    #[sea_orm(string_value = "corporate")]
    Corporate,
    #[sea_orm(string_value = "baby_shower")]
    BabyShower,
    #[sea_orm(string_value = "bridal_shower")]
    BridalShower,
    #[sea_orm(string_value = "christmas")]
    Christmas,
    #[sea_orm(string_value = "new_year")]
    NewYear,
    #[sea_orm(string_value = "other")]
    Other,
}

/// SeaORM entity for the `contracts` table.
///
/// `total_minutes`, the payment outputs and `status` are derived by the
/// contract pipeline and are never written from request bodies.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "contracts")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub contract_number: String,
    pub status: Status,
    pub title: String,
    pub event_type: EventType,
    pub celebrant_name: String,
    #[sea_orm(column_type = "Text")]
    pub notes: String,

    pub event_date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub total_minutes: i32,

    pub break_count: Option<i32>,
    pub break_minutes: Option<i32>,
    #[sea_orm(column_type = "Text")]
    pub break_description: String,

    pub venue_name: String,
    #[sea_orm(column_type = "Text")]
    pub venue_description: String,
    pub google_maps_url: Option<String>,

    #[sea_orm(column_type = "Decimal(Some((10, 2)))")]
    pub hourly_rate: Decimal,
    #[sea_orm(column_type = "Decimal(Some((10, 2)))")]
    pub advance_payment: Decimal,
    #[sea_orm(column_type = "Decimal(Some((10, 2)))")]
    pub extra_cost: Decimal,
    #[sea_orm(column_type = "Decimal(Some((10, 2)))")]
    pub total_payment: Decimal,
    #[sea_orm(column_type = "Decimal(Some((10, 2)))")]
    pub remaining_payment: Decimal,
    #[sea_orm(column_type = "Decimal(Some((5, 2)))")]
    pub percentage_paid: Decimal,

    pub client_id: Uuid,
    pub audience_size: i32,
    pub audio_equipment_id: Option<Uuid>,
    pub catering_id: Option<Uuid>,

    pub is_active: bool,
    pub deleted_at: Option<DateTimeUtc>,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::clients::Entity",
        from = "Column::ClientId",
        to = "super::clients::Column::Id"
    )]
    Client,
    #[sea_orm(
        belongs_to = "super::audio_equipment::Entity",
        from = "Column::AudioEquipmentId",
        to = "super::audio_equipment::Column::Id"
    )]
    AudioEquipment,
    #[sea_orm(
        belongs_to = "super::catering::Entity",
        from = "Column::CateringId",
        to = "super::catering::Column::Id"
    )]
    Catering,
    #[sea_orm(has_many = "super::contract_song_requests::Entity")]
    SongRequestLinks,
}

impl Related<super::clients::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Client.def()
    }
}

impl Related<super::audio_equipment::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::AudioEquipment.def()
    }
}

impl Related<super::catering::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Catering.def()
    }
}

impl Related<super::contract_song_requests::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::SongRequestLinks.def()
    }
}

impl Related<super::song_requests::Entity> for Entity {
    fn to() -> RelationDef {
        super::contract_song_requests::Relation::SongRequest.def()
    }

    fn via() -> Option<RelationDef> {
        Some(super::contract_song_requests::Relation::Contract.def().rev())
    }
}

impl ActiveModelBehavior for ActiveModel {}

// ── DTOs ──

/// Request body for `POST /api/contracts`.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateContract {
    pub title: String,
    pub event_type: EventType,
    #[serde(default)]
    pub celebrant_name: String,
    #[serde(default)]
    pub notes: String,

    pub event_date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,

    pub break_count: Option<i32>,
    pub break_minutes: Option<i32>,
    #[serde(default)]
    pub break_description: String,

    pub venue_name: String,
    #[serde(default)]
    pub venue_description: String,
    pub google_maps_url: Option<String>,

    pub hourly_rate: Decimal,
    #[serde(default)]
    pub advance_payment: Decimal,
    #[serde(default)]
    pub extra_cost: Decimal,

    pub client_id: Uuid,
    pub audience_size: i32,
    pub audio_equipment_id: Option<Uuid>,
    pub catering_id: Option<Uuid>,
    #[serde(default)]
    pub song_request_ids: Vec<Uuid>,
}

/// Request body for `PUT`/`PATCH /api/contracts/{id}`: every field is optional.
///
/// The nullable references use a double `Option` so that `null` clears the
/// reference while an absent key leaves it untouched.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateContract {
    pub title: Option<String>,
    pub event_type: Option<EventType>,
    pub celebrant_name: Option<String>,
    pub notes: Option<String>,

    pub event_date: Option<NaiveDate>,
    pub start_time: Option<NaiveTime>,
    pub end_time: Option<NaiveTime>,

    #[serde(default, deserialize_with = "nullable")]
    pub break_count: Option<Option<i32>>,
    #[serde(default, deserialize_with = "nullable")]
    pub break_minutes: Option<Option<i32>>,
    pub break_description: Option<String>,

    pub venue_name: Option<String>,
    pub venue_description: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub google_maps_url: Option<Option<String>>,

    pub hourly_rate: Option<Decimal>,
    pub advance_payment: Option<Decimal>,
    pub extra_cost: Option<Decimal>,

    pub client_id: Option<Uuid>,
    pub audience_size: Option<i32>,
    #[serde(default, deserialize_with = "nullable")]
    pub audio_equipment_id: Option<Option<Uuid>>,
    #[serde(default, deserialize_with = "nullable")]
    pub catering_id: Option<Option<Uuid>>,
    pub song_request_ids: Option<Vec<Uuid>>,
}

/// Distinguishes an explicit `null` (`Some(None)`) from a missing key (`None`).
fn nullable<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: serde::Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// Request body for `POST /api/contracts/{id}/confirm`.
#[derive(Debug, Clone, Deserialize)]
pub struct ConfirmContract {
    pub advance: Decimal,
    pub notes: Option<String>,
}

/// Request body for `POST /api/contracts/{id}/cancel`.
#[derive(Debug, Clone, Deserialize)]
pub struct CancelContract {
    pub reason: String,
}

/// Request body for `POST /api/contracts/{id}/complete`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CompleteContract {
    pub notes: Option<String>,
}

/// Request body for `POST /api/contracts/validate_schedule`.
#[derive(Debug, Clone, Deserialize)]
pub struct ValidateSchedule {
    pub event_date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub contract_id: Option<Uuid>,
}

/// Query string for `GET /api/contracts`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ContractListQuery {
    /// Comma separated list of statuses, e.g. `pending,confirmed`.
    pub status: Option<String>,
    pub event_type: Option<EventType>,
    pub client_id: Option<Uuid>,
    pub date_from: Option<NaiveDate>,
    pub date_to: Option<NaiveDate>,
    pub search: Option<String>,
    pub ordering: Option<String>,
    pub page: Option<u64>,
    pub limit: Option<u64>,
}

impl ContractListQuery {
    pub fn page(&self) -> u64 {
        self.page.unwrap_or(1).max(1)
    }

    pub fn limit(&self) -> u64 {
        self.limit.unwrap_or(20).clamp(1, 100)
    }

    /// Parse the `status` filter. Unknown names are reported back by value.
    pub fn statuses(&self) -> Result<Vec<Status>, String> {
        let Some(raw) = self.status.as_deref() else {
            return Ok(Vec::new());
        };

        raw.split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| Status::parse(s).ok_or_else(|| s.to_string()))
            .collect()
    }
}

impl Status {
    pub fn as_str(self) -> &'static str {
        match self {
            Status::Pending => "pending",
            Status::Confirmed => "confirmed",
            Status::InProgress => "in_progress",
            Status::Completed => "completed",
            Status::Cancelled => "cancelled",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(Status::Pending),
            "confirmed" => Some(Status::Confirmed),
            "in_progress" => Some(Status::InProgress),
            "completed" => Some(Status::Completed),
            "cancelled" => Some(Status::Cancelled),
            _ => None,
        }
    }
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A contract as returned by the API: stored fields plus display helpers.
#[derive(Debug, Clone, Serialize)]
pub struct ContractResponse {
    #[serde(flatten)]
    pub contract: Model,
    pub song_request_ids: Vec<Uuid>,
    pub duration_display: String,
    pub hours_total: Decimal,
    pub days_until_event: i64,
    pub cost_per_person: Option<Decimal>,
    /// The event is today or within the next seven days.
    pub is_upcoming: bool,
    pub is_overdue: bool,
}

impl ContractResponse {
    pub fn new(contract: Model, song_request_ids: Vec<Uuid>, today: NaiveDate) -> Self {
        let days_until_event = (contract.event_date - today).num_days();

        Self {
            song_request_ids,
            duration_display: crate::engine::duration::format_minutes(contract.total_minutes),
            hours_total: crate::engine::duration::minutes_to_hours(contract.total_minutes),
            days_until_event,
            cost_per_person: crate::engine::finance::cost_per_person(
                contract.total_payment,
                contract.audience_size,
            ),
            is_upcoming: (0..=7).contains(&days_until_event),
            is_overdue: days_until_event < 0,
            contract,
        }
    }
}

/// One page of `GET /api/contracts`.
#[derive(Debug, Clone, Serialize)]
pub struct ContractPage {
    pub items: Vec<ContractResponse>,
    pub page: u64,
    pub limit: u64,
    pub total_items: u64,
    pub total_pages: u64,
}
