//! Payload types exchanged with the MediConnect backend.
//!
//! Everything here deserializes leniently. The backend is the source of
//! truth and the client only needs enough structure to render it, so a
//! missing or `null` field falls back to an empty value instead of failing
//! the whole payload.

use std::fmt;

use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

// ---------------------------------------------------------------------------
// Users and roles
// ---------------------------------------------------------------------------

/// The role a signed-in actor holds. Decides which dashboard is shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    Patient,
    Doctor,
    Pharmacy,
}

impl Role {
    /// Wire name, e.g. `PATIENT`.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Patient => "PATIENT",
            Self::Doctor => "DOCTOR",
            Self::Pharmacy => "PHARMACY",
        }
    }

    /// Lowercase slug used in page and region identifiers.
    pub fn slug(&self) -> &'static str {
        match self {
            Self::Patient => "patient",
            Self::Doctor => "doctor",
            Self::Pharmacy => "pharmacy",
        }
    }

    /// Parse a role name case-insensitively.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "patient" => Some(Self::Patient),
            "doctor" => Some(Self::Doctor),
            "pharmacy" => Some(Self::Pharmacy),
            _ => None,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The signed-in actor as returned by the auth endpoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(default, deserialize_with = "null_default")]
    pub id: String,
    #[serde(default, deserialize_with = "null_default")]
    pub email: String,
    #[serde(default, deserialize_with = "null_default")]
    pub first_name: String,
    #[serde(default, deserialize_with = "null_default")]
    pub last_name: String,
    pub role: Role,
    #[serde(default)]
    pub profile_image_url: Option<String>,
}

impl User {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
            .trim()
            .to_string()
    }
}

/// Body of a successful login or registration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AuthResponse {
    pub message: Option<String>,
    pub user: Option<User>,
}

#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest<'a> {
    pub email: &'a str,
    pub password: &'a str,
}

/// Full registration payload. Role-specific fields are `null` for other roles.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub password: String,
    pub role: Role,
    pub date_of_birth: Option<String>,
    pub gender: Option<String>,
    pub phone: Option<String>,
    pub license_number: Option<String>,
    pub specialization: Option<String>,
    pub experience: Option<u32>,
    pub pharmacy_name: Option<String>,
    pub address: Option<String>,
}

impl RegisterRequest {
    pub fn new(
        email: impl Into<String>,
        first_name: impl Into<String>,
        last_name: impl Into<String>,
        password: impl Into<String>,
        role: Role,
    ) -> Self {
        Self {
            email: email.into(),
            first_name: first_name.into(),
            last_name: last_name.into(),
            password: password.into(),
            role,
            date_of_birth: None,
            gender: None,
            phone: None,
            license_number: None,
            specialization: None,
            experience: None,
            pharmacy_name: None,
            address: None,
        }
    }

    /// Drop fields that belong to a different role and blank strings.
    pub fn retain_role_fields(mut self) -> Self {
        if self.role != Role::Patient {
            self.date_of_birth = None;
            self.gender = None;
        }
        if self.role != Role::Doctor {
            self.license_number = None;
            self.specialization = None;
            self.experience = None;
        }
        if self.role != Role::Pharmacy {
            self.pharmacy_name = None;
            self.address = None;
        }
        for field in [
            &mut self.date_of_birth,
            &mut self.gender,
            &mut self.phone,
            &mut self.license_number,
            &mut self.specialization,
            &mut self.pharmacy_name,
            &mut self.address,
        ] {
            if field.as_deref().is_some_and(|v| v.trim().is_empty()) {
                *field = None;
            }
        }
        self
    }
}

// ---------------------------------------------------------------------------
// Appointments
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AppointmentStatus {
    Scheduled,
    Confirmed,
    Completed,
    Cancelled,
    #[default]
    #[serde(other)]
    Unknown,
}

impl AppointmentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Scheduled => "SCHEDULED",
            Self::Confirmed => "CONFIRMED",
            Self::Completed => "COMPLETED",
            Self::Cancelled => "CANCELLED",
            Self::Unknown => "UNKNOWN",
        }
    }

    /// Human-facing label shown in status badges.
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Scheduled => "Scheduled",
            Self::Confirmed => "Confirmed by Doctor",
            Self::Completed => "Completed",
            Self::Cancelled => "Cancelled",
            Self::Unknown => "Unknown",
        }
    }

    /// Scheduled and confirmed appointments can still change.
    pub fn is_open(&self) -> bool {
        matches!(self, Self::Scheduled | Self::Confirmed)
    }
}

impl fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AppointmentType {
    Video,
    InPerson,
}

impl AppointmentType {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().replace('_', "-").as_str() {
            "video" => Some(Self::Video),
            "in-person" | "inperson" => Some(Self::InPerson),
            _ => None,
        }
    }
}

/// A participant reference nested inside entity-shaped payloads.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Party {
    pub user: Option<PersonName>,
    pub specialization: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PersonName {
    #[serde(deserialize_with = "null_default")]
    pub first_name: String,
    #[serde(deserialize_with = "null_default")]
    pub last_name: String,
}

impl PersonName {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
            .trim()
            .to_string()
    }
}

impl Party {
    fn name(&self) -> Option<String> {
        self.user
            .as_ref()
            .map(PersonName::full_name)
            .filter(|n| !n.is_empty())
    }
}

/// An appointment as listed by the appointment endpoints.
///
/// The dashboard aggregates return entity-shaped appointments with nested
/// `doctor`/`patient` objects instead of flat names, so both shapes are
/// accepted and the accessors fall back from one to the other.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Appointment {
    #[serde(deserialize_with = "null_default")]
    pub id: String,
    #[serde(deserialize_with = "lenient_datetime")]
    pub appointment_date: Option<NaiveDateTime>,
    pub appointment_type: Option<String>,
    #[serde(deserialize_with = "null_default")]
    pub status: AppointmentStatus,
    pub reason: Option<String>,
    pub notes: Option<String>,
    pub diagnosis: Option<String>,
    pub treatment_plan: Option<String>,
    pub patient_name: Option<String>,
    pub patient_email: Option<String>,
    pub patient_phone: Option<String>,
    pub doctor_name: Option<String>,
    pub doctor_specialization: Option<String>,
    pub doctor: Option<Party>,
    pub patient: Option<Party>,
}

impl Appointment {
    pub fn doctor_display_name(&self) -> Option<String> {
        non_empty(self.doctor_name.clone()).or_else(|| self.doctor.as_ref().and_then(Party::name))
    }

    pub fn patient_display_name(&self) -> Option<String> {
        non_empty(self.patient_name.clone())
            .or_else(|| self.patient.as_ref().and_then(Party::name))
    }

    pub fn specialization(&self) -> Option<String> {
        non_empty(self.doctor_specialization.clone())
            .or_else(|| self.doctor.as_ref().and_then(|d| non_empty(d.specialization.clone())))
    }

    /// Scheduled in the future and still open.
    pub fn is_upcoming(&self, now: NaiveDateTime) -> bool {
        self.status.is_open() && self.appointment_date.is_some_and(|date| date > now)
    }
}

/// Request body for `POST /api/appointments/book`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingRequest {
    pub doctor_id: String,
    pub appointment_date: NaiveDateTime,
    pub appointment_type: AppointmentType,
    pub reason: Option<String>,
}

impl BookingRequest {
    pub fn new(
        doctor_id: impl Into<String>,
        date: NaiveDate,
        time: NaiveTime,
        appointment_type: AppointmentType,
        reason: Option<String>,
    ) -> Self {
        Self {
            doctor_id: doctor_id.into(),
            appointment_date: date.and_time(time),
            appointment_type,
            reason: non_empty(reason),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct StatusUpdate {
    pub status: AppointmentStatus,
}

/// One entry of `GET /api/appointments/doctors`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct DoctorOption {
    #[serde(deserialize_with = "null_default")]
    pub id: String,
    #[serde(deserialize_with = "null_default")]
    pub name: String,
    pub specialization: Option<String>,
}

impl DoctorOption {
    pub fn label(&self) -> String {
        format!(
            "{} - {}",
            self.name,
            self.specialization.as_deref().unwrap_or("General")
        )
    }
}

// ---------------------------------------------------------------------------
// Prescriptions and inventory
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PrescriptionStatus {
    Active,
    Pending,
    Approved,
    Dispensed,
    Fulfilled,
    Completed,
    Cancelled,
    #[default]
    #[serde(other)]
    Unknown,
}

impl PrescriptionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "ACTIVE",
            Self::Pending => "PENDING",
            Self::Approved => "APPROVED",
            Self::Dispensed => "DISPENSED",
            Self::Fulfilled => "FULFILLED",
            Self::Completed => "COMPLETED",
            Self::Cancelled => "CANCELLED",
            Self::Unknown => "UNKNOWN",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Prescription {
    #[serde(deserialize_with = "null_default")]
    pub id: String,
    #[serde(deserialize_with = "lenient_datetime")]
    pub created_at: Option<NaiveDateTime>,
    #[serde(deserialize_with = "null_default")]
    pub status: PrescriptionStatus,
    pub medications: Option<Vec<Value>>,
    pub doctor: Option<Party>,
    pub patient: Option<Party>,
}

impl Prescription {
    /// First eight characters of the id, as printed on cards.
    pub fn short_id(&self) -> &str {
        match self.id.char_indices().nth(8) {
            Some((idx, _)) => &self.id[..idx],
            None => &self.id,
        }
    }

    pub fn medication_count(&self) -> usize {
        self.medications.as_ref().map_or(0, Vec::len)
    }

    pub fn doctor_name(&self) -> Option<String> {
        self.doctor
            .as_ref()
            .and_then(Party::name)
            .map(|name| format!("Dr. {name}"))
    }

    pub fn patient_name(&self) -> Option<String> {
        self.patient.as_ref().and_then(Party::name)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct InventoryItem {
    #[serde(deserialize_with = "null_default")]
    pub medicine_name: String,
    #[serde(deserialize_with = "null_default")]
    pub current_stock: i64,
    #[serde(deserialize_with = "null_default")]
    pub min_stock_level: i64,
    pub price: Option<f64>,
    #[serde(deserialize_with = "lenient_date")]
    pub expiry_date: Option<NaiveDate>,
}

// ---------------------------------------------------------------------------
// Dashboard aggregates
// ---------------------------------------------------------------------------

/// `GET /api/patient/dashboard`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PatientDashboard {
    pub upcoming_appointments: Option<Vec<Appointment>>,
    pub active_prescriptions: Option<Vec<Prescription>>,
    pub total_appointments: Option<u64>,
    pub total_prescriptions: Option<u64>,
}

/// `GET /api/doctor/dashboard`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DoctorDashboard {
    pub today_appointments: Option<Vec<Appointment>>,
    pub upcoming_appointments: Option<Vec<Appointment>>,
    pub total_patients: Option<u64>,
    pub total_appointments: Option<u64>,
    pub stats: Option<DoctorStats>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DoctorStats {
    pub completed_appointments: Option<u64>,
    pub pending_appointments: Option<u64>,
    pub cancelled_appointments: Option<u64>,
    pub total_prescriptions: Option<u64>,
}

/// `GET /api/pharmacy/dashboard`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PharmacyDashboard {
    pub pharmacy: Option<PharmacyProfile>,
    pub pending_prescriptions: Option<Vec<Prescription>>,
    pub low_stock_items: Option<Vec<InventoryItem>>,
    pub total_inventory_items: Option<u64>,
    pub total_prescriptions: Option<u64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PharmacyProfile {
    pub pharmacy_name: Option<String>,
}

// ---------------------------------------------------------------------------
// Chat
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Assistant,
}

/// One turn of the transcript sent to `POST /api/chatbot/chat`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::Assistant,
            content: content.into(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ChatRequest<'a> {
    pub messages: &'a [ChatMessage],
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ChatReply {
    pub success: bool,
    pub message: Option<String>,
    pub error: Option<String>,
}

// ---------------------------------------------------------------------------
// Lenient field helpers
// ---------------------------------------------------------------------------

/// Treat an explicit `null` like a missing field.
fn null_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

fn lenient_datetime<'de, D>(deserializer: D) -> Result<Option<NaiveDateTime>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(parse_datetime_value))
}

fn lenient_date<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value
        .as_ref()
        .and_then(parse_datetime_value)
        .map(|dt| dt.date()))
}

/// Accepts ISO local date-times, RFC 3339 strings, bare dates, and the
/// `[year, month, day, hour, minute, second]` arrays some serializers emit.
pub fn parse_datetime_value(value: &Value) -> Option<NaiveDateTime> {
    match value {
        Value::String(s) => parse_datetime_str(s),
        Value::Array(parts) => {
            let nums: Vec<u32> = parts
                .iter()
                .map(|p| p.as_u64().and_then(|v| u32::try_from(v).ok()))
                .collect::<Option<_>>()?;
            let year = i32::try_from(*nums.first()?).ok()?;
            let date = NaiveDate::from_ymd_opt(year, *nums.get(1)?, *nums.get(2)?)?;
            let time = NaiveTime::from_hms_opt(
                nums.get(3).copied().unwrap_or(0),
                nums.get(4).copied().unwrap_or(0),
                nums.get(5).copied().unwrap_or(0),
            )?;
            Some(date.and_time(time))
        }
        _ => None,
    }
}

pub fn parse_datetime_str(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M:%S"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(dt);
        }
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Local).naive_local());
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
