//! View adapters over [`AppState`](crate::state::AppState).
//!
//! The controller never produces markup. Cards are first reduced to a
//! [`CardView`] (title, badge, labelled facts, action buttons) and each
//! adapter draws that: [`html`] as escaped fragments, [`terminal`] as
//! coloured text.

pub mod html;
pub mod terminal;

use chrono::{NaiveDate, NaiveDateTime};

use crate::models::{DoctorOption, InventoryItem, Role};
use crate::state::{AppointmentAction, AppointmentCard, CardDetail, PrescriptionCard};

pub const NOT_SPECIFIED: &str = "Not specified";
pub const NOT_AVAILABLE: &str = "Not available";
pub const DOCTOR_PROMPT: &str = "Choose a doctor...";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Badge {
    /// Lowercased status, used as a CSS modifier.
    pub class: String,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fact {
    pub label: &'static str,
    pub value: String,
}

impl Fact {
    fn new(label: &'static str, value: impl Into<String>) -> Self {
        Self {
            label,
            value: value.into(),
        }
    }
}

/// Adapter-neutral description of one card.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardView {
    pub kind: &'static str,
    pub title: String,
    pub facts: Vec<Fact>,
    pub badge: Option<Badge>,
    /// `(action, appointment id)` pairs, in display order.
    pub actions: Vec<(AppointmentAction, String)>,
}

pub fn format_datetime(value: Option<NaiveDateTime>) -> String {
    value
        .map(|dt| dt.format("%b %-d, %Y %-I:%M %p").to_string())
        .unwrap_or_else(|| NOT_AVAILABLE.to_string())
}

pub fn format_date(value: Option<NaiveDate>) -> String {
    value
        .map(|d| d.format("%b %-d, %Y").to_string())
        .unwrap_or_else(|| NOT_AVAILABLE.to_string())
}

fn or_fallback(value: Option<&str>, fallback: &str) -> String {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .unwrap_or(fallback)
        .to_string()
}

pub fn appointment_view(card: &AppointmentCard) -> CardView {
    let a = &card.appointment;
    let mut facts = Vec::new();

    let title = match card.viewer {
        Role::Doctor => format!(
            "Patient: {}",
            a.patient_display_name().unwrap_or_else(|| NOT_AVAILABLE.to_string())
        ),
        _ => format!(
            "Dr. {}",
            a.doctor_display_name().unwrap_or_else(|| NOT_AVAILABLE.to_string())
        ),
    };

    match (card.viewer, card.detail) {
        (Role::Doctor, CardDetail::History) => {
            facts.push(Fact::new("Patient Email", or_fallback(a.patient_email.as_deref(), NOT_AVAILABLE)));
            facts.push(Fact::new("Patient Phone", or_fallback(a.patient_phone.as_deref(), NOT_AVAILABLE)));
        }
        (Role::Doctor, CardDetail::Summary) => {}
        _ => facts.push(Fact::new(
            "Specialization",
            a.specialization().unwrap_or_else(|| "General".to_string()),
        )),
    }

    facts.push(Fact::new("Date & Time", format_datetime(a.appointment_date)));
    facts.push(Fact::new("Type", or_fallback(a.appointment_type.as_deref(), NOT_SPECIFIED)));
    facts.push(Fact::new("Reason", or_fallback(a.reason.as_deref(), NOT_SPECIFIED)));

    if card.viewer == Role::Patient && card.detail == CardDetail::History {
        for (label, value) in [
            ("Notes", &a.notes),
            ("Diagnosis", &a.diagnosis),
            ("Treatment Plan", &a.treatment_plan),
        ] {
            if let Some(value) = value.as_deref().filter(|v| !v.trim().is_empty()) {
                facts.push(Fact::new(label, value));
            }
        }
    }

    CardView {
        kind: "appointment",
        title,
        facts,
        badge: Some(Badge {
            class: a.status.as_str().to_ascii_lowercase(),
            text: a.status.display_name().to_string(),
        }),
        actions: card
            .actions
            .iter()
            .map(|action| (*action, a.id.clone()))
            .collect(),
    }
}

pub fn prescription_view(card: &PrescriptionCard) -> CardView {
    let p = &card.prescription;
    let mut facts = Vec::new();
    if card.show_patient {
        facts.push(Fact::new("Patient", p.patient_name().unwrap_or_else(|| NOT_AVAILABLE.to_string())));
    }
    facts.push(Fact::new("Doctor", p.doctor_name().unwrap_or_else(|| NOT_AVAILABLE.to_string())));
    facts.push(Fact::new("Date", format_date(p.created_at.map(|dt| dt.date()))));
    facts.push(Fact::new("Medications", format!("{} medications", p.medication_count())));

    CardView {
        kind: "prescription",
        title: format!("Prescription #{}", p.short_id()),
        facts,
        badge: Some(Badge {
            class: p.status.as_str().to_ascii_lowercase(),
            text: p.status.as_str().to_string(),
        }),
        actions: Vec::new(),
    }
}

pub fn inventory_view(item: &InventoryItem) -> CardView {
    let mut facts = vec![
        Fact::new("Stock", item.current_stock.to_string()),
        Fact::new("Min Level", item.min_stock_level.to_string()),
        Fact::new(
            "Price",
            item.price
                .map(|p| format!("${p:.2}"))
                .unwrap_or_else(|| NOT_AVAILABLE.to_string()),
        ),
    ];
    if item.expiry_date.is_some() {
        facts.push(Fact::new("Expires", format_date(item.expiry_date)));
    }
    CardView {
        kind: "inventory",
        title: item.medicine_name.clone(),
        facts,
        badge: None,
        actions: Vec::new(),
    }
}

/// Options of the doctor select box, prompt first, as `(value, label)`.
pub fn doctor_options(doctors: &[DoctorOption]) -> Vec<(String, String)> {
    std::iter::once((String::new(), DOCTOR_PROMPT.to_string()))
        .chain(doctors.iter().map(|d| (d.id.clone(), d.label())))
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
