//! Application state owned by the dashboard controller.
//!
//! This is the client's whole view model: who is signed in, which page is
//! visible, what each list region and stat counter currently shows, and the
//! live notifications. Renderers read it; only the controller writes it.

use std::collections::BTreeMap;
use std::fmt;

use crate::models::{
    Appointment, AppointmentStatus, DoctorOption, InventoryItem, Prescription, Role, User,
};
use crate::notify::NotificationCenter;

// ---------------------------------------------------------------------------
// Pages
// ---------------------------------------------------------------------------

/// Exactly one page is visible at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Page {
    Landing,
    Login,
    Register,
    BookAppointment,
    Dashboard(Role),
}

impl Page {
    pub fn id(&self) -> String {
        match self {
            Self::Landing => "landing".to_string(),
            Self::Login => "login".to_string(),
            Self::Register => "register".to_string(),
            Self::BookAppointment => "book-appointment".to_string(),
            Self::Dashboard(role) => format!("{}-dashboard", role.slug()),
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Self::Landing => "Welcome to MediConnect",
            Self::Login => "Sign In",
            Self::Register => "Create Account",
            Self::BookAppointment => "Book Appointment",
            Self::Dashboard(Role::Patient) => "Patient Dashboard",
            Self::Dashboard(Role::Doctor) => "Doctor Dashboard",
            Self::Dashboard(Role::Pharmacy) => "Pharmacy Dashboard",
        }
    }

    /// Parse a page id as typed by a user. Dashboards are reached by role.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "landing" | "home" => Some(Self::Landing),
            "login" => Some(Self::Login),
            "register" => Some(Self::Register),
            "book" | "book-appointment" => Some(Self::BookAppointment),
            other => other
                .strip_suffix("-dashboard")
                .and_then(Role::parse)
                .map(Self::Dashboard),
        }
    }
}

impl fmt::Display for Page {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.id())
    }
}

// ---------------------------------------------------------------------------
// Regions and stats
// ---------------------------------------------------------------------------

/// A list-backed area of a page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Region {
    PatientUpcoming,
    PatientAppointments,
    PatientPrescriptions,
    DoctorToday,
    DoctorUpcoming,
    DoctorAppointments,
    PharmacyPrescriptions,
    PharmacyLowStock,
    DoctorOptions,
}

impl Region {
    pub const ALL: [Region; 9] = [
        Self::PatientUpcoming,
        Self::PatientAppointments,
        Self::PatientPrescriptions,
        Self::DoctorToday,
        Self::DoctorUpcoming,
        Self::DoctorAppointments,
        Self::PharmacyPrescriptions,
        Self::PharmacyLowStock,
        Self::DoctorOptions,
    ];

    pub fn id(&self) -> &'static str {
        match self {
            Self::PatientUpcoming => "patient-upcoming-appointments",
            Self::PatientAppointments => "patient-appointments",
            Self::PatientPrescriptions => "patient-prescriptions",
            Self::DoctorToday => "doctor-appointments",
            Self::DoctorUpcoming => "doctor-upcoming-appointments",
            Self::DoctorAppointments => "doctor-all-appointments",
            Self::PharmacyPrescriptions => "pharmacy-prescriptions",
            Self::PharmacyLowStock => "pharmacy-low-stock",
            Self::DoctorOptions => "appointment-doctor",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Self::PatientUpcoming | Self::DoctorUpcoming => "Upcoming Appointments",
            Self::PatientAppointments | Self::DoctorAppointments => "All Appointments",
            Self::PatientPrescriptions => "My Prescriptions",
            Self::DoctorToday => "Today's Appointments",
            Self::PharmacyPrescriptions => "Pending Prescriptions",
            Self::PharmacyLowStock => "Low Stock Items",
            Self::DoctorOptions => "Available Doctors",
        }
    }

    pub fn page(&self) -> Page {
        match self {
            Self::PatientUpcoming | Self::PatientAppointments | Self::PatientPrescriptions => {
                Page::Dashboard(Role::Patient)
            }
            Self::DoctorToday | Self::DoctorUpcoming | Self::DoctorAppointments => {
                Page::Dashboard(Role::Doctor)
            }
            Self::PharmacyPrescriptions | Self::PharmacyLowStock => {
                Page::Dashboard(Role::Pharmacy)
            }
            Self::DoctorOptions => Page::BookAppointment,
        }
    }

    /// Placeholder shown when the region's source list is absent or empty.
    pub fn empty_state(&self) -> EmptyState {
        let (icon, message) = match self {
            Self::PatientUpcoming | Self::DoctorUpcoming => {
                ("fas fa-calendar-times", "No upcoming appointments")
            }
            Self::PatientAppointments => ("fas fa-calendar", "No appointments scheduled"),
            Self::DoctorAppointments => ("fas fa-calendar", "No appointments found"),
            Self::PatientPrescriptions => ("fas fa-prescription-bottle", "No prescriptions"),
            Self::DoctorToday => ("fas fa-calendar-check", "No appointments today"),
            Self::PharmacyPrescriptions => ("fas fa-prescription", "No pending prescriptions"),
            Self::PharmacyLowStock => ("fas fa-boxes", "No low stock items"),
            Self::DoctorOptions => ("fas fa-user-md", "No doctors available"),
        };
        EmptyState { icon, message }
    }
}

/// A numeric counter on a dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Stat {
    PatientTotalAppointments,
    PatientUpcoming,
    PatientActivePrescriptions,
    PatientTotalPrescriptions,
    DoctorToday,
    DoctorPatients,
    DoctorTotalAppointments,
    DoctorCompleted,
    DoctorPending,
    DoctorCancelled,
    PharmacyPending,
    PharmacyInventory,
    PharmacyLowStock,
    PharmacyTotalPrescriptions,
}

impl Stat {
    pub fn label(&self) -> &'static str {
        match self {
            Self::PatientTotalAppointments | Self::DoctorTotalAppointments => "Total Appointments",
            Self::PatientUpcoming => "Upcoming",
            Self::PatientActivePrescriptions => "Active Prescriptions",
            Self::PatientTotalPrescriptions | Self::PharmacyTotalPrescriptions => {
                "Total Prescriptions"
            }
            Self::DoctorToday => "Today's Appointments",
            Self::DoctorPatients => "Patients",
            Self::DoctorCompleted => "Completed",
            Self::DoctorPending => "Pending",
            Self::DoctorCancelled => "Cancelled",
            Self::PharmacyPending => "Pending Prescriptions",
            Self::PharmacyInventory => "Inventory Items",
            Self::PharmacyLowStock => "Low Stock",
        }
    }

    pub fn role(&self) -> Role {
        match self {
            Self::PatientTotalAppointments
            | Self::PatientUpcoming
            | Self::PatientActivePrescriptions
            | Self::PatientTotalPrescriptions => Role::Patient,
            Self::DoctorToday
            | Self::DoctorPatients
            | Self::DoctorTotalAppointments
            | Self::DoctorCompleted
            | Self::DoctorPending
            | Self::DoctorCancelled => Role::Doctor,
            Self::PharmacyPending
            | Self::PharmacyInventory
            | Self::PharmacyLowStock
            | Self::PharmacyTotalPrescriptions => Role::Pharmacy,
        }
    }
}

// ---------------------------------------------------------------------------
// Region content
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EmptyState {
    pub icon: &'static str,
    pub message: &'static str,
}

/// A status change a viewer may request for an appointment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppointmentAction {
    Confirm,
    Complete,
    Cancel,
}

impl AppointmentAction {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Confirm => "Confirm",
            Self::Complete => "Complete",
            Self::Cancel => "Cancel",
        }
    }

    pub fn target_status(&self) -> AppointmentStatus {
        match self {
            Self::Confirm => AppointmentStatus::Confirmed,
            Self::Complete => AppointmentStatus::Completed,
            Self::Cancel => AppointmentStatus::Cancelled,
        }
    }

    /// Actions offered for an appointment in `status` to a `viewer`.
    ///
    /// | status    | doctor            | patient |
    /// |-----------|-------------------|---------|
    /// | SCHEDULED | Confirm, Cancel   | Cancel  |
    /// | CONFIRMED | Complete, Cancel  | Cancel  |
    /// | otherwise | none              | none    |
    pub fn allowed_for(status: AppointmentStatus, viewer: Role) -> Vec<Self> {
        match (viewer, status) {
            (Role::Doctor, AppointmentStatus::Scheduled) => vec![Self::Confirm, Self::Cancel],
            (Role::Doctor, AppointmentStatus::Confirmed) => vec![Self::Complete, Self::Cancel],
            (Role::Patient, AppointmentStatus::Scheduled | AppointmentStatus::Confirmed) => {
                vec![Self::Cancel]
            }
            _ => Vec::new(),
        }
    }
}

/// How much of an appointment a card shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CardDetail {
    /// Counterpart, time, specialization, reason, status.
    Summary,
    /// Adds contact details for doctors and clinical notes for patients.
    History,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AppointmentCard {
    pub appointment: Appointment,
    pub viewer: Role,
    pub detail: CardDetail,
    pub actions: Vec<AppointmentAction>,
}

impl AppointmentCard {
    pub fn new(appointment: Appointment, viewer: Role, detail: CardDetail) -> Self {
        let actions = AppointmentAction::allowed_for(appointment.status, viewer);
        Self {
            appointment,
            viewer,
            detail,
            actions,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PrescriptionCard {
    pub prescription: Prescription,
    /// Pharmacies see who the prescription is for.
    pub show_patient: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum RegionContent {
    Empty(EmptyState),
    Appointments(Vec<AppointmentCard>),
    Prescriptions(Vec<PrescriptionCard>),
    Inventory(Vec<InventoryItem>),
    Doctors(Vec<DoctorOption>),
}

impl RegionContent {
    pub fn is_empty_state(&self) -> bool {
        matches!(self, Self::Empty(_))
    }

    pub fn appointments(&self) -> &[AppointmentCard] {
        match self {
            Self::Appointments(cards) => cards,
            _ => &[],
        }
    }
}

// ---------------------------------------------------------------------------
// App state
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct AppState {
    session: Option<User>,
    page: Page,
    regions: BTreeMap<Region, RegionContent>,
    stats: BTreeMap<Stat, u64>,
    headline: Option<String>,
    pub notifications: NotificationCenter,
}

impl AppState {
    pub fn new(notifications: NotificationCenter) -> Self {
        Self {
            session: None,
            page: Page::Landing,
            regions: BTreeMap::new(),
            stats: BTreeMap::new(),
            headline: None,
            notifications,
        }
    }

    pub fn user(&self) -> Option<&User> {
        self.session.as_ref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.session.is_some()
    }

    pub fn page(&self) -> Page {
        self.page
    }

    /// Name shown in the navigation bar; `None` means the sign-in links show.
    pub fn nav_label(&self) -> Option<String> {
        self.session.as_ref().map(User::full_name)
    }

    pub fn headline(&self) -> Option<&str> {
        self.headline.as_deref()
    }

    pub fn region(&self, region: Region) -> Option<&RegionContent> {
        self.regions.get(&region)
    }

    /// Missing counters read as zero.
    pub fn stat(&self, stat: Stat) -> u64 {
        self.stats.get(&stat).copied().unwrap_or(0)
    }

    /// Regions hosted by the visible page, in display order.
    pub fn visible_regions(&self) -> Vec<(Region, Option<&RegionContent>)> {
        Region::ALL
            .iter()
            .filter(|r| r.page() == self.page)
            .map(|r| (*r, self.regions.get(r)))
            .collect()
    }

    /// Stats of the visible dashboard, in display order.
    pub fn visible_stats(&self) -> Vec<(Stat, u64)> {
        match self.page {
            Page::Dashboard(role) => self
                .stats
                .iter()
                .filter(|(stat, _)| stat.role() == role)
                .map(|(stat, value)| (*stat, *value))
                .collect(),
            _ => Vec::new(),
        }
    }

    /// Find a rendered appointment card for `role` by appointment id.
    pub fn find_appointment(&self, role: Role, id: &str) -> Option<&AppointmentCard> {
        self.regions
            .iter()
            .filter(|(region, _)| region.page() == Page::Dashboard(role))
            .flat_map(|(_, content)| content.appointments())
            .find(|card| card.appointment.id == id)
    }

    pub(crate) fn set_session(&mut self, user: User) {
        self.session = Some(user);
    }

    /// Forget the user and everything rendered for them.
    pub(crate) fn clear_session(&mut self) {
        self.session = None;
        self.regions.clear();
        self.stats.clear();
        self.headline = None;
    }

    /// Hide every page, then reveal `page`.
    pub(crate) fn show_page(&mut self, page: Page) {
        self.page = page;
    }

    pub(crate) fn set_region(&mut self, region: Region, content: RegionContent) {
        self.regions.insert(region, content);
    }

    pub(crate) fn set_stat(&mut self, stat: Stat, value: u64) {
        self.stats.insert(stat, value);
    }

    pub(crate) fn set_headline(&mut self, headline: impl Into<String>) {
        self.headline = Some(headline.into());
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
