//! Dashboard controller: session handling, role dashboards and appointment
//! actions.
//!
//! Every operation here is infallible from the caller's point of view.
//! Backend and network failures are logged and turned into notifications on
//! the [`AppState`]; the view is never left half-written. Mutations are
//! never applied locally: after a successful change the role's dashboard is
//! fetched again and re-rendered from the server's answer.
//!
//! Each role loads in two independent steps. Step one fetches the dashboard
//! aggregate (counters plus a primary list), step two fetches the detail
//! lists. A failure in one step does not stop the other.

use chrono::{Local, NaiveDateTime};

use crate::api::{ApiClient, ApiError, Transport};
use crate::models::{
    Appointment, BookingRequest, DoctorDashboard, PatientDashboard, PharmacyDashboard,
    RegisterRequest, Role, User,
};
use crate::notify::{NotificationCenter, Severity};
use crate::state::{
    AppState, AppointmentAction, AppointmentCard, CardDetail, Page, PrescriptionCard, Region,
    RegionContent, Stat,
};

/// Prompt shown before a patient cancels an appointment.
pub const CANCEL_PROMPT: &str = "Are you sure you want to cancel this appointment?";

/// Appointments strictly after `now` whose status is SCHEDULED or CONFIRMED,
/// in the order given.
pub fn filter_upcoming(appointments: &[Appointment], now: NaiveDateTime) -> Vec<Appointment> {
    appointments
        .iter()
        .filter(|a| a.is_upcoming(now))
        .cloned()
        .collect()
}

fn local_now() -> NaiveDateTime {
    Local::now().naive_local()
}

pub struct DashboardController<T> {
    api: ApiClient<T>,
    state: AppState,
    clock: fn() -> NaiveDateTime,
}

impl<T: Transport> DashboardController<T> {
    pub fn new(api: ApiClient<T>, notifications: NotificationCenter) -> Self {
        Self {
            api,
            state: AppState::new(notifications),
            clock: local_now,
        }
    }

    /// Replace the wall clock used by the upcoming filter.
    pub fn with_clock(mut self, clock: fn() -> NaiveDateTime) -> Self {
        self.clock = clock;
        self
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn notifications_mut(&mut self) -> &mut NotificationCenter {
        &mut self.state.notifications
    }

    pub fn api(&self) -> &ApiClient<T> {
        &self.api
    }

    pub fn current_user(&self) -> Option<&User> {
        self.state.user()
    }

    // -----------------------------------------------------------------------
    // Session
    // -----------------------------------------------------------------------

    /// Ask the backend for an existing session. Any failure lands on the
    /// landing page signed out.
    pub fn check_session(&mut self) {
        match self.api.current_user() {
            Ok(user) => self.adopt_user(user),
            Err(err) => {
                tracing::debug!(error = %err, "no active session");
                self.state.clear_session();
                self.state.show_page(Page::Landing);
            }
        }
    }

    pub fn login(&mut self, email: &str, password: &str) -> bool {
        match self.api.login(email, password) {
            Ok(user) => {
                self.notify(Severity::Success, "Login successful!");
                self.adopt_user(user);
                true
            }
            Err(err) => {
                tracing::warn!(error = %err, "login failed");
                self.notify_failure(&err, "Login failed");
                false
            }
        }
    }

    pub fn register(&mut self, request: RegisterRequest) -> bool {
        let request = request.retain_role_fields();
        match self.api.register(&request) {
            Ok(user) => {
                self.notify(Severity::Success, "Registration successful!");
                self.adopt_user(user);
                true
            }
            Err(err) => {
                tracing::warn!(error = %err, "registration failed");
                self.notify_failure(&err, "Registration failed");
                false
            }
        }
    }

    /// Best effort: the local session is dropped whatever the backend says.
    pub fn logout(&mut self) {
        if let Err(err) = self.api.logout() {
            tracing::warn!(error = %err, "logout request failed");
        }
        self.state.clear_session();
        self.state.show_page(Page::Landing);
        self.notify(Severity::Success, "Logged out successfully");
    }

    fn adopt_user(&mut self, user: User) {
        let role = user.role;
        self.state.clear_session();
        self.state.set_session(user);
        self.show_dashboard(role);
    }

    // -----------------------------------------------------------------------
    // Navigation
    // -----------------------------------------------------------------------

    /// Switch the visible page. Dashboards load their data on every switch.
    pub fn show_page(&mut self, page: Page) {
        match page {
            Page::Dashboard(role) => self.show_dashboard(role),
            Page::BookAppointment => self.show_book_appointment(),
            other => self.state.show_page(other),
        }
    }

    /// Show the signed-in user's dashboard. A request for another role's
    /// dashboard lands on the user's own; without a session it lands on the
    /// landing page and nothing is fetched.
    pub fn show_dashboard(&mut self, role: Role) {
        let Some(own) = self.state.user().map(|u| u.role) else {
            tracing::debug!(%role, "dashboard requested without a session");
            self.state.show_page(Page::Landing);
            return;
        };
        if own != role {
            tracing::warn!(requested = %role, %own, "dashboard for another role requested");
        }
        self.state.show_page(Page::Dashboard(own));
        self.load_dashboard(own);
    }

    /// Reload the current user's dashboard, if signed in.
    pub fn refresh(&mut self) {
        if let Some(role) = self.state.user().map(|u| u.role) {
            self.show_dashboard(role);
        }
    }

    fn load_dashboard(&mut self, role: Role) {
        match role {
            Role::Patient => self.load_patient_dashboard(),
            Role::Doctor => self.load_doctor_dashboard(),
            Role::Pharmacy => self.load_pharmacy_dashboard(),
        }
    }

    // -----------------------------------------------------------------------
    // Patient
    // -----------------------------------------------------------------------

    fn load_patient_dashboard(&mut self) {
        match self.api.patient_dashboard() {
            Ok(data) => self.populate_patient_dashboard(data),
            Err(err) => self.report_load_failure("patient dashboard", &err),
        }

        match self.api.my_appointments() {
            Ok(list) => self.render_appointments(
                Region::PatientAppointments,
                list,
                Role::Patient,
                CardDetail::History,
            ),
            Err(err) => self.report_load_failure("appointment history", &err),
        }

        match self.api.my_prescriptions() {
            Ok(list) => {
                let cards = list
                    .into_iter()
                    .map(|prescription| PrescriptionCard {
                        prescription,
                        show_patient: false,
                    })
                    .collect();
                self.fill_region(Region::PatientPrescriptions, cards, RegionContent::Prescriptions);
            }
            Err(err) => self.report_load_failure("prescription history", &err),
        }
    }

    fn populate_patient_dashboard(&mut self, data: PatientDashboard) {
        if let Some(user) = self.state.user() {
            let greeting = format!("Welcome back, {}", user.first_name);
            self.state.set_headline(greeting);
        }

        let upcoming = filter_upcoming(
            data.upcoming_appointments.as_deref().unwrap_or_default(),
            (self.clock)(),
        );
        let active = data.active_prescriptions.unwrap_or_default();

        self.state
            .set_stat(Stat::PatientTotalAppointments, data.total_appointments.unwrap_or(0));
        self.state.set_stat(Stat::PatientUpcoming, upcoming.len() as u64);
        self.state
            .set_stat(Stat::PatientActivePrescriptions, active.len() as u64);
        self.state
            .set_stat(Stat::PatientTotalPrescriptions, data.total_prescriptions.unwrap_or(0));

        self.render_appointments(
            Region::PatientUpcoming,
            upcoming,
            Role::Patient,
            CardDetail::Summary,
        );
    }

    // -----------------------------------------------------------------------
    // Doctor
    // -----------------------------------------------------------------------

    fn load_doctor_dashboard(&mut self) {
        match self.api.doctor_dashboard() {
            Ok(data) => self.populate_doctor_dashboard(data),
            Err(err) => self.report_load_failure("doctor dashboard", &err),
        }

        match self.api.doctor_booked_appointments() {
            Ok(list) => {
                let upcoming = filter_upcoming(&list, (self.clock)());
                self.render_appointments(
                    Region::DoctorUpcoming,
                    upcoming,
                    Role::Doctor,
                    CardDetail::Summary,
                );
                self.render_appointments(
                    Region::DoctorAppointments,
                    list,
                    Role::Doctor,
                    CardDetail::History,
                );
            }
            Err(err) => self.report_load_failure("appointment history", &err),
        }
    }

    fn populate_doctor_dashboard(&mut self, data: DoctorDashboard) {
        if let Some(user) = self.state.user() {
            let name = format!("Dr. {}", user.full_name());
            self.state.set_headline(name);
        }

        let today = data.today_appointments.unwrap_or_default();
        let stats = data.stats.unwrap_or_default();

        self.state.set_stat(Stat::DoctorToday, today.len() as u64);
        self.state
            .set_stat(Stat::DoctorPatients, data.total_patients.unwrap_or(0));
        self.state
            .set_stat(Stat::DoctorTotalAppointments, data.total_appointments.unwrap_or(0));
        self.state
            .set_stat(Stat::DoctorCompleted, stats.completed_appointments.unwrap_or(0));
        self.state
            .set_stat(Stat::DoctorPending, stats.pending_appointments.unwrap_or(0));
        self.state
            .set_stat(Stat::DoctorCancelled, stats.cancelled_appointments.unwrap_or(0));

        self.render_appointments(Region::DoctorToday, today, Role::Doctor, CardDetail::Summary);
    }

    // -----------------------------------------------------------------------
    // Pharmacy
    // -----------------------------------------------------------------------

    fn load_pharmacy_dashboard(&mut self) {
        match self.api.pharmacy_dashboard() {
            Ok(data) => self.populate_pharmacy_dashboard(data),
            Err(err) => self.report_load_failure("pharmacy dashboard", &err),
        }
    }

    fn populate_pharmacy_dashboard(&mut self, data: PharmacyDashboard) {
        let name = data
            .pharmacy
            .and_then(|p| p.pharmacy_name)
            .filter(|n| !n.trim().is_empty())
            .or_else(|| self.state.user().map(User::full_name));
        if let Some(name) = name {
            self.state.set_headline(name);
        }

        let pending = data.pending_prescriptions.unwrap_or_default();
        let low_stock = data.low_stock_items.unwrap_or_default();

        self.state.set_stat(Stat::PharmacyPending, pending.len() as u64);
        self.state
            .set_stat(Stat::PharmacyInventory, data.total_inventory_items.unwrap_or(0));
        self.state.set_stat(Stat::PharmacyLowStock, low_stock.len() as u64);
        self.state
            .set_stat(Stat::PharmacyTotalPrescriptions, data.total_prescriptions.unwrap_or(0));

        let cards = pending
            .into_iter()
            .map(|prescription| PrescriptionCard {
                prescription,
                show_patient: true,
            })
            .collect();
        self.fill_region(Region::PharmacyPrescriptions, cards, RegionContent::Prescriptions);
        self.fill_region(Region::PharmacyLowStock, low_stock, RegionContent::Inventory);
    }

    // -----------------------------------------------------------------------
    // Booking
    // -----------------------------------------------------------------------

    pub fn show_book_appointment(&mut self) {
        if !self.state.is_authenticated() {
            self.state.show_page(Page::Landing);
            return;
        }
        self.state.show_page(Page::BookAppointment);
        self.load_doctors();
    }

    pub fn load_doctors(&mut self) {
        match self.api.available_doctors() {
            Ok(doctors) => self.fill_region(Region::DoctorOptions, doctors, RegionContent::Doctors),
            Err(err) => {
                tracing::warn!(error = %err, "failed to load doctors");
                self.notify(Severity::Error, "Failed to load doctors");
            }
        }
    }

    pub fn book_appointment(&mut self, request: &BookingRequest) -> bool {
        match self.api.book_appointment(request) {
            Ok(()) => {
                self.notify(Severity::Success, "Appointment booked successfully!");
                self.refresh();
                true
            }
            Err(err) => {
                tracing::warn!(error = %err, "appointment booking failed");
                self.notify_failure(&err, "Failed to book appointment");
                false
            }
        }
    }

    // -----------------------------------------------------------------------
    // Appointment actions
    // -----------------------------------------------------------------------

    /// Doctor: SCHEDULED → CONFIRMED.
    pub fn confirm_appointment(&mut self, appointment_id: &str) -> bool {
        self.request_status_change(appointment_id, AppointmentAction::Confirm)
    }

    /// Doctor: CONFIRMED → COMPLETED.
    pub fn complete_appointment(&mut self, appointment_id: &str) -> bool {
        self.request_status_change(appointment_id, AppointmentAction::Complete)
    }

    /// Cancel an open appointment.
    ///
    /// Patients are asked through `confirm` first and a declined prompt
    /// sends nothing; the cancellation itself is a DELETE. Doctors cancel
    /// through a status update without a prompt.
    pub fn cancel_appointment<F>(&mut self, appointment_id: &str, confirm: F) -> bool
    where
        F: FnOnce(&str) -> bool,
    {
        let Some(role) = self.permit(appointment_id, AppointmentAction::Cancel) else {
            return false;
        };

        if role != Role::Patient {
            return self.send_status_change(role, appointment_id, AppointmentAction::Cancel);
        }
        if !confirm(CANCEL_PROMPT) {
            return false;
        }

        match self.api.delete_appointment(appointment_id) {
            Ok(()) => {
                self.notify(Severity::Success, "Appointment cancelled successfully!");
                self.load_dashboard(role);
                true
            }
            Err(err) => {
                tracing::warn!(error = %err, appointment_id, "appointment cancellation failed");
                self.notify_failure(&err, "Failed to cancel appointment");
                false
            }
        }
    }

    fn request_status_change(&mut self, appointment_id: &str, action: AppointmentAction) -> bool {
        match self.permit(appointment_id, action) {
            Some(role) => self.send_status_change(role, appointment_id, action),
            None => false,
        }
    }

    fn send_status_change(&mut self, role: Role, appointment_id: &str, action: AppointmentAction) -> bool {
        let status = action.target_status();
        match self.api.update_appointment_status(appointment_id, status) {
            Ok(()) => {
                let verb = status.as_str().to_ascii_lowercase();
                self.notify(Severity::Success, format!("Appointment {verb} successfully!"));
                self.load_dashboard(role);
                true
            }
            Err(err) => {
                tracing::warn!(error = %err, appointment_id, %status, "status update failed");
                self.notify_failure(&err, "Failed to update appointment status");
                false
            }
        }
    }

    /// An action is only reachable through a rendered card that offers it.
    fn permit(&mut self, appointment_id: &str, action: AppointmentAction) -> Option<Role> {
        let Some(role) = self.state.user().map(|u| u.role) else {
            self.notify(Severity::Error, "Please log in first");
            return None;
        };

        let offered = self
            .state
            .find_appointment(role, appointment_id)
            .map(|card| (card.actions.contains(&action), card.appointment.status));

        match offered {
            Some((true, _)) => Some(role),
            Some((false, status)) => {
                self.notify(
                    Severity::Error,
                    format!(
                        "Cannot {} an appointment that is {}",
                        action.label().to_ascii_lowercase(),
                        status.display_name().to_ascii_lowercase()
                    ),
                );
                None
            }
            None => {
                self.notify(
                    Severity::Error,
                    format!("Appointment {appointment_id} is not on your dashboard"),
                );
                None
            }
        }
    }

    // -----------------------------------------------------------------------
    // Rendering helpers
    // -----------------------------------------------------------------------

    fn render_appointments(
        &mut self,
        region: Region,
        appointments: Vec<Appointment>,
        viewer: Role,
        detail: CardDetail,
    ) {
        let cards = appointments
            .into_iter()
            .map(|a| AppointmentCard::new(a, viewer, detail))
            .collect();
        self.fill_region(region, cards, RegionContent::Appointments);
    }

    /// Empty lists render the region's placeholder; otherwise one card per
    /// element in backend order.
    fn fill_region<I>(&mut self, region: Region, items: Vec<I>, wrap: fn(Vec<I>) -> RegionContent) {
        let content = if items.is_empty() {
            RegionContent::Empty(region.empty_state())
        } else {
            wrap(items)
        };
        self.state.set_region(region, content);
    }

    fn report_load_failure(&mut self, what: &str, err: &ApiError) {
        tracing::warn!(error = %err, "failed to load {what}");
        self.notify(Severity::Error, format!("Failed to load {what}"));
    }

    fn notify(&mut self, severity: Severity, message: impl Into<String>) {
        self.state.notifications.push(severity, message);
    }

    /// Prefer the server's explanation; fall back to generic text.
    fn notify_failure(&mut self, err: &ApiError, fallback: &str) {
        let message = match (err.server_message(), err) {
            (Some(msg), _) => msg.to_string(),
            (None, ApiError::Transport(_)) => format!("{fallback}. Please try again."),
            (None, _) => fallback.to_string(),
        };
        self.notify(Severity::Error, message);
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
