//! Dashboard controller tests.
//!
//! Drive the controller through the scripted transport and assert on the
//! requests it issues and the state it leaves behind.

mod common;

use serde_json::json;

use common::{Scripted, appointment, controller, user};
use mediconnect::api::Method;
use mediconnect::models::{AppointmentType, BookingRequest, RegisterRequest, Role};
use mediconnect::notify::Severity;
use mediconnect::state::{AppointmentAction, Page, Region, RegionContent, Stat};

fn login_reply(role: &str) -> serde_json::Value {
    json!({ "message": "Login successful", "user": user(role) })
}

fn patient_backend() -> Scripted {
    let t = Scripted::new();
    t.on(Method::Post, "/api/auth/login", 200, login_reply("PATIENT"));
    t.on(
        Method::Get,
        "/api/patient/dashboard",
        200,
        json!({
            "upcomingAppointments": [
                appointment("a1", "2030-07-01T10:00:00", "SCHEDULED"),
                appointment("a2", "2030-06-01T10:00:00", "SCHEDULED"),
                appointment("a3", "2030-07-02T10:00:00", "CANCELLED"),
                appointment("a4", "2030-07-03T10:00:00", "CONFIRMED"),
            ],
            "activePrescriptions": [{ "id": "p1" }],
            "totalAppointments": 7,
        }),
    );
    t.on(
        Method::Get,
        "/api/appointments/my-appointments",
        200,
        json!([appointment("a1", "2030-07-01T10:00:00", "SCHEDULED")]),
    );
    t.on(Method::Get, "/api/patient/prescriptions/my-prescriptions", 200, json!([]));
    t
}

fn doctor_backend() -> Scripted {
    let t = Scripted::new();
    t.on(Method::Post, "/api/auth/login", 200, login_reply("DOCTOR"));
    t.on(
        Method::Get,
        "/api/doctor/dashboard",
        200,
        json!({
            "todayAppointments": [appointment("d1", "2030-06-10T15:00:00", "CONFIRMED")],
            "totalPatients": 12,
            "stats": { "completedAppointments": 4 },
        }),
    );
    t.on(
        Method::Get,
        "/api/appointments/doctor/booked",
        200,
        json!([
            appointment("d1", "2030-06-10T15:00:00", "CONFIRMED"),
            appointment("d2", "2030-06-20T09:00:00", "SCHEDULED"),
            appointment("d3", "2030-05-20T09:00:00", "COMPLETED"),
        ]),
    );
    t
}

fn messages(ctl: &mediconnect::dashboard::DashboardController<Scripted>) -> Vec<(Severity, String)> {
    ctl.state()
        .notifications
        .active()
        .map(|n| (n.severity, n.message.clone()))
        .collect()
}

// ---------------------------------------------------------------------------
// Login and fetch sets
// ---------------------------------------------------------------------------

#[test]
fn patient_login_shows_dashboard_and_fetches_patient_set() {
    let t = patient_backend();
    let mut ctl = controller(&t);

    assert!(ctl.login("kim@example.org", "pw"));

    assert_eq!(ctl.state().page(), Page::Dashboard(Role::Patient));
    assert_eq!(ctl.state().nav_label().as_deref(), Some("Kim Lee"));
    assert_eq!(ctl.state().headline(), Some("Welcome back, Kim"));
    assert_eq!(
        t.calls(),
        [
            "POST /api/auth/login",
            "GET /api/patient/dashboard",
            "GET /api/appointments/my-appointments",
            "GET /api/patient/prescriptions/my-prescriptions",
        ]
    );
    assert!(messages(&ctl).contains(&(Severity::Success, "Login successful!".to_string())));
}

#[test]
fn login_sends_credentials() {
    let t = patient_backend();
    let mut ctl = controller(&t);
    ctl.login("kim@example.org", "pw");
    let first = &t.requests()[0];
    assert_eq!(
        first.body,
        Some(json!({ "email": "kim@example.org", "password": "pw" }))
    );
}

#[test]
fn doctor_login_fetches_doctor_set() {
    let t = doctor_backend();
    let mut ctl = controller(&t);
    assert!(ctl.login("ana@example.org", "pw"));

    assert_eq!(ctl.state().page(), Page::Dashboard(Role::Doctor));
    assert_eq!(ctl.state().headline(), Some("Dr. Kim Lee"));
    assert_eq!(
        t.calls(),
        [
            "POST /api/auth/login",
            "GET /api/doctor/dashboard",
            "GET /api/appointments/doctor/booked",
        ]
    );
}

#[test]
fn pharmacy_login_fetches_only_the_aggregate() {
    let t = Scripted::new();
    t.on(Method::Post, "/api/auth/login", 200, login_reply("PHARMACY"));
    t.on(
        Method::Get,
        "/api/pharmacy/dashboard",
        200,
        json!({
            "pharmacy": { "pharmacyName": "Corner Pharmacy" },
            "pendingPrescriptions": [{ "id": "rx-000111222", "patient": { "user": { "firstName": "Kim", "lastName": "Lee" } } }],
            "lowStockItems": [{ "medicineName": "Amoxicillin", "currentStock": 3, "minStockLevel": 10 }],
            "totalInventoryItems": 40,
        }),
    );
    let mut ctl = controller(&t);
    assert!(ctl.login("shop@example.org", "pw"));

    assert_eq!(t.calls(), ["POST /api/auth/login", "GET /api/pharmacy/dashboard"]);
    assert_eq!(ctl.state().headline(), Some("Corner Pharmacy"));
    assert_eq!(ctl.state().stat(Stat::PharmacyPending), 1);
    assert_eq!(ctl.state().stat(Stat::PharmacyLowStock), 1);
    assert_eq!(ctl.state().stat(Stat::PharmacyInventory), 40);
    assert_eq!(ctl.state().stat(Stat::PharmacyTotalPrescriptions), 0);
}

#[test]
fn failed_login_keeps_page_and_shows_server_message() {
    let t = Scripted::new();
    t.on(Method::Post, "/api/auth/login", 401, json!({ "message": "Invalid credentials" }));
    let mut ctl = controller(&t);
    ctl.show_page(Page::Login);

    assert!(!ctl.login("kim@example.org", "wrong"));
    assert_eq!(ctl.state().page(), Page::Login);
    assert!(!ctl.state().is_authenticated());
    assert_eq!(
        messages(&ctl),
        [(Severity::Error, "Invalid credentials".to_string())]
    );
}

#[test]
fn unreachable_backend_gets_generic_message() {
    let t = Scripted::new();
    t.on_unreachable(Method::Post, "/api/auth/login");
    let mut ctl = controller(&t);
    assert!(!ctl.login("kim@example.org", "pw"));
    assert_eq!(
        messages(&ctl),
        [(Severity::Error, "Login failed. Please try again.".to_string())]
    );
}

// ---------------------------------------------------------------------------
// Session
// ---------------------------------------------------------------------------

#[test]
fn other_role_dashboard_falls_back_to_own() {
    let t = patient_backend();
    let mut ctl = controller(&t);
    ctl.login("kim@example.org", "pw");
    t.clear_log();

    ctl.show_page(Page::Dashboard(Role::Doctor));

    assert_eq!(ctl.state().page(), Page::Dashboard(Role::Patient));
    assert!(t.calls().iter().all(|c| !c.contains("/doctor")));
    assert_eq!(t.calls()[0], "GET /api/patient/dashboard");
}

#[test]
fn dashboard_without_session_fetches_nothing() {
    let t = Scripted::new();
    let mut ctl = controller(&t);

    ctl.show_page(Page::Dashboard(Role::Pharmacy));
    assert_eq!(ctl.state().page(), Page::Landing);
    ctl.show_page(Page::BookAppointment);
    assert_eq!(ctl.state().page(), Page::Landing);
    assert!(t.calls().is_empty());
}

#[test]
fn session_check_without_session_lands_on_landing() {
    let t = Scripted::new();
    t.on(Method::Get, "/api/auth/user", 401, json!({ "message": "Not authenticated" }));
    let mut ctl = controller(&t);
    ctl.check_session();
    assert_eq!(ctl.state().page(), Page::Landing);
    assert!(!ctl.state().is_authenticated());
    assert!(ctl.state().notifications.is_empty());
}

#[test]
fn session_check_with_session_loads_dashboard() {
    let t = doctor_backend();
    t.on(Method::Get, "/api/auth/user", 200, user("DOCTOR"));
    let mut ctl = controller(&t);
    ctl.check_session();
    assert_eq!(ctl.state().page(), Page::Dashboard(Role::Doctor));
    assert_eq!(t.calls()[0], "GET /api/auth/user");
}

#[test]
fn logout_clears_state_even_when_backend_fails() {
    let t = patient_backend();
    t.on_unreachable(Method::Post, "/api/auth/logout");
    let mut ctl = controller(&t);
    ctl.login("kim@example.org", "pw");

    ctl.logout();
    assert_eq!(ctl.state().page(), Page::Landing);
    assert!(!ctl.state().is_authenticated());
    assert!(ctl.state().nav_label().is_none());
    assert_eq!(ctl.state().stat(Stat::PatientTotalAppointments), 0);
    assert_eq!(
        ctl.state().notifications.latest().map(|n| n.message.as_str()),
        Some("Logged out successfully")
    );
}

#[test]
fn register_sends_only_role_fields() {
    let t = Scripted::new();
    t.on(
        Method::Post,
        "/api/auth/register",
        200,
        json!({ "message": "ok", "user": user("PHARMACY") }),
    );
    t.on(Method::Get, "/api/pharmacy/dashboard", 200, json!({}));
    let mut ctl = controller(&t);

    let mut request = RegisterRequest::new("shop@example.org", "Kim", "Lee", "pw", Role::Pharmacy);
    request.pharmacy_name = Some("Corner Pharmacy".into());
    request.license_number = Some("L-9".into());
    request.gender = Some("F".into());
    assert!(ctl.register(request));

    let body = t.requests()[0].body.clone().unwrap();
    assert_eq!(body["pharmacyName"], "Corner Pharmacy");
    assert_eq!(body["role"], "PHARMACY");
    assert!(body["licenseNumber"].is_null());
    assert!(body["gender"].is_null());
    assert_eq!(ctl.state().page(), Page::Dashboard(Role::Pharmacy));
    assert!(messages(&ctl).contains(&(Severity::Success, "Registration successful!".to_string())));
}

// ---------------------------------------------------------------------------
// Rendering rules
// ---------------------------------------------------------------------------

#[test]
fn upcoming_region_applies_filter_with_fixed_clock() {
    let t = patient_backend();
    let mut ctl = controller(&t);
    ctl.login("kim@example.org", "pw");

    let ids: Vec<_> = ctl
        .state()
        .region(Region::PatientUpcoming)
        .unwrap()
        .appointments()
        .iter()
        .map(|c| c.appointment.id.clone())
        .collect();
    assert_eq!(ids, ["a1", "a4"]);
    assert_eq!(ctl.state().stat(Stat::PatientUpcoming), 2);
    assert_eq!(ctl.state().stat(Stat::PatientActivePrescriptions), 1);
    assert_eq!(ctl.state().stat(Stat::PatientTotalAppointments), 7);
}

#[test]
fn missing_aggregate_fields_default_to_zero() {
    let t = Scripted::new();
    t.on(Method::Post, "/api/auth/login", 200, login_reply("DOCTOR"));
    t.on(Method::Get, "/api/doctor/dashboard", 200, json!({}));
    t.on(Method::Get, "/api/appointments/doctor/booked", 200, json!(null));
    let mut ctl = controller(&t);
    ctl.login("ana@example.org", "pw");

    for (stat, value) in ctl.state().visible_stats() {
        assert_eq!(value, 0, "{stat:?}");
    }
    assert_eq!(ctl.state().visible_stats().len(), 6);
}

#[test]
fn empty_lists_render_placeholders() {
    let t = patient_backend();
    let mut ctl = controller(&t);
    ctl.login("kim@example.org", "pw");

    match ctl.state().region(Region::PatientPrescriptions) {
        Some(RegionContent::Empty(empty)) => assert_eq!(empty.message, "No prescriptions"),
        other => panic!("expected empty state, got {other:?}"),
    }
}

#[test]
fn doctor_cards_offer_actions_from_the_table() {
    let t = doctor_backend();
    let mut ctl = controller(&t);
    ctl.login("ana@example.org", "pw");

    let confirmed = ctl.state().find_appointment(Role::Doctor, "d1").unwrap();
    assert_eq!(confirmed.actions, [AppointmentAction::Complete, AppointmentAction::Cancel]);
    let scheduled = ctl.state().find_appointment(Role::Doctor, "d2").unwrap();
    assert_eq!(scheduled.actions, [AppointmentAction::Confirm, AppointmentAction::Cancel]);
    let completed = ctl.state().find_appointment(Role::Doctor, "d3").unwrap();
    assert!(completed.actions.is_empty());

    let upcoming: Vec<_> = ctl
        .state()
        .region(Region::DoctorUpcoming)
        .unwrap()
        .appointments()
        .iter()
        .map(|c| c.appointment.id.as_str())
        .collect();
    assert_eq!(upcoming, ["d1", "d2"]);
}

#[test]
fn failed_step_does_not_block_the_other() {
    let t = Scripted::new();
    t.on(Method::Post, "/api/auth/login", 200, login_reply("PATIENT"));
    t.on(Method::Get, "/api/patient/dashboard", 500, json!({ "error": "boom" }));
    t.on(
        Method::Get,
        "/api/appointments/my-appointments",
        200,
        json!([appointment("a1", "2030-07-01T10:00:00", "SCHEDULED")]),
    );
    t.on(Method::Get, "/api/patient/prescriptions/my-prescriptions", 200, json!([]));
    let mut ctl = controller(&t);
    assert!(ctl.login("kim@example.org", "pw"));

    assert!(ctl.state().region(Region::PatientUpcoming).is_none());
    assert_eq!(
        ctl.state()
            .region(Region::PatientAppointments)
            .unwrap()
            .appointments()
            .len(),
        1
    );
    assert!(messages(&ctl).contains(&(Severity::Error, "Failed to load patient dashboard".to_string())));
}

// ---------------------------------------------------------------------------
// Actions
// ---------------------------------------------------------------------------

#[test]
fn declined_patient_cancel_sends_nothing() {
    let t = patient_backend();
    let mut ctl = controller(&t);
    ctl.login("kim@example.org", "pw");
    t.clear_log();

    let mut asked = None;
    let done = ctl.cancel_appointment("a1", |question| {
        asked = Some(question.to_string());
        false
    });

    assert!(!done);
    assert!(t.calls().is_empty());
    assert_eq!(
        asked.as_deref(),
        Some("Are you sure you want to cancel this appointment?")
    );
}

#[test]
fn confirmed_patient_cancel_sends_one_delete_then_reloads() {
    let t = patient_backend();
    t.on(Method::Delete, "/api/appointments/a1", 200, json!({ "message": "deleted" }));
    let mut ctl = controller(&t);
    ctl.login("kim@example.org", "pw");
    t.clear_log();

    assert!(ctl.cancel_appointment("a1", |_| true));

    let calls = t.calls();
    assert_eq!(calls.iter().filter(|c| c.starts_with("DELETE")).count(), 1);
    assert_eq!(calls[0], "DELETE /api/appointments/a1");
    assert_eq!(
        &calls[1..],
        [
            "GET /api/patient/dashboard",
            "GET /api/appointments/my-appointments",
            "GET /api/patient/prescriptions/my-prescriptions",
        ]
    );
    assert_eq!(
        ctl.state().notifications.latest().map(|n| n.message.as_str()),
        Some("Appointment cancelled successfully!")
    );
}

#[test]
fn doctor_confirm_puts_status_and_reloads() {
    let t = doctor_backend();
    t.on(Method::Put, "/api/appointments/d2/status", 200, json!({ "message": "ok" }));
    let mut ctl = controller(&t);
    ctl.login("ana@example.org", "pw");
    t.clear_log();

    assert!(ctl.confirm_appointment("d2"));
    let requests = t.requests();
    assert_eq!(requests[0].method, Method::Put);
    assert_eq!(requests[0].body, Some(json!({ "status": "CONFIRMED" })));
    assert_eq!(
        t.calls()[1..],
        ["GET /api/doctor/dashboard", "GET /api/appointments/doctor/booked"]
    );
    assert_eq!(
        ctl.state().notifications.latest().map(|n| n.message.as_str()),
        Some("Appointment confirmed successfully!")
    );
}

#[test]
fn doctor_cancel_uses_status_update_without_prompt() {
    let t = doctor_backend();
    t.on(Method::Put, "/api/appointments/d2/status", 200, json!({}));
    let mut ctl = controller(&t);
    ctl.login("ana@example.org", "pw");
    t.clear_log();

    assert!(ctl.cancel_appointment("d2", |_| panic!("doctors are not prompted")));
    assert_eq!(t.requests()[0].body, Some(json!({ "status": "CANCELLED" })));
}

#[test]
fn disallowed_transition_is_rejected_locally() {
    let t = doctor_backend();
    let mut ctl = controller(&t);
    ctl.login("ana@example.org", "pw");
    t.clear_log();

    assert!(!ctl.confirm_appointment("d1"));
    assert!(!ctl.complete_appointment("d3"));
    assert!(!ctl.confirm_appointment("unknown"));
    assert!(t.calls().is_empty());
    assert_eq!(
        ctl.state().notifications.latest().map(|n| n.severity),
        Some(Severity::Error)
    );
}

#[test]
fn failed_transition_leaves_view_unchanged() {
    let t = doctor_backend();
    t.on(Method::Put, "/api/appointments/d1/status", 409, json!({ "message": "Already completed" }));
    let mut ctl = controller(&t);
    ctl.login("ana@example.org", "pw");
    let before = ctl.state().region(Region::DoctorAppointments).cloned();
    t.clear_log();

    assert!(!ctl.complete_appointment("d1"));
    assert_eq!(t.calls(), ["PUT /api/appointments/d1/status"]);
    assert_eq!(ctl.state().region(Region::DoctorAppointments).cloned(), before);
    assert_eq!(
        ctl.state().notifications.latest().map(|n| n.message.as_str()),
        Some("Already completed")
    );
}

// ---------------------------------------------------------------------------
// Booking
// ---------------------------------------------------------------------------

#[test]
fn booking_page_loads_doctors() {
    let t = patient_backend();
    t.on(
        Method::Get,
        "/api/appointments/doctors",
        200,
        json!([{ "id": "doc-1", "name": "Ana Ruiz", "specialization": "Cardiology" }]),
    );
    let mut ctl = controller(&t);
    ctl.login("kim@example.org", "pw");

    ctl.show_page(Page::BookAppointment);
    assert_eq!(ctl.state().page(), Page::BookAppointment);
    match ctl.state().region(Region::DoctorOptions) {
        Some(RegionContent::Doctors(doctors)) => assert_eq!(doctors[0].label(), "Ana Ruiz - Cardiology"),
        other => panic!("expected doctor list, got {other:?}"),
    }
}

#[test]
fn booking_posts_request_and_returns_to_dashboard() {
    let t = patient_backend();
    t.on(Method::Post, "/api/appointments/book", 200, json!({ "id": "new" }));
    let mut ctl = controller(&t);
    ctl.login("kim@example.org", "pw");
    ctl.show_page(Page::BookAppointment);
    t.clear_log();

    let date = chrono::NaiveDate::from_ymd_opt(2030, 7, 15).unwrap();
    let time = chrono::NaiveTime::from_hms_opt(9, 30, 0).unwrap();
    let request = BookingRequest::new("doc-1", date, time, AppointmentType::InPerson, Some("Chest pain".into()));
    assert!(ctl.book_appointment(&request));

    let body = t.requests()[0].body.clone().unwrap();
    assert_eq!(body["doctorId"], "doc-1");
    assert_eq!(body["appointmentDate"], "2030-07-15T09:30:00");
    assert_eq!(body["appointmentType"], "IN_PERSON");
    assert_eq!(body["reason"], "Chest pain");
    assert_eq!(ctl.state().page(), Page::Dashboard(Role::Patient));
    assert!(messages(&ctl).contains(&(Severity::Success, "Appointment booked successfully!".to_string())));
}
