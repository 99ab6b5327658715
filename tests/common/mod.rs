#![allow(dead_code)]
//! Shared fixtures: a scripted in-memory transport that records requests.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use chrono::{NaiveDate, NaiveDateTime};
use serde_json::{Value, json};

use mediconnect::api::{ApiClient, ApiRequest, ApiResponse, Method, Transport, TransportError};
use mediconnect::dashboard::DashboardController;
use mediconnect::notify::NotificationCenter;

type Reply = Result<ApiResponse, TransportError>;

#[derive(Default)]
struct Script {
    /// Queued replies per `"METHOD /path"`; the last one repeats.
    routes: HashMap<String, Vec<Reply>>,
    log: Vec<ApiRequest>,
}

/// Clones share the script and the request log.
#[derive(Clone, Default)]
pub struct Scripted {
    inner: Rc<RefCell<Script>>,
}

fn key(method: Method, path: &str) -> String {
    format!("{method} {path}")
}

impl Scripted {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on(&self, method: Method, path: &str, status: u16, body: Value) -> &Self {
        self.push(method, path, Ok(ApiResponse {
            status,
            body: body.to_string(),
        }))
    }

    pub fn on_raw(&self, method: Method, path: &str, status: u16, body: &str) -> &Self {
        self.push(method, path, Ok(ApiResponse {
            status,
            body: body.to_string(),
        }))
    }

    pub fn on_unreachable(&self, method: Method, path: &str) -> &Self {
        self.push(method, path, Err(TransportError("connection refused".into())))
    }

    fn push(&self, method: Method, path: &str, reply: Reply) -> &Self {
        self.inner
            .borrow_mut()
            .routes
            .entry(key(method, path))
            .or_default()
            .push(reply);
        self
    }

    /// Every request so far as `"METHOD /path"`.
    pub fn calls(&self) -> Vec<String> {
        self.inner
            .borrow()
            .log
            .iter()
            .map(|r| key(r.method, &r.path))
            .collect()
    }

    pub fn requests(&self) -> Vec<ApiRequest> {
        self.inner.borrow().log.clone()
    }

    pub fn clear_log(&self) {
        self.inner.borrow_mut().log.clear();
    }
}

impl Transport for Scripted {
    fn send(&self, request: &ApiRequest) -> Result<ApiResponse, TransportError> {
        let mut script = self.inner.borrow_mut();
        script.log.push(request.clone());
        let Some(replies) = script.routes.get_mut(&key(request.method, &request.path)) else {
            return Ok(ApiResponse {
                status: 404,
                body: json!({ "message": "no route" }).to_string(),
            });
        };
        if replies.len() > 1 {
            replies.remove(0)
        } else {
            replies[0].clone()
        }
    }
}

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

pub fn fixed_now() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2030, 6, 10)
        .and_then(|d| d.and_hms_opt(12, 0, 0))
        .expect("valid fixture date")
}

pub fn controller(transport: &Scripted) -> DashboardController<Scripted> {
    DashboardController::new(ApiClient::new(transport.clone()), NotificationCenter::default())
        .with_clock(fixed_now)
}

pub fn user(role: &str) -> Value {
    json!({
        "id": format!("{}-1", role.to_ascii_lowercase()),
        "email": "kim@example.org",
        "firstName": "Kim",
        "lastName": "Lee",
        "role": role,
    })
}

pub fn appointment(id: &str, date: &str, status: &str) -> Value {
    json!({
        "id": id,
        "appointmentDate": date,
        "appointmentType": "VIDEO",
        "status": status,
        "reason": "Check-up",
        "doctorName": "Ana Ruiz",
        "doctorSpecialization": "Cardiology",
        "patientName": "Kim Lee",
    })
}
