//! Typed access to the MediConnect REST backend.
//!
//! The network itself sits behind the [`Transport`] trait so the controller
//! and chat widget can be driven by the real HTTP client ([`http`]) or by a
//! scripted transport in tests. [`ApiClient`] maps each endpoint to a typed
//! method and folds every failure into one [`ApiError`] taxonomy:
//!
//! - [`ApiError::Transport`]: the request never completed
//! - [`ApiError::Status`]: the backend answered with a non-2xx status
//! - [`ApiError::Malformed`]: a 2xx answer whose body is not what we expect

pub mod http;

use std::fmt;

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::models::{
    Appointment, AppointmentStatus, AuthResponse, BookingRequest, ChatMessage, ChatReply,
    ChatRequest, DoctorDashboard, DoctorOption, LoginRequest, PatientDashboard,
    PharmacyDashboard, Prescription, RegisterRequest, StatusUpdate, User,
};

// ---------------------------------------------------------------------------
// Transport seam
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Delete => "DELETE",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A request relative to the backend origin, e.g. `GET /api/auth/user`.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    pub method: Method,
    pub path: String,
    pub body: Option<Value>,
}

/// Raw status and body of a completed exchange, successful or not.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiResponse {
    pub status: u16,
    pub body: String,
}

impl ApiResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// The request could not be completed at all (DNS, refused, reset...).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{0}")]
pub struct TransportError(pub String);

/// Carries requests to the backend with the session credentials attached.
///
/// Implementations return every HTTP answer as an [`ApiResponse`], including
/// 4xx/5xx ones; only a request that never completed is a [`TransportError`].
pub trait Transport {
    fn send(&self, request: &ApiRequest) -> Result<ApiResponse, TransportError>;
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ApiError {
    #[error("network error: {0}")]
    Transport(#[from] TransportError),
    #[error("server responded with HTTP {status}")]
    Status { status: u16, message: Option<String> },
    #[error("unexpected response body: {0}")]
    Malformed(String),
}

impl ApiError {
    /// The backend's own explanation, when it sent one.
    pub fn server_message(&self) -> Option<&str> {
        match self {
            Self::Status { message, .. } => message.as_deref(),
            _ => None,
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Pull `message` (or `error`) out of a JSON error body.
fn error_message(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    ["message", "error"]
        .iter()
        .filter_map(|key| value.get(*key).and_then(Value::as_str))
        .map(str::trim)
        .find(|msg| !msg.is_empty())
        .map(str::to_string)
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

/// One method per backend endpoint the dashboard and chat widget consume.
#[derive(Debug, Clone)]
pub struct ApiClient<T> {
    transport: T,
}

impl<T: Transport> ApiClient<T> {
    pub fn new(transport: T) -> Self {
        Self { transport }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    // -- auth ---------------------------------------------------------------

    /// `GET /api/auth/user`: the session check.
    pub fn current_user(&self) -> Result<User, ApiError> {
        self.get_json("/api/auth/user")
    }

    pub fn login(&self, email: &str, password: &str) -> Result<User, ApiError> {
        let response: AuthResponse =
            self.send_json(Method::Post, "/api/auth/login", &LoginRequest { email, password })?;
        response
            .user
            .ok_or_else(|| ApiError::Malformed("login response has no user".to_string()))
    }

    pub fn register(&self, request: &RegisterRequest) -> Result<User, ApiError> {
        let response: AuthResponse = self.send_json(Method::Post, "/api/auth/register", request)?;
        response
            .user
            .ok_or_else(|| ApiError::Malformed("registration response has no user".to_string()))
    }

    pub fn logout(&self) -> Result<(), ApiError> {
        self.call(Method::Post, "/api/auth/logout", None).map(drop)
    }

    // -- dashboards -----------------------------------------------------------

    pub fn patient_dashboard(&self) -> Result<PatientDashboard, ApiError> {
        self.get_json("/api/patient/dashboard")
    }

    pub fn doctor_dashboard(&self) -> Result<DoctorDashboard, ApiError> {
        self.get_json("/api/doctor/dashboard")
    }

    pub fn pharmacy_dashboard(&self) -> Result<PharmacyDashboard, ApiError> {
        self.get_json("/api/pharmacy/dashboard")
    }

    // -- appointments ---------------------------------------------------------

    pub fn my_appointments(&self) -> Result<Vec<Appointment>, ApiError> {
        self.get_list("/api/appointments/my-appointments")
    }

    pub fn doctor_booked_appointments(&self) -> Result<Vec<Appointment>, ApiError> {
        self.get_list("/api/appointments/doctor/booked")
    }

    pub fn doctor_today_appointments(&self) -> Result<Vec<Appointment>, ApiError> {
        self.get_list("/api/appointments/doctor/today")
    }

    pub fn upcoming_appointments(&self) -> Result<Vec<Appointment>, ApiError> {
        self.get_list("/api/appointments/upcoming")
    }

    pub fn available_doctors(&self) -> Result<Vec<DoctorOption>, ApiError> {
        self.get_list("/api/appointments/doctors")
    }

    pub fn book_appointment(&self, request: &BookingRequest) -> Result<(), ApiError> {
        self.send_unit(Method::Post, "/api/appointments/book", request)
    }

    pub fn update_appointment_status(
        &self,
        appointment_id: &str,
        status: AppointmentStatus,
    ) -> Result<(), ApiError> {
        self.send_unit(
            Method::Put,
            &format!("/api/appointments/{appointment_id}/status"),
            &StatusUpdate { status },
        )
    }

    pub fn delete_appointment(&self, appointment_id: &str) -> Result<(), ApiError> {
        self.call(
            Method::Delete,
            &format!("/api/appointments/{appointment_id}"),
            None,
        )
        .map(drop)
    }

    // -- prescriptions --------------------------------------------------------

    pub fn my_prescriptions(&self) -> Result<Vec<Prescription>, ApiError> {
        self.get_list("/api/patient/prescriptions/my-prescriptions")
    }

    // -- chat -----------------------------------------------------------------

    /// Send the whole transcript; the backend owns context management.
    pub fn chat(&self, messages: &[ChatMessage]) -> Result<ChatReply, ApiError> {
        self.send_json(Method::Post, "/api/chatbot/chat", &ChatRequest { messages })
    }

    // -- plumbing -------------------------------------------------------------

    fn call(&self, method: Method, path: &str, body: Option<Value>) -> Result<ApiResponse, ApiError> {
        let request = ApiRequest {
            method,
            path: path.to_string(),
            body,
        };
        tracing::debug!(%method, path, "dispatching request");

        let response = self.transport.send(&request)?;
        if response.is_success() {
            Ok(response)
        } else {
            tracing::debug!(%method, path, status = response.status, "request rejected");
            Err(ApiError::Status {
                status: response.status,
                message: error_message(&response.body),
            })
        }
    }

    fn get_json<R: DeserializeOwned>(&self, path: &str) -> Result<R, ApiError> {
        let response = self.call(Method::Get, path, None)?;
        parse_body(&response.body)
    }

    /// A `null` list body is treated as empty.
    fn get_list<R: DeserializeOwned>(&self, path: &str) -> Result<Vec<R>, ApiError> {
        let list: Option<Vec<R>> = self.get_json(path)?;
        Ok(list.unwrap_or_default())
    }

    fn send_json<B: Serialize, R: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: &B,
    ) -> Result<R, ApiError> {
        let response = self.call(method, path, Some(encode(body)?))?;
        parse_body(&response.body)
    }

    fn send_unit<B: Serialize>(&self, method: Method, path: &str, body: &B) -> Result<(), ApiError> {
        self.call(method, path, Some(encode(body)?)).map(drop)
    }
}

fn encode<B: Serialize>(body: &B) -> Result<Value, ApiError> {
    serde_json::to_value(body).map_err(|e| ApiError::Malformed(format!("request body: {e}")))
}

fn parse_body<R: DeserializeOwned>(body: &str) -> Result<R, ApiError> {
    serde_json::from_str(body).map_err(|e| ApiError::Malformed(e.to_string()))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
