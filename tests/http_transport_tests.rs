//! HTTP transport tests against a throwaway `tiny_http` server.
//!
//! Each test starts a server on an ephemeral port that answers a fixed
//! number of requests and reports what it received over a channel.

use std::io::Read;
use std::sync::mpsc::{self, Receiver};
use std::thread::{self, JoinHandle};

use serde_json::{Value, json};
use tiny_http::{Header, Response, Server, StatusCode};

use mediconnect::api::http::HttpTransport;
use mediconnect::api::{ApiClient, ApiError};
use mediconnect::models::AppointmentStatus;

#[derive(Debug)]
struct Received {
    method: String,
    url: String,
    body: String,
    cookie: Option<String>,
    content_type: Option<String>,
}

struct Reply {
    status: u16,
    body: String,
    set_cookie: Option<&'static str>,
}

fn reply(status: u16, body: Value) -> Reply {
    Reply {
        status,
        body: body.to_string(),
        set_cookie: None,
    }
}

fn header(request: &tiny_http::Request, name: &'static str) -> Option<String> {
    request
        .headers()
        .iter()
        .find(|h| h.field.equiv(name))
        .map(|h| h.value.as_str().to_string())
}

/// Serve `count` requests with `handler`, then stop.
fn serve(
    count: usize,
    handler: fn(&Received) -> Reply,
) -> (String, Receiver<Received>, JoinHandle<()>) {
    let server = Server::http("127.0.0.1:0").expect("bind test server");
    let addr = server.server_addr().to_ip().expect("tcp listener");
    let (tx, rx) = mpsc::channel();

    let handle = thread::spawn(move || {
        for _ in 0..count {
            let Ok(mut request) = server.recv() else { return };
            let mut body = String::new();
            let _ = request.as_reader().read_to_string(&mut body);
            let received = Received {
                method: request.method().to_string(),
                url: request.url().to_string(),
                body,
                cookie: header(&request, "Cookie"),
                content_type: header(&request, "Content-Type"),
            };

            let answer = handler(&received);
            let mut response = Response::from_string(answer.body)
                .with_status_code(StatusCode(answer.status))
                .with_header(
                    Header::from_bytes(&b"Content-Type"[..], &b"application/json"[..])
                        .expect("valid header"),
                );
            if let Some(cookie) = answer.set_cookie {
                response = response.with_header(
                    Header::from_bytes(&b"Set-Cookie"[..], cookie.as_bytes()).expect("valid header"),
                );
            }
            let _ = request.respond(response);
            let _ = tx.send(received);
        }
    });

    (format!("http://{addr}"), rx, handle)
}

fn user_json() -> Value {
    json!({ "id": "u1", "email": "kim@example.org", "firstName": "Kim", "lastName": "Lee", "role": "PATIENT" })
}

#[test]
fn session_cookie_is_reused_after_login() {
    let (base, rx, handle) = serve(2, |req| match (req.method.as_str(), req.url.as_str()) {
        ("POST", "/api/auth/login") => Reply {
            status: 200,
            body: json!({ "message": "ok", "user": user_json() }).to_string(),
            set_cookie: Some("SESSION=abc123; Path=/; HttpOnly"),
        },
        ("GET", "/api/auth/user") if req.cookie.as_deref().is_some_and(|c| c.contains("SESSION=abc123")) => {
            reply(200, user_json())
        }
        _ => reply(401, json!({ "message": "Not authenticated" })),
    });

    let api = ApiClient::new(HttpTransport::new(&base));
    let user = api.login("kim@example.org", "pw").unwrap();
    assert_eq!(user.first_name, "Kim");
    let again = api.current_user().unwrap();
    assert_eq!(again.email, "kim@example.org");

    let login = rx.recv().unwrap();
    assert_eq!(
        serde_json::from_str::<Value>(&login.body).unwrap(),
        json!({ "email": "kim@example.org", "password": "pw" })
    );
    assert!(login.content_type.unwrap().starts_with("application/json"));
    handle.join().unwrap();
}

#[test]
fn non_success_status_carries_server_message() {
    let (base, _rx, handle) = serve(1, |_| reply(404, json!({ "message": "Appointment not found" })));

    let api = ApiClient::new(HttpTransport::new(&base));
    let err = api.delete_appointment("missing").unwrap_err();
    assert_eq!(err.status(), Some(404));
    assert_eq!(err.server_message(), Some("Appointment not found"));
    handle.join().unwrap();
}

#[test]
fn status_update_puts_json_body() {
    let (base, rx, handle) = serve(1, |_| reply(200, json!({ "message": "updated" })));

    let api = ApiClient::new(HttpTransport::new(&base));
    api.update_appointment_status("a-7", AppointmentStatus::Completed)
        .unwrap();

    let received = rx.recv().unwrap();
    assert_eq!(received.method, "PUT");
    assert_eq!(received.url, "/api/appointments/a-7/status");
    assert_eq!(
        serde_json::from_str::<Value>(&received.body).unwrap(),
        json!({ "status": "COMPLETED" })
    );
    handle.join().unwrap();
}

#[test]
fn malformed_success_body_is_reported() {
    let (base, _rx, handle) = serve(1, |_| Reply {
        status: 200,
        body: "not json".to_string(),
        set_cookie: None,
    });

    let api = ApiClient::new(HttpTransport::new(&base));
    assert!(matches!(api.patient_dashboard(), Err(ApiError::Malformed(_))));
    handle.join().unwrap();
}

#[test]
fn closed_port_is_a_transport_error() {
    let addr = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind free port");
        listener.local_addr().expect("local addr")
    };

    let api = ApiClient::new(HttpTransport::new(&format!("http://{addr}")));
    assert!(matches!(api.current_user(), Err(ApiError::Transport(_))));
}
