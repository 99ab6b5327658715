//! Shell tests: whole sessions fed through `Shell::run` with scripted input.

mod common;

use common::{Scripted, controller};
use mediconnect::config::schema::ChatConfig;
use mediconnect::shell::Shell;

fn run_session(t: &Scripted, input: &str) -> (anyhow::Result<()>, String) {
    colored::control::set_override(false);
    let mut shell = Shell::new(controller(t), ChatConfig::default());
    let mut out = Vec::new();
    let result = shell.run(input.as_bytes(), &mut out);
    (result, String::from_utf8_lossy(&out).into_owned())
}

#[test]
fn bad_registration_input_keeps_the_session_alive() {
    let t = Scripted::new();
    let (result, out) = run_session(&t, "register\na@b.c\nAna\nRuiz\npw\nadmin\nhelp\nquit\n");

    assert!(result.is_ok());
    assert!(out.contains("unknown role 'admin'"));
    assert!(out.contains("Commands:"));
    assert!(t.calls().iter().all(|c| c != "POST /api/auth/register"));
}

#[test]
fn non_numeric_experience_is_reported() {
    let t = Scripted::new();
    let (result, out) = run_session(
        &t,
        "register\nana@example.org\nAna\nRuiz\npw\ndoctor\n\nL-1\nCardiology\nlots\nquit\n",
    );

    assert!(result.is_ok());
    assert!(out.contains("experience must be a whole number"));
}
