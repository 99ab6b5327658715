//! Interactive shell: one page session driven from a terminal.
//!
//! Each input line is parsed by [`parse_command`] into a [`Command`] and
//! handed to the dashboard controller or the chat widget. After every
//! command the shell prints notifications raised since the previous one
//! and drops the expired ones. The chat widget is mounted once a session
//! exists and dropped again on logout.

use std::io::{BufRead, Write};
use std::time::Instant;

use anyhow::{Context, Result, bail};
use chrono::{NaiveDate, NaiveTime};
use colored::Colorize;

use crate::api::{ApiClient, Transport};
use crate::chat::{ChatState, ChatWidget};
use crate::config::schema::ChatConfig;
use crate::dashboard::DashboardController;
use crate::models::{AppointmentType, BookingRequest, RegisterRequest, Role};
use crate::render::{html, terminal};
use crate::state::Page;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatCommand {
    Toggle,
    Close,
    Reset,
    Send(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Help,
    Quit,
    Whoami,
    Login {
        email: String,
        password: Option<String>,
    },
    Register,
    Logout,
    Dashboard,
    Show(Page),
    Doctors,
    Book,
    Confirm(String),
    Complete(String),
    Cancel(String),
    Html,
    Chat(ChatCommand),
}

const HELP: &str = "\
Commands:
  login <email> [password]   sign in (password is prompted if omitted)
  register                   create an account (interactive)
  logout                     sign out
  whoami                     show the signed-in user
  dashboard                  reload your dashboard
  show <page>                landing | login | register | book | <role>-dashboard
  doctors                    open the booking page and list doctors
  book                       book an appointment (interactive)
  confirm <id>               doctor: confirm a scheduled appointment
  complete <id>              doctor: complete a confirmed appointment
  cancel <id>                cancel an open appointment
  html                       print the current page as HTML
  chat                       open or close the assistant panel
  chat <message>             ask the assistant
  chat close | chat reset    close the panel / start over
  help                       this text
  quit                       leave";

/// Parse one input line. Blank lines yield `None`.
pub fn parse_command(line: &str) -> Result<Option<Command>> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }
    let (word, rest) = match line.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim()),
        None => (line, ""),
    };

    let id_arg = |name: &str| -> Result<String> {
        match rest.split_whitespace().next() {
            Some(id) => Ok(id.to_string()),
            None => bail!("usage: {name} <appointment-id>"),
        }
    };

    let command = match word.to_ascii_lowercase().as_str() {
        "help" | "?" => Command::Help,
        "quit" | "exit" => Command::Quit,
        "whoami" => Command::Whoami,
        "login" => {
            let mut args = rest.split_whitespace();
            let Some(email) = args.next() else {
                bail!("usage: login <email> [password]");
            };
            Command::Login {
                email: email.to_string(),
                password: args.next().map(str::to_string),
            }
        }
        "register" => Command::Register,
        "logout" => Command::Logout,
        "dashboard" | "refresh" => Command::Dashboard,
        "show" => match Page::parse(rest) {
            Some(page) => Command::Show(page),
            None => bail!("unknown page '{rest}'"),
        },
        "doctors" => Command::Doctors,
        "book" => Command::Book,
        "confirm" => Command::Confirm(id_arg("confirm")?),
        "complete" => Command::Complete(id_arg("complete")?),
        "cancel" => Command::Cancel(id_arg("cancel")?),
        "html" => Command::Html,
        "chat" => Command::Chat(match rest {
            "" => ChatCommand::Toggle,
            "close" => ChatCommand::Close,
            "reset" => ChatCommand::Reset,
            message => ChatCommand::Send(message.to_string()),
        }),
        other => bail!("unknown command '{other}' (type 'help')"),
    };
    Ok(Some(command))
}

pub struct Shell<T> {
    controller: DashboardController<T>,
    chat: Option<ChatWidget<T>>,
    chat_config: ChatConfig,
    last_notification: u64,
}

impl<T: Transport + Clone> Shell<T> {
    pub fn new(controller: DashboardController<T>, chat_config: ChatConfig) -> Self {
        Self {
            controller,
            chat: None,
            chat_config,
            last_notification: 0,
        }
    }

    pub fn controller(&self) -> &DashboardController<T> {
        &self.controller
    }

    pub fn chat(&self) -> Option<&ChatWidget<T>> {
        self.chat.as_ref()
    }

    /// Run until `quit` or end of input.
    pub fn run<R: BufRead, W: Write>(&mut self, mut input: R, mut out: W) -> Result<()> {
        self.controller.check_session();
        self.sync_chat();
        self.render(&mut out)?;
        self.flush_notifications(&mut out)?;

        loop {
            write!(out, "{} ", "mediconnect ›".bold())?;
            out.flush()?;
            let Some(line) = read_line(&mut input)? else {
                writeln!(out)?;
                break;
            };
            match parse_command(&line) {
                Ok(None) => continue,
                Ok(Some(Command::Quit)) => break,
                Ok(Some(command)) => self.execute(command, &mut input, &mut out)?,
                Err(err) => writeln!(out, "{} {err}", "✗".red().bold())?,
            }
            self.sync_chat();
            self.flush_notifications(&mut out)?;
        }
        Ok(())
    }

    /// Run one command. Input is read only for interactive prompts.
    pub fn execute<R: BufRead, W: Write>(
        &mut self,
        command: Command,
        input: &mut R,
        out: &mut W,
    ) -> Result<()> {
        match command {
            Command::Help => writeln!(out, "{HELP}")?,
            Command::Quit => {}
            Command::Whoami => match self.controller.state().nav_label() {
                Some(name) => {
                    let role = self
                        .controller
                        .current_user()
                        .map(|u| u.role.as_str())
                        .unwrap_or_default();
                    writeln!(out, "{name} ({role})")?;
                }
                None => writeln!(out, "{}", "not signed in".dimmed())?,
            },
            Command::Login { email, password } => {
                let password = match password {
                    Some(p) => p,
                    None => prompt(input, out, "Password")?,
                };
                if self.controller.login(&email, &password) {
                    self.render(out)?;
                }
            }
            Command::Register => match prompt_registration(input, out) {
                Ok(request) => {
                    if self.controller.register(request) {
                        self.render(out)?;
                    }
                }
                Err(err) => writeln!(out, "{} {err:#}", "✗".red().bold())?,
            },
            Command::Logout => {
                self.controller.logout();
                self.render(out)?;
            }
            Command::Dashboard => {
                if self.controller.current_user().is_none() {
                    writeln!(out, "{} please log in first", "✗".red().bold())?;
                } else {
                    self.controller.refresh();
                    self.render(out)?;
                }
            }
            Command::Show(page) => {
                self.controller.show_page(page);
                self.render(out)?;
            }
            Command::Doctors => {
                self.controller.show_book_appointment();
                self.render(out)?;
            }
            Command::Book => match prompt_booking(input, out) {
                Ok(request) => {
                    if self.controller.book_appointment(&request) {
                        self.render(out)?;
                    }
                }
                Err(err) => writeln!(out, "{} {err:#}", "✗".red().bold())?,
            },
            Command::Confirm(id) => {
                if self.controller.confirm_appointment(&id) {
                    self.render(out)?;
                }
            }
            Command::Complete(id) => {
                if self.controller.complete_appointment(&id) {
                    self.render(out)?;
                }
            }
            Command::Cancel(id) => {
                let cancelled = self
                    .controller
                    .cancel_appointment(&id, |question| ask_yes_no(input, out, question));
                if cancelled {
                    self.render(out)?;
                }
            }
            Command::Html => writeln!(out, "{}", html::page(self.controller.state()))?,
            Command::Chat(chat) => self.chat_command(chat, out)?,
        }
        Ok(())
    }

    fn chat_command<W: Write>(&mut self, command: ChatCommand, out: &mut W) -> Result<()> {
        let Some(widget) = self.chat.as_mut() else {
            let reason = if self.chat_config.enabled {
                "the assistant is available after signing in"
            } else {
                "the assistant is disabled in the configuration"
            };
            writeln!(out, "{} {reason}", "·".cyan().bold())?;
            return Ok(());
        };

        match command {
            ChatCommand::Toggle => {
                widget.toggle();
                if widget.is_open() {
                    print_entries(out, widget, 0)?;
                } else {
                    writeln!(out, "{}", "(assistant closed)".dimmed())?;
                }
            }
            ChatCommand::Close => {
                widget.close();
                writeln!(out, "{}", "(assistant closed)".dimmed())?;
            }
            ChatCommand::Reset => {
                widget.reset();
                print_entries(out, widget, 0)?;
            }
            ChatCommand::Send(message) => {
                if !widget.is_open() {
                    widget.toggle();
                }
                let seen = widget.entries().len();
                if widget.state() == ChatState::Idle {
                    writeln!(out, "{}", "assistant is typing…".dimmed())?;
                }
                widget.send_message(&message);
                print_entries(out, widget, seen)?;
            }
        }
        Ok(())
    }

    /// Mount the widget once signed in; drop it when signed out.
    fn sync_chat(&mut self) {
        let authenticated = self.controller.state().is_authenticated();
        if !authenticated {
            self.chat = None;
            return;
        }
        if self.chat.is_none() && self.chat_config.enabled {
            let api = ApiClient::new(self.controller.api().transport().clone());
            let greeting = Some(self.chat_config.greeting.as_str());
            self.chat = ChatWidget::mount(api, authenticated, greeting);
        }
    }

    fn render<W: Write>(&self, out: &mut W) -> Result<()> {
        writeln!(out, "\n{}\n", terminal::page(self.controller.state()))?;
        Ok(())
    }

    fn flush_notifications<W: Write>(&mut self, out: &mut W) -> Result<()> {
        let fresh: Vec<String> = self
            .controller
            .state()
            .notifications
            .since(self.last_notification)
            .map(terminal::toast)
            .collect();
        if let Some(latest) = self.controller.state().notifications.latest() {
            self.last_notification = self.last_notification.max(latest.id);
        }
        for line in fresh {
            writeln!(out, "{line}")?;
        }
        self.controller.notifications_mut().expire(Instant::now());
        Ok(())
    }
}

fn print_entries<T: Transport, W: Write>(out: &mut W, widget: &ChatWidget<T>, from: usize) -> Result<()> {
    for entry in widget.entries().iter().skip(from) {
        writeln!(out, "{}", terminal::chat_entry(entry))?;
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Prompts
// ---------------------------------------------------------------------------

fn read_line<R: BufRead>(input: &mut R) -> Result<Option<String>> {
    let mut line = String::new();
    let read = input.read_line(&mut line).context("failed to read input")?;
    if read == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim_end_matches(['\r', '\n']).to_string()))
}

fn prompt<R: BufRead, W: Write>(input: &mut R, out: &mut W, label: &str) -> Result<String> {
    write!(out, "{label}: ")?;
    out.flush()?;
    read_line(input)?
        .map(|s| s.trim().to_string())
        .context("input closed")
}

fn prompt_optional<R: BufRead, W: Write>(input: &mut R, out: &mut W, label: &str) -> Result<Option<String>> {
    let value = prompt(input, out, label)?;
    Ok((!value.is_empty()).then_some(value))
}

/// Anything but an explicit yes declines, including closed input.
fn ask_yes_no<R: BufRead, W: Write>(input: &mut R, out: &mut W, question: &str) -> bool {
    if write!(out, "{question} [y/N] ").and_then(|_| out.flush()).is_err() {
        return false;
    }
    matches!(
        read_line(input).ok().flatten().as_deref().map(str::trim),
        Some("y" | "Y" | "yes" | "Yes" | "YES")
    )
}

fn prompt_registration<R: BufRead, W: Write>(input: &mut R, out: &mut W) -> Result<RegisterRequest> {
    let email = prompt(input, out, "Email")?;
    let first_name = prompt(input, out, "First name")?;
    let last_name = prompt(input, out, "Last name")?;
    let password = prompt(input, out, "Password")?;
    let role_raw = prompt(input, out, "Role (patient/doctor/pharmacy)")?;
    let role = Role::parse(&role_raw).with_context(|| format!("unknown role '{role_raw}'"))?;

    let mut request = RegisterRequest::new(email, first_name, last_name, password, role);
    request.phone = prompt_optional(input, out, "Phone (optional)")?;
    match role {
        Role::Patient => {
            request.date_of_birth = prompt_optional(input, out, "Date of birth (YYYY-MM-DD)")?;
            request.gender = prompt_optional(input, out, "Gender")?;
        }
        Role::Doctor => {
            request.license_number = prompt_optional(input, out, "License number")?;
            request.specialization = prompt_optional(input, out, "Specialization")?;
            request.experience = prompt_optional(input, out, "Years of experience")?
                .map(|v| v.parse::<u32>())
                .transpose()
                .context("experience must be a whole number")?;
        }
        Role::Pharmacy => {
            request.pharmacy_name = prompt_optional(input, out, "Pharmacy name")?;
            request.address = prompt_optional(input, out, "Address")?;
        }
    }
    Ok(request)
}

fn prompt_booking<R: BufRead, W: Write>(input: &mut R, out: &mut W) -> Result<BookingRequest> {
    let doctor_id = prompt(input, out, "Doctor id")?;
    if doctor_id.is_empty() {
        bail!("a doctor must be chosen");
    }
    let date_raw = prompt(input, out, "Date (YYYY-MM-DD)")?;
    let date = NaiveDate::parse_from_str(&date_raw, "%Y-%m-%d")
        .with_context(|| format!("invalid date '{date_raw}'"))?;
    let time_raw = prompt(input, out, "Time (HH:MM)")?;
    let time = NaiveTime::parse_from_str(&time_raw, "%H:%M")
        .with_context(|| format!("invalid time '{time_raw}'"))?;
    let type_raw = prompt(input, out, "Type (video/in-person)")?;
    let appointment_type =
        AppointmentType::parse(&type_raw).with_context(|| format!("unknown appointment type '{type_raw}'"))?;
    let reason = prompt_optional(input, out, "Reason (optional)")?;
    Ok(BookingRequest::new(doctor_id, date, time, appointment_type, reason))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
