//! `lander auth`: the signup/login flow in a terminal.
//!
//! The modal is the prompt loop; messages that the page would render under
//! a field are logged instead, and navigation prints the members URL.

use crate::{
    config::SiteConfig,
    log,
    signup::{
        Field, FieldError, FileSessionStore, FormView, HttpIdentityClient, Navigator,
        SessionStore, SignupWidget, WidgetState,
    },
};
use anyhow::{Context, Result, bail};
use crossterm::terminal;
use owo_colors::OwoColorize;
use std::io::{BufRead, IsTerminal, Read, Write};

use super::AuthArgs;

/// [`FormView`] that reports to the terminal.
#[derive(Debug, Default)]
pub struct TerminalView;

impl FormView for TerminalView {
    fn show_modal(&mut self) {
        log!("auth"; "sign up or log in");
    }

    fn hide_modal(&mut self) {}

    fn show_field_error(&mut self, field: Field, error: FieldError) {
        log!("auth"; "{}: {}", field.name(), error.to_string().red());
    }

    fn clear_field_error(&mut self, _field: Field) {}

    fn clear_field_message(&mut self, _field: Field) {}

    fn reset_form(&mut self) {}

    fn show_success(&mut self) {
        log!("auth"; "{}", "account created, redirecting...".green());
    }

    fn hide_success(&mut self) {}
}

/// [`Navigator`] that prints the target URL.
#[derive(Debug, Default)]
pub struct PrintNavigator {
    pub last: Option<String>,
}

impl Navigator for PrintNavigator {
    fn navigate(&mut self, url: &str) {
        log!("auth"; "open {}", url.bold());
        self.last = Some(url.to_string());
    }
}

pub fn run_auth(config: &SiteConfig, args: &AuthArgs) -> Result<()> {
    let identity = &config.identity;
    let store = FileSessionStore::new(&identity.session_file, &identity.storage_key);

    if args.logout {
        store.clear()?;
        log!("auth"; "session cleared");
        return Ok(());
    }

    let client = HttpIdentityClient::new(&identity.endpoint)?;
    let mut widget = SignupWidget::new(
        client,
        store,
        TerminalView,
        PrintNavigator::default(),
        identity.clone(),
    );

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("Failed to create tokio runtime")?;

    runtime.block_on(flow(&mut widget, args))
}

type TerminalWidget = SignupWidget<HttpIdentityClient, FileSessionStore, TerminalView, PrintNavigator>;

/// Resume the session, or prompt until login or registration succeeds.
///
/// With both credentials given as flags there is a single attempt.
async fn flow(widget: &mut TerminalWidget, args: &AuthArgs) -> Result<()> {
    if widget.init().await == WidgetState::Authenticated {
        return Ok(());
    }

    widget.open_modal();
    let interactive = args.email.is_none() || args.password.is_none();
    loop {
        let email = match &args.email {
            Some(email) => email.clone(),
            None => prompt("email")?,
        };
        widget.input(Field::Email);
        let password = match &args.password {
            Some(password) => password.clone(),
            None => prompt_hidden("password")?,
        };
        widget.input(Field::Password);

        match widget.submit(&email, &password).await {
            WidgetState::Authenticated | WidgetState::RegisteredPendingRedirect => return Ok(()),
            _ if interactive => continue,
            _ => bail!("authentication failed"),
        }
    }
}

/// Read one line from stdin after a prompt on stderr. EOF aborts.
fn prompt(label: &str) -> Result<String> {
    write_prompt(label)?;
    read_line()
}

/// Like [`prompt`], but a terminal does not echo what is typed.
fn prompt_hidden(label: &str) -> Result<String> {
    write_prompt(label)?;
    if !std::io::stdin().is_terminal() {
        return read_line();
    }

    terminal::enable_raw_mode().context("Failed to disable terminal echo")?;
    let line = read_hidden(&mut std::io::stdin().lock());
    terminal::disable_raw_mode().context("Failed to restore terminal")?;
    eprintln!();
    line
}

fn write_prompt(label: &str) -> Result<()> {
    let mut stderr = std::io::stderr().lock();
    write!(stderr, "{label}: ")?;
    stderr.flush()?;
    Ok(())
}

fn read_line() -> Result<String> {
    let mut line = String::new();
    let read = std::io::stdin().lock().read_line(&mut line)?;
    if read == 0 {
        bail!("input closed");
    }
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}

/// Read raw-mode bytes up to Enter. Backspace drops the last character;
/// Ctrl+C, or Ctrl+D on an empty line, aborts.
fn read_hidden(input: &mut impl Read) -> Result<String> {
    let mut bytes = Vec::new();
    for byte in input.bytes() {
        match byte? {
            b'\r' | b'\n' => return String::from_utf8(bytes).context("input is not UTF-8"),
            0x03 => bail!("interrupted"),
            0x04 if bytes.is_empty() => bail!("input closed"),
            0x7f | 0x08 => {
                // Drop a whole UTF-8 sequence, not just its last byte
                while let Some(b) = bytes.pop() {
                    if b & 0xc0 != 0x80 {
                        break;
                    }
                }
            }
            b => bytes.push(b),
        }
    }
    bail!("input closed")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::test_config_at;
    use tempfile::TempDir;

    #[test]
    fn test_logout_clears_session() {
        let dir = TempDir::new().unwrap();
        let config = test_config_at(dir.path(), "");
        let store = FileSessionStore::new(&config.identity.session_file, &config.identity.storage_key);
        store.store("abc").unwrap();

        let args = AuthArgs {
            logout: true,
            ..AuthArgs::default()
        };
        run_auth(&config, &args).unwrap();
        assert_eq!(store.load().unwrap(), None);
    }

    #[test]
    fn test_read_hidden_line_editing() {
        let mut input = std::io::Cursor::new(b"pa\x7fss\xc3\xa9\x7fword\r".to_vec());
        assert_eq!(read_hidden(&mut input).unwrap(), "pssword");

        let mut input = std::io::Cursor::new(b"secret\n".to_vec());
        assert_eq!(read_hidden(&mut input).unwrap(), "secret");
    }

    #[test]
    fn test_read_hidden_aborts() {
        let mut input = std::io::Cursor::new(b"sec\x03ret\r".to_vec());
        assert!(read_hidden(&mut input).is_err());

        let mut input = std::io::Cursor::new(b"\x04".to_vec());
        assert!(read_hidden(&mut input).is_err());

        let mut input = std::io::Cursor::new(b"no newline".to_vec());
        assert!(read_hidden(&mut input).is_err());
    }

    #[test]
    fn test_print_navigator_records_url() {
        let mut nav = PrintNavigator::default();
        nav.navigate("https://www.dating.com/people/#token=t");
        assert_eq!(nav.last.as_deref(), Some("https://www.dating.com/people/#token=t"));
    }
}
