//! The signup/login state machine.

use crate::config::IdentityConfig;
use crate::{debug, log};

use super::{Field, FieldError, FormView, IdentityClient, Navigator, SessionStore};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WidgetState {
    Anonymous,
    CheckingSession,
    ModalOpen,
    Submitting,
    Authenticated,
    RegisteredPendingRedirect,
}

/// Keys the widget reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Escape,
    Other,
}

pub struct SignupWidget<C, S, V, N> {
    client: C,
    store: S,
    view: V,
    navigator: N,
    identity: IdentityConfig,
    state: WidgetState,
    token: Option<String>,
}

impl<C, S, V, N> SignupWidget<C, S, V, N>
where
    C: IdentityClient,
    S: SessionStore,
    V: FormView,
    N: Navigator,
{
    pub fn new(client: C, store: S, view: V, navigator: N, identity: IdentityConfig) -> Self {
        Self {
            client,
            store,
            view,
            navigator,
            identity,
            state: WidgetState::Anonymous,
            token: None,
        }
    }

    pub fn state(&self) -> WidgetState {
        self.state
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    pub fn view(&self) -> &V {
        &self.view
    }

    pub fn navigator(&self) -> &N {
        &self.navigator
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Resume a stored session if the service still honors it.
    pub async fn init(&mut self) -> WidgetState {
        let stored = self.store.load().unwrap_or_else(|e| {
            debug!("auth"; "cannot read session: {e:#}");
            None
        });
        let Some(token) = stored else {
            self.state = WidgetState::Anonymous;
            return self.state;
        };

        self.state = WidgetState::CheckingSession;
        match self.client.check_session(&token).await {
            Ok(()) => {
                self.state = WidgetState::Authenticated;
                self.navigate(&token);
                self.token = Some(token);
            }
            Err(e) => {
                debug!("auth"; "session check failed: {e}");
                if let Err(e) = self.store.clear() {
                    debug!("auth"; "cannot clear session: {e:#}");
                }
                self.token = None;
                self.state = WidgetState::Anonymous;
            }
        }
        self.state
    }

    pub fn open_modal(&mut self) {
        if self.state == WidgetState::Anonymous {
            self.view.show_modal();
            self.state = WidgetState::ModalOpen;
        }
    }

    /// Hide the modal and reset the form.
    pub fn close_modal(&mut self) {
        if self.state == WidgetState::ModalOpen {
            self.view.hide_modal();
            self.view.reset_form();
            self.view.hide_success();
            self.state = WidgetState::Anonymous;
        }
    }

    pub fn key_down(&mut self, key: Key) {
        if key == Key::Escape {
            self.close_modal();
        }
    }

    /// Full validation of one field, updating its message.
    pub fn blur(&mut self, field: Field, value: &str) -> bool {
        match field.validate(value) {
            Ok(()) => {
                self.view.clear_field_error(field);
                true
            }
            Err(error) => {
                self.view.show_field_error(field, error);
                false
            }
        }
    }

    /// Typing clears the field's message, not its marker.
    pub fn input(&mut self, field: Field) {
        self.view.clear_field_message(field);
    }

    /// Validate, then log in, falling back to registration.
    ///
    /// Invalid fields stop here without a network call. At most two calls
    /// are made: login, then registration with the same credentials.
    pub async fn submit(&mut self, email: &str, password: &str) -> WidgetState {
        if self.state != WidgetState::ModalOpen {
            return self.state;
        }

        let email_ok = self.blur(Field::Email, email);
        let password_ok = self.blur(Field::Password, password);
        if !email_ok || !password_ok {
            return self.state;
        }

        self.state = WidgetState::Submitting;
        match self.client.login(email, password).await {
            Ok(token) => {
                self.persist(&token);
                self.state = WidgetState::Authenticated;
                self.navigate(&token);
                return self.state;
            }
            Err(e) => debug!("auth"; "login failed, trying registration: {e}"),
        }

        match self.client.register(email, password).await {
            Ok(token) => {
                self.persist(&token);
                self.view.show_success();
                self.state = WidgetState::RegisteredPendingRedirect;
                tokio::time::sleep(self.identity.redirect_delay()).await;
                self.navigate(&token);
            }
            Err(e) => {
                log!("auth"; "registration failed: {e}");
                self.view
                    .show_field_error(Field::Email, FieldError::RegistrationFailed);
                self.state = WidgetState::ModalOpen;
            }
        }
        self.state
    }

    fn persist(&mut self, token: &str) {
        if let Err(e) = self.store.store(token) {
            log!("warning"; "cannot save session: {e:#}");
        }
        self.token = Some(token.to_owned());
    }

    fn navigate(&mut self, token: &str) {
        let url = self.identity.redirect_url(token);
        self.navigator.navigate(&url);
    }
}
