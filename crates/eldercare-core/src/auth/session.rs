//! Authentication state persisted across runs.
//!
//! `currentUser` and `isLoggedIn` always live in the persistent scope. The
//! token goes to the persistent scope only with remember-me; otherwise it
//! lives in the session scope and disappears with the session.

use std::rc::Rc;

use super::{Credentials, Registration, Role, User, UserPatch};
use crate::api::{ApiClient, AuthResponse};
use crate::error::{ApiError, CoreError, Result, StorageError, ValidationError};
use crate::notice::Notifier;
use crate::storage::{keys, Scope, StateStore};

const TRUE: &str = "true";

pub struct AuthSession {
    state: StateStore,
    notifier: Rc<dyn Notifier>,
    user: Option<User>,
    token: Option<String>,
    remember: bool,
}

impl AuthSession {
    /// Restore the previous session from storage.
    ///
    /// A `currentUser` entry that no longer decodes signs the user out.
    pub fn restore(state: StateStore, notifier: Rc<dyn Notifier>) -> Result<Self> {
        let logged_in = state.get_raw(Scope::Persistent, keys::IS_LOGGED_IN)?.as_deref() == Some(TRUE);
        let remember = state.get_raw(Scope::Persistent, keys::REMEMBER_ME)?.as_deref() == Some(TRUE);

        let user = match state.load_strict::<User>(Scope::Persistent, keys::CURRENT_USER) {
            Ok(user) if logged_in => user,
            Ok(_) => None,
            Err(StorageError::Corrupted { reason, .. }) => {
                tracing::warn!(%reason, "stored user is corrupted, signing out");
                state.remove(keys::CURRENT_USER)?;
                state.remove(keys::IS_LOGGED_IN)?;
                None
            }
            Err(e) => return Err(e.into()),
        };

        let token = match state.get_raw(Scope::Persistent, keys::TOKEN)? {
            Some(token) => Some(token),
            None => state.get_raw(Scope::Session, keys::TOKEN)?,
        };

        Ok(Self {
            state,
            notifier,
            user,
            token,
            remember,
        })
    }

    pub fn current_user(&self) -> Option<&User> {
        self.user.as_ref()
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.user.is_some()
    }

    pub fn remembers(&self) -> bool {
        self.remember
    }

    pub fn is_caregiver(&self) -> bool {
        self.user.as_ref().is_some_and(|u| u.role == Role::Caregiver)
    }

    pub fn is_elderly(&self) -> bool {
        self.user.as_ref().is_some_and(|u| u.role == Role::Elderly)
    }

    pub async fn login(&mut self, api: &mut ApiClient, email: &str, password: &str, remember: bool) -> Result<User> {
        if email.trim().is_empty() || password.is_empty() {
            self.notifier.error("Credenciais inválidas");
            let field = if email.trim().is_empty() { "email" } else { "password" };
            return Err(ValidationError::MissingField(field).into());
        }

        let credentials = Credentials {
            email: email.trim().to_string(),
            password: password.to_string(),
        };
        let response = match api.login(&credentials).await {
            Ok(r) => r,
            Err(e) => {
                self.notifier.error(&format!("Erro no login: {e}"));
                return Err(e.into());
            }
        };

        let user = self.establish(api, response, remember)?;
        tracing::info!(user = %user.id, remember, "signed in");
        self.notifier.success(&format!("Bem-vindo, {}!", user.name));
        Ok(user)
    }

    pub async fn register(&mut self, api: &mut ApiClient, registration: Registration) -> Result<User> {
        for (field, value) in [
            ("name", &registration.name),
            ("email", &registration.email),
            ("password", &registration.password),
        ] {
            if value.trim().is_empty() {
                self.notifier.error("Preencha todos os campos obrigatórios");
                return Err(ValidationError::MissingField(field).into());
            }
        }

        let response = match api.register(&registration).await {
            Ok(r) => r,
            Err(e) => {
                self.notifier.error(&format!("Erro no registro: {e}"));
                return Err(e.into());
            }
        };

        let user = self.establish(api, response, false)?;
        tracing::info!(user = %user.id, "registered");
        self.notifier.success("Conta criada com sucesso!");
        Ok(user)
    }

    /// Forget the user and token. Caregiver data is cleared by the caller.
    pub fn logout(&mut self, api: &mut ApiClient) -> Result<()> {
        for key in [keys::CURRENT_USER, keys::IS_LOGGED_IN, keys::REMEMBER_ME, keys::TOKEN] {
            self.state.remove(key)?;
        }
        self.state.database().end_session()?;
        if let Some(user) = self.user.take() {
            tracing::info!(user = %user.id, "signed out");
        }
        self.token = None;
        self.remember = false;
        api.set_token(None);
        Ok(())
    }

    /// Refresh the signed-in user from the backend.
    pub async fn me(&mut self, api: &ApiClient) -> Result<User> {
        let user = api.me().await?;
        self.set_user(user.clone())?;
        Ok(user)
    }

    pub async fn reset_password(&self, api: &ApiClient, email: &str) -> Result<()> {
        if email.trim().is_empty() {
            return Err(ValidationError::MissingField("email").into());
        }
        match api.reset_password(email.trim()).await {
            Ok(_) => {
                self.notifier
                    .success("Instruções de recuperação enviadas para o seu e-mail");
                Ok(())
            }
            Err(e) => {
                self.notifier.error(&format!("Erro ao solicitar recuperação: {e}"));
                Err(e.into())
            }
        }
    }

    pub async fn update_profile(&mut self, api: &ApiClient, patch: UserPatch) -> Result<User> {
        if self.user.is_none() {
            return Err(CoreError::Api(ApiError::NotAuthenticated));
        }
        let user = match api.update_profile(&patch).await {
            Ok(u) => u,
            Err(e) => {
                self.notifier.error(&format!("Erro ao atualizar perfil: {e}"));
                return Err(e.into());
            }
        };
        self.set_user(user.clone())?;
        self.notifier.success("Perfil atualizado com sucesso!");
        Ok(user)
    }

    fn establish(&mut self, api: &mut ApiClient, response: AuthResponse, remember: bool) -> Result<User> {
        let AuthResponse { user, token } = response;

        self.state.remove_in(Scope::Persistent, keys::TOKEN)?;
        self.state.remove_in(Scope::Session, keys::TOKEN)?;
        let scope = if remember { Scope::Persistent } else { Scope::Session };
        self.state.set_raw(scope, keys::TOKEN, &token)?;
        if remember {
            self.state.set_raw(Scope::Persistent, keys::REMEMBER_ME, TRUE)?;
        } else {
            self.state.remove(keys::REMEMBER_ME)?;
        }

        self.set_user(user.clone())?;
        self.state.set_raw(Scope::Persistent, keys::IS_LOGGED_IN, TRUE)?;

        api.set_token(Some(token.clone()));
        self.token = Some(token);
        self.remember = remember;
        Ok(user)
    }

    fn set_user(&mut self, user: User) -> Result<()> {
        self.state.save(keys::CURRENT_USER, &user)?;
        self.user = Some(user);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notice::RecordingNotifier;

    fn session(state: &StateStore) -> AuthSession {
        AuthSession::restore(state.clone(), Rc::new(RecordingNotifier::new())).unwrap()
    }

    #[test]
    fn fresh_store_is_signed_out() {
        let state = StateStore::in_memory().unwrap();
        let auth = session(&state);
        assert!(!auth.is_authenticated());
        assert!(auth.token().is_none());
    }

    #[test]
    fn restores_persisted_user() {
        let state = StateStore::in_memory().unwrap();
        state
            .save(
                keys::CURRENT_USER,
                &serde_json::json!({"id": "1", "name": "Carlos", "email": "c@x.org", "role": "caregiver"}),
            )
            .unwrap();
        state.set_raw(Scope::Persistent, keys::IS_LOGGED_IN, "true").unwrap();
        state.set_raw(Scope::Session, keys::TOKEN, "tok").unwrap();

        let auth = session(&state);
        assert!(auth.is_authenticated());
        assert!(auth.is_caregiver());
        assert_eq!(auth.token(), Some("tok"));
    }

    #[test]
    fn user_without_logged_in_flag_is_ignored() {
        let state = StateStore::in_memory().unwrap();
        state
            .save(keys::CURRENT_USER, &serde_json::json!({"id": "1", "email": "c@x.org"}))
            .unwrap();
        assert!(!session(&state).is_authenticated());
    }

    #[test]
    fn corrupted_user_signs_out() {
        let state = StateStore::in_memory().unwrap();
        state.set_raw(Scope::Persistent, keys::CURRENT_USER, "{broken").unwrap();
        state.set_raw(Scope::Persistent, keys::IS_LOGGED_IN, "true").unwrap();

        let auth = session(&state);
        assert!(!auth.is_authenticated());
        assert!(state.get_raw(Scope::Persistent, keys::CURRENT_USER).unwrap().is_none());
        assert!(state.get_raw(Scope::Persistent, keys::IS_LOGGED_IN).unwrap().is_none());
    }

    #[test]
    fn logout_clears_everything() {
        let state = StateStore::in_memory().unwrap();
        state
            .save(keys::CURRENT_USER, &serde_json::json!({"id": "1", "email": "c@x.org"}))
            .unwrap();
        state.set_raw(Scope::Persistent, keys::IS_LOGGED_IN, "true").unwrap();
        state.set_raw(Scope::Persistent, keys::TOKEN, "tok").unwrap();
        state.set_raw(Scope::Persistent, keys::REMEMBER_ME, "true").unwrap();

        let mut auth = session(&state);
        assert!(auth.remembers());
        let mut api = ApiClient::new("http://localhost:8000/api", std::time::Duration::from_secs(1)).unwrap();
        api.set_token(Some("tok".into()));
        auth.logout(&mut api).unwrap();

        assert!(!auth.is_authenticated());
        assert!(api.token().is_none());
        assert!(!session(&state).is_authenticated());
        assert!(state.get_raw(Scope::Persistent, keys::TOKEN).unwrap().is_none());
    }

    #[tokio::test]
    async fn login_rejects_empty_credentials_without_calling_the_backend() {
        let state = StateStore::in_memory().unwrap();
        let notifier = Rc::new(RecordingNotifier::new());
        let mut auth = AuthSession::restore(state, notifier.clone()).unwrap();
        let mut api = ApiClient::new("http://127.0.0.1:9/api", std::time::Duration::from_secs(1)).unwrap();

        let err = auth.login(&mut api, "", "secret", false).await.unwrap_err();
        assert!(matches!(
            err,
            CoreError::Validation(ValidationError::MissingField("email"))
        ));
        assert_eq!(notifier.last().unwrap().1, "Credenciais inválidas");
    }
}
