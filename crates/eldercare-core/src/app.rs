//! Application state, built once and passed by reference.

use std::rc::Rc;

use chrono::NaiveDate;

use crate::api::ApiClient;
use crate::auth::{AuthSession, Registration, User};
use crate::calendar::EventStore;
use crate::error::Result;
use crate::medication::MedicationStore;
use crate::notice::Notifier;
use crate::notification::{
    CommandSink, ConsoleSink, Delivery, DeliverySink, NotificationCenter, NotificationFeed,
};
use crate::profile::{ElderlyProfile, EmergencyContact, EmergencyContacts, ProfileStore};
use crate::report::{self, Report};
use crate::storage::{Config, Database, StateStore};

/// `notifications.command = "console"` prints to stderr instead of
/// launching a program.
pub fn default_sink(config: &Config) -> Box<dyn DeliverySink> {
    match config.notifications.command.as_str() {
        "console" => Box::new(ConsoleSink),
        program => Box::new(CommandSink::new(program)),
    }
}

pub struct App {
    pub config: Config,
    pub state: StateStore,
    pub notifier: Rc<dyn Notifier>,
    pub api: ApiClient,
    pub auth: AuthSession,
    pub medications: MedicationStore,
    pub events: EventStore,
    pub notifications: NotificationCenter,
    pub profile: ProfileStore,
    pub emergency: EmergencyContacts,
}

impl App {
    /// Open the on-disk database and wire every component.
    pub fn open(config: Config, notifier: Rc<dyn Notifier>) -> Result<Self> {
        let state = StateStore::new(Database::open()?);
        let sink = default_sink(&config);
        Self::with_parts(config, state, notifier, sink)
    }

    pub fn with_parts(
        config: Config,
        state: StateStore,
        notifier: Rc<dyn Notifier>,
        sink: Box<dyn DeliverySink>,
    ) -> Result<Self> {
        let auth = AuthSession::restore(state.clone(), Rc::clone(&notifier))?;
        let mut api = ApiClient::from_config(&config)?;
        api.set_token(auth.token().map(str::to_string));

        let delivery = Delivery::new(
            sink,
            state.clone(),
            config.notifications.enabled,
            config.notifications.icon.clone(),
        );
        let notifications = NotificationCenter::new(NotificationFeed::load(state.clone())?, delivery);

        Ok(Self {
            medications: MedicationStore::load(state.clone(), Rc::clone(&notifier))?,
            events: EventStore::load(state.clone(), Rc::clone(&notifier))?,
            profile: ProfileStore::load(state.clone(), Rc::clone(&notifier))?,
            emergency: EmergencyContacts::load(state.clone(), Rc::clone(&notifier))?,
            notifications,
            auth,
            api,
            config,
            state,
            notifier,
        })
    }

    /// Re-read the collections other processes may have changed.
    pub fn reload(&mut self) -> Result<()> {
        self.medications.reload()?;
        self.events.reload()?;
        self.notifications.feed.reload()?;
        Ok(())
    }

    pub async fn login(&mut self, email: &str, password: &str, remember: bool) -> Result<User> {
        let user = self.auth.login(&mut self.api, email, password, remember).await?;
        if self.auth.is_caregiver() {
            self.profile.ensure()?;
        }
        Ok(user)
    }

    pub async fn register(&mut self, registration: Registration) -> Result<User> {
        let user = self.auth.register(&mut self.api, registration).await?;
        if self.auth.is_caregiver() {
            self.profile.ensure()?;
        }
        Ok(user)
    }

    /// Sign out and drop the caregiver's medication and event data.
    pub fn logout(&mut self) -> Result<()> {
        self.auth.logout(&mut self.api)?;
        self.medications.clear()?;
        self.events.clear()?;
        Ok(())
    }

    /// Replace the local profile with the backend's copy.
    pub async fn fetch_profile(&mut self) -> Result<ElderlyProfile> {
        match self.api.elderly_info().await {
            Ok(profile) => {
                self.profile.replace(profile.clone())?;
                Ok(profile)
            }
            Err(e) => {
                self.notifier
                    .error(&format!("Erro ao carregar dados do idoso: {e}"));
                Err(e.into())
            }
        }
    }

    /// Send the local profile to the backend and keep what it returns.
    pub async fn push_profile(&mut self) -> Result<ElderlyProfile> {
        let local = self.profile.ensure()?.clone();
        match self.api.create_elderly(&local).await {
            Ok(saved) => {
                self.profile.replace(saved.clone())?;
                self.notifier.success("Dados do idoso salvos com sucesso!");
                Ok(saved)
            }
            Err(e) => {
                self.notifier
                    .error(&format!("Erro ao salvar dados do idoso: {e}"));
                Err(e.into())
            }
        }
    }

    pub fn emergency_directory(&self) -> Vec<EmergencyContact> {
        EmergencyContacts::directory(self.profile.profile())
    }

    pub fn report(&self, start: NaiveDate, end: NaiveDate) -> Result<Report> {
        Ok(report::build(
            self.events.all(),
            self.medications.history(),
            start,
            end,
        )?)
    }
}
