//! Emergency phone directory.
//!
//! Public services are fixed. User-added numbers are persisted under
//! `emergencyCustomNumbers`.

use std::rc::Rc;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{string_or_number, ElderlyProfile};
use crate::error::{Result, ValidationError};
use crate::notice::Notifier;
use crate::storage::{keys, StateStore};

const SERVICE: &str = "Serviço de Emergência";
const FAMILY: &str = "Familiar";
const DEFAULT_CONTACT_NAME: &str = "Contato de Emergência";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EmergencyContact {
    pub name: String,
    pub phone: String,
    pub relation: String,
}

impl EmergencyContact {
    fn new(name: &str, phone: &str, relation: &str) -> Self {
        Self {
            name: name.into(),
            phone: phone.into(),
            relation: relation.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomNumber {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    pub name: String,
    pub phone: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Clone, Default)]
pub struct NewCustomNumber {
    pub name: String,
    pub phone: String,
    pub description: String,
}

pub struct EmergencyContacts {
    state: StateStore,
    notifier: Rc<dyn Notifier>,
    custom: Vec<CustomNumber>,
}

impl EmergencyContacts {
    pub fn load(state: StateStore, notifier: Rc<dyn Notifier>) -> Result<Self> {
        let custom = state.load_or_default(keys::EMERGENCY_CUSTOM_NUMBERS)?;
        Ok(Self {
            state,
            notifier,
            custom,
        })
    }

    /// SAMU, Bombeiros and Polícia.
    pub fn services() -> Vec<EmergencyContact> {
        vec![
            EmergencyContact::new("SAMU", "192", SERVICE),
            EmergencyContact::new("Bombeiros", "193", SERVICE),
            EmergencyContact::new("Polícia", "190", SERVICE),
        ]
    }

    /// The profile's own contact first, then the public services.
    ///
    /// The profile contact is listed only when the profile has a phone.
    pub fn directory(profile: Option<&ElderlyProfile>) -> Vec<EmergencyContact> {
        let mut contacts = Vec::new();
        if let Some(p) = profile.filter(|p| !p.phone.trim().is_empty()) {
            let name = if p.emergency_contact.trim().is_empty() {
                DEFAULT_CONTACT_NAME
            } else {
                p.emergency_contact.trim()
            };
            contacts.push(EmergencyContact::new(name, p.phone.trim(), FAMILY));
        }
        contacts.extend(Self::services());
        contacts
    }

    pub fn custom(&self) -> &[CustomNumber] {
        &self.custom
    }

    pub fn add(&mut self, input: NewCustomNumber) -> Result<CustomNumber> {
        let missing = if input.name.trim().is_empty() {
            Some("name")
        } else if input.phone.trim().is_empty() {
            Some("phone")
        } else {
            None
        };
        if let Some(field) = missing {
            self.notifier.error("Nome e telefone são obrigatórios!");
            return Err(ValidationError::MissingField(field).into());
        }

        let number = CustomNumber {
            id: Uuid::new_v4().to_string(),
            name: input.name.trim().to_string(),
            phone: input.phone.trim().to_string(),
            description: input.description.trim().to_string(),
        };
        self.custom.push(number.clone());
        self.persist()?;
        self.notifier.success("Número adicionado com sucesso!");
        Ok(number)
    }

    pub fn remove(&mut self, id: &str) -> Result<Option<CustomNumber>> {
        let Some(idx) = self.custom.iter().position(|n| n.id == id) else {
            return Ok(None);
        };
        let removed = self.custom.remove(idx);
        self.persist()?;
        self.notifier.success("Número removido com sucesso!");
        Ok(Some(removed))
    }

    fn persist(&self) -> Result<()> {
        self.state.save(keys::EMERGENCY_CUSTOM_NUMBERS, &self.custom)?;
        Ok(())
    }
}
