//! The cared-for person's record and their emergency contacts.

mod emergency;

pub use emergency::{CustomNumber, EmergencyContact, EmergencyContacts, NewCustomNumber};

use std::rc::Rc;

use serde::{Deserialize, Deserializer, Serialize};

use crate::error::Result;
use crate::notice::Notifier;
use crate::storage::{keys, StateStore};

/// Accepts `"72"` or `72`; the backend is not consistent.
pub(crate) fn string_or_number<'de, D: Deserializer<'de>>(de: D) -> Result<String, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        S(String),
        N(serde_json::Number),
        Null(()),
    }
    Ok(match Raw::deserialize(de)? {
        Raw::S(s) => s,
        Raw::N(n) => n.to_string(),
        Raw::Null(()) => String::new(),
    })
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ElderlyProfile {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    pub name: String,
    #[serde(deserialize_with = "string_or_number")]
    pub age: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub birth_date: String,
    pub blood_type: String,
    pub marital_status: String,
    pub allergies: Vec<String>,
    pub address: String,
    pub phone: String,
    pub emergency_contact: String,
    pub medical_conditions: Vec<String>,
    pub medications: Vec<String>,
}

/// Merge-style update: only the fields that are set replace stored values.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProfilePatch {
    pub name: Option<String>,
    pub age: Option<String>,
    pub birth_date: Option<String>,
    pub blood_type: Option<String>,
    pub marital_status: Option<String>,
    pub allergies: Option<Vec<String>>,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub emergency_contact: Option<String>,
    pub medical_conditions: Option<Vec<String>>,
    pub medications: Option<Vec<String>>,
}

impl ElderlyProfile {
    pub fn apply(&mut self, patch: ProfilePatch) {
        macro_rules! merge {
            ($($field:ident),*) => {
                $(if let Some(v) = patch.$field { self.$field = v; })*
            };
        }
        merge!(
            name,
            age,
            birth_date,
            blood_type,
            marital_status,
            allergies,
            address,
            phone,
            emergency_contact,
            medical_conditions,
            medications
        );
    }
}

/// Persisted profile under `elderlyData`.
pub struct ProfileStore {
    state: StateStore,
    notifier: Rc<dyn Notifier>,
    profile: Option<ElderlyProfile>,
}

impl ProfileStore {
    pub fn load(state: StateStore, notifier: Rc<dyn Notifier>) -> Result<Self> {
        let profile = state.load(keys::ELDERLY_DATA)?;
        Ok(Self {
            state,
            notifier,
            profile,
        })
    }

    pub fn profile(&self) -> Option<&ElderlyProfile> {
        self.profile.as_ref()
    }

    /// Create an empty profile if there is none yet.
    pub fn ensure(&mut self) -> Result<&ElderlyProfile> {
        if self.profile.is_none() {
            self.state.save(keys::ELDERLY_DATA, &ElderlyProfile::default())?;
        }
        Ok(self.profile.get_or_insert_with(ElderlyProfile::default))
    }

    pub fn update(&mut self, patch: ProfilePatch) -> Result<ElderlyProfile> {
        let mut profile = self.profile.clone().unwrap_or_default();
        profile.apply(patch);
        self.state.save(keys::ELDERLY_DATA, &profile)?;
        self.profile = Some(profile.clone());
        self.notifier.success("Dados atualizados com sucesso!");
        Ok(profile)
    }

    /// Replace the whole profile, e.g. with what the backend returned.
    pub fn replace(&mut self, profile: ElderlyProfile) -> Result<()> {
        self.state.save(keys::ELDERLY_DATA, &profile)?;
        self.profile = Some(profile);
        Ok(())
    }

    pub fn clear(&mut self) -> Result<()> {
        self.state.remove(keys::ELDERLY_DATA)?;
        self.profile = None;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notice::RecordingNotifier;

    fn store(state: &StateStore) -> ProfileStore {
        ProfileStore::load(state.clone(), Rc::new(RecordingNotifier::new())).unwrap()
    }

    #[test]
    fn update_merges_and_persists() {
        let state = StateStore::in_memory().unwrap();
        let mut profiles = store(&state);
        profiles
            .update(ProfilePatch {
                name: Some("João da Silva".into()),
                blood_type: Some("O+".into()),
                ..Default::default()
            })
            .unwrap();
        profiles
            .update(ProfilePatch {
                phone: Some("(11) 99999-8888".into()),
                ..Default::default()
            })
            .unwrap();

        let reloaded = store(&state);
        let p = reloaded.profile().unwrap();
        assert_eq!(p.name, "João da Silva");
        assert_eq!(p.blood_type, "O+");
        assert_eq!(p.phone, "(11) 99999-8888");
    }

    #[test]
    fn ensure_creates_an_empty_profile_once() {
        let state = StateStore::in_memory().unwrap();
        let mut profiles = store(&state);
        assert!(profiles.profile().is_none());
        assert_eq!(profiles.ensure().unwrap(), &ElderlyProfile::default());
        assert!(store(&state).profile().is_some());
    }

    #[test]
    fn backend_profile_with_numeric_fields_decodes() {
        let p: ElderlyProfile = serde_json::from_value(serde_json::json!({
            "id": 1,
            "name": "João da Silva",
            "age": 84,
            "birthDate": "1940-05-15",
            "address": "Rua das Flores, 123"
        }))
        .unwrap();
        assert_eq!(p.id, "1");
        assert_eq!(p.age, "84");
        assert!(p.allergies.is_empty());
    }
}
