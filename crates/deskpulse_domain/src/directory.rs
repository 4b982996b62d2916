use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::{scalar_key, Error, Result};

fn de_key<'de, D: Deserializer<'de>>(deserializer: D) -> std::result::Result<String, D::Error> {
    let value = Value::deserialize(deserializer)?;
    scalar_key(&value).ok_or_else(|| serde::de::Error::custom(format!("invalid id: {value}")))
}

fn de_keys<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> std::result::Result<Vec<String>, D::Error> {
    let values = Option::<Vec<Value>>::deserialize(deserializer)?.unwrap_or_default();
    Ok(values.iter().filter_map(scalar_key).collect())
}

/// A conversation data attribute as described by `GET /data_attributes`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttributeDefinition {
    pub name: String,
    #[serde(default)]
    pub label: Option<String>,
}

/// Maps custom attribute names to their display labels. Built once from the
/// remote schema and handed to whoever flattens conversations.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AttributeLabels(BTreeMap<String, String>);

impl AttributeLabels {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(mut self, name: impl Into<String>, label: impl Into<String>) -> Self {
        self.0.insert(name.into(), label.into());
        self
    }

    /// The label for `name`, or `name` itself when the schema has none.
    pub fn label_for<'a>(&'a self, name: &'a str) -> &'a str {
        self.0.get(name).map(String::as_str).unwrap_or(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<AttributeDefinition> for AttributeLabels {
    fn from_iter<I: IntoIterator<Item = AttributeDefinition>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .filter_map(|def| def.label.map(|label| (def.name, label)))
                .collect(),
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Admin {
    #[serde(deserialize_with = "de_key")]
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "de_keys")]
    pub team_ids: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Team {
    #[serde(deserialize_with = "de_key")]
    pub id: String,
    pub name: String,
}

/// Admins keyed by id.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AdminDirectory(BTreeMap<String, Admin>);

impl AdminDirectory {
    pub fn name_of(&self, id: &str) -> Option<&str> {
        self.0.get(id).and_then(|admin| admin.name.as_deref())
    }

    /// Resolves an admin by exact id first, then by case-insensitive name.
    pub fn find(&self, id_or_name: &str) -> Result<&Admin> {
        let needle = id_or_name.trim();
        self.0
            .get(needle)
            .or_else(|| {
                self.0.values().find(|admin| {
                    admin
                        .name
                        .as_deref()
                        .is_some_and(|name| name.eq_ignore_ascii_case(needle))
                })
            })
            .ok_or_else(|| Error::UnknownAdmin(needle.to_string()))
    }

    /// Named admins belonging to at least one of `team_ids`, sorted by name.
    pub fn members_of(&self, team_ids: &[u64]) -> Vec<&Admin> {
        let wanted: Vec<String> = team_ids.iter().map(u64::to_string).collect();
        let mut members: Vec<&Admin> = self
            .0
            .values()
            .filter(|admin| admin.name.is_some())
            .filter(|admin| admin.team_ids.iter().any(|id| wanted.contains(id)))
            .collect();
        members.sort_by(|a, b| a.name.cmp(&b.name));
        members
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<Admin> for AdminDirectory {
    fn from_iter<I: IntoIterator<Item = Admin>>(iter: I) -> Self {
        Self(iter.into_iter().map(|admin| (admin.id.clone(), admin)).collect())
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    fn directory() -> AdminDirectory {
        let admins: Vec<Admin> = serde_json::from_value(json!([
            {"id": "11", "name": "Bruna", "team_ids": [2975006]},
            {"id": 12, "name": "ana", "team_ids": ["1972225", 99]},
            {"id": "13", "name": "Carlos", "team_ids": [42]},
            {"id": "14", "name": null}
        ]))
        .unwrap();
        admins.into_iter().collect()
    }

    #[test]
    fn test_label_falls_back_to_name() {
        let fixture: AttributeLabels = vec![
            AttributeDefinition { name: "motivo".into(), label: Some("Motivo de Contato".into()) },
            AttributeDefinition { name: "sem_label".into(), label: None },
        ]
        .into_iter()
        .collect();

        assert_eq!(fixture.label_for("motivo"), "Motivo de Contato");
        assert_eq!(fixture.label_for("sem_label"), "sem_label");
        assert_eq!(fixture.len(), 1);
    }

    #[test]
    fn test_numeric_ids_are_normalised() {
        let fixture = directory();
        assert_eq!(fixture.name_of("12"), Some("ana"));
        assert_eq!(fixture.find("12").unwrap().team_ids, vec!["1972225", "99"]);
    }

    #[test]
    fn test_find_by_name_ignores_case() {
        let fixture = directory();
        assert_eq!(fixture.find("  ANA ").unwrap().id, "12");
        assert!(matches!(fixture.find("nobody"), Err(Error::UnknownAdmin(_))));
    }

    #[test]
    fn test_members_of_teams_sorted_by_name() {
        let fixture = directory();
        let actual: Vec<&str> = fixture
            .members_of(&[2975006, 1972225])
            .into_iter()
            .map(|admin| admin.id.as_str())
            .collect();
        assert_eq!(actual, vec!["11", "12"]);
    }
}
