//! The decrypted document tree: Database -> SecretGroup -> Secret.
//!
//! These types serialize to the JSON payload that gets sealed inside the
//! vault ciphertext.  "Sub databases" are additional top-level `Database`
//! records in insertion order, not nested children.  The types implement
//! `Zeroize` so the codec can wipe a decrypted tree when an operation
//! finishes with it.

use serde::{Deserialize, Serialize};
use zeroize::Zeroize;

/// One credential record.
///
/// The `id` is unique within its group, assigned at creation, and never
/// reused after deletion.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, Zeroize)]
pub struct Secret {
    pub id: u32,
    pub title: String,
    pub username: String,
    pub password: String,
    pub url: String,
    pub description: String,
}

/// A named bucket of secrets within a database.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, Zeroize)]
pub struct SecretGroup {
    pub name: String,

    /// Secrets in insertion order.
    pub secrets: Vec<Secret>,

    /// Monotonic counter backing `next_secret_id`.  Optional so documents
    /// written without it (the minimal wire shape) still parse; absent, id
    /// assignment falls back to a max-scan over live secrets.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_id: Option<u32>,
}

impl SecretGroup {
    /// Create an empty group.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            secrets: Vec::new(),
            next_id: None,
        }
    }

    /// The id the next created secret will receive.
    ///
    /// Starts at 1, strictly increases, and never revisits a retired id:
    /// the stored counter survives deletion of the highest-id secret.
    /// Returns `None` once a live secret already holds `u32::MAX` and the
    /// id space has nothing left to hand out.
    pub fn next_secret_id(&self) -> Option<u32> {
        let max_live = self.secrets.iter().map(|s| s.id).max().unwrap_or(0);
        let floor = max_live.checked_add(1)?;
        Some(self.next_id.unwrap_or(1).max(floor))
    }

    /// Look up a secret by id.
    pub fn secret(&self, id: u32) -> Option<&Secret> {
        self.secrets.iter().find(|s| s.id == id)
    }

    pub fn secret_mut(&mut self, id: u32) -> Option<&mut Secret> {
        self.secrets.iter_mut().find(|s| s.id == id)
    }
}

/// A named top-level namespace inside a vault.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, Zeroize)]
pub struct Database {
    pub name: String,

    /// Secret groups in insertion order.
    pub groups: Vec<SecretGroup>,
}

impl Database {
    /// Create an empty database.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            groups: Vec::new(),
        }
    }

    /// Look up a group by name (case-sensitive).
    pub fn group(&self, name: &str) -> Option<&SecretGroup> {
        self.groups.iter().find(|g| g.name == name)
    }

    pub fn group_mut(&mut self, name: &str) -> Option<&mut SecretGroup> {
        self.groups.iter_mut().find(|g| g.name == name)
    }
}

/// The whole decrypted payload: an ordered sequence of databases.
///
/// Serializes transparently as a JSON array of `Database` records, which
/// is the shape the vault format seals.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, Zeroize)]
#[serde(transparent)]
pub struct Document {
    pub databases: Vec<Database>,
}

impl Document {
    /// Look up a database by name (case-sensitive).
    pub fn database(&self, name: &str) -> Option<&Database> {
        self.databases.iter().find(|d| d.name == name)
    }

    pub fn database_mut(&mut self, name: &str) -> Option<&mut Database> {
        self.databases.iter_mut().find(|d| d.name == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wire_shape_matches_contract() {
        let mut group = SecretGroup::new("General");
        group.secrets.push(Secret {
            id: 1,
            title: "Email".into(),
            username: "alice".into(),
            password: "p@ss".into(),
            url: "https://mail.example".into(),
            description: String::new(),
        });
        let doc = Document {
            databases: vec![Database {
                name: "personal".into(),
                groups: vec![group],
            }],
        };

        let json = serde_json::to_value(&doc).unwrap();
        assert_eq!(
            json,
            serde_json::json!([{
                "name": "personal",
                "groups": [{
                    "name": "General",
                    "secrets": [{
                        "id": 1,
                        "title": "Email",
                        "username": "alice",
                        "password": "p@ss",
                        "url": "https://mail.example",
                        "description": ""
                    }]
                }]
            }])
        );
    }

    #[test]
    fn minimal_wire_shape_parses_without_counter() {
        let json = r#"[{"name":"db","groups":[{"name":"g","secrets":[
            {"id":1,"title":"a","username":"","password":"","url":"","description":""},
            {"id":3,"title":"b","username":"","password":"","url":"","description":""}
        ]}]}]"#;
        let doc: Document = serde_json::from_str(json).unwrap();
        let group = doc.database("db").unwrap().group("g").unwrap();
        assert_eq!(group.next_id, None);
        assert_eq!(group.next_secret_id(), Some(4));
    }

    #[test]
    fn counter_survives_deleting_highest() {
        let mut group = SecretGroup::new("g");
        group.secrets.push(Secret {
            id: 3,
            ..Secret::default()
        });
        group.next_id = Some(4);

        group.secrets.clear();
        assert_eq!(group.next_secret_id(), Some(4));
    }

    #[test]
    fn fresh_group_starts_at_one() {
        assert_eq!(SecretGroup::new("g").next_secret_id(), Some(1));
    }

    #[test]
    fn id_space_exhaustion_yields_no_next_id() {
        let mut group = SecretGroup::new("g");
        group.secrets.push(Secret {
            id: u32::MAX,
            ..Secret::default()
        });
        assert_eq!(group.next_secret_id(), None);
    }
}
