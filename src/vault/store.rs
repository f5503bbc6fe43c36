//! High-level vault operations consumed by the presentation layer.
//!
//! Every operation is a self-contained transaction against one vault
//! file: acquire the advisory lock, decrypt the document, mutate it in
//! memory, re-encrypt and atomically persist, release.  Either the whole
//! transaction commits or the file is untouched — no operation returns
//! success while the on-disk vault disagrees with the returned result.
//!
//! `DocumentStore` carries only configuration (the KDF work factor); the
//! vault path and passphrase are explicit on every call so one store can
//! serve any number of vaults.

use std::path::Path;

use crate::config::Settings;
use crate::crypto::kdf::KdfParams;
use crate::crypto::password;
use crate::errors::{Result, VaultError};

use super::codec;
use super::lock::VaultLock;
use super::models::{Database, Document, Secret, SecretGroup};

/// Name of the secret group seeded into a freshly bootstrapped database.
pub const DEFAULT_GROUP: &str = "General";

/// The operation surface over encrypted vault files.
#[derive(Debug, Clone)]
pub struct DocumentStore {
    params: KdfParams,
    password_length: usize,
}

impl Default for DocumentStore {
    fn default() -> Self {
        Self {
            params: KdfParams::default(),
            password_length: password::DEFAULT_LENGTH,
        }
    }
}

impl DocumentStore {
    /// A store using the default Argon2id work factor (64 MB, 3, 4).
    pub fn new() -> Self {
        Self::default()
    }

    /// A store with an explicit KDF work factor.
    ///
    /// A vault must be opened with the same work factor it was created
    /// with; the envelope stores only the salt.
    pub fn with_params(params: KdfParams) -> Self {
        Self {
            params,
            ..Self::default()
        }
    }

    /// A store configured from `.passvault.toml` settings.
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            params: settings.kdf_params(),
            password_length: settings.password_length,
        }
    }

    /// A generated password candidate at the configured length, for
    /// callers filling in a new secret.
    pub fn suggest_password(&self) -> String {
        password::generate_strong_password(self.password_length)
    }

    // ------------------------------------------------------------------
    // Vault lifecycle
    // ------------------------------------------------------------------

    /// Create a new, empty vault file at `path`.
    pub fn init(&self, path: &Path, passphrase: &str) -> Result<()> {
        let lock = VaultLock::open(path)?;
        let _guard = lock.lock_exclusive()?;
        codec::init(path, passphrase, &self.params)
    }

    /// Whether a file exists at `path`.  No decryption is attempted.
    pub fn check_file_exist(path: &Path) -> bool {
        path.exists()
    }

    // ------------------------------------------------------------------
    // Database operations
    // ------------------------------------------------------------------

    /// Append a new empty database.
    pub fn create_database(&self, path: &Path, passphrase: &str, name: &str) -> Result<Database> {
        validate_name(name, "database")?;
        self.mutate(path, passphrase, |doc| {
            if doc.database(name).is_some() {
                return Err(VaultError::DatabaseExists(name.to_string()));
            }
            let database = Database::new(name);
            doc.databases.push(database.clone());
            Ok(database)
        })
    }

    /// Idempotent bootstrap used right after `init`: creates the database
    /// if absent and seeds it with a default group if it has none.
    pub fn create_database_and_secret_group_if_not_exist(
        &self,
        path: &Path,
        passphrase: &str,
        name: &str,
    ) -> Result<Database> {
        validate_name(name, "database")?;
        self.mutate(path, passphrase, |doc| {
            if doc.database(name).is_none() {
                doc.databases.push(Database::new(name));
            }
            let database = doc
                .database_mut(name)
                .ok_or_else(|| VaultError::DatabaseNotFound(name.to_string()))?;
            if database.groups.is_empty() {
                database.groups.push(SecretGroup::new(DEFAULT_GROUP));
            }
            Ok(database.clone())
        })
    }

    /// The full document tree, in insertion order.
    pub fn get_all_databases(&self, path: &Path, passphrase: &str) -> Result<Vec<Database>> {
        self.read(path, passphrase, |doc| Ok(doc.databases.clone()))
    }

    /// One database by name.
    pub fn get_database(&self, path: &Path, passphrase: &str, name: &str) -> Result<Database> {
        self.read(path, passphrase, |doc| {
            doc.database(name)
                .cloned()
                .ok_or_else(|| VaultError::DatabaseNotFound(name.to_string()))
        })
    }

    /// Rename a database.  Renaming to its current name is a no-op
    /// success; any other collision is a conflict.
    pub fn update_database(
        &self,
        path: &Path,
        passphrase: &str,
        old_name: &str,
        new_name: &str,
    ) -> Result<Database> {
        validate_name(new_name, "database")?;
        self.mutate(path, passphrase, |doc| {
            if doc.database(old_name).is_none() {
                return Err(VaultError::DatabaseNotFound(old_name.to_string()));
            }
            if new_name != old_name && doc.database(new_name).is_some() {
                return Err(VaultError::DatabaseExists(new_name.to_string()));
            }
            let database = doc
                .database_mut(old_name)
                .ok_or_else(|| VaultError::DatabaseNotFound(old_name.to_string()))?;
            database.name = new_name.to_string();
            Ok(database.clone())
        })
    }

    /// Delete a database.  Refused while it still contains secret groups;
    /// there is no cascading delete at this level.
    pub fn delete_database(&self, path: &Path, passphrase: &str, name: &str) -> Result<()> {
        self.mutate(path, passphrase, |doc| {
            let database = doc
                .database(name)
                .ok_or_else(|| VaultError::DatabaseNotFound(name.to_string()))?;
            if !database.groups.is_empty() {
                return Err(VaultError::DatabaseNotEmpty(name.to_string()));
            }
            doc.databases.retain(|d| d.name != name);
            Ok(())
        })
    }

    // ------------------------------------------------------------------
    // Secret group operations
    // ------------------------------------------------------------------

    /// Append a new empty group to a database.
    pub fn create_secret_group(
        &self,
        path: &Path,
        passphrase: &str,
        database_name: &str,
        group_name: &str,
    ) -> Result<SecretGroup> {
        validate_name(group_name, "secret group")?;
        self.mutate(path, passphrase, |doc| {
            let database = doc
                .database_mut(database_name)
                .ok_or_else(|| VaultError::DatabaseNotFound(database_name.to_string()))?;
            if database.group(group_name).is_some() {
                return Err(VaultError::GroupExists(group_name.to_string()));
            }
            let group = SecretGroup::new(group_name);
            database.groups.push(group.clone());
            Ok(group)
        })
    }

    /// One group by name, scoped to its database.
    pub fn get_secret_group(
        &self,
        path: &Path,
        passphrase: &str,
        database_name: &str,
        group_name: &str,
    ) -> Result<SecretGroup> {
        self.read(path, passphrase, |doc| {
            find_group(doc, database_name, group_name).map(Clone::clone)
        })
    }

    /// Rename a group.  Same collision rule as `update_database`.
    pub fn update_secret_group(
        &self,
        path: &Path,
        passphrase: &str,
        database_name: &str,
        old_name: &str,
        new_name: &str,
    ) -> Result<SecretGroup> {
        validate_name(new_name, "secret group")?;
        self.mutate(path, passphrase, |doc| {
            let database = doc
                .database_mut(database_name)
                .ok_or_else(|| VaultError::DatabaseNotFound(database_name.to_string()))?;
            if database.group(old_name).is_none() {
                return Err(VaultError::GroupNotFound(old_name.to_string()));
            }
            if new_name != old_name && database.group(new_name).is_some() {
                return Err(VaultError::GroupExists(new_name.to_string()));
            }
            let group = database
                .group_mut(old_name)
                .ok_or_else(|| VaultError::GroupNotFound(old_name.to_string()))?;
            group.name = new_name.to_string();
            Ok(group.clone())
        })
    }

    /// Delete a group and, cascading, every secret it contains.
    pub fn delete_secret_group(
        &self,
        path: &Path,
        passphrase: &str,
        database_name: &str,
        group_name: &str,
    ) -> Result<()> {
        self.mutate(path, passphrase, |doc| {
            let database = doc
                .database_mut(database_name)
                .ok_or_else(|| VaultError::DatabaseNotFound(database_name.to_string()))?;
            if database.group(group_name).is_none() {
                return Err(VaultError::GroupNotFound(group_name.to_string()));
            }
            database.groups.retain(|g| g.name != group_name);
            Ok(())
        })
    }

    // ------------------------------------------------------------------
    // Secret operations
    // ------------------------------------------------------------------

    /// All secrets in a group, in insertion order.
    pub fn get_secrets(
        &self,
        path: &Path,
        passphrase: &str,
        database_name: &str,
        group_name: &str,
    ) -> Result<Vec<Secret>> {
        self.read(path, passphrase, |doc| {
            Ok(find_group(doc, database_name, group_name)?.secrets.clone())
        })
    }

    /// Store a new secret and return it with its assigned id.
    ///
    /// Ids start at 1, strictly increase within a group, and are never
    /// reassigned after deletion — even when the deleted id was the
    /// highest.
    pub fn create_secret(
        &self,
        path: &Path,
        passphrase: &str,
        database_name: &str,
        group_name: &str,
        mut secret: Secret,
    ) -> Result<Secret> {
        if secret.title.is_empty() {
            return Err(VaultError::Validation("secret title cannot be empty".into()));
        }
        self.mutate(path, passphrase, |doc| {
            let group = find_group_mut(doc, database_name, group_name)?;
            // Reserve u32::MAX itself so the counter bump below cannot wrap.
            let id = group
                .next_secret_id()
                .filter(|&id| id < u32::MAX)
                .ok_or_else(|| {
                    VaultError::Validation(format!(
                        "secret id space exhausted in group '{group_name}'"
                    ))
                })?;
            secret.id = id;
            group.next_id = Some(id + 1);
            group.secrets.push(secret.clone());
            Ok(secret)
        })
    }

    /// One secret by id, scoped to (database, group).
    pub fn get_secret(
        &self,
        path: &Path,
        passphrase: &str,
        database_name: &str,
        group_name: &str,
        id: u32,
    ) -> Result<Secret> {
        self.read(path, passphrase, |doc| {
            find_group(doc, database_name, group_name)?
                .secret(id)
                .cloned()
                .ok_or(VaultError::SecretNotFound(id))
        })
    }

    /// Replace every field of a secret except its id.
    pub fn update_secret(
        &self,
        path: &Path,
        passphrase: &str,
        database_name: &str,
        group_name: &str,
        id: u32,
        secret: Secret,
    ) -> Result<Secret> {
        if secret.title.is_empty() {
            return Err(VaultError::Validation("secret title cannot be empty".into()));
        }
        self.mutate(path, passphrase, |doc| {
            let group = find_group_mut(doc, database_name, group_name)?;
            let existing = group.secret_mut(id).ok_or(VaultError::SecretNotFound(id))?;
            existing.title = secret.title.clone();
            existing.username = secret.username.clone();
            existing.password = secret.password.clone();
            existing.url = secret.url.clone();
            existing.description = secret.description.clone();
            Ok(existing.clone())
        })
    }

    /// Delete a secret.  Its id is retired, not recycled.
    pub fn delete_secret(
        &self,
        path: &Path,
        passphrase: &str,
        database_name: &str,
        group_name: &str,
        id: u32,
    ) -> Result<()> {
        self.mutate(path, passphrase, |doc| {
            let group = find_group_mut(doc, database_name, group_name)?;
            if group.secret(id).is_none() {
                return Err(VaultError::SecretNotFound(id));
            }
            group.secrets.retain(|s| s.id != id);
            Ok(())
        })
    }

    // ------------------------------------------------------------------
    // Transaction plumbing
    // ------------------------------------------------------------------

    /// Run a read-only operation under a shared lock.
    fn read<T>(
        &self,
        path: &Path,
        passphrase: &str,
        op: impl FnOnce(&Document) -> Result<T>,
    ) -> Result<T> {
        let lock = VaultLock::open(path)?;
        let _guard = lock.lock_shared()?;
        let vault = codec::load(path, passphrase, &self.params)?;
        op(&vault.document)
    }

    /// Run a mutating operation under an exclusive lock.
    ///
    /// The document is persisted only if `op` succeeds; on any error the
    /// on-disk vault is untouched.  The lock guard drops on every exit
    /// path.
    fn mutate<T>(
        &self,
        path: &Path,
        passphrase: &str,
        op: impl FnOnce(&mut Document) -> Result<T>,
    ) -> Result<T> {
        let lock = VaultLock::open(path)?;
        let _guard = lock.lock_exclusive()?;
        let mut vault = codec::load(path, passphrase, &self.params)?;
        let result = op(&mut vault.document)?;
        codec::save(path, &vault)?;
        Ok(result)
    }
}

/// Reject empty entity names before any file access.
fn validate_name(name: &str, kind: &str) -> Result<()> {
    if name.is_empty() {
        return Err(VaultError::Validation(format!("{kind} name cannot be empty")));
    }
    Ok(())
}

fn find_group<'a>(
    doc: &'a Document,
    database_name: &str,
    group_name: &str,
) -> Result<&'a SecretGroup> {
    doc.database(database_name)
        .ok_or_else(|| VaultError::DatabaseNotFound(database_name.to_string()))?
        .group(group_name)
        .ok_or_else(|| VaultError::GroupNotFound(group_name.to_string()))
}

fn find_group_mut<'a>(
    doc: &'a mut Document,
    database_name: &str,
    group_name: &str,
) -> Result<&'a mut SecretGroup> {
    doc.database_mut(database_name)
        .ok_or_else(|| VaultError::DatabaseNotFound(database_name.to_string()))?
        .group_mut(group_name)
        .ok_or_else(|| VaultError::GroupNotFound(group_name.to_string()))
}
