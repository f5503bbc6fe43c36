//! Advisory lock serializing access to one vault file.
//!
//! Two store operations racing on the same path would each load the whole
//! document and last-save-wins, silently dropping the loser's changes.
//! An exclusive `flock` on a sidecar file prevents that; read-only
//! operations take the lock shared so they can overlap each other but
//! never a writer's file-replace step.
//!
//! The sidecar (`.<name>.lock`) is locked instead of the vault file
//! itself because every save replaces the vault's inode via rename,
//! which would leave a held lock attached to a dead file.
//!
//! Non-Unix targets get a no-op lock: the caller is then responsible for
//! external serialization.

#[cfg(unix)]
use std::path::Path;

pub use imp::{VaultLock, VaultLockGuard};

/// Path of the lock sidecar for a vault at `path`.
#[cfg(unix)]
fn lock_path(path: &Path) -> std::path::PathBuf {
    let parent = path.parent().unwrap_or(Path::new("."));
    parent.join(format!(
        ".{}.lock",
        path.file_name().unwrap_or_default().to_string_lossy()
    ))
}

#[cfg(unix)]
mod imp {
    use std::fs::{File, OpenOptions};
    use std::os::unix::io::AsRawFd;
    use std::path::Path;

    use crate::errors::{Result, VaultError};

    /// A file-backed advisory lock for one vault path.
    pub struct VaultLock {
        file: File,
    }

    /// Guard holding the lock for its lifetime; unlocks on drop.
    pub struct VaultLockGuard<'a> {
        lock: &'a VaultLock,
    }

    impl VaultLock {
        /// Open (or create) the lock sidecar next to the vault at `path`.
        pub fn open(path: &Path) -> Result<Self> {
            let file = OpenOptions::new()
                .read(true)
                .write(true)
                .create(true)
                .truncate(false)
                .open(super::lock_path(path))
                .map_err(|e| VaultError::Lock(format!("cannot open lock file: {e}")))?;
            Ok(Self { file })
        }

        /// Block until the exclusive lock is held.  Mutating operations.
        pub fn lock_exclusive(&self) -> Result<VaultLockGuard<'_>> {
            self.flock(libc::LOCK_EX)?;
            Ok(VaultLockGuard { lock: self })
        }

        /// Block until a shared lock is held.  Read-only operations.
        pub fn lock_shared(&self) -> Result<VaultLockGuard<'_>> {
            self.flock(libc::LOCK_SH)?;
            Ok(VaultLockGuard { lock: self })
        }

        fn flock(&self, operation: libc::c_int) -> Result<()> {
            let rc = unsafe { libc::flock(self.file.as_raw_fd(), operation) };
            if rc == 0 {
                Ok(())
            } else {
                Err(VaultError::Lock(std::io::Error::last_os_error().to_string()))
            }
        }
    }

    impl Drop for VaultLockGuard<'_> {
        fn drop(&mut self) {
            let _ = self.lock.flock(libc::LOCK_UN);
        }
    }
}

#[cfg(not(unix))]
mod imp {
    use std::path::Path;

    use crate::errors::Result;

    /// No-op lock for non-Unix targets.
    pub struct VaultLock;

    /// No-op lock guard.
    pub struct VaultLockGuard<'a> {
        _lock: &'a VaultLock,
    }

    impl VaultLock {
        pub fn open(_path: &Path) -> Result<Self> {
            Ok(Self)
        }

        pub fn lock_exclusive(&self) -> Result<VaultLockGuard<'_>> {
            Ok(VaultLockGuard { _lock: self })
        }

        pub fn lock_shared(&self) -> Result<VaultLockGuard<'_>> {
            Ok(VaultLockGuard { _lock: self })
        }
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn creates_sidecar_next_to_vault() {
        let dir = TempDir::new().unwrap();
        let vault = dir.path().join("v.db");
        let _lock = VaultLock::open(&vault).unwrap();
        assert!(dir.path().join(".v.db.lock").exists());
    }

    #[test]
    fn exclusive_lock_released_on_drop() {
        let dir = TempDir::new().unwrap();
        let vault = dir.path().join("v.db");
        let lock = VaultLock::open(&vault).unwrap();

        drop(lock.lock_exclusive().unwrap());
        // Re-acquiring immediately only works if the guard released it.
        let _again = lock.lock_exclusive().unwrap();
    }

    #[test]
    fn shared_locks_coexist() {
        let dir = TempDir::new().unwrap();
        let vault = dir.path().join("v.db");
        let a = VaultLock::open(&vault).unwrap();
        let b = VaultLock::open(&vault).unwrap();

        let _ga = a.lock_shared().unwrap();
        let _gb = b.lock_shared().unwrap();
    }
}
