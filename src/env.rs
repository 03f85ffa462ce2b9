use std::env as stdenv;
use std::path::{Path, PathBuf};

use nix::unistd::{User, getuid};
use tracing::debug;

use crate::error::ShellError;

/// Mutable, process-level state the builtins operate on.
///
/// - `current_dir`: the working directory, kept in sync with the process's.
/// - `previous_dir`: where `cd -` goes; unset until the first successful `cd`.
/// - `should_exit`: set by `exit`, checked by the main loop after each line.
#[derive(Debug, Clone)]
pub struct Environment {
    pub current_dir: PathBuf,
    pub previous_dir: Option<PathBuf>,
    pub should_exit: bool,
}

impl Environment {
    /// Capture the process's working directory.
    pub fn new() -> Self {
        let current_dir = stdenv::current_dir().unwrap_or_else(|_| PathBuf::from("."));
        Self {
            current_dir,
            previous_dir: None,
            should_exit: false,
        }
    }

    /// Change the process's working directory to `target`.
    ///
    /// On success the directory being left becomes `previous_dir`. On
    /// failure nothing changes.
    pub fn change_dir(&mut self, target: &Path) -> Result<(), ShellError> {
        stdenv::set_current_dir(target).map_err(|source| ShellError::Path {
            path: target.display().to_string(),
            source,
        })?;
        let entered = stdenv::current_dir().unwrap_or_else(|_| self.current_dir.join(target));
        debug!(from = %self.current_dir.display(), to = %entered.display(), "changed directory");
        let left = std::mem::replace(&mut self.current_dir, entered);
        self.previous_dir = Some(left);
        Ok(())
    }

    /// The directory `cd -` would switch to.
    ///
    /// A previous directory equal to the current one counts as unset.
    pub fn previous_target(&self) -> Option<&Path> {
        self.previous_dir
            .as_deref()
            .filter(|prev| *prev != self.current_dir.as_path())
    }

    /// Home directory of the invoking user, from the user database.
    pub fn home_dir(&self) -> Result<PathBuf, ShellError> {
        match User::from_uid(getuid()) {
            Ok(Some(user)) => Ok(user.dir),
            Ok(None) => Err(ShellError::HomeDir),
            Err(errno) => {
                debug!(%errno, "user database lookup failed");
                Err(ShellError::HomeDir)
            }
        }
    }
}

impl Default for Environment {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::sync::{Mutex, MutexGuard, OnceLock};

    /// Serialises tests that change the process's working directory.
    pub(crate) fn lock_current_dir() -> MutexGuard<'static, ()> {
        static MUTEX: OnceLock<Mutex<()>> = OnceLock::new();
        MUTEX
            .get_or_init(|| Mutex::new(()))
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    #[test]
    fn test_change_dir_remembers_previous() {
        let _lock = lock_current_dir();
        let orig = stdenv::current_dir().unwrap();
        let temp = tempfile::tempdir().unwrap();
        let canonical_temp = temp.path().canonicalize().unwrap();

        let mut env = Environment::new();
        assert_eq!(env.previous_target(), None);

        env.change_dir(temp.path()).unwrap();
        assert_eq!(env.current_dir, canonical_temp);
        assert_eq!(env.previous_dir.as_deref(), Some(orig.as_path()));
        assert_eq!(env.previous_target(), Some(orig.as_path()));

        stdenv::set_current_dir(orig).expect("failed to restore cwd");
    }

    #[test]
    fn test_failed_change_dir_changes_nothing() {
        let _lock = lock_current_dir();
        let orig = stdenv::current_dir().unwrap();
        let temp = tempfile::tempdir().unwrap();
        let missing = temp.path().join("missing");

        let mut env = Environment::new();
        let err = env.change_dir(&missing).unwrap_err();
        assert!(matches!(err, ShellError::Path { .. }));
        assert_eq!(env.current_dir, orig);
        assert_eq!(env.previous_dir, None);
        assert_eq!(stdenv::current_dir().unwrap(), orig);
    }

    #[test]
    fn test_previous_equal_to_current_is_unset() {
        let env = Environment {
            current_dir: PathBuf::from("/"),
            previous_dir: Some(PathBuf::from("/")),
            should_exit: false,
        };
        assert_eq!(env.previous_target(), None);
    }

    #[test]
    fn test_home_dir_is_absolute() {
        let env = Environment::new();
        if let Ok(home) = env.home_dir() {
            assert!(home.is_absolute());
        }
    }
}
