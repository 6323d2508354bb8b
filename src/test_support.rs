//! Helpers shared by the unit tests.

use std::cell::RefCell;
use std::env as stdenv;
use std::fs;
use std::io::{self, Result as IoResult, Write};
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::sync::{Mutex, MutexGuard, OnceLock};
use std::time::{SystemTime, UNIX_EPOCH};

/// Serializes tests that read or change the process working directory.
pub(crate) fn lock_current_dir() -> MutexGuard<'static, ()> {
    static MUTEX: OnceLock<Mutex<()>> = OnceLock::new();
    MUTEX
        .get_or_init(|| Mutex::new(()))
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
}

pub(crate) fn make_unique_temp_dir(tag: &str) -> io::Result<PathBuf> {
    let mut p = stdenv::temp_dir();
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    p.push(format!("lab_shell_{}_{}_{}", tag, std::process::id(), nanos));
    fs::create_dir_all(&p)?;
    fs::canonicalize(&p)
}

/// Serializes writing executables with spawning children.
///
/// A child forked while another test holds a script open for writing
/// inherits that descriptor until it execs, and exec of the script then
/// fails with `ETXTBSY`. Tests that spawn hold this guard around the spawn;
/// [`write_executable`] holds it until the file is closed. Take it after
/// writing, never around a call to `write_executable`.
pub(crate) fn lock_spawn() -> MutexGuard<'static, ()> {
    static MUTEX: OnceLock<Mutex<()>> = OnceLock::new();
    MUTEX
        .get_or_init(|| Mutex::new(()))
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Writes `contents` to `path` with mode 0755.
pub(crate) fn write_executable(path: &Path, contents: &str) -> io::Result<()> {
    let _spawn = lock_spawn();
    fs::write(path, contents)?;
    fs::set_permissions(path, fs::Permissions::from_mode(0o755))
}

/// Writes an executable `/bin/sh` script with the given body.
pub(crate) fn write_script(path: &Path, body: &str) -> io::Result<()> {
    write_executable(path, &format!("#!/bin/sh\n{body}\n"))
}

/// Memory-backed writer; clones share one buffer, so the prompt and the
/// command output of a session can land in the same place.
#[derive(Clone, Default)]
pub(crate) struct MemWriter {
    buf: Rc<RefCell<Vec<u8>>>,
}

impl MemWriter {
    /// Create a writer and return it with a handle to the collected bytes.
    pub(crate) fn with_handle() -> (Self, Rc<RefCell<Vec<u8>>>) {
        let mw = MemWriter::default();
        let rc = mw.buf.clone();
        (mw, rc)
    }
}

impl Write for MemWriter {
    fn write(&mut self, data: &[u8]) -> IoResult<usize> {
        self.buf.borrow_mut().extend_from_slice(data);
        Ok(data.len())
    }

    fn flush(&mut self) -> IoResult<()> {
        Ok(())
    }
}
