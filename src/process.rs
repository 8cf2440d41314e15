//! # Subprocess Invocation
//!
//! Every external tool this crate touches (`git`, `bazel`) is started through
//! the [`CommandRunner`] trait. An [`Invocation`] describes one command line:
//! program, arguments, working directory and environment. It is built fresh
//! for every call and never persisted.
//!
//! Commands are spawned directly, never through a shell, so the same
//! invocation behaves identically on every host. Child stdio is inherited:
//! output from `git` and the build tool goes straight to the console.
//!
//! The trait exists so the synchronizer and the build invoker can be driven by
//! a recording runner in tests, the same way repository operations are mocked
//! elsewhere.

use std::ffi::{OsStr, OsString};
use std::fmt;
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus};

use log::{debug, info};

use crate::error::{Error, Result};

/// One command line to run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    program: OsString,
    args: Vec<OsString>,
    cwd: Option<PathBuf>,
    env: Vec<(OsString, OsString)>,
    clear_env: bool,
}

impl Invocation {
    pub fn new(program: impl AsRef<OsStr>) -> Self {
        Self {
            program: program.as_ref().to_os_string(),
            args: Vec::new(),
            cwd: None,
            env: Vec::new(),
            clear_env: false,
        }
    }

    pub fn arg(mut self, arg: impl AsRef<OsStr>) -> Self {
        self.args.push(arg.as_ref().to_os_string());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        self.args
            .extend(args.into_iter().map(|a| a.as_ref().to_os_string()));
        self
    }

    pub fn current_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.cwd = Some(dir.as_ref().to_path_buf());
        self
    }

    /// Sets `key=value` in the child environment. Later calls win.
    pub fn env(mut self, key: impl AsRef<OsStr>, value: impl AsRef<OsStr>) -> Self {
        self.env
            .push((key.as_ref().to_os_string(), value.as_ref().to_os_string()));
        self
    }

    /// Start the child with an empty environment plus whatever [`env`] sets.
    ///
    /// [`env`]: Invocation::env
    pub fn env_clear(mut self) -> Self {
        self.clear_env = true;
        self
    }

    pub fn program(&self) -> &OsStr {
        &self.program
    }

    pub fn cwd(&self) -> Option<&Path> {
        self.cwd.as_deref()
    }

    pub fn clears_env(&self) -> bool {
        self.clear_env
    }

    pub fn env_vars(&self) -> &[(OsString, OsString)] {
        &self.env
    }

    /// Value set for `key`, if any.
    pub fn env_var(&self, key: &str) -> Option<&OsStr> {
        self.env
            .iter()
            .rev()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_os_str())
    }

    /// Arguments as UTF-8 strings (lossy), for logging and assertions.
    pub fn arg_strings(&self) -> Vec<String> {
        self.args
            .iter()
            .map(|a| a.to_string_lossy().into_owned())
            .collect()
    }

    /// The program name as a UTF-8 string (lossy).
    pub fn program_name(&self) -> String {
        self.program.to_string_lossy().into_owned()
    }

    fn to_command(&self) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args);
        if let Some(dir) = &self.cwd {
            cmd.current_dir(dir);
        }
        if self.clear_env {
            cmd.env_clear();
        }
        for (key, value) in &self.env {
            cmd.env(key, value);
        }
        cmd
    }
}

impl fmt::Display for Invocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", quote(&self.program))?;
        for arg in &self.args {
            write!(f, " {}", quote(arg))?;
        }
        Ok(())
    }
}

fn quote(s: &OsStr) -> String {
    let s = s.to_string_lossy();
    if s.is_empty() || s.contains(char::is_whitespace) {
        format!("'{}'", s)
    } else {
        s.into_owned()
    }
}

/// Runs invocations to completion.
pub trait CommandRunner: Send + Sync {
    /// Runs `invocation`, blocking until it exits.
    ///
    /// Returns the exit status whether or not it indicates success. An error
    /// means the process could not be started.
    fn run(&self, invocation: &Invocation) -> Result<ExitStatus>;

    /// Runs `invocation` and reports only whether it succeeded.
    fn succeeds(&self, invocation: &Invocation) -> Result<bool> {
        Ok(self.run(invocation)?.success())
    }
}

/// Spawns real processes with [`std::process::Command`].
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemRunner;

impl CommandRunner for SystemRunner {
    fn run(&self, invocation: &Invocation) -> Result<ExitStatus> {
        match invocation.cwd() {
            Some(dir) => info!("Running {} (in {})", invocation, dir.display()),
            None => info!("Running {}", invocation),
        }

        let status = invocation
            .to_command()
            .status()
            .map_err(|source| Error::Spawn {
                program: invocation.program_name(),
                source,
            })?;

        debug!("{} exited with {}", invocation.program_name(), status);
        Ok(status)
    }
}
