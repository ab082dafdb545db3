//! The sandbox state manager: one isolated interpreter VM per instance.
//!
//! A `Sandbox` owns an `mlua::Lua` VM together with its registered search
//! paths and the optional override suffix. Instances are exclusively owned
//! by one worker for their whole lifetime and are never shared across
//! threads; dropping the instance releases the VM.

use crate::sandbox::bundle::{EmbeddedBundle, ModuleBundle, MODULE_PREFIX};
use crate::sandbox::convert;
use crate::sandbox::error::SandboxError;
use crate::sandbox::resolver;
use crate::value::Value;
use mlua::{FromLuaMulti, IntoLuaMulti, Lua};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};
use tracing::{debug, warn};

/// Configuration for sandbox construction.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SandboxConfig {
    /// Suffix forming the `<module>-<suffix>` override module name.
    /// When unset, the default module resolver is left in place.
    pub override_suffix: Option<String>,
}

impl SandboxConfig {
    /// Creates a configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the override-merge suffix.
    #[must_use]
    pub fn with_override_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.override_suffix = Some(suffix.into());
        self
    }
}

/// Directories already appended to the interpreter's module search path.
///
/// Mutation is lock-guarded. Each instance is single-owner in the final
/// design, so the lock is a defensive invariant carried over from the
/// earlier shared-pool arrangement rather than a correctness requirement.
#[derive(Debug, Default)]
pub struct SearchPathSet {
    inner: Mutex<HashSet<PathBuf>>,
}

impl SearchPathSet {
    /// Returns true if `dir` is already registered.
    #[must_use]
    pub fn contains(&self, dir: &Path) -> bool {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(dir)
    }

    /// Returns the number of registered directories.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Returns true if no directories are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn insert(&self, dir: PathBuf) {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(dir);
    }
}

/// One isolated interpreter VM plus its per-instance configuration.
pub struct Sandbox {
    lua: Lua,
    paths: SearchPathSet,
    override_suffix: Option<String>,
}

impl std::fmt::Debug for Sandbox {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Sandbox")
            .field("paths", &self.paths)
            .field("override_suffix", &self.override_suffix)
            .finish_non_exhaustive()
    }
}

impl Sandbox {
    /// Creates a sandbox loaded with the embedded module bundle.
    pub fn new(config: &SandboxConfig) -> Result<Self, SandboxError> {
        Self::with_bundle(config, &EmbeddedBundle::new())
    }

    /// Creates a sandbox loaded from the given module bundle.
    ///
    /// Installs, before any user script runs: every bundled module under
    /// the `lua/` prefix in listing order, the host-exposed `add` demo
    /// function, and (when an override suffix is configured) the two-tier
    /// module resolver.
    pub fn with_bundle(
        config: &SandboxConfig,
        bundle: &dyn ModuleBundle,
    ) -> Result<Self, SandboxError> {
        let lua = Lua::new();

        for name in bundle.names() {
            if !name.starts_with(MODULE_PREFIX) || !name.ends_with(".lua") {
                continue;
            }
            let Some(content) = bundle.content(name) else {
                warn!(module = name, "bundled module has no content, skipping");
                continue;
            };
            // A broken bundled module is logged and skipped; later modules
            // may still add or replace globals.
            if let Err(e) = lua.load(content).set_name(name).exec() {
                warn!(module = name, error = %e, "failed to load bundled module");
            }
        }

        let add = lua
            .create_function(|_, (a, b): (i64, i64)| Ok(a + b))
            .map_err(|e| SandboxError::init(e.to_string()))?;
        lua.globals()
            .set("add", add)
            .map_err(|e| SandboxError::init(e.to_string()))?;

        if let Some(suffix) = config.override_suffix.as_deref() {
            resolver::install(&lua, suffix).map_err(|e| SandboxError::init(e.to_string()))?;
        }

        Ok(Self {
            lua,
            paths: SearchPathSet::default(),
            override_suffix: config.override_suffix.clone(),
        })
    }

    /// Returns the configured override suffix, if any.
    #[must_use]
    pub fn override_suffix(&self) -> Option<&str> {
        self.override_suffix.as_deref()
    }

    /// The directories registered on this instance.
    #[must_use]
    pub fn search_paths(&self) -> &SearchPathSet {
        &self.paths
    }

    /// Appends `dir` to the interpreter's module search path.
    ///
    /// Each distinct directory is registered at most once per instance;
    /// re-registration is a no-op. A directory that does not exist is an
    /// error.
    pub fn add_path(&self, dir: &Path) -> Result<(), SandboxError> {
        if self.paths.contains(dir) {
            return Ok(());
        }
        if !dir.is_dir() {
            return Err(SandboxError::path_not_found(dir));
        }

        // Escape separators and quotes so the generated search-path
        // expression is not corrupted.
        let escaped = dir
            .to_string_lossy()
            .replace('\\', "\\\\")
            .replace('\'', "\\'");
        let statement = format!("package.path = package.path .. ';{}/?.lua'", escaped);
        self.lua
            .load(statement.as_str())
            .exec()
            .map_err(|e| SandboxError::script(e.to_string()))?;

        self.paths.insert(dir.to_path_buf());
        debug!(dir = %dir.display(), "registered module search path");
        Ok(())
    }

    /// Registers a host function as a global, exposing an embedding
    /// capability to scripts.
    pub fn register_function<F, A, R>(&self, name: &str, func: F) -> Result<(), SandboxError>
    where
        F: Fn(&Lua, A) -> mlua::Result<R> + 'static,
        A: FromLuaMulti,
        R: IntoLuaMulti,
    {
        let function = self
            .lua
            .create_function(func)
            .map_err(|e| SandboxError::init(e.to_string()))?;
        self.lua
            .globals()
            .set(name, function)
            .map_err(|e| SandboxError::init(e.to_string()))
    }

    /// Executes a script and converts its returned value.
    ///
    /// The returned value must resolve, after thunk chasing, to a sequence
    /// or mapping.
    pub fn execute(&self, source: &str, name: &str) -> Result<Value, SandboxError> {
        let value = self
            .lua
            .load(source)
            .set_name(name)
            .eval::<mlua::Value>()
            .map_err(from_lua_error)?;
        convert::script_value(value)
    }
}

/// Maps an interpreter error back to a sandbox error, surfacing typed
/// errors that crossed the interpreter boundary (such as relative-import
/// rejections raised inside the resolver) unchanged.
fn from_lua_error(err: mlua::Error) -> SandboxError {
    if let Some(recovered) = unwrap_sandbox_error(&err) {
        return recovered;
    }
    SandboxError::script(err.to_string())
}

fn unwrap_sandbox_error(err: &mlua::Error) -> Option<SandboxError> {
    match err {
        mlua::Error::CallbackError { cause, .. } => unwrap_sandbox_error(cause),
        mlua::Error::WithContext { cause, .. } => unwrap_sandbox_error(cause),
        mlua::Error::ExternalError(external) => {
            external.downcast_ref::<SandboxError>().cloned()
        }
        _ => None,
    }
}
