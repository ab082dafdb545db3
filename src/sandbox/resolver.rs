//! Two-tier module resolution with override merging.
//!
//! When an override suffix is configured, the sandbox replaces `require`
//! with a host-side resolver instead of hot-patching the resolution function
//! from inside the interpreter. The resolver:
//!
//! 1. rejects relative module references outright (`./...`),
//! 2. resolves the plain module name through the original `require`
//!    (failure propagates),
//! 3. additionally attempts `<name>-<suffix>`; when that fails, the plain
//!    resolution is returned unchanged,
//! 4. deep-merges the pair when both are mapping-shaped tables, caching the
//!    merged table under the override module's own name.
//!
//! Keeping the merge policy on the host side makes it testable in isolation
//! from module loading.

use crate::sandbox::error::SandboxError;
use mlua::{Function, Lua, Table, Value as LuaValue};

/// Replaces the sandbox's `require` with the two-tier resolver.
pub(crate) fn install(lua: &Lua, suffix: &str) -> mlua::Result<()> {
    let original: Function = lua.globals().get("require")?;
    let suffix = suffix.to_string();

    let resolver = lua.create_function(move |lua, name: String| {
        if name.starts_with("./") {
            return Err(mlua::Error::external(SandboxError::relative_import(name)));
        }

        // The base module is required; its failure propagates.
        let base: LuaValue = original.call(name.clone())?;

        // The override module is optional; fall back to the base resolution.
        let override_name = format!("{}-{}", name, suffix);
        let overlay: LuaValue = match original.call(override_name.clone()) {
            Ok(value) => value,
            Err(_) => return Ok(base),
        };

        match (&base, &overlay) {
            (LuaValue::Table(base_table), LuaValue::Table(overlay_table))
                if is_mapping_shaped(base_table) && is_mapping_shaped(overlay_table) =>
            {
                merge_tables(base_table, overlay_table)?;
                let loaded: Table = lua
                    .globals()
                    .get::<Table>("package")?
                    .get::<Table>("loaded")?;
                loaded.set(override_name, base_table.clone())?;
                Ok(base)
            }
            _ => Ok(overlay),
        }
    })?;

    lua.globals().set("require", resolver)
}

/// Deep-merges `overlay` into `base`.
///
/// Keys where both sides hold a mapping-shaped table merge recursively;
/// every other override value wins outright, replacing scalars and
/// sequence-shaped tables alike.
pub(crate) fn merge_tables(base: &Table, overlay: &Table) -> mlua::Result<()> {
    for pair in overlay.clone().pairs::<LuaValue, LuaValue>() {
        let (key, overlay_value) = pair?;
        let base_value: LuaValue = base.raw_get(key.clone())?;
        match (&base_value, &overlay_value) {
            (LuaValue::Table(base_nested), LuaValue::Table(overlay_nested))
                if is_mapping_shaped(base_nested) && is_mapping_shaped(overlay_nested) =>
            {
                merge_tables(base_nested, overlay_nested)?;
            }
            _ => base.raw_set(key, overlay_value)?,
        }
    }
    Ok(())
}

/// A table with a zero contiguous-integer border is mapping-shaped.
fn is_mapping_shaped(table: &Table) -> bool {
    table.raw_len() == 0
}
