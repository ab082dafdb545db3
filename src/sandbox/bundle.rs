//! Built-in script modules embedded in the binary.
//!
//! Every sandbox loads the bundled modules at construction, before any user
//! script runs. Bundles are keyed by asset-style names (`lua/<name>.lua`) so
//! alternative bundles can be swapped in for tests.

/// Name prefix selecting script assets from a bundle.
pub const MODULE_PREFIX: &str = "lua/";

/// A source of built-in script modules.
pub trait ModuleBundle {
    /// Returns the asset names in listing order.
    fn names(&self) -> Vec<&'static str>;

    /// Returns the source text for the named asset, if present.
    fn content(&self, name: &str) -> Option<&'static str>;
}

/// Modules compiled into the binary from `assets/lua/`.
const EMBEDDED_MODULES: &[(&str, &str)] = &[
    ("lua/strutil.lua", include_str!("../../assets/lua/strutil.lua")),
    ("lua/tblutil.lua", include_str!("../../assets/lua/tblutil.lua")),
];

/// The default bundle, backed by `include_str!` assets.
#[derive(Debug, Default, Clone, Copy)]
pub struct EmbeddedBundle;

impl EmbeddedBundle {
    /// Creates the embedded bundle.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl ModuleBundle for EmbeddedBundle {
    fn names(&self) -> Vec<&'static str> {
        EMBEDDED_MODULES.iter().map(|(name, _)| *name).collect()
    }

    fn content(&self, name: &str) -> Option<&'static str> {
        EMBEDDED_MODULES
            .iter()
            .find(|(candidate, _)| *candidate == name)
            .map(|(_, content)| *content)
    }
}
