//! Plugin hooks
//!
//! The one externally pluggable seam of the engine: registered plugins are
//! invoked, in registration order, around schema compilation, around each
//! validation run, and whenever errors are fetched. The registry is
//! process-wide, appended to only through [`register`] (or
//! `Schema::extend`), read everywhere else, and resettable for test
//! isolation.

use std::sync::{Arc, RwLock};

use once_cell::sync::Lazy;
use serde_json::Value;

use crate::decl::SchemaDecl;
use crate::schema::Schema;

/// Lifecycle callbacks a plugin may implement. All methods default to
/// no-ops, so a plugin implements only the points it cares about.
pub trait Plugin: Send + Sync {
    /// Before a declaration is normalized and compiled; may rewrite it
    fn before_parse(&self, _decl: &mut SchemaDecl) {}

    /// After a declaration compiled successfully
    fn after_parse(&self, _schema: &Schema) {}

    /// Before each validation run; may rewrite the data in place
    fn before_validate(&self, _data: &mut Value) {}

    /// After each validation run, before the boolean result is derived;
    /// may rewrite the accumulated error list
    fn after_validate(&self, _data: &Value, _errors: &mut Vec<String>) {}

    /// Whenever validation errors are fetched; may rewrite the list
    fn on_get_errors(&self, _errors: &mut Vec<String>) {}
}

static REGISTRY: Lazy<RwLock<Vec<Arc<dyn Plugin>>>> = Lazy::new(|| RwLock::new(Vec::new()));

/// Register a single plugin
pub fn register(plugin: Arc<dyn Plugin>) {
    let mut plugins = REGISTRY.write().expect("plugin registry lock poisoned");
    plugins.push(plugin);
    tracing::debug!(registered = plugins.len(), "plugin registered");
}

/// Register a batch of plugins, preserving their order
pub fn register_all(batch: impl IntoIterator<Item = Arc<dyn Plugin>>) {
    let mut plugins = REGISTRY.write().expect("plugin registry lock poisoned");
    plugins.extend(batch);
}

/// Number of registered plugins
pub fn count() -> usize {
    REGISTRY.read().expect("plugin registry lock poisoned").len()
}

/// Clear the registry. Intended for test isolation.
pub fn reset() {
    REGISTRY.write().expect("plugin registry lock poisoned").clear();
}

/// Run a callback against every registered plugin, in registration order
pub(crate) fn each(mut f: impl FnMut(&dyn Plugin)) {
    let plugins = REGISTRY.read().expect("plugin registry lock poisoned");
    for plugin in plugins.iter() {
        f(plugin.as_ref());
    }
}
