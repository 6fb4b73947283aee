//! Command registry
//!
//! Maps every command name and alias (lowercased) to its descriptor.
//! Registration is last-write-wins with no uniqueness enforcement across
//! names and aliases; a later registration may shadow an earlier command's
//! alias. Unregistering removes the primary name only - purging aliases is
//! the caller's responsibility.

use std::collections::HashMap;
use std::sync::Arc;

use dashmap::DashMap;
use parking_lot::RwLock;

use crate::descriptor::CommandDescriptor;

/// Registry of command descriptors with cached resolution
#[derive(Default)]
pub struct CommandRegistry {
    /// Primary names and aliases, keyed lowercase
    commands: RwLock<HashMap<String, Arc<CommandDescriptor>>>,
    /// Resolution cache: tokens that already hit, for constant-time repeats
    resolved: DashMap<String, Arc<CommandDescriptor>>,
}

impl CommandRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a descriptor under its name and every alias
    pub fn register(&self, descriptor: CommandDescriptor) {
        let descriptor = Arc::new(descriptor);
        let mut commands = self.commands.write();

        let key = descriptor.name().to_lowercase();
        self.resolved.remove(&key);
        commands.insert(key, Arc::clone(&descriptor));

        for alias in descriptor.aliases() {
            let key = alias.to_lowercase();
            self.resolved.remove(&key);
            commands.insert(key, Arc::clone(&descriptor));
        }

        tracing::debug!(command = descriptor.name(), "Registered command");
    }

    /// Remove the primary name entry
    ///
    /// Aliases pointing at the same descriptor keep resolving.
    pub fn unregister(&self, name: &str) -> bool {
        let key = name.to_lowercase();
        self.resolved.remove(&key);
        let removed = self.commands.write().remove(&key).is_some();
        if removed {
            tracing::debug!(command = name, "Unregistered command");
        }
        removed
    }

    /// Case-insensitive lookup, caching the first hit for each token
    pub fn resolve(&self, token: &str) -> Option<Arc<CommandDescriptor>> {
        let key = token.to_lowercase();
        if let Some(hit) = self.resolved.get(&key) {
            return Some(Arc::clone(hit.value()));
        }

        let descriptor = self.commands.read().get(&key).map(Arc::clone)?;
        self.resolved.insert(key, Arc::clone(&descriptor));
        Some(descriptor)
    }

    /// All registered descriptors, one per primary name, sorted by name
    pub fn descriptors(&self) -> Vec<Arc<CommandDescriptor>> {
        let commands = self.commands.read();
        let mut list: Vec<Arc<CommandDescriptor>> = commands
            .iter()
            .filter(|(key, descriptor)| key.as_str() == descriptor.name().to_lowercase())
            .map(|(_, descriptor)| Arc::clone(descriptor))
            .collect();
        list.sort_by(|a, b| a.name().cmp(b.name()));
        list
    }

    /// Number of commands registered under their primary name
    pub fn len(&self) -> usize {
        self.descriptors().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
