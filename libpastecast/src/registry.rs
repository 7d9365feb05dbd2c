//! Platform registry
//!
//! Name to adapter lookup shared by the single-platform and bulk paths. The
//! registry is assembled once at startup and read-only afterwards; callers
//! share it through an `Arc` without locking.
//!
//! Lookups are case-insensitive and alias-aware: every name in a
//! descriptor's [`names`](crate::types::PlatformDescriptor::names) maps to the
//! same adapter. Iteration order is registration order, which is also the
//! order of a bulk publish with no explicit selection.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use reqwest::Client;
use tracing::debug;

use crate::config::{Config, PlatformConfig};
use crate::error::{ConfigError, RegistryError, Result};
use crate::platforms::{
    catbox::CatboxPlatform, dpaste::DpastePlatform, hastebin::HastebinPlatform, http,
    paste_rs::PasteRsPlatform, rentry::RentryPlatform, telegraph::TelegraphPlatform,
    zero_x0::ZeroX0Platform, Platform,
};
use crate::types::PlatformDescriptor;

#[derive(Clone, Default)]
pub struct PlatformRegistry {
    platforms: Vec<Arc<dyn Platform>>,
    /// Lowercase name or alias -> position in `platforms`
    index: HashMap<String, usize>,
}

impl PlatformRegistry {
    /// An empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with every built-in platform, adjusted by `config`
    ///
    /// Disabled platforms are left out. `[platforms.<name>]` sections may be
    /// keyed by canonical key or alias; a section naming no built-in platform
    /// is a configuration error.
    pub fn with_builtins(config: &Config) -> Result<Self> {
        let descriptors = builtin_descriptors();

        for name in config.platforms.keys() {
            let known = descriptors
                .iter()
                .any(|d| d.names().any(|n| n.eq_ignore_ascii_case(name)));
            if !known {
                return Err(ConfigError::InvalidValue {
                    field: format!("platforms.{}", name),
                    reason: "unknown platform".to_string(),
                }
                .into());
            }
        }

        let client = http::build_client(&config.publish.user_agent, config.publish.timeout()?)?;
        let mut registry = Self::new();

        for descriptor in &descriptors {
            let overrides = platform_config(config, descriptor);
            if overrides.is_some_and(|c| !c.enabled) {
                debug!("Platform {} disabled by configuration", descriptor.key);
                continue;
            }

            let base_url = overrides.and_then(|c| c.base_url.as_deref());
            if let Some(platform) = build_builtin(&descriptor.key, client.clone(), base_url) {
                registry.register(platform)?;
            }
        }

        debug!("Registered {} platforms: {:?}", registry.len(), registry.keys());
        Ok(registry)
    }

    /// Add a platform under its key and aliases
    ///
    /// Fails without modifying the registry when any of its names is already
    /// taken.
    pub fn register(
        &mut self,
        platform: Arc<dyn Platform>,
    ) -> std::result::Result<(), RegistryError> {
        let mut names: Vec<String> = platform
            .descriptor()
            .names()
            .map(|n| n.trim().to_lowercase())
            .collect();
        let mut seen = HashSet::new();
        names.retain(|n| seen.insert(n.clone()));

        for name in &names {
            if let Some(&owner) = self.index.get(name) {
                return Err(RegistryError::DuplicateName {
                    name: name.clone(),
                    owner: self.platforms[owner].name().to_string(),
                });
            }
        }

        let position = self.platforms.len();
        for name in names {
            self.index.insert(name, position);
        }
        self.platforms.push(platform);
        Ok(())
    }

    /// Look up a platform by key or alias, ignoring case
    pub fn resolve(&self, name: &str) -> Option<Arc<dyn Platform>> {
        self.index
            .get(&name.trim().to_lowercase())
            .map(|&i| Arc::clone(&self.platforms[i]))
    }

    /// Descriptors in registration order
    pub fn list(&self) -> Vec<PlatformDescriptor> {
        self.platforms.iter().map(|p| p.descriptor().clone()).collect()
    }

    /// Canonical keys in registration order
    pub fn keys(&self) -> Vec<String> {
        self.platforms.iter().map(|p| p.name().to_string()).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<dyn Platform>> {
        self.platforms.iter()
    }

    pub fn len(&self) -> usize {
        self.platforms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.platforms.is_empty()
    }
}

/// Descriptors of the built-in platforms, in registration order
pub fn builtin_descriptors() -> Vec<PlatformDescriptor> {
    vec![
        TelegraphPlatform::describe(),
        DpastePlatform::describe(),
        RentryPlatform::describe(),
        PasteRsPlatform::describe(),
        ZeroX0Platform::describe(),
        HastebinPlatform::describe(),
        CatboxPlatform::describe(),
    ]
}

fn build_builtin(key: &str, client: Client, base_url: Option<&str>) -> Option<Arc<dyn Platform>> {
    let platform: Arc<dyn Platform> = match key {
        "telegraph" => Arc::new(TelegraphPlatform::new(client, base_url)),
        "dpaste" => Arc::new(DpastePlatform::new(client, base_url)),
        "rentry" => Arc::new(RentryPlatform::new(client, base_url)),
        "paste-rs" => Arc::new(PasteRsPlatform::new(client, base_url)),
        "0x0" => Arc::new(ZeroX0Platform::new(client, base_url)),
        "hastebin" => Arc::new(HastebinPlatform::new(client, base_url)),
        "catbox" => Arc::new(CatboxPlatform::new(client, base_url)),
        _ => return None,
    };
    Some(platform)
}

/// Config section for `descriptor`, whichever of its names it is keyed by
fn platform_config<'a>(
    config: &'a Config,
    descriptor: &PlatformDescriptor,
) -> Option<&'a PlatformConfig> {
    descriptor.names().find_map(|name| config.platform(name))
}
