//! Module activation and teardown.
//!
//! # Activation order
//!
//! ```text
//! activate()
//!   1. hwinfo       grub_total_ram, grub_uefi_version   (exported)
//!   2. env prepare  environment-framework setup         (bootloader)
//!   3. platform     mode + arch suffix, resolved once   (cached)
//!   4. commands     register_all                         (bootloader)
//! ```
//!
//! Facts are published before commands are registered, so nothing that a
//! command reads can be missing. Activating again republishes the facts with
//! fresh values, reuses the cached platform and does not register twice.
//!
//! Deactivation only unregisters commands. Nothing here holds long-lived
//! resources.

use core::fmt;

use spin::Once;
use vtoy_core::env::EnvStore;
use vtoy_hwinit::{publish_hwinfo, FirmwareRevision, HwInfo, MemoryMap, Platform};

use crate::config::ModuleConfig;

// ═══════════════════════════════════════════════════════════════════════════
// ERRORS
// ═══════════════════════════════════════════════════════════════════════════

/// Lifecycle errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModuleError {
    /// The bootloader refused one of our commands
    CommandRegistration,
    /// Deactivation without a successful activation
    NotActive,
}

impl fmt::Display for ModuleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModuleError::CommandRegistration => f.write_str("command registration failed"),
            ModuleError::NotActive => f.write_str("module is not active"),
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// COLLABORATORS
// ═══════════════════════════════════════════════════════════════════════════

/// The bootloader's command table.
pub trait CommandRegistry {
    /// Register every command the module provides.
    fn register_all(&mut self) -> Result<(), ModuleError>;

    fn unregister_all(&mut self);
}

/// Everything activation borrows from the bootloader.
pub struct Host<'a> {
    pub memory: &'a dyn MemoryMap,
    /// System table revision; `None` off EFI
    pub revision: Option<FirmwareRevision>,
    pub env: &'a mut dyn EnvStore,
    pub commands: &'a mut dyn CommandRegistry,
}

// ═══════════════════════════════════════════════════════════════════════════
// MODULE
// ═══════════════════════════════════════════════════════════════════════════

/// The platform module.
pub struct BootModule {
    config: ModuleConfig,
    platform: Once<Platform>,
    hwinfo: Option<HwInfo>,
    registered: bool,
}

impl BootModule {
    pub const fn new(config: ModuleConfig) -> Self {
        Self {
            config,
            platform: Once::new(),
            hwinfo: None,
            registered: false,
        }
    }

    /// Run the activation sequence.
    ///
    /// On a registration failure the facts stay published but the module is
    /// not active.
    pub fn activate(&mut self, host: &mut Host<'_>) -> Result<Platform, ModuleError> {
        let config = self.config;
        vtoy_core::logger::init(config.debug);
        log::info!(
            "activating: cpu {}, efi {}",
            config.target.cpu.name(),
            config.target.firmware.is_efi()
        );

        let info = publish_hwinfo(
            &mut *host.env,
            host.memory,
            config.target.firmware,
            host.revision,
        );
        self.hwinfo = Some(info);

        host.env.prepare();

        let platform = *self
            .platform
            .call_once(|| Platform::resolve(&config.target, config.debug));

        if !self.registered {
            host.commands.register_all().map_err(|err| {
                log::error!("activation failed: {}", err);
                err
            })?;
            self.registered = true;
        }

        log::info!("active: {} ({})", platform.mode(), platform.suffix());
        Ok(platform)
    }

    /// Unregister commands.
    pub fn deactivate(&mut self, commands: &mut dyn CommandRegistry) -> Result<(), ModuleError> {
        if !self.registered {
            return Err(ModuleError::NotActive);
        }
        commands.unregister_all();
        self.registered = false;
        vtoy_core::vtoy_dbg!("deactivated");
        Ok(())
    }

    /// Resolved platform, once any activation got that far.
    pub fn platform(&self) -> Option<&Platform> {
        self.platform.get()
    }

    /// Facts from the latest activation.
    pub fn hwinfo(&self) -> Option<&HwInfo> {
        self.hwinfo.as_ref()
    }

    #[inline]
    pub fn is_active(&self) -> bool {
        self.registered
    }

    #[inline]
    pub const fn config(&self) -> &ModuleConfig {
        &self.config
    }
}
