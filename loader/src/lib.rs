//! vtoy Loader Module
//!
//! Entry and exit points of the platform module. Activation publishes the
//! hardware facts, resolves the platform once, and hands command registration
//! to the bootloader; deactivation takes the commands back out.
//!
//! # Usage
//!
//! ```ignore
//! use vtoy_loader::{BootModule, Host, ModuleConfig};
//! use vtoy_hwinit::{TargetDescriptor, UefiMemoryMap, FirmwareRevision};
//!
//! let config = ModuleConfig::new(TargetDescriptor::from_names("x86_64", "efi"), debug);
//! let mut module = BootModule::new(config);
//!
//! let map = unsafe { UefiMemoryMap::from_raw(map_ptr, map_size, desc_size)? };
//! let mut host = Host {
//!     memory: &map,
//!     revision: Some(unsafe { FirmwareRevision::from_table_header(system_table) }),
//!     env: &mut grub_env,
//!     commands: &mut grub_commands,
//! };
//! let platform = module.activate(&mut host)?;
//! // grub_total_ram / grub_uefi_version are set, platform.suffix() == "uefi"
//!
//! module.deactivate(&mut grub_commands)?;
//! ```

#![no_std]

pub mod config;
pub mod lifecycle;

pub use config::ModuleConfig;
pub use lifecycle::{BootModule, CommandRegistry, Host, ModuleError};
