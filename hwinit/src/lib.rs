//! Hardware Introspection Layer
//!
//! Figures out, once per boot, what the loader is running on and publishes
//! it for the boot menu.
//!
//! # Architecture
//!
//! ```text
//! Firmware hands us:
//!   - Memory map (walked once, only the total survives)
//!   - System table header (EFI only: revision word)
//!
//! We produce:
//!   - grub_total_ram      (whole MB)
//!   - grub_uefi_version   (major.minor[.minor2] or NA)
//!   - Platform            (mode + arch suffix, immutable)
//! ```
//!
//! # Usage
//!
//! ```ignore
//! use vtoy_hwinit::{publish_hwinfo, Platform, TargetDescriptor};
//!
//! let target = TargetDescriptor::from_names("x86_64", "efi");
//! let info = publish_hwinfo(&mut env, &memory_map, target.firmware, Some(revision));
//! let platform = Platform::resolve(&target, false);
//! assert_eq!(platform.suffix().as_str(), "uefi");
//! ```
//!
//! # What This Crate Does NOT Do
//!
//! - Own physical memory (chained allocation only delegates)
//! - Register commands (the loader crate hands that to the bootloader)
//! - Parse boot configuration

#![no_std]

pub mod chain_alloc;
pub mod firmware;
pub mod hwinfo;
pub mod memory;
pub mod platform;

// ═══════════════════════════════════════════════════════════════════════════
// PLATFORM RE-EXPORTS
// ═══════════════════════════════════════════════════════════════════════════

pub use platform::{
    resolve_platform_mode, ArchSuffix, CpuFamily, FirmwareClass, Platform, PlatformMode,
    TargetDescriptor,
};

// ═══════════════════════════════════════════════════════════════════════════
// MEMORY RE-EXPORTS
// ═══════════════════════════════════════════════════════════════════════════

pub use memory::{
    enumerate_memory, MemoryError, MemoryMap, MemoryRegion, RegionKind, TotalMemory,
    UefiMemoryMap, PAGE_SIZE, TOTAL_RAM_FACT,
};

// ═══════════════════════════════════════════════════════════════════════════
// FIRMWARE RE-EXPORTS
// ═══════════════════════════════════════════════════════════════════════════

pub use firmware::{
    read_firmware_version, EfiTableHeader, FirmwareRevision, FirmwareVersion,
    UEFI_VERSION_FACT, UEFI_VERSION_NA,
};

pub use hwinfo::{publish_hwinfo, HwInfo};

pub use chain_alloc::{alloc_chain, bytes_to_pages, AllocError, PageAllocator, PoolAllocator};
