//! Hardware facts for the boot menu.
//!
//! Runs once per activation and leaves two exported facts behind:
//!
//! | fact                | value                                    |
//! |---------------------|------------------------------------------|
//! | `grub_total_ram`    | total memory, whole MB                   |
//! | `grub_uefi_version` | `major.minor[.minor2]`, or `NA` off EFI  |

use vtoy_core::env::{export_fact, EnvStore};

use crate::firmware::{
    read_firmware_version, FirmwareRevision, VersionText, UEFI_VERSION_FACT, UEFI_VERSION_NA,
};
use crate::memory::{enumerate_memory, MemoryMap};
use crate::platform::FirmwareClass;

/// What `publish_hwinfo` found.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HwInfo {
    pub total_mb: u64,
    /// `None` under legacy firmware
    pub firmware_version: Option<VersionText>,
}

/// Enumerate memory and read the firmware version, exporting both.
///
/// The version is read only under EFI-class firmware that supplied a revision;
/// every other case publishes the `NA` sentinel.
pub fn publish_hwinfo<M, S>(
    env: &mut S,
    map: &M,
    firmware: FirmwareClass,
    revision: Option<FirmwareRevision>,
) -> HwInfo
where
    M: MemoryMap + ?Sized,
    S: EnvStore + ?Sized,
{
    let total_mb = enumerate_memory(map, env);

    let firmware_version = match (firmware, revision) {
        (FirmwareClass::Efi, Some(revision)) => Some(read_firmware_version(revision)),
        _ => None,
    };
    let version = firmware_version
        .as_ref()
        .map_or(UEFI_VERSION_NA, |text| text.as_str());
    export_fact(env, UEFI_VERSION_FACT, version);

    log::info!("hwinfo: {} MB RAM, UEFI {}", total_mb, version);

    HwInfo {
        total_mb,
        firmware_version,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::{MemoryRegion, RegionKind, MIB, TOTAL_RAM_FACT};
    use vtoy_core::env::EnvTable;

    fn regions() -> [MemoryRegion; 2] {
        [
            MemoryRegion::new(0, 640 * 1024, RegionKind::Available),
            MemoryRegion::new(MIB, 511 * MIB + 640 * 1024, RegionKind::Available),
        ]
    }

    #[test]
    fn test_hwinfo_efi() {
        let mut env = EnvTable::<4>::new();
        let info = publish_hwinfo(
            &mut env,
            &regions()[..],
            FirmwareClass::Efi,
            Some(FirmwareRevision(0x0002_001F)),
        );
        assert_eq!(info.total_mb, 512);
        assert_eq!(env.get(TOTAL_RAM_FACT), Some("512"));
        assert_eq!(env.get(UEFI_VERSION_FACT), Some("2.3.1"));
        assert!(env.is_exported(UEFI_VERSION_FACT));
        assert_eq!(info.firmware_version.unwrap(), "2.3.1");
    }

    #[test]
    fn test_hwinfo_legacy_publishes_na() {
        let mut env = EnvTable::<4>::new();
        // A stray revision is not read off EFI
        let info = publish_hwinfo(
            &mut env,
            &regions()[..],
            FirmwareClass::Legacy,
            Some(FirmwareRevision(0x0002_0000)),
        );
        assert_eq!(info.firmware_version, None);
        assert_eq!(env.get(UEFI_VERSION_FACT), Some("NA"));
    }

    #[test]
    fn test_hwinfo_efi_without_revision() {
        let mut env = EnvTable::<4>::new();
        publish_hwinfo(&mut env, &regions()[..], FirmwareClass::Efi, None);
        assert_eq!(env.get(UEFI_VERSION_FACT), Some("NA"));
    }

    #[test]
    fn test_hwinfo_empty_map() {
        let mut env = EnvTable::<4>::new();
        let empty: [MemoryRegion; 0] = [];
        let info = publish_hwinfo(&mut env, &empty[..], FirmwareClass::Legacy, None);
        assert_eq!(info.total_mb, 0);
        assert_eq!(env.get(TOTAL_RAM_FACT), Some("0"));
    }

    #[test]
    fn test_hwinfo_total_matches_enumeration() {
        let mut env = EnvTable::<4>::new();
        let info = publish_hwinfo(&mut env, &regions()[..], FirmwareClass::Legacy, None);

        let mut direct = EnvTable::<4>::new();
        assert_eq!(enumerate_memory(&regions()[..], &mut direct), info.total_mb);
        assert_eq!(direct.get(TOTAL_RAM_FACT), env.get(TOTAL_RAM_FACT));
        assert!(env.is_exported(TOTAL_RAM_FACT));
    }
}
