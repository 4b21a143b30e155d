//! Platform mode resolution.
//!
//! The loader is built once per firmware/CPU combination, and later boot
//! stages pick architecture-specific assets by the suffix resolved here.
//! Resolution is a pure table lookup on a [`TargetDescriptor`], so every row
//! can be exercised from a single host build.
//!
//! ```text
//!   firmware   cpu          mode         suffix
//!   ─────────  ───────────  ───────────  ──────
//!   EFI        i386         I386Uefi     ia32
//!   EFI        arm64        Arm64Uefi    aa64
//!   EFI        mips64el     Mips64Uefi   mips
//!   EFI        (any other)  X64Uefi      uefi
//!   legacy     (any)        X86Legacy    legacy
//! ```
//!
//! EFI rows are checked top to bottom; the last one is the fallback.

use core::fmt;

// ═══════════════════════════════════════════════════════════════════════════
// TARGET DESCRIPTION
// ═══════════════════════════════════════════════════════════════════════════

/// CPU family the module was built for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CpuFamily {
    I386,
    Arm64,
    /// 64-bit MIPS, little-endian
    Mips64El,
    X86_64,
    Other,
}

impl CpuFamily {
    /// Parse a bootloader target CPU name (`"i386"`, `"arm64"`, `"mips64el"`, ...).
    pub fn from_name(name: &str) -> Self {
        match name {
            "i386" => CpuFamily::I386,
            "arm64" => CpuFamily::Arm64,
            "mips64el" => CpuFamily::Mips64El,
            "x86_64" => CpuFamily::X86_64,
            _ => CpuFamily::Other,
        }
    }

    /// Family of the compilation target.
    pub const fn host() -> Self {
        if cfg!(target_arch = "x86") {
            CpuFamily::I386
        } else if cfg!(target_arch = "aarch64") {
            CpuFamily::Arm64
        } else if cfg!(all(target_arch = "mips64", target_endian = "little")) {
            CpuFamily::Mips64El
        } else if cfg!(target_arch = "x86_64") {
            CpuFamily::X86_64
        } else {
            CpuFamily::Other
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            CpuFamily::I386 => "i386",
            CpuFamily::Arm64 => "arm64",
            CpuFamily::Mips64El => "mips64el",
            CpuFamily::X86_64 => "x86_64",
            CpuFamily::Other => "other",
        }
    }
}

/// Firmware service class.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FirmwareClass {
    /// UEFI service tables are available
    Efi,
    /// BIOS-style boot
    Legacy,
}

impl FirmwareClass {
    /// Classify a bootloader platform name (`"efi"`, `"pc"`, `"coreboot"`, ...).
    pub fn from_platform_name(name: &str) -> Self {
        if name.contains("efi") {
            FirmwareClass::Efi
        } else {
            FirmwareClass::Legacy
        }
    }

    /// Class of the compilation target.
    pub const fn host() -> Self {
        if cfg!(target_os = "uefi") {
            FirmwareClass::Efi
        } else {
            FirmwareClass::Legacy
        }
    }

    #[inline]
    pub const fn is_efi(self) -> bool {
        matches!(self, FirmwareClass::Efi)
    }
}

/// What the module is running on, supplied once at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TargetDescriptor {
    pub cpu: CpuFamily,
    pub firmware: FirmwareClass,
}

impl TargetDescriptor {
    pub const fn new(cpu: CpuFamily, firmware: FirmwareClass) -> Self {
        Self { cpu, firmware }
    }

    /// Build from the bootloader's target CPU and platform names.
    pub fn from_names(cpu: &str, platform: &str) -> Self {
        Self::new(
            CpuFamily::from_name(cpu),
            FirmwareClass::from_platform_name(platform),
        )
    }

    pub const fn host() -> Self {
        Self::new(CpuFamily::host(), FirmwareClass::host())
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// PLATFORM MODE
// ═══════════════════════════════════════════════════════════════════════════

/// Pack a four-letter tag big-endian.
const fn tag(name: &[u8; 4]) -> u32 {
    u32::from_be_bytes(*name)
}

/// The five platform variants the loader distinguishes.
///
/// Discriminants are the platform-data tags later stages read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum PlatformMode {
    I386Uefi = tag(b"IA32"),
    Arm64Uefi = tag(b"AA64"),
    Mips64Uefi = tag(b"MIPS"),
    /// x86_64 UEFI; also every unrecognised CPU under EFI
    X64Uefi = tag(b"UEFI"),
    X86Legacy = tag(b"LEGA"),
}

impl PlatformMode {
    pub const fn suffix(self) -> ArchSuffix {
        match self {
            PlatformMode::I386Uefi => ArchSuffix::IA32,
            PlatformMode::Arm64Uefi => ArchSuffix::AA64,
            PlatformMode::Mips64Uefi => ArchSuffix::MIPS,
            PlatformMode::X64Uefi => ArchSuffix::UEFI,
            PlatformMode::X86Legacy => ArchSuffix::LEGACY,
        }
    }

    #[inline]
    pub const fn is_efi(self) -> bool {
        !matches!(self, PlatformMode::X86Legacy)
    }

    /// 32-bit platform-data tag.
    #[inline]
    pub const fn plat_data(self) -> u32 {
        self as u32
    }
}

impl fmt::Display for PlatformMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PlatformMode::I386Uefi => "i386-uefi",
            PlatformMode::Arm64Uefi => "arm64-uefi",
            PlatformMode::Mips64Uefi => "mips64el-uefi",
            PlatformMode::X64Uefi => "x86_64-uefi",
            PlatformMode::X86Legacy => "x86-legacy",
        };
        f.write_str(name)
    }
}

/// Short token used to pick per-architecture asset names.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArchSuffix(&'static str);

impl ArchSuffix {
    pub const IA32: Self = Self("ia32");
    pub const AA64: Self = Self("aa64");
    pub const MIPS: Self = Self("mips");
    pub const UEFI: Self = Self("uefi");
    pub const LEGACY: Self = Self("legacy");

    #[inline]
    pub const fn as_str(&self) -> &'static str {
        self.0
    }
}

impl fmt::Display for ArchSuffix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}

/// Resolve the platform variant and its suffix. Never fails.
pub fn resolve_platform_mode(target: &TargetDescriptor) -> (PlatformMode, ArchSuffix) {
    let mode = match target.firmware {
        FirmwareClass::Legacy => PlatformMode::X86Legacy,
        FirmwareClass::Efi => match target.cpu {
            CpuFamily::I386 => PlatformMode::I386Uefi,
            CpuFamily::Arm64 => PlatformMode::Arm64Uefi,
            CpuFamily::Mips64El => PlatformMode::Mips64Uefi,
            CpuFamily::X86_64 | CpuFamily::Other => PlatformMode::X64Uefi,
        },
    };
    (mode, mode.suffix())
}

// ═══════════════════════════════════════════════════════════════════════════
// RESOLVED PLATFORM
// ═══════════════════════════════════════════════════════════════════════════

/// Immutable platform context, built once during module activation and
/// handed by reference to whoever needs it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Platform {
    mode: PlatformMode,
    suffix: ArchSuffix,
    debug: bool,
}

impl Platform {
    pub fn resolve(target: &TargetDescriptor, debug: bool) -> Self {
        let (mode, suffix) = resolve_platform_mode(target);
        vtoy_core::vtoy_dbg!(
            "platform {} (cpu {}, tag {:#010x}, suffix {})",
            mode,
            target.cpu.name(),
            mode.plat_data(),
            suffix
        );
        Self { mode, suffix, debug }
    }

    #[inline]
    pub const fn mode(&self) -> PlatformMode {
        self.mode
    }

    #[inline]
    pub const fn suffix(&self) -> ArchSuffix {
        self.suffix
    }

    #[inline]
    pub const fn is_efi(&self) -> bool {
        self.mode.is_efi()
    }

    #[inline]
    pub const fn is_debug(&self) -> bool {
        self.debug
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn efi(cpu: CpuFamily) -> TargetDescriptor {
        TargetDescriptor::new(cpu, FirmwareClass::Efi)
    }

    // ==================== Decision table ====================

    #[test]
    fn test_resolve_efi_rows() {
        assert_eq!(
            resolve_platform_mode(&efi(CpuFamily::I386)),
            (PlatformMode::I386Uefi, ArchSuffix::IA32)
        );
        assert_eq!(
            resolve_platform_mode(&efi(CpuFamily::Arm64)),
            (PlatformMode::Arm64Uefi, ArchSuffix::AA64)
        );
        assert_eq!(
            resolve_platform_mode(&efi(CpuFamily::Mips64El)),
            (PlatformMode::Mips64Uefi, ArchSuffix::MIPS)
        );
        assert_eq!(
            resolve_platform_mode(&efi(CpuFamily::X86_64)),
            (PlatformMode::X64Uefi, ArchSuffix::UEFI)
        );
    }

    #[test]
    fn test_resolve_efi_fallback() {
        let (mode, suffix) = resolve_platform_mode(&efi(CpuFamily::Other));
        assert_eq!(mode, PlatformMode::X64Uefi);
        assert_eq!(suffix.as_str(), "uefi");
    }

    #[test]
    fn test_resolve_legacy_ignores_cpu() {
        for cpu in [
            CpuFamily::I386,
            CpuFamily::Arm64,
            CpuFamily::Mips64El,
            CpuFamily::X86_64,
            CpuFamily::Other,
        ] {
            let target = TargetDescriptor::new(cpu, FirmwareClass::Legacy);
            assert_eq!(
                resolve_platform_mode(&target),
                (PlatformMode::X86Legacy, ArchSuffix::LEGACY)
            );
        }
    }

    #[test]
    fn test_suffix_matches_mode() {
        for mode in [
            PlatformMode::I386Uefi,
            PlatformMode::Arm64Uefi,
            PlatformMode::Mips64Uefi,
            PlatformMode::X64Uefi,
            PlatformMode::X86Legacy,
        ] {
            let target = match mode {
                PlatformMode::I386Uefi => efi(CpuFamily::I386),
                PlatformMode::Arm64Uefi => efi(CpuFamily::Arm64),
                PlatformMode::Mips64Uefi => efi(CpuFamily::Mips64El),
                PlatformMode::X64Uefi => efi(CpuFamily::X86_64),
                PlatformMode::X86Legacy => {
                    TargetDescriptor::new(CpuFamily::X86_64, FirmwareClass::Legacy)
                }
            };
            assert_eq!(resolve_platform_mode(&target).1, mode.suffix());
        }
    }

    // ==================== Names ====================

    #[test]
    fn test_from_names() {
        assert_eq!(
            TargetDescriptor::from_names("i386", "efi"),
            efi(CpuFamily::I386)
        );
        assert_eq!(
            TargetDescriptor::from_names("mips64el", "efi"),
            efi(CpuFamily::Mips64El)
        );
        assert_eq!(
            TargetDescriptor::from_names("i386", "pc"),
            TargetDescriptor::new(CpuFamily::I386, FirmwareClass::Legacy)
        );
        assert_eq!(CpuFamily::from_name("riscv64"), CpuFamily::Other);
        // Big-endian MIPS is not the little-endian build
        assert_eq!(CpuFamily::from_name("mips64"), CpuFamily::Other);
    }

    #[test]
    fn test_firmware_class_from_platform() {
        assert!(FirmwareClass::from_platform_name("efi").is_efi());
        assert!(FirmwareClass::from_platform_name("x86_64-efi").is_efi());
        assert!(!FirmwareClass::from_platform_name("pc").is_efi());
        assert!(!FirmwareClass::from_platform_name("coreboot").is_efi());
        assert!(!FirmwareClass::from_platform_name("").is_efi());
    }

    #[test]
    fn test_cpu_name_roundtrip() {
        for cpu in [
            CpuFamily::I386,
            CpuFamily::Arm64,
            CpuFamily::Mips64El,
            CpuFamily::X86_64,
        ] {
            assert_eq!(CpuFamily::from_name(cpu.name()), cpu);
        }
    }

    // ==================== Tags ====================

    #[test]
    fn test_plat_data_tags() {
        assert_eq!(PlatformMode::I386Uefi.plat_data(), 0x4941_3332);
        assert_eq!(PlatformMode::Arm64Uefi.plat_data(), 0x4141_3634);
        assert_eq!(PlatformMode::Mips64Uefi.plat_data(), 0x4D49_5053);
        assert_eq!(PlatformMode::X64Uefi.plat_data(), 0x5545_4649);
        assert_eq!(PlatformMode::X86Legacy.plat_data(), 0x4C45_4741);
    }

    #[test]
    fn test_is_efi() {
        assert!(PlatformMode::Arm64Uefi.is_efi());
        assert!(!PlatformMode::X86Legacy.is_efi());
    }

    // ==================== Platform ====================

    #[test]
    fn test_platform_resolve() {
        let platform = Platform::resolve(&efi(CpuFamily::Arm64), true);
        assert_eq!(platform.mode(), PlatformMode::Arm64Uefi);
        assert_eq!(platform.suffix().as_str(), "aa64");
        assert!(platform.is_efi());
        assert!(platform.is_debug());
    }

    #[test]
    fn test_host_descriptor_resolves() {
        // Whatever the host is, resolution lands on a consistent row
        let (mode, suffix) = resolve_platform_mode(&TargetDescriptor::host());
        assert_eq!(mode.suffix(), suffix);
        assert_eq!(mode.is_efi(), FirmwareClass::host().is_efi());
    }
}
