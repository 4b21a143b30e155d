//! UEFI firmware version.
//!
//! The system table header packs the specification revision as
//! `major << 16 | minor`, where the low half is a two-digit decimal value:
//! 2.3.1 is stored as `0x0002_001F` (31), 2.8 as `0x0002_0050` (80). The tens
//! digit is the minor version, the units digit an optional third segment that
//! only appears when non-zero.
//!
//! Off EFI there is no header to read; callers publish [`UEFI_VERSION_NA`]
//! instead of calling in here.

use core::fmt;

use vtoy_core::fmt::FmtBuf;

/// Fact carrying the firmware version.
pub const UEFI_VERSION_FACT: &str = "grub_uefi_version";

/// Published in place of a version under legacy firmware.
pub const UEFI_VERSION_NA: &str = "NA";

/// Formatted version text; `"65535.6553.5"` is the longest possible.
pub type VersionText = FmtBuf<16>;

/// EFI_TABLE_HEADER, the first 24 bytes of every UEFI service table.
#[derive(Debug, Clone, Copy)]
#[repr(C)]
pub struct EfiTableHeader {
    pub signature: u64,
    pub revision: u32,
    pub header_size: u32,
    pub crc32: u32,
    pub reserved: u32,
}

/// Raw revision word from the system table header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FirmwareRevision(pub u32);

impl FirmwareRevision {
    /// # Safety
    /// `header` must point to a readable EFI_TABLE_HEADER (normally the
    /// system table's).
    pub unsafe fn from_table_header(header: *const EfiTableHeader) -> Self {
        Self(core::ptr::addr_of!((*header).revision).read_unaligned())
    }

    #[inline]
    pub const fn major(self) -> u16 {
        (self.0 >> 16) as u16
    }

    #[inline]
    pub const fn minor_raw(self) -> u16 {
        (self.0 & 0xFFFF) as u16
    }
}

/// Decoded `major.minor[.minor2]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FirmwareVersion {
    major: u16,
    minor: u16,
    minor2: u16,
}

impl FirmwareVersion {
    pub const fn from_revision(revision: FirmwareRevision) -> Self {
        let raw = revision.minor_raw();
        Self {
            major: revision.major(),
            minor: raw / 10,
            minor2: raw % 10,
        }
    }

    #[inline]
    pub const fn major(&self) -> u16 {
        self.major
    }

    #[inline]
    pub const fn minor(&self) -> u16 {
        self.minor
    }

    /// Third segment, absent when zero.
    pub const fn minor2(&self) -> Option<u16> {
        if self.minor2 == 0 {
            None
        } else {
            Some(self.minor2)
        }
    }

    pub fn text(&self) -> VersionText {
        VersionText::from_fmt(format_args!("{}", self))
    }
}

impl fmt::Display for FirmwareVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)?;
        if let Some(minor2) = self.minor2() {
            write!(f, ".{}", minor2)?;
        }
        Ok(())
    }
}

/// Format the firmware revision for publishing. EFI-class firmware only.
pub fn read_firmware_version(revision: FirmwareRevision) -> VersionText {
    FirmwareVersion::from_revision(revision).text()
}
