//! Physical memory enumeration.
//!
//! Firmware reports memory as a list of regions; we walk them once and keep
//! only the running byte total. Region kinds are carried through for other
//! consumers but do not affect the total: reserved and firmware-owned ranges
//! count the same as free RAM.
//!
//! ```text
//!   MemoryMap::for_each_region ──► visit(region) ──► TotalMemory::add
//!                                                          │
//!                     grub_total_ram = bytes / 1 MiB  ◄────┘
//! ```
//!
//! Two map sources are provided: a plain slice of [`MemoryRegion`] and
//! [`UefiMemoryMap`], which walks the raw `GetMemoryMap` buffer.

use core::fmt;
use core::ops::ControlFlow;

use vtoy_core::env::{export_fact, EnvStore, FactValue};

// ═══════════════════════════════════════════════════════════════════════════
// CONSTANTS
// ═══════════════════════════════════════════════════════════════════════════

/// Page size (4KB, same as UEFI)
pub const PAGE_SIZE: u64 = 4096;

pub const MIB: u64 = 1024 * 1024;

/// Fact carrying total memory in whole megabytes.
pub const TOTAL_RAM_FACT: &str = "grub_total_ram";

/// Smallest valid EFI_MEMORY_DESCRIPTOR (v1) stride.
pub const MIN_DESCRIPTOR_SIZE: usize = 40;

// ═══════════════════════════════════════════════════════════════════════════
// REGION TYPES
// ═══════════════════════════════════════════════════════════════════════════

/// Region classification as the bootloader's memory map reports it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegionKind {
    Available,
    Reserved,
    /// ACPI tables, reclaimable after parse
    Acpi,
    /// ACPI NVS, preserved across sleep
    Nvs,
    BadRam,
    /// Persistent memory (NVDIMM)
    Persistent,
    /// Unrecognised raw type
    Other(u32),
}

impl RegionKind {
    /// Classify a raw EFI_MEMORY_TYPE.
    pub fn from_uefi_raw(value: u32) -> Self {
        match value {
            // Loader code/data, boot services code/data, conventional
            1 | 2 | 3 | 4 | 7 => RegionKind::Available,
            // Reserved, runtime services code/data, MMIO, MMIO port space, PAL code
            0 | 5 | 6 | 11 | 12 | 13 => RegionKind::Reserved,
            8 => RegionKind::BadRam,
            9 => RegionKind::Acpi,
            10 => RegionKind::Nvs,
            14 => RegionKind::Persistent,
            other => RegionKind::Other(other),
        }
    }

    #[inline]
    pub const fn is_available(self) -> bool {
        matches!(self, RegionKind::Available)
    }
}

/// One extent reported during enumeration. Not retained.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MemoryRegion {
    pub base: u64,
    pub size: u64,
    pub kind: RegionKind,
}

impl MemoryRegion {
    pub const fn new(base: u64, size: u64, kind: RegionKind) -> Self {
        Self { base, size, kind }
    }

    /// End address (exclusive), saturating at the top of the address space.
    pub const fn end(&self) -> u64 {
        self.base.saturating_add(self.size)
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// MAP SOURCES
// ═══════════════════════════════════════════════════════════════════════════

/// Firmware memory-map traversal.
///
/// `visit` sees every region in firmware order; returning `Break` stops the walk.
pub trait MemoryMap {
    fn for_each_region(&self, visit: &mut dyn FnMut(MemoryRegion) -> ControlFlow<()>);
}

impl MemoryMap for [MemoryRegion] {
    fn for_each_region(&self, visit: &mut dyn FnMut(MemoryRegion) -> ControlFlow<()>) {
        for region in self {
            if visit(*region).is_break() {
                break;
            }
        }
    }
}

impl<const N: usize> MemoryMap for [MemoryRegion; N] {
    fn for_each_region(&self, visit: &mut dyn FnMut(MemoryRegion) -> ControlFlow<()>) {
        self[..].for_each_region(visit)
    }
}

impl<M: MemoryMap + ?Sized> MemoryMap for &M {
    fn for_each_region(&self, visit: &mut dyn FnMut(MemoryRegion) -> ControlFlow<()>) {
        (**self).for_each_region(visit)
    }
}

/// Memory map errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemoryError {
    /// Descriptor stride smaller than EFI_MEMORY_DESCRIPTOR
    InvalidDescriptorSize,
}

impl fmt::Display for MemoryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MemoryError::InvalidDescriptorSize => f.write_str("invalid memory descriptor size"),
        }
    }
}

/// View over a raw UEFI `GetMemoryMap` buffer.
///
/// EFI_MEMORY_DESCRIPTOR layout (v1), repeated every `descriptor_size` bytes:
///
/// ```text
///   offset 0:  u32 Type
///   offset 4:  u32 Padding
///   offset 8:  u64 PhysicalStart
///   offset 16: u64 VirtualStart
///   offset 24: u64 NumberOfPages
///   offset 32: u64 Attribute
/// ```
///
/// A trailing partial descriptor is ignored.
#[derive(Debug, Clone, Copy)]
pub struct UefiMemoryMap<'a> {
    buf: &'a [u8],
    descriptor_size: usize,
}

impl<'a> UefiMemoryMap<'a> {
    pub fn new(buf: &'a [u8], descriptor_size: usize) -> Result<Self, MemoryError> {
        if descriptor_size < MIN_DESCRIPTOR_SIZE {
            return Err(MemoryError::InvalidDescriptorSize);
        }
        Ok(Self {
            buf,
            descriptor_size,
        })
    }

    /// # Safety
    /// `map_ptr` must point to `map_size` readable bytes that stay valid and
    /// unmodified for `'a` (boot services still active).
    pub unsafe fn from_raw(
        map_ptr: *const u8,
        map_size: usize,
        descriptor_size: usize,
    ) -> Result<Self, MemoryError> {
        Self::new(core::slice::from_raw_parts(map_ptr, map_size), descriptor_size)
    }

    pub fn len(&self) -> usize {
        self.buf.len() / self.descriptor_size
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn region_at(&self, index: usize) -> MemoryRegion {
        let entry = &self.buf[index * self.descriptor_size..][..self.descriptor_size];
        let raw_type = read_u32(entry, 0);
        let phys_start = read_u64(entry, 8);
        let num_pages = read_u64(entry, 24);
        MemoryRegion::new(
            phys_start,
            num_pages.saturating_mul(PAGE_SIZE),
            RegionKind::from_uefi_raw(raw_type),
        )
    }
}

impl MemoryMap for UefiMemoryMap<'_> {
    fn for_each_region(&self, visit: &mut dyn FnMut(MemoryRegion) -> ControlFlow<()>) {
        for i in 0..self.len() {
            if visit(self.region_at(i)).is_break() {
                break;
            }
        }
    }
}

fn read_u32(buf: &[u8], off: usize) -> u32 {
    let mut b = [0u8; 4];
    b.copy_from_slice(&buf[off..off + 4]);
    u32::from_ne_bytes(b)
}

fn read_u64(buf: &[u8], off: usize) -> u64 {
    let mut b = [0u8; 8];
    b.copy_from_slice(&buf[off..off + 8]);
    u64::from_ne_bytes(b)
}

// ═══════════════════════════════════════════════════════════════════════════
// ACCUMULATION
// ═══════════════════════════════════════════════════════════════════════════

/// Running total over one enumeration pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TotalMemory {
    bytes: u64,
    regions: usize,
}

impl TotalMemory {
    pub const fn new() -> Self {
        Self {
            bytes: 0,
            regions: 0,
        }
    }

    /// Count a region, whatever its kind.
    #[inline]
    pub fn add(&mut self, region: &MemoryRegion) {
        self.bytes = self.bytes.saturating_add(region.size);
        self.regions += 1;
    }

    /// Sum every region `map` reports. Always walks the whole map.
    pub fn scan<M: MemoryMap + ?Sized>(map: &M) -> Self {
        let mut total = Self::new();
        map.for_each_region(&mut |region| {
            total.add(&region);
            ControlFlow::Continue(())
        });
        total
    }

    #[inline]
    pub const fn bytes(&self) -> u64 {
        self.bytes
    }

    /// Whole megabytes, truncated.
    #[inline]
    pub const fn megabytes(&self) -> u64 {
        self.bytes / MIB
    }

    #[inline]
    pub const fn regions(&self) -> usize {
        self.regions
    }
}

/// Export `grub_total_ram` from a finished total.
pub fn publish_total_ram<S: EnvStore + ?Sized>(env: &mut S, total: &TotalMemory) {
    let value = FactValue::from_fmt(format_args!("{}", total.megabytes()));
    export_fact(env, TOTAL_RAM_FACT, value.as_str());
}

/// Walk `map`, publish `grub_total_ram`, and return the megabyte count.
///
/// Each call starts from zero, so repeating it republishes rather than
/// accumulates.
pub fn enumerate_memory<M, S>(map: &M, env: &mut S) -> u64
where
    M: MemoryMap + ?Sized,
    S: EnvStore + ?Sized,
{
    let total = TotalMemory::scan(map);
    vtoy_core::vtoy_dbg!(
        "memory: {} regions, {} bytes ({} MB)",
        total.regions(),
        total.bytes(),
        total.megabytes()
    );
    publish_total_ram(env, &total);
    total.megabytes()
}

#[cfg(test)]
mod tests {
    use super::*;
    use vtoy_core::env::EnvTable;

    const DESC_SIZE: usize = 48;

    fn descriptor(buf: &mut [u8], raw_type: u32, start: u64, pages: u64) {
        buf[0..4].copy_from_slice(&raw_type.to_ne_bytes());
        buf[8..16].copy_from_slice(&start.to_ne_bytes());
        buf[16..24].copy_from_slice(&0u64.to_ne_bytes());
        buf[24..32].copy_from_slice(&pages.to_ne_bytes());
        buf[32..40].copy_from_slice(&0xFu64.to_ne_bytes());
    }

    // ==================== Accumulation ====================

    #[test]
    fn test_total_ignores_kind() {
        let regions = [
            MemoryRegion::new(0, 1_048_576, RegionKind::Available),
            MemoryRegion::new(2_097_152, 2_097_152, RegionKind::Reserved),
        ];
        let total = TotalMemory::scan(&regions[..]);
        assert_eq!(total.bytes(), 3 * MIB);
        assert_eq!(total.megabytes(), 3);
        assert_eq!(total.regions(), 2);
    }

    #[test]
    fn test_total_truncates_to_megabytes() {
        let regions = [MemoryRegion::new(0, 2 * MIB - 1, RegionKind::Available)];
        assert_eq!(TotalMemory::scan(&regions[..]).megabytes(), 1);
    }

    #[test]
    fn test_total_saturates() {
        let regions = [
            MemoryRegion::new(0, u64::MAX, RegionKind::Available),
            MemoryRegion::new(0, 1, RegionKind::Available),
        ];
        assert_eq!(TotalMemory::scan(&regions[..]).bytes(), u64::MAX);
    }

    #[test]
    fn test_scan_counts_every_region() {
        // scan never breaks, so all regions count
        let regions = [MemoryRegion::new(0, MIB, RegionKind::Nvs); 5];
        assert_eq!(TotalMemory::scan(&regions[..]).regions(), 5);
    }

    #[test]
    fn test_slice_map_honours_break() {
        let regions = [MemoryRegion::new(0, MIB, RegionKind::Available); 4];
        let mut seen = 0;
        regions[..].for_each_region(&mut |_| {
            seen += 1;
            if seen == 2 {
                ControlFlow::Break(())
            } else {
                ControlFlow::Continue(())
            }
        });
        assert_eq!(seen, 2);
    }

    // ==================== Publishing ====================

    #[test]
    fn test_enumerate_publishes() {
        let regions = [
            MemoryRegion::new(0, 1_048_576, RegionKind::Other(20)),
            MemoryRegion::new(2_097_152, 2_097_152, RegionKind::BadRam),
        ];
        let mut env = EnvTable::<4>::new();
        assert_eq!(enumerate_memory(&regions[..], &mut env), 3);
        assert_eq!(env.get(TOTAL_RAM_FACT), Some("3"));
        assert!(env.is_exported(TOTAL_RAM_FACT));
    }

    #[test]
    fn test_enumerate_zero_regions() {
        let regions: [MemoryRegion; 0] = [];
        let mut env = EnvTable::<4>::new();
        assert_eq!(enumerate_memory(&regions[..], &mut env), 0);
        assert_eq!(env.get(TOTAL_RAM_FACT), Some("0"));
    }

    #[test]
    fn test_enumerate_twice_does_not_accumulate() {
        let regions = [MemoryRegion::new(0, 8 * MIB, RegionKind::Available)];
        let mut env = EnvTable::<4>::new();
        enumerate_memory(&regions[..], &mut env);
        enumerate_memory(&regions[..], &mut env);
        assert_eq!(env.get(TOTAL_RAM_FACT), Some("8"));
        assert_eq!(env.len(), 1);
    }

    // ==================== UEFI map ====================

    #[test]
    fn test_uefi_map_walk() {
        let mut buf = [0u8; DESC_SIZE * 3];
        descriptor(&mut buf[0..DESC_SIZE], 7, 0x10_0000, 256);
        descriptor(&mut buf[DESC_SIZE..2 * DESC_SIZE], 0, 0xFEC0_0000, 1);
        descriptor(&mut buf[2 * DESC_SIZE..], 10, 0x7F00_0000, 16);

        let map = UefiMemoryMap::new(&buf, DESC_SIZE).unwrap();
        assert_eq!(map.len(), 3);

        let mut kinds = [RegionKind::Other(0xFF); 3];
        let mut i = 0;
        map.for_each_region(&mut |region| {
            kinds[i] = region.kind;
            i += 1;
            ControlFlow::Continue(())
        });
        assert_eq!(
            kinds,
            [RegionKind::Available, RegionKind::Reserved, RegionKind::Nvs]
        );

        let total = TotalMemory::scan(&map);
        assert_eq!(total.bytes(), (256 + 1 + 16) * PAGE_SIZE);
        assert_eq!(total.megabytes(), 1);
    }

    #[test]
    fn test_uefi_map_region_fields() {
        let mut buf = [0u8; DESC_SIZE];
        descriptor(&mut buf, 9, 0x7FF0_0000, 4);
        let map = UefiMemoryMap::new(&buf, DESC_SIZE).unwrap();
        let mut got = None;
        map.for_each_region(&mut |region| {
            got = Some(region);
            ControlFlow::Continue(())
        });
        assert_eq!(
            got,
            Some(MemoryRegion::new(0x7FF0_0000, 4 * PAGE_SIZE, RegionKind::Acpi))
        );
    }

    #[test]
    fn test_uefi_map_ignores_partial_tail() {
        let mut buf = [0u8; DESC_SIZE + 20];
        descriptor(&mut buf[..DESC_SIZE], 7, 0, 1);
        let map = UefiMemoryMap::new(&buf, DESC_SIZE).unwrap();
        assert_eq!(map.len(), 1);
    }

    #[test]
    fn test_uefi_map_rejects_small_stride() {
        let buf = [0u8; 64];
        assert_eq!(
            UefiMemoryMap::new(&buf, 32).unwrap_err(),
            MemoryError::InvalidDescriptorSize
        );
    }

    #[test]
    fn test_region_kind_from_uefi() {
        assert_eq!(RegionKind::from_uefi_raw(7), RegionKind::Available);
        assert_eq!(RegionKind::from_uefi_raw(3), RegionKind::Available);
        assert_eq!(RegionKind::from_uefi_raw(5), RegionKind::Reserved);
        assert_eq!(RegionKind::from_uefi_raw(8), RegionKind::BadRam);
        assert_eq!(RegionKind::from_uefi_raw(14), RegionKind::Persistent);
        assert_eq!(RegionKind::from_uefi_raw(0x7000_0000), RegionKind::Other(0x7000_0000));
        assert!(!RegionKind::Acpi.is_available());
    }
}
