//! Identifier dumps for debugging partition and disk GUIDs.

use core::fmt::{self, Write};

use uguid::Guid;

/// Write `label` followed by the 16 raw bytes as `"xx "` and a newline.
///
/// Bytes come out in memory order, not in the registry text form. Does
/// nothing unless `debug` is set.
pub fn dump_id_bytes<W: Write + ?Sized>(
    out: &mut W,
    debug: bool,
    label: &str,
    bytes: &[u8; 16],
) -> fmt::Result {
    if !debug {
        return Ok(());
    }

    out.write_str(label)?;
    for b in bytes {
        write!(out, "{:02x} ", b)?;
    }
    out.write_char('\n')
}

/// [`dump_id_bytes`] for a GUID.
pub fn dump_guid<W: Write + ?Sized>(out: &mut W, debug: bool, label: &str, guid: &Guid) -> fmt::Result {
    dump_id_bytes(out, debug, label, &guid.to_bytes())
}
