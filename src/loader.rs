use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

use anyhow::Context;
use byteorder::{BigEndian, ByteOrder};

use crate::cpu::Machine;
use crate::error::EmuError;

/// Opens every path in order, concatenates their contents into one byte
/// stream, and loads it into a fresh `Machine` starting at word address 0
/// starting at word address 0. IP ends up one past the last word loaded. An
/// odd total byte count is a load error.
///
/// File I/O is wrapped in `anyhow::Context` so a missing or unreadable
/// image names itself in the diagnostic shown at the CLI boundary. The
/// result still collapses into `EmuError::Io` (exit code 1, usage/open
/// error) rather than `EmuError::Load` (exit code 2, reserved for a
/// malformed-but-readable image).
pub fn load_images(paths: &[impl AsRef<Path>], verbose: bool) -> Result<Machine, EmuError> {
    let mut bytes = Vec::new();
    for path in paths {
        let path = path.as_ref();
        (|| -> anyhow::Result<()> {
            let mut file = File::open(path).with_context(|| format!("opening {path:?}"))?;
            file.read_to_end(&mut bytes)
                .with_context(|| format!("reading {path:?}"))?;
            Ok(())
        })()
        .map_err(|e| EmuError::Io(io::Error::other(format!("{e:#}"))))?;
    }
    load_bytes(&bytes, verbose)
}

/// Loads an already-concatenated byte stream. Split out from
/// `load_images` so tests can exercise the wire-format rules directly
/// without touching the filesystem.
pub fn load_bytes(bytes: &[u8], verbose: bool) -> Result<Machine, EmuError> {
    if bytes.len() % 2 != 0 {
        return Err(EmuError::Load(format!(
            "odd byte count ({}): program image must be a sequence of 16-bit words",
            bytes.len()
        )));
    }

    let mut machine = Machine::new(verbose);
    let word_count = bytes.len() / 2;
    for (addr, chunk) in bytes.chunks_exact(2).enumerate() {
        machine.write_mem(addr as u16, BigEndian::read_u16(chunk));
    }
    machine.set_ip(word_count as u16);

    Ok(machine)
}
