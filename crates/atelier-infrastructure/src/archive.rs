//! Project export as a gzipped tar archive.

use atelier_core::services::{ArchiveEntry, ArchiveWriter};
use atelier_core::{AtelierError, Result};
use flate2::Compression;
use flate2::write::GzEncoder;
use tar::Header;

pub struct TarGzArchiveWriter;

impl ArchiveWriter for TarGzArchiveWriter {
    fn write_archive(&self, entries: &[ArchiveEntry]) -> Result<Vec<u8>> {
        let encoder = GzEncoder::new(Vec::new(), Compression::default());
        let mut builder = tar::Builder::new(encoder);

        for entry in entries {
            let data = entry.content.as_bytes();
            let mut header = Header::new_gnu();
            header.set_size(data.len() as u64);
            header.set_mode(0o644);
            // Fixed mtime keeps archives byte-identical across exports
            // of the same project state.
            header.set_mtime(0);
            header.set_cksum();
            builder
                .append_data(&mut header, &entry.name, data)
                .map_err(|e| AtelierError::io(format!("archive entry {}: {e}", entry.name)))?;
        }

        let encoder = builder
            .into_inner()
            .map_err(|e| AtelierError::io(format!("finalize archive: {e}")))?;
        encoder
            .finish()
            .map_err(|e| AtelierError::io(format!("compress archive: {e}")))
    }
}
