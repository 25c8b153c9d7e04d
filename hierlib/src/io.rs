use std::fs::File;
use std::ops::Deref;

/// The raw bytes of a trace file, memory mapped where the platform allows it
pub enum TraceBytes {
    #[cfg(unix)]
    Mapped(memmap2::Mmap),
    Buffered(Vec<u8>),
}

impl Deref for TraceBytes {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        match self {
            #[cfg(unix)]
            TraceBytes::Mapped(map) => map,
            TraceBytes::Buffered(buf) => buf,
        }
    }
}

/// Opens a trace file's contents for parsing
///
/// On unix the file is memory mapped and the OS is advised that reads will be
/// sequential, which measurably helps for large traces. Elsewhere the file is
/// read into memory through a buffered reader.
pub fn read_trace_bytes(file: File) -> Result<TraceBytes, String> {
    // Compatibility on other systems
    #[cfg(not(unix))]
    {
        use std::io::{BufReader, Read};
        let mut buf = Vec::new();
        BufReader::new(file)
            .read_to_end(&mut buf)
            .map_err(|e| format!("Couldn't read the trace file: {e}"))?;
        Ok(TraceBytes::Buffered(buf))
    }
    // Memory map the file for speed on unix systems
    #[cfg(unix)]
    {
        use memmap2::{Advice, Mmap};
        unsafe {
            let m = Mmap::map(&file).map_err(|e| format!("Couldn't memory map the file: {e}"))?;
            m.advise(Advice::Sequential)
                .map_err(|e| format!("Failed to provide access advice to the OS, {e}"))?;
            Ok(TraceBytes::Mapped(m))
        }
    }
}
