use std::fmt;

/// Whether a trace entry reads or writes memory
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessKind {
    Read,
    Write,
}

impl fmt::Display for AccessKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AccessKind::Read => write!(f, "read"),
            AccessKind::Write => write!(f, "write"),
        }
    }
}

/// One memory operation from the input trace
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TraceEntry {
    pub kind: AccessKind,
    pub address: u32,
}

/// Parses a textual trace: one `<r|w> <hex-address>` instruction per line
///
/// Blank lines are skipped silently. Malformed lines (unknown operation, bad
/// or oversized address) are skipped with a warning on stderr, so the core
/// never observes them. A `0x` prefix on the address is tolerated.
///
/// # Arguments
///
/// * `bytes`: The raw trace file contents
///
/// returns: Vec<TraceEntry>
pub fn parse_trace(bytes: &[u8]) -> Vec<TraceEntry> {
    let mut entries = Vec::new();
    for line in bytes.split(|&b| b == b'\n') {
        let line = trim_ascii(line);
        if line.is_empty() {
            continue;
        }
        match parse_line(line) {
            Some(entry) => entries.push(entry),
            None => {
                let shown = String::from_utf8_lossy(line);
                eprintln!("Warning: skipping malformed trace line: {shown}");
            }
        }
    }
    entries
}

fn parse_line(line: &[u8]) -> Option<TraceEntry> {
    let kind = match line[0] {
        b'r' => AccessKind::Read,
        b'w' => AccessKind::Write,
        _ => return None,
    };
    let rest = trim_ascii(&line[1..]);
    if rest.len() == line.len() - 1 {
        // No separator between the operation and the address
        return None;
    }
    let address = parse_address(rest)?;
    Some(TraceEntry { kind, address })
}

fn trim_ascii(mut bytes: &[u8]) -> &[u8] {
    while let Some((first, rest)) = bytes.split_first() {
        if first.is_ascii_whitespace() {
            bytes = rest;
        } else {
            break;
        }
    }
    while let Some((last, rest)) = bytes.split_last() {
        if last.is_ascii_whitespace() {
            bytes = rest;
        } else {
            break;
        }
    }
    bytes
}

const INVALID_NIBBLE: u8 = 0xff;

// Table lookups beat branching on the digit ranges once the loop is unrolled,
// and parsing is the hot path for large traces
const HEX_NIBBLE: [u8; 256] = build_nibble_table();

const fn build_nibble_table() -> [u8; 256] {
    let mut table = [INVALID_NIBBLE; 256];
    let mut i = 0usize;
    while i < 256 {
        let b = i as u8;
        table[i] = match b {
            b'0'..=b'9' => b - b'0',
            b'a'..=b'f' => b - b'a' + 10,
            b'A'..=b'F' => b - b'A' + 10,
            _ => INVALID_NIBBLE,
        };
        i += 1;
    }
    table
}

/// Parses a 32-bit value from hexadecimal digits, with an optional `0x`
/// prefix. Returns None for empty input, a non-hex digit, or more than 8
/// digits.
pub fn parse_address(digits: &[u8]) -> Option<u32> {
    let digits = match digits {
        [b'0', b'x' | b'X', rest @ ..] => rest,
        _ => digits,
    };
    if digits.is_empty() || digits.len() > 8 {
        return None;
    }
    let mut res: u32 = 0;
    for &digit in digits {
        let nibble = HEX_NIBBLE[digit as usize];
        if nibble == INVALID_NIBBLE {
            return None;
        }
        res = (res << 4) | nibble as u32;
    }
    // The table is cross-checked against the standard library in debug builds
    #[cfg(debug_assertions)]
    {
        let as_str = std::str::from_utf8(digits).expect("hex digits are ascii");
        debug_assert_eq!(u32::from_str_radix(as_str, 16).ok(), Some(res));
    }
    Some(res)
}

#[cfg(test)]
mod tests {
    use super::{parse_address, parse_trace, AccessKind};

    #[test]
    fn parses_reads_and_writes() {
        let entries = parse_trace(b"r 1fe\nw 0\nr DEADBEEF\n");
        assert_eq!(entries.len(), 3);
        assert_eq!(entries[0].kind, AccessKind::Read);
        assert_eq!(entries[0].address, 0x1fe);
        assert_eq!(entries[1].kind, AccessKind::Write);
        assert_eq!(entries[1].address, 0);
        assert_eq!(entries[2].address, 0xdead_beef);
    }

    #[test]
    fn tolerates_prefix_blank_lines_and_crlf() {
        let entries = parse_trace(b"\nr 0x10\r\n\n  w 20  \n");
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].address, 0x10);
        assert_eq!(entries[1].kind, AccessKind::Write);
        assert_eq!(entries[1].address, 0x20);
    }

    #[test]
    fn skips_malformed_lines() {
        let entries = parse_trace(b"x 10\nr zz\nr\nr 123456789\nw 8\n");
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].kind, AccessKind::Write);
        assert_eq!(entries[0].address, 8);
    }

    #[test]
    fn address_parsing_bounds() {
        assert_eq!(parse_address(b"ffffffff"), Some(u32::MAX));
        assert_eq!(parse_address(b"0xff"), Some(0xff));
        assert_eq!(parse_address(b""), None);
        assert_eq!(parse_address(b"1g"), None);
        assert_eq!(parse_address(b"100000000"), None);
    }
}
