//! Hex dumps of binary data for diagnostics and log output.
//!
//! Byte rows look like this:
//!
//! ```text
//! 0x0000: |48 6f 74 54:20 74 72 61|6e 73 6d 69:74 74 65 72| HotT transmitter
//! ```
//!
//! `|` separates the two halves of a row, `:` the quarters. Bytes outside
//! `0x20..=0x7e` show up as `.` in the text column.

use std::fmt::Write;

const BYTES_PER_ROW: usize = 16;
const WORDS_PER_ROW: usize = 8;

fn printable(byte: u8) -> char {
    if (0x20..=0x7e).contains(&byte) {
        byte as char
    } else {
        '.'
    }
}

/// Formats `data` as a hex dump with 16 bytes per row.
///
/// Addresses start at `base_address` and wrap around at `usize::MAX`. An
/// empty slice yields an empty string.
pub fn dump_bytes(data: &[u8], base_address: usize) -> String {
    let mut out = String::new();

    for (row, chunk) in data.chunks(BYTES_PER_ROW).enumerate() {
        let _ = write!(out, "0x{:04x}: ", base_address.wrapping_add(row * BYTES_PER_ROW));

        for i in 0..BYTES_PER_ROW {
            match chunk.get(i) {
                Some(byte) => {
                    out.push(match i {
                        4 | 12 => ':',
                        0 | 8 => '|',
                        _ => ' ',
                    });
                    let _ = write!(out, "{byte:02x}");
                }
                None => out.push_str("   "),
            }
        }

        out.push_str("| ");
        out.extend(chunk.iter().copied().map(printable));
        out.push('\n');
    }

    out
}

/// Formats `data` as a hex dump with 8 sixteen-bit words per row.
///
/// Addresses count bytes, so each row advances by 16. The text column shows
/// the high byte of each word before the low byte.
pub fn dump_words(data: &[u16], base_address: usize) -> String {
    let mut out = String::new();

    for (row, chunk) in data.chunks(WORDS_PER_ROW).enumerate() {
        let _ = write!(out, "0x{:04x}: ", base_address.wrapping_add(row * WORDS_PER_ROW * 2));

        for i in 0..WORDS_PER_ROW {
            match chunk.get(i) {
                Some(word) => {
                    out.push(match i {
                        2 | 6 => ':',
                        0 | 4 => '|',
                        _ => ' ',
                    });
                    let _ = write!(out, "{word:04x}");
                }
                None => out.push_str("     "),
            }
        }

        out.push_str("| ");
        for word in chunk {
            let [high, low] = word.to_be_bytes();
            out.push(printable(high));
            out.push(printable(low));
        }
        out.push('\n');
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_input_yields_empty_dump() {
        assert_eq!(dump_bytes(&[], 0), "");
        assert_eq!(dump_words(&[], 0), "");
    }

    #[test]
    fn test_seventeen_bytes_make_two_rows() {
        let mut data: Vec<u8> = (0u8..16).collect();
        data.push(b'A');

        let dump = dump_bytes(&data, 0);
        let lines: Vec<&str> = dump.lines().collect();

        assert_eq!(lines.len(), 2);
        assert_eq!(
            lines[0],
            "0x0000: |00 01 02 03:04 05 06 07|08 09 0a 0b:0c 0d 0e 0f| ................"
        );
        assert_eq!(lines[1], format!("0x0010: |41{}| A", " ".repeat(45)));
        assert!(dump.ends_with('\n'));
    }

    #[test]
    fn test_printable_text_passes_through() {
        let dump = dump_bytes(b"HotT transmitter", 0);
        assert_eq!(
            dump,
            "0x0000: |48 6f 74 54:20 74 72 61|6e 73 6d 69:74 74 65 72| HotT transmitter\n"
        );
    }

    #[test]
    fn test_boundary_bytes_are_masked() {
        let dump = dump_bytes(&[0x1f, 0x20, 0x7e, 0x7f, 0xff], 0);
        assert!(dump.ends_with("| . ~..\n"), "unexpected dump: {dump:?}");
        assert!(dump.contains("|1f 20 7e 7f:ff"));
    }

    #[test]
    fn test_base_address_offsets_rows() {
        let data = [0u8; 20];
        let dump = dump_bytes(&data, 0x1000);
        let lines: Vec<&str> = dump.lines().collect();

        assert!(lines[0].starts_with("0x1000: "));
        assert!(lines[1].starts_with("0x1010: "));
    }

    #[test]
    fn test_addresses_wrap_at_the_top_of_the_range() {
        let dump = dump_bytes(&[0u8; 17], usize::MAX);
        let lines: Vec<&str> = dump.lines().collect();

        assert!(lines[0].starts_with(&format!("0x{:04x}: ", usize::MAX)));
        assert!(lines[1].starts_with("0x000f: "));

        let dump = dump_words(&[0u16; 9], usize::MAX - 1);
        let lines: Vec<&str> = dump.lines().collect();
        assert!(lines[1].starts_with("0x000e: "));
    }

    #[test]
    fn test_words_row_layout() {
        let data = [0x4869u16, 0x0001, 0x2020, 0x7e7f, 0xffff, 0x4142, 0x4344, 0x4546, 0x4748];
        let dump = dump_words(&data, 0x20);
        let lines: Vec<&str> = dump.lines().collect();

        assert_eq!(lines.len(), 2);
        assert_eq!(
            lines[0],
            "0x0020: |4869 0001:2020 7e7f|ffff 4142:4344 4546| Hi..  ~...ABCDEF"
        );
        assert_eq!(lines[1], format!("0x0030: |4748{}| GH", " ".repeat(35)));
    }
}
