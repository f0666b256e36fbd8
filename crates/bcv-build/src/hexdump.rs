//! Hex rendering of compiled binaries.

use std::fmt::Write as _;

/// Bytes per output line, matching the viewer's binary pane width.
const BYTES_PER_LINE: usize = 15;

/// Render a byte buffer as space-separated `0xHH` groups, 15 per line.
///
/// Every byte becomes `0x` + two uppercase hex digits + a trailing space;
/// each 15-byte group ends with a newline, including the final partial
/// group. An empty buffer renders as the empty string.
pub fn format_hex(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len() * 5 + bytes.len() / BYTES_PER_LINE + 1);
    for chunk in bytes.chunks(BYTES_PER_LINE) {
        for byte in chunk {
            let _ = write!(out, "0x{byte:02X} ");
        }
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_hex(text: &str) -> Vec<u8> {
        text.split_whitespace()
            .map(|group| {
                let digits = group.strip_prefix("0x").expect("group starts with 0x");
                u8::from_str_radix(digits, 16).expect("two hex digits")
            })
            .collect()
    }

    #[test]
    fn empty_buffer_renders_empty() {
        assert_eq!(format_hex(&[]), "");
    }

    #[test]
    fn bytes_render_zero_padded_uppercase() {
        assert_eq!(format_hex(&[0x00, 0x0A, 0xFF]), "0x00 0x0A 0xFF \n");
    }

    #[test]
    fn newline_after_every_fifteen_bytes() {
        let bytes: Vec<u8> = (0u8..=44).collect();
        let out = format_hex(&bytes);
        assert_eq!(out.lines().count(), 3);
        assert!(out.ends_with('\n'));
    }

    #[test]
    fn final_partial_group_ends_with_newline() {
        let bytes = [0xCA; 16];
        let out = format_hex(&bytes);
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].split_whitespace().count(), 15);
        assert_eq!(lines[1].split_whitespace().count(), 1);
    }

    #[test]
    fn line_count_is_ceil_of_len_over_fifteen() {
        for len in [1usize, 14, 15, 16, 30, 31, 100] {
            let bytes: Vec<u8> = (0..len).map(|i| (i * 7 + 3) as u8).collect();
            let out = format_hex(&bytes);
            assert_eq!(out.lines().count(), len.div_ceil(15), "len = {len}");
        }
    }

    #[test]
    fn formatted_text_parses_back_to_the_original_bytes() {
        let bytes: Vec<u8> = (0..100).map(|i| (i * 31 + 7) as u8).collect();
        assert_eq!(parse_hex(&format_hex(&bytes)), bytes);
    }
}
