//! Content line folding for iCalendar (RFC 5545 §3.1).

/// Maximum line length in octets (not including CRLF).
const MAX_LINE_OCTETS: usize = 75;

/// Folds a content line to comply with the 75-octet limit.
///
/// Lines are folded by inserting CRLF followed by a single space.
/// Care is taken not to split UTF-8 multi-byte sequences.
#[must_use]
pub fn fold_line(line: &str) -> String {
    let bytes = line.as_bytes();

    if bytes.len() <= MAX_LINE_OCTETS {
        return format!("{line}\r\n");
    }

    let mut result = String::with_capacity(bytes.len() + (bytes.len() / MAX_LINE_OCTETS) * 3);
    let mut pos = 0;
    let mut first_line = true;

    while pos < bytes.len() {
        // Continuation lines have one less octet available (the leading space)
        let max_len = if first_line {
            MAX_LINE_OCTETS
        } else {
            MAX_LINE_OCTETS - 1
        };

        let remaining = bytes.len() - pos;
        if remaining <= max_len {
            // Last segment
            if !first_line {
                result.push(' ');
            }
            result.push_str(&String::from_utf8_lossy(&bytes[pos..]));
            result.push_str("\r\n");
            break;
        }

        // Find a safe break point (not in the middle of a UTF-8 sequence)
        let mut end = pos + max_len;
        while end > pos && !is_char_boundary(bytes, end) {
            end -= 1;
        }

        if end == pos {
            // Pathological: a single character longer than the limit
            end = pos + 1;
            while end < bytes.len() && !is_char_boundary(bytes, end) {
                end += 1;
            }
        }

        if !first_line {
            result.push(' ');
        }
        result.push_str(&String::from_utf8_lossy(&bytes[pos..end]));
        result.push_str("\r\n");

        pos = end;
        first_line = false;
    }

    result
}

/// Checks if the given position is a valid UTF-8 character boundary.
fn is_char_boundary(bytes: &[u8], pos: usize) -> bool {
    if pos >= bytes.len() {
        return true;
    }
    // UTF-8 continuation bytes start with 10xxxxxx
    (bytes[pos] & 0b1100_0000) != 0b1000_0000
}
