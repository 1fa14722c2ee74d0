// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2026 Sphragis Contributors

//! Digit-run parsing and zero-padded formatting for order numbers

/// Format `n` left-padded with zeros to at least `min_width` characters.
/// Larger numbers keep their natural width.
pub fn zero_padded(n: u32, min_width: usize) -> String {
    let s = n.to_string();
    if s.len() >= min_width {
        s
    } else {
        let mut padded = "0".repeat(min_width - s.len());
        padded.push_str(&s);
        padded
    }
}

/// Canonical three-digit order number string.
pub fn order_number(n: u32) -> String {
    zero_padded(n, 3)
}

/// Byte range of the first maximal ASCII digit run in `name`, if any.
pub fn first_digit_run(name: &str) -> Option<(usize, usize)> {
    let bytes = name.as_bytes();
    let start = bytes.iter().position(|b| b.is_ascii_digit())?;
    let len = bytes[start..]
        .iter()
        .take_while(|b| b.is_ascii_digit())
        .count();
    Some((start, start + len))
}

/// Numeric value of the first digit run in `name`. None when there is no
/// run or the run does not fit in a `u32`.
pub fn first_number(name: &str) -> Option<u32> {
    let (start, end) = first_digit_run(name)?;
    name[start..end].parse().ok()
}

/// Numeric value of the digit run at the very end of `text`, if any.
pub fn trailing_number(text: &str) -> Option<u32> {
    let run = trailing_digit_run(text)?;
    run.parse().ok()
}

/// `text` with a trailing digit run removed and whitespace trimmed.
pub fn strip_trailing_number(text: &str) -> &str {
    match trailing_digit_run(text) {
        Some(run) => text[..text.len() - run.len()].trim(),
        None => text.trim(),
    }
}

/// Zero-padding-aware comparison of a digit run against a number.
pub fn matches_number(run: &str, n: u32) -> bool {
    run.parse::<u32>().map(|v| v == n).unwrap_or(false)
}

fn trailing_digit_run(text: &str) -> Option<&str> {
    let bytes = text.as_bytes();
    let len = bytes
        .iter()
        .rev()
        .take_while(|b| b.is_ascii_digit())
        .count();
    if len == 0 {
        None
    } else {
        Some(&text[text.len() - len..])
    }
}
