// ABOUTME: Identifier derivation: maps a wallet address to a stable 64-char hex key.
// ABOUTME: A rolling 31x string hash padded to fixed width; not a cryptographic hash.

/// Width of every derived identifier, in hex characters.
pub const IDENTIFIER_LEN: usize = 64;

/// Derive the 64-character lowercase hex correlation key for an input string.
///
/// The accumulator is the classic `acc * 31 + unit` string hash over UTF-16
/// code units, wrapped to a signed 32-bit integer. Its absolute value in hex
/// seeds the output, which is then padded one digit at a time with the
/// leading hex digit of `|acc + current_len|`.
///
/// This is only a deterministic, fixed-width key for the backend. Distinct
/// addresses can collide and the output must never be treated as a digest.
pub fn derive_identifier(input: &str) -> String {
    let acc = rolling_hash(input);
    let mut out = seed_hex(acc);

    while out.len() < IDENTIFIER_LEN {
        let step = (i64::from(acc) + out.len() as i64).abs();
        let digits = format!("{:x}", step);
        if let Some(first) = digits.chars().next() {
            out.push(first);
        }
    }

    out.truncate(IDENTIFIER_LEN);
    out
}

/// Rolling `((acc << 5) - acc) + unit` hash, wrapped to 32 bits at every step.
pub fn rolling_hash(input: &str) -> i32 {
    input.encode_utf16().fold(0i32, |acc, unit| {
        acc.wrapping_shl(5)
            .wrapping_sub(acc)
            .wrapping_add(i32::from(unit))
    })
}

// Widened so that i32::MIN renders as 80000000 instead of overflowing.
fn seed_hex(acc: i32) -> String {
    format!("{:x}", i64::from(acc).abs())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn is_lower_hex(s: &str) -> bool {
        s.chars().all(|c| matches!(c, '0'..='9' | 'a'..='f'))
    }

    #[test]
    fn rolling_hash_matches_known_values() {
        assert_eq!(rolling_hash(""), 0);
        assert_eq!(rolling_hash("a"), 97);
        assert_eq!(rolling_hash("ab"), 3105);
        assert_eq!(rolling_hash("hello"), 99_162_322);
    }

    #[test]
    fn rolling_hash_wraps_to_i32() {
        assert_eq!(rolling_hash("polygenelubricants"), i32::MIN);
    }

    #[test]
    fn seed_hex_handles_min_value() {
        assert_eq!(seed_hex(i32::MIN), "80000000");
        assert_eq!(seed_hex(-255), "ff");
    }

    #[test]
    fn single_char_expansion() {
        let expected = format!(
            "61{}{}{}{}a",
            "6".repeat(13),
            "7".repeat(16),
            "8".repeat(16),
            "9".repeat(16)
        );
        assert_eq!(derive_identifier("a"), expected);
    }

    #[test]
    fn empty_input_has_defined_output() {
        let expected = format!(
            "0123456789abcdef{}{}{}",
            "1".repeat(16),
            "2".repeat(16),
            "3".repeat(16)
        );
        let id = derive_identifier("");
        assert_eq!(id, expected);
        assert_eq!(id.len(), IDENTIFIER_LEN);
    }

    #[test]
    fn min_value_accumulator_seeds_with_80000000() {
        let id = derive_identifier("polygenelubricants");
        assert!(id.starts_with("80000000"), "got {}", id);
        assert_eq!(id.len(), IDENTIFIER_LEN);
        assert!(is_lower_hex(&id));
    }

    #[test]
    fn non_ascii_input_uses_utf16_units() {
        // U+1F642 is a surrogate pair, so it contributes two code units.
        let expected = 0xD83Di32.wrapping_mul(31).wrapping_add(0xDE42);
        assert_eq!(rolling_hash("🙂"), expected);
        let id = derive_identifier("🙂");
        assert_eq!(id.len(), IDENTIFIER_LEN);
        assert!(is_lower_hex(&id));
    }
}
