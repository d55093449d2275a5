//! Backslash-escape decoding for string and character literal text.
//!
//! The lexer deliberately leaves quoted text undecoded (spec.md §4.1): for
//! a primary expression starting with `"`, successive string tokens are
//! concatenated first and only then escape-decoded (spec.md §4.3). This
//! module is the shared decoder both the string and the char literal path
//! call once concatenation (if any) is complete.

/// Decodes backslash escapes in `raw` (the literal's text with its
/// surrounding quotes already stripped by the lexer) into the literal's
/// byte value.
///
/// Unrecognized escapes pass the escaped character through unchanged,
/// matching the permissive behavior of a one-pass bootstrap compiler that
/// does not reject source it can still make sense of.
pub fn decode_escapes(raw: &str) -> Vec<u8> {
    let bytes = raw.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'\\' && i + 1 < bytes.len() {
            let escaped = bytes[i + 1];
            out.push(match escaped {
                b'n' => b'\n',
                b't' => b'\t',
                b'r' => b'\r',
                b'0' => 0,
                b'a' => 0x07,
                b'b' => 0x08,
                b'f' => 0x0C,
                b'v' => 0x0B,
                b'\\' => b'\\',
                b'\'' => b'\'',
                b'"' => b'"',
                other => other,
            });
            i += 2;
        } else {
            out.push(bytes[i]);
            i += 1;
        }
    }
    out
}

/// Decodes a `'c'`-style character literal to its integer value, as
/// `primary_expr` needs when loading an immediate for a char constant.
pub fn decode_char_literal(raw: &str) -> i64 {
    let decoded = decode_escapes(raw);
    decoded.first().copied().unwrap_or(0) as i64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_common_escapes() {
        assert_eq!(decode_escapes(r"a\nb"), b"a\nb".to_vec());
        assert_eq!(decode_escapes(r"\t\\\""), b"\t\\\"".to_vec());
    }

    #[test]
    fn unrecognized_escape_passes_through() {
        assert_eq!(decode_escapes(r"\q"), b"q".to_vec());
    }

    #[test]
    fn decodes_null_char_literal() {
        assert_eq!(decode_char_literal(r"\0"), 0);
    }

    #[test]
    fn decodes_plain_char_literal() {
        assert_eq!(decode_char_literal("x"), b'x' as i64);
    }
}
