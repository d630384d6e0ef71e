/// One raw token lifted off a source line: either a bare whitespace-
/// delimited word, or the literal bytes of a `"..."` string (quotes
/// stripped).
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RawToken {
    Word(String),
    Str(Vec<u8>),
}

/// Splits one source line into raw tokens, stripping a trailing `//`
/// comment (but only outside a string literal) and skipping whitespace.
/// Returns `Err` with a human-readable detail if a string is left
/// unterminated or contains an embedded `"`.
pub fn split_line(line: &str) -> Result<Vec<RawToken>, String> {
    let bytes = line.as_bytes();
    let mut tokens = Vec::new();
    let mut i = 0;
    while i < bytes.len() {
        let b = bytes[i];
        if b.is_ascii_whitespace() {
            i += 1;
            continue;
        }
        if b == b'/' && i + 1 < bytes.len() && bytes[i + 1] == b'/' {
            break;
        }
        if b == b'"' {
            let start = i + 1;
            let mut j = start;
            while j < bytes.len() && bytes[j] != b'"' {
                j += 1;
            }
            if j >= bytes.len() {
                return Err("unterminated string literal".to_string());
            }
            tokens.push(RawToken::Str(bytes[start..j].to_vec()));
            i = j + 1;
            continue;
        }
        let start = i;
        while i < bytes.len() && !bytes[i].is_ascii_whitespace() {
            if bytes[i] == b'"' {
                return Err("embedded '\"' in a bare token".to_string());
            }
            i += 1;
        }
        let word = std::str::from_utf8(&bytes[start..i])
            .map_err(|_| "non-UTF-8 token".to_string())?
            .to_string();
        tokens.push(RawToken::Word(word));
    }
    Ok(tokens)
}

/// Parses an unsigned integer literal with base autodetection: leading
/// `0x`/`0X` is hexadecimal, a leading `0` (with more digits following) is
/// octal, otherwise decimal.
pub fn parse_uint(text: &str) -> Option<u32> {
    if let Some(hex) = text.strip_prefix("0x").or_else(|| text.strip_prefix("0X")) {
        return u32::from_str_radix(hex, 16).ok();
    }
    if text.len() > 1 && text.starts_with('0') {
        return u32::from_str_radix(&text[1..], 8).ok();
    }
    text.parse::<u32>().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_words_and_strips_comments() {
        let t = split_line("add 0x10 0x11 // comment").unwrap();
        assert_eq!(
            t,
            vec![
                RawToken::Word("add".into()),
                RawToken::Word("0x10".into()),
                RawToken::Word("0x11".into()),
            ]
        );
    }

    #[test]
    fn keeps_a_string_token_intact() {
        let t = split_line(r#"put 0x65 "Hi\n""#).unwrap();
        assert_eq!(
            t,
            vec![
                RawToken::Word("put".into()),
                RawToken::Word("0x65".into()),
                RawToken::Str(b"Hi\\n".to_vec()),
            ]
        );
    }

    #[test]
    fn rejects_unterminated_string() {
        assert!(split_line(r#"put 0x65 "Hi"#).is_err());
    }

    #[test]
    fn parses_every_base() {
        assert_eq!(parse_uint("0x1A"), Some(26));
        assert_eq!(parse_uint("017"), Some(15));
        assert_eq!(parse_uint("17"), Some(17));
        assert_eq!(parse_uint("0"), Some(0));
    }
}
