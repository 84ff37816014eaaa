use getrandom::getrandom;

const BASE36_ALPHABET: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";
const TOKEN_SUFFIX_WIDTH: usize = 4;
const TOKEN_SUFFIX_SPACE: u32 = 36 * 36 * 36 * 36;

fn base36_encode_u64(mut value: u64) -> String {
    if value == 0 {
        return "0".to_string();
    }
    let mut chars = Vec::new();
    while value > 0 {
        chars.push(BASE36_ALPHABET[(value % 36) as usize] as char);
        value /= 36;
    }
    chars.iter().rev().collect()
}

fn base36_encode_fixed_u32(mut value: u32, width: usize) -> String {
    let mut chars = vec!['0'; width];
    for idx in (0..width).rev() {
        chars[idx] = BASE36_ALPHABET[(value % 36) as usize] as char;
        value /= 36;
    }
    chars.into_iter().collect()
}

pub fn unique_token(now_nanos: i128) -> Result<String, String> {
    let timestamp = u64::try_from(now_nanos)
        .map_err(|_| "token generation requires a non-negative timestamp".to_string())?;
    let mut bytes = [0_u8; 4];
    getrandom(&mut bytes).map_err(|err| format!("failed to generate token randomness: {err}"))?;
    let sample = u32::from_le_bytes(bytes) % TOKEN_SUFFIX_SPACE;
    Ok(format!(
        "{}-{}",
        base36_encode_u64(timestamp),
        base36_encode_fixed_u32(sample, TOKEN_SUFFIX_WIDTH)
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base36_encoding_uses_lowercase_alphabet() {
        assert_eq!(base36_encode_u64(0), "0");
        assert_eq!(base36_encode_u64(35), "z");
        assert_eq!(base36_encode_u64(36), "10");
        assert_eq!(base36_encode_fixed_u32(0, 4), "0000");
        assert_eq!(base36_encode_fixed_u32(35, 4), "000z");
    }

    #[test]
    fn unique_token_rejects_negative_timestamps() {
        assert!(unique_token(-1).is_err());
    }

    #[test]
    fn unique_token_combines_timestamp_and_suffix() {
        let token = unique_token(1_234_567).expect("token");
        let (ts, suffix) = token.split_once('-').expect("separator");
        assert!(!ts.is_empty());
        assert_eq!(suffix.len(), 4);
        assert!(token
            .chars()
            .all(|ch| ch.is_ascii_lowercase() || ch.is_ascii_digit() || ch == '-'));
    }
}
