use crate::HashError;

/// Lookup table: ASCII byte → nibble value (255 = invalid).
const HEX_DECODE: [u8; 256] = {
    let mut table = [255u8; 256];
    let mut i = 0u8;
    loop {
        match i {
            b'0'..=b'9' => table[i as usize] = i - b'0',
            b'a'..=b'f' => table[i as usize] = i - b'a' + 10,
            b'A'..=b'F' => table[i as usize] = i - b'A' + 10,
            _ => {}
        }
        if i == 255 {
            break;
        }
        i += 1;
    }
    table
};

const HEX_ENCODE: &[u8; 16] = b"0123456789abcdef";

/// Hex-encode `bytes` to a lowercase `String`.
pub fn hex_to_string(bytes: &[u8]) -> String {
    let mut buf = Vec::with_capacity(bytes.len() * 2);
    for &b in bytes {
        buf.push(HEX_ENCODE[(b >> 4) as usize]);
        buf.push(HEX_ENCODE[(b & 0x0f) as usize]);
    }
    // Only ASCII hex digits were pushed.
    unsafe { String::from_utf8_unchecked(buf) }
}

/// Decode a hex string into `buf`. The input length must be exactly `buf.len() * 2`.
pub fn hex_decode(hex: &str, buf: &mut [u8]) -> Result<(), HashError> {
    let hex = hex.as_bytes();
    if hex.len() != buf.len() * 2 {
        return Err(HashError::InvalidHexLength {
            expected: buf.len() * 2,
            actual: hex.len(),
        });
    }
    for i in 0..buf.len() {
        let hi = HEX_DECODE[hex[i * 2] as usize];
        let lo = HEX_DECODE[hex[i * 2 + 1] as usize];
        if hi == 255 {
            return Err(HashError::InvalidHex {
                position: i * 2,
                character: hex[i * 2] as char,
            });
        }
        if lo == 255 {
            return Err(HashError::InvalidHex {
                position: i * 2 + 1,
                character: hex[i * 2 + 1] as char,
            });
        }
        buf[i] = (hi << 4) | lo;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encode_lowercase() {
        assert_eq!(hex_to_string(&[0xde, 0xad, 0xbe, 0xef]), "deadbeef");
        assert_eq!(hex_to_string(&[0x00, 0xff]), "00ff");
    }

    #[test]
    fn decode_roundtrip() {
        let bytes: Vec<u8> = (0..=255).collect();
        let hex = hex_to_string(&bytes);
        let mut decoded = vec![0u8; bytes.len()];
        hex_decode(&hex, &mut decoded).unwrap();
        assert_eq!(decoded, bytes);
    }

    #[test]
    fn decode_mixed_case() {
        let mut buf = [0u8; 4];
        hex_decode("DeAdBeEf", &mut buf).unwrap();
        assert_eq!(buf, [0xde, 0xad, 0xbe, 0xef]);
    }

    #[test]
    fn decode_invalid_char_positions() {
        let mut buf = [0u8; 4];
        let err = hex_decode("deadgoof", &mut buf).unwrap_err();
        match err {
            HashError::InvalidHex {
                position: 4,
                character: 'g',
            } => {}
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn decode_wrong_length() {
        let mut buf = [0u8; 4];
        assert!(matches!(
            hex_decode("abc", &mut buf),
            Err(HashError::InvalidHexLength {
                expected: 8,
                actual: 3
            })
        ));
    }
}
