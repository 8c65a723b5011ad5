//! Encoding utilities for fixed-width header fields and numeric text.

use bytes::{Buf, BufMut, BytesMut};

/// Reverse the byte order of a 32-bit integer.
///
/// Applying it twice yields the original value.
pub fn change_endianness_i32(value: i32) -> i32 {
    value.swap_bytes()
}

/// Reverse the byte order of a 16-bit integer.
pub fn change_endianness_i16(value: i16) -> i16 {
    value.swap_bytes()
}

/// Write `data` into exactly `width` bytes, truncating or padding with NULs.
pub fn put_fixed_str(buf: &mut BytesMut, data: &[u8], width: usize) {
    let n = data.len().min(width);
    buf.put_slice(&data[..n]);
    buf.put_bytes(0, width - n);
}

/// Read a NUL-terminated string occupying exactly `width` bytes.
///
/// Consumes all `width` bytes; returns those before the first NUL.
/// Returns None if the buffer is shorter than `width`.
pub fn get_fixed_str(buf: &mut &[u8], width: usize) -> Option<Vec<u8>> {
    if buf.len() < width {
        return None;
    }
    let raw = &buf[..width];
    let end = raw.iter().position(|&b| b == 0).unwrap_or(width);
    let out = raw[..end].to_vec();
    buf.advance(width);
    Some(out)
}

/// Strip leading and trailing spaces, NULs, and other control bytes.
pub fn trim_field(data: &[u8]) -> &[u8] {
    let start = data.iter().position(|&b| b > b' ').unwrap_or(data.len());
    let end = data.iter().rposition(|&b| b > b' ').map_or(start, |p| p + 1);
    &data[start..end]
}

/// Remove 0x8D 0x0A soft-return pairs inserted by dBase editors.
pub fn strip_soft_returns(data: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(data.len());
    let mut i = 0;
    while i < data.len() {
        if data[i] == 0x8D && data.get(i + 1) == Some(&0x0A) {
            i += 2;
            continue;
        }
        out.push(data[i]);
        i += 1;
    }
    out
}

/// Number of decimal digits in the integer part of `value` (at least 1).
pub fn int_digits(value: u128) -> usize {
    let mut digits = 1;
    let mut v = value / 10;
    while v > 0 {
        digits += 1;
        v /= 10;
    }
    digits
}

/// Number of digits before the decimal point of a float.
pub fn float_int_digits(value: f64) -> usize {
    let whole = value.abs().trunc();
    if !whole.is_finite() {
        usize::MAX
    } else if whole < 1.0 {
        1
    } else if whole >= 1e38 {
        // beyond u128 range, count via the exponent
        whole.log10().floor() as usize + 1
    } else {
        int_digits(whole as u128)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_change_endianness_involution() {
        for &v in &[0i32, 1, -1, 0x12345678, i32::MIN, i32::MAX] {
            assert_eq!(change_endianness_i32(change_endianness_i32(v)), v);
        }
        for &v in &[0i16, 1, -1, 0x1234, i16::MIN, i16::MAX] {
            assert_eq!(change_endianness_i16(change_endianness_i16(v)), v);
        }
    }

    #[test]
    fn test_change_endianness_values() {
        assert_eq!(change_endianness_i32(0x0102_0304), 0x0403_0201);
        assert_eq!(change_endianness_i32(0), 0);
        assert_eq!(change_endianness_i32(-1), -1);
        assert_eq!(change_endianness_i16(0x0102), 0x0201);
        assert_eq!(change_endianness_i16(-1), -1);
        assert_eq!(change_endianness_i16(0x00FF), -256);
    }

    #[test]
    fn test_fixed_str_roundtrip() {
        let mut buf = BytesMut::new();
        put_fixed_str(&mut buf, b"NAME", 11);
        assert_eq!(buf.len(), 11);
        assert_eq!(&buf[..], b"NAME\0\0\0\0\0\0\0");

        let mut slice: &[u8] = &buf;
        assert_eq!(get_fixed_str(&mut slice, 11).unwrap(), b"NAME");
        assert!(slice.is_empty());
    }

    #[test]
    fn test_fixed_str_truncates() {
        let mut buf = BytesMut::new();
        put_fixed_str(&mut buf, b"ABCDEFGHIJKL", 10);
        assert_eq!(&buf[..], b"ABCDEFGHIJ");

        let mut short: &[u8] = b"AB";
        assert!(get_fixed_str(&mut short, 10).is_none());
    }

    #[test]
    fn test_trim_field() {
        assert_eq!(trim_field(b"  12.5 "), b"12.5");
        assert_eq!(trim_field(b"\0\0"), b"");
        assert_eq!(trim_field(b""), b"");
    }

    #[test]
    fn test_strip_soft_returns() {
        assert_eq!(strip_soft_returns(b"ab\x8D\x0Acd"), b"abcd");
        assert_eq!(strip_soft_returns(b"ab\x8D"), b"ab\x8D");
    }

    #[test]
    fn test_digit_counts() {
        assert_eq!(int_digits(0), 1);
        assert_eq!(int_digits(9), 1);
        assert_eq!(int_digits(12345), 5);
        assert_eq!(float_int_digits(0.5), 1);
        assert_eq!(float_int_digits(-123.75), 3);
        assert_eq!(float_int_digits(f64::INFINITY), usize::MAX);
        assert_eq!(float_int_digits(f64::NAN), usize::MAX);
    }
}
