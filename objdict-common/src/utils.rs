//! Utilities
//!
//!
use std::num::ParseIntError;

/// Parse integers the way they are written in EDS files and on the command line
///
/// Accepts an optional sign followed by a decimal number, or a number with a `0x`, `0o` or `0b`
/// radix prefix (in either case).
pub trait ParseEdsNum {
    /// Parse the string as an integer
    fn parse_eds_int(&self) -> Result<i128, ParseIntError>;
}

impl<T: AsRef<str>> ParseEdsNum for T {
    fn parse_eds_int(&self) -> Result<i128, ParseIntError> {
        let s = self.as_ref().trim();
        let (negative, digits) = match s.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, s.strip_prefix('+').unwrap_or(s)),
        };
        let (radix, digits) = match digits.get(..2) {
            Some("0x" | "0X") => (16, &digits[2..]),
            Some("0o" | "0O") => (8, &digits[2..]),
            Some("0b" | "0B") => (2, &digits[2..]),
            _ => (10, digits),
        };
        let value = i128::from_str_radix(digits, radix)?;
        Ok(if negative { -value } else { value })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_eds_int() {
        assert_eq!(7, "7".parse_eds_int().unwrap());
        assert_eq!(0x99, "0x99".parse_eds_int().unwrap());
        assert_eq!(0x1A, "0X1A".parse_eds_int().unwrap());
        assert_eq!(8, "0o10".parse_eds_int().unwrap());
        assert_eq!(5, "0b101".parse_eds_int().unwrap());
        assert_eq!(-10, "-10".parse_eds_int().unwrap());
        assert_eq!(-16, " -0x10 ".parse_eds_int().unwrap());
        assert_eq!(u64::MAX as i128, "0xFFFFFFFFFFFFFFFF".parse_eds_int().unwrap());
        assert!("".parse_eds_int().is_err());
        assert!("0x".parse_eds_int().is_err());
        assert!("12abc".parse_eds_int().is_err());
    }
}
