//! The 12-digit identity code and its fixed layout.
//!
//! ```text
//! positions 0-2  : province code (3 digits)
//! position  3    : sex+century digit
//! positions 4-5  : birth year mod 100
//! positions 6-11 : random sequence (6 digits)
//! ```

use crate::error::CodeError;

/// Total length of a code.
pub const CODE_LEN: usize = 12;
pub const PROVINCE_LEN: usize = 3;
pub const SEX_CENTURY_LEN: usize = 1;
pub const YEAR_LEN: usize = 2;
pub const SEQUENCE_LEN: usize = 6;

/// The degenerate code rejected by [`IdentityCode::parse`].
pub const ALL_ZERO: &str = "000000000000";

const PROVINCE_END: usize = PROVINCE_LEN;
const SEX_CENTURY_END: usize = PROVINCE_END + SEX_CENTURY_LEN;
const YEAR_END: usize = SEX_CENTURY_END + YEAR_LEN;

/// A syntactically valid identity code: exactly 12 ASCII digits, not all zero.
///
/// Parsing only checks the format; field meaning (known province, plausible
/// year) is the decoder's job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct IdentityCode([u8; CODE_LEN]);

impl IdentityCode {
    /// Parses a code, failing fast on the first format problem in the order
    /// empty, non-digit, wrong length, all-zero.
    pub fn parse(s: &str) -> Result<Self, CodeError> {
        if s.is_empty() {
            return Err(CodeError::Empty);
        }

        if !s.bytes().all(|b| b.is_ascii_digit()) {
            return Err(CodeError::NonDigit);
        }

        let bytes: [u8; CODE_LEN] = s
            .as_bytes()
            .try_into()
            .map_err(|_| CodeError::WrongLength { actual: s.len() })?;

        if s == ALL_ZERO {
            return Err(CodeError::AllZero);
        }

        Ok(Self(bytes))
    }

    /// Builds a code from its parts.
    ///
    /// `year_code` is reduced mod 100 and `sequence` must fit in six digits.
    pub fn assemble(
        province_code: &str,
        sex_century_digit: u8,
        year_code: u32,
        sequence: u32,
    ) -> Result<Self, CodeError> {
        if sex_century_digit > 9 || sequence > 999_999 {
            return Err(CodeError::NonDigit);
        }
        let s = format!(
            "{province_code}{sex_century_digit}{:02}{sequence:06}",
            year_code % 100
        );
        Self::parse(&s)
    }

    pub fn as_str(&self) -> &str {
        // Only ASCII digits are ever stored.
        std::str::from_utf8(&self.0).unwrap_or_default()
    }

    /// Positions 0-2.
    pub fn province_code(&self) -> &str {
        &self.as_str()[..PROVINCE_END]
    }

    /// Position 3.
    pub fn sex_century_digit(&self) -> u8 {
        self.0[PROVINCE_END] - b'0'
    }

    /// Positions 4-5 as written.
    pub fn year_code(&self) -> &str {
        &self.as_str()[SEX_CENTURY_END..YEAR_END]
    }

    /// Positions 4-5 as a number in 0..=99.
    pub fn year_value(&self) -> u8 {
        (self.0[SEX_CENTURY_END] - b'0') * 10 + (self.0[SEX_CENTURY_END + 1] - b'0')
    }

    /// Positions 6-11.
    pub fn random_sequence(&self) -> &str {
        &self.as_str()[YEAR_END..]
    }
}

impl std::fmt::Display for IdentityCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for IdentityCode {
    type Err = CodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl AsRef<str> for IdentityCode {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl serde::Serialize for IdentityCode {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> serde::Deserialize<'de> for IdentityCode {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Self::parse(&s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_layout_slices() {
        let code = IdentityCode::parse("079203012345").unwrap();
        assert_eq!(code.province_code(), "079");
        assert_eq!(code.sex_century_digit(), 2);
        assert_eq!(code.year_code(), "03");
        assert_eq!(code.year_value(), 3);
        assert_eq!(code.random_sequence(), "012345");
        assert_eq!(code.to_string(), "079203012345");
    }

    #[test]
    fn test_empty() {
        assert_eq!(IdentityCode::parse(""), Err(CodeError::Empty));
    }

    #[rstest]
    #[case(1)]
    #[case(11)]
    #[case(13)]
    #[case(100)]
    fn test_wrong_length(#[case] len: usize) {
        let input = "1".repeat(len);
        assert_eq!(
            IdentityCode::parse(&input),
            Err(CodeError::WrongLength { actual: len })
        );
    }

    #[rstest]
    #[case("invalid-cccd")]
    #[case("00101010167a")]
    #[case("001 10101678")]
    #[case("０01010101678")]
    fn test_non_digit(#[case] input: &str) {
        assert_eq!(IdentityCode::parse(input), Err(CodeError::NonDigit));
    }

    #[test]
    fn test_non_digit_checked_before_length() {
        assert_eq!(IdentityCode::parse("12ab"), Err(CodeError::NonDigit));
    }

    #[test]
    fn test_all_zero_rejected() {
        assert_eq!(IdentityCode::parse(ALL_ZERO), Err(CodeError::AllZero));
    }

    #[test]
    fn test_assemble_pads_fields() {
        let code = IdentityCode::assemble("001", 3, 2005, 42).unwrap();
        assert_eq!(code.as_str(), "001305000042");
    }

    #[test]
    fn test_assemble_rejects_oversized_parts() {
        assert!(IdentityCode::assemble("001", 10, 90, 1).is_err());
        assert!(IdentityCode::assemble("001", 0, 90, 1_000_000).is_err());
        assert!(IdentityCode::assemble("01", 0, 90, 1).is_err());
    }

    #[test]
    fn test_json_roundtrip() {
        let code: IdentityCode = "001010101678".parse().unwrap();
        let json = serde_json::to_string(&code).unwrap();
        assert_eq!(json, "\"001010101678\"");
        let parsed: IdentityCode = serde_json::from_str(&json).unwrap();
        assert_eq!(code, parsed);
        assert!(serde_json::from_str::<IdentityCode>("\"000000000000\"").is_err());
    }
}
