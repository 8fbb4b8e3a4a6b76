//! Error types for CCCD parsing, validation and generation.
//!
//! Messages are the user-facing Vietnamese strings rendered directly by the
//! HTTP and CLI surfaces.

use serde::{Serialize, Serializer};
use thiserror::Error;

/// Errors that can occur when parsing or decoding a CCCD number.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CodeError {
    /// The input string is empty.
    #[error("CCCD không được để trống")]
    Empty,

    /// The input contains something other than ASCII digits.
    #[error("CCCD chỉ được chứa chữ số")]
    NonDigit,

    /// The input is not exactly 12 digits long.
    #[error("CCCD phải có đúng 12 chữ số")]
    WrongLength { actual: usize },

    /// The degenerate all-zero code.
    #[error("CCCD không hợp lệ: tất cả số đều là 0")]
    AllZero,

    /// The sex/century digit is outside the range the decoder accepts.
    #[error("Mã giới tính/thế kỷ không hợp lệ")]
    UnsupportedSexCentury { digit: u8 },
}

impl CodeError {
    /// Returns true if this error comes from the format checks
    /// (as opposed to field decoding).
    pub fn is_format_error(&self) -> bool {
        !matches!(self, CodeError::UnsupportedSexCentury { .. })
    }
}

/// Why a whole request was refused before any work was done.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RejectReason {
    /// The request asked for more items than the operation allows.
    #[error("Số lượng vượt quá giới hạn cho phép. Tối đa: {max}")]
    InputLimitExceeded { max: usize },

    #[error("Số lượng phải là số nguyên dương")]
    InvalidQuantity,

    #[error("Danh sách mã tỉnh không được rỗng")]
    EmptyProvinceList,

    #[error("Giới tính phải là \"Nam\" hoặc \"Nữ\"")]
    InvalidSex { value: String },

    #[error("Năm sinh phải là số nguyên trong khoảng {min}-{max}")]
    BirthYearOutOfRange { year: i32, min: i32, max: i32 },

    #[error("Khoảng năm sinh không hợp lệ: {start}-{end} (cho phép {min}-{max})")]
    InvalidYearRange {
        start: i32,
        end: i32,
        min: i32,
        max: i32,
    },

    #[error("Không có mã tỉnh hợp lệ trong danh sách")]
    NoValidProvince,
}

/// A refused request, reported with the ceiling that applied.
///
/// Serializes as `{"error": ..., "maxLimit": ..., "requested": ...}`.
#[derive(Debug, Error, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
#[error("{reason}")]
pub struct Rejection {
    #[serde(rename = "error", serialize_with = "serialize_display")]
    pub reason: RejectReason,
    pub max_limit: usize,
    pub requested: i64,
}

impl Rejection {
    pub fn new(reason: RejectReason, max_limit: usize, requested: i64) -> Self {
        Self {
            reason,
            max_limit,
            requested,
        }
    }

    /// Returns true if the request was refused for exceeding a ceiling.
    pub fn is_limit_error(&self) -> bool {
        matches!(self.reason, RejectReason::InputLimitExceeded { .. })
    }
}

fn serialize_display<T, S>(value: &T, serializer: S) -> Result<S::Ok, S::Error>
where
    T: std::fmt::Display,
    S: Serializer,
{
    serializer.collect_str(value)
}

/// A fault while synthesizing a single generated item.
///
/// These never abort a batch: the generator logs them and moves on.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ItemError {
    #[error("no unique code after {attempts} attempts for province {province}, year {year}")]
    Exhausted {
        province: String,
        year: i32,
        attempts: u32,
    },

    #[error("no sex/century digit for birth year {year}")]
    UnsupportedCentury { year: i32 },

    #[error("assembled code is malformed: {0}")]
    Malformed(#[from] CodeError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejection_serializes_limit_shape() {
        let rejection = Rejection::new(RejectReason::InputLimitExceeded { max: 50 }, 50, 100);
        let json = serde_json::to_value(&rejection).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "error": "Số lượng vượt quá giới hạn cho phép. Tối đa: 50",
                "maxLimit": 50,
                "requested": 100
            })
        );
        assert!(rejection.is_limit_error());
    }

    #[test]
    fn format_errors_are_classified() {
        assert!(CodeError::Empty.is_format_error());
        assert!(CodeError::WrongLength { actual: 3 }.is_format_error());
        assert!(!CodeError::UnsupportedSexCentury { digit: 7 }.is_format_error());
    }
}
