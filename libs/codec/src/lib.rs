//! # cccd-codec
//!
//! Decoding, validation and synthesis of Vietnamese citizen identity card
//! (CCCD) numbers.
//!
//! ## Code Format
//!
//! Every code is exactly 12 ASCII digits: `{province:3}{sex_century:1}{year:2}{sequence:6}`
//!
//! Examples:
//! - `001010101678`: Hà Nội, male, born 1910
//! - `079303123456`: Thành phố Hồ Chí Minh, female, born 2003
//!
//! The fourth digit encodes sex by parity (even male, odd female) and the
//! century by pair: 0/1 is the 20th century (1900-1999), 2/3 the 21st.
//!
//! ## Legal Basis
//!
//! - Nghị định số 137/2015/NĐ-CP
//! - Thông tư số 07/2016/TT-BCA

mod analyze;
mod code;
mod error;
mod generate;
mod limits;
pub mod tables;

pub use analyze::*;
pub use code::*;
pub use error::{CodeError, ItemError, RejectReason, Rejection};
pub use generate::*;
pub use limits::*;
pub use tables::{Region, Sex};
