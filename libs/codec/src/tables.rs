//! Static lookup tables: provinces, regions, and the sex/century digit.
//!
//! Everything here is immutable and built at most once per process.

use std::collections::HashMap;
use std::sync::OnceLock;

use serde::{Deserialize, Serialize};

/// Label used for codes absent from every table.
pub const UNKNOWN_LABEL: &str = "Không xác định";

// =============================================================================
// Provinces
// =============================================================================

/// A province or centrally-run city of birth registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Province {
    pub code: &'static str,
    pub name: &'static str,
}

const PROVINCES: &[Province] = &[
    Province { code: "001", name: "Hà Nội" },
    Province { code: "002", name: "Hà Giang" },
    Province { code: "004", name: "Cao Bằng" },
    Province { code: "006", name: "Bắc Kạn" },
    Province { code: "008", name: "Tuyên Quang" },
    Province { code: "010", name: "Lào Cai" },
    Province { code: "011", name: "Điện Biên" },
    Province { code: "012", name: "Lai Châu" },
    Province { code: "014", name: "Sơn La" },
    Province { code: "015", name: "Yên Bái" },
    Province { code: "017", name: "Hoà Bình" },
    Province { code: "019", name: "Thái Nguyên" },
    Province { code: "020", name: "Lạng Sơn" },
    Province { code: "022", name: "Quảng Ninh" },
    Province { code: "024", name: "Bắc Giang" },
    Province { code: "025", name: "Phú Thọ" },
    Province { code: "026", name: "Vĩnh Phúc" },
    Province { code: "027", name: "Bắc Ninh" },
    Province { code: "030", name: "Hải Dương" },
    Province { code: "031", name: "Hải Phòng" },
    Province { code: "033", name: "Hưng Yên" },
    Province { code: "034", name: "Thái Bình" },
    Province { code: "035", name: "Hà Nam" },
    Province { code: "036", name: "Nam Định" },
    Province { code: "037", name: "Ninh Bình" },
    Province { code: "038", name: "Thanh Hóa" },
    Province { code: "040", name: "Nghệ An" },
    Province { code: "042", name: "Hà Tĩnh" },
    Province { code: "044", name: "Quảng Bình" },
    Province { code: "045", name: "Quảng Trị" },
    Province { code: "046", name: "Thừa Thiên Huế" },
    Province { code: "048", name: "Đà Nẵng" },
    Province { code: "049", name: "Quảng Nam" },
    Province { code: "051", name: "Quảng Ngãi" },
    Province { code: "052", name: "Bình Định" },
    Province { code: "054", name: "Phú Yên" },
    Province { code: "056", name: "Khánh Hòa" },
    Province { code: "058", name: "Ninh Thuận" },
    Province { code: "060", name: "Bình Thuận" },
    Province { code: "062", name: "Kon Tum" },
    Province { code: "064", name: "Gia Lai" },
    Province { code: "066", name: "Đắk Lắk" },
    Province { code: "067", name: "Đắk Nông" },
    Province { code: "068", name: "Lâm Đồng" },
    Province { code: "070", name: "Bình Phước" },
    Province { code: "072", name: "Tây Ninh" },
    Province { code: "074", name: "Bình Dương" },
    Province { code: "075", name: "Đồng Nai" },
    Province { code: "077", name: "Bà Rịa - Vũng Tàu" },
    Province { code: "079", name: "Thành phố Hồ Chí Minh" },
    Province { code: "080", name: "Long An" },
    Province { code: "082", name: "Tiền Giang" },
    Province { code: "083", name: "Bến Tre" },
    Province { code: "084", name: "Trà Vinh" },
    Province { code: "086", name: "Vĩnh Long" },
    Province { code: "087", name: "Đồng Tháp" },
    Province { code: "089", name: "An Giang" },
    Province { code: "091", name: "Kiên Giang" },
    Province { code: "092", name: "Cần Thơ" },
    Province { code: "093", name: "Hậu Giang" },
    Province { code: "094", name: "Sóc Trăng" },
    Province { code: "095", name: "Bạc Liêu" },
    Province { code: "096", name: "Cà Mau" },
];

/// Province code used when a generation request names none (Hà Nội).
pub const DEFAULT_PROVINCE: &str = "001";

fn province_index() -> &'static HashMap<&'static str, &'static Province> {
    static INDEX: OnceLock<HashMap<&'static str, &'static Province>> = OnceLock::new();
    INDEX.get_or_init(|| PROVINCES.iter().map(|p| (p.code, p)).collect())
}

/// All provinces in code order.
pub fn provinces() -> &'static [Province] {
    PROVINCES
}

/// Looks up a province by its 3-digit code.
pub fn lookup_province(code: &str) -> Option<&'static Province> {
    province_index().get(code).copied()
}

/// Returns the province name, or [`UNKNOWN_LABEL`] for unknown codes.
pub fn province_name(code: &str) -> &'static str {
    lookup_province(code).map_or(UNKNOWN_LABEL, |p| p.name)
}

pub fn is_valid_province(code: &str) -> bool {
    province_index().contains_key(code)
}

// =============================================================================
// Regions
// =============================================================================

/// Geographic region of a province.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Region {
    #[serde(rename = "Miền Bắc")]
    North,
    #[serde(rename = "Miền Trung")]
    Central,
    #[serde(rename = "Miền Nam")]
    South,
    #[serde(rename = "Không xác định")]
    Unknown,
}

impl Region {
    pub fn as_str(&self) -> &'static str {
        match self {
            Region::North => "Miền Bắc",
            Region::Central => "Miền Trung",
            Region::South => "Miền Nam",
            Region::Unknown => UNKNOWN_LABEL,
        }
    }
}

impl std::fmt::Display for Region {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

const NORTH: &[&str] = &[
    "001", "002", "004", "006", "008", "010", "011", "012", "014", "015", "017", "019", "020",
    "022", "024", "025", "026", "027", "030", "031", "033", "034", "035", "036", "037", "038",
    "040", "042",
];

const CENTRAL: &[&str] = &[
    "044", "045", "046", "048", "049", "051", "052", "054", "056", "058", "060", "062", "064",
    "066", "067", "068",
];

const SOUTH: &[&str] = &[
    "070", "072", "074", "075", "077", "079", "080", "082", "083", "084", "086", "087", "089",
    "091", "092", "093", "094", "095", "096",
];

/// Classifies a province code into its region.
pub fn region_of(code: &str) -> Region {
    if NORTH.contains(&code) {
        Region::North
    } else if CENTRAL.contains(&code) {
        Region::Central
    } else if SOUTH.contains(&code) {
        Region::South
    } else {
        Region::Unknown
    }
}

/// The province codes that make up a region (empty for [`Region::Unknown`]).
pub fn region_codes(region: Region) -> &'static [&'static str] {
    match region {
        Region::North => NORTH,
        Region::Central => CENTRAL,
        Region::South => SOUTH,
        Region::Unknown => &[],
    }
}

// =============================================================================
// Sex and century
// =============================================================================

/// Sex as encoded by the parity of the fourth digit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Sex {
    #[serde(rename = "Nam")]
    Male,
    #[serde(rename = "Nữ")]
    Female,
}

impl Sex {
    pub fn as_str(&self) -> &'static str {
        match self {
            Sex::Male => "Nam",
            Sex::Female => "Nữ",
        }
    }

    /// 0 for male, 1 for female.
    const fn parity(self) -> u8 {
        match self {
            Sex::Male => 0,
            Sex::Female => 1,
        }
    }
}

impl std::fmt::Display for Sex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Sex {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Nam" => Ok(Sex::Male),
            "Nữ" => Ok(Sex::Female),
            other => Err(other.to_string()),
        }
    }
}

/// Decoded meaning of the sex/century digit.
///
/// Serializes as `{gender, century, description}`; the digit is the table key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SexCentury {
    pub digit: u8,
    pub sex: Sex,
    pub century: u8,
}

impl Serialize for SexCentury {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        use serde::ser::SerializeStruct;

        let mut state = serializer.serialize_struct("SexCentury", 3)?;
        state.serialize_field("gender", &self.sex)?;
        state.serialize_field("century", &self.century)?;
        state.serialize_field("description", &self.description())?;
        state.end()
    }
}

impl SexCentury {
    /// First calendar year of the century (1900 for century 20).
    pub fn base_year(&self) -> i32 {
        (i32::from(self.century) - 1) * 100
    }

    pub fn description(&self) -> String {
        let start = self.base_year();
        format!(
            "{}, sinh thế kỷ {} ({}-{})",
            self.sex,
            self.century,
            start,
            start + 99
        )
    }
}

/// First century representable by the digit (digit 0/1).
pub const FIRST_CENTURY: u8 = 20;

/// Last century representable by the digit (digit 8/9).
pub const LAST_CENTURY: u8 = 24;

/// Decodes a sex/century digit. Even digits are male, odd digits female;
/// the pair (2k, 2k+1) is century 20+k.
pub fn sex_century_of(digit: u8) -> Option<SexCentury> {
    if digit > 9 {
        return None;
    }
    let sex = if digit % 2 == 0 { Sex::Male } else { Sex::Female };
    Some(SexCentury {
        digit,
        sex,
        century: FIRST_CENTURY + digit / 2,
    })
}

/// Inverse of [`sex_century_of`].
pub fn digit_for(sex: Sex, century: u8) -> Option<u8> {
    if !(FIRST_CENTURY..=LAST_CENTURY).contains(&century) {
        return None;
    }
    Some((century - FIRST_CENTURY) * 2 + sex.parity())
}

/// Century a calendar year belongs to, in the 1900 → 20 convention.
pub fn century_of_year(year: i32) -> i32 {
    year / 100 + 1
}

/// The full digit table, 0 through 9.
pub fn sex_century_table() -> Vec<SexCentury> {
    (0..=9).filter_map(sex_century_of).collect()
}

// =============================================================================
// Reference text
// =============================================================================

/// Legal basis of the numbering scheme.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct LegalBasis {
    pub decree: &'static str,
    pub circular: &'static str,
    pub description: &'static str,
    pub effective_date: &'static str,
}

pub const LEGAL_BASIS: LegalBasis = LegalBasis {
    decree: "Nghị định số 137/2015/NĐ-CP",
    circular: "Thông tư số 07/2016/TT-BCA",
    description: "Quy định về số định danh cá nhân và cấu trúc CCCD",
    effective_date: "01/01/2016",
};

/// Meaning of each position range, keyed the way the API publishes it.
pub const STRUCTURE_BREAKDOWN: [(&str, &str); 4] = [
    ("positions_1_3", "Mã tỉnh/thành phố nơi đăng ký khai sinh"),
    ("position_4", "Mã thế kỷ và giới tính"),
    ("positions_5_6", "Hai số cuối của năm sinh"),
    ("positions_7_12", "Dãy số ngẫu nhiên (6 chữ số)"),
];

pub const ACCURACY_NOTES: [&str; 4] = [
    "Cấu trúc tuân thủ 100% quy định pháp luật",
    "Mã tỉnh được xác thực theo bảng mã chính thức",
    "Mã giới tính và thế kỷ đúng theo quy tắc",
    "Ngày sinh được kiểm tra tính hợp lệ",
];
