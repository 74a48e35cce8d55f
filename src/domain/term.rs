//! The 24 solar terms (절기), indexed from Start of Spring.

use serde::Serialize;
use std::fmt;
use std::str::FromStr;

use crate::domain::ganji::Branch;
use crate::utils::error::SajuError;

const HANGUL: [&str; 24] = [
    "입춘", "우수", "경칩", "춘분", "청명", "곡우", "입하", "소만", "망종", "하지", "소서", "대서",
    "입추", "처서", "백로", "추분", "한로", "상강", "입동", "소설", "대설", "동지", "소한", "대한",
];
const HANJA: [&str; 24] = [
    "立春", "雨水", "驚蟄", "春分", "淸明", "穀雨", "立夏", "小滿", "芒種", "夏至", "小暑", "大暑",
    "立秋", "處暑", "白露", "秋分", "寒露", "霜降", "立冬", "小雪", "大雪", "冬至", "小寒", "大寒",
];
/// Simplified-form spellings found in some exported tables.
const HANJA_VARIANTS: [(&str, usize); 3] = [("清明", 4), ("惊蛰", 2), ("小满", 7)];

/// Solar term, index 0 = 입춘 (Start of Spring) through 23 = 대한 (Major Cold).
///
/// Even indices are the principal terms (절) that open a solar month; odd indices are the
/// mid-month terms (중기).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SolarTerm(u8);

impl SolarTerm {
    pub const START_OF_SPRING: SolarTerm = SolarTerm(0);
    pub const MINOR_COLD: SolarTerm = SolarTerm(22);

    pub fn from_index(index: u32) -> Option<Self> {
        (index < 24).then_some(Self(index as u8))
    }

    pub fn index(self) -> u32 {
        u32::from(self.0)
    }

    pub fn is_principal(self) -> bool {
        self.0 % 2 == 0
    }

    /// 소한 and 대한 fall in January, before that year's Start of Spring.
    pub fn precedes_spring(self) -> bool {
        self.0 >= 22
    }

    /// Position within a Gregorian year's listing (소한 = 0 … 동지 = 23).
    pub fn calendar_order(self) -> u32 {
        (self.index() + 2) % 24
    }

    /// Branch of the solar month this term belongs to: 입춘/우수 open 寅, 소한/대한 close with 丑.
    pub fn month_branch(self) -> Branch {
        Branch::from_index(2 + self.index() / 2)
    }

    pub fn hangul(self) -> &'static str {
        HANGUL[self.0 as usize]
    }

    pub fn hanja(self) -> &'static str {
        HANJA[self.0 as usize]
    }
}

impl fmt::Display for SolarTerm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.hangul())
    }
}

impl Serialize for SolarTerm {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.hangul())
    }
}

impl FromStr for SolarTerm {
    type Err = SajuError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim();
        HANGUL
            .iter()
            .position(|n| *n == name)
            .or_else(|| HANJA.iter().position(|n| *n == name))
            .or_else(|| {
                HANJA_VARIANTS
                    .iter()
                    .find(|(n, _)| *n == name)
                    .map(|(_, i)| *i)
            })
            .map(|i| SolarTerm(i as u8))
            .ok_or_else(|| SajuError::invalid_input("term name", s, "unknown solar term"))
    }
}
