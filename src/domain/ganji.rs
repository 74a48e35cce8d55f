//! Heavenly stems, earthly branches and the sexagenary pillar they form.
//!
//! Stem and branch advance in lockstep: cycle index `n` pairs stem `n % 10` with branch
//! `n % 12`, so only 60 of the 100 stem/branch combinations ever occur.

use serde::Serialize;
use std::fmt;
use std::str::FromStr;

use crate::utils::error::SajuError;

const STEM_HANJA: [&str; 10] = ["甲", "乙", "丙", "丁", "戊", "己", "庚", "辛", "壬", "癸"];
const STEM_HANGUL: [&str; 10] = ["갑", "을", "병", "정", "무", "기", "경", "신", "임", "계"];
const BRANCH_HANJA: [&str; 12] = [
    "子", "丑", "寅", "卯", "辰", "巳", "午", "未", "申", "酉", "戌", "亥",
];
const BRANCH_HANGUL: [&str; 12] = [
    "자", "축", "인", "묘", "진", "사", "오", "미", "신", "유", "술", "해",
];

/// Heavenly stem (천간).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum Stem {
    #[serde(rename = "甲")]
    Gap,
    #[serde(rename = "乙")]
    Eul,
    #[serde(rename = "丙")]
    Byeong,
    #[serde(rename = "丁")]
    Jeong,
    #[serde(rename = "戊")]
    Mu,
    #[serde(rename = "己")]
    Gi,
    #[serde(rename = "庚")]
    Gyeong,
    #[serde(rename = "辛")]
    Sin,
    #[serde(rename = "壬")]
    Im,
    #[serde(rename = "癸")]
    Gye,
}

/// All 10 stems in cycle order (index 0 = 甲).
pub const ALL_STEMS: [Stem; 10] = [
    Stem::Gap,
    Stem::Eul,
    Stem::Byeong,
    Stem::Jeong,
    Stem::Mu,
    Stem::Gi,
    Stem::Gyeong,
    Stem::Sin,
    Stem::Im,
    Stem::Gye,
];

/// Earthly branch (지지).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum Branch {
    #[serde(rename = "子")]
    Ja,
    #[serde(rename = "丑")]
    Chuk,
    #[serde(rename = "寅")]
    In,
    #[serde(rename = "卯")]
    Myo,
    #[serde(rename = "辰")]
    Jin,
    #[serde(rename = "巳")]
    Sa,
    #[serde(rename = "午")]
    O,
    #[serde(rename = "未")]
    Mi,
    #[serde(rename = "申")]
    Sin,
    #[serde(rename = "酉")]
    Yu,
    #[serde(rename = "戌")]
    Sul,
    #[serde(rename = "亥")]
    Hae,
}

/// All 12 branches in cycle order (index 0 = 子).
pub const ALL_BRANCHES: [Branch; 12] = [
    Branch::Ja,
    Branch::Chuk,
    Branch::In,
    Branch::Myo,
    Branch::Jin,
    Branch::Sa,
    Branch::O,
    Branch::Mi,
    Branch::Sin,
    Branch::Yu,
    Branch::Sul,
    Branch::Hae,
];

/// Five phases (오행), in generating order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Element {
    Wood,
    Fire,
    Earth,
    Metal,
    Water,
}

pub const ALL_ELEMENTS: [Element; 5] = [
    Element::Wood,
    Element::Fire,
    Element::Earth,
    Element::Metal,
    Element::Water,
];

impl Element {
    pub const fn index(self) -> u8 {
        self as u8
    }
}

impl Stem {
    pub const fn index(self) -> u8 {
        self as u8
    }

    pub fn from_index(index: u32) -> Self {
        ALL_STEMS[(index % 10) as usize]
    }

    pub fn hanja(self) -> &'static str {
        STEM_HANJA[self.index() as usize]
    }

    pub fn hangul(self) -> &'static str {
        STEM_HANGUL[self.index() as usize]
    }

    pub fn element(self) -> Element {
        ALL_ELEMENTS[(self.index() / 2) as usize]
    }

    /// 甲 丙 戊 庚 壬 are yang.
    pub fn is_yang(self) -> bool {
        self.index() % 2 == 0
    }
}

impl Branch {
    pub const fn index(self) -> u8 {
        self as u8
    }

    pub fn from_index(index: u32) -> Self {
        ALL_BRANCHES[(index % 12) as usize]
    }

    pub fn hanja(self) -> &'static str {
        BRANCH_HANJA[self.index() as usize]
    }

    pub fn hangul(self) -> &'static str {
        BRANCH_HANGUL[self.index() as usize]
    }
}

impl fmt::Display for Stem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.hanja())
    }
}

impl fmt::Display for Branch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.hanja())
    }
}

/// One stem/branch pair of the 60-cycle (간지).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Pillar {
    pub stem: Stem,
    pub branch: Branch,
}

impl Pillar {
    /// Pairs a stem and branch, or `None` when their polarities differ.
    pub fn new(stem: Stem, branch: Branch) -> Option<Self> {
        if stem.index() % 2 == branch.index() % 2 {
            Some(Self { stem, branch })
        } else {
            None
        }
    }

    /// Pillar at position `index` of the 60-cycle (甲子 = 0). Wraps modulo 60.
    pub fn from_cycle(index: u32) -> Self {
        let index = index % 60;
        Self {
            stem: Stem::from_index(index),
            branch: Branch::from_index(index),
        }
    }

    /// Position in the 60-cycle, recovered from the stem/branch pair.
    pub fn cycle_index(self) -> u32 {
        let s = i32::from(self.stem.index());
        let b = i32::from(self.branch.index());
        (6 * s - 5 * b).rem_euclid(60) as u32
    }

    /// Steps `delta` positions through the cycle, backwards when negative.
    pub fn offset(self, delta: i32) -> Self {
        Self::from_cycle((self.cycle_index() as i32 + delta).rem_euclid(60) as u32)
    }

    /// Sexagenary year pillar of a Gregorian year number (1984 = 甲子).
    pub fn for_year(year: i32) -> Self {
        Self::from_cycle((year - 4).rem_euclid(60) as u32)
    }

    pub fn hangul(self) -> String {
        format!("{}{}", self.stem.hangul(), self.branch.hangul())
    }
}

impl fmt::Display for Pillar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.stem, self.branch)
    }
}

impl FromStr for Pillar {
    type Err = SajuError;

    /// Parses a two-symbol name in hanja (`己卯`) or hangul (`기묘`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut chars = s.trim().chars();
        let (Some(first), Some(second), None) = (chars.next(), chars.next(), chars.next()) else {
            return Err(SajuError::invalid_input(
                "pillar",
                s,
                "expected exactly two symbols",
            ));
        };

        let stem = lookup(first, &STEM_HANJA, &STEM_HANGUL)
            .map(|i| ALL_STEMS[i])
            .ok_or_else(|| SajuError::invalid_input("pillar", s, "unknown stem"))?;
        let branch = lookup(second, &BRANCH_HANJA, &BRANCH_HANGUL)
            .map(|i| ALL_BRANCHES[i])
            .ok_or_else(|| SajuError::invalid_input("pillar", s, "unknown branch"))?;

        Pillar::new(stem, branch)
            .ok_or_else(|| SajuError::invalid_input("pillar", s, "stem and branch parity differ"))
    }
}

fn lookup(symbol: char, hanja: &[&str], hangul: &[&str]) -> Option<usize> {
    let mut buf = [0u8; 4];
    let symbol = &*symbol.encode_utf8(&mut buf);
    hanja
        .iter()
        .position(|h| *h == symbol)
        .or_else(|| hangul.iter().position(|h| *h == symbol))
}
