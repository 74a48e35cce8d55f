//! Chart interpretation relative to the day stem: ten gods (십성), hidden stems (지장간) and
//! the twelve life stages (12운성), plus the branch relations between pillars (형충파합).

use serde::Serialize;
use std::fmt;

use crate::domain::ganji::{Branch, Pillar, Stem};
use crate::domain::model::SajuResult;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum TenGod {
    #[serde(rename = "비견")]
    Companion,
    #[serde(rename = "겁재")]
    RobWealth,
    #[serde(rename = "식신")]
    EatingGod,
    #[serde(rename = "상관")]
    HurtingOfficer,
    #[serde(rename = "편재")]
    IndirectWealth,
    #[serde(rename = "정재")]
    DirectWealth,
    #[serde(rename = "편관")]
    SevenKillings,
    #[serde(rename = "정관")]
    DirectOfficer,
    #[serde(rename = "편인")]
    IndirectResource,
    #[serde(rename = "정인")]
    DirectResource,
}

impl TenGod {
    pub fn hangul(self) -> &'static str {
        match self {
            TenGod::Companion => "비견",
            TenGod::RobWealth => "겁재",
            TenGod::EatingGod => "식신",
            TenGod::HurtingOfficer => "상관",
            TenGod::IndirectWealth => "편재",
            TenGod::DirectWealth => "정재",
            TenGod::SevenKillings => "편관",
            TenGod::DirectOfficer => "정관",
            TenGod::IndirectResource => "편인",
            TenGod::DirectResource => "정인",
        }
    }
}

impl fmt::Display for TenGod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.hangul())
    }
}

/// Relation of `other` to the day stem `me`.
pub fn ten_god(me: Stem, other: Stem) -> TenGod {
    let relation = (other.element().index() + 5 - me.element().index()) % 5;
    let same_polarity = me.is_yang() == other.is_yang();
    match (relation, same_polarity) {
        (0, true) => TenGod::Companion,
        (0, false) => TenGod::RobWealth,
        (1, true) => TenGod::EatingGod,
        (1, false) => TenGod::HurtingOfficer,
        (2, true) => TenGod::IndirectWealth,
        (2, false) => TenGod::DirectWealth,
        (3, true) => TenGod::SevenKillings,
        (3, false) => TenGod::DirectOfficer,
        (_, true) => TenGod::IndirectResource,
        (_, false) => TenGod::DirectResource,
    }
}

/// Hidden stems of each branch as 여기, 중기, 본기; the last one is the main stem.
pub static HIDDEN_STEMS: [&[Stem]; 12] = [
    &[Stem::Im, Stem::Gye],
    &[Stem::Gye, Stem::Sin, Stem::Gi],
    &[Stem::Mu, Stem::Byeong, Stem::Gap],
    &[Stem::Gap, Stem::Eul],
    &[Stem::Eul, Stem::Gye, Stem::Mu],
    &[Stem::Mu, Stem::Gyeong, Stem::Byeong],
    &[Stem::Byeong, Stem::Gi, Stem::Jeong],
    &[Stem::Jeong, Stem::Eul, Stem::Gi],
    &[Stem::Mu, Stem::Im, Stem::Gyeong],
    &[Stem::Gyeong, Stem::Sin],
    &[Stem::Sin, Stem::Jeong, Stem::Mu],
    &[Stem::Mu, Stem::Gap, Stem::Im],
];

pub fn hidden_stems(branch: Branch) -> &'static [Stem] {
    HIDDEN_STEMS[branch.index() as usize]
}

pub fn main_hidden_stem(branch: Branch) -> Stem {
    let stems = hidden_stems(branch);
    stems[stems.len() - 1]
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum TwelveStage {
    #[serde(rename = "장생")]
    Birth,
    #[serde(rename = "목욕")]
    Bath,
    #[serde(rename = "관대")]
    Crown,
    #[serde(rename = "건록")]
    Office,
    #[serde(rename = "제왕")]
    Peak,
    #[serde(rename = "쇠")]
    Decline,
    #[serde(rename = "병")]
    Sickness,
    #[serde(rename = "사")]
    Death,
    #[serde(rename = "묘")]
    Tomb,
    #[serde(rename = "절")]
    Severance,
    #[serde(rename = "태")]
    Conception,
    #[serde(rename = "양")]
    Nurture,
}

const STAGES: [TwelveStage; 12] = [
    TwelveStage::Birth,
    TwelveStage::Bath,
    TwelveStage::Crown,
    TwelveStage::Office,
    TwelveStage::Peak,
    TwelveStage::Decline,
    TwelveStage::Sickness,
    TwelveStage::Death,
    TwelveStage::Tomb,
    TwelveStage::Severance,
    TwelveStage::Conception,
    TwelveStage::Nurture,
];

impl TwelveStage {
    pub fn hangul(self) -> &'static str {
        match self {
            TwelveStage::Birth => "장생",
            TwelveStage::Bath => "목욕",
            TwelveStage::Crown => "관대",
            TwelveStage::Office => "건록",
            TwelveStage::Peak => "제왕",
            TwelveStage::Decline => "쇠",
            TwelveStage::Sickness => "병",
            TwelveStage::Death => "사",
            TwelveStage::Tomb => "묘",
            TwelveStage::Severance => "절",
            TwelveStage::Conception => "태",
            TwelveStage::Nurture => "양",
        }
    }
}

impl fmt::Display for TwelveStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.hangul())
    }
}

/// Branch index where each stem is born (장생).
static BIRTH_BRANCH: [u8; 10] = [11, 6, 2, 9, 2, 9, 5, 0, 8, 3];

/// Yang stems walk the stages forward through the branches, yin stems backward.
pub fn twelve_stage(stem: Stem, branch: Branch) -> TwelveStage {
    let start = i32::from(BIRTH_BRANCH[stem.index() as usize]);
    let b = i32::from(branch.index());
    let step = if stem.is_yang() { b - start } else { start - b };
    STAGES[step.rem_euclid(12) as usize]
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PillarSlot {
    Year,
    Month,
    Day,
    Hour,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum RelationKind {
    #[serde(rename = "형")]
    Punishment,
    #[serde(rename = "충")]
    Clash,
    #[serde(rename = "파")]
    Break,
    #[serde(rename = "합")]
    Combination,
}

impl RelationKind {
    pub fn hangul(self) -> &'static str {
        match self {
            RelationKind::Punishment => "형",
            RelationKind::Clash => "충",
            RelationKind::Break => "파",
            RelationKind::Combination => "합",
        }
    }
}

/// Unordered branch pairs per relation. A pair of equal branches is a self-punishment (자형).
static RELATION_PAIRS: [(RelationKind, &[(Branch, Branch)]); 4] = [
    (
        RelationKind::Punishment,
        &[
            (Branch::In, Branch::Sa),
            (Branch::In, Branch::Sin),
            (Branch::Sa, Branch::Sin),
            (Branch::Chuk, Branch::Sul),
            (Branch::Chuk, Branch::Mi),
            (Branch::Sul, Branch::Mi),
            (Branch::Ja, Branch::Myo),
            (Branch::Jin, Branch::Jin),
            (Branch::O, Branch::O),
            (Branch::Yu, Branch::Yu),
            (Branch::Hae, Branch::Hae),
        ],
    ),
    (
        RelationKind::Clash,
        &[
            (Branch::Ja, Branch::O),
            (Branch::Chuk, Branch::Mi),
            (Branch::In, Branch::Sin),
            (Branch::Myo, Branch::Yu),
            (Branch::Jin, Branch::Sul),
            (Branch::Sa, Branch::Hae),
        ],
    ),
    (
        RelationKind::Break,
        &[
            (Branch::Ja, Branch::Yu),
            (Branch::Chuk, Branch::Jin),
            (Branch::In, Branch::Hae),
            (Branch::Sa, Branch::Sin),
            (Branch::O, Branch::Myo),
            (Branch::Sul, Branch::Mi),
        ],
    ),
    (
        RelationKind::Combination,
        &[
            (Branch::Ja, Branch::Chuk),
            (Branch::In, Branch::Hae),
            (Branch::Myo, Branch::Sul),
            (Branch::Jin, Branch::Yu),
            (Branch::Sa, Branch::Sin),
            (Branch::O, Branch::Mi),
        ],
    ),
];

/// Every relation the two branches stand in, in 형, 충, 파, 합 order.
pub fn relation_kinds(a: Branch, b: Branch) -> impl Iterator<Item = RelationKind> {
    RELATION_PAIRS
        .iter()
        .filter(move |(_, pairs)| pairs.iter().any(|&(x, y)| (x, y) == (a, b) || (y, x) == (a, b)))
        .map(|(kind, _)| *kind)
}

/// A relation between the branches of two pillars. `from` is always the earlier slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BranchRelation {
    pub kind: RelationKind,
    pub from: PillarSlot,
    pub to: PillarSlot,
    pub branches: (Branch, Branch),
}

/// Relations over all six pillar pairs, year-month first and day-hour last.
pub fn branch_relations(result: &SajuResult) -> Vec<BranchRelation> {
    let slots = [
        (PillarSlot::Year, result.year.branch),
        (PillarSlot::Month, result.month.branch),
        (PillarSlot::Day, result.day.branch),
        (PillarSlot::Hour, result.hour.branch),
    ];
    let mut relations = Vec::new();
    for (i, &(from, a)) in slots.iter().enumerate() {
        for &(to, b) in &slots[i + 1..] {
            relations.extend(relation_kinds(a, b).map(|kind| BranchRelation {
                kind,
                from,
                to,
                branches: (a, b),
            }));
        }
    }
    relations
}

/// One value per pillar.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ByPillar<T> {
    pub year: T,
    pub month: T,
    pub day: T,
    pub hour: T,
}

impl<T> ByPillar<T> {
    fn from_fn(result: &SajuResult, f: impl Fn(&Pillar) -> T) -> Self {
        Self {
            year: f(&result.year),
            month: f(&result.month),
            day: f(&result.day),
            hour: f(&result.hour),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Interpretation {
    pub day_master: Stem,
    /// The day slot is `None`: the day stem is the reference itself.
    pub stem_gods: ByPillar<Option<TenGod>>,
    /// Judged on each branch's main hidden stem.
    pub branch_gods: ByPillar<TenGod>,
    pub hidden_stems: ByPillar<&'static [Stem]>,
    pub stages: ByPillar<TwelveStage>,
    pub relations: Vec<BranchRelation>,
}

impl Interpretation {
    pub fn of(result: &SajuResult) -> Self {
        let me = result.day.stem;
        let mut stem_gods = ByPillar::from_fn(result, |p| Some(ten_god(me, p.stem)));
        stem_gods.day = None;

        Self {
            day_master: me,
            stem_gods,
            branch_gods: ByPillar::from_fn(result, |p| ten_god(me, main_hidden_stem(p.branch))),
            hidden_stems: ByPillar::from_fn(result, |p| hidden_stems(p.branch)),
            stages: ByPillar::from_fn(result, |p| twelve_stage(me, p.branch)),
            relations: branch_relations(result),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ganji::{ALL_BRANCHES, ALL_STEMS};

    #[test]
    fn test_ten_gods_for_gap_day() {
        let expected = [
            "비견", "겁재", "식신", "상관", "편재", "정재", "편관", "정관", "편인", "정인",
        ];
        for (stem, name) in ALL_STEMS.iter().zip(expected) {
            assert_eq!(name, ten_god(Stem::Gap, *stem).hangul());
        }
    }

    #[test]
    fn test_ten_gods_for_yin_day() {
        // 乙 wood: 甲 shares the element with opposite polarity, 庚 controls it with opposite polarity.
        assert_eq!(TenGod::RobWealth, ten_god(Stem::Eul, Stem::Gap));
        assert_eq!(TenGod::DirectOfficer, ten_god(Stem::Eul, Stem::Gyeong));
        assert_eq!(TenGod::SevenKillings, ten_god(Stem::Eul, Stem::Sin));
        assert_eq!(TenGod::DirectResource, ten_god(Stem::Eul, Stem::Im));
    }

    #[test]
    fn test_every_day_stem_sees_each_god_once() {
        for me in ALL_STEMS {
            let mut gods: Vec<TenGod> = ALL_STEMS.iter().map(|s| ten_god(me, *s)).collect();
            gods.sort_by_key(|g| g.hangul());
            gods.dedup();
            assert_eq!(10, gods.len(), "day stem {}", me);
        }
    }

    #[test]
    fn test_hidden_stems_end_in_branch_element() {
        for branch in ALL_BRANCHES {
            let main = main_hidden_stem(branch);
            let stems = hidden_stems(branch);
            assert!((2..=3).contains(&stems.len()));
            assert!(stems.iter().filter(|s| **s == main).count() == 1, "{}", branch);
        }
        assert_eq!(Stem::Gye, main_hidden_stem(Branch::Ja));
        assert_eq!(Stem::Gi, main_hidden_stem(Branch::Chuk));
        assert_eq!(Stem::Gap, main_hidden_stem(Branch::In));
        assert_eq!(Stem::Im, main_hidden_stem(Branch::Hae));
    }

    #[test]
    fn test_twelve_stages() {
        assert_eq!(TwelveStage::Birth, twelve_stage(Stem::Gap, Branch::Hae));
        assert_eq!(TwelveStage::Office, twelve_stage(Stem::Gap, Branch::In));
        assert_eq!(TwelveStage::Peak, twelve_stage(Stem::Gap, Branch::Myo));
        assert_eq!(TwelveStage::Birth, twelve_stage(Stem::Eul, Branch::O));
        assert_eq!(TwelveStage::Office, twelve_stage(Stem::Eul, Branch::Myo));
        assert_eq!(TwelveStage::Peak, twelve_stage(Stem::Eul, Branch::In));
        assert_eq!(TwelveStage::Peak, twelve_stage(Stem::Mu, Branch::O));
        assert_eq!(TwelveStage::Tomb, twelve_stage(Stem::Im, Branch::Jin));
    }

    #[test]
    fn test_interpretation_of_chart() {
        let p = |s: &str| s.parse::<Pillar>().unwrap();
        let chart = SajuResult {
            year: p("己卯"),
            month: p("丙子"),
            day: p("戊午"),
            hour: p("壬子"),
            is_male: true,
        };
        let reading = Interpretation::of(&chart);
        assert_eq!(Stem::Mu, reading.day_master);
        assert_eq!(Some(TenGod::RobWealth), reading.stem_gods.year);
        assert_eq!(Some(TenGod::IndirectResource), reading.stem_gods.month);
        assert_eq!(None, reading.stem_gods.day);
        assert_eq!(Some(TenGod::IndirectWealth), reading.stem_gods.hour);
        assert_eq!(TenGod::DirectOfficer, reading.branch_gods.year);
        assert_eq!(TenGod::DirectResource, reading.branch_gods.day);
        assert_eq!(TwelveStage::Peak, reading.stages.day);
        assert_eq!(TwelveStage::Conception, reading.stages.hour);
        assert_eq!(&[Stem::Im, Stem::Gye][..], reading.hidden_stems.hour);

        // The 子 month and the 子 hour both clash with the 午 day.
        let clashes: Vec<(PillarSlot, PillarSlot)> = reading
            .relations
            .iter()
            .filter(|r| r.kind == RelationKind::Clash)
            .map(|r| (r.from, r.to))
            .collect();
        assert_eq!(
            vec![(PillarSlot::Month, PillarSlot::Day), (PillarSlot::Day, PillarSlot::Hour)],
            clashes
        );
    }

    #[test]
    fn test_relation_kinds_are_symmetric() {
        for a in ALL_BRANCHES {
            for b in ALL_BRANCHES {
                let ab: Vec<RelationKind> = relation_kinds(a, b).collect();
                let ba: Vec<RelationKind> = relation_kinds(b, a).collect();
                assert_eq!(ab, ba, "{}{}", a, b);
            }
        }
        assert_eq!(vec![RelationKind::Clash], relation_kinds(Branch::Ja, Branch::O).collect::<Vec<_>>());
        // 巳申 is a punishment, a break and a combination at once.
        assert_eq!(
            vec![RelationKind::Punishment, RelationKind::Break, RelationKind::Combination],
            relation_kinds(Branch::Sin, Branch::Sa).collect::<Vec<_>>()
        );
        assert_eq!(vec![RelationKind::Punishment], relation_kinds(Branch::O, Branch::O).collect::<Vec<_>>());
        assert_eq!(0, relation_kinds(Branch::Ja, Branch::Ja).count());
    }

    #[test]
    fn test_year_and_day_clash() {
        let p = |s: &str| s.parse::<Pillar>().unwrap();
        let chart = SajuResult {
            year: p("庚子"),
            month: p("戊寅"),
            day: p("甲午"),
            hour: p("乙亥"),
            is_male: false,
        };
        let relations = branch_relations(&chart);
        assert!(relations.contains(&BranchRelation {
            kind: RelationKind::Clash,
            from: PillarSlot::Year,
            to: PillarSlot::Day,
            branches: (Branch::Ja, Branch::O),
        }));
        // 寅亥 in month and hour: a break and a combination.
        let month_hour: Vec<RelationKind> = relations
            .iter()
            .filter(|r| (r.from, r.to) == (PillarSlot::Month, PillarSlot::Hour))
            .map(|r| r.kind)
            .collect();
        assert_eq!(vec![RelationKind::Break, RelationKind::Combination], month_hour);
        assert_eq!(3, relations.len());
    }
}
