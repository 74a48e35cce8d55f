//! Sexagenary arithmetic over resolved indices. Pure functions, no I/O.

use crate::domain::ganji::{Branch, Pillar, Stem};
use crate::domain::term::SolarTerm;

/// Month pillar cycle index by `[year stem][month branch]` (오호둔, "five tigers").
///
/// A year stem pair (甲己, 乙庚, 丙辛, 丁壬, 戊癸) opens its 寅 month on 丙, 戊, 庚, 壬, 甲. 子 and 丑
/// close the previous cycle, so they carry the stems that follow 亥.
pub static MONTH_PILLAR_TABLE: [[u8; 12]; 10] = [
    [12, 13, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11],
    [24, 25, 14, 15, 16, 17, 18, 19, 20, 21, 22, 23],
    [36, 37, 26, 27, 28, 29, 30, 31, 32, 33, 34, 35],
    [48, 49, 38, 39, 40, 41, 42, 43, 44, 45, 46, 47],
    [0, 1, 50, 51, 52, 53, 54, 55, 56, 57, 58, 59],
    [12, 13, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11],
    [24, 25, 14, 15, 16, 17, 18, 19, 20, 21, 22, 23],
    [36, 37, 26, 27, 28, 29, 30, 31, 32, 33, 34, 35],
    [48, 49, 38, 39, 40, 41, 42, 43, 44, 45, 46, 47],
    [0, 1, 50, 51, 52, 53, 54, 55, 56, 57, 58, 59],
];

/// Hour pillar cycle index by `[day stem][hour branch]` (오서둔, "five rats").
pub static HOUR_PILLAR_TABLE: [[u8; 12]; 10] = [
    [0, 1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11],
    [12, 13, 14, 15, 16, 17, 18, 19, 20, 21, 22, 23],
    [24, 25, 26, 27, 28, 29, 30, 31, 32, 33, 34, 35],
    [36, 37, 38, 39, 40, 41, 42, 43, 44, 45, 46, 47],
    [48, 49, 50, 51, 52, 53, 54, 55, 56, 57, 58, 59],
    [0, 1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11],
    [12, 13, 14, 15, 16, 17, 18, 19, 20, 21, 22, 23],
    [24, 25, 26, 27, 28, 29, 30, 31, 32, 33, 34, 35],
    [36, 37, 38, 39, 40, 41, 42, 43, 44, 45, 46, 47],
    [48, 49, 50, 51, 52, 53, 54, 55, 56, 57, 58, 59],
];

const MINUTES_PER_DAY: i32 = 24 * 60;
const HOUR_WINDOW_MINUTES: i32 = 120;

/// Start of each branch's two-hour window in minutes of the day at zero pivot. 子 straddles
/// midnight.
pub static HOUR_BRANCH_WINDOWS: [i32; 12] = [
    1380, 60, 180, 300, 420, 540, 660, 780, 900, 1020, 1140, 1260,
];

pub fn day_pillar(day_cycle_index: u32) -> Pillar {
    Pillar::from_cycle(day_cycle_index)
}

/// Year pillar from the cycle position of the Start-of-Spring year.
pub fn year_pillar(year_cycle_index: u32) -> Pillar {
    Pillar::from_cycle(year_cycle_index)
}

pub fn month_pillar(term: SolarTerm, year_stem: Stem) -> Pillar {
    month_pillar_for_branch(term.month_branch(), year_stem)
}

pub fn month_pillar_for_branch(branch: Branch, year_stem: Stem) -> Pillar {
    let cycle = MONTH_PILLAR_TABLE[year_stem.index() as usize][branch.index() as usize];
    Pillar::from_cycle(u32::from(cycle))
}

/// Branch of the window holding `hour:minute`. Every window opens `pivot_offset_minutes`
/// earlier than its zero-pivot start, so 子 opens at 22:30 with the default pivot.
pub fn hour_branch(hour: u32, minute: u32, pivot_offset_minutes: i32) -> Branch {
    let shifted = (hour * 60 + minute) as i32 + pivot_offset_minutes;
    let index = HOUR_BRANCH_WINDOWS
        .iter()
        .position(|&start| (shifted - start).rem_euclid(MINUTES_PER_DAY) < HOUR_WINDOW_MINUTES)
        .unwrap_or(0);
    Branch::from_index(index as u32)
}

pub fn hour_pillar(hour: u32, minute: u32, pivot_offset_minutes: i32, day_stem: Stem) -> Pillar {
    let branch = hour_branch(hour, minute, pivot_offset_minutes);
    let cycle = HOUR_PILLAR_TABLE[day_stem.index() as usize][branch.index() as usize];
    Pillar::from_cycle(u32::from(cycle))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ganji::{ALL_BRANCHES, ALL_STEMS};

    #[test]
    fn test_month_table_follows_five_tigers() {
        for stem in ALL_STEMS {
            // 寅 month stem is (year stem % 5) * 2 + 2.
            let tiger = (u32::from(stem.index()) % 5 * 2 + 2) % 10;
            for branch in ALL_BRANCHES {
                let months_from_tiger = (u32::from(branch.index()) + 10) % 12;
                let expected = Stem::from_index(tiger + months_from_tiger);
                let pillar = month_pillar_for_branch(branch, stem);
                assert_eq!(expected, pillar.stem, "{} year, {} month", stem, branch);
                assert_eq!(branch, pillar.branch);
            }
        }
    }

    #[test]
    fn test_hour_table_follows_five_rats() {
        for stem in ALL_STEMS {
            for branch in ALL_BRANCHES {
                let expected = Stem::from_index(u32::from(stem.index()) % 5 * 2 + u32::from(branch.index()));
                let cycle = HOUR_PILLAR_TABLE[stem.index() as usize][branch.index() as usize];
                let pillar = Pillar::from_cycle(u32::from(cycle));
                assert_eq!(expected, pillar.stem, "{} day, {} hour", stem, branch);
                assert_eq!(branch, pillar.branch);
            }
        }
    }

    #[test]
    fn test_month_pillars() {
        // 己 year: 丙寅 at Start of Spring, 丙子 at Major Snow, 丁丑 at Minor Cold.
        let spring = SolarTerm::START_OF_SPRING;
        assert_eq!("丙寅", month_pillar(spring, Stem::Gi).to_string());
        let major_snow = SolarTerm::from_index(20).unwrap();
        assert_eq!("丙子", month_pillar(major_snow, Stem::Gi).to_string());
        assert_eq!("丁丑", month_pillar(SolarTerm::MINOR_COLD, Stem::Gi).to_string());
        // Mid-month terms keep the month of their principal term.
        let rain_water = SolarTerm::from_index(1).unwrap();
        assert_eq!("戊寅", month_pillar(rain_water, Stem::Gyeong).to_string());
    }

    #[test]
    fn test_hour_windows_shift_with_pivot() {
        assert_eq!(Branch::Ja, hour_branch(22, 30, 30));
        assert_eq!(Branch::Hae, hour_branch(22, 29, 30));
        assert_eq!(Branch::Ja, hour_branch(0, 29, 30));
        assert_eq!(Branch::Chuk, hour_branch(0, 30, 30));
        assert_eq!(Branch::O, hour_branch(12, 0, 30));

        assert_eq!(Branch::Ja, hour_branch(23, 0, 0));
        assert_eq!(Branch::Chuk, hour_branch(1, 0, 0));
        assert_eq!(Branch::Hae, hour_branch(22, 59, 0));

        // A negative pivot opens the windows later.
        assert_eq!(Branch::Hae, hour_branch(23, 10, -30));
        assert_eq!(Branch::Ja, hour_branch(23, 30, -30));
    }

    #[test]
    fn test_meridian_corrected_clock_opens_ja_at_23() {
        // 13:10, 23:10 and 01:10 on the clock are 12:40, 22:40 and 00:40 after the -30 minute
        // meridian correction.
        assert_eq!("己未", hour_pillar(12, 40, 30, Stem::Mu).to_string());
        assert_eq!("壬子", hour_pillar(22, 40, 30, Stem::Mu).to_string());
        assert_eq!("癸丑", hour_pillar(0, 40, 30, Stem::Mu).to_string());
    }

    #[test]
    fn test_every_minute_has_exactly_one_branch() {
        for pivot in [-45, 0, 30, 90] {
            let mut counts = [0u32; 12];
            for minute_of_day in 0..1440u32 {
                let branch = hour_branch(minute_of_day / 60, minute_of_day % 60, pivot);
                counts[branch.index() as usize] += 1;
            }
            assert!(counts.iter().all(|&c| c == 120), "pivot {}: {:?}", pivot, counts);
        }
    }

    #[test]
    fn test_hour_pillars() {
        assert_eq!("壬子", hour_pillar(0, 0, 30, Stem::Mu).to_string());
        assert_eq!("甲子", hour_pillar(0, 0, 30, Stem::Gap).to_string());
        assert_eq!("庚午", hour_pillar(12, 0, 30, Stem::Gap).to_string());
        assert_eq!("乙亥", hour_pillar(22, 0, 30, Stem::Gap).to_string());
    }

    #[test]
    fn test_day_and_year_pillars() {
        assert_eq!("甲子", day_pillar(0).to_string());
        assert_eq!("癸亥", day_pillar(59).to_string());
        assert_eq!("戊午", day_pillar(54).to_string());
        assert_eq!("庚辰", year_pillar(16).to_string());
    }
}
