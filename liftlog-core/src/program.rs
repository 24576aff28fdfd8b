//! The fixed Mon/Tue/Thu/Fri training program and the weekly schedule
//! around it. Reference data only; logged entries are never checked
//! against it.

use std::sync::LazyLock;

use chrono::Weekday;
use regex::Regex;
use serde::Serialize;

use crate::db::models::Settings;
use crate::error::TrackerError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgramExercise {
    pub name: &'static str,
    /// Sets x reps, e.g. `4x8-10` or `2x20-30s/side`.
    pub scheme: &'static str,
    /// Starting loads and progression hints.
    pub notes: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgramDay {
    pub name: &'static str,
    pub weekday: Weekday,
    pub exercises: &'static [ProgramExercise],
}

impl ProgramDay {
    pub fn exercise(&self, name: &str) -> Option<&'static ProgramExercise> {
        self.exercises.iter().find(|e| e.name == name)
    }
}

const fn ex(name: &'static str, scheme: &'static str, notes: &'static str) -> ProgramExercise {
    ProgramExercise {
        name,
        scheme,
        notes,
    }
}

pub const PROGRAM: &[ProgramDay] = &[
    ProgramDay {
        name: "Monday - Push",
        weekday: Weekday::Mon,
        exercises: &[
            ex("Incline DB Press", "4x8-10", "25 kg DBs start"),
            ex("Flat DB Press", "3x8-10", "22.5 kg DBs start"),
            ex("Cable/Pec Deck Fly", "3x12-15", ""),
            ex("Seated DB OHP", "3x6-8", "20 kg DBs start"),
            ex("Lateral Raise", "4x12-20", ""),
            ex("Cable Rope Pressdown", "3x10-12", "15 kg → 20 kg next"),
            ex("Ab Wheel (opt.)", "2x8-12", ""),
        ],
    },
    ProgramDay {
        name: "Tuesday - Lower A (Squat)",
        weekday: Weekday::Tue,
        exercises: &[
            ex("Leg Press (full depth)", "4x8-10", "140 kg start"),
            ex("DB RDL", "3x8-10", "25 kg DBs start"),
            ex("Bulgarian Split Squat (Smith)", "3x8-10/side", "Bar + 20 kg total"),
            ex("Leg Extension", "3x12-15", "50 kg start"),
            ex("Standing Calf Raise", "3x15-20", "35–40 kg"),
            ex("Hanging Leg Raise", "2x10-12", ""),
        ],
    },
    ProgramDay {
        name: "Thursday - Pull",
        weekday: Weekday::Thu,
        exercises: &[
            ex("Lat Pulldown (machine)", "4x8-10", "28.5 kg start"),
            ex("Chest-Supported DB Row", "4x8-10", "27.5 kg DBs start"),
            ex("One-Arm Cable Row", "3x10-12/side", ""),
            ex("Rear-Delt Fly", "3x15", ""),
            ex("EZ-Bar Curl", "3x8-12", "22.5 kg bar+plates"),
            ex("Incline DB Curl", "2x12-15", ""),
            ex("Pallof Press", "2x10/side", ""),
        ],
    },
    ProgramDay {
        name: "Friday - Lower B (Hinge)",
        weekday: Weekday::Fri,
        exercises: &[
            ex("Hip Thrust (Smith)", "4x8-10", "50 kg start"),
            ex("Single-Leg RDL (DB)", "3x8-10/side", "18–22.5 kg DBs"),
            ex("Leg Curl (machine)", "3x12-15", "40 kg start"),
            ex("Front Squat or Leg Press", "3x8-10", ""),
            ex("Seated Calf Raise", "3x12-15", "35–40 kg"),
            ex("Copenhagen Side Plank", "2x20-30s/side", ""),
        ],
    },
];

pub fn program_day(name: &str) -> Result<&'static ProgramDay, TrackerError> {
    PROGRAM
        .iter()
        .find(|d| d.name == name)
        .ok_or_else(|| TrackerError::UnknownProgramDay(name.to_string()))
}

pub fn day_names() -> impl Iterator<Item = &'static str> {
    PROGRAM.iter().map(|d| d.name)
}

/// The program day trained on `weekday`, if it is a lifting day.
pub fn day_for_weekday(weekday: Weekday) -> Option<&'static ProgramDay> {
    PROGRAM.iter().find(|d| d.weekday == weekday)
}

/// Target sets and reps parsed from a program scheme string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SetScheme {
    pub sets: u32,
    pub reps_low: u32,
    pub reps_high: u32,
    /// Reps are seconds held rather than repetitions.
    pub timed: bool,
    pub per_side: bool,
}

static SCHEME_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\d+)x(\d+)(?:-(\d+))?(s)?(/side)?$").expect("scheme pattern is valid")
});

impl SetScheme {
    pub fn parse(scheme: &str) -> Result<Self, TrackerError> {
        let invalid = || TrackerError::InvalidScheme(scheme.to_string());
        let caps = SCHEME_RE.captures(scheme.trim()).ok_or_else(invalid)?;
        let num = |i: usize| -> Result<Option<u32>, TrackerError> {
            caps.get(i)
                .map(|m| m.as_str().parse::<u32>().map_err(|_| invalid()))
                .transpose()
        };

        let sets = num(1)?.ok_or_else(invalid)?;
        let reps_low = num(2)?.ok_or_else(invalid)?;
        let reps_high = num(3)?.unwrap_or(reps_low);
        if sets == 0 || reps_high < reps_low {
            return Err(invalid());
        }

        Ok(Self {
            sets,
            reps_low,
            reps_high,
            timed: caps.get(4).is_some(),
            per_side: caps.get(5).is_some(),
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FootballSession {
    pub name: &'static str,
    pub weekday: Weekday,
    pub duration_min: u32,
    pub kind: &'static str,
}

pub const FOOTBALL: &[FootballSession] = &[
    FootballSession {
        name: "Thursday Training",
        weekday: Weekday::Thu,
        duration_min: 60,
        kind: "HIIT/mixed",
    },
    FootballSession {
        name: "Saturday Match",
        weekday: Weekday::Sat,
        duration_min: 30,
        kind: "HIIT/tempo 30–90 min",
    },
];

/// Which carbohydrate target applies on a given day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CarbDay {
    Rest,
    Lift,
    Football,
}

impl CarbDay {
    pub fn label(&self) -> &'static str {
        match self {
            CarbDay::Rest => "rest day",
            CarbDay::Lift => "lift day",
            CarbDay::Football => "football day",
        }
    }
}

/// Football days win over lifting: Thursday is both.
pub fn carb_day(weekday: Weekday) -> CarbDay {
    if FOOTBALL.iter().any(|s| s.weekday == weekday) {
        CarbDay::Football
    } else if day_for_weekday(weekday).is_some() {
        CarbDay::Lift
    } else {
        CarbDay::Rest
    }
}

impl Settings {
    pub fn carb_target(&self, day: CarbDay) -> i32 {
        match day {
            CarbDay::Rest => self.carb_g_rest,
            CarbDay::Lift => self.carb_g_lift,
            CarbDay::Football => self.carb_g_football,
        }
    }
}

/// Lifts tracked on the dashboard's e1RM chart.
pub const KEY_LIFTS: &[&str] = &[
    "Incline DB Press",
    "Leg Press (full depth)",
    "Hip Thrust (Smith)",
    "Chest-Supported DB Row",
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_program_scheme_parses() {
        for day in PROGRAM {
            for exercise in day.exercises {
                SetScheme::parse(exercise.scheme).unwrap();
            }
        }
    }

    #[test]
    fn scheme_variants() {
        assert_eq!(
            SetScheme::parse("4x8-10").unwrap(),
            SetScheme {
                sets: 4,
                reps_low: 8,
                reps_high: 10,
                timed: false,
                per_side: false
            }
        );
        let rear = SetScheme::parse("3x15").unwrap();
        assert_eq!((rear.reps_low, rear.reps_high), (15, 15));

        let plank = SetScheme::parse("2x20-30s/side").unwrap();
        assert!(plank.timed && plank.per_side);
        assert_eq!(plank.sets, 2);

        assert!(SetScheme::parse("3x10/side").unwrap().per_side);
    }

    #[test]
    fn malformed_schemes_are_rejected() {
        for bad in ["", "x10", "0x8", "3x10-8", "three by ten", "3x8-10/leg"] {
            assert!(
                matches!(SetScheme::parse(bad), Err(TrackerError::InvalidScheme(_))),
                "{bad} should be rejected"
            );
        }
    }

    #[test]
    fn days_by_name_and_weekday() {
        assert_eq!(day_names().count(), 4);
        let pull = program_day("Thursday - Pull").unwrap();
        assert_eq!(pull.weekday, Weekday::Thu);
        assert!(pull.exercise("EZ-Bar Curl").is_some());
        assert!(program_day("Sunday - Arms").is_err());

        assert_eq!(day_for_weekday(Weekday::Tue).unwrap().name, "Tuesday - Lower A (Squat)");
        assert!(day_for_weekday(Weekday::Wed).is_none());
    }

    #[test]
    fn carb_day_follows_schedule() {
        assert_eq!(carb_day(Weekday::Mon), CarbDay::Lift);
        assert_eq!(carb_day(Weekday::Tue), CarbDay::Lift);
        assert_eq!(carb_day(Weekday::Thu), CarbDay::Football);
        assert_eq!(carb_day(Weekday::Fri), CarbDay::Lift);
        assert_eq!(carb_day(Weekday::Sat), CarbDay::Football);
        assert_eq!(carb_day(Weekday::Wed), CarbDay::Rest);
        assert_eq!(carb_day(Weekday::Sun), CarbDay::Rest);

        let s = Settings::default();
        assert_eq!(s.carb_target(CarbDay::Football), 320);
        assert_eq!(s.carb_target(CarbDay::Rest), 220);
    }

    #[test]
    fn key_lifts_exist_in_program() {
        for lift in KEY_LIFTS {
            assert!(
                PROGRAM.iter().any(|d| d.exercise(lift).is_some()),
                "{lift} missing from program"
            );
        }
    }
}
