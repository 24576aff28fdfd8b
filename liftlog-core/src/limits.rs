//! Input bounds applied by the forms and the command line. The store itself
//! accepts any value.

use crate::db::models::{NewBodyMetric, NewWorkoutEntry, Settings};
use crate::error::TrackerError;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bound {
    pub field: &'static str,
    pub min: f64,
    pub max: f64,
    pub step: f64,
    /// Prefilled form value.
    pub default: f64,
}

impl Bound {
    const fn new(field: &'static str, min: f64, max: f64, step: f64, default: f64) -> Self {
        Self {
            field,
            min,
            max,
            step,
            default,
        }
    }

    pub fn check(&self, value: f64) -> Result<f64, TrackerError> {
        if value.is_nan() || value < self.min || value > self.max {
            return Err(TrackerError::OutOfRange {
                field: self.field,
                min: self.min,
                max: self.max,
                value,
            });
        }
        Ok(value)
    }

    pub fn check_int(&self, value: i32) -> Result<i32, TrackerError> {
        self.check(f64::from(value)).map(|_| value)
    }

    pub fn step_up(&self, value: f64) -> f64 {
        (value + self.step).min(self.max)
    }

    pub fn step_down(&self, value: f64) -> f64 {
        (value - self.step).max(self.min)
    }
}

// Log Workout
pub const SETS: Bound = Bound::new("sets", 1.0, 10.0, 1.0, 3.0);
pub const REPS: Bound = Bound::new("reps", 1.0, 30.0, 1.0, 8.0);
pub const WEIGHT: Bound = Bound::new("weight", 0.0, 500.0, 0.5, 0.0);
pub const RIR: Bound = Bound::new("rir", 0.0, 4.0, 0.5, 1.5);

// Body Metrics
pub const BODY_WEIGHT: Bound = Bound::new("weight_kg", 0.0, 300.0, 0.1, 87.6);
pub const WAIST: Bound = Bound::new("waist_cm", 0.0, 200.0, 0.5, 93.0);
pub const SLEEP: Bound = Bound::new("sleep_h", 0.0, 14.0, 0.5, 7.5);
pub const STEPS: Bound = Bound::new("steps", 0.0, 50_000.0, 500.0, 9000.0);
pub const INTAKE: Bound = Bound::new("calories", 0.0, 6000.0, 50.0, 2450.0);

// Settings
pub const CUT_CALORIES: Bound = Bound::new("calories", 1200.0, 5000.0, 50.0, 2450.0);
pub const PROTEIN: Bound = Bound::new("protein_g", 80.0, 300.0, 5.0, 190.0);
pub const FAT: Bound = Bound::new("fat_g", 20.0, 150.0, 5.0, 60.0);
pub const CARBS_REST: Bound = Bound::new("carb_g_rest", 50.0, 600.0, 10.0, 220.0);
pub const CARBS_LIFT: Bound = Bound::new("carb_g_lift", 50.0, 600.0, 10.0, 280.0);
pub const CARBS_FOOTBALL: Bound = Bound::new("carb_g_football", 50.0, 600.0, 10.0, 320.0);
pub const TDEE: Bound = Bound::new("tdee", 1500.0, 6000.0, 50.0, 3000.0);

pub fn check_workout(entry: &NewWorkoutEntry) -> Result<(), TrackerError> {
    if let Some(sets) = entry.sets {
        SETS.check_int(sets)?;
    }
    if let Some(reps) = entry.reps {
        REPS.check_int(reps)?;
    }
    if let Some(weight) = entry.weight {
        WEIGHT.check(weight)?;
    }
    if let Some(rir) = entry.rir {
        RIR.check(rir)?;
    }
    Ok(())
}

pub fn check_body_metric(metric: &NewBodyMetric) -> Result<(), TrackerError> {
    BODY_WEIGHT.check(metric.weight_kg)?;
    WAIST.check(metric.waist_cm)?;
    SLEEP.check(metric.sleep_h)?;
    STEPS.check_int(metric.steps)?;
    INTAKE.check_int(metric.calories)?;
    Ok(())
}

pub fn check_settings(settings: &Settings) -> Result<(), TrackerError> {
    CUT_CALORIES.check_int(settings.calories)?;
    PROTEIN.check_int(settings.protein_g)?;
    FAT.check_int(settings.fat_g)?;
    CARBS_REST.check_int(settings.carb_g_rest)?;
    CARBS_LIFT.check_int(settings.carb_g_lift)?;
    CARBS_FOOTBALL.check_int(settings.carb_g_football)?;
    TDEE.check_int(settings.tdee)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_sit_inside_their_bounds() {
        for bound in [
            SETS, REPS, WEIGHT, RIR, BODY_WEIGHT, WAIST, SLEEP, STEPS, INTAKE, CUT_CALORIES,
            PROTEIN, FAT, CARBS_REST, CARBS_LIFT, CARBS_FOOTBALL, TDEE,
        ] {
            bound.check(bound.default).unwrap();
        }
        check_settings(&Settings::default()).unwrap();
    }

    #[test]
    fn out_of_range_names_the_field() {
        let err = REPS.check_int(31).unwrap_err();
        assert_eq!(err.to_string(), "reps must be between 1 and 30, got 31");
        assert!(RIR.check(f64::NAN).is_err());
        assert!(WEIGHT.check(-0.5).is_err());
    }

    #[test]
    fn stepping_is_clamped() {
        assert_eq!(RIR.step_up(4.0), 4.0);
        assert_eq!(RIR.step_up(1.5), 2.0);
        assert_eq!(WEIGHT.step_down(0.0), 0.0);
        assert_eq!(STEPS.step_up(9000.0), 9500.0);
    }

    #[test]
    fn settings_outside_form_limits_are_refused() {
        let lean = Settings {
            calories: 1000,
            ..Settings::default()
        };
        assert!(matches!(
            check_settings(&lean),
            Err(TrackerError::OutOfRange { field: "calories", .. })
        ));
    }
}
