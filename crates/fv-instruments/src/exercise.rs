//! Option exercise styles.
//!
//! Maturities are year fractions measured from the valuation time.

use fv_core::{ensure, errors::Result, Time};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Type of exercise right.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExerciseType {
    /// Can only be exercised at expiry.
    European,
    /// Can be exercised at any time up to expiry.
    American,
}

impl fmt::Display for ExerciseType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExerciseType::European => write!(f, "European"),
            ExerciseType::American => write!(f, "American"),
        }
    }
}

/// Exercise specification: style plus time to expiry.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Exercise {
    exercise_type: ExerciseType,
    maturity: Time,
}

impl Exercise {
    /// European exercise at `maturity` years.
    pub fn european(maturity: Time) -> Result<Self> {
        Self::new(ExerciseType::European, maturity)
    }

    /// American exercise on `[0, maturity]`.
    pub fn american(maturity: Time) -> Result<Self> {
        Self::new(ExerciseType::American, maturity)
    }

    /// Build an exercise of the given style.
    pub fn new(exercise_type: ExerciseType, maturity: Time) -> Result<Self> {
        ensure!(
            maturity >= 0.0 && maturity.is_finite(),
            "maturity must be a non-negative year fraction, got {maturity}"
        );
        Ok(Self {
            exercise_type,
            maturity,
        })
    }

    /// The exercise style.
    pub fn exercise_type(&self) -> ExerciseType {
        self.exercise_type
    }

    /// Time to expiry in years.
    pub fn maturity(&self) -> Time {
        self.maturity
    }
}
