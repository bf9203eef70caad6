use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::DutyError;

/// A duty mark. `Ungraded` serializes as the empty string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Grade {
    #[default]
    Ungraded,
    Two,
    TwoPlus,
    ThreeMinus,
    Three,
    ThreePlus,
    FourMinus,
    Four,
    FourPlus,
    FiveMinus,
    Five,
    FivePlus,
}

/// Coarse bucket used by statistics, reports and display styling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GradeBand {
    High,
    Medium,
    Low,
    None,
}

impl Grade {
    pub const ALL: [Grade; 12] = [
        Grade::Ungraded,
        Grade::Two,
        Grade::TwoPlus,
        Grade::ThreeMinus,
        Grade::Three,
        Grade::ThreePlus,
        Grade::FourMinus,
        Grade::Four,
        Grade::FourPlus,
        Grade::FiveMinus,
        Grade::Five,
        Grade::FivePlus,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Grade::Ungraded => "",
            Grade::Two => "2",
            Grade::TwoPlus => "2+",
            Grade::ThreeMinus => "3-",
            Grade::Three => "3",
            Grade::ThreePlus => "3+",
            Grade::FourMinus => "4-",
            Grade::Four => "4",
            Grade::FourPlus => "4+",
            Grade::FiveMinus => "5-",
            Grade::Five => "5",
            Grade::FivePlus => "5+",
        }
    }

    pub fn is_graded(self) -> bool {
        self != Grade::Ungraded
    }

    /// Numeric score: base digit, +0.3 for `+`, -0.3 for `-`, 0 when ungraded.
    pub fn to_number(self) -> f64 {
        match self {
            Grade::Ungraded => 0.0,
            Grade::Two => 2.0,
            Grade::TwoPlus => 2.3,
            Grade::ThreeMinus => 2.7,
            Grade::Three => 3.0,
            Grade::ThreePlus => 3.3,
            Grade::FourMinus => 3.7,
            Grade::Four => 4.0,
            Grade::FourPlus => 4.3,
            Grade::FiveMinus => 4.7,
            Grade::Five => 5.0,
            Grade::FivePlus => 5.3,
        }
    }

    /// Bucket by leading digit, so `5-` is high and `4-` is medium.
    pub fn classify(self) -> GradeBand {
        match self {
            Grade::Ungraded => GradeBand::None,
            Grade::FiveMinus | Grade::Five | Grade::FivePlus => GradeBand::High,
            Grade::FourMinus | Grade::Four | Grade::FourPlus => GradeBand::Medium,
            Grade::Two
            | Grade::TwoPlus
            | Grade::ThreeMinus
            | Grade::Three
            | Grade::ThreePlus => GradeBand::Low,
        }
    }
}

impl Grade {
    /// Exact match against the vocabulary, no whitespace tolerated.
    pub fn from_exact(value: &str) -> Result<Self, DutyError> {
        Grade::ALL
            .iter()
            .copied()
            .find(|grade| grade.as_str() == value)
            .ok_or_else(|| DutyError::InvalidGrade(value.to_string()))
    }
}

/// Lenient form for typed input: surrounding whitespace is ignored.
impl FromStr for Grade {
    type Err = DutyError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Grade::from_exact(value.trim()).map_err(|_| DutyError::InvalidGrade(value.to_string()))
    }
}

impl TryFrom<String> for Grade {
    type Error = DutyError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Grade::from_exact(&value)
    }
}

impl From<Grade> for String {
    fn from(grade: Grade) -> Self {
        grade.as_str().to_string()
    }
}

impl fmt::Display for Grade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Free-function form of [`Grade::to_number`].
pub fn grade_to_number(grade: Grade) -> f64 {
    grade.to_number()
}

/// Free-function form of [`Grade::classify`].
pub fn classify(grade: Grade) -> GradeBand {
    grade.classify()
}
