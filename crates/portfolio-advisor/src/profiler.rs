//! Risk Profiler
//!
//! Additive point scoring over five questionnaire answers, bucketed into one
//! of five profile types. Scoring never fails: a missing or unrecognized
//! answer contributes zero points.

use std::fmt;

use serde::de::value::{Error as ValueError, StrDeserializer};
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::ValidationError;

pub const MAX_AGE: u32 = 120;
pub const MAX_SCORE: u32 = 17;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Experience {
    Beginner,
    Intermediate,
    Advanced,
    Expert,
}

impl Experience {
    pub const fn points(self) -> u32 {
        match self {
            Self::Beginner => 0,
            Self::Intermediate => 1,
            Self::Advanced => 2,
            Self::Expert => 3,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum VolatilityTolerance {
    VeryLow,
    Low,
    Medium,
    High,
    VeryHigh,
}

impl VolatilityTolerance {
    pub const fn points(self) -> u32 {
        match self {
            Self::VeryLow => 0,
            Self::Low => 1,
            Self::Medium => 2,
            Self::High => 3,
            Self::VeryHigh => 4,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PrimaryGoal {
    CapitalPreservation,
    Income,
    Balanced,
    Growth,
    AggressiveGrowth,
}

impl PrimaryGoal {
    pub const fn points(self) -> u32 {
        match self {
            Self::CapitalPreservation => 0,
            Self::Income => 1,
            Self::Balanced => 2,
            Self::Growth => 3,
            Self::AggressiveGrowth => 4,
        }
    }
}

/// Form input accepted as loosely as the dashboard sends it
#[derive(Deserialize)]
#[serde(untagged)]
enum Loose {
    Number(f64),
    Text(String),
    Other(serde::de::IgnoredAny),
}

fn lenient_number<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<u32>, D::Error> {
    let value = Option::<Loose>::deserialize(deserializer)?;
    let number = match value {
        Some(Loose::Number(n)) => Some(n),
        Some(Loose::Text(s)) => s.trim().parse::<f64>().ok(),
        Some(Loose::Other(_)) | None => None,
    };
    Ok(number
        .filter(|n| n.is_finite() && *n >= 0.0 && *n <= f64::from(u32::MAX))
        .map(|n| {
            #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
            let whole = n.trunc() as u32;
            whole
        }))
}

fn lenient_choice<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    let value = Option::<Loose>::deserialize(deserializer)?;
    Ok(match value {
        Some(Loose::Text(s)) => T::deserialize(StrDeserializer::<ValueError>::new(s.trim())).ok(),
        _ => None,
    })
}

/// Questionnaire answers; every field is optional
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Questionnaire {
    #[serde(default, deserialize_with = "lenient_number")]
    pub age: Option<u32>,

    #[serde(default, deserialize_with = "lenient_choice")]
    pub experience: Option<Experience>,

    /// Years
    #[serde(default, deserialize_with = "lenient_number")]
    pub time_horizon: Option<u32>,

    #[serde(default, deserialize_with = "lenient_choice")]
    pub volatility_tolerance: Option<VolatilityTolerance>,

    #[serde(default, deserialize_with = "lenient_choice")]
    pub primary_goal: Option<PrimaryGoal>,
}

impl Questionnaire {
    /// Reject answers no form could produce
    pub fn validate(&self) -> Result<(), ValidationError> {
        match self.age {
            Some(age) if age > MAX_AGE => Err(ValidationError::AgeOutOfRange(age)),
            _ => Ok(()),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ProfileType {
    Conservative,
    DividendIncome,
    Balanced,
    Growth,
    Aggressive,
}

impl ProfileType {
    pub const ALL: [Self; 5] = [
        Self::Conservative,
        Self::DividendIncome,
        Self::Balanced,
        Self::Growth,
        Self::Aggressive,
    ];

    /// Highest threshold wins
    pub const fn from_score(score: u32) -> Self {
        match score {
            15.. => Self::Aggressive,
            12.. => Self::Growth,
            8.. => Self::Balanced,
            5.. => Self::DividendIncome,
            _ => Self::Conservative,
        }
    }

    /// Catalog template id
    pub const fn id(self) -> &'static str {
        match self {
            Self::Conservative => "conservative",
            Self::DividendIncome => "dividend-income",
            Self::Balanced => "balanced",
            Self::Growth => "growth",
            Self::Aggressive => "aggressive",
        }
    }

    pub fn from_id(id: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.id() == id)
    }

    pub fn characteristics(self) -> Characteristics {
        let (risk_level, expected_return, volatility, suitable_for) = match self {
            Self::Conservative => (
                "Bajo",
                "4-6% anual",
                "Baja (5-10%)",
                "Preservación capital, jubilados, plazo corto",
            ),
            Self::DividendIncome => (
                "Medio-Bajo",
                "5-7% anual",
                "Media (8-15%)",
                "Ingresos regulares, semi-jubilados",
            ),
            Self::Balanced => (
                "Medio",
                "6-8% anual",
                "Media (10-18%)",
                "Equilibrio crecimiento-estabilidad",
            ),
            Self::Growth => (
                "Medio-Alto",
                "7-10% anual",
                "Alta (15-25%)",
                "Crecimiento largo plazo, adultos jóvenes",
            ),
            Self::Aggressive => (
                "Alto",
                "8-12% anual",
                "Muy Alta (20-35%)",
                "Máximo crecimiento, alta tolerancia riesgo",
            ),
        };

        Characteristics {
            risk_level: risk_level.into(),
            expected_return: expected_return.into(),
            volatility: volatility.into(),
            suitable_for: suitable_for.into(),
        }
    }
}

impl fmt::Display for ProfileType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

/// Descriptors for a profile type
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Characteristics {
    pub risk_level: String,
    pub expected_return: String,
    pub volatility: String,
    pub suitable_for: String,
}

/// Descriptors by template id, `balanced` for anything unknown
pub fn characteristics_for(id: &str) -> Characteristics {
    ProfileType::from_id(id)
        .unwrap_or(ProfileType::Balanced)
        .characteristics()
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RiskAssessment {
    /// 0 to 17
    pub risk_score: u32,
    pub profile_type: ProfileType,
    pub time_horizon_years: u32,
    pub characteristics: Characteristics,
}

#[derive(Clone, Copy, Debug, Default)]
pub struct RiskProfiler;

impl RiskProfiler {
    pub const fn new() -> Self {
        Self
    }

    pub const fn age_points(age: Option<u32>) -> u32 {
        match age {
            Some(a @ 1..) if a < 30 => 3,
            Some(a @ 1..) if a < 45 => 2,
            Some(a @ 1..) if a < 60 => 1,
            _ => 0,
        }
    }

    pub const fn horizon_points(years: u32) -> u32 {
        match years {
            10.. => 3,
            5.. => 2,
            2.. => 1,
            _ => 0,
        }
    }

    pub fn score(&self, questionnaire: &Questionnaire) -> u32 {
        Self::age_points(questionnaire.age)
            + questionnaire.experience.map_or(0, Experience::points)
            + Self::horizon_points(questionnaire.time_horizon.unwrap_or(0))
            + questionnaire
                .volatility_tolerance
                .map_or(0, VolatilityTolerance::points)
            + questionnaire.primary_goal.map_or(0, PrimaryGoal::points)
    }

    pub fn assess(&self, questionnaire: &Questionnaire) -> RiskAssessment {
        let risk_score = self.score(questionnaire);
        let profile_type = ProfileType::from_score(risk_score);
        tracing::debug!(risk_score, %profile_type, "questionnaire assessed");

        RiskAssessment {
            risk_score,
            profile_type,
            time_horizon_years: questionnaire.time_horizon.unwrap_or(1),
            characteristics: profile_type.characteristics(),
        }
    }
}
