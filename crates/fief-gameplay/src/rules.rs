//! Pure gameplay formulas.
//!
//! Production rate, upgrade cost, and upgrade duration are exponential in
//! the target level:
//!
//! - `rate(b, l)     = base_rate(b)     * 1.15^(l-1)`  (units per hour)
//! - `cost(b, l)     = base_cost(b)     * 1.28^(l-1)`  (wood-equivalent)
//! - `duration(b, l) = base_duration(b) * 1.32^(l-1)`  (seconds)
//!
//! All three are strictly increasing in `l`. Levels outside `[1, 20]` are
//! a programming error, not a business rejection: the systems validate
//! target levels before consulting the rules, so an out-of-range lookup
//! here means an upstream invariant broke and the error propagates as
//! fatal.

use serde::{Deserialize, Serialize};

use fief_types::BuildingKind;

/// Per-level growth factor for production rates.
const RATE_GROWTH: f64 = 1.15;
/// Per-level growth factor for upgrade costs.
const COST_GROWTH: f64 = 1.28;
/// Per-level growth factor for upgrade durations.
const DURATION_GROWTH: f64 = 1.32;

/// Lowest level the formulas are defined for.
pub const MIN_LEVEL: u8 = 1;
/// Highest level the formulas are defined for.
pub const MAX_LEVEL: u8 = 20;

/// Errors from rule lookups. Always an invariant violation (§ fatal), never
/// a rejection the player can cause.
#[derive(Debug, thiserror::Error)]
pub enum RulesError {
    /// A formula was consulted for a level outside `[1, 20]`.
    #[error("level {level} out of bounds [{MIN_LEVEL}..{MAX_LEVEL}]")]
    LevelOutOfRange {
        /// The offending level.
        level: u8,
    },
}

/// One base value per building kind.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BaseValues {
    /// Base value for the lumber mill.
    pub lumber_mill: f64,
    /// Base value for the clay pit.
    pub clay_pit: f64,
    /// Base value for the iron mine.
    pub iron_mine: f64,
    /// Base value for the farm.
    pub farm: f64,
}

impl BaseValues {
    /// The base value for one building kind.
    pub const fn get(&self, building: BuildingKind) -> f64 {
        match building {
            BuildingKind::LumberMill => self.lumber_mill,
            BuildingKind::ClayPit => self.clay_pit,
            BuildingKind::IronMine => self.iron_mine,
            BuildingKind::Farm => self.farm,
        }
    }
}

/// The versioned gameplay rule set.
///
/// A plain serializable value so an API layer can expose it verbatim.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rules {
    /// Rule-set version tag.
    pub version: String,
    /// Base production rates, units per hour at level 1.
    pub base_rates: BaseValues,
    /// Base upgrade costs at level 1, paid in wood.
    pub base_costs: BaseValues,
    /// Base upgrade durations at level 1, in seconds.
    pub base_durations_s: BaseValues,
}

impl Rules {
    /// Production rate of `building` at `level`, in units per hour.
    ///
    /// # Errors
    ///
    /// Returns [`RulesError::LevelOutOfRange`] outside `[1, 20]`.
    pub fn rate(&self, building: BuildingKind, level: u8) -> Result<f64, RulesError> {
        let exponent = level_exponent(level)?;
        Ok(self.base_rates.get(building) * RATE_GROWTH.powi(exponent))
    }

    /// Cost of upgrading `building` to `level`, in wood.
    ///
    /// # Errors
    ///
    /// Returns [`RulesError::LevelOutOfRange`] outside `[1, 20]`.
    pub fn cost(&self, building: BuildingKind, level: u8) -> Result<f64, RulesError> {
        let exponent = level_exponent(level)?;
        Ok(self.base_costs.get(building) * COST_GROWTH.powi(exponent))
    }

    /// Duration of upgrading `building` to `level`, in seconds.
    ///
    /// # Errors
    ///
    /// Returns [`RulesError::LevelOutOfRange`] outside `[1, 20]`.
    pub fn duration_s(&self, building: BuildingKind, level: u8) -> Result<f64, RulesError> {
        let exponent = level_exponent(level)?;
        Ok(self.base_durations_s.get(building) * DURATION_GROWTH.powi(exponent))
    }
}

impl Default for Rules {
    /// The `v1` rule set: every producer yields 60 units/hour at level 1
    /// except the farm at 30, with matching cost and duration bases.
    fn default() -> Self {
        Self {
            version: "v1".to_owned(),
            base_rates: BaseValues {
                lumber_mill: 60.0,
                clay_pit: 60.0,
                iron_mine: 60.0,
                farm: 30.0,
            },
            base_costs: BaseValues {
                lumber_mill: 60.0,
                clay_pit: 60.0,
                iron_mine: 60.0,
                farm: 50.0,
            },
            base_durations_s: BaseValues {
                lumber_mill: 60.0,
                clay_pit: 60.0,
                iron_mine: 60.0,
                farm: 45.0,
            },
        }
    }
}

/// Validate a level and return the formula exponent `l - 1`.
fn level_exponent(level: u8) -> Result<i32, RulesError> {
    if !(MIN_LEVEL..=MAX_LEVEL).contains(&level) {
        return Err(RulesError::LevelOutOfRange { level });
    }
    Ok(i32::from(level).saturating_sub(1))
}
