//! Accrual rule constants, overridable from the environment
use serde::Deserialize;

pub const ENV_PREFIX: &str = "VACATION_";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct VacationPolicy {
    /// Days granted for every completed year of service.
    pub annual_grant_days: u32,
    /// Unused grants stop accumulating at this many days.
    pub accumulation_cap_days: u32,
    pub sellable_cap_days: u32,
    pub vesting_months: i64,
    pub on_track_months: i64,
    /// Calendar months after admission with no period taken before the grant lapses.
    pub expiration_months: u32,
    pub expired_days: u32,
    pub short_period_days: u32,
    pub long_period_days: u32,
    pub early_warning_days: i64,
    pub overdue_grace_days: i64,
    // sale bonus as a fraction, 1/3 by default
    pub sale_bonus_numerator: u32,
    pub sale_bonus_denominator: u32,
}

impl Default for VacationPolicy {
    fn default() -> Self {
        Self {
            annual_grant_days: 30,
            accumulation_cap_days: 60,
            sellable_cap_days: 10,
            vesting_months: 12,
            on_track_months: 11,
            expiration_months: 23,
            expired_days: 30,
            short_period_days: 5,
            long_period_days: 30,
            early_warning_days: 60,
            overdue_grace_days: 90,
            sale_bonus_numerator: 1,
            sale_bonus_denominator: 3,
        }
    }
}

impl VacationPolicy {
    /// Reads `VACATION_*` variables, e.g. `VACATION_SELLABLE_CAP_DAYS=10`.
    pub fn from_env() -> anyhow::Result<Self> {
        let policy: VacationPolicy = envy::prefixed(ENV_PREFIX).from_env()?;
        policy.validate()?;
        Ok(policy)
    }

    pub fn from_vars<I>(vars: I) -> anyhow::Result<Self>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let policy: VacationPolicy = envy::prefixed(ENV_PREFIX).from_iter(vars)?;
        policy.validate()?;
        Ok(policy)
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.sale_bonus_denominator == 0 {
            anyhow::bail!("sale bonus denominator must be non-zero");
        }
        if self.annual_grant_days == 0 || self.vesting_months <= 0 {
            anyhow::bail!("annual grant and vesting period must be positive");
        }
        if self.sellable_cap_days > self.accumulation_cap_days {
            anyhow::bail!(
                "sellable cap ({}) exceeds accumulation cap ({})",
                self.sellable_cap_days,
                self.accumulation_cap_days
            );
        }
        Ok(())
    }
}
