//! Visit-count loyalty tiers and punch-card rewards

use std::collections::HashMap;

use chrono::NaiveDate;
use furfolio_types::ConfigError;
use serde::{Deserialize, Serialize};

use crate::model::{Appointment, DogOwner};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoyaltyTier {
    Bronze,
    Silver,
    Gold,
    Platinum,
}

impl LoyaltyTier {
    pub fn label(&self) -> &'static str {
        match self {
            LoyaltyTier::Bronze => "bronze",
            LoyaltyTier::Silver => "silver",
            LoyaltyTier::Gold => "gold",
            LoyaltyTier::Platinum => "platinum",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoyaltyProgram {
    /// Completed visits per free groom; 0 disables rewards
    #[serde(default = "default_visits_per_reward")]
    pub visits_per_reward: u32,
    #[serde(default = "default_silver_visits")]
    pub silver_visits: u32,
    #[serde(default = "default_gold_visits")]
    pub gold_visits: u32,
    #[serde(default = "default_platinum_visits")]
    pub platinum_visits: u32,
}

fn default_visits_per_reward() -> u32 {
    10
}

fn default_silver_visits() -> u32 {
    5
}

fn default_gold_visits() -> u32 {
    15
}

fn default_platinum_visits() -> u32 {
    30
}

impl Default for LoyaltyProgram {
    fn default() -> Self {
        Self {
            visits_per_reward: default_visits_per_reward(),
            silver_visits: default_silver_visits(),
            gold_visits: default_gold_visits(),
            platinum_visits: default_platinum_visits(),
        }
    }
}

impl LoyaltyProgram {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.silver_visits <= self.gold_visits && self.gold_visits <= self.platinum_visits) {
            return Err(ConfigError::Invalid(format!(
                "loyalty tiers must ascend: silver {} / gold {} / platinum {}",
                self.silver_visits, self.gold_visits, self.platinum_visits
            )));
        }
        Ok(())
    }

    pub fn tier_for(&self, visits: usize) -> LoyaltyTier {
        let visits = u64::try_from(visits).unwrap_or(u64::MAX);
        if visits >= u64::from(self.platinum_visits) {
            LoyaltyTier::Platinum
        } else if visits >= u64::from(self.gold_visits) {
            LoyaltyTier::Gold
        } else if visits >= u64::from(self.silver_visits) {
            LoyaltyTier::Silver
        } else {
            LoyaltyTier::Bronze
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoyaltyStatus {
    pub visits: usize,
    pub tier: LoyaltyTier,
    pub rewards_earned: usize,
    /// None when the program hands out no rewards
    pub visits_until_next_reward: Option<usize>,
}

pub fn loyalty_status(visits: usize, program: &LoyaltyProgram) -> LoyaltyStatus {
    let per_reward = program.visits_per_reward as usize;
    let (rewards_earned, visits_until_next_reward) = if per_reward == 0 {
        (0, None)
    } else {
        (visits / per_reward, Some(per_reward - visits % per_reward))
    };
    LoyaltyStatus {
        visits,
        tier: program.tier_for(visits),
        rewards_earned,
        visits_until_next_reward,
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomerLoyalty {
    pub owner_id: String,
    pub owner_name: String,
    pub status: LoyaltyStatus,
}

/// Loyalty standing of every owner as of `today`, most visits first
pub fn loyalty_for_owners(
    owners: &[DogOwner],
    appointments: &[Appointment],
    today: NaiveDate,
    program: &LoyaltyProgram,
) -> Vec<CustomerLoyalty> {
    let mut visits: HashMap<&str, usize> = HashMap::new();
    for appt in appointments.iter().filter(|a| a.is_visit() && a.day() <= today) {
        *visits.entry(appt.owner_id.as_str()).or_insert(0) += 1;
    }
    let mut standings: Vec<CustomerLoyalty> = owners
        .iter()
        .map(|owner| CustomerLoyalty {
            owner_id: owner.id.clone(),
            owner_name: owner.name.clone(),
            status: loyalty_status(
                visits.get(owner.id.as_str()).copied().unwrap_or(0),
                program,
            ),
        })
        .collect();
    standings.sort_by(|a, b| {
        b.status
            .visits
            .cmp(&a.status.visits)
            .then_with(|| a.owner_id.cmp(&b.owner_id))
    });
    standings
}
