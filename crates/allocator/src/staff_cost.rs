//! Linear staffing cost model.
//!
//! The same formula is applied twice per allocation: once per participant as a
//! marginal surcharge inside the greedy loop, and once over the final totals.
//! The two figures are not expected to match exactly.

use kol_core::StaffParams;
use serde::{Deserialize, Serialize};

pub const DEFAULT_FULL_TIME_HOURS_PER_MONTH: f64 = 160.0;

/// Hours and cost of operating a campaign.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StaffCost {
    pub cost: f64,
    pub hours: f64,
    /// `hours / full_time_hours_per_month`.
    pub full_time_equivalents: f64,
    /// More work than one full-time employee covers in a month.
    pub over_capacity: bool,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StaffCostModel {
    params: StaffParams,
    full_time_hours_per_month: f64,
}

impl StaffCostModel {
    pub fn new(params: StaffParams) -> Self {
        Self {
            params,
            full_time_hours_per_month: DEFAULT_FULL_TIME_HOURS_PER_MONTH,
        }
    }

    pub fn with_full_time_hours(mut self, hours: f64) -> Self {
        if hours.is_finite() && hours > 0.0 {
            self.full_time_hours_per_month = hours;
        }
        self
    }

    /// Hours needed for `offer_count` accounts and `content_units` posts.
    pub fn hours(&self, offer_count: u64, content_units: u64) -> f64 {
        offer_count as f64 * self.params.setup_hours_per_offer
            + content_units as f64 * self.params.manage_hours_per_content_unit
    }

    pub fn cost(&self, offer_count: u64, content_units: u64) -> StaffCost {
        let hours = self.hours(offer_count, content_units);
        StaffCost {
            cost: hours * self.params.hourly_rate,
            hours,
            full_time_equivalents: hours / self.full_time_hours_per_month,
            over_capacity: hours > self.full_time_hours_per_month,
        }
    }

    /// Staffing cost of buying one more account with `content_units_per_offer` posts.
    pub fn marginal_unit_cost(&self, content_units_per_offer: u32) -> f64 {
        self.cost(1, u64::from(content_units_per_offer)).cost
    }
}
