//! Greedy reach-per-dollar budget filling for one pool of offers.
//!
//! Offers are ranked by `true_reach / charged_unit` and bought in that order,
//! each up to its supply cap or what the remaining budget affords. This is a
//! greedy approximation of a bounded knapsack, not an optimal solver: a
//! high-ROI offer that leaves an awkward remainder is still taken first.

use kol_core::{AllocationRecord, Offer};
use serde::Serialize;
use tracing::{debug, instrument};

/// Result of filling one budget.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SegmentAllocation {
    /// Purchased offers in ROI order. Offers with zero participants are omitted.
    pub records: Vec<AllocationRecord>,
    pub remaining_budget: f64,
}

impl SegmentAllocation {
    fn untouched(budget: f64) -> Self {
        Self {
            records: Vec::new(),
            remaining_budget: budget,
        }
    }

    pub fn spent(&self, budget: f64) -> f64 {
        budget - self.remaining_budget
    }
}

/// Call-scoped ranking entry; the caller's offers are never modified.
#[derive(Debug, Clone, Copy)]
struct Candidate {
    offer: Offer,
    charged_unit: f64,
    roi: f64,
}

pub struct SegmentAllocator {
    // Stateless; every call owns its working set.
}

impl SegmentAllocator {
    pub fn new() -> Self {
        Self {}
    }

    /// Fill `budget` from `offers`.
    ///
    /// `operational_unit_cost` is added to every participant's pack cost
    /// before ranking, affordability and the supply cap are evaluated.
    #[instrument(skip(self, offers), fields(candidates = offers.len()))]
    pub fn allocate(
        &self,
        budget: f64,
        offers: &[Offer],
        content_units_per_offer: u32,
        operational_unit_cost: f64,
    ) -> SegmentAllocation {
        if budget <= 0.0 || offers.is_empty() || content_units_per_offer == 0 {
            return SegmentAllocation::untouched(budget);
        }

        let units = f64::from(content_units_per_offer);
        let mut ranked: Vec<Candidate> = offers
            .iter()
            .map(|offer| {
                let charged_unit = offer.unit_price * units + operational_unit_cost;
                Candidate {
                    offer: *offer,
                    charged_unit,
                    roi: offer.true_reach / charged_unit,
                }
            })
            .collect();
        // Stable: equal ROI keeps catalog order.
        ranked.sort_by(|a, b| b.roi.total_cmp(&a.roi));

        let mut records = Vec::new();
        let mut remaining = budget;
        for candidate in &ranked {
            if remaining <= 0.0 {
                break;
            }

            let participants = affordable(remaining, candidate.charged_unit, candidate.offer.supply);
            if participants == 0 {
                // A cheaper offer further down may still fit.
                continue;
            }

            let record = AllocationRecord::new(
                candidate.offer,
                participants,
                content_units_per_offer,
                operational_unit_cost,
            );
            remaining = (remaining - record.total_charged).max(0.0);

            debug!(
                platform = %candidate.offer.platform,
                tier = %candidate.offer.tier,
                roi = candidate.roi,
                participants,
                charged = record.total_charged,
                remaining,
                "Offer allocated"
            );
            records.push(record);
        }

        SegmentAllocation {
            records,
            remaining_budget: remaining,
        }
    }
}

impl Default for SegmentAllocator {
    fn default() -> Self {
        Self::new()
    }
}

/// `min(floor(remaining / charged_unit), supply)`.
fn affordable(remaining: f64, charged_unit: f64, supply: u32) -> u32 {
    if charged_unit <= 0.0 || !charged_unit.is_finite() {
        return 0;
    }
    let count = (remaining / charged_unit).floor();
    if count >= f64::from(supply) {
        supply
    } else if count >= 0.0 {
        count as u32
    } else {
        0
    }
}
