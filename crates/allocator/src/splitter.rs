//! Splits a total budget into per-segment sub-budgets and fills each one.

use crate::segment::SegmentAllocator;
use kol_core::{AllocationRecord, Catalog, Platform, SegmentSpec};
use serde::Serialize;
use std::collections::BTreeSet;
use tracing::{info, warn};

/// Per-segment result of a split allocation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SegmentOutcome {
    pub label: String,
    pub percentage: f64,
    pub sub_budget: f64,
    /// Media plus marginal staffing charged against the sub-budget.
    pub spent: f64,
    pub unused: f64,
    pub participants: u64,
    pub records: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SplitAllocation {
    /// Records of every segment, in segment order, tagged with the segment label.
    pub records: Vec<AllocationRecord>,
    /// Unspent sub-budgets plus any share not assigned to a segment.
    pub unused_budget: f64,
    /// Part of the total not covered by segment percentages (sum below 100).
    pub unassigned_budget: f64,
    pub segments: Vec<SegmentOutcome>,
}

pub struct BudgetSplitter {
    allocator: SegmentAllocator,
}

impl BudgetSplitter {
    pub fn new() -> Self {
        Self {
            allocator: SegmentAllocator::new(),
        }
    }

    /// Allocate `total_budget` across `segments`.
    ///
    /// Segment tier sets are expected to be disjoint so that no offer's
    /// supply is shared between segments.
    pub fn allocate(
        &self,
        catalog: &Catalog,
        total_budget: f64,
        segments: &[SegmentSpec],
        content_units_per_offer: u32,
        platforms: &BTreeSet<Platform>,
        operational_unit_cost: f64,
    ) -> SplitAllocation {
        let percentage_total: f64 = segments.iter().map(|s| s.percentage).sum();
        if percentage_total > 100.0 + 1e-9 {
            warn!(percentage_total, "Segment percentages exceed 100; the plan may overspend");
        } else if percentage_total < 100.0 - 1e-9 {
            warn!(percentage_total, "Segment percentages sum below 100");
        }

        let mut records = Vec::new();
        let mut outcomes = Vec::with_capacity(segments.len());
        let mut unused_budget = 0.0;
        let mut assigned = 0.0;

        for segment in segments {
            let sub_budget = segment.sub_budget(total_budget);
            assigned += sub_budget;

            let tiers: BTreeSet<_> = segment.tiers.iter().copied().collect();
            let pool = catalog.filter(&tiers, platforms);
            let allocation =
                self.allocator
                    .allocate(sub_budget, &pool, content_units_per_offer, operational_unit_cost);

            let unused = allocation.remaining_budget.max(0.0);
            unused_budget += unused;

            let participants = allocation
                .records
                .iter()
                .map(|r| u64::from(r.participants))
                .sum();
            if allocation.records.is_empty() && sub_budget > 0.0 {
                info!(
                    segment = %segment.label,
                    sub_budget,
                    candidates = pool.len(),
                    "Segment has no affordable offer"
                );
            }

            outcomes.push(SegmentOutcome {
                label: segment.label.clone(),
                percentage: segment.percentage,
                sub_budget,
                spent: allocation.spent(sub_budget),
                unused,
                participants,
                records: allocation.records.len(),
            });
            records.extend(
                allocation
                    .records
                    .into_iter()
                    .map(|r| r.with_segment(segment.label.clone())),
            );
        }

        let unassigned_budget = (total_budget - assigned).max(0.0);
        unused_budget += unassigned_budget;

        SplitAllocation {
            records,
            unused_budget,
            unassigned_budget,
            segments: outcomes,
        }
    }
}

impl Default for BudgetSplitter {
    fn default() -> Self {
        Self::new()
    }
}
