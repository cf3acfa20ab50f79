//! Numeric roll-up of allocation records for the presentation layer.

use crate::staff_cost::StaffCost;
use kol_core::{AllocationRecord, Platform};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Totals over a group of records.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Subtotal {
    pub key: String,
    pub participants: u64,
    pub content_units: u64,
    pub media_spend: f64,
    pub charged_spend: f64,
    pub reach: f64,
}

impl Subtotal {
    fn keyed(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            ..Default::default()
        }
    }

    fn add(&mut self, record: &AllocationRecord) {
        self.participants += u64::from(record.participants);
        self.content_units += record.total_content;
        self.media_spend += record.total_cost;
        self.charged_spend += record.total_charged;
        self.reach += record.total_reach;
    }
}

/// Where the budget went.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct BudgetBreakdown {
    pub media: f64,
    /// Exact staffing cost over the final plan.
    pub staff_operations: f64,
    pub buffer: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AllocationSummary {
    pub total_participants: u64,
    pub total_content_units: u64,
    pub media_spend: f64,
    /// Media plus marginal staffing as deducted during allocation.
    pub charged_spend: f64,
    pub total_reach: f64,
    pub remainder: f64,
    /// Media spend per 1000 reached users, 0 when nothing was reached.
    pub cost_per_thousand_reach: f64,
    /// Staffing cost as a share of the budget, 0 without staffing or budget.
    pub op_cost_share: f64,
    pub breakdown: BudgetBreakdown,
    /// Empty unless the records carry segment labels.
    pub by_segment: Vec<Subtotal>,
    pub by_platform: Vec<Subtotal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub staff: Option<StaffCost>,
}

impl AllocationSummary {
    /// Nothing could be bought. A normal outcome, not a failure.
    pub fn is_empty(&self) -> bool {
        self.total_participants == 0
    }
}

pub struct ResultAggregator;

impl ResultAggregator {
    pub fn summarize(
        budget: f64,
        records: &[AllocationRecord],
        remainder: f64,
        staff: Option<StaffCost>,
    ) -> AllocationSummary {
        let mut total = Subtotal::keyed("total");
        let mut by_segment: Vec<Subtotal> = Vec::new();
        let mut by_platform: BTreeMap<Platform, Subtotal> = BTreeMap::new();

        for record in records {
            total.add(record);

            by_platform
                .entry(record.offer.platform)
                .or_insert_with(|| Subtotal::keyed(record.offer.platform.as_str()))
                .add(record);

            if let Some(label) = &record.segment_label {
                match by_segment.iter_mut().find(|s| &s.key == label) {
                    Some(subtotal) => subtotal.add(record),
                    None => {
                        let mut subtotal = Subtotal::keyed(label.clone());
                        subtotal.add(record);
                        by_segment.push(subtotal);
                    }
                }
            }
        }

        let staff_operations = staff.map(|s| s.cost).unwrap_or(0.0);
        let cost_per_thousand_reach = if total.reach > 0.0 {
            total.media_spend / total.reach * 1000.0
        } else {
            0.0
        };
        let op_cost_share = if budget > 0.0 {
            staff_operations / budget
        } else {
            0.0
        };

        AllocationSummary {
            total_participants: total.participants,
            total_content_units: total.content_units,
            media_spend: total.media_spend,
            charged_spend: total.charged_spend,
            total_reach: total.reach,
            remainder,
            cost_per_thousand_reach,
            op_cost_share,
            breakdown: BudgetBreakdown {
                media: total.media_spend,
                staff_operations,
                buffer: remainder,
            },
            by_segment,
            by_platform: by_platform.into_values().collect(),
            staff,
        }
    }
}
