//! Reach-per-dollar budget allocation over the influencer offer catalog:
//! greedy segment filling, budget splitting, staffing cost and result roll-ups.

#![warn(clippy::unwrap_used)]

pub mod aggregate;
pub mod engine;
pub mod segment;
pub mod splitter;
pub mod staff_cost;
pub mod templates;

pub use aggregate::{AllocationSummary, ResultAggregator};
pub use engine::{Engine, SegmentedAllocationOutcome, SingleAllocationOutcome};
pub use segment::{SegmentAllocation, SegmentAllocator};
pub use splitter::{BudgetSplitter, SegmentOutcome, SplitAllocation};
pub use staff_cost::{StaffCost, StaffCostModel};
pub use templates::{find_template, SegmentPlanBuilder, SegmentTemplate, TEMPLATES};
