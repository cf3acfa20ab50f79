//! Allocation engine: the entry point used by the API and the CLI.
//!
//! The engine owns the offer catalog and never mutates it. Each call builds
//! its own candidate pool, so a shared `Arc<Engine>` can serve concurrent
//! requests without locking.

use crate::aggregate::{AllocationSummary, ResultAggregator};
use crate::segment::SegmentAllocator;
use crate::splitter::{BudgetSplitter, SegmentOutcome};
use crate::staff_cost::{StaffCost, StaffCostModel, DEFAULT_FULL_TIME_HOURS_PER_MONTH};
use chrono::{DateTime, Utc};
use kol_core::{
    AllocationRecord, Catalog, CatalogParameters, Offer, PlannerResult, SegmentedAllocationRequest,
    SingleAllocationRequest, StaffParams,
};
use serde::Serialize;
use tracing::{info, instrument};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize)]
pub struct SingleAllocationOutcome {
    pub plan_id: Uuid,
    pub records: Vec<AllocationRecord>,
    pub remainder: f64,
    /// Exact staffing cost over the final plan, when staffing was requested.
    pub staff: Option<StaffCost>,
    pub summary: AllocationSummary,
    pub computed_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SegmentedAllocationOutcome {
    pub plan_id: Uuid,
    pub records: Vec<AllocationRecord>,
    pub unused_budget: f64,
    pub unassigned_budget: f64,
    pub segments: Vec<SegmentOutcome>,
    pub staff: Option<StaffCost>,
    pub summary: AllocationSummary,
    pub computed_at: DateTime<Utc>,
}

pub struct Engine {
    catalog: Catalog,
    allocator: SegmentAllocator,
    splitter: BudgetSplitter,
    full_time_hours_per_month: f64,
}

impl Engine {
    /// Build the catalog and the engine. Fails on malformed catalog parameters.
    pub fn initialize(params: &CatalogParameters) -> PlannerResult<Self> {
        let catalog = Catalog::build(params)?;
        Ok(Self::with_catalog(catalog))
    }

    pub fn with_catalog(catalog: Catalog) -> Self {
        Self {
            catalog,
            allocator: SegmentAllocator::new(),
            splitter: BudgetSplitter::new(),
            full_time_hours_per_month: DEFAULT_FULL_TIME_HOURS_PER_MONTH,
        }
    }

    pub fn with_full_time_hours(mut self, hours: f64) -> Self {
        self.full_time_hours_per_month = hours;
        self
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn offers(&self) -> &[Offer] {
        self.catalog.offers()
    }

    fn staff_model(&self, params: Option<&StaffParams>) -> Option<StaffCostModel> {
        params.map(|p| StaffCostModel::new(*p).with_full_time_hours(self.full_time_hours_per_month))
    }

    /// Fill one budget from the offers matching the request's tiers and platforms.
    #[instrument(skip(self, request), fields(
        budget = request.budget,
        content_units = request.content_units_per_offer,
        platforms = request.platforms.len(),
        staffed = request.staff.is_some()
    ))]
    pub fn allocate_single(
        &self,
        request: &SingleAllocationRequest,
    ) -> PlannerResult<SingleAllocationOutcome> {
        request.validate()?;

        let staff_model = self.staff_model(request.staff.as_ref());
        let surcharge = staff_model
            .map(|m| m.marginal_unit_cost(request.content_units_per_offer))
            .unwrap_or(0.0);

        let pool = self.catalog.filter(&request.tiers.tiers(), &request.platforms);
        let allocation = self.allocator.allocate(
            request.budget,
            &pool,
            request.content_units_per_offer,
            surcharge,
        );

        let staff = staff_model.map(|m| exact_staff_cost(&m, &allocation.records));
        let summary = ResultAggregator::summarize(
            request.budget,
            &allocation.records,
            allocation.remaining_budget,
            staff,
        );

        info!(
            offers = allocation.records.len(),
            participants = summary.total_participants,
            reach = summary.total_reach,
            remainder = allocation.remaining_budget,
            "Single allocation complete"
        );

        Ok(SingleAllocationOutcome {
            plan_id: Uuid::new_v4(),
            records: allocation.records,
            remainder: allocation.remaining_budget,
            staff,
            summary,
            computed_at: Utc::now(),
        })
    }

    /// Split the budget across segments and fill each share independently.
    #[instrument(skip(self, request), fields(
        total_budget = request.total_budget,
        segments = request.segments.len(),
        content_units = request.content_units_per_offer,
        staffed = request.staff.is_some()
    ))]
    pub fn allocate_by_segments(
        &self,
        request: &SegmentedAllocationRequest,
    ) -> PlannerResult<SegmentedAllocationOutcome> {
        request.validate()?;

        let staff_model = self.staff_model(request.staff.as_ref());
        let surcharge = staff_model
            .map(|m| m.marginal_unit_cost(request.content_units_per_offer))
            .unwrap_or(0.0);

        let split = self.splitter.allocate(
            &self.catalog,
            request.total_budget,
            &request.segments,
            request.content_units_per_offer,
            &request.platforms,
            surcharge,
        );

        let staff = staff_model.map(|m| exact_staff_cost(&m, &split.records));
        let summary = ResultAggregator::summarize(
            request.total_budget,
            &split.records,
            split.unused_budget,
            staff,
        );

        info!(
            offers = split.records.len(),
            participants = summary.total_participants,
            reach = summary.total_reach,
            unused = split.unused_budget,
            "Segmented allocation complete"
        );

        Ok(SegmentedAllocationOutcome {
            plan_id: Uuid::new_v4(),
            records: split.records,
            unused_budget: split.unused_budget,
            unassigned_budget: split.unassigned_budget,
            segments: split.segments,
            staff,
            summary,
            computed_at: Utc::now(),
        })
    }
}

/// Staffing cost recomputed from the final head-count and content volume.
fn exact_staff_cost(model: &StaffCostModel, records: &[AllocationRecord]) -> StaffCost {
    let offers: u64 = records.iter().map(|r| u64::from(r.participants)).sum();
    let content: u64 = records.iter().map(|r| r.total_content).sum();
    model.cost(offers, content)
}
