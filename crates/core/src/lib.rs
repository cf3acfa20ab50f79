//! Shared types for the KOL budget planner: offers, requests, records,
//! catalog construction, configuration and errors.

#![warn(clippy::unwrap_used)]

pub mod catalog;
pub mod config;
pub mod error;
pub mod types;

pub use catalog::{Catalog, CatalogParameters, PlatformParameters};
pub use config::AppConfig;
pub use error::{PlannerError, PlannerResult};
pub use types::{
    AllocationRecord, Offer, Platform, SegmentSpec, SegmentedAllocationRequest,
    SingleAllocationRequest, StaffParams, Tier, TierSelection,
};
