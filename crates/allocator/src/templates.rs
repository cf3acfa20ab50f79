//! Named budget-split presets and segment plan construction.
//!
//! Templates assign a percentage to each of the five one-tier segments.
//! [`SegmentPlanBuilder`] turns a template or explicit shares into a
//! validated segment list, optionally deriving one share as the complement
//! of the others.

use kol_core::{PlannerError, PlannerResult, SegmentSpec, Tier};
use serde::Serialize;

/// A named percentage vector over [`Tier::ALL`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SegmentTemplate {
    pub name: &'static str,
    pub description: &'static str,
    pub shares: [f64; 5],
}

pub const TEMPLATES: [SegmentTemplate; 4] = [
    SegmentTemplate {
        name: "balanced",
        description: "Even split across every tier",
        shares: [20.0, 20.0, 20.0, 20.0, 20.0],
    },
    SegmentTemplate {
        name: "mass_seeding",
        description: "Many small creators for volume and authenticity",
        shares: [50.0, 35.0, 15.0, 0.0, 0.0],
    },
    SegmentTemplate {
        name: "awareness",
        description: "Weighted towards large audiences",
        shares: [10.0, 15.0, 20.0, 25.0, 30.0],
    },
    SegmentTemplate {
        name: "micro_focus",
        description: "Micro creators first, light coverage elsewhere",
        shares: [15.0, 45.0, 25.0, 10.0, 5.0],
    },
];

pub fn find_template(name: &str) -> PlannerResult<&'static SegmentTemplate> {
    let wanted = name.trim().to_ascii_lowercase().replace('-', "_");
    TEMPLATES
        .iter()
        .find(|t| t.name == wanted)
        .ok_or_else(|| PlannerError::UnknownTemplate(name.to_string()))
}

impl SegmentTemplate {
    /// One segment per tier, labelled with the tier band. Zero shares are kept.
    pub fn segments(&self) -> Vec<SegmentSpec> {
        Tier::ALL
            .iter()
            .zip(self.shares)
            .map(|(tier, share)| SegmentSpec::new(tier.label(), share, vec![*tier]))
            .collect()
    }
}

#[derive(Debug, Clone)]
enum Share {
    Fixed(f64),
    Complement,
}

/// Builds a segment list at the request boundary.
#[derive(Debug, Clone, Default)]
pub struct SegmentPlanBuilder {
    entries: Vec<(String, Share, Vec<Tier>)>,
}

impl SegmentPlanBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_template(template: &SegmentTemplate) -> Self {
        let mut builder = Self::new();
        for segment in template.segments() {
            builder = builder.segment(segment.label, segment.percentage, segment.tiers);
        }
        builder
    }

    pub fn segment(mut self, label: impl Into<String>, percentage: f64, tiers: Vec<Tier>) -> Self {
        self.entries.push((label.into(), Share::Fixed(percentage), tiers));
        self
    }

    /// A segment whose share is `100 - sum(other shares)`.
    pub fn complement(mut self, label: impl Into<String>, tiers: Vec<Tier>) -> Self {
        self.entries.push((label.into(), Share::Complement, tiers));
        self
    }

    pub fn build(self) -> PlannerResult<Vec<SegmentSpec>> {
        let complements = self
            .entries
            .iter()
            .filter(|(_, share, _)| matches!(share, Share::Complement))
            .count();
        if complements > 1 {
            return Err(PlannerError::invalid(
                "only one segment may take the complement share",
            ));
        }

        let fixed_total: f64 = self
            .entries
            .iter()
            .filter_map(|(_, share, _)| match share {
                Share::Fixed(p) => Some(*p),
                Share::Complement => None,
            })
            .sum();
        if complements == 1 && fixed_total > 100.0 {
            return Err(PlannerError::invalid(format!(
                "fixed shares already total {fixed_total}%, nothing left for the complement"
            )));
        }

        let segments: Vec<SegmentSpec> = self
            .entries
            .into_iter()
            .map(|(label, share, tiers)| {
                let percentage = match share {
                    Share::Fixed(p) => p,
                    Share::Complement => 100.0 - fixed_total,
                };
                SegmentSpec::new(label, percentage, tiers)
            })
            .collect();

        kol_core::types::validate_segments(&segments)?;
        Ok(segments)
    }
}
