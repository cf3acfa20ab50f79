use crate::error::{PlannerError, PlannerResult};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

/// Social platform an influencer offer is bought on.
///
/// Declaration order is catalog order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Platform {
    Instagram,
    Twitter,
    TikTok,
}

impl Platform {
    pub const ALL: [Platform; 3] = [Platform::Instagram, Platform::Twitter, Platform::TikTok];

    pub fn as_str(&self) -> &'static str {
        match self {
            Platform::Instagram => "Instagram",
            Platform::Twitter => "Twitter",
            Platform::TikTok => "TikTok",
        }
    }

    pub fn all() -> BTreeSet<Platform> {
        Self::ALL.into_iter().collect()
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Platform {
    type Err = PlannerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "instagram" | "ig" => Ok(Platform::Instagram),
            "twitter" | "x" => Ok(Platform::Twitter),
            "tiktok" => Ok(Platform::TikTok),
            other => Err(PlannerError::invalid(format!("unknown platform '{other}'"))),
        }
    }
}

/// Audience-size band of an influencer account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tier {
    /// 1K to <10K followers.
    Nano,
    /// 10K to <50K followers.
    Micro,
    /// 50K to <150K followers.
    Mid,
    /// 150K to <500K followers.
    Macro,
    /// 500K followers and up.
    Mega,
}

impl Tier {
    /// Fixed tier order; catalog arrays are index-aligned to it.
    pub const ALL: [Tier; 5] = [Tier::Nano, Tier::Micro, Tier::Mid, Tier::Macro, Tier::Mega];

    pub fn label(&self) -> &'static str {
        match self {
            Tier::Nano => "1K to <10K",
            Tier::Micro => "10K to <50K",
            Tier::Mid => "50K to <150K",
            Tier::Macro => "150K to < 500K",
            Tier::Mega => "500K and up",
        }
    }

    /// Inclusive lower and exclusive upper follower bound (`None` = unbounded).
    pub fn follower_bounds(&self) -> (u64, Option<u64>) {
        match self {
            Tier::Nano => (1_000, Some(10_000)),
            Tier::Micro => (10_000, Some(50_000)),
            Tier::Mid => (50_000, Some(150_000)),
            Tier::Macro => (150_000, Some(500_000)),
            Tier::Mega => (500_000, None),
        }
    }

    pub fn index(&self) -> usize {
        *self as usize
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Tier {
    type Err = PlannerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "nano" => Ok(Tier::Nano),
            "micro" => Ok(Tier::Micro),
            "mid" => Ok(Tier::Mid),
            "macro" => Ok(Tier::Macro),
            "mega" => Ok(Tier::Mega),
            other => Tier::ALL
                .into_iter()
                .find(|t| t.label().eq_ignore_ascii_case(other))
                .ok_or_else(|| PlannerError::invalid(format!("unknown tier '{other}'"))),
        }
    }
}

/// A purchasable (platform, tier) unit. Immutable once the catalog is built.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Offer {
    pub platform: Platform,
    pub tier: Tier,
    /// Nominal audience size of one account in this band.
    pub followers: u64,
    /// Observed share of followers that actually see a post.
    pub reach_rate: f64,
    /// `followers * reach_rate`, cached at build time.
    pub true_reach: f64,
    /// Price of one content placement.
    pub unit_price: f64,
    /// Number of distinct accounts available.
    pub supply: u32,
}

/// How many accounts were bought from one offer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AllocationRecord {
    pub offer: Offer,
    pub participants: u32,
    pub content_units: u32,
    /// `unit_price * content_units`.
    pub pack_cost: f64,
    /// Marginal staffing cost charged per participant (0 without staffing).
    pub unit_surcharge: f64,
    /// Media spend: `participants * pack_cost`.
    pub total_cost: f64,
    /// Deducted from the budget: `participants * (pack_cost + unit_surcharge)`.
    pub total_charged: f64,
    pub total_reach: f64,
    pub total_content: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub segment_label: Option<String>,
}

impl AllocationRecord {
    pub fn new(offer: Offer, participants: u32, content_units: u32, unit_surcharge: f64) -> Self {
        let pack_cost = offer.unit_price * f64::from(content_units);
        let count = f64::from(participants);
        Self {
            offer,
            participants,
            content_units,
            pack_cost,
            unit_surcharge,
            total_cost: count * pack_cost,
            total_charged: count * (pack_cost + unit_surcharge),
            total_reach: count * offer.true_reach,
            total_content: u64::from(participants) * u64::from(content_units),
            segment_label: None,
        }
    }

    pub fn with_segment(mut self, label: impl Into<String>) -> Self {
        self.segment_label = Some(label.into());
        self
    }
}

/// Which tiers a single-budget allocation may buy from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TierSelection {
    /// Every tier.
    MaxReach,
    /// Nano and micro tiers only.
    MassSeeding,
    /// An explicit tier list.
    Tiers(Vec<Tier>),
}

#[allow(clippy::derivable_impls)]
impl Default for TierSelection {
    fn default() -> Self {
        Self::MaxReach
    }
}

impl TierSelection {
    pub fn tiers(&self) -> BTreeSet<Tier> {
        match self {
            TierSelection::MaxReach => Tier::ALL.into_iter().collect(),
            TierSelection::MassSeeding => [Tier::Nano, Tier::Micro].into_iter().collect(),
            TierSelection::Tiers(tiers) => tiers.iter().copied().collect(),
        }
    }
}

impl FromStr for TierSelection {
    type Err = PlannerError;

    /// Accepts `max_reach`, `mass_seeding`, or a comma-separated tier list.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "max_reach" | "all" => Ok(TierSelection::MaxReach),
            "mass_seeding" => Ok(TierSelection::MassSeeding),
            list => list
                .split(',')
                .map(str::parse)
                .collect::<PlannerResult<Vec<Tier>>>()
                .map(TierSelection::Tiers),
        }
    }
}

/// Operational (staffing) parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StaffParams {
    pub hourly_rate: f64,
    /// Hours spent finding and contracting one account.
    pub setup_hours_per_offer: f64,
    /// Hours spent reviewing and reporting one content unit.
    pub manage_hours_per_content_unit: f64,
}

impl StaffParams {
    pub fn validate(&self) -> PlannerResult<()> {
        for (name, value) in [
            ("hourly_rate", self.hourly_rate),
            ("setup_hours_per_offer", self.setup_hours_per_offer),
            ("manage_hours_per_content_unit", self.manage_hours_per_content_unit),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(PlannerError::invalid(format!(
                    "{name} must be a non-negative number, got {value}"
                )));
            }
        }
        Ok(())
    }
}

/// Single-budget allocation request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SingleAllocationRequest {
    pub budget: f64,
    #[serde(default)]
    pub tiers: TierSelection,
    #[serde(default = "Platform::all")]
    pub platforms: BTreeSet<Platform>,
    #[serde(default = "default_content_units")]
    pub content_units_per_offer: u32,
    #[serde(default)]
    pub staff: Option<StaffParams>,
}

impl SingleAllocationRequest {
    pub fn validate(&self) -> PlannerResult<()> {
        validate_common(
            self.budget,
            self.content_units_per_offer,
            &self.platforms,
            self.staff.as_ref(),
        )?;
        if self.tiers.tiers().is_empty() {
            return Err(PlannerError::invalid("tier selection must not be empty"));
        }
        Ok(())
    }
}

/// A named tier group with a share of the total budget.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SegmentSpec {
    pub label: String,
    /// Share of the total budget, 0 to 100.
    pub percentage: f64,
    pub tiers: Vec<Tier>,
}

impl SegmentSpec {
    pub fn new(label: impl Into<String>, percentage: f64, tiers: Vec<Tier>) -> Self {
        Self {
            label: label.into(),
            percentage,
            tiers,
        }
    }

    pub fn sub_budget(&self, total_budget: f64) -> f64 {
        total_budget * self.percentage / 100.0
    }
}

/// Segmented allocation request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SegmentedAllocationRequest {
    pub total_budget: f64,
    pub segments: Vec<SegmentSpec>,
    #[serde(default = "Platform::all")]
    pub platforms: BTreeSet<Platform>,
    #[serde(default = "default_content_units")]
    pub content_units_per_offer: u32,
    #[serde(default)]
    pub staff: Option<StaffParams>,
}

impl SegmentedAllocationRequest {
    /// Checks field ranges and that segment tiers are disjoint.
    ///
    /// The percentage total is not checked here.
    pub fn validate(&self) -> PlannerResult<()> {
        validate_common(
            self.total_budget,
            self.content_units_per_offer,
            &self.platforms,
            self.staff.as_ref(),
        )?;
        validate_segments(&self.segments)
    }
}

/// Label, range and disjointness checks over a segment list.
pub fn validate_segments(segments: &[SegmentSpec]) -> PlannerResult<()> {
    if segments.is_empty() {
        return Err(PlannerError::invalid("at least one segment is required"));
    }
    let mut labels = BTreeSet::new();
    let mut claimed = BTreeSet::new();
    for segment in segments {
        if segment.label.trim().is_empty() {
            return Err(PlannerError::invalid("segment label must not be empty"));
        }
        if !labels.insert(segment.label.as_str()) {
            return Err(PlannerError::invalid(format!(
                "duplicate segment label '{}'",
                segment.label
            )));
        }
        if !segment.percentage.is_finite() || !(0.0..=100.0).contains(&segment.percentage) {
            return Err(PlannerError::invalid(format!(
                "segment '{}' percentage must be within 0..=100, got {}",
                segment.label, segment.percentage
            )));
        }
        if segment.tiers.is_empty() {
            return Err(PlannerError::invalid(format!(
                "segment '{}' has no tiers",
                segment.label
            )));
        }
        for tier in &segment.tiers {
            if !claimed.insert(*tier) {
                return Err(PlannerError::invalid(format!(
                    "tier '{}' is assigned to more than one segment",
                    tier.label()
                )));
            }
        }
    }
    Ok(())
}

fn validate_common(
    budget: f64,
    content_units: u32,
    platforms: &BTreeSet<Platform>,
    staff: Option<&StaffParams>,
) -> PlannerResult<()> {
    if !budget.is_finite() || budget < 0.0 {
        return Err(PlannerError::invalid(format!(
            "budget must be a non-negative number, got {budget}"
        )));
    }
    if content_units == 0 {
        return Err(PlannerError::invalid(
            "content_units_per_offer must be at least 1",
        ));
    }
    if platforms.is_empty() {
        return Err(PlannerError::invalid("at least one platform must be selected"));
    }
    if let Some(staff) = staff {
        staff.validate()?;
    }
    Ok(())
}

fn default_content_units() -> u32 {
    1
}
