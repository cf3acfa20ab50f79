//! Offer catalog: static benchmark parameters turned into structured offers.

use crate::error::{PlannerError, PlannerResult};
use crate::types::{Offer, Platform, Tier};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;
use tracing::info;

/// Benchmark arrays for one platform, index-aligned to [`Tier::ALL`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlatformParameters {
    pub reach: Vec<u64>,
    pub cost_per_content: Vec<f64>,
    pub supply: Vec<u32>,
    pub reach_rate: Vec<f64>,
}

/// Raw catalog input keyed by platform name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CatalogParameters {
    pub platforms: BTreeMap<String, PlatformParameters>,
}

impl CatalogParameters {
    /// Load parameters from a TOML, YAML or JSON file (format by extension).
    pub fn from_file(path: impl AsRef<Path>) -> PlannerResult<Self> {
        let path = path.as_ref();
        let source = config::File::from(path).required(true);
        let params: Self = config::Config::builder()
            .add_source(source)
            .build()?
            .try_deserialize()?;
        info!(path = %path.display(), platforms = params.platforms.len(), "Catalog parameters loaded");
        Ok(params)
    }
}

impl Default for CatalogParameters {
    /// Built-in influencer benchmark table.
    fn default() -> Self {
        let mut platforms = BTreeMap::new();
        platforms.insert(
            Platform::Instagram.to_string(),
            PlatformParameters {
                reach: vec![3258, 21417, 87664, 264830, 2206768],
                cost_per_content: vec![268.22, 443.84, 1140.22, 3315.63, 11059.85],
                supply: vec![246209, 68181, 20454, 9461, 5305],
                reach_rate: vec![0.25, 0.15, 0.10, 0.05, 0.03],
            },
        );
        platforms.insert(
            Platform::Twitter.to_string(),
            PlatformParameters {
                reach: vec![4952, 21765, 85206, 266771, 1838483],
                cost_per_content: vec![131.34, 207.33, 504.2, 1490.99, 4656.37],
                supply: vec![2907, 2062, 896, 552, 279],
                reach_rate: vec![0.15, 0.10, 0.08, 0.05, 0.02],
            },
        );
        platforms.insert(
            Platform::TikTok.to_string(),
            PlatformParameters {
                reach: vec![4373, 25013, 90230, 275338, 2087679],
                cost_per_content: vec![184.57, 335.92, 697.04, 1806.5, 5757.25],
                supply: vec![6233, 7449, 4757, 3746, 2601],
                reach_rate: vec![0.50, 0.30, 0.20, 0.10, 0.05],
            },
        );
        Self { platforms }
    }
}

/// Immutable offer list, ordered by platform then tier.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Catalog {
    offers: Vec<Offer>,
}

impl Catalog {
    /// Validate the parallel arrays and build one offer per (platform, tier).
    pub fn build(params: &CatalogParameters) -> PlannerResult<Self> {
        if params.platforms.is_empty() {
            return Err(PlannerError::Config("catalog has no platforms".to_string()));
        }

        let mut by_platform: BTreeMap<Platform, &PlatformParameters> = BTreeMap::new();
        for (name, data) in &params.platforms {
            let platform: Platform = name
                .parse()
                .map_err(|_| PlannerError::Config(format!("unknown platform '{name}' in catalog")))?;
            if by_platform.insert(platform, data).is_some() {
                return Err(PlannerError::Config(format!(
                    "platform '{platform}' is listed more than once"
                )));
            }
        }

        let mut offers = Vec::with_capacity(by_platform.len() * Tier::ALL.len());
        for (platform, data) in by_platform {
            let lengths = [
                data.reach.len(),
                data.cost_per_content.len(),
                data.supply.len(),
                data.reach_rate.len(),
            ];
            if lengths.iter().any(|&len| len != lengths[0]) {
                return Err(PlannerError::Config(format!(
                    "{platform}: array lengths differ (reach={}, cost_per_content={}, supply={}, reach_rate={})",
                    lengths[0], lengths[1], lengths[2], lengths[3]
                )));
            }
            if lengths[0] != Tier::ALL.len() {
                return Err(PlannerError::Config(format!(
                    "{platform}: expected {} tier entries, got {}",
                    Tier::ALL.len(),
                    lengths[0]
                )));
            }

            for tier in Tier::ALL {
                let i = tier.index();
                let offer = Offer {
                    platform,
                    tier,
                    followers: data.reach[i],
                    reach_rate: data.reach_rate[i],
                    true_reach: data.reach[i] as f64 * data.reach_rate[i],
                    unit_price: data.cost_per_content[i],
                    supply: data.supply[i],
                };
                check_offer(&offer)?;
                offers.push(offer);
            }
        }

        info!(offers = offers.len(), "Offer catalog built");
        Ok(Self { offers })
    }

    pub fn offers(&self) -> &[Offer] {
        &self.offers
    }

    pub fn len(&self) -> usize {
        self.offers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.offers.is_empty()
    }

    pub fn get(&self, platform: Platform, tier: Tier) -> Option<&Offer> {
        self.offers
            .iter()
            .find(|o| o.platform == platform && o.tier == tier)
    }

    /// Eligible offers in catalog order. The result is a private copy.
    pub fn filter(&self, tiers: &BTreeSet<Tier>, platforms: &BTreeSet<Platform>) -> Vec<Offer> {
        self.offers
            .iter()
            .filter(|o| tiers.contains(&o.tier) && platforms.contains(&o.platform))
            .copied()
            .collect()
    }
}

fn check_offer(offer: &Offer) -> PlannerResult<()> {
    let at = format!("{} / {}", offer.platform, offer.tier);
    if offer.followers == 0 {
        return Err(PlannerError::Config(format!("{at}: reach must be positive")));
    }
    if !offer.unit_price.is_finite() || offer.unit_price <= 0.0 {
        return Err(PlannerError::Config(format!(
            "{at}: cost per content must be positive, got {}",
            offer.unit_price
        )));
    }
    if !offer.reach_rate.is_finite() || offer.reach_rate <= 0.0 || offer.reach_rate > 1.0 {
        return Err(PlannerError::Config(format!(
            "{at}: reach rate must be within (0, 1], got {}",
            offer.reach_rate
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_catalog_builds_in_order() {
        let catalog = Catalog::build(&CatalogParameters::default()).unwrap();
        assert_eq!(catalog.len(), 15);

        let order: Vec<(Platform, Tier)> = catalog
            .offers()
            .iter()
            .map(|o| (o.platform, o.tier))
            .collect();
        assert_eq!(order[0], (Platform::Instagram, Tier::Nano));
        assert_eq!(order[4], (Platform::Instagram, Tier::Mega));
        assert_eq!(order[5], (Platform::Twitter, Tier::Nano));
        assert_eq!(order[14], (Platform::TikTok, Tier::Mega));
    }

    #[test]
    fn test_true_reach_is_precomputed() {
        let catalog = Catalog::build(&CatalogParameters::default()).unwrap();
        let tiktok_nano = catalog.get(Platform::TikTok, Tier::Nano).unwrap();
        assert!((tiktok_nano.true_reach - 4373.0 * 0.5).abs() < 1e-9);
        assert!((tiktok_nano.unit_price - 184.57).abs() < 1e-9);
        assert_eq!(tiktok_nano.supply, 6233);
    }

    #[test]
    fn test_mismatched_lengths_rejected() {
        let mut params = CatalogParameters::default();
        if let Some(twitter) = params.platforms.get_mut("Twitter") {
            twitter.supply.pop();
        }
        let err = Catalog::build(&params).unwrap_err();
        assert!(matches!(err, PlannerError::Config(_)));
        assert!(err.to_string().contains("array lengths differ"));
    }

    #[test]
    fn test_wrong_tier_count_rejected() {
        let mut params = CatalogParameters::default();
        if let Some(ig) = params.platforms.get_mut("Instagram") {
            ig.reach.push(10);
            ig.cost_per_content.push(1.0);
            ig.supply.push(1);
            ig.reach_rate.push(0.1);
        }
        assert!(matches!(
            Catalog::build(&params),
            Err(PlannerError::Config(_))
        ));
    }

    #[test]
    fn test_invariants_checked() {
        let mut zero_price = CatalogParameters::default();
        if let Some(ig) = zero_price.platforms.get_mut("Instagram") {
            ig.cost_per_content[2] = 0.0;
        }
        assert!(Catalog::build(&zero_price).is_err());

        let mut bad_rate = CatalogParameters::default();
        if let Some(tt) = bad_rate.platforms.get_mut("TikTok") {
            tt.reach_rate[0] = 1.5;
        }
        assert!(Catalog::build(&bad_rate).is_err());

        let mut unknown = CatalogParameters::default();
        let data = unknown.platforms["Twitter"].clone();
        unknown.platforms.insert("MySpace".to_string(), data);
        assert!(Catalog::build(&unknown).is_err());

        let empty = CatalogParameters {
            platforms: BTreeMap::new(),
        };
        assert!(Catalog::build(&empty).is_err());
    }

    #[test]
    fn test_zero_supply_is_allowed() {
        let mut params = CatalogParameters::default();
        if let Some(ig) = params.platforms.get_mut("Instagram") {
            ig.supply[4] = 0;
        }
        let catalog = Catalog::build(&params).unwrap();
        assert_eq!(catalog.get(Platform::Instagram, Tier::Mega).unwrap().supply, 0);
    }

    #[test]
    fn test_filter_keeps_catalog_order() {
        let catalog = Catalog::build(&CatalogParameters::default()).unwrap();
        let tiers: BTreeSet<Tier> = [Tier::Micro, Tier::Nano].into_iter().collect();
        let platforms: BTreeSet<Platform> = [Platform::TikTok, Platform::Instagram].into_iter().collect();
        let subset = catalog.filter(&tiers, &platforms);
        let order: Vec<(Platform, Tier)> = subset.iter().map(|o| (o.platform, o.tier)).collect();
        assert_eq!(
            order,
            vec![
                (Platform::Instagram, Tier::Nano),
                (Platform::Instagram, Tier::Micro),
                (Platform::TikTok, Tier::Nano),
                (Platform::TikTok, Tier::Micro),
            ]
        );
    }

    #[test]
    fn test_parameters_load_from_json_file() {
        let path = std::env::temp_dir().join(format!("kol-catalog-{}.json", std::process::id()));
        let json = serde_json::to_string(&CatalogParameters::default()).unwrap();
        std::fs::write(&path, json).unwrap();

        let loaded = CatalogParameters::from_file(&path).unwrap();
        let _ = std::fs::remove_file(&path);

        let catalog = Catalog::build(&loaded).unwrap();
        assert_eq!(catalog.len(), 15);
        let ig_mid = catalog.get(Platform::Instagram, Tier::Mid).unwrap();
        assert!((ig_mid.unit_price - 1140.22).abs() < 1e-9);
    }

    #[test]
    fn test_parameters_load_from_toml_with_any_key_case() {
        let path = std::env::temp_dir().join(format!("kol-catalog-{}.toml", std::process::id()));
        let toml = r#"
[instagram]
reach = [3258, 21417, 87664, 264830, 2206768]
cost_per_content = [268.22, 443.84, 1140.22, 3315.63, 11059.85]
supply = [246209, 68181, 20454, 9461, 5305]
reach_rate = [0.25, 0.15, 0.10, 0.05, 0.03]

[TikTok]
reach = [4373, 25013, 90230, 275338, 2087679]
cost_per_content = [184.57, 335.92, 697.04, 1806.5, 5757.25]
supply = [6233, 7449, 4757, 3746, 2601]
reach_rate = [0.50, 0.30, 0.20, 0.10, 0.05]
"#;
        std::fs::write(&path, toml).unwrap();

        let loaded = CatalogParameters::from_file(&path).unwrap();
        let _ = std::fs::remove_file(&path);

        let catalog = Catalog::build(&loaded).unwrap();
        assert_eq!(catalog.len(), 10);
        assert!(catalog.get(Platform::Twitter, Tier::Nano).is_none());
        let tt_mid = catalog.get(Platform::TikTok, Tier::Mid).unwrap();
        assert!((tt_mid.unit_price - 697.04).abs() < 1e-9);
        assert_eq!(tt_mid.supply, 4757);
        let ig_nano = catalog.get(Platform::Instagram, Tier::Nano).unwrap();
        assert!((ig_nano.reach_rate - 0.25).abs() < 1e-12);
    }
}
