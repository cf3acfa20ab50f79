//! End-to-end allocation flow over the built-in benchmark catalog.

#[cfg(test)]
mod tests {
    use kol_allocator::{find_template, Engine, SegmentPlanBuilder};
    use kol_core::{
        CatalogParameters, Platform, PlatformParameters, SegmentSpec, SegmentedAllocationRequest,
        SingleAllocationRequest, StaffParams, Tier, TierSelection,
    };
    use std::collections::BTreeMap;
    use std::sync::Arc;

    fn engine() -> Engine {
        Engine::initialize(&CatalogParameters::default()).unwrap()
    }

    fn single(budget: f64, tiers: TierSelection, content: u32, staff: Option<StaffParams>) -> SingleAllocationRequest {
        SingleAllocationRequest {
            budget,
            tiers,
            platforms: Platform::all(),
            content_units_per_offer: content,
            staff,
        }
    }

    fn default_staff() -> StaffParams {
        StaffParams {
            hourly_rate: 20.0,
            setup_hours_per_offer: 2.0,
            manage_hours_per_content_unit: 1.5,
        }
    }

    /// Two offers: $100 / reach 1000 / supply 5 (ROI 10) and $50 / reach 400 / supply 10 (ROI 8).
    fn two_offer_engine() -> Engine {
        let mut platforms = BTreeMap::new();
        platforms.insert(
            "Instagram".to_string(),
            PlatformParameters {
                reach: vec![1000, 400, 1, 1, 1],
                cost_per_content: vec![100.0, 50.0, 1e9, 1e9, 1e9],
                supply: vec![5, 10, 0, 0, 0],
                reach_rate: vec![1.0, 1.0, 1.0, 1.0, 1.0],
            },
        );
        Engine::initialize(&CatalogParameters { platforms }).unwrap()
    }

    #[test]
    fn test_two_offer_fill() {
        let outcome = two_offer_engine()
            .allocate_single(&single(700.0, TierSelection::MaxReach, 1, None))
            .unwrap();

        assert_eq!(outcome.records.len(), 2);
        assert_eq!(outcome.records[0].participants, 5);
        assert!((outcome.records[0].total_cost - 500.0).abs() < 1e-9);
        assert_eq!(outcome.records[1].participants, 4);
        assert!((outcome.records[1].total_cost - 200.0).abs() < 1e-9);
        assert!((outcome.summary.media_spend - 700.0).abs() < 1e-9);
        assert!((outcome.summary.total_reach - 6600.0).abs() < 1e-9);
        assert!(outcome.remainder.abs() < 1e-9);
    }

    #[test]
    fn test_budget_below_cheapest_pack() {
        let outcome = two_offer_engine()
            .allocate_single(&single(30.0, TierSelection::MaxReach, 1, None))
            .unwrap();
        assert!(outcome.records.is_empty());
        assert!(outcome.summary.is_empty());
        assert!((outcome.remainder - 30.0).abs() < 1e-9);
    }

    #[test]
    fn test_unaffordable_segment_goes_unused() {
        let request = SegmentedAllocationRequest {
            total_budget: 1000.0,
            segments: vec![
                SegmentSpec::new("A", 60.0, vec![Tier::Nano, Tier::Micro]),
                SegmentSpec::new("B", 40.0, vec![Tier::Mid, Tier::Macro, Tier::Mega]),
            ],
            platforms: Platform::all(),
            content_units_per_offer: 1,
            staff: None,
        };
        let outcome = two_offer_engine().allocate_by_segments(&request).unwrap();

        // A: 5 x $100 then 2 x $50 = $600.
        assert_eq!(outcome.segments[0].participants, 7);
        assert!(outcome.segments[0].unused.abs() < 1e-9);
        assert_eq!(outcome.segments[1].participants, 0);
        assert!((outcome.unused_budget - 400.0).abs() < 1e-9);
    }

    #[test]
    fn test_properties_over_budget_grid() {
        let e = engine();
        for budget in [0.0, 150.0, 1_000.0, 22_000.0, 250_000.0, 5_000_000.0] {
            for tiers in [TierSelection::MaxReach, TierSelection::MassSeeding] {
                for content in [1, 3, 5] {
                    for staff in [None, Some(default_staff())] {
                        let request = single(budget, tiers.clone(), content, staff);
                        let outcome = e.allocate_single(&request).unwrap();

                        let charged: f64 = outcome.records.iter().map(|r| r.total_charged).sum();
                        assert!(charged <= budget + 1e-6, "overspent at {budget}");
                        assert!((charged + outcome.remainder - budget).abs() < 1e-6);
                        for record in &outcome.records {
                            assert!(record.participants >= 1);
                            assert!(record.participants <= record.offer.supply);
                            if staff.is_none() {
                                assert_eq!(record.total_charged, record.total_cost);
                            }
                        }

                        let again = e.allocate_single(&request).unwrap();
                        assert_eq!(outcome.records, again.records);
                    }
                }
            }
        }
    }

    #[test]
    fn test_large_budget_exhausts_supply() {
        let outcome = engine()
            .allocate_single(&single(1e12, TierSelection::MaxReach, 1, None))
            .unwrap();
        assert_eq!(outcome.records.len(), 15);
        for record in &outcome.records {
            assert_eq!(record.participants, record.offer.supply);
        }
    }

    #[test]
    fn test_staff_cost_reported_for_final_plan() {
        let outcome = engine()
            .allocate_single(&single(22_000.0, TierSelection::MassSeeding, 2, Some(default_staff())))
            .unwrap();
        let staff = outcome.staff.unwrap();
        let summary = &outcome.summary;
        let expected_hours =
            summary.total_participants as f64 * 2.0 + summary.total_content_units as f64 * 1.5;
        assert!((staff.hours - expected_hours).abs() < 1e-9);
        assert!((summary.breakdown.staff_operations - staff.cost).abs() < 1e-9);
        assert!((summary.breakdown.buffer - outcome.remainder).abs() < 1e-9);
        assert!((summary.op_cost_share - staff.cost / 22_000.0).abs() < 1e-12);
    }

    #[test]
    fn test_template_split_conserves_budget() {
        let e = engine();
        for template in ["balanced", "mass_seeding", "awareness", "micro_focus"] {
            let segments = SegmentPlanBuilder::from_template(find_template(template).unwrap())
                .build()
                .unwrap();
            let request = SegmentedAllocationRequest {
                total_budget: 100_000.0,
                segments,
                platforms: Platform::all(),
                content_units_per_offer: 1,
                staff: Some(default_staff()),
            };
            let outcome = e.allocate_by_segments(&request).unwrap();

            let sub_total: f64 = outcome.segments.iter().map(|s| s.sub_budget).sum();
            assert!((sub_total - 100_000.0).abs() < 1e-6);
            assert_eq!(outcome.unassigned_budget, 0.0);

            let charged: f64 = outcome.records.iter().map(|r| r.total_charged).sum();
            assert!((charged + outcome.unused_budget - 100_000.0).abs() < 1e-6);

            for segment in &outcome.segments {
                assert!(segment.spent <= segment.sub_budget + 1e-6);
            }
        }
    }

    #[test]
    fn test_complement_segment_plan() {
        let segments = SegmentPlanBuilder::new()
            .segment("nano", 40.0, vec![Tier::Nano])
            .segment("micro", 35.0, vec![Tier::Micro])
            .complement("upper", vec![Tier::Mid, Tier::Macro, Tier::Mega])
            .build()
            .unwrap();
        let request = SegmentedAllocationRequest {
            total_budget: 40_000.0,
            segments,
            platforms: [Platform::TikTok, Platform::Twitter].into_iter().collect(),
            content_units_per_offer: 1,
            staff: None,
        };
        let outcome = engine().allocate_by_segments(&request).unwrap();
        assert!((outcome.segments[2].sub_budget - 10_000.0).abs() < 1e-9);
        assert!(outcome
            .records
            .iter()
            .all(|r| r.offer.platform != Platform::Instagram));
    }

    #[test]
    fn test_shared_engine_across_threads() {
        let e = Arc::new(engine());
        let expected = e
            .allocate_single(&single(50_000.0, TierSelection::MaxReach, 2, Some(default_staff())))
            .unwrap()
            .records;

        let handles: Vec<_> = (0..4)
            .map(|_| {
                let e = Arc::clone(&e);
                std::thread::spawn(move || {
                    e.allocate_single(&single(50_000.0, TierSelection::MaxReach, 2, Some(default_staff())))
                        .unwrap()
                        .records
                })
            })
            .collect();

        for handle in handles {
            assert_eq!(handle.join().unwrap(), expected);
        }
    }
}
