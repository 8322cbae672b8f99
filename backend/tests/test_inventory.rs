//! Inventory rating across policies

use firm_control_core_rs::inventory::{
    ConsumerNeed, InventoryControl, InventoryError, InventoryLevel, InventoryTargetPolicy,
};
use proptest::prelude::*;

fn policy_strategy() -> impl Strategy<Value = InventoryTargetPolicy> {
    prop_oneof![
        (0u64..50, 1.0f64..4.0).prop_map(|(target, multiplier)| {
            InventoryTargetPolicy::Fixed { target, multiplier }
        }),
        Just(InventoryTargetPolicy::Simple),
        (0.0f64..10.0).prop_map(|days_of_buffer| InventoryTargetPolicy::DailyNeed {
            days_of_buffer
        }),
    ]
}

fn consumers_strategy() -> impl Strategy<Value = Vec<ConsumerNeed>> {
    prop::collection::vec(
        (0u64..10, 0.0f64..14.0).prop_map(|(per_run, runs)| ConsumerNeed::new(per_run, runs)),
        0..4,
    )
}

proptest! {
    /// More stock never rates as more urgent
    #[test]
    fn prop_rating_monotone_in_stock(
        policy in policy_strategy(),
        consumers in consumers_strategy(),
        stock in 0u64..200,
        extra in 0u64..50,
    ) {
        let mut control = InventoryControl::new(policy);
        control.update_consumers(consumers).unwrap();
        control.inventory_changed(stock);
        let low = control.rate_current_level().unwrap();
        control.inventory_changed(stock + extra);
        let high = control.rate_current_level().unwrap();
        prop_assert!(low <= high);
    }

    /// Acquisition continues exactly while the level is at most acceptable
    #[test]
    fn prop_acquire_iff_not_too_much(
        policy in policy_strategy(),
        consumers in consumers_strategy(),
        stock in 0u64..200,
    ) {
        let mut control = InventoryControl::new(policy);
        control.update_consumers(consumers).unwrap();
        let acquire = control.inventory_changed(stock);
        let level = control.rate_current_level().unwrap();
        prop_assert_eq!(acquire, level <= InventoryLevel::Acceptable);
    }

    /// An acceptable stock has no gap, an excess never reads as missing units
    #[test]
    fn prop_gap_zero_when_acceptable(
        policy in policy_strategy(),
        consumers in consumers_strategy(),
        stock in 0u64..200,
    ) {
        let mut control = InventoryControl::new(policy);
        control.update_consumers(consumers).unwrap();
        control.inventory_changed(stock);
        let gap = control.estimate_demand_gap();
        match control.rate_current_level().unwrap() {
            InventoryLevel::Acceptable => prop_assert_eq!(gap, 0),
            InventoryLevel::TooMuch => prop_assert!(gap >= 0),
            _ => {}
        }
    }
}

#[test]
fn test_daily_need_levels() {
    let mut control = InventoryControl::new(InventoryTargetPolicy::daily_need(2.0).unwrap());
    // 4 units a day in daily runs: target 8, danger 4, too much from 12
    control
        .update_consumers(vec![ConsumerNeed::new(4, 7.0)])
        .unwrap();
    assert_eq!(control.target().target, 8.0);

    let rate = |control: &mut InventoryControl, stock| {
        control.inventory_changed(stock);
        control.rate_current_level().unwrap()
    };
    assert_eq!(rate(&mut control, 3), InventoryLevel::Danger);
    assert_eq!(rate(&mut control, 4), InventoryLevel::Barely);
    assert_eq!(rate(&mut control, 8), InventoryLevel::Acceptable);
    assert_eq!(rate(&mut control, 11), InventoryLevel::Acceptable);
    assert_eq!(rate(&mut control, 12), InventoryLevel::TooMuch);
}

#[test]
fn test_daily_need_danger_threshold_is_whole_units() {
    let mut control = InventoryControl::new(InventoryTargetPolicy::daily_need(1.0).unwrap());
    // 17.5 units a week: target 2.5, danger below min(5, 3.5) rounded down
    control
        .update_consumers(vec![ConsumerNeed::new(5, 3.5)])
        .unwrap();
    assert_eq!(control.target().target, 2.5);
    assert_eq!(control.target().danger, 3.0);

    control.inventory_changed(2);
    assert_eq!(control.rate_current_level(), Some(InventoryLevel::Danger));
    control.inventory_changed(3);
    assert_eq!(control.rate_current_level(), Some(InventoryLevel::Acceptable));
}

#[test]
fn test_daily_need_without_consumers_is_too_much() {
    let mut control = InventoryControl::new(InventoryTargetPolicy::daily_need(3.0).unwrap());
    assert!(!control.inventory_changed(0));
    assert_eq!(control.rate_current_level(), Some(InventoryLevel::TooMuch));
}

#[test]
fn test_fixed_policy_gap() {
    let mut control = InventoryControl::new(InventoryTargetPolicy::fixed(10, 2.0).unwrap());
    control.inventory_changed(6);
    assert_eq!(control.estimate_demand_gap(), -4);
    control.inventory_changed(15);
    assert_eq!(control.estimate_demand_gap(), 0);
    control.inventory_changed(26);
    assert_eq!(control.estimate_demand_gap(), 6);
}

#[test]
fn test_simple_policy_uses_run_sizes() {
    let mut control = InventoryControl::new(InventoryTargetPolicy::Simple);
    control
        .update_consumers(vec![ConsumerNeed::new(2, 1.0), ConsumerNeed::new(3, 0.5)])
        .unwrap();
    assert_eq!(control.target().target, 10.0);
    control.inventory_changed(4);
    assert_eq!(control.rate_current_level(), Some(InventoryLevel::Danger));
    assert_eq!(control.estimate_demand_gap(), -6);
}

#[test]
fn test_invalid_policies_rejected() {
    assert_eq!(
        InventoryTargetPolicy::fixed(10, 0.5),
        Err(InventoryError::MultiplierBelowOne(0.5))
    );
    assert!(InventoryTargetPolicy::daily_need(-1.0).is_err());
    assert!(InventoryTargetPolicy::daily_need(f64::INFINITY).is_err());
}

#[test]
fn test_turn_off_is_final() {
    let mut control = InventoryControl::new(InventoryTargetPolicy::fixed(10, 1.5).unwrap());
    control.turn_off().unwrap();
    assert!(!control.is_active());
    assert!(!control.inventory_changed(0));
    assert_eq!(control.turn_off(), Err(InventoryError::AlreadyTurnedOff));
}
