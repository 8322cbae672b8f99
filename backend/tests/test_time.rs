//! Tests for the simulation clock: phases, priorities and SimTime

use firm_control_core_rs::{Phase, Priority, SimTime};

#[test]
fn test_start_is_day_zero_dawn() {
    let start = SimTime::start();
    assert_eq!(start.day, 0);
    assert_eq!(start.phase, Phase::Dawn);
}

#[test]
fn test_phases_run_in_fixed_order() {
    let order = [
        Phase::Dawn,
        Phase::Think,
        Phase::PrepareToTrade,
        Phase::Trade,
        Phase::Production,
        Phase::AdjustPrices,
        Phase::CleanData,
        Phase::Final,
    ];
    assert_eq!(Phase::ALL, order);
    for pair in order.windows(2) {
        assert!(pair[0] < pair[1]);
    }
}

#[test]
fn test_priorities_order_within_phase() {
    assert!(Priority::BeforeStandard < Priority::Standard);
    assert!(Priority::Standard < Priority::AfterStandard);
    assert!(Priority::AfterStandard < Priority::Final);
}

#[test]
fn test_next_occurrence_today_or_tomorrow() {
    let now = SimTime::new(4, Phase::Production);

    // later phases happen today
    assert_eq!(
        now.next_occurrence(Phase::AdjustPrices),
        SimTime::new(4, Phase::AdjustPrices)
    );
    // the current phase counts as not elapsed
    assert_eq!(
        now.next_occurrence(Phase::Production),
        SimTime::new(4, Phase::Production)
    );
    // earlier phases roll over
    assert_eq!(now.next_occurrence(Phase::Dawn), SimTime::new(5, Phase::Dawn));
}

#[test]
fn test_days_later() {
    let now = SimTime::new(10, Phase::Final);
    assert_eq!(now.days_later(1, Phase::Dawn), SimTime::new(11, Phase::Dawn));
    assert_eq!(now.days_later(7, Phase::Think), SimTime::new(17, Phase::Think));
}

#[test]
fn test_day_dominates_phase() {
    assert!(SimTime::new(1, Phase::Final) < SimTime::new(2, Phase::Dawn));
    assert!(SimTime::new(2, Phase::Dawn) < SimTime::new(2, Phase::Think));
}

#[test]
fn test_display() {
    assert_eq!(
        SimTime::new(3, Phase::AdjustPrices).to_string(),
        "day 3 (adjust_prices)"
    );
}
