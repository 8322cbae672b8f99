//! End-to-end buyer runs

use firm_control_core_rs::inventory::InventoryLevel;
use firm_control_core_rs::scenario::{
    BuyerConfig, BuyerScenario, ConfigError, ScenarioError, StickinessTuning,
};
use firm_control_core_rs::ControlEvent;

#[test]
fn test_stock_settles_at_target_for_several_demands() {
    for demand in [3u64, 4, 6] {
        let config = BuyerConfig {
            daily_demand: demand,
            ..Default::default()
        };
        let target = config.stock_target();
        let mut buyer = BuyerScenario::new(config).unwrap();
        let summary = buyer.run().unwrap();

        assert_eq!(summary.days, 3000);
        assert_eq!(summary.stock_target, target);
        assert!(
            (summary.tail_average_inflow - demand as f64).abs() <= 0.1,
            "demand {}: inflow {}",
            demand,
            summary.tail_average_inflow
        );
        assert!(
            (summary.tail_average_stock - target).abs() <= 1.0,
            "demand {}: stock {}",
            demand,
            summary.tail_average_stock
        );
    }
}

#[test]
fn test_price_settles_where_supply_meets_demand() {
    let mut buyer = BuyerScenario::new(BuyerConfig::default()).unwrap();
    buyer.run().unwrap();
    // 4 units a day need a price of 14
    let tail = &buyer.trajectory()[2700..];
    let average_price = tail.iter().map(|d| d.price as f64).sum::<f64>() / tail.len() as f64;
    assert!((average_price - 14.0).abs() <= 1.0, "price {}", average_price);
}

#[test]
fn test_too_much_stock_stops_purchases() {
    let mut buyer = BuyerScenario::new(BuyerConfig::default()).unwrap();
    buyer.run().unwrap();
    // inflow bought on a day is only possible if the stock after the
    // previous production was not too much
    let trajectory = buyer.trajectory();
    for pair in trajectory.windows(2) {
        if pair[0].level == Some(InventoryLevel::TooMuch) {
            assert_eq!(pair[1].inflow, 0, "bought on day {}", pair[1].day);
        }
    }
}

#[test]
fn test_stock_never_negative_and_consumption_bounded() {
    let mut buyer = BuyerScenario::new(BuyerConfig {
        days: 500,
        daily_demand: 6,
        ..Default::default()
    })
    .unwrap();
    buyer.run().unwrap();
    for day in buyer.trajectory() {
        assert!(day.consumed <= 6);
        assert!(day.price >= 0);
        assert!(day.flow_target >= 0.0);
    }
}

#[test]
fn test_turn_off_runs_stock_down() {
    let mut buyer = BuyerScenario::new(BuyerConfig::default()).unwrap();
    buyer.run_until(499).unwrap();
    buyer.turn_off().unwrap();
    let frozen_price = buyer.price();
    buyer.run_until(599).unwrap();

    let after = &buyer.trajectory()[500..];
    assert!(after.iter().all(|d| d.inflow == 0));
    assert!(after.iter().all(|d| d.price == frozen_price));
    assert_eq!(buyer.stock(), 0);
    assert!(buyer.event_log().events_of_type("TurnedOff").len() == 1);
    assert!(matches!(buyer.turn_off(), Err(ScenarioError::Inventory(_))));
}

#[test]
fn test_price_events_match_trajectory() {
    let mut buyer = BuyerScenario::new(BuyerConfig {
        days: 300,
        ..Default::default()
    })
    .unwrap();
    buyer.run().unwrap();
    let trajectory = buyer.trajectory();
    for event in buyer.event_log().events_of_type("PriceChanged") {
        if let ControlEvent::PriceChanged {
            day, new_price, ..
        } = event
        {
            assert_eq!(trajectory[*day].price, *new_price);
        }
    }
}

#[test]
fn test_stickiness_tuner_keeps_speed_in_range() {
    let mut buyer = BuyerScenario::new(BuyerConfig {
        days: 2000,
        stickiness_tuning: Some(StickinessTuning {
            window: 50,
            step: 1,
            max_speed: 4,
        }),
        ..Default::default()
    })
    .unwrap();
    let summary = buyer.run().unwrap();
    assert!(summary.controller_speed <= 4);
    assert_eq!(buyer.cascade().master().speed(), buyer.cascade().slave().speed());
    assert!(summary.final_stock < 100);
}

#[test]
fn test_invalid_config_rejected() {
    let result = BuyerScenario::new(BuyerConfig {
        daily_demand: 0,
        ..Default::default()
    });
    assert!(matches!(
        result,
        Err(ScenarioError::Config(ConfigError::InvalidField {
            field: "daily_demand",
            ..
        }))
    ));
}
