//! Wage targeter against a stepwise labor supply

use firm_control_core_rs::controller::PidGains;
use firm_control_core_rs::scheduler::{AgendaRequest, RecordingAgenda};
use firm_control_core_rs::workforce::{
    HeadcountOracle, PidTargeter, WageSetter, WorkforceTargeter,
};
use firm_control_core_rs::{Phase, PhaseScheduler, SimTime};

/// Hires `(wage - 11) / 2` workers once the wage reaches 13
struct LaborMarket {
    wage: i64,
}

impl LaborMarket {
    fn supply(&self) -> u32 {
        if self.wage < 13 {
            0
        } else {
            ((self.wage - 11) / 2).min(100) as u32
        }
    }
}

impl WageSetter for LaborMarket {
    fn current_wage(&self) -> i64 {
        self.wage
    }
    fn set_wage(&mut self, wage: i64) {
        self.wage = wage;
    }
}

fn step(
    targeter: &mut PidTargeter,
    agenda: &mut RecordingAgenda,
    market: &mut LaborMarket,
) -> Option<i64> {
    let view = Fixed(market.supply());
    targeter.step(agenda, &view, market).unwrap()
}

struct Fixed(u32);

impl HeadcountOracle for Fixed {
    fn workers(&self) -> u32 {
        self.0
    }
    fn max_workers(&self) -> u32 {
        100
    }
}

#[test]
fn test_headcount_reaches_target_and_stays() {
    let mut market = LaborMarket { wage: 0 };
    let mut agenda = RecordingAgenda::new(1);
    let mut targeter = PidTargeter::new(PidGains::new(0.5, 0.1, 0.0));
    targeter.set_target(6);

    let mut headcounts = Vec::new();
    for day in 0..400 {
        agenda.set_now(SimTime::new(day, Phase::AdjustPrices));
        step(&mut targeter, &mut agenda, &mut market);
        headcounts.push(market.supply());
    }
    assert!(headcounts[300..].iter().all(|&w| w == 6), "{:?}", &headcounts[300..]);
    assert!((23..=24).contains(&market.wage), "wage {}", market.wage);
    assert!(agenda
        .requests()
        .iter()
        .all(|r| *r == AgendaRequest::Tomorrow { phase: Phase::AdjustPrices }));
}

#[test]
fn test_lower_target_lowers_wage() {
    let mut market = LaborMarket { wage: 0 };
    let mut agenda = RecordingAgenda::new(1);
    let mut targeter = PidTargeter::new(PidGains::new(0.5, 0.1, 0.0));
    targeter.set_target(8);
    for _ in 0..400 {
        step(&mut targeter, &mut agenda, &mut market);
    }
    let high = market.wage;
    targeter.set_target(3);
    for _ in 0..400 {
        step(&mut targeter, &mut agenda, &mut market);
    }
    assert!(market.wage < high);
    assert_eq!(market.supply(), 3);
}

#[test]
fn test_installed_wage_is_reported_once() {
    let mut market = LaborMarket { wage: 0 };
    let mut agenda = RecordingAgenda::new(1);
    let mut targeter = PidTargeter::new(PidGains::new(1.0, 0.0, 0.0));
    targeter.set_target(20);

    // 20 missing workers: wage jumps to 20
    assert_eq!(step(&mut targeter, &mut agenda, &mut market), Some(20));
    // supply at 20 is 4, still 16 short: the proportional wage drops to 16
    assert_eq!(step(&mut targeter, &mut agenda, &mut market), Some(16));
    assert_eq!(market.wage, 16);
}

#[test]
fn test_runs_on_a_real_scheduler() {
    let mut market = LaborMarket { wage: 0 };
    let mut targeter = PidTargeter::new(PidGains::new(0.5, 0.1, 0.0)).with_speed(1);
    targeter.set_target(4);

    let mut scheduler = PhaseScheduler::new(9);
    targeter.start(&mut scheduler.for_task(())).unwrap();

    let mut step_days = Vec::new();
    scheduler.run_until(20, |scheduler, _| {
        step_days.push(scheduler.current_day());
        let view = Fixed(market.supply());
        targeter
            .step(&mut scheduler.for_task(()), &view, &mut market)
            .unwrap();
    });
    // speed 1: every other day
    assert_eq!(step_days, vec![0, 2, 4, 6, 8, 10, 12, 14, 16, 18, 20]);
    assert!(market.wage > 0);
}
