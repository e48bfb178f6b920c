use lazy_static::lazy_static;
use std::sync::Mutex;

use crate::executor;
use crate::model::DutModel;
use crate::model_sim;
use crate::prelude::*;
use crate::test::{self, TbTests};
use crate::value::Val;

lazy_static! {
    // Backend and trigger state are process-wide, so full runs must not
    // overlap. Parallel #[test] callers serialize here.
    static ref RUN_LOCK: Mutex<()> = Mutex::new(());
}

#[derive(Debug, Clone)]
pub struct TestSummary {
    pub name: String,
    pub result: TbResult,
    pub time_secs: f64,
    pub sim_time_steps: u64,
}

impl TestSummary {
    pub fn passed(&self) -> bool {
        self.result.is_ok()
    }
}

/// Run all registered tests against the given device model and return one
/// summary per test. Resets all runtime state first; safe to call repeatedly
/// within one process, concurrent calls are serialized.
pub fn run_tests(model: Box<dyn DutModel>, tests: TbTests) -> Vec<TestSummary> {
    let _guard = RUN_LOCK.lock().unwrap_or_else(|e| e.into_inner());

    executor::clear_ready_queue();
    model_sim::reset_state(model);
    crate::clear_current_test();
    test::set_tests(tests.clone());

    crate::start_of_simulation();
    model_sim::run_sim();
    crate::end_of_simulation();

    tests
        .iter()
        .map(|test| {
            test.with_mut(|t| TestSummary {
                name: t.name.clone(),
                result: t
                    .result
                    .clone()
                    .unwrap_or(Err(Val::String("Test produced no result".to_string()))),
                time_secs: t.time_secs,
                sim_time_steps: t.sim_time_steps,
            })
        })
        .collect()
}

/// Free-running clock stimulus. Forked once per run; cancelled implicitly
/// when the test tears down its triggers.
#[allow(unreachable_code)]
pub async fn clock(clk: SimObject, period: u32, unit: &str) -> TbResult {
    let high_t = period / 2;
    let low_t = period - high_t;
    if period % 2 != 0 {
        SIM_IF.log(&format!(
            "Warning: Clock period {period}{unit} not dividable by 2. High time will be {high_t}{unit}; low time will be {low_t}{unit}."
        ));
    }
    loop {
        clk.set_u32(0);
        Trigger::timer(low_t as u64, unit).await;
        clk.set_u32(1);
        Trigger::timer(high_t as u64, unit).await;
    }
    Ok(Val::None)
}
