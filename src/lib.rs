mod executor;
mod junit;
pub mod model;
mod model_sim;
pub mod prelude;
pub mod report;
pub mod scenario;
pub mod signal;
pub mod sim_if;
mod tb_obj;
pub mod test;
pub mod testbench;
mod trigger;
pub mod utils;
mod value;

use executor::Task;
use lazy_static::lazy_static;
use num_format::{Locale, ToFormattedString};
use once_cell::sync::OnceCell;
use sim_if::SIM_IF;
use std::sync::Arc;
use std::time;
use value::Val;

pub use model::{DeadModel, DutModel, Pins};
pub use report::SweepRecord;
pub use scenario::SweepOutcome;
pub use tb_obj::{TbObj, TbObjSafe};
pub use test::{TbTests, Test};
pub use testbench::{run_tests, TestSummary};

pub type SimpleResult<T> = Result<T, ()>;
pub type TbResult = Result<Val, Val>;

pub static CRATE_NAME: OnceCell<String> = OnceCell::new();

pub(crate) fn crate_name() -> &'static str {
    CRATE_NAME.get_or_init(|| env!("CARGO_PKG_NAME").to_string())
}

lazy_static! {
    static ref SIM_START_TIME: TbObjSafe<Option<time::Instant>> = TbObjSafe::new(None);
    static ref CURRENT_TEST: TbObjSafe<Option<(Arc<Task>, TbObjSafe<test::Test>)>> =
        TbObjSafe::new(None);
}

pub fn pass_test(msg: &str) {
    // Passes test that has not already failed/passed
    if let Some((task, test)) = CURRENT_TEST.with_mut(|mut c| c.take()) {
        test.with_mut(|mut t| t.set_result(Ok(Val::String(msg.to_string()))));
        tear_down_test(task);
    }
}

pub fn fail_test(msg: &str) {
    // Fails test that has not already failed/passed
    if let Some((task, test)) = CURRENT_TEST.with_mut(|mut c| c.take()) {
        test.with_mut(|mut t| t.set_result(Err(Val::String(msg.to_string()))));
        tear_down_test(task);
    }
}

fn tear_down_test(test: Arc<Task>) {
    trigger::cancel_all_triggers();
    executor::clear_ready_queue();
    test.cancel();
}

pub(crate) fn clear_current_test() {
    CURRENT_TEST.with_mut(|mut c| {
        c.take();
    });
}

fn start_of_simulation() {
    // start timer
    SIM_START_TIME.with_mut(|mut s| {
        s.replace(time::Instant::now());
    });

    let sim_root = signal::SimObject::get_root().unwrap();

    // All tests are scheduled in a chain at simulation start up by awaiting
    // the previous test completion. Wrapping logic handles test results and timers.
    let mut join_handle = None;
    for test in test::test_handles() {
        let prev = join_handle.take();
        join_handle = Some(executor::Task::spawn_from_future(
            async move {
                // await previous test, if there is one
                if let Some(handle) = prev {
                    let _ = handle.await;
                }
                // spawn next test
                let test_inner = test.clone();
                let test_handle = executor::Task::spawn_from_future(
                    async move {
                        let time_start = time::Instant::now();
                        let sim_time_start = SIM_IF.get_sim_time_steps();
                        let generator = test_inner
                            .with_mut(|mut t| t.generator.take())
                            .expect("Test was already executed.");
                        // await test execution
                        let result = (generator)(sim_root).await;

                        test_inner.with_mut(|mut t| {
                            t.time_secs = time_start.elapsed().as_secs_f64();
                            t.sim_time_steps = SIM_IF.get_sim_time_steps() - sim_time_start;
                        });
                        match result {
                            Ok(val) => pass_test(&format!("{:?}", val)),
                            Err(val) => fail_test(&format!("{:?}", val)),
                        }
                        Ok(Val::None)
                    },
                    "test",
                );
                // set current test handle
                let test_task = test_handle.get_task().unwrap().clone();
                CURRENT_TEST.with_mut(move |mut c| {
                    let _ = c.replace((test_task, test));
                });
                // await test execution
                let _ = test_handle.await;
                Ok(Val::None)
            },
            "test_wrapper",
        ));
    }

    // execute first simulation tick
    executor::run_once();
}

fn end_of_simulation() {
    use prettytable::{Cell, Row, Table};

    let duration = SIM_START_TIME
        .with_mut(|mut s| s.take())
        .map(|t| t.elapsed().as_secs_f64())
        .unwrap_or(0.0);
    let final_sim_time = SIM_IF.get_sim_time_steps();

    let mut table = Table::new();
    table.set_titles(Row::new(vec![
        Cell::new("Test"),
        Cell::new("Result"),
        Cell::new("Time [s]"),
        Cell::new("Sim time [ps]"),
    ]));
    for test in test::test_handles() {
        let (name, result_str, time_secs, sim_steps) = test.with_mut(|t| {
            (
                t.name.clone(),
                match t.result {
                    Some(Ok(_)) => "passed",
                    _ => "failed",
                },
                t.time_secs,
                t.sim_time_steps,
            )
        });
        table.add_row(Row::new(vec![
            Cell::new(&name),
            Cell::new(result_str),
            Cell::new(&format!("{:.3}", time_secs)),
            Cell::new(&sim_steps.to_formatted_string(&Locale::en)),
        ]));
    }
    table.printstd();

    SIM_IF.log(&format!(
        "Simulation time: {} ps",
        final_sim_time.to_formatted_string(&Locale::en)
    ));
    SIM_IF.log(&format!("Real time: {:.3} s", duration));
    if duration > 0.0 {
        SIM_IF.log(&format!(
            "Simulation speed: {:.3} ps/s",
            final_sim_time as f64 / duration
        ));
    }

    junit::create_junit_xml();
}
