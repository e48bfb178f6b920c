//! Backend scheduling properties: timer order, edge detection on testbench
//! writes, edge polarity filtering and read-only phase ordering.

use sartb::prelude::*;
use sartb::sim_if::SimCallback;

type EventLog = TbObjSafe<Vec<(&'static str, u64)>>;

#[test]
fn timers_fire_in_time_order() {
    let log: EventLog = TbObjSafe::new(Vec::new());
    let log_outer = log.clone();

    let mut tests = TbTests::new();
    tests.push(Test::new("timer_order", move |_root| {
        let log = log_outer.clone();
        async move {
            let log_fork = log.clone();
            Task::fork(async move {
                Trigger::timer(20, "us").await;
                log_fork.get_mut().push(("t20", SIM_IF.get_sim_time_steps()));
                Ok(Val::None)
            });
            Trigger::timer(10, "us").await;
            log.get_mut().push(("t10", SIM_IF.get_sim_time_steps()));
            Trigger::timer(20, "us").await;
            log.get_mut().push(("t30", SIM_IF.get_sim_time_steps()));
            Ok(Val::None)
        }
        .boxed()
    }));
    let results = run_tests(Box::new(DeadModel), tests);

    assert!(results[0].passed());
    assert_eq!(
        *log.get(),
        vec![
            ("t10", 10_000_000),
            ("t20", 20_000_000),
            ("t30", 30_000_000)
        ]
    );
}

#[test]
fn edge_then_read_only_fire_after_write_at_same_time() {
    let log: EventLog = TbObjSafe::new(Vec::new());
    let log_outer = log.clone();

    let mut tests = TbTests::new();
    tests.push(Test::new("edge_ro_order", move |root| {
        let log = log_outer.clone();
        async move {
            let ui_in = root.c("ui_in");
            let log_fork = log.clone();
            Task::fork(async move {
                Trigger::edge(ui_in).await;
                log_fork
                    .get_mut()
                    .push(("edge", SIM_IF.get_sim_time_steps()));
                Trigger::read_only().await;
                log_fork.get_mut().push(("ro", SIM_IF.get_sim_time_steps()));
                Ok(Val::None)
            });
            Trigger::timer(10, "us").await;
            log.get_mut().push(("write", SIM_IF.get_sim_time_steps()));
            ui_in.set_u32(0xAB);
            // one more wait so the edge and read-only phases run
            Trigger::timer(10, "us").await;
            Ok(Val::None)
        }
        .boxed()
    }));
    let results = run_tests(Box::new(DeadModel), tests);

    assert!(results[0].passed());
    assert_eq!(
        *log.get(),
        vec![
            ("write", 10_000_000),
            ("edge", 10_000_000),
            ("ro", 10_000_000)
        ]
    );
}

#[test]
fn edge_polarity_filters_waiters() {
    let log: EventLog = TbObjSafe::new(Vec::new());
    let log_outer = log.clone();

    let mut tests = TbTests::new();
    tests.push(Test::new("edge_polarity", move |root| {
        let log = log_outer.clone();
        async move {
            let clk = root.c("clk");
            Task::fork(sartb::testbench::clock(clk, 10, "us"));
            clk.rising_edge().await;
            log.get_mut().push(("rise", SIM_IF.get_sim_time_steps()));
            clk.falling_edge().await;
            log.get_mut().push(("fall", SIM_IF.get_sim_time_steps()));
            Ok(Val::None)
        }
        .boxed()
    }));
    let results = run_tests(Box::new(DeadModel), tests);

    assert!(results[0].passed());
    // clock is low for the first half period, so the first rising edge is at
    // 5 us and the next falling edge at 10 us
    assert_eq!(*log.get(), vec![("rise", 5_000_000), ("fall", 10_000_000)]);
}

#[test]
fn edge_callback_registration_is_exclusive() {
    let mut tests = TbTests::new();
    tests.push(Test::new("edge_registration", move |root| {
        async move {
            let sig_hdl = root.c("uo_out").handle();
            // only one edge callback per signal; waiters share it
            let cb_hdl = SIM_IF.register_callback(SimCallback::Edge(sig_hdl)).unwrap();
            assert!(SIM_IF.register_callback(SimCallback::Edge(sig_hdl)).is_err());
            SIM_IF.cancel_callback(cb_hdl).unwrap();
            Ok(Val::None)
        }
        .boxed()
    }));
    let results = run_tests(Box::new(DeadModel), tests);

    assert!(results[0].passed());
}
