use intmap::IntMap;
use lazy_static::lazy_static;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use crate::model::{DutModel, Pins};
use crate::signal::{ObjectKind, SimObject};
use crate::sim_if::{SimCallback, SimIf};
use crate::tb_obj::TbObjSafe;
use crate::trigger::{self, EdgeKind};
use crate::SimpleResult;

// Fixed pinout of the device under test. Handle = table index.
const SIG_DEFS: [(&str, i32); 7] = [
    ("clk", 1),
    ("rst_n", 1),
    ("ena", 1),
    ("ui_in", 8),
    ("uio_in", 8),
    ("uo_out", 8),
    ("uio_out", 8),
];
const CLK: usize = 0;
const RST_N: usize = 1;
const ENA: usize = 2;
const UI_IN: usize = 3;
const UIO_IN: usize = 4;
const UO_OUT: usize = 5;
const UIO_OUT: usize = 6;

const ROOT_HANDLE: usize = usize::MAX;
const ROOT_NAME: &str = "dut";

// Safety valve for combinational feedback between testbench tasks and the
// model within one time step.
const MAX_DELTAS: u32 = 1000;

enum CbKind {
    Time(u64),
    Edge(usize),
    Ro,
}

lazy_static! {
    static ref SIG_TBL: TbObjSafe<Vec<u32>> = TbObjSafe::new(vec![0; SIG_DEFS.len()]);
    static ref MODEL: TbObjSafe<Option<Box<dyn DutModel>>> = TbObjSafe::new(None);
    static ref CB_HDL_CNT: TbObjSafe<usize> = TbObjSafe::new(0);
    static ref CB_HDL_MAP: TbObjSafe<IntMap<CbKind>> = TbObjSafe::new(IntMap::new());
    static ref TIME_MAP: TbObjSafe<BTreeMap<u64, usize>> = TbObjSafe::new(BTreeMap::new());
    // key is signal handle, value is the last observed signal value
    static ref EDGE_TRACK: TbObjSafe<IntMap<u32>> = TbObjSafe::new(IntMap::new());
    static ref RO_HDL: TbObjSafe<Option<usize>> = TbObjSafe::new(None);
}
static RO: AtomicBool = AtomicBool::new(false);
static SIM_TIME: AtomicU64 = AtomicU64::new(0);

pub(crate) struct ModelSim {}

impl ModelSim {
    pub(crate) fn new() -> Self {
        ModelSim {}
    }
}

impl SimIf for ModelSim {
    fn set_value(&self, obj: &SimObject, value: u32) -> SimpleResult<()> {
        match obj.kind {
            ObjectKind::Int(size) => {
                SIG_TBL.with_mut(|mut tbl| tbl[obj.handle] = value & width_mask(size));
                Ok(())
            }
            _ => Err(()),
        }
    }
    fn get_value(&self, obj: &SimObject) -> SimpleResult<u32> {
        match obj.kind {
            ObjectKind::Int(_) => Ok(SIG_TBL.get()[obj.handle]),
            _ => Err(()),
        }
    }
    fn get_object_by_name(&self, name: &str) -> SimpleResult<SimObject> {
        if name == ROOT_NAME {
            return self.get_root_object();
        }
        let short = name.strip_prefix("dut.").unwrap_or(name);
        for (handle, (sig_name, size)) in SIG_DEFS.iter().enumerate() {
            if *sig_name == short {
                return Ok(SimObject {
                    handle,
                    kind: ObjectKind::Int(*size),
                });
            }
        }
        Err(())
    }
    fn get_root_object(&self) -> SimpleResult<SimObject> {
        Ok(SimObject {
            handle: ROOT_HANDLE,
            kind: ObjectKind::Hier,
        })
    }
    fn get_full_name(&self, obj: &SimObject) -> SimpleResult<String> {
        match obj.kind {
            ObjectKind::Hier => Ok(ROOT_NAME.to_string()),
            ObjectKind::Int(_) => match SIG_DEFS.get(obj.handle) {
                Some((name, _)) => Ok(format!("{}.{}", ROOT_NAME, name)),
                None => Err(()),
            },
        }
    }
    fn get_sim_time_steps(&self) -> u64 {
        SIM_TIME.load(Ordering::Relaxed)
    }
    fn get_sim_precision(&self) -> i8 {
        // picoseconds
        -12
    }
    fn log(&self, msg: &str) {
        println!("{:>12} ps  {}", self.get_sim_time_steps(), msg);
    }
    fn register_callback(&self, cb: SimCallback) -> SimpleResult<usize> {
        let cb_hdl = new_cb_hdl();
        match cb {
            SimCallback::Time(t) => {
                let t_abs = t + self.get_sim_time_steps();
                let prev = TIME_MAP.with_mut(|mut map| map.insert(t_abs, cb_hdl));
                if prev.is_some() {
                    panic!("Can not register same timer callback twice.");
                }
                CB_HDL_MAP.with_mut(|mut map| {
                    map.insert(cb_hdl as u64, CbKind::Time(t_abs));
                });
            }
            SimCallback::Edge(sig_hdl) => {
                let current = SIG_TBL.get()[sig_hdl];
                let prev = EDGE_TRACK.with_mut(|mut map| map.insert(sig_hdl as u64, current));
                // one edge callback per signal
                if prev.is_some() {
                    return Err(());
                }
                CB_HDL_MAP.with_mut(|mut map| {
                    map.insert(cb_hdl as u64, CbKind::Edge(sig_hdl));
                });
            }
            SimCallback::ReadOnly => {
                RO.store(true, Ordering::Relaxed);
                RO_HDL.with_mut(|mut slot| slot.replace(cb_hdl));
                CB_HDL_MAP.with_mut(|mut map| {
                    map.insert(cb_hdl as u64, CbKind::Ro);
                });
            }
        }
        Ok(cb_hdl)
    }
    fn cancel_callback(&self, cb_hdl: usize) -> SimpleResult<()> {
        let cb = CB_HDL_MAP.with_mut(|mut map| {
            map.remove(cb_hdl as u64)
                .expect("Could not find callback handle.")
        });
        match cb {
            CbKind::Time(t_abs) => TIME_MAP.with_mut(|mut map| {
                if map.remove(&t_abs).is_none() {
                    panic!("Callback was not registered at t_abs.");
                }
            }),
            CbKind::Edge(sig_hdl) => EDGE_TRACK.with_mut(|mut map| {
                if map.remove(sig_hdl as u64).is_none() {
                    panic!("Callback was not registered for signal.");
                }
            }),
            CbKind::Ro => {
                RO.store(false, Ordering::Relaxed);
                RO_HDL.with_mut(|mut slot| slot.take());
            }
        };
        Ok(())
    }
}

fn width_mask(size: i32) -> u32 {
    if size >= 32 {
        u32::MAX
    } else {
        (1u32 << size) - 1
    }
}

fn new_cb_hdl() -> usize {
    CB_HDL_CNT.with_mut(|mut cnt| {
        let out = *cnt;
        *cnt += 1;
        out
    })
}

/// Clear all backend state and install a fresh device model. Must only be
/// called between runs, holding the testbench run lock.
pub(crate) fn reset_state(model: Box<dyn DutModel>) {
    trigger::reset();
    SIG_TBL.with_mut(|mut tbl| tbl.iter_mut().for_each(|v| *v = 0));
    MODEL.with_mut(|mut slot| {
        slot.replace(model);
    });
    CB_HDL_MAP.with_mut(|mut map| *map = IntMap::new());
    TIME_MAP.with_mut(|mut map| map.clear());
    EDGE_TRACK.with_mut(|mut map| *map = IntMap::new());
    RO_HDL.with_mut(|mut slot| {
        slot.take();
    });
    RO.store(false, Ordering::Relaxed);
    SIM_TIME.store(0, Ordering::Relaxed);
}

/// Event loop, shaped like a verilator harness: fire due timers, evaluate the
/// model until the time step settles, fire read-only callbacks, advance time.
/// Stops when no timers remain.
pub(crate) fn run_sim() {
    loop {
        handle_time_callbacks();
        settle();
        handle_ro_callbacks();
        if let Some(next_time) = get_next_time() {
            SIM_TIME.store(next_time, Ordering::Relaxed);
        } else {
            break;
        }
    }
}

fn handle_time_callbacks() {
    let now = SIM_TIME.load(Ordering::Relaxed);
    loop {
        let due = TIME_MAP.with_mut(|mut map| {
            let t = map.iter().next().map(|(t, _)| *t).filter(|t| *t <= now);
            t.map(|t| (t, map.remove(&t).unwrap()))
        });
        match due {
            Some((t_abs, cb_hdl)) => {
                CB_HDL_MAP.with_mut(|mut map| map.remove(cb_hdl as u64));
                trigger::react(SimCallback::Time(t_abs), None);
            }
            None => break,
        }
    }
}

fn handle_ro_callbacks() {
    if RO.swap(false, Ordering::Relaxed) {
        if let Some(cb_hdl) = RO_HDL.with_mut(|mut slot| slot.take()) {
            CB_HDL_MAP.with_mut(|mut map| map.remove(cb_hdl as u64));
        }
        trigger::react(SimCallback::ReadOnly, None);
    }
}

fn get_next_time() -> Option<u64> {
    TIME_MAP.get().iter().next().map(|(t, _)| *t)
}

/// Evaluate the model and fire edge callbacks until no watched signal changes
/// anymore. Tasks woken by an edge may write inputs, which feed back into the
/// next delta evaluation.
fn settle() {
    for _ in 0..MAX_DELTAS {
        eval_model();
        let changed = collect_changed();
        if changed.is_empty() {
            return;
        }
        for (sig_hdl, kind) in changed {
            trigger::react(SimCallback::Edge(sig_hdl), Some(kind));
        }
    }
    panic!(
        "Model did not settle within {} delta cycles at t={}",
        MAX_DELTAS,
        SIM_TIME.load(Ordering::Relaxed)
    );
}

fn eval_model() {
    let mut pins = {
        let tbl = SIG_TBL.get();
        Pins {
            clk: tbl[CLK],
            rst_n: tbl[RST_N],
            ena: tbl[ENA],
            ui_in: tbl[UI_IN],
            uio_in: tbl[UIO_IN],
            uo_out: tbl[UO_OUT],
            uio_out: tbl[UIO_OUT],
        }
    };
    MODEL.with_mut(|mut slot| {
        if let Some(model) = slot.as_mut() {
            model.eval(&mut pins);
        }
    });
    // Only output pins are accepted back from the model.
    SIG_TBL.with_mut(|mut tbl| {
        tbl[UO_OUT] = pins.uo_out & width_mask(SIG_DEFS[UO_OUT].1);
        tbl[UIO_OUT] = pins.uio_out & width_mask(SIG_DEFS[UIO_OUT].1);
    });
}

fn collect_changed() -> Vec<(usize, EdgeKind)> {
    let tbl = SIG_TBL.get().clone();
    EDGE_TRACK.with_mut(|mut map| {
        let mut changed = Vec::new();
        for sig_hdl in 0..SIG_DEFS.len() {
            if let Some(last) = map.get_mut(sig_hdl as u64) {
                let current = tbl[sig_hdl];
                if current != *last {
                    let kind = if *last == 0 && current != 0 {
                        EdgeKind::Rising
                    } else if *last != 0 && current == 0 {
                        EdgeKind::Falling
                    } else {
                        EdgeKind::Any
                    };
                    *last = current;
                    changed.push((sig_hdl, kind));
                }
            }
        }
        changed
    })
}
