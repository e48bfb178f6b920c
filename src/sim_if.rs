use crate::model_sim;
use crate::signal::SimObject;
use crate::SimpleResult;
use lazy_static::lazy_static;

lazy_static! {
    pub static ref SIM_IF: Box<dyn SimIf + Sync> = Box::new(model_sim::ModelSim::new());
}

#[derive(Debug, Hash, Clone, Eq, PartialEq)]
pub enum SimCallback {
    /// Relative time in simulation steps.
    Time(u64),
    /// Any value change on the signal with the given handle.
    Edge(usize),
    /// End of the current time step, after all value changes have settled.
    ReadOnly,
}

/// Seam between the testbench runtime and whatever executes the design. The
/// only implementation in this crate drives a behavioral Rust model; the
/// trait keeps signal access and callback plumbing independent of it.
pub trait SimIf {
    fn set_value(&self, obj: &SimObject, value: u32) -> SimpleResult<()>;
    fn get_value(&self, obj: &SimObject) -> SimpleResult<u32>;
    fn get_object_by_name(&self, name: &str) -> SimpleResult<SimObject>;
    fn get_root_object(&self) -> SimpleResult<SimObject>;
    fn get_full_name(&self, obj: &SimObject) -> SimpleResult<String>;
    fn get_sim_time_steps(&self) -> u64;
    fn get_sim_precision(&self) -> i8;
    fn log(&self, msg: &str);
    fn register_callback(&self, cb: SimCallback) -> SimpleResult<usize>;
    fn cancel_callback(&self, cb_hdl: usize) -> SimpleResult<()>;

    fn get_sim_time(&self, unit: &str) -> f64 {
        // this function does not preserve precision, so don't use carelessly
        let t = self.get_sim_time_steps() as f64;
        let precision = self.get_sim_precision();
        ldexp10(t, precision - time_scale(unit))
    }
    fn get_sim_steps(&self, time: f64, unit: &str) -> u64 {
        let precision = self.get_sim_precision();
        let steps = ldexp10(time, time_scale(unit) - precision);
        if steps % 1.0 == 0.0 {
            steps as u64
        } else {
            panic!(
                "Can't convert time {} {} to sim steps without rounding (sim precision: 1e{})",
                time, unit, precision
            );
        }
    }
}

fn time_scale(unit: &str) -> i8 {
    match unit {
        "fs" => -15,
        "ps" => -12,
        "ns" => -9,
        "us" => -6,
        "ms" => -3,
        "sec" => 0,
        _ => panic!("Unknown time unit: {}", unit),
    }
}

fn ldexp10(frac: f64, exp: i8) -> f64 {
    // Like math.ldexp, but base 10
    if exp >= 0 {
        frac * 10_u64.pow(exp as u32) as f64
    } else {
        let div = 10_u64.pow(-exp as u32) as f64;
        frac / div
    }
}
