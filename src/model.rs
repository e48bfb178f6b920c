/// Snapshot of all device pins, passed to the behavioral model once per delta
/// cycle. Input pins (`clk`, `rst_n`, `ena`, `ui_in`, `uio_in`) are driven by
/// the testbench; the model drives `uo_out` and `uio_out`. Writes to input
/// fields are discarded by the backend.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Pins {
    pub clk: u32,
    pub rst_n: u32,
    pub ena: u32,
    pub ui_in: u32,
    pub uio_in: u32,
    pub uo_out: u32,
    pub uio_out: u32,
}

/// Behavioral device under test. `eval` is called whenever signal values may
/// have changed, possibly several times per time step; models detect clock
/// edges themselves by remembering the previous `clk` level, as a
/// verilator-style evaluation model would.
pub trait DutModel: Send {
    fn eval(&mut self, pins: &mut Pins);
}

/// Model that never drives its outputs. Useful as a worst-case device for
/// exercising the collection timeout path.
#[derive(Default)]
pub struct DeadModel;

impl DutModel for DeadModel {
    fn eval(&mut self, _pins: &mut Pins) {}
}
