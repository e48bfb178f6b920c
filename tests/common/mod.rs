//! Behavioral device models used by the integration tests.
#![allow(dead_code)]

use sartb::{DutModel, Pins};

const START_BIT: u32 = 0b01;
const COMP_BIT: u32 = 0b10;

enum SarState {
    Idle,
    Converting { acc: u32, bit: u32 },
}

/// Ideal 8-bit successive-approximation converter. On a start pulse it
/// resolves one bit per clock cycle by driving the trial code on `uo_out`
/// and sampling the fed-back comparator bit on the next rising edge; the
/// final code lands on `uio_out`. With an ideal comparator the result equals
/// the reference target exactly.
pub struct SarModel {
    prev_clk: u32,
    state: SarState,
}

impl SarModel {
    pub fn new() -> Self {
        Self {
            prev_clk: 0,
            state: SarState::Idle,
        }
    }
}

impl DutModel for SarModel {
    fn eval(&mut self, pins: &mut Pins) {
        let posedge = self.prev_clk == 0 && pins.clk == 1;
        self.prev_clk = pins.clk;
        if !posedge {
            return;
        }
        if pins.rst_n == 0 {
            self.state = SarState::Idle;
            pins.uo_out = 0;
            return;
        }
        if pins.ena == 0 {
            return;
        }
        match self.state {
            SarState::Idle => {
                if pins.ui_in & START_BIT != 0 {
                    // first trial: MSB only
                    pins.uo_out = 1 << 7;
                    self.state = SarState::Converting { acc: 0, bit: 7 };
                }
            }
            SarState::Converting { mut acc, bit } => {
                // comparator verdict for the trial currently on uo_out
                if pins.ui_in & COMP_BIT != 0 {
                    acc |= 1 << bit;
                }
                if bit == 0 {
                    pins.uio_out = acc;
                    self.state = SarState::Idle;
                } else {
                    let next = bit - 1;
                    pins.uo_out = acc | (1 << next);
                    self.state = SarState::Converting { acc, bit: next };
                }
            }
        }
    }
}

/// Free-running counter on `uo_out`: the DAC output takes a fresh value on
/// every rising edge, so the clock edge that wakes a waiting task and a DAC
/// output change always land in the same delta cycle. Never answers on
/// `uio_out`.
pub struct CounterDacModel {
    prev_clk: u32,
    count: u32,
}

impl CounterDacModel {
    pub fn new() -> Self {
        Self {
            prev_clk: 0,
            count: 0,
        }
    }
}

impl DutModel for CounterDacModel {
    fn eval(&mut self, pins: &mut Pins) {
        let posedge = self.prev_clk == 0 && pins.clk == 1;
        self.prev_clk = pins.clk;
        if !posedge {
            return;
        }
        if pins.rst_n == 0 {
            self.count = 0;
            pins.uo_out = 0;
            return;
        }
        self.count = self.count.wrapping_add(1);
        pins.uo_out = self.count & 0xFF;
    }
}

/// Drives scripted values onto `uio_out` at fixed rising-edge counts after
/// reset release, ignoring all inputs. An empty script never drives anything.
pub struct ScriptedModel {
    prev_clk: u32,
    cycle: u64,
    script: Vec<(u64, u32)>,
}

impl ScriptedModel {
    #[allow(dead_code)]
    pub fn new(mut script: Vec<(u64, u32)>) -> Self {
        script.sort_by_key(|(cycle, _)| *cycle);
        Self {
            prev_clk: 0,
            cycle: 0,
            script,
        }
    }
}

impl DutModel for ScriptedModel {
    fn eval(&mut self, pins: &mut Pins) {
        let posedge = self.prev_clk == 0 && pins.clk == 1;
        self.prev_clk = pins.clk;
        if !posedge || pins.rst_n == 0 {
            return;
        }
        self.cycle += 1;
        for (cycle, value) in &self.script {
            if *cycle == self.cycle {
                pins.uio_out = *value;
            }
        }
    }
}
