use crate::sim_if::SIM_IF;
use crate::trigger::Trigger;
use crate::SimpleResult;

/// Lightweight handle to a pin of the simulated device. Copyable; all state
/// lives in the simulator backend.
#[derive(Clone, Copy, Debug)]
pub struct SimObject {
    pub(crate) handle: usize,
    pub(crate) kind: ObjectKind,
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub enum ObjectKind {
    /// Integer signal with the given width in bits.
    Int(i32),
    /// Hierarchy object (the device root).
    Hier,
}

impl SimObject {
    pub fn handle(&self) -> usize {
        self.handle
    }

    pub fn name(&self) -> String {
        SIM_IF
            .get_full_name(self)
            .expect("Couldn't get name of SimObject")
    }

    pub fn get_child(&self, name: &str) -> SimpleResult<Self> {
        let mut child_name = self.name();
        child_name.push('.');
        child_name.push_str(name);
        SimObject::from_name(child_name.as_str())
    }

    pub fn from_name(full_name: &str) -> SimpleResult<Self> {
        SIM_IF.get_object_by_name(full_name)
    }

    pub fn get_root() -> SimpleResult<Self> {
        SIM_IF.get_root_object()
    }

    pub fn u32(&self) -> u32 {
        SIM_IF.get_value(self).unwrap()
    }

    pub fn set_u32(&self, val: u32) {
        SIM_IF.set_value(self, val).unwrap();
    }

    pub fn c(&self, name: &str) -> Self {
        self.get_child(name)
            .unwrap_or_else(|_| panic!("Could not get object with name {}.{}", self.name(), name))
    }

    // convenience functions to get edge triggers for this signal
    pub fn rising_edge(self) -> Trigger {
        Trigger::rising_edge(self)
    }
    pub fn falling_edge(self) -> Trigger {
        Trigger::falling_edge(self)
    }
    pub fn edge(self) -> Trigger {
        Trigger::edge(self)
    }
}
