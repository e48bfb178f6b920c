pub use crate::executor::{JoinHandle, Task};
pub use crate::model::{DeadModel, DutModel, Pins};
pub use crate::report::SweepRecord;
pub use crate::scenario::SweepOutcome;
pub use crate::signal::SimObject;
pub use crate::sim_if::SIM_IF;
pub use crate::tb_obj::{TbObj, TbObjSafe};
pub use crate::test::{TbTests, Test};
pub use crate::testbench::{run_tests, TestSummary};
pub use crate::trigger::Trigger;
pub use crate::value::Val;
pub use crate::{fail_test, pass_test};
pub use crate::{SimpleResult, TbResult};
pub use futures::future::FutureExt;
