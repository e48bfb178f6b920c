use crate::signal::SimObject;
use crate::tb_obj::TbObjSafe;
use crate::TbResult;
use futures::future::BoxFuture;
use lazy_static::lazy_static;

pub type TestGenerator = Box<dyn Fn(SimObject) -> BoxFuture<'static, TbResult> + Send>;

pub struct TbTests(Vec<TbObjSafe<Test>>);

impl TbTests {
    #[allow(clippy::new_without_default)]
    pub fn new() -> Self {
        Self(Vec::new())
    }
    pub fn iter(&self) -> core::slice::Iter<TbObjSafe<Test>> {
        self.0.iter()
    }
    pub fn push(&mut self, test: Test) {
        self.0.push(TbObjSafe::new(test));
    }
}

impl Clone for TbTests {
    // shares the underlying test objects
    fn clone(&self) -> Self {
        Self(self.0.clone())
    }
}

pub struct Test {
    pub name: String,
    pub generator: Option<TestGenerator>,
    pub result: Option<TbResult>,
    pub time_secs: f64,
    pub sim_time_steps: u64,
}

impl Test {
    pub fn new(
        name: &str,
        generator: impl Fn(SimObject) -> BoxFuture<'static, TbResult> + Send + 'static,
    ) -> Self {
        Self {
            name: name.to_string(),
            generator: Some(Box::new(generator)),
            result: None,
            time_secs: 0.0,
            sim_time_steps: 0,
        }
    }
    pub fn set_result(&mut self, result: TbResult) {
        self.result = Some(result);
    }
}

lazy_static! {
    static ref TESTS: TbObjSafe<Option<TbTests>> = TbObjSafe::new(None);
}

pub(crate) fn set_tests(tests: TbTests) {
    TESTS.with_mut(|mut slot| {
        slot.replace(tests);
    });
}

pub(crate) fn test_handles() -> Vec<TbObjSafe<Test>> {
    TESTS
        .get()
        .as_ref()
        .map(|tests| tests.iter().cloned().collect())
        .unwrap_or_default()
}
