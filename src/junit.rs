use crate::test;
use junit_report::{Duration, ReportBuilder, TestCaseBuilder, TestSuiteBuilder};

pub(crate) fn create_junit_xml() {
    let mut test_cases = Vec::new();

    for t in test::test_handles() {
        let t = t.get();
        let result = match t.result.as_ref() {
            Some(result) => result,
            None => continue,
        };
        let tc = match result {
            Ok(_) => TestCaseBuilder::success(&t.name, Duration::seconds_f64(t.time_secs)),
            Err(e) => TestCaseBuilder::failure(
                &t.name,
                Duration::seconds_f64(t.time_secs),
                "failure",
                &format!("{:?}", e),
            ),
        }
        .build();
        test_cases.push(tc);
    }

    let test_suite = TestSuiteBuilder::new(crate::crate_name())
        .add_testcases(test_cases)
        .build();
    let report = ReportBuilder::new().add_testsuite(test_suite).build();
    // best effort, a missing report file never fails the run
    if let Ok(file) = std::fs::File::create("results.xml") {
        let _ = report.write_xml(file);
    }
}
