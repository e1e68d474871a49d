//! Integration Test: Async-Only Production Code
//!
//! The chat core runs inside a tokio runtime and paces scripted replies with
//! timers. A thread sleep or a blocking read there stalls every stream on the
//! same worker.

use architectural_enforcement::{scan, workspace_root, Rule, ScanReport};

const SLEEP_RULES: &[Rule] = &[Rule {
    name: "Thread sleep",
    pattern: "std::thread::sleep",
}];

const BLOCKING_IO_RULES: &[Rule] = &[
    Rule {
        name: "Blocking stdin",
        pattern: "std::io::stdin()",
    },
    Rule {
        name: "Blocking HTTP client",
        pattern: "reqwest::blocking",
    },
];

fn report_and_fail(report: &ScanReport, what: &str) {
    if report.violations.is_empty() {
        return;
    }
    eprintln!("\n❌ {what} found in production code:");
    for violation in &report.violations {
        eprintln!("  ❌ {violation}");
    }
    panic!(
        "\nFound {} violation(s). Use tokio::time::sleep / tokio::io instead.",
        report.violations.len()
    );
}

#[test]
fn test_no_thread_sleep_in_production_code() {
    for dir in ["chat/core/src", "chat/cli/src"] {
        let report = scan(&workspace_root().join(dir), SLEEP_RULES);
        assert!(report.files_scanned > 0, "nothing scanned under {dir}");
        report_and_fail(&report, "Thread sleeps");
    }
}

#[test]
fn test_no_blocking_io_in_core() {
    let report = scan(&workspace_root().join("chat/core/src"), BLOCKING_IO_RULES);
    assert!(report.files_scanned > 0, "nothing scanned under chat/core/src");
    report_and_fail(&report, "Blocking I/O");
}
