//! Startup launcher properties, exercised with real OS processes.

use std::time::{Duration, Instant};

use helpline::launcher::{supervise, CommandSpec, StartupPlan};

fn sh(script: &str) -> CommandSpec {
    CommandSpec::new("/bin/sh").arg("-c").arg(script)
}

fn plan(background: CommandSpec, foreground: CommandSpec) -> StartupPlan {
    StartupPlan {
        background,
        foreground,
    }
}

#[tokio::test]
async fn foreground_exit_code_propagates() {
    for code in [0, 1, 137, 143] {
        let plan = plan(sh("exit 0"), sh(&format!("exit {}", code)));
        assert_eq!(supervise(&plan).await, code, "exit code {} must propagate", code);
    }
}

#[tokio::test]
async fn background_start_failure_is_isolated() {
    // Invalid background command path: the foreground must still launch and
    // its code must still propagate.
    let plan_a = plan(
        CommandSpec::new("/nonexistent/definitely-not-a-binary"),
        sh("exit 0"),
    );
    assert_eq!(supervise(&plan_a).await, 0);

    let plan = plan(
        CommandSpec::new("/nonexistent/definitely-not-a-binary"),
        sh("exit 7"),
    );
    assert_eq!(supervise(&plan).await, 7);
}

#[tokio::test]
async fn launcher_waits_for_foreground() {
    let started = Instant::now();
    let plan = plan(sh("exit 0"), sh("sleep 0.4; exit 0"));

    let code = supervise(&plan).await;

    assert_eq!(code, 0);
    assert!(
        started.elapsed() >= Duration::from_millis(350),
        "launcher returned while the foreground task was still running"
    );
}

#[tokio::test]
async fn background_is_not_awaited() {
    // A slow background task must not delay the launcher beyond the
    // foreground's own lifetime.
    let started = Instant::now();
    let plan = plan(sh("sleep 5"), sh("exit 0"));

    let code = supervise(&plan).await;

    assert_eq!(code, 0);
    assert!(
        started.elapsed() < Duration::from_secs(3),
        "launcher appears to have waited on the background task"
    );
}

#[tokio::test]
async fn foreground_start_failure_maps_to_127() {
    let plan = plan(
        sh("exit 0"),
        CommandSpec::new("/nonexistent/definitely-not-a-binary"),
    );
    assert_eq!(supervise(&plan).await, 127);
}
