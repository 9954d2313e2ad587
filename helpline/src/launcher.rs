//! Startup launcher for the two-process deployment.
//!
//! The deployment runs two processes in one container: the voice worker in
//! the background and the web gateway in the foreground. The launcher issues
//! the background start first, fire-and-forget, then runs the gateway to
//! completion and exits with its status. There is no restart, no readiness
//! probe and no coordination between the two.

use std::process::Stdio;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::{error, info, warn};

/// A command to launch: program plus arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    pub program: String,
    pub args: Vec<String>,
}

impl CommandSpec {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }
}

/// The fixed two-command startup sequence.
#[derive(Debug, Clone)]
pub struct StartupPlan {
    /// Started first, detached, not monitored.
    pub background: CommandSpec,
    /// Runs to completion; its exit status becomes ours.
    pub foreground: CommandSpec,
}

/// Seam between the supervision sequence and the OS, so tests can observe
/// launch order without real processes.
#[async_trait]
pub trait ProcessLauncher: Send + Sync {
    /// Spawn without waiting. The handle is dropped; the child runs free.
    fn spawn_detached(&self, spec: &CommandSpec) -> std::io::Result<()>;

    /// Run to completion and report the exit code.
    async fn run_to_exit(&self, spec: &CommandSpec) -> std::io::Result<i32>;
}

/// Real OS process launcher.
#[derive(Debug, Clone, Default)]
pub struct OsProcessLauncher;

#[async_trait]
impl ProcessLauncher for OsProcessLauncher {
    fn spawn_detached(&self, spec: &CommandSpec) -> std::io::Result<()> {
        let mut cmd = Command::new(&spec.program);
        cmd.args(&spec.args)
            .stdin(Stdio::null())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit());

        // Dropping the child handle leaves the process running.
        cmd.spawn().map(|child| {
            info!(
                "Background task spawned: {} (pid {:?})",
                spec.program,
                child.id()
            );
        })
    }

    async fn run_to_exit(&self, spec: &CommandSpec) -> std::io::Result<i32> {
        let status = Command::new(&spec.program)
            .args(&spec.args)
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .status()
            .await?;
        Ok(exit_code(status))
    }
}

/// Map an exit status to the code we exit with: the child's own code, or
/// 128+signal when it was killed (shell convention).
pub fn exit_code(status: std::process::ExitStatus) -> i32 {
    if let Some(code) = status.code() {
        return code;
    }
    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(signal) = status.signal() {
            return 128 + signal;
        }
    }
    1
}

/// Run the startup sequence: background first (fire-and-forget), then the
/// foreground task to completion. Returns the exit code to propagate.
pub async fn supervise(plan: &StartupPlan) -> i32 {
    supervise_with(&OsProcessLauncher, plan).await
}

/// Supervision over an explicit launcher.
///
/// A background spawn failure is logged and otherwise ignored; a foreground
/// spawn failure maps to 127, like a shell that cannot find the command.
pub async fn supervise_with(launcher: &dyn ProcessLauncher, plan: &StartupPlan) -> i32 {
    if let Err(e) = launcher.spawn_detached(&plan.background) {
        warn!(
            "Background task failed to start ({}): {}",
            plan.background.program, e
        );
    }

    match launcher.run_to_exit(&plan.foreground).await {
        Ok(code) => {
            info!(
                "Foreground task {} exited with code {}",
                plan.foreground.program, code
            );
            code
        }
        Err(e) => {
            error!(
                "Foreground task failed to start ({}): {}",
                plan.foreground.program, e
            );
            127
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    /// Records launch calls instead of touching the OS.
    struct RecordingLauncher {
        calls: Mutex<Vec<String>>,
        background_fails: bool,
        foreground_code: i32,
    }

    impl RecordingLauncher {
        fn new(background_fails: bool, foreground_code: i32) -> Self {
            Self {
                calls: Mutex::new(Vec::new()),
                background_fails,
                foreground_code,
            }
        }
    }

    #[async_trait]
    impl ProcessLauncher for RecordingLauncher {
        fn spawn_detached(&self, spec: &CommandSpec) -> std::io::Result<()> {
            self.calls
                .lock()
                .unwrap()
                .push(format!("detached:{}", spec.program));
            if self.background_fails {
                Err(std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    "no such file",
                ))
            } else {
                Ok(())
            }
        }

        async fn run_to_exit(&self, spec: &CommandSpec) -> std::io::Result<i32> {
            self.calls
                .lock()
                .unwrap()
                .push(format!("foreground:{}", spec.program));
            Ok(self.foreground_code)
        }
    }

    fn plan() -> StartupPlan {
        StartupPlan {
            background: CommandSpec::new("agent"),
            foreground: CommandSpec::new("gateway"),
        }
    }

    #[tokio::test]
    async fn test_background_issued_before_foreground() {
        let launcher = RecordingLauncher::new(false, 0);
        let code = supervise_with(&launcher, &plan()).await;

        assert_eq!(code, 0);
        let calls = launcher.calls.lock().unwrap();
        assert_eq!(calls.as_slice(), ["detached:agent", "foreground:gateway"]);
    }

    #[tokio::test]
    async fn test_background_failure_does_not_stop_foreground() {
        let launcher = RecordingLauncher::new(true, 0);
        let code = supervise_with(&launcher, &plan()).await;

        assert_eq!(code, 0);
        let calls = launcher.calls.lock().unwrap();
        assert_eq!(calls.len(), 2, "foreground must still launch");
    }

    #[tokio::test]
    async fn test_foreground_code_propagates() {
        let launcher = RecordingLauncher::new(false, 143);
        assert_eq!(supervise_with(&launcher, &plan()).await, 143);
    }

    #[test]
    fn test_command_spec_builder() {
        let spec = CommandSpec::new("sh").arg("-c").arg("exit 0");
        assert_eq!(spec.program, "sh");
        assert_eq!(spec.args, vec!["-c", "exit 0"]);
    }

    #[test]
    fn test_command_spec_equality() {
        assert_eq!(CommandSpec::new("sh"), CommandSpec::new("sh"));
        assert_ne!(CommandSpec::new("sh"), CommandSpec::new("sh").arg("-c"));
    }
}
