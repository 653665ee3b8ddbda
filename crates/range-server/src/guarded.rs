//! Guarded execution pipeline: gate, policy, runner, report.

use access_gate::{AccessGate, GateError};
use command_runner::{CommandResult, CommandRunner, RunnerError};
use report_sink::{ReportError, ReportId, ReportSink};
use scan_policy::{CommandSpec, PolicyViolation, ScanPolicy};
use std::time::Instant;
use thiserror::Error;
use tracing::{info, warn};

/// A scanner invocation as requested by a caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanRequest {
    Web { url: String, action: Option<String> },
    Port { args: String },
}

impl ScanRequest {
    fn family(&self) -> &'static str {
        match self {
            ScanRequest::Web { .. } => "web-scan",
            ScanRequest::Port { .. } => "port-scan",
        }
    }
}

/// Caller identity as seen by the gate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Caller {
    pub api_key: Option<String>,
    pub source: String,
}

#[derive(Debug, Clone)]
pub struct GuardedOutcome {
    pub result: CommandResult,
    pub report_id: ReportId,
}

#[derive(Debug, Error)]
pub enum GuardedError {
    #[error(transparent)]
    Gate(#[from] GateError),

    #[error(transparent)]
    Policy(#[from] PolicyViolation),

    #[error(transparent)]
    Runner(#[from] RunnerError),

    #[error(transparent)]
    Report(#[from] ReportError),

    #[error("background task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

impl GuardedError {
    pub fn code(&self) -> &'static str {
        match self {
            GuardedError::Gate(err) => err.code(),
            GuardedError::Policy(err) => err.code(),
            GuardedError::Runner(_) | GuardedError::Report(_) | GuardedError::Task(_) => {
                "infrastructure"
            }
        }
    }
}

/// Runs scanner requests behind the access gate and the scan policy.
#[derive(Debug)]
pub struct GuardedExecutor {
    gate: AccessGate,
    policy: ScanPolicy,
    runner: CommandRunner,
    reports: ReportSink,
}

impl GuardedExecutor {
    pub fn new(gate: AccessGate, policy: ScanPolicy, reports: ReportSink) -> Self {
        Self {
            gate,
            policy,
            runner: CommandRunner::new(),
            reports,
        }
    }

    pub fn reports(&self) -> &ReportSink {
        &self.reports
    }

    /// Admit, validate, run and record one request.
    ///
    /// A timed-out run is a success carrying exit code 124.
    pub async fn execute(
        &self,
        caller: &Caller,
        request: &ScanRequest,
    ) -> Result<GuardedOutcome, GuardedError> {
        self.gate
            .admit(caller.api_key.as_deref(), &caller.source, Instant::now())?;

        let spec = self.validate(request).inspect_err(|violation| {
            warn!(
                family = request.family(),
                source = %caller.source,
                code = violation.code(),
                reason = %violation,
                "request rejected by policy"
            );
        })?;

        // The run and its report live in their own task so a caller that goes
        // away mid-flight neither kills the child nor loses the report.
        let stage = tokio::spawn(run_and_record(
            self.runner,
            self.reports.clone(),
            spec,
            request.family(),
            caller.source.clone(),
        ));
        let (result, report_id) = stage.await??;

        Ok(GuardedOutcome { result, report_id })
    }

    fn validate(&self, request: &ScanRequest) -> Result<CommandSpec, PolicyViolation> {
        match request {
            ScanRequest::Web { url, action } => self.policy.web_scan(url, action.as_deref()),
            ScanRequest::Port { args } => self.policy.port_scan(args),
        }
    }
}

async fn run_and_record(
    runner: CommandRunner,
    reports: ReportSink,
    spec: CommandSpec,
    family: &'static str,
    source: String,
) -> Result<(CommandResult, ReportId), GuardedError> {
    let result = runner.run(&spec).await?;

    let command_line = spec.command_line();
    let written = result.clone();
    let report_id =
        tokio::task::spawn_blocking(move || reports.write(&command_line, &written)).await??;

    info!(
        family,
        source = %source,
        exit_code = result.exit_code,
        report_id = %report_id,
        "guarded execution complete"
    );

    Ok((result, report_id))
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use access_gate::RateLimiter;
    use scan_policy::{PortScanPolicy, WebScanPolicy};
    use std::os::unix::fs::PermissionsExt;
    use std::path::Path;
    use std::time::Duration;
    use tempfile::tempdir;

    fn executor(dir: &Path, api_key: Option<&str>, max_attempts: usize) -> GuardedExecutor {
        executor_with_port_tool(dir, api_key, max_attempts, "echo")
    }

    fn executor_with_port_tool(
        dir: &Path,
        api_key: Option<&str>,
        max_attempts: usize,
        port_tool: &str,
    ) -> GuardedExecutor {
        let gate = AccessGate::new(
            api_key.map(str::to_string),
            RateLimiter::new(max_attempts, Duration::from_secs(60)),
        );
        let policy = ScanPolicy {
            web: WebScanPolicy::new("echo", Duration::from_secs(5)),
            port: PortScanPolicy::new(port_tool, Duration::from_secs(10)),
        };
        GuardedExecutor::new(gate, policy, ReportSink::open(dir).unwrap())
    }

    fn report_count(dir: &Path) -> usize {
        std::fs::read_dir(dir)
            .unwrap()
            .filter_map(Result::ok)
            .filter(|entry| entry.file_name().to_string_lossy().ends_with(".txt"))
            .count()
    }

    fn caller(key: Option<&str>) -> Caller {
        Caller {
            api_key: key.map(str::to_string),
            source: "127.0.0.1".to_string(),
        }
    }

    #[tokio::test]
    async fn accepted_request_runs_and_records() {
        let dir = tempdir().unwrap();
        let executor = executor(dir.path(), None, 5);

        let outcome = executor
            .execute(
                &caller(None),
                &ScanRequest::Web {
                    url: "http://example.com/a?id=1".into(),
                    action: Some("--dbs".into()),
                },
            )
            .await
            .unwrap();

        assert_eq!(outcome.result.exit_code, 0);
        assert_eq!(outcome.result.stdout, "-u http://example.com/a?id=1 --batch --dbs\n");

        let report = executor.reports().read(&outcome.report_id.to_string()).unwrap();
        assert!(report.starts_with("command: echo -u http://example.com/a?id=1 --batch --dbs\n"));
    }

    #[tokio::test]
    async fn policy_rejection_runs_nothing() {
        let dir = tempdir().unwrap();
        let executor = executor(dir.path(), None, 5);

        let err = executor
            .execute(
                &caller(None),
                &ScanRequest::Web {
                    url: "http://example.com/a?id=1".into(),
                    action: Some("--dump-all".into()),
                },
            )
            .await
            .unwrap_err();

        assert_eq!(err.code(), "blocked");
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn gate_runs_before_policy() {
        let dir = tempdir().unwrap();
        let executor = executor(dir.path(), Some("k3y"), 5);

        let err = executor
            .execute(&caller(Some("wrong")), &ScanRequest::Port { args: String::new() })
            .await
            .unwrap_err();
        assert_eq!(err.code(), "unauthorized");
    }

    #[tokio::test]
    async fn ceiling_applies_across_families() {
        let dir = tempdir().unwrap();
        let executor = executor(dir.path(), None, 1);
        let request = ScanRequest::Port {
            args: "10.0.0.1".into(),
        };

        executor.execute(&caller(None), &request).await.unwrap();
        let err = executor
            .execute(
                &caller(None),
                &ScanRequest::Web {
                    url: "http://example.com/a?id=1".into(),
                    action: None,
                },
            )
            .await
            .unwrap_err();
        assert_eq!(err.code(), "rate_limited");
    }

    #[tokio::test]
    async fn abandoned_caller_still_gets_run_and_report() {
        let reports_dir = tempdir().unwrap();
        let work = tempdir().unwrap();
        let marker = work.path().join("finished");
        let tool = work.path().join("slow-scan");
        std::fs::write(
            &tool,
            format!("#!/bin/sh\nsleep 1\ntouch '{}'\n", marker.display()),
        )
        .unwrap();
        std::fs::set_permissions(&tool, std::fs::Permissions::from_mode(0o755)).unwrap();

        let executor =
            executor_with_port_tool(reports_dir.path(), None, 5, tool.to_str().unwrap());
        let request = ScanRequest::Port {
            args: "10.0.0.1".into(),
        };

        let abandoned = tokio::time::timeout(
            Duration::from_millis(200),
            executor.execute(&caller(None), &request),
        )
        .await;
        assert!(abandoned.is_err());

        let deadline = Instant::now() + Duration::from_secs(8);
        while !(marker.exists() && report_count(reports_dir.path()) == 1) {
            assert!(Instant::now() < deadline, "run did not finish after caller left");
            tokio::time::sleep(Duration::from_millis(50)).await;
        }
    }
}
