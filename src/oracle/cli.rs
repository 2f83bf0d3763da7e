//! Oracle backed by a command-line analyzer (`claude -p <prompt> --model <model>`).

use std::process::Stdio;
use std::time::Duration;

use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::Command;

use super::{Oracle, OracleVerdict, parse_response, prompt, truncate};
use crate::config::OracleConfig;
use crate::error::OracleUnavailable;

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Diagnostics keep at most this many characters of oracle output.
const DIAGNOSTIC_CHARS: usize = 200;

/// How long to keep draining the pipes after the oracle exits. A background
/// process it left behind may hold them open indefinitely.
const PIPE_GRACE: Duration = Duration::from_millis(250);

#[derive(Debug, Clone)]
pub struct CliOracle {
    program: String,
    args: Vec<String>,
    model: String,
    timeout: Duration,
}

impl CliOracle {
    pub fn new(program: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            model: model.into(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn from_config(config: &OracleConfig) -> Self {
        let timeout = match config.timeout_secs {
            0 => DEFAULT_TIMEOUT,
            secs => Duration::from_secs(secs),
        };
        Self::new(&config.program, &config.model)
            .with_args(config.args.clone())
            .with_timeout(timeout)
    }

    /// Arguments placed before `-p <prompt> --model <model>`.
    pub fn with_args(mut self, args: Vec<String>) -> Self {
        self.args = args;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    fn command(&self, prompt: &str) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args)
            .arg("-p")
            .arg(prompt)
            .arg("--model")
            .arg(&self.model)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        cmd
    }

    /// Run the analyzer once and return its stdout if it exited cleanly.
    ///
    /// The child is killed and reaped when the timeout fires; on every other
    /// early return `kill_on_drop` takes care of it.
    async fn run(&self, command: &str) -> Result<String, OracleUnavailable> {
        let mut child = self
            .command(&prompt::build_prompt(command))
            .spawn()
            .map_err(|e| match e.kind() {
                std::io::ErrorKind::NotFound => OracleUnavailable::NotFound {
                    program: self.program.clone(),
                },
                _ => OracleUnavailable::Io(e),
            })?;

        let mut stdout = child.stdout.take();
        let mut stderr = child.stderr.take();
        let collect = async {
            let mut out = Vec::new();
            let mut err = Vec::new();
            let status = {
                let reads = async {
                    tokio::join!(
                        read_pipe(stdout.as_mut(), &mut out),
                        read_pipe(stderr.as_mut(), &mut err),
                    )
                };
                tokio::pin!(reads);
                let (status, drained) = tokio::select! {
                    status = child.wait() => (status?, false),
                    _ = &mut reads => (child.wait().await?, true),
                };
                if !drained && tokio::time::timeout(PIPE_GRACE, &mut reads).await.is_err() {
                    log::debug!("oracle pipes still open after exit, using output so far");
                }
                status
            };
            Ok::<_, std::io::Error>((status, out, err))
        };
        let result = tokio::time::timeout(self.timeout, collect).await;

        let (status, out, err) = match result {
            Ok(collected) => collected?,
            Err(_) => {
                if let Err(e) = child.kill().await {
                    log::debug!("failed to kill timed-out oracle: {e}");
                }
                return Err(OracleUnavailable::Timeout {
                    after: self.timeout,
                });
            }
        };

        if !status.success() {
            return Err(OracleUnavailable::NonZeroExit {
                code: status.code(),
                stderr: String::from_utf8_lossy(&err).into_owned(),
            });
        }
        Ok(String::from_utf8_lossy(&out).into_owned())
    }
}

async fn read_pipe<R: AsyncRead + Unpin>(
    pipe: Option<&mut R>,
    buf: &mut Vec<u8>,
) -> std::io::Result<usize> {
    match pipe {
        Some(pipe) => pipe.read_to_end(buf).await,
        None => Ok(0),
    }
}

impl Oracle for CliOracle {
    fn evaluate(&self, command: &str) -> OracleVerdict {
        let runtime = match tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
        {
            Ok(rt) => rt,
            Err(e) => return OracleVerdict::Indeterminate(OracleUnavailable::Runtime(e)),
        };

        log::debug!("consulting oracle {} (model {})", self.program, self.model);
        let verdict = match runtime.block_on(self.run(command)) {
            Ok(stdout) => parse_response(&stdout),
            Err(cause) => OracleVerdict::Indeterminate(cause),
        };

        match &verdict {
            OracleVerdict::Safe(reason) => log::info!("oracle validated: {reason}"),
            OracleVerdict::Unsafe(reason) => log::info!("oracle blocked: {reason}"),
            OracleVerdict::Indeterminate(OracleUnavailable::NonZeroExit { stderr, .. })
                if !stderr.trim().is_empty() =>
            {
                log::warn!("oracle stderr: {}", truncate(stderr.trim(), DIAGNOSTIC_CHARS));
            }
            OracleVerdict::Indeterminate(OracleUnavailable::UnexpectedResponse { response }) => {
                log::warn!("oracle response: {}", truncate(response, DIAGNOSTIC_CHARS));
            }
            OracleVerdict::Indeterminate(_) => {}
        }
        verdict
    }
}
