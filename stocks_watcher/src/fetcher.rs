//! Invocation of the external quote-retrieval routine.
//!
//! The watcher does not talk to any quote source itself; it shells out to a
//! configured script and waits for it to finish. The routine's combined
//! stdout/stderr is captured for diagnostics only — parsing of the result it
//! writes happens downstream through the tolerant snapshot reader.
use std::io::Read;
use std::path::PathBuf;
use std::process::{Child, Command, ExitStatus, Stdio};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use log::{debug, info};

use stocks_common::{Result, StoreError};

/// How often a running child is polled for completion.
const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Runs the external quote-retrieval routine as a child process.
///
/// The routine is invoked as `<command> <script> <output>`: it receives the
/// path to itself and the path it must write its raw result to.
pub struct QuoteFetcher {
    command: String,
    script: PathBuf,
    output: PathBuf,
    timeout: Duration,
}

impl QuoteFetcher {
    /// Creates a fetcher for the given routine.
    pub fn new(
        command: impl Into<String>,
        script: impl Into<PathBuf>,
        output: impl Into<PathBuf>,
        timeout: Duration,
    ) -> Self {
        QuoteFetcher {
            command: command.into(),
            script: script.into(),
            output: output.into(),
            timeout,
        }
    }

    /// Runs one fetch and waits synchronously for it to finish.
    ///
    /// Exit code 0 means success, whatever the routine printed. Launch
    /// failure, a non-zero exit, or exceeding the timeout (the child is
    /// killed) all yield [`StoreError::Fetch`]. The fetcher never touches the
    /// published snapshot, so a failed fetch leaves previously good data in
    /// place.
    pub fn fetch(&self) -> Result<()> {
        let started = Instant::now();
        let mut child = Command::new(&self.command)
            .arg(&self.script)
            .arg(&self.output)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| {
                StoreError::Fetch(format!("failed to launch {}: {}", self.command, e))
            })?;

        // Drain the pipes on side threads so a chatty routine cannot fill a
        // pipe buffer and stall while we poll for completion.
        let stdout = spawn_drain(child.stdout.take());
        let stderr = spawn_drain(child.stderr.take());

        let status = self.wait_with_deadline(&mut child, started)?;
        let output_text = join_output(stdout, stderr);

        if !status.success() {
            return Err(StoreError::Fetch(format!(
                "{} exited with {}: {}",
                self.script.display(),
                status,
                output_text.trim()
            )));
        }

        if output_text.trim().is_empty() {
            debug!(
                "fetch routine finished silently in {:?}",
                started.elapsed()
            );
        } else {
            info!("fetch routine output: {}", output_text.trim());
        }
        Ok(())
    }

    /// Polls the child until it exits or the timeout passes, in which case
    /// the child is killed (best-effort cancellation) and an error returned.
    fn wait_with_deadline(&self, child: &mut Child, started: Instant) -> Result<ExitStatus> {
        loop {
            match child.try_wait() {
                Ok(Some(status)) => return Ok(status),
                Ok(None) => {
                    if started.elapsed() >= self.timeout {
                        let _ = child.kill();
                        let _ = child.wait();
                        return Err(StoreError::Fetch(format!(
                            "{} timed out after {:?} and was killed",
                            self.script.display(),
                            self.timeout
                        )));
                    }
                    thread::sleep(POLL_INTERVAL);
                }
                Err(e) => {
                    return Err(StoreError::Fetch(format!(
                        "failed to wait for {}: {}",
                        self.script.display(),
                        e
                    )));
                }
            }
        }
    }
}

fn spawn_drain<R: Read + Send + 'static>(stream: Option<R>) -> JoinHandle<Vec<u8>> {
    thread::spawn(move || {
        let mut buf = Vec::new();
        if let Some(mut stream) = stream {
            let _ = stream.read_to_end(&mut buf);
        }
        buf
    })
}

fn join_output(stdout: JoinHandle<Vec<u8>>, stderr: JoinHandle<Vec<u8>>) -> String {
    let mut combined = stdout.join().unwrap_or_default();
    combined.extend(stderr.join().unwrap_or_default());
    String::from_utf8_lossy(&combined).into_owned()
}
