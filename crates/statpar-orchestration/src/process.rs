//! Process isolation: one child process per worker, one shared result pipe.
//!
//! The coordinator creates a single pipe. Each child gets a duplicate of
//! the write end as its stdout and its own copy of the dataset on stdin.
//! The read end stays in the coordinator, where a pump thread decodes
//! records and forwards them over a crossbeam channel so the drain can wait
//! with a deadline.
//!
//! Every descriptor std opens is close-on-exec, so a child inherits only its
//! stdio: never the read end, never a sibling's stdin.

use std::ffi::OsString;
use std::fs::File;
use std::io::{self, PipeReader, PipeWriter, Read, Write};
use std::path::PathBuf;
use std::process::{Child, ChildStdin, Command, ExitStatus, Stdio};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Instant;

use crossbeam_channel::{unbounded, Receiver, RecvTimeoutError, Sender};
use tracing::{debug, info, warn};

use statpar_core::dataset::Dataset;
use statpar_core::kind::{StatKind, StatResult};
use statpar_core::wire::{self, RecordReader};
use statpar_core::worker::worker_for;

use crate::interfaces::{IsolationMode, WorkerExit};
use crate::isolation::{Delivery, EngineError, WorkerGroup};

/// Flag that turns the binary into a single-statistic worker.
pub const WORKER_FLAG: &str = "--worker";

/// Program (plus leading arguments) launched for each worker process.
///
/// The coordinator appends `--worker <kind>`.
#[derive(Debug, Clone)]
pub struct WorkerCommand {
    program: PathBuf,
    args: Vec<OsString>,
}

impl WorkerCommand {
    #[must_use]
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    /// Re-execute the running binary.
    pub fn current_exe() -> io::Result<Self> {
        Ok(Self::new(std::env::current_exe()?))
    }

    /// Append a leading argument placed before `--worker <kind>`.
    #[must_use]
    pub fn arg(mut self, arg: impl Into<OsString>) -> Self {
        self.args.push(arg.into());
        self
    }

    fn command_for(&self, kind: StatKind) -> Command {
        let mut command = Command::new(&self.program);
        command.args(&self.args).arg(WORKER_FLAG).arg(kind.as_str());
        command
    }
}

struct ProcessWorker {
    kind: StatKind,
    child: Child,
    stdin: Option<ChildStdin>,
    killed: bool,
}

/// Three worker processes writing to one shared pipe.
pub struct ProcessGroup {
    command: WorkerCommand,
    dataset: Arc<Dataset>,
    reader: Option<PipeReader>,
    writer: Option<PipeWriter>,
    workers: Vec<ProcessWorker>,
    events: Option<Receiver<StatResult>>,
    handoffs: Vec<JoinHandle<()>>,
    pump: Option<JoinHandle<()>>,
}

impl ProcessGroup {
    /// Open the result pipe. No process is started yet.
    pub fn new(command: WorkerCommand, dataset: Arc<Dataset>) -> Result<Self, EngineError> {
        let (reader, writer) = io::pipe()?;
        Ok(Self {
            command,
            dataset,
            reader: Some(reader),
            writer: Some(writer),
            workers: Vec::new(),
            events: None,
            handoffs: Vec::new(),
            pump: None,
        })
    }

    fn sealed_error() -> EngineError {
        EngineError::Channel(io::Error::other("result channel already sealed"))
    }
}

impl WorkerGroup for ProcessGroup {
    fn mode(&self) -> IsolationMode {
        IsolationMode::Process
    }

    fn spawn(&mut self, kind: StatKind) -> Result<(), EngineError> {
        let writer = self.writer.as_ref().ok_or_else(Self::sealed_error)?;
        let stdout = writer
            .try_clone()
            .map_err(|source| EngineError::Spawn { kind, source })?;

        // The temporary `Command` owns its copy of the write end and drops it
        // at the end of this statement.
        let mut child = self
            .command
            .command_for(kind)
            .stdin(Stdio::piped())
            .stdout(Stdio::from(stdout))
            .stderr(Stdio::inherit())
            .spawn()
            .map_err(|source| EngineError::Spawn { kind, source })?;

        debug!(%kind, pid = child.id(), "worker process spawned");
        let stdin = child.stdin.take();
        self.workers.push(ProcessWorker {
            kind,
            child,
            stdin,
            killed: false,
        });
        Ok(())
    }

    fn seal(&mut self) -> Result<(), EngineError> {
        // Without this the pipe never reports end-of-stream.
        drop(self.writer.take());

        let mut payload = Vec::new();
        self.dataset.write_to(&mut payload)?;
        let payload: Arc<[u8]> = payload.into();
        // One writer per child: a worker that never reads its stdin must not
        // hold back its siblings' datasets.
        for worker in &mut self.workers {
            let Some(stdin) = worker.stdin.take() else {
                continue;
            };
            let kind = worker.kind;
            let payload = Arc::clone(&payload);
            self.handoffs.push(
                thread::Builder::new()
                    .name(format!("statpar-handoff-{kind}"))
                    .spawn(move || hand_off(kind, &payload, stdin))?,
            );
        }

        let reader = self.reader.take().ok_or_else(Self::sealed_error)?;
        let (sender, receiver) = unbounded();
        self.pump = Some(
            thread::Builder::new()
                .name("statpar-pump".into())
                .spawn(move || pump_records(reader, &sender))?,
        );
        self.events = Some(receiver);
        Ok(())
    }

    fn next_delivery(&mut self, deadline: Instant) -> Delivery {
        let Some(events) = &self.events else {
            return Delivery::Closed;
        };
        match events.recv_deadline(deadline) {
            Ok(result) => Delivery::Result(result),
            Err(RecvTimeoutError::Timeout) => Delivery::Pending,
            Err(RecvTimeoutError::Disconnected) => Delivery::Closed,
        }
    }

    fn abort(&mut self) {
        for worker in &mut self.workers {
            if matches!(worker.child.try_wait(), Ok(None)) {
                warn!(kind = %worker.kind, pid = worker.child.id(), "killing unresponsive worker");
                match worker.child.kill() {
                    Ok(()) => worker.killed = true,
                    Err(e) => warn!(kind = %worker.kind, error = %e, "failed to kill worker"),
                }
            }
            // A worker that never got its dataset must not wait on stdin.
            drop(worker.stdin.take());
        }
    }

    fn join_all(&mut self) -> Vec<(StatKind, WorkerExit)> {
        let exits = self
            .workers
            .drain(..)
            .map(|mut worker| {
                let exit = match worker.child.wait() {
                    Ok(status) => exit_of(status, worker.killed),
                    Err(e) => WorkerExit::Abnormal(e.to_string()),
                };
                debug!(kind = %worker.kind, ?exit, "worker process reaped");
                (worker.kind, exit)
            })
            .collect();

        // Helper threads finish once every child is gone.
        let helpers = self.handoffs.drain(..).chain(self.pump.take());
        for handle in helpers {
            if handle.join().is_err() {
                warn!("channel helper thread panicked");
            }
        }
        self.events = None;
        exits
    }
}

impl Drop for ProcessGroup {
    fn drop(&mut self) {
        if !self.workers.is_empty() {
            self.abort();
            let _ = self.join_all();
        }
    }
}

/// A worker that exited on its own keeps its exit code even if a kill raced it.
fn exit_of(status: ExitStatus, killed: bool) -> WorkerExit {
    match status.code() {
        Some(code) => WorkerExit::Exited(code),
        None if killed => WorkerExit::Killed,
        None => WorkerExit::Abnormal(status.to_string()),
    }
}

/// Write the serialized dataset to one worker, then close its stdin.
fn hand_off<W: Write>(kind: StatKind, payload: &[u8], mut stdin: W) {
    match stdin.write_all(payload) {
        Ok(()) => debug!(%kind, bytes = payload.len(), "dataset handed off"),
        Err(e) => warn!(%kind, error = %e, "dataset handoff failed; worker will stay silent"),
    }
}

/// Decode records until end-of-stream and forward them to the coordinator.
fn pump_records<R: Read>(reader: R, sender: &Sender<StatResult>) {
    for record in RecordReader::new(reader) {
        match record {
            Ok(result) => {
                if sender.send(result).is_err() {
                    break;
                }
            }
            Err(e) => {
                warn!(error = %e, "result stream corrupted; discarding the rest");
                break;
            }
        }
    }
    debug!("result stream closed");
}

/// Worker-process side: read the dataset, compute one statistic, emit one record.
///
/// Nothing is written to `output` unless the whole computation succeeded.
pub fn run_worker<R: Read, W: Write>(
    kind: StatKind,
    input: R,
    output: &mut W,
) -> Result<StatResult, EngineError> {
    let dataset = Dataset::read_from(input)?;
    let result = worker_for(kind).run(&dataset)?;
    wire::write_record(output, &result)?;
    info!(%kind, value = result.value, "record emitted");
    Ok(result)
}

/// Unbuffered handle to this process's stdout, so a record leaves in one write.
///
/// `io::Stdout` is line-buffered and would split a record containing a
/// `0x0A` byte into two writes.
pub fn raw_stdout() -> io::Result<File> {
    #[cfg(unix)]
    {
        use std::os::fd::AsFd;
        Ok(File::from(io::stdout().as_fd().try_clone_to_owned()?))
    }
    #[cfg(windows)]
    {
        use std::os::windows::io::AsHandle;
        Ok(File::from(io::stdout().as_handle().try_clone_to_owned()?))
    }
}
