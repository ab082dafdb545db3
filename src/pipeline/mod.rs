//! The concurrent execution pipeline.
//!
//! A run wires three stages over bounded channels:
//!
//! ```text
//! producer -> job channel -> workers (one sandbox each) -> result channel -> writers
//! ```
//!
//! The producer blocks when the job channel is full, workers block when the
//! result channel is full, and writers block waiting for results; the
//! bounded channels are the only backpressure mechanism and, together with
//! the run state below, the only shared data across threads. Results may be
//! written in any order relative to input order.
//!
//! Shutdown follows channel closure: the producer's sender drops when it
//! finishes, workers drain the closed job channel and exit, their result
//! senders drop (so the result channel cannot close before every worker has
//! exited), and writers drain the closed result channel. In dry-run mode a
//! single reporting consumer replaces the writer pool.
//!
//! A failed job is fatal to the whole run: the first error is recorded, the
//! abort flag stops the other stages at their next checkpoint, and the run
//! returns the recorded error. Read failures during production are softer —
//! they stop further production but let in-flight jobs finish.

mod error;
mod job;

pub use error::{PipelineError, PipelineErrorKind};
pub use job::{output_dir, output_path, output_stem, ScriptJob, ScriptResult};

use crate::config::GeneratorConfig;
use crate::format::Formatter;
use crate::fs::FileProcessor;
use crate::sandbox::{Sandbox, SandboxConfig};
use crossbeam_channel::{bounded, Receiver, Sender};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, PoisonError};
use std::thread;
use tracing::{debug, error, info};

/// Executes every discovered script and persists the results.
///
/// Returns the first error recorded by any stage; `Ok(())` means every
/// script executed, converted, and (unless dry-run) persisted.
pub fn run(
    files: Vec<PathBuf>,
    processor: &dyn FileProcessor,
    formatter: &Formatter,
    config: &GeneratorConfig,
) -> Result<(), PipelineError> {
    let state = RunState::default();
    let sandbox_config = match &config.override_suffix {
        Some(suffix) => SandboxConfig::new().with_override_suffix(suffix),
        None => SandboxConfig::new(),
    };

    let (job_tx, job_rx) = bounded::<ScriptJob>(config.job_capacity);
    let (result_tx, result_rx) = bounded::<ScriptResult>(config.result_capacity);

    info!(
        scripts = files.len(),
        workers = config.workers,
        writers = config.writers,
        dry_run = config.dry_run,
        "starting pipeline"
    );

    thread::scope(|scope| {
        for _ in 0..config.workers {
            let jobs = job_rx.clone();
            let results = result_tx.clone();
            let sandbox_config = &sandbox_config;
            let state = &state;
            scope.spawn(move || work(sandbox_config, jobs, results, state));
        }
        // Dropping the original handles is the wait-group: the result
        // channel closes only once every worker's sender is gone.
        drop(job_rx);
        drop(result_tx);

        if config.dry_run {
            scope.spawn(|| report(result_rx));
        } else {
            for _ in 0..config.writers {
                let results = result_rx.clone();
                let state = &state;
                scope.spawn(move || write_outputs(results, processor, formatter, state));
            }
            drop(result_rx);
        }

        let suffix = formatter.suffix();
        let output_root = config.output_root.as_path();
        let state = &state;
        scope.spawn(move || produce(files, processor, suffix, output_root, job_tx, state));
    });

    state.into_result()
}

/// Shared run outcome: the first recorded error plus the abort flag.
#[derive(Debug, Default)]
struct RunState {
    first_error: Mutex<Option<PipelineError>>,
    abort: AtomicBool,
}

impl RunState {
    /// Records an error that aborts the whole run.
    fn record_fatal(&self, err: PipelineError) {
        error!(%err, "aborting run");
        self.store(err);
        self.abort.store(true, Ordering::SeqCst);
    }

    /// Records an error that only stops further production.
    fn record_stop(&self, err: PipelineError) {
        error!(%err, "stopping production");
        self.store(err);
    }

    fn store(&self, err: PipelineError) {
        let mut slot = self
            .first_error
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if slot.is_none() {
            *slot = Some(err);
        }
    }

    fn aborted(&self) -> bool {
        self.abort.load(Ordering::SeqCst)
    }

    fn into_result(self) -> Result<(), PipelineError> {
        let slot = match self.first_error.into_inner() {
            Ok(slot) => slot,
            Err(poisoned) => poisoned.into_inner(),
        };
        match slot {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

/// Producer stage: reads each input file and emits one job for it.
fn produce(
    files: Vec<PathBuf>,
    processor: &dyn FileProcessor,
    suffix: &str,
    output_root: &Path,
    jobs: Sender<ScriptJob>,
    state: &RunState,
) {
    for path in files {
        if state.aborted() {
            break;
        }
        let bytes = match processor.read_file(&path) {
            Ok(bytes) => bytes,
            Err(e) => {
                state.record_stop(PipelineError::read(&path, e.to_string()));
                break;
            }
        };
        let job = ScriptJob {
            source_dir: processor.path_to_file(&path),
            raw_content: String::from_utf8_lossy(&bytes).into_owned(),
            output_dir: job::output_dir(output_root, &path),
            output_stem: job::output_stem(&path),
            output_suffix: suffix.to_string(),
            source_path: path,
        };
        debug!(script = %job.source_path.display(), "produced job");
        if jobs.send(job).is_err() {
            break;
        }
    }
    // The sender drops here, closing the job channel.
}

/// Worker stage: owns one sandbox for its whole lifetime.
fn work(
    sandbox_config: &SandboxConfig,
    jobs: Receiver<ScriptJob>,
    results: Sender<ScriptResult>,
    state: &RunState,
) {
    let sandbox = match Sandbox::new(sandbox_config) {
        Ok(sandbox) => sandbox,
        Err(e) => {
            state.record_fatal(PipelineError::sandbox(e.to_string()));
            return;
        }
    };

    while let Ok(job) = jobs.recv() {
        if state.aborted() {
            break;
        }
        match execute_job(&sandbox, &job) {
            Ok(result) => {
                if results.send(result).is_err() {
                    break;
                }
            }
            Err(e) => {
                state.record_fatal(e);
                break;
            }
        }
    }

    // Job channel exhausted: release the interpreter VM before exiting.
    drop(sandbox);
}

fn execute_job(sandbox: &Sandbox, job: &ScriptJob) -> Result<ScriptResult, PipelineError> {
    sandbox
        .add_path(&job.source_dir)
        .map_err(|e| PipelineError::execution(&job.source_path, e.to_string()))?;

    let name = job.source_path.to_string_lossy();
    let value = sandbox
        .execute(&job.raw_content, &name)
        .map_err(|e| PipelineError::execution(&job.source_path, e.to_string()))?;

    debug!(script = %job.source_path.display(), "executed job");
    Ok(ScriptResult {
        source_path: job.source_path.clone(),
        output_dir: job.output_dir.clone(),
        output_stem: job.output_stem.clone(),
        output_suffix: job.output_suffix.clone(),
        value,
    })
}

/// Writer stage: serializes and persists results.
fn write_outputs(
    results: Receiver<ScriptResult>,
    processor: &dyn FileProcessor,
    formatter: &Formatter,
    state: &RunState,
) {
    while let Ok(result) = results.recv() {
        if state.aborted() {
            break;
        }
        let path = result.output_path();
        let bytes = match formatter.marshal(&result.value) {
            Ok(bytes) => bytes,
            Err(e) => {
                state.record_fatal(PipelineError::serialize(&result.source_path, e.to_string()));
                break;
            }
        };
        if let Err(e) = processor.write_file(&path, &bytes) {
            state.record_fatal(PipelineError::write(&path, e.to_string()));
            break;
        }
        info!(output = %path.display(), "wrote output");
    }
}

/// Dry-run consumer: reports intended output paths, persists nothing.
fn report(results: Receiver<ScriptResult>) {
    while let Ok(result) = results.recv() {
        println!("{}", result.output_path().display());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::Format;
    use crate::fs::MemoryFileProcessor;

    #[test]
    fn first_recorded_error_wins() {
        let state = RunState::default();
        state.record_fatal(PipelineError::execution("/a.lua", "first"));
        state.record_fatal(PipelineError::execution("/b.lua", "second"));

        let err = state.into_result().unwrap_err();
        assert!(err.to_string().contains("first"));
    }

    #[test]
    fn record_stop_does_not_abort() {
        let state = RunState::default();
        state.record_stop(PipelineError::read("/a.lua", "gone"));
        assert!(!state.aborted());

        let err = state.into_result().unwrap_err();
        assert!(err.is_read());
    }

    #[test]
    fn record_fatal_sets_abort() {
        let state = RunState::default();
        state.record_fatal(PipelineError::sandbox("boom"));
        assert!(state.aborted());
    }

    #[test]
    fn empty_input_completes_cleanly() {
        let processor = MemoryFileProcessor::new();
        let formatter = Formatter::new(Format::Yaml, None);
        let config = GeneratorConfig::default();

        run(Vec::new(), &processor, &formatter, &config).unwrap();
        assert!(processor.is_empty());
    }

    #[test]
    fn unreadable_script_stops_the_run_with_read_error() {
        let processor = MemoryFileProcessor::new();
        let formatter = Formatter::new(Format::Yaml, None);
        let config = GeneratorConfig::default();

        let err = run(
            vec![PathBuf::from("/mem/missing.lua")],
            &processor,
            &formatter,
            &config,
        )
        .unwrap_err();
        assert!(err.is_read());
    }
}
