//! Multi-file builds: source discovery and parallel compilation.
//!
//! Every file is an independent compilation unit with its own tokenizer,
//! symbol table and writer, so files are handed to a pool of workers with no
//! shared state beyond the job queue.

use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::{Duration, Instant};

use colored::Colorize;
use crossbeam::channel;
use walkdir::WalkDir;

use crate::error::JackError;
use crate::SOURCE_EXTENSION;

/// Options for a build run.
#[derive(Debug, Clone)]
pub struct BuildConfig {
    /// Number of worker threads.
    pub jobs: usize,
    /// Print a line for every file as it is compiled.
    pub verbose: bool,
    /// Skip files not yet started once one file has failed.
    pub fail_fast: bool,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            jobs: thread::available_parallelism().map_or(1, |n| n.get()),
            verbose: false,
            fail_fast: false,
        }
    }
}

/// What happened to one source file.
#[derive(Debug)]
pub enum FileStatus {
    Compiled(PathBuf),
    Failed(JackError),
    /// Not attempted because an earlier file failed under `fail_fast`.
    Skipped,
}

#[derive(Debug)]
pub struct FileOutcome {
    pub source: PathBuf,
    pub status: FileStatus,
    pub duration: Duration,
}

/// Per-file results, in the order the files were given.
#[derive(Debug, Default)]
pub struct BuildReport {
    pub outcomes: Vec<FileOutcome>,
    pub elapsed: Duration,
}

impl BuildReport {
    pub fn succeeded(&self) -> usize {
        self.count(|s| matches!(s, FileStatus::Compiled(_)))
    }

    pub fn failed(&self) -> usize {
        self.count(|s| matches!(s, FileStatus::Failed(_)))
    }

    pub fn skipped(&self) -> usize {
        self.count(|s| matches!(s, FileStatus::Skipped))
    }

    pub fn is_success(&self) -> bool {
        self.failed() == 0 && self.skipped() == 0
    }

    fn count(&self, pred: impl Fn(&FileStatus) -> bool) -> usize {
        self.outcomes.iter().filter(|o| pred(&o.status)).count()
    }
}

fn is_source_file(path: &Path) -> bool {
    path.extension().map_or(false, |e| e == SOURCE_EXTENSION)
}

/// Resolve a build target to the list of sources to compile.
///
/// A file must carry the `.jack` extension. A directory contributes the
/// `.jack` files directly inside it (subdirectories are not searched),
/// sorted by file name.
pub fn collect_sources(path: &Path) -> io::Result<Vec<PathBuf>> {
    if path.is_file() {
        if !is_source_file(path) {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("'{}' is not a .{} file", path.display(), SOURCE_EXTENSION),
            ));
        }
        return Ok(vec![path.to_path_buf()]);
    }

    let mut files = Vec::new();
    for entry in WalkDir::new(path)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
    {
        let entry = entry?;
        if entry.file_type().is_file() && is_source_file(entry.path()) {
            files.push(entry.into_path());
        }
    }
    Ok(files)
}

/// Compile every file, in parallel across `config.jobs` workers.
///
/// A failing file never stops the others unless `fail_fast` is set, in which
/// case files that have not started yet are reported as skipped.
pub fn build(files: &[PathBuf], config: &BuildConfig) -> BuildReport {
    let start = Instant::now();
    if files.is_empty() {
        return BuildReport::default();
    }

    let (job_tx, job_rx) = channel::unbounded::<(usize, &PathBuf)>();
    let (result_tx, result_rx) = channel::unbounded::<(usize, FileOutcome)>();
    for job in files.iter().enumerate() {
        let _ = job_tx.send(job);
    }
    drop(job_tx);

    let failed = AtomicBool::new(false);
    let workers = config.jobs.clamp(1, files.len());

    thread::scope(|s| {
        for _ in 0..workers {
            let job_rx = job_rx.clone();
            let result_tx = result_tx.clone();
            let failed = &failed;

            s.spawn(move || {
                for (index, file) in job_rx.iter() {
                    let outcome = if config.fail_fast && failed.load(Ordering::SeqCst) {
                        FileOutcome {
                            source: file.clone(),
                            status: FileStatus::Skipped,
                            duration: Duration::ZERO,
                        }
                    } else {
                        let outcome = compile_one(file, config);
                        if matches!(outcome.status, FileStatus::Failed(_)) {
                            failed.store(true, Ordering::SeqCst);
                        }
                        outcome
                    };
                    let _ = result_tx.send((index, outcome));
                }
            });
        }
    });
    drop(result_tx);

    let mut slots: Vec<Option<FileOutcome>> = files.iter().map(|_| None).collect();
    for (index, outcome) in result_rx.iter() {
        slots[index] = Some(outcome);
    }

    BuildReport {
        outcomes: slots.into_iter().flatten().collect(),
        elapsed: start.elapsed(),
    }
}

fn compile_one(file: &Path, config: &BuildConfig) -> FileOutcome {
    if config.verbose {
        println!("{} {}", "Compiling".cyan().bold(), file.display());
    }
    let start = Instant::now();
    let status = match crate::compile_file(file) {
        Ok(out) => FileStatus::Compiled(out),
        Err(e) => FileStatus::Failed(e),
    };
    FileOutcome {
        source: file.to_path_buf(),
        status,
        duration: start.elapsed(),
    }
}

pub fn format_duration(duration: Duration) -> String {
    let micros = duration.as_micros();
    if micros < 1000 {
        format!("{}µs", micros)
    } else if micros < 1_000_000 {
        format!("{}ms", (micros + 500) / 1000)
    } else {
        format!("{}.{:02}s", micros / 1_000_000, (micros % 1_000_000) / 10_000)
    }
}

/// Print one line per file and a summary, in the order the files were given.
pub fn print_report(report: &BuildReport) {
    for outcome in &report.outcomes {
        let timing = format_duration(outcome.duration);
        match &outcome.status {
            FileStatus::Compiled(out) => println!(
                "  {} {} -> {} {}",
                "✓".green(),
                outcome.source.display(),
                out.display(),
                timing.dimmed()
            ),
            FileStatus::Failed(e) => eprintln!(
                "  {} {}: {} {}",
                "✗".red(),
                outcome.source.display(),
                e,
                timing.dimmed()
            ),
            FileStatus::Skipped => {
                println!("  {} {} (skipped)", "-".yellow(), outcome.source.display())
            }
        }
    }

    println!();
    let summary = format!(
        "{} compiled, {} failed, {} skipped in {}",
        report.succeeded(),
        report.failed(),
        report.skipped(),
        format_duration(report.elapsed)
    );
    if report.is_success() {
        println!("{}", summary.green());
    } else {
        println!("{}", summary.red());
    }
}
