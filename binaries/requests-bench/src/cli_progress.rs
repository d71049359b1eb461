use std::{
    collections::HashMap,
    io::{self, Write},
    thread::{self, JoinHandle},
};

use bench_harness::{ProgressEvent, Strategy, StrategyReport};
use indicatif::{MultiProgress, ProgressBar, ProgressDrawTarget, ProgressStyle};
use tokio::sync::mpsc;
use tracing::warn;

/// Single consumer of the progress channel. Owns every line the benchmark
/// prints to stdout so bars and result lines never interleave.
pub struct CliProgress {
    multi_progress: MultiProgress,
    progress_bars: HashMap<Strategy, ProgressBar>,
    out: Box<dyn Write + Send>,
}

impl CliProgress {
    pub fn new(quiet: bool) -> Self {
        let multi_progress = if quiet {
            MultiProgress::with_draw_target(ProgressDrawTarget::hidden())
        } else {
            MultiProgress::new()
        };

        Self {
            multi_progress,
            progress_bars: HashMap::new(),
            out: Box::new(io::stdout()),
        }
    }

    #[cfg(test)]
    pub fn with_output(mut self, out: Box<dyn Write + Send>) -> Self {
        self.out = out;
        self
    }

    pub fn spawn(
        self, progress_rx: mpsc::UnboundedReceiver<ProgressEvent>,
    ) -> io::Result<JoinHandle<()>> {
        thread::Builder::new()
            .name("progress".to_string())
            .spawn(move || self.run(progress_rx))
    }

    /// Blocks until `Shutdown` arrives or every sender is gone.
    pub fn run(
        mut self, mut progress_rx: mpsc::UnboundedReceiver<ProgressEvent>,
    ) {
        while let Some(event) = progress_rx.blocking_recv() {
            match event {
                ProgressEvent::Started { strategy, total } => {
                    self.handle_started(strategy, total);
                }
                ProgressEvent::Advanced(strategy) => {
                    if let Some(pb) = self.progress_bars.get(&strategy) {
                        pb.inc(1);
                    }
                }
                ProgressEvent::Failed { .. } => {
                    self.emit("Error!");
                }
                ProgressEvent::Finished(report) => {
                    self.handle_finished(report);
                }
                ProgressEvent::Aborted { strategy, error } => {
                    self.handle_aborted(strategy, error);
                }
                ProgressEvent::Shutdown => break,
            }
        }
        let _ = self.out.flush();
    }

    fn handle_started(&mut self, strategy: Strategy, total: usize) {
        let pb = self.multi_progress.add(ProgressBar::new(total as u64));
        pb.set_style(
            ProgressStyle::default_bar()
                .template(
                    "{prefix:.bold} [{bar:40.cyan/blue}] {pos:>7}/{len:7} \
                     ({percent}%) {msg}",
                )
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("=>-"),
        );
        pb.set_prefix(format!("{:12}", strategy.name()));
        pb.set_message("Making requests");
        self.progress_bars.insert(strategy, pb);
    }

    fn handle_finished(&mut self, report: StrategyReport) {
        if let Some(pb) = self.progress_bars.get(&report.strategy) {
            pb.finish_with_message("done");
        }
        self.emit(&report.to_string());
    }

    fn handle_aborted(&mut self, strategy: Strategy, error: String) {
        if let Some(pb) = self.progress_bars.get(&strategy) {
            pb.abandon_with_message(format!("ERROR: {}", error));
        }
    }

    fn emit(&mut self, line: &str) {
        let out = &mut self.out;
        let written = self.multi_progress.suspend(|| writeln!(out, "{}", line));
        if let Err(e) = written {
            warn!("Failed to write output line: {}", e);
        }
    }
}
