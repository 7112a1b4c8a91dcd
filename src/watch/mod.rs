pub mod debounce;
pub mod signal;

use std::fmt::Display;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::time::{Duration, Instant};

use notify::{Config as NotifyConfig, Event, RecommendedWatcher, RecursiveMode, Watcher};

use crate::pipeline::Pipeline;
use crate::ui::Printer;

pub use debounce::DebounceQueue;

/// Quiet period after the last event on a path before `update` runs.
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(300);

/// Upper bound on how long the loop blocks before rechecking shutdown.
const TICK: Duration = Duration::from_millis(100);

/// Counters returned when the loop ends.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct LoopStats {
    pub runs: usize,
    pub failures: usize,
}

/// Watch the active theme's `user.css` and `color.ini` and rerun `update`
/// whenever one changes, until SIGINT/SIGTERM.
pub fn run(pipeline: &Pipeline) -> anyhow::Result<LoopStats> {
    let files = pipeline.watched_files()?;
    let theme = files
        .first()
        .and_then(|file| file.parent())
        .map(Path::to_path_buf)
        .ok_or_else(|| anyhow::anyhow!("no theme files to watch"))?;

    let (tx, rx) = mpsc::channel();
    let targets = files.clone();
    let mut watcher = RecommendedWatcher::new(
        move |res: notify::Result<Event>| match res {
            Ok(event) if event.kind.is_modify() || event.kind.is_create() => {
                for path in &event.paths {
                    if let Some(target) = match_target(path, &targets) {
                        let _ = tx.send(target);
                    }
                }
            }
            Ok(_) => {}
            Err(err) => tracing::warn!("watch error: {}", err),
        },
        NotifyConfig::default(),
    )?;
    watcher.watch(&theme, RecursiveMode::NonRecursive)?;

    signal::install_handlers();

    let printer = pipeline.printer();
    for file in &files {
        printer.info(&format!("watching {}", file.display()));
    }
    tracing::info!("watch started on {}", theme.display());

    let stats = run_loop(&rx, signal::shutdown_flag(), DEFAULT_DEBOUNCE, printer, |path| {
        tracing::info!("{} changed", path.display());
        pipeline.update().map(|_| ())
    });

    tracing::info!(
        "watch stopped after {} updates ({} failed)",
        stats.runs,
        stats.failures
    );
    Ok(stats)
}

/// Map an event path onto the watched file with the same name.
fn match_target(path: &Path, targets: &[PathBuf]) -> Option<PathBuf> {
    let name = path.file_name()?;
    targets
        .iter()
        .find(|target| target.file_name() == Some(name))
        .cloned()
}

/// The single consumer of file events.
///
/// The handler runs on this thread, so a second run can never start before
/// the first returns. Events that arrive during a run wait in the channel and
/// are coalesced by the queue once it is read again. A handler error is
/// reported through `printer` and counted; the loop keeps going. The loop ends
/// when `shutdown` is set, or when the sender hangs up, after flushing
/// whatever is pending.
pub fn run_loop<E, F>(
    events: &Receiver<PathBuf>,
    shutdown: &AtomicBool,
    window: Duration,
    printer: Printer,
    mut handler: F,
) -> LoopStats
where
    E: Display,
    F: FnMut(&Path) -> Result<(), E>,
{
    let mut queue = DebounceQueue::new(window);
    let mut stats = LoopStats::default();

    while !shutdown.load(Ordering::SeqCst) {
        let timeout = queue
            .next_deadline(Instant::now())
            .map_or(TICK, |deadline| deadline.min(TICK));

        let ready = match events.recv_timeout(timeout) {
            Ok(path) => {
                queue.push(path, Instant::now());
                queue.drain_ready(Instant::now())
            }
            Err(RecvTimeoutError::Timeout) => queue.drain_ready(Instant::now()),
            Err(RecvTimeoutError::Disconnected) => {
                let rest = queue.drain_all();
                handle_all(&rest, printer, &mut handler, &mut stats);
                break;
            }
        };
        handle_all(&ready, printer, &mut handler, &mut stats);
    }

    stats
}

fn handle_all<E, F>(paths: &[PathBuf], printer: Printer, handler: &mut F, stats: &mut LoopStats)
where
    E: Display,
    F: FnMut(&Path) -> Result<(), E>,
{
    for path in paths {
        match handler(path) {
            Ok(()) => stats.runs += 1,
            Err(err) => {
                stats.failures += 1;
                tracing::error!("update after {} changed failed: {}", path.display(), err);
                printer.error(&format!("update failed: {err}"));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LONG: Duration = Duration::from_secs(60);

    fn quiet() -> Printer {
        Printer::plain(true)
    }

    #[test]
    fn test_burst_is_coalesced_per_path() {
        let (tx, rx) = mpsc::channel();
        for _ in 0..5 {
            tx.send(PathBuf::from("theme/user.css")).unwrap();
        }
        tx.send(PathBuf::from("theme/color.ini")).unwrap();
        drop(tx);

        let mut seen = Vec::new();
        let stats = run_loop(&rx, &AtomicBool::new(false), LONG, quiet(), |path| {
            seen.push(path.to_path_buf());
            Ok::<(), String>(())
        });

        assert_eq!(stats, LoopStats { runs: 2, failures: 0 });
        assert_eq!(
            seen,
            vec![PathBuf::from("theme/color.ini"), PathBuf::from("theme/user.css")]
        );
    }

    #[test]
    fn test_handler_error_does_not_stop_loop() {
        let (tx, rx) = mpsc::channel();
        tx.send(PathBuf::from("a")).unwrap();
        tx.send(PathBuf::from("b")).unwrap();
        drop(tx);

        let mut calls = 0;
        let stats = run_loop(&rx, &AtomicBool::new(false), LONG, quiet(), |path| {
            calls += 1;
            if path == Path::new("a") {
                Err("broken css")
            } else {
                Ok(())
            }
        });

        assert_eq!(calls, 2);
        assert_eq!(stats, LoopStats { runs: 1, failures: 1 });
    }

    #[test]
    fn test_shutdown_flag_stops_before_handling() {
        let (tx, rx) = mpsc::channel();
        tx.send(PathBuf::from("a")).unwrap();

        let stats = run_loop(
            &rx,
            &AtomicBool::new(true),
            LONG,
            quiet(),
            |_: &Path| -> Result<(), String> { panic!("handler must not run after shutdown") },
        );

        assert_eq!(stats, LoopStats::default());
        drop(tx);
    }

    #[test]
    fn test_ready_event_runs_after_window() {
        let (tx, rx) = mpsc::channel();
        tx.send(PathBuf::from("user.css")).unwrap();

        let shutdown = AtomicBool::new(false);
        let stats = run_loop(&rx, &shutdown, Duration::from_millis(20), quiet(), |_| {
            // Stop after the first debounced run instead of waiting for a hangup.
            shutdown.store(true, Ordering::SeqCst);
            Ok::<(), String>(())
        });

        assert_eq!(stats.runs, 1);
        drop(tx);
    }

    #[test]
    fn test_events_during_a_run_are_serialized() {
        let (tx, rx) = mpsc::channel();
        tx.send(PathBuf::from("user.css")).unwrap();

        let mut sender = Some(tx);
        let mut runs = 0;
        let stats = run_loop(&rx, &AtomicBool::new(false), Duration::from_millis(10), quiet(), |_| {
            runs += 1;
            if runs == 1 {
                // A save that lands while the update is running.
                if let Some(tx) = sender.as_ref() {
                    tx.send(PathBuf::from("user.css")).unwrap();
                }
            } else {
                sender = None;
            }
            Ok::<(), String>(())
        });

        assert_eq!(stats.runs, 2);
    }

    #[test]
    fn test_match_target_by_file_name() {
        let targets = vec![
            PathBuf::from("/t/Theme/user.css"),
            PathBuf::from("/t/Theme/color.ini"),
        ];
        assert_eq!(
            match_target(Path::new("/private/t/Theme/color.ini"), &targets),
            Some(PathBuf::from("/t/Theme/color.ini"))
        );
        assert_eq!(match_target(Path::new("/t/Theme/other.css"), &targets), None);
    }
}
