use crate::app_config::GridConfig;
use crate::config_loader::validate_grid;
use crate::core::pipeline_builder::PipelineDescription;
use crate::errors::AppError;
use crate::media::pipeline_session::{PipelineSession, SessionOutcome};
use anyhow::{Context, Result, bail};
use log::{info, warn, debug};
use std::future::Future;
use std::io::{self, BufRead, Write};
use std::time::Instant;
use tokio::sync::watch;
use tokio::task::JoinHandle;

/// Writes the unredacted launch line to stdout for `--dry-run`.
pub fn print_description(label: &str, description: &str) {
    info!("📝 [{}] Dry run, pipeline not launched.", label);
    println!("{}", description);
}

/// Remembers a Ctrl-C from the moment it is created, including between sessions.
pub struct InterruptListener {
    interrupted: watch::Receiver<bool>,
    task: JoinHandle<()>,
}

impl InterruptListener {
    pub fn ctrl_c() -> Self {
        Self::from_signal(tokio::signal::ctrl_c())
    }

    /// Fires when `signal` resolves `Ok`; an `Err` means no interrupts will ever arrive.
    pub fn from_signal<S>(signal: S) -> Self
    where
        S: Future<Output = io::Result<()>> + Send + 'static,
    {
        let (tx, rx) = watch::channel(false);
        let task = tokio::spawn(async move {
            match signal.await {
                Ok(()) => {
                    info!("⌨️ Keyboard interrupt received.");
                    let _ = tx.send(true);
                }
                Err(e) => {
                    warn!("Unable to listen for Ctrl-C ({}); pipelines run until EOS or error.", e);
                    // Keep the sender so waiters stay pending.
                    std::future::pending::<()>().await;
                    drop(tx);
                }
            }
        });
        InterruptListener { interrupted: rx, task }
    }

    pub fn is_interrupted(&self) -> bool {
        *self.interrupted.borrow()
    }

    pub async fn wait(&mut self) {
        if self.interrupted.wait_for(|fired| *fired).await.is_err() {
            std::future::pending::<()>().await;
        }
    }
}

impl Drop for InterruptListener {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// Runs `session` on a blocking thread with its own Ctrl-C listener.
pub async fn run_session_until_interrupted(session: PipelineSession) -> Result<SessionOutcome> {
    let mut interrupts = InterruptListener::ctrl_c();
    run_session(session, &mut interrupts).await
}

/// Runs `session` on a blocking thread; a fired `interrupts` stops it.
pub async fn run_session(session: PipelineSession, interrupts: &mut InterruptListener) -> Result<SessionOutcome> {
    let label = session.label().to_string();
    let handle = session.handle();
    let start_time = Instant::now();

    if interrupts.is_interrupted() {
        handle.interrupt();
    }
    let mut task = tokio::task::spawn_blocking(move || session.run());
    let joined = tokio::select! {
        res = &mut task => res,
        _ = interrupts.wait() => {
            info!("Stopping '{}'...", label);
            handle.interrupt();
            task.await
        }
    };

    let outcome = joined
        .map_err(|e| AppError::Task(format!("Pipeline thread for '{}' failed: {}", label, e)))?
        .with_context(|| format!("Pipeline session '{}' failed", label))?;
    debug!("Session '{}' finished with {} in {:?}", label, outcome, start_time.elapsed());
    Ok(outcome)
}

/// Launches `description` and waits for it; engine errors become `Err`.
pub async fn launch_and_wait(label: &str, description: &PipelineDescription) -> Result<SessionOutcome> {
    let session = PipelineSession::launch(label, description)
        .with_context(|| format!("Failed to launch pipeline '{}'", label))?;
    let outcome = run_session_until_interrupted(session).await?;
    fail_on_stream_error(label, &outcome)?;
    Ok(outcome)
}

pub fn fail_on_stream_error(label: &str, outcome: &SessionOutcome) -> Result<()> {
    if outcome.is_error() {
        bail!("Stream '{}' stopped on {}", label, outcome);
    }
    Ok(())
}

/// Reads one positive integer per prompt. Missing dimensions are asked for, given ones are kept.
pub fn prompt_grid_dimensions<R: BufRead, W: Write>(
    input: &mut R,
    output: &mut W,
    rows: Option<u32>,
    columns: Option<u32>,
) -> Result<(u32, u32), AppError> {
    let mut ask = |prompt: &str| -> Result<u32, AppError> {
        write!(output, "{}", prompt)?;
        output.flush()?;
        let mut line = String::new();
        if input.read_line(&mut line)? == 0 {
            return Err(AppError::Input("No grid size given on stdin.".to_string()));
        }
        match line.trim().parse::<u32>() {
            Ok(n) if n > 0 => Ok(n),
            _ => Err(AppError::Input(
                "Invalid input for rows or columns. Please enter positive integers.".to_string(),
            )),
        }
    };
    let rows = match rows {
        Some(r) => r,
        None => ask("Enter the number of rows (n): ")?,
    };
    let columns = match columns {
        Some(c) => c,
        None => ask("Enter the number of columns (m): ")?,
    };
    Ok((rows, columns))
}

/// CLI dimensions override the config's `[grid]`; whatever is still missing comes from `prompt`.
pub fn resolve_grid<P>(
    cli_rows: Option<u32>,
    cli_columns: Option<u32>,
    configured: Option<GridConfig>,
    prompt: P,
) -> Result<GridConfig>
where
    P: FnOnce(Option<u32>, Option<u32>) -> Result<(u32, u32), AppError>,
{
    let rows = cli_rows.or(configured.map(|g| g.rows));
    let columns = cli_columns.or(configured.map(|g| g.columns));
    let (rows, columns) = match (rows, columns) {
        (Some(r), Some(c)) => (r, c),
        (r, c) => prompt(r, c).context("Failed to read the grid size")?,
    };
    let base = configured.unwrap_or_else(|| GridConfig::new(rows, columns));
    let grid = GridConfig { rows, columns, ..base };
    validate_grid(&grid)?;
    Ok(grid)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn prompts_only_for_missing_dimensions() {
        let mut input = Cursor::new("3\n");
        let mut output = Vec::new();
        let dims = prompt_grid_dimensions(&mut input, &mut output, Some(2), None).unwrap();
        assert_eq!(dims, (2, 3));
        assert_eq!(String::from_utf8(output).unwrap(), "Enter the number of columns (m): ");
    }

    #[test]
    fn prompt_rejects_non_integers_and_eof() {
        let mut output = Vec::new();
        let err = prompt_grid_dimensions(&mut Cursor::new("two\n"), &mut output, None, None).unwrap_err();
        assert!(matches!(err, AppError::Input(_)));
        let err = prompt_grid_dimensions(&mut Cursor::new(""), &mut output, None, None).unwrap_err();
        assert!(matches!(err, AppError::Input(_)));
        let err = prompt_grid_dimensions(&mut Cursor::new("0\n"), &mut output, None, Some(1)).unwrap_err();
        assert!(matches!(err, AppError::Input(_)));
    }

    #[test]
    fn cli_overrides_config_and_keeps_tile_size() {
        let configured = GridConfig::new(2, 2).with_tile_size(320, 180);
        let grid = resolve_grid(Some(3), None, Some(configured), |_, _| panic!("no prompt expected")).unwrap();
        assert_eq!((grid.rows, grid.columns, grid.tile_width, grid.tile_height), (3, 2, 320, 180));
    }

    #[test]
    fn missing_grid_falls_back_to_prompt() {
        let grid = resolve_grid(None, Some(4), None, |rows, columns| {
            assert_eq!((rows, columns), (None, Some(4)));
            Ok((1, 4))
        })
        .unwrap();
        assert_eq!(grid, GridConfig::new(1, 4));
    }

    #[test]
    fn stream_errors_fail_the_operation() {
        let err = SessionOutcome::Error {
            source: Some("/GstPipeline:pipeline0/GstRTSPSrc:rtspsrc0".to_string()),
            message: "Could not open resource for reading and writing.".to_string(),
            debug: None,
        };
        assert!(fail_on_stream_error("grid", &err).is_err());
        assert!(fail_on_stream_error("grid", &SessionOutcome::EndOfStream).is_ok());
        assert!(fail_on_stream_error("grid", &SessionOutcome::Interrupted).is_ok());
    }

    #[tokio::test]
    async fn listener_remembers_an_interrupt() {
        let mut interrupts = InterruptListener::from_signal(async { Ok(()) });
        tokio::time::timeout(std::time::Duration::from_secs(5), interrupts.wait())
            .await
            .expect("interrupt should fire");
        assert!(interrupts.is_interrupted());
        // Later waits return at once.
        tokio::time::timeout(std::time::Duration::from_millis(100), interrupts.wait())
            .await
            .expect("still interrupted");
    }

    #[tokio::test]
    async fn failed_signal_setup_never_interrupts() {
        let mut interrupts =
            InterruptListener::from_signal(async { Err(io::Error::new(io::ErrorKind::Other, "no signals")) });
        let waited = tokio::time::timeout(std::time::Duration::from_millis(100), interrupts.wait()).await;
        assert!(waited.is_err());
        assert!(!interrupts.is_interrupted());
    }
}
