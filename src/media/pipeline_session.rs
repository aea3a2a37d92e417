use crate::core::pipeline_builder::PipelineDescription;
use crate::errors::AppError;
use gst::glib;
use gst::prelude::*;
use log::{debug, error, info, warn};
use std::fmt;
use std::sync::{Arc, Mutex};
use std::time::Instant;

/// Why a session's main loop stopped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionOutcome {
    EndOfStream,
    Error {
        source: Option<String>,
        message: String,
        debug: Option<String>,
    },
    Interrupted,
}

impl SessionOutcome {
    pub fn is_error(&self) -> bool {
        matches!(self, SessionOutcome::Error { .. })
    }
}

impl fmt::Display for SessionOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionOutcome::EndOfStream => f.write_str("end-of-stream"),
            SessionOutcome::Interrupted => f.write_str("interrupted"),
            SessionOutcome::Error { source, message, debug } => {
                write!(f, "error from {}: {}", source.as_deref().unwrap_or("pipeline"), message)?;
                if let Some(debug) = debug {
                    write!(f, " (debug info: {})", debug)?;
                }
                Ok(())
            }
        }
    }
}

type SharedOutcome = Arc<Mutex<Option<SessionOutcome>>>;

// First recorded outcome wins.
fn record_outcome(slot: &SharedOutcome, outcome: SessionOutcome) {
    let mut guard = slot.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
    if guard.is_none() {
        *guard = Some(outcome);
    }
}

fn current_outcome(slot: &SharedOutcome) -> Option<SessionOutcome> {
    slot.lock().unwrap_or_else(|poisoned| poisoned.into_inner()).clone()
}

/// A launched pipeline with its own GLib main context and loop.
pub struct PipelineSession {
    label: String,
    pipeline: gst::Pipeline,
    context: glib::MainContext,
    main_loop: glib::MainLoop,
    outcome: SharedOutcome,
}

/// Lets another thread stop a running (or not yet started) session.
#[derive(Clone)]
pub struct SessionHandle {
    label: String,
    context: glib::MainContext,
    main_loop: glib::MainLoop,
    outcome: SharedOutcome,
}

impl SessionHandle {
    pub fn interrupt(&self) {
        info!("⏹️ [{}] Interrupt received, stopping the pipeline...", self.label);
        record_outcome(&self.outcome, SessionOutcome::Interrupted);
        let main_loop = self.main_loop.clone();
        // Runs once the loop iterates, so an interrupt before run() is not lost.
        self.context.invoke(move || main_loop.quit());
    }
}

impl PipelineSession {
    /// Parses the launch line; only the masked form is logged.
    pub fn launch(label: &str, description: &PipelineDescription) -> Result<Self, AppError> {
        gst::init()?;
        info!("🧩 [{}] Pipeline: {}", label, description.redacted());
        let parse_start = Instant::now();

        let element = gst::parse::launch(description.launch_line())
            .map_err(|e| AppError::Pipeline(format!("Failed to create pipeline from description: {}", e)))?;
        let pipeline = match element.downcast::<gst::Pipeline>() {
            Ok(pipeline) => pipeline,
            Err(element) => {
                // A lone element comes back unwrapped.
                let pipeline = gst::Pipeline::new();
                pipeline.add(&element)?;
                pipeline
            }
        };
        debug!("[{}] Pipeline parsed in {:?}", label, parse_start.elapsed());

        let context = glib::MainContext::new();
        let main_loop = glib::MainLoop::new(Some(&context), false);
        Ok(PipelineSession {
            label: label.to_string(),
            pipeline,
            context,
            main_loop,
            outcome: Arc::new(Mutex::new(None)),
        })
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    /// The context the session's loop dispatches; attach extra sources (e.g. an RTSP server) here.
    pub fn context(&self) -> &glib::MainContext {
        &self.context
    }

    pub fn handle(&self) -> SessionHandle {
        SessionHandle {
            label: self.label.clone(),
            context: self.context.clone(),
            main_loop: self.main_loop.clone(),
            outcome: self.outcome.clone(),
        }
    }

    /// Plays the pipeline and blocks until EOS, an engine error or an interrupt.
    /// The pipeline is always back in `Null` when this returns.
    pub fn run(self) -> Result<SessionOutcome, AppError> {
        let context = self.context.clone();
        context
            .with_thread_default(|| self.run_on_context())
            .map_err(|e| AppError::Pipeline(format!("Failed to acquire main context: {}", e)))?
    }

    fn run_on_context(&self) -> Result<SessionOutcome, AppError> {
        if let Some(outcome) = current_outcome(&self.outcome) {
            info!("[{}] Session {} before start; not playing.", self.label, outcome);
            return Ok(outcome);
        }

        let bus = self
            .pipeline
            .bus()
            .ok_or_else(|| AppError::Pipeline("Pipeline has no bus".to_string()))?;

        let label = self.label.clone();
        let outcome = self.outcome.clone();
        let main_loop = self.main_loop.clone();
        let _bus_watch = bus.add_watch(move |_, msg| {
            handle_bus_message(&label, msg, &outcome, &main_loop);
            glib::ControlFlow::Continue
        })?;

        let run_start = Instant::now();
        if let Err(e) = self.pipeline.set_state(gst::State::Playing) {
            let detail = bus
                .pop_filtered(&[gst::MessageType::Error])
                .and_then(|msg| match msg.view() {
                    gst::MessageView::Error(err) => Some(err.error().to_string()),
                    _ => None,
                })
                .unwrap_or_else(|| e.to_string());
            self.shutdown();
            return Err(AppError::Pipeline(format!(
                "Unable to set the pipeline to the `Playing` state: {}",
                detail
            )));
        }
        info!("▶️ [{}] Pipeline started, playing the RTSP stream(s)...", self.label);

        self.main_loop.run();

        self.shutdown();
        let outcome = current_outcome(&self.outcome).unwrap_or(SessionOutcome::Interrupted);
        info!("[{}] Session ended ({}) after {:?}.", self.label, outcome, run_start.elapsed());
        Ok(outcome)
    }

    fn shutdown(&self) {
        match self.pipeline.set_state(gst::State::Null) {
            Ok(_) => info!("⏹️ [{}] Pipeline stopped and GLib main loop exited.", self.label),
            Err(e) => warn!("[{}] Unable to set the pipeline to the `Null` state: {}", self.label, e),
        }
    }
}

fn handle_bus_message(label: &str, msg: &gst::Message, outcome: &SharedOutcome, main_loop: &glib::MainLoop) {
    use gst::MessageView;

    match msg.view() {
        MessageView::Eos(..) => {
            info!("🏁 [{}] End-of-stream (EOS) received. Shutting down...", label);
            record_outcome(outcome, SessionOutcome::EndOfStream);
            main_loop.quit();
        }
        MessageView::Error(err) => {
            let source = err.src().map(|s| s.path_string().to_string());
            let message = err.error().to_string();
            let debug = err.debug().map(|d| d.to_string());
            error!(
                "❌ [{}] Error from {}: {}, Debug info: {}",
                label,
                source.as_deref().unwrap_or("pipeline"),
                message,
                debug.as_deref().unwrap_or("none")
            );
            record_outcome(outcome, SessionOutcome::Error { source, message, debug });
            main_loop.quit();
        }
        MessageView::Warning(w) => {
            warn!(
                "⚠️ [{}] Warning from {}: {}",
                label,
                w.src().map(|s| s.path_string().to_string()).as_deref().unwrap_or("pipeline"),
                w.error()
            );
        }
        MessageView::StateChanged(sc) => {
            if msg.src().is_some_and(|s| s.downcast_ref::<gst::Pipeline>().is_some()) {
                debug!("[{}] Pipeline state {:?} -> {:?}", label, sc.old(), sc.current());
            }
        }
        _ => (),
    }
}
