use crate::config_loader::MasterConfig;
use crate::core::camera_manager::CameraManager;
use crate::core::pipeline_builder::single_camera_description;
use crate::media::pipeline_session::{PipelineSession, SessionOutcome};
use crate::operations::op_helper::{print_description, run_session, InterruptListener};
use anyhow::Result;
use log::{info, error, warn};
use std::time::Instant;

/// What one camera's session means for the rest of the run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CameraStep {
    Played,
    Failed,
    Stop,
}

fn next_step(outcome: &Result<SessionOutcome>) -> CameraStep {
    match outcome {
        Ok(SessionOutcome::EndOfStream) => CameraStep::Played,
        Ok(SessionOutcome::Interrupted) => CameraStep::Stop,
        Ok(SessionOutcome::Error { .. }) | Err(_) => CameraStep::Failed,
    }
}

/// Plays every camera full screen in turn. A failing camera is logged and skipped; Ctrl-C ends the run.
pub async fn handle_sequential_cli(
    master_config: &MasterConfig,
    camera_manager: &CameraManager,
    dry_run: bool,
) -> Result<()> {
    let op_start_time = Instant::now();
    let latency_ms = master_config.app_settings.display_latency_ms;
    let cameras = camera_manager.get_all_cameras();
    let mut interrupts = InterruptListener::ctrl_c();
    let mut played = 0usize;
    let mut failed: Vec<String> = Vec::new();

    for (i, cam) in cameras.iter().enumerate() {
        if interrupts.is_interrupted() {
            info!("Stopping before camera '{}' on user request.", cam.name);
            break;
        }
        info!("🎥 Starting stream for Camera {} ({})...", i + 1, cam.endpoint.host);
        let description = single_camera_description(&cam.endpoint, latency_ms);
        if dry_run {
            print_description(&cam.name, description.launch_line());
            continue;
        }

        let session = match PipelineSession::launch(&cam.name, &description) {
            Ok(session) => session,
            Err(e) => {
                error!("❌ Could not build pipeline for '{}': {}", cam.name, e);
                failed.push(cam.name.clone());
                continue;
            }
        };

        let outcome = run_session(session, &mut interrupts).await;
        match next_step(&outcome) {
            CameraStep::Played => played += 1,
            CameraStep::Stop => {
                info!("Stopping after camera '{}' on user request.", cam.name);
                break;
            }
            CameraStep::Failed => {
                match &outcome {
                    Ok(stopped) => warn!("Camera '{}' stopped on {}; moving on.", cam.name, stopped),
                    Err(e) => error!("❌ Camera '{}' failed: {:#}", cam.name, e),
                }
                failed.push(cam.name.clone());
            }
        }
    }

    if failed.is_empty() {
        info!("✅ Sequential playback finished ({} played) in {:?}.", played, op_start_time.elapsed());
    } else {
        warn!(
            "Sequential playback finished in {:?}; {} played, {} failed: {}",
            op_start_time.elapsed(),
            played,
            failed.len(),
            failed.join(", ")
        );
    }
    Ok(())
}
