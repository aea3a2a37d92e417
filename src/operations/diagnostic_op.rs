use crate::config_loader::MasterConfig;
use crate::core::camera_manager::CameraManager;
use crate::core::pipeline_builder::{required_elements, PipelineMode};
use anyhow::{Context, Result, bail};
use log::{info, warn, error};
use std::time::Instant;

struct DiagnosticResult {
    test_name: String,
    success: bool,
    details: String,
}

const CHECKED_MODES: [(PipelineMode, &str); 4] = [
    (PipelineMode::Single, "sequential"),
    (PipelineMode::Grid, "grid / quad"),
    (PipelineMode::GridOverlay, "grid --overlay"),
    (PipelineMode::Restream, "restream"),
];

/// Names from `wanted` that `is_available` does not know, without duplicates.
pub fn missing_elements<F>(wanted: &[&'static str], is_available: F) -> Vec<&'static str>
where
    F: Fn(&str) -> bool,
{
    let mut missing: Vec<&'static str> = Vec::new();
    for &name in wanted {
        if !missing.contains(&name) && !is_available(name) {
            missing.push(name);
        }
    }
    missing
}

pub fn handle_diagnostic_cli(master_config: &MasterConfig, camera_manager: &CameraManager) -> Result<()> {
    let overall_diag_start_time = Instant::now();
    info!("🩺 Starting diagnostic checks...");
    let mut results: Vec<DiagnosticResult> = Vec::new();

    results.push(DiagnosticResult {
        test_name: "Configuration".to_string(),
        success: true,
        details: format!(
            "{} camera(s); grid {}; RTSP output {}",
            camera_manager.len(),
            master_config
                .grid
                .map(|g| format!("{}x{} of {}x{} tiles", g.rows, g.columns, g.tile_width, g.tile_height))
                .unwrap_or_else(|| "not configured (prompted at start)".to_string()),
            master_config.stream.public_url()
        ),
    });
    for (idx, cam) in camera_manager.get_all_cameras().iter().enumerate() {
        info!("  Camera {} '{}': {}", idx + 1, cam.name, cam.endpoint);
    }

    gst::init().context("Failed to initialize GStreamer")?;
    let (major, minor, micro, _) = gst::version();
    info!("  GStreamer {}.{}.{} initialized.", major, minor, micro);

    for (mode, mode_name) in CHECKED_MODES {
        let missing = missing_elements(required_elements(mode), |name| gst::ElementFactory::find(name).is_some());
        results.push(DiagnosticResult {
            test_name: format!("Elements for {}", mode_name),
            success: missing.is_empty(),
            details: if missing.is_empty() {
                "all available".to_string()
            } else {
                format!("missing: {}", missing.join(", "))
            },
        });
    }

    info!("📋 Diagnostic summary ({:?}):", overall_diag_start_time.elapsed());
    let mut failures = 0;
    for result in &results {
        if result.success {
            info!("  ✅ {}: {}", result.test_name, result.details);
        } else {
            failures += 1;
            warn!("  ❌ {}: {}", result.test_name, result.details);
        }
    }

    if failures > 0 {
        error!("{} of {} checks failed.", failures, results.len());
        bail!("{} diagnostic check(s) failed", failures);
    }
    info!("🩺 All {} checks passed.", results.len());
    Ok(())
}
