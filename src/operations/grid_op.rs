use crate::app_config::GridConfig;
use crate::config_loader::MasterConfig;
use crate::core::camera_manager::{CameraManager, parse_camera_names_arg};
use crate::core::grid_layout::GridLayout;
use crate::core::pipeline_builder::{grid_description, BranchOptions};
use crate::operations::op_helper::{launch_and_wait, print_description, prompt_grid_dimensions, resolve_grid};
use anyhow::{Result, bail};
use clap::ArgMatches;
use log::{info, debug};
use std::io;
use std::time::Instant;

const QUAD_CAMERA_COUNT: usize = 4;

/// What the `grid` subcommand was asked to show.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GridRequest {
    pub rows: Option<u32>,
    pub columns: Option<u32>,
    pub overlay: bool,
    pub camera_names: Option<Vec<String>>,
}

impl GridRequest {
    pub fn from_args(args: &ArgMatches) -> Self {
        GridRequest {
            rows: args.try_get_one::<u32>("rows").ok().flatten().copied(),
            columns: args.try_get_one::<u32>("columns").ok().flatten().copied(),
            overlay: args.try_get_one::<bool>("overlay").ok().flatten().copied().unwrap_or(false),
            camera_names: parse_camera_names_arg(args.try_get_one::<String>("cameras").ok().flatten()),
        }
    }
}

pub async fn handle_grid_cli(
    master_config: &MasterConfig,
    camera_manager: &CameraManager,
    request: &GridRequest,
    dry_run: bool,
) -> Result<()> {
    let op_start_time = Instant::now();
    let grid = resolve_grid(request.rows, request.columns, master_config.grid, |rows, columns| {
        let stdin = io::stdin();
        prompt_grid_dimensions(&mut stdin.lock(), &mut io::stdout(), rows, columns)
    })?;
    let layout = GridLayout::new(grid);
    let cameras = camera_manager.select_for_layout(request.camera_names.as_deref(), &layout)?;

    info!(
        "🎬 Starting stream for {} cameras in a {}x{} grid{}...",
        cameras.len(),
        layout.rows(),
        layout.columns(),
        if request.overlay { " with overlays" } else { "" }
    );
    let options = BranchOptions {
        latency_ms: master_config.app_settings.display_latency_ms,
        overlay: request.overlay,
    };
    let description = grid_description(&cameras, &layout, options);
    debug!("Canvas size for grid: {:?}", layout.canvas_size());

    if dry_run {
        print_description("grid", description.launch_line());
        return Ok(());
    }
    let outcome = launch_and_wait("grid", &description).await?;
    info!("✅ Grid session ended ({}) after {:?}.", outcome, op_start_time.elapsed());
    Ok(())
}

/// Exactly four cameras in a fixed 2x2 grid of 640x360 tiles.
pub async fn handle_quad_cli(
    master_config: &MasterConfig,
    camera_manager: &CameraManager,
    dry_run: bool,
) -> Result<()> {
    if camera_manager.len() != QUAD_CAMERA_COUNT {
        bail!(
            "The camera list must contain exactly {} cameras (found {}).",
            QUAD_CAMERA_COUNT,
            camera_manager.len()
        );
    }
    let op_start_time = Instant::now();
    let layout = GridLayout::new(GridConfig::new(2, 2));
    let options = BranchOptions {
        latency_ms: master_config.app_settings.display_latency_ms,
        overlay: false,
    };
    info!("🎬 Starting stream for 4 cameras...");
    let description = grid_description(camera_manager.get_all_cameras(), &layout, options);

    if dry_run {
        print_description("quad", description.launch_line());
        return Ok(());
    }
    let outcome = launch_and_wait("quad", &description).await?;
    info!("✅ Quad session ended ({}) after {:?}.", outcome, op_start_time.elapsed());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::build_cli;

    #[test]
    fn request_reads_grid_subcommand_args() {
        let matches = build_cli()
            .try_get_matches_from(["camgrid", "grid", "-r", "2", "--overlay", "--cameras", "gate,lobby"])
            .unwrap();
        let (_, sub) = matches.subcommand().unwrap();
        let request = GridRequest::from_args(sub);
        assert_eq!(request.rows, Some(2));
        assert_eq!(request.columns, None);
        assert!(request.overlay);
        assert_eq!(request.camera_names, Some(vec!["gate".to_string(), "lobby".to_string()]));
    }

    #[test]
    fn request_from_top_level_matches_is_default() {
        let matches = build_cli().try_get_matches_from(["camgrid"]).unwrap();
        assert_eq!(GridRequest::from_args(&matches), GridRequest::default());
    }
}
