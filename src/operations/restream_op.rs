use crate::config_loader::{validate_grid, MasterConfig};
use crate::core::camera_manager::CameraManager;
use crate::core::grid_layout::GridLayout;
use crate::core::pipeline_builder::{restream_description, rtsp_factory_launch};
use crate::media::pipeline_session::PipelineSession;
use crate::media::rtsp_server::RestreamServer;
use crate::operations::op_helper::{
    fail_on_stream_error, print_description, prompt_grid_dimensions, resolve_grid, run_session_until_interrupted,
};
use anyhow::{Context, Result};
use log::info;
use std::io;
use std::time::Instant;

pub async fn handle_restream_cli(
    master_config: &MasterConfig,
    camera_manager: &CameraManager,
    dry_run: bool,
) -> Result<()> {
    let op_start_time = Instant::now();
    let stream = &master_config.stream;
    let grid = resolve_grid(None, None, master_config.grid, |rows, columns| {
        let stdin = io::stdin();
        prompt_grid_dimensions(&mut stdin.lock(), &mut io::stdout(), rows, columns)
    })?
    .with_tile_size(stream.tile_width, stream.tile_height);
    validate_grid(&grid)?;
    let layout = GridLayout::new(grid);
    let cameras = camera_manager.select_for_layout(None, &layout)?;

    info!(
        "🎬 Starting composited stream for {} camera(s) in a {}x{} grid...",
        cameras.len(),
        layout.rows(),
        layout.columns()
    );
    let description = restream_description(
        &cameras,
        &layout,
        stream,
        master_config.app_settings.restream_latency_ms,
    );

    if dry_run {
        print_description("restream", description.launch_line());
        print_description("rtsp-factory", &rtsp_factory_launch(stream.udp_port));
        return Ok(());
    }

    let session = PipelineSession::launch("restream", &description)
        .context("Failed to create the re-stream pipeline")?;
    let mut server = RestreamServer::start(stream, session.context())
        .context("Failed to start the RTSP server")?;
    info!("Press Ctrl+C to stop. Clients can connect to {}", server.url());

    let outcome = run_session_until_interrupted(session).await;
    server.stop();
    let outcome = outcome?;
    fail_on_stream_error("restream", &outcome)?;
    info!("✅ Re-stream ended ({}) after {:?}.", outcome, op_start_time.elapsed());
    Ok(())
}
