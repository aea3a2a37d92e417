use camgrid::cli;
use camgrid::common::logging_setup;
use camgrid::config_loader;
use camgrid::core::camera_manager::CameraManager;
use camgrid::operations;
use camgrid::operations::grid_op::GridRequest;
use log::{info, error, debug};
use anyhow::{Result, bail};
use std::time::Instant;

#[tokio::main]
async fn main() -> Result<()> {
    let main_start_time = Instant::now();
    let matches = cli::build_cli().get_matches();
    let subcommand = matches.subcommand_name();
    let dry_run = matches.get_flag("dry-run");

    let config_path = matches
        .get_one::<String>("config")
        .cloned()
        .unwrap_or_else(|| cli::default_config_path(subcommand).to_string());

    let master_config = match config_loader::load_config(&config_path) {
        Ok(cfg) => {
            logging_setup::initialize_logging(Some(&cfg), &matches);
            info!("✅ Configuration loaded from: {}", config_path);
            cfg
        }
        Err(e) => {
            logging_setup::initialize_logging(None, &matches);
            error!("❌ Failed to load configuration from '{}': {}. Exiting.", config_path, e);
            return Err(anyhow::Error::new(e).context(format!("Failed to load configuration from '{}'", config_path)));
        }
    };

    info!("🚀 camgrid starting with {} cameras configured.", master_config.cameras.len());
    let camera_manager = CameraManager::new(&master_config);

    let operation_name = subcommand.unwrap_or("grid");
    debug!("🎬 Dispatching to: {}", operation_name);
    let op_start_time = Instant::now();

    let op_result: Result<()> = match matches.subcommand() {
        Some(("sequential", _)) => {
            operations::sequential_op::handle_sequential_cli(&master_config, &camera_manager, dry_run).await
        }
        Some(("quad", _)) => {
            operations::grid_op::handle_quad_cli(&master_config, &camera_manager, dry_run).await
        }
        Some(("grid", sub_matches)) => {
            let request = GridRequest::from_args(sub_matches);
            operations::grid_op::handle_grid_cli(&master_config, &camera_manager, &request, dry_run).await
        }
        Some(("restream", _)) => {
            operations::restream_op::handle_restream_cli(&master_config, &camera_manager, dry_run).await
        }
        Some(("check", _)) => {
            operations::diagnostic_op::handle_diagnostic_cli(&master_config, &camera_manager)
        }
        Some((other, _)) => bail!("Subcommand '{}' not implemented.", other),
        None => {
            let request = GridRequest::from_args(&matches);
            operations::grid_op::handle_grid_cli(&master_config, &camera_manager, &request, dry_run).await
        }
    };

    if let Err(e) = op_result {
        error!("❌ Operation '{}' failed after {:?}: {:#}", operation_name, op_start_time.elapsed(), e);
        return Err(e);
    }
    info!("🏁 camgrid finished in {:?}.", main_start_time.elapsed());
    Ok(())
}
