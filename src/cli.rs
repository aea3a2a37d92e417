use clap::{Arg, ArgAction, Command};
use log::debug;

pub const DEFAULT_INI_CONFIG: &str = "config.ini";
pub const DEFAULT_CSV_CONFIG: &str = "cameras.csv";

pub fn build_cli() -> Command {
    debug!("⚙️ Building CLI interface...");
    Command::new("camgrid")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Shows several RTSP cameras in a GStreamer grid, or re-streams the grid over RTSP.")
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("FILE")
                .help("Configuration file (.ini, .csv or .yaml); each mode has its own default")
                .global(true)
                .action(ArgAction::Set),
        )
        .arg(
            Arg::new("debug")
                .short('d')
                .long("debug")
                .help("Enable debug logging")
                .global(true)
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("dry-run")
                .long("dry-run")
                .help("Print the pipeline description(s) and exit without launching")
                .global(true)
                .action(ArgAction::SetTrue),
        )
        .subcommand(
            Command::new("sequential")
                .about("Plays each camera from cameras.csv full screen, one after another"),
        )
        .subcommand(
            Command::new("quad")
                .about("Shows exactly four cameras from cameras.csv in a 2x2 grid"),
        )
        .subcommand(
            Command::new("grid")
                .about("Shows cameras in a rows x columns grid (default mode)")
                .arg(Arg::new("rows").short('r').long("rows").value_name("N").help("Number of grid rows").value_parser(clap::value_parser!(u32).range(1..)).action(ArgAction::Set))
                .arg(Arg::new("columns").short('m').long("columns").value_name("M").help("Number of grid columns").value_parser(clap::value_parser!(u32).range(1..)).action(ArgAction::Set))
                .arg(Arg::new("overlay").long("overlay").help("Caption each tile with its camera number and address").action(ArgAction::SetTrue))
                .arg(Arg::new("cameras").long("cameras").value_name("CAM_NAMES").help("Comma-separated list of camera names to show, in order (default: all)").action(ArgAction::Set)),
        )
        .subcommand(
            Command::new("restream")
                .about("Composites the grid with overlays, displays it and republishes it over RTSP"),
        )
        .subcommand(
            Command::new("check")
                .about("Validates the configuration and reports missing GStreamer elements"),
        )
}

/// Default config file for a subcommand; `None` means the default `grid` mode.
pub fn default_config_path(subcommand: Option<&str>) -> &'static str {
    match subcommand {
        Some("sequential") | Some("quad") => DEFAULT_CSV_CONFIG,
        _ => DEFAULT_INI_CONFIG,
    }
}
