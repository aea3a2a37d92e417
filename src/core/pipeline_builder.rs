//! Formats camera configs into `gst-launch` style pipeline descriptions.
//!
//! Decoding, compositing and display use the NVIDIA Jetson elements; the
//! launch strings are handed to `gst::parse::launch` unchanged.

use crate::app_config::StreamConfig;
use crate::camera_config::{CameraConfig, RtspEndpoint};
use crate::core::grid_layout::{GridLayout, TilePlacement};
use std::fmt;
use std::fmt::Write;

const COMPOSITOR_NAME: &str = "comp";
const OVERLAY_FONT: &str = "Sans, 24";
const RTP_BUFFER_SIZE: u32 = 524_288;

/// Renders the `location` of a camera, real or masked.
pub type Locate = fn(&RtspEndpoint) -> String;

/// A launch line and the same line with every camera password masked.
#[derive(Clone, PartialEq, Eq)]
pub struct PipelineDescription {
    launch: String,
    redacted: String,
}

impl PipelineDescription {
    fn render<F>(build: F) -> Self
    where
        F: Fn(Locate) -> String,
    {
        PipelineDescription {
            launch: build(RtspEndpoint::location),
            redacted: build(RtspEndpoint::redacted),
        }
    }

    /// For lines that carry no camera URL, such as test sources.
    pub fn without_credentials(line: &str) -> Self {
        PipelineDescription {
            launch: line.to_string(),
            redacted: line.to_string(),
        }
    }

    /// What GStreamer parses. Never log this.
    pub fn launch_line(&self) -> &str {
        &self.launch
    }

    pub fn redacted(&self) -> &str {
        &self.redacted
    }
}

impl fmt::Display for PipelineDescription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.redacted)
    }
}

impl fmt::Debug for PipelineDescription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("PipelineDescription").field(&self.redacted).finish()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineMode {
    Single,
    Grid,
    GridOverlay,
    Restream,
}

/// How each camera branch feeding the compositor is built.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BranchOptions {
    pub latency_ms: u32,
    pub overlay: bool,
}

pub fn single_camera_description(endpoint: &RtspEndpoint, latency_ms: u32) -> PipelineDescription {
    PipelineDescription::render(|locate| {
        format!(
            "rtspsrc location=\"{}\" latency={} ! rtph265depay ! h265parse ! nvv4l2decoder ! videoconvert ! nv3dsink",
            locate(endpoint),
            latency_ms
        )
    })
}

pub fn overlay_caption(index: usize, endpoint: &RtspEndpoint) -> String {
    format!("Camera {} - {}", index + 1, endpoint.host)
}

/// One `rtspsrc ... ! comp.sink_N ` chain, trailing space included.
pub fn camera_branch(index: usize, endpoint: &RtspEndpoint, options: BranchOptions, locate: Locate) -> String {
    let mut branch = format!(
        "rtspsrc location=\"{}\" latency={} ! rtph265depay ! h265parse ! nvv4l2decoder ! ",
        locate(endpoint),
        options.latency_ms
    );
    if options.overlay {
        let _ = write!(
            branch,
            "nvvideoconvert ! textoverlay text=\"{}\" valignment=top halignment=left font-desc=\"{}\" ! nvvideoconvert ! ",
            overlay_caption(index, endpoint),
            OVERLAY_FONT
        );
    } else {
        branch.push_str("videoconvert ! ");
    }
    let _ = write!(branch, "{}.sink_{} ", COMPOSITOR_NAME, index);
    branch
}

pub fn compositor_pads(placements: &[TilePlacement]) -> String {
    placements.iter().fold(String::new(), |mut pads, tile| {
        let _ = write!(
            pads,
            "sink_{i}::xpos={} sink_{i}::ypos={} sink_{i}::width={} sink_{i}::height={} ",
            tile.xpos,
            tile.ypos,
            tile.width,
            tile.height,
            i = tile.index
        );
        pads
    })
}

fn branches(placements: &[TilePlacement], cameras: &[CameraConfig], options: BranchOptions, locate: Locate) -> String {
    placements
        .iter()
        .zip(cameras)
        .map(|(tile, cam)| camera_branch(tile.index, &cam.endpoint, options, locate))
        .collect()
}

/// Cameras beyond the layout's capacity are left out.
pub fn grid_description(cameras: &[CameraConfig], layout: &GridLayout, options: BranchOptions) -> PipelineDescription {
    let placements = layout.placements(cameras.len());
    let pads = compositor_pads(&placements);
    PipelineDescription::render(|locate| {
        format!(
            "{}nvcompositor name={} {}! nv3dsink",
            branches(&placements, cameras, options, locate),
            COMPOSITOR_NAME,
            pads
        )
    })
}

/// Grid with overlays, teed to a local display and to an H.265 encoder
/// that feeds the RTSP factory over local UDP.
pub fn restream_description(
    cameras: &[CameraConfig],
    layout: &GridLayout,
    stream: &StreamConfig,
    latency_ms: u32,
) -> PipelineDescription {
    let options = BranchOptions { latency_ms, overlay: true };
    let placements = layout.placements(cameras.len());
    let pads = compositor_pads(&placements);
    PipelineDescription::render(|locate| {
        let description = format!(
            "{branches}
             nvcompositor name={comp} {pads} !
             nvvideoconvert ! tee name=t
             t. ! queue !
                  nvvideoconvert !
                  nv3dsink
             t. ! queue max-size-buffers=1 leaky=downstream !
                  nvvideoconvert !
                  video/x-raw(memory:NVMM), format=NV12 !
                  nvv4l2h265enc bitrate={bitrate} iframeinterval=30 insert-sps-pps=1 preset-level=1 !
                  rtph265pay !
                  udpsink host=127.0.0.1 port={udp_port} sync=false async=false",
            branches = branches(&placements, cameras, options, locate),
            comp = COMPOSITOR_NAME,
            bitrate = stream.encoding_bitrate,
            udp_port = stream.udp_port,
        );
        collapse_whitespace(&description)
    })
}

/// Launch line for the RTSP media factory; `pay0` reads the encoder's RTP from UDP.
pub fn rtsp_factory_launch(udp_port: u16) -> String {
    format!(
        "( udpsrc name=pay0 port={} buffer-size={} caps=\"application/x-rtp, media=video, clock-rate=90000, encoding-name=H265, payload=96\" )",
        udp_port, RTP_BUFFER_SIZE
    )
}

pub fn required_elements(mode: PipelineMode) -> &'static [&'static str] {
    match mode {
        PipelineMode::Single => &[
            "rtspsrc",
            "rtph265depay",
            "h265parse",
            "nvv4l2decoder",
            "videoconvert",
            "nv3dsink",
        ],
        PipelineMode::Grid => &[
            "rtspsrc",
            "rtph265depay",
            "h265parse",
            "nvv4l2decoder",
            "videoconvert",
            "nvcompositor",
            "nv3dsink",
        ],
        PipelineMode::GridOverlay => &[
            "rtspsrc",
            "rtph265depay",
            "h265parse",
            "nvv4l2decoder",
            "nvvideoconvert",
            "textoverlay",
            "nvcompositor",
            "nv3dsink",
        ],
        PipelineMode::Restream => &[
            "rtspsrc",
            "rtph265depay",
            "h265parse",
            "nvv4l2decoder",
            "nvvideoconvert",
            "textoverlay",
            "nvcompositor",
            "tee",
            "queue",
            "nv3dsink",
            "nvv4l2h265enc",
            "rtph265pay",
            "udpsink",
            "udpsrc",
        ],
    }
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
