use serde::Deserialize;

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct ApplicationConfig {
    pub log_level: Option<String>, // CLI --debug takes precedence
    pub display_latency_ms: u32, // rtspsrc jitterbuffer latency for local display
    pub restream_latency_ms: u32,
    pub log_timestamp_format: String, // strftime format string
}

impl Default for ApplicationConfig {
    fn default() -> Self {
        ApplicationConfig {
            log_level: Some("info".to_string()),
            display_latency_ms: 200,
            restream_latency_ms: 50,
            log_timestamp_format: "%Y-%m-%dT%H:%M:%S%.3f".to_string(),
        }
    }
}

/// Grid shape and the size of each tile on the compositor canvas.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
pub struct GridConfig {
    #[serde(default = "default_dimension")]
    pub rows: u32,
    #[serde(default = "default_dimension")]
    pub columns: u32,
    #[serde(default = "default_tile_width")]
    pub tile_width: u32,
    #[serde(default = "default_tile_height")]
    pub tile_height: u32,
}

impl GridConfig {
    pub fn new(rows: u32, columns: u32) -> Self {
        GridConfig {
            rows,
            columns,
            tile_width: default_tile_width(),
            tile_height: default_tile_height(),
        }
    }

    pub fn with_tile_size(mut self, tile_width: u32, tile_height: u32) -> Self {
        self.tile_width = tile_width;
        self.tile_height = tile_height;
        self
    }
}

fn default_dimension() -> u32 {
    1
}

fn default_tile_width() -> u32 {
    640
}

fn default_tile_height() -> u32 {
    360
}

/// Settings for re-publishing the composited grid over RTSP.
#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct StreamConfig {
    pub rtsp_host: String,
    pub rtsp_port: u16,
    pub mount_point: String,
    pub udp_port: u16, // local hop between the encoder and the RTSP factory
    pub tile_width: u32,
    pub tile_height: u32,
    pub encoding_bitrate: u32, // bits per second
}

impl Default for StreamConfig {
    fn default() -> Self {
        StreamConfig {
            rtsp_host: "127.0.0.1".to_string(),
            rtsp_port: 8554,
            mount_point: "/multicam".to_string(),
            udp_port: 5400,
            tile_width: 320,
            tile_height: 180,
            encoding_bitrate: 1_000_000,
        }
    }
}

impl StreamConfig {
    /// `/multicam` for `multicam`, unchanged when already rooted.
    pub fn mount_path(&self) -> String {
        let trimmed = self.mount_point.trim();
        if trimmed.starts_with('/') {
            trimmed.to_string()
        } else {
            format!("/{}", trimmed)
        }
    }

    pub fn public_url(&self) -> String {
        format!("rtsp://{}:{}{}", self.rtsp_host, self.rtsp_port, self.mount_path())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn public_url_roots_the_mount_point() {
        let mut stream = StreamConfig::default();
        assert_eq!(stream.public_url(), "rtsp://127.0.0.1:8554/multicam");
        stream.mount_point = "multicam".to_string();
        assert_eq!(stream.mount_path(), "/multicam");
        assert_eq!(stream.public_url(), "rtsp://127.0.0.1:8554/multicam");
    }
}
