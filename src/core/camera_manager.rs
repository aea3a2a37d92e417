use crate::camera_config::CameraConfig;
use crate::config_loader::MasterConfig;
use crate::core::grid_layout::GridLayout;
use anyhow::{Result, bail};
use log::{info, debug, warn};
use std::time::Instant;

/// Ordered view over the configured cameras.
pub struct CameraManager {
    cameras: Vec<CameraConfig>,
}

impl CameraManager {
    /// Names are already unique; `load_config` validates them.
    pub fn new(master_config: &MasterConfig) -> Self {
        debug!("🛠️ Initializing CameraManager...");
        let start_time = Instant::now();
        let mut cameras: Vec<CameraConfig> = Vec::with_capacity(master_config.cameras.len());
        for (idx, cam_config) in master_config.cameras.iter().enumerate() {
            debug!("  Processing camera #{}: {} ({})", idx + 1, cam_config.name, cam_config.endpoint);
            cameras.push(cam_config.clone());
        }
        info!("✅ CameraManager initialized with {} cameras in {:?}.", cameras.len(), start_time.elapsed());
        CameraManager { cameras }
    }

    pub fn len(&self) -> usize {
        self.cameras.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cameras.is_empty()
    }

    pub fn get_all_cameras(&self) -> &[CameraConfig] {
        &self.cameras
    }

    /// Cameras in the order the names were given. Unknown names are an error.
    pub fn get_cameras_by_names(&self, names: &[String]) -> Result<Vec<CameraConfig>> {
        debug!("📷 Retrieving cameras by names: {:?}", names);
        let mut result = Vec::with_capacity(names.len());
        for name in names {
            match self.cameras.iter().find(|c| c.name.eq_ignore_ascii_case(name)) {
                Some(cam) => result.push(cam.clone()),
                None => bail!(
                    "Camera '{}' not found. Known cameras: {}",
                    name,
                    self.cameras.iter().map(|c| c.name.as_str()).collect::<Vec<_>>().join(", ")
                ),
            }
        }
        Ok(result)
    }

    /// The cameras to show for `names` (all when `None`), cut down to the layout.
    pub fn select_for_layout(&self, names: Option<&[String]>, layout: &GridLayout) -> Result<Vec<CameraConfig>> {
        let mut selected = match names {
            Some(names) => self.get_cameras_by_names(names)?,
            None => self.cameras.clone(),
        };
        let capacity = layout.capacity();
        if selected.len() < capacity {
            warn!(
                "⚠️ Only {} cameras available, but {} are needed for a {}x{} grid.",
                selected.len(),
                capacity,
                layout.rows(),
                layout.columns()
            );
        } else if selected.len() > capacity {
            let ignored: Vec<&str> = selected[capacity..].iter().map(|c| c.name.as_str()).collect();
            warn!(
                "⚠️ {}x{} grid holds {} cameras; ignoring: {}",
                layout.rows(),
                layout.columns(),
                capacity,
                ignored.join(", ")
            );
            selected.truncate(capacity);
        }
        Ok(selected)
    }
}

// Helper to parse comma-separated camera names from CLI
pub fn parse_camera_names_arg(names_str_opt: Option<&String>) -> Option<Vec<String>> {
    debug!("📝 Parsing camera names argument: {:?}", names_str_opt);
    names_str_opt
        .map(|names_str| {
            names_str
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect::<Vec<String>>()
        })
        .filter(|names| !names.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app_config::{ApplicationConfig, GridConfig, StreamConfig};

    fn manager(names: &[&str]) -> CameraManager {
        let cameras = names
            .iter()
            .enumerate()
            .map(|(i, n)| CameraConfig::from_url(n, &format!("rtsp://u:p@10.0.0.{}", i + 1)).unwrap())
            .collect();
        let config = MasterConfig {
            app_settings: ApplicationConfig::default(),
            cameras,
            grid: None,
            stream: StreamConfig::default(),
        };
        CameraManager::new(&config)
    }

    #[test]
    fn names_arg_is_trimmed_and_empty_entries_dropped() {
        let arg = " front, back ,,side ".to_string();
        assert_eq!(
            parse_camera_names_arg(Some(&arg)),
            Some(vec!["front".to_string(), "back".to_string(), "side".to_string()])
        );
        assert_eq!(parse_camera_names_arg(Some(&" , ".to_string())), None);
        assert_eq!(parse_camera_names_arg(None), None);
    }

    #[test]
    fn selection_follows_requested_order() {
        let mgr = manager(&["front", "back", "side"]);
        let picked = mgr
            .get_cameras_by_names(&["side".to_string(), "FRONT".to_string()])
            .unwrap();
        let names: Vec<&str> = picked.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["side", "front"]);
        assert!(mgr.get_cameras_by_names(&["garage".to_string()]).is_err());
    }

    #[test]
    fn layout_selection_truncates_to_capacity() {
        let mgr = manager(&["a", "b", "c", "d", "e"]);
        let layout = GridLayout::new(GridConfig::new(2, 2));
        assert_eq!(mgr.select_for_layout(None, &layout).unwrap().len(), 4);

        let wide = GridLayout::new(GridConfig::new(3, 3));
        assert_eq!(mgr.select_for_layout(None, &wide).unwrap().len(), 5);
    }
}
