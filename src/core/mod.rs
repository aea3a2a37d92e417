pub mod camera_manager;
pub mod grid_layout;
pub mod pipeline_builder;
