use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration Error: {0}")]
    Config(String),

    #[error("Invalid camera URL format: {url}")]
    InvalidCameraUrl { url: String },

    #[error("File I/O Error: {0}")]
    Io(String),

    #[error("Invalid input: {0}")]
    Input(String),

    #[error("Pipeline Error: {0}")]
    Pipeline(String),

    #[error("RTSP Server Error: {0}")]
    RtspServer(String),

    #[error("Task Execution Error: {0}")]
    Task(String),
}

// Allow conversion from std::io::Error to AppError::Io
impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::Io(err.to_string())
    }
}

impl From<gst::glib::Error> for AppError {
    fn from(err: gst::glib::Error) -> Self {
        AppError::Pipeline(err.to_string())
    }
}

impl From<gst::glib::BoolError> for AppError {
    fn from(err: gst::glib::BoolError) -> Self {
        AppError::Pipeline(err.to_string())
    }
}
