pub mod pipeline_session;
pub mod rtsp_server;
