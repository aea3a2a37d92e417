use crate::app_config::StreamConfig;
use crate::core::pipeline_builder::rtsp_factory_launch;
use crate::errors::AppError;
use gst::glib;
use gst_rtsp_server::prelude::*;
use log::{debug, info, warn};

/// RTSP endpoint that republishes the encoder's RTP packets from the local UDP port.
pub struct RestreamServer {
    server: gst_rtsp_server::RTSPServer,
    context: glib::MainContext,
    source_id: Option<glib::SourceId>,
    url: String,
}

impl RestreamServer {
    /// Binds the server and attaches it to `context`; clients are served while that context's loop runs.
    pub fn start(stream: &StreamConfig, context: &glib::MainContext) -> Result<Self, AppError> {
        gst::init()?;
        let server = gst_rtsp_server::RTSPServer::new();
        server.set_address(&stream.rtsp_host);
        server.set_service(&stream.rtsp_port.to_string());

        let mounts = server
            .mount_points()
            .ok_or_else(|| AppError::RtspServer("Could not get mount points".to_string()))?;

        let launch = rtsp_factory_launch(stream.udp_port);
        debug!("RTSP media factory launch: {}", launch);
        let factory = gst_rtsp_server::RTSPMediaFactory::new();
        factory.set_launch(&launch);
        // Every client gets the same live composite.
        factory.set_shared(true);
        // Keep the media alive when a client disconnects.
        factory.set_eos_shutdown(false);
        mounts.add_factory(&stream.mount_path(), factory);

        let source_id = server.attach(Some(context)).map_err(|e| {
            AppError::RtspServer(format!(
                "Failed to attach RTSP server on {}:{}: {}",
                stream.rtsp_host, stream.rtsp_port, e
            ))
        })?;

        let url = stream.public_url();
        info!("📡 RTSP server launched at {} (bound port {})", url, server.bound_port());
        Ok(RestreamServer {
            server,
            context: context.clone(),
            source_id: Some(source_id),
            url,
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn bound_port(&self) -> i32 {
        self.server.bound_port()
    }

    pub fn is_attached(&self) -> bool {
        self.source_id.is_some()
    }

    /// Destroys the listening source on the context it was attached to.
    pub fn stop(&mut self) {
        let Some(id) = self.source_id.take() else {
            return;
        };
        match self.context.find_source_by_id(&id) {
            Some(source) => {
                source.destroy();
                info!("RTSP server at {} detached.", self.url);
            }
            None => warn!("RTSP server source for {} was already gone.", self.url),
        }
    }
}

impl Drop for RestreamServer {
    fn drop(&mut self) {
        self.stop();
    }
}
