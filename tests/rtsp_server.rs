use camgrid::app_config::StreamConfig;
use camgrid::media::rtsp_server::RestreamServer;
use gst::glib;

fn local_stream(mount_point: &str) -> StreamConfig {
    StreamConfig {
        rtsp_host: "127.0.0.1".to_string(),
        // Let the OS pick a free port.
        rtsp_port: 0,
        mount_point: mount_point.to_string(),
        ..StreamConfig::default()
    }
}

#[test]
fn server_on_private_context_starts_and_stops() {
    let context = glib::MainContext::new();

    let mut server = RestreamServer::start(&local_stream("multicam"), &context).expect("start");
    assert!(server.is_attached());
    assert!(server.bound_port() > 0, "bound port {}", server.bound_port());
    assert_eq!(server.url(), "rtsp://127.0.0.1:0/multicam");

    server.stop();
    assert!(!server.is_attached());
    server.stop();

    // Dropping without an explicit stop also detaches cleanly.
    let second = RestreamServer::start(&local_stream("/second"), &context).expect("restart");
    assert!(second.is_attached());
    drop(second);
    while context.iteration(false) {}
}
