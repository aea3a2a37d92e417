use camgrid::core::pipeline_builder::PipelineDescription;
use camgrid::media::pipeline_session::{PipelineSession, SessionOutcome};

fn line(text: &str) -> PipelineDescription {
    PipelineDescription::without_credentials(text)
}

// Both cases share one test so only one GLib loop runs in this process at a time.
#[test]
fn sessions_end_on_eos_and_on_early_interrupt() {
    let session = PipelineSession::launch("eos", &line("fakesrc num-buffers=1 ! fakesink")).expect("launch");
    assert_eq!(session.run().expect("run"), SessionOutcome::EndOfStream);

    let session = PipelineSession::launch("early-stop", &line("fakesrc ! fakesink")).expect("launch");
    session.handle().interrupt();
    assert_eq!(session.run().expect("run"), SessionOutcome::Interrupted);
}

#[test]
fn unknown_elements_fail_to_launch() {
    let err = PipelineSession::launch("bogus", &line("camgridnosuchelement ! fakesink"))
        .err()
        .expect("launch should fail");
    assert!(err.to_string().contains("Pipeline Error"), "{}", err);
}
