use eventone::advisor::BALANCED_MESSAGE;
use eventone::audio_io::SyntheticSource;
use eventone::{
    AdvisoryTable, AnalysisCommand, AnalysisEvent, AnalysisHandler, AnalysisSession, AudioEngine,
    Band, EqAction, FrameSource, ImbalanceFinding, SkillLevel, YinDetector,
};
use std::time::Duration;
use tokio::sync::mpsc;

fn session(skill: SkillLevel) -> AnalysisSession {
    AnalysisSession::new(
        AdvisoryTable::builtin(),
        skill,
        Box::new(YinDetector::new()),
    )
}

#[test_log::test]
fn demo_tone_is_tracked_as_a4() {
    let mut engine = AudioEngine::new(Box::new(SyntheticSource::new(440.0)));
    let mut session = session(SkillLevel::Novice);

    let mut last = None;
    for _ in 0..3 {
        let frame = engine.next_frame().unwrap();
        last = Some(session.run_pass(&frame));
    }
    let report = last.unwrap();

    let display = report.pitch_display.expect("no pitch detected");
    assert!(display.ends_with("Hz (A4)"), "{}", display);
    assert_eq!(report.note_history, "A4, A4, A4");
}

#[test]
fn bass_heavy_input_suggests_reducing_low() {
    // Without a noise floor the mid and high bands read as silent.
    let source = SyntheticSource::new(100.0).with_amplitude(0.5).with_noise(0.0);
    let mut engine = AudioEngine::new(Box::new(source));
    let mut session = session(SkillLevel::Novice);

    let frame = engine.next_frame().unwrap();
    let report = session.run_pass(&frame);

    assert_eq!(
        report.findings,
        vec![ImbalanceFinding::new(Band::Low, EqAction::Reduce)]
    );
    assert!(report
        .advice
        .starts_with("The low frequencies are overpowering."));
    assert!(report.advice.contains("notch filter"));
}

#[test]
fn skill_change_recomposes_fallback() {
    let engine = AudioEngine::new(Box::new(SyntheticSource::new(440.0)));
    let mut session = session(SkillLevel::Novice);

    let advice = session.set_skill_level(SkillLevel::Intermediate, engine.bin_count());
    assert_eq!(advice, BALANCED_MESSAGE);
}

#[tokio::test]
async fn handler_runs_the_full_pipeline() {
    let engine = AudioEngine::new(Box::new(SyntheticSource::new(440.0)));
    let (command_tx, command_rx) = mpsc::channel(10);
    let (event_tx, mut event_rx) = mpsc::channel(10);
    let mut handler = AnalysisHandler::new(
        session(SkillLevel::Expert),
        Box::new(engine),
        Duration::from_millis(20),
        command_rx,
        event_tx,
    );
    let task = tokio::spawn(async move { handler.run().await.unwrap() });

    command_tx
        .send(AnalysisCommand::SetEqGain {
            band: Band::Low,
            gain_db: -20.0,
        })
        .await
        .unwrap();
    command_tx.send(AnalysisCommand::Start).await.unwrap();

    let mut saw_gain = false;
    let mut saw_start = false;
    let report = loop {
        let event = tokio::time::timeout(Duration::from_secs(5), event_rx.recv())
            .await
            .unwrap()
            .unwrap();
        match event {
            AnalysisEvent::EqGainChanged { band, gain_db } => {
                assert_eq!(band, Band::Low);
                assert_eq!(gain_db, -12.0);
                saw_gain = true;
            }
            AnalysisEvent::StateChanged { enabled } => {
                assert!(enabled);
                saw_start = true;
            }
            AnalysisEvent::Tick(report) => break report,
            other => panic!("Unexpected event {:?}", other),
        }
    };

    assert!(saw_gain && saw_start);
    assert_eq!(report.spectrum.len(), 1024);
    assert_eq!(report.samples.len(), 2048);
    assert!(!report.advice.is_empty());

    command_tx.send(AnalysisCommand::Shutdown).await.unwrap();
    task.await.unwrap();
}

#[test]
fn stopped_handler_shuts_down_cleanly() {
    tokio_test::block_on(async {
        let engine = AudioEngine::new(Box::new(SyntheticSource::new(440.0)));
        let (command_tx, command_rx) = mpsc::channel(4);
        let (event_tx, _event_rx) = mpsc::channel(4);
        let mut handler = AnalysisHandler::new(
            session(SkillLevel::Novice),
            Box::new(engine),
            Duration::from_millis(20),
            command_rx,
            event_tx,
        );

        command_tx.send(AnalysisCommand::Shutdown).await.unwrap();
        tokio_test::assert_ok!(handler.run().await);
    });
}
