//! CLI application for EvenTone

mod app;
mod ui;

use advisor::AdvisoryTable;
use analysis::YinDetector;
use anyhow::{Context, Result};
use app::{App, NotificationKind, MIC_CONNECTED, MIC_ERROR};
use audio::AudioEngine;
use audio_io::{list_input_devices, MicrophoneCapture, SampleSource, SyntheticSource};
use clap::Parser;
use crossterm::{
    event,
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use log::{debug, error, info};
use ratatui::{backend::CrosstermBackend, Terminal};
use session::{AnalysisCommand, AnalysisEvent, AnalysisHandler, AnalysisSession};
use settings_manager::ConfigManager;
use std::{
    fs::File,
    io::{self, Stdout},
    path::PathBuf,
    time::Duration,
};
use tokio::sync::mpsc;
use tone_core::{Band, SkillLevel};

/// How often the screen is redrawn and input polled
const UI_TICK: Duration = Duration::from_millis(50);

/// EvenTone - real-time EQ and pitch feedback for live audio
#[derive(Parser, Debug)]
#[clap(author, version, about)]
struct Args {
    /// Enable debug logging
    #[clap(short, long)]
    debug: bool,

    /// Write logs to this file instead of stderr
    #[clap(long)]
    log_file: Option<PathBuf>,

    /// Use this config file instead of the default location
    #[clap(short, long)]
    config: Option<PathBuf>,

    /// Skill level for suggestions (novice, beginner, intermediate, advanced, expert)
    #[clap(short, long)]
    skill: Option<SkillLevel>,

    /// Analyse a generated tone instead of the microphone
    #[clap(long)]
    demo: bool,

    /// Frequency of the demo tone in Hz
    #[clap(long, default_value_t = 440.0)]
    demo_freq: f32,

    /// Input device name
    #[clap(long)]
    device: Option<String>,

    /// List input devices and exit
    #[clap(long)]
    list_devices: bool,
}

fn init_logging(args: &Args) -> Result<()> {
    let level = if args.debug { "debug" } else { "info" };
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level));

    if let Some(path) = &args.log_file {
        let file = File::create(path)
            .with_context(|| format!("Failed to create log file {}", path.display()))?;
        builder.target(env_logger::Target::Pipe(Box::new(file)));
    }

    builder.init();
    debug!("Debug logging enabled");
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(&args)?;

    if args.list_devices {
        for name in list_input_devices()? {
            println!("{}", name);
        }
        return Ok(());
    }

    info!("Starting EvenTone");

    let mut config = match &args.config {
        Some(path) => ConfigManager::with_file(path),
        None => ConfigManager::new(),
    }
    .context("Failed to load config")?;

    if let Some(skill) = args.skill {
        config.settings_mut().skill_level = skill;
    }
    if let Some(device) = &args.device {
        config.settings_mut().input_device = device.clone();
    }
    let settings = config.settings().clone();

    let table = match &settings.advisory_table {
        Some(path) => AdvisoryTable::load(path).context("Failed to load advisory table")?,
        None => AdvisoryTable::builtin(),
    };

    // The capture guard must outlive the UI loop; dropping it stops the stream.
    let mut capture = None;
    let mut startup_notice = None;
    let (source, source_label): (Box<dyn SampleSource>, String) = if args.demo {
        (
            Box::new(SyntheticSource::new(args.demo_freq)),
            format!("Demo tone ({} Hz)", args.demo_freq),
        )
    } else {
        match MicrophoneCapture::open(&settings.input_device) {
            Ok((guard, stream)) => {
                let label = guard.device_name().to_string();
                capture = Some(guard);
                startup_notice = Some((MIC_CONNECTED, NotificationKind::Success));
                (Box::new(stream), label)
            }
            Err(e) => {
                error!("Error accessing microphone: {}", e);
                startup_notice = Some((MIC_ERROR, NotificationKind::Error));
                let silence = SyntheticSource::new(0.0).with_amplitude(0.0).with_noise(0.0);
                (Box::new(silence), "No input".to_string())
            }
        }
    };

    let engine = AudioEngine::new(source).with_gains(
        settings.eq.gain(Band::Low),
        settings.eq.gain(Band::Mid),
        settings.eq.gain(Band::High),
    );
    let session = AnalysisSession::new(
        table,
        settings.skill_level,
        Box::new(YinDetector::new()),
    );

    let (command_tx, command_rx) = mpsc::channel(32);
    let (event_tx, event_rx) = mpsc::channel(32);
    let mut handler = AnalysisHandler::new(
        session,
        Box::new(engine),
        Duration::from_millis(settings.tick_interval_ms),
        command_rx,
        event_tx,
    );
    let handler_task = tokio::spawn(async move {
        if let Err(e) = handler.run().await {
            error!("Analysis handler failed: {}", e);
        }
    });

    let mut app = App::new(config, source_label);
    if let Some((message, kind)) = startup_notice {
        app.notify(message, kind);
    }

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout))?;

    let result = run_app(&mut terminal, &mut app, &command_tx, event_rx).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    // The handler may already be gone if the loop failed
    let _ = command_tx.send(AnalysisCommand::Shutdown).await;
    if let Err(e) = handler_task.await {
        error!("Analysis handler panicked: {}", e);
    }

    if let Some(capture) = capture {
        if let Err(e) = capture.pause() {
            debug!("Could not pause capture: {}", e);
        }
    }

    if let Err(e) = app.config.save() {
        error!("Failed to save config to {:?}: {}", app.config.path(), e);
    }

    info!("Exiting EvenTone");
    result
}

async fn run_app(
    terminal: &mut Terminal<CrosstermBackend<Stdout>>,
    app: &mut App,
    command_tx: &mpsc::Sender<AnalysisCommand>,
    mut event_rx: mpsc::Receiver<AnalysisEvent>,
) -> Result<()> {
    loop {
        while let Ok(event) = event_rx.try_recv() {
            app.handle_analysis_event(event);
        }

        terminal.draw(|f| ui::ui(f, app))?;

        if event::poll(UI_TICK)? {
            if let Some(command) = app.handle_event(event::read()?) {
                command_tx
                    .send(command)
                    .await
                    .context("Analysis handler stopped")?;
            }
        }

        if app.should_quit {
            return Ok(());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_args_parse() {
        let args = Args::try_parse_from([
            "eventone",
            "--demo",
            "--demo-freq",
            "220",
            "--skill",
            "Expert",
        ])
        .unwrap();

        assert!(args.demo);
        assert_eq!(args.demo_freq, 220.0);
        assert_eq!(args.skill, Some(SkillLevel::Expert));
        assert!(!args.debug);
    }

    #[test]
    fn test_unknown_skill_is_rejected() {
        assert!(Args::try_parse_from(["eventone", "--skill", "guru"]).is_err());
    }

    #[test]
    fn test_defaults() {
        let args = Args::try_parse_from(["eventone"]).unwrap();
        assert!(!args.demo);
        assert_eq!(args.demo_freq, 440.0);
        assert!(args.config.is_none());
        assert!(args.skill.is_none());
    }
}
