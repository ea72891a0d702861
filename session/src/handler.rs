use crate::commands::{AnalysisCommand, AnalysisEvent};
use crate::AnalysisSession;
use log::{debug, error, info, warn};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::{self, MissedTickBehavior};
use tone_core::{Error, FrameSource};

/// Handler for analysis passes, coordinating between the UI and the audio engine
pub struct AnalysisHandler {
    /// Session state carried between passes
    session: AnalysisSession,
    /// Supplier of spectra and samples
    source: Box<dyn FrameSource>,
    /// Time between passes
    interval: Duration,
    /// Channel for receiving commands from the UI
    command_rx: mpsc::Receiver<AnalysisCommand>,
    /// Channel for sending analysis events to the UI
    event_tx: mpsc::Sender<AnalysisEvent>,
}

impl AnalysisHandler {
    /// Create a new analysis handler
    pub fn new(
        session: AnalysisSession,
        source: Box<dyn FrameSource>,
        interval: Duration,
        command_rx: mpsc::Receiver<AnalysisCommand>,
        event_tx: mpsc::Sender<AnalysisEvent>,
    ) -> Self {
        Self {
            session,
            source,
            interval,
            command_rx,
            event_tx,
        }
    }

    /// Run the handler until shutdown, processing commands and ticks
    pub async fn run(&mut self) -> Result<(), Error> {
        let mut ticker = time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                command = self.command_rx.recv() => {
                    let command = match command {
                        Some(AnalysisCommand::Shutdown) | None => {
                            info!("Received shutdown command, exiting handler");
                            break;
                        }
                        Some(command) => command,
                    };

                    if let Err(e) = self.handle_command(command).await {
                        error!("Error handling analysis command: {}", e);
                    }
                }

                // Only tick while analysis is enabled
                _ = ticker.tick(), if self.session.is_enabled() => {
                    if let Err(e) = self.tick().await {
                        error!("Error publishing analysis pass: {}", e);
                    }
                }
            }

            if self.event_tx.is_closed() {
                info!("Event receiver dropped, exiting handler");
                break;
            }
        }

        Ok(())
    }

    /// Handle a command from the UI
    async fn handle_command(&mut self, command: AnalysisCommand) -> Result<(), Error> {
        debug!("Handling {:?}", command);

        match command {
            AnalysisCommand::Start => self.set_enabled(true).await?,
            AnalysisCommand::Stop => self.set_enabled(false).await?,
            AnalysisCommand::Toggle => {
                let enabled = !self.session.is_enabled();
                self.set_enabled(enabled).await?;
            }

            AnalysisCommand::SetSkillLevel(level) => {
                let advice = self.session.set_skill_level(level, self.source.bin_count());
                self.emit_event(AnalysisEvent::AdviceUpdated(advice)).await?;
            }

            AnalysisCommand::SetEqGain { band, gain_db } => {
                let applied = self.source.set_eq_gain(band, gain_db);
                self.emit_event(AnalysisEvent::EqGainChanged {
                    band,
                    gain_db: applied,
                })
                .await?;
            }

            // Handled by the run loop
            AnalysisCommand::Shutdown => {}
        }

        Ok(())
    }

    async fn set_enabled(&mut self, enabled: bool) -> Result<(), Error> {
        if self.session.set_enabled(enabled) {
            self.emit_event(AnalysisEvent::StateChanged { enabled })
                .await?;
        }
        Ok(())
    }

    /// One analysis pass. A failing source is reported and the loop goes on.
    async fn tick(&mut self) -> Result<(), Error> {
        match self.source.next_frame() {
            Ok(frame) => {
                let report = self.session.run_pass(&frame);
                self.emit_event(AnalysisEvent::Tick(report)).await
            }
            Err(e) => {
                warn!("Frame source failed: {}", e);
                self.emit_event(AnalysisEvent::SourceError(e.to_string()))
                    .await
            }
        }
    }

    /// Emit an analysis event to the UI
    async fn emit_event(&mut self, event: AnalysisEvent) -> Result<(), Error> {
        self.event_tx
            .send(event)
            .await
            .map_err(|e| Error::InvalidState(format!("Failed to send analysis event: {}", e)))
    }
}
