// src/service.rs
//! Game-facing side of the logger: swaps the buffering sink in and out of the
//! global [`Switchboard`] and toggles buffering on game events.

use crate::record::{CapturedError, Context};
use crate::sink::{BufferingSink, FacadeSink, Redactor, SinkError};
use crate::switchboard::Switchboard;
use log::info;
use std::sync::Arc;

/// Target of the status lines this service writes.
pub const STATUS_TARGET: &str = "competitive_logger";

/// Game states reported by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameState {
    Gameplay,
    Setup,
    PostGame,
    Transitioning,
    Quitting,
    Unlock,
}

impl std::str::FromStr for GameState {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "gameplay" => Ok(GameState::Gameplay),
            "setup" => Ok(GameState::Setup),
            "postgame" => Ok(GameState::PostGame),
            "transitioning" => Ok(GameState::Transitioning),
            "quitting" => Ok(GameState::Quitting),
            "unlock" => Ok(GameState::Unlock),
            other => Err(format!("unknown game state '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameEvent {
    StateChanged(GameState),
    BombExploded,
    BombSolved,
}

/// Owns the buffering sink for as long as interception is active.
///
/// Dropping the service tears it down, replaying anything still queued and
/// putting the original logger back.
pub struct CompetitiveLogger {
    switchboard: &'static Switchboard,
    sink: Arc<BufferingSink<FacadeSink>>,
    original: Arc<dyn log::Log>,
    replaced: bool,
}

impl CompetitiveLogger {
    /// Intercept the logger currently plugged into `switchboard`.
    pub fn install(switchboard: &'static Switchboard, redactor: Redactor) -> Self {
        let original = switchboard.current();
        let sink = Arc::new(BufferingSink::with_redactor(
            FacadeSink::new(original.clone()),
            redactor,
        ));
        switchboard.replace(sink.clone());
        info!(target: STATUS_TARGET, "[CompetitiveLogger] Replaced default logger.");

        Self {
            switchboard,
            sink,
            original,
            replaced: true,
        }
    }

    pub fn sink(&self) -> &Arc<BufferingSink<FacadeSink>> {
        &self.sink
    }

    /// The switchboard this service was installed into.
    pub fn switchboard(&self) -> &'static Switchboard {
        self.switchboard
    }

    pub fn is_installed(&self) -> bool {
        self.replaced
    }

    /// React to a game event.
    pub fn handle(&self, event: GameEvent) -> Result<(), SinkError> {
        match event {
            GameEvent::StateChanged(GameState::Gameplay) => {
                self.disable_output();
                Ok(())
            }
            GameEvent::StateChanged(_) | GameEvent::BombExploded | GameEvent::BombSolved => {
                self.enable_output()
            }
        }
    }

    /// Hold back log output until the next [`enable_output`](Self::enable_output).
    pub fn disable_output(&self) {
        if self.sink.is_enabled() {
            // written while still passing through, so it is not held back
            info!(target: STATUS_TARGET, "[CompetitiveLogger] Log output disabled.");
            self.sink.disable();
        }
    }

    /// Let log output through again and replay everything held back.
    pub fn enable_output(&self) -> Result<(), SinkError> {
        self.sink.resume();
        info!(target: STATUS_TARGET, "[CompetitiveLogger] Log output enabled.");

        let pending = self.sink.pending();
        if pending == 0 {
            // nothing to announce, but still drain in case of a late arrival
            self.sink.flush()?;
            return Ok(());
        }

        info!(
            target: STATUS_TARGET,
            "[CompetitiveLogger] Dumping cache of {} log records...", pending
        );
        self.sink.flush()?;
        info!(target: STATUS_TARGET, "[CompetitiveLogger] Cache dump complete.");
        Ok(())
    }

    /// Report an error value; the `log` facade has no channel for these.
    pub fn log_exception(
        &self,
        error: CapturedError,
        context: Option<Context>,
    ) -> Result<(), SinkError> {
        self.sink.log_exception(error, context)
    }

    /// Replay anything still queued and restore the original logger.
    ///
    /// Calling it again after a successful teardown does nothing. If the final
    /// replay fails the buffering sink stays installed so a retry loses nothing.
    pub fn teardown(&mut self) -> Result<(), SinkError> {
        if !self.replaced {
            return Ok(());
        }

        self.enable_output()?;
        self.switchboard.replace(self.original.clone());
        self.replaced = false;
        info!(target: STATUS_TARGET, "[CompetitiveLogger] Reset default logger.");
        Ok(())
    }
}

impl Drop for CompetitiveLogger {
    fn drop(&mut self) {
        if let Err(err) = self.teardown() {
            eprintln!("competitive_logger: teardown failed: {}", err);
            // nothing can retry after drop; restore anyway
            self.switchboard.replace(self.original.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use log::{Log, Metadata, Record};
    use std::sync::Mutex;

    #[derive(Default)]
    struct Lines(Mutex<Vec<String>>);

    impl Lines {
        fn take(&self) -> Vec<String> {
            std::mem::take(&mut *self.0.lock().unwrap())
        }
    }

    impl Log for Lines {
        fn enabled(&self, _metadata: &Metadata) -> bool {
            true
        }

        fn log(&self, record: &Record) {
            self.0.lock().unwrap().push(record.args().to_string());
        }

        fn flush(&self) {}
    }

    // Services built on a private switchboard: the `info!` status lines go to
    // whatever global logger the test binary has, not to `Lines`.
    fn service() -> (Arc<Lines>, CompetitiveLogger) {
        let lines = Arc::new(Lines::default());
        let switchboard: &'static Switchboard =
            Box::leak(Box::new(Switchboard::new(lines.clone())));
        (lines, CompetitiveLogger::install(switchboard, Redactor::default()))
    }

    fn host_log(service: &CompetitiveLogger, msg: &str) {
        service.switchboard.log(
            &Record::builder()
                .args(format_args!("{}", msg))
                .level(log::Level::Info)
                .target("host")
                .build(),
        );
    }

    #[test]
    fn gameplay_buffers_until_bomb_solved() {
        let (lines, service) = service();

        service.handle(GameEvent::StateChanged(GameState::Setup)).unwrap();
        host_log(&service, "before");
        service.handle(GameEvent::StateChanged(GameState::Gameplay)).unwrap();
        host_log(&service, "during");
        assert_eq!(lines.take(), vec!["before"]);

        service.handle(GameEvent::BombSolved).unwrap();
        assert_eq!(lines.take(), vec!["during"]);
        assert!(service.sink().is_enabled());
    }

    #[test]
    fn explosion_and_state_change_both_release() {
        let (lines, service) = service();

        service.handle(GameEvent::StateChanged(GameState::Gameplay)).unwrap();
        host_log(&service, "a");
        service.handle(GameEvent::BombExploded).unwrap();
        service.handle(GameEvent::StateChanged(GameState::Gameplay)).unwrap();
        host_log(&service, "b");
        service.handle(GameEvent::StateChanged(GameState::PostGame)).unwrap();

        assert_eq!(lines.take(), vec!["a", "b"]);
    }

    #[test]
    fn teardown_flushes_and_restores_once() {
        let (lines, mut service) = service();
        let switchboard = service.switchboard;

        service.disable_output();
        host_log(&service, "late");
        service.teardown().unwrap();

        assert_eq!(lines.take(), vec!["late"]);
        assert!(!service.is_installed());

        // the original logger is live again
        host_log(&service, "direct");
        assert_eq!(lines.take(), vec!["direct"]);
        assert!(Arc::ptr_eq(
            &switchboard.current(),
            &(lines.clone() as Arc<dyn Log>)
        ));

        service.teardown().unwrap();
        assert!(lines.take().is_empty());
    }

    #[test]
    fn drop_releases_queue() {
        let (lines, service) = service();
        service.disable_output();
        host_log(&service, "queued");
        drop(service);

        assert_eq!(lines.take(), vec!["queued"]);
    }

    #[test]
    fn parses_state_names() {
        assert_eq!("Gameplay".parse::<GameState>(), Ok(GameState::Gameplay));
        assert_eq!("postgame".parse::<GameState>(), Ok(GameState::PostGame));
        assert!("lobby".parse::<GameState>().is_err());
    }
}
