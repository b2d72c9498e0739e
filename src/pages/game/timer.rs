use std::time::Duration;

use tokio::{
    sync::mpsc::UnboundedSender,
    task::JoinHandle,
    time::{interval, MissedTickBehavior},
};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::action::{act, Action, Command, GameAction};

/// Drives the game loop: one repeating task that posts `GameAction::Tick` into the action
/// channel at a fixed period. Ticks are tagged with the generation of the task that produced
/// them so that ticks still queued from a cancelled task can be told apart.
#[derive(Debug)]
pub struct TickTimer {
    period: Duration,
    generation: u64,
    cancellation_token: Option<CancellationToken>,
    task: Option<JoinHandle<()>>,
}

impl TickTimer {
    pub fn new(period: Duration) -> Self {
        TickTimer { period, generation: 0, cancellation_token: None, task: None }
    }

    pub fn is_running(&self) -> bool {
        self.cancellation_token.is_some()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Whether a tick of `generation` comes from the live task.
    pub fn accepts(&self, generation: u64) -> bool {
        self.is_running() && generation == self.generation
    }

    /// Spawns the ticking task, replacing any task that is still running. Must be called from
    /// within a tokio runtime.
    pub fn start(&mut self, tx: UnboundedSender<Action>) -> u64 {
        if self.is_running() {
            warn!("tick timer {} still running, cancelling it first", self.generation);
            self.stop();
        }
        self.generation += 1;
        let generation = self.generation;
        let period = self.period;

        let cancellation_token = CancellationToken::new();
        let _cancellation_token = cancellation_token.clone();
        self.task = Some(tokio::spawn(async move {
            let mut ticks = interval(period);
            ticks.set_missed_tick_behavior(MissedTickBehavior::Skip);
            // The first tick of an interval fires immediately.
            ticks.tick().await;
            loop {
                tokio::select! {
                    biased;
                    _ = _cancellation_token.cancelled() => break,
                    _ = ticks.tick() => {
                        if tx.send(act!(Command::Game(GameAction::Tick(generation)))).is_err() {
                            break;
                        }
                    },
                }
            }
        }));
        self.cancellation_token = Some(cancellation_token);
        debug!("tick timer {generation} started ({period:?})");
        generation
    }

    /// Cancels the running task. Returns false if there was none.
    pub fn stop(&mut self) -> bool {
        let Some(cancellation_token) = self.cancellation_token.take() else {
            return false;
        };
        cancellation_token.cancel();
        self.task = None;
        debug!("tick timer {} stopped", self.generation);
        true
    }
}

impl Drop for TickTimer {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use tokio::{
        sync::mpsc,
        time::{sleep, timeout},
    };

    use super::*;

    async fn next_tick(rx: &mut mpsc::UnboundedReceiver<Action>) -> u64 {
        let action = timeout(Duration::from_secs(2), rx.recv()).await.unwrap().unwrap();
        match action.command {
            Command::Game(GameAction::Tick(generation)) => generation,
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_ticks_until_stopped() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut timer = TickTimer::new(Duration::from_millis(5));

        let generation = timer.start(tx);
        assert!(timer.accepts(generation));
        for _ in 0..3 {
            assert_eq!(next_tick(&mut rx).await, generation);
        }

        assert!(timer.stop());
        assert!(!timer.stop());
        assert!(!timer.accepts(generation));
        while rx.try_recv().is_ok() {}

        sleep(Duration::from_millis(30)).await;
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_restart_replaces_the_task() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut timer = TickTimer::new(Duration::from_millis(5));

        let first = timer.start(tx.clone());
        let second = timer.start(tx);
        assert_ne!(first, second);
        assert!(!timer.accepts(first));
        assert!(timer.accepts(second));

        for _ in 0..5 {
            assert_eq!(next_tick(&mut rx).await, second);
        }
    }

    #[tokio::test]
    async fn test_drop_cancels_the_task() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        {
            let mut timer = TickTimer::new(Duration::from_millis(5));
            timer.start(tx);
            next_tick(&mut rx).await;
        }
        while rx.try_recv().is_ok() {}
        // The task owned the only sender; once it exits the channel closes.
        assert!(timeout(Duration::from_secs(2), rx.recv()).await.unwrap().is_none());
    }
}
