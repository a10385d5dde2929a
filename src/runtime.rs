use std::sync::Arc;

use tokio::sync::{mpsc, watch, Mutex, Notify};
use tokio::task::JoinHandle;
use tokio::time::Duration;

use crate::constants::{
    ADVERSARY_TICK_MS, ANIMATION_TICK_MS, CLOCK_TICK_MS, POWER_UP_SPAWN_MS, SCORE_TICK_MS,
};
use crate::error::GameError;
use crate::score_store::ScoreStore;
use crate::session::GameSession;
use crate::types::{InputCommand, SessionSnapshot, SessionSummary};

pub type SharedSession = Arc<Mutex<GameSession>>;
pub type SnapshotSender = mpsc::UnboundedSender<SessionSnapshot>;

/// The independently scheduled update sources of a running session.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Ticker {
    Player,
    Adversaries,
    PowerUps,
    Score,
    Animation,
    Clock,
}

impl Ticker {
    pub const ALL: [Self; 6] = [
        Self::Player,
        Self::Adversaries,
        Self::PowerUps,
        Self::Score,
        Self::Animation,
        Self::Clock,
    ];

    /// Delay before the next tick; the player cadence follows the speed boost.
    pub fn period(self, session: &GameSession) -> Duration {
        match self {
            Self::Player => session.player_tick_interval(),
            Self::Adversaries => Duration::from_millis(ADVERSARY_TICK_MS),
            Self::PowerUps => Duration::from_millis(POWER_UP_SPAWN_MS),
            Self::Score => Duration::from_millis(SCORE_TICK_MS),
            Self::Animation => Duration::from_millis(ANIMATION_TICK_MS),
            Self::Clock => Duration::from_millis(CLOCK_TICK_MS),
        }
    }

    /// One tick body. Callers hold the session exclusively.
    pub fn run(self, session: &mut GameSession) -> Result<(), GameError> {
        match self {
            Self::Player => session.step_player(),
            Self::Adversaries => session.step_adversaries(),
            Self::PowerUps => session.spawn_power_up().map(|_| ()),
            Self::Score => {
                session.award_time_score();
                Ok(())
            }
            Self::Animation => session.toggle_mouth(),
            Self::Clock => {
                session.refresh_clock();
                Ok(())
            }
        }
    }
}

#[derive(Clone)]
struct TickerContext {
    session: SharedSession,
    updates: SnapshotSender,
    ended: Arc<Notify>,
}

impl TickerContext {
    /// Snapshots are sent while the lock is held so the presentation layer
    /// sees changes in the order they were applied.
    fn publish(&self, session: &mut GameSession) {
        let snapshot = session.build_snapshot();
        let _ = self.updates.send(snapshot);
        if session.is_ended() {
            self.ended.notify_one();
        }
    }
}

/// Handle to a running session.
///
/// Every ticker body runs under the one session lock, so no two updates
/// interleave. When the session ends (lives exhausted or quit) the
/// supervisor stops every ticker, waits for them, then appends the score.
pub struct SessionRuntime {
    context: TickerContext,
    supervisor: JoinHandle<SessionSummary>,
}

impl SessionRuntime {
    pub fn launch(mut session: GameSession, store: ScoreStore, updates: SnapshotSender) -> Self {
        session.start();
        let _ = updates.send(session.build_snapshot());

        let context = TickerContext {
            session: Arc::new(Mutex::new(session)),
            updates,
            ended: Arc::new(Notify::new()),
        };
        let (stop_tx, stop_rx) = watch::channel(false);
        let tickers: Vec<JoinHandle<()>> = Ticker::ALL
            .into_iter()
            .map(|ticker| spawn_ticker(ticker, context.clone(), stop_rx.clone()))
            .collect();

        let supervisor = tokio::spawn(supervise(context.clone(), store, stop_tx, tickers));
        Self {
            context,
            supervisor,
        }
    }

    pub fn session(&self) -> SharedSession {
        self.context.session.clone()
    }

    pub async fn send(&self, command: InputCommand) {
        let mut guard = self.context.session.lock().await;
        if guard.is_ended() {
            return;
        }
        match command {
            InputCommand::Move(dir) => guard.set_direction(dir),
            InputCommand::Quit => {
                guard.request_quit();
                self.context.publish(&mut guard);
            }
        }
    }

    /// Resolves once the score has been persisted and every ticker stopped.
    pub async fn finished(self) -> Result<SessionSummary, GameError> {
        self.supervisor
            .await
            .map_err(|error| GameError::Task(error.to_string()))
    }
}

fn spawn_ticker(
    ticker: Ticker,
    context: TickerContext,
    mut stop: watch::Receiver<bool>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut delay = {
            let guard = context.session.lock().await;
            ticker.period(&guard)
        };
        loop {
            tokio::select! {
                _ = stop.changed() => break,
                _ = tokio::time::sleep(delay) => {}
            }

            let mut guard = context.session.lock().await;
            if guard.is_ended() {
                break;
            }
            if let Err(error) = ticker.run(&mut guard) {
                tracing::error!(?ticker, "tick failed: {error}");
            }
            delay = ticker.period(&guard);
            context.publish(&mut guard);
            if guard.is_ended() {
                break;
            }
        }
        tracing::debug!(?ticker, "ticker stopped");
    })
}

async fn supervise(
    context: TickerContext,
    store: ScoreStore,
    stop_tx: watch::Sender<bool>,
    tickers: Vec<JoinHandle<()>>,
) -> SessionSummary {
    context.ended.notified().await;
    let _ = stop_tx.send(true);
    for handle in tickers {
        if let Err(error) = handle.await {
            tracing::error!("ticker task failed: {error}");
        }
    }

    let summary = context.session.lock().await.summary();
    if let Err(error) = store.append_score_record(&summary.name, summary.score) {
        tracing::warn!("score not persisted: {error}");
    }
    summary
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SessionConfig;
    use crate::grid::Grid;
    use crate::types::{Cell, Direction, Position, SessionEndReason};

    fn walled_session(
        open: &[(i32, i32)],
        player: (i32, i32),
        adversaries: &[(i32, i32)],
    ) -> GameSession {
        let mut grid = Grid::new(6);
        for index in 0..36 {
            let pos = grid.position_of(index);
            if !open.contains(&(pos.row, pos.col)) {
                grid.set(pos, Cell::Wall).expect("in bounds");
            }
        }
        GameSession::from_layout(
            SessionConfig::new(6, 3, "Runner").expect("valid config"),
            grid,
            Position::new(player.0, player.1),
            adversaries
                .iter()
                .map(|&(row, col)| Position::new(row, col))
                .collect(),
        )
        .expect("layout is valid")
    }

    #[tokio::test(start_paused = true)]
    async fn quit_persists_exactly_one_record() {
        let dir = tempfile::tempdir().expect("temp dir");
        let store = ScoreStore::new(dir.path().join("scores.json"));
        // The adversary is boxed in so only the quit can end this run.
        let session = walled_session(&[(1, 1), (1, 2), (4, 4)], (1, 1), &[(4, 4)]);
        let (tx, mut rx) = mpsc::unbounded_channel();
        let runtime = SessionRuntime::launch(session, store.clone(), tx);

        let first = rx.recv().await.expect("initial snapshot");
        assert!(first.full_grid.is_some());

        tokio::time::sleep(Duration::from_millis(11_000)).await;
        runtime.send(InputCommand::Quit).await;
        let summary = runtime.finished().await.expect("runtime completes");

        assert_eq!(summary.reason, SessionEndReason::Quit);
        assert_eq!(summary.score, 20);
        let records = store.load();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].name, "Runner");
        assert_eq!(records[0].score, 20);
    }

    #[tokio::test(start_paused = true)]
    async fn losing_last_life_persists_and_stops_all_tickers() {
        let dir = tempfile::tempdir().expect("temp dir");
        let store = ScoreStore::new(dir.path().join("scores.json"));
        let mut session = walled_session(&[(2, 2), (2, 3)], (2, 2), &[(2, 3)]);
        session.force_lives(1);
        session.set_direction(Direction::Right);
        let (tx, mut rx) = mpsc::unbounded_channel();
        let runtime = SessionRuntime::launch(session, store.clone(), tx);
        let shared = runtime.session();

        let summary = runtime.finished().await.expect("runtime completes");
        assert_eq!(summary.reason, SessionEndReason::LivesExhausted);
        assert_eq!(summary.lives, 0);
        assert_eq!(store.load().len(), 1);

        let mut last = None;
        while let Ok(snapshot) = rx.try_recv() {
            last = Some(snapshot);
        }
        let last = last.expect("at least one snapshot");
        assert!(last.ended);
        assert_eq!(last.lives, 0);

        let board_at_end = shared.lock().await.grid().cells().to_vec();
        tokio::time::sleep(Duration::from_secs(30)).await;
        assert_eq!(shared.lock().await.grid().cells(), board_at_end.as_slice());
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn direction_input_moves_player_on_next_tick() {
        let dir = tempfile::tempdir().expect("temp dir");
        let store = ScoreStore::new(dir.path().join("scores.json"));
        let session = walled_session(&[(1, 1), (1, 2), (1, 3)], (1, 1), &[]);
        let (tx, _rx) = mpsc::unbounded_channel();
        let runtime = SessionRuntime::launch(session, store, tx);

        runtime.send(InputCommand::Move(Direction::Right)).await;
        tokio::time::sleep(Duration::from_millis(350)).await;
        assert_eq!(
            runtime.session().lock().await.player_position(),
            Some(Position::new(1, 2))
        );
        tokio::time::sleep(Duration::from_millis(300)).await;
        assert_eq!(
            runtime.session().lock().await.player_position(),
            Some(Position::new(1, 3))
        );

        runtime.send(InputCommand::Quit).await;
        runtime.finished().await.expect("runtime completes");
    }

    #[tokio::test(start_paused = true)]
    async fn invincible_collision_keeps_lives() {
        let dir = tempfile::tempdir().expect("temp dir");
        let store = ScoreStore::new(dir.path().join("scores.json"));
        let mut session = walled_session(&[(2, 2), (2, 3)], (2, 2), &[(2, 3)]);
        session.activate_effect(crate::effects::StatusEffect::Invincibility, 10_000);
        session.set_direction(Direction::Right);
        let (tx, _rx) = mpsc::unbounded_channel();
        let runtime = SessionRuntime::launch(session, store, tx);

        tokio::time::sleep(Duration::from_millis(1_000)).await;
        assert_eq!(runtime.session().lock().await.lives(), 3);

        runtime.send(InputCommand::Quit).await;
        let summary = runtime.finished().await.expect("runtime completes");
        assert_eq!(summary.lives, 3);
    }

    #[tokio::test(start_paused = true)]
    async fn unwritable_store_does_not_block_shutdown() {
        let dir = tempfile::tempdir().expect("temp dir");
        let blocker = dir.path().join("blocker");
        std::fs::write(&blocker, "file").expect("write file");
        let store = ScoreStore::new(blocker.join("scores.json"));
        let session = GameSession::new(SessionConfig::new(8, 4, "Lost").expect("config"))
            .expect("session builds");
        let (tx, _rx) = mpsc::unbounded_channel();
        let runtime = SessionRuntime::launch(session, store, tx);

        runtime.send(InputCommand::Quit).await;
        let summary = runtime.finished().await.expect("runtime completes");
        assert_eq!(summary.reason, SessionEndReason::Quit);
    }
}
