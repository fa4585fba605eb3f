//! End-to-end runtime scenarios: concurrent clients, persistence across
//! restarts, forks and event delivery.

use game_core::{Action, ActionKind, EntityName, ExecuteError, GameSetup, GameStatus};
use runtime::{
    GameEvent, GameId, Runtime, RuntimeConfig, RuntimeError, SessionError, ValidationError,
};

fn setup() -> GameSetup {
    GameSetup::new()
        .with_entity("PRR", 2)
        .with_entity("NYC", 2)
        .with_location("E5", 2, 20)
        .with_location("F6", 1, 10)
        .with_location("G7", 2, 30)
}

fn id(value: &str) -> GameId {
    GameId::new(value).unwrap()
}

fn in_memory() -> Runtime {
    Runtime::builder()
        .config(RuntimeConfig::default().with_snapshot_interval(2))
        .build()
        .unwrap()
}

#[tokio::test]
async fn conflicting_submissions_are_serialized() {
    let runtime = in_memory();
    let handle = runtime.create_game(id("race"), &setup()).await.unwrap();
    let other = handle.clone();

    let (first, second) = tokio::join!(
        handle.submit_action(Action::place_token("PRR", "E5", 0)),
        other.submit_action(Action::place_token("PRR", "F6", 0)),
    );

    let outcomes = [first, second];
    let accepted = outcomes.iter().filter(|outcome| outcome.is_ok()).count();
    assert_eq!(accepted, 1);

    let rejected = outcomes.into_iter().find_map(Result::err).unwrap();
    assert!(matches!(
        rejected,
        RuntimeError::Session(SessionError::Validation(ValidationError::Rejected(
            ExecuteError::ActorNotActing { .. }
        )))
    ));

    assert_eq!(handle.actions(0).await.unwrap().len(), 1);
    assert_eq!(handle.current_state().applied, 1);
    handle.verify().await.unwrap();
    runtime.shutdown().await.unwrap();
}

#[tokio::test]
async fn events_follow_the_log() {
    let runtime = in_memory();
    let game = id("events");
    let handle = runtime.create_game(game.clone(), &setup()).await.unwrap();
    let mut events = handle.subscribe_events();

    handle
        .submit_action(Action::place_token("PRR", "E5", 0))
        .await
        .unwrap();
    match events.recv().await.unwrap() {
        GameEvent::ActionApplied {
            game_id,
            sequence,
            kind,
            entity,
            state_hash,
        } => {
            assert_eq!(game_id, game);
            assert_eq!(sequence, 0);
            assert_eq!(kind, ActionKind::PlaceToken);
            assert_eq!(entity, EntityName::new("PRR"));
            assert_eq!(state_hash.len(), 64);
        }
        other => panic!("unexpected event: {other:?}"),
    }

    assert!(handle.submit_action(Action::pass("PRR")).await.is_err());
    assert!(matches!(
        events.recv().await.unwrap(),
        GameEvent::ActionRejected {
            kind: ActionKind::Pass,
            ..
        }
    ));

    handle.undo(0).await.unwrap();
    assert_eq!(
        events.recv().await.unwrap(),
        GameEvent::Undone {
            game_id: game.clone(),
            to: 0
        }
    );
    assert_eq!(handle.status(), GameStatus::New);

    handle.submit_action(Action::resign("PRR")).await.unwrap();
    assert!(matches!(
        events.recv().await.unwrap(),
        GameEvent::ActionApplied { sequence: 0, .. }
    ));
    assert!(matches!(
        events.recv().await.unwrap(),
        GameEvent::Finished { .. }
    ));
    runtime.shutdown().await.unwrap();
}

#[tokio::test]
async fn state_watchers_see_every_commit() {
    let runtime = in_memory();
    let handle = runtime.create_game(id("watch"), &setup()).await.unwrap();
    let mut watcher = handle.watch_state();

    handle
        .submit_action(Action::place_token("PRR", "E5", 0))
        .await
        .unwrap();
    watcher.changed().await.unwrap();
    assert_eq!(watcher.borrow_and_update().applied, 1);

    let snapshot = handle.snapshot().await.unwrap();
    assert_eq!(snapshot.sequence, 1);
    assert_eq!(snapshot.state, *handle.current_state());
    runtime.shutdown().await.unwrap();
}

#[tokio::test]
async fn file_backed_games_survive_restarts() {
    let dir = tempfile::tempdir().unwrap();
    let config = RuntimeConfig::default().with_snapshot_interval(2);
    let game = id("persisted");

    let runtime = Runtime::builder()
        .config(config.clone())
        .file_based(dir.path())
        .build()
        .unwrap();
    let handle = runtime.create_game(game.clone(), &setup()).await.unwrap();
    for action in [
        Action::place_token("PRR", "E5", 0),
        Action::place_token("NYC", "E5", 1),
        Action::place_token("PRR", "F6", 0),
        Action::pass("NYC"),
    ] {
        handle.submit_action(action).await.unwrap();
    }
    handle.undo(3).await.unwrap();
    let expected = handle.current_state();
    runtime.shutdown().await.unwrap();

    let runtime = Runtime::builder()
        .config(config)
        .file_based(dir.path())
        .build()
        .unwrap();
    let reopened = runtime.open_game(game.clone()).await.unwrap();
    assert_eq!(*reopened.current_state(), *expected);
    assert_eq!(reopened.actions(0).await.unwrap().len(), 3);
    assert_eq!(reopened.actions(2).await.unwrap()[0].sequence, 2);
    reopened.verify().await.unwrap();

    assert!(matches!(
        runtime.create_game(game.clone(), &setup()).await,
        Err(RuntimeError::GameAlreadyExists(_))
    ));
    assert_eq!(runtime.game_ids().await, vec![game]);
    runtime.shutdown().await.unwrap();
}

#[tokio::test]
async fn forks_are_persisted_and_independent() {
    let dir = tempfile::tempdir().unwrap();
    let runtime = Runtime::builder().file_based(dir.path()).build().unwrap();
    let source = id("source");
    let forked = id("forked");

    let handle = runtime.create_game(source.clone(), &setup()).await.unwrap();
    handle
        .submit_action(Action::place_token("PRR", "E5", 0))
        .await
        .unwrap();
    handle
        .submit_action(Action::place_token("NYC", "G7", 0))
        .await
        .unwrap();

    let fork = runtime
        .fork_game(&source, 1, forked.clone())
        .await
        .unwrap();
    assert_eq!(fork.current_state().applied, 1);
    fork.submit_action(Action::resign("NYC")).await.unwrap();
    assert_eq!(fork.status(), GameStatus::Finished);
    assert_eq!(handle.status(), GameStatus::Active);
    assert_eq!(handle.current_state().applied, 2);

    assert!(matches!(
        runtime.fork_game(&source, 5, id("nope")).await,
        Err(RuntimeError::Session(SessionError::InvalidForkPoint { at: 5, len: 2 }))
    ));
    runtime.shutdown().await.unwrap();

    let runtime = Runtime::builder().file_based(dir.path()).build().unwrap();
    let reopened = runtime.open_game(forked).await.unwrap();
    assert_eq!(reopened.actions(0).await.unwrap().len(), 2);
    assert_eq!(reopened.status(), GameStatus::Finished);
    runtime.shutdown().await.unwrap();
}

#[tokio::test]
async fn unknown_and_closed_games_are_reported() {
    let runtime = in_memory();

    assert!(matches!(
        runtime.open_game(id("missing")).await,
        Err(RuntimeError::GameNotFound(_))
    ));
    assert!(runtime.game(&id("missing")).await.is_none());

    let game = id("closing");
    let handle = runtime.create_game(game.clone(), &setup()).await.unwrap();
    runtime.close_game(&game).await.unwrap();
    assert!(matches!(
        handle.submit_action(Action::pass("PRR")).await,
        Err(RuntimeError::CommandChannelClosed)
    ));
    assert!(runtime.game_ids().await.is_empty());

    // Closed games can be reopened from their repositories.
    let reopened = runtime.open_game(game).await.unwrap();
    assert_eq!(reopened.status(), GameStatus::New);
    runtime.shutdown().await.unwrap();
}
