//! Tests for automated move pickers.

use tempfile::NamedTempFile;

use tictactoe_arena::{
    FirstEmpty, GameRepository, GameService, GameSession, GameStatus, Mark, Strategy,
};

#[test]
fn test_first_empty_picks_lowest_open_square() {
    let mut session = GameSession::new(1, "Alice", "Bob");
    let mut picker = FirstEmpty::new("bot");
    assert_eq!(picker.pick(&session), Some(0));

    session.apply_move(0, Mark::X).expect("Move rejected");
    session.apply_move(1, Mark::O).expect("Move rejected");
    assert_eq!(picker.pick(&session), Some(2));
}

#[test]
fn test_first_empty_exhausts_on_full_board() {
    let mut session = GameSession::new(1, "Alice", "Bob");
    for (player, position) in [
        (Mark::X, 0),
        (Mark::O, 4),
        (Mark::X, 2),
        (Mark::O, 1),
        (Mark::X, 3),
        (Mark::O, 5),
        (Mark::X, 7),
        (Mark::O, 6),
        (Mark::X, 8),
    ] {
        session.apply_move(position, player).expect("Move rejected");
    }
    let mut picker = FirstEmpty::new("bot");
    assert_eq!(picker.pick(&session), None);
}

#[test]
fn test_auto_play_finishes_a_game() {
    let db_file = NamedTempFile::new().expect("Failed to create temp file");
    let db_path = db_file.path().to_str().expect("Invalid path").to_string();
    let repo = GameRepository::new(db_path).expect("Failed to create repository");
    repo.run_migrations().expect("Migrations failed");
    let service = GameService::new(repo);

    let mut session = service
        .create_session(Some("BotX"), Some("BotO"))
        .expect("Create failed");
    let id = session.id();

    let mut picker = FirstEmpty::new("bot");
    while session.status() == GameStatus::InProgress {
        let player = session.current_turn();
        let position = picker.pick(&session).expect("Board full while in progress");
        session = service.apply_move(id, player, position).expect("Move failed");
    }

    // First-empty self-play fills 0..6 and X completes the 2-4-6 diagonal.
    assert_eq!(session.status(), GameStatus::Won(Mark::X));
    assert_eq!(session.winning_line(), Some([2, 4, 6]));
    assert_eq!(session.moves().len(), 7);

    let x_tally = service.player_score("BotX").expect("Tally failed");
    assert_eq!(*x_tally.wins(), 1);
}
