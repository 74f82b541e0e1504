//! Tests for the session state machine: move validation order, turn
//! alternation, termination, and the scoring handshake.

use tictactoe_arena::{GameSession, GameStatus, Mark, MoveError, normalize_player_name};

/// Plays a move that must succeed.
fn play(session: &mut GameSession, player: Mark, position: i32) {
    session
        .apply_move(position, player)
        .unwrap_or_else(|e| panic!("Move {player} at {position} rejected: {e}"));
}

/// X takes the top row: X0 O3 X1 O4 X2.
fn play_x_win(session: &mut GameSession) {
    for (player, position) in [
        (Mark::X, 0),
        (Mark::O, 3),
        (Mark::X, 1),
        (Mark::O, 4),
        (Mark::X, 2),
    ] {
        play(session, player, position);
    }
}

#[test]
fn test_new_session_defaults() {
    let session = GameSession::new(1, "", "");
    assert_eq!(session.player_x_name(), "Player X");
    assert_eq!(session.player_o_name(), "Player O");
    assert_eq!(session.current_turn(), Mark::X);
    assert_eq!(session.status(), GameStatus::InProgress);
    assert_eq!(session.board().encode(), "         ");
    assert!(session.moves().is_empty());
    assert!(!session.scored());
}

#[test]
fn test_name_normalization() {
    assert_eq!(normalize_player_name("  Alice  ", Mark::X), "Alice");
    assert_eq!(normalize_player_name("   ", Mark::O), "Player O");
    assert_eq!(normalize_player_name("", Mark::X), "Player X");

    let session = GameSession::new(1, "  Alice  ", "\tBob\n");
    assert_eq!(session.player_x_name(), "Alice");
    assert_eq!(session.player_o_name(), "Bob");
}

#[test]
fn test_apply_move_records_and_alternates() {
    let mut session = GameSession::new(1, "Alice", "Bob");
    let record = session.apply_move(4, Mark::X).expect("Move rejected");

    assert_eq!(record.player(), Mark::X);
    assert_eq!(record.position(), 4);
    assert_eq!(session.current_turn(), Mark::O);
    assert_eq!(session.board().encode(), "    X    ");
    assert_eq!(session.moves().len(), 1);
    assert_eq!(session.moves()[0], record);
    assert!(session.updated_at() >= session.created_at());
}

#[test]
fn test_out_of_turn_is_rejected() {
    let mut session = GameSession::new(1, "Alice", "Bob");
    let err = session.apply_move(0, Mark::O).expect_err("O moved first");
    assert_eq!(err, MoveError::WrongTurn { expected: Mark::X });
    assert_eq!(err.to_string(), "It's X's turn");

    play(&mut session, Mark::X, 0);
    let err = session.apply_move(1, Mark::X).expect_err("X moved twice");
    assert_eq!(err, MoveError::WrongTurn { expected: Mark::O });
    assert_eq!(err.to_string(), "It's O's turn");
}

#[test]
fn test_occupied_square_is_rejected() {
    let mut session = GameSession::new(1, "Alice", "Bob");
    play(&mut session, Mark::X, 4);
    let err = session.apply_move(4, Mark::O).expect_err("Square was taken");
    assert_eq!(err, MoveError::PositionOccupied { position: 4 });
    assert_eq!(err.to_string(), "Position already occupied");
}

#[test]
fn test_turn_checked_before_occupancy() {
    let mut session = GameSession::new(1, "Alice", "Bob");
    play(&mut session, Mark::X, 4);
    play(&mut session, Mark::O, 0);
    // O is out of turn AND aiming at an occupied square; the turn check
    // fires first.
    let err = session.apply_move(4, Mark::O).expect_err("Move allowed");
    assert_eq!(err, MoveError::WrongTurn { expected: Mark::X });
}

#[test]
fn test_out_of_range_positions_rejected() {
    let mut session = GameSession::new(1, "Alice", "Bob");
    for position in [-1, 9, 100, i32::MIN] {
        let err = session
            .apply_move(position, Mark::X)
            .expect_err("Out-of-range move allowed");
        assert_eq!(err, MoveError::InvalidPosition { position });
        assert_eq!(err.to_string(), "Invalid position");
    }
    assert_eq!(session.board().encode(), "         ");
    assert!(session.moves().is_empty());
}

#[test]
fn test_range_checked_before_finished() {
    let mut session = GameSession::new(1, "Alice", "Bob");
    play_x_win(&mut session);
    // Even on a finished game, a nonsense position reports as invalid.
    let err = session.apply_move(-1, Mark::O).expect_err("Move allowed");
    assert_eq!(err, MoveError::InvalidPosition { position: -1 });
}

#[test]
fn test_finished_game_rejects_moves() {
    let mut session = GameSession::new(1, "Alice", "Bob");
    play_x_win(&mut session);
    let err = session.apply_move(8, Mark::O).expect_err("Move allowed");
    assert_eq!(err, MoveError::GameFinished);
    assert_eq!(err.to_string(), "Game is already finished");
}

#[test]
fn test_rejected_move_leaves_session_untouched() {
    let mut session = GameSession::new(1, "Alice", "Bob");
    play(&mut session, Mark::X, 0);
    let before = session.clone();

    assert!(session.apply_move(9, Mark::O).is_err());
    assert!(session.apply_move(0, Mark::O).is_err());
    assert!(session.apply_move(1, Mark::X).is_err());
    assert_eq!(session, before);
}

#[test]
fn test_win_detection() {
    let mut session = GameSession::new(1, "Alice", "Bob");
    play_x_win(&mut session);

    assert_eq!(session.status(), GameStatus::Won(Mark::X));
    assert_eq!(session.winning_line(), Some([0, 1, 2]));
    assert_eq!(session.board().encode(), "XXXOO    ");
    assert_eq!(session.moves().len(), 5);
    // The turn stays on the last mover once the game ends.
    assert_eq!(session.current_turn(), Mark::X);
}

#[test]
fn test_o_can_win() {
    let mut session = GameSession::new(1, "Alice", "Bob");
    for (player, position) in [
        (Mark::X, 4),
        (Mark::O, 0),
        (Mark::X, 8),
        (Mark::O, 1),
        (Mark::X, 5),
        (Mark::O, 2),
    ] {
        play(&mut session, player, position);
    }
    assert_eq!(session.status(), GameStatus::Won(Mark::O));
    assert_eq!(session.winning_line(), Some([0, 1, 2]));
}

#[test]
fn test_ninth_move_without_winner_is_a_draw() {
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
        play(&mut session, player, position);
    }
    assert_eq!(session.status(), GameStatus::Draw);
    assert!(session.winning_line().is_none());
    assert!(session.board().is_full());
    assert_eq!(session.moves().len(), 9);
}

#[test]
fn test_winning_line_hidden_while_in_progress() {
    let mut session = GameSession::new(1, "Alice", "Bob");
    play(&mut session, Mark::X, 0);
    assert!(session.winning_line().is_none());
}

#[test]
fn test_scoring_handshake() {
    let mut session = GameSession::new(1, "Alice", "Bob");
    assert!(!session.needs_scoring());

    play_x_win(&mut session);
    assert!(session.needs_scoring());

    session.mark_scored();
    assert!(session.scored());
    assert!(!session.needs_scoring());
}

#[test]
fn test_display_format() {
    let session = GameSession::new(7, "Alice", "Bob");
    assert_eq!(session.to_string(), "Game 7: Alice vs Bob - in progress");

    let mut session = GameSession::new(8, "Alice", "Bob");
    play_x_win(&mut session);
    assert_eq!(session.to_string(), "Game 8: Alice vs Bob - X won");
}

#[test]
fn test_move_history_is_ordered() {
    let mut session = GameSession::new(1, "Alice", "Bob");
    play_x_win(&mut session);

    let positions: Vec<i32> = session.moves().iter().map(|m| m.position()).collect();
    assert_eq!(positions, vec![0, 3, 1, 4, 2]);
    let players: Vec<Mark> = session.moves().iter().map(|m| m.player()).collect();
    assert_eq!(
        players,
        vec![Mark::X, Mark::O, Mark::X, Mark::O, Mark::X]
    );
}
