//! Tic-tac-toe arena - command-line interface
//!
//! Persistent tic-tac-toe sessions with rule enforcement, an append-only
//! move history, and a cumulative scoreboard. Every command can emit JSON
//! with `--json` for scripting.

#![warn(missing_docs)]

mod cli;

use anyhow::Result;
use clap::Parser;
use cli::{Cli, Command};
use serde_json::json;
use tictactoe_arena::{
    FirstEmpty, GameRepository, GameService, GameStatus, Mark, ServiceError, SessionId, Strategy,
    status_from_db,
};
use tracing::info;
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let db_path = resolve_db_path(cli.db_path);
    let json = cli.json;
    info!(db_path = %db_path, "Starting tictactoe arena");

    let repository = GameRepository::new(db_path)?;
    repository.run_migrations()?;
    let service = GameService::new(repository);

    match cli.command {
        Command::New { player_x, player_o } => create_game(&service, player_x, player_o, json),
        Command::Show { id } => show_game(&service, id, json),
        Command::Move {
            id,
            player,
            position,
        } => make_move(&service, id, player, position, json),
        Command::Log { id } => show_log(&service, id, json),
        Command::Games => list_games(&service, json),
        Command::Scoreboard => show_scoreboard(&service, json),
        Command::Play { player_x, player_o } => play_game(&service, player_x, player_o, json),
    }
}

/// Picks the database path: flag, then DATABASE_URL, then the default.
fn resolve_db_path(flag: Option<String>) -> String {
    flag.or_else(|| std::env::var("DATABASE_URL").ok())
        .unwrap_or_else(|| "arena.db".to_string())
}

/// Creates a session and prints its starting state.
fn create_game(
    service: &GameService,
    player_x: Option<String>,
    player_o: Option<String>,
    json: bool,
) -> Result<()> {
    let session = service.create_session(player_x.as_deref(), player_o.as_deref())?;
    if json {
        println!("{}", serde_json::to_string_pretty(&session)?);
    } else {
        println!("{}", session);
        println!("{}", session.board().display());
    }
    Ok(())
}

/// Prints a session's board, status, and whose turn it is.
fn show_game(service: &GameService, id: SessionId, json: bool) -> Result<()> {
    let session = service.get_session(id)?;
    if json {
        println!("{}", serde_json::to_string_pretty(&session)?);
        return Ok(());
    }
    println!("{}", session);
    println!("{}", session.board().display());
    match session.status() {
        GameStatus::InProgress => println!(
            "Next to move: {} ({})",
            session.player_name(session.current_turn()),
            session.current_turn()
        ),
        GameStatus::Won(winner) => {
            println!("Winner: {} ({})", session.player_name(winner), winner);
        }
        GameStatus::Draw => println!("Drawn after {} moves", session.moves().len()),
    }
    Ok(())
}

/// Applies one move. Rule violations print their message and exit
/// cleanly; only storage failures are process errors.
fn make_move(
    service: &GameService,
    id: SessionId,
    player: Mark,
    position: i32,
    json: bool,
) -> Result<()> {
    match service.apply_move(id, player, position) {
        Ok(session) => {
            if json {
                let payload = json!({
                    "success": true,
                    "message": "Move successful",
                    "game": session,
                });
                println!("{}", serde_json::to_string_pretty(&payload)?);
                return Ok(());
            }
            println!("Move successful");
            println!("{}", session.board().display());
            match session.status() {
                GameStatus::InProgress => println!(
                    "Next to move: {} ({})",
                    session.player_name(session.current_turn()),
                    session.current_turn()
                ),
                GameStatus::Won(winner) => {
                    println!("{} ({}) wins!", session.player_name(winner), winner);
                }
                GameStatus::Draw => println!("Draw!"),
            }
            Ok(())
        }
        Err(ServiceError::Rejected { source }) => {
            if json {
                let payload = json!({
                    "success": false,
                    "message": source.to_string(),
                });
                println!("{}", serde_json::to_string_pretty(&payload)?);
            } else {
                println!("{}", source);
            }
            Ok(())
        }
        Err(e) => Err(e.into()),
    }
}

/// Prints a session's move history, oldest first.
fn show_log(service: &GameService, id: SessionId, json: bool) -> Result<()> {
    let moves = service.move_log(id)?;
    if json {
        println!("{}", serde_json::to_string_pretty(&moves)?);
        return Ok(());
    }
    if moves.is_empty() {
        println!("No moves yet");
        return Ok(());
    }
    for (i, record) in moves.iter().enumerate() {
        println!(
            "{:>2}. {} took square {} at {}",
            i + 1,
            record.player(),
            record.position(),
            record.created_at()
        );
    }
    Ok(())
}

/// Lists every session, newest first.
fn list_games(service: &GameService, json: bool) -> Result<()> {
    let games = service.list_sessions()?;
    if json {
        let items: Vec<serde_json::Value> = games
            .iter()
            .map(|row| {
                json!({
                    "id": row.id(),
                    "player_x_name": row.player_x_name(),
                    "player_o_name": row.player_o_name(),
                    "status": row.status(),
                    "board": row.board_state(),
                    "created_at": row.created_at().to_string(),
                })
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&items)?);
        return Ok(());
    }
    if games.is_empty() {
        println!("No games yet");
        return Ok(());
    }
    for row in &games {
        let status = status_from_db(row.status())?;
        println!(
            "Game {}: {} vs {} - {}",
            row.id(),
            row.player_x_name(),
            row.player_o_name(),
            status
        );
    }
    Ok(())
}

/// Prints the scoreboard in standings order.
fn show_scoreboard(service: &GameService, json: bool) -> Result<()> {
    let scores = service.list_scores()?;
    if json {
        let items: Vec<serde_json::Value> = scores
            .iter()
            .map(|s| {
                json!({
                    "player_name": s.player_name(),
                    "wins": s.wins(),
                    "losses": s.losses(),
                    "draws": s.draws(),
                    "win_percentage": s.win_percentage(),
                })
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&items)?);
        return Ok(());
    }
    if scores.is_empty() {
        println!("No finished games yet");
        return Ok(());
    }
    println!(
        "{:<20} {:>5} {:>7} {:>6} {:>6}",
        "Player", "Wins", "Losses", "Draws", "Win %"
    );
    for score in &scores {
        println!(
            "{:<20} {:>5} {:>7} {:>6} {:>5.1}%",
            score.player_name(),
            score.wins(),
            score.losses(),
            score.draws(),
            score.win_percentage()
        );
    }
    Ok(())
}

/// Creates a session and plays both sides to completion with the
/// first-empty picker, printing each move.
fn play_game(
    service: &GameService,
    player_x: Option<String>,
    player_o: Option<String>,
    json: bool,
) -> Result<()> {
    let mut session = service.create_session(player_x.as_deref(), player_o.as_deref())?;
    let id = session.id();
    if !json {
        println!("{}", session);
        println!("{}", session.board().display());
    }

    let mut picker = FirstEmpty::new("first-empty");
    while session.status() == GameStatus::InProgress {
        let player = session.current_turn();
        let position = match picker.pick(&session) {
            Some(position) => position,
            None => break,
        };
        session = service.apply_move(id, player, position)?;
        if !json {
            println!(
                "\n{} ({}) takes square {}",
                session.player_name(player),
                player,
                position
            );
            println!("{}", session.board().display());
        }
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&session)?);
        return Ok(());
    }
    println!();
    match session.status() {
        GameStatus::Won(winner) => {
            println!("{} ({}) wins!", session.player_name(winner), winner);
        }
        GameStatus::Draw => println!("Draw!"),
        GameStatus::InProgress => println!("Game left unfinished"),
    }
    Ok(())
}
