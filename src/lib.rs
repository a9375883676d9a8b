//! Server-authoritative engine for a wild-west shootout party game.
//!
//! Players in a session pick one card per round (dodge, load, chest, or an
//! attack on another player) and the engine resolves all cards at once:
//! attacks versus dodges, coin splitting among shooters, chest capacity,
//! and win conditions. Sessions are driven over HTTP/WebSocket, with bot
//! seats filled by in-process heuristics or remote HTTP bots.

pub mod bots;
pub mod cards;
pub mod dto;
pub mod events;
pub mod gameplay;
pub mod hosting;

// ============================================================================
// CONSTANTS
// ============================================================================
/// Hard cap on rounds per session. A session that somehow never produces a
/// winner is force-ended here instead of spinning forever.
pub const MAX_ROUNDS: u32 = 10_000;
/// Longest a display name may be; joins truncate past this.
pub const MAX_NAME_LEN: usize = 32;
/// Pause before a bot seat starts thinking, so reveals stay watchable.
pub const BOT_THINK: std::time::Duration = std::time::Duration::from_millis(200);
/// Upper bound on a single bot decision, local or remote. A bot that blows
/// this budget plays Dodge and the round proceeds without it.
pub const BOT_TIMEOUT: std::time::Duration = std::time::Duration::from_secs(5);
/// Sliding expiration for idle sessions in the repository.
pub const SESSION_TTL: std::time::Duration = std::time::Duration::from_secs(6 * 60 * 60);

// ============================================================================
// RUNTIME UTILITIES
// ============================================================================
/// Initialize dual logging (terminal + file) with timestamped log files.
/// Creates `logs/` directory and writes DEBUG level to file, INFO to terminal.
pub fn log() {
    std::fs::create_dir_all("logs").expect("create logs directory");
    let config = simplelog::ConfigBuilder::new()
        .set_location_level(log::LevelFilter::Off)
        .set_target_level(log::LevelFilter::Off)
        .set_thread_level(log::LevelFilter::Off)
        .build();
    let time = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .expect("time moves slow")
        .as_secs();
    let file = simplelog::WriteLogger::new(
        log::LevelFilter::Debug,
        config.clone(),
        std::fs::File::create(format!("logs/{}.log", time)).expect("create log file"),
    );
    let term = simplelog::TermLogger::new(
        log::LevelFilter::Info,
        config.clone(),
        simplelog::TerminalMode::Mixed,
        simplelog::ColorChoice::Auto,
    );
    simplelog::CombinedLogger::init(vec![term, file]).expect("initialize logger");
}

/// Register Ctrl+C handler for immediate (non-graceful) termination.
pub fn kys() {
    tokio::spawn(async move {
        tokio::signal::ctrl_c().await.expect("install ctrl-c handler");
        println!();
        log::warn!("violent interrupt received, exiting immediately");
        std::process::exit(0);
    });
}
