use super::repository::GameRepository;
use super::table::TableHandle;
use crate::bots::ApiBot;
use crate::bots::Bot;
use crate::bots::GoldBot;
use crate::bots::RandomBot;
use crate::bots::TriggerBot;
use crate::dto::AddBot;
use crate::dto::CreateGame;
use crate::dto::GameContext;
use crate::dto::JoinGame;
use crate::dto::LeaveGame;
use crate::dto::PlayCard;
use crate::dto::PlayerRoundResult;
use actix_cors::Cors;
use actix_web::App;
use actix_web::HttpRequest;
use actix_web::HttpResponse;
use actix_web::HttpServer;
use actix_web::Responder;
use actix_web::middleware::Logger;
use actix_web::web;
use std::sync::Arc;
use tokio::sync::mpsc::unbounded_channel;

pub struct Server;

impl Server {
    pub async fn run() -> Result<(), std::io::Error> {
        let state = web::Data::new(GameRepository::default());
        log::info!("starting game server");
        HttpServer::new(move || {
            App::new()
                .wrap(Logger::new("%r %s %Ts"))
                .wrap(
                    Cors::default()
                        .allow_any_origin()
                        .allow_any_method()
                        .allow_any_header(),
                )
                .app_data(state.clone())
                .route("/api/ping", web::get().to(ping))
                .route("/api/games", web::post().to(create))
                .route("/api/games/{id}", web::get().to(show))
                .route("/api/games/{id}/join", web::post().to(join))
                .route("/api/games/{id}/cards", web::post().to(play))
                .route("/api/games/{id}/bots", web::post().to(add_bot))
                .route("/api/games/{id}/start", web::post().to(start))
                .route("/api/games/{id}/restart", web::post().to(restart))
                .route("/api/games/{id}/abort", web::post().to(abort))
                .route("/api/games/{id}/leave", web::post().to(leave))
                .route("/api/games/{id}/events", web::get().to(events))
                .route("/api/bots/{bot}", web::get().to(bot_info))
                .route("/api/bots/{bot}/actions", web::post().to(bot_actions))
                .route("/api/bots/{bot}/results", web::post().to(bot_results))
        })
        .workers(4)
        .bind(std::env::var("BIND_ADDR").expect("BIND_ADDR must be set"))?
        .run()
        .await
    }
}

/// The three bots this server hosts itself, addressable by short name as
/// well as through their HTTP endpoints.
fn builtin(name: &str) -> Option<Arc<dyn Bot>> {
    match name {
        "mrrandom" => Some(Arc::new(RandomBot)),
        "mrtrigger" => Some(Arc::new(TriggerBot)),
        "mrgold" => Some(Arc::new(GoldBot)),
        _ => None,
    }
}

async fn ping() -> impl Responder {
    HttpResponse::Ok().json(serde_json::json!({ "ping": "pong" }))
}

async fn create(
    repository: web::Data<GameRepository>,
    body: Option<web::Json<CreateGame>>,
) -> impl Responder {
    let rules = body.and_then(|body| body.into_inner().rules);
    let id = repository.create_game(rules).await;
    HttpResponse::Created().json(serde_json::json!({ "game": id }))
}

async fn show(repository: web::Data<GameRepository>, path: web::Path<String>) -> impl Responder {
    match repository.get_game(&path).await {
        Some(handle) => match handle.snapshot().await {
            Ok(view) => HttpResponse::Ok().json(view),
            Err(e) => HttpResponse::InternalServerError().body(e.to_string()),
        },
        None => HttpResponse::NotFound().body("game not found"),
    }
}

async fn join(
    repository: web::Data<GameRepository>,
    path: web::Path<String>,
    body: web::Json<JoinGame>,
) -> impl Responder {
    match repository.get_game(&path).await {
        Some(handle) => match handle.join(body.into_inner().name).await {
            Ok(Ok(joined)) => HttpResponse::Ok().json(joined),
            Ok(Err(rejected)) => HttpResponse::Conflict().body(rejected.to_string()),
            Err(e) => HttpResponse::InternalServerError().body(e.to_string()),
        },
        None => HttpResponse::NotFound().body("game not found"),
    }
}

async fn play(
    repository: web::Data<GameRepository>,
    path: web::Path<String>,
    body: web::Json<PlayCard>,
) -> impl Responder {
    match repository.get_game(&path).await {
        Some(handle) => {
            let PlayCard { player, card } = body.into_inner();
            match handle.play(player, card) {
                Ok(()) => HttpResponse::Accepted().json(serde_json::json!({ "status": "played" })),
                Err(e) => HttpResponse::InternalServerError().body(e.to_string()),
            }
        }
        None => HttpResponse::NotFound().body("game not found"),
    }
}

async fn add_bot(
    repository: web::Data<GameRepository>,
    path: web::Path<String>,
    body: web::Json<AddBot>,
) -> impl Responder {
    let Some(handle) = repository.get_game(&path).await else {
        return HttpResponse::NotFound().body("game not found");
    };
    let url = body.into_inner().url;
    let bot: Arc<dyn Bot> = match builtin(&url) {
        Some(bot) => bot,
        None => match ApiBot::connect(&url).await {
            Ok(bot) => Arc::new(bot),
            Err(e) => return HttpResponse::BadGateway().body(format!("{:#}", e)),
        },
    };
    match handle.add_bot(bot).await {
        Ok(Ok(joined)) => HttpResponse::Ok().json(joined),
        Ok(Err(rejected)) => HttpResponse::Conflict().body(rejected.to_string()),
        Err(e) => HttpResponse::InternalServerError().body(e.to_string()),
    }
}

async fn start(repository: web::Data<GameRepository>, path: web::Path<String>) -> impl Responder {
    match repository.get_game(&path).await {
        Some(handle) => match handle.start().await {
            Ok(true) => HttpResponse::Ok().json(serde_json::json!({ "status": "started" })),
            Ok(false) => HttpResponse::Conflict().body("not enough players to start"),
            Err(e) => HttpResponse::InternalServerError().body(e.to_string()),
        },
        None => HttpResponse::NotFound().body("game not found"),
    }
}

async fn restart(repository: web::Data<GameRepository>, path: web::Path<String>) -> impl Responder {
    match repository.get_game(&path).await {
        Some(handle) => match handle.restart() {
            Ok(()) => HttpResponse::Accepted().json(serde_json::json!({ "status": "restarted" })),
            Err(e) => HttpResponse::InternalServerError().body(e.to_string()),
        },
        None => HttpResponse::NotFound().body("game not found"),
    }
}

async fn abort(repository: web::Data<GameRepository>, path: web::Path<String>) -> impl Responder {
    match repository.get_game(&path).await {
        Some(handle) => match handle.abort() {
            Ok(()) => HttpResponse::Accepted().json(serde_json::json!({ "status": "aborted" })),
            Err(e) => HttpResponse::InternalServerError().body(e.to_string()),
        },
        None => HttpResponse::NotFound().body("game not found"),
    }
}

async fn leave(
    repository: web::Data<GameRepository>,
    path: web::Path<String>,
    body: web::Json<LeaveGame>,
) -> impl Responder {
    match repository.get_game(&path).await {
        Some(handle) => match handle.leave(body.into_inner().player) {
            Ok(()) => HttpResponse::Accepted().json(serde_json::json!({ "status": "left" })),
            Err(e) => HttpResponse::InternalServerError().body(e.to_string()),
        },
        None => HttpResponse::NotFound().body("game not found"),
    }
}

async fn events(
    repository: web::Data<GameRepository>,
    path: web::Path<String>,
    body: web::Payload,
    req: HttpRequest,
) -> impl Responder {
    match repository.get_game(&path).await {
        Some(handle) => match actix_ws::handle(&req, body) {
            Ok((response, session, stream)) => match bridge(handle, session, stream) {
                Ok(()) => response.map_into_left_body(),
                Err(e) => HttpResponse::InternalServerError()
                    .body(e.to_string())
                    .map_into_right_body(),
            },
            Err(e) => HttpResponse::InternalServerError()
                .body(e.to_string())
                .map_into_right_body(),
        },
        None => HttpResponse::NotFound()
            .body("game not found")
            .map_into_right_body(),
    }
}

/// Pumps session events into a WebSocket as JSON, one message per event,
/// until either side goes away. Inbound frames are ignored; the socket is
/// a one-way monitor feed.
fn bridge(
    handle: TableHandle,
    mut session: actix_ws::Session,
    mut stream: actix_ws::MessageStream,
) -> anyhow::Result<()> {
    use futures::StreamExt;
    let (tx, mut rx) = unbounded_channel();
    handle.subscribe(tx)?;
    actix_web::rt::spawn(async move {
        'sesh: loop {
            tokio::select! {
                biased;
                event = rx.recv() => match event {
                    Some(event) => match serde_json::to_string(&event) {
                        Ok(json) => if session.text(json).await.is_err() { break 'sesh },
                        Err(e) => log::error!("failed to serialize event: {}", e),
                    },
                    None => break 'sesh,
                },
                msg = stream.next() => match msg {
                    Some(Ok(actix_ws::Message::Close(_))) => break 'sesh,
                    Some(Ok(_)) => continue 'sesh,
                    Some(Err(_)) => break 'sesh,
                    None => break 'sesh,
                },
            }
        }
    });
    Ok(())
}

async fn bot_info(path: web::Path<String>) -> impl Responder {
    match builtin(&path) {
        Some(bot) => HttpResponse::Ok().json(bot.info()),
        None => HttpResponse::NotFound().body("no such bot"),
    }
}

async fn bot_actions(path: web::Path<String>, body: web::Json<GameContext>) -> impl Responder {
    match builtin(&path) {
        Some(bot) => match bot.choose(&body).await {
            Ok(card) => HttpResponse::Ok().json(card),
            Err(e) => HttpResponse::InternalServerError().body(format!("{:#}", e)),
        },
        None => HttpResponse::NotFound().body("no such bot"),
    }
}

async fn bot_results(path: web::Path<String>, body: web::Json<PlayerRoundResult>) -> impl Responder {
    match builtin(&path) {
        Some(bot) => match bot.notify(&body).await {
            Ok(()) => HttpResponse::NoContent().finish(),
            Err(e) => HttpResponse::InternalServerError().body(format!("{:#}", e)),
        },
        None => HttpResponse::NotFound().body("no such bot"),
    }
}
