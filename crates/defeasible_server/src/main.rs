use actix_web::{middleware::Logger, web, App, HttpResponse, HttpServer, Responder, Result};
use defeasible::ReasonerParams;
use log::info;
use serde::Deserialize;

mod entail;
mod ranking;

const DEFAULT_BIND: &str = "127.0.0.1:7000";

#[derive(Deserialize)]
struct RankForm {
    knowledge_base: String,
    params: Option<String>,
}

#[derive(Deserialize)]
struct EntailForm {
    knowledge_base: String,
    query: String,
    params: Option<String>,
    explain: Option<bool>,
}

#[derive(Deserialize)]
struct JustifyForm {
    knowledge_base: String,
    query: String,
}

fn parse_params(params: Option<String>) -> Result<ReasonerParams> {
    Ok(match params {
        Some(p) => serde_json::from_str(&p)?,
        None => ReasonerParams::default(),
    })
}

async fn index() -> impl Responder {
    HttpResponse::Ok().body(
        "Defeasible reasoning API Server

Available endpoints:
/base-rank
/rational/entail
/lexicographic/entail
/basic-relevant/entail
/minimal-relevant/entail
/justify",
    )
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));

    let bind = std::env::var("DEFEASIBLE_BIND").unwrap_or_else(|_| DEFAULT_BIND.to_string());
    info!("Listening on {}", bind);

    HttpServer::new(|| {
        App::new()
            .wrap(Logger::default())
            .wrap(
                actix_web::middleware::DefaultHeaders::new()
                    .add(("Access-Control-Allow-Origin", "*")),
            )
            .route("/", web::get().to(index))
            .route("/base-rank", web::post().to(ranking::base_rank))
            .route("/justify", web::post().to(entail::justify))
            .route("/{reasoner}/entail", web::post().to(entail::entail))
    })
    .bind(bind)?
    .run()
    .await
}
