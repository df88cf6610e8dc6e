use std::{net::SocketAddr, path::PathBuf};

use anyhow::Context;
use axum::{
    routing::{delete, get},
    Router,
};
use structopt::StructOpt;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

mod db;
mod error;
mod fuzz;
mod handlers;
mod live;

pub use db::{Db, Snapshot};
pub use error::Error;

#[derive(Debug, StructOpt)]
#[structopt(name = "palaver-server", about = "Remote data store for palaver comments")]
struct Opt {
    /// Address to listen on
    #[structopt(short, long, default_value = "127.0.0.1:8000")]
    listen: SocketAddr,

    /// JSON file holding the store, created on first write. Without it
    /// everything stays in memory
    #[structopt(long, env = "PALAVER_DB", parse(from_os_str))]
    db: Option<PathBuf>,
}

pub fn app(db: Db) -> Router {
    Router::new()
        .route(
            "/comments",
            get(handlers::list_comments).post(handlers::create_comment),
        )
        .route(
            "/comments/:id",
            delete(handlers::delete_comment).patch(handlers::patch_comment),
        )
        .route("/currentUser", get(handlers::current_user))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(db)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();
    let opt = Opt::from_args();

    let db = match opt.db {
        Some(path) => Db::open(path).await.context("opening store")?,
        None => {
            tracing::warn!("no store file given, comments will not survive a restart");
            Db::in_memory(Snapshot::default())
        }
    };

    tracing::info!("listening on {}", opt.listen);
    axum::Server::bind(&opt.listen)
        .serve(app(db).into_make_service())
        .await
        .context("serving axum webserver")
}
