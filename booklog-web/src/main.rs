//! booklog-web - personal reading-log web application
//!
//! Each registered user keeps a private collection of finished books and can
//! create, edit, delete, list, and bulk import/export them as CSV.

use anyhow::Result;
use booklog_common::config::resolve_database_path;
use booklog_common::db::init::init_database;
use booklog_web::{build_router, AppState};
use clap::Parser;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "booklog-web", about = "Personal reading-log web application")]
struct Args {
    /// Database file path (overrides BOOKLOG_DATABASE and the config file)
    #[arg(long)]
    database: Option<String>,

    /// Listen address
    #[arg(long, env = "BOOKLOG_LISTEN", default_value = "127.0.0.1:5710")]
    listen: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing subscriber before anything that can log
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    info!("Starting booklog v{}", env!("CARGO_PKG_VERSION"));

    let args = Args::parse();

    let db_path = resolve_database_path(args.database.as_deref())?;
    info!("Database path: {}", db_path.display());

    let pool = init_database(&db_path).await?;

    let state = AppState::new(pool);
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&args.listen).await?;
    info!("booklog listening on http://{}", args.listen);

    axum::serve(listener, app).await?;

    Ok(())
}
