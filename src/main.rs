mod api;
mod blockchain;
mod config;
mod error;
mod network;
mod state;
mod transaction;

use actix_web::middleware::Logger;
use actix_web::{App, HttpServer, rt, web};
use dotenvy::dotenv;
use log::info;
use std::io;

use config::Config;
use network::HttpChainFetcher;
use state::AppState;

fn main() -> io::Result<()> {
    let _ = dotenv();
    env_logger::init();

    let config = Config::from_env();

    // The blocking HTTP client must be built and dropped outside the async runtime.
    let fetcher = HttpChainFetcher::new(config.peer_timeout).map_err(io::Error::other)?;
    let state = web::Data::new(AppState::from_config(&config, Box::new(fetcher)));

    info!(
        "⛓️ Starting ledger node {} at http://{}:{} (difficulty={}, reward={:?})",
        config.node_address, config.host, config.port, config.difficulty, config.reward
    );

    let server_state = state.clone();
    let result = rt::System::new().block_on(async move {
        let server = HttpServer::new({
            let state = server_state.clone();
            move || {
                App::new()
                    .app_data(state.clone())
                    .wrap(Logger::default())
                    .configure(api::init_routes)
            }
        })
        .bind((config.host.as_str(), config.port))?
        .run();

        rt::spawn(async move {
            if rt::signal::ctrl_c().await.is_ok() {
                info!("shutdown requested, cancelling puzzle searches");
                server_state.stop_mining();
            }
        });

        server.await
    });

    info!("server stopped");
    drop(state);
    result
}
