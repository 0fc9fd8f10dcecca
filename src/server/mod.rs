// src/server/mod.rs
use crate::api::*;
use crate::config::Config;
use crate::database::DbPool;
use crate::scraping::TeamPageScraper;
use rocket::{routes, Build, Rocket};

pub mod routes;

pub struct ServerState {
    pub config: Config,
    pub db_pool: DbPool,
    pub scraper: TeamPageScraper,
}

pub fn build_rocket(config: Config, db_pool: DbPool) -> Rocket<Build> {
    let figment = rocket::Config::figment()
        .merge(("address", config.server.address.clone()))
        .merge(("port", config.server.port));

    let scraper = TeamPageScraper::new(&config.scraping);
    let state = ServerState {
        config,
        db_pool,
        scraper,
    };

    rocket::custom(figment).manage(state).mount(
        "/",
        routes![
            // Banner and liveness
            routes::health::index,
            routes::health::health_check,
            // Scraping endpoints
            scrape_leads,
            batch_scrape_leads,
            // Leads retrieval
            get_leads,
            // Schema administration
            create_tables,
        ],
    )
}
