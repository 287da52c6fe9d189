//! Crawl-and-resume pipeline for football season statistics: enumerate a
//! league's clubs, each club's players, scrape per-season stat rows, and
//! accumulate them into per-league CSV tables that can later be combined.

pub mod checkpoint;
pub mod club;
pub mod combine;
pub mod config;
pub mod crawl;
pub mod dataset;
pub mod error;
pub mod fetch;
pub mod html;
pub mod http_cache;
pub mod http_client;
pub mod league;
pub mod player;
pub mod records;
pub mod source;
