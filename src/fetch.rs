use std::cell::{Cell, RefCell};
use std::thread;
use std::time::{Duration, Instant};

use rand::Rng;
use reqwest::StatusCode;
use reqwest::blocking::Client;
use reqwest::header::{ETAG, IF_MODIFIED_SINCE, IF_NONE_MATCH, LAST_MODIFIED, USER_AGENT};
use tracing::debug;

use crate::config::ScrapeConfig;
use crate::error::{ScrapeError, ScrapeResult};
use crate::http_cache::{CacheEntry, HttpCache, now_secs};
use crate::http_client::http_client;

/// Sequential, rate-limited page fetcher shared by every enumerator.
///
/// Before each outbound request it blocks until a jittered delay (bounds from
/// config) has elapsed since the previous one. Responses are revalidated via
/// ETag / Last-Modified so a re-crawl of unchanged pages costs the source a
/// 304 instead of a full page.
pub struct Fetcher {
    client: &'static Client,
    user_agent: String,
    delay_min: Duration,
    delay_max: Duration,
    last_request: Cell<Option<Instant>>,
    cache: RefCell<HttpCache>,
}

impl Fetcher {
    pub fn new(config: &ScrapeConfig) -> ScrapeResult<Self> {
        Ok(Self {
            client: http_client(config.request_timeout)?,
            user_agent: config.user_agent.clone(),
            delay_min: config.delay_min,
            delay_max: config.delay_max,
            last_request: Cell::new(None),
            cache: RefCell::new(HttpCache::open(&config.data_dir)),
        })
    }

    pub fn fetch_page(&self, url: &str) -> ScrapeResult<String> {
        self.pace();

        let cached = self.cache.borrow().get(url).cloned();
        let mut req = self.client.get(url).header(USER_AGENT, &self.user_agent);
        if let Some(entry) = cached.as_ref() {
            if let Some(etag) = entry.etag.as_ref() {
                req = req.header(IF_NONE_MATCH, etag);
            }
            if let Some(last_modified) = entry.last_modified.as_ref() {
                req = req.header(IF_MODIFIED_SINCE, last_modified);
            }
        }

        let resp = req.send()?;
        let status = resp.status();
        if status == StatusCode::NOT_MODIFIED {
            if let Some(entry) = cached {
                debug!("not modified: {url}");
                return Ok(entry.body);
            }
            return Err(ScrapeError::Http {
                status,
                url: url.to_string(),
            });
        }

        let headers = resp.headers().clone();
        let body = resp.text()?;
        if !status.is_success() {
            return Err(ScrapeError::Http {
                status,
                url: url.to_string(),
            });
        }

        let etag = headers
            .get(ETAG)
            .and_then(|v| v.to_str().ok())
            .map(|v| v.to_string());
        let last_modified = headers
            .get(LAST_MODIFIED)
            .and_then(|v| v.to_str().ok())
            .map(|v| v.to_string());
        self.cache.borrow_mut().put(
            url,
            CacheEntry {
                body: body.clone(),
                etag,
                last_modified,
                fetched_at: now_secs(),
            },
        );
        Ok(body)
    }

    /// Blocking sleep until at least a jittered interval has passed since the
    /// previous request. The first request of a run goes out immediately.
    fn pace(&self) {
        if let Some(last) = self.last_request.get() {
            let wait = self.jittered_delay().saturating_sub(last.elapsed());
            if !wait.is_zero() {
                thread::sleep(wait);
            }
        }
        self.last_request.set(Some(Instant::now()));
    }

    fn jittered_delay(&self) -> Duration {
        if self.delay_max <= self.delay_min {
            return self.delay_min;
        }
        rand::thread_rng().gen_range(self.delay_min..=self.delay_max)
    }
}
