use std::time::Duration;

use once_cell::sync::OnceCell;
use reqwest::blocking::Client;

use crate::error::ScrapeResult;

static CLIENT: OnceCell<Client> = OnceCell::new();

/// Shared blocking client. The first caller's timeout wins; the crawl is
/// single-process so in practice there is exactly one.
pub fn http_client(timeout: Duration) -> ScrapeResult<&'static Client> {
    CLIENT
        .get_or_try_init(|| Client::builder().timeout(timeout).build())
        .map_err(Into::into)
}
