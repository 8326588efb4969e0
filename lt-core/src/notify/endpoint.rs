use std::time::Duration;

use async_trait::async_trait;
use reqwest::Url;
use tracing::*;

use crate::prelude::*;

#[cfg_attr(any(test, feature = "mock"), mockall::automock)]
#[async_trait]
pub trait ShutdownEndpoint {
    fn url(&self) -> String;
    async fn interrupt(&self) -> EmptyResult;
}

// The collector (fluentd, in practice) exposes a plain GET endpoint that asks its workers to
// flush and stop.  There's no request body and we don't care what comes back; if the collector
// answered at all (whatever the status code), the signal was delivered.
pub struct HttpShutdownEndpoint {
    client: reqwest::Client,
    url: Url,
}

impl HttpShutdownEndpoint {
    pub fn new(url: Url) -> anyhow::Result<HttpShutdownEndpoint> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(NOTIFY_REQUEST_TIMEOUT_SECONDS))
            .build()?;
        Ok(HttpShutdownEndpoint { client, url })
    }
}

#[async_trait]
impl ShutdownEndpoint for HttpShutdownEndpoint {
    fn url(&self) -> String {
        self.url.to_string()
    }

    async fn interrupt(&self) -> EmptyResult {
        debug!("sending GET {}", self.url);
        let resp = self.client.get(self.url.clone()).send().await?;
        let status = resp.status();
        if status.is_success() {
            debug!("collector responded with {status}");
        } else {
            warn!("collector responded with {status}, treating the signal as delivered");
        }
        Ok(())
    }
}
