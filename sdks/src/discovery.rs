// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

use gotag_core::domain::bailiff::BailiffHandle;
use gotag_core::infrastructure::discovery::StaticDiscovery;
use std::sync::Arc;
use std::time::Duration;

use crate::client::{ClientError, HttpBailiffClient};

/// Build a discovery service over a fixed list of remote Bailiff URLs.
pub fn discovery_from_urls<S: AsRef<str>>(
    urls: &[S],
    timeout: Duration,
) -> Result<StaticDiscovery, ClientError> {
    let handles = urls
        .iter()
        .map(|url| {
            HttpBailiffClient::with_timeout(url.as_ref(), timeout)
                .map(|client| Arc::new(client) as BailiffHandle)
        })
        .collect::<Result<Vec<_>, _>>()?;
    Ok(StaticDiscovery::new(handles))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builds_one_handle_per_url() {
        let discovery = discovery_from_urls(
            &["http://127.0.0.1:8700", "http://127.0.0.1:8701"],
            Duration::from_secs(1),
        )
        .unwrap();
        assert_eq!(discovery.len(), 2);
    }

    #[test]
    fn test_one_bad_url_fails_the_whole_list() {
        let result = discovery_from_urls(&["http://127.0.0.1:8700", "::"], Duration::from_secs(1));
        assert!(result.is_err());
    }
}
