//! Downloads rate feed snapshots into a directory, one file per feed date

use crate::providers::ecb::{EcbSource, latest_feed_date, parse_feed};
use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};
use std::path::PathBuf;
use tracing::{debug, info};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    /// A snapshot with the newest data is already on disk.
    AlreadyCurrent(PathBuf),
    Saved(PathBuf),
}

pub struct SnapshotFetcher {
    source: EcbSource,
    directory: PathBuf,
}

impl SnapshotFetcher {
    pub fn new(url: &str, directory: impl Into<PathBuf>) -> Self {
        Self {
            source: EcbSource::new(url),
            directory: directory.into(),
        }
    }

    pub fn snapshot_path(&self, date: NaiveDate) -> PathBuf {
        self.directory.join(format!("{}.xml", date.format("%Y-%m-%d")))
    }

    pub async fn download(&self) -> Result<FetchOutcome> {
        self.download_as_of(Local::now().date_naive()).await
    }

    /// Saves the feed as `<latest feed date>.xml`, unless a snapshot for
    /// `today` or for that feed date already exists.
    pub async fn download_as_of(&self, today: NaiveDate) -> Result<FetchOutcome> {
        let todays_path = self.snapshot_path(today);
        if todays_path.exists() {
            info!("Most recent data already exists at {}", todays_path.display());
            return Ok(FetchOutcome::AlreadyCurrent(todays_path));
        }

        info!("Fetching rate feed from {}", self.source.url());
        let raw = self.source.fetch_remote().await?;
        let feed_date = latest_feed_date(&parse_feed(&raw)?)?;
        debug!(%feed_date, "Feed downloaded");

        let path = self.snapshot_path(feed_date);
        if path.exists() {
            info!("Most recent data already exists at {}", path.display());
            return Ok(FetchOutcome::AlreadyCurrent(path));
        }

        tokio::fs::create_dir_all(&self.directory)
            .await
            .with_context(|| format!("Failed to create directory: {}", self.directory.display()))?;
        tokio::fs::write(&path, raw.as_bytes())
            .await
            .with_context(|| format!("Failed to write snapshot to {}", path.display()))?;

        info!("Saved data for {} to {}", feed_date, path.display());
        Ok(FetchOutcome::Saved(path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const FEED: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<gesmes:Envelope xmlns:gesmes="http://www.gesmes.org/xml/2002-08-01" xmlns="http://www.ecb.int/vocabulary/2002-08-01/eurofxref">
    <gesmes:subject>Reference rates</gesmes:subject>
    <Cube>
        <Cube time="2017-07-21">
            <Cube currency="USD" rate="1.1642"/>
        </Cube>
        <Cube time="2017-07-20">
            <Cube currency="USD" rate="1.1512"/>
        </Cube>
    </Cube>
</gesmes:Envelope>"#;

    async fn create_mock_server(status_code: u16, expected_calls: u64) -> MockServer {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/feed.xml"))
            .respond_with(ResponseTemplate::new(status_code).set_body_string(FEED))
            .expect(expected_calls)
            .mount(&mock_server)
            .await;
        mock_server
    }

    fn day(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[tokio::test]
    async fn test_saves_snapshot_named_by_feed_date() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let mock_server = create_mock_server(200, 1).await;
        let fetcher = SnapshotFetcher::new(
            &format!("{}/feed.xml", mock_server.uri()),
            temp_dir.path(),
        );

        let outcome = fetcher.download_as_of(day("2017-07-22")).await?;
        let expected = temp_dir.path().join("2017-07-21.xml");
        assert_eq!(outcome, FetchOutcome::Saved(expected.clone()));
        assert_eq!(std::fs::read_to_string(expected)?, FEED);
        Ok(())
    }

    #[tokio::test]
    async fn test_skips_download_when_today_exists() -> Result<()> {
        let temp_dir = TempDir::new()?;
        std::fs::write(temp_dir.path().join("2017-07-22.xml"), "cached")?;
        let mock_server = create_mock_server(200, 0).await;
        let fetcher = SnapshotFetcher::new(
            &format!("{}/feed.xml", mock_server.uri()),
            temp_dir.path(),
        );

        let outcome = fetcher.download_as_of(day("2017-07-22")).await?;
        assert!(matches!(outcome, FetchOutcome::AlreadyCurrent(_)));
        Ok(())
    }

    #[tokio::test]
    async fn test_does_not_overwrite_existing_feed_date() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let existing = temp_dir.path().join("2017-07-21.xml");
        std::fs::write(&existing, "cached")?;
        let mock_server = create_mock_server(200, 1).await;
        let fetcher = SnapshotFetcher::new(
            &format!("{}/feed.xml", mock_server.uri()),
            temp_dir.path(),
        );

        let outcome = fetcher.download_as_of(day("2017-07-22")).await?;
        assert_eq!(outcome, FetchOutcome::AlreadyCurrent(existing.clone()));
        assert_eq!(std::fs::read_to_string(existing)?, "cached");
        Ok(())
    }

    #[tokio::test]
    async fn test_http_error_fails() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let mock_server = create_mock_server(503, 1).await;
        let fetcher = SnapshotFetcher::new(
            &format!("{}/feed.xml", mock_server.uri()),
            temp_dir.path(),
        );

        let result = fetcher.download_as_of(day("2017-07-22")).await;
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("HTTP error: 503"));
        assert_eq!(std::fs::read_dir(temp_dir.path())?.count(), 0);
        Ok(())
    }
}
