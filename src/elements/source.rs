use std::future::Future;
use std::path::PathBuf;
use std::pin::Pin;
use std::time::Duration;

use crate::elements::error::ElementsError;

pub type FetchFuture<'a> = Pin<Box<dyn Future<Output = Result<String, ElementsError>> + Send + 'a>>;

/// Where raw element feed text comes from.
pub trait ElementSource: Send + Sync {
    /// Human readable location, used in logs and on the dashboard
    fn location(&self) -> &str;

    fn fetch(&self) -> FetchFuture<'_>;
}

pub struct HttpSource {
    url: String,
    client: reqwest::Client,
}

impl HttpSource {
    pub fn new(url: String, timeout: Duration) -> Result<Self, ElementsError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { url, client })
    }
}

impl ElementSource for HttpSource {
    fn location(&self) -> &str {
        &self.url
    }

    fn fetch(&self) -> FetchFuture<'_> {
        Box::pin(async move {
            let response = self.client.get(&self.url).send().await?;
            let status = response.status();
            if !status.is_success() {
                return Err(ElementsError::Status {
                    url: self.url.clone(),
                    status: status.as_u16(),
                });
            }
            Ok(response.text().await?)
        })
    }
}

pub struct FileSource {
    location: String,
    path: PathBuf,
}

impl FileSource {
    pub fn new(path: PathBuf) -> Self {
        Self {
            location: path.display().to_string(),
            path,
        }
    }
}

impl ElementSource for FileSource {
    fn location(&self) -> &str {
        &self.location
    }

    fn fetch(&self) -> FetchFuture<'_> {
        Box::pin(async move { Ok(tokio::fs::read_to_string(&self.path).await?) })
    }
}

/// Pick a source for a configured location: `http(s)://` URLs are fetched
/// over the network, `file://` URLs and bare paths are read from disk.
pub fn source_from_location(
    location: &str,
    timeout: Duration,
) -> Result<Box<dyn ElementSource>, ElementsError> {
    if location.starts_with("http://") || location.starts_with("https://") {
        return Ok(Box::new(HttpSource::new(location.to_string(), timeout)?));
    }
    let path = location.strip_prefix("file://").unwrap_or(location);
    Ok(Box::new(FileSource::new(PathBuf::from(path))))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[tokio::test]
    async fn file_source_reads_feed_text() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "hello feed").unwrap();

        let location = format!("file://{}", file.path().display());
        let source = source_from_location(&location, Duration::from_secs(1)).unwrap();
        assert_eq!(source.location(), file.path().display().to_string());
        assert_eq!(source.fetch().await.unwrap(), "hello feed");
    }

    #[tokio::test]
    async fn missing_file_is_unavailable() {
        let source =
            source_from_location("/definitely/not/here.txt", Duration::from_secs(1)).unwrap();
        assert!(matches!(
            source.fetch().await,
            Err(ElementsError::FileRead(_))
        ));
    }

    #[test]
    fn http_locations_use_http_source() {
        let source = source_from_location(
            "https://celestrak.org/NORAD/elements/stations.txt",
            Duration::from_secs(1),
        )
        .unwrap();
        assert_eq!(
            source.location(),
            "https://celestrak.org/NORAD/elements/stations.txt"
        );
    }
}
