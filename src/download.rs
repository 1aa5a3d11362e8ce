//! Fetching custom emoji images from a Misskey-style server.
//!
//! Feeds `Catalog::build_from_dir`; the mosaic pipeline itself never touches the network.

use crate::catalog::{matches_keywords, parse_document};
use crate::{MosaicError, Result};
use log::{info, warn};
use reqwest::blocking::Client;
use reqwest::Url;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(20);
const DEFAULT_EXTENSION: &str = "webp";

/// One entry of the server's emoji listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteEmoji {
    pub name: String,
    pub url: String,
}

#[derive(Deserialize)]
struct RawRemoteEmoji {
    name: Option<String>,
    url: Option<String>,
}

/// Parse an emoji listing, dropping entries without a name or url.
pub fn parse_listing(json: &str) -> Result<Vec<RemoteEmoji>> {
    let emojis = parse_document(json)?
        .into_iter()
        .filter_map(|value| serde_json::from_value::<RawRemoteEmoji>(value).ok())
        .filter_map(|raw| match (raw.name, raw.url) {
            (Some(name), Some(url)) if !name.is_empty() && !url.is_empty() => {
                Some(RemoteEmoji { name, url })
            }
            _ => None,
        })
        .collect();
    Ok(emojis)
}

/// `<name>.<ext>` with the extension taken from the url path, `None` for names
/// that would escape the target directory.
pub fn file_name(emoji: &RemoteEmoji) -> Option<String> {
    if emoji.name.starts_with('.') || emoji.name.contains(['/', '\\']) {
        return None;
    }
    let ext = Url::parse(&emoji.url)
        .ok()
        .and_then(|url| {
            let last = url.path_segments()?.last()?.to_string();
            Path::new(&last)
                .extension()
                .and_then(|e| e.to_str())
                .map(str::to_string)
        })
        .unwrap_or_else(|| DEFAULT_EXTENSION.to_string());
    Some(format!("{}.{ext}", emoji.name))
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct DownloadReport {
    pub downloaded: usize,
    pub skipped: usize,
    pub failed: usize,
}

/// Downloads the emoji listed by one server.
pub struct Downloader {
    server: String,
    client: Client,
    delay: Duration,
}

impl Downloader {
    pub fn new(server: &str) -> Result<Self> {
        let server = server.trim_end_matches('/').to_string();
        Url::parse(&server).map_err(|e| MosaicError::InvalidUrl(format!("{server}: {e}")))?;
        let client = Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self { server, client, delay: Duration::from_secs(1) })
    }

    /// Pause after each download attempt, to go easy on the server.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    fn get(&self, url: &str) -> Result<reqwest::blocking::Response> {
        let response = self.client.get(url).send()?;
        if !response.status().is_success() {
            return Err(MosaicError::RequestFailed {
                url: url.to_string(),
                status: response.status().as_u16(),
            });
        }
        Ok(response)
    }

    pub fn fetch_listing(&self) -> Result<Vec<RemoteEmoji>> {
        let url = format!("{}/api/emojis", self.server);
        info!("fetching emoji listing from {url}");
        parse_listing(&self.get(&url)?.text()?)
    }

    /// Save every listed emoji whose name matches `keywords` into `dir`.
    /// Existing files are left alone; failed downloads are logged and counted.
    pub fn download_all(&self, dir: impl AsRef<Path>, keywords: &[String]) -> Result<DownloadReport> {
        let dir = dir.as_ref();
        std::fs::create_dir_all(dir)?;
        let keywords: Vec<String> = keywords.iter().map(|k| k.to_lowercase()).collect();

        let listing = self.fetch_listing()?;
        let wanted: Vec<RemoteEmoji> = listing
            .into_iter()
            .filter(|e| matches_keywords(&e.name, &keywords))
            .collect();
        info!("{} emoji match {:?}", wanted.len(), keywords);

        let mut report = DownloadReport::default();
        for (i, emoji) in wanted.iter().enumerate() {
            let Some(name) = file_name(emoji) else {
                warn!("[{}/{}] unusable name {:?}", i + 1, wanted.len(), emoji.name);
                report.failed += 1;
                continue;
            };
            let path: PathBuf = dir.join(&name);
            if path.exists() {
                info!("[{}/{}] skipping existing {name}", i + 1, wanted.len());
                report.skipped += 1;
                continue;
            }

            match self.fetch_to(&emoji.url, &path) {
                Ok(()) => {
                    info!("[{}/{}] saved {name}", i + 1, wanted.len());
                    report.downloaded += 1;
                }
                Err(e) => {
                    warn!("[{}/{}] {}: {e}", i + 1, wanted.len(), emoji.name);
                    report.failed += 1;
                }
            }
            std::thread::sleep(self.delay);
        }
        Ok(report)
    }

    fn fetch_to(&self, url: &str, path: &Path) -> Result<()> {
        let bytes = self.get(url)?.bytes()?;
        std::fs::write(path, &bytes)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Catalog;
    use image::{ImageFormat, Rgba, RgbaImage};
    use std::io::{BufRead, BufReader, Cursor, Write};
    use std::net::TcpListener;

    /// Minimal HTTP server on a local port. `routes` gets the server's base url
    /// so listings can point back at it; unknown paths answer 404.
    fn serve(routes: impl FnOnce(&str) -> Vec<(String, Vec<u8>)>) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let base = format!("http://{}", listener.local_addr().unwrap());
        let routes = routes(&base);
        std::thread::spawn(move || {
            for stream in listener.incoming() {
                let Ok(mut stream) = stream else { continue };
                let mut reader = BufReader::new(stream.try_clone().unwrap());
                let mut request_line = String::new();
                reader.read_line(&mut request_line).unwrap();
                loop {
                    let mut header = String::new();
                    if reader.read_line(&mut header).unwrap() == 0 || header == "\r\n" {
                        break;
                    }
                }
                let path = request_line.split_whitespace().nth(1).unwrap_or("");
                let (status, body) = match routes.iter().find(|(p, _)| p == path) {
                    Some((_, body)) => ("200 OK", body.clone()),
                    None => ("404 Not Found", Vec::new()),
                };
                let head = format!(
                    "HTTP/1.1 {status}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
                    body.len()
                );
                stream.write_all(head.as_bytes()).unwrap();
                stream.write_all(&body).unwrap();
            }
        });
        base
    }

    fn png(color: [u8; 4]) -> Vec<u8> {
        let mut buf = Vec::new();
        RgbaImage::from_pixel(4, 4, Rgba(color))
            .write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)
            .unwrap();
        buf
    }

    #[test]
    fn test_parse_listing_drops_incomplete() {
        let listing = parse_listing(
            r#"{"emojis":[
                {"name":"pity","url":"https://h/files/a.png","category":null},
                {"name":"nourl"},
                {"url":"https://h/files/b.png"},
                {"name":"","url":"https://h/files/c.png"}
            ]}"#,
        )
        .unwrap();
        assert_eq!(
            listing,
            [RemoteEmoji { name: "pity".into(), url: "https://h/files/a.png".into() }]
        );
        assert!(parse_listing("{}").is_err());
    }

    #[test]
    fn test_file_name() {
        let emoji = |name: &str, url: &str| RemoteEmoji { name: name.into(), url: url.into() };
        assert_eq!(file_name(&emoji("a", "https://h/files/x.png")).as_deref(), Some("a.png"));
        assert_eq!(file_name(&emoji("a", "https://h/files/x.gif?v=2")).as_deref(), Some("a.gif"));
        assert_eq!(file_name(&emoji("a", "https://h/files/blob")).as_deref(), Some("a.webp"));
        assert_eq!(file_name(&emoji("a", "not a url")).as_deref(), Some("a.webp"));
        assert_eq!(file_name(&emoji("../a", "https://h/x.png")), None);
        assert_eq!(file_name(&emoji(".hidden", "https://h/x.png")), None);
    }

    #[test]
    fn test_invalid_server() {
        assert!(matches!(Downloader::new("no scheme here"), Err(MosaicError::InvalidUrl(_))));
    }

    #[test]
    fn test_download_filters_skips_and_feeds_catalog() {
        let base = serve(|base| {
            let listing = format!(
                r#"{{"emojis":[
                    {{"name":"pity_red","url":"{base}/files/red.png"}},
                    {{"name":"pity_gone","url":"{base}/files/gone.png"}},
                    {{"name":"pity_old","url":"{base}/files/old.png"}},
                    {{"name":"other","url":"{base}/files/red.png"}}
                ]}}"#
            );
            vec![
                ("/api/emojis".to_string(), listing.into_bytes()),
                ("/files/red.png".to_string(), png([255, 0, 0, 255])),
            ]
        });

        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("pity_old.png"), b"old").unwrap();

        let report = Downloader::new(&format!("{base}/"))
            .unwrap()
            .with_delay(Duration::ZERO)
            .download_all(dir.path(), &["PITY".to_string()])
            .unwrap();
        assert_eq!(report, DownloadReport { downloaded: 1, skipped: 1, failed: 1 });

        assert_eq!(std::fs::read(dir.path().join("pity_old.png")).unwrap(), b"old");
        assert!(!dir.path().join("pity_gone.png").exists());
        assert!(!dir.path().join("other.png").exists());

        // pity_old.png is not a real image and gets skipped
        let catalog = Catalog::build_from_dir(dir.path(), &[]).unwrap();
        assert_eq!(catalog.len(), 1);
        assert_eq!(catalog.entries()[0].name, ":pity_red:");
        assert_eq!(catalog.entries()[0].color, [255, 0, 0]);
    }

    #[test]
    fn test_listing_failure_is_an_error() {
        let base = serve(|_| Vec::new());
        let result = Downloader::new(&base).unwrap().fetch_listing();
        assert!(matches!(result, Err(MosaicError::RequestFailed { status: 404, .. })));
    }
}
