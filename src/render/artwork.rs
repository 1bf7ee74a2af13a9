use std::path::{Path, PathBuf};
use std::time::Duration;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use image::DynamicImage;

use crate::error::Error;

/// Where a card's `image` / `backimage` string points.
#[derive(Debug, PartialEq)]
pub(crate) enum ArtworkSource<'a> {
    /// `data:<mime>;base64,<payload>`
    Inline(&'a str),
    Remote(&'a str),
    File(PathBuf),
}

impl<'a> ArtworkSource<'a> {
    pub(crate) fn classify(reference: &'a str, base_dir: &Path) -> Self {
        let r = reference.trim();
        if let Some(rest) = r.strip_prefix("data:") {
            return ArtworkSource::Inline(rest);
        }
        if r.starts_with("http://") || r.starts_with("https://") {
            return ArtworkSource::Remote(r);
        }
        let path = r.strip_prefix("file://").unwrap_or(r);
        let path = Path::new(path);
        if path.is_absolute() {
            ArtworkSource::File(path.to_path_buf())
        } else {
            ArtworkSource::File(base_dir.join(path))
        }
    }
}

/// Fetches and decodes artwork. Remote fetches share one HTTP client whose
/// timeout bounds how long a single image may take.
pub(crate) struct ArtworkLoader {
    base_dir: PathBuf,
    timeout: Duration,
    client: Option<reqwest::blocking::Client>,
}

impl ArtworkLoader {
    pub(crate) fn new(base_dir: PathBuf, timeout: Duration) -> Self {
        ArtworkLoader { base_dir, timeout, client: None }
    }

    fn client(&mut self) -> Result<&reqwest::blocking::Client, Error> {
        if self.client.is_none() {
            let client = reqwest::blocking::Client::builder()
                .timeout(self.timeout)
                .connect_timeout(self.timeout)
                .build()?;
            self.client = Some(client);
        }
        self.client
            .as_ref()
            .ok_or_else(|| Error::Network("HTTP client unavailable".into()))
    }

    pub(crate) fn load(&mut self, reference: &str) -> Result<DynamicImage, Error> {
        let bytes = match ArtworkSource::classify(reference, &self.base_dir) {
            ArtworkSource::Inline(rest) => decode_data_url(rest)?,
            ArtworkSource::Remote(url) => {
                let timeout = self.timeout;
                let resp = self
                    .client()?
                    .get(url)
                    .send()
                    .and_then(|r| r.error_for_status())
                    .map_err(|e| {
                        if e.is_timeout() {
                            Error::Network(format!("{url}: no response within {timeout:?}"))
                        } else {
                            Error::Network(format!("{url}: {e}"))
                        }
                    })?;
                resp.bytes()
                    .map_err(|e| Error::Network(format!("{url}: {e}")))?
                    .to_vec()
            }
            ArtworkSource::File(path) => std::fs::read(&path).map_err(|e| {
                Error::Io(std::io::Error::new(e.kind(), format!("{}: {}", e, path.display())))
            })?,
        };
        image::load_from_memory(&bytes)
            .map_err(|e| Error::Image(format!("{}: {e}", shorten(reference))))
    }
}

fn decode_data_url(rest: &str) -> Result<Vec<u8>, Error> {
    let (meta, payload) = rest
        .split_once(',')
        .ok_or_else(|| Error::Image("malformed data URL".into()))?;
    if !meta.ends_with(";base64") {
        return Err(Error::Image(format!("unsupported data URL encoding '{meta}'")));
    }
    STANDARD
        .decode(payload.trim())
        .map_err(|e| Error::Image(format!("bad base64 in data URL: {e}")))
}

/// Data URLs can be megabytes long; keep log lines readable.
fn shorten(reference: &str) -> String {
    if reference.len() > 64 {
        let cut = (0..=64).rev().find(|&i| reference.is_char_boundary(i)).unwrap_or(0);
        format!("{}..", &reference[..cut])
    } else {
        reference.to_string()
    }
}
