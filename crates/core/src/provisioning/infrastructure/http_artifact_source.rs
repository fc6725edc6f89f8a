use std::time::Duration;

use reqwest::blocking::Client;

use crate::provisioning::domain::acquisition_error::AcquisitionError;
use crate::provisioning::domain::artifact_source::{ArtifactSource, RemoteArtifact};

const CONNECT_TIMEOUT: Duration = Duration::from_secs(30);

/// Fetches artifacts over HTTP(S) with a blocking reqwest client.
///
/// `open` returns as soon as the response headers arrive; the body is
/// streamed by the caller.
pub struct HttpArtifactSource {
    client: Client,
}

impl HttpArtifactSource {
    pub fn new() -> Result<Self, AcquisitionError> {
        // Model files run to gigabytes, so there is no overall request timeout.
        let client = Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .timeout(None::<Duration>)
            .build()
            .map_err(|e| AcquisitionError::Transport {
                target: "http client".to_string(),
                reason: e.to_string(),
            })?;
        Ok(Self { client })
    }
}

impl ArtifactSource for HttpArtifactSource {
    fn open(&self, url: &str) -> Result<RemoteArtifact, AcquisitionError> {
        let response = self
            .client
            .get(url)
            .send()
            .map_err(|e| AcquisitionError::Transport {
                target: url.to_string(),
                reason: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(AcquisitionError::Status {
                target: url.to_string(),
                status: status.as_u16(),
                reason: status.canonical_reason().unwrap_or("Unknown").to_string(),
            });
        }

        let content_length = response.content_length();
        Ok(RemoteArtifact::new(content_length, Box::new(response)))
    }
}
