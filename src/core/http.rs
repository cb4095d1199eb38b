use std::{
    fs::File,
    io::{
        BufWriter,
        Write,
    },
    path::{
        Path,
        PathBuf,
    },
    time::Duration,
};

use reqwest::{
    blocking::{
        Client,
        Response,
    },
    header::{
        ACCEPT_ENCODING,
        CONTENT_DISPOSITION,
        USER_AGENT,
    },
    StatusCode,
};
use thiserror::Error;
use tracing::{
    debug,
    info,
};

use crate::core::LoanError;

const DRIVE_DOWNLOAD_URL: &str = "https://drive.google.com/uc";
const CONFIRM_COOKIE_PREFIX: &str = "download_warning";

#[derive(Error, Debug)]
pub enum FetchError {
    #[error("No model file id is configured")]
    MissingFileId,

    #[error("HTTP client build failed: {0}")]
    Client(String),

    #[error("Failed HTTP GET {url}: {message}")]
    Transport { url: String, message: String },

    #[error("HTTP error {status} from {url}")]
    Status { status: StatusCode, url: String },

    #[error("Download from {0} returned no content")]
    EmptyBody(String),

    #[error("Failed to write model to {path}: {message}")]
    Write { path: String, message: String },
}

pub fn http_client(timeout: Duration) -> Result<Client, LoanError> {
    let client = Client::builder().timeout(timeout).cookie_store(true).build()?;
    Ok(client)
}

/// `https://drive.google.com/uc?id={file_id}&export=download[&confirm={token}]`
pub fn download_url(base: &str, file_id: &str, confirm: Option<&str>) -> String {
    let mut url = format!("{base}?id={file_id}&export=download");
    if let Some(token) = confirm {
        url.push_str("&confirm=");
        url.push_str(token);
    }
    url
}

/// Value of the first cookie whose name starts with `download_warning`.
pub fn confirm_token<I, N, V>(cookies: I) -> Option<String>
where
    I: IntoIterator<Item = (N, V)>,
    N: AsRef<str>,
    V: AsRef<str>,
{
    cookies
        .into_iter()
        .find(|(name, _)| name.as_ref().starts_with(CONFIRM_COOKIE_PREFIX))
        .map(|(_, value)| value.as_ref().to_string())
}

/// Downloads a publicly shared Google Drive file.
pub struct DriveDownloader {
    client: Client,
    base_url: String,
}

impl DriveDownloader {
    pub fn new(client: Client) -> Self {
        Self::with_base_url(client, DRIVE_DOWNLOAD_URL)
    }

    pub fn with_base_url(client: Client, base_url: impl Into<String>) -> Self {
        Self { client, base_url: base_url.into() }
    }

    fn get(&self, url: &str) -> Result<Response, FetchError> {
        self.client
            .get(url)
            .header(USER_AGENT, "loan-approval/0.1 (+reqwest)")
            .header(ACCEPT_ENCODING, "identity")
            .send()
            .map_err(|e| FetchError::Transport { url: url.to_string(), message: e.to_string() })
    }

    /// Fetches `file_id` and writes the body to `dest`, replacing any previous file.
    ///
    /// Large files are answered with an interstitial page instead of the file
    /// itself; that response has no `Content-Disposition` header and sets a
    /// `download_warning*` cookie whose value must be echoed back as `confirm`.
    pub fn fetch(&self, file_id: &str, dest: &Path) -> Result<PathBuf, FetchError> {
        if file_id.trim().is_empty() {
            return Err(FetchError::MissingFileId);
        }

        let url = download_url(&self.base_url, file_id, None);
        info!(file_id, "Downloading model");
        let mut resp = self.get(&url)?;

        if !resp.headers().contains_key(CONTENT_DISPOSITION) {
            let token =
                confirm_token(resp.cookies().map(|c| (c.name().to_string(), c.value().to_string())));
            if let Some(token) = token {
                debug!(file_id, "Download needs confirmation, retrying with token");
                let confirm_url = download_url(&self.base_url, file_id, Some(&token));
                resp = self.get(&confirm_url)?;
            }
        }

        ensure_ok(&resp)?;
        let final_url = resp.url().to_string();
        let bytes = write_body(resp, dest)?;
        if bytes == 0 {
            return Err(FetchError::EmptyBody(final_url));
        }

        info!(path = %dest.display(), bytes, "Model downloaded");
        Ok(dest.to_path_buf())
    }
}

fn ensure_ok(resp: &Response) -> Result<(), FetchError> {
    if resp.status() != StatusCode::OK {
        return Err(FetchError::Status { status: resp.status(), url: resp.url().to_string() });
    }
    Ok(())
}

fn write_body(mut resp: Response, path: &Path) -> Result<u64, FetchError> {
    let write_err =
        |e: std::io::Error| FetchError::Write { path: path.display().to_string(), message: e.to_string() };

    let mut writer = BufWriter::new(File::create(path).map_err(write_err)?);
    let n = resp.copy_to(&mut writer).map_err(|e| FetchError::Write {
        path: path.display().to_string(),
        message: e.to_string(),
    })?;
    writer.flush().map_err(write_err)?;
    Ok(n)
}
