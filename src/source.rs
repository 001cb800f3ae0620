//! Where UI dumps come from: local files, directories of dumps, or a URL.
//!
//! Failures here are I/O or transport failures and are reported as such; they
//! never surface as [`DumpReaderError::MalformedDocument`].

use std::io::Read;
use std::path::{Path, PathBuf};
use std::time::Duration;

use reqwest::Client;
use tokio::time::{Instant, timeout_at};
use tracing::{debug, error, warn};
use walkdir::WalkDir;

use crate::error::DumpReaderError;
use crate::reader::charset::{decode_to_string, get_decoded_reader};
use crate::summary::{Summary, summarize};

pub fn read_document_file(file_path: &Path,) -> Result<String, DumpReaderError,> {
    let file = std::fs::File::open(file_path,).map_err(|e| DumpReaderError::FileReadError {
        path:   file_path.to_path_buf(),
        source: e,
    },)?;
    if file.metadata().is_ok_and(|m| m.is_dir(),) {
        return Err(DumpReaderError::IsADirectory {
            path: file_path.to_path_buf(),
        },);
    }
    let mut decoder = get_decoded_reader(file,).map_err(|e| DumpReaderError::FileReadError {
        path:   file_path.to_path_buf(),
        source: e,
    },)?;
    let mut content = String::new();
    decoder.read_to_string(&mut content,).map_err(|e| DumpReaderError::FileReadError {
        path:   file_path.to_path_buf(),
        source: e,
    },)?;
    Ok(content,)
}

pub fn summarize_file(file_path: &Path,) -> Result<Summary, DumpReaderError,> {
    let content = read_document_file(file_path,)?;
    summarize(&content,)
}

#[derive(Debug, Clone, Default,)]
pub struct DirectoryOptions {
    pub recursive:   bool,
    /// Extensions to keep, compared case-insensitively. `None` keeps `xml` only.
    pub filter_exts: Option<Vec<String,>,>,
}

impl DirectoryOptions {
    fn accepts(&self, path: &Path,) -> bool {
        let Some(ext,) = path.extension().and_then(|s| s.to_str(),) else {
            return false;
        };
        match &self.filter_exts {
            Some(filters,) => filters.iter().any(|f| f.eq_ignore_ascii_case(ext,),),
            None => ext.eq_ignore_ascii_case("xml",),
        }
    }
}

/// Summarizes every matching file under `directory_path`, in file-name order.
/// Files that cannot be read or parsed are logged and skipped.
pub fn summarize_directory(
    directory_path: &Path,
    options: &DirectoryOptions,
) -> Result<Vec<(PathBuf, Summary,),>, DumpReaderError,> {
    let mut results: Vec<(PathBuf, Summary,),> = Vec::new();

    let walker = if options.recursive {
        WalkDir::new(directory_path,)
    } else {
        WalkDir::new(directory_path,).max_depth(1,)
    };

    for entry in walker.sort_by_file_name() {
        let entry = entry.map_err(|e| {
            DumpReaderError::InternalError(format!("Error walking directory: {}", e),)
        },)?;
        let path = entry.path();

        if !path.is_file() {
            continue;
        }

        if path
            .file_name()
            .is_some_and(|name| name.to_string_lossy().starts_with('.',),)
        {
            continue;
        }

        if !options.accepts(path,) {
            continue;
        }

        match summarize_file(path,) {
            Ok(summary,) => results.push((path.to_path_buf(), summary,),),
            Err(e,) => {
                error!("Error summarizing file {}: {}", path.display(), e);
            },
        }
    }

    Ok(results,)
}

/// Timeouts, size limit and retry schedule for remote dumps.
#[derive(Debug, Clone, Copy, PartialEq,)]
pub struct FetchPolicy {
    /// Per-attempt timeout.
    pub timeout:     Duration,
    pub max_bytes:   u64,
    pub max_retries: u32,
    pub base_delay:  Duration,
    pub max_delay:   Duration,
    /// Wall-clock limit across all attempts and retry delays.
    pub budget:      Option<Duration,>,
}

impl Default for FetchPolicy {
    fn default() -> Self {
        Self {
            timeout:     Duration::from_secs(20,),
            max_bytes:   50 * 1024 * 1024,
            max_retries: 2,
            base_delay:  Duration::from_millis(200,),
            max_delay:   Duration::from_secs(5,),
            budget:      None,
        }
    }
}

impl FetchPolicy {
    /// Delay before retry `attempt` (1-based): base * 2^(attempt-1), capped.
    pub fn delay_for(&self, attempt: u32,) -> Duration {
        if attempt == 0 {
            return Duration::ZERO;
        }
        let factor = 2u32.saturating_pow(attempt - 1,);
        self.base_delay.saturating_mul(factor,).min(self.max_delay,)
    }
}

struct FetchFailure {
    retryable: bool,
    reason:    String,
}

/// HTTP(S) client for UI dumps. Cheap to clone; clones share a pool.
#[derive(Debug, Clone,)]
pub struct DocumentFetcher {
    client: Client,
    policy: FetchPolicy,
}

impl DocumentFetcher {
    pub fn new(policy: FetchPolicy,) -> Result<Self, DumpReaderError,> {
        let client = Client::builder()
            .timeout(policy.timeout,)
            .user_agent(concat!("uidump-reader/", env!("CARGO_PKG_VERSION")),)
            .build()
            .map_err(|e| {
                DumpReaderError::InternalError(format!("Failed to create HTTP client: {}", e),)
            },)?;
        Ok(Self {
            client,
            policy,
        },)
    }

    pub fn policy(&self,) -> &FetchPolicy {
        &self.policy
    }

    /// Fetches `url` and decodes the body to text. Connection failures,
    /// timeouts and 5xx responses are retried per the policy, within the
    /// policy's overall budget.
    pub async fn fetch(&self, url: &str,) -> Result<String, DumpReaderError,> {
        let deadline = self.policy.budget.map(|budget| (Instant::now() + budget, budget,),);
        let failed = |reason: String| DumpReaderError::FetchError {
            url: url.to_string(),
            reason,
        };

        let mut attempt = 0;
        loop {
            let outcome = match deadline {
                Some((deadline, budget,),) => {
                    match timeout_at(deadline, self.fetch_once(url,),).await {
                        Ok(outcome,) => outcome,
                        Err(_elapsed,) => {
                            return Err(failed(format!(
                                "gave up after {:?} ({} attempt(s))",
                                budget,
                                attempt + 1
                            ),),);
                        },
                    }
                },
                None => self.fetch_once(url,).await,
            };

            match outcome {
                Ok(text,) => return Ok(text,),
                Err(failure,) if failure.retryable && attempt < self.policy.max_retries => {
                    attempt += 1;
                    let delay = self.policy.delay_for(attempt,);
                    if deadline.is_some_and(|(deadline, _,)| Instant::now() + delay >= deadline,) {
                        return Err(failed(failure.reason,),);
                    }
                    warn!(
                        url,
                        attempt,
                        delay_ms = delay.as_millis() as u64,
                        "fetch failed, retrying: {}",
                        failure.reason
                    );
                    tokio::time::sleep(delay,).await;
                },
                Err(failure,) => return Err(failed(failure.reason,),),
            }
        }
    }

    async fn fetch_once(&self, url: &str,) -> Result<String, FetchFailure,> {
        let mut response = self.client.get(url,).send().await.map_err(|e| FetchFailure {
            retryable: e.is_timeout() || e.is_connect(),
            reason:    e.to_string(),
        },)?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchFailure {
                retryable: status.is_server_error(),
                reason:    format!("Failed to fetch XML from url (HTTP {})", status),
            },);
        }

        let max_bytes = self.policy.max_bytes;
        let too_large = || FetchFailure {
            retryable: false,
            reason:    format!("XML document exceeds {} bytes", max_bytes),
        };
        if let Some(len,) = response.content_length()
            && len > max_bytes
        {
            return Err(too_large(),);
        }

        let mut body: Vec<u8,> = Vec::new();
        while let Some(chunk,) = response.chunk().await.map_err(|e| FetchFailure {
            retryable: e.is_timeout(),
            reason:    e.to_string(),
        },)? {
            if (body.len() + chunk.len()) as u64 > max_bytes {
                return Err(too_large(),);
            }
            body.extend_from_slice(&chunk,);
        }
        debug!(url, bytes = body.len(), "fetched XML document");

        Ok(decode_to_string(&body,),)
    }
}
