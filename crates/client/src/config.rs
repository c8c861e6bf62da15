//! Environment-driven configuration for the `artwatch` binary.
//!
//! The hosting page's contract (job identifier, archived flag, image
//! location) arrives through environment variables, optionally seeded from a
//! `.env` file by the caller.

use url::Url;

use artwatch_core::endpoint;
use artwatch_core::{CoreError, HostContext};

use crate::socket::{JobSocket, SocketError};

pub const ENV_PAGE_ORIGIN: &str = "PAGE_ORIGIN";
pub const ENV_JOB_ID: &str = "JOB_ID";
pub const ENV_JOB_ARCHIVED: &str = "JOB_ARCHIVED";
pub const ENV_IMAGE_URL: &str = "IMAGE_URL";
pub const ENV_JOB_RUNNING_SECS: &str = "JOB_RUNNING_SECS";

/// Resolved settings for one watch session.
#[derive(Debug, Clone)]
pub struct WatchConfig {
    /// Origin of the hosting page, e.g. `http://localhost:8080`.
    pub origin: Url,
    /// Job details with the image location resolved to an absolute URL.
    pub host: HostContext,
}

impl WatchConfig {
    /// Load from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load using `lookup` to read variables.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let origin_raw = required(&lookup, ENV_PAGE_ORIGIN)?;
        let origin = endpoint::parse_origin(&origin_raw)?;
        // Fail early rather than at connect time.
        endpoint::socket_scheme(origin.scheme())?;

        let job_id = required(&lookup, ENV_JOB_ID)?;

        let archived = match lookup(ENV_JOB_ARCHIVED) {
            Some(value) => parse_flag(ENV_JOB_ARCHIVED, &value)?,
            None => false,
        };

        let initial_elapsed_secs = match lookup(ENV_JOB_RUNNING_SECS) {
            Some(value) => value.trim().parse::<u64>().map_err(|_| ConfigError::InvalidNumber {
                var: ENV_JOB_RUNNING_SECS,
                value,
            })?,
            None => 0,
        };

        let image_location = lookup(ENV_IMAGE_URL)
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| endpoint::default_image_path(&job_id));
        let image_url = endpoint::resolve_image_url(&origin, &image_location)?;

        let host = HostContext::new(job_id)
            .with_archived(archived)
            .with_image_url(image_url.to_string())
            .with_initial_elapsed_secs(initial_elapsed_secs);

        if !host.job_id_is_uuid() {
            tracing::warn!(
                job_id = %host.job_id,
                "Job id is not a UUID; the server will not acknowledge the subscription",
            );
        }

        Ok(Self { origin, host })
    }

    /// Socket endpoint for the configured origin.
    pub fn socket(&self) -> Result<JobSocket, SocketError> {
        JobSocket::for_origin(&self.origin)
    }
}

fn required<F>(lookup: &F, var: &'static str) -> Result<String, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(var)
        .filter(|v| !v.trim().is_empty())
        .ok_or(ConfigError::Missing(var))
}

fn parse_flag(var: &'static str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "" | "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidFlag {
            var,
            value: value.to_string(),
        }),
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} environment variable is required")]
    Missing(&'static str),

    #[error("{var} must be a boolean, got {value:?}")]
    InvalidFlag { var: &'static str, value: String },

    #[error("{var} must be a non-negative integer, got {value:?}")]
    InvalidNumber { var: &'static str, value: String },

    #[error(transparent)]
    Core(#[from] CoreError),
}
