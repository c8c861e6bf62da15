//! Values the hosting page provides about the job being watched.

/// What the host knows about the job before the client starts.
///
/// Built with [`HostContext::new`] and the `with_*` builders.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostContext {
    /// Opaque identifier of the job, sent verbatim in the subscription.
    pub job_id: String,

    /// The job was finalized before the view loaded; no subscription is sent.
    pub archived: bool,

    /// Absolute location of the result image, once known.
    pub image_url: Option<String>,

    /// Seconds the job had already been running when the view loaded.
    pub initial_elapsed_secs: u64,
}

impl HostContext {
    pub fn new(job_id: impl Into<String>) -> Self {
        Self {
            job_id: job_id.into(),
            archived: false,
            image_url: None,
            initial_elapsed_secs: 0,
        }
    }

    pub fn with_archived(mut self, archived: bool) -> Self {
        self.archived = archived;
        self
    }

    pub fn with_image_url(mut self, url: impl Into<String>) -> Self {
        self.image_url = Some(url.into());
        self
    }

    pub fn with_initial_elapsed_secs(mut self, secs: u64) -> Self {
        self.initial_elapsed_secs = secs;
        self
    }

    /// Whether the identifier parses as a UUID.
    ///
    /// The server drops subscriptions whose identifier is not a UUID
    /// without replying.
    pub fn job_id_is_uuid(&self) -> bool {
        uuid::Uuid::parse_str(&self.job_id).is_ok()
    }
}
