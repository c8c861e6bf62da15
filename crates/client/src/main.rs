//! `artwatch` -- terminal job-status watcher.
//!
//! Connects to the image server's job-status socket, subscribes to one job,
//! and prints status updates, an elapsed-time counter while the job runs,
//! and the result image URL once it finishes.
//!
//! # Environment variables
//!
//! | Variable           | Required | Default                    | Description                              |
//! |--------------------|----------|----------------------------|------------------------------------------|
//! | `PAGE_ORIGIN`      | yes      | --                         | Server origin, e.g. `http://host:8080`   |
//! | `JOB_ID`           | yes      | --                         | Identifier of the job to watch           |
//! | `JOB_ARCHIVED`     | no       | `false`                    | Job already finalized; do not subscribe  |
//! | `IMAGE_URL`        | no       | `/image/sd/<JOB_ID>.png`   | Result image, relative to the origin     |
//! | `JOB_RUNNING_SECS` | no       | `0`                        | Seconds the job has already been running |

use artwatch_client::config::WatchConfig;
use artwatch_client::session;
use artwatch_client::view::TerminalView;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main(flavor = "current_thread")]
async fn main() {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "artwatch_client=info,artwatch_core=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = WatchConfig::from_env().unwrap_or_else(|e| {
        tracing::error!(error = %e, "Invalid configuration");
        std::process::exit(1);
    });

    let socket = config.socket().unwrap_or_else(|e| {
        tracing::error!(error = %e, "Invalid socket endpoint");
        std::process::exit(1);
    });

    tracing::info!(
        job_id = %config.host.job_id,
        archived = config.host.archived,
        url = %socket.url(),
        "Starting artwatch",
    );

    match session::run(socket, &config.host, TerminalView::stdout()).await {
        Ok(state) => {
            tracing::info!(?state, "Watch complete");
        }
        Err(e) => {
            tracing::error!(error = %e, "Watch ended early");
            std::process::exit(1);
        }
    }
}
