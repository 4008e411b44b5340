//! Retention Sweeper
//!
//! Periodically evicts finished tasks and idle sessions so memory stays
//! bounded. Sessions locked by an active task are never evicted.

use crate::{config::RetentionConfig, session::SessionStore, task::TaskRegistry};
use chrono::Duration as ChronoDuration;
use tokio::task::JoinHandle;
use tokio::time::{Duration, interval};
use tracing::{debug, info};

/// One eviction pass; returns `(sessions, tasks)` removed
pub async fn sweep(
    sessions: &SessionStore,
    tasks: &TaskRegistry,
    config: &RetentionConfig,
) -> (usize, usize) {
    let expired_tasks = tasks
        .evict_finished(ChronoDuration::seconds(config.task_retention_secs as i64))
        .await;
    let expired_sessions = sessions
        .evict_expired(ChronoDuration::seconds(config.session_ttl_secs as i64))
        .await;

    if expired_sessions > 0 || expired_tasks > 0 {
        info!(
            "Retention sweep evicted {} sessions and {} tasks",
            expired_sessions, expired_tasks
        );
    } else {
        debug!("Retention sweep found nothing to evict");
    }
    (expired_sessions, expired_tasks)
}

/// Start the background sweep loop
pub fn spawn_sweeper(
    sessions: SessionStore,
    tasks: TaskRegistry,
    config: RetentionConfig,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = interval(Duration::from_secs(config.sweep_interval_secs.max(1)));
        // First tick fires immediately; nothing can be stale yet
        ticker.tick().await;
        loop {
            ticker.tick().await;
            sweep(&sessions, &tasks, &config).await;
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        config::UploadConfig,
        testing::{RecordingMailer, ScriptedGrader, batch_config, capabilities, png, wait_for_terminal},
    };
    use std::sync::Arc;

    #[tokio::test]
    async fn sweep_respects_configured_ages() {
        let sessions = SessionStore::new(UploadConfig::default());
        let tasks = TaskRegistry::new(
            sessions.clone(),
            capabilities(Arc::new(ScriptedGrader::new()), Arc::new(RecordingMailer::default())),
            batch_config(),
        );
        let session_id = sessions.create_session(Some(png("prompt.png"))).await.unwrap();
        sessions.attach_essays(&session_id, vec![png("a.png")]).await.unwrap();
        let task_id = tasks.create_task(&session_id).await.unwrap();
        wait_for_terminal(&tasks, &task_id).await;

        let config = RetentionConfig::default();
        assert_eq!(sweep(&sessions, &tasks, &config).await, (0, 0));
        assert!(tasks.get_status(&task_id).await.is_ok());

        let immediate = RetentionConfig {
            session_ttl_secs: 0,
            task_retention_secs: 0,
            ..RetentionConfig::default()
        };
        // Give the finished run a moment to release its session
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(sweep(&sessions, &tasks, &immediate).await, (1, 1));
        assert_eq!(sessions.len().await, 0);
        assert!(tasks.list_tasks().await.is_empty());
    }
}
