use crate::store::Store;

pub async fn run(store: &Store, days_old: i64) {
    tracing::debug!(days_old, "data_retention: start");
    match store.purge_older_than(days_old) {
        Ok(summary) => tracing::info!(
            progress_removed = summary.progress_removed,
            engagement_removed = summary.engagement_removed,
            "data_retention: done"
        ),
        Err(e) => tracing::error!(error = %e, "data_retention failed"),
    }
}
