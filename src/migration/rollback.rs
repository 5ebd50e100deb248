use uuid::Uuid;

use crate::manager::ConfigWriter;
use crate::models::{FailedDeletion, RemovedItem, RollbackReport, UX2ConfigRollback};

/// UX2ConfigReverter deletes what a push created. Config groups go first since
/// they reference feature profiles; each list is walked newest first.
pub struct UX2ConfigReverter<'a> {
    writer: &'a dyn ConfigWriter,
}

impl<'a> UX2ConfigReverter<'a> {
    pub fn new(writer: &'a dyn ConfigWriter) -> Self {
        Self { writer }
    }

    /// Best effort: a failed deletion is recorded and the rest still run
    pub async fn rollback(&self, record: &UX2ConfigRollback) -> RollbackReport {
        let mut report = RollbackReport::default();
        tracing::info!(
            "Rolling back {} config groups and {} feature profiles",
            record.config_group_ids.len(),
            record.feature_profile_ids.len()
        );

        for id in record.config_group_ids.iter().rev() {
            let result = self.writer.delete_config_group(*id).await;
            Self::record(&mut report, *id, RemovedItem::ConfigGroup, result);
        }

        for (id, profile_type) in record.feature_profile_ids.iter().rev() {
            let result = self.writer.delete_feature_profile(*profile_type, *id).await;
            Self::record(&mut report, *id, RemovedItem::FeatureProfile(*profile_type), result);
        }

        if report.success() {
            tracing::info!("Rollback removed {} items", report.deleted.len());
        } else {
            tracing::warn!(
                "Rollback removed {} items, {} could not be deleted",
                report.deleted.len(),
                report.failed.len()
            );
        }
        report
    }

    fn record(report: &mut RollbackReport, id: Uuid, item: RemovedItem, result: anyhow::Result<()>) {
        match result {
            Ok(()) => report.deleted.push((id, item)),
            Err(e) => {
                tracing::error!("Failed to delete {:?} {}: {:#}", item, id, e);
                report.failed.push(FailedDeletion {
                    id,
                    item,
                    reason: format!("{:#}", e),
                });
            }
        }
    }
}
