use anyhow::Result;

use super::pusher::{Cancelled, PushAborted, UX2ConfigPusher};
use super::rollback::UX2ConfigReverter;
use super::transform::transform;
use crate::converters::SchemaRegistry;
use crate::manager::{ConfigReader, ConfigWriter, PolicyKind};
use crate::models::{
    DeviceTemplateWithInfo, RollbackReport, UX1Config, UX2Config, UX2ConfigRollback,
};

/// Policy list types fetched during collection
pub const POLICY_LIST_TYPES: &[&str] = &[
    "dataPrefix",
    "dataIpv6Prefix",
    "prefix",
    "ipv6prefix",
    "app",
    "color",
    "asPath",
    "class",
    "community",
    "expandedCommunity",
    "extCommunity",
    "mirror",
    "policer",
    "sla",
    "tloc",
    "preferredColorGroup",
    "fqdn",
    "geoLocation",
    "port",
    "protocolName",
    "localDomain",
    "urlWhiteList",
    "urlBlackList",
    "ipsSignature",
    "zone",
    "localApp",
];

/// Policy definition types fetched during collection
pub const POLICY_DEFINITION_TYPES: &[&str] = &["intrusionPrevention", "advancedMalwareProtection", "urlFiltering"];

const POLICY_KINDS: [PolicyKind; 3] = [PolicyKind::Centralized, PolicyKind::Localized, PolicyKind::Security];

/// Default progress callback: log and never cancel
pub fn log_progress(task: &str, current: usize, total: usize) -> Result<(), Cancelled> {
    tracing::info!("[{}/{}] {}", current, total, task);
    Ok(())
}

/// Gather the legacy configuration. Policy items are best effort per type;
/// failing to list feature or device templates is fatal.
pub async fn collect_ux1_config<F>(reader: &dyn ConfigReader, mut progress: F) -> Result<UX1Config>
where
    F: FnMut(&str, usize, usize) -> Result<(), Cancelled> + Send,
{
    let mut ux1 = UX1Config::default();
    let total = POLICY_LIST_TYPES.len() + POLICY_DEFINITION_TYPES.len() + POLICY_KINDS.len() + 2;
    let mut done = 0;

    for list_type in POLICY_LIST_TYPES {
        match reader.policy_lists(list_type).await {
            Ok(lists) => ux1.policies.policy_lists.extend(lists),
            Err(e) => tracing::warn!("Failed to collect {} policy lists: {:#}", list_type, e),
        }
        done += 1;
        progress(&format!("Collected {} policy lists", list_type), done, total)?;
    }

    for definition_type in POLICY_DEFINITION_TYPES {
        match reader.policy_definitions(definition_type).await {
            Ok(definitions) => ux1.policies.policy_definitions.extend(definitions),
            Err(e) => tracing::warn!("Failed to collect {} policy definitions: {:#}", definition_type, e),
        }
        done += 1;
        progress(&format!("Collected {} policy definitions", definition_type), done, total)?;
    }

    for kind in POLICY_KINDS {
        match reader.policies(kind).await {
            Ok(policies) => match kind {
                PolicyKind::Centralized => ux1.policies.centralized_policies = policies,
                PolicyKind::Localized => ux1.policies.localized_policies = policies,
                PolicyKind::Security => ux1.policies.security_policies = policies,
            },
            Err(e) => tracing::warn!("Failed to collect {:?} policies: {:#}", kind, e),
        }
        done += 1;
        progress(&format!("Collected {:?} policies", kind), done, total)?;
    }

    ux1.templates.feature_templates = reader.feature_templates().await?;
    done += 1;
    progress("Collected feature templates", done, total)?;

    for info in reader.device_template_infos().await? {
        if info.factory_default {
            continue;
        }
        match reader.device_template(info.id).await {
            Ok(template) => ux1
                .templates
                .device_templates
                .push(DeviceTemplateWithInfo::from_merged(template, &info)),
            Err(e) => tracing::warn!("Failed to collect device template '{}': {:#}", info.name, e),
        }
    }
    done += 1;
    progress("Collected device templates", done, total)?;

    tracing::info!(
        "Collected {} feature templates, {} device templates, {} policy lists, {} policy definitions",
        ux1.templates.feature_templates.len(),
        ux1.templates.device_templates.len(),
        ux1.policies.policy_lists.len(),
        ux1.policies.policy_definitions.len()
    );
    Ok(ux1)
}

/// Transform and report a single progress step
pub fn transform_ux1_config<F>(ux1: &UX1Config, registry: &SchemaRegistry, mut progress: F) -> Result<UX2Config, Cancelled>
where
    F: FnMut(&str, usize, usize) -> Result<(), Cancelled>,
{
    let ux2 = transform(ux1, registry);
    progress("Transformed UX1 configuration", 1, 1)?;
    Ok(ux2)
}

pub async fn push_ux2_config<F>(
    writer: &dyn ConfigWriter,
    ux2: UX2Config,
    progress: F,
) -> Result<UX2ConfigRollback, PushAborted>
where
    F: FnMut(&str, usize, usize) -> Result<(), Cancelled> + Send,
{
    UX2ConfigPusher::new(writer, ux2).push(progress).await
}

pub async fn rollback_ux2_config(writer: &dyn ConfigWriter, record: &UX2ConfigRollback) -> RollbackReport {
    UX2ConfigReverter::new(writer).rollback(record).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::migration::testing::{device_template, feature_template, FixtureReader, RecordingWriter};
    use crate::models::{GeneralTemplate, PolicyList};
    use serde_json::json;
    use uuid::Uuid;

    fn list(name: &str, list_type: &str, entry: serde_json::Value) -> PolicyList {
        serde_json::from_value(json!({
            "listId": Uuid::new_v4(),
            "name": name,
            "type": list_type,
            "entries": [entry]
        }))
        .unwrap()
    }

    fn fixture() -> FixtureReader {
        let banner = feature_template("banner", "cisco_banner", json!({
            "login": {"vipType": "constant", "vipValue": "hello", "vipObjectType": "object"}
        }));
        let dt = device_template("branch", vec![GeneralTemplate::new(banner.id, "cisco_banner")]);
        let mut factory = device_template("factory_default_cedge", Vec::new());
        factory.factory_default = true;

        let mut reader = FixtureReader::default();
        reader.ux1.templates.feature_templates = vec![banner];
        reader.ux1.templates.device_templates = vec![dt, factory];
        reader.ux1.policies.policy_lists = vec![
            list("colors", "color", json!({"color": "mpls"})),
            list("ports", "port", json!({"port": "443"})),
        ];
        reader
    }

    #[tokio::test]
    async fn test_collect_skips_factory_default_templates() {
        let reader = fixture();
        let ux1 = collect_ux1_config(&reader, log_progress).await.unwrap();

        assert_eq!(ux1.templates.feature_templates.len(), 1);
        assert_eq!(ux1.templates.device_templates.len(), 1);
        assert_eq!(ux1.templates.device_templates[0].template.template_name, "branch");
        assert_eq!(ux1.policies.policy_lists.len(), 2);
    }

    #[tokio::test]
    async fn test_failing_list_type_does_not_stop_collection() {
        let mut reader = fixture();
        reader.failing_list_types.insert("color".to_string());

        let mut steps = 0;
        let ux1 = collect_ux1_config(&reader, |_: &str, _: usize, _: usize| {
            steps += 1;
            Ok(())
        })
        .await
        .unwrap();

        assert_eq!(ux1.policies.policy_lists.len(), 1);
        assert_eq!(ux1.policies.policy_lists[0].name, "ports");
        assert_eq!(steps, POLICY_LIST_TYPES.len() + POLICY_DEFINITION_TYPES.len() + 5);
    }

    #[tokio::test]
    async fn test_collection_can_be_cancelled() {
        let reader = fixture();
        let result = collect_ux1_config(&reader, |_: &str, done: usize, _: usize| {
            if done == 1 {
                Err(Cancelled)
            } else {
                Ok(())
            }
        })
        .await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_collect_transform_push_and_rollback() {
        let reader = fixture();
        let writer = RecordingWriter::default();

        let ux1 = collect_ux1_config(&reader, log_progress).await.unwrap();
        let ux2 = transform_ux1_config(&ux1, &SchemaRegistry::default(), log_progress).unwrap();
        let record = push_ux2_config(&writer, ux2, log_progress).await.unwrap();

        // four device template profiles plus the policy object profile
        assert_eq!(record.feature_profile_ids.len(), 5);
        assert_eq!(record.config_group_ids.len(), 1);
        assert_eq!(record.report.success_rate_message, "3/3 (100%) parcels created successfully.");

        let report = rollback_ux2_config(&writer, &record).await;
        assert!(report.success());
        assert_eq!(report.deleted.len(), 6);
    }
}
