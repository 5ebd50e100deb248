use anyhow::Result;
use reqwest::{Client, RequestBuilder, Response};
use std::time::Duration;
use uuid::Uuid;

use super::types::*;
use crate::models::{
    ConfigGroupCreationPayload, DeviceTemplate, FeatureProfileCreationPayload, FeatureTemplateInformation, Parcel,
    ParcelType, PolicyDefinition, PolicyInfo, PolicyList, ProfileType, TemplateInformation,
};

/// SD-WAN Manager API client with an authenticated session
pub struct ManagerClient {
    base_url: String,
    session_cookie: String,
    xsrf_token: String,
    client: Client,
}

/// Path of a parcel nested under a VPN parcel:
/// "lan/vpn/interface/ethernet" -> "lan/vpn/{vpn_id}/interface/ethernet"
pub fn vpn_sub_parcel_path(parcel_type: ParcelType, vpn_id: Uuid) -> Option<String> {
    let (prefix, rest) = parcel_type.as_str().split_once("/vpn/")?;
    Some(format!("{}/vpn/{}/{}", prefix, vpn_id, rest))
}

fn feature_profile_path(profile_type: ProfileType) -> String {
    format!("/v1/feature-profile/sdwan/{}", profile_type)
}

async fn check_status(resp: Response) -> Result<Response> {
    if !resp.status().is_success() {
        let status = resp.status();
        let body = resp.text().await.unwrap_or_default();
        return Err(anyhow::anyhow!("Manager API error {}: {}", status, body));
    }
    Ok(resp)
}

impl ManagerClient {
    /// Log in with form credentials and fetch the XSRF token for the session
    pub async fn login(url: &str, username: &str, password: &str, timeout_secs: u64) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| anyhow::anyhow!("Failed to build HTTP client: {}", e))?;
        let base_url = url.trim_end_matches('/').to_string();

        let resp = client
            .post(format!("{}/j_security_check", base_url))
            .form(&[("j_username", username), ("j_password", password)])
            .send()
            .await?;

        let session_cookie = resp
            .headers()
            .get_all(reqwest::header::SET_COOKIE)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .filter_map(|v| v.split(';').next())
            .find(|v| v.starts_with("JSESSIONID="))
            .map(str::to_string);
        let body = resp.text().await.unwrap_or_default();

        let session_cookie = match session_cookie {
            Some(cookie) if !body.contains("<html") => cookie,
            _ => return Err(anyhow::anyhow!("Login to {} failed for user {}", base_url, username)),
        };

        let resp = client
            .get(format!("{}/dataservice/client/token", base_url))
            .header("Cookie", &session_cookie)
            .send()
            .await?;
        let xsrf_token = check_status(resp).await?.text().await?;

        tracing::info!("Logged in to {} as {}", base_url, username);
        Ok(Self {
            base_url,
            session_cookie,
            xsrf_token,
            client,
        })
    }

    fn api_url(&self, path: &str) -> String {
        format!("{}/dataservice{}", self.base_url, path)
    }

    fn authorized(&self, builder: RequestBuilder) -> RequestBuilder {
        builder
            .header("Cookie", &self.session_cookie)
            .header("X-XSRF-TOKEN", &self.xsrf_token)
            .header("Accept", "application/json")
    }

    /// Helper to GET a plain JSON document
    async fn get_json<T: serde::de::DeserializeOwned>(&self, endpoint: &str) -> Result<T> {
        let resp = self.authorized(self.client.get(self.api_url(endpoint))).send().await?;
        Ok(check_status(resp).await?.json().await?)
    }

    /// Helper to GET the `data` member of an enveloped response
    async fn get_data<T: serde::de::DeserializeOwned>(&self, endpoint: &str) -> Result<T> {
        let envelope: DataEnvelope<T> = self.get_json(endpoint).await?;
        Ok(envelope.data)
    }

    /// Helper to create a resource via POST
    async fn create_resource<B: serde::Serialize + ?Sized>(&self, endpoint: &str, body: &B) -> Result<Uuid> {
        let resp = self
            .authorized(self.client.post(self.api_url(endpoint)))
            .json(body)
            .send()
            .await?;
        let created: CreatedId = check_status(resp).await?.json().await?;
        Ok(created.id)
    }

    async fn delete_resource(&self, endpoint: &str) -> Result<()> {
        let resp = self.authorized(self.client.delete(self.api_url(endpoint))).send().await?;
        check_status(resp).await?;
        Ok(())
    }

    /// Close the session on the server side
    pub async fn logout(&self) -> Result<()> {
        let resp = self
            .authorized(self.client.post(format!("{}/logout", self.base_url)))
            .send()
            .await?;
        if !resp.status().is_success() && !resp.status().is_redirection() {
            tracing::warn!("Logout returned {}", resp.status());
        }
        Ok(())
    }

    // --- Server ---

    pub async fn server_info(&self) -> Result<ServerInfo> {
        self.get_data("/client/server").await
    }

    // --- Templates ---

    pub async fn list_feature_templates(&self) -> Result<Vec<FeatureTemplateInformation>> {
        self.get_data("/template/feature?summary=false").await
    }

    pub async fn list_device_templates(&self) -> Result<Vec<TemplateInformation>> {
        self.get_data("/template/device").await
    }

    pub async fn get_device_template(&self, id: Uuid) -> Result<DeviceTemplate> {
        self.get_json(&format!("/template/device/object/{}", id)).await
    }

    // --- Policies ---

    pub async fn list_policy_lists(&self, list_type: &str) -> Result<Vec<PolicyList>> {
        self.get_data(&format!("/template/policy/list/{}", list_type.to_lowercase()))
            .await
    }

    pub async fn list_policy_definitions(&self, definition_type: &str) -> Result<Vec<PolicyDefinition>> {
        self.get_data(&format!("/template/policy/definition/{}", definition_type.to_lowercase()))
            .await
    }

    pub async fn get_policy_definition(&self, definition_type: &str, id: Uuid) -> Result<PolicyDefinition> {
        self.get_json(&format!("/template/policy/definition/{}/{}", definition_type.to_lowercase(), id))
            .await
    }

    pub async fn list_policies(&self, kind: PolicyKind) -> Result<Vec<PolicyInfo>> {
        self.get_data(kind.endpoint()).await
    }

    // --- Feature profiles and parcels ---

    pub async fn create_feature_profile(
        &self,
        profile_type: ProfileType,
        payload: &FeatureProfileCreationPayload,
    ) -> Result<Uuid> {
        self.create_resource(&feature_profile_path(profile_type), payload).await
    }

    pub async fn delete_feature_profile(&self, profile_type: ProfileType, id: Uuid) -> Result<()> {
        self.delete_resource(&format!("{}/{}", feature_profile_path(profile_type), id))
            .await
    }

    pub async fn create_parcel(&self, profile_type: ProfileType, profile_id: Uuid, parcel: &Parcel) -> Result<Uuid> {
        let endpoint = format!(
            "{}/{}/{}",
            feature_profile_path(profile_type),
            profile_id,
            parcel.parcel_type()
        );
        self.create_resource(&endpoint, &parcel.payload()).await
    }

    pub async fn create_vpn_sub_parcel(
        &self,
        profile_type: ProfileType,
        profile_id: Uuid,
        vpn_id: Uuid,
        parcel: &Parcel,
    ) -> Result<Uuid> {
        let sub_path = vpn_sub_parcel_path(parcel.parcel_type(), vpn_id)
            .ok_or_else(|| anyhow::anyhow!("{} parcels cannot be nested under a VPN", parcel.parcel_type()))?;
        let endpoint = format!("{}/{}/{}", feature_profile_path(profile_type), profile_id, sub_path);
        self.create_resource(&endpoint, &parcel.payload()).await
    }

    // --- Config groups ---

    pub async fn create_config_group(&self, payload: &ConfigGroupCreationPayload) -> Result<Uuid> {
        self.create_resource("/v1/config-group", payload).await
    }

    pub async fn delete_config_group(&self, id: Uuid) -> Result<()> {
        self.delete_resource(&format!("/v1/config-group/{}", id)).await
    }
}
