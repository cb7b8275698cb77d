use crate::client::ApiClient;
use crate::error::ApiResult;
use crate::model::{ProfileUpdate, UserProfile};

#[derive(Debug, Clone)]
pub struct UserService {
    client: ApiClient,
}

impl UserService {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    pub async fn profile(&self) -> ApiResult<UserProfile> {
        self.client.get_json("/users/me", &[]).await
    }

    pub async fn update_profile(&self, update: &ProfileUpdate) -> ApiResult<()> {
        self.client.put("/users/me", update).await?;
        tracing::info!("profile updated");
        Ok(())
    }
}
