use crate::client::ApiClient;
use crate::error::ApiResult;
use crate::model::{AuthStart, Integration};

#[derive(Debug, Clone)]
pub struct IntegrationsService {
    client: ApiClient,
}

impl IntegrationsService {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    pub async fn list(&self, limit: Option<u32>) -> ApiResult<Vec<Integration>> {
        let params: Vec<(&str, String)> = limit
            .filter(|value| *value > 0)
            .map(|value| vec![("limit", value.to_string())])
            .unwrap_or_default();
        self.client.get_json("/integrations", &params).await
    }

    /// Begins the provider's OAuth flow; the caller opens the returned redirect url.
    pub async fn start_authentication(&self, provider: &str) -> ApiResult<AuthStart> {
        let provider = provider.trim().to_ascii_lowercase();
        self.client
            .get_json(&format!("/auth/{provider}/start"), &[])
            .await
    }
}

/// A provider the user can connect, independent of whether it is connected yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Provider {
    pub name: &'static str,
    pub description: &'static str,
}

pub const PROVIDERS: &[Provider] = &[
    Provider {
        name: "Gmail",
        description: "Connect your email",
    },
    Provider {
        name: "WhatsApp",
        description: "Personal & business chats",
    },
    Provider {
        name: "Slack",
        description: "Team communication",
    },
    Provider {
        name: "Discord",
        description: "Community servers",
    },
    Provider {
        name: "Teams",
        description: "Microsoft Teams",
    },
    Provider {
        name: "Telegram",
        description: "Secure messaging",
    },
    Provider {
        name: "SMS",
        description: "Text messages",
    },
    Provider {
        name: "Messenger",
        description: "Facebook Messenger",
    },
];

pub struct IntegrationCatalog;

impl IntegrationCatalog {
    pub fn providers() -> &'static [Provider] {
        PROVIDERS
    }

    pub fn find(name: &str) -> Option<&'static Provider> {
        PROVIDERS
            .iter()
            .find(|provider| provider.name.eq_ignore_ascii_case(name.trim()))
    }

    pub fn is_connected(provider: &str, connected: &[Integration]) -> bool {
        connected
            .iter()
            .any(|integration| integration.provider.eq_ignore_ascii_case(provider))
    }
}
