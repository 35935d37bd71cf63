//! Deployment configuration: base URL resolution and feature flags.

use pullstring_core::BuildType;
use std::sync::LazyLock;
use url::Url;

static PRODUCTION_BASE_URL: LazyLock<Url> = LazyLock::new(|| {
    Url::parse("https://conversation.pullstring.com/v1/")
        .expect("unreachable error: failed to parse production base URL")
});
static STAGING_BASE_URL: LazyLock<Url> = LazyLock::new(|| {
    Url::parse("https://conversation-staging.pullstring.com/v1/")
        .expect("unreachable error: failed to parse staging base URL")
});
static SANDBOX_BASE_URL: LazyLock<Url> = LazyLock::new(|| {
    Url::parse("https://conversation-sandbox.pullstring.com/v1/")
        .expect("unreachable error: failed to parse sandbox base URL")
});

/// Optional Web API capabilities a deployment may advertise.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Feature {
    /// Progressive (chunked) streaming of speech input. Not currently
    /// supported; all audio is batched and uploaded in one request.
    StreamingAsr,
}

/// Resolves the Web API endpoint for each build type.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    production: Url,
    staging: Url,
    sandbox: Url,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            production: PRODUCTION_BASE_URL.clone(),
            staging: STAGING_BASE_URL.clone(),
            sandbox: SANDBOX_BASE_URL.clone(),
        }
    }
}

impl ApiConfig {
    /// Point every build type at the same base URL. Useful for local
    /// servers and tests.
    pub fn with_base_url(base_url: Url) -> Self {
        Self { production: base_url.clone(), staging: base_url.clone(), sandbox: base_url }
    }

    pub fn base_url(&self, build_type: BuildType) -> &Url {
        match build_type {
            BuildType::Production => &self.production,
            BuildType::Staging => &self.staging,
            BuildType::Sandbox => &self.sandbox,
        }
    }

    pub fn has_feature(&self, feature: Feature) -> bool {
        match feature {
            Feature::StreamingAsr => false,
        }
    }
}
