use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use binclient::{
    AnyService, GhostbinService, HasteService, IvanBinService, ServiceConfig, ServiceKind,
    SourcebinService, Transport,
};
use directories_next::ProjectDirs;
use serde::Deserialize;
use tracing::debug;

/// Expiry used for ghostbin pastes when neither the config nor the command
/// line names one.
const DEFAULT_GHOSTBIN_EXPIRY: &str = "never";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub user_agent: Option<String>,
    pub haste: Server,
    pub ghostbin: Ghostbin,
    pub ivanbin: Server,
    pub sourcebin: Server,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Server {
    pub base_url: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Ghostbin {
    pub base_url: Option<String>,
    pub default_expiry: Option<String>,
}

impl Config {
    /// Load from `path`, or from the user's config directory when no path is
    /// given. Only an explicitly named file has to exist.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        let path = match path {
            Some(path) => path.to_owned(),
            None => match default_path() {
                Some(path) if path.exists() => path,
                _ => return Ok(Config::default()),
            },
        };

        debug!("loading config: path='{}'", path.display());
        let text = fs::read_to_string(&path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        toml::from_str(&text)
            .with_context(|| format!("failed to parse config file {}", path.display()))
    }

    fn base_url(&self, kind: ServiceKind) -> &str {
        let configured = match kind {
            ServiceKind::Haste => &self.haste.base_url,
            ServiceKind::Ghostbin => &self.ghostbin.base_url,
            ServiceKind::IvanBin => &self.ivanbin.base_url,
            ServiceKind::Sourcebin => &self.sourcebin.base_url,
        };
        configured.as_deref().unwrap_or(kind.default_base_url())
    }

    pub fn service(&self, kind: ServiceKind) -> anyhow::Result<AnyService> {
        let base_url = self.base_url(kind);
        let mut config = ServiceConfig::new(base_url)?;
        if let Some(user_agent) = &self.user_agent {
            config = config
                .with_user_agent(user_agent)
                .context("invalid user agent")?;
        }
        let transport = Transport::new()?;

        let service: AnyService = match kind {
            ServiceKind::Haste => HasteService::with_config(config, transport).into(),
            ServiceKind::Ghostbin => {
                let expiry = self
                    .ghostbin
                    .default_expiry
                    .as_deref()
                    .unwrap_or(DEFAULT_GHOSTBIN_EXPIRY);
                GhostbinService::with_config(config, transport, expiry).into()
            }
            ServiceKind::IvanBin => IvanBinService::with_config(config, transport).into(),
            ServiceKind::Sourcebin => SourcebinService::with_config(config, transport).into(),
        };
        Ok(service)
    }
}

fn default_path() -> Option<PathBuf> {
    ProjectDirs::from("", "", "binclient").map(|dirs| dirs.config_dir().join("config.toml"))
}
