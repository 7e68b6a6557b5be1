//! Ghostbin servers take form posts and answer a successful create with a
//! redirect to the new paste; the id is read off the final URL.

use serde::Deserialize;
use url::Url;

use super::{
    encode_form, expect_created, expect_found, PasteService, ServiceConfig, ServiceKind, FORM,
};
use crate::error::Error;
use crate::models::{GhostbinPaste, Language};
use crate::request::{DeferredRequest, RawResponse, Transport};

pub const DEFAULT_BASE_URL: &str = "https://paste.menudocs.org/";

/// Language used by [`PasteService::create`], which takes no language.
pub const DEFAULT_LANGUAGE: &str = "text";

#[derive(Deserialize)]
struct RemotePaste {
    id: String,
    body: String,
    expiration: String,
    encrypted: bool,
    language: Language,
}

#[derive(Clone)]
pub struct GhostbinService {
    config: ServiceConfig,
    transport: Transport,
    default_expiry: String,
}

impl GhostbinService {
    pub fn new(default_expiry: impl Into<String>) -> crate::Result<Self> {
        Ok(Self::with_config(
            ServiceConfig::new(DEFAULT_BASE_URL)?,
            Transport::new()?,
            default_expiry,
        ))
    }

    pub fn with_config(
        config: ServiceConfig,
        transport: Transport,
        default_expiry: impl Into<String>,
    ) -> Self {
        GhostbinService {
            config,
            transport,
            default_expiry: default_expiry.into(),
        }
    }

    pub fn default_expiry(&self) -> &str {
        &self.default_expiry
    }

    pub fn create_paste(&self, code: &str, language: &str) -> DeferredRequest<String> {
        self.create_paste_with_expiry(code, language, &self.default_expiry)
    }

    pub fn create_paste_with_expiry(
        &self,
        code: &str,
        language: &str,
        expiry: &str,
    ) -> DeferredRequest<String> {
        let form = encode_form(&[("lang", language), ("text", code), ("expire", expiry)]);
        let request = self.config.post(&["paste", "new"], FORM, form);
        let config = self.config.clone();
        DeferredRequest::new(request, self.transport.clone(), move |raw| {
            expect_created(&raw)?;
            id_from_redirect(&config, raw.url())
        })
    }

    pub fn retrieve_paste(&self, id: &str) -> DeferredRequest<GhostbinPaste> {
        let document = format!("{id}.json");
        let request = self.config.get(&["paste", document.as_str()]);
        let id = id.to_owned();
        let config = self.config.clone();
        DeferredRequest::new(request, self.transport.clone(), move |raw| {
            parse_paste(&config, &raw, &id)
        })
    }
}

impl PasteService for GhostbinService {
    type Paste = GhostbinPaste;

    fn kind(&self) -> ServiceKind {
        ServiceKind::Ghostbin
    }

    fn config(&self) -> &ServiceConfig {
        &self.config
    }

    fn paste_url(&self, id: &str) -> Url {
        self.config.endpoint(&["paste", id])
    }

    fn create(&self, content: &str) -> DeferredRequest<String> {
        self.create_paste(content, DEFAULT_LANGUAGE)
    }

    fn retrieve(&self, id: &str) -> DeferredRequest<GhostbinPaste> {
        self.retrieve_paste(id)
    }
}

/// `{base}paste/{id}/` -> `{id}`
fn id_from_redirect(config: &ServiceConfig, url: &Url) -> crate::Result<String> {
    let prefix = config.endpoint(&["paste", ""]);
    let id = url
        .as_str()
        .strip_prefix(prefix.as_str())
        .map(|rest| rest.trim_end_matches('/'))
        .filter(|id| !id.is_empty() && *id != "new" && !id.contains(['/', '?', '#']));

    match id {
        Some(id) => Ok(id.to_owned()),
        None => Err(Error::Redirect {
            url: url.to_string(),
        }),
    }
}

fn parse_paste(
    config: &ServiceConfig,
    raw: &RawResponse,
    id: &str,
) -> crate::Result<GhostbinPaste> {
    expect_found(raw, id)?;
    let remote: RemotePaste = raw.json()?;
    let url = config.endpoint(&["paste", remote.id.as_str()]).to_string();
    Ok(GhostbinPaste::new(
        remote.id,
        remote.body,
        url,
        remote.language,
        remote.expiration,
        remote.encrypted,
    ))
}
