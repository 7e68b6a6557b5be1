use serde::Deserialize;
use url::Url;

use super::{expect_created, expect_found, PasteService, ServiceConfig, ServiceKind, TEXT};
use crate::models::HastePaste;
use crate::request::{DeferredRequest, RawResponse, Transport};

pub const DEFAULT_BASE_URL: &str = "https://hasteb.in/";

#[derive(Deserialize)]
struct Document {
    key: String,
}

/// A hastebin server.
#[derive(Clone)]
pub struct HasteService {
    config: ServiceConfig,
    transport: Transport,
}

impl HasteService {
    pub fn new() -> crate::Result<Self> {
        Ok(Self::with_config(
            ServiceConfig::new(DEFAULT_BASE_URL)?,
            Transport::new()?,
        ))
    }

    pub fn with_config(config: ServiceConfig, transport: Transport) -> Self {
        HasteService { config, transport }
    }

    pub fn create_paste(&self, code: &str) -> DeferredRequest<String> {
        let request = self.config.post(&["documents"], TEXT, code.to_owned());
        DeferredRequest::new(request, self.transport.clone(), parse_created)
    }

    pub fn retrieve_paste(&self, id: &str) -> DeferredRequest<HastePaste> {
        let request = self.config.get(&["raw", id]);
        let id = id.to_owned();
        let url = self.paste_url(&id);
        DeferredRequest::new(request, self.transport.clone(), move |raw| {
            parse_paste(&raw, &id, &url)
        })
    }
}

impl PasteService for HasteService {
    type Paste = HastePaste;

    fn kind(&self) -> ServiceKind {
        ServiceKind::Haste
    }

    fn config(&self) -> &ServiceConfig {
        &self.config
    }

    fn paste_url(&self, id: &str) -> Url {
        self.config.endpoint(&[id])
    }

    fn create(&self, content: &str) -> DeferredRequest<String> {
        self.create_paste(content)
    }

    fn retrieve(&self, id: &str) -> DeferredRequest<HastePaste> {
        self.retrieve_paste(id)
    }
}

fn parse_created(raw: RawResponse) -> crate::Result<String> {
    expect_created(&raw)?;
    Ok(raw.json::<Document>()?.key)
}

fn parse_paste(raw: &RawResponse, id: &str, url: &Url) -> crate::Result<HastePaste> {
    expect_found(raw, id)?;
    Ok(HastePaste::new(
        id.to_owned(),
        raw.text()?.to_owned(),
        url.to_string(),
    ))
}
