use chrono::{DateTime, Utc};
use serde::Deserialize;
use url::Url;

use super::{expect_created, expect_found, PasteService, ServiceConfig, ServiceKind, TEXT};
use crate::error::Error;
use crate::models::SourcebinPaste;
use crate::request::{DeferredRequest, RawResponse, Transport};

pub const DEFAULT_BASE_URL: &str = "https://sourceb.in/";

#[derive(Deserialize)]
struct Created {
    key: String,
}

#[derive(Deserialize)]
struct Bin {
    key: String,
    code: String,
    created: String,
    /// Owner of the bin, absent for anonymous bins.
    id: Option<String>,
}

#[derive(Clone)]
pub struct SourcebinService {
    config: ServiceConfig,
    transport: Transport,
}

impl SourcebinService {
    pub fn new() -> crate::Result<Self> {
        Ok(Self::with_config(
            ServiceConfig::new(DEFAULT_BASE_URL)?,
            Transport::new()?,
        ))
    }

    pub fn with_config(config: ServiceConfig, transport: Transport) -> Self {
        SourcebinService { config, transport }
    }

    pub fn create_paste(&self, code: &str) -> DeferredRequest<String> {
        let request = self.config.post(&["api", "bin"], TEXT, code.to_owned());
        DeferredRequest::new(request, self.transport.clone(), |raw| {
            expect_created(&raw)?;
            Ok(raw.json::<Created>()?.key)
        })
    }

    pub fn retrieve_paste(&self, id: &str) -> DeferredRequest<SourcebinPaste> {
        let request = self.config.get(&["api", "bin", id]);
        let id = id.to_owned();
        let config = self.config.clone();
        DeferredRequest::new(request, self.transport.clone(), move |raw| {
            parse_paste(&config, &raw, &id)
        })
    }
}

impl PasteService for SourcebinService {
    type Paste = SourcebinPaste;

    fn kind(&self) -> ServiceKind {
        ServiceKind::Sourcebin
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

    fn retrieve(&self, id: &str) -> DeferredRequest<SourcebinPaste> {
        self.retrieve_paste(id)
    }
}

fn parse_paste(
    config: &ServiceConfig,
    raw: &RawResponse,
    id: &str,
) -> crate::Result<SourcebinPaste> {
    expect_found(raw, id)?;
    let bin: Bin = raw.json()?;
    let created_at = parse_iso8601(&bin.created)?;
    let url = config.endpoint(&[bin.key.as_str()]).to_string();
    Ok(SourcebinPaste::new(
        bin.key,
        bin.code,
        url,
        created_at,
        bin.id.unwrap_or_default(),
    ))
}

/// ISO-8601 date-time with an offset; seconds are optional and a trailing
/// `[region]` is ignored.
fn parse_iso8601(value: &str) -> crate::Result<DateTime<Utc>> {
    let time = match value.find('[') {
        Some(at) if value.ends_with(']') => &value[..at],
        _ => value,
    };
    DateTime::parse_from_rfc3339(time)
        .or_else(|_| DateTime::parse_from_str(time, "%Y-%m-%dT%H:%M%#z"))
        .map(|time| time.with_timezone(&Utc))
        .map_err(|source| Error::Timestamp {
            value: value.to_owned(),
            source,
        })
}
