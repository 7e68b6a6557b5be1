//! Paste services and what they have in common.

use std::fmt;
use std::str::FromStr;

use reqwest::header::{HeaderValue, USER_AGENT};
use reqwest::StatusCode;
use tracing::warn;
use url::Url;
use urlencoding::encode;

use crate::error::{Error, Result};
use crate::models::{Paste, PasteInfo};
use crate::request::{DeferredRequest, PreparedRequest, RawResponse};

pub mod ghostbin;
pub mod haste;
pub mod ivanbin;
pub mod sourcebin;

pub use ghostbin::GhostbinService;
pub use haste::HasteService;
pub use ivanbin::IvanBinService;
pub use sourcebin::SourcebinService;

/// Sent with every request so that services treat us like a browser.
pub const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (X11; Ubuntu; Linux x86_64; rv:15.0) Gecko/20100101 Firefox/15.0.1";

pub(crate) const TEXT: &str = "text/plain";
pub(crate) const FORM: &str = "application/x-www-form-urlencoded";

/// Where a service lives and how we introduce ourselves to it.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    base_url: Url,
    user_agent: HeaderValue,
}

impl ServiceConfig {
    /// The base URL always ends up with a trailing slash.
    pub fn new(base_url: &str) -> Result<Self> {
        let invalid = |source| Error::InvalidBaseUrl {
            url: base_url.to_owned(),
            source,
        };

        let mut url = Url::parse(base_url).map_err(invalid)?;
        if url.cannot_be_a_base() {
            return Err(invalid(url::ParseError::RelativeUrlWithCannotBeABaseBase));
        }
        if !url.path().ends_with('/') {
            let path = format!("{}/", url.path());
            url.set_path(&path);
        }

        Ok(ServiceConfig {
            base_url: url,
            user_agent: HeaderValue::from_static(DEFAULT_USER_AGENT),
        })
    }

    pub fn with_user_agent(mut self, user_agent: &str) -> Result<Self> {
        self.user_agent = HeaderValue::from_str(user_agent)?;
        Ok(self)
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn user_agent(&self) -> &HeaderValue {
        &self.user_agent
    }

    /// The base URL extended by `segments`, each percent-encoded on its own.
    pub fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        // cannot-be-a-base URLs are rejected in `new`
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    pub(crate) fn get(&self, segments: &[&str]) -> PreparedRequest {
        PreparedRequest::get(self.endpoint(segments))
            .header(USER_AGENT, self.user_agent.clone())
    }

    pub(crate) fn post(
        &self,
        segments: &[&str],
        content_type: &'static str,
        body: impl Into<bytes::Bytes>,
    ) -> PreparedRequest {
        PreparedRequest::post(self.endpoint(segments), content_type, body)
            .header(USER_AGENT, self.user_agent.clone())
    }
}

/// The operations every paste service offers.
pub trait PasteService {
    type Paste: PasteInfo + Into<Paste> + Send + 'static;

    fn kind(&self) -> ServiceKind;

    fn config(&self) -> &ServiceConfig;

    /// Where a browser can view the paste with this id.
    fn paste_url(&self, id: &str) -> Url;

    /// Upload `content`, yielding the id of the new paste.
    fn create(&self, content: &str) -> DeferredRequest<String>;

    /// Download the paste with this id.
    fn retrieve(&self, id: &str) -> DeferredRequest<Self::Paste>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ServiceKind {
    Haste,
    Ghostbin,
    IvanBin,
    Sourcebin,
}

impl ServiceKind {
    pub const ALL: [ServiceKind; 4] = [
        ServiceKind::Haste,
        ServiceKind::Ghostbin,
        ServiceKind::IvanBin,
        ServiceKind::Sourcebin,
    ];

    pub fn name(self) -> &'static str {
        match self {
            ServiceKind::Haste => "haste",
            ServiceKind::Ghostbin => "ghostbin",
            ServiceKind::IvanBin => "ivanbin",
            ServiceKind::Sourcebin => "sourcebin",
        }
    }

    pub fn default_base_url(self) -> &'static str {
        match self {
            ServiceKind::Haste => haste::DEFAULT_BASE_URL,
            ServiceKind::Ghostbin => ghostbin::DEFAULT_BASE_URL,
            ServiceKind::IvanBin => ivanbin::DEFAULT_BASE_URL,
            ServiceKind::Sourcebin => sourcebin::DEFAULT_BASE_URL,
        }
    }
}

impl fmt::Display for ServiceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ServiceKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        ServiceKind::ALL
            .into_iter()
            .find(|kind| kind.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| Error::UnknownService { name: s.to_owned() })
    }
}

#[derive(Clone)]
pub enum AnyService {
    Haste(HasteService),
    Ghostbin(GhostbinService),
    IvanBin(IvanBinService),
    Sourcebin(SourcebinService),
}

impl PasteService for AnyService {
    type Paste = Paste;

    fn kind(&self) -> ServiceKind {
        match self {
            AnyService::Haste(service) => service.kind(),
            AnyService::Ghostbin(service) => service.kind(),
            AnyService::IvanBin(service) => service.kind(),
            AnyService::Sourcebin(service) => service.kind(),
        }
    }

    fn config(&self) -> &ServiceConfig {
        match self {
            AnyService::Haste(service) => service.config(),
            AnyService::Ghostbin(service) => service.config(),
            AnyService::IvanBin(service) => service.config(),
            AnyService::Sourcebin(service) => service.config(),
        }
    }

    fn paste_url(&self, id: &str) -> Url {
        match self {
            AnyService::Haste(service) => service.paste_url(id),
            AnyService::Ghostbin(service) => service.paste_url(id),
            AnyService::IvanBin(service) => service.paste_url(id),
            AnyService::Sourcebin(service) => service.paste_url(id),
        }
    }

    fn create(&self, content: &str) -> DeferredRequest<String> {
        match self {
            AnyService::Haste(service) => service.create(content),
            AnyService::Ghostbin(service) => service.create(content),
            AnyService::IvanBin(service) => service.create(content),
            AnyService::Sourcebin(service) => service.create(content),
        }
    }

    fn retrieve(&self, id: &str) -> DeferredRequest<Paste> {
        match self {
            AnyService::Haste(service) => service.retrieve(id).map(Paste::from),
            AnyService::Ghostbin(service) => service.retrieve(id).map(Paste::from),
            AnyService::IvanBin(service) => service.retrieve(id).map(Paste::from),
            AnyService::Sourcebin(service) => service.retrieve(id).map(Paste::from),
        }
    }
}

impl From<HasteService> for AnyService {
    fn from(value: HasteService) -> Self {
        AnyService::Haste(value)
    }
}

impl From<GhostbinService> for AnyService {
    fn from(value: GhostbinService) -> Self {
        AnyService::Ghostbin(value)
    }
}

impl From<IvanBinService> for AnyService {
    fn from(value: IvanBinService) -> Self {
        AnyService::IvanBin(value)
    }
}

impl From<SourcebinService> for AnyService {
    fn from(value: SourcebinService) -> Self {
        AnyService::Sourcebin(value)
    }
}

/// Percent-encodes each key and value as UTF-8 and joins the pairs with `&`.
pub fn encode_form(fields: &[(&str, &str)]) -> String {
    fields
        .iter()
        .map(|(key, value)| format!("{}={}", encode(key), encode(value)))
        .collect::<Vec<_>>()
        .join("&")
}

/// Status check for retrievals: `404` means the id does not exist.
pub(crate) fn expect_found(raw: &RawResponse, id: &str) -> Result<()> {
    match raw.status() {
        StatusCode::OK => Ok(()),
        StatusCode::NOT_FOUND => Err(Error::NotFound { id: id.to_owned() }),
        status => Err(unexpected_status(raw, status)),
    }
}

pub(crate) fn expect_created(raw: &RawResponse) -> Result<()> {
    let status = raw.status();
    if status.is_success() {
        Ok(())
    } else {
        Err(unexpected_status(raw, status))
    }
}

fn unexpected_status(raw: &RawResponse, status: StatusCode) -> Error {
    warn!("unexpected response: url='{url}', status={status}", url = raw.url());
    Error::UnexpectedStatus { status }
}
