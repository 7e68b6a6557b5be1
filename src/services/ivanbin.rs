use chrono::{DateTime, Utc};
use serde::Deserialize;
use url::Url;

use super::{expect_created, expect_found, PasteService, ServiceConfig, ServiceKind, TEXT};
use crate::error::Error;
use crate::models::IvanBinPaste;
use crate::request::{DeferredRequest, RawResponse, Transport};

pub const DEFAULT_BASE_URL: &str = "https://bin.mrivanplays.com/";

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Created {
    bin_id: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Info {
    bin_id: String,
    body: String,
    created_at: String,
    expires_at: String,
}

/// A server running the ivanbin software.
#[derive(Clone)]
pub struct IvanBinService {
    config: ServiceConfig,
    transport: Transport,
}

impl IvanBinService {
    pub fn new() -> crate::Result<Self> {
        Ok(Self::with_config(
            ServiceConfig::new(DEFAULT_BASE_URL)?,
            Transport::new()?,
        ))
    }

    pub fn with_config(config: ServiceConfig, transport: Transport) -> Self {
        IvanBinService { config, transport }
    }

    pub fn create_paste(&self, code: &str) -> DeferredRequest<String> {
        let request = self.config.post(&["api", "create"], TEXT, code.to_owned());
        DeferredRequest::new(request, self.transport.clone(), |raw| {
            expect_created(&raw)?;
            Ok(raw.json::<Created>()?.bin_id)
        })
    }

    pub fn retrieve_paste(&self, id: &str) -> DeferredRequest<IvanBinPaste> {
        let request = self.config.get(&["api", "info", id]);
        let id = id.to_owned();
        let config = self.config.clone();
        DeferredRequest::new(request, self.transport.clone(), move |raw| {
            parse_paste(&config, &raw, &id)
        })
    }
}

impl PasteService for IvanBinService {
    type Paste = IvanBinPaste;

    fn kind(&self) -> ServiceKind {
        ServiceKind::IvanBin
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

    fn retrieve(&self, id: &str) -> DeferredRequest<IvanBinPaste> {
        self.retrieve_paste(id)
    }
}

fn parse_paste(
    config: &ServiceConfig,
    raw: &RawResponse,
    id: &str,
) -> crate::Result<IvanBinPaste> {
    expect_found(raw, id)?;
    let info: Info = raw.json()?;
    let created_at = parse_rfc1123(&info.created_at)?;
    let expires_at = parse_rfc1123(&info.expires_at)?;
    let url = config.endpoint(&[info.bin_id.as_str()]).to_string();
    Ok(IvanBinPaste::new(
        info.bin_id,
        info.body,
        url,
        created_at,
        expires_at,
    ))
}

/// e.g. `Tue, 3 Jun 2008 11:05:30 GMT`
fn parse_rfc1123(value: &str) -> crate::Result<DateTime<Utc>> {
    DateTime::parse_from_rfc2822(value)
        .map(|time| time.with_timezone(&Utc))
        .map_err(|source| Error::Timestamp {
            value: value.to_owned(),
            source,
        })
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use reqwest::StatusCode;

    use super::*;
    use crate::models::PasteInfo;

    fn config() -> ServiceConfig {
        ServiceConfig::new(DEFAULT_BASE_URL).unwrap()
    }

    fn response(status: StatusCode, body: &'static str) -> RawResponse {
        RawResponse::new(
            status,
            Url::parse("https://bin.mrivanplays.com/api/info/abc").unwrap(),
            body,
        )
    }

    #[test]
    fn retrieve_parses_rfc1123_timestamps() {
        let raw = response(
            StatusCode::OK,
            r#"{
                "binId": "abc",
                "body": "System.out.println(\"Hello, world\");",
                "createdAt": "Tue, 3 Jun 2008 11:05:30 GMT",
                "expiresAt": "Sat, 14 Jun 2008 11:05:30 +0200"
            }"#,
        );
        let paste = parse_paste(&config(), &raw, "abc").unwrap();

        assert_eq!(paste.id(), "abc");
        assert_eq!(paste.body(), "System.out.println(\"Hello, world\");");
        assert_eq!(paste.url(), "https://bin.mrivanplays.com/abc");
        assert_eq!(
            paste.created_at(),
            Utc.with_ymd_and_hms(2008, 6, 3, 11, 5, 30).unwrap()
        );
        assert_eq!(
            paste.expires_at(),
            Utc.with_ymd_and_hms(2008, 6, 14, 9, 5, 30).unwrap()
        );
    }

    #[test]
    fn malformed_timestamp_is_a_failure() {
        let raw = response(
            StatusCode::OK,
            r#"{
                "binId": "abc",
                "body": "x",
                "createdAt": "2008-06-03T11:05:30Z",
                "expiresAt": "Tue, 3 Jun 2008 11:05:30 GMT"
            }"#,
        );
        let error = parse_paste(&config(), &raw, "abc").unwrap_err();
        assert!(matches!(error, Error::Timestamp { value, .. } if value == "2008-06-03T11:05:30Z"));
    }

    #[test]
    fn retrieve_status_classification() {
        let raw = response(StatusCode::NOT_FOUND, "");
        let error = parse_paste(&config(), &raw, "abc").unwrap_err();
        assert!(matches!(error, Error::NotFound { id } if id == "abc"));

        let raw = response(StatusCode::SERVICE_UNAVAILABLE, "down");
        let error = parse_paste(&config(), &raw, "abc").unwrap_err();
        assert!(error.is_unexpected_status());
    }
}
