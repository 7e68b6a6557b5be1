use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Read access shared by every kind of paste.
pub trait PasteInfo {
    fn id(&self) -> &str;
    fn body(&self) -> &str;
    fn url(&self) -> &str;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HastePaste {
    id: String,
    body: String,
    url: String,
}

impl HastePaste {
    pub(crate) fn new(id: String, body: String, url: String) -> Self {
        HastePaste { id, body, url }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Language {
    pub name: String,
    pub id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GhostbinPaste {
    id: String,
    body: String,
    url: String,
    language: Language,
    expiration: String,
    encrypted: bool,
}

impl GhostbinPaste {
    pub(crate) fn new(
        id: String,
        body: String,
        url: String,
        language: Language,
        expiration: String,
        encrypted: bool,
    ) -> Self {
        GhostbinPaste {
            id,
            body,
            url,
            language,
            expiration,
            encrypted,
        }
    }

    pub fn language(&self) -> &Language {
        &self.language
    }

    /// Expiry as reported by the server, e.g. `10m` or `never`.
    pub fn expiration(&self) -> &str {
        &self.expiration
    }

    pub fn is_encrypted(&self) -> bool {
        self.encrypted
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IvanBinPaste {
    id: String,
    body: String,
    url: String,
    created_at: DateTime<Utc>,
    expires_at: DateTime<Utc>,
}

impl IvanBinPaste {
    pub(crate) fn new(
        id: String,
        body: String,
        url: String,
        created_at: DateTime<Utc>,
        expires_at: DateTime<Utc>,
    ) -> Self {
        IvanBinPaste {
            id,
            body,
            url,
            created_at,
            expires_at,
        }
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn expires_at(&self) -> DateTime<Utc> {
        self.expires_at
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourcebinPaste {
    id: String,
    body: String,
    url: String,
    created_at: DateTime<Utc>,
    owner_id: String,
}

impl SourcebinPaste {
    pub(crate) fn new(
        id: String,
        body: String,
        url: String,
        created_at: DateTime<Utc>,
        owner_id: String,
    ) -> Self {
        SourcebinPaste {
            id,
            body,
            url,
            created_at,
            owner_id,
        }
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Owner of the bin; empty for anonymous bins.
    pub fn owner_id(&self) -> &str {
        &self.owner_id
    }
}

macro_rules! impl_paste_info {
    ($($ty:ty),*) => {
        $(
            impl PasteInfo for $ty {
                fn id(&self) -> &str {
                    &self.id
                }

                fn body(&self) -> &str {
                    &self.body
                }

                fn url(&self) -> &str {
                    &self.url
                }
            }
        )*
    };
}

impl_paste_info!(HastePaste, GhostbinPaste, IvanBinPaste, SourcebinPaste);

/// A paste retrieved from any of the supported services.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "service", rename_all = "lowercase")]
pub enum Paste {
    Haste(HastePaste),
    Ghostbin(GhostbinPaste),
    IvanBin(IvanBinPaste),
    Sourcebin(SourcebinPaste),
}

impl Paste {
    fn inner(&self) -> &dyn PasteInfo {
        match self {
            Paste::Haste(paste) => paste,
            Paste::Ghostbin(paste) => paste,
            Paste::IvanBin(paste) => paste,
            Paste::Sourcebin(paste) => paste,
        }
    }
}

impl PasteInfo for Paste {
    fn id(&self) -> &str {
        self.inner().id()
    }

    fn body(&self) -> &str {
        self.inner().body()
    }

    fn url(&self) -> &str {
        self.inner().url()
    }
}

impl From<HastePaste> for Paste {
    fn from(value: HastePaste) -> Self {
        Paste::Haste(value)
    }
}

impl From<GhostbinPaste> for Paste {
    fn from(value: GhostbinPaste) -> Self {
        Paste::Ghostbin(value)
    }
}

impl From<IvanBinPaste> for Paste {
    fn from(value: IvanBinPaste) -> Self {
        Paste::IvanBin(value)
    }
}

impl From<SourcebinPaste> for Paste {
    fn from(value: SourcebinPaste) -> Self {
        Paste::Sourcebin(value)
    }
}
