//! Create and retrieve pastes on hastebin, ghostbin, ivanbin and sourcebin
//! servers through one request type that can be executed blocking or
//! asynchronously.
//!
//! ```no_run
//! use binclient::{HasteService, PasteInfo};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let haste = HasteService::new()?;
//! let id = haste.create_paste("<h1>Hello, world!</h1>").execute_blocking()?;
//! let paste = haste.retrieve_paste(&id).execute_blocking()?;
//! println!("{} -> {}", paste.url(), paste.body());
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod models;
pub mod request;
pub mod services;

pub use error::{Error, RequestError, Result};
pub use models::{
    GhostbinPaste, HastePaste, IvanBinPaste, Language, Paste, PasteInfo, SourcebinPaste,
};
pub use request::{DeferredRequest, PreparedRequest, RawResponse, Transport};
pub use services::{
    AnyService, GhostbinService, HasteService, IvanBinService, PasteService, ServiceConfig,
    ServiceKind, SourcebinService,
};
