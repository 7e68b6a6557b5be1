use std::io::Read;
use std::path::Path;
use std::{fs, io};

use anyhow::Context;
use binclient::services::ghostbin;
use binclient::{AnyService, PasteService, ServiceKind};
use tracing::{info, warn};

use crate::config::Config;

pub fn run(
    config: &Config,
    kind: ServiceKind,
    file: Option<&Path>,
    language: Option<&str>,
    expire: Option<&str>,
) -> anyhow::Result<()> {
    let content = match file {
        Some(path) => fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?,
        None => {
            let mut buffer = String::new();
            io::stdin()
                .read_to_string(&mut buffer)
                .context("failed to read stdin")?;
            buffer
        }
    };

    let service = config.service(kind)?;
    let request = match &service {
        AnyService::Ghostbin(bin) => bin.create_paste_with_expiry(
            &content,
            language.unwrap_or(ghostbin::DEFAULT_LANGUAGE),
            expire.unwrap_or(bin.default_expiry()),
        ),
        other => {
            if language.is_some() || expire.is_some() {
                warn!("--language and --expire only apply to ghostbin, ignoring them");
            }
            other.create(&content)
        }
    };

    let id = request.execute_blocking()?;
    let url = service.paste_url(&id);
    info!("created paste: service='{kind}', id='{id}', size={size}", size = content.len());

    println!("{id}");
    println!("{url}");
    Ok(())
}
