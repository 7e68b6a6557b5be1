use binclient::{PasteInfo, PasteService, ServiceKind};

use crate::config::Config;

pub fn run(config: &Config, kind: ServiceKind, id: &str, json: bool) -> anyhow::Result<()> {
    let paste = config.service(kind)?.retrieve(id).execute_blocking()?;

    if json {
        println!("{}", serde_json::to_string_pretty(&paste)?);
    } else {
        print!("{}", paste.body());
    }
    Ok(())
}
