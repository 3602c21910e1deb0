//! `dolt config`

use crate::api::auth::generate_secret_key;
use crate::error::Result;
use crate::storage::config::{self, Config};

pub fn execute(effective: &Config, generate_api_secret: bool) -> Result<()> {
    if generate_api_secret {
        let mut file_config = config::load_config_from(&config::config_path())?;
        let key = generate_secret_key()?;
        file_config.api.secret_key = Some(key.clone());
        config::save_config(&file_config)?;
        println!("API secret key: {}", key);
        println!("Saved to {}", config::config_path().display());
        return Ok(());
    }

    println!("# {}", config::config_path().display());
    print!("{}", toml::to_string_pretty(&effective.redacted())?);
    Ok(())
}
