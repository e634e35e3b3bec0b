use clap::Subcommand;
use sentience_core::{Config, HttpSessionService};

use super::print_json;

/// Characters of the token left visible in `config list`.
const TOKEN_TAIL: usize = 4;

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Print one value (e.g. "remote.base_url", "ambient.volume")
    Get {
        key: String,
    },
    /// Change one value and write the config file
    Set {
        key: String,
        value: String,
    },
    /// Print the whole config as JSON, with the session token masked
    List,
    /// Overwrite the config file with defaults
    Reset,
}

pub fn run(action: ConfigAction) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        ConfigAction::Get { key } => {
            let config = Config::load()?;
            let value = config
                .get(&key)
                .ok_or_else(|| format!("unknown key: {key}"))?;
            println!("{value}");
        }
        ConfigAction::Set { key, value } => {
            let mut config = Config::load()?;
            config.apply(&key, &value)?;
            if key.starts_with("remote.") {
                // Refuse to persist a remote section the recorder cannot use.
                HttpSessionService::new(&config.remote)?;
            }
            config.save()?;
            println!("ok");
        }
        ConfigAction::List => {
            let mut config = Config::load()?;
            config.remote.token = mask_token(&config.remote.token);
            print_json(&config)?;
        }
        ConfigAction::Reset => {
            Config::default().save()?;
            println!("config reset to defaults");
        }
    }
    Ok(())
}

fn mask_token(token: &str) -> String {
    let token = token.trim();
    if token.is_empty() {
        return String::new();
    }
    let chars: Vec<char> = token.chars().collect();
    if chars.len() <= TOKEN_TAIL * 2 {
        return "****".into();
    }
    let tail: String = chars[chars.len() - TOKEN_TAIL..].iter().collect();
    format!("****{tail}")
}
