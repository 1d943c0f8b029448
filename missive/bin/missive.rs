use std::path::PathBuf;

use missive::{controller::Missive, env};
use missive_common::logging;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    logging::init();

    let mut missive = match find_config_file()? {
        Some(config_path) => {
            let config_content = std::fs::read_to_string(&config_path).map_err(|e| {
                anyhow::anyhow!(
                    "Failed to read config from {}: {}",
                    config_path.display(),
                    e
                )
            })?;
            ron::from_str::<Missive>(&config_content).map_err(|e| {
                anyhow::anyhow!("Invalid config in {}: {}", config_path.display(), e)
            })?
        }
        None => Missive::default(),
    };

    env::apply(&mut missive);

    missive.run().await
}

/// Find the configuration file using the following precedence:
/// 1. `MISSIVE_CONFIG` environment variable
/// 2. ./missive.config.ron (current working directory)
/// 3. /etc/missive/missive.config.ron (system-wide config)
///
/// Without any of these, built-in defaults and the environment are used.
fn find_config_file() -> anyhow::Result<Option<PathBuf>> {
    if let Ok(env_path) = std::env::var("MISSIVE_CONFIG") {
        let path = PathBuf::from(env_path);
        if path.exists() {
            return Ok(Some(path));
        }
        anyhow::bail!(
            "MISSIVE_CONFIG points to non-existent file: {}",
            path.display()
        );
    }

    let default_paths = [
        PathBuf::from("./missive.config.ron"),
        PathBuf::from("/etc/missive/missive.config.ron"),
    ];

    Ok(default_paths.into_iter().find(|path| path.exists()))
}
