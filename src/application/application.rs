use std::io::{self, BufRead};

use snafu::Snafu;
use snafu::prelude::*;
use tracing::{debug, info, warn};

use crate::application::{RuntimeConfig, Shell};
use crate::config::{Config, ConfigError};
use crate::filesystem::{FileSystem, FsError};

pub struct Application;

impl Application {
    pub async fn run(
        runtime_config: impl Into<RuntimeConfig>,
        color: bool,
    ) -> Result<(), ApplicationError> {
        let runtime_config: RuntimeConfig = runtime_config.into();
        let config = Config::read(runtime_config.config.as_deref())
            .await
            .context(ConfigSnafu)?;
        debug!("Loaded config: {:?}", config);

        let options = runtime_config.storage_options(config.storage);
        info!(
            "Opening '{}' with the {} backend",
            options.key, options.backend
        );
        let file_system = FileSystem::from_options(&options)
            .await
            .context(FileSystemSnafu)?;
        let shell = Shell::new(file_system, color);

        if runtime_config.commands.is_empty() {
            info!("Reading commands from stdin");
            for line in io::stdin().lock().lines() {
                let line = line.context(StdinSnafu)?;
                if line.trim().is_empty() {
                    continue;
                }
                Self::execute_line(&shell, &line).await;
            }
        } else {
            for line in &runtime_config.commands {
                Self::execute_line(&shell, line).await;
            }
        }

        Ok(())
    }

    /// A failing command is reported and the session goes on.
    async fn execute_line(shell: &Shell, line: &str) {
        match shell.execute(line).await {
            Ok(Some(output)) => println!("{output}"),
            Ok(None) => {}
            Err(error) => {
                warn!("Command '{}' failed: {:?}", line.trim(), error);
                eprintln!("{error}");
            }
        }
    }
}

#[derive(Debug, Snafu)]
pub enum ApplicationError {
    #[snafu(display("Critical failure encountered during configuration stage"))]
    ConfigError { source: ConfigError },
    #[snafu(display("Failed to open the file tree"))]
    FileSystemError { source: FsError },
    #[snafu(display("Failed to read commands from stdin"))]
    StdinError { source: io::Error },
}
