use crate::config::CommandsConfig;
use crate::error::{OrganizerError, Result};
use crate::shortcuts::ShortcutAction;
use std::sync::Arc;
use tokio::process::Command;
use tracing::{debug, info};

/// Операции хоста над управляемыми окнами
#[async_trait::async_trait]
pub trait WindowCommands: Send + Sync {
    async fn focus_next_window(&self) -> Result<()>;
    async fn focus_previous_window(&self) -> Result<()>;
    async fn click_all_windows(&self) -> Result<()>;
    async fn click_all_windows_with_delay(&self, delay_ms: u64) -> Result<()>;
}

/// Factory function to create window commands based on the dry_run flag
pub fn create_window_commands(config: &CommandsConfig, dry_run: bool) -> Arc<dyn WindowCommands> {
    if dry_run {
        Arc::new(DryRunWindowCommands)
    } else {
        Arc::new(ShellWindowCommands::new(config.clone()))
    }
}

/// Запускает настроенные команды хоста; ненулевой код выхода считается ошибкой
pub struct ShellWindowCommands {
    config: CommandsConfig,
}

impl ShellWindowCommands {
    pub fn new(config: CommandsConfig) -> Self {
        info!("Инициализация ShellWindowCommands");
        Self { config }
    }

    fn argv_for(&self, action: ShortcutAction) -> &[String] {
        match action {
            ShortcutAction::Next => &self.config.next,
            ShortcutAction::Previous => &self.config.previous,
            ShortcutAction::ClickAll => &self.config.click_all,
            ShortcutAction::ClickAllWithDelay => &self.config.click_all_with_delay,
        }
    }

    async fn run(&self, action: ShortcutAction, delay_ms: Option<u64>) -> Result<()> {
        let argv: Vec<String> = self
            .argv_for(action)
            .iter()
            .map(|arg| match delay_ms {
                Some(delay) => arg.replace("{delay_ms}", &delay.to_string()),
                None => arg.clone(),
            })
            .collect();

        let Some((program, args)) = argv.split_first() else {
            return Err(OrganizerError::dispatch_failure(action, "команда не настроена"));
        };

        debug!("Запуск команды для {}: {:?}", action, argv);
        let output = Command::new(program)
            .args(args)
            .output()
            .await
            .map_err(|e| OrganizerError::dispatch_failure(action, format!("{} не запустился: {}", program, e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(OrganizerError::dispatch_failure(
                action,
                format!("{} завершился с {}: {}", program, output.status, stderr.trim()),
            ));
        }

        Ok(())
    }
}

#[async_trait::async_trait]
impl WindowCommands for ShellWindowCommands {
    async fn focus_next_window(&self) -> Result<()> {
        self.run(ShortcutAction::Next, None).await
    }

    async fn focus_previous_window(&self) -> Result<()> {
        self.run(ShortcutAction::Previous, None).await
    }

    async fn click_all_windows(&self) -> Result<()> {
        self.run(ShortcutAction::ClickAll, None).await
    }

    async fn click_all_windows_with_delay(&self, delay_ms: u64) -> Result<()> {
        self.run(ShortcutAction::ClickAllWithDelay, Some(delay_ms)).await
    }
}

pub struct DryRunWindowCommands;

#[async_trait::async_trait]
impl WindowCommands for DryRunWindowCommands {
    async fn focus_next_window(&self) -> Result<()> {
        info!("[DRY RUN] Переключение на следующее окно");
        Ok(())
    }

    async fn focus_previous_window(&self) -> Result<()> {
        info!("[DRY RUN] Переключение на предыдущее окно");
        Ok(())
    }

    async fn click_all_windows(&self) -> Result<()> {
        info!("[DRY RUN] Клик во всех окнах");
        Ok(())
    }

    async fn click_all_windows_with_delay(&self, delay_ms: u64) -> Result<()> {
        info!("[DRY RUN] Клик во всех окнах с задержкой {}мс", delay_ms);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn commands(config: CommandsConfig) -> ShellWindowCommands {
        ShellWindowCommands::new(config)
    }

    #[tokio::test]
    async fn test_missing_command_is_dispatch_failure() {
        let shell = commands(CommandsConfig::default());
        let result = shell.focus_next_window().await;
        assert!(matches!(result, Err(OrganizerError::DispatchFailure { .. })));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_exit_status_is_checked() {
        let shell = commands(CommandsConfig {
            next: vec!["true".into()],
            previous: vec!["false".into()],
            ..CommandsConfig::default()
        });
        assert!(shell.focus_next_window().await.is_ok());
        assert!(matches!(
            shell.focus_previous_window().await,
            Err(OrganizerError::DispatchFailure { .. })
        ));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_delay_placeholder_is_substituted() {
        let shell = commands(CommandsConfig {
            click_all_with_delay: vec!["sh".into(), "-c".into(), "test \"$0\" = 100".into(), "{delay_ms}".into()],
            ..CommandsConfig::default()
        });
        assert!(shell.click_all_windows_with_delay(100).await.is_ok());
        assert!(shell.click_all_windows_with_delay(250).await.is_err());
    }
}
