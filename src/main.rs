use anyhow::Result;
use clap::{Parser, Subcommand};
use std::sync::Arc;
use tokio::signal;
use tokio::sync::{mpsc, oneshot};
use tracing::{error, info, warn};
mod config;
mod error;
mod events;
mod mappings;
mod services;
mod shortcuts;
mod utils;

use config::Config;
use services::{
    create_hotkey_backend, create_keyboard_listener, create_window_commands, create_window_detector,
    ActionDispatcher, FocusTracker, HotkeyRegistrar, JsonFileStore, KeyValueStore, MemoryStore, ShortcutService,
    ShortcutStore,
};
use shortcuts::{CanonicalShortcut, ShortcutAction, ShortcutBinding, ShortcutCapture};

#[derive(Parser, Debug)]
#[command(name = "multiclient-hotkeys")]
#[command(about = "Глобальные горячие клавиши для переключения между окнами клиентов и клика во всех окнах")]
struct Args {
    /// Путь к файлу конфигурации
    #[arg(short, long, default_value = "organizer.toml")]
    config: String,

    /// Режим сухого запуска (без регистрации в ОС и без внешних команд)
    #[arg(long)]
    dry_run: bool,

    /// Уровень логирования (по умолчанию из конфигурации)
    #[arg(long)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Запустить глобальные клавиши до Ctrl+C
    Run,
    /// Показать назначения и конфликты
    Show,
    /// Назначить комбинацию действию; без комбинации ждёт нажатия на клавиатуре
    Bind {
        /// next, prev, click_all, click_all_with_delay
        action: ShortcutAction,
        /// Например Control+Shift+KeyN
        shortcut: Option<String>,
    },
    /// Вернуть действию комбинацию по умолчанию
    Reset { action: ShortcutAction },
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Загрузка конфигурации
    let config = Config::load(&args.config)?;

    // Инициализация системы логирования
    let level = args.log_level.as_deref().unwrap_or(&config.logging.level);
    init_tracing(level, &config.logging.format)?;

    info!("Запуск multiclient-hotkeys v{}", env!("CARGO_PKG_VERSION"));
    info!("Конфигурация загружена из: {}", args.config);

    if args.dry_run {
        warn!("Режим сухого запуска - реальные действия отключены");
    }

    match args.command.unwrap_or(Command::Run) {
        Command::Run => run(config, args.dry_run).await,
        Command::Show => show(&config, args.dry_run).await,
        Command::Bind { action, shortcut } => bind(&config, args.dry_run, action, shortcut).await,
        Command::Reset { action } => reset(&config, args.dry_run, action).await,
    }
}

/// В сухом запуске назначения читаются из файла, но изменения остаются в памяти
async fn open_store(config: &Config, dry_run: bool) -> ShortcutStore {
    let file = Arc::new(JsonFileStore::new(&config.storage.path));
    if !dry_run {
        return ShortcutStore::new(file, config.storage.key.clone());
    }

    let memory = match file.get(&config.storage.key).await {
        Ok(Some(value)) => MemoryStore::new().with_entry(config.storage.key.clone(), value),
        Ok(None) => MemoryStore::new(),
        Err(e) => {
            warn!("[DRY RUN] Не удалось прочитать {}: {}", config.storage.path.display(), e);
            MemoryStore::new()
        }
    };
    info!("[DRY RUN] Назначения не записываются на диск");
    ShortcutStore::new(Arc::new(memory), config.storage.key.clone())
}

async fn run(config: Config, dry_run: bool) -> Result<()> {
    // Инициализация компонентов
    let store = Arc::new(open_store(&config, dry_run).await);
    let focus = Arc::new(FocusTracker::new(config.focus.initially_active));
    let backend = create_hotkey_backend(dry_run)?;
    let commands = create_window_commands(&config.commands, dry_run);
    let dispatcher = Arc::new(ActionDispatcher::new(commands));
    let registrar = Arc::new(HotkeyRegistrar::new(backend, dispatcher.clone()));
    let service = ShortcutService::new(store, focus.clone(), registrar, config.storage.reload_interval());

    let (focus_tx, focus_rx) = mpsc::channel(16);
    let window_detector = create_window_detector(&config.focus, focus_tx, dry_run)?;

    info!("Все компоненты инициализированы");

    // Запуск всех сервисов параллельно
    let window_handle = tokio::spawn(async move {
        if let Err(e) = window_detector.run().await {
            error!("Ошибка в WindowDetector: {}", e);
        }
    });
    let tracker = focus.clone();
    let focus_handle = tokio::spawn(async move { tracker.run(focus_rx).await });

    let (shutdown_tx, shutdown_rx) = oneshot::channel();
    let service_handle = tokio::spawn(async move { service.run(shutdown_rx).await });

    info!("Все сервисы запущены");

    // Ожидание сигнала завершения
    match signal::ctrl_c().await {
        Ok(()) => info!("Получен сигнал завершения (Ctrl+C)"),
        Err(err) => error!("Ошибка при ожидании сигнала завершения: {}", err),
    }

    info!("Завершение работы...");

    // Сервис сам снимает все глобальные клавиши перед выходом из цикла
    let _ = shutdown_tx.send(());
    window_handle.abort();
    focus_handle.abort();

    let shutdown_timeout = tokio::time::Duration::from_secs(5);
    match tokio::time::timeout(shutdown_timeout, service_handle).await {
        Ok(Ok(())) => info!("Все сервисы завершили работу корректно"),
        Ok(Err(e)) => error!("ShortcutService завершился аварийно: {}", e),
        Err(_) => warn!("Таймаут при снятии глобальных клавиш"),
    }

    dispatcher.log_summary();

    info!("multiclient-hotkeys завершил работу");
    Ok(())
}

async fn show(config: &Config, dry_run: bool) -> Result<()> {
    let binding = open_store(config, dry_run).await.load().await;
    print_binding(&binding);
    Ok(())
}

async fn bind(config: &Config, dry_run: bool, action: ShortcutAction, shortcut: Option<String>) -> Result<()> {
    let shortcut = match shortcut {
        Some(raw) => raw.parse::<CanonicalShortcut>()?,
        None => {
            if !dry_run {
                utils::permissions::check_capture_permissions()?;
            }
            let listener = create_keyboard_listener(&config.capture, dry_run)?;
            listener.capture(Arc::new(ShortcutCapture::new())).await?
        }
    };

    let binding = open_store(config, dry_run).await.update(action, shortcut).await?;

    println!("{} -> {}", action, shortcut);
    print_binding(&binding);
    Ok(())
}

async fn reset(config: &Config, dry_run: bool, action: ShortcutAction) -> Result<()> {
    let binding = open_store(config, dry_run).await.reset(action).await?;
    print_binding(&binding);
    Ok(())
}

fn print_binding(binding: &ShortcutBinding) {
    for (action, shortcut) in binding.resolved() {
        let source = if binding.get(action).is_some() { "задано" } else { "по умолчанию" };
        println!("{:<22} {:<28} ({})", action.to_string(), shortcut.to_string(), source);
    }

    for (shortcut, actions) in binding.collisions() {
        let names: Vec<String> = actions.iter().map(|a| a.to_string()).collect();
        println!(
            "Конфликт: {} назначена {}; срабатывает только {}",
            shortcut,
            names.join(", "),
            names[0]
        );
    }
}

fn init_tracing(level: &str, format: &str) -> Result<()> {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(level))?;
    let registry = tracing_subscriber::registry().with(filter);

    if format == "json" {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer().compact()).init();
    }

    Ok(())
}
