mod commands;

use cemt_browser::utils::error::{CemtError, ErrorSeverity};
use cemt_browser::utils::{logger, validation::Validate};
use cemt_browser::{CliConfig, FileSource, TableSession, TomlConfig};
use clap::Parser;

fn main() {
    let cli = CliConfig::parse();

    // 初始化日誌
    if cli.json {
        logger::init_json_logger();
    } else {
        logger::init_cli_logger(cli.verbose);
    }
    tracing::debug!("CLI config: {:?}", cli);

    if let Err(e) = run(cli) {
        // 記錄詳細錯誤信息
        tracing::error!(
            "❌ cemt failed: {} (Category: {:?}, Severity: {:?})",
            e,
            e.category(),
            e.severity()
        );

        // 輸出用戶友好的錯誤信息
        eprintln!("❌ {}", e.user_friendly_message());
        eprintln!("💡 建議: {}", e.recovery_suggestion());

        // 根據錯誤嚴重程度決定退出碼
        let exit_code = match e.severity() {
            ErrorSeverity::Medium => 2, // 輸入錯誤
            ErrorSeverity::High => 1,   // 資料或設定錯誤
            ErrorSeverity::Critical => 3, // 檔案系統錯誤
        };
        std::process::exit(exit_code);
    }
}

fn run(cli: CliConfig) -> Result<(), CemtError> {
    let mut config = TomlConfig::discover(cli.config.as_deref())?;
    cli.apply_overrides(&mut config);

    // 驗證配置
    config.validate()?;

    let mut session = open_session(&config)?;

    let ctx = commands::Context {
        image_dir: config.image_dir(),
        limits: config.query,
        json: cli.json,
    };
    commands::run(cli.command, &mut session, &ctx)
}

/// 載入失敗就停止，不會用空表繼續
fn open_session(config: &TomlConfig) -> Result<TableSession<FileSource>, CemtError> {
    let source = FileSource::from_path(config.table_path())?;
    let session = TableSession::open(source).inspect_err(|e| {
        if e.is_load_error() {
            eprintln!("⛔ 資料表載入失敗，未執行任何指令");
        }
    })?;
    Ok(session.with_cache_ttl(config.cache_ttl()))
}
