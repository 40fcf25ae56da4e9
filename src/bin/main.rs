use anyhow::{anyhow, Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use market_monitor::config::{ApplicationConfig, LogConfig};
use market_monitor::domain_types::ComparisonMode;
use market_monitor::service::MarketService;
use market_monitor::storage::{Dataset, HistoryQuery};

#[derive(Parser)]
#[command(name = "market_monitor", about = "市場快照收集與變動分析工具")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// 收集目前的擴展市場快照
    Collect {
        /// 同時寫入資料表
        #[arg(long)]
        save: bool,
    },

    /// 收集、儲存並計算市場變動
    Changes {
        /// 與第幾筆已儲存資料比較（預設取自配置）
        #[arg(short, long)]
        offset: Option<usize>,
        /// 強制所有類別使用同一比較模式 (percentage 或 absolute)
        #[arg(short, long)]
        mode: Option<ComparisonMode>,
    },

    /// 查詢資料集歷史 (basic、global 或 selected)
    History {
        dataset: Dataset,
        #[command(flatten)]
        query: QueryArgs,
    },

    /// 資料集歷史統計摘要
    Summary {
        dataset: Dataset,
        #[command(flatten)]
        query: QueryArgs,
    },

    /// 自選指標
    Selected {
        #[command(subcommand)]
        command: SelectedCommands,
    },

    /// 市場變動報告
    Report {
        #[command(subcommand)]
        command: ReportCommands,
    },
}

#[derive(Subcommand)]
enum SelectedCommands {
    /// 收集並寫入自選指標
    Update,
    /// 最新一筆與第 N 筆的變動
    Changes {
        #[arg(short, long, default_value_t = 1)]
        offset: usize,
    },
    /// 最新一筆自選指標
    Current,
}

#[derive(Subcommand)]
enum ReportCommands {
    /// 計算市場變動並保存為 market.json
    Save,
    /// 顯示已保存的報告
    Show,
}

#[derive(clap::Args)]
struct QueryArgs {
    /// 最多返回筆數
    #[arg(short, long)]
    limit: Option<usize>,
    /// 起始日期 (YYYY-MM-DD，含)
    #[arg(long)]
    start: Option<NaiveDate>,
    /// 結束日期 (YYYY-MM-DD，含)
    #[arg(long)]
    end: Option<NaiveDate>,
}

impl From<QueryArgs> for HistoryQuery {
    fn from(args: QueryArgs) -> Self {
        HistoryQuery {
            limit: args.limit,
            start_date: args.start,
            end_date: args.end,
        }
    }
}

#[derive(Serialize)]
struct Message<'a> {
    status: &'a str,
    message: String,
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn print_message(status: &str, message: impl Into<String>) -> Result<()> {
    print_json(&Message {
        status,
        message: message.into(),
    })
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let app_config = ApplicationConfig::load_from_env().context("無法加載應用程序配置")?;
    init_logging(&app_config.log)?;

    let service = MarketService::from_config(&app_config).context("無法建立市場資料服務")?;

    match cli.command {
        Commands::Collect { save } => {
            let snapshot = service.collect_snapshot().await;
            if save {
                service.save_snapshot(&snapshot).await?;
            }
            print_json(&snapshot)?;
        }
        Commands::Changes { offset, mode } => {
            let offset = offset.unwrap_or(service.analysis().comparison_offset);
            let changes = service.get_changes(mode, offset).await?;
            print_json(&changes)?;
        }
        Commands::History { dataset, query } => {
            let rows = service.get_history(dataset, &query.into()).await?;
            print_json(&rows)?;
        }
        Commands::Summary { dataset, query } => {
            let summary = service.history_summary(dataset, &query.into()).await?;
            print_json(&summary)?;
        }
        Commands::Selected { command } => match command {
            SelectedCommands::Update => print_json(&service.update_selected().await?)?,
            SelectedCommands::Changes { offset } => match service.selected_changes(offset).await? {
                Some(changes) => print_json(&changes)?,
                None => print_message("error", format!("Not enough data for {} day comparison", offset))?,
            },
            SelectedCommands::Current => match service.selected_current().await? {
                Some(row) => print_json(&row)?,
                None => print_message("error", "No current data available")?,
            },
        },
        Commands::Report { command } => match command {
            ReportCommands::Save => {
                let changes = service.get_market_changes().await?;
                let path = service.save_market_changes(&changes).await?;
                print_message("success", format!("Market changes saved to {}", path.display()))?;
            }
            ReportCommands::Show => match service.load_saved_market_changes().await? {
                Some(saved) => print_json(&saved)?,
                None => print_message("no_data", "No saved market changes data found")?,
            },
        },
    }

    info!("完成");
    Ok(())
}

// 初始化日誌系統；輸出到 stderr，stdout 保留給 JSON 結果
fn init_logging(log_config: &LogConfig) -> Result<()> {
    let level = log_config.tracing_level();
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level.as_str().to_lowercase()));

    let builder = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    let result = match log_config.format.to_lowercase().as_str() {
        "compact" => tracing::subscriber::set_global_default(builder.compact().finish()),
        _ => tracing::subscriber::set_global_default(builder.pretty().finish()),
    };
    result.map_err(|e| anyhow!("設置日誌系統失敗: {}", e))?;

    info!("日誌系統初始化完成");
    Ok(())
}
