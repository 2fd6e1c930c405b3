use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::{Local, TimeZone, Utc};
use clap::{Args, Parser, Subcommand, ValueEnum};

use qrtrail::analytics::AnalyticsSnapshot;
use qrtrail::export;
use qrtrail::history::{HistoryQuery, SortKey};
use qrtrail::models::IntentType;
use qrtrail::payload::{classify, PayloadFields, WifiSecurity};
use qrtrail::settings::ErrorCorrection;
use qrtrail::App;

#[derive(Parser)]
#[command(
    name = "qrtrail",
    version,
    about = "QR payload codec with scan history analytics"
)]
struct Cli {
    /// Data directory (defaults to $QRTRAIL_DATA_DIR, then ~/.qrtrail)
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Record a decoded payload into the scan history
    Scan {
        /// The raw decoded text, exactly as read from the code
        data: String,
        /// Symbolic code format reported by the capture layer
        #[arg(long, default_value = "QR_CODE")]
        format: String,
    },
    /// Classify a payload without recording it
    Classify { data: String },
    /// Encode structured fields into the payload string for rendering
    Generate {
        #[command(subcommand)]
        payload: GenerateCommand,
    },
    /// List the scan history
    History(HistoryArgs),
    /// Aggregate statistics over the scan history
    Stats,
    /// Export the (optionally filtered) history as CSV
    Export {
        /// Output file; defaults to qr-scan-history-<date>.csv
        #[arg(long)]
        out: Option<PathBuf>,
        #[command(flatten)]
        query: HistoryArgs,
    },
    /// Delete selected events by id
    Remove { ids: Vec<String> },
    /// Delete the entire scan history
    Clear,
    /// Show or update generator presets
    Config {
        #[arg(long)]
        size: Option<u32>,
        #[arg(long, value_enum)]
        error_correction: Option<EcArg>,
        #[arg(long)]
        foreground: Option<String>,
        #[arg(long)]
        background: Option<String>,
    },
}

#[derive(Subcommand)]
enum GenerateCommand {
    /// Plain text, encoded as-is
    Text { text: String },
    /// Website URL (https:// is prefixed when missing)
    Url { url: String },
    /// mailto: link with optional subject and body
    Email {
        email: String,
        #[arg(long, default_value = "")]
        subject: String,
        #[arg(long, default_value = "")]
        body: String,
    },
    /// tel: link
    Phone { number: String },
    /// sms: link with an optional prefilled message
    Sms {
        number: String,
        #[arg(long, default_value = "")]
        message: String,
    },
    /// Wi-Fi network credentials
    Wifi {
        ssid: String,
        #[arg(long, default_value = "")]
        password: String,
        #[arg(long, value_enum, default_value = "wpa")]
        security: SecurityArg,
        #[arg(long)]
        hidden: bool,
    },
    /// vCard contact card
    Contact {
        #[arg(long, default_value = "")]
        first_name: String,
        #[arg(long, default_value = "")]
        last_name: String,
        #[arg(long, default_value = "")]
        phone: String,
        #[arg(long, default_value = "")]
        email: String,
        #[arg(long, default_value = "")]
        organization: String,
    },
}

#[derive(Args)]
struct HistoryArgs {
    /// Free-text search over payloads and type names
    #[arg(long)]
    search: Option<String>,
    /// Keep only one payload type
    #[arg(long = "type", value_enum)]
    intent: Option<TypeArg>,
    #[arg(long, value_enum, default_value = "newest")]
    sort: SortArg,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum TypeArg {
    Text,
    Url,
    Email,
    Phone,
    Sms,
    Wifi,
    Contact,
    Location,
}

impl From<TypeArg> for IntentType {
    fn from(value: TypeArg) -> Self {
        match value {
            TypeArg::Text => IntentType::Text,
            TypeArg::Url => IntentType::Url,
            TypeArg::Email => IntentType::Email,
            TypeArg::Phone => IntentType::Phone,
            TypeArg::Sms => IntentType::Sms,
            TypeArg::Wifi => IntentType::Wifi,
            TypeArg::Contact => IntentType::Contact,
            TypeArg::Location => IntentType::Location,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum SortArg {
    Newest,
    Oldest,
    Type,
    Data,
}

impl From<SortArg> for SortKey {
    fn from(value: SortArg) -> Self {
        match value {
            SortArg::Newest => SortKey::Newest,
            SortArg::Oldest => SortKey::Oldest,
            SortArg::Type => SortKey::Type,
            SortArg::Data => SortKey::Data,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum SecurityArg {
    Wpa,
    Wep,
    Nopass,
}

impl From<SecurityArg> for WifiSecurity {
    fn from(value: SecurityArg) -> Self {
        match value {
            SecurityArg::Wpa => WifiSecurity::Wpa,
            SecurityArg::Wep => WifiSecurity::Wep,
            SecurityArg::Nopass => WifiSecurity::Nopass,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum EcArg {
    L,
    M,
    Q,
    H,
}

impl From<EcArg> for ErrorCorrection {
    fn from(value: EcArg) -> Self {
        match value {
            EcArg::L => ErrorCorrection::L,
            EcArg::M => ErrorCorrection::M,
            EcArg::Q => ErrorCorrection::Q,
            EcArg::H => ErrorCorrection::H,
        }
    }
}

impl From<&HistoryArgs> for HistoryQuery {
    fn from(args: &HistoryArgs) -> Self {
        HistoryQuery {
            search: args.search.clone(),
            intent: args.intent.map(IntentType::from),
            sort: args.sort.into(),
        }
    }
}

fn resolve_data_dir(data_dir: Option<PathBuf>) -> Result<PathBuf> {
    if let Some(dir) = data_dir {
        return Ok(dir);
    }
    if let Ok(dir) = std::env::var("QRTRAIL_DATA_DIR") {
        return Ok(PathBuf::from(dir));
    }
    let home = std::env::var("HOME").context("HOME is not set; pass --data-dir")?;
    Ok(PathBuf::from(home).join(".qrtrail"))
}

fn build_payload(command: GenerateCommand) -> PayloadFields {
    match command {
        GenerateCommand::Text { text } => PayloadFields::Text { text },
        GenerateCommand::Url { url } => PayloadFields::Url { url },
        GenerateCommand::Email {
            email,
            subject,
            body,
        } => PayloadFields::Email {
            email,
            subject,
            body,
        },
        GenerateCommand::Phone { number } => PayloadFields::Phone { number },
        GenerateCommand::Sms { number, message } => PayloadFields::Sms { number, message },
        GenerateCommand::Wifi {
            ssid,
            password,
            security,
            hidden,
        } => PayloadFields::Wifi {
            ssid,
            password,
            security: security.into(),
            hidden,
        },
        GenerateCommand::Contact {
            first_name,
            last_name,
            phone,
            email,
            organization,
        } => PayloadFields::Contact {
            first_name,
            last_name,
            phone,
            email,
            organization,
        },
    }
}

fn format_timestamp(timestamp_ms: i64) -> String {
    Utc.timestamp_millis_opt(timestamp_ms)
        .single()
        .map(|at| {
            at.with_timezone(&Local)
                .format("%Y-%m-%d %H:%M")
                .to_string()
        })
        .unwrap_or_else(|| "-".to_string())
}

fn print_stats(snapshot: &AnalyticsSnapshot) {
    println!(
        "Total scans: {} (since {})",
        snapshot.total_scans,
        format_timestamp(snapshot.first_scan_at)
    );
    println!(
        "Last 24 hours: {} (avg {}/day over {} days)",
        snapshot.last_24h, snapshot.avg_per_day, snapshot.days_since_first
    );

    println!("\nType distribution ({} types):", snapshot.unique_types);
    for entry in &snapshot.type_counts {
        let pct = entry.count as f64 * 100.0 / snapshot.total_scans as f64;
        println!("  {:<8} {:>5}  {:.1}%", entry.intent.as_str(), entry.count, pct);
    }

    println!("\nDaily activity (last 7 days):");
    for bucket in &snapshot.daily {
        println!("  {}  {}", bucket.date.format("%b %d"), bucket.count);
    }
    println!(
        "Peak day: {} ({} scans)",
        snapshot.peak_day.date.format("%b %d"),
        snapshot.peak_day.count
    );
    println!(
        "Peak hour: {:02}:00 ({} scans)",
        snapshot.peak_hour.hour, snapshot.peak_hour.count
    );

    if !snapshot.top_domains.is_empty() {
        println!("\nTop domains:");
        for entry in &snapshot.top_domains {
            println!(
                "  {:<30} {:>5}  {:.1}%",
                entry.domain, entry.count, entry.share_pct
            );
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Classify { data } => {
            println!("{}", classify(&data).as_str());
        }
        Command::Generate { payload } => {
            let app = App::init(&resolve_data_dir(cli.data_dir)?)?;
            let payload = build_payload(payload);
            let generator = app.settings.generator();
            log::info!(
                "Render hints: {}px, EC {}, {} on {}",
                generator.size,
                generator.error_correction.as_str(),
                generator.foreground,
                generator.background
            );
            println!("{}", payload.encode());
        }
        Command::Scan { data, format } => {
            let app = App::init(&resolve_data_dir(cli.data_dir)?)?;
            let event = app.history.record_scan(data, Some(format)).await?;
            println!("{}", serde_json::to_string_pretty(&event)?);
        }
        Command::History(args) => {
            let app = App::init(&resolve_data_dir(cli.data_dir)?)?;
            let events = app.history.query(&HistoryQuery::from(&args)).await?;
            if events.is_empty() {
                println!("No scan history");
                return Ok(());
            }
            for event in &events {
                println!(
                    "{}  {:<8}  {}  {}",
                    format_timestamp(event.timestamp),
                    event.intent.as_str(),
                    event.id,
                    event.data
                );
            }
            println!("\n{} event(s)", events.len());
        }
        Command::Stats => {
            let app = App::init(&resolve_data_dir(cli.data_dir)?)?;
            match app.history.analytics().await? {
                Some(snapshot) => print_stats(&snapshot),
                None => println!("No analytics available; scan something first"),
            }
        }
        Command::Export { out, query } => {
            let app = App::init(&resolve_data_dir(cli.data_dir)?)?;
            let csv = app.history.export_csv(&HistoryQuery::from(&query)).await?;
            let path =
                out.unwrap_or_else(|| PathBuf::from(export::default_file_name(Local::now())));
            std::fs::write(&path, &csv)
                .with_context(|| format!("failed to write export to {}", path.display()))?;
            println!("Exported to {}", path.display());
        }
        Command::Remove { ids } => {
            let app = App::init(&resolve_data_dir(cli.data_dir)?)?;
            let removed = app.history.remove_by_ids(ids).await?;
            println!("Removed {removed} event(s)");
        }
        Command::Clear => {
            let app = App::init(&resolve_data_dir(cli.data_dir)?)?;
            let removed = app.history.clear().await?;
            println!("Removed {removed} event(s)");
        }
        Command::Config {
            size,
            error_correction,
            foreground,
            background,
        } => {
            let app = App::init(&resolve_data_dir(cli.data_dir)?)?;
            let mut generator = app.settings.generator();
            let changed = size.is_some()
                || error_correction.is_some()
                || foreground.is_some()
                || background.is_some();

            if let Some(size) = size {
                generator.size = size;
            }
            if let Some(level) = error_correction {
                generator.error_correction = level.into();
            }
            if let Some(foreground) = foreground {
                generator.foreground = foreground;
            }
            if let Some(background) = background {
                generator.background = background;
            }

            if changed {
                app.settings.update_generator(generator.clone())?;
            }
            println!("{}", serde_json::to_string_pretty(&generator)?);
        }
    }

    Ok(())
}
