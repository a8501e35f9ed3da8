//! Command Handlers

use chrono::{Duration, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::Path;
use std::sync::Arc;

use flood_api::{issue_token, AuthClaims, JwtConfig, ServerConfig};
use flood_core::ledger::{EmailLog, FloodHistory, UserDirectory, WardRegistry};
use flood_core::{
    FloodError, HistoricalFloodEvent, RiskLevel, UserId, UserRecord, WardId, WardRecord,
    WardYearStats,
};
use flood_db::{
    AlertService, FloodStore, MailerConfig, NotificationService, RiskPolicy, RiskService,
    RiskThresholds,
};

use crate::commands::{Cli, Commands, OutputFormat, PolicyArg};
use crate::error::{CliError, CliResult};

/// Store plus the services batch commands need
struct Services {
    store: Arc<FloodStore>,
    notifier: Arc<NotificationService>,
}

impl Services {
    async fn open(data_path: &Path) -> CliResult<Self> {
        let store = Arc::new(FloodStore::open(data_path).await?);
        let mail = MailerConfig::from_env();
        let notifier = Arc::new(NotificationService::new(
            store.clone(),
            mail.build()?,
            &mail.site_url,
        ));
        Ok(Self { store, notifier })
    }

    fn alerts(&self) -> AlertService {
        AlertService::new(self.store.clone(), self.notifier.clone())
    }

    fn risk(&self, policy: RiskPolicy) -> RiskService {
        RiskService::new(self.store.clone(), self.notifier.clone())
            .with_policy(policy, RiskThresholds::default())
    }
}

/// JSON prints `data`; plain runs the human-readable printer
fn print_output<T: Serialize>(
    data: &T,
    format: OutputFormat,
    plain: impl FnOnce(),
) -> CliResult<()> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(data)?),
        OutputFormat::Plain => plain(),
    }
    Ok(())
}

/// Run the CLI with parsed arguments
pub async fn run(cli: Cli) -> CliResult<()> {
    let format = cli.format;
    tracing::debug!(data_path = %cli.data_path.display(), command = ?cli.command, "Running command");

    match cli.command {
        Commands::Serve { host, port } => {
            let config = ServerConfig {
                bind_addr: host,
                port,
                data_path: cli.data_path.to_string_lossy().into_owned(),
                ..ServerConfig::from_env()
            };
            println!("Starting Flood Watch API on {}", config.bind_address());
            flood_api::run_server(config)
                .await
                .map_err(|e| CliError::server(e.to_string()))
        }

        Commands::SendAlert {
            ward,
            risk_level,
            message,
        } => {
            let services = Services::open(&cli.data_path).await?;
            let level: RiskLevel = risk_level.into();
            let sent = match ward {
                Some(ward) => vec![
                    services
                        .alerts()
                        .send_alert(WardId(ward), level, message)
                        .await?,
                ],
                None => services.alerts().send_risk_alerts(level, message).await?,
            };
            let alerts: Vec<_> = sent.iter().map(|(alert, _)| alert).collect();
            print_output(&alerts, format, || {
                if sent.is_empty() {
                    println!("No wards at {} risk or above", level);
                }
                for (alert, delivery) in &sent {
                    println!("Alert #{} sent for ward {}", alert.alert_id.0, alert.ward_id);
                    println!("  Message: {}", alert.message);
                    println!(
                        "  Emails:  {} sent, {} failed, {} skipped",
                        delivery.sent, delivery.failed, delivery.skipped
                    );
                }
            })
        }

        Commands::DailySummary { date } => {
            let services = Services::open(&cli.data_path).await?;
            let today = date.unwrap_or_else(|| Utc::now().date_naive());
            let (summary, delivery) = services.alerts().daily_summary(today).await?;
            print_output(&summary, format, || {
                println!("Daily summary for {}", summary.date);
                println!("  Pending reports:     {}", summary.pending_reports);
                println!("  Validated yesterday: {}", summary.validated_yesterday);
                for level in RiskLevel::ALL {
                    println!("  {:<6} risk wards:   {}", level.as_str(), summary.wards_at(level));
                }
                println!("  Sent to {} authorities", delivery.sent);
            })
        }

        Commands::SetRisk { ward, level } => {
            let services = Services::open(&cli.data_path).await?;
            let change = services
                .risk(RiskPolicy::Manual)
                .apply_risk_level(WardId(ward), level.into())
                .await?;
            print_output(&change, format, || {
                println!("Ward {}: {} -> {}", change.ward_id, change.previous, change.current);
                if change.escalated_to_high() {
                    println!("  Escalation alert sent to ward subscribers");
                }
            })
        }

        Commands::Reassess { policy } => {
            let policy = match policy {
                PolicyArg::Manual => RiskPolicy::Manual,
                PolicyArg::Automatic => RiskPolicy::Automatic,
            };
            let services = Services::open(&cli.data_path).await?;
            let changes = services.risk(policy).reassess().await?;
            print_output(&changes, format, || {
                if policy == RiskPolicy::Manual {
                    println!("Risk policy is manual; ward levels were not changed");
                    return;
                }
                println!("{} ward(s) reclassified", changes.len());
                for change in &changes {
                    println!("  Ward {}: {} -> {}", change.ward_id, change.previous, change.current);
                }
            })
        }

        Commands::LoadWards { file } => {
            let store = FloodStore::open(&cli.data_path).await?;
            let wards = parse_wards(&read_json(&file).await?)?;
            for ward in &wards {
                store.upsert_ward(ward.clone()).await?;
            }
            println!("Loaded {} ward(s) from {}", wards.len(), file.display());
            Ok(())
        }

        Commands::ImportHistory { file } => {
            let store = FloodStore::open(&cli.data_path).await?;
            let history: HistoryFile = serde_json::from_value(read_json(&file).await?)?;
            let (events, stats) = (history.events.len(), history.year_stats.len());
            for event in history.events {
                store.add_event(event).await?;
            }
            for row in history.year_stats {
                store.upsert_year_stats(row).await?;
            }
            println!("Imported {} event(s) and {} yearly statistic(s)", events, stats);
            Ok(())
        }

        Commands::CreateUser {
            id,
            username,
            email,
            role,
            subscribe,
        } => {
            let store = FloodStore::open(&cli.data_path).await?;
            let user_id = UserId::new(id);
            let existing = store.get_user(&user_id).await?;

            let mut user = UserRecord::new(user_id, username, role.into());
            if let Some(previous) = &existing {
                user.created_at = previous.created_at;
            }
            if let Some(email) = email {
                user = user.with_email(email);
            }
            for ward_id in subscribe {
                user = user.subscribe(WardId(ward_id));
            }

            store.upsert_user(user.clone()).await?;
            let verb = if existing.is_some() { "Updated" } else { "Created" };
            print_output(&user, format, || {
                println!(
                    "{} {} user '{}' ({})",
                    verb,
                    user.role.as_str(),
                    user.username,
                    user.user_id
                );
            })
        }

        Commands::PruneEmailLog { days } => {
            let store = FloodStore::open(&cli.data_path).await?;
            let cutoff = Utc::now() - Duration::days(i64::from(days));
            let removed = store.prune_emails(cutoff).await?;
            tracing::info!(removed, %cutoff, "Pruned email log");
            println!("Removed {} email log entries older than {} days", removed, days);
            Ok(())
        }

        Commands::IssueToken {
            user,
            role,
            ttl_hours,
        } => {
            let jwt = JwtConfig::try_from_env().map_err(|e| CliError::config(e.message))?;
            let claims = AuthClaims::new(user, &[role.into()], ttl_hours * 3600);
            println!("{}", issue_token(&claims, &jwt)?);
            Ok(())
        }
    }
}

async fn read_json(path: &Path) -> CliResult<Value> {
    let raw = tokio::fs::read_to_string(path).await?;
    Ok(serde_json::from_str(&raw)?)
}

/// History import file
#[derive(Debug, Default, Deserialize)]
struct HistoryFile {
    #[serde(default)]
    events: Vec<HistoricalFloodEvent>,
    #[serde(default)]
    year_stats: Vec<WardYearStats>,
}

/// Wards from a GeoJSON FeatureCollection. Each feature needs an integer
/// `id` (or `ward_id`) and a `name` property.
fn parse_wards(doc: &Value) -> CliResult<Vec<WardRecord>> {
    let features = doc
        .get("features")
        .and_then(Value::as_array)
        .ok_or_else(|| CliError::invalid_arg("expected a GeoJSON FeatureCollection"))?;

    features
        .iter()
        .enumerate()
        .map(|(index, feature)| -> CliResult<WardRecord> {
            let props = feature.get("properties").cloned().unwrap_or(Value::Null);
            let id = props
                .get("id")
                .or_else(|| props.get("ward_id"))
                .and_then(Value::as_u64)
                .ok_or_else(|| {
                    FloodError::validation(format!("feature {} has no integer id", index))
                })?;
            let name = props
                .get("name")
                .and_then(Value::as_str)
                .map(str::trim)
                .filter(|n| !n.is_empty())
                .ok_or_else(|| FloodError::validation(format!("feature {} has no name", index)))?;

            let mut ward = WardRecord::new(
                WardId(id),
                name,
                feature.get("geometry").cloned().unwrap_or(Value::Null),
            );
            ward.population = props.get("population").and_then(Value::as_u64).unwrap_or(0);
            ward.critical_infrastructure = props
                .get("critical_infrastructure")
                .and_then(Value::as_bool)
                .unwrap_or(false);
            if let Some(level) = props
                .get("current_risk_level")
                .and_then(Value::as_str)
                .and_then(RiskLevel::parse)
            {
                ward.current_risk_level = level;
            }
            Ok(ward)
        })
        .collect()
}
