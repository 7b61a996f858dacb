//! Wiring of services and execution of each subcommand.

use std::io::{BufRead, Write};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, bail};
use chrono::FixedOffset;

use plugdash_adapter_http_reqwest::HttpApiClient;
use plugdash_adapter_token_fs::FileTokenStore;
use plugdash_app::auth::AuthSession;
use plugdash_app::poller::Poller;
use plugdash_app::services::{
    AnalyticsService, AuditService, AutomationService, DeviceService, UserService,
};
use plugdash_domain::analytics::SyntheticTariff;
use plugdash_domain::audit::{AuditPage, AuditQuery, distinct_devices};
use plugdash_domain::automation::{AutomationRule, RuleDraft, group_by_trigger};
use plugdash_domain::device::{DeviceFilter, DeviceUpdate, unique_rooms, unique_tags};
use plugdash_domain::time;
use plugdash_domain::user::{Credentials, PasswordChange};

use crate::cli::{Command, DeviceCommand, RuleCommand};
use crate::config::Config;
use crate::render;

type Tokens = Arc<FileTokenStore>;
type Client = Arc<HttpApiClient<Tokens>>;

/// Every service the commands need, sharing one client and token store.
pub struct App {
    client: Client,
    session: AuthSession<Client, Tokens>,
    devices: DeviceService<Client>,
    automation: AutomationService<Client>,
    audit: AuditService<Client>,
    users: UserService<Client>,
    analytics: AnalyticsService<Client, Client, SyntheticTariff>,
    poll_interval: Duration,
    offset: FixedOffset,
}

impl App {
    /// # Errors
    ///
    /// Fails when the HTTP client cannot be built from the configuration.
    pub fn build(config: &Config) -> anyhow::Result<Self> {
        let tokens: Tokens = Arc::new(FileTokenStore::new(&config.auth.token_path));
        let client: Client = Arc::new(
            HttpApiClient::new(&config.api.base_url, config.timeout(), tokens)
                .context("building API client")?,
        );
        let offset = config.utc_offset();
        let seed = config.analytics.tariff_seed;

        Ok(Self {
            session: AuthSession::new(Arc::clone(&client), Arc::clone(client.tokens())),
            devices: DeviceService::new(Arc::clone(&client)),
            automation: AutomationService::new(Arc::clone(&client)),
            audit: AuditService::new(Arc::clone(&client)),
            users: UserService::new(Arc::clone(&client)),
            analytics: AnalyticsService::new(
                Arc::clone(&client),
                Arc::clone(&client),
                SyntheticTariff::new(seed),
                offset,
            )
            .with_synthetic_seed(seed),
            client,
            poll_interval: config.poll_interval(),
            offset,
        })
    }

    /// Run one subcommand, printing its result to stdout.
    ///
    /// # Errors
    ///
    /// Returns any service failure, or a "not logged in" error for
    /// commands that need a valid token.
    pub async fn run(&self, command: Command) -> anyhow::Result<()> {
        match command {
            Command::Login { username, password } => {
                let password = match password {
                    Some(password) => password,
                    None => prompt("Password")?,
                };
                let credentials = Credentials::new(username, password)?;
                self.session.login(&credentials).await?;
                println!("Logged in as {}", credentials.username);
            }
            Command::Logout => {
                self.session.logout().await?;
                println!("Logged out");
            }
            Command::Whoami => {
                self.require_login().await?;
                let username = self.session.username().await.unwrap_or_default();
                println!("{username}");
            }
            Command::Devices(command) => {
                self.require_login().await?;
                self.devices(command).await?;
            }
            Command::Rules(command) => {
                self.require_login().await?;
                self.rules(command).await?;
            }
            Command::Audit {
                device,
                page,
                devices,
            } => {
                self.require_login().await?;
                let entries = self.audit.audit_logs().await?;
                if devices {
                    let names = distinct_devices(&entries);
                    println!("{}", render::names(&names, "No devices in the log."));
                    return Ok(());
                }
                let mut query = AuditQuery::default();
                query.set_device(device);
                query.page = page;
                println!("{}", render::audit(&AuditPage::paginate(&entries, &query)));
            }
            Command::Notifications { mark_read } => {
                self.require_login().await?;
                let list = if mark_read {
                    self.audit.mark_all_read().await?
                } else {
                    self.audit.notifications().await?
                };
                println!("{}", render::notifications(&list));
            }
            Command::Analytics {
                hardware_name,
                lookback,
            } => {
                self.require_login().await?;
                let report = self
                    .analytics
                    .report(&hardware_name, lookback, time::now())
                    .await?;
                println!("{}", render::analytics(&report, self.offset));
            }
            Command::Dashboard => {
                self.require_login().await?;
                println!("{}", render::dashboard(&self.analytics.dashboard().await));
            }
            Command::Password {
                current,
                new_password,
                confirm,
            } => {
                self.require_login().await?;
                let change = PasswordChange {
                    current_password: or_prompt(current, "Current password")?,
                    new_password: or_prompt(new_password, "New password")?,
                    confirm_password: or_prompt(confirm, "Confirm new password")?,
                };
                self.users.change_password(&change).await?;
                println!("Password changed");
            }
        }
        Ok(())
    }

    async fn require_login(&self) -> anyhow::Result<()> {
        if !self.session.validate().await? {
            bail!("not logged in; run `plugdash login <username>` first");
        }
        Ok(())
    }

    async fn devices(&self, command: DeviceCommand) -> anyhow::Result<()> {
        match command {
            DeviceCommand::List { room, device } => {
                let devices = self.devices.list_devices().await?;
                let filter = DeviceFilter {
                    room,
                    selected: device,
                };
                println!("{}", render::devices(&filter.apply(&devices)));
            }
            DeviceCommand::Set {
                hardware_name,
                name,
                room,
                tag,
            } => {
                let update = DeviceUpdate {
                    friendly_name: name,
                    room,
                    tag,
                };
                let device = self.devices.update_device(&hardware_name, &update).await?;
                println!("{}", render::devices(&[&device]));
            }
            DeviceCommand::Toggle { hardware_name } => {
                let device = self.devices.get_device(&hardware_name).await?;
                let (_, notice) = self.devices.toggle_power(device).await?;
                println!("{}", render::notice(&notice));
            }
            DeviceCommand::Rooms => {
                let devices = self.devices.list_devices().await?;
                println!("{}", render::names(&unique_rooms(&devices), "No rooms."));
            }
            DeviceCommand::Tags => {
                let devices = self.devices.list_devices().await?;
                println!("{}", render::names(&unique_tags(&devices), "No tags."));
            }
            DeviceCommand::Watch { interval } => {
                let interval = interval.map_or(self.poll_interval, Duration::from_secs);
                self.watch_devices(interval).await;
            }
        }
        Ok(())
    }

    /// Reprint the device list on every successful poll until Ctrl-C.
    async fn watch_devices(&self, interval: Duration) {
        let client = Arc::clone(&self.client);
        let mut handle = Poller::new(interval).spawn(move || {
            let service = DeviceService::new(Arc::clone(&client));
            async move { service.list_devices().await }
        });
        tracing::info!(interval_secs = interval.as_secs(), "watching devices");

        loop {
            let changed = tokio::select! {
                changed = handle.changed() => changed.is_ok(),
                _ = tokio::signal::ctrl_c() => false,
            };
            if !changed {
                break;
            }
            if let Some(devices) = handle.latest() {
                let refs: Vec<_> = devices.iter().collect();
                println!("{}\n", render::devices(&refs));
            }
        }
        handle.stop();
    }

    async fn rules(&self, command: RuleCommand) -> anyhow::Result<()> {
        match command {
            RuleCommand::List { device } => {
                let mut rules = self.automation.list_rules().await?;
                if let Some(device) = device {
                    rules.retain(|rule| rule.hardware_name == device);
                }
                println!("{}", render::rules(&group_by_trigger(&rules)));
            }
            RuleCommand::Add(add) => {
                let rule = self.automation.create_rule(add.into_draft()).await?;
                println!("Created {}", render::rule(&rule));
            }
            RuleCommand::Edit(edit) => {
                let update = if edit.changes_trigger() {
                    let stored = self.automation.get_rule(edit.id).await?;
                    let mut draft = draft_of(&stored);
                    edit.apply_to(&mut draft);
                    let trigger = draft.validate()?;
                    edit.update().with_trigger(&trigger)
                } else {
                    edit.update()
                };
                let rule = self.automation.update_rule(edit.id, &update).await?;
                println!("Updated {}", render::rule(&rule));
            }
            RuleCommand::Toggle { id } => {
                let rule = self.automation.toggle_rule(id).await?;
                println!("{}", render::rule(&rule));
            }
            RuleCommand::Delete { id } => {
                self.automation.delete_rule(id).await?;
                println!("Deleted rule #{id}");
            }
        }
        Ok(())
    }
}

/// Editable form of a stored rule. A value that no longer decodes leaves
/// the trigger fields blank, so the edit has to supply them in full.
fn draft_of(rule: &AutomationRule) -> RuleDraft {
    RuleDraft::from_rule(rule).unwrap_or_else(|err| {
        tracing::warn!(id = %rule.id, error = %err, "stored rule value does not decode");
        RuleDraft {
            action: rule.action,
            trigger_type: rule.trigger_type,
            ..RuleDraft::new(rule.hardware_name.clone())
        }
    })
}

fn or_prompt(value: Option<String>, label: &str) -> anyhow::Result<String> {
    match value {
        Some(value) => Ok(value),
        None => prompt(label),
    }
}

/// Ask on stderr, read one line from stdin.
fn prompt(label: &str) -> anyhow::Result<String> {
    let mut stderr = std::io::stderr();
    write!(stderr, "{label}: ")?;
    stderr.flush()?;
    let mut line = String::new();
    std::io::stdin()
        .lock()
        .read_line(&mut line)
        .context("reading from stdin")?;
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}
