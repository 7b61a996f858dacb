//! Command-line surface.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

use plugdash_domain::automation::{
    AutomationRuleUpdate, CarbonLevel, Comparison, DayCode, RuleAction, RuleDraft, TriggerType,
};
use plugdash_domain::id::{HardwareName, RuleId};
use plugdash_domain::usage::Lookback;

#[derive(Debug, Parser)]
#[command(name = "plugdash", version, about = "Monitor and automate smart plugs")]
pub struct Cli {
    /// Configuration file.
    #[arg(long, global = true, default_value = "plugdash.toml")]
    pub config: PathBuf,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Log in and remember the access token.
    Login {
        username: String,
        /// Read from stdin when omitted.
        #[arg(long)]
        password: Option<String>,
    },
    /// Forget the stored access token.
    Logout,
    /// Show who the stored token belongs to.
    Whoami,
    /// List, edit and switch plugs.
    #[command(subcommand)]
    Devices(DeviceCommand),
    /// Manage automation rules.
    #[command(subcommand)]
    Rules(RuleCommand),
    /// Browse the audit log.
    Audit {
        #[arg(long)]
        device: Option<String>,
        #[arg(long, default_value_t = 1)]
        page: usize,
        /// List the devices that appear in the log instead.
        #[arg(long, conflicts_with_all = ["device", "page"])]
        devices: bool,
    },
    /// Show notifications.
    Notifications {
        /// Mark everything read afterwards.
        #[arg(long)]
        mark_read: bool,
    },
    /// Hourly usage, carbon intensity and price for one plug.
    Analytics {
        hardware_name: HardwareName,
        #[arg(long, default_value_t = Lookback::default())]
        lookback: Lookback,
    },
    /// Overview cards.
    Dashboard,
    /// Change the account password. Missing fields are read from stdin.
    Password {
        #[arg(long)]
        current: Option<String>,
        #[arg(long = "new")]
        new_password: Option<String>,
        #[arg(long)]
        confirm: Option<String>,
    },
}

#[derive(Debug, Subcommand)]
pub enum DeviceCommand {
    /// List plugs with their power state and draw.
    List {
        #[arg(long)]
        room: Option<String>,
        #[arg(long)]
        device: Option<HardwareName>,
    },
    /// Rename or move a plug.
    Set {
        hardware_name: HardwareName,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        room: Option<String>,
        #[arg(long)]
        tag: Option<String>,
    },
    /// Flip a plug's power.
    Toggle { hardware_name: HardwareName },
    /// Rooms in use.
    Rooms,
    /// Tags in use.
    Tags,
    /// Keep refreshing the device list until interrupted.
    Watch {
        /// Seconds between refreshes; defaults to the configured interval.
        #[arg(long)]
        interval: Option<u64>,
    },
}

#[derive(Debug, Subcommand)]
pub enum RuleCommand {
    /// List rules grouped by trigger type.
    List {
        #[arg(long)]
        device: Option<HardwareName>,
    },
    /// Create a rule.
    Add(AddRule),
    /// Change a rule's action, trigger or enabled flag.
    Edit(EditRule),
    /// Enable or disable a rule.
    Toggle { id: RuleId },
    Delete { id: RuleId },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum TriggerArg {
    Schedule,
    Price,
    Usage,
    Carbon,
}

impl From<TriggerArg> for TriggerType {
    fn from(value: TriggerArg) -> Self {
        match value {
            TriggerArg::Schedule => Self::Schedule,
            TriggerArg::Price => Self::Price,
            TriggerArg::Usage => Self::Usage,
            TriggerArg::Carbon => Self::Carbon,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ActionArg {
    On,
    Off,
}

impl From<ActionArg> for RuleAction {
    fn from(value: ActionArg) -> Self {
        match value {
            ActionArg::On => Self::PowerOn,
            ActionArg::Off => Self::PowerOff,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OperatorArg {
    Gt,
    Lt,
}

impl From<OperatorArg> for Comparison {
    fn from(value: OperatorArg) -> Self {
        match value {
            OperatorArg::Gt => Self::GreaterThan,
            OperatorArg::Lt => Self::LessThan,
        }
    }
}

#[derive(Debug, Args)]
pub struct AddRule {
    pub hardware_name: HardwareName,
    #[arg(long, value_enum)]
    pub trigger: TriggerArg,
    /// Defaults to `off` for usage rules and `on` otherwise.
    #[arg(long, value_enum)]
    pub action: Option<ActionArg>,
    /// Schedule time, `HH:MM`.
    #[arg(long)]
    pub time: Option<String>,
    /// Schedule days, e.g. `M,W,F`.
    #[arg(long, value_delimiter = ',')]
    pub days: Vec<DayCode>,
    #[arg(long, value_enum)]
    pub operator: Option<OperatorArg>,
    /// Price threshold in pence or usage threshold in Wh.
    #[arg(long)]
    pub amount: Option<String>,
    #[arg(long)]
    pub level: Option<CarbonLevel>,
}

impl AddRule {
    /// Fill a rule form from the arguments; validation happens later.
    #[must_use]
    pub fn into_draft(self) -> RuleDraft {
        let mut draft = RuleDraft::new(self.hardware_name);
        let trigger_type = TriggerType::from(self.trigger);
        draft.set_trigger_type(trigger_type);
        if let Some(action) = self.action {
            draft.action = action.into();
        }
        draft.time = self.time.unwrap_or_default();
        select_days(&mut draft, self.days);
        if let Some(operator) = self.operator {
            draft.operator = operator.into();
        }
        set_amount(&mut draft, self.amount.unwrap_or_default());
        draft.carbon_level = self.level;
        draft
    }
}

/// Replace the day selection, keeping the given order without repeats.
fn select_days(draft: &mut RuleDraft, days: Vec<DayCode>) {
    draft.days.clear();
    for day in days {
        if !draft.days.contains(&day) {
            draft.toggle_day(day);
        }
    }
}

/// Put the amount in the field read by the draft's trigger type.
fn set_amount(draft: &mut RuleDraft, amount: String) {
    match draft.trigger_type {
        TriggerType::Price => draft.price_amount = amount,
        TriggerType::Usage => draft.usage_amount = amount,
        TriggerType::Schedule | TriggerType::Carbon => {}
    }
}

#[derive(Debug, Args)]
pub struct EditRule {
    pub id: RuleId,
    #[arg(long, value_enum)]
    pub action: Option<ActionArg>,
    /// Switch to another trigger type; its fields must then be given too.
    #[arg(long, value_enum)]
    pub trigger: Option<TriggerArg>,
    #[arg(long)]
    pub time: Option<String>,
    #[arg(long, value_delimiter = ',')]
    pub days: Vec<DayCode>,
    #[arg(long, value_enum)]
    pub operator: Option<OperatorArg>,
    #[arg(long)]
    pub amount: Option<String>,
    #[arg(long)]
    pub level: Option<CarbonLevel>,
    #[arg(long, conflicts_with = "disable")]
    pub enable: bool,
    #[arg(long)]
    pub disable: bool,
}

impl EditRule {
    /// Whether any argument touches the trigger.
    #[must_use]
    pub fn changes_trigger(&self) -> bool {
        self.trigger.is_some()
            || self.time.is_some()
            || !self.days.is_empty()
            || self.operator.is_some()
            || self.amount.is_some()
            || self.level.is_some()
    }

    /// Overlay the trigger arguments on a draft of the stored rule.
    ///
    /// Switching type starts the trigger fields over, so a stale value of
    /// the previous type never leaks into the new one.
    pub fn apply_to(&self, draft: &mut RuleDraft) {
        if let Some(trigger) = self.trigger {
            let trigger_type = TriggerType::from(trigger);
            if trigger_type != draft.trigger_type {
                let action = draft.action;
                let hardware_name = draft.hardware_name.take();
                *draft = RuleDraft {
                    hardware_name,
                    action,
                    trigger_type,
                    ..RuleDraft::default()
                };
            }
        }
        if let Some(time) = &self.time {
            draft.time.clone_from(time);
        }
        if !self.days.is_empty() {
            select_days(draft, self.days.clone());
        }
        if let Some(operator) = self.operator {
            draft.operator = operator.into();
        }
        if let Some(amount) = &self.amount {
            set_amount(draft, amount.clone());
        }
        if self.level.is_some() {
            draft.carbon_level = self.level;
        }
    }

    /// The non-trigger part of the update.
    #[must_use]
    pub fn update(&self) -> AutomationRuleUpdate {
        let enabled = match (self.enable, self.disable) {
            (true, _) => Some(true),
            (_, true) => Some(false),
            _ => None,
        };
        AutomationRuleUpdate {
            action: self.action.map(Into::into),
            enabled,
            ..AutomationRuleUpdate::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use plugdash_domain::automation::Trigger;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("plugdash").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn should_verify_cli_definition() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn should_default_config_path_and_lookback() {
        let cli = parse(&["analytics", "plug_1"]);
        assert_eq!(cli.config, PathBuf::from("plugdash.toml"));
        let Command::Analytics {
            hardware_name,
            lookback,
        } = cli.command
        else {
            panic!("expected analytics");
        };
        assert_eq!(hardware_name.as_str(), "plug_1");
        assert_eq!(lookback, Lookback::OneDay);
    }

    #[test]
    fn should_parse_lookback_code() {
        let cli = parse(&["analytics", "plug_1", "--lookback", "7D", "--config", "x.toml"]);
        assert_eq!(cli.config, PathBuf::from("x.toml"));
        assert!(matches!(
            cli.command,
            Command::Analytics {
                lookback: Lookback::SevenDays,
                ..
            }
        ));
    }

    #[test]
    fn should_reject_unknown_lookback() {
        assert!(Cli::try_parse_from(["plugdash", "analytics", "plug_1", "--lookback", "2W"]).is_err());
    }

    #[test]
    fn should_reject_empty_hardware_name() {
        assert!(Cli::try_parse_from(["plugdash", "devices", "toggle", " "]).is_err());
    }

    #[test]
    fn should_build_schedule_draft_from_arguments() {
        let cli = parse(&[
            "rules", "add", "plug_1", "--trigger", "schedule", "--time", "18:00", "--days",
            "M,W,F,M",
        ]);
        let Command::Rules(RuleCommand::Add(add)) = cli.command else {
            panic!("expected rules add");
        };
        let draft = add.into_draft();
        assert_eq!(draft.action, RuleAction::PowerOn);
        assert_eq!(
            draft.validate().unwrap(),
            Trigger::Schedule {
                time: chrono::NaiveTime::from_hms_opt(18, 0, 0).unwrap(),
                days: vec![DayCode::Monday, DayCode::Wednesday, DayCode::Friday],
            }
        );
    }

    #[test]
    fn should_default_usage_rule_to_power_off() {
        let cli = parse(&["rules", "add", "plug_1", "--trigger", "usage", "--amount", "100"]);
        let Command::Rules(RuleCommand::Add(add)) = cli.command else {
            panic!("expected rules add");
        };
        let draft = add.into_draft();
        assert_eq!(draft.action, RuleAction::PowerOff);
        assert_eq!(draft.encode_value(), "GT,100,30");
    }

    #[test]
    fn should_parse_price_operator_and_carbon_level() {
        let cli = parse(&[
            "rules", "add", "plug_1", "--trigger", "price", "--operator", "gt", "--amount", "20",
            "--action", "off",
        ]);
        let Command::Rules(RuleCommand::Add(add)) = cli.command else {
            panic!("expected rules add");
        };
        let draft = add.into_draft();
        assert_eq!(draft.operator, Comparison::GreaterThan);
        assert_eq!(draft.action, RuleAction::PowerOff);

        let cli = parse(&["rules", "add", "plug_1", "--trigger", "carbon", "--level", "very-high"]);
        let Command::Rules(RuleCommand::Add(add)) = cli.command else {
            panic!("expected rules add");
        };
        assert_eq!(add.into_draft().carbon_level, Some(CarbonLevel::VeryHigh));
    }

    #[test]
    fn should_reject_conflicting_enable_flags() {
        assert!(
            Cli::try_parse_from(["plugdash", "rules", "edit", "3", "--enable", "--disable"]).is_err()
        );
    }

    fn edit(args: &[&str]) -> EditRule {
        let cli = parse(&[&["rules", "edit", "3"][..], args].concat());
        let Command::Rules(RuleCommand::Edit(edit)) = cli.command else {
            panic!("expected rules edit");
        };
        edit
    }

    fn stored_schedule() -> RuleDraft {
        let mut draft = RuleDraft::new(HardwareName::new("plug_1").unwrap());
        draft.time = "18:00".to_string();
        select_days(&mut draft, vec![DayCode::Monday, DayCode::Friday]);
        draft
    }

    #[test]
    fn should_leave_trigger_alone_when_only_flags_change() {
        let edit = edit(&["--action", "off", "--disable"]);
        assert!(!edit.changes_trigger());
        let update = edit.update();
        assert_eq!(update.action, Some(RuleAction::PowerOff));
        assert_eq!(update.enabled, Some(false));
        assert_eq!(update.trigger_type, None);
        assert_eq!(update.value, None);
    }

    #[test]
    fn should_overlay_schedule_time_on_stored_rule() {
        let edit = edit(&["--time", "07:30"]);
        assert!(edit.changes_trigger());
        let mut draft = stored_schedule();
        edit.apply_to(&mut draft);
        assert_eq!(draft.encode_value(), "07:30M.F");
        assert!(draft.validate().is_ok());
    }

    #[test]
    fn should_require_new_fields_when_switching_trigger_type() {
        let mut draft = stored_schedule();
        edit(&["--trigger", "price"]).apply_to(&mut draft);
        assert_eq!(draft.trigger_type, TriggerType::Price);
        assert!(draft.validate().is_err());

        let mut draft = stored_schedule();
        edit(&["--trigger", "price", "--amount", "15"]).apply_to(&mut draft);
        assert_eq!(draft.encode_value(), "LT,15");
        assert_eq!(draft.action, RuleAction::PowerOn);
    }

    #[test]
    fn should_parse_room_and_tag_listings() {
        assert!(matches!(
            parse(&["devices", "rooms"]).command,
            Command::Devices(DeviceCommand::Rooms)
        ));
        assert!(matches!(
            parse(&["devices", "tags"]).command,
            Command::Devices(DeviceCommand::Tags)
        ));
    }

    #[test]
    fn should_reject_audit_devices_with_filter() {
        assert!(matches!(
            parse(&["audit", "--devices"]).command,
            Command::Audit { devices: true, .. }
        ));
        assert!(
            Cli::try_parse_from(["plugdash", "audit", "--devices", "--device", "plug_1"]).is_err()
        );
    }

    #[test]
    fn should_parse_notifications_flag() {
        let cli = parse(&["notifications", "--mark-read"]);
        assert!(matches!(
            cli.command,
            Command::Notifications { mark_read: true }
        ));
    }
}
