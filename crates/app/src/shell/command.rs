//! Parsing of shell input lines.

use std::path::PathBuf;

use procura_domain::workflow::{
    FilterCondition, GlTransactionType, OrderStatus, ProcessingState, TaskFilter, TaskListKind,
    TaskQuery, TaskRef,
};
use serde::de::DeserializeOwned;
use thiserror::Error;

/// Why an input line was not understood.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// First word is not a command.
    #[error("unknown command '{0}', type 'help' for a list")]
    Unknown(String),

    /// Wrong arguments for a known command.
    #[error("usage: {0}")]
    Usage(&'static str),

    /// An argument has the wrong shape.
    #[error("invalid {what}: {value}")]
    Invalid {
        /// Which argument.
        what: &'static str,
        /// What was given.
        value: String,
    },
}

/// Task-level operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskCommand {
    /// Available actions.
    Actions(TaskRef),
    /// Step history.
    History(TaskRef),
    /// Assign to the current user.
    Claim(TaskRef),
    /// Return to the pool.
    Release(TaskRef),
    /// Perform a workflow action.
    Perform(TaskRef, String),
    /// Save the process diagram to a file.
    Diagram {
        /// Process instance id.
        process_id: String,
        /// Where to write the image.
        output: PathBuf,
    },
    /// Purchase order behind a task.
    Order(String),
    /// Requisition form HTML.
    Rrf(String),
}

/// Purchase order lookups.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OrderQuery {
    /// Every order.
    All,
    /// One order.
    Po(String),
    /// Orders in a state.
    Status(OrderStatus),
    /// Orders raised by someone.
    Requester(String),
    /// Aggregates.
    Stats,
}

/// Inventory lookups.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InventoryQuery {
    /// Every item.
    All,
    /// One item.
    Id(String),
    /// Items by type and brand.
    Search {
        /// Item type.
        item_type: Option<String>,
        /// Brand.
        brand: Option<String>,
    },
    /// Aggregates.
    Stats,
}

/// General-ledger lookups.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LedgerQuery {
    /// Every entry.
    All,
    /// One entry.
    Id(i64),
    /// Entries for a reference.
    Reference(String),
    /// Entries of a kind.
    Type(GlTransactionType),
    /// Entries for a requester.
    Requester(String),
    /// Entries from the last days.
    Recent(u32),
    /// Aggregates.
    Stats,
}

/// Email thread lookups.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EmailQuery {
    /// Messages for a PO.
    Po(String),
    /// Reply tree for a PO.
    Hierarchy(String),
    /// Thread statistics for a PO.
    Stats(String),
    /// Messages from a sender.
    Sender(String),
    /// Procurement messages.
    Procurement,
    /// Messages in a processing state.
    State(ProcessingState),
    /// Messages from the last days.
    Recent(u32),
    /// PO numbers with mail.
    PoNumbers,
    /// Full-text search.
    Search(String),
}

/// One line of shell input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShellCommand {
    /// Print the command list.
    Help,
    /// Leave the shell.
    Quit,
    /// Show the signed-in user.
    WhoAmI,
    /// Refresh the token now.
    Refresh,
    /// Sign out.
    Logout,
    /// The address the provider redirected the browser to.
    Callback(String),
    /// Page through a task list.
    Tasks(TaskListKind, TaskQuery),
    /// Operate on one task.
    Task(TaskCommand),
    /// Purchase orders.
    Orders(OrderQuery),
    /// Inventory.
    Inventory(InventoryQuery),
    /// General ledger.
    Ledger(LedgerQuery),
    /// Email threads.
    Emails(EmailQuery),
}

const TASKS_USAGE: &str =
    "tasks [ready|in-progress|own] [offset=N] [limit=N] [title=TEXT]";
const TASK_USAGE: &str = "task actions|history|claim|release MODULE KEY REF \
     | task perform MODULE KEY REF ACTION | task diagram PROCESS_ID FILE \
     | task order PO | task rrf PO";
const ORDERS_USAGE: &str = "orders [all|po PO|status STATUS|requester EMAIL|stats]";
const INVENTORY_USAGE: &str = "inventory [all|id ID|search [type=T] [brand=B]|stats]";
const GL_USAGE: &str = "gl [all|id N|ref REF|type TYPE|requester EMAIL|recent [DAYS]|stats]";
const EMAILS_USAGE: &str = "emails po|hierarchy|stats PO | emails sender EMAIL \
     | emails procurement | emails state STATE | emails recent [DAYS] \
     | emails po-numbers | emails search TEXT";

/// Command summary printed by `help`.
pub const HELP: &str = "\
Commands:
  whoami                     signed-in user and token status
  refresh                    refresh the access token now
  logout                     sign out
  tasks ...                  list tasks        (tasks [ready|in-progress|own] [offset=N] [limit=N] [title=TEXT])
  task ...                   act on a task     (actions|history|claim|release|perform|diagram|order|rrf)
  orders ...                 purchase orders   (all|po|status|requester|stats)
  inventory ...              inventory items   (all|id|search|stats)
  gl ...                     general ledger    (all|id|ref|type|requester|recent|stats)
  emails ...                 PO email threads  (po|hierarchy|stats|sender|procurement|state|recent|po-numbers|search)
  <callback URL>             finish signing in
  help, quit";

impl ShellCommand {
    /// Parses one input line; blank lines yield `None`.
    ///
    /// # Errors
    ///
    /// Returns a `ParseError` describing what was wrong with the line.
    pub fn parse(line: &str) -> Result<Option<Self>, ParseError> {
        let line = line.trim();
        if line.starts_with("http://") || line.starts_with("https://") {
            return Ok(Some(Self::Callback(line.to_string())));
        }
        let words: Vec<&str> = line.split_whitespace().collect();
        let Some((&head, args)) = words.split_first() else {
            return Ok(None);
        };

        let command = match head {
            "help" | "?" => Self::Help,
            "quit" | "exit" => Self::Quit,
            "whoami" => Self::WhoAmI,
            "refresh" => Self::Refresh,
            "logout" => Self::Logout,
            "tasks" => parse_tasks(args)?,
            "task" => Self::Task(parse_task(args)?),
            "orders" => Self::Orders(parse_orders(args)?),
            "inventory" => Self::Inventory(parse_inventory(args)?),
            "gl" => Self::Ledger(parse_ledger(args)?),
            "emails" => Self::Emails(parse_emails(args)?),
            other => return Err(ParseError::Unknown(other.to_string())),
        };
        Ok(Some(command))
    }

    /// Console route the command belongs to, checked by the auth gate
    /// before it runs. `None` for commands that need no session.
    #[must_use]
    pub fn route(&self) -> Option<String> {
        let route = match self {
            Self::Help | Self::Quit | Self::Callback(_) | Self::WhoAmI | Self::Logout => {
                return None;
            }
            Self::Refresh => "/dashboard".to_string(),
            Self::Tasks(kind, _) => format!("/tasks/{}", kind.path_segment()),
            Self::Task(
                TaskCommand::Actions(task)
                | TaskCommand::History(task)
                | TaskCommand::Claim(task)
                | TaskCommand::Release(task)
                | TaskCommand::Perform(task, _),
            ) => format!("/tasks/detail/{}/{}/{}", task.module, task.key, task.reference),
            Self::Task(_) => "/tasks".to_string(),
            Self::Orders(_) => "/procurement".to_string(),
            Self::Inventory(_) => "/inventory".to_string(),
            Self::Ledger(_) => "/gl".to_string(),
            Self::Emails(EmailQuery::Po(po) | EmailQuery::Hierarchy(po) | EmailQuery::Stats(po)) => {
                format!("/emails/thread/{po}")
            }
            Self::Emails(_) => "/emails".to_string(),
        };
        Some(route)
    }

    /// Notice text used when a failed call carries no message of its own.
    #[must_use]
    pub const fn failure_message(&self) -> &'static str {
        match self {
            Self::Tasks(..) => "Failed to load tasks.",
            Self::Task(TaskCommand::Claim(_)) => "Failed to claim task.",
            Self::Task(TaskCommand::Release(_)) => "Failed to release task.",
            Self::Task(TaskCommand::Perform(..)) => "Failed to perform action.",
            Self::Task(_) => "Failed to load task details.",
            Self::Orders(_) => "Failed to load purchase orders.",
            Self::Inventory(_) => "Failed to load inventory.",
            Self::Ledger(_) => "Failed to load ledger entries.",
            Self::Emails(_) => "Failed to load emails.",
            Self::Help
            | Self::Quit
            | Self::WhoAmI
            | Self::Refresh
            | Self::Logout
            | Self::Callback(_) => "Request failed.",
        }
    }
}

fn parse_tasks(args: &[&str]) -> Result<ShellCommand, ParseError> {
    let (kind, options) = match args.first() {
        Some(&"ready") => (TaskListKind::Ready, &args[1..]),
        Some(&"in-progress") => (TaskListKind::InProgress, &args[1..]),
        Some(&"own") => (TaskListKind::Own, &args[1..]),
        _ => (TaskListKind::Ready, args),
    };

    let mut query = TaskQuery::default();
    let mut title = Vec::new();
    let mut in_title = false;
    for option in options {
        if let Some(value) = option.strip_prefix("offset=") {
            query.offset = number("offset", value)?;
            in_title = false;
        } else if let Some(value) = option.strip_prefix("limit=") {
            query.limit = number("limit", value)?;
            in_title = false;
        } else if let Some(value) = option.strip_prefix("title=") {
            title.push(value);
            in_title = true;
        } else if in_title {
            title.push(*option);
        } else {
            return Err(ParseError::Usage(TASKS_USAGE));
        }
    }
    let title = title.join(" ");
    if !title.is_empty() {
        query = query.with_filter(TaskFilter::default().with("title", FilterCondition::text_contains(title)));
    }
    Ok(ShellCommand::Tasks(kind, query))
}

fn parse_task(args: &[&str]) -> Result<TaskCommand, ParseError> {
    let task_ref = |rest: &[&str]| match rest {
        [module, key, reference] => Ok(TaskRef::new(*module, *key, *reference)),
        _ => Err(ParseError::Usage(TASK_USAGE)),
    };
    match args {
        ["actions", rest @ ..] => task_ref(rest).map(TaskCommand::Actions),
        ["history", rest @ ..] => task_ref(rest).map(TaskCommand::History),
        ["claim", rest @ ..] => task_ref(rest).map(TaskCommand::Claim),
        ["release", rest @ ..] => task_ref(rest).map(TaskCommand::Release),
        ["perform", module, key, reference, action] => Ok(TaskCommand::Perform(
            TaskRef::new(*module, *key, *reference),
            (*action).to_string(),
        )),
        ["diagram", process_id, output] => Ok(TaskCommand::Diagram {
            process_id: (*process_id).to_string(),
            output: PathBuf::from(*output),
        }),
        ["order", po] => Ok(TaskCommand::Order((*po).to_string())),
        ["rrf", po] => Ok(TaskCommand::Rrf((*po).to_string())),
        _ => Err(ParseError::Usage(TASK_USAGE)),
    }
}

fn parse_orders(args: &[&str]) -> Result<OrderQuery, ParseError> {
    match args {
        [] | ["all"] => Ok(OrderQuery::All),
        ["po", po] => Ok(OrderQuery::Po((*po).to_string())),
        ["status", status] => wire_enum("order status", status).map(OrderQuery::Status),
        ["requester", email] => Ok(OrderQuery::Requester((*email).to_string())),
        ["stats"] => Ok(OrderQuery::Stats),
        _ => Err(ParseError::Usage(ORDERS_USAGE)),
    }
}

fn parse_inventory(args: &[&str]) -> Result<InventoryQuery, ParseError> {
    match args {
        [] | ["all"] => Ok(InventoryQuery::All),
        ["id", id] => Ok(InventoryQuery::Id((*id).to_string())),
        ["stats"] => Ok(InventoryQuery::Stats),
        ["search", criteria @ ..] => {
            let mut item_type = None;
            let mut brand = None;
            for criterion in criteria {
                if let Some(value) = criterion.strip_prefix("type=") {
                    item_type = Some(value.to_string());
                } else if let Some(value) = criterion.strip_prefix("brand=") {
                    brand = Some(value.to_string());
                } else {
                    return Err(ParseError::Usage(INVENTORY_USAGE));
                }
            }
            Ok(InventoryQuery::Search { item_type, brand })
        }
        _ => Err(ParseError::Usage(INVENTORY_USAGE)),
    }
}

fn parse_ledger(args: &[&str]) -> Result<LedgerQuery, ParseError> {
    match args {
        [] | ["all"] => Ok(LedgerQuery::All),
        ["id", id] => id
            .parse()
            .map(LedgerQuery::Id)
            .map_err(|_| invalid("ledger id", id)),
        ["ref", reference] => Ok(LedgerQuery::Reference((*reference).to_string())),
        ["type", kind] => wire_enum("transaction type", kind).map(LedgerQuery::Type),
        ["requester", email] => Ok(LedgerQuery::Requester((*email).to_string())),
        ["recent"] => Ok(LedgerQuery::Recent(procura_application::api::DEFAULT_LEDGER_DAYS)),
        ["recent", days] => number("days", days).map(LedgerQuery::Recent),
        ["stats"] => Ok(LedgerQuery::Stats),
        _ => Err(ParseError::Usage(GL_USAGE)),
    }
}

fn parse_emails(args: &[&str]) -> Result<EmailQuery, ParseError> {
    match args {
        ["po", po] => Ok(EmailQuery::Po((*po).to_string())),
        ["hierarchy", po] => Ok(EmailQuery::Hierarchy((*po).to_string())),
        ["stats", po] => Ok(EmailQuery::Stats((*po).to_string())),
        ["sender", email] => Ok(EmailQuery::Sender((*email).to_string())),
        ["procurement"] => Ok(EmailQuery::Procurement),
        ["state", state] => wire_enum("processing state", state).map(EmailQuery::State),
        ["recent"] => Ok(EmailQuery::Recent(procura_application::api::DEFAULT_EMAIL_DAYS)),
        ["recent", days] => number("days", days).map(EmailQuery::Recent),
        ["po-numbers"] => Ok(EmailQuery::PoNumbers),
        ["search", words @ ..] if !words.is_empty() => Ok(EmailQuery::Search(words.join(" "))),
        _ => Err(ParseError::Usage(EMAILS_USAGE)),
    }
}

fn number<T: std::str::FromStr>(what: &'static str, value: &str) -> Result<T, ParseError> {
    value.parse().map_err(|_| invalid(what, value))
}

/// Reads a wire enum from its name in any case, `-` or `_` separated.
fn wire_enum<T: DeserializeOwned>(what: &'static str, value: &str) -> Result<T, ParseError> {
    let name = value.to_ascii_uppercase().replace('-', "_");
    serde_json::from_value(serde_json::Value::String(name)).map_err(|_| invalid(what, value))
}

fn invalid(what: &'static str, value: &str) -> ParseError {
    ParseError::Invalid {
        what,
        value: value.to_string(),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn parse(line: &str) -> ShellCommand {
        ShellCommand::parse(line).unwrap().unwrap()
    }

    #[test]
    fn test_blank_and_unknown() {
        assert_eq!(ShellCommand::parse("   ").unwrap(), None);
        assert_eq!(
            ShellCommand::parse("approve everything"),
            Err(ParseError::Unknown("approve".to_string()))
        );
    }

    #[test]
    fn test_callback_url() {
        let line = "http://localhost:4200/tasks?state=abc&code=xyz";
        assert_eq!(parse(line), ShellCommand::Callback(line.to_string()));
        assert_eq!(parse(line).route(), None);
    }

    #[test]
    fn test_tasks_with_options() {
        let ShellCommand::Tasks(kind, query) = parse("tasks own offset=50 limit=25 title=dell laptop")
        else {
            panic!("expected tasks");
        };
        assert_eq!(kind, TaskListKind::Own);
        assert_eq!(query.offset, 50);
        assert_eq!(query.limit, 25);
        let pairs = query.to_query_pairs();
        assert!(pairs.contains(&("filter[title][filter]".to_string(), "dell laptop".to_string())));

        assert_eq!(parse("tasks"), ShellCommand::Tasks(TaskListKind::Ready, TaskQuery::default()));
        assert!(matches!(
            ShellCommand::parse("tasks limit=ten"),
            Err(ParseError::Invalid { what: "limit", .. })
        ));
    }

    #[test]
    fn test_task_commands() {
        let task = TaskRef::new("procurement", "PO_APPROVAL", "PO-2024-001");
        assert_eq!(
            parse("task claim procurement PO_APPROVAL PO-2024-001"),
            ShellCommand::Task(TaskCommand::Claim(task.clone()))
        );
        assert_eq!(
            parse("task perform procurement PO_APPROVAL PO-2024-001 approve"),
            ShellCommand::Task(TaskCommand::Perform(task, "approve".to_string()))
        );
        assert_eq!(
            ShellCommand::parse("task claim procurement"),
            Err(ParseError::Usage(TASK_USAGE))
        );
    }

    #[test]
    fn test_wire_enums() {
        assert_eq!(
            parse("orders status approved"),
            ShellCommand::Orders(OrderQuery::Status(OrderStatus::Approved))
        );
        assert_eq!(
            parse("emails state po-generated"),
            ShellCommand::Emails(EmailQuery::State(ProcessingState::PoGenerated))
        );
        assert_eq!(
            parse("gl type PURCHASE"),
            ShellCommand::Ledger(LedgerQuery::Type(GlTransactionType::Purchase))
        );
        assert!(matches!(
            ShellCommand::parse("orders status shipped"),
            Err(ParseError::Invalid { what: "order status", .. })
        ));
    }

    #[test]
    fn test_defaults_for_recent() {
        assert_eq!(parse("gl recent"), ShellCommand::Ledger(LedgerQuery::Recent(30)));
        assert_eq!(parse("emails recent"), ShellCommand::Emails(EmailQuery::Recent(7)));
        assert_eq!(parse("emails recent 14"), ShellCommand::Emails(EmailQuery::Recent(14)));
    }

    #[test]
    fn test_inventory_search() {
        assert_eq!(
            parse("inventory search brand=Dell"),
            ShellCommand::Inventory(InventoryQuery::Search {
                item_type: None,
                brand: Some("Dell".to_string())
            })
        );
    }

    #[test]
    fn test_routes() {
        assert_eq!(parse("tasks in-progress").route().as_deref(), Some("/tasks/in-progress"));
        assert_eq!(
            parse("task history procurement PO_APPROVAL PO-1").route().as_deref(),
            Some("/tasks/detail/procurement/PO_APPROVAL/PO-1")
        );
        assert_eq!(parse("emails hierarchy PO-1").route().as_deref(), Some("/emails/thread/PO-1"));
        assert_eq!(parse("emails procurement").route().as_deref(), Some("/emails"));
        assert_eq!(parse("gl stats").route().as_deref(), Some("/gl"));
        assert_eq!(parse("refresh").route().as_deref(), Some("/dashboard"));
        assert_eq!(parse("whoami").route(), None);
        assert_eq!(parse("help").route(), None);
    }
}
