//! Interactive session loop.
//!
//! Each command is checked by the auth gate for its console route before
//! it runs; a denied command has already started a login, and the user
//! finishes it by pasting the callback URL at the prompt.

mod command;

pub use command::{
    EmailQuery, HELP, InventoryQuery, LedgerQuery, OrderQuery, ParseError, ShellCommand,
    TaskCommand,
};

use anyhow::Context;
use procura_application::ApiError;
use procura_application::auth::Navigation;
use serde::Serialize;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};

use crate::console::Console;

/// Result of evaluating one input line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    /// Text to print.
    Output(String),
    /// Nothing to print; notices were already shown.
    Silent,
    /// Leave the shell.
    Exit,
}

/// The interactive shell over a [`Console`].
#[derive(Debug)]
pub struct Shell {
    console: Console,
}

impl Shell {
    /// Creates a shell.
    #[must_use]
    pub const fn new(console: Console) -> Self {
        Self { console }
    }

    /// The wired services.
    #[must_use]
    pub const fn console(&self) -> &Console {
        &self.console
    }

    /// Reads commands from stdin until `quit` or end of input.
    ///
    /// # Errors
    ///
    /// Returns an error if stdin or stdout fail.
    pub async fn run(&self) -> anyhow::Result<()> {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        let mut stdout = tokio::io::stdout();

        println!("Procura console. Type 'help' for commands.");
        loop {
            stdout.write_all(b"procura> ").await?;
            stdout.flush().await?;

            let Some(line) = lines.next_line().await.context("failed to read input")? else {
                break;
            };
            match self.evaluate(&line).await {
                Reply::Output(text) => println!("{text}"),
                Reply::Silent => {}
                Reply::Exit => break,
            }
        }
        Ok(())
    }

    /// Evaluates one input line.
    pub async fn evaluate(&self, line: &str) -> Reply {
        let command = match ShellCommand::parse(line) {
            Ok(Some(command)) => command,
            Ok(None) => return Reply::Silent,
            Err(error) => return Reply::Output(error.to_string()),
        };

        match command {
            ShellCommand::Help => Reply::Output(HELP.to_string()),
            ShellCommand::Quit => Reply::Exit,
            ShellCommand::Callback(url) => self.complete_login(&url).await,
            command => self.run_guarded(&command).await,
        }
    }

    async fn complete_login(&self, callback_url: &str) -> Reply {
        if let Err(error) = self.console.identity.complete_login(callback_url).await {
            self.console.errors.show_error(format!("Sign-in failed: {error}"));
            return Reply::Silent;
        }
        self.console.session.mirror_token().await;
        let session = self.console.session.session().await;
        Reply::Output(format!(
            "Signed in as {} ({}).",
            session.full_name, session.username
        ))
    }

    async fn run_guarded(&self, command: &ShellCommand) -> Reply {
        if let Some(route) = command.route() {
            match self.console.gate.check(&route).await {
                Ok(Navigation::Allow) => {}
                Ok(Navigation::Deny) => return Reply::Silent,
                Err(error) => {
                    self.console
                        .errors
                        .show_error(format!("Could not check the session: {error}"));
                    return Reply::Silent;
                }
            }
        }

        match self.execute(command).await {
            Ok(text) => Reply::Output(text),
            Err(error) => {
                match error.downcast_ref::<ApiError>() {
                    Some(api_error) => self
                        .console
                        .errors
                        .handle(api_error, Some(command.failure_message())),
                    None => self.console.errors.show_error(format!("{error:#}")),
                }
                Reply::Silent
            }
        }
    }

    async fn execute(&self, command: &ShellCommand) -> anyhow::Result<String> {
        let c = &self.console;
        match command {
            ShellCommand::WhoAmI => Ok(self.whoami().await),
            ShellCommand::Refresh => {
                let min_validity = c.config.refresh.min_validity_secs;
                Ok(if c.session.refresh_token(min_validity).await {
                    "Token refreshed.".to_string()
                } else {
                    "Token left unchanged.".to_string()
                })
            }
            ShellCommand::Logout => {
                c.session.logout().await?;
                Ok("Signed out.".to_string())
            }
            ShellCommand::Tasks(kind, query) => {
                let page = c.tasks.list(*kind, query).await?;
                let mut out = format!("{} task(s), showing {}:", page.last_row, page.rows.len());
                for task in &page.rows {
                    out.push_str(&format!(
                        "\n  {} {} {}  {} [{}]",
                        task.module, task.code, task.reference_key, task.title, task.step_name
                    ));
                }
                Ok(out)
            }
            ShellCommand::Task(task) => self.execute_task(task).await,
            ShellCommand::Orders(query) => match query {
                OrderQuery::All => pretty(&c.orders.all().await?),
                OrderQuery::Po(po) => pretty(&c.orders.by_po(po).await?),
                OrderQuery::Status(status) => pretty(&c.orders.by_status(*status).await?),
                OrderQuery::Requester(email) => pretty(&c.orders.by_requester(email).await?),
                OrderQuery::Stats => pretty(&c.orders.stats().await?),
            },
            ShellCommand::Inventory(query) => match query {
                InventoryQuery::All => pretty(&c.inventory.all().await?),
                InventoryQuery::Id(id) => pretty(&c.inventory.by_id(id).await?),
                InventoryQuery::Search { item_type, brand } => pretty(
                    &c.inventory
                        .search(item_type.as_deref(), brand.as_deref())
                        .await?,
                ),
                InventoryQuery::Stats => pretty(&c.inventory.stats().await?),
            },
            ShellCommand::Ledger(query) => match query {
                LedgerQuery::All => pretty(&c.ledger.all().await?),
                LedgerQuery::Id(id) => pretty(&c.ledger.by_id(*id).await?),
                LedgerQuery::Reference(reference) => pretty(&c.ledger.by_reference(reference).await?),
                LedgerQuery::Type(kind) => pretty(&c.ledger.by_type(*kind).await?),
                LedgerQuery::Requester(email) => pretty(&c.ledger.by_requester(email).await?),
                LedgerQuery::Recent(days) => pretty(&c.ledger.recent(*days).await?),
                LedgerQuery::Stats => pretty(&c.ledger.stats().await?),
            },
            ShellCommand::Emails(query) => match query {
                EmailQuery::Po(po) => pretty(&c.emails.by_po(po).await?),
                EmailQuery::Hierarchy(po) => pretty(&c.emails.hierarchy(po).await?),
                EmailQuery::Stats(po) => pretty(&c.emails.thread_stats(po).await?),
                EmailQuery::Sender(email) => pretty(&c.emails.by_sender(email).await?),
                EmailQuery::Procurement => pretty(&c.emails.procurement().await?),
                EmailQuery::State(state) => pretty(&c.emails.by_state(*state).await?),
                EmailQuery::Recent(days) => pretty(&c.emails.recent(*days).await?),
                EmailQuery::PoNumbers => pretty(&c.emails.po_numbers().await?),
                EmailQuery::Search(text) => pretty(&c.emails.search(text).await?),
            },
            ShellCommand::Help | ShellCommand::Quit | ShellCommand::Callback(_) => {
                Ok(String::new())
            }
        }
    }

    async fn execute_task(&self, command: &TaskCommand) -> anyhow::Result<String> {
        let tasks = &self.console.tasks;
        match command {
            TaskCommand::Actions(task) => pretty(&tasks.actions(task).await?),
            TaskCommand::History(task) => pretty(&tasks.history(task).await?),
            TaskCommand::Claim(task) => {
                tasks.claim(task).await?;
                self.console.errors.show_success("Task claimed.");
                Ok(format!("Claimed {}.", task.reference))
            }
            TaskCommand::Release(task) => {
                tasks.release(task).await?;
                self.console.errors.show_success("Task released.");
                Ok(format!("Released {}.", task.reference))
            }
            TaskCommand::Perform(task, action) => {
                let answer = tasks.perform(task, action).await?;
                self.console.errors.show_success("Action performed.");
                pretty(&answer)
            }
            TaskCommand::Diagram { process_id, output } => {
                let image = tasks.diagram(process_id).await?;
                tokio::fs::write(output, &image)
                    .await
                    .with_context(|| format!("failed to write {}", output.display()))?;
                Ok(format!("Wrote {} bytes to {}.", image.len(), output.display()))
            }
            TaskCommand::Order(po) => pretty(&tasks.procurement_order(po).await?),
            TaskCommand::Rrf(po) => Ok(tasks.rrf_content(po).await?),
        }
    }

    async fn whoami(&self) -> String {
        let c = &self.console;
        let session = c.session.session().await;
        let status = c
            .tokens
            .status(c.clock.now(), c.config.refresh.min_validity_secs)
            .await;
        if !session.is_logged_in {
            return status.display_message();
        }
        format!(
            "{} <{}>\n  user:   {} ({})\n  roles:  {}\n  token:  {}",
            session.full_name,
            session.email,
            session.username,
            session.user_id,
            session.roles.join(", "),
            status.display_message()
        )
    }
}

fn pretty<T: Serialize>(value: &T) -> anyhow::Result<String> {
    serde_json::to_string_pretty(value).context("failed to render response")
}
