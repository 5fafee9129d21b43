//! Interactive menu over a [`LedgerService`].
//!
//! The shell only moves text between the console and the service; every rule
//! about what is valid lives in the service and the domain types.

use std::io::Write;
use std::sync::Arc;

use anyhow::Result;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio::sync::Notify;

use crate::application::{
    EditAction, EditOutcome, ExpensePatch, LedgerService, Synced, expense_lines,
};
use crate::domain::{Budget, format_money, parse_amount, parse_expense_date, validate_name};
use crate::storage::TableStore;

use super::render::{render_categories, render_expense_table, render_summary};

const MAIN_MENU: &str = "\
Expense Tracker Menu
1. Add Expense
2. Display Expenses
3. Edit/Remove Expense
4. Adjust Monthly Budget
5. Manage Categories
6. Summarize Expenses
7. Exit";

const CATEGORY_MENU: &str = "\
Category Management
1. Display Categories
2. Add Category
3. Edit Category
4. Delete Category
5. Back";

pub struct Shell<'a, S, R, W> {
    service: &'a mut LedgerService<S>,
    input: R,
    output: W,
    color: bool,
    ask_budget: bool,
    interrupt: Option<Arc<Notify>>,
    /// Set once input has ended or the session was interrupted.
    closed: bool,
}

impl<'a, S, R, W> Shell<'a, S, R, W>
where
    S: TableStore,
    R: AsyncBufRead + Unpin,
    W: Write,
{
    pub fn new(service: &'a mut LedgerService<S>, input: R, output: W) -> Self {
        Self {
            service,
            input,
            output,
            color: false,
            ask_budget: false,
            interrupt: None,
            closed: false,
        }
    }

    /// Color budget figures with ANSI escapes.
    pub fn with_color(mut self, color: bool) -> Self {
        self.color = color;
        self
    }

    /// Ask for the monthly budget before showing the menu.
    pub fn with_budget_prompt(mut self, ask: bool) -> Self {
        self.ask_budget = ask;
        self
    }

    /// End the session, saving pending changes, once `interrupt` is notified.
    pub fn with_interrupt(mut self, interrupt: Arc<Notify>) -> Self {
        self.interrupt = Some(interrupt);
        self
    }

    /// Run the menu until the user exits, input ends or the session is interrupted.
    pub async fn run(&mut self) -> Result<()> {
        if self.ask_budget {
            if let Some(budget) = self
                .prompt_valid("Enter your monthly budget: ", Budget::parse)
                .await?
            {
                self.service.set_budget(budget);
            }
        }

        while !self.closed {
            writeln!(self.output, "\n{}", MAIN_MENU)?;
            let Some(choice) = self.read_line("Select an option: ").await? else {
                break;
            };

            match choice.trim() {
                "1" => self.add_expense().await?,
                "2" => self.display_expenses()?,
                "3" => self.edit_or_remove_expense().await?,
                "4" => self.adjust_budget().await?,
                "5" => self.manage_categories().await?,
                "6" => self.summarize()?,
                "7" => break,
                _ => writeln!(self.output, "Invalid choice. Please try again.")?,
            }
        }

        if self.service.has_unsynced_changes() {
            match self.service.sync().await {
                Ok(()) => writeln!(self.output, "Unsaved changes written to the ledger store.")?,
                Err(err) => writeln!(self.output, "Changes could not be saved: {}", err)?,
            }
        }
        writeln!(self.output, "Goodbye!")?;
        Ok(())
    }

    async fn add_expense(&mut self) -> Result<()> {
        if self.service.categories().is_empty() {
            writeln!(
                self.output,
                "No categories yet. Add one under 'Manage Categories' first."
            )?;
            return Ok(());
        }

        let Some(name) = self
            .prompt_valid("Enter expense name: ", |s| {
                validate_name(s).map(|_| s.to_string())
            })
            .await?
        else {
            return Ok(());
        };
        let Some(amount) = self
            .prompt_valid("Enter expense amount: ", |s| {
                parse_amount(s).map(|_| s.to_string())
            })
            .await?
        else {
            return Ok(());
        };
        let Some(date) = self
            .prompt_valid("Enter expense date (DD-MM-YYYY): ", |s| {
                parse_expense_date(s).map(|_| s.to_string())
            })
            .await?
        else {
            return Ok(());
        };
        let Some(category) = self.choose_category().await? else {
            return Ok(());
        };

        match self
            .service
            .add_expense(&name, &amount, &date, category)
            .await
        {
            Ok(added) => {
                writeln!(self.output, "Expense added: {}", added.value)?;
                self.warn_if_unsynced(&added)?;
            }
            Err(err) => writeln!(self.output, "{}", err)?,
        }
        Ok(())
    }

    fn display_expenses(&mut self) -> Result<()> {
        let lines = expense_lines(self.service.expenses());
        write!(self.output, "{}", render_expense_table(&lines))?;
        Ok(())
    }

    async fn edit_or_remove_expense(&mut self) -> Result<()> {
        self.display_expenses()?;
        if self.service.expenses().is_empty() {
            return Ok(());
        }

        let Some(text) = self
            .read_line("Enter the index of the expense to edit/remove: ")
            .await?
        else {
            return Ok(());
        };
        let Ok(index) = text.trim().parse::<usize>() else {
            writeln!(self.output, "Invalid expense index.")?;
            return Ok(());
        };
        match self.service.expense(index) {
            Ok(expense) => writeln!(self.output, "Selected Expense: {}", expense)?,
            Err(err) => {
                writeln!(self.output, "{}", err)?;
                return Ok(());
            }
        }

        writeln!(self.output, "1. Edit Expense\n2. Remove Expense")?;
        let Some(choice) = self.read_line("Select an option (1 or 2): ").await? else {
            return Ok(());
        };
        let action = match choice.trim() {
            "1" => match self.read_patch().await? {
                Some(patch) => EditAction::Edit(patch),
                None => return Ok(()),
            },
            "2" => EditAction::Remove,
            _ => {
                writeln!(self.output, "Invalid option.")?;
                return Ok(());
            }
        };

        match self.service.edit_or_remove(index, action).await {
            Ok(result) => {
                match &result.value {
                    EditOutcome::Edited(expense) => {
                        writeln!(self.output, "Expense updated: {}", expense)?
                    }
                    EditOutcome::Removed(expense) => {
                        writeln!(self.output, "Expense '{}' removed.", expense)?
                    }
                }
                self.warn_if_unsynced(&result)?;
            }
            Err(err) => writeln!(self.output, "{}", err)?,
        }
        Ok(())
    }

    /// Ask for each editable field; a blank answer keeps the current value.
    async fn read_patch(&mut self) -> Result<Option<ExpensePatch>> {
        let mut patch = ExpensePatch::default();

        let Some(name) = self
            .read_optional("Enter the updated name (Enter to keep): ")
            .await?
        else {
            return Ok(None);
        };
        patch.name = name;

        let Some(amount) = self
            .read_optional("Enter the updated amount (Enter to keep): ")
            .await?
        else {
            return Ok(None);
        };
        patch.amount = amount;

        let Some(date) = self
            .read_optional("Enter the updated date, DD-MM-YYYY (Enter to keep): ")
            .await?
        else {
            return Ok(None);
        };
        patch.date = date;

        write!(
            self.output,
            "{}",
            render_categories(self.service.categories())
        )?;
        let Some(category) = self
            .read_optional("Enter the number of the new category (Enter to keep): ")
            .await?
        else {
            return Ok(None);
        };
        if let Some(text) = category {
            match text.parse::<usize>() {
                Ok(index) => patch.category = Some(index),
                Err(_) => {
                    writeln!(self.output, "Invalid category number.")?;
                    return Ok(None);
                }
            }
        }

        Ok(Some(patch))
    }

    async fn adjust_budget(&mut self) -> Result<()> {
        if let Some(budget) = self
            .prompt_valid("Enter your monthly budget: ", Budget::parse)
            .await?
        {
            self.service.set_budget(budget);
            writeln!(
                self.output,
                "Monthly budget adjusted to {}",
                format_money(budget.amount_cents())
            )?;
        }
        Ok(())
    }

    async fn manage_categories(&mut self) -> Result<()> {
        loop {
            writeln!(self.output, "\n{}", CATEGORY_MENU)?;
            let Some(choice) = self.read_line("Select an option: ").await? else {
                return Ok(());
            };

            match choice.trim() {
                "1" => {
                    write!(
                        self.output,
                        "{}",
                        render_categories(self.service.categories())
                    )?;
                }
                "2" => {
                    let Some(name) = self.read_line("Enter the new category: ").await? else {
                        return Ok(());
                    };
                    match self.service.add_category(&name).await {
                        Ok(added) => {
                            writeln!(self.output, "Category '{}' added.", added.value)?;
                            self.warn_if_unsynced(&added)?;
                        }
                        Err(err) => writeln!(self.output, "{}", err)?,
                    }
                }
                "3" => {
                    let Some(index) = self.pick_category("edit").await? else {
                        continue;
                    };
                    let Some(name) = self.read_line("Enter the new name: ").await? else {
                        return Ok(());
                    };
                    match self.service.edit_category(index, &name).await {
                        Ok(renamed) => {
                            writeln!(
                                self.output,
                                "Category '{}' renamed to '{}'.",
                                renamed.value.old, renamed.value.new
                            )?;
                            self.warn_if_unsynced(&renamed)?;
                        }
                        Err(err) => writeln!(self.output, "{}", err)?,
                    }
                }
                "4" => {
                    let Some(index) = self.pick_category("delete").await? else {
                        continue;
                    };
                    match self.service.delete_category(index).await {
                        Ok(deleted) => {
                            writeln!(self.output, "Category '{}' deleted.", deleted.value)?;
                            self.warn_if_unsynced(&deleted)?;
                        }
                        Err(err) => writeln!(self.output, "{}", err)?,
                    }
                }
                "5" => return Ok(()),
                _ => writeln!(self.output, "Invalid choice. Please try again.")?,
            }
        }
    }

    fn summarize(&mut self) -> Result<()> {
        let summary = self.service.summarize();
        write!(self.output, "{}", render_summary(&summary, self.color))?;
        Ok(())
    }

    /// List categories and ask for a number until one in range is given.
    async fn choose_category(&mut self) -> Result<Option<usize>> {
        loop {
            writeln!(self.output, "Select a category:")?;
            write!(
                self.output,
                "{}",
                render_categories(self.service.categories())
            )?;
            let Some(text) = self.read_line("Enter a category number: ").await? else {
                return Ok(None);
            };
            match text.trim().parse::<usize>() {
                Ok(index) if self.service.categories().at(index).is_ok() => {
                    return Ok(Some(index));
                }
                Ok(_) => writeln!(self.output, "Invalid category number.")?,
                Err(_) => writeln!(self.output, "Please enter a valid number.")?,
            }
        }
    }

    /// Ask for a category position once; anything unusable returns `None`.
    async fn pick_category(&mut self, verb: &str) -> Result<Option<usize>> {
        write!(
            self.output,
            "{}",
            render_categories(self.service.categories())
        )?;
        let prompt = format!("Enter the number of the category to {}: ", verb);
        let Some(text) = self.read_line(&prompt).await? else {
            return Ok(None);
        };
        match text.trim().parse::<usize>() {
            Ok(index) => Ok(Some(index)),
            Err(_) => {
                writeln!(self.output, "Invalid index.")?;
                Ok(None)
            }
        }
    }

    /// Re-prompt until `parse` accepts the answer. `None` means input ended.
    async fn prompt_valid<T, E, F>(&mut self, prompt: &str, parse: F) -> Result<Option<T>>
    where
        E: std::fmt::Display,
        F: Fn(&str) -> std::result::Result<T, E>,
    {
        loop {
            let Some(text) = self.read_line(prompt).await? else {
                return Ok(None);
            };
            match parse(text.trim()) {
                Ok(value) => return Ok(Some(value)),
                Err(err) => writeln!(self.output, "{}", err)?,
            }
        }
    }

    /// `Some(None)` for a blank answer, `None` when input ended.
    async fn read_optional(&mut self, prompt: &str) -> Result<Option<Option<String>>> {
        Ok(self.read_line(prompt).await?.map(|text| {
            let text = text.trim();
            (!text.is_empty()).then(|| text.to_string())
        }))
    }

    async fn read_line(&mut self, prompt: &str) -> Result<Option<String>> {
        if self.closed {
            return Ok(None);
        }
        write!(self.output, "{}", prompt)?;
        self.output.flush()?;

        let mut line = String::new();
        let read = match &self.interrupt {
            Some(interrupt) => tokio::select! {
                biased;
                _ = interrupt.notified() => None,
                read = self.input.read_line(&mut line) => Some(read?),
            },
            None => Some(self.input.read_line(&mut line).await?),
        };

        match read {
            None => {
                writeln!(self.output, "\nExiting the application.")?;
                self.closed = true;
                Ok(None)
            }
            Some(0) => {
                writeln!(self.output)?;
                self.closed = true;
                Ok(None)
            }
            Some(_) => Ok(Some(line.trim_end_matches(['\r', '\n']).to_string())),
        }
    }

    fn warn_if_unsynced<T>(&mut self, result: &Synced<T>) -> Result<()> {
        if !result.is_synced() {
            writeln!(
                self.output,
                "Warning: the change could not be saved to the ledger store."
            )?;
        }
        Ok(())
    }
}
