//! tdl task commands: add, list, toggle, edit, rm, clear-completed, stats.

use serde::Serialize;

use crate::error::{Error, Result};
use crate::list::{Action, EditOutcome};
use crate::output::{emit_success, HumanOutput, OutputOptions};
use crate::task::{Counts, Filter, Task};

use super::Context;

#[derive(Serialize)]
struct TaskReport {
    task: Task,
    counts: Counts,
}

#[derive(Serialize)]
struct TaskListReport {
    filter: Filter,
    tasks: Vec<Task>,
    counts: Counts,
}

#[derive(Serialize)]
struct EditReport {
    id: String,
    outcome: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    task: Option<Task>,
    counts: Counts,
}

#[derive(Serialize)]
struct RemoveReport {
    task: Task,
    counts: Counts,
}

#[derive(Serialize)]
struct ClearReport {
    removed: usize,
    counts: Counts,
}

fn format_row(task: &Task, time_format: &str) -> String {
    let mark = if task.completed { "[x]" } else { "[ ]" };
    format!(
        "{mark} {} {}  ({})",
        task.short_id(),
        task.title,
        task.created_at_display(time_format)
    )
}

fn push_counts(human: &mut HumanOutput, counts: &Counts) {
    human.push_summary("Active", counts.active.to_string());
    human.push_summary("Completed", counts.completed.to_string());
    human.push_summary("Total", counts.total.to_string());
}

pub(super) fn run_add(mut ctx: Context, options: OutputOptions, raw_title: &str) -> Result<()> {
    if raw_title.trim().is_empty() {
        return Err(Error::InvalidArgument("title cannot be empty".to_string()));
    }
    ctx.session.apply_strict(Action::Add(raw_title.to_string()))?;
    let list = ctx.session.list();
    let task = list
        .tasks()
        .first()
        .cloned()
        .ok_or_else(|| Error::OperationFailed("added task missing from list".to_string()))?;

    let mut human = HumanOutput::new(format!("Added {}: {}", task.short_id(), task.title));
    push_counts(&mut human, &list.counts());

    let report = TaskReport {
        counts: list.counts(),
        task,
    };
    emit_success(options, "add", &report, Some(&human))
}

pub(super) fn run_list(ctx: Context, options: OutputOptions, filter: Option<Filter>) -> Result<()> {
    let list = ctx.session.list();
    let filter = filter.unwrap_or(list.filter());
    let visible: Vec<Task> = list.visible_with(filter).into_iter().cloned().collect();
    let counts = list.counts();

    let mut human = HumanOutput::new(format!("Tasks ({})", filter.as_str()));
    push_counts(&mut human, &counts);
    if visible.is_empty() {
        human.push_summary("No tasks here. Add one with `tdl add <title>`", "");
    }
    for task in &visible {
        human.push_detail(format_row(task, &ctx.config.ui.time_format));
    }

    let report = TaskListReport {
        filter,
        tasks: visible,
        counts,
    };
    emit_success(options, "list", &report, Some(&human))
}

pub(super) fn run_toggle(mut ctx: Context, options: OutputOptions, query: &str) -> Result<()> {
    let id = ctx.session.list().resolve_id(query)?;
    ctx.session.apply_strict(Action::Toggle(id.clone()))?;
    let list = ctx.session.list();
    let task = list
        .get(&id)
        .cloned()
        .ok_or_else(|| Error::TaskNotFound(id.clone()))?;

    let state = if task.completed { "completed" } else { "active" };
    let mut human = HumanOutput::new(format!("Marked {} {state}: {}", task.short_id(), task.title));
    push_counts(&mut human, &list.counts());

    let report = TaskReport {
        counts: list.counts(),
        task,
    };
    emit_success(options, "toggle", &report, Some(&human))
}

pub(super) fn run_edit(
    mut ctx: Context,
    options: OutputOptions,
    query: &str,
    raw_title: &str,
) -> Result<()> {
    let id = ctx.session.list().resolve_id(query)?;
    let before = ctx.session.list().get(&id).cloned();
    ctx.session.apply_strict(Action::SaveEdit(id.clone(), raw_title.to_string()))?;
    let list = ctx.session.list();
    let after = list.get(&id).cloned();

    let outcome = match (&before, &after) {
        (Some(_), None) => EditOutcome::Removed,
        (Some(old), Some(new)) if old.title != new.title => EditOutcome::Renamed,
        _ => EditOutcome::Unchanged,
    };
    let short: String = id.chars().take(crate::task::SHORT_ID_LEN).collect();
    let (label, header) = match (outcome, after.as_ref()) {
        (EditOutcome::Removed, _) => ("removed", format!("Removed {short} (empty title)")),
        (EditOutcome::Renamed, Some(task)) => ("renamed", format!("Renamed {short}: {}", task.title)),
        _ => ("unchanged", format!("Unchanged {short}")),
    };
    let mut human = HumanOutput::new(header);
    push_counts(&mut human, &list.counts());

    let report = EditReport {
        id,
        outcome: label,
        task: after,
        counts: list.counts(),
    };
    emit_success(options, "edit", &report, Some(&human))
}

pub(super) fn run_rm(mut ctx: Context, options: OutputOptions, query: &str) -> Result<()> {
    let id = ctx.session.list().resolve_id(query)?;
    let task = ctx
        .session
        .list()
        .get(&id)
        .cloned()
        .ok_or_else(|| Error::TaskNotFound(id.clone()))?;
    ctx.session.apply_strict(Action::Remove(id))?;
    let counts = ctx.session.list().counts();

    let mut human = HumanOutput::new(format!("Removed {}: {}", task.short_id(), task.title));
    push_counts(&mut human, &counts);

    emit_success(options, "rm", &RemoveReport { task, counts }, Some(&human))
}

pub(super) fn run_clear_completed(mut ctx: Context, options: OutputOptions) -> Result<()> {
    let removed = ctx.session.list().counts().completed;
    ctx.session.apply_strict(Action::ClearCompleted)?;
    let counts = ctx.session.list().counts();

    let mut human = HumanOutput::new(format!("Cleared {removed} completed task(s)"));
    if removed == 0 {
        human.push_warning("no completed tasks to clear");
    }
    push_counts(&mut human, &counts);

    emit_success(
        options,
        "clear-completed",
        &ClearReport { removed, counts },
        Some(&human),
    )
}

pub(super) fn run_stats(ctx: Context, options: OutputOptions) -> Result<()> {
    let counts = ctx.session.list().counts();
    let human = HumanOutput::new(counts.summary());
    emit_success(options, "stats", &counts, Some(&human))
}
