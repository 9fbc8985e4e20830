//! Plain-text rendering of the manager's view.

use std::fmt::Write;

use task_core::{
    Notification, NotificationKind, Progress, ProgressTier, TaskListView, TaskStats, ViewFilter,
};

pub fn list(view: &TaskListView, filter: ViewFilter) -> String {
    let mut out = String::new();
    let cards = match view {
        TaskListView::Empty => {
            let _ = writeln!(out, "No tasks found ({filter})");
            let _ = writeln!(out, "Add a new task to get started!");
            return out;
        }
        TaskListView::Cards(cards) => cards,
    };
    for card in cards {
        let mark = if card.completed { 'x' } else { ' ' };
        let _ = writeln!(
            out,
            "[{mark}] {}  ({}, {})  {}",
            card.title, card.category, card.created_on, card.id
        );
        if let Some(description) = &card.description {
            let _ = writeln!(out, "    {description}");
        }
    }
    out
}

pub fn progress(progress: &Progress) -> String {
    let tier = match progress.tier {
        ProgressTier::Complete => "done",
        ProgressTier::Halfway => "halfway",
        ProgressTier::Started => "started",
    };
    format!(
        "{}/{} completed, {} [{tier}]",
        progress.completed,
        progress.total,
        progress.label()
    )
}

pub fn notification(notification: &Notification) -> String {
    match notification.kind {
        NotificationKind::Success => format!("ok: {}", notification.message),
        NotificationKind::Error => format!("error: {}", notification.message),
    }
}

pub fn stats(stats: &TaskStats) -> String {
    let mut out = format!(
        "total {}  completed {}  pending {}  ({}%)\n",
        stats.total, stats.completed, stats.pending, stats.percentage
    );
    for (category, count) in &stats.by_category {
        let _ = writeln!(out, "  {category}: {count}");
    }
    out
}
