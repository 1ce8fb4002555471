//! Colored terminal rendering for gamecal-core types.

use gamecal_core::Event;
use gamecal_core::reconcile::{BatchReport, Change, ChangeKind, ChangeReport, Outcome, ReconcilePlan};
use gamecal_core::remote::Remote;
use owo_colors::OwoColorize;

pub trait Render {
    fn render(&self) -> String;
}

impl Render for ChangeKind {
    fn render(&self) -> String {
        let symbol = self.symbol();
        match self {
            ChangeKind::Add => symbol.green().to_string(),
            ChangeKind::Remove => symbol.red().to_string(),
        }
    }
}

fn colorize(kind: ChangeKind, text: &str) -> String {
    match kind {
        ChangeKind::Add => text.green().to_string(),
        ChangeKind::Remove => text.red().to_string(),
    }
}

impl Render for Event {
    fn render(&self) -> String {
        format!(
            "{} {} {}",
            self.teams,
            self.occurs_at.format("%a %d.%m %H:%M").dimmed(),
            format!("@ {}", self.arena_label()).dimmed()
        )
    }
}

impl Render for Change {
    fn render(&self) -> String {
        format!(
            "{} {}",
            self.kind.render(),
            colorize(self.kind, &self.event.render())
        )
    }
}

impl Render for Outcome {
    fn render(&self) -> String {
        match self {
            Outcome::Applied => self.to_string().green().to_string(),
            Outcome::Declined { .. } | Outcome::PreviouslyRejected => {
                self.to_string().dimmed().to_string()
            }
            Outcome::Unanswered => self.to_string().yellow().to_string(),
        }
    }
}

impl Render for ChangeReport {
    fn render(&self) -> String {
        let result = match &self.result {
            Ok(outcome) => outcome.render(),
            Err(e) => e.to_string().red().to_string(),
        };
        format!("{} {}", self.change.render(), result)
    }
}

impl Render for Remote {
    fn render(&self) -> String {
        format!("📅 {}", self.label())
    }
}

pub trait PlanRender {
    /// `rejected` says whether an addition would be skipped as previously declined.
    fn render_with(&self, rejected: impl Fn(&Event) -> bool) -> String;
}

impl PlanRender for ReconcilePlan {
    fn render_with(&self, rejected: impl Fn(&Event) -> bool) -> String {
        if self.is_empty() {
            return "   No changes".dimmed().to_string();
        }

        self.changes()
            .map(|change| {
                if change.kind == ChangeKind::Add && rejected(&change.event) {
                    format!("   {} {}", change.render(), "(previously rejected)".dimmed())
                } else {
                    format!("   {}", change.render())
                }
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl Render for BatchReport {
    fn render(&self) -> String {
        if self.reports.is_empty() {
            return "   No changes".dimmed().to_string();
        }

        self.reports
            .iter()
            .map(|r| format!("   {}", r.render()))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

pub fn pluralize(word: &str, count: usize) -> String {
    if count == 1 {
        word.to_string()
    } else {
        format!("{word}s")
    }
}
