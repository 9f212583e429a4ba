//! Output formatter implementations.

use serde::Serialize;

use super::OutputFormatter;
use crate::database::LogEntry;
use crate::operations::list::Standing;
use crate::operations::{Candidate, ExecutionResult, RaffleSummary};
use crate::{Error, Result};

fn to_json<T: Serialize + ?Sized>(value: &T) -> Result<String> {
    serde_json::to_string_pretty(value).map_err(Error::from)
}

/// JSON formatter.
///
/// Emits pretty-printed JSON of the underlying structures.
pub struct JsonFormatter;

impl OutputFormatter for JsonFormatter {
    fn format_result(&self, result: &ExecutionResult) -> Result<String> {
        to_json(result)
    }

    fn format_candidates(&self, candidates: &[Candidate]) -> Result<String> {
        to_json(candidates)
    }

    fn format_log(&self, entries: &[LogEntry]) -> Result<String> {
        to_json(entries)
    }
}

/// Human-readable formatter.
pub struct HumanFormatter;

fn summary_lines(summary: &RaffleSummary) -> Vec<String> {
    let occurrence = summary
        .subevent
        .map_or_else(|| "whole event".to_string(), |id| format!("subevent {id}"));
    vec![
        format!(
            "Raffle for {occurrence}: {} eligible orders in {} units ({} preferred, {} excluded)",
            summary.eligible_orders, summary.units, summary.preferred_units, summary.excluded_units
        ),
        format!(
            "Admitted {} units, {} orders, {} tickets of {} ({} remaining)",
            summary.admitted_units,
            summary.admitted_orders,
            summary.admitted_tickets,
            summary.raffle_size,
            summary.remaining
        ),
    ]
}

const fn standing_label(standing: Standing) -> &'static str {
    match standing {
        Standing::Preferred => "preferred",
        Standing::Draw => "draw",
        Standing::Excluded => "excluded",
    }
}

impl OutputFormatter for HumanFormatter {
    fn format_result(&self, result: &ExecutionResult) -> Result<String> {
        let mut lines = Vec::new();
        if let Some(summary) = &result.summary {
            lines.extend(summary_lines(summary));
        }

        if result.dry_run {
            lines.push(format!("Dry run: {} actions would be taken", result.attempted));
            lines.extend(result.actions_taken.iter().map(|a| format!("  {a}")));
        } else {
            lines.push(format!(
                "Processed {} orders, {} succeeded",
                result.attempted,
                result.succeeded()
            ));
            if !result.failed.is_empty() {
                let failed: Vec<String> = result.failed.iter().map(ToString::to_string).collect();
                lines.push(format!("Refused: {}", failed.join(", ")));
            }
        }

        if !result.warnings.is_empty() {
            lines.push("Warnings:".to_string());
            lines.extend(result.warnings.iter().map(|w| format!("  {w}")));
        }

        Ok(lines.join("\n"))
    }

    fn format_candidates(&self, candidates: &[Candidate]) -> Result<String> {
        if candidates.is_empty() {
            return Ok("No eligible orders.".to_string());
        }

        let width = candidates
            .iter()
            .map(|c| c.order.as_str().len())
            .max()
            .unwrap_or(0);
        let mut lines = vec![format!("Eligible orders ({}):", candidates.len())];
        for candidate in candidates {
            lines.push(format!(
                "  {:<width$}  {:>3} tickets  {:<16} {:<7} {}",
                candidate.order.as_str(),
                candidate.tickets,
                candidate.unit.to_string(),
                candidate.override_mode.as_str(),
                standing_label(candidate.standing),
            ));
        }
        Ok(lines.join("\n"))
    }

    fn format_log(&self, entries: &[LogEntry]) -> Result<String> {
        if entries.is_empty() {
            return Ok("No log entries.".to_string());
        }

        let lines: Vec<String> = entries
            .iter()
            .map(|entry| {
                let user = entry
                    .user
                    .map_or_else(|| "-".to_string(), |u| u.to_string());
                format!(
                    "{}  {}  {}  user={}  {}",
                    entry.created_at.format("%Y-%m-%d %H:%M:%S"),
                    entry.order,
                    entry.action,
                    user,
                    entry.data
                )
            })
            .collect();
        Ok(lines.join("\n"))
    }
}
