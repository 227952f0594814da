//! Temporal integrity enforcement for work packages
//!
//! After [`enforce_envelope`], every task satisfies
//! `start <= task.startDate <= task.endDate <= end` and every milestone date
//! lies in `[start, end]`. Out-of-range values are clamped, never rejected.
//! Missing or unreadable dates are replaced by the nearest bound: a task
//! start by the project start, a task end or milestone date by the project
//! end (or the start when the end is unknown).

use crate::coerce::coerce_to_schema;
use crate::error::{ResponseError, ResponseResult};
use chrono::NaiveDate;
use grantgen_document::{
    format_date, parse_date, DependencyType, ProjectEnvelope, SectionKind, Task, WorkPackage,
};
use grantgen_schema::schema_for;
use serde_json::Value;
use std::collections::HashMap;

fn resolve_date(raw: &str, fallback: NaiveDate, envelope: &ProjectEnvelope, what: &str, id: &str) -> NaiveDate {
    match parse_date(raw) {
        Some(date) => {
            let clamped = envelope.clamp(date);
            if clamped != date {
                tracing::debug!(id, what, from = %date, to = %clamped, "clamped date into project envelope");
            }
            clamped
        }
        None => {
            if !raw.trim().is_empty() {
                tracing::warn!(id, what, raw, "replacing unreadable date");
            }
            fallback
        }
    }
}

fn enforce_task(task: &mut Task, envelope: &ProjectEnvelope) {
    let upper = envelope.end().unwrap_or_else(|| envelope.start());
    let start = resolve_date(&task.start_date, envelope.start(), envelope, "startDate", &task.id);
    let mut end = resolve_date(&task.end_date, upper.max(start), envelope, "endDate", &task.id);
    if end < start {
        tracing::debug!(id = %task.id, "task ended before it started; aligning end with start");
        end = start;
    }
    task.start_date = format_date(start);
    task.end_date = format_date(end);
}

/// Rewrite finish-to-start dependencies whose successor does not start
/// strictly after its predecessor ends
///
/// Predecessors are looked up across all work packages. Unknown predecessors
/// and unreadable dates are left alone. Returns the number of rewritten edges.
pub fn correct_dependencies(work_packages: &mut [WorkPackage]) -> usize {
    let ends: HashMap<String, NaiveDate> = work_packages
        .iter()
        .flat_map(|wp| wp.tasks.iter())
        .filter_map(|t| parse_date(&t.end_date).map(|end| (t.id.trim().to_string(), end)))
        .collect();

    let mut corrected = 0;
    for task in work_packages.iter_mut().flat_map(|wp| wp.tasks.iter_mut()) {
        let Some(start) = parse_date(&task.start_date) else {
            continue;
        };
        for dep in &mut task.dependencies {
            if dep.kind != DependencyType::FinishToStart {
                continue;
            }
            if let Some(&pred_end) = ends.get(dep.predecessor_id.trim()) {
                if start <= pred_end {
                    tracing::debug!(
                        task = %task.id,
                        predecessor = %dep.predecessor_id,
                        "FS dependency overlaps predecessor; using SS"
                    );
                    dep.kind = DependencyType::StartToStart;
                    corrected += 1;
                }
            }
        }
    }
    corrected
}

/// Clamp all schedule dates into the project envelope and repair
/// dependency types
///
/// No-op when the list is empty or no project start is known.
#[must_use]
pub fn enforce_envelope(
    mut work_packages: Vec<WorkPackage>,
    envelope: Option<ProjectEnvelope>,
) -> Vec<WorkPackage> {
    let Some(envelope) = envelope else {
        return work_packages;
    };
    if work_packages.is_empty() {
        return work_packages;
    }

    let upper = envelope.end().unwrap_or_else(|| envelope.start());
    for wp in &mut work_packages {
        for task in &mut wp.tasks {
            enforce_task(task, &envelope);
        }
        for milestone in &mut wp.milestones {
            let date = resolve_date(&milestone.date, upper, &envelope, "date", &milestone.id);
            milestone.date = format_date(date);
        }
    }
    let corrected = correct_dependencies(&mut work_packages);
    tracing::debug!(
        envelope = %envelope,
        work_packages = work_packages.len(),
        corrected,
        "enforced project envelope"
    );
    work_packages
}

fn decode_activities(mut value: Value) -> ResponseResult<Vec<WorkPackage>> {
    coerce_to_schema(&mut value, &schema_for(SectionKind::Activities));
    serde_json::from_value(value)
        .map_err(|e| ResponseError::malformed(format!("activities do not match work package shape: {e}"), ""))
}

fn encode_activities(work_packages: Vec<WorkPackage>) -> ResponseResult<Value> {
    serde_json::to_value(work_packages)
        .map_err(|e| ResponseError::malformed(format!("could not encode activities: {e}"), ""))
}

/// [`enforce_envelope`] over a JSON activities value
///
/// Null or mistyped leaves are coerced first, so a null date falls back to
/// the nearest bound like any other unreadable one.
pub fn enforce_envelope_value(value: Value, envelope: Option<ProjectEnvelope>) -> ResponseResult<Value> {
    if envelope.is_none() {
        return Ok(value);
    }
    encode_activities(enforce_envelope(decode_activities(value)?, envelope))
}

/// Full schedule repair over a JSON activities value
///
/// Runs on data where user-authored and generated tasks meet. With an
/// envelope this is [`enforce_envelope`]; without one only dependency types
/// are corrected.
pub fn repair_schedule_value(value: Value, envelope: Option<ProjectEnvelope>) -> ResponseResult<Value> {
    let mut work_packages = decode_activities(value)?;
    if envelope.is_some() {
        work_packages = enforce_envelope(work_packages, envelope);
    } else {
        correct_dependencies(&mut work_packages);
    }
    encode_activities(work_packages)
}
