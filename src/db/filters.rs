//! Filter, sort and pagination query construction for the event list.
//!
//! Column names never come from user input: sort keys map through a fixed
//! whitelist and every filter value is bound as a parameter.

use chrono::{Duration, NaiveDate};
use rusqlite::types::Value;

use crate::utils::time;

/// Person filter value selecting events with no responsible person.
pub const UNASSIGNED: &str = "__unassigned__";

#[derive(Debug, Default, Clone)]
pub struct EventFilter {
    pub show_deleted: bool,
    pub name: Option<String>,
    pub person: Option<String>,
    pub created_after: Option<NaiveDate>,
    pub created_before: Option<NaiveDate>,
    pub updated_after: Option<NaiveDate>,
    pub updated_before: Option<NaiveDate>,
}

impl EventFilter {
    /// SQL after `WHERE` (or "1=1" when unfiltered) plus bound values.
    pub fn where_clause(&self) -> (String, Vec<Value>) {
        let mut clauses: Vec<String> = Vec::new();
        let mut params: Vec<Value> = Vec::new();

        if !self.show_deleted {
            clauses.push("e.event_del_status = 1".to_string());
        }

        if let Some(name) = &self.name {
            clauses.push("e.event_name LIKE ?".to_string());
            params.push(Value::Text(format!("%{}%", name)));
        }

        if let Some(person) = &self.person {
            if person == UNASSIGNED {
                clauses.push(
                    "(e.responsible_person IS NULL OR e.responsible_person = '')".to_string(),
                );
            } else {
                clauses.push("e.responsible_person = ?".to_string());
                params.push(Value::Text(person.clone()));
            }
        }

        push_date_range(
            &mut clauses,
            &mut params,
            "e.create_time",
            self.created_after,
            self.created_before,
        );
        push_date_range(
            &mut clauses,
            &mut params,
            "e.update_time",
            self.updated_after,
            self.updated_before,
        );

        if clauses.is_empty() {
            ("1=1".to_string(), params)
        } else {
            (clauses.join(" AND "), params)
        }
    }
}

/// Lower bound is inclusive from midnight; the upper bound adds one day
/// and compares `<` so the whole named day is included.
fn push_date_range(
    clauses: &mut Vec<String>,
    params: &mut Vec<Value>,
    column: &str,
    after: Option<NaiveDate>,
    before: Option<NaiveDate>,
) {
    if let Some(date) = after {
        clauses.push(format!("{} >= ?", column));
        params.push(Value::Text(day_start(date)));
    }
    if let Some(date) = before {
        clauses.push(format!("{} < ?", column));
        params.push(Value::Text(day_start(date + Duration::days(1))));
    }
}

fn day_start(date: NaiveDate) -> String {
    time::to_db(&date.and_hms_opt(0, 0, 0).expect("midnight is always valid"))
}

#[derive(Debug, Clone)]
pub struct EventSort {
    pub key: String,
    pub descending: bool,
}

impl Default for EventSort {
    fn default() -> Self {
        Self {
            key: "create_time".to_string(),
            descending: true,
        }
    }
}

/// Whitelist mapping from sort key to column expression. Unrecognized
/// keys fall back to creation time instead of erroring.
fn sort_column(key: &str) -> &'static str {
    match key {
        "name" => "e.event_name",
        "person" => "e.responsible_person",
        "update_time" => "e.update_time",
        "status" => "COALESCE(s.event_status, 0)",
        // durations are stored as exact decimal text; cast for ordering only
        "duration" => "CAST(COALESCE(s.total_duration_seconds, '0') AS REAL)",
        _ => "e.create_time",
    }
}

impl EventSort {
    pub fn order_clause(&self) -> String {
        let dir = if self.descending { "DESC" } else { "ASC" };
        // Secondary key keeps pagination stable across ties.
        format!(
            "ORDER BY {} {}, e.event_id {}",
            sort_column(&self.key),
            dir,
            dir
        )
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Page {
    pub page: i64,
    pub limit: i64,
}

impl Page {
    /// Page and limit floor at 1, matching the API contract.
    pub fn new(page: i64, limit: i64) -> Self {
        Self {
            page: page.max(1),
            limit: limit.max(1),
        }
    }

    pub fn offset(&self) -> i64 {
        (self.page - 1) * self.limit
    }

    pub fn total_pages(&self, total_items: i64) -> i64 {
        (total_items + self.limit - 1) / self.limit
    }
}
