//! List queries over the todo collection.
//!
//! Raw query-string values are normalized into a [`TodoQuery`] first, then
//! [`TodoQuery::apply`] runs the fixed pipeline: completion filter, title
//! search, two-level sort, limit.

use std::cmp::Ordering;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::Deserialize;

use super::error::TodoError;
use super::todo::Todo;

pub const LIMIT_MIN: usize = 1;
pub const LIMIT_MAX: usize = 100;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortBy {
    #[default]
    CreatedAt,
    UpdatedAt,
}

impl SortBy {
    fn key(self, todo: &Todo) -> DateTime<Utc> {
        match self {
            Self::CreatedAt => todo.created_at,
            Self::UpdatedAt => todo.updated_at,
        }
    }
}

impl FromStr for SortBy {
    type Err = TodoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "createdAt" => Ok(Self::CreatedAt),
            "updatedAt" => Ok(Self::UpdatedAt),
            _ => Err(TodoError::Validation(
                "sortBy must be one of the following values: createdAt, updatedAt".into(),
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OrderBy {
    Asc,
    #[default]
    Desc,
}

impl FromStr for OrderBy {
    type Err = TodoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "asc" => Ok(Self::Asc),
            "desc" => Ok(Self::Desc),
            _ => Err(TodoError::Validation("orderBy must be one of the following values: asc, desc".into())),
        }
    }
}

/// Query-string parameters exactly as they arrive on `GET /todos`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct RawTodoQuery {
    pub is_completed: Option<String>,
    pub limit: Option<String>,
    pub search: Option<String>,
    pub sort_by: Option<String>,
    pub order_by: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TodoQuery {
    pub is_completed: Option<bool>,
    pub search: Option<String>,
    pub sort_by: SortBy,
    pub order_by: OrderBy,
    pub limit: Option<usize>,
}

impl TryFrom<RawTodoQuery> for TodoQuery {
    type Error = TodoError;

    fn try_from(raw: RawTodoQuery) -> Result<Self, Self::Error> {
        Ok(Self {
            is_completed: raw.is_completed.as_deref().map(parse_bool).transpose()?,
            search: raw.search,
            sort_by: raw.sort_by.as_deref().map(str::parse::<SortBy>).transpose()?.unwrap_or_default(),
            order_by: raw.order_by.as_deref().map(str::parse::<OrderBy>).transpose()?.unwrap_or_default(),
            limit: raw.limit.as_deref().map(parse_limit).transpose()?,
        })
    }
}

fn parse_bool(value: &str) -> Result<bool, TodoError> {
    match value {
        "true" | "1" => Ok(true),
        "false" | "0" => Ok(false),
        _ => Err(TodoError::Validation("isCompleted must be a boolean string".into())),
    }
}

fn parse_limit(value: &str) -> Result<usize, TodoError> {
    let out_of_range = || TodoError::Validation(format!("limit must be an integer between {LIMIT_MIN} and {LIMIT_MAX}"));
    let limit: i64 = value.trim().parse().map_err(|_| out_of_range())?;
    usize::try_from(limit)
        .ok()
        .filter(|l| (LIMIT_MIN..=LIMIT_MAX).contains(l))
        .ok_or_else(out_of_range)
}

impl TodoQuery {
    /// Range-checks fields that may have been set directly rather than parsed.
    pub fn validate(&self) -> Result<(), TodoError> {
        match self.limit {
            Some(limit) if !(LIMIT_MIN..=LIMIT_MAX).contains(&limit) => Err(TodoError::Validation(format!(
                "limit must be an integer between {LIMIT_MIN} and {LIMIT_MAX}"
            ))),
            _ => Ok(()),
        }
    }

    pub fn matches(&self, todo: &Todo) -> bool {
        if let Some(is_completed) = self.is_completed {
            if todo.is_completed != is_completed {
                return false;
            }
        }
        match &self.search {
            Some(needle) => todo.title.to_lowercase().contains(&needle.to_lowercase()),
            None => true,
        }
    }

    /// Incomplete before completed, then the chosen timestamp in the chosen
    /// direction. Equal timestamps fall back to ascending id.
    pub fn compare(&self, a: &Todo, b: &Todo) -> Ordering {
        let by_time = self.sort_by.key(a).cmp(&self.sort_by.key(b));
        let by_time = match self.order_by {
            OrderBy::Asc => by_time,
            OrderBy::Desc => by_time.reverse(),
        };
        a.is_completed
            .cmp(&b.is_completed)
            .then(by_time)
            .then_with(|| a.id.cmp(&b.id))
    }

    /// Filter, sort, then truncate. Truncation always runs last so a limit
    /// keeps the highest-priority records.
    pub fn apply(&self, todos: Vec<Todo>) -> Vec<Todo> {
        let mut result: Vec<Todo> = todos.into_iter().filter(|t| self.matches(t)).collect();
        result.sort_by(|a, b| self.compare(a, b));
        if let Some(limit) = self.limit {
            result.truncate(limit);
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::todo::TodoId;
    use chrono::TimeZone;
    use proptest::prelude::*;
    use rstest::rstest;

    fn todo(id: i64, title: &str, is_completed: bool, created: i64, updated: i64) -> Todo {
        Todo {
            id: TodoId(id),
            title: title.into(),
            is_completed,
            created_at: Utc.timestamp_opt(created, 0).unwrap(),
            updated_at: Utc.timestamp_opt(updated, 0).unwrap(),
        }
    }

    fn titles(todos: &[Todo]) -> Vec<&str> { todos.iter().map(|t| t.title.as_str()).collect() }

    fn raw(pairs: &[(&str, &str)]) -> RawTodoQuery {
        let mut raw = RawTodoQuery::default();
        for (key, value) in pairs {
            let value = Some(value.to_string());
            match *key {
                "isCompleted" => raw.is_completed = value,
                "limit" => raw.limit = value,
                "search" => raw.search = value,
                "sortBy" => raw.sort_by = value,
                "orderBy" => raw.order_by = value,
                other => panic!("unknown key {other}"),
            }
        }
        raw
    }

    #[test]
    fn empty_query_uses_created_at_desc() {
        let query = TodoQuery::try_from(RawTodoQuery::default()).unwrap();
        assert_eq!(query, TodoQuery { sort_by: SortBy::CreatedAt, order_by: OrderBy::Desc, ..Default::default() });
    }

    #[rstest]
    #[case("true", true)]
    #[case("false", false)]
    #[case("1", true)]
    #[case("0", false)]
    fn boolean_strings_normalize(#[case] input: &str, #[case] expected: bool) {
        let query = TodoQuery::try_from(raw(&[("isCompleted", input)])).unwrap();
        assert_eq!(query.is_completed, Some(expected));
    }

    #[rstest]
    #[case("isCompleted", "yes")]
    #[case("isCompleted", "TRUE")]
    #[case("limit", "0")]
    #[case("limit", "101")]
    #[case("limit", "-5")]
    #[case("limit", "ten")]
    #[case("limit", "2.5")]
    #[case("sortBy", "title")]
    #[case("orderBy", "ascending")]
    fn bad_values_are_validation_errors(#[case] key: &str, #[case] value: &str) {
        let err = TodoQuery::try_from(raw(&[(key, value)])).unwrap_err();
        assert!(matches!(err, TodoError::Validation(_)), "{key}={value} gave {err:?}");
    }

    #[rstest]
    #[case("1", 1)]
    #[case("100", 100)]
    #[case(" 42 ", 42)]
    fn limits_inside_range_are_accepted(#[case] value: &str, #[case] expected: usize) {
        let query = TodoQuery::try_from(raw(&[("limit", value)])).unwrap();
        assert_eq!(query.limit, Some(expected));
    }

    #[test]
    fn directly_built_limits_are_range_checked() {
        assert!(TodoQuery { limit: Some(0), ..Default::default() }.validate().is_err());
        assert!(TodoQuery { limit: Some(101), ..Default::default() }.validate().is_err());
        assert!(TodoQuery { limit: Some(100), ..Default::default() }.validate().is_ok());
    }

    #[test]
    fn learn_and_ship_scenario() {
        let seed = vec![todo(2, "ship api", true, 20, 20), todo(1, "learn api", false, 10, 10)];

        let asc = TodoQuery::try_from(raw(&[("sortBy", "createdAt"), ("orderBy", "asc")])).unwrap();
        assert_eq!(titles(&asc.apply(seed.clone())), ["learn api", "ship api"]);

        let done = TodoQuery { is_completed: Some(true), ..Default::default() };
        assert_eq!(titles(&done.apply(seed.clone())), ["ship api"]);

        let search = TodoQuery { search: Some("API".into()), ..Default::default() };
        assert_eq!(search.apply(seed).len(), 2);
    }

    #[test]
    fn incomplete_first_even_when_newer_completed_exists() {
        let seed = vec![
            todo(1, "old open", false, 10, 10),
            todo(2, "new done", true, 50, 50),
            todo(3, "new open", false, 40, 40),
        ];
        let desc = TodoQuery::default();
        assert_eq!(titles(&desc.apply(seed.clone())), ["new open", "old open", "new done"]);
        let asc = TodoQuery { order_by: OrderBy::Asc, ..Default::default() };
        assert_eq!(titles(&asc.apply(seed)), ["old open", "new open", "new done"]);
    }

    #[test]
    fn sort_by_updated_at_uses_updated_stamp() {
        let seed = vec![todo(1, "first", false, 10, 90), todo(2, "second", false, 20, 30)];
        let query = TodoQuery { sort_by: SortBy::UpdatedAt, ..Default::default() };
        assert_eq!(titles(&query.apply(seed)), ["first", "second"]);
    }

    #[test]
    fn limit_applies_after_sort() {
        let seed = vec![
            todo(1, "done", true, 100, 100),
            todo(2, "open older", false, 10, 10),
            todo(3, "open newer", false, 20, 20),
        ];
        let query = TodoQuery { limit: Some(1), ..Default::default() };
        assert_eq!(titles(&query.apply(seed)), ["open newer"]);
    }

    #[test]
    fn empty_search_matches_everything() {
        let seed = vec![todo(1, "alpha", false, 1, 1), todo(2, "beta", true, 2, 2)];
        let query = TodoQuery { search: Some(String::new()), ..Default::default() };
        assert_eq!(query.apply(seed).len(), 2);
    }

    #[test]
    fn equal_timestamps_order_by_id() {
        let seed = vec![todo(3, "c", false, 5, 5), todo(1, "a", false, 5, 5), todo(2, "b", false, 5, 5)];
        assert_eq!(titles(&TodoQuery::default().apply(seed)), ["a", "b", "c"]);
    }

    fn arb_todos() -> impl Strategy<Value = Vec<Todo>> {
        prop::collection::vec(
            (prop::sample::select(vec!["Learn Rust", "ship API", "walk dog", "read", "api docs"]), any::<bool>(), 0i64..50, 0i64..50),
            0..30,
        )
        .prop_map(|rows| {
            rows.into_iter()
                .enumerate()
                .map(|(i, (title, done, created, bump))| todo(i as i64 + 1, title, done, created, created + bump))
                .collect()
        })
    }

    fn arb_query() -> impl Strategy<Value = TodoQuery> {
        (
            prop::option::of(any::<bool>()),
            prop::option::of(prop::sample::select(vec!["api", "RUST", "o", "zzz"])),
            prop::bool::ANY,
            prop::bool::ANY,
            prop::option::of(LIMIT_MIN..=LIMIT_MAX),
        )
            .prop_map(|(is_completed, search, by_updated, asc, limit)| TodoQuery {
                is_completed,
                search: search.map(str::to_string),
                sort_by: if by_updated { SortBy::UpdatedAt } else { SortBy::CreatedAt },
                order_by: if asc { OrderBy::Asc } else { OrderBy::Desc },
                limit,
            })
    }

    proptest! {
        #[test]
        fn results_satisfy_every_predicate(todos in arb_todos(), query in arb_query()) {
            let result = query.apply(todos.clone());
            for t in &result {
                prop_assert!(todos.contains(t));
                if let Some(done) = query.is_completed { prop_assert_eq!(t.is_completed, done); }
                if let Some(s) = &query.search { prop_assert!(t.title.to_lowercase().contains(&s.to_lowercase())); }
            }
        }

        #[test]
        fn incomplete_precede_completed_and_groups_are_monotonic(todos in arb_todos(), query in arb_query()) {
            let result = query.apply(todos);
            for pair in result.windows(2) {
                let (a, b) = (&pair[0], &pair[1]);
                prop_assert!(!(a.is_completed && !b.is_completed));
                if a.is_completed == b.is_completed {
                    let (ka, kb) = (query.sort_by.key(a), query.sort_by.key(b));
                    match query.order_by {
                        OrderBy::Asc => { prop_assert!(ka <= kb); }
                        OrderBy::Desc => { prop_assert!(ka >= kb); }
                    }
                }
            }
        }

        #[test]
        fn limit_is_a_prefix_of_the_unlimited_result(todos in arb_todos(), query in arb_query()) {
            let full = TodoQuery { limit: None, ..query.clone() }.apply(todos.clone());
            let limited = query.apply(todos);
            let expected = query.limit.map_or(full.len(), |k| k.min(full.len()));
            prop_assert_eq!(limited.len(), expected);
            prop_assert_eq!(&full[..expected], &limited[..]);
        }
    }
}
