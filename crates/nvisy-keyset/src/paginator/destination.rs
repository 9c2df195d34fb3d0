//! Containers that receive the rows of a page.

use std::collections::VecDeque;

use serde::Serialize;

use crate::{Error, Result};

/// A container the paginator fills with the rows of a page.
///
/// The previous contents are replaced.
pub trait Destination<T> {
    /// Checks that the destination can hold a list of rows.
    ///
    /// Called before any storage work is done.
    fn ensure_list(&self) -> Result<()> {
        Ok(())
    }

    /// Replaces the contents with `rows`.
    fn fill(&mut self, rows: Vec<T>) -> Result<()>;
}

impl<T> Destination<T> for Vec<T> {
    fn fill(&mut self, rows: Vec<T>) -> Result<()> {
        *self = rows;
        Ok(())
    }
}

impl<T> Destination<T> for VecDeque<T> {
    fn fill(&mut self, rows: Vec<T>) -> Result<()> {
        *self = rows.into();
        Ok(())
    }
}

/// A JSON destination must be an array or `null`; it receives the
/// serialized rows as an array.
impl<T: Serialize> Destination<T> for serde_json::Value {
    fn ensure_list(&self) -> Result<()> {
        match self {
            Self::Null | Self::Array(_) => Ok(()),
            other => Err(Error::InvalidFindDestination(
                format!("expected a JSON array, got {}", json_kind(other)).into(),
            )),
        }
    }

    fn fill(&mut self, rows: Vec<T>) -> Result<()> {
        <Self as Destination<T>>::ensure_list(self)?;
        *self = serde_json::to_value(rows).map_err(|err| {
            Error::InvalidFindDestination(format!("rows are not serializable: {err}").into())
        })?;
        Ok(())
    }
}

fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "a boolean",
        serde_json::Value::Number(_) => "a number",
        serde_json::Value::String(_) => "a string",
        serde_json::Value::Array(_) => "an array",
        serde_json::Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn vec_contents_are_replaced() {
        let mut rows = vec![9, 9, 9];
        rows.fill(vec![1, 2]).unwrap();
        assert_eq!(rows, vec![1, 2]);
    }

    #[test]
    fn deque_receives_rows_in_order() {
        let mut rows = VecDeque::new();
        Destination::fill(&mut rows, vec![1, 2]).unwrap();
        assert_eq!(rows, VecDeque::from([1, 2]));
    }

    #[test]
    fn json_arrays_and_null_are_accepted() {
        let mut value = serde_json::Value::Null;
        value.fill(vec![json!({"id": 1})]).unwrap();
        assert_eq!(value, json!([{"id": 1}]));

        let mut value = json!([]);
        Destination::<i64>::ensure_list(&value).unwrap();
        value.fill(vec![1_i64, 2]).unwrap();
        assert_eq!(value, json!([1, 2]));
    }

    #[test]
    fn json_fill_checks_the_destination_first() {
        let mut value = json!("rows");
        let result = value.fill(vec![1_i64]);

        assert!(matches!(result, Err(Error::InvalidFindDestination(_))));
        assert_eq!(value, json!("rows"));
    }

    #[test]
    fn json_objects_are_rejected() {
        let value = json!({});
        assert!(matches!(
            Destination::<i64>::ensure_list(&value),
            Err(Error::InvalidFindDestination(_))
        ));
    }
}
