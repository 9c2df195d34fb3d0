//! Translation of cursors into boundary predicates and orderings.

use super::{Comparison, Condition, OrderTerm, PageQuery, Predicate};
use crate::Value;
use crate::cursor::{Cursor, CursorField, Direction};

/// Selects the values of `field` that come after its bound value.
///
/// `NULL` sorts after every value, so it follows any value in ascending
/// order and precedes every value in descending order. Returns `None` when
/// nothing can follow.
fn boundary(field: &CursorField, backward: bool, nullable: bool) -> Option<Predicate> {
    let direction = field.effective_direction(backward);
    let condition = |op: Comparison, value: Value| {
        Predicate::Compare(Condition::new(field.name.clone(), op, value))
    };

    match (direction, field.value.is_null()) {
        (Direction::Asc, true) => None,
        (Direction::Desc, true) => Some(condition(Comparison::IsNotNull, Value::Null)),
        (Direction::Asc, false) if nullable => Some(Predicate::Any(vec![
            condition(Comparison::Gt, field.value.clone()),
            condition(Comparison::IsNull, Value::Null),
        ])),
        (direction, false) => Some(condition(direction.comparison(), field.value.clone())),
    }
}

/// Builds the seek predicate selecting rows strictly after the cursor's
/// position in its effective ordering.
///
/// For fields `f0..fn` the predicate is the disjunction over `i` of
/// `f0 = v0 AND ... AND f(i-1) = v(i-1) AND fi op vi`, where `op` is `>` for
/// an effective ascending field and `<` for a descending one. An unbound
/// cursor (no fields, or only `Null` values) yields [`Predicate::Always`].
///
/// Columns are treated as `NOT NULL`; see [`seek_predicate_with`] for
/// nullable columns.
pub fn seek_predicate(cursor: &Cursor) -> Predicate {
    seek_predicate_with(cursor, |_| false)
}

/// Builds the seek predicate, consulting `nullable` for every column.
///
/// A `Null` bound value appears as `IS NULL` in equality prefixes. After a
/// non-null value, an ascending nullable column also admits `IS NULL`; after
/// a `Null` value a descending column admits `IS NOT NULL` and an ascending
/// one contributes no term of its own.
pub fn seek_predicate_with(cursor: &Cursor, nullable: impl Fn(&str) -> bool) -> Predicate {
    if cursor.is_unbound() {
        return Predicate::Always;
    }

    if let [field] = cursor.fields.as_slice() {
        return boundary(field, cursor.backward, nullable(&field.name))
            .unwrap_or_else(|| Predicate::Any(Vec::new()));
    }

    let terms = cursor
        .fields
        .iter()
        .enumerate()
        .filter_map(|(i, field)| {
            let boundary = boundary(field, cursor.backward, nullable(&field.name))?;
            let conditions = cursor.fields[..i]
                .iter()
                .map(|prior| Predicate::Compare(Condition::equal(prior.name.clone(), prior.value.clone())))
                .chain(std::iter::once(boundary))
                .collect();

            Some(Predicate::All(conditions))
        })
        .collect();

    Predicate::Any(terms)
}

/// Builds the ordering: every cursor field in its effective direction.
pub fn order_terms(cursor: &Cursor) -> Vec<OrderTerm> {
    cursor
        .fields
        .iter()
        .map(|field| OrderTerm {
            column: field.name.clone(),
            direction: field.effective_direction(cursor.backward),
        })
        .collect()
}

/// Builds the complete page query: seek predicate, ordering and limit.
pub fn page_query(cursor: &Cursor) -> PageQuery {
    page_query_with(cursor, |_| false)
}

/// Builds the complete page query, consulting `nullable` for every column.
pub fn page_query_with(cursor: &Cursor, nullable: impl Fn(&str) -> bool) -> PageQuery {
    PageQuery {
        filter: seek_predicate_with(cursor, nullable),
        order: order_terms(cursor),
        limit: cursor.limit,
    }
}
