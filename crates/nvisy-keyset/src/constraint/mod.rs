//! Boundary predicates, orderings and their SQL rendering.
//!
//! A cursor is translated into a [`PageQuery`]: the seek [`Predicate`] that
//! selects rows after the cursor position, the [`OrderTerm`]s of the
//! effective ordering and the row limit. Storage sources either render the
//! query through a [`SqlWriter`] or evaluate it in memory.

mod builder;
mod predicate;
mod writer;

pub use builder::{order_terms, page_query, page_query_with, seek_predicate, seek_predicate_with};
pub use predicate::{Comparison, Condition, OrderTerm, PageQuery, Predicate};
pub use writer::{Placeholder, SqlWriter};

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Value;
    use crate::cursor::{Cursor, Direction};

    fn render(predicate: &Predicate) -> (String, Vec<Value>) {
        let mut writer = SqlWriter::default();
        predicate.render(&mut writer);
        writer.finish()
    }

    #[test]
    fn unbound_cursor_matches_everything() {
        let cursor = Cursor::new(2).with_field("id", Value::Null, Direction::Asc);
        assert_eq!(seek_predicate(&cursor), Predicate::Always);
        assert_eq!(seek_predicate(&Cursor::new(2)), Predicate::Always);

        let cursor = Cursor::new(2)
            .with_field("comment", Value::Null, Direction::Asc)
            .with_field("id", Value::Null, Direction::Desc);
        assert_eq!(seek_predicate(&cursor), Predicate::Always);
    }

    #[test]
    fn leading_null_seeks_within_the_null_group() {
        let cursor = Cursor::new(2)
            .with_field("comment", Value::Null, Direction::Asc)
            .with_field("id", 5, Direction::Asc);

        let (sql, binds) = render(&seek_predicate(&cursor));
        assert_eq!(sql, "(((comment IS NULL) AND (id > ?)))");
        assert_eq!(binds, vec![Value::Int(5)]);
    }

    #[test]
    fn nullable_columns_reach_null_rows() {
        let nullable = |column: &str| column == "rank";

        let ascending = Cursor::new(2)
            .with_field("rank", 3, Direction::Asc)
            .with_field("id", 3, Direction::Asc);
        assert_eq!(
            render(&seek_predicate_with(&ascending, nullable)).0,
            "((((rank > ?) OR (rank IS NULL))) OR ((rank = ?) AND (id > ?)))"
        );

        let descending = Cursor::new(2)
            .with_field("rank", Value::Null, Direction::Desc)
            .with_field("id", 4, Direction::Asc);
        assert_eq!(
            render(&seek_predicate_with(&descending, nullable)).0,
            "(((rank IS NOT NULL)) OR ((rank IS NULL) AND (id > ?)))"
        );

        let single = Cursor::new(2).with_field("rank", 3, Direction::Asc);
        assert_eq!(
            render(&seek_predicate_with(&single, nullable)).0,
            "((rank > ?) OR (rank IS NULL))"
        );
        assert_eq!(render(&seek_predicate(&single)).0, "rank > ?");
    }

    #[test]
    fn null_seek_in_memory() {
        let row = |rank: Option<i64>, id: i64| {
            move |column: &str| match column {
                "rank" => Some(Value::from(rank)),
                "id" => Some(Value::Int(id)),
                _ => None,
            }
        };
        let nullable = |column: &str| column == "rank";

        let after_three = seek_predicate_with(
            &Cursor::new(2)
                .with_field("rank", 3, Direction::Asc)
                .with_field("id", 3, Direction::Asc),
            nullable,
        );
        assert!(after_three.matches_with(&row(None, 1)));
        assert!(after_three.matches_with(&row(Some(4), 1)));
        assert!(!after_three.matches_with(&row(Some(2), 9)));

        let after_null = seek_predicate_with(
            &Cursor::new(2)
                .with_field("rank", Value::Null, Direction::Asc)
                .with_field("id", 4, Direction::Asc),
            nullable,
        );
        assert!(after_null.matches_with(&row(None, 5)));
        assert!(!after_null.matches_with(&row(None, 4)));
        assert!(!after_null.matches_with(&row(Some(9), 9)));
    }

    #[test]
    fn single_field_renders_bare() {
        let cursor = Cursor::new(2).with_field("id", 2, Direction::Asc);
        assert_eq!(render(&seek_predicate(&cursor)), ("id > ?".into(), vec![Value::Int(2)]));

        let cursor = Cursor::new(2).with_field("id", 6, Direction::Desc);
        assert_eq!(render(&seek_predicate(&cursor)), ("id < ?".into(), vec![Value::Int(6)]));
    }

    #[test]
    fn backward_reverses_operators_and_ordering() {
        let cursor = Cursor::new(2).with_field("id", 5, Direction::Asc).set_backward();

        assert_eq!(render(&seek_predicate(&cursor)).0, "id < ?");
        assert_eq!(
            order_terms(&cursor),
            vec![OrderTerm {
                column: "id".into(),
                direction: Direction::Desc,
            }]
        );
    }

    #[test]
    fn multiple_fields_render_lexicographic_disjunction() {
        let cursor = Cursor::new(2)
            .with_field("comment", "A", Direction::Asc)
            .with_field("id", 6, Direction::Desc);

        let (sql, binds) = render(&seek_predicate(&cursor));
        assert_eq!(sql, "(((comment > ?)) OR ((comment = ?) AND (id < ?)))");
        assert_eq!(binds, vec![Value::from("A"), Value::from("A"), Value::Int(6)]);
    }

    #[test]
    fn three_fields() {
        let cursor = Cursor::new(2)
            .with_field("\"Author__name\"", "B", Direction::Desc)
            .with_field("comment", "C", Direction::Asc)
            .with_field("id", 4, Direction::Asc);

        let (sql, binds) = render(&seek_predicate(&cursor));
        assert_eq!(
            sql,
            "(((\"Author__name\" < ?)) OR ((\"Author__name\" = ?) AND (comment > ?)) \
             OR ((\"Author__name\" = ?) AND (comment = ?) AND (id > ?)))"
        );
        assert_eq!(binds.len(), 6);
    }

    #[test]
    fn null_prefix_values_render_is_null() {
        let cursor = Cursor::new(2)
            .with_field("comment", "A", Direction::Asc)
            .with_field("public_at", Value::Null, Direction::Asc)
            .with_field("id", 3, Direction::Asc);

        let (sql, binds) = render(&seek_predicate(&cursor));
        assert_eq!(
            sql,
            "(((comment > ?)) OR ((comment = ?) AND (public_at IS NULL) AND (id > ?)))"
        );
        assert_eq!(binds, vec![Value::from("A"), Value::from("A"), Value::Int(3)]);
    }

    #[test]
    fn numbered_placeholders_continue_after_offset() {
        let cursor = Cursor::new(2)
            .with_field("comment", "A", Direction::Asc)
            .with_field("id", 6, Direction::Desc);

        let mut writer = SqlWriter::new(Placeholder::Numbered).with_offset(1);
        seek_predicate(&cursor).render(&mut writer);
        assert_eq!(
            writer.sql(),
            "(((comment > $2)) OR ((comment = $3) AND (id < $4)))"
        );
        assert_eq!(writer.binds().len(), 3);
    }

    #[test]
    fn page_query_combines_filter_order_and_limit() {
        let cursor = Cursor::new(3)
            .with_field("comment", Value::Null, Direction::Asc)
            .with_field("id", Value::Null, Direction::Desc);

        let query = page_query(&cursor);
        assert!(query.filter.is_always());
        assert_eq!(query.limit, 3);

        let mut writer = SqlWriter::default();
        OrderTerm::render_list(&query.order, &mut writer);
        assert_eq!(writer.sql(), "comment ASC, id DESC");
    }

    #[test]
    fn conjunction_absorbs_always() {
        let bound = seek_predicate(&Cursor::new(2).with_field("id", 2, Direction::Asc));
        let window = seek_predicate(&Cursor::new(2).with_field("id", 6, Direction::Asc).set_backward());

        assert_eq!(Predicate::Always.and(bound.clone()), bound);
        assert_eq!(bound.clone().and(Predicate::Always), bound);
        assert_eq!(
            bound.and(window).to_string(),
            "((id > ?) AND (id < ?))"
        );
    }

    #[test]
    fn in_memory_evaluation_follows_sql_semantics() {
        let lookup = |column: &str| match column {
            "comment" => Some(Value::from("A")),
            "id" => Some(Value::Int(7)),
            "public_at" => Some(Value::Null),
            _ => None,
        };

        let after = Cursor::new(2)
            .with_field("comment", "A", Direction::Asc)
            .with_field("id", 6, Direction::Asc);
        assert!(seek_predicate(&after).matches_with(&lookup));

        let before = after.clone().set_backward();
        assert!(!seek_predicate(&before).matches_with(&lookup));

        let null_compare = Predicate::Compare(Condition::new("public_at", Comparison::Gt, 1));
        assert!(!null_compare.matches_with(&lookup));

        let is_null = Predicate::Compare(Condition::equal("public_at", Value::Null));
        assert!(is_null.matches_with(&lookup));

        let unknown = Predicate::Compare(Condition::new("missing", Comparison::Eq, 1));
        assert!(!unknown.matches_with(&lookup));
    }
}
