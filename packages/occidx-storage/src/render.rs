//! Renders domain constraints into parameterized Postgres SQL.
//!
//! Nullable date columns are widened to timestamps with their open side filled by infinity, so a
//! missing start compares as the distant past and a missing end as the distant future.

use sqlx::{Postgres, QueryBuilder};

use occidx_domain::{Constraint, Field, SortDirection, SortSpec, Value};

pub fn push_constraint(builder: &mut QueryBuilder<'_, Postgres>, constraint: &Constraint) {
	match constraint {
		Constraint::Equals { field, value } => push_comparison(builder, *field, "=", value),
		Constraint::NotEquals { field, value } => push_comparison(builder, *field, "<>", value),
		Constraint::LessThan { field, value } => push_comparison(builder, *field, "<", value),
		Constraint::LessOrEqual { field, value } => push_comparison(builder, *field, "<=", value),
		Constraint::GreaterThan { field, value } => push_comparison(builder, *field, ">", value),
		Constraint::GreaterOrEqual { field, value } =>
			push_comparison(builder, *field, ">=", value),
		Constraint::In { field, values } => {
			if values.is_empty() {
				builder.push("FALSE");

				return;
			}

			builder.push(column_expr(*field));
			builder.push(" IN (");

			let mut separated = builder.separated(", ");

			for value in values {
				match value.clone() {
					Value::Int(value) => separated.push_bind(value),
					Value::Text(value) => separated.push_bind(value),
					Value::DateTime(value) => separated.push_bind(value),
				};
			}

			builder.push(")");
		},
		Constraint::And(nodes) => push_group(builder, nodes, " AND ", "TRUE"),
		Constraint::Or(nodes) => push_group(builder, nodes, " OR ", "FALSE"),
	}
}

pub fn push_order_by(builder: &mut QueryBuilder<'_, Postgres>, sort: &SortSpec) {
	builder.push(" ORDER BY ");

	for (column, direction) in sort.orderings() {
		builder.push(column.column());
		builder.push(" ");
		builder.push(direction.as_sql());
		builder.push(match direction {
			SortDirection::Ascending => " NULLS LAST, ",
			SortDirection::Descending => " NULLS FIRST, ",
		});
	}

	builder.push("uid ASC");
}

fn push_comparison(
	builder: &mut QueryBuilder<'_, Postgres>,
	field: Field,
	op: &str,
	value: &Value,
) {
	builder.push(column_expr(field));
	builder.push(" ");
	builder.push(op);
	builder.push(" ");
	push_value(builder, value);
}

fn push_group(
	builder: &mut QueryBuilder<'_, Postgres>,
	nodes: &[Constraint],
	joiner: &str,
	empty: &str,
) {
	if nodes.is_empty() {
		builder.push(empty);

		return;
	}

	builder.push("(");

	for (idx, node) in nodes.iter().enumerate() {
		if idx > 0 {
			builder.push(joiner);
		}

		push_constraint(builder, node);
	}

	builder.push(")");
}

fn push_value(builder: &mut QueryBuilder<'_, Postgres>, value: &Value) {
	match value.clone() {
		Value::Int(value) => builder.push_bind(value),
		Value::Text(value) => builder.push_bind(value),
		Value::DateTime(value) => builder.push_bind(value),
	};
}

fn column_expr(field: Field) -> String {
	match field.open_bound() {
		Some(std::cmp::Ordering::Less) =>
			format!("COALESCE({}, '-infinity'::date)::timestamp", field.column()),
		Some(_) => format!("COALESCE({}, 'infinity'::date)::timestamp", field.column()),
		None => field.column().to_string(),
	}
}

#[cfg(test)]
mod tests {
	use sqlx::{Postgres, QueryBuilder};
	use time::macros::datetime;

	use occidx_domain::{Constraint, Field, SortDirection, SortField, SortSpec};

	use crate::render;

	fn render(constraint: &Constraint) -> String {
		let mut builder = QueryBuilder::<Postgres>::new("");

		render::push_constraint(&mut builder, constraint);

		builder.sql().to_string()
	}

	#[test]
	fn date_columns_fill_open_sides_with_infinity() {
		let constraint = Constraint::And(vec![
			Constraint::less_than(Field::StartDate, datetime!(2024-03-11 00:00)),
			Constraint::greater_or_equal(Field::EndDate, datetime!(2024-03-11 00:00)),
		]);

		assert_eq!(
			render(&constraint),
			"(COALESCE(start_date, '-infinity'::date)::timestamp < $1 AND COALESCE(end_date, 'infinity'::date)::timestamp >= $2)"
		);
	}

	#[test]
	fn set_membership_binds_each_value() {
		assert_eq!(
			render(&Constraint::one_of(Field::Pid, [3_i64, 7])),
			"pid IN ($1, $2)"
		);
		assert_eq!(render(&Constraint::one_of(Field::Pid, Vec::<i64>::new())), "FALSE");
	}

	#[test]
	fn empty_groups_render_identity() {
		assert_eq!(render(&Constraint::And(Vec::new())), "TRUE");
		assert_eq!(render(&Constraint::Or(Vec::new())), "FALSE");
	}

	#[test]
	fn order_by_places_missing_dates_consistently() {
		let mut builder = QueryBuilder::<Postgres>::new("");

		render::push_order_by(
			&mut builder,
			&SortSpec::new(SortField::End, SortDirection::Descending),
		);

		assert_eq!(
			builder.sql(),
			" ORDER BY end_date DESC NULLS FIRST, end_time DESC NULLS FIRST, uid ASC"
		);
	}
}
