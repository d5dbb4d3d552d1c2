//! # Filter specifications
//!
//! An [`EntitySpecification`] turns a query shape into a `sea_orm::Condition`
//! for `get_all`. [`Specification`] builds that condition from optional query
//! fields: `None` (or a blank string, or an empty list) adds no constraint, and
//! everything that is present is combined with AND.
//!
//! ```rust,ignore
//! impl EntitySpecification for TodoSpecification {
//!     type Entity = todo::Entity;
//!     type Query = TodoQuery;
//!
//!     fn specification(&self, query: &TodoQuery) -> Condition {
//!         Specification::new()
//!             .contains(todo::Column::Title, query.title.as_deref())
//!             .equal(todo::Column::Completed, query.completed)
//!             .at_least(todo::Column::Priority, query.min_priority)
//!             .into()
//!     }
//! }
//! ```

use sea_orm::{
    ColumnTrait, Condition, EntityTrait, Value,
    sea_query::{Expr, Func, SimpleExpr},
};

/// Builds the filter predicate and declares the sortable columns of an entity.
pub trait EntitySpecification: Send + Sync {
    type Entity: EntityTrait;
    type Query: Send;

    fn specification(&self, query: &Self::Query) -> Condition;

    /// Columns a client may sort by, keyed by the name used in `sort=`.
    /// Defaults to none; results are then ordered by primary key.
    fn sortable_columns(&self) -> Vec<(&'static str, <Self::Entity as EntityTrait>::Column)> {
        Vec::new()
    }
}

/// Conjunction of optional constraints.
#[derive(Debug, Clone)]
pub struct Specification {
    condition: Condition,
}

impl Default for Specification {
    fn default() -> Self {
        Self::new()
    }
}

impl Specification {
    #[must_use]
    pub fn new() -> Self {
        Self {
            condition: Condition::all(),
        }
    }

    #[must_use]
    pub fn equal<C, V>(self, column: C, value: Option<V>) -> Self
    where
        C: ColumnTrait,
        V: Into<Value>,
    {
        self.with(value.map(|value| column.eq(value)))
    }

    #[must_use]
    pub fn not_equal<C, V>(self, column: C, value: Option<V>) -> Self
    where
        C: ColumnTrait,
        V: Into<Value>,
    {
        self.with(value.map(|value| column.ne(value)))
    }

    /// Case-insensitive substring match. Blank values are ignored.
    #[must_use]
    pub fn contains<C>(self, column: C, value: Option<&str>) -> Self
    where
        C: ColumnTrait,
    {
        let trimmed = value.map(str::trim).filter(|value| !value.is_empty());
        self.with(trimmed.map(|value| {
            Expr::expr(Func::upper(Expr::col(column))).like(format!("%{}%", value.to_uppercase()))
        }))
    }

    #[must_use]
    pub fn at_least<C, V>(self, column: C, value: Option<V>) -> Self
    where
        C: ColumnTrait,
        V: Into<Value>,
    {
        self.with(value.map(|value| column.gte(value)))
    }

    #[must_use]
    pub fn at_most<C, V>(self, column: C, value: Option<V>) -> Self
    where
        C: ColumnTrait,
        V: Into<Value>,
    {
        self.with(value.map(|value| column.lte(value)))
    }

    /// Membership in a list. An absent or empty list is ignored.
    #[must_use]
    pub fn one_of<C, V, I>(self, column: C, values: Option<I>) -> Self
    where
        C: ColumnTrait,
        V: Into<Value>,
        I: IntoIterator<Item = V>,
    {
        let values: Vec<Value> = values
            .into_iter()
            .flatten()
            .map(Into::into)
            .collect();
        if values.is_empty() {
            return self;
        }
        self.with(Some(column.is_in(values)))
    }

    /// Add an arbitrary expression, for filters the helpers do not cover.
    #[must_use]
    pub fn and(self, expr: impl Into<SimpleExpr>) -> Self {
        self.with(Some(expr.into()))
    }

    fn with(mut self, expr: Option<SimpleExpr>) -> Self {
        if let Some(expr) = expr {
            self.condition = self.condition.add(expr);
        }
        self
    }

    #[must_use]
    pub fn build(self) -> Condition {
        self.condition
    }
}

impl From<Specification> for Condition {
    fn from(spec: Specification) -> Self {
        spec.build()
    }
}
