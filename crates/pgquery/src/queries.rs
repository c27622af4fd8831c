//! Predicate sets: column filters and assignments that compile into a WHERE clause.
//!
//! A [`Queries`] maps a [`Column`] to exactly one [`Query`] (an operator and
//! its operands). Entries keep their insertion order, so compiled clauses and
//! parameter lists are deterministic.
//!
//! ```ignore
//! use pgquery::{Operator, Queries};
//!
//! let queries = Queries::new()
//!     .add("lastname", ["Doe"])
//!     .add_with("age", Operator::Greater, [18]);
//!
//! let (clause, params) = queries.where_clause();
//! assert_eq!(clause, "lastname = $1 AND age > $2");
//! assert_eq!(params.len(), 2);
//! ```

use crate::error::{OrmError, OrmResult};
use crate::operator::Operator;
use crate::value::Value;
use indexmap::IndexMap;
use indexmap::map::Entry;
use url::Url;

/// Whether a column entry filters rows or assigns a value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    Filter,
    Assignment,
}

/// Storage key of a predicate entry.
///
/// The same column name may appear twice in a [`Queries`]: once as a filter
/// and once as an assignment.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Column {
    name: String,
    role: Role,
}

impl Column {
    pub fn filter(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            role: Role::Filter,
        }
    }

    pub fn assignment(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            role: Role::Assignment,
        }
    }

    /// The bare column name, as rendered in SQL.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn is_assignment(&self) -> bool {
        self.role == Role::Assignment
    }
}

/// One predicate entry: an operator and its operands.
#[derive(Debug, Clone, PartialEq)]
pub struct Query {
    operator: Operator,
    values: Vec<Value>,
}

impl Query {
    pub fn new(operator: Operator, values: Vec<Value>) -> Self {
        Self { operator, values }
    }

    pub fn operator(&self) -> Operator {
        self.operator
    }

    pub fn values(&self) -> &[Value] {
        &self.values
    }

    /// Entry length including the operator slot.
    pub fn len(&self) -> usize {
        self.values.len() + 1
    }

    /// Whether the operand count matches the operator's arity.
    ///
    /// `In` accepts any count; an empty `In` compiles to an always-false
    /// fragment.
    pub fn is_well_formed(&self) -> bool {
        match self.operator.arity() {
            Some(arity) => self.len() == arity,
            None => true,
        }
    }
}

/// An ordered set of predicate entries keyed by column.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Queries {
    entries: IndexMap<Column, Query>,
}

impl Queries {
    /// Create an empty predicate set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a predicate set from the query part of a URL.
    ///
    /// Every distinct parameter name becomes one [`Queries::add`] call with all
    /// of its values: `?age=18` yields `age = $1`, `?id=1&id=2` yields
    /// `id IN ($1, $2)`.
    pub fn from_url(url: &Url) -> Self {
        Self::from_pairs(url.query_pairs().map(|(k, v)| (k.into_owned(), v.into_owned())))
    }

    /// Build a predicate set from a raw query string (`a=1&b=2`, leading `?` allowed).
    pub fn from_query_str(query: &str) -> Self {
        let query = query.strip_prefix('?').unwrap_or(query);
        Self::from_pairs(
            url::form_urlencoded::parse(query.as_bytes())
                .map(|(k, v)| (k.into_owned(), v.into_owned())),
        )
    }

    fn from_pairs(pairs: impl Iterator<Item = (String, String)>) -> Self {
        let mut grouped: IndexMap<String, Vec<String>> = IndexMap::new();
        for (key, value) in pairs {
            grouped.entry(key).or_default().push(value);
        }
        grouped
            .into_iter()
            .fold(Self::new(), |queries, (key, values)| queries.add(&key, values))
    }

    /// Add operands for a column filter.
    ///
    /// - no values: the set is unchanged;
    /// - new column: `=` for a single value, `IN` otherwise;
    /// - existing column holding a single operand: promoted to `IN`, then the
    ///   values are appended.
    pub fn add<V: Into<Value>>(self, column: &str, values: impl IntoIterator<Item = V>) -> Self {
        let values: Vec<Value> = values.into_iter().map(Into::into).collect();
        if values.is_empty() {
            return self;
        }
        self.insert(column, None, values)
    }

    /// Add an entry governed by an explicit operator.
    ///
    /// `Operator::Set` stores the entry as an assignment. On a column that
    /// already has a filter entry the values merge as with [`Queries::add`].
    /// An empty operand list never changes an existing entry.
    pub fn add_with<V: Into<Value>>(
        self,
        column: &str,
        operator: Operator,
        values: impl IntoIterator<Item = V>,
    ) -> Self {
        let values = values.into_iter().map(Into::into).collect();
        self.insert(column, Some(operator), values)
    }

    /// Assign a value to a column (`SET column = value`).
    ///
    /// Assigning the same column again replaces the previous value.
    pub fn set<V: Into<Value>>(self, column: &str, value: V) -> Self {
        self.add_with(column, Operator::Set, [value])
    }

    fn insert(mut self, column: &str, operator: Option<Operator>, values: Vec<Value>) -> Self {
        let key = match operator {
            Some(op) if op.is_assignment() => Column::assignment(column),
            _ => Column::filter(column),
        };
        match self.entries.entry(key) {
            Entry::Occupied(mut entry) => {
                let query = entry.get_mut();
                if values.is_empty() {
                    return self;
                }
                if query.operator.is_assignment() {
                    query.values = values;
                } else {
                    if query.values.len() == 1 {
                        query.operator = Operator::In;
                    }
                    query.values.extend(values);
                }
            }
            Entry::Vacant(entry) => {
                let operator = operator.unwrap_or(if values.len() == 1 {
                    Operator::Equal
                } else {
                    Operator::In
                });
                entry.insert(Query::new(operator, values));
            }
        }
        self
    }

    /// Number of entries (filters and assignments).
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The filter entry for a column.
    pub fn get(&self, column: &str) -> Option<&Query> {
        self.entries.get(&Column::filter(column))
    }

    /// The assignment entry for a column.
    pub fn get_assignment(&self, column: &str) -> Option<&Query> {
        self.entries.get(&Column::assignment(column))
    }

    /// Iterate over entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&Column, &Query)> {
        self.entries.iter()
    }

    /// Iterate over assignment entries in insertion order.
    pub fn assignments(&self) -> impl Iterator<Item = (&Column, &Query)> {
        self.entries
            .iter()
            .filter(|(column, _)| column.is_assignment())
    }

    /// Compile the filter entries into a WHERE clause (without the keyword).
    ///
    /// Entries whose operand count does not match their operator, and
    /// assignments, are skipped. An empty set yields an empty clause.
    pub fn where_clause(&self) -> (String, Vec<Value>) {
        self.where_clause_from(0)
    }

    /// Like [`Queries::where_clause`], numbering placeholders after `offset`.
    pub fn where_clause_from(&self, offset: usize) -> (String, Vec<Value>) {
        let mut params: Vec<Value> = Vec::new();
        let mut fragments: Vec<String> = Vec::new();
        let mut next = |value: &Value| {
            params.push(value.clone());
            format!("${}", offset + params.len())
        };

        for (column, query) in &self.entries {
            if column.is_assignment() {
                continue;
            }
            let name = column.name();
            match query.operator {
                Operator::In if query.values.is_empty() => {
                    fragments.push("1=0".to_string());
                }
                Operator::In => {
                    let placeholders: Vec<String> = query.values.iter().map(&mut next).collect();
                    fragments.push(format!("{} IN ({})", name, placeholders.join(", ")));
                }
                _ if !query.is_well_formed() => {
                    tracing::debug!(
                        column = name,
                        operator = %query.operator,
                        operands = query.values.len(),
                        "skipping malformed predicate"
                    );
                }
                Operator::Between => {
                    let low = next(&query.values[0]);
                    let high = next(&query.values[1]);
                    fragments.push(format!("{name} BETWEEN {low} AND {high}"));
                }
                operator => {
                    let placeholder = next(&query.values[0]);
                    fragments.push(format!("{name} {operator} {placeholder}"));
                }
            }
        }

        (fragments.join(" AND "), params)
    }

    /// Report the first filter entry the clause compiler would drop.
    pub fn validate(&self) -> OrmResult<()> {
        let malformed = self
            .entries
            .iter()
            .filter(|(column, _)| !column.is_assignment())
            .find(|(_, query)| !query.is_well_formed());
        match malformed {
            Some((column, query)) => Err(OrmError::MalformedPredicate {
                column: column.name().to_string(),
                operator: query.operator,
                expected: query.operator.operand_count().unwrap_or_default(),
                got: query.values.len(),
            }),
            None => Ok(()),
        }
    }
}

impl<'a> IntoIterator for &'a Queries {
    type Item = (&'a Column, &'a Query);
    type IntoIter = indexmap::map::Iter<'a, Column, Query>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}
