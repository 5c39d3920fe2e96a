use rusqlite::types::Value;

use crate::policy::{Filter, Predicate};

/// The columns a query exposes for scoping. A predicate whose column the
/// query lacks renders as false, so an unsupported restriction can never
/// widen a result set.
#[derive(Debug, Clone, Copy, Default)]
pub struct ScopeColumns {
    pub department: Option<&'static str>,
    pub owner: Option<&'static str>,
}

impl ScopeColumns {
    pub const fn department(column: &'static str) -> Self {
        Self {
            department: Some(column),
            owner: None,
        }
    }

    pub const fn owner(column: &'static str) -> Self {
        Self {
            department: None,
            owner: Some(column),
        }
    }
}

/// Renders `filter` as SQL conditions, each prefixed with ` AND `, using
/// anonymous `?` placeholders. Returns the SQL and the bound values in order.
pub fn render(filter: &Filter, columns: ScopeColumns) -> (String, Vec<Value>) {
    let mut sql = String::new();
    let mut values = Vec::new();

    for predicate in filter.predicates() {
        match (predicate, columns.department, columns.owner) {
            (Predicate::Department(Some(id)), Some(column), _) => {
                sql.push_str(&format!(" AND {column} = ?"));
                values.push(Value::Integer(*id));
            }
            (Predicate::Owner(id), _, Some(column)) => {
                sql.push_str(&format!(" AND {column} = ?"));
                values.push(Value::Integer(*id));
            }
            _ => sql.push_str(" AND 1 = 0"),
        }
    }

    (sql, values)
}
