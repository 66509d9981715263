/// Projection expression that selects schema columns by name.
///
/// Operators that project a subset of columns (distinct, group-by) carry a
/// list of these and keep every field matched by at least one of them.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ColumnExpr {
    /// Matches exactly one concrete column.
    Column(String),
    /// Matches a dynamic column family: the base name itself plus every
    /// `base.member` concrete column materialized for it at read time.
    DynColumn(String),
}

impl ColumnExpr {
    #[inline]
    pub fn col(name: impl Into<String>) -> Self {
        ColumnExpr::Column(name.into())
    }

    #[inline]
    pub fn dyn_col(name: impl Into<String>) -> Self {
        ColumnExpr::DynColumn(name.into())
    }

    /// Whether this expression selects the concrete column `name`.
    pub fn match_column(&self, name: &str) -> bool {
        match self {
            ColumnExpr::Column(column) => column == name,
            ColumnExpr::DynColumn(base) => name
                .strip_prefix(base.as_str())
                .is_some_and(|rest| rest.is_empty() || rest.starts_with('.')),
        }
    }
}
