/// One equality restriction on the rows a caller may see or touch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Predicate {
    /// Row's department must equal this one. `None` means the caller has no
    /// department, so nothing matches.
    Department(Option<i64>),
    /// Row's owning user must equal this one.
    Owner(i64),
}

/// A conjunction of predicates. An empty filter is unrestricted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Filter {
    predicates: Vec<Predicate>,
}

impl Filter {
    #[must_use]
    pub fn unrestricted() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn department(department_id: Option<i64>) -> Self {
        Self::unrestricted().and(Predicate::Department(department_id))
    }

    #[must_use]
    pub fn owner(user_id: i64) -> Self {
        Self::unrestricted().and(Predicate::Owner(user_id))
    }

    #[must_use]
    pub fn and(mut self, predicate: Predicate) -> Self {
        if !self.predicates.contains(&predicate) {
            self.predicates.push(predicate);
        }
        self
    }

    #[must_use]
    pub fn predicates(&self) -> &[Predicate] {
        &self.predicates
    }
}
