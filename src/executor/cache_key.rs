//! Cache key for query results.

use std::fmt;

/// Identity of a query execution: statement, bounds, SQL and bound values.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct CacheKey {
    parts: Vec<String>,
}

impl CacheKey {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn update(&mut self, part: impl fmt::Display) {
        self.parts.push(part.to_string());
    }

    pub fn len(&self) -> usize {
        self.parts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.parts.join(":"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_equal_parts_equal_keys() {
        let mut a = CacheKey::new();
        let mut b = CacheKey::new();
        for key in [&mut a, &mut b] {
            key.update("users.select");
            key.update(0);
            key.update("SELECT * FROM users WHERE id = ?");
        }
        assert_eq!(a, b);
        assert_eq!(a.to_string(), "users.select:0:SELECT * FROM users WHERE id = ?");

        b.update("Integer(1)");
        assert_ne!(a, b);
        assert_eq!(b.len(), 4);
    }
}
