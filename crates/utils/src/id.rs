use uuid::Uuid;

/// Build a prefixed entity id such as `task-3f2a...`.
pub fn new_id(prefix: &str) -> String {
    format!("{}-{}", prefix, Uuid::new_v4().simple())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_carry_prefix_and_are_unique() {
        let a = new_id("rfi");
        let b = new_id("rfi");
        assert!(a.starts_with("rfi-"));
        assert_ne!(a, b);
    }
}
