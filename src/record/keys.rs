// Storage key construction for index records.
//
// Every record lives under a kind-qualified key so that a class and a function
// sharing a name never collide:
//
// | Pattern               | Record          |
// |-----------------------|-----------------|
// | class:{fqn}           | ClassRecord     |
// | function:{fqn}        | FunctionRecord  |
// | member:{kind}#{name}  | MemberRecord    |
// | file:{path}           | FileRecord      |
//
// Keys are case-sensitive. The same functions build keys for writes and
// lookups, so the policy cannot drift between the two.

/// Prefix for class and interface records
pub const CLASS_PREFIX: &str = "class:";
/// Prefix for function records
pub const FUNCTION_PREFIX: &str = "function:";
/// Prefix for member records
pub const MEMBER_PREFIX: &str = "member:";
/// Prefix for file records
pub const FILE_PREFIX: &str = "file:";

/// Construct the storage key for a class or interface.
///
/// ```ignore
/// assert_eq!(class_key("Shapes.Circle"), "class:Shapes.Circle");
/// ```
pub fn class_key(fqn: &str) -> String {
    format!("{}{}", CLASS_PREFIX, fqn)
}

/// Construct the storage key for a function.
pub fn function_key(fqn: &str) -> String {
    format!("{}{}", FUNCTION_PREFIX, fqn)
}

/// Construct the storage key for a member identifier (`method#name`).
pub fn member_key(identifier: &str) -> String {
    format!("{}{}", MEMBER_PREFIX, identifier)
}

/// Construct the storage key for a file path.
///
/// The path is expected to be normalized already (see
/// [`crate::validation::normalize_path`]).
pub fn file_key(path: &str) -> String {
    format!("{}{}", FILE_PREFIX, path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_class_key_format() {
        assert_eq!(class_key("Shapes.Circle"), "class:Shapes.Circle");
    }

    #[test]
    fn test_function_key_format() {
        assert_eq!(function_key("foo"), "function:foo");
    }

    #[test]
    fn test_member_key_format() {
        assert_eq!(member_key("method#render"), "member:method#render");
    }

    #[test]
    fn test_file_key_format() {
        assert_eq!(file_key("/src/app.ts"), "file:/src/app.ts");
    }

    #[test]
    fn test_same_name_different_kinds_do_not_collide() {
        assert_ne!(class_key("foo"), function_key("foo"));
    }

    #[test]
    fn test_keys_are_case_sensitive() {
        assert_ne!(class_key("Foo"), class_key("foo"));
    }
}
