/// Normalizes a directory into a listing prefix: always ends with `/`
/// unless it is the root (empty) prefix. Idempotent.
pub fn dir_prefix(dir: &str) -> String {
    if dir.is_empty() || dir.ends_with('/') {
        dir.to_string()
    } else {
        format!("{}/", dir)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dir_prefix() {
        let cases = vec![
            ("", ""),
            ("a", "a/"),
            ("a/", "a/"),
            ("logs", "logs/"),
            ("a/b", "a/b/"),
            ("a/b/", "a/b/"),
        ];

        for (dir, expected) in cases {
            assert_eq!(dir_prefix(dir), expected);
        }
    }
}
