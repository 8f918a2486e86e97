const SEPARATOR: char = '/';
const CURRENT_DIR: &str = ".";
const PARENT_DIR: &str = "..";

/// Resolves `path` against the working directory `cwd` and returns the absolute
/// sequence of segments it names.
///
/// A leading `/` discards `cwd`. `.` and empty segments are skipped, `..` pops the
/// last segment and is a no-op at the root.
pub fn normalize(path: &str, cwd: &[String]) -> Vec<String> {
    let mut tokens = path.split(SEPARATOR).peekable();

    let mut segments = match tokens.peek() {
        Some(first) if first.is_empty() => Vec::new(),
        _ => cwd.to_vec(),
    };

    for token in tokens {
        match token {
            "" | CURRENT_DIR => {}
            PARENT_DIR => {
                segments.pop();
            }
            name => segments.push(name.to_string()),
        }
    }

    segments
}

/// Joins segments the way the working directory is reported: `a/b`, root is empty.
pub fn join_segments(segments: &[String]) -> String {
    segments.join("/")
}

/// Renders segments as an absolute path: `/a/b`, root is `/`.
pub fn display_path(segments: &[String]) -> String {
    format!("{SEPARATOR}{}", join_segments(segments))
}

/// Returns true when `ancestor` equals `path` or is one of its leading prefixes.
pub fn is_prefix_of(ancestor: &[String], path: &[String]) -> bool {
    path.starts_with(ancestor)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::*;

    fn segs(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[rstest]
    #[case("/", &[], &[])]
    #[case("/docs", &["home"], &["docs"])]
    #[case("docs", &["home"], &["home", "docs"])]
    #[case(".", &["home"], &["home"])]
    #[case("", &["home"], &["home"])]
    #[case("..", &["home", "user"], &["home"])]
    #[case("../..", &["home"], &[])]
    #[case("/../../a", &[], &["a"])]
    #[case("a//b/./c/", &[], &["a", "b", "c"])]
    #[case("a/../b", &["x"], &["x", "b"])]
    #[case("//a", &["x"], &["a"])]
    fn normalizes_paths(#[case] path: &str, #[case] cwd: &[&str], #[case] expected: &[&str]) {
        assert_eq!(normalize(path, &segs(cwd)), segs(expected));
    }

    #[test]
    fn popping_past_root_never_goes_negative() {
        let resolved = normalize("../../../../docs", &segs(&["a"]));
        assert_eq!(resolved, segs(&["docs"]));
    }

    #[test]
    fn join_and_display_differ_only_by_leading_separator() {
        let path = segs(&["docs", "a.txt"]);
        assert_eq!(join_segments(&path), "docs/a.txt");
        assert_eq!(display_path(&path), "/docs/a.txt");
        assert_eq!(join_segments(&[]), "");
        assert_eq!(display_path(&[]), "/");
    }

    #[rstest]
    #[case(&[], &["a"], true)]
    #[case(&["a"], &["a"], true)]
    #[case(&["a"], &["a", "b"], true)]
    #[case(&["a", "b"], &["a"], false)]
    #[case(&["ab"], &["a", "b"], false)]
    #[case(&["b"], &["a", "b"], false)]
    fn detects_ancestors(#[case] ancestor: &[&str], #[case] path: &[&str], #[case] expected: bool) {
        assert_eq!(is_prefix_of(&segs(ancestor), &segs(path)), expected);
    }
}
