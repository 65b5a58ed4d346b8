//! Rule names from a target-name template

/// Expand `<path>`, `<basename>`, `<filename>` and `<firstname>` for a file
/// path relative to its declaration file.
///
/// For `src/util/app.test.ts`: `<path>` is `src_util`, `<basename>` is
/// `app.test`, `<filename>` is `app.test.ts` and `<firstname>` is `app`.
pub fn format_target_name(template: &str, relative_path: &str) -> String {
    let normalized = relative_path.replace('\\', "/");
    let normalized = normalized.trim_start_matches("./");
    let (dir, filename) = match normalized.rsplit_once('/') {
        Some((dir, file)) => (dir, file),
        None => ("", normalized),
    };
    let basename = match filename.rsplit_once('.') {
        Some((stem, _)) if !stem.is_empty() => stem,
        _ => filename,
    };
    let firstname = match filename.split_once('.') {
        Some((first, _)) if !first.is_empty() => first,
        _ => filename,
    };

    let expanded = template
        .replace("<path>", &dir.replace('/', "_"))
        .replace("<basename>", basename)
        .replace("<filename>", filename)
        .replace("<firstname>", firstname);

    let name = sanitize(&expanded);
    if name.is_empty() {
        sanitize(firstname)
    } else {
        name
    }
}

/// Replace characters labels cannot hold, collapse `_` runs and trim `_`
fn sanitize(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    for c in name.chars() {
        let c = if c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.' | '+') {
            c
        } else {
            '_'
        };
        if c == '_' && out.ends_with('_') {
            continue;
        }
        out.push(c);
    }
    out.trim_matches('_').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_template_tokens() {
        let path = "src/util/app.test.ts";
        assert_eq!(format_target_name("<path>", path), "src_util");
        assert_eq!(format_target_name("<basename>", path), "app.test");
        assert_eq!(format_target_name("<filename>", path), "app.test.ts");
        assert_eq!(format_target_name("<firstname>", path), "app");
        assert_eq!(format_target_name("<firstname>_test", path), "app_test");
    }

    #[test]
    fn test_empty_path_segment_is_trimmed() {
        assert_eq!(format_target_name("<path>_<firstname>", "app.ts"), "app");
        assert_eq!(format_target_name("<path>", "app.ts"), "app");
        assert_eq!(format_target_name("lib <firstname>", "./my app.ts"), "lib_my_app");
    }
}
