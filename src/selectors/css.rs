use anyhow::Result;

/// First element below `root` matching a CSS selector, or null.
pub fn first_js(root: &str, selector: &str) -> Result<String> {
    Ok(format!(
        "{root}.querySelector({sel})",
        root = root,
        sel = serde_json::to_string(selector)?
    ))
}

/// Every element below `root` matching a CSS selector.
pub fn all_js(root: &str, selector: &str) -> Result<String> {
    Ok(format!(
        "Array.from({root}.querySelectorAll({sel}))",
        root = root,
        sel = serde_json::to_string(selector)?
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_selector_is_json_escaped() {
        let js = first_js("root", r#"a[title="x"]"#).unwrap();
        assert_eq!(js, r#"root.querySelector("a[title=\"x\"]")"#);
    }
}
