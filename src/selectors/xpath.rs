use anyhow::Result;

/// First node matching an XPath expression, using `root` as context node.
pub fn first_js(root: &str, xpath: &str) -> Result<String> {
    Ok(format!(
        "document.evaluate({xpath}, {root}, null, XPathResult.FIRST_ORDERED_NODE_TYPE, null).singleNodeValue",
        xpath = serde_json::to_string(xpath)?,
        root = root
    ))
}

pub fn all_js(root: &str, xpath: &str) -> Result<String> {
    Ok(format!(
        r#"(() => {{
            const result = document.evaluate({xpath}, {root}, null, XPathResult.ORDERED_NODE_SNAPSHOT_TYPE, null);
            const nodes = [];
            for (let i = 0; i < result.snapshotLength; i++) {{
                nodes.push(result.snapshotItem(i));
            }}
            return nodes;
        }})()"#,
        xpath = serde_json::to_string(xpath)?,
        root = root
    ))
}
