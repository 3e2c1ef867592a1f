use anyhow::Result;

/// Every element below `root` whose own text contains `text` (case-insensitive).
pub fn all_js(root: &str, text: &str) -> Result<String> {
    Ok(format!(
        r#"(() => {{
            const target = {text}.toLowerCase();
            const base = {root} === document ? document.body : {root};
            const results = [];
            if (!base) return results;
            const seen = new Set();
            const walker = document.createTreeWalker(base, NodeFilter.SHOW_TEXT, null);
            while (walker.nextNode()) {{
                const node = walker.currentNode;
                if (node.textContent.trim().toLowerCase().includes(target)) {{
                    const el = node.parentElement;
                    if (el && !seen.has(el)) {{
                        seen.add(el);
                        results.push(el);
                    }}
                }}
            }}
            return results;
        }})()"#,
        text = serde_json::to_string(text)?,
        root = root
    ))
}

pub fn first_js(root: &str, text: &str) -> Result<String> {
    Ok(format!("({}[0] || null)", all_js(root, text)?))
}
