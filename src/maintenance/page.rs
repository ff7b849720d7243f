//! HTML page served to browsers while maintenance is on.

/// Escape text for inclusion in HTML element content.
fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

pub fn render_maintenance_page(message: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>Under maintenance</title>
<style>
body {{ font-family: system-ui, sans-serif; background: #f5f5f5; color: #222; display: flex; min-height: 100vh; align-items: center; justify-content: center; margin: 0; }}
main {{ max-width: 32rem; padding: 2rem; background: #fff; border-radius: 8px; box-shadow: 0 1px 4px rgba(0,0,0,.1); text-align: center; }}
</style>
</head>
<body>
<main>
<h1>We'll be right back</h1>
<p>{}</p>
</main>
</body>
</html>
"#,
        escape_html(message)
    )
}
