//! Embedded page templates and the tiny `{placeholder}` substitution used to
//! render them.

/// Embeds a file from the crate's `res/` directory.
#[macro_export]
macro_rules! include_res {
    (bytes, $p:expr) => {
        include_bytes!(concat!(env!("CARGO_MANIFEST_DIR"), "/res", $p))
    };
    (str, $p:expr) => {
        include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/res", $p))
    };
}

/// Replaces each `{key}` in the template with its value.
pub fn fill(template: &str, pairs: &[(&str, &str)]) -> String {
    let mut out = template.to_owned();
    for (key, value) in pairs {
        out = out.replace(&format!("{{{key}}}"), value);
    }
    out
}

/// Minimal HTML escaping for user-entered text dropped into templates.
pub fn escape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
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

/// Renders the one-shot notices block for the top of a page.
pub fn flash_html(success: Option<String>, error: Option<String>) -> String {
    let mut out = String::new();
    if let Some(msg) = success {
        out += &format!("<p class=\"flash success\">{}</p>\n", escape(&msg));
    }
    if let Some(msg) = error {
        out += &format!("<p class=\"flash error\">{}</p>\n", escape(&msg));
    }
    out
}
