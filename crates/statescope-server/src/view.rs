//! HTML rendering for the search front end.

use serde_json::Value;
use statescope_search::SearchResult;

/// Everything the search page needs to render.
#[derive(Debug, Default)]
pub struct SearchView {
    /// All registered backend names, in registration order.
    pub backend_names: Vec<String>,
    /// Backend the search ran against.
    pub selected_backend: String,
    /// Logical path that was searched.
    pub spath: String,
    /// Error to surface, if the lookup or the search failed.
    pub error: Option<String>,
    /// Search outcome (zero-valued when an error occurred).
    pub result: SearchResult,
}

impl SearchView {
    /// Render the search page.
    ///
    /// The backend navigation renders regardless of `error`, so browsing
    /// stays possible after a failed search.
    pub fn render(&self) -> String {
        let mut body = String::new();

        body.push_str("<nav class=\"backends\"><span>backends:</span>\n");
        for name in &self.backend_names {
            let class = if *name == self.selected_backend {
                " class=\"selected\""
            } else {
                ""
            };
            body.push_str(&format!(
                "<a{class} href=\"/search?backend={}\">{}</a>\n",
                urlencoding::encode(name),
                escape(name)
            ));
        }
        body.push_str("</nav>\n");

        body.push_str(&format!(
            "<h2>{} on {}</h2>\n",
            escape(&self.spath),
            escape(&self.selected_backend)
        ));

        if let Some(error) = &self.error {
            body.push_str(&format!("<p class=\"error\">{}</p>\n", escape(error)));
        }

        if !self.result.subdirs.is_empty() {
            body.push_str("<ul class=\"subdirs\">\n");
            for (path, target) in &self.result.subdirs {
                body.push_str(&format!(
                    "<li><a href=\"{}\">{}/</a></li>\n",
                    escape(target),
                    escape(path)
                ));
            }
            body.push_str("</ul>\n");
        }

        if !self.result.terraform_version.is_empty() || !self.result.outputs.is_empty() {
            body.push_str(&format!(
                "<p class=\"version\">terraform version {}</p>\n",
                escape(&self.result.terraform_version)
            ));
            body.push_str("<table class=\"outputs\">\n");
            for (name, value) in &self.result.outputs {
                body.push_str(&format!(
                    "<tr><th>{}</th><td><pre>{}</pre></td></tr>\n",
                    escape(name),
                    escape(&pretty(value))
                ));
            }
            body.push_str("</table>\n");
        }

        page("search", &body)
    }
}

/// Render the index page: one link per registered backend.
pub fn render_index(backend_names: &[&str]) -> String {
    let mut body = String::from("<ul class=\"backends\">\n");
    for name in backend_names {
        body.push_str(&format!(
            "<li><a href=\"/search?backend={}\">{}</a></li>\n",
            urlencoding::encode(name),
            escape(name)
        ));
    }
    body.push_str("</ul>\n");
    page("backends", &body)
}

/// Common page skeleton.
fn page(title: &str, body: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>statescope - {}</title>
<link rel="stylesheet" href="/style.css">
</head>
<body>
<h1><a href="/">statescope</a></h1>
{}</body>
</html>
"#,
        escape(title),
        body
    )
}

/// Minimal HTML escaping for text and attribute positions.
fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
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

/// Pretty-print an opaque output value.
fn pretty(value: &Value) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::collections::BTreeMap;

    #[test]
    fn test_escape() {
        assert_eq!(
            escape(r#"<a href="x">&'"#),
            "&lt;a href=&quot;x&quot;&gt;&amp;&#39;"
        );
        assert_eq!(escape("plain"), "plain");
    }

    #[test]
    fn test_render_error_keeps_backend_navigation() {
        let view = SearchView {
            backend_names: vec!["be_1".into(), "be_2".into()],
            selected_backend: "be_2".into(),
            spath: ".".into(),
            error: Some("backend \"nope\" not found".into()),
            result: SearchResult::default(),
        };

        let html = view.render();
        assert!(html.contains("be_1"));
        assert!(html.contains("be_2"));
        assert!(html.contains("class=\"error\""));
        assert!(html.contains("backend &quot;nope&quot; not found"));
    }

    #[test]
    fn test_render_outputs_and_subdirs() {
        let result = SearchResult {
            outputs: BTreeMap::from([("vpc_id".into(), json!("vpc-123"))]),
            terraform_version: "1.5.0".into(),
            subdirs: BTreeMap::from([(
                "infra/network".to_string(),
                "/search?backend=be_1&spath=infra%2Fnetwork".to_string(),
            )]),
        };

        let view = SearchView {
            backend_names: vec!["be_1".into()],
            selected_backend: "be_1".into(),
            spath: "infra".into(),
            error: None,
            result,
        };

        let html = view.render();
        assert!(html.contains("terraform version 1.5.0"));
        assert!(html.contains("vpc_id"));
        assert!(html.contains("&quot;vpc-123&quot;"));
        assert!(html.contains("href=\"/search?backend=be_1&amp;spath=infra%2Fnetwork\""));
    }

    #[test]
    fn test_render_index_links() {
        let html = render_index(&["prod backends", "dev"]);
        assert!(html.contains("href=\"/search?backend=prod%20backends\""));
        assert!(html.contains(">dev</a>"));
    }
}
