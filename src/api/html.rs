use axum::response::Html;

/// Path prefix the HTML pages are served under. Links in the pages are built from it.
#[derive(Debug, Clone, Default)]
pub struct BasePath(String);

impl BasePath {
	pub fn new(base_path: &str) -> Self {
		Self(base_path.trim_end_matches('/').to_owned())
	}

	/// Prefixes a root-absolute `path` with the base path. The root of a nested router has no
	/// trailing slash.
	pub fn link(&self, path: &str) -> String {
		if path == "/" && !self.0.is_empty() {
			return self.0.clone();
		}
		format!("{}{path}", self.0)
	}
}

/// Escapes text for use in HTML element content and attribute values.
pub fn escape(text: &str) -> String {
	let mut escaped = String::with_capacity(text.len());
	for c in text.chars() {
		match c {
			'&' => escaped.push_str("&amp;"),
			'<' => escaped.push_str("&lt;"),
			'>' => escaped.push_str("&gt;"),
			'"' => escaped.push_str("&quot;"),
			'\'' => escaped.push_str("&#39;"),
			c => escaped.push(c),
		}
	}
	escaped
}

pub fn page(base: &BasePath, title: &str, body: &str) -> Html<String> {
	Html(format!(
		r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>{title}</title>
<style>
body {{ font-family: sans-serif; margin: 2em; }}
table {{ border-collapse: collapse; }}
th, td {{ border: 1px solid #ccc; padding: 0.3em 0.6em; text-align: left; }}
textarea {{ width: 100%; font-family: monospace; }}
.error {{ color: #b00020; }}
</style>
</head>
<body>
<nav><a href="{home}">Datasets</a> | <a href="{sparql}">SPARQL</a></nav>
<h1>{title}</h1>
{body}
</body>
</html>"#,
		title = escape(title),
		home = escape(&base.link("/")),
		sparql = escape(&base.link("/sparql-ui")),
	))
}

/// Renders a table with one column per header. Cells are escaped.
pub fn table<R, C>(headers: &[&str], rows: R) -> String
where
	R: IntoIterator<Item = C>,
	C: IntoIterator<Item = String>,
{
	let mut html = String::from("<table>\n<tr>");
	for header in headers {
		html.push_str(&format!("<th>{}</th>", escape(header)));
	}
	html.push_str("</tr>\n");
	for row in rows {
		html.push_str("<tr>");
		for cell in row {
			html.push_str(&format!("<td>{}</td>", escape(&cell)));
		}
		html.push_str("</tr>\n");
	}
	html.push_str("</table>");
	html
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn escape_markup() {
		assert_eq!(
			escape(r#"<a href="x">Tom & 'Jerry'</a>"#),
			"&lt;a href=&quot;x&quot;&gt;Tom &amp; &#39;Jerry&#39;&lt;/a&gt;"
		);
	}

	#[test]
	fn links_follow_base_path() {
		assert_eq!(BasePath::new("/").link("/sparql-ui"), "/sparql-ui");
		assert_eq!(BasePath::new("").link("/"), "/");
		assert_eq!(BasePath::new("/fdp/").link("/sparql-ui"), "/fdp/sparql-ui");

		let Html(html) = page(&BasePath::new("/fdp"), "Title", "");
		assert!(html.contains(r#"<a href="/fdp">Datasets</a>"#));
		assert!(html.contains(r#"<a href="/fdp/sparql-ui">SPARQL</a>"#));
	}

	#[test]
	fn table_escapes_cells() {
		let html = table(&["modality"], [vec![String::from("<CT>")]]);
		assert!(html.contains("<th>modality</th>"));
		assert!(html.contains("<td>&lt;CT&gt;</td>"));
	}
}
