//! The HTML page sent back for every request.
//!
//! It echoes the request line, the headers and the body. Everything taken
//! from the request is escaped before it is placed in the markup.

use std::fmt::Write;

use crate::http::request::Request;

pub fn render(req: &Request) -> String {
    let mut html = String::with_capacity(512 + req.body.len());

    html.push_str("<h1>Hello!</h1>");
    html.push_str("<h1>How Are You</h1>");
    html.push_str("<h1>How Dumb you are?</h1>");
    let _ = write!(
        html,
        "<p>Method: {} Path: {} Protocol: {}</p>",
        escape_html(&req.method),
        escape_html(&req.path),
        escape_html(&req.version)
    );

    html.push_str("<h2>Headers:</h2>");
    html.push_str("<table><thead><tr><th>Name</th><th>Value</th></tr></thead><tbody>");
    let mut headers: Vec<_> = req.headers.iter().collect();
    headers.sort();
    for (name, value) in headers {
        let _ = write!(
            html,
            "<tr><td>{}</td><td>{}</td></tr>",
            escape_html(name),
            escape_html(value)
        );
    }
    html.push_str("</tbody></table>");

    if !req.body.is_empty() {
        html.push_str("<h2>Request-Body</h2>");
        let _ = write!(
            html,
            "<pre>{}</pre>",
            escape_html(&String::from_utf8_lossy(&req.body))
        );
    }

    html.push_str(
        "<form method=\"post\">\
         <input name=\"name\" type=\"text\" />\
         <button type=\"submit\">SEND</button>\
         </form>",
    );

    html
}

pub fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#x27;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::request::RequestBuilder;

    #[test]
    fn escapes_markup_characters() {
        assert_eq!(
            escape_html(r#"<a href="x">'&'</a>"#),
            "&lt;a href=&quot;x&quot;&gt;&#x27;&amp;&#x27;&lt;/a&gt;"
        );
    }

    #[test]
    fn greeting_headings_come_first() {
        let req = RequestBuilder::new().method("GET").path("/").build().unwrap();
        assert!(render(&req).starts_with(
            "<h1>Hello!</h1><h1>How Are You</h1><h1>How Dumb you are?</h1><p>"
        ));
    }

    #[test]
    fn body_section_only_when_body_present() {
        let empty = RequestBuilder::new().method("GET").path("/").build().unwrap();
        assert!(!render(&empty).contains("Request-Body"));

        let with_body = RequestBuilder::new()
            .method("POST")
            .path("/")
            .body(b"name=<b>".to_vec())
            .build()
            .unwrap();
        let html = render(&with_body);
        assert!(html.contains("<h2>Request-Body</h2><pre>name=&lt;b&gt;</pre>"));
    }

    #[test]
    fn headers_rendered_as_sorted_rows() {
        let req = RequestBuilder::new()
            .method("GET")
            .path("/")
            .header("b", "2")
            .header("a", "1")
            .build()
            .unwrap();
        let html = render(&req);

        let a = html.find("<tr><td>a</td><td>1</td></tr>").unwrap();
        let b = html.find("<tr><td>b</td><td>2</td></tr>").unwrap();
        assert!(a < b);
    }
}
