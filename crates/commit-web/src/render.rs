//! Server-rendered HTML. Pages are plain strings assembled here and in the
//! handlers; everything user-supplied goes through `escape`.

pub struct Nav {
    pub email: String,
    pub unread: i64,
}

pub fn escape(s: &str) -> String {
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

const STYLES: &str = "
      :root { color-scheme: light; }
      body {
        font-family: system-ui, -apple-system, BlinkMacSystemFont, \"Segoe UI\", sans-serif;
        background: #ffffff;
        color: #0f172a;
        min-height: 100vh;
        margin: 0;
        border-top: 1px solid #e5e7eb;
      }
      .app-nav {
        border-bottom: 1px solid #e5e7eb;
        background: #ffffff;
        display: flex;
        align-items: center;
        justify-content: space-between;
        padding: 14px 24px;
      }
      .app-brand {
        font-weight: 600;
        letter-spacing: 0.08em;
        text-transform: uppercase;
        color: #0f172a;
      }
      .app-nav nav { display: flex; align-items: center; gap: 16px; }
      .app-nav a { color: #0f172a; text-decoration: none; }
      .app-shell { max-width: 920px; margin: 48px auto; padding: 0 24px 64px; }
      .brand-mark {
        letter-spacing: 0.08em;
        text-transform: uppercase;
        font-weight: 600;
        font-size: 0.85rem;
        color: #6b7280;
      }
      .surface {
        border: 1px solid #e5e7eb;
        border-radius: 16px;
        padding: 32px;
        background: #ffffff;
        box-shadow: 0 10px 30px rgba(15, 23, 42, 0.04);
      }
      .surface + .surface { margin-top: 24px; }
      .divider { height: 1px; background: #e5e7eb; margin: 24px 0; }
      label { display: block; margin-bottom: 4px; font-size: 0.9rem; }
      input, textarea, select {
        width: 100%;
        box-sizing: border-box;
        border-radius: 12px;
        border: 1px solid #d1d5db;
        padding: 8px 12px;
        font: inherit;
      }
      form .field { margin-bottom: 16px; }
      button {
        background: #0f172a;
        color: #ffffff;
        border: none;
        border-radius: 999px;
        padding: 10px 24px;
        font: inherit;
        cursor: pointer;
      }
      button:hover { background: #1e293b; }
      button.quiet { background: #ffffff; color: #0f172a; border: 1px solid #d1d5db; }
      .hint { color: #6b7280; font-size: 0.9rem; }
      .status-pill {
        background: #f8fafc;
        border: 1px solid #e2e8f0;
        border-radius: 999px;
        font-size: 0.85rem;
        padding: 6px 14px;
        color: #334155;
      }
      .alert { border-radius: 12px; padding: 12px 16px; margin-bottom: 16px; }
      .alert ul { margin: 0; padding-left: 20px; }
      .alert-success { background: #f0fdf4; border: 1px solid #bbf7d0; color: #166534; }
      .alert-danger { background: #fef2f2; border: 1px solid #fecaca; color: #991b1b; }
      .outcome { display: flex; gap: 8px; align-items: baseline; margin: 6px 0; }
      .outcome .mark { font-weight: 600; }
      .outcome.pass .mark { color: #166534; }
      .outcome.fail .mark { color: #991b1b; }
      .post { border-top: 1px solid #e5e7eb; padding: 16px 0; }
      .post:first-of-type { border-top: none; }
      .post img { max-width: 320px; border-radius: 12px; display: block; margin-top: 8px; }
      .meta { color: #6b7280; font-size: 0.85rem; }
      .badge {
        background: #0f172a;
        color: #ffffff;
        border-radius: 999px;
        font-size: 0.75rem;
        padding: 2px 8px;
        margin-left: 4px;
      }
      .unread { background: #f8fafc; }
";

pub fn layout(title: &str, heading: &str, hint: &str, nav: Option<&Nav>, body: &str) -> String {
    let pill = match nav {
        Some(nav) => format!("Signed in as {}", escape(&nav.email)),
        None => "Not signed in".to_string(),
    };

    let links = match nav {
        Some(nav) => {
            let badge = if nav.unread > 0 {
                format!("<span class=\"badge\">{}</span>", nav.unread)
            } else {
                String::new()
            };
            format!(
                "<a href=\"/commitments\">My commitments</a>\
                 <a href=\"/explore\">Explore</a>\
                 <a href=\"/notifications\">Notifications{badge}</a>\
                 <form method=\"post\" action=\"/logout\" style=\"margin:0\">\
                 <button type=\"submit\" class=\"quiet\">Log out</button></form>"
            )
        }
        None => "<a href=\"/\">Login</a><a href=\"/register\">Register</a>".to_string(),
    };

    let hint_html = if hint.is_empty() {
        String::new()
    } else {
        format!("<p class=\"hint\">{}</p>", escape(hint))
    };

    format!(
        "<!doctype html>\n\
         <html lang=\"en\">\n\
         <head>\n\
         <meta charset=\"utf-8\">\n\
         <meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n\
         <title>{title}</title>\n\
         <style>{STYLES}</style>\n\
         </head>\n\
         <body>\n\
         <div class=\"app-nav\">\n\
         <span class=\"app-brand\">commit</span>\n\
         <nav><span class=\"status-pill\">{pill}</span>{links}</nav>\n\
         </div>\n\
         <div class=\"app-shell\">\n\
         <header>\n\
         <span class=\"brand-mark\">commit</span>\n\
         <h1>{heading}</h1>\n\
         {hint_html}\n\
         </header>\n\
         {body}\n\
         </div>\n\
         </body>\n\
         </html>\n",
        title = escape(title),
        heading = escape(heading),
    )
}

pub fn alert_errors(errors: &[String]) -> String {
    if errors.is_empty() {
        return String::new();
    }
    let items: String = errors
        .iter()
        .map(|e| format!("<li>{}</li>", escape(e)))
        .collect();
    format!("<div class=\"alert alert-danger\" role=\"alert\"><ul>{items}</ul></div>")
}

pub fn alert_success(message: &str) -> String {
    format!(
        "<div class=\"alert alert-success\" role=\"alert\">{}</div>",
        escape(message)
    )
}

pub fn error_page(title: &str, message: &str) -> String {
    let body = format!(
        "<section class=\"surface\"><p>{}</p>\
         <p class=\"hint\"><a href=\"/\">Back to the start</a></p></section>",
        escape(message)
    );
    layout(title, title, "", None, &body)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_neutralizes_markup() {
        assert_eq!(
            escape("<script>alert(\"x\")</script>"),
            "&lt;script&gt;alert(&quot;x&quot;)&lt;/script&gt;"
        );
        assert_eq!(escape("Tom & Jerry's"), "Tom &amp; Jerry&#39;s");
        assert_eq!(escape("plain text"), "plain text");
    }

    #[test]
    fn test_layout_escapes_user_content() {
        let nav = Nav {
            email: "a<b@example.com".to_string(),
            unread: 2,
        };
        let html = layout("T", "<h1>", "", Some(&nav), "<p>body</p>");
        assert!(html.contains("a&lt;b@example.com"));
        assert!(html.contains("&lt;h1&gt;"));
        assert!(html.contains("<p>body</p>"));
        assert!(html.contains("<span class=\"badge\">2</span>"));
    }

    #[test]
    fn test_signed_out_layout_has_auth_links() {
        let html = layout("Login", "Welcome", "", None, "");
        assert!(html.contains("Not signed in"));
        assert!(html.contains("href=\"/register\""));
        assert!(!html.contains("Log out"));
    }

    #[test]
    fn test_alert_errors_lists_each_message() {
        let errors = vec!["first".to_string(), "second".to_string()];
        let html = alert_errors(&errors);
        assert!(html.contains("<li>first</li>"));
        assert!(html.contains("<li>second</li>"));
        assert!(alert_errors(&[]).is_empty());
    }
}
