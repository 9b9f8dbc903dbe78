// src/render/html.rs

use super::table::DataTable;

/// Escape text for use in element content and attribute values.
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

/// Every page of `table`'s current view as a `<table>`, one
/// `<tbody data-page="n">` per page. Only the current page is visible; the
/// pager buttons and the script in [`document`] switch between them.
pub fn table_fragment(target: &str, table: &DataTable) -> String {
    let id = escape(target);
    let pages = table.page_count();
    let current = table.current_page();

    let mut html = String::new();
    html.push_str(&format!(
        "<table id=\"{}\" class=\"display\" data-page=\"{}\" data-pages=\"{}\">\n",
        id, current, pages
    ));

    html.push_str("<thead><tr>");
    for title in table.columns() {
        html.push_str(&format!("<th>{}</th>", escape(title)));
    }
    html.push_str("</tr></thead>\n");

    for n in 1..=pages {
        html.push_str(&format!(
            "<tbody data-page=\"{}\" data-info=\"{}\"{}>\n",
            n,
            escape(&table.info_for(n)),
            if n == current { "" } else { " hidden" }
        ));
        for row in table.rows_on_page(n) {
            html.push_str("<tr>");
            for cell in row {
                html.push_str(&format!("<td>{}</td>", escape(&cell.to_string())));
            }
            html.push_str("</tr>\n");
        }
        html.push_str("</tbody>\n");
    }
    html.push_str("</table>\n");

    html.push_str(&format!(
        "<p class=\"table-info\" data-for=\"{}\">{}</p>\n",
        id,
        escape(&table.info())
    ));
    if pages > 1 {
        html.push_str(&format!("<nav class=\"pager\" data-for=\"{}\">", id));
        for n in 1..=pages {
            html.push_str(&format!("<button type=\"button\" data-goto=\"{}\">{}</button>", n, n));
        }
        html.push_str("</nav>\n");
    }
    html
}

// Shows the tbody picked by a pager button and copies its info line.
const PAGER_SCRIPT: &str = r#"<script>
document.querySelectorAll("nav.pager").forEach(function (nav) {
  var id = nav.dataset.for;
  var table = document.getElementById(id);
  var info = document.querySelector('p.table-info[data-for="' + id + '"]');
  nav.addEventListener("click", function (ev) {
    var n = ev.target.dataset.goto;
    if (!n) return;
    table.querySelectorAll("tbody[data-page]").forEach(function (body) {
      body.hidden = body.dataset.page !== n;
      if (!body.hidden && info) info.textContent = body.dataset.info;
    });
    table.dataset.page = n;
  });
});
</script>
"#;

/// A titled block on the generated page.
pub struct Section {
    pub target: String,
    pub title: String,
    pub body: String,
}

/// Wrap already-rendered sections in a standalone HTML page.
pub fn document(title: &str, generated_at: &str, sections: &[Section]) -> String {
    let mut html = String::from("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n");
    html.push_str("<meta charset=\"utf-8\">\n");
    html.push_str(&format!("<title>{}</title>\n", escape(title)));
    html.push_str("</head>\n<body>\n");
    html.push_str(&format!("<h1>{}</h1>\n", escape(title)));
    for s in sections {
        html.push_str(&format!(
            "<section id=\"{}-section\">\n<h2>{}</h2>\n{}</section>\n",
            escape(&s.target),
            escape(&s.title),
            s.body
        ));
    }
    html.push_str(&format!("<footer>Generated {}</footer>\n", escape(generated_at)));
    html.push_str(PAGER_SCRIPT);
    html.push_str("</body>\n</html>\n");
    html
}
