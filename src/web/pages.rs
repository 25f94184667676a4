use tera::{Context, Tera};

use crate::web::flash::Flash;

const INDEX_TEMPLATE: &str = "index.html";

/// Tera instance holding the HTML pages compiled into the binary.
/// The `.html` name turns on autoescaping for user-supplied text.
pub fn load_pages() -> Result<Tera, tera::Error> {
    let mut tera = Tera::default();
    tera.add_raw_template(INDEX_TEMPLATE, include_str!("../../templates/index.html"))?;
    Ok(tera)
}

pub fn render_index(
    tera: &Tera,
    flash: Option<&Flash>,
    prompt: &str,
    itinerary: Option<&str>,
) -> Result<String, tera::Error> {
    let mut ctx = Context::new();
    ctx.insert("flash", &flash);
    ctx.insert("prompt", prompt);
    ctx.insert("itinerary", &itinerary);
    tera.render(INDEX_TEMPLATE, &ctx)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_page_has_form_only() {
        let tera = load_pages().unwrap();
        let html = render_index(&tera, None, "", None).unwrap();
        assert!(html.contains(r#"name="prompt""#));
        assert!(!html.contains(r#"id="itinerary""#));
        assert!(!html.contains(r#"role="alert""#));
    }

    #[test]
    fn escapes_user_text() {
        let tera = load_pages().unwrap();
        let html = render_index(&tera, Some(&Flash::danger("<x>")), "<script>", Some("a < b")).unwrap();
        assert!(html.contains("&lt;script&gt;"));
        assert!(html.contains("a &lt; b"));
        assert!(html.contains("flash-danger"));
        assert!(!html.contains("<script>"));
    }
}
