use crate::AppState;
use axum::{extract::State, response::Html};

const UPLOAD_PAGE: &str = include_str!("../../../static/index.html");
const WS_URL_PLACEHOLDER: &str = "__WS_URL__";

/// Serves the drag-and-drop upload page.
///
/// The notification socket URL is injected from config; an empty value makes
/// the page connect to `/ws` on whatever host served it.
pub async fn upload_page(State(state): State<AppState>) -> Html<String> {
    Html(render_upload_page(state.config.ws_url.as_deref()))
}

pub fn render_upload_page(ws_url: Option<&str>) -> String {
    // JSON string literal, with `<` escaped so it cannot close the script tag
    let encoded = serde_json::to_string(ws_url.unwrap_or(""))
        .unwrap_or_else(|_| "\"\"".into())
        .replace('<', "\\u003c");
    UPLOAD_PAGE.replace(WS_URL_PLACEHOLDER, &encoded)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_injects_ws_url() {
        let page = render_upload_page(Some("ws://localhost:3001"));
        assert!(page.contains(r#"const CONFIGURED_WS_URL = "ws://localhost:3001";"#));
        assert!(!page.contains(WS_URL_PLACEHOLDER));
    }

    #[test]
    fn test_render_defaults_to_same_host() {
        let page = render_upload_page(None);
        assert!(page.contains(r#"const CONFIGURED_WS_URL = "";"#));
    }

    #[test]
    fn test_render_escapes_url() {
        let page = render_upload_page(Some("ws://x\"</script>"));
        assert!(page.contains(r#""ws://x\"\u003c/script>""#));
        assert!(!page.contains("x\\\"</script>"));
    }
}
