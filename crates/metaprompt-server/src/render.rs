use metaprompt_core::SessionState;

pub const TITLE: &str = "Prompt Generator";
pub const INPUT_LABEL: &str = "Enter your task or prompt:";
pub const SUBMIT_LABEL: &str = "Generate Prompt";
pub const RESULT_HEADING: &str = "Generated Prompt:";
pub const EDIT_LABEL: &str = "Edit the generated prompt:";

/// Height of the editable result field, in pixels.
const RESULT_HEIGHT_PX: u32 = 200;

const STYLE: &str = "\
body{font-family:system-ui,sans-serif;max-width:48rem;margin:2rem auto;padding:0 1rem;color:#262730}\
label{display:block;margin:1rem 0 .25rem}\
textarea{width:100%;box-sizing:border-box;font:inherit;padding:.5rem}\
button{margin-top:.75rem;padding:.4rem .9rem}\
.error{background:#ffecec;color:#7d1a1a;padding:.75rem;border-radius:.25rem;margin-top:1rem}";

// Writes every edit of the result field back to the session. Each PUT carries
// the generation shown on this page and an increasing revision, so the server
// can drop requests that arrive late or out of order.
const EDIT_SYNC_SCRIPT: &str = r#"<script>
const generated = document.getElementById("generated");
if (generated) {
  const generation = Number(generated.dataset.generation);
  let revision = Number(generated.dataset.revision);
  generated.addEventListener("input", () => {
    revision += 1;
    fetch("/api/session/result", {
      method: "PUT",
      headers: { "Content-Type": "application/json" },
      body: JSON.stringify({ prompt: generated.value, generation, revision }),
    });
  });
}
</script>"#;

/// Render the whole page for a session, with an optional error notice.
///
/// Browsers drop one newline directly after `<textarea>`, so one is always
/// emitted there to keep leading newlines in the content.
pub fn page(state: &SessionState, error: Option<&str>) -> String {
    let mut html = String::new();
    html.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n");
    html.push_str(&format!("<title>{TITLE}</title>\n<style>{STYLE}</style>\n</head>\n<body>\n"));
    html.push_str(&format!("<h1>{TITLE}</h1>\n"));

    html.push_str("<form method=\"post\" action=\"/generate\">\n");
    html.push_str(&format!(
        "<label for=\"task_or_prompt\">{INPUT_LABEL}</label>\n\
         <textarea id=\"task_or_prompt\" name=\"task_or_prompt\" rows=\"6\">\n{}</textarea>\n",
        escape(state.last_input())
    ));
    html.push_str(&format!("<button type=\"submit\">{SUBMIT_LABEL}</button>\n</form>\n"));

    if let Some(msg) = error {
        html.push_str(&format!(
            "<div class=\"error\" role=\"alert\">{}</div>\n",
            escape(msg)
        ));
    }

    if let Some(result) = state.result() {
        html.push_str(&format!("<h2>{RESULT_HEADING}</h2>\n"));
        html.push_str("<form method=\"post\" action=\"/edit\">\n");
        html.push_str(&format!(
            "<label for=\"generated\">{EDIT_LABEL}</label>\n\
             <textarea id=\"generated\" name=\"prompt\" style=\"height:{RESULT_HEIGHT_PX}px\" \
             data-generation=\"{}\" data-revision=\"{}\">\n{}</textarea>\n",
            state.generation(),
            state.revision(),
            escape(result)
        ));
        html.push_str("<noscript><button type=\"submit\">Save</button></noscript>\n</form>\n");
        html.push_str(EDIT_SYNC_SCRIPT);
        html.push('\n');
    }

    html.push_str("</body>\n</html>\n");
    html
}

/// Escape text for use in HTML element content or quoted attributes.
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn idle_page_has_input_only() {
        let html = page(&SessionState::new(), None);
        assert!(html.contains(INPUT_LABEL));
        assert!(html.contains(SUBMIT_LABEL));
        assert!(!html.contains(EDIT_LABEL));
        assert!(!html.contains("class=\"error\""));
    }

    #[test]
    fn result_page_shows_editable_field() {
        let mut state = SessionState::new();
        state.store_generated("You are a haiku writer.");
        let html = page(&state, None);
        assert!(html.contains(RESULT_HEADING));
        assert!(html.contains(EDIT_LABEL));
        assert!(html.contains(">\nYou are a haiku writer.</textarea>"));
        assert!(html.contains("height:200px"));
        assert!(html.contains("/api/session/result"));
    }

    #[test]
    fn result_field_carries_edit_ordering() {
        let mut state = SessionState::new();
        state.store_generated("T");
        state.store_generated("T2");
        state.edit("T2 edited");
        let html = page(&state, None);
        assert!(html.contains("data-generation=\"2\" data-revision=\"1\""));
        assert!(html.contains("JSON.stringify({ prompt: generated.value, generation, revision })"));
        assert!(html.contains("revision += 1;"));
    }

    #[test]
    fn error_notice_is_escaped() {
        let html = page(&SessionState::new(), Some("bad <input>"));
        assert!(html.contains("bad &lt;input&gt;"));
    }

    #[test]
    fn result_cannot_break_out_of_textarea() {
        let mut state = SessionState::new();
        state.store_generated("</textarea><script>alert(1)</script>");
        let html = page(&state, None);
        assert!(!html.contains("</textarea><script>alert(1)"));
        assert!(html.contains("&lt;/textarea&gt;&lt;script&gt;"));
    }

    #[test]
    fn escape_all_specials() {
        assert_eq!(escape(r#"a&b<c>"d'"#), "a&amp;b&lt;c&gt;&quot;d&#39;");
    }
}
