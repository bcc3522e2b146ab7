#![cfg(target_arch = "wasm32")]

use wasm_bindgen::{JsCast, JsValue};
use web_sys::{Document, Node};

const STYLE_TAG_SELECTOR: &str = "style[data-clinic-ui]";

/// Default shell CSS; override the custom properties to theme it.
pub const DEFAULT_STYLES: &str = r#"
:root {
  --clinic-font-family: 'Inter', system-ui, -apple-system, 'Segoe UI', sans-serif;
  --clinic-bg: #f8fafc;
  --clinic-surface: #ffffff;
  --clinic-border: rgba(148, 163, 184, 0.35);
  --clinic-text: #1f2933;
  --clinic-muted: #52606d;
  --clinic-accent: #0f766e;
  --clinic-accent-text: #ffffff;
  --clinic-danger: #b42318;
  --clinic-radius: 12px;
}

.clinic-root {
  font-family: var(--clinic-font-family);
  color: var(--clinic-text);
  background: var(--clinic-bg);
  min-height: 100vh;
}

.clinic-shell {
  display: grid;
  grid-template-columns: 240px 1fr;
  min-height: 100vh;
}

.clinic-sidebar {
  background: var(--clinic-surface);
  border-right: 1px solid var(--clinic-border);
  padding: 24px 16px;
  display: flex;
  flex-direction: column;
  gap: 4px;
}

.clinic-sidebar a {
  color: var(--clinic-text);
  text-decoration: none;
  padding: 8px 12px;
  border-radius: 8px;
}

.clinic-sidebar a.is-active {
  background: var(--clinic-accent);
  color: var(--clinic-accent-text);
}

.clinic-header {
  display: flex;
  justify-content: space-between;
  align-items: center;
  padding: 16px 28px;
  border-bottom: 1px solid var(--clinic-border);
  background: var(--clinic-surface);
}

.clinic-user {
  color: var(--clinic-muted);
  font-size: 0.9rem;
}

.clinic-outlet {
  padding: 28px;
}

.clinic-card {
  background: var(--clinic-surface);
  border: 1px solid var(--clinic-border);
  border-radius: var(--clinic-radius);
  padding: 28px;
  max-width: 380px;
  margin: 12vh auto 0;
  display: flex;
  flex-direction: column;
  gap: 12px;
}

.clinic-card input {
  padding: 10px 12px;
  border: 1px solid var(--clinic-border);
  border-radius: 8px;
  font: inherit;
}

.clinic-button {
  background: var(--clinic-accent);
  color: var(--clinic-accent-text);
  border: none;
  border-radius: 8px;
  padding: 10px 14px;
  font: inherit;
  cursor: pointer;
}

.clinic-button:disabled {
  opacity: 0.6;
  cursor: progress;
}

.clinic-button.is-ghost {
  background: transparent;
  color: var(--clinic-text);
  border: 1px solid var(--clinic-border);
}

.clinic-error {
  color: var(--clinic-danger);
  margin: 0;
}

@media (max-width: 720px) {
  .clinic-shell {
    grid-template-columns: 1fr;
  }

  .clinic-sidebar {
    flex-direction: row;
    flex-wrap: wrap;
    border-right: none;
    border-bottom: 1px solid var(--clinic-border);
  }
}
"#;

pub fn ensure_styles(document: &Document) -> Result<(), JsValue> {
    if document.query_selector(STYLE_TAG_SELECTOR)?.is_some() {
        return Ok(());
    }

    let head = document
        .head()
        .ok_or_else(|| JsValue::from_str("Document has no <head>"))?;

    let style_el = document.create_element("style")?;
    style_el.set_attribute("data-clinic-ui", "v1")?;
    style_el.set_text_content(Some(DEFAULT_STYLES));
    head.append_child(&style_el.clone().dyn_into::<Node>()?)?;

    Ok(())
}
