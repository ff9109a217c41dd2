use chartsync_core_types::{ElementHandle, PortError, Query};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};

/// Installs (once) and returns the page-side handle registry.
///
/// Ids are stable per element through a `WeakMap`; lookups go through
/// `WeakRef` so the registry never keeps a removed node alive. Entries for
/// collected or detached nodes are swept once the map doubles past its last
/// live size.
const REGISTRY: &str = r#"(() => {
  if (window.__chartsync) return window.__chartsync;
  const refs = new Map();
  const ids = new WeakMap();
  let next = 0;
  let limit = 256;
  const sweep = () => {
    for (const [key, ref] of refs) {
      const node = ref.deref();
      if (!node || !node.isConnected) refs.delete(key);
    }
    limit = Math.max(256, refs.size * 2);
  };
  const put = (node) => {
    if (refs.size >= limit) sweep();
    let id = ids.get(node);
    if (id === undefined) {
      next += 1;
      id = String(next);
      ids.set(node, id);
    }
    refs.set(id, new WeakRef(node));
    return id;
  };
  const get = (id) => {
    const ref = refs.get(id);
    const node = ref && ref.deref();
    if (!node || !node.isConnected) {
      refs.delete(id);
      return null;
    }
    return node;
  };
  window.__chartsync = { put, get, size: () => refs.size };
  return window.__chartsync;
})()"#;

pub(crate) const QUERY_ALL: &str = r#"
  const root = args.scope === null ? document : el(args.scope);
  if (args.query.id !== undefined) {
    const node = document.getElementById(args.query.id);
    return node && (root === document || root.contains(node)) ? [reg.put(node)] : [];
  }
  return Array.from(root.querySelectorAll(args.query.css)).map(reg.put);
"#;

pub(crate) const CHILDREN: &str = r#"
  return Array.from(el(args.el).children).map(reg.put);
"#;

pub(crate) const CLOSEST: &str = r##"
  const selector = args.query.id !== undefined ? "#" + CSS.escape(args.query.id) : args.query.css;
  const found = el(args.el).closest(selector);
  return found ? reg.put(found) : null;
"##;

pub(crate) const TEXT: &str = r#"
  return el(args.el).textContent;
"#;

pub(crate) const ATTRIBUTE: &str = r#"
  return el(args.el).getAttribute(args.name);
"#;

pub(crate) const GEOMETRY: &str = r#"
  const node = el(args.el);
  if (node.getClientRects().length === 0) return null;
  const r = node.getBoundingClientRect();
  return { x: r.x, y: r.y, width: r.width, height: r.height };
"#;

pub(crate) const CHILD_COUNT: &str = r#"
  return el(args.el).childElementCount;
"#;

pub(crate) const ACTIVATE: &str = r#"
  el(args.el).click();
  return null;
"#;

pub(crate) const DISPATCH: &str = r#"
  const node = el(args.el);
  let x = args.x;
  let y = args.y;
  if (x === null || y === null) {
    const r = node.getBoundingClientRect();
    x = r.x + r.width / 2;
    y = r.y + r.height / 2;
  }
  node.dispatchEvent(new MouseEvent(args.event, {
    bubbles: true,
    cancelable: true,
    view: window,
    clientX: x,
    clientY: y,
    button: 0,
  }));
  return null;
"#;

pub(crate) const SCROLL: &str = r#"
  el(args.el).scrollIntoView({ behavior: "smooth", block: args.block });
  return null;
"#;

/// Wraps `body` into a self-contained expression evaluated with `args` bound.
pub(crate) fn build(body: &str, args: &Value) -> String {
    format!(
        r#"(() => {{
  const reg = {registry};
  const args = {args};
  const el = (id) => {{
    const node = reg.get(id);
    if (!node) throw {{ __detached: id }};
    return node;
  }};
  try {{
    return {{ ok: (() => {{ {body} }})() }};
  }} catch (e) {{
    if (e && e.__detached !== undefined) return {{ detached: e.__detached }};
    return {{ error: String((e && e.message) || e) }};
  }}
}})()"#,
        registry = REGISTRY,
        args = args,
        body = body,
    )
}

pub(crate) fn query_json(query: &Query) -> Value {
    match query {
        Query::Css(css) => json!({ "css": css }),
        Query::Id(id) => json!({ "id": id }),
    }
}

pub(crate) fn scope_json(scope: Option<&ElementHandle>) -> Value {
    scope.map_or(Value::Null, |h| Value::String(h.as_str().to_string()))
}

#[derive(Debug, Deserialize)]
struct Reply {
    #[serde(default)]
    ok: Value,
    detached: Option<String>,
    error: Option<String>,
}

/// Interprets the wrapper's `{ok}` / `{detached}` / `{error}` envelope.
pub(crate) fn decode<T: DeserializeOwned>(raw: Option<&Value>) -> Result<T, PortError> {
    let raw = raw.ok_or_else(|| PortError::decode("evaluation returned no value"))?;
    let reply: Reply =
        serde_json::from_value(raw.clone()).map_err(|e| PortError::decode(e.to_string()))?;
    if let Some(id) = reply.detached {
        return Err(PortError::Detached(ElementHandle::new(id)));
    }
    if let Some(message) = reply.error {
        return Err(PortError::script(message));
    }
    serde_json::from_value(reply.ok).map_err(|e| PortError::decode(e.to_string()))
}
