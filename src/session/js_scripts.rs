//! JavaScript evaluated by [`super::ChromeSession`]
//!
//! Every script is an IIFE built by [`build_script`]: the shared prelude,
//! a JSON literal bound to `args`, then the command body. Bodies return
//! `{ status, value, message }` where `status` is `ok`, `stale` or
//! `invalid`.

use serde::Serialize;

use crate::utils::constants::NODE_TAG_ATTRIBUTE;

/// Helpers shared by every command: scope resolution, CSS/XPath lookup,
/// visibility filtering.
const PRELUDE: &str = r#"
    const TAG = args.tagAttribute;

    function resolveScope(scope) {
        if (scope === null || scope === undefined) {
            return document;
        }
        return document.querySelector('[' + TAG + '="' + scope + '"]');
    }

    function findAll(root, kind, expression) {
        if (kind === 'xpath') {
            const snapshot = document.evaluate(
                expression, root, null, XPathResult.ORDERED_NODE_SNAPSHOT_TYPE, null
            );
            const out = [];
            for (let i = 0; i < snapshot.snapshotLength; i++) {
                const node = snapshot.snapshotItem(i);
                if (node && node.nodeType === Node.ELEMENT_NODE) {
                    out.push(node);
                }
            }
            return out;
        }
        return Array.from(root.querySelectorAll(expression));
    }

    function isVisible(el) {
        const style = window.getComputedStyle(el);
        if (style.display === 'none' || style.visibility === 'hidden') {
            return false;
        }
        const rect = el.getBoundingClientRect();
        return rect.width > 0 || rect.height > 0;
    }

    function locate(locator) {
        const root = resolveScope(args.scope);
        if (!root) {
            return { stale: true };
        }
        let nodes;
        try {
            nodes = findAll(root, locator.kind, locator.expression);
        } catch (e) {
            return { invalid: String((e && e.message) || e) };
        }
        if (locator.visible) {
            nodes = nodes.filter(isVisible);
        }
        return { nodes };
    }

    function tagNode(el) {
        let tag = el.getAttribute(TAG);
        if (!tag) {
            window.__tubescrapeSeq = (window.__tubescrapeSeq || 0) + 1;
            tag = args.generation + '-' + window.__tubescrapeSeq;
            el.setAttribute(TAG, tag);
        }
        return tag;
    }

    function failure(found) {
        if (found.stale) {
            return { status: 'stale', value: null, message: null };
        }
        return { status: 'invalid', value: null, message: found.invalid };
    }
"#;

/// Tag every match and return the tags in document order
pub const QUERY_ALL_BODY: &str = r#"
    const found = locate(args.locator);
    if (!found.nodes) {
        return failure(found);
    }
    return { status: 'ok', value: found.nodes.map(tagNode), message: null };
"#;

/// Tag only the first match; used before native clicks and typing
pub const TAG_FIRST_BODY: &str = r#"
    const found = locate(args.locator);
    if (!found.nodes) {
        return failure(found);
    }
    const first = found.nodes[0];
    return { status: 'ok', value: first ? tagNode(first) : null, message: null };
"#;

/// Read text or an attribute of the first match
///
/// Attributes prefer the DOM property when it is a string so that `href`
/// and `src` come back absolute.
pub const READ_BODY: &str = r#"
    const found = locate(args.locator);
    if (!found.nodes) {
        return failure(found);
    }
    const el = found.nodes[0];
    if (!el) {
        return { status: 'ok', value: null, message: null };
    }
    const name = args.attribute;
    if (name === null || name === undefined) {
        const text = el.innerText !== undefined ? el.innerText : el.textContent;
        return { status: 'ok', value: (text || '').trim(), message: null };
    }
    if (!el.hasAttribute(name)) {
        return { status: 'ok', value: null, message: null };
    }
    const prop = el[name];
    const value = typeof prop === 'string' ? prop : el.getAttribute(name);
    return { status: 'ok', value, message: null };
"#;

/// Scroll the window by one step
pub const SCROLL_BODY: &str = r#"
    switch (args.action) {
        case 'page_down':
            window.scrollBy(0, window.innerHeight);
            break;
        case 'to_bottom':
            window.scrollTo(0, document.documentElement.scrollHeight);
            break;
        default:
            window.scrollBy(0, args.pixels);
    }
    return { status: 'ok', value: null, message: null };
"#;

/// Measure a progress signal
pub const MEASURE_BODY: &str = r#"
    if (args.signal === 'vertical_offset') {
        return { status: 'ok', value: Math.round(window.pageYOffset), message: null };
    }
    if (args.signal === 'document_height') {
        return { status: 'ok', value: Math.round(document.documentElement.scrollHeight), message: null };
    }
    const found = locate(args.locator);
    if (!found.nodes) {
        return failure(found);
    }
    return { status: 'ok', value: found.nodes.length, message: null };
"#;

/// Arguments common to every script
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScriptArgs<'a, T: Serialize> {
    pub tag_attribute: &'a str,
    pub generation: u64,
    pub scope: Option<&'a str>,
    #[serde(flatten)]
    pub command: T,
}

impl<'a, T: Serialize> ScriptArgs<'a, T> {
    pub fn new(generation: u64, scope: Option<&'a str>, command: T) -> Self {
        Self {
            tag_attribute: NODE_TAG_ATTRIBUTE,
            generation,
            scope,
            command,
        }
    }
}

/// Assemble an evaluable IIFE from a command body and its arguments.
pub fn build_script<T: Serialize>(
    body: &str,
    args: &ScriptArgs<'_, T>,
) -> Result<String, serde_json::Error> {
    let args_json = serde_json::to_string(args)?;
    Ok(format!(
        "(() => {{\n    const args = {args_json};\n{PRELUDE}\n{body}\n}})()"
    ))
}
