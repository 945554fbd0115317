//! In-page scripts used by the tagger

/// Computes the positional path of `arguments[0]`
///
/// Every level is `localName:nth-of-type(N)`, with N counted among preceding
/// element siblings of the same name, joined root-to-leaf with `" > "`.
/// Ids are never used since real pages carry ids that are not valid CSS.
/// Returns null for anything that is not an element.
pub const ELEMENT_PATH_SCRIPT: &str = r#"
    const el = arguments[0];
    if (!(el instanceof Element)) {
        return null;
    }
    const path = [];
    let node = el;
    while (node && node.nodeType === Node.ELEMENT_NODE) {
        const name = node.localName;
        let nth = 1;
        let sib = node;
        while ((sib = sib.previousElementSibling)) {
            if (sib.localName === name) {
                nth++;
            }
        }
        path.unshift(name + ':nth-of-type(' + nth + ')');
        node = node.parentNode;
    }
    return path.join(' > ');
"#;

/// Separator between levels of a tag
pub const TAG_SEPARATOR: &str = " > ";

/// Split one level of a tag (`div:nth-of-type(2)`) into name and ordinal
pub fn parse_tag_level(level: &str) -> Option<(&str, usize)> {
    let (name, rest) = level.split_once(":nth-of-type(")?;
    let nth = rest.strip_suffix(')')?.parse().ok()?;
    if name.is_empty() || nth == 0 {
        return None;
    }
    Some((name, nth))
}
