use regex::Regex;
use std::sync::LazyLock;
use url::Url;

static TITLE_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<title[^>]*>(.*?)</title\s*>").unwrap());
static LINK_TAG_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?is)<link\b[^>]*>").unwrap());
static ATTR_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?is)\b([a-z-]+)\s*=\s*(?:"([^"]*)"|'([^']*)'|([^\s"'>]+))"#).unwrap()
});
static WHITESPACE_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());

/// Text of the first `<title>`, whitespace-collapsed. `None` if absent or blank.
pub(crate) fn extract_title(html: &str) -> Option<String> {
    let raw = TITLE_REGEX.captures(html)?.get(1)?.as_str();
    let title = WHITESPACE_REGEX.replace_all(raw.trim(), " ");
    let title = decode_entities(&title);
    (!title.is_empty()).then_some(title)
}

fn decode_entities(text: &str) -> String {
    text.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&nbsp;", " ")
        .replace("&amp;", "&")
}

struct LinkTag {
    rel: Vec<String>,
    href: String,
}

fn link_tags(html: &str) -> impl Iterator<Item = LinkTag> + '_ {
    LINK_TAG_REGEX.find_iter(html).filter_map(|tag| {
        let mut rel = None;
        let mut href = None;
        for caps in ATTR_REGEX.captures_iter(tag.as_str()) {
            let value = caps
                .get(2)
                .or_else(|| caps.get(3))
                .or_else(|| caps.get(4))
                .map(|m| m.as_str().trim().to_string())
                .unwrap_or_default();
            match caps[1].to_ascii_lowercase().as_str() {
                "rel" => rel = Some(value),
                "href" => href = Some(value),
                _ => {}
            }
        }
        let href = href.filter(|h| !h.is_empty())?;
        let rel = rel?
            .split_ascii_whitespace()
            .map(str::to_ascii_lowercase)
            .collect();
        Some(LinkTag { rel, href })
    })
}

/// Icon declared by the page: `rel="icon"` or `rel="shortcut icon"` first,
/// then `apple-touch-icon`. Relative hrefs are resolved against `base`.
pub(crate) fn extract_icon(html: &str, base: &Url) -> Option<String> {
    let tags: Vec<LinkTag> = link_tags(html).collect();

    let declared = tags
        .iter()
        .find(|tag| tag.rel.iter().any(|r| r == "icon"))
        .or_else(|| {
            tags.iter().find(|tag| {
                tag.rel
                    .iter()
                    .any(|r| r == "apple-touch-icon" || r == "apple-touch-icon-precomposed")
            })
        })?;

    base.join(&declared.href).ok().map(String::from)
}
