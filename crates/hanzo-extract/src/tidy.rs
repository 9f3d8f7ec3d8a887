//! Element filters applied before any rule runs

use scraper::node::Element;

/// Structurally inert for extraction: scripts, interactive controls, media
/// embeds, navigation landmarks
const INERT_TAGS: &[&str] = &[
    "script", "style", "noscript", "template", "iframe", "frame", "frameset", "object",
    "embed", "applet", "audio", "video", "source", "track", "canvas", "map", "area", "input",
    "select", "option", "optgroup", "textarea", "button", "nav", "dialog",
];

/// Dropped unless images are requested
const IMAGE_TAGS: &[&str] = &["img", "picture"];

/// Never rendered, whatever the options
const REMOVED_TAGS: &[&str] = &["meta", "style", "script", "noscript", "link", "textarea", "svg"];

/// True if the element and its subtree are skipped
pub fn is_dropped(element: &Element, include_images: bool) -> bool {
    let name = element.name();
    INERT_TAGS.contains(&name)
        || REMOVED_TAGS.contains(&name)
        || (!include_images && IMAGE_TAGS.contains(&name))
        || has_quoted_attribute(element)
}

/// Malformed markup such as `<div a"b="c">` yields attribute names with quotes
pub fn has_quoted_attribute(element: &Element) -> bool {
    element
        .attrs()
        .any(|(name, _)| name.contains('"') || name.contains('\''))
}

#[cfg(test)]
mod tests {
    use super::*;
    use scraper::{Html, Selector};

    fn first(html: &str, selector: &str) -> Element {
        let document = Html::parse_fragment(html);
        let selector = Selector::parse(selector).unwrap();
        document.select(&selector).next().unwrap().value().clone()
    }

    #[test]
    fn test_denylist() {
        assert!(is_dropped(&first("<button>Go</button>", "button"), true));
        assert!(is_dropped(&first("<nav><a>x</a></nav>", "nav"), true));
        assert!(is_dropped(&first("<svg></svg>", "svg"), true));
        assert!(!is_dropped(&first("<p>text</p>", "p"), false));
    }

    #[test]
    fn test_images_depend_on_option() {
        let img = first(r#"<img src="a.png" alt="A">"#, "img");
        assert!(is_dropped(&img, false));
        assert!(!is_dropped(&img, true));
    }

    #[test]
    fn test_quoted_attribute_names() {
        let broken = first(r#"<div a"b="c">text</div>"#, "div");
        assert!(has_quoted_attribute(&broken));
        assert!(!has_quoted_attribute(&first(r#"<div class="x">text</div>"#, "div")));
    }
}
