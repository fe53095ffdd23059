use bg_core::{ComposedArticle, Error, ImageSet, InsertionPolicy, Result};
use crate::dom::{Element, Fragment, Node, NodePath};

/// In-body image slots; slot `n` shows `ImageSet[n + 1]`.
pub const BODY_IMAGE_SLOTS: usize = 2;

const IMAGE_BLOCK_STYLE: &str = "text-align: center;";

/// Turns generated markup plus an image set into a publishable article.
#[derive(Debug, Clone, Copy, Default)]
pub struct Compositor {
    policy: InsertionPolicy,
}

impl Compositor {
    pub fn new(policy: InsertionPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> InsertionPolicy {
        self.policy
    }

    pub fn compose(&self, markup: &str, images: &ImageSet, default_title: &str) -> Result<ComposedArticle> {
        let mut fragment = Fragment::parse(markup);
        let title = take_title(&mut fragment).unwrap_or_else(|| default_title.to_string());
        let inserted = self.insert_images(&mut fragment, images, &title)?;
        tracing::debug!("Composed {:?} with {} body image(s)", title, inserted);

        Ok(ComposedArticle {
            title,
            body_html: fragment.to_html(),
        })
    }

    /// Place image blocks before the chosen anchors. Returns how many were
    /// inserted.
    fn insert_images(&self, fragment: &mut Fragment, images: &ImageSet, alt: &str) -> Result<usize> {
        let (anchor, points) = insertion_points(fragment);
        if points.len() < BODY_IMAGE_SLOTS {
            let found = points.len();
            return match self.policy {
                InsertionPolicy::Strict => Err(Error::InsertionPointNotFound { anchor, found }),
                InsertionPolicy::SkipImages => {
                    tracing::warn!("Only {} <{}> anchor(s), leaving body without images", found, anchor);
                    Ok(0)
                }
            };
        }

        let mut planned: Vec<(NodePath, &str)> = Vec::with_capacity(BODY_IMAGE_SLOTS);
        for (slot, path) in points.into_iter().enumerate() {
            let index = slot + 1;
            match (images.get(index), self.policy) {
                (Some(url), _) => planned.push((path, url)),
                (None, InsertionPolicy::Strict) => {
                    return Err(Error::MissingImage { index, available: images.len() })
                }
                (None, InsertionPolicy::SkipImages) => {
                    tracing::warn!("No image at index {}, skipping slot before <{}>", index, anchor);
                }
            }
        }

        // later anchors first so earlier paths stay valid
        let count = planned.len();
        for (path, url) in planned.into_iter().rev() {
            fragment.insert_before(&path, image_block(url, alt));
        }
        Ok(count)
    }
}

/// Remove level-1 headings and return the first non-empty heading text.
pub fn take_title(fragment: &mut Fragment) -> Option<String> {
    let title = fragment
        .find_all("h1")
        .iter()
        .filter_map(|path| fragment.element_at(path))
        .map(|heading| collapse_whitespace(&heading.text()))
        .find(|text| !text.is_empty())?;
    fragment.remove_all("h1");
    Some(title)
}

/// The anchor tag in use and the last two of its elements.
///
/// With more than one `<h2>` the images go before the last two headings,
/// otherwise before the last two paragraphs.
pub fn insertion_points(fragment: &Fragment) -> (&'static str, Vec<NodePath>) {
    let headings = fragment.find_all("h2");
    let (anchor, mut candidates) = if headings.len() > 1 {
        ("h2", headings)
    } else {
        ("p", fragment.find_all("p"))
    };
    let skip = candidates.len().saturating_sub(BODY_IMAGE_SLOTS);
    (anchor, candidates.split_off(skip))
}

pub fn image_block(url: &str, alt: &str) -> Node {
    Element::new("div")
        .with_attr("style", IMAGE_BLOCK_STYLE)
        .with_child(
            Element::new("img")
                .with_attr("src", url)
                .with_attr("alt", alt)
                .into(),
        )
        .into()
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn images(n: usize) -> ImageSet {
        (0..n).map(|i| format!("https://img/{}.jpg", i)).collect()
    }

    fn block(i: usize, alt: &str) -> String {
        format!(
            r#"<div style="text-align: center;"><img src="https://img/{}.jpg" alt="{}"></div>"#,
            i, alt
        )
    }

    #[test]
    fn test_leading_heading_becomes_title() {
        let article = Compositor::default()
            .compose("<h1>Foo</h1><p>a</p><p>b</p>", &images(3), "Default")
            .unwrap();
        assert_eq!(article.title, "Foo");
        assert!(!article.body_html.contains("<h1"));
    }

    #[test]
    fn test_every_level_one_heading_is_removed() {
        let article = Compositor::default()
            .compose("<h1>  Foo\n  Bar </h1><p>a</p><h1>again</h1><p>b</p>", &images(3), "Default")
            .unwrap();
        assert_eq!(article.title, "Foo Bar");
        assert!(!article.body_html.contains("<h1"));
    }

    #[test]
    fn test_empty_heading_falls_back_to_default_title() {
        let article = Compositor::default()
            .compose("<h1> </h1><p>a</p><p>b</p>", &images(3), "Default")
            .unwrap();
        assert_eq!(article.title, "Default");

        let article = Compositor::default()
            .compose("<p>a</p><p>b</p>", &images(3), "Default")
            .unwrap();
        assert_eq!(article.title, "Default");
    }

    #[test]
    fn test_images_before_last_two_subheadings() {
        let markup = "<h2>A</h2><p>x</p><h2>B</h2><p>y</p><h2>C</h2><p>z</p>";
        let article = Compositor::default().compose(markup, &images(10), "T").unwrap();
        assert_eq!(
            article.body_html,
            format!(
                "<h2>A</h2><p>x</p>{}<h2>B</h2><p>y</p>{}<h2>C</h2><p>z</p>",
                block(1, "T"),
                block(2, "T")
            )
        );
        assert_eq!(article.body_html.matches("<img").count(), 2);
        assert!(!article.body_html.contains("img/3.jpg"));
    }

    #[test]
    fn test_single_subheading_uses_paragraphs() {
        let markup = "<h2>Only</h2><p>x</p><p>y</p><p>z</p>";
        let article = Compositor::default().compose(markup, &images(3), "T").unwrap();
        assert_eq!(
            article.body_html,
            format!("<h2>Only</h2><p>x</p>{}<p>y</p>{}<p>z</p>", block(1, "T"), block(2, "T"))
        );
    }

    #[test]
    fn test_nested_anchors_are_found() {
        let markup = "<article><section><h2>A</h2></section><div><h2>B</h2></div></article>";
        let article = Compositor::default().compose(markup, &images(3), "T").unwrap();
        assert_eq!(
            article.body_html,
            format!(
                "<article><section>{}<h2>A</h2></section><div>{}<h2>B</h2></div></article>",
                block(1, "T"),
                block(2, "T")
            )
        );
    }

    #[test]
    fn test_too_few_anchors_is_an_error_when_strict() {
        let err = Compositor::new(InsertionPolicy::Strict)
            .compose("<h2>A</h2><p>only one</p>", &images(3), "T")
            .unwrap_err();
        assert!(matches!(err, Error::InsertionPointNotFound { anchor: "p", found: 1 }));
    }

    #[test]
    fn test_too_few_anchors_is_skipped_when_lenient() {
        let article = Compositor::new(InsertionPolicy::SkipImages)
            .compose("<h1>T</h1><p>only one</p>", &images(3), "D")
            .unwrap();
        assert_eq!(article.body_html, "<p>only one</p>");
    }

    #[test]
    fn test_short_image_set() {
        let markup = "<p>a</p><p>b</p>";
        let err = Compositor::new(InsertionPolicy::Strict)
            .compose(markup, &images(2), "T")
            .unwrap_err();
        assert!(matches!(err, Error::MissingImage { index: 2, available: 2 }));

        let article = Compositor::new(InsertionPolicy::SkipImages)
            .compose(markup, &images(2), "T")
            .unwrap();
        assert_eq!(article.body_html, format!("{}<p>a</p><p>b</p>", block(1, "T")));
    }

    #[test]
    fn test_alt_text_is_escaped() {
        let article = Compositor::default()
            .compose(r#"<h1>Say "hi"</h1><p>a</p><p>b</p>"#, &images(3), "T")
            .unwrap();
        assert!(article.body_html.contains(r#"alt="Say &quot;hi&quot;""#));
    }
}
