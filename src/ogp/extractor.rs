use lol_html::{element, AsciiCompatibleEncoding, HtmlRewriter, Settings};
use url::Url;

use crate::models::OgpData;

/// Accumulates Open Graph fields from `meta` and `link` open tags as the
/// streaming parser reports them. Owned by a single extraction.
#[derive(Debug)]
pub struct TagExtractor {
    origin: Url,
    data: OgpData,
}

impl TagExtractor {
    pub fn new(page_url: &Url) -> Self {
        TagExtractor {
            origin: origin_of(page_url),
            data: OgpData::default(),
        }
    }

    /// Handle one element-open event. `attr` looks up an attribute value by
    /// name.
    pub fn on_element<F>(&mut self, tag: &str, attr: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if tag.eq_ignore_ascii_case("meta") {
            self.on_meta(attr("property").as_deref(), attr("content"));
        } else if tag.eq_ignore_ascii_case("link") {
            self.on_link(attr("rel").as_deref(), attr("href"));
        }
    }

    fn on_meta(&mut self, property: Option<&str>, content: Option<String>) {
        let Some(property) = property else {
            return;
        };
        match property {
            "og:title" => self.data.title = content,
            "og:description" => self.data.description = content,
            "og:image" => self.data.image = self.resolve(content.as_deref()),
            "og:url" => self.data.url = self.resolve(content.as_deref()),
            "og:site_name" => self.data.site_name = content,
            "og:type" => self.data.og_type = content,
            _ => {}
        }
    }

    fn on_link(&mut self, rel: Option<&str>, href: Option<String>) {
        let is_icon = rel
            .unwrap_or_default()
            .split_whitespace()
            .any(|token| token.eq_ignore_ascii_case("icon"));
        if is_icon {
            self.data.favicon = self.resolve(href.as_deref());
        }
    }

    fn resolve(&self, value: Option<&str>) -> Option<String> {
        let value = value.filter(|v| !v.is_empty())?;
        match self.origin.join(value) {
            Ok(resolved) => Some(resolved.into()),
            Err(e) => {
                tracing::debug!(value, error = %e, "Dropping unresolvable URL attribute");
                None
            }
        }
    }

    /// A rewriter that feeds every `meta`/`link` open tag into this
    /// extractor and discards its output. Write chunks as they arrive, then
    /// call `end`. `encoding` is the initial decoding; a `<meta charset>` tag
    /// may still switch it.
    pub fn rewriter(
        &mut self,
        encoding: AsciiCompatibleEncoding,
    ) -> HtmlRewriter<'_, impl FnMut(&[u8])> {
        HtmlRewriter::new(
            Settings {
                element_content_handlers: vec![element!("meta, link", move |el| {
                    let tag = el.tag_name();
                    self.on_element(&tag, |name| el.get_attribute(name));
                    Ok(())
                })],
                encoding,
                strict: false,
                adjust_charset_on_meta_tag: true,
                ..Settings::default()
            },
            |_: &[u8]| {},
        )
    }

    pub fn finish(self) -> OgpData {
        self.data
    }
}

/// `scheme://host[:port]/` of `page_url`.
fn origin_of(page_url: &Url) -> Url {
    let mut origin = page_url.clone();
    origin.set_path("/");
    origin.set_query(None);
    origin.set_fragment(None);
    let _ = origin.set_username("");
    let _ = origin.set_password(None);
    origin
}

/// Run a complete document through the same streaming path used for live
/// responses.
pub fn extract_from_str(html: &str, page_url: &Url) -> OgpData {
    let mut extractor = TagExtractor::new(page_url);
    let result = {
        let mut rewriter = extractor.rewriter(AsciiCompatibleEncoding::utf_8());
        match rewriter.write(html.as_bytes()) {
            Ok(()) => rewriter.end(),
            Err(e) => Err(e),
        }
    };
    if let Err(e) = result {
        tracing::warn!(error = %e, url = %page_url, "Markup parsing stopped early");
    }
    extractor.finish()
}
