//! Strict parser for arXiv Atom feeds.
//!
//! Every field of [`QueryResult`] is required. A missing element or attribute
//! fails the whole feed instead of producing a partial record.

use quick_xml::events::attributes::AttrError;
use quick_xml::events::{BytesStart, Event};
use quick_xml::name::{Namespace, ResolveResult};
use quick_xml::reader::NsReader;

use super::types::QueryResult;

const ATOM_NS: &[u8] = b"http://www.w3.org/2005/Atom";
const ARXIV_NS: &[u8] = b"http://arxiv.org/schemas/atom";

#[derive(Debug, thiserror::Error)]
pub enum FeedError {
    #[error("malformed feed: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("malformed feed: {0}")]
    Attribute(#[from] AttrError),

    #[error("malformed feed: {0}")]
    Structure(&'static str),

    #[error("malformed feed: unbound namespace prefix '{0}'")]
    UnboundPrefix(String),

    #[error("malformed feed: entry {entry} has no <{element}>")]
    MissingElement { entry: usize, element: &'static str },

    #[error("malformed feed: entry {entry} <{element}> has no '{attribute}' attribute")]
    MissingAttribute {
        entry: usize,
        element: &'static str,
        attribute: &'static str,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Ns {
    Atom,
    Arxiv,
    Other,
}

fn namespace_of(resolved: &ResolveResult<'_>) -> Result<Ns, FeedError> {
    match resolved {
        ResolveResult::Bound(Namespace(ns)) if *ns == ATOM_NS => Ok(Ns::Atom),
        ResolveResult::Bound(Namespace(ns)) if *ns == ARXIV_NS => Ok(Ns::Arxiv),
        ResolveResult::Unknown(prefix) => Err(FeedError::UnboundPrefix(
            String::from_utf8_lossy(prefix).into_owned(),
        )),
        _ => Ok(Ns::Other),
    }
}

#[derive(Debug, Clone, Copy)]
enum TextField {
    Id,
    Updated,
    Published,
    Title,
    Summary,
    AuthorName,
}

#[derive(Default)]
struct EntryBuilder {
    id: Option<String>,
    updated: Option<String>,
    published: Option<String>,
    title: Option<String>,
    summary: Option<String>,
    authors: Vec<String>,
    link: Option<String>,
    pdf_link: Option<String>,
    primary_category: Option<String>,
    categories: Vec<String>,
    in_author: bool,
    author_name: Option<String>,
}

impl EntryBuilder {
    /// First occurrence wins, matching `find()` semantics.
    fn set_text(&mut self, field: TextField, text: String) {
        let slot = match field {
            TextField::Id => &mut self.id,
            TextField::Updated => &mut self.updated,
            TextField::Published => &mut self.published,
            TextField::Title => &mut self.title,
            TextField::Summary => &mut self.summary,
            TextField::AuthorName => &mut self.author_name,
        };
        if slot.is_none() {
            *slot = Some(text);
        }
    }

    fn start_author(&mut self) {
        self.in_author = true;
        self.author_name = None;
    }

    fn finish_author(&mut self, entry: usize) -> Result<(), FeedError> {
        self.in_author = false;
        let name = self.author_name.take().ok_or(FeedError::MissingElement {
            entry,
            element: "author/name",
        })?;
        self.authors.push(name);
        Ok(())
    }

    fn add_link(&mut self, e: &BytesStart<'_>, entry: usize) -> Result<(), FeedError> {
        let rel = attribute(e, "rel")?;
        let title = attribute(e, "title")?;

        if self.link.is_none() && rel.as_deref() == Some("alternate") {
            self.link = Some(required_attribute(e, entry, "link", "href")?);
        }
        if self.pdf_link.is_none() && title.as_deref() == Some("pdf") {
            self.pdf_link = Some(required_attribute(e, entry, "link", "href")?);
        }
        Ok(())
    }

    fn build(self, entry: usize) -> Result<QueryResult, FeedError> {
        let required = |value: Option<String>, element: &'static str| {
            value.ok_or(FeedError::MissingElement { entry, element })
        };

        Ok(QueryResult {
            id: required(self.id, "id")?,
            updated: required(self.updated, "updated")?,
            published: required(self.published, "published")?,
            title: required(self.title, "title")?,
            summary: required(self.summary, "summary")?.trim().to_string(),
            authors: self.authors,
            link: required(self.link, "link rel=\"alternate\"")?,
            pdf_link: required(self.pdf_link, "link title=\"pdf\"")?,
            primary_category: required(self.primary_category, "arxiv:primary_category")?,
            categories: self.categories,
        })
    }
}

fn attribute(e: &BytesStart<'_>, name: &str) -> Result<Option<String>, FeedError> {
    match e.try_get_attribute(name)? {
        Some(attr) => Ok(Some(attr.unescape_value()?.into_owned())),
        None => Ok(None),
    }
}

fn required_attribute(
    e: &BytesStart<'_>,
    entry: usize,
    element: &'static str,
    name: &'static str,
) -> Result<String, FeedError> {
    attribute(e, name)?.ok_or(FeedError::MissingAttribute {
        entry,
        element,
        attribute: name,
    })
}

/// Parse an arXiv Atom feed into records, one per `<entry>`, in feed order.
pub fn parse_feed(xml: &[u8]) -> Result<Vec<QueryResult>, FeedError> {
    let mut reader = NsReader::from_reader(xml);
    reader.config_mut().expand_empty_elements = true;

    let mut buf = Vec::new();
    let mut results = Vec::new();
    let mut depth = 0usize;
    let mut seen_root = false;
    let mut entry: Option<EntryBuilder> = None;
    let mut capture: Option<(TextField, usize)> = None;
    let mut text = String::new();

    loop {
        let (resolved, event) = reader.read_resolved_event_into(&mut buf)?;
        let ns = namespace_of(&resolved)?;

        match event {
            Event::Start(e) => {
                depth += 1;
                let local = e.local_name();
                let name = local.as_ref();

                let field = match depth {
                    1 => {
                        if seen_root {
                            return Err(FeedError::Structure("multiple root elements"));
                        }
                        seen_root = true;
                        if ns != Ns::Atom || name != b"feed" {
                            return Err(FeedError::Structure("root element is not an Atom <feed>"));
                        }
                        None
                    }
                    2 => {
                        if ns == Ns::Atom && name == b"entry" {
                            entry = Some(EntryBuilder::default());
                        }
                        None
                    }
                    3 => match entry.as_mut() {
                        Some(builder) => {
                            let index = results.len();
                            match (ns, name) {
                                (Ns::Atom, b"id") => Some(TextField::Id),
                                (Ns::Atom, b"updated") => Some(TextField::Updated),
                                (Ns::Atom, b"published") => Some(TextField::Published),
                                (Ns::Atom, b"title") => Some(TextField::Title),
                                (Ns::Atom, b"summary") => Some(TextField::Summary),
                                (Ns::Atom, b"author") => {
                                    builder.start_author();
                                    None
                                }
                                (Ns::Atom, b"link") => {
                                    builder.add_link(&e, index)?;
                                    None
                                }
                                (Ns::Atom, b"category") => {
                                    let term = required_attribute(&e, index, "category", "term")?;
                                    builder.categories.push(term);
                                    None
                                }
                                (Ns::Arxiv, b"primary_category") => {
                                    if builder.primary_category.is_none() {
                                        builder.primary_category = Some(required_attribute(
                                            &e,
                                            index,
                                            "arxiv:primary_category",
                                            "term",
                                        )?);
                                    }
                                    None
                                }
                                _ => None,
                            }
                        }
                        None => None,
                    },
                    4 if ns == Ns::Atom
                        && name == b"name"
                        && entry.as_ref().is_some_and(|b| b.in_author) =>
                    {
                        Some(TextField::AuthorName)
                    }
                    _ => None,
                };

                if capture.is_none()
                    && let Some(field) = field
                {
                    capture = Some((field, depth));
                    text.clear();
                }
            }
            Event::End(_) => {
                if let Some((field, at)) = capture
                    && at == depth
                {
                    if let Some(builder) = entry.as_mut() {
                        builder.set_text(field, std::mem::take(&mut text));
                    }
                    capture = None;
                }
                if depth == 3
                    && let Some(builder) = entry.as_mut()
                    && builder.in_author
                {
                    builder.finish_author(results.len())?;
                }
                if depth == 2
                    && let Some(builder) = entry.take()
                {
                    results.push(builder.build(results.len())?);
                }
                depth = depth
                    .checked_sub(1)
                    .ok_or(FeedError::Structure("unmatched closing tag"))?;
            }
            Event::Text(t) if capture.is_some() => text.push_str(&t.unescape()?),
            Event::CData(c) if capture.is_some() => text.push_str(&String::from_utf8_lossy(&c)),
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    if !seen_root {
        return Err(FeedError::Structure("document has no root element"));
    }
    if depth != 0 {
        return Err(FeedError::Structure("unexpected end of document"));
    }
    Ok(results)
}
