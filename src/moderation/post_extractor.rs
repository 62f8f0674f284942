//! Post record extraction from thread pages.
//!
//! A thread page lays each post out as a table row holding a `td.wenzhang_bg`
//! cell. The row also carries the author link, the post body in
//! `td.jiawenzhang-type`, and a delete anchor whose `onclick` handler encodes
//! the arguments the delete endpoint needs.

use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use thiserror::Error;

use crate::constants::{DELETE_VERB, STATION_MARKER};

static POST_CELL: Lazy<Selector> =
    Lazy::new(|| Selector::parse("td.wenzhang_bg").expect("Invalid selector"));
static ANCHOR: Lazy<Selector> = Lazy::new(|| Selector::parse("a").expect("Invalid selector"));
static BODY_CELL: Lazy<Selector> =
    Lazy::new(|| Selector::parse("td.jiawenzhang-type").expect("Invalid selector"));
static HANDLER_ARGS: Lazy<Regex> = Lazy::new(|| Regex::new(r"\(.*\)").expect("Invalid regex"));

/// Structural mismatch between a fetched page and the expected forum layout.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("content error: missing {field} for post {position}")]
    MissingField {
        position: usize,
        field: &'static str,
    },
    #[error("malformed delete handler for post {position}: {handler:?}")]
    MalformedDeleteHandler { position: usize, handler: String },
    #[error("page has no delete form")]
    MissingDeleteForm,
}

/// Arguments identifying one post to the delete endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeleteDescriptor {
    pub file_id: String,
    pub post_id: String,
    pub pin_flag: String,
}

/// One post or reply on a thread page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostRecord {
    pub author: String,
    pub body_text: String,
    /// Zero for the thread's main post.
    pub position: usize,
    pub delete_descriptor: DeleteDescriptor,
}

impl PostRecord {
    #[must_use]
    pub fn is_main_post(&self) -> bool {
        self.position == 0
    }
}

/// Extract every post on a thread page in document order.
///
/// # Errors
///
/// Returns a [`ParseError`] if any row lacks an author, body, or well-formed
/// delete control.
pub fn extract_posts(html: &str) -> Result<Vec<PostRecord>, ParseError> {
    let document = Html::parse_document(html);
    extract_from_document(&document)
}

/// Same as [`extract_posts`] for an already parsed page.
///
/// # Errors
///
/// See [`extract_posts`].
pub fn extract_from_document(document: &Html) -> Result<Vec<PostRecord>, ParseError> {
    let rows: Vec<ElementRef<'_>> = document
        .select(&POST_CELL)
        .filter_map(|cell| cell.parent().and_then(ElementRef::wrap))
        .collect();

    rows.iter()
        .enumerate()
        .map(|(position, row)| {
            let author = row_author(row).ok_or(ParseError::MissingField {
                position,
                field: "author",
            })?;
            let body = row_body(row).ok_or(ParseError::MissingField {
                position,
                field: "post body",
            })?;
            let handler = row_delete_handler(row).ok_or(ParseError::MissingField {
                position,
                field: "delete button",
            })?;
            let delete_descriptor = parse_delete_args(&handler).ok_or_else(|| {
                ParseError::MalformedDeleteHandler {
                    position,
                    handler: handler.clone(),
                }
            })?;

            Ok(PostRecord {
                author,
                body_text: clean_post(&body).to_string(),
                position,
                delete_descriptor,
            })
        })
        .collect()
}

fn row_author(row: &ElementRef<'_>) -> Option<String> {
    row.select(&ANCHOR)
        .next()
        .map(|a| a.text().collect::<String>().trim().to_string())
}

fn row_body(row: &ElementRef<'_>) -> Option<String> {
    row.select(&BODY_CELL)
        .next()
        .map(|cell| cell.text().collect())
}

/// The `onclick` value of the row's delete anchor. An anchor present without
/// a handler yields an empty string so it is reported as malformed.
fn row_delete_handler(row: &ElementRef<'_>) -> Option<String> {
    row.select(&ANCHOR)
        .find(|a| a.text().collect::<String>().trim() == DELETE_VERB)
        .map(|a| a.value().attr("onclick").unwrap_or_default().to_string())
}

/// Drop everything before the station marker, which removes the echoed
/// subject line. Text without the marker has no user content and yields an
/// empty string.
#[must_use]
pub fn clean_post(text: &str) -> &str {
    text.find(STATION_MARKER).map_or("", |idx| &text[idx..])
}

/// Parse `handler('file', id, flag)` style arguments.
///
/// The first argument loses one leading and one trailing character (its
/// quotes); the other two are kept verbatim. Extra arguments are ignored.
#[must_use]
pub fn parse_delete_args(handler: &str) -> Option<DeleteDescriptor> {
    let matched = HANDLER_ARGS.find(handler)?.as_str();
    let inner = &matched[1..matched.len() - 1];
    let mut args = inner.split(',');

    let file_id = strip_quotes(args.next()?);
    let post_id = args.next()?.to_string();
    let pin_flag = args.next()?.to_string();

    Some(DeleteDescriptor {
        file_id,
        post_id,
        pin_flag,
    })
}

fn strip_quotes(arg: &str) -> String {
    let mut chars = arg.chars();
    chars.next();
    chars.next_back();
    chars.as_str().to_string()
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::moderation::scanner::scan;
    use crate::moderation::word_matcher::WordMatcher;

    /// Build a thread page with one row per `(author, body, onclick)`.
    pub(crate) fn thread_page(posts: &[(&str, &str, &str)]) -> String {
        let rows: String = posts
            .iter()
            .map(|(author, body, onclick)| {
                format!(
                    r#"<tr>
                        <td class="wenzhang_bg"><a href="/user/{author}">{author}</a></td>
                        <td>
                            <table><tr><td class="jiawenzhang-type">{body}</td></tr></table>
                            <a href="javascript:void(0)" onclick="{onclick}">删除</a>
                        </td>
                    </tr>"#
                )
            })
            .collect();
        format!(
            r#"<html><body>
                <table>{rows}</table>
                <form name="delform" action="mitbbs_bbsdel.php" method="post">
                    <input type="hidden" name="board" value="NewYork">
                    <input type="hidden" name="token" value="abc123">
                    <input type="hidden" name="file">
                </form>
            </body></html>"#
        )
    }

    #[test]
    fn test_extract_posts_in_document_order() {
        let html = thread_page(&[
            ("alice", "标题: hi 发信站: 未名空间 main body", "delpost('M.1.A', 11, 0)"),
            ("bob", "发信站: 未名空间 first reply", "delpost('M.2.A', 12, 0)"),
            ("carol", "发信站: 未名空间 second reply", "delpost('M.3.A', 13, 1)"),
        ]);

        let posts = extract_posts(&html).unwrap();
        assert_eq!(posts.len(), 3);
        assert_eq!(posts[0].position, 0);
        assert!(posts[0].is_main_post());
        assert_eq!(posts[0].author, "alice");
        assert_eq!(posts[1].author, "bob");
        assert_eq!(posts[2].author, "carol");
        assert_eq!(posts[2].position, 2);
        assert_eq!(posts[0].body_text, "发信站: 未名空间 main body");
        assert_eq!(
            posts[2].delete_descriptor,
            DeleteDescriptor {
                file_id: "M.3.A".to_string(),
                post_id: " 13".to_string(),
                pin_flag: " 1".to_string(),
            }
        );
    }

    #[test]
    fn test_extract_is_pure() {
        let html = thread_page(&[("alice", "发信站: body", "delpost('F', 1, 0)")]);
        assert_eq!(extract_posts(&html).unwrap(), extract_posts(&html).unwrap());
    }

    #[test]
    fn test_page_without_posts_is_empty() {
        let posts = extract_posts("<html><body><p>nothing</p></body></html>").unwrap();
        assert!(posts.is_empty());
    }

    #[test]
    fn test_missing_delete_button_is_structural_failure() {
        let html = r#"<table><tr>
            <td class="wenzhang_bg"><a href="/u/a">alice</a></td>
            <td class="jiawenzhang-type">发信站: body</td>
        </tr></table>"#;

        assert_eq!(
            extract_posts(html).unwrap_err(),
            ParseError::MissingField {
                position: 0,
                field: "delete button",
            }
        );
    }

    #[test]
    fn test_missing_body_is_structural_failure() {
        let html = r#"<table><tr>
            <td class="wenzhang_bg"><a href="/u/a">alice</a></td>
            <td><a onclick="delpost('F', 1, 0)">删除</a></td>
        </tr></table>"#;

        assert!(matches!(
            extract_posts(html),
            Err(ParseError::MissingField { field: "post body", .. })
        ));
    }

    #[test]
    fn test_delete_anchor_without_handler_is_malformed() {
        let html = r##"<table><tr>
            <td class="wenzhang_bg"><a href="/u/a">alice</a></td>
            <td class="jiawenzhang-type">发信站: body</td>
            <td><a href="#">删除</a></td>
        </tr></table>"##;

        assert!(matches!(
            extract_posts(html),
            Err(ParseError::MalformedDeleteHandler { position: 0, .. })
        ));
    }

    #[test]
    fn test_clean_post() {
        assert_eq!(clean_post("标题: spam 发信站: ok"), "发信站: ok");
        assert_eq!(clean_post("标题: spam offer here"), "");
    }

    #[test]
    fn test_title_without_marker_never_matches() {
        let html = thread_page(&[("alice", "标题: spam offer here", "delpost('F', 1, 0)")]);
        let posts = extract_posts(&html).unwrap();
        assert_eq!(posts[0].body_text, "");

        let matcher = WordMatcher::from_lines(["spam"]);
        assert!(scan(&posts, &matcher).is_none());
    }

    #[test]
    fn test_parse_delete_args() {
        let parsed = parse_delete_args("return delpost('M.1413.A',12345,0);").unwrap();
        assert_eq!(parsed.file_id, "M.1413.A");
        assert_eq!(parsed.post_id, "12345");
        assert_eq!(parsed.pin_flag, "0");
    }

    #[test]
    fn test_parse_delete_args_rejects_short_lists() {
        assert_eq!(parse_delete_args("delpost('M.1', 2)"), None);
        assert_eq!(parse_delete_args("no parens"), None);
    }

    #[test]
    fn test_parse_delete_args_ignores_extra_args() {
        let parsed = parse_delete_args("f(\"A\",1,2,3)").unwrap();
        assert_eq!(parsed.file_id, "A");
        assert_eq!(parsed.pin_flag, "2");
    }
}
