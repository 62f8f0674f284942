use std::collections::BTreeMap;

use once_cell::sync::Lazy;
use scraper::{Html, Selector};

use crate::moderation::post_extractor::{DeleteDescriptor, ParseError};

static DELETE_FORM: Lazy<Selector> =
    Lazy::new(|| Selector::parse(r#"form[name="delform"]"#).expect("Invalid selector"));
static INPUT: Lazy<Selector> = Lazy::new(|| Selector::parse("input").expect("Invalid selector"));

/// Hidden fields of a page's delete form, shared by every delete on that page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeleteFormFields {
    fields: BTreeMap<String, String>,
}

impl DeleteFormFields {
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Overlay one post's descriptor onto the shared fields.
    ///
    /// `file`, `id` and `dingflag` always come from the descriptor, replacing
    /// any same-named form inputs.
    #[must_use]
    pub fn merge_descriptor(&self, descriptor: &DeleteDescriptor) -> BTreeMap<String, String> {
        let mut payload = self.fields.clone();
        payload.insert("file".to_string(), descriptor.file_id.clone());
        payload.insert("id".to_string(), descriptor.post_id.clone());
        payload.insert("dingflag".to_string(), descriptor.pin_flag.clone());
        payload
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for DeleteFormFields {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            fields: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

/// Collect every named input of the page's `delform`.
///
/// Inputs without a `value` map to an empty string; inputs without a `name`
/// are skipped.
///
/// # Errors
///
/// Returns [`ParseError::MissingDeleteForm`] if the page has no delete form.
pub fn build_fields(html: &str) -> Result<DeleteFormFields, ParseError> {
    let document = Html::parse_document(html);
    build_fields_from_document(&document)
}

/// Same as [`build_fields`] for an already parsed page.
///
/// # Errors
///
/// See [`build_fields`].
pub fn build_fields_from_document(document: &Html) -> Result<DeleteFormFields, ParseError> {
    let form = document
        .select(&DELETE_FORM)
        .next()
        .ok_or(ParseError::MissingDeleteForm)?;

    Ok(form
        .select(&INPUT)
        .filter_map(|input| {
            let element = input.value();
            let name = element.attr("name")?;
            Some((name, element.attr("value").unwrap_or_default()))
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::moderation::post_extractor::extract_posts;
    use crate::moderation::post_extractor::tests::thread_page;

    #[test]
    fn test_build_fields() {
        let html = thread_page(&[("alice", "发信站: body", "delpost('F', 1, 0)")]);
        let fields = build_fields(&html).unwrap();

        assert_eq!(fields.len(), 3);
        assert_eq!(fields.get("board"), Some("NewYork"));
        assert_eq!(fields.get("token"), Some("abc123"));
        assert_eq!(fields.get("file"), Some(""));
    }

    #[test]
    fn test_missing_form() {
        assert_eq!(
            build_fields("<html><body></body></html>").unwrap_err(),
            ParseError::MissingDeleteForm
        );
    }

    #[test]
    fn test_other_forms_are_ignored() {
        let html = r#"
            <form name="search"><input name="q" value="x"></form>
            <form name="delform"><input name="board" value="B"><input type="submit"></form>
        "#;
        let fields = build_fields(html).unwrap();
        assert_eq!(fields.len(), 1);
        assert_eq!(fields.get("q"), None);
    }

    #[test]
    fn test_merge_descriptor_wins_and_keeps_form_keys() {
        let html = thread_page(&[
            ("alice", "发信站: main", "delpost('M.1.A', 11, 0)"),
            ("bob", "发信站: reply", "delpost('M.2.A', 12, 1)"),
        ]);
        let fields = build_fields(&html).unwrap();
        let posts = extract_posts(&html).unwrap();

        for post in &posts {
            let payload = fields.merge_descriptor(&post.delete_descriptor);
            let keys: Vec<&str> = payload.keys().map(String::as_str).collect();
            assert_eq!(keys, vec!["board", "dingflag", "file", "id", "token"]);
            assert_eq!(payload["file"], post.delete_descriptor.file_id);
            assert_eq!(payload["id"], post.delete_descriptor.post_id);
            assert_eq!(payload["dingflag"], post.delete_descriptor.pin_flag);
            assert_eq!(payload["board"], "NewYork");
        }
    }
}
