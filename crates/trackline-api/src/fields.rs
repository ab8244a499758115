// SPDX-FileCopyrightText: 2026 Trackline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Query-string builder for `fields=...&$top=...` style parameters, plus
//! the field projections requested for each entity.

use url::form_urlencoded;

pub const USER: &str = "id,ringId,login,fullName,avatarUrl,email";
pub const ATTACHMENT: &str =
    "id,name,url,thumbnailURL,mimeType,size,imageDimensions(width,height),removed";
pub const REACTION: &str = "id,reaction,author(id,ringId,login,fullName,avatarUrl)";
pub const TAG: &str = "id,name,color(id,background,foreground)";
pub const COMMENT: &str = "id,text,created,updated,deleted,usesMarkdown,\
author(id,ringId,login,fullName,avatarUrl),\
attachments(id,name,url,thumbnailURL,mimeType,size,removed),\
reactions(id,reaction,author(id,ringId,login,fullName,avatarUrl))";
pub const WORK_ITEM: &str = "$type,id,date,created,text,\
duration(minutes,presentation),type(id,name),\
author(id,ringId,login,fullName,avatarUrl),creator(id,login,fullName)";
pub const TIME_TRACKING: &str = "id,enabled,\
draftWorkItem($type,id,date,text,duration(minutes,presentation),type(id,name)),\
workItems($type,id,date,created,text,duration(minutes,presentation),type(id,name),author(id,login,fullName,avatarUrl))";
pub const ISSUE_ON_LIST: &str = "$type,id,idReadable,summary,created,updated,resolved,\
reporter(id,login,fullName,avatarUrl),tags(id,name,color(id,background,foreground))";
pub const ISSUE: &str = "$type,id,idReadable,summary,description,created,updated,resolved,\
reporter(id,ringId,login,fullName,avatarUrl),\
tags(id,name,color(id,background,foreground)),\
attachments(id,name,url,thumbnailURL,mimeType,size,removed),\
project(id,name,shortName),fields($type,id,name,value(id,name,login,fullName,avatarUrl))";
pub const ARTICLE: &str = "$type,id,idReadable,summary,content,created,updated,hasStar,\
reporter(id,ringId,login,fullName,avatarUrl),\
attachments(id,name,url,thumbnailURL,mimeType,size,removed),\
parentArticle(id,idReadable),project(id,name,shortName),visibility($type)";
pub const ARTICLE_DRAFT: &str = "$type,id,idReadable,summary,content,created,updated,\
originalArticle(id,idReadable),parentArticle(id,idReadable),project(id,name,shortName),\
attachments(id,name,url,thumbnailURL,mimeType,size,removed),visibility($type)";
pub const ACTIVITY: &str = "id,timestamp,targetMember,$type,\
author(id,ringId,login,fullName,avatarUrl),category(id),\
target(id,$type,created,text,usesMarkdown,deleted,reactions(id,reaction,author(id,login,fullName,avatarUrl))),\
added(id,$type,name,text,date,created,deleted,usesMarkdown,login,fullName,avatarUrl,reaction,\
duration(minutes,presentation),type(id,name),author(id,login,fullName,avatarUrl),\
attachments(id,name,url,thumbnailURL,mimeType),reactions(id,reaction,author(id,login,fullName,avatarUrl))),\
removed(id,$type,name,text,date,login,fullName,avatarUrl,reaction,duration(minutes,presentation),type(id,name))";
pub const ACTIVITY_LEGACY: &str = "id,timestamp,targetMember,$type,\
author(id,login,fullName,avatarUrl),category(id),target(id,$type,created),\
added(id,$type,name,text,date,login,fullName,avatarUrl,duration(minutes,presentation)),\
removed(id,$type,name,text,date,login,fullName,avatarUrl)";

/// Builds an encoded query string.
///
/// ```
/// use trackline_api::fields::FieldsQuery;
///
/// let q = FieldsQuery::new("id,summary").top(10).query("#Unresolved").build();
/// assert_eq!(q, "fields=id%2Csummary&%24top=10&query=%23Unresolved");
/// ```
#[derive(Debug, Default, Clone)]
pub struct FieldsQuery {
    params: Vec<(String, String)>,
}

impl FieldsQuery {
    pub fn new(fields: &str) -> Self {
        Self::default().param("fields", fields)
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn param(mut self, key: &str, value: impl ToString) -> Self {
        self.params.push((key.to_string(), value.to_string()));
        self
    }

    /// Adds the parameter only when `value` is present.
    pub fn opt(self, key: &str, value: Option<impl ToString>) -> Self {
        match value {
            Some(value) => self.param(key, value),
            None => self,
        }
    }

    pub fn top(self, top: i64) -> Self {
        self.param("$top", top)
    }

    pub fn skip(self, skip: i64) -> Self {
        self.param("$skip", skip)
    }

    pub fn query(self, query: &str) -> Self {
        self.param("query", query)
    }

    pub fn build(&self) -> String {
        let mut serializer = form_urlencoded::Serializer::new(String::new());
        for (key, value) in &self.params {
            serializer.append_pair(key, value);
        }
        serializer.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_query_is_empty_string() {
        assert_eq!(FieldsQuery::empty().build(), "");
    }

    #[test]
    fn optional_params_are_skipped() {
        let q = FieldsQuery::new("id")
            .opt("folder", None::<&str>)
            .opt("draftId", Some("d-1"))
            .build();
        assert_eq!(q, "fields=id&draftId=d-1");
    }

    #[test]
    fn parameter_order_is_preserved() {
        let q = FieldsQuery::empty().param("sync", false).param("filter", "a b").build();
        assert_eq!(q, "sync=false&filter=a+b");
    }
}
