// SPDX-FileCopyrightText: 2026 Trackline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Server activity categories and the user-facing sources they belong to.

use strum::{Display, EnumIter, EnumString, IntoStaticStr};

/// Category ids as sent by the server in `category.id`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, EnumIter, IntoStaticStr)]
pub enum ActivityCategory {
    #[strum(serialize = "CommentsCategory")]
    Comment,
    #[strum(serialize = "ArticleCommentsCategory")]
    ArticleComment,
    #[strum(serialize = "CommentTextCategory")]
    CommentText,
    #[strum(serialize = "CommentReactionCategory")]
    CommentReaction,
    #[strum(serialize = "ArticleCommentReactionCategory")]
    ArticleCommentReaction,
    #[strum(serialize = "CommentMentionCategory")]
    CommentMention,
    #[strum(serialize = "AttachmentsCategory")]
    Attachments,
    #[strum(serialize = "ArticleAttachmentsCategory")]
    ArticleAttachments,
    #[strum(serialize = "AttachmentRenameCategory")]
    AttachmentRename,
    #[strum(serialize = "CustomFieldCategory")]
    CustomField,
    #[strum(serialize = "DescriptionCategory")]
    Description,
    #[strum(serialize = "ArticleDescriptionCategory")]
    ArticleDescription,
    #[strum(serialize = "IssueCreatedCategory")]
    IssueCreated,
    #[strum(serialize = "ArticleCreatedCategory")]
    ArticleCreated,
    #[strum(serialize = "IssueResolvedCategory")]
    IssueResolved,
    #[strum(serialize = "LinksCategory")]
    Links,
    #[strum(serialize = "PermittedGroupCategory")]
    PermittedGroup,
    #[strum(serialize = "IssueVisibilityCategory")]
    IssueVisibility,
    #[strum(serialize = "ArticleVisibilityCategory")]
    ArticleVisibility,
    #[strum(serialize = "ProjectCategory")]
    Project,
    #[strum(serialize = "ArticleProjectCategory")]
    ArticleProject,
    #[strum(serialize = "SprintCategory")]
    Sprint,
    #[strum(serialize = "SummaryCategory")]
    Summary,
    #[strum(serialize = "ArticleSummaryCategory")]
    ArticleSummary,
    #[strum(serialize = "TagsCategory")]
    Tags,
    #[strum(serialize = "StarCategory")]
    Star,
    #[strum(serialize = "WorkItemCategory")]
    WorkItem,
    #[strum(serialize = "VcsChangeCategory")]
    VcsChange,
    #[strum(serialize = "PullRequestChangeCategory")]
    PullRequestChange,
    #[strum(serialize = "VotersCategory")]
    Voters,
    #[strum(serialize = "TotalVotesCategory")]
    TotalVotes,
}

impl ActivityCategory {
    /// Server id, e.g. `CommentsCategory`.
    pub fn id(self) -> &'static str {
        self.into()
    }

    /// Categories that never reach the display model.
    pub fn is_noise(self) -> bool {
        matches!(self, Self::Voters | Self::TotalVotes | Self::CommentText)
    }

    pub fn is_comment(self) -> bool {
        matches!(self, Self::Comment | Self::ArticleComment)
    }

    pub fn is_reaction(self) -> bool {
        matches!(self, Self::CommentReaction | Self::ArticleCommentReaction)
    }

    pub fn is_vcs(self) -> bool {
        matches!(self, Self::VcsChange | Self::PullRequestChange)
    }

    pub fn is_created(self) -> bool {
        matches!(self, Self::IssueCreated | Self::ArticleCreated)
    }

    pub fn source(self) -> ActivitySource {
        match self {
            Self::Comment
            | Self::ArticleComment
            | Self::CommentText
            | Self::CommentReaction
            | Self::ArticleCommentReaction
            | Self::CommentMention => ActivitySource::Comment,
            Self::WorkItem => ActivitySource::WorkItem,
            Self::VcsChange | Self::PullRequestChange => ActivitySource::Vcs,
            _ => ActivitySource::History,
        }
    }
}

/// User-selectable stream filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, EnumIter)]
#[strum(serialize_all = "snake_case")]
pub enum ActivitySource {
    Comment,
    History,
    WorkItem,
    Vcs,
}

impl ActivitySource {
    /// Issue categories requested when this source is enabled.
    pub fn categories(self) -> &'static [ActivityCategory] {
        use ActivityCategory as C;
        match self {
            Self::Comment => &[C::Comment, C::CommentReaction],
            Self::History => &[
                C::AttachmentRename,
                C::Attachments,
                C::CustomField,
                C::Description,
                C::IssueCreated,
                C::IssueResolved,
                C::Links,
                C::PermittedGroup,
                C::Project,
                C::Sprint,
                C::Summary,
                C::Tags,
                C::IssueVisibility,
            ],
            Self::WorkItem => &[C::WorkItem],
            Self::Vcs => &[C::PullRequestChange, C::VcsChange],
        }
    }
}

/// Category ids to request for the given sources, in source order.
pub fn category_ids(sources: &[ActivitySource]) -> Vec<&'static str> {
    sources
        .iter()
        .flat_map(|source| source.categories().iter().map(|c| c.id()))
        .collect()
}
