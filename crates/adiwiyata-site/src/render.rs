use adiwiyata_core::models::comment::CommentRecord;
use adiwiyata_core::models::message::{DisplayMessage, Sender};
use jiff::Timestamp;
use serde::Serialize;
use tera::{Context, Tera};
use tracing::debug;

use crate::content::{FAQ, FAQ_COLUMN_SPLIT, FaqEntry, HERO, Hero, PANEL, PanelCopy, VideoSection};
use crate::error::SiteError;

const PAGE: &str = "page.html";
const COMMENTS: &str = "comments.html";
const MESSAGES: &str = "messages.html";

/// A comment as the board shows it, with its age already formatted.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CommentView {
    pub id: String,
    pub text: String,
    pub created_at: Timestamp,
    pub relative_time: String,
}

impl CommentView {
    pub fn new(record: &CommentRecord, now: Timestamp) -> Self {
        Self {
            id: record.id.clone(),
            text: record.text.clone(),
            created_at: record.created_at,
            relative_time: record.relative_time(now),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
struct MessageView<'a> {
    id: String,
    sender: Sender,
    text: &'a str,
    image_src: Option<String>,
    sent_at: &'a str,
}

impl<'a> From<&'a DisplayMessage> for MessageView<'a> {
    fn from(message: &'a DisplayMessage) -> Self {
        Self {
            id: message.id.to_string(),
            sender: message.sender,
            text: &message.text,
            image_src: message.attachment.as_ref().map(|a| a.data_uri()),
            sent_at: &message.sent_at,
        }
    }
}

#[derive(Serialize)]
struct CommentsContext<'a> {
    panel: &'a PanelCopy,
    comments: &'a [CommentView],
}

#[derive(Serialize)]
struct MessagesContext<'a> {
    panel: &'a PanelCopy,
    messages: Vec<MessageView<'a>>,
    typing: bool,
}

#[derive(Serialize)]
struct PageContext<'a> {
    hero: &'a Hero,
    hero_src: String,
    faq_columns: [&'a [FaqEntry]; 2],
    video: VideoSection,
    panel: &'a PanelCopy,
    comments: &'a [CommentView],
    messages: Vec<MessageView<'a>>,
    typing: bool,
}

/// What varies between page loads.
#[derive(Debug, Clone)]
pub struct PageOptions<'a> {
    pub video_id: &'a str,
    /// URL prefix static assets are served under, without a trailing slash.
    pub assets_base: &'a str,
}

/// Page and fragment renderer. Templates are compiled into the binary and
/// parsed once.
pub struct Renderer {
    tera: Tera,
}

impl Renderer {
    pub fn new() -> Result<Self, SiteError> {
        let mut tera = Tera::default();
        tera.add_raw_templates(vec![
            (COMMENTS, include_str!("../templates/comments.html")),
            (MESSAGES, include_str!("../templates/messages.html")),
            (PAGE, include_str!("../templates/page.html")),
        ])
        .map_err(|e| SiteError::TemplateParse(e.to_string()))?;
        Ok(Self { tera })
    }

    /// The full page. The chat panel starts empty; the browser opens its own
    /// session and fills it from the message stream.
    pub fn render_page(
        &self,
        options: &PageOptions<'_>,
        comments: &[CommentView],
    ) -> Result<String, SiteError> {
        let (left, right) = FAQ.split_at(FAQ_COLUMN_SPLIT);
        let page = PageContext {
            hero: &HERO,
            hero_src: format!("{}/{}", options.assets_base.trim_end_matches('/'), HERO.image),
            faq_columns: [left, right],
            video: VideoSection::new(options.video_id),
            panel: &PANEL,
            comments,
            messages: Vec::new(),
            typing: false,
        };
        self.render(PAGE, &page)
    }

    /// The comment list, as swapped in by the comment stream.
    pub fn render_comments(&self, comments: &[CommentView]) -> Result<String, SiteError> {
        self.render(
            COMMENTS,
            &CommentsContext {
                panel: &PANEL,
                comments,
            },
        )
    }

    /// The chat message list, including the welcome card when empty and the
    /// typing bubble while a reply is pending.
    pub fn render_messages(
        &self,
        messages: &[DisplayMessage],
        typing: bool,
    ) -> Result<String, SiteError> {
        self.render(
            MESSAGES,
            &MessagesContext {
                panel: &PANEL,
                messages: messages.iter().map(MessageView::from).collect(),
                typing,
            },
        )
    }

    fn render<T: Serialize>(&self, template: &str, data: &T) -> Result<String, SiteError> {
        let value = serde_json::to_value(data)?;
        let context =
            Context::from_value(value).map_err(|e| SiteError::TemplateRender(e.to_string()))?;
        let rendered = self.tera.render(template, &context)?;
        debug!(template, bytes = rendered.len(), "rendered");
        Ok(rendered)
    }
}
