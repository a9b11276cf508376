//! Item and manifest rendering
//!
//! Templates are compiled into the binary and rendered with minijinja in
//! strict mode: a template referring to a field its context does not carry
//! fails instead of printing an empty string. Each template kind has its
//! own context struct, so missing fields are caught by the compiler first.
//!
//! Auto-escaping is off. Prose reaching the templates has already been
//! through [`crate::escaping`] and may contain inline markup on purpose.
//! Values placed in attributes go through the `xmlattr` filter; verbatim
//! values placed in element content go through `xmltext`, which only
//! escapes stray ampersands.

use minijinja::{AutoEscape, Environment, UndefinedBehavior};
use serde::Serialize;

use crate::error::Result;
use crate::escaping::escape_ampersands;

/// Response capture style of an item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Interaction {
    /// Single or multiple selection
    Choice,
    /// Free text typed into blanks
    TextEntry,
    /// Pairing of two label sets
    Match,
}

impl Interaction {
    /// Short token naming the interaction
    pub fn token(&self) -> &'static str {
        match self {
            Self::Choice => "choice",
            Self::TextEntry => "text-entry",
            Self::Match => "match",
        }
    }

    /// Name of the QTI interaction element
    pub fn element_name(&self) -> &'static str {
        match self {
            Self::Choice => "choiceInteraction",
            Self::TextEntry => "textEntryInteraction",
            Self::Match => "matchInteraction",
        }
    }

    /// Name of the item template for this interaction
    pub fn template_name(&self) -> &'static str {
        match self {
            Self::Choice => CHOICE_TEMPLATE,
            Self::TextEntry => TEXT_ENTRY_TEMPLATE,
            Self::Match => MATCH_TEMPLATE,
        }
    }
}

const CHOICE_TEMPLATE: &str = "assessmentItem_choice.xml";
const TEXT_ENTRY_TEMPLATE: &str = "assessmentItem_text-entry.xml";
const MATCH_TEMPLATE: &str = "assessmentItem_match.xml";
const RESOURCE_TEMPLATE: &str = "imsmanifest_resource.xml";
const MANIFEST_TEMPLATE: &str = "imsmanifest.xml";

const TEMPLATES: &[(&str, &str)] = &[
    (
        CHOICE_TEMPLATE,
        include_str!("../templates/assessmentItem_choice.xml.jinja"),
    ),
    (
        TEXT_ENTRY_TEMPLATE,
        include_str!("../templates/assessmentItem_text-entry.xml.jinja"),
    ),
    (
        MATCH_TEMPLATE,
        include_str!("../templates/assessmentItem_match.xml.jinja"),
    ),
    (
        RESOURCE_TEMPLATE,
        include_str!("../templates/imsmanifest_resource.xml.jinja"),
    ),
    (
        MANIFEST_TEMPLATE,
        include_str!("../templates/imsmanifest.xml.jinja"),
    ),
];

/// One option of a choice item
#[derive(Debug, Clone, Serialize)]
pub struct ChoiceContext {
    /// Choice identifier inside the item
    pub identifier: String,
    /// `correct` or `incorrect`
    pub polarity: &'static str,
    /// Escaped option text
    pub text: String,
}

/// Context of the choice item template
#[derive(Debug, Clone, Serialize)]
pub struct ChoiceItemContext {
    /// Assessment identifier
    pub identifier: String,
    /// Item title
    pub title: String,
    /// `single` or `multiple`
    pub cardinality: &'static str,
    /// Maximum number of selectable options, 0 for unbounded
    pub max_choices: u32,
    /// Escaped question prose
    pub question_html: String,
    /// Options in source order
    pub choices: Vec<ChoiceContext>,
}

/// One blank of a text-entry item
#[derive(Debug, Clone, Serialize)]
pub struct ResponseContext {
    /// Response identifier (`RESPONSE00`, ...)
    pub identifier: String,
    /// Accepted answers
    pub alternatives: Vec<String>,
}

/// Context of the text-entry item template
#[derive(Debug, Clone, Serialize)]
pub struct TextEntryItemContext {
    /// Assessment identifier
    pub identifier: String,
    /// Item title
    pub title: String,
    /// Escaped question prose, empty when absent
    pub question_html: String,
    /// Fill-in body with slot markers
    pub fill_in_html: String,
    /// Blanks in document order
    pub responses: Vec<ResponseContext>,
}

/// Context of the match item template
#[derive(Debug, Clone, Serialize)]
pub struct MatchItemContext {
    /// Assessment identifier
    pub identifier: String,
    /// Item title
    pub title: String,
    /// Escaped question prose
    pub question_html: String,
    /// Number of pairs
    pub choice_count: usize,
    /// Escaped left labels
    pub left_choices: Vec<String>,
    /// Escaped right labels
    pub right_choices: Vec<String>,
}

/// Context of one item template
#[derive(Debug, Clone)]
pub enum ItemContext {
    /// Choice item
    Choice(ChoiceItemContext),
    /// Text-entry item
    TextEntry(TextEntryItemContext),
    /// Match item
    Match(MatchItemContext),
}

impl ItemContext {
    /// Interaction rendered by this context
    pub fn interaction(&self) -> Interaction {
        match self {
            Self::Choice(_) => Interaction::Choice,
            Self::TextEntry(_) => Interaction::TextEntry,
            Self::Match(_) => Interaction::Match,
        }
    }
}

/// Context of the manifest resource fragment template
#[derive(Debug, Clone, Serialize)]
pub struct ResourceContext {
    /// Manifest resource identifier
    pub resource_identifier: String,
    /// Archive entry of the item
    pub resource_href: String,
    /// Resource title
    pub title: String,
    /// QTI interaction element name
    pub interaction_type: &'static str,
}

/// Context of the manifest template
#[derive(Debug, Clone, Serialize)]
pub struct ManifestContext {
    /// Package identifier
    pub manifest_identifier: String,
    /// Rendered resource fragments in registry order
    pub resources: Vec<String>,
}

/// Escape a value for use inside a quoted XML attribute
fn xml_attr(value: &str) -> String {
    quick_xml::escape::escape(value).into_owned()
}

fn xml_text(value: &str) -> String {
    escape_ampersands(value)
}

/// Template renderer holding the compiled templates
pub struct Renderer {
    env: Environment<'static>,
}

impl std::fmt::Debug for Renderer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Renderer").finish_non_exhaustive()
    }
}

impl Renderer {
    /// Compile the bundled templates
    pub fn new() -> Result<Self> {
        let mut env = Environment::new();
        env.set_undefined_behavior(UndefinedBehavior::Strict);
        env.set_auto_escape_callback(|_| AutoEscape::None);
        env.set_trim_blocks(true);
        env.add_filter("xmlattr", xml_attr);
        env.add_filter("xmltext", xml_text);
        for &(name, source) in TEMPLATES {
            env.add_template(name, source)?;
        }
        Ok(Self { env })
    }

    /// Render the item markup for one question
    pub fn render_item(&self, context: &ItemContext) -> Result<String> {
        let template = self.env.get_template(context.interaction().template_name())?;
        let rendered = match context {
            ItemContext::Choice(ctx) => template.render(ctx)?,
            ItemContext::TextEntry(ctx) => template.render(ctx)?,
            ItemContext::Match(ctx) => template.render(ctx)?,
        };
        Ok(rendered)
    }

    /// Render the manifest fragment for one question
    pub fn render_resource(&self, context: &ResourceContext) -> Result<String> {
        Ok(self.env.get_template(RESOURCE_TEMPLATE)?.render(context)?)
    }

    /// Render the manifest document
    pub fn render_manifest(&self, context: &ManifestContext) -> Result<String> {
        Ok(self.env.get_template(MANIFEST_TEMPLATE)?.render(context)?)
    }
}
