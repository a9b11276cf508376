//! Question transformation
//!
//! Turns each question element into an item document and a manifest
//! fragment. Fragments are kept in an [`ItemRegistry`] in the order the
//! questions were processed; that order drives both the manifest and the
//! archive layout.

use indexmap::IndexMap;

use crate::documents::{Document, Element};
use crate::error::{Error, Result};
use crate::escaping::{escape, escape_str};
use crate::identifiers::{IdentifierAllocator, IdentifierPair};
use crate::questions::{question_elements, Blank, ChoiceOption, Question};
use crate::templates::{
    ChoiceContext, ChoiceItemContext, ItemContext, MatchItemContext, Renderer,
    ResourceContext, ResponseContext, TextEntryItemContext,
};

/// Number of prose characters kept in item titles
pub const TITLE_PROSE_CHARS: usize = 20;

/// Prefix of fill-in response identifiers
pub const RESPONSE_PREFIX: &str = "RESPONSE";

/// Rendered output for one question
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionFragments {
    /// Item document
    pub item: String,
    /// Manifest resource fragment
    pub manifest: String,
}

/// Ordered map from assessment identifier to rendered fragments
#[derive(Debug, Clone, Default)]
pub struct ItemRegistry {
    items: IndexMap<String, QuestionFragments>,
}

impl ItemRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Store the fragments of a question. Identifiers must be unique.
    pub fn insert(&mut self, identifier: String, fragments: QuestionFragments) -> Result<()> {
        if self.items.contains_key(&identifier) {
            return Err(Error::Other(format!("duplicate item identifier '{}'", identifier)));
        }
        self.items.insert(identifier, fragments);
        Ok(())
    }

    /// Fragments of one item
    pub fn get(&self, identifier: &str) -> Option<&QuestionFragments> {
        self.items.get(identifier)
    }

    /// Items in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &QuestionFragments)> {
        self.items.iter().map(|(id, fragments)| (id.as_str(), fragments))
    }

    /// Identifiers in insertion order
    pub fn identifiers(&self) -> impl Iterator<Item = &str> {
        self.items.keys().map(String::as_str)
    }

    /// Manifest fragments in insertion order
    pub fn manifest_fragments(&self) -> impl Iterator<Item = &str> {
        self.items.values().map(|fragments| fragments.manifest.as_str())
    }

    /// Number of items
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Check if no item has been stored
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Truncate prose for an item title, marking the cut with an ellipsis
fn title_prose(prose: &str) -> String {
    let mut chars = prose.chars();
    let head: String = chars.by_ref().take(TITLE_PROSE_CHARS).collect();
    if chars.next().is_some() {
        format!("{}...", head)
    } else {
        head
    }
}

/// Transforms the questions of one conversion run.
///
/// Owns the identifier allocator and the registry; create one per run.
pub struct QuestionTransformer<'r> {
    renderer: &'r Renderer,
    allocator: IdentifierAllocator,
    registry: ItemRegistry,
}

impl<'r> QuestionTransformer<'r> {
    /// Create a transformer with a fresh allocator and registry
    pub fn new(renderer: &'r Renderer) -> Self {
        Self {
            renderer,
            allocator: IdentifierAllocator::new(),
            registry: ItemRegistry::new(),
        }
    }

    /// Transform every question of a validated document, in document order
    pub fn transform_document(&mut self, document: &Document) -> Result<usize> {
        let questions = question_elements(document);
        for element in &questions {
            self.transform_element(element)?;
        }
        Ok(questions.len())
    }

    /// Transform one question element, returning its assessment identifier
    pub fn transform_element(&mut self, element: &Element) -> Result<String> {
        let question = Question::from_element(element)?;
        self.transform(&question)
    }

    /// Transform one question, returning its assessment identifier
    pub fn transform(&mut self, question: &Question) -> Result<String> {
        let ids = self.allocator.allocate();
        let (item, title) = match question {
            Question::MultipleChoice { prose, options } => multiple_choice(&ids, prose, options),
            Question::FillIn {
                prose,
                leading,
                blanks,
            } => fill_in(&ids, prose.as_deref(), leading.as_deref(), blanks),
            Question::Matching { prose, left, right } => matching(&ids, prose, left, right),
        };
        let resource = ResourceContext {
            resource_identifier: ids.resource.clone(),
            resource_href: ids.href(),
            title: title.to_string(),
            interaction_type: item.interaction().element_name(),
        };

        let fragments = QuestionFragments {
            item: self.renderer.render_item(&item)?,
            manifest: self.renderer.render_resource(&resource)?,
        };
        tracing::debug!(
            identifier = %ids.item,
            interaction = item.interaction().token(),
            "question transformed"
        );
        self.registry.insert(ids.item.clone(), fragments)?;
        Ok(ids.item)
    }

    /// The registry built so far
    pub fn registry(&self) -> &ItemRegistry {
        &self.registry
    }

    /// Finish the run and take the registry
    pub fn into_registry(self) -> ItemRegistry {
        self.registry
    }
}

/// Build the item context and the manifest title of a choice question
fn multiple_choice(
    ids: &IdentifierPair,
    prose: &str,
    options: &[ChoiceOption],
) -> (ItemContext, &'static str) {
    let single = options.iter().filter(|option| option.correct).count() == 1;
    let (cardinality, max_choices, label) = if single {
        ("single", 1, "MultipleChoice")
    } else {
        ("multiple", 0, "MultipleResponse")
    };

    let choices = options
        .iter()
        .enumerate()
        .map(|(index, option)| ChoiceContext {
            identifier: format!("choice-{}", index),
            polarity: if option.correct { "correct" } else { "incorrect" },
            text: escape(option.text.as_deref()).unwrap_or_default(),
        })
        .collect();

    let context = ChoiceItemContext {
        identifier: ids.item.clone(),
        title: format!("{}: {}", label, title_prose(prose)),
        cardinality,
        max_choices,
        question_html: escape_str(prose),
        choices,
    };
    (ItemContext::Choice(context), label)
}

/// Slot marker placed in the fill-in body for one blank
pub fn slot_marker(response_identifier: &str) -> String {
    format!(
        r#"<textEntryInteraction responseIdentifier="{}"/>"#,
        response_identifier
    )
}

fn fill_in(
    ids: &IdentifierPair,
    prose: Option<&str>,
    leading: Option<&str>,
    blanks: &[Blank],
) -> (ItemContext, &'static str) {
    const LABEL: &str = "FillInTheBlankText";

    let mut body = escape(leading).unwrap_or_default();
    let mut responses = Vec::with_capacity(blanks.len());
    for (index, blank) in blanks.iter().enumerate() {
        let identifier = format!("{}{:02}", RESPONSE_PREFIX, index);
        body.push_str(&slot_marker(&identifier));
        body.push_str(&escape(blank.tail.as_deref()).unwrap_or_default());
        responses.push(ResponseContext {
            identifier,
            alternatives: blank.alternatives.clone(),
        });
    }

    let title = match prose {
        Some(prose) if !prose.is_empty() => format!("{}: {}", LABEL, title_prose(prose)),
        _ => String::new(),
    };
    let context = TextEntryItemContext {
        identifier: ids.item.clone(),
        title,
        question_html: escape(prose).unwrap_or_default(),
        fill_in_html: body,
        responses,
    };
    (ItemContext::TextEntry(context), LABEL)
}

fn matching(
    ids: &IdentifierPair,
    prose: &str,
    left: &[String],
    right: &[String],
) -> (ItemContext, &'static str) {
    const LABEL: &str = "Matching";

    let context = MatchItemContext {
        identifier: ids.item.clone(),
        title: LABEL.to_string(),
        question_html: escape_str(prose),
        choice_count: left.len(),
        left_choices: left.iter().map(|label| escape_str(label)).collect(),
        right_choices: right.iter().map(|label| escape_str(label)).collect(),
    };
    (ItemContext::Match(context), LABEL)
}
