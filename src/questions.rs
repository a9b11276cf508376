//! Question model
//!
//! Typed view of the three supported question elements, read from a
//! validated document. Extraction still checks the structure it relies on,
//! so a document validated against a looser schema fails with
//! [`Error::Structure`] instead of producing a broken item.

use crate::documents::{Document, Element};
use crate::error::{Error, Result};

/// Local name of the container element
pub const QUESTIONS_TAG: &str = "questions";

/// Supported question variants
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QuestionKind {
    /// `multiple-choice-question`
    MultipleChoice,
    /// `fill-in-question`
    FillIn,
    /// `map-question`
    Matching,
}

impl QuestionKind {
    /// Look up a variant by element local name
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "multiple-choice-question" => Some(Self::MultipleChoice),
            "fill-in-question" => Some(Self::FillIn),
            "map-question" => Some(Self::Matching),
            _ => None,
        }
    }

    /// Element local name of the variant
    pub fn tag(&self) -> &'static str {
        match self {
            Self::MultipleChoice => "multiple-choice-question",
            Self::FillIn => "fill-in-question",
            Self::Matching => "map-question",
        }
    }
}

/// One answer option of a multiple-choice question
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChoiceOption {
    /// Whether the option is flagged correct
    pub correct: bool,
    /// Option text, absent for an empty element
    pub text: Option<String>,
}

/// One blank of a fill-in question
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Blank {
    /// Accepted answers, verbatim
    pub alternatives: Vec<String>,
    /// Prose following the blank up to the next one
    pub tail: Option<String>,
}

/// A parsed question
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Question {
    /// Single or multiple selection from a list of options
    MultipleChoice {
        /// Question prose
        prose: String,
        /// Options in source order
        options: Vec<ChoiceOption>,
    },
    /// Prose with blanks to fill in
    FillIn {
        /// Optional question prose
        prose: Option<String>,
        /// Text of the fill-in body before the first blank
        leading: Option<String>,
        /// Blanks in document order
        blanks: Vec<Blank>,
    },
    /// Associate left labels with right labels
    Matching {
        /// Question prose
        prose: String,
        /// Left labels in pairing order
        left: Vec<String>,
        /// Right labels in pairing order
        right: Vec<String>,
    },
}

fn structure(element: &Element, message: &str) -> Error {
    Error::Structure(format!(
        "{} (line {}): {}",
        element.local_name(),
        element.line,
        message
    ))
}

fn required_child<'a>(element: &'a Element, local_name: &str) -> Result<&'a Element> {
    element
        .find_child(local_name)
        .ok_or_else(|| structure(element, &format!("missing <{}>", local_name)))
}

fn is_true(value: &str) -> bool {
    matches!(value.trim(), "true" | "1")
}

impl Question {
    /// Read a question from its element
    pub fn from_element(element: &Element) -> Result<Self> {
        let kind = QuestionKind::from_tag(element.local_name())
            .ok_or_else(|| Error::UnsupportedQuestionType(element.local_name().to_string()))?;

        match kind {
            QuestionKind::MultipleChoice => Self::multiple_choice(element),
            QuestionKind::FillIn => Self::fill_in(element),
            QuestionKind::Matching => Self::matching(element),
        }
    }

    /// The variant of this question
    pub fn kind(&self) -> QuestionKind {
        match self {
            Self::MultipleChoice { .. } => QuestionKind::MultipleChoice,
            Self::FillIn { .. } => QuestionKind::FillIn,
            Self::Matching { .. } => QuestionKind::Matching,
        }
    }

    fn prose(element: &Element) -> Result<String> {
        Ok(required_child(element, "text")?.text.clone().unwrap_or_default())
    }

    fn multiple_choice(element: &Element) -> Result<Self> {
        let prose = Self::prose(element)?;
        let options = required_child(element, "options")?
            .find_children("option")
            .map(|option| {
                let correct = option
                    .get_attribute("correct")
                    .ok_or_else(|| structure(option, "missing 'correct' attribute"))?;
                Ok(ChoiceOption {
                    correct: is_true(correct),
                    text: option.text.clone(),
                })
            })
            .collect::<Result<Vec<_>>>()?;
        if options.is_empty() {
            return Err(structure(element, "no <option> elements"));
        }
        Ok(Self::MultipleChoice { prose, options })
    }

    fn fill_in(element: &Element) -> Result<Self> {
        let prose = element.find_child("text").and_then(|text| text.text.clone());
        let body = required_child(element, "fill-in-text")?;
        let blanks = body
            .children
            .iter()
            .map(|fill| Blank {
                alternatives: fill
                    .find_children("alt")
                    .map(|alt| alt.text.clone().unwrap_or_default())
                    .collect(),
                tail: fill.tail.clone(),
            })
            .collect();
        Ok(Self::FillIn {
            prose,
            leading: body.text.clone(),
            blanks,
        })
    }

    fn matching(element: &Element) -> Result<Self> {
        let prose = Self::prose(element)?;
        let mappings: Vec<&Element> = required_child(element, "mappings")?
            .find_children("mapping")
            .collect();
        let labels = |side: &str| -> Vec<String> {
            mappings
                .iter()
                .filter_map(|mapping| mapping.find_child(side))
                .map(|label| label.text.clone().unwrap_or_default())
                .collect()
        };
        let left = labels("left");
        let right = labels("right");
        if left.len() != right.len() {
            return Err(structure(
                element,
                &format!("{} left labels but {} right labels", left.len(), right.len()),
            ));
        }
        Ok(Self::Matching { prose, left, right })
    }
}

/// Question elements of a document: the children of a `questions`
/// container, or the root itself when it is a single question
pub fn question_elements(document: &Document) -> Vec<&Element> {
    let root = &document.root;
    if root.local_name() == QUESTIONS_TAG {
        root.children.iter().collect()
    } else {
        vec![root]
    }
}
