//! Read-only traversal over a block tree.
//!
//! Top-level nodes are visited in declaration order and composite nodes
//! (action rows, input wrappers, section accessories) are searched before
//! moving on to the next sibling, so the first match in reading order wins.

use super::model::{Block, BlockElement, ButtonElement, HeaderBlock, InputBlock, SectionBlock};

/// A borrowed search hit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Match<'a> {
    /// A leaf element, with the id of the block holding it.
    Element {
        block_id: Option<&'a str>,
        element: &'a BlockElement,
    },
    /// An input wrapper whose element matched.
    Input(&'a InputBlock),
    Header(&'a HeaderBlock),
    Section(&'a SectionBlock),
}

impl<'a> Match<'a> {
    /// Short description used in failure messages.
    pub fn describe(&self) -> String {
        match self {
            Match::Element { element, .. } => element.kind_name().to_string(),
            Match::Input(input) => format!("input block with {}", input.element.kind_name()),
            Match::Header(_) => "header block".to_string(),
            Match::Section(_) => "section block".to_string(),
        }
    }

    /// The clickable button behind this hit, if there is one.
    pub fn as_button(&self) -> Option<(Option<&'a str>, &'a ButtonElement)> {
        match self {
            Match::Element { block_id, element } => element.as_button().map(|b| (*block_id, b)),
            _ => None,
        }
    }

    pub fn to_found(&self) -> Found {
        match *self {
            Match::Element { block_id, element } => Found::Element {
                block_id: block_id.map(str::to_string),
                element: element.clone(),
            },
            Match::Input(input) => Found::Input(input.clone()),
            Match::Header(header) => Found::Header(header.clone()),
            Match::Section(section) => Found::Section(section.clone()),
        }
    }
}

/// An owned search hit, detached from the tree it was found in.
#[derive(Debug, Clone, PartialEq)]
pub enum Found {
    Element {
        block_id: Option<String>,
        element: BlockElement,
    },
    Input(InputBlock),
    Header(HeaderBlock),
    Section(SectionBlock),
}

/// Locates the first node or element whose visible text equals `text`.
///
/// Matches button text, the placeholder of text inputs and selects, header
/// text and section body text. A hit inside an input wrapper yields the
/// wrapper so callers can key form state by its block id.
pub fn find_by_label<'a>(blocks: &'a [Block], text: &str) -> Option<Match<'a>> {
    blocks.iter().find_map(|block| match block {
        Block::Actions(actions) => actions
            .elements
            .iter()
            .find(|element| element.label() == Some(text))
            .map(|element| Match::Element {
                block_id: actions.block_id.as_deref(),
                element,
            }),
        Block::Input(input) => (input.element.label() == Some(text)).then_some(Match::Input(input)),
        Block::Header(header) => (header.text.text == text).then_some(Match::Header(header)),
        Block::Section(section) => {
            if section.text.as_ref().is_some_and(|t| t.text == text) {
                return Some(Match::Section(section));
            }
            section
                .accessory
                .as_deref()
                .filter(|element| element.label() == Some(text))
                .map(|element| Match::Element {
                    block_id: section.block_id.as_deref(),
                    element,
                })
        }
        Block::Divider(_) | Block::Unsupported => None,
    })
}

/// Locates the first button with `action_id`; a non-empty `value` must also
/// equal the button's value.
pub fn find_by_action_and_value<'a>(
    blocks: &'a [Block],
    action_id: &str,
    value: &str,
) -> Option<Match<'a>> {
    let is_hit = |element: &BlockElement| {
        element
            .as_button()
            .is_some_and(|b| b.action_id == action_id && (value.is_empty() || b.value == value))
    };

    blocks.iter().find_map(|block| match block {
        Block::Actions(actions) => {
            actions
                .elements
                .iter()
                .find(|e| is_hit(e))
                .map(|element| Match::Element {
                    block_id: actions.block_id.as_deref(),
                    element,
                })
        }
        Block::Input(input) => is_hit(&input.element).then_some(Match::Input(input)),
        Block::Section(section) => section
            .accessory
            .as_deref()
            .filter(|e| is_hit(e))
            .map(|element| Match::Element {
                block_id: section.block_id.as_deref(),
                element,
            }),
        Block::Divider(_) | Block::Header(_) | Block::Unsupported => None,
    })
}

/// Every piece of visible text in reading order.
pub fn visible_texts(blocks: &[Block]) -> Vec<&str> {
    let mut texts = Vec::new();
    for block in blocks {
        match block {
            Block::Header(header) => texts.push(header.text.text.as_str()),
            Block::Section(section) => {
                texts.extend(section.text.as_ref().map(|t| t.text.as_str()));
                texts.extend(section.fields.iter().map(|t| t.text.as_str()));
                texts.extend(section.accessory.as_deref().and_then(BlockElement::label));
            }
            Block::Actions(actions) => {
                texts.extend(actions.elements.iter().filter_map(BlockElement::label));
            }
            Block::Input(input) => {
                texts.push(input.label.text.as_str());
                texts.extend(input.element.label());
            }
            Block::Divider(_) | Block::Unsupported => {}
        }
    }
    texts
}
