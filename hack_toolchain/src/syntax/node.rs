//! Parse tree nodes and the incremental rule matcher
//!
//! [`RuleInstance`] is one live attempt at a grammar rule. The driver offers
//! it candidate children one at a time through [`RuleInstance::add_node`];
//! once the attempt ends it is frozen into an immutable [`Node`].

use crate::grammar::{grammar, FieldDescriptor, RuleDescriptor, RuleName, RuleState, SubsetAdvance};
use crate::tokens::Token;
use serde::Serialize;

/// A finished parse tree node
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Node {
    Terminal(Token),
    Rule(RuleNode),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RuleNode {
    pub rule: RuleName,
    pub children: Vec<Node>,
    pub closed: bool,
}

impl Node {
    /// Rule name, or `None` for terminals
    pub fn rule_name(&self) -> Option<RuleName> {
        match self {
            Node::Rule(node) => Some(node.rule),
            Node::Terminal(_) => None,
        }
    }

    /// Wrapped token, or `None` for rule nodes
    pub fn token(&self) -> Option<&Token> {
        match self {
            Node::Terminal(token) => Some(token),
            Node::Rule(_) => None,
        }
    }

    pub fn children(&self) -> &[Node] {
        match self {
            Node::Rule(node) => &node.children,
            Node::Terminal(_) => &[],
        }
    }

    pub fn as_rule(&self) -> Option<&RuleNode> {
        match self {
            Node::Rule(node) => Some(node),
            Node::Terminal(_) => None,
        }
    }

    pub fn is_rule(&self, rule: RuleName) -> bool {
        self.rule_name() == Some(rule)
    }

    /// Every terminal under this node, in source order
    pub fn tokens(&self) -> Vec<&Token> {
        let mut tokens = Vec::new();
        self.collect_tokens(&mut tokens);
        tokens
    }

    fn collect_tokens<'a>(&'a self, out: &mut Vec<&'a Token>) {
        match self {
            Node::Terminal(token) => out.push(token),
            Node::Rule(node) => {
                for child in &node.children {
                    child.collect_tokens(out);
                }
            }
        }
    }
}

impl RuleNode {
    /// Direct children that are instances of `rule`
    pub fn child_rules(&self, rule: RuleName) -> impl Iterator<Item = &RuleNode> {
        self.children
            .iter()
            .filter_map(Node::as_rule)
            .filter(move |child| child.rule == rule)
    }

    /// Direct terminal children
    pub fn child_tokens(&self) -> impl Iterator<Item = &Token> {
        self.children.iter().filter_map(Node::token)
    }
}

/// Runtime slot state for one field descriptor
#[derive(Debug, Clone)]
struct Field {
    descriptor: &'static FieldDescriptor,
    matches: usize,
    closed: bool,
    /// Only matches while the preceding field demands it
    bound: bool,
}

impl Field {
    fn new(descriptor: &'static FieldDescriptor, bound: bool) -> Self {
        Self {
            descriptor,
            matches: 0,
            closed: false,
            bound,
        }
    }

    fn try_add(&mut self, node: &Node) -> bool {
        if self.closed || !self.descriptor.accepts(node) {
            return false;
        }
        if !self.descriptor.repeatable {
            self.closed = true;
        }
        self.matches += 1;
        true
    }

    fn is_satisfied(&self) -> bool {
        self.matches > 0 || !self.descriptor.required
    }
}

/// One live attempt at satisfying a rule
#[derive(Debug, Clone)]
pub struct RuleInstance {
    descriptor: &'static RuleDescriptor,
    children: Vec<Node>,
    closed: bool,
    state: RuleState,
    current_subset: usize,
    last_matched_subset: Option<usize>,
    /// (subset, field) that must take the next child
    demanded: Option<(usize, usize)>,
    fields: Option<Vec<Vec<Field>>>,
}

impl RuleInstance {
    pub fn new(rule: RuleName) -> Self {
        Self::from_descriptor(grammar().descriptor(rule))
    }

    pub fn from_descriptor(descriptor: &'static RuleDescriptor) -> Self {
        Self {
            descriptor,
            children: Vec::new(),
            closed: false,
            state: RuleState::Initial,
            current_subset: 0,
            last_matched_subset: None,
            demanded: None,
            fields: None,
        }
    }

    pub fn rule(&self) -> RuleName {
        self.descriptor.name
    }

    pub fn state(&self) -> RuleState {
        self.state
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    pub fn current_subset(&self) -> usize {
        self.current_subset
    }

    pub fn children(&self) -> &[Node] {
        &self.children
    }

    /// Offer a child. On rejection the child is handed back untouched.
    ///
    /// While a field demands its successor, only that successor is tried.
    /// Otherwise fields of the current subset are tried in declaration
    /// order, skipping bound fields. A required field that cannot take the
    /// child rejects it outright; a chainer that has never matched ends the
    /// scan of its subset. When the subset yields nothing the cursor moves
    /// on and the next subset is tried, but the cursor only commits on
    /// success.
    pub fn add_node(&mut self, node: Node) -> Result<(), Node> {
        if self.closed {
            return Err(node);
        }

        let descriptor = self.descriptor;
        let fields = self
            .fields
            .get_or_insert_with(|| partition_fields(descriptor));

        let slot = match self.demanded {
            Some((subset, index)) => fields[subset][index]
                .try_add(&node)
                .then_some((subset, index)),
            None => find_slot(fields, self.current_subset, &node),
        };
        let Some((subset, index)) = slot else {
            return Err(node);
        };
        let field = fields[subset][index].descriptor;

        if let Some(state) = field.next_state {
            self.state = state;
        }
        self.last_matched_subset = Some(subset);
        self.current_subset = match field.advance {
            SubsetAdvance::Stay => subset,
            SubsetAdvance::Skip => subset + 1,
        };
        self.demanded = field.demands_next.then_some((subset, index + 1));
        if field.closes_rule {
            self.closed = true;
        }
        self.children.push(node);
        Ok(())
    }

    /// Remove the most recently accepted child
    pub fn pop_child(&mut self) -> Option<Node> {
        self.children.pop()
    }

    /// First required field that has not matched
    pub fn first_unsatisfied(&self) -> Option<&'static FieldDescriptor> {
        match &self.fields {
            Some(subsets) => subsets
                .iter()
                .flatten()
                .find(|field| !field.is_satisfied())
                .map(|field| field.descriptor),
            None => self.descriptor.fields.iter().find(|field| field.required),
        }
    }

    /// An instance may end when every required field has matched and, if
    /// the last match opened a subset that has a closer, it has been closed.
    pub fn is_complete(&self) -> bool {
        self.demanded_field().is_none()
            && self.first_unsatisfied().is_none()
            && self.pending_closer().is_none()
    }

    /// Description of what the instance still needs, for error messages
    pub fn expected(&self) -> String {
        self.demanded_field()
            .or_else(|| self.first_unsatisfied())
            .or_else(|| self.pending_closer())
            .map(|field| field.acceptance.to_string())
            .unwrap_or_else(|| "nothing".to_string())
    }

    /// Field the last match bound to follow it
    fn demanded_field(&self) -> Option<&'static FieldDescriptor> {
        let (subset, index) = self.demanded?;
        let fields = self.fields.as_ref()?;
        Some(fields[subset][index].descriptor)
    }

    fn pending_closer(&self) -> Option<&'static FieldDescriptor> {
        if self.closed {
            return None;
        }
        let subset = self.last_matched_subset?;
        self.descriptor
            .fields_in_subset(subset)
            .find(|field| field.closes_rule)
    }

    pub fn into_node(self) -> Node {
        Node::Rule(RuleNode {
            rule: self.descriptor.name,
            children: self.children,
            closed: self.closed,
        })
    }
}

fn partition_fields(descriptor: &'static RuleDescriptor) -> Vec<Vec<Field>> {
    (0..descriptor.subset_count())
        .map(|subset| {
            let mut bound = false;
            descriptor
                .fields_in_subset(subset)
                .map(|field| {
                    let slot = Field::new(field, bound);
                    bound = field.demands_next;
                    slot
                })
                .collect()
        })
        .collect()
}

/// Scan subsets from `start` for a free field that takes `node`
fn find_slot(fields: &mut [Vec<Field>], start: usize, node: &Node) -> Option<(usize, usize)> {
    for (subset, slots) in fields.iter_mut().enumerate().skip(start) {
        for (index, field) in slots.iter_mut().enumerate() {
            if field.bound {
                continue;
            }
            if field.try_add(node) {
                return Some((subset, index));
            }
            if !field.is_satisfied() {
                return None;
            }
            if field.descriptor.chainer && field.matches == 0 {
                break;
            }
        }
    }
    None
}
