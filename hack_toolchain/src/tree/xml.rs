//! XML rendering of parse trees
//!
//! Rule nodes become elements named after the rule; subroutine calls are
//! flattened into their parent. Terminals become
//! `<category> literal </category>`.

use crate::syntax::{Node, RuleNode};
use crate::grammar::RuleName;
use crate::tokens::Token;
use crate::tree::{TreeError, TreeResult};
use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use std::io::Cursor;

pub struct XmlTreeWriter {
    indent_width: usize,
}

impl XmlTreeWriter {
    pub fn new(indent_width: usize) -> Self {
        Self { indent_width }
    }

    pub fn render(&self, node: &Node) -> TreeResult<String> {
        let mut buffer = Cursor::new(Vec::new());
        {
            let mut writer = if self.indent_width > 0 {
                Writer::new_with_indent(&mut buffer, b' ', self.indent_width)
            } else {
                Writer::new(&mut buffer)
            };
            write_node(&mut writer, node)?;
        }

        let mut output = String::from_utf8(buffer.into_inner()).map_err(|_| TreeError::Encoding)?;
        output.push('\n');
        Ok(output)
    }
}

impl Default for XmlTreeWriter {
    fn default() -> Self {
        Self::new(2)
    }
}

fn write_node<W: std::io::Write>(writer: &mut Writer<W>, node: &Node) -> TreeResult<()> {
    match node {
        Node::Terminal(token) => write_terminal(writer, token),
        Node::Rule(rule) if rule.rule == RuleName::SubroutineCall => write_children(writer, rule),
        Node::Rule(rule) => {
            let name = rule.rule.as_str();
            write_event(writer, Event::Start(BytesStart::new(name)))?;
            write_children(writer, rule)?;
            write_event(writer, Event::End(BytesEnd::new(name)))
        }
    }
}

fn write_children<W: std::io::Write>(writer: &mut Writer<W>, rule: &RuleNode) -> TreeResult<()> {
    for child in &rule.children {
        write_node(writer, child)?;
    }
    Ok(())
}

fn write_terminal<W: std::io::Write>(writer: &mut Writer<W>, token: &Token) -> TreeResult<()> {
    let tag = token.category().tag();
    let text = format!(" {} ", token.literal);
    write_event(writer, Event::Start(BytesStart::new(tag)))?;
    write_event(writer, Event::Text(BytesText::new(&text)))?;
    write_event(writer, Event::End(BytesEnd::new(tag)))
}

fn write_event<W: std::io::Write>(writer: &mut Writer<W>, event: Event<'_>) -> TreeResult<()> {
    writer.write_event(event).map_err(|e| TreeError::Xml {
        message: e.to_string(),
    })
}
