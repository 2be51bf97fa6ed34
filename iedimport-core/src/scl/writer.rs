//! Serialization of an [`SclDocument`] back to markup.

use quick_xml::Writer;
use quick_xml::events::{BytesCData, BytesDecl, BytesEnd, BytesStart, BytesText, Event};

use crate::error::{SclError, SclResult};

use super::document::{NodeKind, SclDocument};
use super::NodeId;

/// Indentation width used when writing documents
const INDENT_WIDTH: usize = 2;

impl SclDocument {
    /// Writes the attached tree with an XML declaration and two-space indentation.
    ///
    /// # Errors
    ///
    /// Returns an error if the writer fails.
    pub fn to_xml_string(&self) -> SclResult<String> {
        let mut writer = Writer::new_with_indent(Vec::new(), b' ', INDENT_WIDTH);
        writer
            .write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))
            .map_err(write_error)?;
        self.write_node(&mut writer, self.root())?;

        let mut bytes = writer.into_inner();
        bytes.push(b'\n');
        String::from_utf8(bytes).map_err(write_error)
    }

    fn write_node(&self, writer: &mut Writer<Vec<u8>>, id: NodeId) -> SclResult<()> {
        let Some(node) = self.node(id) else {
            return Ok(());
        };

        match &node.kind {
            NodeKind::Element { name, attributes } => {
                let mut start = BytesStart::new(name.as_str());
                for attr in attributes {
                    start.push_attribute((attr.name.as_str(), attr.value.as_str()));
                }

                if node.children.is_empty() {
                    writer.write_event(Event::Empty(start)).map_err(write_error)?;
                } else {
                    writer.write_event(Event::Start(start)).map_err(write_error)?;
                    for child in &node.children {
                        self.write_node(writer, *child)?;
                    }
                    writer
                        .write_event(Event::End(BytesEnd::new(name.as_str())))
                        .map_err(write_error)?;
                }
            }
            NodeKind::Text(text) => writer
                .write_event(Event::Text(BytesText::from_escaped(text.as_str())))
                .map_err(write_error)?,
            NodeKind::CData(data) => writer
                .write_event(Event::CData(BytesCData::new(data.as_str())))
                .map_err(write_error)?,
            NodeKind::Comment(text) => writer
                .write_event(Event::Comment(BytesText::from_escaped(text.as_str())))
                .map_err(write_error)?,
        }

        Ok(())
    }
}

fn write_error(err: impl std::fmt::Display) -> SclError {
    SclError::Write(err.to_string())
}
