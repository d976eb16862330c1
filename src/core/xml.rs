use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use serde_json::{Map, Value};
use thiserror::Error;

/// Errors that can occur converting an XML document
#[derive(Debug, Error)]
pub enum XmlError {
    #[error("Malformed XML: {0}")]
    Malformed(String),

    #[error("Document has no root element")]
    Empty,
}

/// Element being built while its children are read
struct Node {
    name: String,
    attributes: Map<String, Value>,
    children: Map<String, Value>,
    text: String,
}

impl Node {
    fn open(start: &BytesStart<'_>) -> Result<Self, XmlError> {
        let mut attributes = Map::new();
        for attr in start.attributes() {
            let attr = attr.map_err(|e| XmlError::Malformed(e.to_string()))?;
            let value = attr
                .unescape_value()
                .map_err(|e| XmlError::Malformed(e.to_string()))?;
            attributes.insert(
                String::from_utf8_lossy(attr.key.as_ref()).into_owned(),
                Value::String(value.into_owned()),
            );
        }

        Ok(Self {
            name: String::from_utf8_lossy(start.name().as_ref()).into_owned(),
            attributes,
            children: Map::new(),
            text: String::new(),
        })
    }

    /// Text-only elements collapse to a string; attributes go under `$` and
    /// text next to child elements under `_`.
    fn into_value(self) -> Value {
        if self.attributes.is_empty() && self.children.is_empty() {
            return Value::String(self.text);
        }

        let mut object = Map::new();
        if !self.attributes.is_empty() {
            object.insert("$".to_string(), Value::Object(self.attributes));
        }
        if !self.text.is_empty() {
            object.insert("_".to_string(), Value::String(self.text));
        }
        for (key, value) in self.children {
            object.insert(key, value);
        }
        Value::Object(object)
    }
}

/// Add a child, turning a repeated element name into an array
fn attach(children: &mut Map<String, Value>, name: String, value: Value) {
    match children.get_mut(&name) {
        Some(Value::Array(items)) => items.push(value),
        Some(existing) => {
            let first = existing.take();
            *existing = Value::Array(vec![first, value]);
        }
        None => {
            children.insert(name, value);
        }
    }
}

/// Convert an XML document to JSON, returning the root element's name and value
///
/// ```
/// use rent_gateway::core::xml::xml_to_json;
/// let (root, value) = xml_to_json("<r><a>1</a><a>2</a></r>").unwrap();
/// assert_eq!(root, "r");
/// assert_eq!(value["a"][1], "2");
/// ```
pub fn xml_to_json(xml: &str) -> Result<(String, Value), XmlError> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut stack: Vec<Node> = Vec::new();

    loop {
        let event = reader
            .read_event()
            .map_err(|e| XmlError::Malformed(e.to_string()))?;

        match event {
            Event::Start(start) => stack.push(Node::open(&start)?),
            Event::Empty(start) => {
                let node = Node::open(&start)?;
                match stack.last_mut() {
                    Some(parent) => {
                        let name = node.name.clone();
                        attach(&mut parent.children, name, node.into_value());
                    }
                    None => return Ok((node.name.clone(), node.into_value())),
                }
            }
            Event::Text(text) => {
                if let Some(node) = stack.last_mut() {
                    let text = text.unescape().map_err(|e| XmlError::Malformed(e.to_string()))?;
                    node.text.push_str(&text);
                }
            }
            Event::CData(data) => {
                if let Some(node) = stack.last_mut() {
                    node.text.push_str(&String::from_utf8_lossy(&data.into_inner()));
                }
            }
            Event::End(_) => {
                let node = stack
                    .pop()
                    .ok_or_else(|| XmlError::Malformed("unexpected closing tag".to_string()))?;
                let name = node.name.clone();
                let value = node.into_value();

                match stack.last_mut() {
                    Some(parent) => attach(&mut parent.children, name, value),
                    None => return Ok((name, value)),
                }
            }
            Event::Eof => {
                return Err(if stack.is_empty() {
                    XmlError::Empty
                } else {
                    XmlError::Malformed("document ended inside an element".to_string())
                });
            }
            _ => {}
        }
    }
}
