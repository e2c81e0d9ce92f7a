//! XML-element-tree target with OGC Filter Encoding flavoured element names.

use crate::{
    error::BuildError,
    target::{Reducer, Terminal, TreeTarget},
};
use filter_engine::pattern::{ESCAPE, SINGLE_CHAR, WILDCARD};
use filter_model::{OperatorTag, Value};
use quick_xml::{
    Writer,
    events::{BytesEnd, BytesStart, BytesText, Event},
};

pub const FES_NAMESPACE: &str = "http://www.opengis.net/fes/2.0";

/// A namespaced element with attributes, optional text and children.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Element {
    pub name: String,
    pub attributes: Vec<(String, String)>,
    pub text: Option<String>,
    pub children: Vec<Element>,
}

impl Element {
    pub fn new(name: &str) -> Self {
        Self {
            name: format!("fes:{name}"),
            ..Self::default()
        }
    }

    pub fn with_attribute(mut self, key: &str, value: impl ToString) -> Self {
        self.attributes.push((key.to_string(), value.to_string()));
        self
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    pub fn with_child(mut self, child: Element) -> Self {
        self.children.push(child);
        self
    }

    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    fn write(&self, writer: &mut Writer<Vec<u8>>) -> Result<(), String> {
        let mut start = BytesStart::new(self.name.as_str());
        for (key, value) in &self.attributes {
            start.push_attribute((key.as_str(), value.as_str()));
        }

        if self.text.is_none() && self.children.is_empty() {
            return writer
                .write_event(Event::Empty(start))
                .map_err(|e| e.to_string());
        }

        writer
            .write_event(Event::Start(start))
            .map_err(|e| e.to_string())?;
        if let Some(text) = &self.text {
            writer
                .write_event(Event::Text(BytesText::new(text)))
                .map_err(|e| e.to_string())?;
        }
        for child in &self.children {
            child.write(writer)?;
        }
        writer
            .write_event(Event::End(BytesEnd::new(self.name.as_str())))
            .map_err(|e| e.to_string())
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct XmlTarget;

impl XmlTarget {
    /// Wraps `node` in a `fes:Filter` document and serializes it.
    pub fn render(&self, node: &Element) -> Result<String, BuildError> {
        let document = Element::new("Filter")
            .with_attribute("xmlns:fes", FES_NAMESPACE)
            .with_child(node.clone());

        let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);
        document
            .write(&mut writer)
            .map_err(|message| self.render_error(message))?;
        String::from_utf8(writer.into_inner()).map_err(|e| self.render_error(e.to_string()))
    }

    fn render_error(&self, message: String) -> BuildError {
        BuildError::Render {
            target: self.name().to_string(),
            message,
        }
    }

    fn element_name(tag: OperatorTag) -> Option<&'static str> {
        use OperatorTag::*;
        let name = match tag {
            And => "And",
            Or => "Or",
            Not => "Not",
            IsEqualTo => "PropertyIsEqualTo",
            IsNotEqualTo => "PropertyIsNotEqualTo",
            IsGreaterThan => "PropertyIsGreaterThan",
            IsGreaterThanOrEqualTo => "PropertyIsGreaterThanOrEqualTo",
            IsLessThan => "PropertyIsLessThan",
            IsLessThanOrEqualTo => "PropertyIsLessThanOrEqualTo",
            IsBetween => "PropertyIsBetween",
            IsLike | XPathIsLike | XPathExists => "PropertyIsLike",
            IsNull => "PropertyIsNull",
            Beyond => "Beyond",
            Contains => "Contains",
            Crosses => "Crosses",
            Disjoint => "Disjoint",
            DWithin => "DWithin",
            Intersects => "Intersects",
            Overlaps => "Overlaps",
            Touches => "Touches",
            Within => "Within",
            After => "After",
            Before => "Before",
            During => "During",
            Include | Exclude | IsFuzzy | NearestNeighbor | Relative | XPathIsFuzzy | Function => {
                return None;
            }
        };
        Some(name)
    }
}

fn literal_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(v) => v.clone(),
        Value::Date(v) => v.to_rfc3339(),
        Value::DateRange(v) => format!("{}/{}", v.start().to_rfc3339(), v.end().to_rfc3339()),
        Value::Object(v) => v.to_string(),
        Value::Bytes(v) => v.iter().map(|b| format!("{b:02x}")).collect(),
        other => other.to_string(),
    }
}

impl TreeTarget for XmlTarget {
    type Node = Element;
    type Operand = Element;

    fn name(&self) -> &str {
        "XmlTarget"
    }

    fn supports(&self, tag: OperatorTag) -> bool {
        Self::element_name(tag).is_some()
    }

    fn property(&self, name: &str) -> Result<Element, BuildError> {
        Ok(Element::new("ValueReference").with_text(name))
    }

    fn literal(&self, value: &Value) -> Result<Element, BuildError> {
        Ok(Element::new("Literal").with_text(literal_text(value)))
    }

    fn function(&self, name: &str, args: Vec<Element>) -> Result<Element, BuildError> {
        Ok(Element {
            children: args,
            ..Element::new("Function").with_attribute("name", name)
        })
    }

    fn terminal(&self, terminal: Terminal<Element>) -> Result<Element, BuildError> {
        let name = Self::element_name(terminal.tag).ok_or_else(|| self.unsupported(terminal.tag))?;
        let mut element = Element::new(name);

        match terminal.tag {
            OperatorTag::IsEqualTo | OperatorTag::IsNotEqualTo => {
                element = element.with_attribute("matchCase", terminal.match_case);
            }
            OperatorTag::IsLike | OperatorTag::XPathIsLike | OperatorTag::XPathExists => {
                element = element
                    .with_attribute("wildCard", WILDCARD)
                    .with_attribute("singleChar", SINGLE_CHAR)
                    .with_attribute("escapeChar", ESCAPE)
                    .with_attribute("matchCase", terminal.match_case);
            }
            _ => {}
        }

        element = element.with_child(terminal.property);
        let mut values = terminal.values.into_iter();
        match terminal.tag {
            OperatorTag::IsBetween => {
                let lower = values.next().ok_or_else(|| self.unsupported(terminal.tag))?;
                let upper = values.next().ok_or_else(|| self.unsupported(terminal.tag))?;
                element = element
                    .with_child(Element::new("LowerBoundary").with_child(lower))
                    .with_child(Element::new("UpperBoundary").with_child(upper));
            }
            OperatorTag::XPathExists => {
                element = element.with_child(Element::new("Literal").with_text(WILDCARD));
            }
            _ => element.children.extend(values),
        }

        if let Some(distance) = terminal.distance {
            element = element.with_child(
                Element::new("Distance")
                    .with_attribute("uom", distance.units.symbol())
                    .with_text(distance.value.to_string()),
            );
        }

        Ok(element)
    }

    fn logical_reducer(&self, tag: OperatorTag) -> Result<Reducer<Element>, BuildError> {
        match tag {
            OperatorTag::And | OperatorTag::Or | OperatorTag::Not => {
                let name = Self::element_name(tag).ok_or_else(|| self.unsupported(tag))?;
                Ok(Box::new(move |children: Vec<Element>| Element {
                    children,
                    ..Element::new(name)
                }))
            }
            other => Err(self.unsupported(other)),
        }
    }
}
