//! Nom-based parser for the handshake markup dialect.
//!
//! The handshake only ever uses a handful of constructs: elements, quoted
//! attributes, self-closing tags, text, CDATA sections and an optional
//! `<?xml ...?>` declaration. Anything else is rejected as malformed.

use nom::{
    branch::alt,
    bytes::complete::{tag, take_until, take_while, take_while1},
    character::complete::{char, multispace0, multispace1},
    combinator::{eof, map, opt},
    error::{Error as NomError, ErrorKind},
    multi::many0,
    sequence::{delimited, preceded, terminated},
    IResult,
};

use crate::error::HandshakeError;

/// Deepest element nesting accepted. Real handshakes stay under five.
pub const MAX_DEPTH: usize = 32;

/// A markup element with its attributes and children.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    /// Tag name, case preserved.
    pub name: String,
    /// Attributes in document order, values unescaped.
    pub attributes: Vec<(String, String)>,
    /// Child nodes in document order.
    pub children: Vec<Node>,
}

/// A child of an [`Element`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    /// Nested element.
    Element(Element),
    /// Text or CDATA content.
    Text(String),
}

impl Element {
    /// Value of the named attribute, if present.
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    /// Iterate over direct child elements.
    pub fn elements(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter_map(|node| match node {
            Node::Element(e) => Some(e),
            Node::Text(_) => None,
        })
    }

    /// First direct child element with the given name.
    pub fn child(&self, name: &str) -> Option<&Element> {
        self.elements().find(|e| e.name == name)
    }

    /// First element with the given name, depth-first, starting with `self`.
    pub fn find(&self, name: &str) -> Option<&Element> {
        if self.name == name {
            return Some(self);
        }
        self.elements().find_map(|e| e.find(name))
    }

    /// Concatenated text and CDATA of the direct children.
    pub fn text(&self) -> String {
        self.children
            .iter()
            .filter_map(|node| match node {
                Node::Text(t) => Some(t.as_str()),
                Node::Element(_) => None,
            })
            .collect()
    }
}

/// Parse a complete document into its root element.
///
/// Leading and trailing whitespace is allowed; any other trailing input is
/// not.
pub fn parse_document(input: &str) -> Result<Element, HandshakeError> {
    match parse_root(input) {
        Ok((_, root)) => Ok(root),
        Err(nom::Err::Error(e)) | Err(nom::Err::Failure(e)) => {
            Err(HandshakeError::Malformed(e.input.chars().take(32).collect()))
        }
        Err(nom::Err::Incomplete(_)) => Err(HandshakeError::Malformed(String::new())),
    }
}

fn parse_root(input: &str) -> IResult<&str, Element> {
    let (input, _) = multispace0(input)?;
    let (input, _) = opt(terminated(parse_declaration, multispace0))(input)?;
    let (input, root) = parse_element(input, 1)?;
    let (input, _) = multispace0(input)?;
    let (input, _) = eof(input)?;
    Ok((input, root))
}

fn is_name_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | ':' | '.')
}

fn parse_name(input: &str) -> IResult<&str, &str> {
    take_while1(is_name_char)(input)
}

fn parse_declaration(input: &str) -> IResult<&str, &str> {
    delimited(tag("<?"), take_until("?>"), tag("?>"))(input)
}

fn parse_quoted(input: &str) -> IResult<&str, &str> {
    alt((
        delimited(char('"'), take_while(|c| c != '"' && c != '<'), char('"')),
        delimited(char('\''), take_while(|c| c != '\'' && c != '<'), char('\'')),
    ))(input)
}

fn parse_attribute(input: &str) -> IResult<&str, (&str, &str)> {
    let (input, _) = multispace1(input)?;
    let (input, key) = parse_name(input)?;
    let (input, _) = delimited(multispace0, char('='), multispace0)(input)?;
    let (input, value) = parse_quoted(input)?;
    Ok((input, (key, value)))
}

fn parse_self_close(input: &str) -> IResult<&str, &str> {
    tag("/>")(input)
}

fn parse_cdata(input: &str) -> IResult<&str, &str> {
    delimited(tag("<![CDATA["), take_until("]]>"), tag("]]>"))(input)
}

fn parse_text(input: &str) -> IResult<&str, &str> {
    take_while1(|c| c != '<')(input)
}

fn parse_node(input: &str, depth: usize) -> IResult<&str, Node> {
    alt((
        map(parse_cdata, |s: &str| Node::Text(s.to_string())),
        map(|i| parse_element(i, depth), Node::Element),
        map(parse_text, |s: &str| Node::Text(unescape(s))),
    ))(input)
}

fn parse_element(input: &str, depth: usize) -> IResult<&str, Element> {
    let (input, _) = char('<')(input)?;
    let (input, name) = parse_name(input)?;
    if depth > MAX_DEPTH {
        return Err(nom::Err::Failure(NomError::new(input, ErrorKind::TooLarge)));
    }
    let (input, attributes) = many0(parse_attribute)(input)?;
    let (input, _) = multispace0(input)?;

    let mut element = Element {
        name: name.to_string(),
        attributes: attributes
            .into_iter()
            .map(|(k, v)| (k.to_string(), unescape(v)))
            .collect(),
        children: Vec::new(),
    };

    let (input, self_closing) = opt(parse_self_close)(input)?;
    if self_closing.is_some() {
        return Ok((input, element));
    }

    let (input, _) = char('>')(input)?;
    let (input, children) = many0(|i| parse_node(i, depth + 1))(input)?;
    let (input, closing) = preceded(tag("</"), parse_name)(input)?;
    if closing != name {
        return Err(nom::Err::Failure(NomError::new(input, ErrorKind::Tag)));
    }
    let (input, _) = preceded(multispace0, char('>'))(input)?;

    element.children = children;
    Ok((input, element))
}

/// Replace the five predefined entities.
fn unescape(raw: &str) -> String {
    if !raw.contains('&') {
        return raw.to_string();
    }
    raw.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&apos;", "'")
        .replace("&amp;", "&")
}
